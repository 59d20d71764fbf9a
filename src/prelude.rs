pub use std::{collections::BTreeMap, time::Duration};

pub use anyhow::Context;
pub use async_trait::async_trait;
pub use tokio::time;
pub use tracing::{debug, error, info, warn};

pub use crate::error::{Error, Result};
pub(crate) use crate::utils;
