//! Error types for the RushHour bot

use thiserror::Error;

/// Failure reported by a chat platform when the dispatcher talks back to it.
#[derive(Debug, Error)]
pub enum SurfaceError {
  #[error("rate limited")]
  RateLimited,

  #[error("platform error: {0}")]
  Platform(String),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] json::Error),

  #[error("Surface error: {0}")]
  Surface(#[from] SurfaceError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
