pub mod discord;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{prelude::*, state::AppState};

#[async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Runs registered plugins and restarts any that stop or crash.
pub struct App {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self { plugins: Vec::new() }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  pub fn run(self, app: Arc<AppState>) -> Vec<JoinHandle<()>> {
    self
      .plugins
      .into_iter()
      .map(|plugin| tokio::spawn(supervise(plugin, app.clone())))
      .collect()
  }
}

async fn supervise(plugin: Arc<dyn Plugin>, app: Arc<AppState>) {
  let name = plugin.name();
  let delay = app.config.restart_delay;
  info!("SYSTEM: Service `{name}` initialized");

  loop {
    let handle = tokio::spawn({
      let app = app.clone();
      let plugin = plugin.clone();
      async move { plugin.start(app).await }
    });

    match handle.await {
      Ok(Ok(())) => warn!("Service `{name}` stopped unexpectedly (Ok)."),
      Ok(Err(err)) => error!("Service `{name}` crashed with error: {err:#}."),
      Err(err) if err.is_cancelled() => {
        info!("Service `{name}` shutdown.");
        break;
      }
      Err(_) => error!("Service `{name}` PANICKED!"),
    }

    time::sleep(delay).await;
    info!("SYSTEM: Restarting service `{name}`...");
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::state::Config;

  struct Flaky {
    starts: Arc<AtomicUsize>,
  }

  #[async_trait]
  impl Plugin for Flaky {
    fn name(&self) -> &'static str {
      "flaky"
    }

    async fn start(&self, _app: Arc<AppState>) -> anyhow::Result<()> {
      let attempt = self.starts.fetch_add(1, Ordering::SeqCst);
      if attempt == 0 {
        anyhow::bail!("first start fails");
      }
      std::future::pending().await
    }
  }

  #[tokio::test]
  async fn test_crashed_plugin_is_restarted() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
      games_path: dir.path().join("games.json"),
      stats_path: dir.path().join("stats.json"),
      restart_delay: Duration::from_millis(10),
      ..Config::default()
    };
    let starts = Arc::new(AtomicUsize::new(0));

    let handles = App::new()
      .register(Flaky { starts: starts.clone() })
      .run(Arc::new(AppState::new(config)));

    for _ in 0..100 {
      if starts.load(Ordering::SeqCst) >= 2 {
        break;
      }
      time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(starts.load(Ordering::SeqCst), 2);
    for handle in handles {
      handle.abort();
    }
  }
}
