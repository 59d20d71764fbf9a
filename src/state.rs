use std::{
  env,
  path::PathBuf,
  sync::{Mutex, PoisonError},
};

use rand::{SeedableRng, rngs::StdRng};

use crate::{prelude::*, store::Store};

#[derive(Debug, Clone)]
pub struct Config {
  pub prefix: String,
  pub games_path: PathBuf,
  pub stats_path: PathBuf,
  /// Probability that a random event fires after a move.
  pub event_chance: f64,
  pub seed: Option<u64>,
  /// Delay before a crashed service is started again.
  pub restart_delay: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      prefix: String::from("!"),
      games_path: PathBuf::from("rushhour_games.json"),
      stats_path: PathBuf::from("rushhour_stats.json"),
      event_chance: 0.4,
      seed: None,
      restart_delay: Duration::from_secs(5),
    }
  }
}

impl Config {
  /// Overrides defaults with whatever is set in the environment.
  pub fn from_env() -> anyhow::Result<Self> {
    let mut config = Self::default();

    if let Ok(prefix) = env::var("COMMAND_PREFIX")
      && !prefix.trim().is_empty()
    {
      config.prefix = prefix.trim().to_string();
    }
    if let Ok(path) = env::var("GAMES_FILE") {
      config.games_path = path.into();
    }
    if let Ok(path) = env::var("STATS_FILE") {
      config.stats_path = path.into();
    }
    if let Ok(chance) = env::var("EVENT_CHANCE") {
      let chance: f64 =
        chance.trim().parse().context("EVENT_CHANCE must be a number")?;
      config.event_chance = chance.clamp(0.0, 1.0);
    }
    if let Ok(seed) = env::var("RUSHHOUR_SEED") {
      config.seed =
        Some(seed.trim().parse().context("RUSHHOUR_SEED must be a u64")?);
    }

    Ok(config)
  }
}

pub struct AppState {
  pub config: Config,
  pub store: Store,
  rng: Mutex<StdRng>,
}

impl AppState {
  pub fn new(config: Config) -> Self {
    let rng = match config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };

    info!(
      "Game documents: {} / {}",
      config.games_path.display(),
      config.stats_path.display()
    );

    Self {
      store: Store::new(config.games_path.clone(), config.stats_path.clone()),
      config,
      rng: Mutex::new(rng),
    }
  }

  /// Runs `f` with the shared generator. Never hold across an await.
  pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut rng)
  }
}
