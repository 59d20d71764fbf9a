//! Whole-document JSON persistence.
//!
//! Each [`Domain`] is one file holding a map of user id to record. Loading a
//! missing file yields an empty map; saving writes the entire document to a
//! sibling temporary file and renames it over the old one, so readers see
//! either the previous or the new document, never a partial one.
//!
//! There is no transaction spanning both domains: finishing a game saves
//! `games` and `stats` separately, and a crash in between leaves them out
//! of step.

use std::{
  fmt,
  io::{self, ErrorKind, Write},
  ops::{Deref, DerefMut},
  path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::{
  fs,
  sync::{Mutex, MutexGuard},
};

use crate::{
  model::{GameSession, UserId, UserStats},
  prelude::*,
};

pub type Records<T> = BTreeMap<UserId, T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
  Games,
  Stats,
}

impl fmt::Display for Domain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Domain::Games => "games",
      Domain::Stats => "stats",
    })
  }
}

pub struct Store {
  games_path: PathBuf,
  stats_path: PathBuf,
  games_lock: Mutex<()>,
  stats_lock: Mutex<()>,
}

impl Store {
  pub fn new(
    games_path: impl Into<PathBuf>,
    stats_path: impl Into<PathBuf>,
  ) -> Self {
    Self {
      games_path: games_path.into(),
      stats_path: stats_path.into(),
      games_lock: Mutex::new(()),
      stats_lock: Mutex::new(()),
    }
  }

  pub fn path(&self, domain: Domain) -> &Path {
    match domain {
      Domain::Games => &self.games_path,
      Domain::Stats => &self.stats_path,
    }
  }

  fn lock(&self, domain: Domain) -> &Mutex<()> {
    match domain {
      Domain::Games => &self.games_lock,
      Domain::Stats => &self.stats_lock,
    }
  }

  pub async fn load<T: DeserializeOwned>(
    &self,
    domain: Domain,
  ) -> Result<Records<T>> {
    let path = self.path(domain);

    match fs::read(path).await {
      Ok(bytes) => Ok(json::from_slice(&bytes)?),
      Err(err) if err.kind() == ErrorKind::NotFound => {
        debug!("No {domain} document at {}, starting empty", path.display());
        Ok(Records::new())
      }
      Err(err) => Err(err.into()),
    }
  }

  pub async fn save<T: Serialize>(
    &self,
    domain: Domain,
    records: &Records<T>,
  ) -> Result<()> {
    let path = self.path(domain).to_path_buf();
    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).await?;

    let bytes = to_pretty_json(records)?;
    tokio::task::spawn_blocking(move || replace_file(&dir, &path, &bytes))
      .await
      .map_err(io::Error::other)??;
    debug!("Saved {} {domain} record(s)", records.len());
    Ok(())
  }

  /// Locks the domain and loads its snapshot. The lock is held until the
  /// snapshot is committed or dropped, so load-mutate-save sequences from
  /// concurrent handlers cannot overwrite each other.
  ///
  /// Callers that need both domains must check out `games` first.
  pub async fn checkout<T: Serialize + DeserializeOwned>(
    &self,
    domain: Domain,
  ) -> Result<Snapshot<'_, T>> {
    let guard = self.lock(domain).lock().await;
    let records = self.load(domain).await?;
    Ok(Snapshot { store: self, domain, records, _guard: guard })
  }

  pub async fn games(&self) -> Result<Snapshot<'_, GameSession>> {
    self.checkout(Domain::Games).await
  }

  pub async fn stats(&self) -> Result<Snapshot<'_, UserStats>> {
    self.checkout(Domain::Stats).await
  }
}

fn replace_file(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
  let mut file = tempfile::NamedTempFile::new_in(dir)?;
  file.write_all(bytes)?;
  file.as_file().sync_all()?;
  file.persist(path).map_err(|err| err.error)?;
  Ok(())
}

/// Matches the four-space layout of documents written by earlier versions
/// of the bot.
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
  let mut buf = Vec::new();
  let formatter = json::ser::PrettyFormatter::with_indent(b"    ");
  let mut ser = json::Serializer::with_formatter(&mut buf, formatter);
  value.serialize(&mut ser)?;
  Ok(buf)
}

pub struct Snapshot<'a, T: Serialize> {
  store: &'a Store,
  domain: Domain,
  records: Records<T>,
  _guard: MutexGuard<'a, ()>,
}

impl<T: Serialize> Snapshot<'_, T> {
  pub async fn commit(self) -> Result<()> {
    self.store.save(self.domain, &self.records).await
  }
}

impl<T: Serialize> Deref for Snapshot<'_, T> {
  type Target = Records<T>;

  fn deref(&self) -> &Self::Target {
    &self.records
  }
}

impl<T: Serialize> DerefMut for Snapshot<'_, T> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.records
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::model::{MessageLink, Phase};

  fn store_in(dir: &tempfile::TempDir) -> Store {
    Store::new(dir.path().join("games.json"), dir.path().join("stats.json"))
  }

  fn session(name: &str) -> GameSession {
    GameSession {
      name: name.into(),
      distance_left: 4,
      time_left: 42.5,
      money_left: -1,
      message: MessageLink { message_id: 11, channel_id: 22 },
      phase: Phase::AwaitingResumeOrQuit,
    }
  }

  #[tokio::test]
  async fn test_missing_document_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let games: Records<GameSession> = store.load(Domain::Games).await.unwrap();
    let stats: Records<UserStats> = store.load(Domain::Stats).await.unwrap();

    assert!(games.is_empty());
    assert!(stats.is_empty());
  }

  #[tokio::test]
  async fn test_save_overwrites_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let mut first = Records::new();
    first.insert(1, UserStats { wins: 1, losses: 0 });
    first.insert(2, UserStats { wins: 0, losses: 3 });
    store.save(Domain::Stats, &first).await.unwrap();

    let mut second = Records::new();
    second.insert(2, UserStats { wins: 5, losses: 3 });
    store.save(Domain::Stats, &second).await.unwrap();

    let loaded: Records<UserStats> = store.load(Domain::Stats).await.unwrap();
    assert_eq!(loaded, second);
  }

  #[tokio::test]
  async fn test_documents_use_string_keys_and_four_space_indent() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let mut games = store.games().await.unwrap();
    games.insert(42, session("carol"));
    games.commit().await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("games.json")).unwrap();
    assert!(raw.contains("\n    \"42\": {"));
    assert!(raw.contains("\"message_id\": 11"));
    assert!(raw.contains("\"phase\": \"awaiting_resume_or_quit\""));

    let loaded: Records<GameSession> = store.load(Domain::Games).await.unwrap();
    assert_eq!(loaded.get(&42), Some(&session("carol")));
  }

  #[tokio::test]
  async fn test_domains_are_independent_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let mut stats = store.stats().await.unwrap();
    stats.insert(7, UserStats { wins: 2, losses: 1 });
    stats.commit().await.unwrap();

    let games: Records<GameSession> = store.load(Domain::Games).await.unwrap();
    assert!(games.is_empty());
    assert!(!dir.path().join("games.json").exists());
  }

  #[tokio::test]
  async fn test_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("data").join("rushhour");
    let store =
      Store::new(nested.join("games.json"), nested.join("stats.json"));

    let mut stats = store.stats().await.unwrap();
    stats.insert(1, UserStats::default());
    stats.commit().await.unwrap();

    assert!(nested.join("stats.json").exists());
  }

  #[tokio::test]
  async fn test_checkout_serializes_writers() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(store_in(&dir));

    let mut tasks = Vec::new();
    for user in 0..16u64 {
      let store = store.clone();
      tasks.push(tokio::spawn(async move {
        let mut stats = store.stats().await.unwrap();
        stats.entry(user).or_default().wins += 1;
        stats.commit().await.unwrap();
      }));
    }
    for task in tasks {
      task.await.unwrap();
    }

    let stats: Records<UserStats> = store.load(Domain::Stats).await.unwrap();
    assert_eq!(stats.len(), 16);
    assert!(stats.values().all(|s| s.wins == 1));
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
  async fn test_readers_never_see_a_partial_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(store_in(&dir));

    let writer = {
      let store = store.clone();
      tokio::spawn(async move {
        for round in 0..100u32 {
          let mut stats = store.stats().await.unwrap();
          for user in 0..50 {
            stats.entry(user).or_default().wins = round;
          }
          stats.commit().await.unwrap();
        }
      })
    };

    while !writer.is_finished() {
      let loaded = store.load::<UserStats>(Domain::Stats).await;
      assert!(loaded.is_ok(), "unlocked read failed: {loaded:?}");
    }
    writer.await.unwrap();

    let stats: Records<UserStats> = store.load(Domain::Stats).await.unwrap();
    assert!(stats.values().all(|s| s.wins == 99));
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
  }

  #[tokio::test]
  async fn test_corrupt_document_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(dir.path().join("stats.json"), "{ not json").unwrap();

    let loaded = store.load::<UserStats>(Domain::Stats).await;
    assert!(matches!(loaded, Err(Error::Json(_))));
  }
}
