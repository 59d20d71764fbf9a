//! Routes chat commands and reactions to game actions.
//!
//! Per user the bot is in one of three states: no record in the games
//! document (no game), a session in [`Phase::AwaitingResumeOrQuit`] after a
//! repeated `play`, or a session in [`Phase::InProgress`]. Platform adapters
//! translate their events into [`Incoming`] and implement [`Surface`].

use crate::{
  content::{self, Control, TRANSPORTS},
  engine::{self, Outcome},
  error::SurfaceError,
  model::{GameSession, MessageLink, Phase, UserId, UserStats},
  prelude::*,
  state::AppState,
  view::{self, Reply},
};

/// The user behind a command or reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
  pub id: UserId,
  pub name: String,
  pub mention: String,
  pub bot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Hello,
  Play,
  Status,
  Record,
}

impl Command {
  /// Parses `<prefix><name> [args..]`; arguments are ignored.
  pub fn parse(text: &str, prefix: &str) -> Option<Self> {
    let rest = text.trim_start().strip_prefix(prefix)?;
    match rest.split_whitespace().next()? {
      "hello" => Some(Command::Hello),
      "play" => Some(Command::Play),
      "status" => Some(Command::Status),
      "record" => Some(Command::Record),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
  Command { actor: Actor, channel_id: u64, command: Command },
  Reaction { actor: Actor, message: MessageLink, symbol: String },
}

/// Outbound operations the dispatcher needs from a chat platform.
#[async_trait]
pub trait Surface: Send + Sync {
  async fn send(
    &self,
    channel_id: u64,
    reply: &Reply,
  ) -> Result<MessageLink, SurfaceError>;

  async fn edit(
    &self,
    message: MessageLink,
    reply: &Reply,
  ) -> Result<(), SurfaceError>;

  async fn react(
    &self,
    message: MessageLink,
    symbol: &str,
  ) -> Result<(), SurfaceError>;

  /// Removes `user`'s `symbol` reaction from `message`.
  async fn retract(
    &self,
    message: MessageLink,
    user: UserId,
    symbol: &str,
  ) -> Result<(), SurfaceError>;
}

pub async fn dispatch<S: Surface + ?Sized>(
  app: &AppState,
  surface: &S,
  incoming: Incoming,
) -> Result<()> {
  match incoming {
    Incoming::Command { actor, channel_id, command } => {
      debug!("{} invoked {command:?}", actor.name);
      match command {
        Command::Hello => hello(app, surface, &actor, channel_id).await,
        Command::Play => play(app, surface, &actor, channel_id).await,
        Command::Status => status(app, surface, &actor, channel_id).await,
        Command::Record => record(app, surface, &actor, channel_id).await,
      }
    }
    Incoming::Reaction { actor, message, symbol } => {
      reaction(app, surface, &actor, message, &symbol).await
    }
  }
}

async fn hello<S: Surface + ?Sized>(
  app: &AppState,
  surface: &S,
  actor: &Actor,
  channel_id: u64,
) -> Result<()> {
  let reply = view::greeting(&actor.mention, &app.config.prefix);
  surface.send(channel_id, &reply).await?;
  Ok(())
}

async fn play<S: Surface + ?Sized>(
  app: &AppState,
  surface: &S,
  actor: &Actor,
  channel_id: u64,
) -> Result<()> {
  // No snapshot is held while talking to the platform; the decision is
  // re-checked once the prompt exists.
  let playing = app.store.games().await?.contains_key(&actor.id);

  if playing {
    let prompt = view::already_playing(&actor.mention);
    let link = surface.send(channel_id, &prompt).await?;
    for symbol in content::resume_controls() {
      surface.react(link, symbol).await?;
    }

    let mut games = app.store.games().await?;
    match games.get_mut(&actor.id) {
      Some(session) => {
        session.rebind(link, Phase::AwaitingResumeOrQuit);
        games.commit().await?;
        info!("{} asked to play with a game in progress", actor.name);
      }
      None => warn!("Game of {} ended before its resume prompt", actor.name),
    }
    return Ok(());
  }

  let scenario = app.with_rng(|rng| engine::pick_scenario(rng));
  let reply = view::game_started(&actor.mention, scenario);
  let link = surface.send(channel_id, &reply).await?;
  for symbol in content::game_controls() {
    surface.react(link, symbol).await?;
  }

  let mut games = app.store.games().await?;
  if games.contains_key(&actor.id) {
    warn!("{} started two games at once, keeping the first", actor.name);
    return Ok(());
  }
  games.insert(actor.id, GameSession::new(&actor.name, scenario, link));

  let mut stats = app.store.stats().await?;
  stats.entry(actor.id).or_default();

  games.commit().await?;
  stats.commit().await?;

  info!("{} started a game: {}", actor.name, scenario.description);
  Ok(())
}

async fn reaction<S: Surface + ?Sized>(
  app: &AppState,
  surface: &S,
  actor: &Actor,
  message: MessageLink,
  symbol: &str,
) -> Result<()> {
  if actor.bot {
    return Ok(());
  }

  let mut games = app.store.games().await?;

  let Some(session) = games.get_mut(&actor.id) else {
    return Ok(());
  };
  if session.message.message_id != message.message_id {
    return Ok(());
  }
  let Some(control) = Control::from_symbol(symbol) else {
    return Ok(());
  };

  match (control, session.phase) {
    (Control::Quit, _) => {
      games.remove(&actor.id);
      games.commit().await?;

      let reply = view::game_quit(&actor.mention, &app.config.prefix);
      surface.edit(message, &reply).await?;
      info!("{} quit their game", actor.name);
    }
    (Control::Resume, Phase::AwaitingResumeOrQuit) => {
      session.phase = Phase::InProgress;
      let reply = view::game_resumed(&actor.mention, session);
      games.commit().await?;

      surface.edit(message, &reply).await?;
      for transport in &TRANSPORTS {
        surface.react(message, transport.symbol).await?;
      }
    }
    (Control::Travel(transport), Phase::InProgress) => {
      let chance = app.config.event_chance;
      let turn =
        app.with_rng(|rng| engine::play(session, transport, rng, chance));
      let session = session.clone();

      let mut totals = UserStats::default();
      if turn.outcome.is_terminal() {
        games.remove(&actor.id);

        let mut stats = app.store.stats().await?;
        let entry = stats.entry(actor.id).or_default();
        match turn.outcome {
          Outcome::Won => entry.wins += 1,
          Outcome::Lost(_) => entry.losses += 1,
          Outcome::Continue => {}
        }
        totals = *entry;

        games.commit().await?;
        stats.commit().await?;
        info!("{} finished a game: {:?}", actor.name, turn.outcome);
      } else {
        games.commit().await?;
      }

      let reply = view::move_made(&actor.mention, &turn, &session, &totals);
      surface.edit(message, &reply).await?;
    }
    (control, phase) => {
      debug!("Ignoring {control:?} from {} while {phase:?}", actor.name);
      return Ok(());
    }
  }

  retract(surface, message, actor, symbol).await;
  Ok(())
}

/// Clears the player's reaction so the same symbol can be pressed again.
/// Failures are logged and never abort the handler.
async fn retract<S: Surface + ?Sized>(
  surface: &S,
  message: MessageLink,
  actor: &Actor,
  symbol: &str,
) {
  match surface.retract(message, actor.id, symbol).await {
    Ok(()) => {}
    Err(SurfaceError::RateLimited) => {
      warn!("Rate limited when removing reaction for {}. Skipping.", actor.name)
    }
    Err(err) => error!("Failed to remove reaction: {err}"),
  }
}

/// Stats are created on first query and persisted right away.
async fn stats_of(app: &AppState, user: UserId) -> Result<UserStats> {
  let mut stats = app.store.stats().await?;

  if let Some(existing) = stats.get(&user) {
    return Ok(*existing);
  }

  stats.insert(user, UserStats::default());
  stats.commit().await?;
  Ok(UserStats::default())
}

async fn status<S: Surface + ?Sized>(
  app: &AppState,
  surface: &S,
  actor: &Actor,
  channel_id: u64,
) -> Result<()> {
  let session = app.store.games().await?.get(&actor.id).cloned();
  let stats = stats_of(app, actor.id).await?;

  let reply = view::status(&actor.mention, session.as_ref(), &stats);
  surface.send(channel_id, &reply).await?;
  Ok(())
}

async fn record<S: Surface + ?Sized>(
  app: &AppState,
  surface: &S,
  actor: &Actor,
  channel_id: u64,
) -> Result<()> {
  let stats = stats_of(app, actor.id).await?;

  surface.send(channel_id, &view::record(&actor.mention, &stats)).await?;
  Ok(())
}
