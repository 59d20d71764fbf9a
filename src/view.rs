//! Platform-neutral replies and the builders for every message the bot
//! sends. The Discord adapter turns these into embeds.

use crate::{
  content::{QUIT, RESUME, Scenario},
  engine::{Outcome, Shortfall, Turn},
  model::{GameSession, UserStats},
  prelude::*,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
  Green,
  Orange,
  Red,
  Blue,
  Yellow,
}

impl Tone {
  pub fn rgb(self) -> u32 {
    match self {
      Tone::Green => 0x2ECC71,
      Tone::Orange => 0xE67E22,
      Tone::Red => 0xE74C3C,
      Tone::Blue => 0x3498DB,
      Tone::Yellow => 0xFEE75C,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
  pub name: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
  pub title: String,
  pub description: String,
  pub tone: Tone,
  pub fields: Vec<Field>,
  pub footer: Option<String>,
}

impl Embed {
  pub fn new(
    title: impl Into<String>,
    description: impl Into<String>,
    tone: Tone,
  ) -> Self {
    Self {
      title: title.into(),
      description: description.into(),
      tone,
      fields: Vec::new(),
      footer: None,
    }
  }

  pub fn field(
    mut self,
    name: impl Into<String>,
    value: impl ToString,
  ) -> Self {
    self.fields.push(Field { name: name.into(), value: value.to_string() });
    self
  }

  pub fn footer(mut self, text: impl Into<String>) -> Self {
    self.footer = Some(text.into());
    self
  }

  fn with_transports(self) -> Self {
    self.footer(utils::transport_footer())
  }
}

/// A message body: plain content, an embed, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
  pub content: Option<String>,
  pub embed: Option<Embed>,
}

impl Reply {
  pub fn text(content: impl Into<String>) -> Self {
    Self { content: Some(content.into()), embed: None }
  }

  pub fn embed(embed: Embed) -> Self {
    Self { content: None, embed: Some(embed) }
  }

  pub fn with_content(mut self, content: impl Into<String>) -> Self {
    self.content = Some(content.into());
    self
  }
}

fn progress(time: f64, money: i64, distance: i64, suffix: &str) -> String {
  format!(
    "Time{suffix}: {} min\nMoney{suffix}: ${money}\nDistance{suffix}: {distance} km",
    utils::format_minutes(time)
  )
}

fn session_progress(session: &GameSession) -> String {
  progress(
    session.time_left,
    session.money_left,
    session.distance_left,
    " left",
  )
}

fn totals(stats: &UserStats) -> String {
  format!("🏆 Total Wins: {} | ❌ Total Losses: {}", stats.wins, stats.losses)
}

pub fn greeting(mention: &str, prefix: &str) -> Reply {
  Reply::text(format!(
    "Hi {mention}! Ready for RushHour? Type `{prefix}play` to start!"
  ))
}

pub fn game_started(mention: &str, scenario: &Scenario) -> Reply {
  let embed =
    Embed::new("🚦 RushHour Game Started!", scenario.description, Tone::Green)
      .field(
        "Your Stats",
        progress(scenario.time, scenario.money, scenario.distance, ""),
      )
      .with_transports();

  Reply::embed(embed).with_content(mention)
}

pub fn already_playing(mention: &str) -> Reply {
  Reply::embed(Embed::new(
    "⚠️ Game Already In Progress",
    format!(
      "{mention}, you already have a game!\n\n\
      React {RESUME} to continue your game.\n\
      React {QUIT} to quit and start a new game."
    ),
    Tone::Orange,
  ))
}

pub fn game_quit(mention: &str, prefix: &str) -> Reply {
  Reply::embed(Embed::new(
    "❌ Game Quit",
    format!(
      "{mention} has quit the RushHour game. Type `{prefix}play` to start again."
    ),
    Tone::Red,
  ))
}

pub fn game_resumed(mention: &str, session: &GameSession) -> Reply {
  let embed = Embed::new(
    "🚦 RushHour Game Resumed!",
    format!("{mention}, your game is back on!"),
    Tone::Green,
  )
  .field("Your Stats", session_progress(session))
  .with_transports();

  Reply::embed(embed)
}

/// Result of a move. `stats` must already include the outcome of `turn`.
pub fn move_made(
  mention: &str,
  turn: &Turn,
  session: &GameSession,
  stats: &UserStats,
) -> Reply {
  let event_line = turn
    .event
    .map(|event| {
      format!(
        "\n💥 Event: {} ({})",
        event.description,
        utils::event_effects(event)
      )
    })
    .unwrap_or_default();

  let embed = match turn.outcome {
    Outcome::Won => Embed::new(
      "🎉 You Made It!",
      format!(
        "{mention}, you reached Point B on time! Game finished.{event_line}\n\n\
        ⏱ Total Time Left: {} min\n💰 Money Remaining: ${}\n{}",
        utils::format_minutes(session.time_left),
        session.money_left,
        totals(stats)
      ),
      Tone::Blue,
    ),
    Outcome::Lost(shortfall) => {
      let resource = match shortfall {
        Shortfall::Time => "time",
        Shortfall::Money => "money",
      };
      Embed::new(
        "⚠️ Game Over",
        format!(
          "{mention}, you ran out of {resource}! Game over.{event_line}\n\n\
          ⏱ Total Time Left: {} min\n💰 Money Remaining: ${}\n{}",
          utils::format_minutes(session.time_left.max(0.0)),
          session.money_left.max(0),
          totals(stats)
        ),
        Tone::Blue,
      )
    }
    Outcome::Continue => Embed::new(
      "🏃 Move Made",
      format!("{mention} chose **{}**!{event_line}", turn.transport.name),
      Tone::Blue,
    )
    .field("Your Stats", session_progress(session))
    .with_transports(),
  };

  Reply::embed(embed)
}

pub fn status(
  mention: &str,
  session: Option<&GameSession>,
  stats: &UserStats,
) -> Reply {
  let mut embed = match session {
    Some(session) => Embed::new(
      "📊 RushHour Status",
      format!("{mention}'s current stats:"),
      Tone::Yellow,
    )
    .field(
      "Time left",
      format!("{} min", utils::format_minutes(session.time_left)),
    )
    .field("Money left", format!("${}", session.money_left))
    .field("Distance left", format!("{} km", session.distance_left)),
    None => Embed::new(
      "📊 RushHour Status",
      format!("{mention}, you have no active game."),
      Tone::Yellow,
    ),
  };

  embed = embed.field("Wins", stats.wins).field("Losses", stats.losses);
  Reply::embed(embed.with_transports())
}

pub fn record(mention: &str, stats: &UserStats) -> Reply {
  Reply::embed(
    Embed::new(
      "📊 RushHour Record",
      format!("{mention}'s record:"),
      Tone::Yellow,
    )
    .field("Wins", stats.wins)
    .field("Losses", stats.losses),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    content::{EVENTS, SCENARIOS, TRANSPORTS},
    model::MessageLink,
  };

  fn session(distance: i64, time: f64, money: i64) -> GameSession {
    GameSession {
      distance_left: distance,
      time_left: time,
      money_left: money,
      ..GameSession::new(
        "erin",
        &SCENARIOS[0],
        MessageLink { message_id: 1, channel_id: 1 },
      )
    }
  }

  fn description(reply: &Reply) -> &str {
    &reply.embed.as_ref().unwrap().description
  }

  #[test]
  fn test_started_game_mentions_player_and_lists_costs() {
    let reply = game_started("<@1>", &SCENARIOS[0]);
    let embed = reply.embed.as_ref().unwrap();

    assert_eq!(reply.content.as_deref(), Some("<@1>"));
    assert_eq!(embed.fields[0].value, "Time: 60 min\nMoney: $10\nDistance: 5 km");
    assert_eq!(embed.footer, Some(utils::transport_footer()));
  }

  #[test]
  fn test_loss_clamps_negative_resources() {
    let turn = Turn {
      transport: &TRANSPORTS[1],
      event: Some(&EVENTS[5]),
      outcome: Outcome::Lost(Shortfall::Money),
    };
    let stats = UserStats { wins: 2, losses: 1 };

    let reply = move_made("<@1>", &turn, &session(3, 20.0, -7), &stats);
    let text = description(&reply);

    assert!(text.contains("you ran out of money!"));
    assert!(text.contains("💥 Event: Your wallet fell out of your pocket! (Money -$5)"));
    assert!(text.contains("💰 Money Remaining: $0"));
    assert!(text.contains("🏆 Total Wins: 2 | ❌ Total Losses: 1"));
  }

  #[test]
  fn test_continuing_move_shows_progress() {
    let turn =
      Turn { transport: &TRANSPORTS[0], event: None, outcome: Outcome::Continue };

    let reply =
      move_made("<@1>", &turn, &session(4, 58.5, 8), &UserStats::default());
    let embed = reply.embed.unwrap();

    assert_eq!(embed.title, "🏃 Move Made");
    assert_eq!(embed.description, "<@1> chose **bus**!");
    assert_eq!(
      embed.fields[0].value,
      "Time left: 58.5 min\nMoney left: $8\nDistance left: 4 km"
    );
  }

  #[test]
  fn test_status_without_game_still_shows_record() {
    let reply = status("<@1>", None, &UserStats { wins: 0, losses: 4 });
    let embed = reply.embed.unwrap();

    assert!(embed.description.contains("no active game"));
    let names: Vec<_> = embed.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Wins", "Losses"]);
    assert_eq!(embed.fields[1].value, "4");
  }
}
