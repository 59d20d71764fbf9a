use serde::{Deserialize, Serialize};

use crate::content::Scenario;

/// Stable platform user id; documents are keyed by it.
pub type UserId = u64;

/// The message a player has to react on to drive their session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLink {
  pub message_id: u64,
  pub channel_id: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  #[default]
  InProgress,
  AwaitingResumeOrQuit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
  pub name: String,
  pub distance_left: i64,
  pub time_left: f64,
  pub money_left: i64,
  #[serde(flatten)]
  pub message: MessageLink,
  #[serde(default)]
  pub phase: Phase,
}

impl GameSession {
  pub fn new(
    name: impl Into<String>,
    scenario: &Scenario,
    message: MessageLink,
  ) -> Self {
    Self {
      name: name.into(),
      distance_left: scenario.distance,
      time_left: scenario.time,
      money_left: scenario.money,
      message,
      phase: Phase::InProgress,
    }
  }

  /// Points the session at a new prompt; progress is left untouched.
  pub fn rebind(&mut self, message: MessageLink, phase: Phase) {
    self.message = message;
    self.phase = phase;
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
  pub wins: u32,
  pub losses: u32,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::SCENARIOS;

  #[test]
  fn test_legacy_record_without_phase_is_in_progress() {
    let raw = r#"{
      "name": "alice",
      "distance_left": 3,
      "time_left": 57.5,
      "money_left": 4,
      "message_id": 10,
      "channel_id": 20
    }"#;

    let session: GameSession = json::from_str(raw).unwrap();

    assert_eq!(session.phase, Phase::InProgress);
    assert_eq!(session.message, MessageLink { message_id: 10, channel_id: 20 });
    assert_eq!(session.time_left, 57.5);
  }

  #[test]
  fn test_rebind_keeps_progress() {
    let link = MessageLink { message_id: 1, channel_id: 2 };
    let mut session = GameSession::new("bob", &SCENARIOS[0], link);
    session.distance_left = 2;

    let prompt = MessageLink { message_id: 7, channel_id: 2 };
    session.rebind(prompt, Phase::AwaitingResumeOrQuit);

    assert_eq!(session.distance_left, 2);
    assert_eq!(session.time_left, 60.0);
    assert_eq!(session.message, prompt);
    assert_eq!(session.phase, Phase::AwaitingResumeOrQuit);
  }
}
