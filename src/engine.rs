//! Move resolution: pay for a transport, maybe suffer a random event, then
//! decide whether the commute is over.

use rand::{Rng, seq::SliceRandom};

use crate::{
  content::{EVENTS, Event, SCENARIOS, Scenario, Transport},
  model::GameSession,
};

/// Which resource ran out when a game is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortfall {
  Time,
  Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Continue,
  Won,
  Lost(Shortfall),
}

impl Outcome {
  pub fn is_terminal(self) -> bool {
    self != Outcome::Continue
  }
}

/// Everything that happened during one move, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
  pub transport: &'static Transport,
  pub event: Option<&'static Event>,
  pub outcome: Outcome,
}

pub fn pick_scenario<R: Rng + ?Sized>(rng: &mut R) -> &'static Scenario {
  // SCENARIOS is a non-empty static table
  SCENARIOS.choose(rng).unwrap_or(&SCENARIOS[0])
}

/// Fires with probability `chance`, then picks one event uniformly.
pub fn roll_event<R: Rng + ?Sized>(
  rng: &mut R,
  chance: f64,
) -> Option<&'static Event> {
  if rng.r#gen::<f64>() < chance { EVENTS.choose(rng) } else { None }
}

/// Win is checked before loss, so arriving with exactly zero minutes left
/// still counts as a win.
pub fn evaluate(session: &GameSession) -> Outcome {
  if session.distance_left <= 0 && session.time_left >= 0.0 {
    Outcome::Won
  } else if session.time_left <= 0.0 {
    Outcome::Lost(Shortfall::Time)
  } else if session.money_left < 0 {
    Outcome::Lost(Shortfall::Money)
  } else {
    Outcome::Continue
  }
}

pub fn apply_move(
  session: &mut GameSession,
  transport: &Transport,
  event: Option<&Event>,
) -> Outcome {
  session.time_left -= transport.time;
  session.money_left -= transport.money;
  session.distance_left -= transport.distance;

  if let Some(event) = event {
    session.time_left += event.time;
    session.money_left += event.money;
  }

  evaluate(session)
}

pub fn play<R: Rng + ?Sized>(
  session: &mut GameSession,
  transport: &'static Transport,
  rng: &mut R,
  event_chance: f64,
) -> Turn {
  let event = roll_event(rng, event_chance);
  let outcome = apply_move(session, transport, event);
  Turn { transport, event, outcome }
}
