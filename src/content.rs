//! Static game content: scenarios, transport options, random events and
//! the control symbols players react with.

#[derive(Debug, PartialEq)]
pub struct Scenario {
  pub description: &'static str,
  pub distance: i64,
  pub time: f64,
  pub money: i64,
}

#[derive(Debug, PartialEq)]
pub struct Transport {
  pub symbol: &'static str,
  pub name: &'static str,
  pub time: f64,
  pub money: i64,
  pub distance: i64,
}

#[derive(Debug, PartialEq)]
pub struct Event {
  pub description: &'static str,
  pub money: i64,
  pub time: f64,
}

pub const QUIT: &str = "❌";
pub const RESUME: &str = "✅";

const fn scenario(
  description: &'static str,
  distance: i64,
  time: f64,
  money: i64,
) -> Scenario {
  Scenario { description, distance, time, money }
}

const fn event(description: &'static str, money: i64, time: f64) -> Event {
  Event { description, money, time }
}

pub static SCENARIOS: [Scenario; 10] = [
  scenario(
    "You are late for class. Point B is 5 km away. You have $10 and 60 minutes.",
    5,
    60.0,
    10,
  ),
  scenario(
    "It's raining heavily. Point B is 3 km away. You have $5 and 30 minutes.",
    3,
    30.0,
    5,
  ),
  scenario(
    "You have an urgent meeting. Point B is 7 km away. You have $20 and 50 minutes.",
    7,
    50.0,
    20,
  ),
  scenario(
    "You're running errands. Point B is 4 km away. You have $8 and 45 minutes.",
    4,
    45.0,
    8,
  ),
  scenario(
    "You need to catch a bus. Point B is 6 km away. You have $15 and 70 minutes.",
    6,
    70.0,
    15,
  ),
  scenario(
    "You're late for work. Point B is 10 km away. You have $25 and 90 minutes.",
    10,
    90.0,
    25,
  ),
  scenario(
    "Your car broke down. Point B is 2 km away. You have $3 and 20 minutes.",
    2,
    20.0,
    3,
  ),
  scenario(
    "You are helping a friend move. Point B is 8 km away. You have $12 and 80 minutes.",
    8,
    80.0,
    12,
  ),
  scenario(
    "You forgot an important item at home. Point B is 5 km away. You have $7 and 55 minutes.",
    5,
    55.0,
    7,
  ),
  scenario(
    "You are going shopping. Point B is 6 km away. You have $30 and 70 minutes.",
    6,
    70.0,
    30,
  ),
];

pub static TRANSPORTS: [Transport; 3] = [
  Transport { symbol: "🚌", name: "bus", time: 1.5, money: 2, distance: 1 },
  Transport { symbol: "🚕", name: "taxi", time: 1.0, money: 5, distance: 1 },
  Transport { symbol: "🚶", name: "walk", time: 2.0, money: 0, distance: 1 },
];

pub static EVENTS: [Event; 15] = [
  event("You got robbed!", -3, -5.0),
  event("You found a $10 bill on the street!", 10, 0.0),
  event("A kind stranger paid your fare!", 0, -2.0),
  event("You gave charity to a homeless person.", -2, 0.0),
  event("Traffic is light. You saved 3 minutes!", 0, 3.0),
  event("Your wallet fell out of your pocket!", -5, 0.0),
  event(
    "You helped an elderly person cross the street. Lost 3 minutes.",
    0,
    -3.0,
  ),
  event("You got a free coffee from a cafe. Gained $5!", 5, 0.0),
  event("Subway is delayed! Lost 7 minutes.", 0, -7.0),
  event(
    "You ran into an old friend and chatted. Lost 5 minutes but found $2!",
    2,
    -5.0,
  ),
  event("Street performer gives you a tip. Gained $3!", 3, 0.0),
  event("You tripped and fell! Lost 2 minutes and $1 for damages.", -1, -2.0),
  event(
    "You caught a free ride with a friend. Saved $5 and 3 minutes!",
    5,
    3.0,
  ),
  event("Your bike chain broke. Lost 10 minutes fixing it.", 0, -10.0),
  event("A sudden rain shower slows you down. Lost 4 minutes.", 0, -4.0),
];

/// Strips the emoji presentation selector some clients append.
fn normalize(symbol: &str) -> &str {
  symbol.trim_end_matches('\u{FE0F}')
}

pub fn transport(symbol: &str) -> Option<&'static Transport> {
  let symbol = normalize(symbol);
  TRANSPORTS.iter().find(|t| t.symbol == symbol)
}

/// Reaction a player can use to steer their session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
  Travel(&'static Transport),
  Quit,
  Resume,
}

impl Control {
  pub fn from_symbol(symbol: &str) -> Option<Self> {
    match normalize(symbol) {
      QUIT => Some(Control::Quit),
      RESUME => Some(Control::Resume),
      other => transport(other).map(Control::Travel),
    }
  }
}

/// Symbols attached to a freshly started game message.
pub fn game_controls() -> Vec<&'static str> {
  TRANSPORTS.iter().map(|t| t.symbol).chain([QUIT]).collect()
}

pub fn resume_controls() -> Vec<&'static str> {
  vec![RESUME, QUIT]
}
