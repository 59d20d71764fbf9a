use crate::content::{Event, QUIT, TRANSPORTS};

/// Renders minutes without a trailing `.0` for whole values.
pub fn format_minutes(minutes: f64) -> String {
  if minutes.fract() == 0.0 {
    format!("{minutes:.0}")
  } else {
    format!("{minutes:.1}")
  }
}

pub fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Cost legend shown under every game embed.
pub fn transport_footer() -> String {
  let mut parts: Vec<String> = TRANSPORTS
    .iter()
    .map(|t| {
      format!(
        "{} {} - {} min, ${}",
        t.symbol,
        capitalize(t.name),
        format_minutes(t.time),
        t.money
      )
    })
    .collect();
  parts.push(format!("{QUIT} Quit"));
  parts.join(" | ")
}

/// Human readable deltas of an event, e.g. `Time -5 min, Money -$3`.
pub fn event_effects(event: &Event) -> String {
  let mut parts = Vec::new();

  if event.time != 0.0 {
    let sign = if event.time > 0.0 { "+" } else { "-" };
    parts.push(format!("Time {sign}{} min", format_minutes(event.time.abs())));
  }
  if event.money != 0 {
    let sign = if event.money > 0 { "+" } else { "-" };
    parts.push(format!("Money {sign}${}", event.money.abs()));
  }

  parts.join(", ")
}
