//! Routes returned by the directions provider and the summary derived from
//! them.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Shown before the first route computation finishes.
pub const CALCULATING_INSTRUCTION: &str = "Calculating route";
/// Used when the first step carries no instruction text.
pub const FALLBACK_INSTRUCTION: &str = "Head to destination";
/// Shown when neither a driving nor a walking route exists.
pub const NO_ROUTE_INSTRUCTION: &str = "No road route found";
/// Placeholder for a missing distance or duration.
pub const MISSING_TEXT: &str = "-";

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
  Driving,
  Walking,
}

impl TravelMode {
  /// The value the directions provider expects in its `mode` parameter.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Driving => "driving",
      Self::Walking => "walking",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
  pub origin:      Coordinate,
  pub destination: Coordinate,
  pub mode:        TravelMode,
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// One maneuver within a leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
  /// Provider-formatted instruction; may contain inline markup.
  pub instructions: String,
  pub distance:     Option<String>,
  pub duration:     Option<String>,
}

/// The path between two waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
  /// Human-readable total, e.g. `"1.2 km"`.
  pub distance: Option<String>,
  /// Human-readable total, e.g. `"4 mins"`.
  pub duration: Option<String>,
  pub steps:    Vec<RouteStep>,
}

/// A computed route, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
  pub mode:     TravelMode,
  pub legs:     Vec<RouteLeg>,
  /// Decoded overview path.
  pub polyline: Vec<Coordinate>,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// The three lines of the navigation panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
  pub instruction: String,
  pub distance:    String,
  pub duration:    String,
}

impl Default for RouteSummary {
  fn default() -> Self { Self::placeholder(CALCULATING_INSTRUCTION) }
}

impl RouteSummary {
  fn placeholder(instruction: &str) -> Self {
    Self {
      instruction: instruction.to_owned(),
      distance:    MISSING_TEXT.to_owned(),
      duration:    MISSING_TEXT.to_owned(),
    }
  }

  pub fn no_route() -> Self { Self::placeholder(NO_ROUTE_INSTRUCTION) }

  pub fn is_no_route(&self) -> bool { self.instruction == NO_ROUTE_INSTRUCTION }

  /// Next instruction from the first leg's first step, totals from the leg.
  pub fn from_route(route: &Route) -> Self {
    let leg = route.legs.first();
    let instruction = leg
      .and_then(|l| l.steps.first())
      .map(|s| strip_markup(&s.instructions))
      .filter(|s| !s.trim().is_empty())
      .unwrap_or_else(|| FALLBACK_INSTRUCTION.to_owned());
    let text = |f: fn(&RouteLeg) -> &Option<String>| {
      leg
        .and_then(|l| f(l).clone())
        .unwrap_or_else(|| MISSING_TEXT.to_owned())
    };
    Self {
      instruction,
      distance: text(|l| &l.distance),
      duration: text(|l| &l.duration),
    }
  }

  /// The panel sub-line, e.g. `"4 mins • 1.2 km"`.
  pub fn subtitle(&self) -> String {
    format!("{} • {}", self.duration, self.distance)
  }
}

/// Remove every `<...>` tag, keeping the text between them.
pub fn strip_markup(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut rest = html;
  while let Some(open) = rest.find('<') {
    // An unmatched `<` is text, not a tag.
    let Some(close) = rest[open + 1..].find('>') else {
      break;
    };
    // `<>` is not a tag either.
    if close == 0 {
      out.push_str(&rest[..open + 2]);
      rest = &rest[open + 2..];
      continue;
    }
    out.push_str(&rest[..open]);
    rest = &rest[open + 1 + close + 1..];
  }
  out.push_str(rest);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn step(text: &str) -> RouteStep {
    RouteStep {
      instructions: text.into(),
      distance:     None,
      duration:     None,
    }
  }

  fn route(steps: Vec<RouteStep>) -> Route {
    Route {
      mode:     TravelMode::Driving,
      legs:     vec![RouteLeg {
        distance: Some("1.2 km".into()),
        duration: Some("4 mins".into()),
        steps,
      }],
      polyline: vec![],
    }
  }

  #[test]
  fn strip_markup_removes_tags() {
    assert_eq!(
      strip_markup("Head <b>north</b> on <b>Rama IV</b><div style=\"x\">Toll road</div>"),
      "Head north on Rama IVToll road"
    );
    assert_eq!(strip_markup("no tags"), "no tags");
    assert_eq!(strip_markup("a < b"), "a < b");
    assert_eq!(strip_markup("a <> b"), "a <> b");
  }

  #[test]
  fn summary_from_first_step_of_first_leg() {
    let r = route(vec![step("Turn <b>left</b>"), step("Continue")]);
    let s = RouteSummary::from_route(&r);
    assert_eq!(s.instruction, "Turn left");
    assert_eq!(s.distance, "1.2 km");
    assert_eq!(s.duration, "4 mins");
    assert_eq!(s.subtitle(), "4 mins • 1.2 km");
  }

  #[test]
  fn summary_falls_back_when_parts_missing() {
    let s = RouteSummary::from_route(&route(vec![]));
    assert_eq!(s.instruction, FALLBACK_INSTRUCTION);

    let empty = Route {
      mode:     TravelMode::Walking,
      legs:     vec![],
      polyline: vec![],
    };
    let s = RouteSummary::from_route(&empty);
    assert_eq!(s.instruction, FALLBACK_INSTRUCTION);
    assert_eq!(s.distance, MISSING_TEXT);
    assert_eq!(s.duration, MISSING_TEXT);
  }

  #[test]
  fn placeholders() {
    assert_eq!(RouteSummary::default().instruction, CALCULATING_INSTRUCTION);
    assert!(RouteSummary::no_route().is_no_route());
    assert!(!RouteSummary::default().is_no_route());
  }
}
