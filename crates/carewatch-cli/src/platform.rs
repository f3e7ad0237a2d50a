//! Terminal stand-ins for the device sensor and the map.

use std::sync::{Mutex, PoisonError};

use carewatch_core::{geo::Coordinate, scene::MapScene};
use carewatch_tracker::platform::{MapSurface, PositionSensor, PositionWatch, WatchOptions};
use tokio::sync::mpsc;
use tracing::{info, warn};

// ─── Sensor ──────────────────────────────────────────────────────────────────

/// Reports one fixed position, once per subscription.
#[derive(Debug, Clone, Copy)]
pub struct FixedSensor(pub Option<Coordinate>);

impl PositionSensor for FixedSensor {
  fn watch_position(&self, _options: WatchOptions) -> PositionWatch {
    let (tx, rx) = mpsc::channel(1);
    if let Some(point) = self.0 {
      let _ = tx.try_send(Ok(point));
    }
    rx
  }
}

// ─── Surface ─────────────────────────────────────────────────────────────────

/// The navigation panel as text lines.
pub fn render_panel(scene: &MapScene) -> Vec<String> {
  let mut lines = vec![
    scene.summary.instruction.clone(),
    scene.summary.subtitle(),
    format!("caregiver  {}", scene.coordinates.caregiver),
    format!("dependent  {}", scene.coordinates.dependent),
  ];
  if let Some(link) = &scene.nav_link {
    lines.push(link.clone());
  }
  lines
}

/// Prints the panel whenever its text changes.
#[derive(Debug, Default)]
pub struct PanelPrinter {
  last: Mutex<Vec<String>>,
}

impl PanelPrinter {
  pub fn new() -> Self { Self::default() }

  /// Record `scene`'s panel, returning it if it differs from the last one.
  fn changed(&self, scene: &MapScene) -> Option<Vec<String>> {
    let lines = render_panel(scene);
    let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
    if *last == lines {
      return None;
    }
    last.clone_from(&lines);
    Some(lines)
  }
}

impl MapSurface for PanelPrinter {
  fn draw(&self, scene: MapScene) {
    let Some(lines) = self.changed(&scene) else {
      return;
    };
    info!(
      instruction = %lines[0],
      markers_close = scene.markers_close,
      zoom = scene.viewport.map(|v| v.zoom),
      "panel updated"
    );
    if scene.summary.is_no_route() {
      warn!("no driving or walking route between caregiver and dependent");
    }
    println!("{}\n", lines.join("\n"));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use carewatch_tracker::{TrackerConfig, ViewState, presenter::build_scene};

  #[tokio::test]
  async fn fixed_sensor_reports_once() {
    let p = Coordinate::new(13.75, 100.5);
    let mut rx = FixedSensor(Some(p)).watch_position(WatchOptions::default());
    assert_eq!(rx.recv().await, Some(Ok(p)));
    assert_eq!(rx.recv().await, None);

    let mut rx = FixedSensor(None).watch_position(WatchOptions::default());
    assert_eq!(rx.recv().await, None);
  }

  #[test]
  fn panel_prints_only_changes() {
    let config = TrackerConfig::default();
    let mut state = ViewState::new(Default::default(), None);
    let printer = PanelPrinter::new();

    let first = printer.changed(&build_scene(&state, &config)).unwrap();
    assert_eq!(first[0], "Calculating route");
    assert_eq!(first[3], "dependent  No coordinate yet");
    assert!(printer.changed(&build_scene(&state, &config)).is_none());

    state.caregiver = Some(Coordinate::new(13.75, 100.5));
    let next = printer.changed(&build_scene(&state, &config)).unwrap();
    assert_eq!(next[2], "caregiver  13.750000, 100.500000");
  }
}
