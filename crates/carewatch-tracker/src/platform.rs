//! The host platform: the device's location sensor and the map surface.
//!
//! Both are object-safe so a view can hold them as `Arc<dyn _>`.

use std::time::Duration;

use carewatch_core::{geo::Coordinate, scene::MapScene};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

// ─── Location sensor ─────────────────────────────────────────────────────────

/// Options for a continuous position subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
  pub high_accuracy:  bool,
  /// Oldest cached reading the sensor may hand back.
  pub maximum_age_ms: u64,
  /// How long to wait for the first fix before reporting a timeout.
  pub timeout_ms:     u64,
}

impl Default for WatchOptions {
  fn default() -> Self {
    Self {
      high_accuracy:  true,
      maximum_age_ms: 1_000,
      timeout_ms:     5_000,
    }
  }
}

impl WatchOptions {
  pub fn maximum_age(&self) -> Duration {
    Duration::from_millis(self.maximum_age_ms)
  }

  pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorError {
  #[error("location permission denied")]
  PermissionDenied,
  #[error("position unavailable")]
  Unavailable,
  #[error("timed out waiting for a position fix")]
  Timeout,
}

pub type Reading = Result<Coordinate, SensorError>;

/// The receiving end of a position subscription. Dropping it cancels the
/// subscription.
pub type PositionWatch = mpsc::Receiver<Reading>;

/// A continuous source of the device's own position.
pub trait PositionSensor: Send + Sync {
  /// Start a subscription. The sensor must stop delivering once the returned
  /// receiver is dropped.
  fn watch_position(&self, options: WatchOptions) -> PositionWatch;
}

// ─── Map surface ─────────────────────────────────────────────────────────────

/// Somewhere a [`MapScene`] can be drawn.
pub trait MapSurface: Send + Sync {
  fn draw(&self, scene: MapScene);
}
