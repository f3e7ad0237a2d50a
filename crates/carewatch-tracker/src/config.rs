//! Tunables for a tracking session.

use std::time::Duration;

use carewatch_core::{
  geo::{CLOSE_THRESHOLD_M, ViewportSize},
  trail::DEFAULT_TRAIL_CAPACITY,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, platform::WatchOptions};

/// What the panel shows when neither a driving nor a walking route exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteFailurePolicy {
  /// Clear the route and show an explicit "no route" instruction.
  #[default]
  ShowNoRoute,
  /// Leave the last successful route and summary on screen.
  KeepStale,
}

/// Runtime configuration for [`crate::LiveTrackingView`], deserialised from
/// the `[tracker]` table of the server config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
  /// Period of the dependent-location poll.
  pub poll_interval_ms:  u64,
  pub trail_capacity:    usize,
  /// Below this distance the two markers' labels are moved apart.
  pub close_threshold_m: f64,
  pub route_failure:     RouteFailurePolicy,
  pub sensor:            WatchOptions,
  pub viewport:          ViewportSize,
  pub label_width_px:    i32,
  pub label_height_px:   i32,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      poll_interval_ms:  1_000,
      trail_capacity:    DEFAULT_TRAIL_CAPACITY,
      close_threshold_m: CLOSE_THRESHOLD_M,
      route_failure:     RouteFailurePolicy::default(),
      sensor:            WatchOptions::default(),
      viewport:          ViewportSize::default(),
      label_width_px:    96,
      label_height_px:   24,
    }
  }
}

impl TrackerConfig {
  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }

  pub fn validate(&self) -> Result<()> {
    if self.poll_interval_ms == 0 {
      return Err(Error::Config("poll_interval_ms must be positive".into()));
    }
    if self.trail_capacity == 0 {
      return Err(Error::Config("trail_capacity must be positive".into()));
    }
    if !(self.close_threshold_m.is_finite() && self.close_threshold_m >= 0.0) {
      return Err(Error::Config(format!(
        "close_threshold_m must be a non-negative number, got {}",
        self.close_threshold_m
      )));
    }
    let vp = &self.viewport;
    if vp.min_zoom > vp.max_zoom {
      return Err(Error::Config(format!(
        "viewport.min_zoom {} exceeds max_zoom {}",
        vp.min_zoom, vp.max_zoom
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_page_behaviour() {
    let cfg = TrackerConfig::default();
    assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    assert_eq!(cfg.trail_capacity, 30);
    assert_eq!(cfg.close_threshold_m, 40.0);
    assert_eq!(cfg.route_failure, RouteFailurePolicy::ShowNoRoute);
    assert_eq!(cfg.sensor.maximum_age(), Duration::from_secs(1));
    assert_eq!(cfg.sensor.timeout(), Duration::from_secs(5));
    assert!(cfg.sensor.high_accuracy);
    assert!(cfg.validate().is_ok());
  }

  #[test]
  fn partial_table_fills_defaults() {
    let cfg: TrackerConfig = serde_json::from_value(serde_json::json!({
      "poll_interval_ms": 3000,
      "route_failure": "keep_stale",
    }))
    .unwrap();
    assert_eq!(cfg.poll_interval(), Duration::from_secs(3));
    assert_eq!(cfg.route_failure, RouteFailurePolicy::KeepStale);
    assert_eq!(cfg.trail_capacity, 30);
  }

  #[test]
  fn validate_rejects_zero_interval() {
    let cfg = TrackerConfig {
      poll_interval_ms: 0,
      ..TrackerConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(Error::Config(_))));
  }

  #[test]
  fn validate_rejects_inverted_zoom_range() {
    let mut cfg = TrackerConfig::default();
    cfg.viewport.min_zoom = 17.0;
    assert!(cfg.validate().is_err());
  }
}
