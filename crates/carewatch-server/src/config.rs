//! Runtime server configuration, deserialised from `config.toml` layered
//! with `CAREWATCH_*` environment variables.

use std::time::Duration;

use carewatch_client::{ApiConfig, DirectionsConfig};
use carewatch_tracker::TrackerConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub backend:    ApiConfig,
  pub directions: DirectionsConfig,
  #[serde(default)]
  pub tracker:    TrackerConfig,
  #[serde(default)]
  pub sessions:   SessionConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  pub max_sessions:     usize,
  /// Sessions not touched for this long are torn down.
  pub idle_ttl_secs:    u64,
  pub reap_period_secs: u64,
  /// How long a scene read waits for the first frame.
  pub first_scene_ms:   u64,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      max_sessions:     256,
      idle_ttl_secs:    15 * 60,
      reap_period_secs: 60,
      first_scene_ms:   1_000,
    }
  }
}

impl SessionConfig {
  pub fn idle_ttl(&self) -> Duration { Duration::from_secs(self.idle_ttl_secs) }

  pub fn reap_period(&self) -> Duration {
    Duration::from_secs(self.reap_period_secs.max(1))
  }

  pub fn first_scene(&self) -> Duration { Duration::from_millis(self.first_scene_ms) }
}
