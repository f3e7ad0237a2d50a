//! Error type for `carewatch-tracker`.
//!
//! Only construction can fail. Once running, every failure inside a tracking
//! session degrades to stale or empty state and is logged instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid tracker configuration: {0}")]
  Config(String),

  #[error(transparent)]
  Core(#[from] carewatch_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
