//! Error types for `carewatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("latitude {0} is outside [-90, 90]")]
  LatitudeOutOfRange(f64),

  #[error("longitude {0} is outside [-180, 180]")]
  LongitudeOutOfRange(f64),

  #[error("coordinate component is not a finite number")]
  NonFiniteCoordinate,

  #[error("radius must be a non-negative finite number of meters, got {0}")]
  InvalidRadius(f64),

  #[error("trail capacity must be at least 1")]
  ZeroTrailCapacity,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
