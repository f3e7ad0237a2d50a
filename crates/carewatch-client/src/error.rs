//! Error type for `carewatch-client`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{endpoint} returned {status}")]
  Status {
    endpoint: &'static str,
    status:   reqwest::StatusCode,
  },

  #[error("unexpected {endpoint} payload: {message}")]
  Decode {
    endpoint: &'static str,
    message:  String,
  },

  #[error("invalid record: {0}")]
  Record(#[from] carewatch_core::Error),

  #[error("directions service answered {status}: {message}")]
  Directions { status: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
