//! HTTP adapters for the services a tracking view depends on.
//!
//! - [`ApiClient`] implements [`carewatch_core::service::CareDirectory`]
//!   against the care backend's JSON API.
//! - [`GoogleDirections`] implements
//!   [`carewatch_core::service::DirectionsService`] against the Directions
//!   web service.
//! - [`obfuscate`] holds the id encodings the relationship lookup accepts.

pub mod api;
pub mod directions;
pub mod error;
pub mod obfuscate;
pub mod polyline;
mod wire;

pub use api::{ApiClient, ApiConfig};
pub use directions::{DirectionsConfig, GoogleDirections};
pub use error::{Error, Result};
