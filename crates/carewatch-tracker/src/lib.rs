//! The live tracking view.
//!
//! A [`LiveTrackingView`] resolves who is watching whom from an access token,
//! polls the dependent's position, follows the caregiver's device position,
//! and keeps a road route between the two up to date. Every external system
//! is injected: the backend and routing provider through the traits in
//! [`carewatch_core::service`], the device sensor and map surface through
//! [`platform`].
//!
//! All state lives in a [`tokio::sync::watch`] channel of [`ViewState`];
//! each background activity writes through a [`Scope`] guard so nothing
//! lands after the view is torn down.

pub mod config;
pub mod error;
pub mod platform;
pub mod poller;
pub mod presenter;
pub mod resolver;
pub mod scope;
pub mod state;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{RouteFailurePolicy, TrackerConfig};
pub use error::{Error, Result};
pub use scope::Scope;
pub use state::ViewState;
pub use view::{LiveTrackingView, Services};
