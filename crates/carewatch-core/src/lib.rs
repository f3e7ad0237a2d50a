//! Core types and trait definitions for carewatch.
//!
//! This crate is deliberately free of HTTP and runtime dependencies. It holds
//! the value types shared by the tracking engine, the geodesy helpers used to
//! lay out the map, and the traits through which the engine reaches the
//! backend and the routing provider.

pub mod context;
pub mod error;
pub mod geo;
pub mod nav;
pub mod route;
pub mod scene;
pub mod service;
pub mod trail;

pub use error::{Error, Result};
