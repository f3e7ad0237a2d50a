//! Traits for the external services the tracking view depends on.
//!
//! Concrete adapters live in `carewatch-client`; the tracking engine and its
//! tests depend only on these abstractions.

use std::future::Future;

use crate::{
  context::{Caregiver, Dependent, IdentityContext, SafeZone},
  geo::Coordinate,
  route::{Route, RouteRequest},
};

// ─── Backend directory ───────────────────────────────────────────────────────

/// Lookups against the care backend.
///
/// "Not found" is `Ok(None)`; `Err` is reserved for transport and decoding
/// failures. Callers treat both the same way, but logs distinguish them.
pub trait CareDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Exchange an access token for the caregiver it belongs to.
  fn caregiver_by_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<Caregiver>, Self::Error>> + Send + 'a;

  /// The dependent linked to a caregiver, keyed by the caregiver's
  /// obfuscated id (see [`IdObfuscator`]).
  fn dependent_of<'a>(
    &'a self,
    obfuscated_caregiver_id: &'a str,
  ) -> impl Future<Output = Result<Option<Dependent>, Self::Error>> + Send + 'a;

  /// The safe zone for a caregiver/dependent pair. With `zone_id` unset the
  /// backend picks the pair's default zone.
  fn safe_zone(
    &self,
    dependent_id: u64,
    caregiver_id: u64,
    zone_id: Option<u64>,
  ) -> impl Future<Output = Result<Option<SafeZone>, Self::Error>> + Send + '_;

  /// The dependent's most recently reported position.
  fn latest_location(
    &self,
    ctx: IdentityContext,
  ) -> impl Future<Output = Result<Option<Coordinate>, Self::Error>> + Send + '_;
}

/// Turns a caregiver id into the form the relationship lookup expects.
pub trait IdObfuscator: Send + Sync {
  fn obfuscate(&self, id: u64) -> String;
}

// ─── Directions ──────────────────────────────────────────────────────────────

/// A hosted routing service.
pub trait DirectionsService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Compute a route. `Ok(None)` means the provider answered but found no
  /// route for this mode.
  fn route(
    &self,
    request: RouteRequest,
  ) -> impl Future<Output = Result<Option<Route>, Self::Error>> + Send + '_;
}
