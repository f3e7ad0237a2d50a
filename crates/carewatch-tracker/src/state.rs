//! The mutable state of one tracking view and the guarded handle through
//! which background tasks write it.

use std::sync::Arc;

use carewatch_core::{
  context::{IdentityContext, SafeZone},
  geo::Coordinate,
  route::{Route, RouteSummary},
  trail::Trail,
};
use tokio::sync::watch;

use crate::scope::Scope;

/// Everything the view knows right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
  /// Zero-valued until the resolver succeeds.
  pub context:   IdentityContext,
  pub safe_zone: Option<SafeZone>,
  pub caregiver: Option<Coordinate>,
  pub dependent: Option<Coordinate>,
  pub trail:     Trail,
  /// The route currently drawn, if any.
  pub route:     Option<Route>,
  pub summary:   RouteSummary,
  pub role:      Option<String>,
  /// Sequence number of the location response that set `dependent`.
  pub(crate) dependent_seq: u64,
}

impl ViewState {
  pub fn new(trail: Trail, role: Option<String>) -> Self {
    Self {
      context: IdentityContext::default(),
      safe_zone: None,
      caregiver: None,
      dependent: None,
      trail,
      route: None,
      summary: RouteSummary::default(),
      role,
      dependent_seq: 0,
    }
  }

  /// Both endpoints of a route, once both are known.
  pub fn endpoints(&self) -> Option<(Coordinate, Coordinate)> {
    self.caregiver.zip(self.dependent)
  }

  /// Record a location response. Responses older than the last applied one
  /// are ignored. Returns whether anything changed.
  pub fn apply_dependent(&mut self, seq: u64, point: Coordinate) -> bool {
    if seq <= self.dependent_seq {
      return false;
    }
    self.dependent_seq = seq;
    let moved = self.dependent != Some(point);
    self.dependent = Some(point);
    let grew = self.trail.push(point);
    moved || grew
  }

  /// Record a sensor reading for the caregiver.
  pub fn apply_caregiver(&mut self, point: Coordinate) -> bool {
    if self.caregiver == Some(point) {
      return false;
    }
    self.caregiver = Some(point);
    true
  }
}

/// A session's write handle onto the shared [`ViewState`] channel.
#[derive(Debug, Clone)]
pub struct ViewStore {
  tx:    Arc<watch::Sender<ViewState>>,
  scope: Scope,
}

impl ViewStore {
  pub fn new(tx: Arc<watch::Sender<ViewState>>, scope: Scope) -> Self {
    Self { tx, scope }
  }

  pub fn scope(&self) -> &Scope { &self.scope }

  pub fn subscribe(&self) -> watch::Receiver<ViewState> { self.tx.subscribe() }

  /// Apply `f` if the session is still live. `f` returns whether it changed
  /// anything; subscribers are only woken when it did.
  pub fn update(&self, f: impl FnOnce(&mut ViewState) -> bool) -> bool {
    self
      .scope
      .run(|| self.tx.send_if_modified(f))
      .unwrap_or(false)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn state() -> ViewState { ViewState::new(Trail::default(), None) }

  #[test]
  fn stale_location_response_is_ignored() {
    let mut s = state();
    let a = Coordinate::new(13.0, 100.0);
    let b = Coordinate::new(13.1, 100.1);

    assert!(s.apply_dependent(2, b));
    assert!(!s.apply_dependent(1, a));
    assert_eq!(s.dependent, Some(b));
    assert_eq!(s.trail.len(), 1);
  }

  #[test]
  fn unchanged_location_is_not_a_change() {
    let mut s = state();
    let a = Coordinate::new(13.0, 100.0);
    assert!(s.apply_dependent(1, a));
    assert!(!s.apply_dependent(2, a));
    assert_eq!(s.trail.len(), 1);
  }

  #[test]
  fn closed_scope_blocks_updates() {
    let (tx, rx) = watch::channel(state());
    let store = ViewStore::new(Arc::new(tx), Scope::new());
    let p = Coordinate::new(1.0, 2.0);

    assert!(store.update(|s| s.apply_caregiver(p)));
    store.scope().close();
    assert!(!store.update(|s| s.apply_caregiver(Coordinate::new(3.0, 4.0))));
    assert_eq!(rx.borrow().caregiver, Some(p));
  }
}
