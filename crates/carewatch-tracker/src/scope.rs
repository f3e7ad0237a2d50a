//! Liveness guard for state written by background tasks.
//!
//! Network calls started by a session may finish after the session has been
//! torn down. Every write goes through [`Scope::run`], which holds a read lock
//! for the duration of the write; [`Scope::close`] takes the write lock, so
//! once it returns no write is in progress and none will start.

use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone)]
pub struct Scope {
  live: Arc<RwLock<bool>>,
}

impl Default for Scope {
  fn default() -> Self { Self::new() }
}

impl Scope {
  pub fn new() -> Self {
    Self {
      live: Arc::new(RwLock::new(true)),
    }
  }

  pub fn is_live(&self) -> bool {
    *self.live.read().unwrap_or_else(PoisonError::into_inner)
  }

  /// Run `f` only if the scope is still live. Returns `None` otherwise.
  pub fn run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
    let live = self.live.read().unwrap_or_else(PoisonError::into_inner);
    if *live { Some(f()) } else { None }
  }

  /// Close the scope. Idempotent.
  pub fn close(&self) {
    *self.live.write().unwrap_or_else(PoisonError::into_inner) = false;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn run_stops_after_close() {
    let scope = Scope::new();
    assert_eq!(scope.run(|| 1), Some(1));

    let clone = scope.clone();
    clone.close();
    assert!(!scope.is_live());
    assert_eq!(scope.run(|| 2), None);

    // Closing twice is harmless.
    scope.close();
    assert!(!clone.is_live());
  }
}
