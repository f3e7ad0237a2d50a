//! HTTP host for live tracking sessions.
//!
//! A page opened from a chatbot link creates a session with its navigation
//! parameters, feeds the browser's geolocation into it, and polls the
//! session for the scene to draw.
//!
//! | Method   | Path                      | Notes |
//! |----------|---------------------------|-------|
//! | `POST`   | `/sessions`               | Body: navigation params. `201` with `{"session_id"}` |
//! | `GET`    | `/sessions/{id}`          | Latest [`MapScene`](carewatch_core::scene::MapScene) |
//! | `PUT`    | `/sessions/{id}`          | Re-navigate with new params |
//! | `DELETE` | `/sessions/{id}`          | Tear the session down |
//! | `POST`   | `/sessions/{id}/position` | Caregiver geolocation report |
//! | `GET`    | `/sessions/{id}/navigate` | `303` to the turn-by-turn deep link |

pub mod config;
pub mod error;
pub mod handlers;
pub mod sensor;
pub mod sessions;
pub mod surface;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use carewatch_core::service::{CareDirectory, DirectionsService};
use tower_http::trace::TraceLayer;

pub use config::{ServerConfig, SessionConfig};
pub use error::ApiError;
pub use sessions::Sessions;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<D, R> {
  pub sessions: Arc<Sessions<D, R>>,
  pub config:   Arc<SessionConfig>,
}

impl<D, R> Clone for AppState<D, R> {
  fn clone(&self) -> Self {
    Self {
      sessions: Arc::clone(&self.sessions),
      config:   Arc::clone(&self.config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the session API router.
pub fn router<D, R>(state: AppState<D, R>) -> Router
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  Router::new()
    .route("/health", get(handlers::health))
    .route("/sessions", post(handlers::create::<D, R>))
    .route(
      "/sessions/{id}",
      get(handlers::scene::<D, R>)
        .put(handlers::renavigate::<D, R>)
        .delete(handlers::delete::<D, R>),
    )
    .route("/sessions/{id}/position", post(handlers::position::<D, R>))
    .route("/sessions/{id}/navigate", get(handlers::navigate::<D, R>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
