//! Session endpoint handlers.

use axum::{
  Json,
  extract::{Path, State},
  http::{StatusCode, header},
  response::{IntoResponse, Redirect},
};
use carewatch_core::{
  context::NavParams,
  nav::NavLinkTarget,
  scene::MapScene,
  service::{CareDirectory, DirectionsService},
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  sensor::{Delivery, PositionReport},
};

pub async fn health() -> &'static str { "ok" }

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Created {
  pub session_id: Uuid,
}

/// `POST /sessions`, body: `{"auToken": "...", "idsafezone": 3, ...}`
pub async fn create<D, R>(
  State(state): State<AppState<D, R>>,
  Json(params): Json<NavParams>,
) -> Result<impl IntoResponse, ApiError>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  let session_id = state.sessions.create(params).await?;
  let location = format!("/sessions/{session_id}");
  Ok((
    StatusCode::CREATED,
    [(header::LOCATION, location)],
    Json(Created { session_id }),
  ))
}

// ─── Scene ───────────────────────────────────────────────────────────────────

/// `GET /sessions/{id}`
pub async fn scene<D, R>(
  State(state): State<AppState<D, R>>,
  Path(id): Path<Uuid>,
) -> Result<Json<MapScene>, ApiError>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  let hosted = state.sessions.get(id).await?;
  hosted
    .surface
    .wait_first(state.config.first_scene())
    .await
    .map(Json)
    .ok_or_else(|| ApiError::Unavailable("no scene drawn yet".into()))
}

#[derive(Debug, Serialize)]
pub struct Renavigated {
  pub remounted: bool,
}

/// `PUT /sessions/{id}`: same body as create. Resolving again only happens
/// when the token or safe-zone id changed.
pub async fn renavigate<D, R>(
  State(state): State<AppState<D, R>>,
  Path(id): Path<Uuid>,
  Json(params): Json<NavParams>,
) -> Result<Json<Renavigated>, ApiError>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  let hosted = state.sessions.get(id).await?;
  let remounted = hosted.navigate(params).await?;
  Ok(Json(Renavigated { remounted }))
}

/// `DELETE /sessions/{id}`
pub async fn delete<D, R>(
  State(state): State<AppState<D, R>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  state.sessions.remove(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Position feed ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Submitted {
  pub delivery: Delivery,
}

/// `POST /sessions/{id}/position`, body: `{"lat", "lng", "recorded_at"?}` or
/// `{"error": "permission_denied" | "unavailable" | "timeout"}`
pub async fn position<D, R>(
  State(state): State<AppState<D, R>>,
  Path(id): Path<Uuid>,
  Json(report): Json<PositionReport>,
) -> Result<(StatusCode, Json<Submitted>), ApiError>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  let hosted = state.sessions.get(id).await?;
  let reading = report.reading().map_err(ApiError::BadRequest)?;
  let delivery = hosted.sensor.submit(reading, &report);
  debug!(%id, ?delivery, "caregiver position report");
  Ok((StatusCode::ACCEPTED, Json(Submitted { delivery })))
}

// ─── Navigation hand-off ─────────────────────────────────────────────────────

/// `GET /sessions/{id}/navigate`: redirect to turn-by-turn navigation toward
/// the dependent's current position.
pub async fn navigate<D, R>(
  State(state): State<AppState<D, R>>,
  Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  let hosted = state.sessions.get(id).await?;
  let dependent = hosted
    .snapshot()
    .await
    .dependent
    .ok_or_else(|| ApiError::Conflict("dependent position not known yet".into()))?;
  Ok(Redirect::to(&NavLinkTarget::new(dependent).deep_link()))
}
