//! Route computation with a walking fallback, and scene assembly.

use std::sync::Arc;

use carewatch_core::{
  geo::{Coordinate, DEFAULT_CENTER, fit_viewport, format_coord, markers_close},
  nav::{NavLinkTarget, place_labels},
  route::{Route, RouteRequest, RouteSummary, TravelMode},
  scene::{
    CAREGIVER_COLOR, Circle, CoordinatePanel, DEPENDENT_COLOR,
    INNER_RING_COLOR, MapScene, Marker, OUTER_RING_COLOR, Party, Polyline,
  },
  service::DirectionsService,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
  config::{RouteFailurePolicy, TrackerConfig},
  platform::MapSurface,
  state::{ViewState, ViewStore},
};

pub const CAREGIVER_LABEL: &str = "Caregiver";
pub const DEPENDENT_LABEL: &str = "Dependent";

const ROUTE_WEIGHT: u32 = 7;
const ROUTE_OPACITY: f64 = 0.95;
const TRAIL_WEIGHT: u32 = 4;
const TRAIL_OPACITY: f64 = 0.55;
const INNER_RING_FILL: f64 = 0.2;
const OUTER_RING_FILL: f64 = 0.1;

// ─── Route computation ───────────────────────────────────────────────────────

/// Try each mode in order and return the first route found.
pub async fn compute_route<R>(
  directions: &R,
  origin: Coordinate,
  destination: Coordinate,
) -> Option<Route>
where
  R: DirectionsService,
{
  for mode in [TravelMode::Driving, TravelMode::Walking] {
    let request = RouteRequest {
      origin,
      destination,
      mode,
    };
    match directions.route(request).await {
      Ok(Some(route)) => return Some(route),
      Ok(None) => debug!(mode = mode.as_str(), "no route for mode"),
      Err(e) => warn!(mode = mode.as_str(), error = %e, "directions request failed"),
    }
  }
  None
}

/// Fold a computation result into `state` according to `policy`.
pub fn apply_route(
  state: &mut ViewState,
  route: Option<Route>,
  policy: RouteFailurePolicy,
) -> bool {
  match (route, policy) {
    (Some(route), _) => {
      state.summary = RouteSummary::from_route(&route);
      state.route = Some(route);
      true
    }
    (None, RouteFailurePolicy::ShowNoRoute) => {
      state.route = None;
      state.summary = RouteSummary::no_route();
      true
    }
    (None, RouteFailurePolicy::KeepStale) => false,
  }
}

/// Recompute the route each time the pair of endpoints changes, until the
/// task is aborted.
pub async fn follow_route<R>(
  directions: Arc<R>,
  policy: RouteFailurePolicy,
  store: ViewStore,
) where
  R: DirectionsService + 'static,
{
  let mut rx = store.subscribe();
  let mut last = None;
  loop {
    let endpoints = rx.borrow_and_update().endpoints();
    if let Some((origin, destination)) = endpoints
      && last != endpoints
    {
      last = endpoints;
      let route = compute_route(&*directions, origin, destination).await;
      if route.is_none() {
        info!("no driving or walking route between caregiver and dependent");
      }
      store.update(|s| apply_route(s, route, policy));
    }
    if rx.changed().await.is_err() {
      break;
    }
  }
}

// ─── Scene ───────────────────────────────────────────────────────────────────

/// Lay out one frame of the map from `state`.
pub fn build_scene(state: &ViewState, config: &TrackerConfig) -> MapScene {
  let close = state
    .endpoints()
    .is_some_and(|(c, d)| markers_close(c, d, config.close_threshold_m));

  let mut markers = Vec::with_capacity(2);
  if let Some(p) = state.dependent {
    markers.push(Marker {
      party:    Party::Dependent,
      position: p,
      color:    DEPENDENT_COLOR.to_owned(),
      label:    DEPENDENT_LABEL.to_owned(),
    });
  }
  if let Some(p) = state.caregiver {
    markers.push(Marker {
      party:    Party::Caregiver,
      position: p,
      color:    CAREGIVER_COLOR.to_owned(),
      label:    CAREGIVER_LABEL.to_owned(),
    });
  }

  let circles = state
    .safe_zone
    .map(|z| {
      vec![
        Circle {
          center:       z.center,
          radius_m:     z.inner_radius_m,
          color:        INNER_RING_COLOR.to_owned(),
          fill_opacity: INNER_RING_FILL,
        },
        Circle {
          center:       z.center,
          radius_m:     z.outer_radius_m,
          color:        OUTER_RING_COLOR.to_owned(),
          fill_opacity: OUTER_RING_FILL,
        },
      ]
    })
    .unwrap_or_default();

  let trail = (state.trail.len() > 1).then(|| Polyline {
    path:    state.trail.to_vec(),
    color:   DEPENDENT_COLOR.to_owned(),
    opacity: TRAIL_OPACITY,
    weight:  TRAIL_WEIGHT,
  });

  let route_line = state.route.as_ref().map(|r| Polyline {
    path:    r.polyline.clone(),
    color:   CAREGIVER_COLOR.to_owned(),
    opacity: ROUTE_OPACITY,
    weight:  ROUTE_WEIGHT,
  });

  let viewport = state.endpoints().and_then(|(c, d)| {
    let zone = state.safe_zone.map(|z| (z.center, z.fit_radius_m()));
    fit_viewport(&[c, d], zone, &config.viewport)
  });

  MapScene {
    default_center: DEFAULT_CENTER,
    markers,
    circles,
    trail,
    route: state.route.clone(),
    route_line,
    viewport,
    labels: place_labels(close, config.label_width_px, config.label_height_px),
    markers_close: close,
    summary: state.summary.clone(),
    coordinates: CoordinatePanel {
      caregiver: format_coord(state.caregiver),
      dependent: format_coord(state.dependent),
    },
    nav_link: state.dependent.map(|d| NavLinkTarget::new(d).deep_link()),
    role: state.role.clone(),
  }
}

/// Redraw `surface` on every state change, until the task is aborted.
pub async fn render(
  mut rx: watch::Receiver<ViewState>,
  surface: Arc<dyn MapSurface>,
  config: Arc<TrackerConfig>,
) {
  loop {
    let scene = build_scene(&rx.borrow_and_update(), &config);
    surface.draw(scene);
    if rx.changed().await.is_err() {
      break;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use carewatch_core::{context::SafeZone, route::NO_ROUTE_INSTRUCTION};

  use crate::testing::{ScriptedDirections, sample_route};

  const ORIGIN: Coordinate = Coordinate::new(13.7563, 100.5018);
  const DEST: Coordinate = Coordinate::new(13.7600, 100.5050);

  #[tokio::test]
  async fn driving_route_used_when_available() {
    let dirs = ScriptedDirections::new()
      .found(TravelMode::Driving, sample_route(TravelMode::Driving, "Go <b>north</b>"));
    let route = compute_route(&dirs, ORIGIN, DEST).await.unwrap();
    assert_eq!(route.mode, TravelMode::Driving);
    assert_eq!(dirs.calls(), vec![TravelMode::Driving]);
  }

  #[tokio::test]
  async fn walking_route_used_after_driving_failure() {
    let dirs = ScriptedDirections::new()
      .failing(TravelMode::Driving)
      .found(TravelMode::Walking, sample_route(TravelMode::Walking, "Walk <b>east</b>"));
    let route = compute_route(&dirs, ORIGIN, DEST).await.unwrap();
    assert_eq!(route.mode, TravelMode::Walking);
    assert_eq!(dirs.calls(), vec![TravelMode::Driving, TravelMode::Walking]);

    let mut state = ViewState::new(Default::default(), None);
    assert!(apply_route(&mut state, Some(route), RouteFailurePolicy::ShowNoRoute));
    assert_eq!(state.summary.instruction, "Walk east");
    assert_eq!(state.route.as_ref().map(|r| r.mode), Some(TravelMode::Walking));
  }

  #[tokio::test]
  async fn walking_tried_when_driving_has_no_result() {
    let dirs = ScriptedDirections::new()
      .not_found(TravelMode::Driving)
      .found(TravelMode::Walking, sample_route(TravelMode::Walking, "Walk"));
    let route = compute_route(&dirs, ORIGIN, DEST).await.unwrap();
    assert_eq!(route.mode, TravelMode::Walking);
  }

  #[tokio::test]
  async fn double_failure_policies() {
    let dirs = ScriptedDirections::new()
      .failing(TravelMode::Driving)
      .not_found(TravelMode::Walking);
    assert!(compute_route(&dirs, ORIGIN, DEST).await.is_none());

    let previous = sample_route(TravelMode::Driving, "Old");

    let mut shown = ViewState::new(Default::default(), None);
    apply_route(&mut shown, Some(previous.clone()), RouteFailurePolicy::ShowNoRoute);
    assert!(apply_route(&mut shown, None, RouteFailurePolicy::ShowNoRoute));
    assert!(shown.route.is_none());
    assert_eq!(shown.summary.instruction, NO_ROUTE_INSTRUCTION);

    let mut stale = ViewState::new(Default::default(), None);
    apply_route(&mut stale, Some(previous.clone()), RouteFailurePolicy::KeepStale);
    assert!(!apply_route(&mut stale, None, RouteFailurePolicy::KeepStale));
    assert_eq!(stale.route, Some(previous));
    assert_eq!(stale.summary.instruction, "Old");
  }

  #[test]
  fn scene_for_empty_state() {
    let state = ViewState::new(Default::default(), Some("caregiver".into()));
    let scene = build_scene(&state, &TrackerConfig::default());
    assert!(scene.markers.is_empty());
    assert!(scene.circles.is_empty());
    assert!(scene.trail.is_none());
    assert!(scene.viewport.is_none());
    assert!(scene.nav_link.is_none());
    assert!(!scene.markers_close);
    assert_eq!(scene.default_center, DEFAULT_CENTER);
    assert_eq!(scene.coordinates.dependent, "No coordinate yet");
    assert_eq!(scene.role.as_deref(), Some("caregiver"));
  }

  #[test]
  fn scene_with_both_parties_and_zone() {
    let mut state = ViewState::new(Default::default(), None);
    state.safe_zone = Some(SafeZone::new(ORIGIN, 100.0, 200.0, 9).unwrap());
    state.caregiver = Some(ORIGIN);
    state.apply_dependent(1, DEST);
    state.apply_dependent(2, Coordinate::new(13.7601, 100.5050));
    state.route = Some(sample_route(TravelMode::Driving, "Go"));

    let scene = build_scene(&state, &TrackerConfig::default());
    assert_eq!(scene.markers.len(), 2);
    assert_eq!(scene.marker(Party::Caregiver).unwrap().position, ORIGIN);
    assert_eq!(scene.circles.len(), 2);
    assert_eq!(scene.circles[0].radius_m, 100.0);
    assert_eq!(scene.circles[1].radius_m, 200.0);
    assert_eq!(scene.trail.as_ref().unwrap().path.len(), 2);
    assert!(scene.route_line.is_some());
    assert!(!scene.markers_close);
    let vp = scene.viewport.unwrap();
    assert!(vp.bounds.contains(ORIGIN.offset_m(200.0, 200.0)));
    assert!((13.0..=16.0).contains(&vp.zoom));
    assert!(scene.nav_link.unwrap().contains("destination=13.7601%2C100.505"));
  }

  #[test]
  fn close_markers_move_labels() {
    let mut state = ViewState::new(Default::default(), None);
    state.caregiver = Some(ORIGIN);
    state.apply_dependent(1, Coordinate::new(13.7563, 100.5021));
    let cfg = TrackerConfig::default();
    let scene = build_scene(&state, &cfg);
    assert!(scene.markers_close);
    assert_eq!(scene.labels, place_labels(true, cfg.label_width_px, cfg.label_height_px));
    // A single trail point draws no line.
    assert!(scene.trail.is_none());
  }
}
