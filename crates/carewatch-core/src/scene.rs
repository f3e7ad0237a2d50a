//! Everything a map surface needs to draw one frame of the tracking view.
//!
//! A [`MapScene`] is a plain value: the tracking engine builds one from its
//! state and hands it to whichever surface is attached. Colours and stroke
//! weights are part of the scene so every surface draws the same picture.

use serde::{Deserialize, Serialize};

use crate::{
  geo::{Coordinate, Viewport},
  nav::LabelPlacement,
  route::{Route, RouteSummary},
};

pub const DEPENDENT_COLOR: &str = "#ef4444";
pub const CAREGIVER_COLOR: &str = "#2F6FED";
pub const INNER_RING_COLOR: &str = "#F2BE22";
pub const OUTER_RING_COLOR: &str = "#F24C3D";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
  Caregiver,
  Dependent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
  pub party:    Party,
  pub position: Coordinate,
  pub color:    String,
  pub label:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
  pub center:       Coordinate,
  pub radius_m:     f64,
  pub color:        String,
  pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
  pub path:    Vec<Coordinate>,
  pub color:   String,
  pub opacity: f64,
  pub weight:  u32,
}

/// Coordinates shown in the lower info card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatePanel {
  pub caregiver: String,
  pub dependent: String,
}

/// One frame of the tracking view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapScene {
  /// The map centre to use when `viewport` is `None`.
  pub default_center: Coordinate,
  pub markers:        Vec<Marker>,
  /// Inner ring first, then outer.
  pub circles:        Vec<Circle>,
  /// Drawn only with at least two points.
  pub trail:          Option<Polyline>,
  pub route:          Option<Route>,
  pub route_line:     Option<Polyline>,
  pub viewport:       Option<Viewport>,
  pub labels:         LabelPlacement,
  pub markers_close:  bool,
  pub summary:        RouteSummary,
  pub coordinates:    CoordinatePanel,
  /// Deep link into an external navigation app, once the dependent is known.
  pub nav_link:       Option<String>,
  /// Viewer role echoed from the navigation parameters.
  pub role:           Option<String>,
}

impl MapScene {
  pub fn marker(&self, party: Party) -> Option<&Marker> {
    self.markers.iter().find(|m| m.party == party)
  }
}
