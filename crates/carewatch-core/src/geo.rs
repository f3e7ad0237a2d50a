//! Coordinates and the small amount of geodesy the map view needs.
//!
//! Distances use the haversine great-circle formula on a spherical Earth.
//! Region fitting uses a flat-Earth approximation, which is accurate to well
//! under a percent at the few-hundred-meter scale of a safe zone.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Length of one degree of latitude in the flat-Earth approximation.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Markers closer than this are treated as overlapping on screen.
pub const CLOSE_THRESHOLD_M: f64 = 40.0;

/// Where the map sits before anything is known.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
  lat: 13.8900,
  lng: 100.5993,
};

const TILE_SIZE_PX: f64 = 256.0;
const PROVIDER_MAX_ZOOM: f64 = 21.0;

// ─── Coordinate ──────────────────────────────────────────────────────────────

/// A WGS-84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
  pub lat: f64,
  pub lng: f64,
}

impl Coordinate {
  pub const fn new(lat: f64, lng: f64) -> Self { Self { lat, lng } }

  /// Construct a coordinate from untrusted input, rejecting NaN/inf and
  /// out-of-range components.
  pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
    if !lat.is_finite() || !lng.is_finite() {
      return Err(Error::NonFiniteCoordinate);
    }
    if !(-90.0..=90.0).contains(&lat) {
      return Err(Error::LatitudeOutOfRange(lat));
    }
    if !(-180.0..=180.0).contains(&lng) {
      return Err(Error::LongitudeOutOfRange(lng));
    }
    Ok(Self { lat, lng })
  }

  /// The point `north_m` meters north and `east_m` meters east of `self`,
  /// using the same flat-Earth deltas as region fitting.
  pub fn offset_m(&self, north_m: f64, east_m: f64) -> Self {
    Self {
      lat: self.lat + lat_delta(north_m),
      lng: self.lng + lng_delta(east_m, self.lat),
    }
  }
}

/// `"lat, lng"` to six decimals, or a placeholder when the point is unknown.
pub fn format_coord(point: Option<Coordinate>) -> String {
  match point {
    Some(p) => format!("{:.6}, {:.6}", p.lat, p.lng),
    None => "No coordinate yet".to_owned(),
  }
}

// ─── Distance ────────────────────────────────────────────────────────────────

/// Great-circle distance between two points in meters.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
  let d_lat = (b.lat - a.lat).to_radians();
  let d_lng = (b.lng - a.lng).to_radians();
  let lat1 = a.lat.to_radians();
  let lat2 = b.lat.to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
  2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Whether two markers are close enough that their labels would collide.
pub fn markers_close(a: Coordinate, b: Coordinate, threshold_m: f64) -> bool {
  haversine_m(a, b) < threshold_m
}

/// Latitude span, in degrees, of `meters` along a meridian.
pub fn lat_delta(meters: f64) -> f64 { meters / METERS_PER_DEGREE }

/// Longitude span, in degrees, of `meters` along the parallel at `lat`.
pub fn lng_delta(meters: f64, lat: f64) -> f64 {
  let cos = lat.to_radians().cos();
  // Near the poles a meter spans the whole globe.
  if cos.abs() < 1e-9 {
    return 360.0;
  }
  meters / (METERS_PER_DEGREE * cos)
}

// ─── Bounds ──────────────────────────────────────────────────────────────────

/// An axis-aligned latitude/longitude box. Does not handle the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
  pub south: f64,
  pub west:  f64,
  pub north: f64,
  pub east:  f64,
}

impl Bounds {
  /// A degenerate box around a single point.
  pub fn around(point: Coordinate) -> Self {
    Self {
      south: point.lat,
      west:  point.lng,
      north: point.lat,
      east:  point.lng,
    }
  }

  /// The smallest box covering every point, or `None` for an empty input.
  pub fn covering<I>(points: I) -> Option<Self>
  where
    I: IntoIterator<Item = Coordinate>,
  {
    let mut iter = points.into_iter();
    let mut bounds = Self::around(iter.next()?);
    for p in iter {
      bounds.extend(p);
    }
    Some(bounds)
  }

  pub fn extend(&mut self, p: Coordinate) {
    self.south = self.south.min(p.lat);
    self.north = self.north.max(p.lat);
    self.west = self.west.min(p.lng);
    self.east = self.east.max(p.lng);
  }

  /// Grow the box to cover a circle of `radius_m` around `center`.
  pub fn include_radius(&mut self, center: Coordinate, radius_m: f64) {
    let d_lat = lat_delta(radius_m);
    let d_lng = lng_delta(radius_m, center.lat);
    self.extend(Coordinate::new(center.lat - d_lat, center.lng - d_lng));
    self.extend(Coordinate::new(center.lat + d_lat, center.lng + d_lng));
  }

  pub fn contains(&self, p: Coordinate) -> bool {
    (self.south..=self.north).contains(&p.lat)
      && (self.west..=self.east).contains(&p.lng)
  }

  pub fn center(&self) -> Coordinate {
    Coordinate::new(
      (self.south + self.north) / 2.0,
      (self.west + self.east) / 2.0,
    )
  }
}

// ─── Zoom fitting ────────────────────────────────────────────────────────────

/// Pixel dimensions of the map surface and the zoom range it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSize {
  pub width_px:   f64,
  pub height_px:  f64,
  /// Kept clear on every side when fitting bounds.
  pub padding_px: f64,
  pub min_zoom:   f64,
  pub max_zoom:   f64,
}

impl Default for ViewportSize {
  fn default() -> Self {
    Self {
      width_px:   390.0,
      height_px:  844.0,
      padding_px: 60.0,
      min_zoom:   13.0,
      max_zoom:   16.0,
    }
  }
}

/// Mercator-projected y of a latitude, in radians, clamped to the projection.
fn mercator_y(lat: f64) -> f64 {
  let sin = lat.to_radians().sin();
  let rad_x2 = ((1.0 + sin) / (1.0 - sin)).ln() / 2.0;
  rad_x2.clamp(-PI, PI) / 2.0
}

/// The largest whole zoom level at which `bounds` fits inside the padded
/// surface, clamped to `[min_zoom, max_zoom]`.
pub fn fit_zoom(bounds: &Bounds, size: &ViewportSize) -> f64 {
  let usable_w = (size.width_px - 2.0 * size.padding_px).max(1.0);
  let usable_h = (size.height_px - 2.0 * size.padding_px).max(1.0);

  let lat_fraction = (mercator_y(bounds.north) - mercator_y(bounds.south)) / PI;
  let lng_fraction = (bounds.east - bounds.west) / 360.0;

  let zoom_for = |px: f64, fraction: f64| {
    if fraction <= 0.0 {
      PROVIDER_MAX_ZOOM
    } else {
      (px / TILE_SIZE_PX / fraction).log2()
    }
  };

  let zoom = zoom_for(usable_h, lat_fraction)
    .min(zoom_for(usable_w, lng_fraction))
    .min(PROVIDER_MAX_ZOOM)
    .floor();
  zoom.clamp(size.min_zoom, size.max_zoom)
}

/// Where the camera should sit so both parties and the zone are visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
  pub center: Coordinate,
  pub zoom:   f64,
  pub bounds: Bounds,
}

/// Fit the camera to `points` plus an optional zone circle.
pub fn fit_viewport(
  points: &[Coordinate],
  zone: Option<(Coordinate, f64)>,
  size: &ViewportSize,
) -> Option<Viewport> {
  let mut bounds = Bounds::covering(points.iter().copied())?;
  if let Some((center, radius_m)) = zone {
    bounds.include_radius(center, radius_m);
  }
  Some(Viewport {
    center: bounds.center(),
    zoom: fit_zoom(&bounds, size),
    bounds,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  const CAREGIVER: Coordinate = Coordinate::new(13.7563, 100.5018);
  const DEPENDENT: Coordinate = Coordinate::new(13.7600, 100.5050);

  /// Spherical law of cosines, an independent closed form of the same
  /// great-circle distance.
  fn law_of_cosines_m(a: Coordinate, b: Coordinate) -> f64 {
    let (p1, p2) = (a.lat.to_radians(), b.lat.to_radians());
    let dl = (b.lng - a.lng).to_radians();
    let c = p1.sin() * p2.sin() + p1.cos() * p2.cos() * dl.cos();
    EARTH_RADIUS_M * c.clamp(-1.0, 1.0).acos()
  }

  #[test]
  fn haversine_matches_closed_form() {
    let d = haversine_m(CAREGIVER, DEPENDENT);
    let expected = law_of_cosines_m(CAREGIVER, DEPENDENT);
    assert!((d - expected).abs() < 0.01, "{d} vs {expected}");
    assert!((d - 537.3).abs() < 0.5, "got {d}");
  }

  #[test]
  fn haversine_is_symmetric_and_zero_on_identity() {
    assert_eq!(haversine_m(CAREGIVER, CAREGIVER), 0.0);
    let ab = haversine_m(CAREGIVER, DEPENDENT);
    let ba = haversine_m(DEPENDENT, CAREGIVER);
    assert!((ab - ba).abs() < 1e-9);
  }

  #[test]
  fn markers_close_threshold() {
    assert!(!markers_close(CAREGIVER, DEPENDENT, CLOSE_THRESHOLD_M));

    // ~32 m east.
    let near = Coordinate::new(13.7563, 100.5021);
    assert!(markers_close(CAREGIVER, near, CLOSE_THRESHOLD_M));

    // ~44.5 m north.
    let just_out = Coordinate::new(13.7567, 100.5018);
    assert!(haversine_m(CAREGIVER, just_out) >= CLOSE_THRESHOLD_M);
    assert!(!markers_close(CAREGIVER, just_out, CLOSE_THRESHOLD_M));
  }

  #[test]
  fn try_new_rejects_bad_input() {
    assert!(Coordinate::try_new(13.0, 100.0).is_ok());
    assert!(matches!(
      Coordinate::try_new(91.0, 0.0),
      Err(Error::LatitudeOutOfRange(_))
    ));
    assert!(matches!(
      Coordinate::try_new(0.0, -181.0),
      Err(Error::LongitudeOutOfRange(_))
    ));
    assert!(matches!(
      Coordinate::try_new(f64::NAN, 0.0),
      Err(Error::NonFiniteCoordinate)
    ));
  }

  #[test]
  fn format_coord_six_decimals() {
    assert_eq!(format_coord(Some(CAREGIVER)), "13.756300, 100.501800");
    assert_eq!(format_coord(None), "No coordinate yet");
  }

  #[test]
  fn radius_expansion_covers_point_north_east() {
    let center = Coordinate::new(13.7563, 100.5018);
    let radius = 200.0;
    let mut bounds = Bounds::around(center);
    bounds.include_radius(center, radius);

    // The true point 200 m north and 200 m east on the sphere. The flat-Earth
    // degree is slightly longer than the spherical one, so allow the
    // approximation's relative error on the delta.
    let deg_m = EARTH_RADIUS_M * PI / 180.0;
    let true_north = center.lat + radius / deg_m;
    let true_east = center.lng + radius / (deg_m * center.lat.to_radians().cos());
    let tol_lat = 0.01 * lat_delta(radius);
    let tol_lng = 0.01 * lng_delta(radius, center.lat);

    assert!(bounds.north + tol_lat >= true_north);
    assert!(bounds.east + tol_lng >= true_east);
    assert!(bounds.contains(center.offset_m(radius, radius)));
    assert!(bounds.contains(center.offset_m(-radius, -radius)));
  }

  #[test]
  fn covering_empty_is_none() {
    assert!(Bounds::covering(Vec::<Coordinate>::new()).is_none());
  }

  #[test]
  fn fit_zoom_clamps_to_range() {
    let size = ViewportSize::default();

    // A single point would zoom all the way in.
    let tight = Bounds::around(CAREGIVER);
    assert_eq!(fit_zoom(&tight, &size), 16.0);

    // A whole province would zoom far out.
    let wide = Bounds { south: 13.0, west: 100.0, north: 15.0, east: 102.0 };
    assert_eq!(fit_zoom(&wide, &size), 13.0);
  }

  #[test]
  fn fit_viewport_includes_zone() {
    let size = ViewportSize::default();
    let vp = fit_viewport(
      &[CAREGIVER, DEPENDENT],
      Some((CAREGIVER, 200.0)),
      &size,
    )
    .unwrap();
    assert!(vp.bounds.contains(CAREGIVER));
    assert!(vp.bounds.contains(DEPENDENT));
    assert!(vp.bounds.contains(CAREGIVER.offset_m(-200.0, -200.0)));
    assert!((13.0..=16.0).contains(&vp.zoom));
    assert!(vp.bounds.contains(vp.center));
  }
}
