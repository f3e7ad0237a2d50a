//! Backend payload shapes.
//!
//! Every endpoint wraps its record in `{"data": ...}` and the record's numbers
//! may arrive either as JSON numbers or as numeric strings.

use carewatch_core::{
  context::{Caregiver, Dependent, SafeZone},
  geo::Coordinate,
};
use serde::Deserialize;

use crate::{Error, Result};

/// `{"data": T}`, where a `null` or missing `data` means "not found".
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
  pub data: Option<T>,
}

/// A number that may have been serialised as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Num {
  Number(serde_json::Number),
  Text(String),
}

impl Num {
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Number(n) => n.as_f64(),
      Self::Text(s) => s.trim().parse().ok(),
    }
  }

  pub fn as_id(&self) -> Option<u64> {
    match self {
      Self::Number(n) => n.as_u64(),
      Self::Text(s) => s.trim().parse().ok(),
    }
  }
}

fn id(endpoint: &'static str, field: &str, value: Option<&Num>) -> Result<u64> {
  value.and_then(Num::as_id).ok_or_else(|| Error::Decode {
    endpoint,
    message: format!("missing or non-numeric `{field}`"),
  })
}

fn coordinate(
  endpoint: &'static str,
  lat: Option<&Num>,
  lng: Option<&Num>,
) -> Result<Coordinate> {
  match (lat.and_then(Num::as_f64), lng.and_then(Num::as_f64)) {
    (Some(lat), Some(lng)) => Ok(Coordinate::try_new(lat, lng)?),
    _ => Err(Error::Decode {
      endpoint,
      message: "missing or non-numeric coordinate".into(),
    }),
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct UserRecord {
  users_id:      Option<Num>,
  users_fname:   Option<String>,
  users_sname:   Option<String>,
  users_tel1:    Option<String>,
  users_line_id: Option<String>,
}

impl UserRecord {
  pub fn into_caregiver(self) -> Result<Caregiver> {
    Ok(Caregiver {
      id:         id("getUser", "users_id", self.users_id.as_ref())?,
      first_name: self.users_fname,
      last_name:  self.users_sname,
      phone:      self.users_tel1,
      line_id:    self.users_line_id,
    })
  }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TakecareRecord {
  takecare_id:    Option<Num>,
  takecare_fname: Option<String>,
  takecare_sname: Option<String>,
}

impl TakecareRecord {
  pub fn into_dependent(self) -> Result<Dependent> {
    Ok(Dependent {
      id:         id(
        "getUserTakecareperson",
        "takecare_id",
        self.takecare_id.as_ref(),
      )?,
      first_name: self.takecare_fname,
      last_name:  self.takecare_sname,
    })
  }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SafezoneRecord {
  safezone_id:     Option<Num>,
  safez_latitude:  Option<Num>,
  safez_longitude: Option<Num>,
  safez_radiuslv1: Option<Num>,
  safez_radiuslv2: Option<Num>,
}

impl SafezoneRecord {
  /// Missing radii count as zero. A missing zone id falls back to
  /// `requested`, then to zero.
  pub fn into_safe_zone(self, requested: Option<u64>) -> Result<SafeZone> {
    let center = coordinate(
      "getSafezone",
      self.safez_latitude.as_ref(),
      self.safez_longitude.as_ref(),
    )?;
    let radius = |n: Option<&Num>| n.and_then(Num::as_f64).unwrap_or(0.0);
    let zone_id = self
      .safezone_id
      .as_ref()
      .and_then(Num::as_id)
      .filter(|id| *id != 0)
      .or(requested)
      .unwrap_or(0);
    Ok(SafeZone::new(
      center,
      radius(self.safez_radiuslv1.as_ref()),
      radius(self.safez_radiuslv2.as_ref()),
      zone_id,
    )?)
  }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationRecord {
  locat_latitude:  Option<Num>,
  locat_longitude: Option<Num>,
}

impl LocationRecord {
  pub fn into_coordinate(self) -> Result<Coordinate> {
    coordinate(
      "getLocation",
      self.locat_latitude.as_ref(),
      self.locat_longitude.as_ref(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn parse<T: for<'de> Deserialize<'de>>(v: serde_json::Value) -> Option<T> {
    serde_json::from_value::<Envelope<T>>(v).unwrap().data
  }

  #[test]
  fn null_and_missing_data_mean_not_found() {
    assert!(parse::<UserRecord>(json!({ "data": null })).is_none());
    assert!(parse::<UserRecord>(json!({})).is_none());
  }

  #[test]
  fn user_with_string_id() {
    let user: UserRecord = parse(json!({
      "data": {
        "users_id": "42",
        "users_fname": "Somchai",
        "users_line_id": "U123",
        "users_passwd": "ignored",
      }
    }))
    .unwrap();
    let caregiver = user.into_caregiver().unwrap();
    assert_eq!(caregiver.id, 42);
    assert_eq!(caregiver.first_name.as_deref(), Some("Somchai"));
    assert_eq!(caregiver.line_id.as_deref(), Some("U123"));
    assert!(caregiver.last_name.is_none());
  }

  #[test]
  fn user_without_id_is_a_decode_error() {
    let user: UserRecord = parse(json!({ "data": { "users_fname": "x" } })).unwrap();
    assert!(matches!(user.into_caregiver(), Err(Error::Decode { .. })));
  }

  #[test]
  fn safezone_with_mixed_number_forms() {
    let zone: SafezoneRecord = parse(json!({
      "data": {
        "safezone_id": 5,
        "safez_latitude": "13.7563",
        "safez_longitude": 100.5018,
        "safez_radiuslv1": "100",
        "safez_radiuslv2": null,
      }
    }))
    .unwrap();
    let zone = zone.into_safe_zone(Some(9)).unwrap();
    assert_eq!(zone.zone_id, 5);
    assert_eq!(zone.center, Coordinate::new(13.7563, 100.5018));
    assert_eq!(zone.inner_radius_m, 100.0);
    assert_eq!(zone.outer_radius_m, 0.0);
  }

  #[test]
  fn safezone_id_falls_back_to_requested() {
    let record = || -> SafezoneRecord {
      parse(json!({
        "data": { "safez_latitude": 13.0, "safez_longitude": 100.0 }
      }))
      .unwrap()
    };
    assert_eq!(record().into_safe_zone(Some(9)).unwrap().zone_id, 9);
    assert_eq!(record().into_safe_zone(None).unwrap().zone_id, 0);
  }

  #[test]
  fn location_out_of_range_is_rejected() {
    let loc: LocationRecord = parse(json!({
      "data": { "locat_latitude": "95.0", "locat_longitude": "100.0" }
    }))
    .unwrap();
    assert!(matches!(loc.into_coordinate(), Err(Error::Record(_))));

    let loc: LocationRecord = parse(json!({
      "data": { "locat_latitude": "", "locat_longitude": "100.0" }
    }))
    .unwrap();
    assert!(matches!(loc.into_coordinate(), Err(Error::Decode { .. })));
  }
}
