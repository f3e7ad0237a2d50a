//! Who is being watched, by whom, and inside which safe zone.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, geo::Coordinate};

// ─── Navigation parameters ───────────────────────────────────────────────────

/// Query parameters a tracking page is opened with.
///
/// Field names follow the query string the chatbot links carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavParams {
  /// Opaque credential identifying the caregiver.
  #[serde(rename = "auToken", default)]
  pub access_token: Option<String>,
  #[serde(rename = "idsafezone", default)]
  pub safezone_id:  Option<u64>,
  /// Carried through for the page; not used to resolve identity.
  #[serde(rename = "idlocation", default)]
  pub location_id:  Option<u64>,
  /// Viewer role flag, echoed back to the page unchanged.
  #[serde(default)]
  pub role:         Option<String>,
}

impl NavParams {
  /// The pair that decides whether a context must be re-resolved.
  pub fn resolution_key(&self) -> Option<(String, u64)> {
    let token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
    Some((token.to_owned(), self.safezone_id.unwrap_or(0)))
  }
}

// ─── Records returned by the directory ───────────────────────────────────────

/// The signed-in caregiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caregiver {
  pub id:         u64,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub phone:      Option<String>,
  /// Chat-platform user id the notifications are delivered to.
  pub line_id:    Option<String>,
}

/// The person a caregiver looks after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
  pub id:         u64,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
}

// ─── Identity context ────────────────────────────────────────────────────────

/// The numeric keys every location lookup is scoped by. Zero means
/// "unresolved".
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct IdentityContext {
  pub caregiver_id: u64,
  pub dependent_id: u64,
  pub safezone_id:  u64,
}

impl IdentityContext {
  pub fn is_resolved(&self) -> bool {
    self.caregiver_id != 0 && self.dependent_id != 0
  }
}

// ─── Safe zone ───────────────────────────────────────────────────────────────

/// Two concentric alert rings around a reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
  pub center:         Coordinate,
  /// First alert threshold, in meters.
  pub inner_radius_m: f64,
  /// Second alert threshold, in meters.
  pub outer_radius_m: f64,
  pub zone_id:        u64,
}

impl SafeZone {
  pub fn new(
    center: Coordinate,
    inner_radius_m: f64,
    outer_radius_m: f64,
    zone_id: u64,
  ) -> Result<Self> {
    for r in [inner_radius_m, outer_radius_m] {
      if !r.is_finite() || r < 0.0 {
        return Err(Error::InvalidRadius(r));
      }
    }
    Ok(Self {
      center,
      inner_radius_m,
      outer_radius_m,
      zone_id,
    })
  }

  /// The larger of the two rings; the backend does not guarantee ordering.
  pub fn fit_radius_m(&self) -> f64 {
    self.inner_radius_m.max(self.outer_radius_m)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolution_key_requires_token() {
    let mut params = NavParams::default();
    assert_eq!(params.resolution_key(), None);

    params.access_token = Some(String::new());
    assert_eq!(params.resolution_key(), None);

    params.access_token = Some("tok".into());
    assert_eq!(params.resolution_key(), Some(("tok".into(), 0)));

    params.safezone_id = Some(7);
    assert_eq!(params.resolution_key(), Some(("tok".into(), 7)));
  }

  #[test]
  fn nav_params_from_query_names() {
    let params: NavParams = serde_json::from_value(serde_json::json!({
      "auToken": "abc",
      "idsafezone": 3,
      "role": "caregiver",
    }))
    .unwrap();
    assert_eq!(params.access_token.as_deref(), Some("abc"));
    assert_eq!(params.safezone_id, Some(3));
    assert_eq!(params.location_id, None);
  }

  #[test]
  fn default_context_is_unresolved() {
    assert!(!IdentityContext::default().is_resolved());
    let ctx = IdentityContext {
      caregiver_id: 1,
      dependent_id: 2,
      safezone_id:  0,
    };
    assert!(ctx.is_resolved());
  }

  #[test]
  fn safe_zone_rejects_negative_radius() {
    let c = Coordinate::new(13.0, 100.0);
    assert!(SafeZone::new(c, -1.0, 10.0, 1).is_err());
    assert!(SafeZone::new(c, 10.0, f64::NAN, 1).is_err());
    let zone = SafeZone::new(c, 300.0, 100.0, 1).unwrap();
    assert_eq!(zone.fit_radius_m(), 300.0);
  }
}
