//! Turns an access token into the identity context and safe zone a session
//! is scoped by.

use carewatch_core::{
  context::{IdentityContext, SafeZone},
  geo::Coordinate,
  service::{CareDirectory, IdObfuscator},
};
use tracing::{debug, warn};

use crate::state::ViewState;

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
  pub context:   IdentityContext,
  pub safe_zone: SafeZone,
}

impl Resolution {
  /// Where to put the caregiver before the device reports a position.
  pub fn caregiver_fallback(&self) -> Coordinate { self.safe_zone.center }

  /// Write the resolution into `state`. A caregiver position already read
  /// from the sensor is fresher than the zone centre and is kept.
  pub fn apply(&self, state: &mut ViewState) -> bool {
    state.context = self.context;
    state.safe_zone = Some(self.safe_zone);
    if state.caregiver.is_none() {
      state.caregiver = Some(self.caregiver_fallback());
    }
    true
  }
}

/// Run the three chained lookups. Any missing record or failed call yields
/// `None`; failures are logged, never retried.
pub async fn resolve<D>(
  directory: &D,
  obfuscator: &dyn IdObfuscator,
  token: &str,
  zone_id: Option<u64>,
) -> Option<Resolution>
where
  D: CareDirectory,
{
  let caregiver = match directory.caregiver_by_token(token).await {
    Ok(Some(c)) => c,
    Ok(None) => {
      debug!("no caregiver for access token");
      return None;
    }
    Err(e) => {
      warn!(error = %e, "caregiver lookup failed");
      return None;
    }
  };

  let obfuscated = obfuscator.obfuscate(caregiver.id);
  let dependent = match directory.dependent_of(&obfuscated).await {
    Ok(Some(d)) => d,
    Ok(None) => {
      debug!(caregiver_id = caregiver.id, "caregiver has no linked dependent");
      return None;
    }
    Err(e) => {
      warn!(caregiver_id = caregiver.id, error = %e, "dependent lookup failed");
      return None;
    }
  };

  let requested = zone_id.filter(|id| *id != 0);
  let zone = match directory
    .safe_zone(dependent.id, caregiver.id, requested)
    .await
  {
    Ok(Some(z)) => z,
    Ok(None) => {
      debug!(
        caregiver_id = caregiver.id,
        dependent_id = dependent.id,
        "no safe zone configured"
      );
      return None;
    }
    Err(e) => {
      warn!(
        caregiver_id = caregiver.id,
        dependent_id = dependent.id,
        error = %e,
        "safe zone lookup failed"
      );
      return None;
    }
  };

  let safezone_id = if zone.zone_id != 0 {
    zone.zone_id
  } else {
    requested.unwrap_or(0)
  };
  let safe_zone = SafeZone { zone_id: safezone_id, ..zone };

  Some(Resolution {
    context: IdentityContext {
      caregiver_id: caregiver.id,
      dependent_id: dependent.id,
      safezone_id,
    },
    safe_zone,
  })
}
