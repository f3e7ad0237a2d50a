//! The two position feeds: a timer-driven poll for the dependent and a
//! sensor subscription for the caregiver.

use std::{
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use carewatch_core::{context::IdentityContext, service::CareDirectory};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, trace, warn};

use crate::{
  platform::{PositionSensor, SensorError, WatchOptions},
  state::ViewStore,
};

// ─── Dependent ───────────────────────────────────────────────────────────────

/// Fetch the dependent's position immediately and then once per `period`,
/// until the task is aborted.
///
/// Each tick launches its fetch on its own task, so a slow response never
/// delays the next tick. Responses carry a sequence number and an older
/// response never overwrites a newer one.
pub async fn poll_dependent<D>(
  directory: Arc<D>,
  ctx: IdentityContext,
  period: Duration,
  store: ViewStore,
) where
  D: CareDirectory + 'static,
{
  let mut ticker = interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  let seq = Arc::new(AtomicU64::new(0));

  loop {
    ticker.tick().await;
    if !store.scope().is_live() {
      break;
    }
    let n = seq.fetch_add(1, Ordering::Relaxed) + 1;
    tokio::spawn(fetch_dependent(
      Arc::clone(&directory),
      ctx,
      n,
      store.clone(),
    ));
  }
}

async fn fetch_dependent<D>(
  directory: Arc<D>,
  ctx: IdentityContext,
  seq: u64,
  store: ViewStore,
) where
  D: CareDirectory,
{
  match directory.latest_location(ctx).await {
    Ok(Some(point)) => {
      let changed = store.update(|s| s.apply_dependent(seq, point));
      trace!(seq, changed, lat = point.lat, lng = point.lng, "dependent position");
    }
    Ok(None) => debug!(seq, "no reported location yet"),
    Err(e) => warn!(seq, error = %e, "dependent location fetch failed"),
  }
}

// ─── Caregiver ───────────────────────────────────────────────────────────────

/// Follow the device's own position until the task is aborted or the sensor
/// closes the subscription. Sensor errors are swallowed: the last known
/// caregiver position stays on the map.
pub async fn follow_caregiver(
  sensor: Arc<dyn PositionSensor>,
  options: WatchOptions,
  store: ViewStore,
) {
  let mut watch = sensor.watch_position(options);
  while let Some(reading) = watch.recv().await {
    match reading {
      Ok(point) => {
        store.update(|s| s.apply_caregiver(point));
      }
      Err(SensorError::Timeout) => debug!("no caregiver fix within timeout"),
      Err(e) => debug!(error = %e, "caregiver position unavailable"),
    }
  }
  debug!("caregiver position subscription ended");
}
