//! [`BrowserSensor`]: caregiver positions posted by the tracking page.

use std::sync::{Mutex, PoisonError};

use carewatch_core::geo::Coordinate;
use carewatch_tracker::platform::{
  PositionSensor, PositionWatch, Reading, SensorError, WatchOptions,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Readings buffered between the handler and the tracking view.
const BUFFER: usize = 8;

/// One report from the page's geolocation watch: either a fix or the error
/// the browser raised.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PositionReport {
  pub lat:         Option<f64>,
  pub lng:         Option<f64>,
  /// When the browser took the fix. Absent means "now".
  pub recorded_at: Option<DateTime<Utc>>,
  pub error:       Option<SensorError>,
}

impl PositionReport {
  /// The reading this report carries, or why it is malformed.
  pub fn reading(&self) -> Result<Reading, String> {
    if let Some(e) = &self.error {
      return Ok(Err(e.clone()));
    }
    match (self.lat, self.lng) {
      (Some(lat), Some(lng)) => Coordinate::try_new(lat, lng)
        .map(Ok)
        .map_err(|e| e.to_string()),
      _ => Err("a report needs `lat` and `lng`, or `error`".into()),
    }
  }

  /// Whether the fix is older than `options` allow.
  pub fn is_stale(&self, options: &WatchOptions, now: DateTime<Utc>) -> bool {
    let Some(at) = self.recorded_at else {
      return false;
    };
    now
      .signed_duration_since(at)
      .to_std()
      .is_ok_and(|age| age > options.maximum_age())
  }
}

/// What happened to a submitted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
  Delivered,
  /// Older than the subscription's maximum age; discarded.
  Stale,
  /// The view is not listening.
  Unsubscribed,
  /// The view has not caught up with earlier reports; discarded.
  Busy,
}

#[derive(Debug)]
struct Subscription {
  tx:      mpsc::Sender<Reading>,
  options: WatchOptions,
}

#[derive(Debug, Default)]
pub struct BrowserSensor {
  subscription: Mutex<Option<Subscription>>,
}

impl BrowserSensor {
  pub fn new() -> Self { Self::default() }

  /// Hand a report to the current subscription.
  pub fn submit(&self, reading: Reading, report: &PositionReport) -> Delivery {
    let guard = self
      .subscription
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    let Some(sub) = guard.as_ref() else {
      return Delivery::Unsubscribed;
    };
    if reading.is_ok() && report.is_stale(&sub.options, Utc::now()) {
      return Delivery::Stale;
    }
    match sub.tx.try_send(reading) {
      Ok(()) => Delivery::Delivered,
      Err(TrySendError::Full(_)) => Delivery::Busy,
      Err(TrySendError::Closed(_)) => Delivery::Unsubscribed,
    }
  }

  pub fn is_subscribed(&self) -> bool {
    self
      .subscription
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
      .is_some_and(|s| !s.tx.is_closed())
  }
}

impl PositionSensor for BrowserSensor {
  fn watch_position(&self, options: WatchOptions) -> PositionWatch {
    let (tx, rx) = mpsc::channel(BUFFER);
    *self
      .subscription
      .lock()
      .unwrap_or_else(PoisonError::into_inner) = Some(Subscription { tx, options });
    rx
  }
}
