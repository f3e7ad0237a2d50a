//! In-memory fakes of every collaborator, for tests here and downstream.

use std::{
  collections::HashMap,
  sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  time::Duration,
};

use carewatch_core::{
  context::{Caregiver, Dependent, IdentityContext, SafeZone},
  geo::Coordinate,
  route::{Route, RouteLeg, RouteRequest, RouteStep, TravelMode},
  scene::MapScene,
  service::{CareDirectory, DirectionsService, IdObfuscator},
};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::platform::{
  MapSurface, PositionSensor, PositionWatch, Reading, WatchOptions,
};

#[derive(Debug, Error)]
#[error("fake failure: {0}")]
pub struct FakeError(pub &'static str);

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// A backend with one caregiver/dependent pair and a scriptable location.
#[derive(Debug, Default)]
pub struct FakeDirectory {
  caregivers:      HashMap<String, Caregiver>,
  dependents:      HashMap<String, Dependent>,
  zone:            Option<SafeZone>,
  fail_lookups:    bool,
  location:        Mutex<Option<Coordinate>>,
  fail_locations:  AtomicBool,
  latency:         Duration,
  location_calls:  AtomicUsize,
  dependent_keys:  Mutex<Vec<String>>,
}

impl FakeDirectory {
  pub const TOKEN: &'static str = "token-abc";
  pub const CAREGIVER_ID: u64 = 11;
  pub const DEPENDENT_ID: u64 = 22;
  pub const ZONE_ID: u64 = 33;

  pub fn zone() -> SafeZone {
    SafeZone {
      center:         Coordinate::new(13.7563, 100.5018),
      inner_radius_m: 100.0,
      outer_radius_m: 200.0,
      zone_id:        Self::ZONE_ID,
    }
  }

  /// A directory where [`Self::TOKEN`] resolves all the way to a safe zone.
  pub fn linked() -> Self {
    let caregiver = Caregiver {
      id:         Self::CAREGIVER_ID,
      first_name: Some("Somchai".into()),
      last_name:  None,
      phone:      None,
      line_id:    None,
    };
    let dependent = Dependent {
      id:         Self::DEPENDENT_ID,
      first_name: Some("Malee".into()),
      last_name:  None,
    };
    Self {
      caregivers: HashMap::from([(Self::TOKEN.to_owned(), caregiver)]),
      dependents: HashMap::from([(
        DecimalIds.obfuscate(Self::CAREGIVER_ID),
        dependent,
      )]),
      zone: Some(Self::zone()),
      ..Self::default()
    }
  }

  pub fn without_dependent(mut self) -> Self {
    self.dependents.clear();
    self
  }

  pub fn with_zone(mut self, zone: SafeZone) -> Self {
    self.zone = Some(zone);
    self
  }

  pub fn failing_lookups(mut self) -> Self {
    self.fail_lookups = true;
    self
  }

  /// Delay every location response by `latency`.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  pub fn set_location(&self, point: Option<Coordinate>) {
    *lock(&self.location) = point;
  }

  pub fn fail_locations(&self, fail: bool) {
    self.fail_locations.store(fail, Ordering::SeqCst);
  }

  /// How many location fetches have started.
  pub fn location_calls(&self) -> usize {
    self.location_calls.load(Ordering::SeqCst)
  }

  /// The obfuscated ids the relationship lookup was called with.
  pub fn dependent_keys(&self) -> Vec<String> { lock(&self.dependent_keys).clone() }
}

impl CareDirectory for FakeDirectory {
  type Error = FakeError;

  async fn caregiver_by_token<'a>(
    &'a self,
    token: &'a str,
  ) -> Result<Option<Caregiver>, FakeError> {
    if self.fail_lookups {
      return Err(FakeError("identity lookup"));
    }
    Ok(self.caregivers.get(token).cloned())
  }

  async fn dependent_of<'a>(
    &'a self,
    obfuscated_caregiver_id: &'a str,
  ) -> Result<Option<Dependent>, FakeError> {
    lock(&self.dependent_keys).push(obfuscated_caregiver_id.to_owned());
    Ok(self.dependents.get(obfuscated_caregiver_id).cloned())
  }

  async fn safe_zone(
    &self,
    _dependent_id: u64,
    _caregiver_id: u64,
    _zone_id: Option<u64>,
  ) -> Result<Option<SafeZone>, FakeError> {
    Ok(self.zone)
  }

  async fn latest_location(
    &self,
    _ctx: IdentityContext,
  ) -> Result<Option<Coordinate>, FakeError> {
    self.location_calls.fetch_add(1, Ordering::SeqCst);
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
    if self.fail_locations.load(Ordering::SeqCst) {
      return Err(FakeError("location lookup"));
    }
    Ok(*lock(&self.location))
  }
}

/// Obfuscates ids as their decimal string.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalIds;

impl IdObfuscator for DecimalIds {
  fn obfuscate(&self, id: u64) -> String { id.to_string() }
}

// ─── Directions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Script {
  Found(Route),
  NotFound,
  Fail,
}

/// Answers each travel mode from a script; unscripted modes find no route.
#[derive(Debug, Default)]
pub struct ScriptedDirections {
  scripts: Mutex<HashMap<TravelMode, Script>>,
  calls:   Mutex<Vec<TravelMode>>,
}

impl ScriptedDirections {
  pub fn new() -> Self { Self::default() }

  fn script(self, mode: TravelMode, script: Script) -> Self {
    lock(&self.scripts).insert(mode, script);
    self
  }

  pub fn found(self, mode: TravelMode, route: Route) -> Self {
    self.script(mode, Script::Found(route))
  }

  pub fn not_found(self, mode: TravelMode) -> Self {
    self.script(mode, Script::NotFound)
  }

  pub fn failing(self, mode: TravelMode) -> Self {
    self.script(mode, Script::Fail)
  }

  /// Replace the script for `mode` on a shared instance.
  pub fn set_found(&self, mode: TravelMode, route: Route) {
    lock(&self.scripts).insert(mode, Script::Found(route));
  }

  pub fn set_failing(&self, mode: TravelMode) {
    lock(&self.scripts).insert(mode, Script::Fail);
  }

  pub fn calls(&self) -> Vec<TravelMode> { lock(&self.calls).clone() }
}

impl DirectionsService for ScriptedDirections {
  type Error = FakeError;

  async fn route(&self, request: RouteRequest) -> Result<Option<Route>, FakeError> {
    lock(&self.calls).push(request.mode);
    let script = lock(&self.scripts).get(&request.mode).cloned();
    match script {
      Some(Script::Found(route)) => Ok(Some(route)),
      Some(Script::NotFound) | None => Ok(None),
      Some(Script::Fail) => Err(FakeError("directions")),
    }
  }
}

/// A one-leg, one-step route with the given first instruction.
pub fn sample_route(mode: TravelMode, instruction: &str) -> Route {
  Route {
    mode,
    legs: vec![RouteLeg {
      distance: Some("540 m".into()),
      duration: Some("2 mins".into()),
      steps:    vec![RouteStep {
        instructions: instruction.into(),
        distance:     Some("540 m".into()),
        duration:     Some("2 mins".into()),
      }],
    }],
    polyline: vec![
      Coordinate::new(13.7563, 100.5018),
      Coordinate::new(13.7600, 100.5050),
    ],
  }
}

// ─── Sensor ──────────────────────────────────────────────────────────────────

/// A sensor whose readings are pushed by the test.
#[derive(Debug, Default)]
pub struct ChannelSensor {
  tx:      Mutex<Option<mpsc::Sender<Reading>>>,
  options: Mutex<Option<WatchOptions>>,
}

impl ChannelSensor {
  pub fn new() -> Self { Self::default() }

  /// Deliver a reading. Returns `false` if nobody is subscribed.
  pub fn push(&self, reading: Reading) -> bool {
    match lock(&self.tx).as_ref() {
      Some(tx) => tx.try_send(reading).is_ok(),
      None => false,
    }
  }

  /// Whether a subscription exists and is still held by the view.
  pub fn is_subscribed(&self) -> bool {
    lock(&self.tx).as_ref().is_some_and(|tx| !tx.is_closed())
  }

  /// The options of the most recent subscription.
  pub fn options(&self) -> Option<WatchOptions> { *lock(&self.options) }
}

impl PositionSensor for ChannelSensor {
  fn watch_position(&self, options: WatchOptions) -> PositionWatch {
    let (tx, rx) = mpsc::channel(16);
    *lock(&self.tx) = Some(tx);
    *lock(&self.options) = Some(options);
    rx
  }
}

// ─── Surface ─────────────────────────────────────────────────────────────────

/// Keeps every scene it is asked to draw.
#[derive(Debug, Default)]
pub struct RecordingSurface {
  scenes: Mutex<Vec<MapScene>>,
}

impl RecordingSurface {
  pub fn new() -> Self { Self::default() }

  pub fn count(&self) -> usize { lock(&self.scenes).len() }

  pub fn last(&self) -> Option<MapScene> { lock(&self.scenes).last().cloned() }
}

impl MapSurface for RecordingSurface {
  fn draw(&self, scene: MapScene) { lock(&self.scenes).push(scene); }
}
