//! The registry of hosted tracking sessions.
//!
//! Each session is a [`LiveTrackingView`] wired to its own
//! [`BrowserSensor`] and [`SceneSurface`]; the backend and directions
//! clients are shared.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use carewatch_core::{
  context::NavParams,
  service::{CareDirectory, DirectionsService, IdObfuscator},
};
use carewatch_tracker::{LiveTrackingView, Services, TrackerConfig, ViewState};
use tokio::{
  sync::{Mutex as AsyncMutex, RwLock},
  time::{Instant, MissedTickBehavior, interval},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{error::ApiError, sensor::BrowserSensor, surface::SceneSurface};

/// One hosted session.
pub struct Hosted<D, R> {
  view:        AsyncMutex<LiveTrackingView<D, R>>,
  pub sensor:  Arc<BrowserSensor>,
  pub surface: Arc<SceneSurface>,
  last_seen:   Mutex<Instant>,
}

impl<D, R> Hosted<D, R>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  fn touch(&self) {
    *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
  }

  fn idle_for(&self, now: Instant) -> Duration {
    now.saturating_duration_since(
      *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner),
    )
  }

  /// Re-navigate to `params`. Returns whether the view was remounted.
  pub async fn navigate(&self, params: NavParams) -> Result<bool, ApiError> {
    Ok(self.view.lock().await.navigate(params).await?)
  }

  pub async fn snapshot(&self) -> ViewState { self.view.lock().await.snapshot() }

  async fn unmount(&self) { self.view.lock().await.unmount().await }
}

pub struct Sessions<D, R> {
  directory:    Arc<D>,
  directions:   Arc<R>,
  obfuscator:   Arc<dyn IdObfuscator>,
  config:       TrackerConfig,
  max_sessions: usize,
  sessions:     RwLock<HashMap<Uuid, Arc<Hosted<D, R>>>>,
}

impl<D, R> Sessions<D, R>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  pub fn new(
    directory: Arc<D>,
    directions: Arc<R>,
    obfuscator: Arc<dyn IdObfuscator>,
    config: TrackerConfig,
    max_sessions: usize,
  ) -> Self {
    Self {
      directory,
      directions,
      obfuscator,
      config,
      max_sessions,
      sessions: RwLock::new(HashMap::new()),
    }
  }

  /// Mount a new view for `params` and register it.
  ///
  /// The registry stays write-locked from the limit check to the insert.
  /// Mounting only spawns tasks, so the lock is held briefly.
  pub async fn create(&self, params: NavParams) -> Result<Uuid, ApiError> {
    let mut sessions = self.sessions.write().await;
    if sessions.len() >= self.max_sessions {
      return Err(ApiError::Unavailable("session limit reached".into()));
    }

    let sensor = Arc::new(BrowserSensor::new());
    let surface = Arc::new(SceneSurface::new());
    let services = Services {
      directory:  Arc::clone(&self.directory),
      obfuscator: Arc::clone(&self.obfuscator),
      directions: Arc::clone(&self.directions),
      sensor:     sensor.clone(),
      surface:    surface.clone(),
    };
    let mut view = LiveTrackingView::new(services, self.config.clone())?;
    view.navigate(params).await?;

    let id = Uuid::new_v4();
    let hosted = Hosted {
      view: AsyncMutex::new(view),
      sensor,
      surface,
      last_seen: Mutex::new(Instant::now()),
    };
    sessions.insert(id, Arc::new(hosted));
    info!(%id, "session created");
    Ok(id)
  }

  /// Look a session up and mark it as seen.
  pub async fn get(&self, id: Uuid) -> Result<Arc<Hosted<D, R>>, ApiError> {
    let hosted = self
      .sessions
      .read()
      .await
      .get(&id)
      .cloned()
      .ok_or_else(|| ApiError::NotFound(format!("session {id}")))?;
    hosted.touch();
    Ok(hosted)
  }

  /// Unregister a session and tear its view down.
  pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
    let hosted = self
      .sessions
      .write()
      .await
      .remove(&id)
      .ok_or_else(|| ApiError::NotFound(format!("session {id}")))?;
    hosted.unmount().await;
    info!(%id, "session closed");
    Ok(())
  }

  pub async fn len(&self) -> usize { self.sessions.read().await.len() }

  /// Tear down every session idle for longer than `ttl`. Returns how many
  /// were removed.
  pub async fn reap_idle(&self, ttl: Duration) -> usize {
    let now = Instant::now();
    let expired: Vec<_> = {
      let mut sessions = self.sessions.write().await;
      let ids: Vec<Uuid> = sessions
        .iter()
        .filter(|(_, h)| h.idle_for(now) > ttl)
        .map(|(id, _)| *id)
        .collect();
      ids
        .into_iter()
        .filter_map(|id| sessions.remove(&id).map(|h| (id, h)))
        .collect()
    };
    for (id, hosted) in &expired {
      hosted.unmount().await;
      debug!(%id, "idle session reaped");
    }
    expired.len()
  }
}

/// Reap idle sessions every `period`, forever.
pub async fn run_reaper<D, R>(sessions: Arc<Sessions<D, R>>, period: Duration, ttl: Duration)
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  let mut ticker = interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  loop {
    ticker.tick().await;
    let reaped = sessions.reap_idle(ttl).await;
    if reaped > 0 {
      let remaining = sessions.len().await;
      info!(reaped, remaining, "reaped idle sessions");
    }
  }
}
