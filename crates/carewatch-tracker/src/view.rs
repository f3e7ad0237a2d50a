//! [`LiveTrackingView`] mounts a tracking session for a set of navigation
//! parameters and tears it down again.

use std::sync::Arc;

use carewatch_core::{
  context::NavParams,
  service::{CareDirectory, DirectionsService, IdObfuscator},
  trail::Trail,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info};

use crate::{
  Result,
  config::TrackerConfig,
  platform::{MapSurface, PositionSensor},
  poller, presenter, resolver,
  scope::Scope,
  state::{ViewState, ViewStore},
};

/// The collaborators a view is wired to.
pub struct Services<D, R> {
  pub directory:  Arc<D>,
  pub obfuscator: Arc<dyn IdObfuscator>,
  pub directions: Arc<R>,
  pub sensor:     Arc<dyn PositionSensor>,
  pub surface:    Arc<dyn MapSurface>,
}

impl<D, R> Clone for Services<D, R> {
  fn clone(&self) -> Self {
    Self {
      directory:  Arc::clone(&self.directory),
      obfuscator: Arc::clone(&self.obfuscator),
      directions: Arc::clone(&self.directions),
      sensor:     Arc::clone(&self.sensor),
      surface:    Arc::clone(&self.surface),
    }
  }
}

/// One mounted session: the background tasks and the scope guarding them.
struct Session {
  key:   Option<(String, u64)>,
  scope: Scope,
  tasks: Vec<JoinHandle<()>>,
}

impl Session {
  /// Stop every task and refuse any further state write. Synchronous; the
  /// tasks are dropped at their next poll.
  fn cancel(&self) {
    self.scope.close();
    for task in &self.tasks {
      task.abort();
    }
  }

  /// Cancel and wait until every task has been dropped, so subscriptions
  /// held by the tasks are released when this returns.
  async fn teardown(self) {
    self.cancel();
    for task in self.tasks {
      let _ = task.await;
    }
  }
}

/// The live tracking view.
///
/// State is published on a [`watch`] channel that survives re-navigation;
/// each new session resets it.
pub struct LiveTrackingView<D, R> {
  services: Services<D, R>,
  config:   Arc<TrackerConfig>,
  tx:       Arc<watch::Sender<ViewState>>,
  session:  Option<Session>,
}

impl<D, R> LiveTrackingView<D, R>
where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  pub fn new(services: Services<D, R>, config: TrackerConfig) -> Result<Self> {
    config.validate()?;
    let trail = Trail::with_capacity(config.trail_capacity)?;
    let (tx, _) = watch::channel(ViewState::new(trail, None));
    Ok(Self {
      services,
      config: Arc::new(config),
      tx: Arc::new(tx),
      session: None,
    })
  }

  pub fn subscribe(&self) -> watch::Receiver<ViewState> { self.tx.subscribe() }

  pub fn snapshot(&self) -> ViewState { self.tx.borrow().clone() }

  /// Mount the view for `params`.
  ///
  /// The context is resolved once per distinct `(token, safe-zone id)`; if the
  /// view is already mounted for the same pair this is a no-op and returns
  /// `false`. Otherwise any current session is torn down first.
  pub async fn navigate(&mut self, params: NavParams) -> Result<bool> {
    let key = params.resolution_key();
    if let Some(current) = &self.session
      && current.key == key
    {
      return Ok(false);
    }
    self.unmount().await;

    let trail = Trail::with_capacity(self.config.trail_capacity)?;
    self.tx.send_replace(ViewState::new(trail, params.role.clone()));

    let scope = Scope::new();
    let store = ViewStore::new(Arc::clone(&self.tx), scope.clone());
    let mut tasks = Vec::with_capacity(4);

    tasks.push(tokio::spawn(presenter::render(
      store.subscribe(),
      Arc::clone(&self.services.surface),
      Arc::clone(&self.config),
    )));
    tasks.push(tokio::spawn(poller::follow_caregiver(
      Arc::clone(&self.services.sensor),
      self.config.sensor,
      store.clone(),
    )));
    tasks.push(tokio::spawn(presenter::follow_route(
      Arc::clone(&self.services.directions),
      self.config.route_failure,
      store.clone(),
    )));

    if let Some((token, zone_id)) = key.clone() {
      info!(zone_id, "mounting tracking view");
      tasks.push(tokio::spawn(resolve_then_poll(
        self.services.clone(),
        Arc::clone(&self.config),
        token,
        (zone_id != 0).then_some(zone_id),
        store,
      )));
    } else {
      debug!("mounting tracking view without an access token");
    }

    self.session = Some(Session { key, scope, tasks });
    Ok(true)
  }

  /// Tear down the current session, if any. No timer fetch, sensor reading
  /// or state write happens after this returns.
  pub async fn unmount(&mut self) {
    if let Some(session) = self.session.take() {
      info!("unmounting tracking view");
      session.teardown().await;
    }
  }
}

impl<D, R> Drop for LiveTrackingView<D, R> {
  fn drop(&mut self) {
    if let Some(session) = self.session.take() {
      session.cancel();
    }
  }
}

async fn resolve_then_poll<D, R>(
  services: Services<D, R>,
  config: Arc<TrackerConfig>,
  token: String,
  zone_id: Option<u64>,
  store: ViewStore,
) where
  D: CareDirectory + 'static,
  R: DirectionsService + 'static,
{
  let resolved = resolver::resolve(
    &*services.directory,
    &*services.obfuscator,
    &token,
    zone_id,
  )
  .await;
  let Some(resolution) = resolved else {
    return;
  };
  if !store.update(|s| resolution.apply(s)) {
    return;
  }
  info!(
    caregiver_id = resolution.context.caregiver_id,
    dependent_id = resolution.context.dependent_id,
    safezone_id = resolution.context.safezone_id,
    "tracking context resolved"
  );
  poller::poll_dependent(
    services.directory,
    resolution.context,
    config.poll_interval(),
    store,
  )
  .await;
}
