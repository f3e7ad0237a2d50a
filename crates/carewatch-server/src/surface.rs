//! [`SceneSurface`]: a map surface that keeps the latest scene for the page
//! to fetch.

use std::time::Duration;

use carewatch_core::scene::MapScene;
use carewatch_tracker::platform::MapSurface;
use tokio::sync::watch;

#[derive(Debug)]
pub struct SceneSurface {
  tx: watch::Sender<Option<MapScene>>,
}

impl Default for SceneSurface {
  fn default() -> Self {
    let (tx, _) = watch::channel(None);
    Self { tx }
  }
}

impl SceneSurface {
  pub fn new() -> Self { Self::default() }

  pub fn latest(&self) -> Option<MapScene> { self.tx.borrow().clone() }

  /// The latest scene, waiting up to `timeout` for the first one to be drawn.
  pub async fn wait_first(&self, timeout: Duration) -> Option<MapScene> {
    if let Some(scene) = self.latest() {
      return Some(scene);
    }
    let mut rx = self.tx.subscribe();
    let first = tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await;
    match first {
      Ok(Ok(scene)) => scene.clone(),
      _ => None,
    }
  }
}

impl MapSurface for SceneSurface {
  fn draw(&self, scene: MapScene) { self.tx.send_replace(Some(scene)); }
}

#[cfg(test)]
mod tests {
  use super::*;
  use carewatch_tracker::{TrackerConfig, ViewState, presenter::build_scene};

  fn scene() -> MapScene {
    build_scene(&ViewState::new(Default::default(), None), &TrackerConfig::default())
  }

  #[tokio::test(start_paused = true)]
  async fn waits_for_first_draw() {
    let surface = std::sync::Arc::new(SceneSurface::new());
    assert!(surface.latest().is_none());
    assert!(surface.wait_first(Duration::from_millis(50)).await.is_none());

    let drawer = std::sync::Arc::clone(&surface);
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(20)).await;
      drawer.draw(scene());
    });
    let got = surface.wait_first(Duration::from_secs(1)).await;
    assert_eq!(got, Some(scene()));
    assert_eq!(surface.latest(), Some(scene()));
  }
}
