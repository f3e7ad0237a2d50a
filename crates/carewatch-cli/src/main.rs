//! `carewatch`: headless live tracking from the terminal.
//!
//! Runs one tracking view in-process against the care backend and the
//! directions API, and prints the navigation panel whenever it changes.
//!
//! # Usage
//!
//! ```
//! carewatch --backend-url https://care.example --maps-key KEY --token TOKEN
//! carewatch --config ~/.config/carewatch/config.toml --at 13.75,100.50 --for-secs 60
//! ```

mod platform;
mod settings;

use std::sync::Arc;

use anyhow::{Context, Result};
use carewatch_client::{ApiClient, GoogleDirections};
use carewatch_tracker::{LiveTrackingView, Services};
use clap::Parser;
use platform::{FixedSensor, PanelPrinter};
use settings::{Args, ConfigFile, Settings};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let file = match &args.config {
    Some(path) => ConfigFile::load(path)?,
    None => ConfigFile::default(),
  };
  let settings = Settings::merge(args, file)?;
  if settings.params.resolution_key().is_none() {
    warn!("no access token given; only the caregiver position will be shown");
  }

  let directory = ApiClient::new(settings.backend).context("building backend client")?;
  let services = Services {
    obfuscator: directory.config().id_encoding.obfuscator(),
    directory:  Arc::new(directory),
    directions: Arc::new(
      GoogleDirections::new(settings.directions).context("building directions client")?,
    ),
    sensor:     Arc::new(FixedSensor(settings.caregiver)),
    surface:    Arc::new(PanelPrinter::new()),
  };
  let mut view = LiveTrackingView::new(services, settings.tracker)?;
  view.navigate(settings.params).await?;

  let mut rx = view.subscribe();
  let announce = tokio::spawn(async move {
    let resolved = rx.wait_for(|s| s.context.is_resolved()).await.map(|s| s.context);
    if let Ok(ctx) = resolved {
      println!(
        "watching dependent #{} in safe zone #{}\n",
        ctx.dependent_id, ctx.safezone_id
      );
    }
  });

  match settings.run_for {
    Some(limit) => {
      tokio::select! {
        _ = tokio::time::sleep(limit) => info!("time limit reached"),
        r = tokio::signal::ctrl_c() => r.context("waiting for Ctrl-C")?,
      }
    }
    None => tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?,
  }

  announce.abort();
  view.unmount().await;
  Ok(())
}
