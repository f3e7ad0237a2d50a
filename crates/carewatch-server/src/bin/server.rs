//! carewatch server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `CAREWATCH_*` environment variables, and serves the session API over
//! HTTP. Nested keys use a double underscore, e.g.
//! `CAREWATCH_BACKEND__BASE_URL`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use carewatch_client::{ApiClient, GoogleDirections};
use carewatch_server::{AppState, ServerConfig, Sessions, sessions::run_reaper};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Live caregiver tracking server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CAREWATCH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg
    .tracker
    .validate()
    .context("invalid [tracker] configuration")?;

  let obfuscator = server_cfg.backend.id_encoding.obfuscator();
  let directory =
    ApiClient::new(server_cfg.backend.clone()).context("failed to build backend client")?;
  let directions = GoogleDirections::new(server_cfg.directions.clone())
    .context("failed to build directions client")?;

  let sessions = Arc::new(Sessions::new(
    Arc::new(directory),
    Arc::new(directions),
    obfuscator,
    server_cfg.tracker.clone(),
    server_cfg.sessions.max_sessions,
  ));
  tokio::spawn(run_reaper(
    Arc::clone(&sessions),
    server_cfg.sessions.reap_period(),
    server_cfg.sessions.idle_ttl(),
  ));

  let state = AppState {
    sessions,
    config: Arc::new(server_cfg.sessions),
  };
  let app = carewatch_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
