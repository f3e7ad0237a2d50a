//! Command-line flags merged over the optional TOML config file.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use carewatch_client::{ApiConfig, DirectionsConfig, obfuscate::IdEncoding};
use carewatch_core::{context::NavParams, geo::Coordinate};
use carewatch_tracker::TrackerConfig;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
#[command(name = "carewatch", about = "Watch a dependent's live position from the terminal")]
pub struct Args {
  /// Path to a TOML config file (backend_url, maps_key, [tracker]).
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Origin of the care backend.
  #[arg(long, env = "CAREWATCH_BACKEND_URL")]
  pub backend_url: Option<String>,

  /// Directions API key.
  #[arg(long, env = "CAREWATCH_MAPS_KEY", hide_env_values = true)]
  pub maps_key: Option<String>,

  /// Caregiver access token.
  #[arg(long, env = "CAREWATCH_TOKEN", hide_env_values = true)]
  pub token: Option<String>,

  /// Safe zone to watch; the pair's default zone when omitted.
  #[arg(long)]
  pub safezone: Option<u64>,

  /// Fixed caregiver position as `lat,lng`. Without it the caregiver is
  /// placed at the safe-zone centre.
  #[arg(long, value_parser = parse_coordinate)]
  pub at: Option<Coordinate>,

  /// Stop after this many seconds instead of waiting for Ctrl-C.
  #[arg(long)]
  pub for_secs: Option<u64>,

  #[arg(long, value_enum)]
  pub id_encoding: Option<Encoding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
  Plain,
  Base64,
}

impl From<Encoding> for IdEncoding {
  fn from(e: Encoding) -> Self {
    match e {
      Encoding::Plain => IdEncoding::Plain,
      Encoding::Base64 => IdEncoding::Base64,
    }
  }
}

pub fn parse_coordinate(s: &str) -> Result<Coordinate> {
  let (lat, lng) = s
    .split_once(',')
    .context("expected `lat,lng`")?;
  let lat: f64 = lat.trim().parse().context("latitude is not a number")?;
  let lng: f64 = lng.trim().parse().context("longitude is not a number")?;
  Ok(Coordinate::try_new(lat, lng)?)
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
pub struct ConfigFile {
  #[serde(default)]
  pub backend_url: String,
  #[serde(default)]
  pub maps_key:    String,
  #[serde(default)]
  pub id_encoding: Option<IdEncoding>,
  #[serde(default)]
  pub tracker:     TrackerConfig,
}

impl ConfigFile {
  pub fn load(path: &std::path::Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }
}

// ─── Merged settings ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Settings {
  pub backend:    ApiConfig,
  pub directions: DirectionsConfig,
  pub tracker:    TrackerConfig,
  pub params:     NavParams,
  pub caregiver:  Option<Coordinate>,
  pub run_for:    Option<Duration>,
}

fn pick(flag: Option<String>, file: String) -> Option<String> {
  flag.or_else(|| (!file.is_empty()).then_some(file))
}

impl Settings {
  /// Flags override the config file, which overrides defaults.
  pub fn merge(args: Args, file: ConfigFile) -> Result<Self> {
    let Some(backend_url) = pick(args.backend_url, file.backend_url) else {
      bail!("no backend URL: pass --backend-url or set backend_url in the config file");
    };
    let maps_key = pick(args.maps_key, file.maps_key).unwrap_or_default();
    file.tracker.validate().context("invalid [tracker] configuration")?;

    let mut backend = ApiConfig::new(backend_url);
    backend.id_encoding = args
      .id_encoding
      .map(IdEncoding::from)
      .or(file.id_encoding)
      .unwrap_or_default();

    Ok(Self {
      backend,
      directions: DirectionsConfig::new(maps_key),
      tracker: file.tracker,
      params: NavParams {
        access_token: args.token,
        safezone_id:  args.safezone,
        location_id:  None,
        role:         None,
      },
      caregiver: args.at,
      run_for: args.for_secs.map(Duration::from_secs),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn coordinates_parse() {
    assert_eq!(
      parse_coordinate("13.75, 100.5").unwrap(),
      Coordinate::new(13.75, 100.5)
    );
    assert!(parse_coordinate("13.75").is_err());
    assert!(parse_coordinate("north,100").is_err());
    assert!(parse_coordinate("-91,100").is_err());
  }

  #[test]
  fn flags_override_file() {
    let file: ConfigFile = toml::from_str(
      r#"
        backend_url = "https://file.example"
        maps_key = "file-key"
        id_encoding = "plain"

        [tracker]
        poll_interval_ms = 2000
      "#,
    )
    .unwrap();
    let args = Args {
      backend_url: Some("https://flag.example".into()),
      token: Some("tok".into()),
      safezone: Some(4),
      ..Args::default()
    };
    let s = Settings::merge(args, file).unwrap();
    assert_eq!(s.backend.base_url, "https://flag.example");
    assert_eq!(s.backend.id_encoding, IdEncoding::Plain);
    assert_eq!(s.directions.api_key, "file-key");
    assert_eq!(s.tracker.poll_interval_ms, 2000);
    assert_eq!(s.params.resolution_key(), Some(("tok".into(), 4)));
    assert!(s.run_for.is_none());
  }

  #[test]
  fn backend_url_is_required() {
    assert!(Settings::merge(Args::default(), ConfigFile::default()).is_err());
  }
}
