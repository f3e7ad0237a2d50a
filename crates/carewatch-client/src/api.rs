//! [`ApiClient`]: the care backend's JSON API as a [`CareDirectory`].

use std::time::Duration;

use carewatch_core::{
  context::{Caregiver, Dependent, IdentityContext, SafeZone},
  geo::Coordinate,
  service::CareDirectory,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::trace;

use crate::{
  Error, Result,
  obfuscate::IdEncoding,
  wire::{Envelope, LocationRecord, SafezoneRecord, TakecareRecord, UserRecord},
};

/// Connection settings for the care backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Origin the `/api/...` paths are appended to.
  pub base_url:     String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// How the caregiver id is encoded for the relationship lookup.
  #[serde(default)]
  pub id_encoding:  IdEncoding,
}

fn default_timeout_secs() -> u64 { 10 }

impl ApiConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url:     base_url.into(),
      timeout_secs: default_timeout_secs(),
      id_encoding:  IdEncoding::default(),
    }
  }
}

/// Async HTTP client for the care backend.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ApiConfig { &self.config }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send `req` and unwrap the `data` envelope. A 404 or a `null` record is
  /// `Ok(None)`.
  async fn fetch<T: DeserializeOwned>(
    &self,
    endpoint: &'static str,
    req: RequestBuilder,
  ) -> Result<Option<T>> {
    let resp = req.send().await?;
    match resp.status() {
      StatusCode::NOT_FOUND => return Ok(None),
      s if !s.is_success() => {
        return Err(Error::Status {
          endpoint,
          status: s,
        });
      }
      _ => {}
    }
    let envelope: Envelope<T> = resp.json().await?;
    trace!(endpoint, found = envelope.data.is_some(), "backend response");
    Ok(envelope.data)
  }
}

impl CareDirectory for ApiClient {
  type Error = Error;

  /// `GET /api/user/getUser/{token}`
  async fn caregiver_by_token<'a>(&'a self, token: &'a str) -> Result<Option<Caregiver>> {
    let path = format!("/user/getUser/{}", urlencoding::encode(token));
    let req = self.client.get(self.url(&path));
    self
      .fetch::<UserRecord>("getUser", req)
      .await?
      .map(UserRecord::into_caregiver)
      .transpose()
  }

  /// `GET /api/user/getUserTakecareperson/{obfuscated}`
  async fn dependent_of<'a>(
    &'a self,
    obfuscated_caregiver_id: &'a str,
  ) -> Result<Option<Dependent>> {
    let path = format!(
      "/user/getUserTakecareperson/{}",
      urlencoding::encode(obfuscated_caregiver_id)
    );
    let req = self.client.get(self.url(&path));
    self
      .fetch::<TakecareRecord>("getUserTakecareperson", req)
      .await?
      .map(TakecareRecord::into_dependent)
      .transpose()
  }

  /// `GET /api/setting/getSafezone?takecare_id=&users_id=&id=`
  async fn safe_zone(
    &self,
    dependent_id: u64,
    caregiver_id: u64,
    zone_id: Option<u64>,
  ) -> Result<Option<SafeZone>> {
    let req = self.client.get(self.url("/setting/getSafezone")).query(&[
      ("takecare_id", dependent_id.to_string()),
      ("users_id", caregiver_id.to_string()),
      ("id", zone_id.map(|id| id.to_string()).unwrap_or_default()),
    ]);
    self
      .fetch::<SafezoneRecord>("getSafezone", req)
      .await?
      .map(|r| r.into_safe_zone(zone_id))
      .transpose()
  }

  /// `GET /api/location/getLocation?takecare_id=&users_id=&safezone_id=`
  async fn latest_location(&self, ctx: IdentityContext) -> Result<Option<Coordinate>> {
    let req = self.client.get(self.url("/location/getLocation")).query(&[
      ("takecare_id", ctx.dependent_id),
      ("users_id", ctx.caregiver_id),
      ("safezone_id", ctx.safezone_id),
    ]);
    self
      .fetch::<LocationRecord>("getLocation", req)
      .await?
      .map(LocationRecord::into_coordinate)
      .transpose()
  }
}
