//! [`GoogleDirections`]: the Directions web service as a
//! [`DirectionsService`].

use std::time::Duration;

use carewatch_core::{
  geo::Coordinate,
  route::{Route, RouteLeg, RouteRequest, RouteStep, TravelMode},
  service::DirectionsService,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result, polyline};

pub const DEFAULT_DIRECTIONS_URL: &str =
  "https://maps.googleapis.com/maps/api/directions/json";

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsConfig {
  pub api_key:      String,
  #[serde(default = "default_url")]
  pub base_url:     String,
  /// Language for instructions and distance text, e.g. `"th"`.
  #[serde(default)]
  pub language:     Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_url() -> String { DEFAULT_DIRECTIONS_URL.to_owned() }

fn default_timeout_secs() -> u64 { 10 }

impl DirectionsConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:      api_key.into(),
      base_url:     default_url(),
      language:     None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct GoogleDirections {
  client: Client,
  config: DirectionsConfig,
}

impl GoogleDirections {
  pub fn new(config: DirectionsConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }
}

fn latlng(p: Coordinate) -> String { format!("{},{}", p.lat, p.lng) }

impl DirectionsService for GoogleDirections {
  type Error = Error;

  async fn route(&self, request: RouteRequest) -> Result<Option<Route>> {
    let mut query = vec![
      ("origin", latlng(request.origin)),
      ("destination", latlng(request.destination)),
      ("mode", request.mode.as_str().to_owned()),
      ("key", self.config.api_key.clone()),
    ];
    if let Some(lang) = &self.config.language {
      query.push(("language", lang.clone()));
    }

    let resp = self
      .client
      .get(&self.config.base_url)
      .query(&query)
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        endpoint: "directions",
        status:   resp.status(),
      });
    }
    let body: Response = resp.json().await?;
    debug!(mode = request.mode.as_str(), status = %body.status, "directions response");
    body.into_route(request.mode)
  }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Response {
  status:        String,
  #[serde(default)]
  error_message: Option<String>,
  #[serde(default)]
  routes:        Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
  #[serde(default)]
  legs:              Vec<WireLeg>,
  overview_polyline: Option<Encoded>,
}

#[derive(Debug, Deserialize)]
struct Encoded {
  points: String,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
  distance: Option<Text>,
  duration: Option<Text>,
  #[serde(default)]
  steps:    Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
struct WireStep {
  #[serde(default)]
  html_instructions: String,
  distance:          Option<Text>,
  duration:          Option<Text>,
}

#[derive(Debug, Deserialize)]
struct Text {
  text: String,
}

fn text(t: Option<Text>) -> Option<String> { t.map(|t| t.text) }

impl Response {
  /// `ZERO_RESULTS` and `NOT_FOUND` are "no route"; any other non-`OK`
  /// status is an error.
  fn into_route(self, mode: TravelMode) -> Result<Option<Route>> {
    match self.status.as_str() {
      "OK" => {}
      "ZERO_RESULTS" | "NOT_FOUND" => return Ok(None),
      _ => {
        return Err(Error::Directions {
          status:  self.status,
          message: self.error_message.unwrap_or_default(),
        });
      }
    }
    let Some(route) = self.routes.into_iter().next() else {
      return Ok(None);
    };
    let polyline = match route.overview_polyline {
      Some(encoded) => polyline::decode(&encoded.points)?,
      None => Vec::new(),
    };
    let legs = route
      .legs
      .into_iter()
      .map(|leg| RouteLeg {
        distance: text(leg.distance),
        duration: text(leg.duration),
        steps:    leg
          .steps
          .into_iter()
          .map(|s| RouteStep {
            instructions: s.html_instructions,
            distance:     text(s.distance),
            duration:     text(s.duration),
          })
          .collect(),
      })
      .collect();
    Ok(Some(Route {
      mode,
      legs,
      polyline,
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use carewatch_core::route::RouteSummary;
  use serde_json::json;

  fn parse(v: serde_json::Value) -> Result<Option<Route>> {
    serde_json::from_value::<Response>(v)
      .unwrap()
      .into_route(TravelMode::Driving)
  }

  #[test]
  fn ok_response_maps_legs_and_polyline() {
    let route = parse(json!({
      "status": "OK",
      "routes": [{
        "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC" },
        "legs": [{
          "distance": { "text": "1.2 km", "value": 1200 },
          "duration": { "text": "4 mins", "value": 240 },
          "steps": [
            { "html_instructions": "Head <b>north</b>", "distance": { "text": "300 m" } },
            { "html_instructions": "Turn <b>left</b>" }
          ]
        }]
      }]
    }))
    .unwrap()
    .unwrap();

    assert_eq!(route.mode, TravelMode::Driving);
    assert_eq!(route.polyline.len(), 2);
    assert_eq!(route.legs[0].steps.len(), 2);
    assert_eq!(route.legs[0].steps[1].distance, None);

    let summary = RouteSummary::from_route(&route);
    assert_eq!(summary.instruction, "Head north");
    assert_eq!(summary.distance, "1.2 km");
    assert_eq!(summary.duration, "4 mins");
  }

  #[test]
  fn zero_results_is_no_route() {
    assert!(parse(json!({ "status": "ZERO_RESULTS", "routes": [] })).unwrap().is_none());
    assert!(parse(json!({ "status": "OK", "routes": [] })).unwrap().is_none());
  }

  #[test]
  fn other_statuses_are_errors() {
    let err = parse(json!({
      "status": "REQUEST_DENIED",
      "error_message": "The provided API key is invalid."
    }))
    .unwrap_err();
    match err {
      Error::Directions { status, message } => {
        assert_eq!(status, "REQUEST_DENIED");
        assert!(message.contains("API key"));
      }
      other => panic!("unexpected error: {other}"),
    }
  }
}
