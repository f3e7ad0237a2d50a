//! Decoder for the encoded polyline format used by the directions API.
//!
//! Each coordinate is a pair of zig-zag varints in base-64 chunks of five
//! bits, offset by 63, delta-encoded against the previous point at 1e-5
//! degree precision.

use carewatch_core::geo::Coordinate;

use crate::{Error, Result};

const PRECISION: f64 = 1e5;

/// Values are at most 32 bits: seven five-bit chunks.
const MAX_SHIFT: u32 = 30;

fn invalid(message: String) -> Error {
  Error::Decode {
    endpoint: "directions",
    message,
  }
}

fn next_value(bytes: &mut impl Iterator<Item = u8>) -> Result<Option<i64>> {
  let mut result: i64 = 0;
  let mut shift = 0u32;
  let mut first = true;
  loop {
    let Some(byte) = bytes.next() else {
      return if first { Ok(None) } else { Err(truncated()) };
    };
    first = false;
    if !(63..=126).contains(&byte) {
      return Err(invalid(format!("invalid polyline byte {byte:#x}")));
    }
    if shift > MAX_SHIFT {
      return Err(invalid("polyline value exceeds 32 bits".into()));
    }
    let chunk = i64::from(byte - 63);
    result |= (chunk & 0x1f) << shift;
    shift += 5;
    if chunk < 0x20 {
      break;
    }
  }
  let value = if result & 1 == 1 { !(result >> 1) } else { result >> 1 };
  Ok(Some(value))
}

fn truncated() -> Error { invalid("truncated polyline".into()) }

/// Decode an encoded polyline into coordinates.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>> {
  let mut bytes = encoded.bytes();
  let mut points = Vec::new();
  let (mut lat, mut lng) = (0i64, 0i64);
  while let Some(dlat) = next_value(&mut bytes)? {
    let dlng = next_value(&mut bytes)?.ok_or_else(truncated)?;
    lat = lat
      .checked_add(dlat)
      .ok_or_else(|| invalid("polyline latitude overflow".into()))?;
    lng = lng
      .checked_add(dlng)
      .ok_or_else(|| invalid("polyline longitude overflow".into()))?;
    points.push(Coordinate::try_new(
      lat as f64 / PRECISION,
      lng as f64 / PRECISION,
    )?);
  }
  Ok(points)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assert_close(a: Coordinate, lat: f64, lng: f64) {
    assert!((a.lat - lat).abs() < 1e-9, "{} != {lat}", a.lat);
    assert!((a.lng - lng).abs() < 1e-9, "{} != {lng}", a.lng);
  }

  #[test]
  fn decodes_reference_polyline() {
    // The worked example from the format's documentation.
    let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
    assert_eq!(points.len(), 3);
    assert_close(points[0], 38.5, -120.2);
    assert_close(points[1], 40.7, -120.95);
    assert_close(points[2], 43.252, -126.453);
  }

  #[test]
  fn empty_input_is_empty_path() {
    assert!(decode("").unwrap().is_empty());
  }

  #[test]
  fn truncated_input_is_rejected() {
    // Latitude only.
    assert!(decode("_p~iF").is_err());
    // Continuation bit set on the last byte.
    assert!(decode("_p~iF~").is_err());
  }

  #[test]
  fn oversized_values_are_rejected() {
    // Twelve continuation chunks: far wider than any coordinate delta.
    let wide = format!("}}{}F", "~".repeat(11)).repeat(6);
    assert!(matches!(decode(&wide), Err(Error::Decode { .. })));
  }

  #[test]
  fn deltas_leaving_the_globe_are_rejected() {
    // `_gjaR` is a delta of +100 degrees.
    let path = "_gjaR_gjaR";
    assert!(matches!(decode(path), Err(Error::Record(_))));
  }

  #[test]
  fn bytes_outside_alphabet_are_rejected() {
    assert!(decode("_p~iF ps|U").is_err());
  }
}
