//! External navigation handoff and on-map label placement.

use serde::{Deserialize, Serialize};

use crate::{geo::Coordinate, route::TravelMode};

const MAPS_DIR_URL: &str = "https://www.google.com/maps/dir/";

// ─── Deep link ───────────────────────────────────────────────────────────────

/// Destination for an external turn-by-turn app.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavLinkTarget {
  pub destination: Coordinate,
}

impl NavLinkTarget {
  pub fn new(destination: Coordinate) -> Self { Self { destination } }

  /// A universal maps URL that opens turn-by-turn driving directions to the
  /// destination from the device's current position.
  pub fn deep_link(&self) -> String {
    let destination =
      format!("{},{}", self.destination.lat, self.destination.lng);
    format!(
      "{MAPS_DIR_URL}?api=1&destination={}&travelmode={}&dir_action=navigate",
      urlencoding::encode(&destination),
      TravelMode::Driving.as_str(),
    )
  }
}

// ─── Label placement ─────────────────────────────────────────────────────────

/// Pixel offset of a label's top-left corner from its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelOffset {
  pub x: i32,
  pub y: i32,
}

/// Where the two name labels go relative to their markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPlacement {
  pub dependent: PixelOffset,
  pub caregiver: PixelOffset,
}

/// Place labels of `width` x `height` pixels. When the markers overlap the
/// labels are pushed to opposite corners; otherwise the dependent's label sits
/// centred above its marker and the caregiver's centred below.
pub fn place_labels(close: bool, width: i32, height: i32) -> LabelPlacement {
  if close {
    LabelPlacement {
      dependent: PixelOffset { x: 14, y: 8 },
      caregiver: PixelOffset {
        x: -width - 14,
        y: -height - 12,
      },
    }
  } else {
    let centred = (-width).div_euclid(2);
    LabelPlacement {
      dependent: PixelOffset {
        x: centred,
        y: -height - 12,
      },
      caregiver: PixelOffset { x: centred, y: 10 },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deep_link_encodes_destination() {
    let link = NavLinkTarget::new(Coordinate::new(13.76, 100.505)).deep_link();
    assert_eq!(
      link,
      "https://www.google.com/maps/dir/?api=1&destination=13.76%2C100.505\
       &travelmode=driving&dir_action=navigate"
    );
  }

  #[test]
  fn deep_link_keeps_negative_sign() {
    let link = NavLinkTarget::new(Coordinate::new(-33.5, -70.25)).deep_link();
    assert!(link.contains("destination=-33.5%2C-70.25&"), "{link}");
  }

  #[test]
  fn labels_split_when_close() {
    let p = place_labels(true, 80, 20);
    assert_eq!(p.dependent, PixelOffset { x: 14, y: 8 });
    assert_eq!(p.caregiver, PixelOffset { x: -94, y: -32 });
  }

  #[test]
  fn labels_centre_when_apart() {
    let p = place_labels(false, 81, 20);
    // floor(-81 / 2) == -41
    assert_eq!(p.dependent, PixelOffset { x: -41, y: -32 });
    assert_eq!(p.caregiver, PixelOffset { x: -41, y: 10 });
  }
}
