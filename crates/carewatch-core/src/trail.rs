//! Bounded recent-history of a tracked person's positions.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use crate::{Error, Result, geo::Coordinate};

/// How many positions the map draws behind the dependent.
pub const DEFAULT_TRAIL_CAPACITY: usize = 30;

/// Ordered positions, most recent last.
///
/// Holds at most `capacity` entries, evicting the oldest on overflow, and
/// never stores two consecutive equal coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
  points:   VecDeque<Coordinate>,
  capacity: usize,
}

impl Default for Trail {
  fn default() -> Self {
    Self {
      points:   VecDeque::with_capacity(DEFAULT_TRAIL_CAPACITY),
      capacity: DEFAULT_TRAIL_CAPACITY,
    }
  }
}

impl Trail {
  pub fn with_capacity(capacity: usize) -> Result<Self> {
    if capacity == 0 {
      return Err(Error::ZeroTrailCapacity);
    }
    Ok(Self {
      points: VecDeque::with_capacity(capacity),
      capacity,
    })
  }

  /// Append `point` unless it equals the last entry. Returns whether the
  /// trail changed.
  pub fn push(&mut self, point: Coordinate) -> bool {
    if self.points.back() == Some(&point) {
      return false;
    }
    if self.points.len() == self.capacity {
      self.points.pop_front();
    }
    self.points.push_back(point);
    true
  }

  pub fn len(&self) -> usize { self.points.len() }

  pub fn is_empty(&self) -> bool { self.points.is_empty() }

  pub fn last(&self) -> Option<Coordinate> { self.points.back().copied() }

  pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
    self.points.iter().copied()
  }

  pub fn to_vec(&self) -> Vec<Coordinate> { self.iter().collect() }
}

impl Serialize for Trail {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(self.points.iter())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(i: u32) -> Coordinate {
    Coordinate::new(13.0 + f64::from(i) * 1e-4, 100.0)
  }

  #[test]
  fn skips_repeat_of_last_point() {
    let mut trail = Trail::default();
    assert!(trail.push(p(1)));
    assert!(!trail.push(p(1)));
    assert!(trail.push(p(2)));
    // Equal to an older entry but not the last one: kept.
    assert!(trail.push(p(1)));
    assert_eq!(trail.to_vec(), vec![p(1), p(2), p(1)]);
  }

  #[test]
  fn evicts_oldest_beyond_capacity() {
    let mut trail = Trail::default();
    for i in 0..45 {
      trail.push(p(i));
    }
    assert_eq!(trail.len(), DEFAULT_TRAIL_CAPACITY);
    assert_eq!(trail.iter().next(), Some(p(15)));
    assert_eq!(trail.last(), Some(p(44)));
  }

  #[test]
  fn bound_and_no_consecutive_duplicates_hold_for_any_sequence() {
    // A deterministic pseudo-random walk with many repeats.
    let mut trail = Trail::default();
    let mut seed: u32 = 0x2545_f491;
    for _ in 0..2_000 {
      seed ^= seed << 13;
      seed ^= seed >> 17;
      seed ^= seed << 5;
      trail.push(p(seed % 4));

      assert!(trail.len() <= DEFAULT_TRAIL_CAPACITY);
      let pts = trail.to_vec();
      assert!(pts.windows(2).all(|w| w[0] != w[1]));
    }
  }

  #[test]
  fn zero_capacity_is_rejected() {
    assert!(Trail::with_capacity(0).is_err());
    let mut one = Trail::with_capacity(1).unwrap();
    one.push(p(1));
    one.push(p(2));
    assert_eq!(one.to_vec(), vec![p(2)]);
  }

  #[test]
  fn serializes_as_plain_array() {
    let mut trail = Trail::default();
    trail.push(Coordinate::new(1.0, 2.0));
    let json = serde_json::to_value(&trail).unwrap();
    assert_eq!(json, serde_json::json!([{ "lat": 1.0, "lng": 2.0 }]));
  }
}
