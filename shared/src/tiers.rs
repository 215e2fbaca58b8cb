use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tile::PlayerId;

pub const CAPTURE_TIER_LOW: u32 = 200;
pub const CAPTURE_TIER_MID: u32 = 400;
pub const CAPTURE_TIER_HIGH: u32 = 800;

/// Territory-size thresholds that change a player's interior dither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTiers {
    pub low: u32,
    pub mid: u32,
    pub high: u32,
}

impl Default for CaptureTiers {
    fn default() -> Self {
        Self {
            low: CAPTURE_TIER_LOW,
            mid: CAPTURE_TIER_MID,
            high: CAPTURE_TIER_HIGH,
        }
    }
}

impl CaptureTiers {
    pub fn thresholds(&self) -> [u32; 3] {
        [self.low, self.mid, self.high]
    }

    /// Dither period for a territory of `tiles_owned` tiles, `None` once past `high`.
    pub fn dither_modulus(&self, tiles_owned: u32) -> Option<u32> {
        if tiles_owned < self.low {
            Some(2)
        } else if tiles_owned < self.mid {
            Some(4)
        } else if tiles_owned < self.high {
            Some(8)
        } else {
            None
        }
    }

    /// True if moving from `previous` to `current` touches or crosses any threshold.
    pub fn crossed(&self, previous: u32, current: u32) -> bool {
        self.thresholds().into_iter().any(|threshold| {
            let t = threshold as i64;
            (current as i64 - t) * (previous as i64 - t) <= 0
        })
    }
}

/// A player's territory changed tier; all of its tiles need repainting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCrossing {
    pub player: PlayerId,
    pub previous: u32,
    pub current: u32,
}

/// Last observed tile count per player.
#[derive(Debug, Default)]
pub struct TierTracker {
    tiers: CaptureTiers,
    counts: HashMap<PlayerId, u32>,
}

impl TierTracker {
    pub fn new(tiers: CaptureTiers) -> Self {
        Self {
            tiers,
            counts: HashMap::new(),
        }
    }

    /// Record `tiles_owned`; yields one crossing even if several thresholds were passed.
    pub fn observe(&mut self, player: PlayerId, tiles_owned: u32) -> Option<TierCrossing> {
        let previous = self.counts.insert(player, tiles_owned).unwrap_or(0);
        self.tiers
            .crossed(previous, tiles_owned)
            .then_some(TierCrossing {
                player,
                previous,
                current: tiles_owned,
            })
    }

    pub fn last_count(&self, player: PlayerId) -> Option<u32> {
        self.counts.get(&player).copied()
    }

    pub fn tracked_players(&self) -> usize {
        self.counts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_at(player: PlayerId, count: u32) -> TierTracker {
        let mut tracker = TierTracker::new(CaptureTiers::default());
        tracker.observe(player, count);
        tracker
    }

    #[test]
    fn crossing_low_tier_upward_fires_once() {
        let p = PlayerId(3);
        let mut tracker = tracker_at(p, 199);
        let crossing = tracker.observe(p, 201).expect("199 -> 201 crosses 200");
        assert_eq!(crossing.previous, 199);
        assert_eq!(crossing.current, 201);
        assert_eq!(tracker.observe(p, 201), None);
    }

    #[test]
    fn crossing_downward_fires() {
        for (from, to) in [(201, 199), (450, 390), (900, 700)] {
            let p = PlayerId(1);
            let mut tracker = tracker_at(p, from);
            assert!(tracker.observe(p, to).is_some(), "{from} -> {to}");
        }
    }

    #[test]
    fn movement_within_a_tier_is_silent() {
        let p = PlayerId(2);
        let mut tracker = tracker_at(p, 205);
        assert_eq!(tracker.observe(p, 210), None);
        assert_eq!(tracker.observe(p, 399), None);
        assert_eq!(tracker.observe(p, 1000).map(|c| c.current), Some(1000));
        assert_eq!(tracker.observe(p, 5000), None);
    }

    #[test]
    fn jump_across_all_tiers_yields_single_crossing() {
        let p = PlayerId(4);
        let mut tracker = tracker_at(p, 10);
        assert!(tracker.observe(p, 900).is_some());
        assert_eq!(tracker.last_count(p), Some(900));
    }

    #[test]
    fn first_observation_compares_against_zero() {
        let mut tracker = TierTracker::new(CaptureTiers::default());
        assert_eq!(tracker.observe(PlayerId(1), 50), None);
        assert!(tracker.observe(PlayerId(2), 250).is_some());
        assert_eq!(tracker.tracked_players(), 2);
    }

    #[test]
    fn dither_modulus_follows_tiers() {
        let tiers = CaptureTiers::default();
        assert_eq!(tiers.dither_modulus(4), Some(2));
        assert_eq!(tiers.dither_modulus(200), Some(4));
        assert_eq!(tiers.dither_modulus(799), Some(8));
        assert_eq!(tiers.dither_modulus(800), None);
    }
}
