//! Game settings and tunables
//!
//! Supplied by the host as JSON. Nothing is persisted between runs.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// What counts as a completed move once a released block settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlacementPolicy {
    /// Any settled release completes the round
    AcceptAny,
    /// The released block must rest in the topmost band, otherwise the
    /// tower is rewound to the start of the round and the player retries
    #[default]
    RequireTopmost,
}

impl PlacementPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementPolicy::AcceptAny => "AcceptAny",
            PlacementPolicy::RequireTopmost => "RequireTopmost",
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Nominal block thickness (world units)
    pub block_height: f32,
    /// Speed above which any block marks the tower as moving
    pub velocity_threshold: f32,
    /// Per-axis jitter applied at every new game
    pub jitter_max_offset: f32,
    /// Legality rule for a settled release
    pub placement_policy: PlacementPolicy,
    /// Seed for the jitter RNG
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            block_height: DEFAULT_BLOCK_HEIGHT,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            jitter_max_offset: DEFAULT_JITTER_OFFSET,
            placement_policy: PlacementPolicy::default(),
            seed: 0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => {
                log::info!("Loaded settings ({})", settings.placement_policy.as_str());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Invalid settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        // Plain data with no maps keyed by non-strings: serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Replace non-finite or out-of-range tunables with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.block_height.is_finite() || self.block_height <= 0.0 {
            self.block_height = defaults.block_height;
        }
        if !self.velocity_threshold.is_finite() || self.velocity_threshold < 0.0 {
            self.velocity_threshold = defaults.velocity_threshold;
        }
        if !self.jitter_max_offset.is_finite() || self.jitter_max_offset < 0.0 {
            self.jitter_max_offset = defaults.jitter_max_offset;
        }
        self
    }

    /// Half the block height: blocks this close to the tallest are "on top"
    pub fn topmost_tolerance(&self) -> f32 {
        self.block_height / 2.0
    }
}
