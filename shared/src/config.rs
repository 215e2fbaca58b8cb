use serde::{Deserialize, Serialize};

use crate::error::RasterError;
use crate::tiers::CaptureTiers;

pub const DEFAULT_REFRESH_INTERVAL_MS: f64 = 10.0;
pub const DEFAULT_DRAG_SUPPRESSION_MS: f64 = 200.0;
pub const DEFAULT_DRAIN_DIVISOR: usize = 10;
pub const DEFAULT_DEFENSE_POST_RANGE: u32 = 30;
pub const DEFAULT_SPAWN_HIGHLIGHT_RADIUS: u32 = 9;
pub const DEFAULT_SPAWN_HIGHLIGHT_INTERVAL: u64 = 5;
pub const DEFAULT_QUEUE_SEED: u64 = 123;
pub const DEFAULT_MAX_JITTER: f64 = 0.5;

/// Tunables of the territory renderer. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub refresh_interval_ms: f64,
    pub drag_suppression_ms: f64,
    pub drain_divisor: usize,
    pub capture_tiers: CaptureTiers,
    pub defense_post_range: u32,
    pub spawn_highlight_radius: u32,
    pub spawn_highlight_interval: u64,
    pub queue_seed: u64,
    pub max_jitter: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            drag_suppression_ms: DEFAULT_DRAG_SUPPRESSION_MS,
            drain_divisor: DEFAULT_DRAIN_DIVISOR,
            capture_tiers: CaptureTiers::default(),
            defense_post_range: DEFAULT_DEFENSE_POST_RANGE,
            spawn_highlight_radius: DEFAULT_SPAWN_HIGHLIGHT_RADIUS,
            spawn_highlight_interval: DEFAULT_SPAWN_HIGHLIGHT_INTERVAL,
            queue_seed: DEFAULT_QUEUE_SEED,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, RasterError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RasterError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RasterError> {
        let invalid = |msg: String| Err(RasterError::InvalidConfig(msg));
        if self.drain_divisor == 0 {
            return invalid("drain_divisor must be positive".into());
        }
        if self.spawn_highlight_interval == 0 {
            return invalid("spawn_highlight_interval must be positive".into());
        }
        let non_negative = |ms: f64| ms.is_finite() && ms >= 0.0;
        if !non_negative(self.refresh_interval_ms) || !non_negative(self.drag_suppression_ms) {
            return invalid("timer windows must be non-negative".into());
        }
        let tiers = self.capture_tiers;
        if !(tiers.low < tiers.mid && tiers.mid < tiers.high) {
            return invalid(format!(
                "capture tiers must ascend, got {}/{}/{}",
                tiers.low, tiers.mid, tiers.high
            ));
        }
        if self.max_jitter.is_nan() || self.max_jitter <= 0.0 || self.max_jitter > 1.0 {
            return invalid(format!("max_jitter {} outside (0, 1]", self.max_jitter));
        }
        Ok(())
    }
}
