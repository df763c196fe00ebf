//! Rig configuration parameters
//!
//! All tunable parameters for the dispenser. Values come from a JSON
//! document (see [`crate::adapters::config_source`]); any field missing
//! from the document keeps its default.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::recipe::MAX_CHANNELS;

/// Default poll tick. Bounds how far past its target a channel can run.
pub const DEFAULT_POLL_TICK_MS: u32 = 10;

/// Core rig configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    // --- Pumps ---
    /// Milliseconds for one pump to pour a tenth of a unit
    pub pour_rate_ms: u32,
    /// Global drink-size multiplier (1.0 = recipe units as written)
    pub scale_factor: f32,
    /// Number of pump channels wired to the rig
    pub channel_count: u8,

    // --- Pour session ---
    /// Minimum gap (ms) after a pour starts or ends before another is accepted
    pub debounce_window_ms: u32,
    /// Engine poll interval (ms)
    pub poll_tick_ms: u32,
    /// Pause between accepting a pour and announcing it (ms)
    pub announce_delay_ms: u32,

    // --- Manual control ---
    /// Settle time between all-off and an all-forward/all-reverse command (ms)
    pub reverse_settle_ms: u32,

    // --- Worker ---
    /// Stack size of the pour worker thread (KiB)
    pub worker_stack_kb: usize,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            // Pumps
            pour_rate_ms: 286,
            scale_factor: 1.0,
            channel_count: 8,

            // Pour session
            debounce_window_ms: 1000,
            poll_tick_ms: DEFAULT_POLL_TICK_MS,
            announce_delay_ms: 200,

            // Manual control
            reverse_settle_ms: 50,

            // Worker
            worker_stack_kb: 8,
        }
    }
}

impl RigConfig {
    /// Range-check every field. Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pour_rate_ms == 0 {
            return Err(ConfigError::ValidationFailed("pour_rate_ms must be > 0"));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(ConfigError::ValidationFailed("scale_factor must be > 0"));
        }
        if self.channel_count == 0 || self.channel_count as usize > MAX_CHANNELS {
            return Err(ConfigError::ValidationFailed("channel_count out of range"));
        }
        if self.poll_tick_ms == 0 || self.poll_tick_ms > 1000 {
            return Err(ConfigError::ValidationFailed("poll_tick_ms must be 1..=1000"));
        }
        if self.worker_stack_kb < 4 {
            return Err(ConfigError::ValidationFailed("worker_stack_kb must be >= 4"));
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_window_ms))
    }

    pub fn poll_tick(&self) -> Duration {
        Duration::from_millis(u64::from(self.poll_tick_ms))
    }

    pub fn announce_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.announce_delay_ms))
    }

    pub fn reverse_settle(&self) -> Duration {
        Duration::from_millis(u64::from(self.reverse_settle_ms))
    }
}
