//! Channels, recipes, and the recipe → duration arithmetic.
//!
//! A recipe is one non-negative quantity per channel, in tenths of a
//! volume unit. A channel's ON time is `quantity * pour_rate_ms * scale`.
//! Durations are rounded to the microsecond so `5 * 286 * 2.0` is exactly
//! 2860 ms rather than a float truncated a nanosecond short.

use core::fmt;
use core::time::Duration;

use crate::error::RecipeError;

/// Upper bound on channels any rig may configure (sizes stack buffers).
pub const MAX_CHANNELS: usize = 16;

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A 1-based pump channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
    /// `None` for channel 0 or anything past [`MAX_CHANNELS`].
    pub const fn new(number: u8) -> Option<Self> {
        if number == 0 || number as usize > MAX_CHANNELS {
            None
        } else {
            Some(Self(number))
        }
    }

    /// Channel for a 0-based recipe index.
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u8 + 1)
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// All channels `1..=count`.
    pub fn all(count: u8) -> impl Iterator<Item = Channel> {
        (1..=count.min(MAX_CHANNELS as u8)).map(Channel)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A validated per-channel pour vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    quantities: heapless::Vec<f32, MAX_CHANNELS>,
}

impl Recipe {
    /// Validate `quantities` against the rig's channel count.
    pub fn new(quantities: &[f32], channel_count: u8) -> Result<Self, RecipeError> {
        if quantities.len() != channel_count as usize || quantities.len() > MAX_CHANNELS {
            return Err(RecipeError::WrongLength {
                expected: channel_count,
                actual: quantities.len(),
            });
        }

        let mut out = heapless::Vec::new();
        for (index, &q) in quantities.iter().enumerate() {
            if !q.is_finite() || q < 0.0 {
                return Err(RecipeError::NegativeEntry { index });
            }
            // Capacity checked above.
            let _ = out.push(q);
        }
        Ok(Self { quantities: out })
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Quantity for `channel`, `0.0` if the channel is past the recipe.
    pub fn quantity(&self, channel: Channel) -> f32 {
        self.quantities.get(channel.index()).copied().unwrap_or(0.0)
    }

    /// Channels with a non-zero quantity, in channel order.
    pub fn active_channels(&self) -> impl Iterator<Item = (Channel, f32)> + '_ {
        self.quantities
            .iter()
            .enumerate()
            .filter(|(_, q)| **q > 0.0)
            .map(|(i, q)| (Channel::from_index(i), *q))
    }

    /// True when no channel pours anything.
    pub fn is_dry(&self) -> bool {
        self.active_channels().next().is_none()
    }

    pub fn quantities(&self) -> &[f32] {
        &self.quantities
    }
}

/// Check a scale factor before it reaches the engine.
pub fn validate_scale(scale: f32) -> Result<f32, RecipeError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(RecipeError::BadScale)
    }
}

/// ON time for `quantity` tenths at `pour_rate_ms` per tenth, scaled.
pub fn pour_duration(quantity: f32, pour_rate_ms: u32, scale: f32) -> Duration {
    let micros = f64::from(quantity) * f64::from(pour_rate_ms) * f64::from(scale) * 1000.0;
    Duration::from_micros(micros.round().max(0.0) as u64)
}
