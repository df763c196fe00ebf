//! Pour session — the per-pour value object.
//!
//! Holds the drink, its validated recipe, the scale factor, the start
//! timestamp, and one [`ChannelPlan`] per channel the recipe uses. The
//! coordinator creates a session, the engine drives it to completion,
//! and it is dropped with the worker thread. No pump flags live anywhere
//! else.

use core::time::Duration;

use crate::error::RecipeError;
use crate::recipe::{Channel, MAX_CHANNELS, Recipe, pour_duration, validate_scale};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Planned, not yet energized.
    Idle,
    /// Running forward; waiting for its target duration.
    Pouring,
    /// Turned off at its target.
    Done,
    /// The driver failed a command; the channel is no longer tracked.
    Faulted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelPlan {
    pub channel: Channel,
    /// ON time measured from the session start.
    pub target: Duration,
    pub state: ChannelState,
}

#[derive(Debug, Clone)]
pub struct PourSession {
    drink: String,
    recipe: Recipe,
    scale: f32,
    plans: heapless::Vec<ChannelPlan, MAX_CHANNELS>,
    started_at: Option<Duration>,
}

impl PourSession {
    /// Plan a pour. Channels with a zero quantity get no plan at all.
    pub fn new(
        drink: impl Into<String>,
        recipe: Recipe,
        scale: f32,
        pour_rate_ms: u32,
    ) -> Result<Self, RecipeError> {
        let scale = validate_scale(scale)?;
        let mut plans = heapless::Vec::new();
        for (channel, quantity) in recipe.active_channels() {
            // At most one plan per recipe entry.
            let _ = plans.push(ChannelPlan {
                channel,
                target: pour_duration(quantity, pour_rate_ms, scale),
                state: ChannelState::Idle,
            });
        }

        Ok(Self {
            drink: drink.into(),
            recipe,
            scale,
            plans,
            started_at: None,
        })
    }

    pub fn drink(&self) -> &str {
        &self.drink
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    pub fn plans(&self) -> &[ChannelPlan] {
        &self.plans
    }

    /// Longest target; the nominal length of the whole pour.
    pub fn nominal_length(&self) -> Duration {
        self.plans
            .iter()
            .map(|p| p.target)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    pub fn pouring_count(&self) -> usize {
        self.plans
            .iter()
            .filter(|p| p.state == ChannelState::Pouring)
            .count()
    }

    /// True once no channel is still flagged as pouring.
    pub fn is_finished(&self) -> bool {
        self.pouring_count() == 0
    }

    /// Plan indices whose target has been reached at `elapsed`, shortest
    /// target first (ties in channel order).
    pub fn due(&self, elapsed: Duration) -> heapless::Vec<usize, MAX_CHANNELS> {
        let mut due: heapless::Vec<usize, MAX_CHANNELS> = self
            .plans
            .iter()
            .enumerate()
            .filter(|(_, p)| p.state == ChannelState::Pouring && elapsed >= p.target)
            .map(|(i, _)| i)
            .collect();
        due.sort_unstable_by_key(|&i| (self.plans[i].target, self.plans[i].channel));
        due
    }

    /// Earliest target among channels still pouring.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.plans
            .iter()
            .filter(|p| p.state == ChannelState::Pouring)
            .map(|p| p.target)
            .min()
    }

    /// Indices of channels still pouring, in channel order.
    pub fn pouring(&self) -> heapless::Vec<usize, MAX_CHANNELS> {
        self.plans
            .iter()
            .enumerate()
            .filter(|(_, p)| p.state == ChannelState::Pouring)
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn mark_started(&mut self, t0: Duration) {
        self.started_at = Some(t0);
    }

    pub(crate) fn set_state(&mut self, index: usize, state: ChannelState) {
        if let Some(plan) = self.plans.get_mut(index) {
            plan.state = state;
        }
    }
}
