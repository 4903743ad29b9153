//! Fixed-tick simulation clock
//!
//! The interaction core advances once per simulation tick. Frame deltas are
//! accumulated here and converted into a whole number of fixed ticks.

use serde::{Deserialize, Serialize};

/// Configuration for the simulation clock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Fixed tick length in seconds
    pub fixed_timestep: f32,
    /// Maximum frame delta accepted, prevents a spiral of death after stalls
    pub max_delta_time: f32,
    /// Upper bound on ticks run for a single frame
    pub max_ticks_per_frame: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
            max_ticks_per_frame: 8,
        }
    }
}

impl TickConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), TickConfigError> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(TickConfigError::InvalidTimestep(self.fixed_timestep));
        }
        if !(self.max_delta_time.is_finite() && self.max_delta_time > 0.0) {
            return Err(TickConfigError::InvalidMaxDelta(self.max_delta_time));
        }
        if self.max_ticks_per_frame == 0 {
            return Err(TickConfigError::ZeroTickBudget);
        }
        Ok(())
    }
}

/// Errors raised by an unusable clock configuration
#[derive(Debug, Clone, thiserror::Error)]
pub enum TickConfigError {
    #[error("fixed timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),

    #[error("max_delta_time must be positive and finite, got {0}")]
    InvalidMaxDelta(f32),

    #[error("max_ticks_per_frame must be at least 1")]
    ZeroTickBudget,
}

/// Accumulates frame time into fixed simulation ticks
#[derive(Debug, Clone)]
pub struct TickClock {
    pub config: TickConfig,
    /// Ticks run since start
    pub tick_count: u64,
    accumulator: f32,
}

impl Default for TickClock {
    fn default() -> Self {
        Self {
            config: TickConfig::default(),
            tick_count: 0,
            accumulator: 0.0,
        }
    }
}

impl TickClock {
    /// Create a clock with a validated config
    pub fn new(config: TickConfig) -> Result<Self, TickConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Fixed tick length in seconds
    pub fn dt(&self) -> f32 {
        self.config.fixed_timestep
    }

    /// Feed a raw frame delta and return how many ticks to run this frame
    pub fn advance(&mut self, raw_delta: f32) -> u32 {
        self.accumulator += raw_delta.clamp(0.0, self.config.max_delta_time);

        let mut ticks = 0;
        while self.accumulator >= self.config.fixed_timestep {
            self.accumulator -= self.config.fixed_timestep;
            ticks += 1;
            if ticks == self.config.max_ticks_per_frame {
                // Drop the backlog rather than catching up over several frames
                self.accumulator = 0.0;
                break;
            }
        }

        self.tick_count += ticks as u64;
        ticks
    }
}
