use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_UPDATES_PER_SECOND: f32 = 3.0;

/// What happens to accumulated time once an evaluation fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleMode {
    /// Drop whatever exceeded the interval. The effective rate drifts under uneven
    /// frame times.
    #[default]
    Reset,
    /// Subtract one interval and keep the rest for the next tick.
    CarryRemainder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Evaluations per second of accumulated tick time. Non-positive rates evaluate
    /// on every tick.
    pub updates_per_second: f32,
    pub throttle: ThrottleMode,
    /// Seed for the random source. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            updates_per_second: DEFAULT_UPDATES_PER_SECOND,
            throttle: ThrottleMode::Reset,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_updates_per_second(mut self, updates_per_second: f32) -> Self {
        self.updates_per_second = updates_per_second;
        self
    }

    pub fn with_throttle(mut self, throttle: ThrottleMode) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Minimum accumulated time between evaluations.
    pub fn update_interval(&self) -> f32 {
        if self.updates_per_second.is_finite() && self.updates_per_second > 0.0 {
            1.0 / self.updates_per_second
        } else {
            0.0
        }
    }

    pub(crate) fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
