//! Engine configuration
//!
//! Caller-supplied knobs, loadable from TOML. Every field has a default, so a
//! partial file is valid.

use crate::error::ConfigError;
use crate::gesture::Thresholds;
use crate::input::{KeyBindings, SYNTHETIC_DISTANCE, SYNTHETIC_VELOCITY};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Offset magnitude (px) that triggers a swipe
    pub distance_threshold: f64,
    /// Velocity magnitude (px/s) that triggers a swipe
    pub velocity_threshold: f64,
    /// Batch size per prefetch
    pub card_preload_count: u32,
    /// Completion ceiling
    pub max_swipes_per_session: u32,
    /// Remaining-queue depth that triggers a prefetch
    pub low_water_mark: usize,
    /// Swipes between "recommendations ready" signals
    pub recommendation_interval: u32,
    /// Cards rendered in the stack (head included)
    pub visible_stack_depth: usize,
    /// Keyboard adapter bindings
    pub keys: KeyBindings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 150.0,
            velocity_threshold: 800.0,
            card_preload_count: 10,
            max_swipes_per_session: 50,
            low_water_mark: 2,
            recommendation_interval: 10,
            visible_stack_depth: 3,
            keys: KeyBindings::default(),
        }
    }
}

impl EngineConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_thresholds(mut self, distance: f64, velocity: f64) -> Self {
        self.distance_threshold = distance;
        self.velocity_threshold = velocity;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_preload_count(mut self, count: u32) -> Self {
        self.card_preload_count = count;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_swipes(mut self, max: u32) -> Self {
        self.max_swipes_per_session = max;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_low_water_mark(mut self, mark: usize) -> Self {
        self.low_water_mark = mark;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_recommendation_interval(mut self, interval: u32) -> Self {
        self.recommendation_interval = interval;
        self
    }

    #[inline]
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            distance: self.distance_threshold,
            velocity: self.velocity_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("distance_threshold", self.distance_threshold, SYNTHETIC_DISTANCE)?;
        check_threshold("velocity_threshold", self.velocity_threshold, SYNTHETIC_VELOCITY)?;
        if self.card_preload_count == 0 {
            return Err(ConfigError::ZeroValue("card_preload_count"));
        }
        if self.max_swipes_per_session == 0 {
            return Err(ConfigError::ZeroValue("max_swipes_per_session"));
        }
        if self.recommendation_interval == 0 {
            return Err(ConfigError::ZeroValue("recommendation_interval"));
        }
        if self.visible_stack_depth == 0 {
            return Err(ConfigError::ZeroValue("visible_stack_depth"));
        }
        self.keys.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn check_threshold(field: &'static str, value: f64, limit: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidThreshold { field, value });
    }
    if value >= limit {
        return Err(ConfigError::ThresholdAboveSynthetic { field, value, limit });
    }
    Ok(())
}
