//! Keyboard adapter: key bindings to synthetic swipes

use super::synthetic_sample;
use crate::error::ConfigError;
use crate::gesture::MotionSample;
use crate::types::SwipeDirection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key names bound to each direction, matched case-insensitively.
///
/// Names follow DOM `KeyboardEvent.key` values (`ArrowLeft`, `a`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: vec!["ArrowLeft".into(), "a".into(), "n".into()],
            right: vec!["ArrowRight".into(), "d".into(), "y".into()],
            up: vec!["ArrowUp".into(), "w".into(), "s".into()],
        }
    }
}

impl KeyBindings {
    /// Reject a key that is bound to more than one direction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_map().map(|_| ())
    }

    fn build_map(&self) -> Result<HashMap<String, SwipeDirection>, ConfigError> {
        let mut map = HashMap::new();
        let groups = [
            (SwipeDirection::Left, &self.left),
            (SwipeDirection::Right, &self.right),
            (SwipeDirection::Up, &self.up),
        ];
        for (direction, keys) in groups {
            for key in keys {
                let normalized = key.to_lowercase();
                match map.insert(normalized, direction) {
                    Some(previous) if previous != direction => {
                        return Err(ConfigError::ConflictingKey { key: key.clone() });
                    }
                    _ => {}
                }
            }
        }
        Ok(map)
    }
}

/// Maps key presses to canonical gestures
#[derive(Debug, Clone)]
pub struct KeyboardAdapter {
    map: HashMap<String, SwipeDirection>,
}

impl KeyboardAdapter {
    pub fn new(bindings: &KeyBindings) -> Result<Self, ConfigError> {
        Ok(Self {
            map: bindings.build_map()?,
        })
    }

    #[must_use]
    pub fn direction_for(&self, key: &str) -> Option<SwipeDirection> {
        self.map.get(&key.to_lowercase()).copied()
    }

    /// Canonical sample for an accepted key; `None` for unbound keys.
    #[must_use]
    pub fn sample_for(&self, key: &str) -> Option<MotionSample> {
        self.direction_for(key).map(synthetic_sample)
    }
}

impl Default for KeyboardAdapter {
    fn default() -> Self {
        let map = KeyBindings::default().build_map().unwrap_or_default();
        Self { map }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_are_case_insensitive() {
        let adapter = KeyboardAdapter::default();
        assert_eq!(adapter.direction_for("ArrowLeft"), Some(SwipeDirection::Left));
        assert_eq!(adapter.direction_for("arrowright"), Some(SwipeDirection::Right));
        assert_eq!(adapter.direction_for("W"), Some(SwipeDirection::Up));
        assert_eq!(adapter.direction_for("Y"), Some(SwipeDirection::Right));
        assert_eq!(adapter.direction_for("ArrowDown"), None);
        assert!(adapter.sample_for("q").is_none());
    }

    #[test]
    fn conflicting_bindings_rejected() {
        let bindings = KeyBindings {
            left: vec!["a".into()],
            right: vec!["A".into()],
            up: vec![],
        };
        assert_eq!(
            bindings.validate(),
            Err(ConfigError::ConflictingKey { key: "A".into() })
        );
        assert!(KeyboardAdapter::new(&bindings).is_err());
    }

    #[test]
    fn repeated_key_in_same_group_is_fine() {
        let bindings = KeyBindings {
            left: vec!["a".into(), "A".into()],
            right: vec![],
            up: vec![],
        };
        assert!(bindings.validate().is_ok());
    }
}
