//! Gameplay configuration.
//!
//! Every section has a [`Default`] matching the shipped tuning, and every field
//! is optional in the JSON form (`#[serde(default)]`), so a config file only
//! needs to name what it overrides.
//!
//! # Example
//!
//! ```
//! use emberfall_core::config::{ClampPolicy, GameplayConfig};
//!
//! let config = GameplayConfig::from_json_str(r#"{
//!     "controller": { "short_press_threshold": 0.25 },
//!     "clamp_policy": "ClampVitals"
//! }"#).unwrap();
//!
//! assert_eq!(config.controller.short_press_threshold, 0.25);
//! assert_eq!(config.controller.auto_run_acceptance_radius, 50.0);
//! assert_eq!(config.clamp_policy, ClampPolicy::ClampVitals);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the attribute pipeline treats writes to vital attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampPolicy {
    /// Accept every proposed value unchanged. Health and mana may exceed their
    /// maximum or go negative.
    #[default]
    Passthrough,
    /// Clamp health to `[0, max_health]` and mana to `[0, max_mana]` both before
    /// a write and after an effect executes.
    ClampVitals,
}

/// Tuning for the player controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Longest hold (seconds) of the primary button that still counts as a
    /// click and starts click-to-move.
    pub short_press_threshold: f32,
    /// Click-to-move stops once the pawn is this close to its destination.
    pub auto_run_acceptance_radius: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            short_press_threshold: 0.5,
            auto_run_acceptance_radius: 50.0,
        }
    }
}

/// Initial values for a fresh attribute set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeDefaults {
    /// Starting strength.
    pub strength: f32,
    /// Starting intelligence.
    pub intelligence: f32,
    /// Starting resilience.
    pub resilience: f32,
    /// Starting vigor.
    pub vigor: f32,
    /// Starting health.
    pub health: f32,
    /// Starting maximum health.
    pub max_health: f32,
    /// Starting mana.
    pub mana: f32,
    /// Starting maximum mana.
    pub max_mana: f32,
}

impl Default for AttributeDefaults {
    fn default() -> Self {
        Self {
            strength: 0.0,
            intelligence: 0.0,
            resilience: 0.0,
            vigor: 0.0,
            health: 10.0,
            max_health: 100.0,
            mana: 10.0,
            max_mana: 50.0,
        }
    }
}

/// Tuning for spawned projectiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Initial speed along the spawn rotation (units per second).
    pub speed: f32,
    /// Overlap sphere radius.
    pub collision_radius: f32,
    /// Seconds before an unimpacted projectile is removed.
    pub lifespan: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 550.0,
            collision_radius: 10.0,
            lifespan: 15.0,
        }
    }
}

/// Simulated network link between the authority and remote observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    /// Seed for per-message latency.
    pub seed: u64,
    /// Minimum delivery delay in ticks.
    pub min_latency_ticks: u64,
    /// Maximum delivery delay in ticks.
    pub max_latency_ticks: u64,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            min_latency_ticks: 1,
            max_latency_ticks: 3,
        }
    }
}

/// Top-level gameplay configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Player controller tuning.
    pub controller: ControllerConfig,
    /// Initial attribute values.
    pub attributes: AttributeDefaults,
    /// Projectile tuning.
    pub projectile: ProjectileConfig,
    /// Replication link tuning.
    pub replication: ReplicationConfig,
    /// Attribute clamping behavior.
    pub clamp_policy: ClampPolicy,
}

impl GameplayConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !non_negative(self.controller.short_press_threshold) {
            return Err(invalid(
                "controller.short_press_threshold",
                "must be non-negative",
            ));
        }
        if !positive(self.controller.auto_run_acceptance_radius) {
            return Err(invalid(
                "controller.auto_run_acceptance_radius",
                "must be positive",
            ));
        }
        if !positive(self.attributes.max_health) {
            return Err(invalid("attributes.max_health", "must be positive"));
        }
        if !non_negative(self.attributes.max_mana) {
            return Err(invalid("attributes.max_mana", "must be non-negative"));
        }
        if !positive(self.projectile.speed) {
            return Err(invalid("projectile.speed", "must be positive"));
        }
        if !positive(self.projectile.collision_radius) {
            return Err(invalid("projectile.collision_radius", "must be positive"));
        }
        if !positive(self.projectile.lifespan) {
            return Err(invalid("projectile.lifespan", "must be positive"));
        }
        if self.replication.min_latency_ticks > self.replication.max_latency_ticks {
            return Err(invalid(
                "replication.min_latency_ticks",
                "must not exceed max_latency_ticks",
            ));
        }
        Ok(())
    }
}

fn positive(x: f32) -> bool {
    !x.is_nan() && x > 0.0
}

fn non_negative(x: f32) -> bool {
    !x.is_nan() && x >= 0.0
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameplayConfig::default().validate().unwrap();
    }

    #[test]
    fn attribute_defaults() {
        let defaults = AttributeDefaults::default();
        assert_eq!(defaults.health, 10.0);
        assert_eq!(defaults.max_health, 100.0);
        assert_eq!(defaults.mana, 10.0);
        assert_eq!(defaults.max_mana, 50.0);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = GameplayConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameplayConfig::default());
        assert_eq!(config.clamp_policy, ClampPolicy::Passthrough);
    }

    #[test]
    fn partial_section_override() {
        let config =
            GameplayConfig::from_json_str(r#"{ "projectile": { "speed": 900.0 } }"#).unwrap();
        assert_eq!(config.projectile.speed, 900.0);
        assert_eq!(config.projectile.lifespan, 15.0);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = GameplayConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_speed_rejected() {
        let err =
            GameplayConfig::from_json_str(r#"{ "projectile": { "speed": -1.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "projectile.speed",
                ..
            }
        ));
    }

    #[test]
    fn nan_values_rejected() {
        let mut config = GameplayConfig::default();
        config.controller.short_press_threshold = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "controller.short_press_threshold",
                ..
            })
        ));

        let mut config = GameplayConfig::default();
        config.projectile.lifespan = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn latency_bounds_checked() {
        let mut config = GameplayConfig::default();
        config.replication.min_latency_ticks = 5;
        config.replication.max_latency_ticks = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn serialization_roundtrip() {
        let mut config = GameplayConfig::default();
        config.clamp_policy = ClampPolicy::ClampVitals;
        let json = serde_json::to_string(&config).unwrap();
        let back = GameplayConfig::from_json_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
