//! Error types for setup-time contracts.
//!
//! Gameplay failure modes (a missing link in an effect's causal chain, a
//! non-authoritative spawn request, a target without the expected capability, a
//! cursor trace that hits nothing) are not errors: they surface as `None` or as
//! a no-op. The types here cover configuration loading and API misuse.

use thiserror::Error;

use crate::ability::AbilitySystemId;
use crate::entity::EntityId;

/// Errors raised by [`World`](crate::world::World) operations that name a
/// handle which does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The entity is not (or no longer) in the world.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// No ability system is registered under this id.
    #[error("unknown ability system {0}")]
    UnknownAbilitySystem(AbilitySystemId),

    /// The deferred spawn was already finished or never started.
    #[error("no deferred spawn pending for entity {0}")]
    UnknownDeferredSpawn(EntityId),
}

/// Errors raised while loading or validating a
/// [`GameplayConfig`](crate::config::GameplayConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for the expected shape.
    #[error("failed to parse gameplay config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value outside its allowed range.
    #[error("invalid gameplay config field `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
