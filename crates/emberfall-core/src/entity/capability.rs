//! Capability interfaces exposed by entities.
//!
//! Gameplay code never downcasts entities. It asks an [`Entity`](super::Entity)
//! for a capability (`as_interactable`, `as_combat_socket_provider`, ...) and
//! gets `None` when the entity does not support it.

use glam::Vec3;

use super::EntityId;
use crate::ability::AbilitySystemId;

/// Entities that react to being hovered by the cursor.
pub trait Interactable {
    /// Shows hover feedback.
    fn highlight_actor(&mut self);
    /// Hides hover feedback.
    fn unhighlight_actor(&mut self);
    /// Whether hover feedback is showing.
    fn is_highlighted(&self) -> bool;
}

/// Entities with a socket that projectiles are launched from.
pub trait CombatSocketProvider {
    /// World-space socket location.
    fn combat_socket_location(&self) -> Vec3;
}

/// Pawns that can be possessed by a controller.
pub trait Controllable {
    /// The possessing controller, if any.
    fn controller(&self) -> Option<EntityId>;
}

/// Controllers that possess a pawn.
pub trait UnitController {
    /// The possessed pawn, if any.
    fn controlled_unit(&self) -> Option<EntityId>;
}

/// Entities with an ability system acting for them.
pub trait AbilitySystemInterface {
    /// The ability system, if one has been assigned.
    fn ability_system(&self) -> Option<AbilitySystemId>;
}
