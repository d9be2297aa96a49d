//! Component structs for each entity type.
//!
//! Components hold all state for a particular entity type. Capability traits
//! from [`capability`](super::capability) are implemented here, on the
//! components that actually carry the state each capability needs.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::capability::{
    AbilitySystemInterface, CombatSocketProvider, Controllable, Interactable, UnitController,
};
use super::EntityId;
use crate::ability::AbilitySystemId;
use crate::config::ProjectileConfig;
use crate::effect::EffectSpec;
use crate::math::{CursorRay, Rotator};

// =============================================================================
// Transform
// =============================================================================

/// World-space placement of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// Location in world units.
    pub location: Vec3,
    /// Orientation.
    pub rotation: Quat,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl TransformState {
    /// Creates a transform from a location and rotation.
    #[must_use]
    pub const fn new(location: Vec3, rotation: Quat) -> Self {
        Self { location, rotation }
    }

    /// Unrotated transform at `location`.
    #[must_use]
    pub const fn at(location: Vec3) -> Self {
        Self::new(location, Quat::IDENTITY)
    }

    /// Unit vector the transform faces along.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Orientation as pitch/yaw/roll.
    #[must_use]
    pub fn rotator(&self) -> Rotator {
        Rotator::from_quat(self.rotation)
    }
}

// =============================================================================
// Characters
// =============================================================================

/// Components shared by every character (heroes and enemies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterComponents {
    /// Placement.
    pub transform: TransformState,
    /// Capsule approximated as a sphere for traces and overlaps.
    pub collision_radius: f32,
    /// Weapon tip socket, relative to the character's location and rotation.
    pub combat_socket_offset: Vec3,
    /// Controller possessing this character.
    pub controller: Option<EntityId>,
    /// Ability system acting on behalf of this character.
    pub ability_system: Option<AbilitySystemId>,
    /// Movement input accumulated this tick, consumed by movement integration.
    pub pending_movement: Vec3,
    /// Walk speed in units per second at full input.
    pub max_walk_speed: f32,
}

impl Default for CharacterComponents {
    fn default() -> Self {
        Self {
            transform: TransformState::default(),
            collision_radius: 40.0,
            combat_socket_offset: Vec3::new(50.0, 0.0, 40.0),
            controller: None,
            ability_system: None,
            pending_movement: Vec3::ZERO,
            max_walk_speed: 600.0,
        }
    }
}

impl CharacterComponents {
    /// Creates a character standing at `location`.
    #[must_use]
    pub fn at_location(location: Vec3) -> Self {
        Self {
            transform: TransformState::at(location),
            ..Self::default()
        }
    }

    /// Accumulates movement input for this tick.
    pub fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.pending_movement += direction * scale;
    }

    /// Drains accumulated input, clamped to unit length.
    pub fn consume_movement_input(&mut self) -> Vec3 {
        let input = self.pending_movement.clamp_length_max(1.0);
        self.pending_movement = Vec3::ZERO;
        input
    }
}

impl CombatSocketProvider for CharacterComponents {
    fn combat_socket_location(&self) -> Vec3 {
        self.transform.location + self.transform.rotation * self.combat_socket_offset
    }
}

impl Controllable for CharacterComponents {
    fn controller(&self) -> Option<EntityId> {
        self.controller
    }
}

impl AbilitySystemInterface for CharacterComponents {
    fn ability_system(&self) -> Option<AbilitySystemId> {
        self.ability_system
    }
}

/// Components for enemies: a character that can be hovered and highlighted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyComponents {
    /// Shared character state.
    pub character: CharacterComponents,
    /// Whether the outline highlight is currently shown.
    pub highlighted: bool,
    /// Number of times the highlight was switched on.
    pub highlight_count: u32,
}

impl EnemyComponents {
    /// Creates an enemy standing at `location`.
    #[must_use]
    pub fn at_location(location: Vec3) -> Self {
        Self {
            character: CharacterComponents::at_location(location),
            ..Self::default()
        }
    }
}

impl Interactable for EnemyComponents {
    fn highlight_actor(&mut self) {
        self.highlighted = true;
        self.highlight_count += 1;
    }

    fn unhighlight_actor(&mut self) {
        self.highlighted = false;
    }

    fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

// =============================================================================
// Controllers
// =============================================================================

/// Components for a controller entity (player or AI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerComponents {
    /// Possessed pawn.
    pub pawn: Option<EntityId>,
    /// Whether a human player drives this controller.
    pub is_player: bool,
    /// Current cursor ray, if the cursor is over the viewport.
    pub cursor: Option<CursorRay>,
    /// Camera-facing control rotation used for directional movement.
    pub control_rotation: Rotator,
}

impl ControllerComponents {
    /// A player controller with no pawn and no cursor.
    #[must_use]
    pub fn player() -> Self {
        Self {
            is_player: true,
            ..Self::default()
        }
    }

    /// An AI controller with no pawn.
    #[must_use]
    pub fn ai() -> Self {
        Self::default()
    }
}

impl UnitController for ControllerComponents {
    fn controlled_unit(&self) -> Option<EntityId> {
        self.pawn
    }
}

// =============================================================================
// Projectiles
// =============================================================================

/// Components for an in-flight projectile.
///
/// Not `Deserialize`: the optional payload holds tags, which only exist once
/// registered in the running process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileComponents {
    /// Placement. Set when the deferred spawn is finished.
    pub transform: TransformState,
    /// Units per second.
    pub velocity: Vec3,
    /// Speed applied along the spawn rotation.
    pub speed: f32,
    /// Overlap sphere radius.
    pub collision_radius: f32,
    /// Seconds left before expiry.
    pub remaining_life: f32,
    /// Entity responsible for the projectile (the avatar that fired it).
    pub instigator: Option<EntityId>,
    /// Entity that owns the projectile for network relevancy.
    pub owner: Option<EntityId>,
    /// Effect applied to whatever the projectile hits. `None` until a payload
    /// is attached.
    pub damage_effect: Option<EffectSpec>,
}

impl ProjectileComponents {
    /// Creates an unplaced projectile from tuning values.
    #[must_use]
    pub fn from_config(config: &ProjectileConfig) -> Self {
        Self {
            transform: TransformState::default(),
            velocity: Vec3::ZERO,
            speed: config.speed,
            collision_radius: config.collision_radius,
            remaining_life: config.lifespan,
            instigator: None,
            owner: None,
            damage_effect: None,
        }
    }
}

impl Default for ProjectileComponents {
    fn default() -> Self {
        Self::from_config(&ProjectileConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn socket_location_follows_rotation() {
        let mut character = CharacterComponents::at_location(Vec3::new(0.0, 0.0, 100.0));
        character.combat_socket_offset = Vec3::new(10.0, 0.0, 0.0);
        character.transform.rotation = Rotator::new(0.0, 90.0, 0.0).to_quat();

        let socket = character.combat_socket_location();
        assert!(socket.abs_diff_eq(Vec3::new(0.0, 10.0, 100.0), EPS));
    }

    #[test]
    fn movement_input_is_clamped_and_drained() {
        let mut character = CharacterComponents::default();
        character.add_movement_input(Vec3::X, 1.0);
        character.add_movement_input(Vec3::Y, 1.0);

        let input = character.consume_movement_input();
        assert!((input.length() - 1.0).abs() < EPS);
        assert_eq!(character.pending_movement, Vec3::ZERO);
    }

    #[test]
    fn enemy_highlight_toggles() {
        let mut enemy = EnemyComponents::default();
        enemy.highlight_actor();
        assert!(enemy.is_highlighted());
        enemy.unhighlight_actor();
        assert!(!enemy.is_highlighted());
        assert_eq!(enemy.highlight_count, 1);
    }

    #[test]
    fn controller_reports_pawn() {
        let mut controller = ControllerComponents::player();
        assert!(controller.is_player);
        assert_eq!(controller.controlled_unit(), None);
        controller.pawn = Some(EntityId::new(4));
        assert_eq!(controller.controlled_unit(), Some(EntityId::new(4)));
    }

    #[test]
    fn projectile_from_config() {
        let projectile = ProjectileComponents::from_config(&ProjectileConfig::default());
        assert_eq!(projectile.speed, 550.0);
        assert_eq!(projectile.remaining_life, 15.0);
        assert!(projectile.damage_effect.is_none());
    }

    #[test]
    fn character_serialization_roundtrip() {
        let character = CharacterComponents::at_location(Vec3::new(1.0, 2.0, 3.0));
        let json = serde_json::to_string(&character).unwrap();
        let back: CharacterComponents = serde_json::from_str(&json).unwrap();
        assert_eq!(character, back);
    }
}
