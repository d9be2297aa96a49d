//! Entity types for the gameplay world.
//!
//! This module provides:
//! - [`EntityId`]: Non-owning, never-reused identifier for entities
//! - [`EntityTag`]: Type classification
//! - [`NetRole`]: Local network role, the basis of authority checks
//! - [`EntityInner`]: Type-safe storage for entity-specific components
//! - [`Entity`]: The complete entity container with capability queries
//!
//! # Capability queries
//!
//! Instead of casting an entity to a concrete class, callers ask for a
//! capability and receive `Option<&dyn Trait>`:
//!
//! ```
//! use emberfall_core::entity::{Entity, EntityId, EntityInner, EntityTag, NetRole};
//! use emberfall_core::entity::components::{EnemyComponents, ControllerComponents};
//!
//! let enemy = Entity::new(
//!     EntityId::new(1),
//!     EntityTag::Enemy,
//!     EntityInner::Enemy(EnemyComponents::default()),
//!     NetRole::Authority,
//! );
//! assert!(enemy.as_interactable().is_some());
//! assert!(enemy.as_combat_socket_provider().is_some());
//!
//! let controller = Entity::new(
//!     EntityId::new(2),
//!     EntityTag::Controller,
//!     EntityInner::Controller(ControllerComponents::player()),
//!     NetRole::Authority,
//! );
//! assert!(controller.as_interactable().is_none());
//! ```

pub mod capability;
pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ability::AbilitySystemId;
pub use capability::{
    AbilitySystemInterface, CombatSocketProvider, Controllable, Interactable, UnitController,
};
pub use components::{
    CharacterComponents, ControllerComponents, EnemyComponents, ProjectileComponents,
    TransformState,
};

/// Unique identifier for an entity.
///
/// IDs are assigned monotonically by the [`World`](crate::world::World) and never
/// reused, so holding an `EntityId` never keeps an entity alive and never
/// aliases a newer entity after the original is removed.
///
/// # Example
///
/// ```
/// use emberfall_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Entity type tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// Player-controlled character
    Hero,
    /// Hostile character that can be hovered and targeted
    Enemy,
    /// Player or AI controller
    Controller,
    /// In-flight projectile
    Projectile,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hero => write!(f, "Hero"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Controller => write!(f, "Controller"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

/// The local machine's network role for an entity.
///
/// Authority checks read only this replicated ownership state; they never
/// consult a remote peer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetRole {
    /// This machine owns the entity and may spawn on its behalf.
    #[default]
    Authority,
    /// Local copy driven by this machine's player, owned elsewhere.
    AutonomousProxy,
    /// Local copy mirroring a remote owner.
    SimulatedProxy,
}

/// Type-safe storage for entity-specific components.
///
/// The variant should always match the entity's [`EntityTag`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EntityInner {
    /// Hero components
    Hero(CharacterComponents),
    /// Enemy components
    Enemy(EnemyComponents),
    /// Controller components
    Controller(ControllerComponents),
    /// Projectile components
    Projectile(ProjectileComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Hero(_) => EntityTag::Hero,
            Self::Enemy(_) => EntityTag::Enemy,
            Self::Controller(_) => EntityTag::Controller,
            Self::Projectile(_) => EntityTag::Projectile,
        }
    }
}

/// A complete entity in the gameplay world.
///
/// # Invariants
///
/// - The `EntityId` is unique within a world and never reused
/// - The `EntityTag` matches the `EntityInner` variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    id: EntityId,
    tag: EntityTag,
    inner: EntityInner,
    role: NetRole,
}

impl Entity {
    /// Creates a new entity.
    #[must_use]
    pub const fn new(id: EntityId, tag: EntityTag, inner: EntityInner, role: NetRole) -> Self {
        Self {
            id,
            tag,
            inner,
            role,
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.tag
    }

    /// Returns the local network role.
    #[must_use]
    pub const fn role(&self) -> NetRole {
        self.role
    }

    /// Changes the local network role.
    pub fn set_role(&mut self, role: NetRole) {
        self.role = role;
    }

    /// Returns `true` if this machine has authority over the entity.
    #[must_use]
    pub const fn has_authority(&self) -> bool {
        matches!(self.role, NetRole::Authority)
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Placement, for entity types that have one.
    #[must_use]
    pub fn transform(&self) -> Option<&TransformState> {
        match &self.inner {
            EntityInner::Hero(character) => Some(&character.transform),
            EntityInner::Enemy(enemy) => Some(&enemy.character.transform),
            EntityInner::Projectile(projectile) => Some(&projectile.transform),
            EntityInner::Controller(_) => None,
        }
    }

    /// Mutable placement, for entity types that have one.
    #[must_use]
    pub fn transform_mut(&mut self) -> Option<&mut TransformState> {
        match &mut self.inner {
            EntityInner::Hero(character) => Some(&mut character.transform),
            EntityInner::Enemy(enemy) => Some(&mut enemy.character.transform),
            EntityInner::Projectile(projectile) => Some(&mut projectile.transform),
            EntityInner::Controller(_) => None,
        }
    }

    /// Character components, if this entity is a character (hero or enemy).
    #[must_use]
    pub const fn as_character(&self) -> Option<&CharacterComponents> {
        match &self.inner {
            EntityInner::Hero(character) => Some(character),
            EntityInner::Enemy(enemy) => Some(&enemy.character),
            _ => None,
        }
    }

    /// Mutable character components, if this entity is a character.
    #[must_use]
    pub fn as_character_mut(&mut self) -> Option<&mut CharacterComponents> {
        match &mut self.inner {
            EntityInner::Hero(character) => Some(character),
            EntityInner::Enemy(enemy) => Some(&mut enemy.character),
            _ => None,
        }
    }

    /// Controller components, if this entity is a controller.
    #[must_use]
    pub const fn as_controller(&self) -> Option<&ControllerComponents> {
        match &self.inner {
            EntityInner::Controller(controller) => Some(controller),
            _ => None,
        }
    }

    /// Mutable controller components, if this entity is a controller.
    #[must_use]
    pub fn as_controller_mut(&mut self) -> Option<&mut ControllerComponents> {
        match &mut self.inner {
            EntityInner::Controller(controller) => Some(controller),
            _ => None,
        }
    }

    /// Projectile components, if this entity is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileComponents> {
        match &self.inner {
            EntityInner::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    /// Mutable projectile components, if this entity is a projectile.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileComponents> {
        match &mut self.inner {
            EntityInner::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Capability queries
    // -------------------------------------------------------------------------

    /// Hover capability.
    #[must_use]
    pub fn as_interactable(&self) -> Option<&dyn Interactable> {
        match &self.inner {
            EntityInner::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Mutable hover capability.
    #[must_use]
    pub fn as_interactable_mut(&mut self) -> Option<&mut dyn Interactable> {
        match &mut self.inner {
            EntityInner::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Combat socket capability.
    #[must_use]
    pub fn as_combat_socket_provider(&self) -> Option<&dyn CombatSocketProvider> {
        self.as_character().map(|c| c as &dyn CombatSocketProvider)
    }

    /// Possessable-pawn capability.
    #[must_use]
    pub fn as_controllable(&self) -> Option<&dyn Controllable> {
        self.as_character().map(|c| c as &dyn Controllable)
    }

    /// Possessing-controller capability.
    #[must_use]
    pub fn as_unit_controller(&self) -> Option<&dyn UnitController> {
        self.as_controller().map(|c| c as &dyn UnitController)
    }

    /// Ability-system capability.
    #[must_use]
    pub fn as_ability_system_interface(&self) -> Option<&dyn AbilitySystemInterface> {
        self.as_character()
            .map(|c| c as &dyn AbilitySystemInterface)
    }

    /// Shortcut for the ability system behind [`as_ability_system_interface`](Self::as_ability_system_interface).
    #[must_use]
    pub fn ability_system(&self) -> Option<AbilitySystemId> {
        self.as_ability_system_interface()
            .and_then(AbilitySystemInterface::ability_system)
    }
}
