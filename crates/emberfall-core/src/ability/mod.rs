//! Ability system: granted abilities, actor info, and activation.
//!
//! Each character that can use abilities has an [`AbilitySystem`] stored in
//! the [`World`]. The system owns the character's [`AttributeSet`], the list
//! of granted [`AbilitySpec`]s, and two observer lists:
//!
//! - `attribute_changed`: every committed attribute change
//! - `effect_asset_tags`: the asset tags of every effect applied
//!
//! Abilities implement [`GameplayAbility`] and are shared through `Arc`, so
//! one ability definition can be granted to many characters.
//!
//! [`AttributeSet`]: crate::attribute::AttributeSet

mod projectile_spell;
mod system;
mod target_data;

pub use projectile_spell::ProjectileSpell;
pub use system::AbilitySystem;
pub use target_data::TargetDataUnderMouse;

use std::fmt;
use std::sync::Arc;

use gameplay_tags::Tag;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::world::World;

/// Handle to an ability system in the [`World`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilitySystemId(u64);

impl AbilitySystemId {
    /// Creates an ID from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AbilitySystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AbilitySystemId({})", self.0)
    }
}

impl fmt::Display for AbilitySystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a granted ability within one ability system.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilitySpecHandle(u64);

impl AbilitySpecHandle {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Who an ability system acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInfo {
    /// Entity owning the ability system (for network relevancy).
    pub owner: EntityId,
    /// The physical representation acting in the world.
    pub avatar: Option<EntityId>,
    /// Player controller driving the avatar.
    pub player_controller: Option<EntityId>,
}

/// Outcome of [`GameplayAbility::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationResult {
    /// The ability finished during activation.
    Ended,
    /// The ability stays active until ended explicitly.
    Active,
}

/// Everything an ability instance knows about its invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityContext {
    /// The ability system running the ability.
    pub ability_system: AbilitySystemId,
    /// The granted spec being run.
    pub handle: AbilitySpecHandle,
    /// Level the ability was granted at.
    pub level: u32,
    /// Actor info of the ability system at activation time.
    pub actor_info: Option<ActorInfo>,
}

impl AbilityContext {
    /// The avatar the ability acts through.
    #[must_use]
    pub fn avatar(&self) -> Option<EntityId> {
        self.actor_info.and_then(|info| info.avatar)
    }

    /// The player controller driving the avatar.
    #[must_use]
    pub fn player_controller(&self) -> Option<EntityId> {
        self.actor_info.and_then(|info| info.player_controller)
    }
}

/// Behavior that can be granted to an ability system and activated.
///
/// Hooks receive the [`World`] mutably so abilities can spawn entities and
/// apply effects. Input hooks default to doing nothing.
pub trait GameplayAbility: fmt::Debug {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Input tag the ability is bound to when granted at startup.
    fn startup_input_tag(&self) -> Option<Tag> {
        None
    }

    /// Runs the ability.
    fn activate(&self, ctx: &AbilityContext, world: &mut World) -> ActivationResult;

    /// The bound input was pressed while the ability is active.
    fn input_pressed(&self, _ctx: &AbilityContext, _world: &mut World) {}

    /// The bound input was released while the ability is active.
    fn input_released(&self, _ctx: &AbilityContext, _world: &mut World) {}
}

/// A granted ability.
#[derive(Debug, Clone)]
pub struct AbilitySpec {
    /// Handle within the owning system.
    pub handle: AbilitySpecHandle,
    /// The ability definition.
    pub ability: Arc<dyn GameplayAbility>,
    /// Grant level.
    pub level: u32,
    /// Input tag the spec responds to.
    pub input_tag: Option<Tag>,
    /// Whether the bound input is currently down.
    pub input_pressed: bool,
    /// Whether the ability is running.
    pub active: bool,
    /// Whether the spec is removed once its activation ends.
    pub remove_on_end: bool,
}

impl AbilitySpec {
    /// Returns `true` if the spec is bound to exactly `tag`.
    #[must_use]
    pub fn responds_to(&self, tag: Tag) -> bool {
        self.input_tag.is_some_and(|bound| bound.matches_tag_exact(tag))
    }
}
