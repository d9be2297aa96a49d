//! Source/target resolution for an executed effect.

use serde::Serialize;

use super::{EffectContext, EffectExecutionData};
use crate::ability::{AbilitySystemId, ActorInfo};
use crate::entity::{Controllable, Entity, EntityId, UnitController};
use crate::world::World;

/// Who caused an effect and who received it.
///
/// Derived fresh for every executed modifier and never stored. Every field is
/// optional: a missing link in either causal chain leaves the fields that
/// depend on it empty without affecting the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EffectProperties {
    /// Context of the effect.
    pub context: EffectContext,

    /// Ability system the effect originated from.
    pub source_ability_system: Option<AbilitySystemId>,
    /// Avatar of the source ability system.
    pub source_avatar: Option<EntityId>,
    /// Controller driving the source avatar.
    pub source_controller: Option<EntityId>,
    /// Character possessed by the source controller.
    pub source_character: Option<EntityId>,

    /// Ability system found on the target avatar.
    pub target_ability_system: Option<AbilitySystemId>,
    /// Avatar of the target.
    pub target_avatar: Option<EntityId>,
    /// Player controller of the target.
    pub target_controller: Option<EntityId>,
    /// The target avatar, when it is a character.
    pub target_character: Option<EntityId>,
}

impl EffectProperties {
    /// Resolves source and target identities for one executed modifier.
    ///
    /// Never fails. Source side:
    ///
    /// 1. The instigator ability system is taken from the context
    /// 2. If its actor info has a live avatar, the avatar and the player
    ///    controller are read; with no player controller, the controller
    ///    possessing the avatar is used instead
    /// 3. The source character is the controller's controlled unit, if that
    ///    is a character
    ///
    /// Target side: when the target's actor info has a live avatar, the
    /// avatar, its player controller, the avatar as a character, and the
    /// ability system exposed by the avatar are each resolved independently.
    #[must_use]
    pub fn resolve(world: &World, data: &EffectExecutionData<'_>) -> Self {
        let context = *data.spec.context();
        let mut props = Self {
            context,
            ..Self::default()
        };

        props.resolve_source(world, context);
        props.resolve_target(world, data.target);
        props
    }

    fn resolve_source(&mut self, world: &World, context: EffectContext) {
        let Some(source) = context.instigator().and_then(|id| world.ability_system(id)) else {
            return;
        };
        self.source_ability_system = Some(source.id());

        let Some((avatar, info)) = valid_avatar(world, source.actor_info()) else {
            return;
        };
        self.source_avatar = Some(avatar);
        self.source_controller = info.player_controller.or_else(|| {
            world
                .get(avatar)
                .and_then(Entity::as_controllable)
                .and_then(Controllable::controller)
        });

        if let Some(controller) = self.source_controller {
            self.source_character = world
                .get(controller)
                .and_then(Entity::as_unit_controller)
                .and_then(UnitController::controlled_unit)
                .filter(|unit| world.get(*unit).and_then(Entity::as_character).is_some());
        }
    }

    fn resolve_target(&mut self, world: &World, target: AbilitySystemId) {
        let Some(target_system) = world.ability_system(target) else {
            return;
        };
        let Some((avatar, info)) = valid_avatar(world, target_system.actor_info()) else {
            return;
        };
        self.target_avatar = Some(avatar);
        self.target_controller = info.player_controller;
        self.target_character = world
            .get(avatar)
            .and_then(Entity::as_character)
            .map(|_| avatar);
        self.target_ability_system = world.ability_system_of(avatar);
    }
}

/// Actor info counts as valid when it names an avatar that is still live.
fn valid_avatar<'a>(
    world: &World,
    info: Option<&'a ActorInfo>,
) -> Option<(EntityId, &'a ActorInfo)> {
    let info = info?;
    let avatar = info.avatar.filter(|id| world.contains(*id))?;
    Some((avatar, info))
}
