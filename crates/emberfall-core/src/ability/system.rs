//! The ability system component and its world-level operations.

use std::sync::Arc;

use gameplay_tags::{Tag, TagContainer};
use tracing::{debug, trace, warn};

use super::{
    AbilityContext, AbilitySpec, AbilitySpecHandle, AbilitySystemId, ActivationResult, ActorInfo,
    GameplayAbility,
};
use crate::attribute::{AttributeChange, AttributeSet};
use crate::effect::{EffectContext, EffectSpec};
use crate::entity::{Controllable, Entity, EntityId};
use crate::error::WorldError;
use crate::observer::ObserverList;
use crate::replication::AttributeReplica;
use crate::world::World;

/// Ability state for one character.
#[derive(Debug)]
pub struct AbilitySystem {
    id: AbilitySystemId,
    owner: EntityId,
    actor_info: Option<ActorInfo>,
    attributes: AttributeSet,
    specs: Vec<AbilitySpec>,
    next_handle: u64,
    default_attributes: Option<EffectSpec>,
    outbox: Vec<AttributeReplica>,

    /// Notified once per committed attribute change, in commit order.
    pub attribute_changed: ObserverList<AttributeChange>,
    /// Notified with the asset tags of every effect applied to this system.
    pub effect_asset_tags: ObserverList<TagContainer>,
}

impl AbilitySystem {
    pub(crate) fn new(id: AbilitySystemId, owner: EntityId, attributes: AttributeSet) -> Self {
        Self {
            id,
            owner,
            actor_info: None,
            attributes,
            specs: Vec::new(),
            next_handle: 0,
            default_attributes: None,
            outbox: Vec::new(),
            attribute_changed: ObserverList::new(),
            effect_asset_tags: ObserverList::new(),
        }
    }

    /// This system's ID.
    #[must_use]
    pub const fn id(&self) -> AbilitySystemId {
        self.id
    }

    /// Entity owning this system.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Actor info, once initialized.
    #[must_use]
    pub const fn actor_info(&self) -> Option<&ActorInfo> {
        self.actor_info.as_ref()
    }

    /// Replaces the actor info.
    pub fn set_actor_info(&mut self, info: Option<ActorInfo>) {
        self.actor_info = info;
    }

    /// The attribute set. Read-only: writes go through effects.
    #[must_use]
    pub const fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttributeSet {
        &mut self.attributes
    }

    /// Granted abilities in grant order.
    #[must_use]
    pub fn specs(&self) -> &[AbilitySpec] {
        &self.specs
    }

    /// A granted ability by handle.
    #[must_use]
    pub fn spec(&self, handle: AbilitySpecHandle) -> Option<&AbilitySpec> {
        self.specs.iter().find(|spec| spec.handle == handle)
    }

    fn spec_mut(&mut self, handle: AbilitySpecHandle) -> Option<&mut AbilitySpec> {
        self.specs.iter_mut().find(|spec| spec.handle == handle)
    }

    /// Sets the effect applied to self when actor info is initialized.
    ///
    /// The spec's context is replaced with this system's context when applied.
    pub fn set_default_attributes(&mut self, spec: Option<EffectSpec>) {
        self.default_attributes = spec;
    }

    /// Delivers a committed change to observers and queues it for replication.
    pub(crate) fn record_change(&mut self, change: &AttributeChange) {
        self.attribute_changed.notify(change);
        self.outbox.push(AttributeReplica {
            ability_system: self.id,
            attribute: change.attribute,
            value: change.new_value,
            revision: change.revision,
        });
    }

    fn context_for(&self, handle: AbilitySpecHandle, level: u32) -> AbilityContext {
        AbilityContext {
            ability_system: self.id,
            handle,
            level,
            actor_info: self.actor_info,
        }
    }

    fn handles_for(&self, tag: Tag) -> Vec<AbilitySpecHandle> {
        self.specs
            .iter()
            .filter(|spec| spec.responds_to(tag))
            .map(|spec| spec.handle)
            .collect()
    }
}

// =============================================================================
// World operations
// =============================================================================

impl World {
    fn system_or_err(&mut self, id: AbilitySystemId) -> Result<&mut AbilitySystem, WorldError> {
        self.ability_system_mut(id)
            .ok_or(WorldError::UnknownAbilitySystem(id))
    }

    /// Binds an ability system to the avatar it acts through.
    ///
    /// Records the actor info (owner, avatar, and the avatar's controller when
    /// that is a player controller), points the avatar's ability-system
    /// capability at `system`, then applies the default attribute effect, if
    /// one is set, to self.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownAbilitySystem`] or
    /// [`WorldError::UnknownEntity`] if either handle is unknown.
    pub fn init_ability_actor_info(
        &mut self,
        system: AbilitySystemId,
        avatar: EntityId,
    ) -> Result<(), WorldError> {
        let player_controller = {
            let entity = self.get(avatar).ok_or(WorldError::UnknownEntity(avatar))?;
            entity
                .as_controllable()
                .and_then(Controllable::controller)
                .filter(|c| {
                    self.get(*c)
                        .and_then(Entity::as_controller)
                        .is_some_and(|components| components.is_player)
                })
        };

        let asc = self.system_or_err(system)?;
        let info = ActorInfo {
            owner: asc.owner,
            avatar: Some(avatar),
            player_controller,
        };
        asc.actor_info = Some(info);
        let default_attributes = asc.default_attributes.clone();

        if let Some(character) = self.get_mut(avatar).and_then(Entity::as_character_mut) {
            character.ability_system = Some(system);
        }
        debug!(ability_system = %system, avatar = %avatar, "ability actor info set");

        if let Some(spec) = default_attributes {
            let context = self.make_effect_context(system);
            self.apply_effect_spec_to_self(&spec.with_context(context), system)?;
        }
        Ok(())
    }

    /// An effect context originating from `system`, caused by its avatar.
    #[must_use]
    pub fn make_effect_context(&self, system: AbilitySystemId) -> EffectContext {
        let causer = self
            .ability_system(system)
            .and_then(AbilitySystem::actor_info)
            .and_then(|info| info.avatar);
        EffectContext::new(Some(system), causer)
    }

    /// Grants an ability at `level`, bound to its startup input tag.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownAbilitySystem`] if `system` is unknown.
    pub fn grant_ability(
        &mut self,
        system: AbilitySystemId,
        ability: Arc<dyn GameplayAbility>,
        level: u32,
    ) -> Result<AbilitySpecHandle, WorldError> {
        let asc = self.system_or_err(system)?;
        let handle = AbilitySpecHandle::new(asc.next_handle);
        asc.next_handle += 1;
        debug!(ability_system = %system, ability = ability.name(), "granted ability");
        asc.specs.push(AbilitySpec {
            handle,
            input_tag: ability.startup_input_tag(),
            ability,
            level,
            input_pressed: false,
            active: false,
            remove_on_end: false,
        });
        Ok(handle)
    }

    /// Grants each startup ability at level 1 and activates it once.
    ///
    /// Each grant is one-shot: the spec is removed as soon as its activation
    /// ends, so the returned handles only stay valid while it runs.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownAbilitySystem`] if `system` is unknown.
    pub fn add_character_abilities(
        &mut self,
        system: AbilitySystemId,
        abilities: impl IntoIterator<Item = Arc<dyn GameplayAbility>>,
    ) -> Result<Vec<AbilitySpecHandle>, WorldError> {
        let mut handles = Vec::new();
        for ability in abilities {
            let handle = self.grant_ability(system, ability, 1)?;
            if let Some(spec) = self
                .ability_system_mut(system)
                .and_then(|asc| asc.spec_mut(handle))
            {
                spec.remove_on_end = true;
            }
            self.try_activate_ability(system, handle)?;
            handles.push(handle);
        }
        Ok(handles)
    }

    /// Activates a granted ability unless it is already active.
    ///
    /// Returns `true` if the ability was activated.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownAbilitySystem`] if `system` is unknown.
    pub fn try_activate_ability(
        &mut self,
        system: AbilitySystemId,
        handle: AbilitySpecHandle,
    ) -> Result<bool, WorldError> {
        let asc = self.system_or_err(system)?;
        let Some(spec) = asc.spec_mut(handle) else {
            return Ok(false);
        };
        if spec.active {
            return Ok(false);
        }
        spec.active = true;
        let ability = Arc::clone(&spec.ability);
        let level = spec.level;
        let ctx = asc.context_for(handle, level);

        trace!(ability_system = %system, ability = ability.name(), "activating ability");
        if ability.activate(&ctx, self) == ActivationResult::Ended {
            self.end_ability(system, handle);
        }
        Ok(true)
    }

    /// Marks an ability as no longer running, removing one-shot specs.
    pub fn end_ability(&mut self, system: AbilitySystemId, handle: AbilitySpecHandle) {
        let Some(asc) = self.ability_system_mut(system) else {
            return;
        };
        let Some(spec) = asc.spec_mut(handle) else {
            return;
        };
        spec.active = false;
        if spec.remove_on_end {
            asc.specs.retain(|spec| spec.handle != handle);
            debug!(ability_system = %system, "removed one-shot ability");
        }
    }

    /// Input bound to `tag` went down: marks matching specs pressed and
    /// notifies the ones already active.
    pub fn ability_input_tag_pressed(&mut self, system: AbilitySystemId, tag: Tag) {
        for handle in self.input_handles(system, tag) {
            if let Some((ability, ctx, true)) = self.mark_input(system, handle, true) {
                ability.input_pressed(&ctx, self);
            }
        }
    }

    /// Input bound to `tag` is held: marks matching specs pressed, notifies
    /// the active ones and activates the rest.
    pub fn ability_input_tag_held(&mut self, system: AbilitySystemId, tag: Tag) {
        for handle in self.input_handles(system, tag) {
            match self.mark_input(system, handle, true) {
                Some((ability, ctx, true)) => ability.input_pressed(&ctx, self),
                Some((_, _, false)) => {
                    if let Err(err) = self.try_activate_ability(system, handle) {
                        warn!(ability_system = %system, %err, "held input failed to activate");
                    }
                }
                None => {}
            }
        }
    }

    /// Input bound to `tag` went up: marks matching specs released and
    /// notifies the active ones.
    pub fn ability_input_tag_released(&mut self, system: AbilitySystemId, tag: Tag) {
        for handle in self.input_handles(system, tag) {
            if let Some((ability, ctx, true)) = self.mark_input(system, handle, false) {
                ability.input_released(&ctx, self);
            }
        }
    }

    fn input_handles(&self, system: AbilitySystemId, tag: Tag) -> Vec<AbilitySpecHandle> {
        self.ability_system(system)
            .map(|asc| asc.handles_for(tag))
            .unwrap_or_default()
    }

    /// Sets the pressed flag and returns the ability, its context and
    /// whether it is active.
    fn mark_input(
        &mut self,
        system: AbilitySystemId,
        handle: AbilitySpecHandle,
        pressed: bool,
    ) -> Option<(Arc<dyn GameplayAbility>, AbilityContext, bool)> {
        let asc = self.ability_system_mut(system)?;
        let spec = asc.spec_mut(handle)?;
        spec.input_pressed = pressed;
        let ability = Arc::clone(&spec.ability);
        let (level, active) = (spec.level, spec.active);
        Some((ability, asc.context_for(handle, level), active))
    }

    /// Takes every queued attribute replica, in ability-system order.
    pub fn drain_replicas(&mut self) -> Vec<AttributeReplica> {
        self.ability_systems_sorted_mut()
            .flat_map(|asc| std::mem::take(&mut asc.outbox))
            .collect()
    }
}
