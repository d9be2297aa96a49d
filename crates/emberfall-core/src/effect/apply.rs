//! Applying effect specs to ability systems.

use tracing::debug;

use super::{EffectExecutionData, EffectProperties, EffectSpec, EvaluatedModifier};
use crate::ability::AbilitySystemId;
use crate::attribute::{AttributeChange, AttributeSet};
use crate::error::WorldError;
use crate::world::World;

impl World {
    /// Applies `spec` to the ability system `target`.
    ///
    /// Each modifier, in order, is evaluated against the current value,
    /// committed through the pre-change hook, resolved into
    /// [`EffectProperties`], and handed to the post-commit hook. Afterwards
    /// the target's `attribute_changed` observers receive every committed
    /// change, the changes are queued for replication, and the
    /// `effect_asset_tags` observers receive the spec's asset tags.
    ///
    /// Returns the committed changes in commit order.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownAbilitySystem`] if `target` does not exist.
    pub fn apply_effect_spec_to_target(
        &mut self,
        spec: &EffectSpec,
        target: AbilitySystemId,
    ) -> Result<Vec<AttributeChange>, WorldError> {
        if self.ability_system(target).is_none() {
            return Err(WorldError::UnknownAbilitySystem(target));
        }

        let mut changes = Vec::with_capacity(spec.modifiers().len());
        for modifier in spec.modifiers() {
            let change = {
                let attributes = self.attributes_mut(target)?;
                let proposed = modifier
                    .op
                    .evaluate(attributes.get(modifier.attribute), modifier.magnitude);
                attributes.commit(modifier.attribute, proposed)
            };
            changes.push(change);

            let data = EffectExecutionData {
                spec,
                evaluated: EvaluatedModifier {
                    attribute: modifier.attribute,
                    modifier: *modifier,
                    change,
                },
                target,
            };
            let props = EffectProperties::resolve(self, &data);
            if let Some(extra) = self
                .attributes_mut(target)?
                .post_gameplay_effect_execute(&data, &props)
            {
                changes.push(extra);
            }
        }

        let system = self
            .ability_system_mut(target)
            .ok_or(WorldError::UnknownAbilitySystem(target))?;
        for change in &changes {
            system.record_change(change);
        }
        system.effect_asset_tags.notify(spec.asset_tags());

        debug!(
            ability_system = %target,
            instigator = ?spec.context().instigator(),
            changes = changes.len(),
            "applied effect spec"
        );
        Ok(changes)
    }

    /// Applies `spec` to the ability system it is applied from.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownAbilitySystem`] if `system` does not exist.
    pub fn apply_effect_spec_to_self(
        &mut self,
        spec: &EffectSpec,
        system: AbilitySystemId,
    ) -> Result<Vec<AttributeChange>, WorldError> {
        self.apply_effect_spec_to_target(spec, system)
    }

    fn attributes_mut(
        &mut self,
        id: AbilitySystemId,
    ) -> Result<&mut AttributeSet, WorldError> {
        self.ability_system_mut(id)
            .map(|system| system.attributes_mut())
            .ok_or(WorldError::UnknownAbilitySystem(id))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::attribute::AttributeId;
    use crate::config::{AttributeDefaults, ClampPolicy};
    use crate::effect::{EffectContext, ModifierOp};
    use crate::entity::components::CharacterComponents;
    use crate::entity::{EntityInner, EntityTag};
    use crate::tags::GameplayTags;

    fn world_with_system(policy: ClampPolicy) -> (World, AbilitySystemId) {
        let mut world = World::default();
        let hero = world.spawn(EntityTag::Hero, EntityInner::Hero(CharacterComponents::default()));
        let asc = world.add_ability_system(
            hero,
            AttributeSet::new(&AttributeDefaults::default(), policy),
        );
        world.init_ability_actor_info(asc, hero).unwrap();
        (world, asc)
    }

    #[test]
    fn modifiers_commit_in_order() {
        let (mut world, asc) = world_with_system(ClampPolicy::Passthrough);
        let spec = EffectSpec::new(EffectContext::new(Some(asc), None))
            .with_modifier(AttributeId::Mana, ModifierOp::Override, 40.0)
            .with_modifier(AttributeId::Mana, ModifierOp::Multiply, 0.5);

        let changes = world.apply_effect_spec_to_self(&spec, asc).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].new_value, 40.0);
        assert_eq!(changes[1].new_value, 20.0);
        let attributes = world.ability_system(asc).unwrap().attributes();
        assert_eq!(attributes.get(AttributeId::Mana), 20.0);
        assert_eq!(attributes.revision(AttributeId::Mana), 2);
    }

    #[test]
    fn passthrough_commits_above_max() {
        let (mut world, asc) = world_with_system(ClampPolicy::Passthrough);
        let to_ninety = EffectSpec::new(EffectContext::empty())
            .with_modifier(AttributeId::Health, ModifierOp::Override, 90.0);
        world.apply_effect_spec_to_target(&to_ninety, asc).unwrap();

        let overheal = EffectSpec::new(EffectContext::empty())
            .with_modifier(AttributeId::Health, ModifierOp::Override, 150.0);
        let changes = world.apply_effect_spec_to_target(&overheal, asc).unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(
            world.ability_system(asc).unwrap().attributes().get(AttributeId::Health),
            150.0
        );
    }

    #[test]
    fn clamp_vitals_keeps_health_in_range() {
        let (mut world, asc) = world_with_system(ClampPolicy::ClampVitals);
        let spec = EffectSpec::new(EffectContext::empty())
            .with_modifier(AttributeId::Health, ModifierOp::Add, 1000.0);
        world.apply_effect_spec_to_target(&spec, asc).unwrap();
        assert_eq!(
            world.ability_system(asc).unwrap().attributes().get(AttributeId::Health),
            100.0
        );
    }

    #[test]
    fn observers_receive_changes_and_tags() {
        let tags = GameplayTags::initialize().unwrap();
        let (mut world, asc) = world_with_system(ClampPolicy::Passthrough);

        let changes = Rc::new(RefCell::new(Vec::new()));
        let applied = Rc::new(RefCell::new(Vec::new()));
        {
            let system = world.ability_system_mut(asc).unwrap();
            let sink = Rc::clone(&changes);
            system
                .attribute_changed
                .subscribe(move |c: &AttributeChange| sink.borrow_mut().push(*c));
            let sink = Rc::clone(&applied);
            system
                .effect_asset_tags
                .subscribe(move |t: &gameplay_tags::TagContainer| sink.borrow_mut().push(t.len()));
        }

        let spec = EffectSpec::new(EffectContext::empty())
            .with_modifier(AttributeId::Health, ModifierOp::Add, -3.0)
            .with_asset_tag(tags.attributes_vital_health);
        world.apply_effect_spec_to_target(&spec, asc).unwrap();

        assert_eq!(changes.borrow().len(), 1);
        assert_eq!(changes.borrow()[0].new_value, 7.0);
        assert_eq!(*applied.borrow(), vec![1]);
    }

    #[test]
    fn unknown_target_is_error() {
        let (mut world, _) = world_with_system(ClampPolicy::Passthrough);
        let spec = EffectSpec::new(EffectContext::empty());
        let err = world
            .apply_effect_spec_to_target(&spec, AbilitySystemId::new(77))
            .unwrap_err();
        assert_eq!(err, WorldError::UnknownAbilitySystem(AbilitySystemId::new(77)));
    }

    #[test]
    fn commits_are_queued_for_replication() {
        let (mut world, asc) = world_with_system(ClampPolicy::Passthrough);
        let spec = EffectSpec::new(EffectContext::empty())
            .with_modifier(AttributeId::Strength, ModifierOp::Add, 2.0);
        world.apply_effect_spec_to_target(&spec, asc).unwrap();

        let replicas = world.drain_replicas();
        assert_eq!(replicas.len(), 1);
        assert_eq!(replicas[0].attribute, AttributeId::Strength);
        assert_eq!(replicas[0].revision, 1);
        assert!(world.drain_replicas().is_empty());
    }
}
