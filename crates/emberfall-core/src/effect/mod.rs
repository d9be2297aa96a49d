//! Gameplay effects: specs, contexts, and execution data.
//!
//! An [`EffectSpec`] carries an [`EffectContext`] naming who caused it, an
//! ordered list of attribute modifiers, and a set of asset tags. Applying a
//! spec to an ability system runs each modifier through the attribute
//! mutation pipeline:
//!
//! 1. `pre_attribute_change` decides the committed value
//! 2. the value is committed
//! 3. [`EffectProperties::resolve`] derives source and target identities
//! 4. `post_gameplay_effect_execute` post-processes the changed attribute
//!
//! See [`World::apply_effect_spec_to_target`](crate::world::World::apply_effect_spec_to_target).

mod apply;
mod properties;

pub use properties::EffectProperties;

use gameplay_tags::{Tag, TagContainer};
use serde::{Deserialize, Serialize};

use crate::ability::AbilitySystemId;
use crate::attribute::{AttributeChange, AttributeId};
use crate::entity::EntityId;

/// Causal record captured when an effect is created.
///
/// Immutable once built. The instigator is the ability system the effect
/// originated from; it may be absent (environmental effects).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectContext {
    instigator: Option<AbilitySystemId>,
    effect_causer: Option<EntityId>,
}

impl EffectContext {
    /// Context for an effect originating from `instigator`, physically caused
    /// by `effect_causer`.
    #[must_use]
    pub const fn new(instigator: Option<AbilitySystemId>, effect_causer: Option<EntityId>) -> Self {
        Self {
            instigator,
            effect_causer,
        }
    }

    /// Context with no instigator and no causer.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(None, None)
    }

    /// The originating ability system.
    #[must_use]
    pub const fn instigator(&self) -> Option<AbilitySystemId> {
        self.instigator
    }

    /// The entity that physically applied the effect (e.g. a projectile's
    /// shooter).
    #[must_use]
    pub const fn effect_causer(&self) -> Option<EntityId> {
        self.effect_causer
    }
}

/// How a modifier combines with the attribute's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierOp {
    /// `current + magnitude`
    Add,
    /// `current * magnitude`
    Multiply,
    /// `magnitude`
    Override,
}

impl ModifierOp {
    /// The proposed value for `current` under this operation.
    #[must_use]
    pub fn evaluate(self, current: f32, magnitude: f32) -> f32 {
        match self {
            Self::Add => current + magnitude,
            Self::Multiply => current * magnitude,
            Self::Override => magnitude,
        }
    }
}

/// One attribute modification inside a spec.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifierInfo {
    /// Attribute to modify.
    pub attribute: AttributeId,
    /// Combination rule.
    pub op: ModifierOp,
    /// Operand.
    pub magnitude: f32,
}

/// An instant effect ready to apply.
///
/// # Example
///
/// ```
/// use emberfall_core::attribute::AttributeId;
/// use emberfall_core::effect::{EffectContext, EffectSpec, ModifierOp};
///
/// let spec = EffectSpec::new(EffectContext::empty())
///     .with_modifier(AttributeId::Health, ModifierOp::Add, 25.0)
///     .with_modifier(AttributeId::Mana, ModifierOp::Override, 5.0);
///
/// assert_eq!(spec.modifiers().len(), 2);
/// assert!(spec.asset_tags().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectSpec {
    context: EffectContext,
    modifiers: Vec<ModifierInfo>,
    asset_tags: TagContainer,
}

impl EffectSpec {
    /// An empty spec with the given context.
    #[must_use]
    pub fn new(context: EffectContext) -> Self {
        Self {
            context,
            modifiers: Vec::new(),
            asset_tags: TagContainer::new(),
        }
    }

    /// Appends a modifier. Modifiers execute in insertion order.
    #[must_use]
    pub fn with_modifier(mut self, attribute: AttributeId, op: ModifierOp, magnitude: f32) -> Self {
        self.modifiers.push(ModifierInfo {
            attribute,
            op,
            magnitude,
        });
        self
    }

    /// Adds an asset tag.
    #[must_use]
    pub fn with_asset_tag(mut self, tag: Tag) -> Self {
        self.asset_tags.add(tag);
        self
    }

    /// Replaces the context.
    #[must_use]
    pub fn with_context(mut self, context: EffectContext) -> Self {
        self.context = context;
        self
    }

    /// The causal context.
    #[must_use]
    pub const fn context(&self) -> &EffectContext {
        &self.context
    }

    /// Modifiers in execution order.
    #[must_use]
    pub fn modifiers(&self) -> &[ModifierInfo] {
        &self.modifiers
    }

    /// Tags describing the effect itself.
    #[must_use]
    pub const fn asset_tags(&self) -> &TagContainer {
        &self.asset_tags
    }
}

/// Data handed to the post-commit hook for one executed modifier.
#[derive(Debug, Clone, Copy)]
pub struct EffectExecutionData<'a> {
    /// The spec being applied.
    pub spec: &'a EffectSpec,
    /// The modifier that was just committed, with its outcome.
    pub evaluated: EvaluatedModifier,
    /// The ability system the spec was applied to.
    pub target: AbilitySystemId,
}

/// A modifier together with the change it committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatedModifier {
    /// Attribute modified.
    pub attribute: AttributeId,
    /// The modifier as written in the spec.
    pub modifier: ModifierInfo,
    /// What was committed.
    pub change: AttributeChange,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::GameplayTags;

    #[test]
    fn modifier_ops() {
        assert_eq!(ModifierOp::Add.evaluate(10.0, 5.0), 15.0);
        assert_eq!(ModifierOp::Multiply.evaluate(10.0, 0.5), 5.0);
        assert_eq!(ModifierOp::Override.evaluate(10.0, 42.0), 42.0);
    }

    #[test]
    fn empty_context_has_no_instigator() {
        let context = EffectContext::empty();
        assert_eq!(context.instigator(), None);
        assert_eq!(context.effect_causer(), None);
        assert_eq!(context, EffectContext::default());
    }

    #[test]
    fn spec_builder_keeps_order_and_tags() {
        let tags = GameplayTags::initialize().unwrap();
        let spec = EffectSpec::new(EffectContext::new(Some(AbilitySystemId::new(1)), None))
            .with_modifier(AttributeId::Strength, ModifierOp::Add, 1.0)
            .with_modifier(AttributeId::Vigor, ModifierOp::Add, 2.0)
            .with_asset_tag(tags.attributes_secondary_armor);

        assert_eq!(spec.modifiers()[0].attribute, AttributeId::Strength);
        assert_eq!(spec.modifiers()[1].attribute, AttributeId::Vigor);
        assert!(spec.asset_tags().has_tag_exact(tags.attributes_secondary_armor));
        assert_eq!(spec.context().instigator(), Some(AbilitySystemId::new(1)));
    }

    #[test]
    fn spec_serializes_tags_by_name() {
        let tags = GameplayTags::initialize().unwrap();
        let spec = EffectSpec::new(EffectContext::empty()).with_asset_tag(tags.input_lmb);
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"Input.LMB\""));
    }
}
