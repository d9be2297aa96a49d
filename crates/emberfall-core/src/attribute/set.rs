//! The attribute set and its mutation pipeline.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{AttributeChange, AttributeData, AttributeId};
use crate::config::{AttributeDefaults, ClampPolicy};
use crate::effect::{EffectExecutionData, EffectProperties};

/// The eight tracked attributes of one entity.
///
/// # Invariants
///
/// - Every committed value has passed through [`pre_attribute_change`](Self::pre_attribute_change)
/// - Each attribute's revision increases by one per commit
///
/// # Example
///
/// ```
/// use emberfall_core::attribute::{AttributeId, AttributeSet};
/// use emberfall_core::config::{AttributeDefaults, ClampPolicy};
///
/// let set = AttributeSet::new(&AttributeDefaults::default(), ClampPolicy::Passthrough);
/// assert_eq!(set.get(AttributeId::Health), 10.0);
/// assert_eq!(set.get(AttributeId::MaxMana), 50.0);
///
/// // Pass-through accepts values above the maximum
/// assert_eq!(set.pre_attribute_change(AttributeId::Health, 150.0), 150.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    values: [AttributeData; 8],
    revisions: [u64; 8],
    policy: ClampPolicy,
}

impl AttributeSet {
    /// Creates a set from starting values.
    #[must_use]
    pub fn new(defaults: &AttributeDefaults, policy: ClampPolicy) -> Self {
        let mut values = [AttributeData::default(); 8];
        for attribute in AttributeId::ALL {
            let value = match attribute {
                AttributeId::Strength => defaults.strength,
                AttributeId::Intelligence => defaults.intelligence,
                AttributeId::Resilience => defaults.resilience,
                AttributeId::Vigor => defaults.vigor,
                AttributeId::Health => defaults.health,
                AttributeId::MaxHealth => defaults.max_health,
                AttributeId::Mana => defaults.mana,
                AttributeId::MaxMana => defaults.max_mana,
            };
            values[attribute.index()] = AttributeData::new(value);
        }
        Self {
            values,
            revisions: [0; 8],
            policy,
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self, attribute: AttributeId) -> f32 {
        self.values[attribute.index()].current
    }

    /// Base value.
    #[must_use]
    pub fn base(&self, attribute: AttributeId) -> f32 {
        self.values[attribute.index()].base
    }

    /// Number of commits to `attribute` so far.
    #[must_use]
    pub fn revision(&self, attribute: AttributeId) -> u64 {
        self.revisions[attribute.index()]
    }

    /// The clamping policy in force.
    #[must_use]
    pub const fn policy(&self) -> ClampPolicy {
        self.policy
    }

    /// Current values of all attributes, in [`AttributeId::ALL`] order.
    #[must_use]
    pub fn snapshot(&self) -> [(AttributeId, f32); 8] {
        AttributeId::ALL.map(|attribute| (attribute, self.get(attribute)))
    }

    // -------------------------------------------------------------------------
    // Mutation pipeline
    // -------------------------------------------------------------------------

    /// Pre-change hook: returns the value that will actually be committed.
    ///
    /// Under [`ClampPolicy::Passthrough`] the proposed value is returned
    /// unchanged, so health and mana can exceed their maximum or go negative.
    /// Under [`ClampPolicy::ClampVitals`] health and mana are clamped to
    /// `[0, max]`. No other state is touched.
    #[must_use]
    pub fn pre_attribute_change(&self, attribute: AttributeId, proposed: f32) -> f32 {
        match (self.policy, attribute.max_attribute()) {
            (ClampPolicy::ClampVitals, Some(max)) => clamp_vital(proposed, self.get(max)),
            _ => proposed,
        }
    }

    /// Commits a proposed value through the pre-change hook.
    ///
    /// This is the only write path for authoritative values.
    pub(crate) fn commit(&mut self, attribute: AttributeId, proposed: f32) -> AttributeChange {
        let accepted = self.pre_attribute_change(attribute, proposed);
        let slot = &mut self.values[attribute.index()];
        let old_value = slot.current;
        *slot = AttributeData::new(accepted);

        let revision = &mut self.revisions[attribute.index()];
        *revision += 1;

        trace!(
            %attribute,
            old_value,
            proposed,
            accepted,
            revision = *revision,
            "attribute committed"
        );
        AttributeChange {
            attribute,
            old_value,
            new_value: accepted,
            revision: *revision,
        }
    }

    /// Post-commit hook, run after an effect modifier has been committed.
    ///
    /// Branches on the attribute that changed. Health and mana are re-clamped
    /// to `[0, max]` under [`ClampPolicy::ClampVitals`]; every other attribute,
    /// and every attribute under pass-through, is left as committed. Returns
    /// the extra change if re-clamping wrote a new value.
    pub fn post_gameplay_effect_execute(
        &mut self,
        data: &EffectExecutionData<'_>,
        props: &EffectProperties,
    ) -> Option<AttributeChange> {
        let attribute = data.evaluated.attribute;
        trace!(
            %attribute,
            source_avatar = ?props.source_avatar,
            target_avatar = ?props.target_avatar,
            "post effect execute"
        );

        if self.policy != ClampPolicy::ClampVitals {
            return None;
        }
        match attribute {
            AttributeId::Health | AttributeId::Mana => {
                let max = attribute.max_attribute()?;
                let current = self.get(attribute);
                let clamped = clamp_vital(current, self.get(max));
                #[allow(clippy::float_cmp)]
                let unchanged = clamped == current;
                (!unchanged).then(|| self.commit(attribute, clamped))
            }
            _ => None,
        }
    }

    /// Applies a value received from the owning side.
    ///
    /// Returns the change when `revision` is newer than the last one seen for
    /// this attribute, and `None` for stale or duplicate deliveries. A newer
    /// revision is reported even if the value did not change.
    pub(crate) fn apply_replicated(
        &mut self,
        attribute: AttributeId,
        value: f32,
        revision: u64,
    ) -> Option<AttributeChange> {
        let last = &mut self.revisions[attribute.index()];
        if revision <= *last {
            return None;
        }
        *last = revision;
        let slot = &mut self.values[attribute.index()];
        let old_value = slot.current;
        *slot = AttributeData::new(value);
        Some(AttributeChange {
            attribute,
            old_value,
            new_value: value,
            revision,
        })
    }
}

fn clamp_vital(value: f32, max: f32) -> f32 {
    value.clamp(0.0, max.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough() -> AttributeSet {
        AttributeSet::new(&AttributeDefaults::default(), ClampPolicy::Passthrough)
    }

    fn clamped() -> AttributeSet {
        AttributeSet::new(&AttributeDefaults::default(), ClampPolicy::ClampVitals)
    }

    mod pre_change_tests {
        use super::*;

        #[test]
        fn passthrough_never_clamps() {
            let set = passthrough();
            assert_eq!(set.pre_attribute_change(AttributeId::Health, 150.0), 150.0);
            assert_eq!(set.pre_attribute_change(AttributeId::Mana, -5.0), -5.0);
        }

        #[test]
        fn clamp_vitals_bounds_health_and_mana() {
            let set = clamped();
            assert_eq!(set.pre_attribute_change(AttributeId::Health, 150.0), 100.0);
            assert_eq!(set.pre_attribute_change(AttributeId::Health, -3.0), 0.0);
            assert_eq!(set.pre_attribute_change(AttributeId::Mana, 80.0), 50.0);
        }

        #[test]
        fn clamp_vitals_ignores_other_attributes() {
            let set = clamped();
            assert_eq!(set.pre_attribute_change(AttributeId::MaxHealth, 1e6), 1e6);
            assert_eq!(set.pre_attribute_change(AttributeId::Strength, -1.0), -1.0);
        }

        #[test]
        fn negative_max_clamps_to_zero() {
            let mut set = passthrough();
            set.commit(AttributeId::MaxHealth, -10.0);
            let set = AttributeSet { policy: ClampPolicy::ClampVitals, ..set };
            assert_eq!(set.pre_attribute_change(AttributeId::Health, 5.0), 0.0);
        }
    }

    mod commit_tests {
        use super::*;

        #[test]
        fn commit_reports_change_and_bumps_revision() {
            let mut set = passthrough();
            let change = set.commit(AttributeId::Health, 90.0);
            assert_eq!(change.old_value, 10.0);
            assert_eq!(change.new_value, 90.0);
            assert_eq!(change.revision, 1);
            assert_eq!(set.revision(AttributeId::Health), 1);
            assert_eq!(set.revision(AttributeId::Mana), 0);
            assert_eq!(set.base(AttributeId::Health), 90.0);
        }

        #[test]
        fn commit_goes_through_pre_change() {
            let mut set = clamped();
            let change = set.commit(AttributeId::Health, 500.0);
            assert_eq!(change.new_value, 100.0);
            assert_eq!(set.get(AttributeId::Health), 100.0);
        }

        #[test]
        fn snapshot_lists_all() {
            let snapshot = passthrough().snapshot();
            assert_eq!(snapshot[4], (AttributeId::Health, 10.0));
            assert_eq!(snapshot[7], (AttributeId::MaxMana, 50.0));
        }
    }

    mod replicated_tests {
        use super::*;

        #[test]
        fn stale_revisions_are_dropped() {
            let mut set = passthrough();
            assert!(set.apply_replicated(AttributeId::Mana, 20.0, 2).is_some());
            assert!(set.apply_replicated(AttributeId::Mana, 15.0, 1).is_none());
            assert!(set.apply_replicated(AttributeId::Mana, 20.0, 2).is_none());
            assert_eq!(set.get(AttributeId::Mana), 20.0);
        }

        #[test]
        fn equal_value_still_reported() {
            let mut set = passthrough();
            let change = set.apply_replicated(AttributeId::Health, 10.0, 1).unwrap();
            assert_eq!(change.old_value, change.new_value);
        }
    }
}
