//! Attribute store: per-entity numeric state.
//!
//! Eight attributes are tracked, four primary and four vital:
//!
//! | Attribute | Tag | Paired maximum |
//! |---|---|---|
//! | Strength | `Attributes.Primary.Strength` | |
//! | Intelligence | `Attributes.Primary.Intelligence` | |
//! | Resilience | `Attributes.Primary.Resilience` | |
//! | Vigor | `Attributes.Primary.Vigor` | |
//! | Health | `Attributes.Vital.Health` | MaxHealth |
//! | MaxHealth | `Attributes.Vital.MaxHealth` | |
//! | Mana | `Attributes.Vital.Mana` | MaxMana |
//! | MaxMana | `Attributes.Vital.MaxMana` | |
//!
//! Values are only ever written through the mutation pipeline in
//! [`AttributeSet`]; see [`AttributeSet::pre_attribute_change`] and
//! [`AttributeSet::post_gameplay_effect_execute`].

mod set;

pub use set::AttributeSet;

use std::fmt;

use gameplay_tags::Tag;
use serde::{Deserialize, Serialize};

use crate::tags::GameplayTags;

/// One of the tracked attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeId {
    /// Primary: physical damage.
    Strength,
    /// Primary: magical damage.
    Intelligence,
    /// Primary: armor.
    Resilience,
    /// Primary: health.
    Vigor,
    /// Vital: current health.
    Health,
    /// Vital: health ceiling.
    MaxHealth,
    /// Vital: current mana.
    Mana,
    /// Vital: mana ceiling.
    MaxMana,
}

impl AttributeId {
    /// Every attribute, in storage order.
    pub const ALL: [Self; 8] = [
        Self::Strength,
        Self::Intelligence,
        Self::Resilience,
        Self::Vigor,
        Self::Health,
        Self::MaxHealth,
        Self::Mana,
        Self::MaxMana,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Intelligence => "Intelligence",
            Self::Resilience => "Resilience",
            Self::Vigor => "Vigor",
            Self::Health => "Health",
            Self::MaxHealth => "MaxHealth",
            Self::Mana => "Mana",
            Self::MaxMana => "MaxMana",
        }
    }

    /// The attribute bounding this one from above, for vitals with a pair.
    #[must_use]
    pub const fn max_attribute(self) -> Option<Self> {
        match self {
            Self::Health => Some(Self::MaxHealth),
            Self::Mana => Some(Self::MaxMana),
            _ => None,
        }
    }

    /// The native tag naming this attribute.
    #[must_use]
    pub const fn tag(self, tags: &GameplayTags) -> Tag {
        match self {
            Self::Strength => tags.attributes_primary_strength,
            Self::Intelligence => tags.attributes_primary_intelligence,
            Self::Resilience => tags.attributes_primary_resilience,
            Self::Vigor => tags.attributes_primary_vigor,
            Self::Health => tags.attributes_vital_health,
            Self::MaxHealth => tags.attributes_vital_max_health,
            Self::Mana => tags.attributes_vital_mana,
            Self::MaxMana => tags.attributes_vital_max_mana,
        }
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base and current value of one attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeData {
    /// Permanent value.
    pub base: f32,
    /// Value after all active modifications.
    pub current: f32,
}

impl AttributeData {
    /// Base and current both set to `value`.
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Self {
            base: value,
            current: value,
        }
    }
}

/// A committed attribute change, delivered to change observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Which attribute changed.
    pub attribute: AttributeId,
    /// Value before the commit.
    pub old_value: f32,
    /// Value after the commit.
    pub new_value: f32,
    /// Per-attribute commit counter after this change.
    pub revision: u64,
}
