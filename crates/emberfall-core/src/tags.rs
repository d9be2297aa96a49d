//! The native gameplay tag set.
//!
//! [`GameplayTags::initialize`] registers every tag the core refers to and
//! stores the frozen set for the rest of the process. It must run before any
//! gameplay code asks for a tag; [`GameplayTags::get`] aborts otherwise.

use std::sync::OnceLock;

use gameplay_tags::{Tag, TagError, TagRegistry, TagRegistryBuilder};
use tracing::info;

static NATIVE_TAGS: OnceLock<GameplayTags> = OnceLock::new();

/// Handles to every native tag, plus the registry they came from.
#[derive(Debug)]
pub struct GameplayTags {
    registry: TagRegistry,

    /// Primary interaction button (hover targeting / click-to-move).
    pub input_lmb: Tag,
    /// Secondary mouse button.
    pub input_rmb: Tag,
    /// Ability slot 1.
    pub input_1: Tag,
    /// Ability slot 2.
    pub input_2: Tag,
    /// Ability slot 3.
    pub input_3: Tag,
    /// Ability slot 4.
    pub input_4: Tag,

    /// `Attributes.Primary.Strength`
    pub attributes_primary_strength: Tag,
    /// `Attributes.Primary.Intelligence`
    pub attributes_primary_intelligence: Tag,
    /// `Attributes.Primary.Resilience`
    pub attributes_primary_resilience: Tag,
    /// `Attributes.Primary.Vigor`
    pub attributes_primary_vigor: Tag,

    /// `Attributes.Vital.Health`
    pub attributes_vital_health: Tag,
    /// `Attributes.Vital.MaxHealth`
    pub attributes_vital_max_health: Tag,
    /// `Attributes.Vital.Mana`
    pub attributes_vital_mana: Tag,
    /// `Attributes.Vital.MaxMana`
    pub attributes_vital_max_mana: Tag,

    /// `Attributes.Secondary.Armor`
    pub attributes_secondary_armor: Tag,
}

impl GameplayTags {
    /// Registers the native tags and publishes them process-wide.
    ///
    /// Calling this again returns the already-published set.
    ///
    /// # Errors
    ///
    /// Propagates registration failures from [`TagRegistryBuilder::register`].
    pub fn initialize() -> Result<&'static Self, TagError> {
        if let Some(tags) = NATIVE_TAGS.get() {
            return Ok(tags);
        }
        let tags = Self::build()?;
        let published = NATIVE_TAGS.get_or_init(|| tags);
        info!(count = published.registry.len(), "native gameplay tags initialized");
        Ok(published)
    }

    /// Returns the published tag set.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NotInitialized`] before [`initialize`](Self::initialize).
    pub fn try_get() -> Result<&'static Self, TagError> {
        NATIVE_TAGS.get().ok_or(TagError::NotInitialized)
    }

    /// Returns the published tag set.
    ///
    /// # Panics
    ///
    /// Panics if called before [`initialize`](Self::initialize). Using tags
    /// before startup has registered them is a startup-order bug.
    #[must_use]
    pub fn get() -> &'static Self {
        match Self::try_get() {
            Ok(tags) => tags,
            Err(err) => panic!("{err}"),
        }
    }

    /// Looks up any registered tag by name.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnknownTag`] for names outside the native set.
    pub fn lookup(&self, name: &str) -> Result<Tag, TagError> {
        self.registry.lookup(name)
    }

    /// The registry backing this set.
    #[must_use]
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// The four ability-slot input tags, in slot order.
    #[must_use]
    pub fn ability_slot_inputs(&self) -> [Tag; 4] {
        [self.input_1, self.input_2, self.input_3, self.input_4]
    }

    fn build() -> Result<Self, TagError> {
        let mut b = TagRegistryBuilder::new();

        let input_lmb = b.register("Input.LMB", "Input tag for the left mouse button")?;
        let input_rmb = b.register("Input.RMB", "Input tag for the right mouse button")?;
        let input_1 = b.register("Input.1", "Input tag for the 1 key")?;
        let input_2 = b.register("Input.2", "Input tag for the 2 key")?;
        let input_3 = b.register("Input.3", "Input tag for the 3 key")?;
        let input_4 = b.register("Input.4", "Input tag for the 4 key")?;

        let attributes_primary_strength = b.register(
            "Attributes.Primary.Strength",
            "Increases physical damage",
        )?;
        let attributes_primary_intelligence = b.register(
            "Attributes.Primary.Intelligence",
            "Increases magical damage",
        )?;
        let attributes_primary_resilience = b.register(
            "Attributes.Primary.Resilience",
            "Increases armor and armor penetration",
        )?;
        let attributes_primary_vigor =
            b.register("Attributes.Primary.Vigor", "Increases health")?;

        let attributes_vital_health = b.register(
            "Attributes.Vital.Health",
            "Amount of damage a character can take before dying",
        )?;
        let attributes_vital_max_health = b.register(
            "Attributes.Vital.MaxHealth",
            "Maximum amount of health obtainable",
        )?;
        let attributes_vital_mana =
            b.register("Attributes.Vital.Mana", "Resource spent to cast spells")?;
        let attributes_vital_max_mana = b.register(
            "Attributes.Vital.MaxMana",
            "Maximum amount of mana obtainable",
        )?;

        let attributes_secondary_armor = b.register(
            "Attributes.Secondary.Armor",
            "Reduces damage taken, improves Block Chance",
        )?;

        Ok(Self {
            registry: b.build(),
            input_lmb,
            input_rmb,
            input_1,
            input_2,
            input_3,
            input_4,
            attributes_primary_strength,
            attributes_primary_intelligence,
            attributes_primary_resilience,
            attributes_primary_vigor,
            attributes_vital_health,
            attributes_vital_max_health,
            attributes_vital_mana,
            attributes_vital_max_mana,
            attributes_secondary_armor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        let first = GameplayTags::initialize().unwrap();
        let second = GameplayTags::initialize().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(GameplayTags::try_get().is_ok());
    }

    #[test]
    fn lookup_matches_fields() {
        let tags = GameplayTags::initialize().unwrap();
        assert_eq!(tags.lookup("Input.LMB").unwrap(), tags.input_lmb);
        assert_eq!(
            tags.lookup("Attributes.Secondary.Armor").unwrap(),
            tags.attributes_secondary_armor
        );
    }

    #[test]
    fn armor_description() {
        let tags = GameplayTags::initialize().unwrap();
        assert_eq!(
            tags.registry().description(tags.attributes_secondary_armor),
            Some("Reduces damage taken, improves Block Chance")
        );
    }

    #[test]
    fn input_hierarchy() {
        let tags = GameplayTags::initialize().unwrap();
        let input = tags.lookup("Input").unwrap();
        assert!(tags.input_lmb.matches_tag(input));
        assert!(!tags.input_lmb.matches_tag_exact(tags.input_rmb));
        assert_eq!(tags.ability_slot_inputs()[2].name(), "Input.3");
    }

    #[test]
    fn unknown_lookup_fails() {
        let tags = GameplayTags::initialize().unwrap();
        assert!(matches!(
            tags.lookup("Input.Nope"),
            Err(TagError::UnknownTag(_))
        ));
    }

    #[test]
    fn fresh_build_is_independent_of_global() {
        // Building does not touch the published set
        let built = GameplayTags::build().unwrap();
        assert_eq!(built.input_lmb.name(), "Input.LMB");
    }
}
