//! Input bindings from named actions to ability input tags.

use gameplay_tags::Tag;
use serde::Serialize;
use tracing::warn;

use crate::tags::GameplayTags;

/// Which edge of an input is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputEdge {
    /// The input went down this tick.
    Pressed,
    /// The input is down. The controller already reports held inputs once
    /// per tick between press and release, so this only marks it down.
    Held,
    /// The input went up this tick.
    Released,
}

/// One named input action bound to an ability input tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityInputAction {
    /// Action name as reported by the input layer.
    pub action: String,
    /// Tag the action drives.
    pub input_tag: Tag,
}

/// Table of ability input actions, set up once per controller.
///
/// # Example
///
/// ```
/// use emberfall_core::controller::InputConfig;
/// use emberfall_core::tags::GameplayTags;
///
/// let tags = GameplayTags::initialize().unwrap();
/// let config = InputConfig::default_bindings(tags);
///
/// assert_eq!(config.find_ability_input_tag("IA_LMB"), Some(tags.input_lmb));
/// assert_eq!(config.find_ability_input_tag("IA_Unknown"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputConfig {
    actions: Vec<AbilityInputAction>,
}

impl InputConfig {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding. Later bindings for the same action are ignored.
    #[must_use]
    pub fn with_binding(mut self, action: impl Into<String>, input_tag: Tag) -> Self {
        self.actions.push(AbilityInputAction {
            action: action.into(),
            input_tag,
        });
        self
    }

    /// Mouse buttons and the four ability slots bound to the native input
    /// tags.
    #[must_use]
    pub fn default_bindings(tags: &GameplayTags) -> Self {
        let [one, two, three, four] = tags.ability_slot_inputs();
        Self::new()
            .with_binding("IA_LMB", tags.input_lmb)
            .with_binding("IA_RMB", tags.input_rmb)
            .with_binding("IA_1", one)
            .with_binding("IA_2", two)
            .with_binding("IA_3", three)
            .with_binding("IA_4", four)
    }

    /// The tag bound to `action`, if any. Unbound actions are logged.
    #[must_use]
    pub fn find_ability_input_tag(&self, action: &str) -> Option<Tag> {
        let found = self
            .actions
            .iter()
            .find(|binding| binding.action == action)
            .map(|binding| binding.input_tag);
        if found.is_none() {
            warn!(action, "no ability input tag bound to action");
        }
        found
    }

    /// All bindings in insertion order.
    #[must_use]
    pub fn actions(&self) -> &[AbilityInputAction] {
        &self.actions
    }
}
