//! Tag registration and lookup.
//!
//! Registration happens on a [`TagRegistryBuilder`] during startup. Calling
//! [`TagRegistryBuilder::build`] freezes the set into a [`TagRegistry`], which
//! has no mutating operations: tags are never removed and the registry lives as
//! long as its owner (for the process-wide set, the whole process).
//!
//! Registering `A.B.C` implicitly registers `A` and `A.B` so hierarchical
//! queries can name any ancestor.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::TagError;
use crate::tag::{ancestors, is_valid_name, Tag};

#[derive(Debug, Clone)]
struct TagEntry {
    tag: Tag,
    description: Option<String>,
    explicit: bool,
}

/// Mutable registration phase of a tag registry.
#[derive(Debug, Default)]
pub struct TagRegistryBuilder {
    entries: BTreeMap<&'static str, TagEntry>,
}

impl TagRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tag with a human-readable description.
    ///
    /// Implicit parents are added as needed. Registering a name that was only
    /// known as an implicit parent upgrades it to an explicit tag.
    ///
    /// # Errors
    ///
    /// - [`TagError::InvalidName`] if `name` is not a dotted identifier.
    /// - [`TagError::DuplicateTag`] if `name` was already registered explicitly.
    pub fn register(&mut self, name: &str, description: &str) -> Result<Tag, TagError> {
        if !is_valid_name(name) {
            return Err(TagError::InvalidName(name.to_string()));
        }

        for parent in ancestors(name) {
            if !self.entries.contains_key(parent) {
                let tag = Tag::interned(intern(parent));
                self.entries.insert(
                    tag.name(),
                    TagEntry {
                        tag,
                        description: None,
                        explicit: false,
                    },
                );
            }
        }

        if let Some(entry) = self.entries.get_mut(name) {
            if entry.explicit {
                return Err(TagError::DuplicateTag(name.to_string()));
            }
            entry.explicit = true;
            entry.description = Some(description.to_string());
            return Ok(entry.tag);
        }

        let tag = Tag::interned(intern(name));
        self.entries.insert(
            tag.name(),
            TagEntry {
                tag,
                description: Some(description.to_string()),
                explicit: true,
            },
        );
        trace!(tag = tag.name(), "registered gameplay tag");
        Ok(tag)
    }

    /// Freezes the registered set.
    #[must_use]
    pub fn build(self) -> TagRegistry {
        TagRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable set of registered tags.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    entries: BTreeMap<&'static str, TagEntry>,
}

impl TagRegistry {
    /// Returns the tag registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnknownTag`] if neither `name` nor any descendant of
    /// it was registered.
    pub fn lookup(&self, name: &str) -> Result<Tag, TagError> {
        self.entries
            .get(name)
            .map(|entry| entry.tag)
            .ok_or_else(|| TagError::UnknownTag(name.to_string()))
    }

    /// Returns the description given at registration, if the tag was explicit.
    #[must_use]
    pub fn description(&self, tag: Tag) -> Option<&str> {
        self.entries
            .get(tag.name())
            .and_then(|entry| entry.description.as_deref())
    }

    /// Returns `true` if `name` was registered explicitly rather than implied as a parent.
    #[must_use]
    pub fn is_explicit(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|entry| entry.explicit)
    }

    /// Iterates over all tags (explicit and implicit) in name order.
    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.entries.values().map(|entry| entry.tag)
    }

    /// Number of known tags, implicit parents included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stores `name` for the rest of the process.
fn intern(name: &str) -> &'static str {
    Box::leak(name.to_owned().into_boxed_str())
}
