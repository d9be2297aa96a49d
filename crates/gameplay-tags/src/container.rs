//! Ordered sets of tags.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::tag::Tag;

/// An ordered set of [`Tag`]s with hierarchical queries.
///
/// Iteration is in tag-name order, so two containers with the same tags always
/// iterate identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagContainer {
    tags: BTreeSet<Tag>,
}

impl TagContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Returns `false` if it was already present.
    pub fn add(&mut self, tag: Tag) -> bool {
        self.tags.insert(tag)
    }

    /// Removes a tag. Returns `true` if it was present.
    pub fn remove(&mut self, tag: Tag) -> bool {
        self.tags.remove(&tag)
    }

    /// Returns `true` if any contained tag matches `query` hierarchically.
    #[must_use]
    pub fn has_tag(&self, query: Tag) -> bool {
        self.tags.iter().any(|tag| tag.matches_tag(query))
    }

    /// Returns `true` if `query` itself is contained.
    #[must_use]
    pub fn has_tag_exact(&self, query: Tag) -> bool {
        self.tags.contains(&query)
    }

    /// Returns `true` if any tag of `other` is matched by this container.
    #[must_use]
    pub fn has_any(&self, other: &TagContainer) -> bool {
        other.iter().any(|query| self.has_tag(query))
    }

    /// Iterates in name order.
    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tags.iter().copied()
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the container holds no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<Tag> for TagContainer {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl Extend<Tag> for TagContainer {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        self.tags.extend(iter);
    }
}
