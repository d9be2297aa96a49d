//! The [`Tag`] handle and tag-name rules.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An interned, hierarchical gameplay tag.
///
/// A `Tag` can only be obtained from a [`TagRegistry`](crate::TagRegistry) or a
/// [`TagRegistryBuilder`](crate::TagRegistryBuilder). Its name is stored for the
/// lifetime of the process, so the handle is `Copy` and never dangles.
///
/// # Matching
///
/// - [`matches_tag_exact`](Self::matches_tag_exact): same name.
/// - [`matches_tag`](Self::matches_tag): same name, or `self` is a descendant of
///   `other` (`Input.LMB` matches `Input`, but `Input` does not match `Input.LMB`).
#[derive(Clone, Copy)]
pub struct Tag {
    name: &'static str,
}

impl Tag {
    /// Wraps an already-interned name.
    pub(crate) const fn interned(name: &'static str) -> Self {
        Self { name }
    }

    /// Returns the full dotted name of this tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Returns `true` when both tags have exactly the same name.
    #[must_use]
    pub fn matches_tag_exact(self, other: Tag) -> bool {
        self.name == other.name
    }

    /// Returns `true` when `self` equals `other` or lies beneath it in the hierarchy.
    #[must_use]
    pub fn matches_tag(self, other: Tag) -> bool {
        match self.name.strip_prefix(other.name) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }

    /// Number of dotted segments in the name (`Input.LMB` has depth 2).
    #[must_use]
    pub fn depth(self) -> usize {
        self.name.split('.').count()
    }

    /// Returns the name of the direct parent, if any.
    #[must_use]
    pub fn parent_name(self) -> Option<&'static str> {
        self.name.rfind('.').map(|idx| &self.name[..idx])
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.matches_tag_exact(*other)
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// Checks whether `name` is a well-formed dotted tag name.
///
/// Segments are non-empty and contain only ASCII letters, digits and `_`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Iterates over the proper ancestors of `name`, outermost first.
///
/// `"A.B.C"` yields `"A"` then `"A.B"`.
pub(crate) fn ancestors(name: &str) -> impl Iterator<Item = &str> + '_ {
    name.match_indices('.').map(move |(idx, _)| &name[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &'static str) -> Tag {
        Tag::interned(name)
    }

    mod matching_tests {
        use super::*;

        #[test]
        fn exact_match_requires_same_name() {
            assert!(tag("Input.LMB").matches_tag_exact(tag("Input.LMB")));
            assert!(!tag("Input.LMB").matches_tag_exact(tag("Input")));
        }

        #[test]
        fn child_matches_parent() {
            assert!(tag("Input.LMB").matches_tag(tag("Input")));
            assert!(tag("Attributes.Secondary.Armor").matches_tag(tag("Attributes")));
        }

        #[test]
        fn parent_does_not_match_child() {
            assert!(!tag("Input").matches_tag(tag("Input.LMB")));
        }

        #[test]
        fn shared_prefix_is_not_ancestry() {
            // "Input.LMBX" is not a child of "Input.LMB"
            assert!(!tag("Input.LMBX").matches_tag(tag("Input.LMB")));
        }
    }

    #[test]
    fn parent_name_and_depth() {
        let armor = tag("Attributes.Secondary.Armor");
        assert_eq!(armor.depth(), 3);
        assert_eq!(armor.parent_name(), Some("Attributes.Secondary"));
        assert_eq!(tag("Input").parent_name(), None);
    }

    #[test]
    fn ancestors_outermost_first() {
        let found: Vec<_> = ancestors("A.B.C").collect();
        assert_eq!(found, vec!["A", "A.B"]);
        assert_eq!(ancestors("A").count(), 0);
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("Input.1"));
        assert!(is_valid_name("Attributes.Vital.Max_Health"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("Input."));
        assert!(!is_valid_name(".Input"));
        assert!(!is_valid_name("Input..LMB"));
        assert!(!is_valid_name("Input.L MB"));
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(format!("{}", tag("Input.RMB")), "Input.RMB");
        assert_eq!(format!("{:?}", tag("Input.RMB")), "Tag(Input.RMB)");
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&tag("Input.LMB")).unwrap();
        assert_eq!(json, "\"Input.LMB\"");
    }
}
