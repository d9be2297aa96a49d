//! # Gameplay Tags
//!
//! Interned, hierarchical, comparable identifiers for abilities, attributes and
//! input.
//!
//! Tags are dotted names such as `Input.LMB` or `Attributes.Secondary.Armor`.
//! They are created once through a [`TagRegistryBuilder`] during startup and
//! frozen into an immutable [`TagRegistry`]. After that, every lookup is a pure
//! read and every [`Tag`] is a cheap `Copy` handle.
//!
//! ## Quick Start
//!
//! ```
//! use gameplay_tags::TagRegistryBuilder;
//!
//! let mut builder = TagRegistryBuilder::new();
//! let lmb = builder.register("Input.LMB", "Left mouse button").unwrap();
//! let registry = builder.build();
//!
//! assert_eq!(registry.lookup("Input.LMB").unwrap(), lmb);
//!
//! // Parents are registered implicitly.
//! let input = registry.lookup("Input").unwrap();
//! assert!(lmb.matches_tag(input));
//! assert!(!lmb.matches_tag_exact(input));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod container;
pub mod error;
pub mod registry;
pub mod tag;

pub use container::TagContainer;
pub use error::TagError;
pub use registry::{TagRegistry, TagRegistryBuilder};
pub use tag::Tag;
