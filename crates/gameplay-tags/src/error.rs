//! Errors raised by tag registration and lookup.

use thiserror::Error;

/// Errors produced while building or reading a tag registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// A lookup was attempted before the process-wide tag set was initialized.
    #[error("gameplay tags used before initialization")]
    NotInitialized,

    /// The process-wide tag set was initialized a second time.
    #[error("gameplay tags already initialized")]
    AlreadyInitialized,

    /// No tag with this name has been registered.
    #[error("unknown gameplay tag `{0}`")]
    UnknownTag(String),

    /// A tag with this name was already registered explicitly.
    #[error("gameplay tag `{0}` registered twice")]
    DuplicateTag(String),

    /// The name is not a valid dotted tag name.
    #[error("invalid gameplay tag name `{0}`")]
    InvalidName(String),
}
