//! Description errors.
//!
//! Everything that can go wrong while building or validating an interface
//! description. These are build-time failures: generation never starts on a
//! model that did not validate.

use thiserror::Error;

/// Errors raised while constructing or validating an interface description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptionError {
    /// Two siblings in the same module share a name.
    #[error("duplicate item '{name}' in '{owner}'")]
    DuplicateName { owner: String, name: String },

    /// A class declared more than one destructor.
    #[error("class '{class}' declares more than one destructor")]
    MultipleDestructors { class: String },

    /// The upcast graph contains a cycle.
    #[error("inheritance cycle through class '{class}'")]
    CyclicInheritance { class: String },

    /// A type combination the boundary cannot express.
    #[error("unsupported type combination: {detail}")]
    UnsupportedType { detail: String },

    /// An entity id that does not belong to this model.
    #[error("dangling entity id #{index}")]
    DanglingId { index: u32 },

    /// An item was added under an entity that cannot own children.
    #[error("'{owner}' cannot contain items")]
    NotAContainer { owner: String },
}
