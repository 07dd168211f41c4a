//! Error Taxonomy
//!
//! Every failure in this crate is a local, synchronous, recoverable error
//! raised at the offending call. A failed operation never corrupts the tree:
//! the structure is left exactly as it was before the call (the one documented
//! exception is `replace`, which detaches the old occupant before attempting
//! the new insert).

use thiserror::Error;

/// Result type alias for tree operations
pub type Result<T> = std::result::Result<T, XmlError>;

/// Structural errors raised by tree, view, cursor, and stream operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// The node is already attached to a container.
    ///
    /// Insertion never detaches on behalf of the caller; an accidental
    /// dual-attachment must surface immediately rather than silently move
    /// content. Detach explicitly first.
    #[error("node is already attached to a container; detach it first")]
    OwnershipViolation,

    /// The node's variant is not legal in the target container
    /// (second document root, text at document level, self-ancestry, ...).
    #[error("illegal content for container: {0}")]
    TypeViolation(String),

    /// Index out of range for the addressed list.
    #[error("index {index} out of range for list of length {len}")]
    RangeViolation { index: usize, len: usize },

    /// A cursor or view detected a structural change made through another
    /// path since its last operation.
    #[error("content list was structurally modified during iteration")]
    ConcurrentStructuralChange,

    /// A non-empty prefix with no in-scope namespace declaration.
    #[error("no namespace bound to prefix '{0}'")]
    UnboundPrefix(String),

    /// An event or cursor operation arrived in a state that cannot accept it.
    #[error("illegal operation sequence: {0}")]
    StructuralSequence(String),
}

impl XmlError {
    /// Check if this is an ownership error
    #[inline]
    pub fn is_ownership(&self) -> bool {
        matches!(self, XmlError::OwnershipViolation)
    }

    /// Check if this is a concurrent-modification error
    #[inline]
    pub fn is_concurrent_change(&self) -> bool {
        matches!(self, XmlError::ConcurrentStructuralChange)
    }
}
