//! xmlgrove - Mutable XML tree with streaming event projection
//!
//! Subsystems:
//! - `dom`: arena-allocated document, exclusively-owning content lists with
//!   structural version counters, live filtered views, namespace resolution
//! - `stream`: pull reader and push writer over a flat ordered event sequence
//! - `error`: the closed structural-violation taxonomy
//!
//! Every node lives in exactly one content list at a time; attaching an
//! already-attached node fails instead of moving it. Cursors snapshot the
//! owning list's version counter and fail fast on concurrent structural
//! change.

pub mod dom;
pub mod error;
pub mod stream;

pub use dom::{
    Attribute, ContentCursor, DocType, Document, Filter, FilteredCursor, FilteredView,
    NamespaceDecl, NamespaceScope, NodeId, NodeKind, Parent, QName,
};
pub use error::{Result, XmlError};
pub use stream::{TreeReader, TreeWriter, XmlEvent};
