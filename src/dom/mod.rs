//! DOM Module - Mutable Arena Document
//!
//! In-memory XML tree with:
//! - Arena allocation for nodes, `NodeId` indices for traversal
//! - Exclusively-owning content lists with structural version counters
//! - Live type/name-filtered views over any content list
//! - Ancestor-walk and stack-based namespace resolution

pub mod content;
pub mod document;
pub mod filter;
pub mod name;
pub mod namespace;
pub mod node;

pub use content::{ContentCursor, ContentList};
pub use document::Document;
pub use filter::{Filter, FilteredCursor, FilteredIter, FilteredView};
pub use name::{Attribute, NamespaceDecl, QName};
pub use namespace::{ns, NamespaceScope};
pub use node::{DocType, Node, NodeData, NodeId, NodeKind, Parent};
