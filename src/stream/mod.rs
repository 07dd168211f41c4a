//! Stream Module - Event Projection
//!
//! The tree's streaming boundary:
//! - `XmlEvent`: the flat ordered record shapes
//! - `TreeReader`: forward-only pull walk of a document or element subtree
//! - `TreeWriter`: push-side builder validating event legality per state

pub mod events;
pub mod reader;
pub mod writer;

pub use events::XmlEvent;
pub use reader::TreeReader;
pub use writer::{TreeWriter, WriterState};
