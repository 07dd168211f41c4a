//! Streaming Event Types
//!
//! The flat, ordered record shapes exchanged at the crate boundary: the
//! reader produces them from a tree, the writer consumes them to rebuild
//! one, and external tokenizers/serializers speak the same shapes. Element
//! events carry only the namespace declarations introduced at that element;
//! consumers reconstruct full scope incrementally with `NamespaceScope`.

use crate::dom::{Attribute, DocType, NamespaceDecl, QName};

/// One streaming event
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    /// Start of a document-rooted stream
    DocumentStart,
    /// Start of an element
    ElementStart {
        /// Qualified element name
        name: QName,
        /// Attributes carried inline (the reader emits these as standalone
        /// `Attribute` events instead; the writer accepts both forms)
        attributes: Vec<Attribute>,
        /// Namespace declarations introduced at this element
        declarations: Vec<NamespaceDecl>,
    },
    /// One attribute of the most recently started element; legal only before
    /// any non-attribute content
    Attribute(Attribute),
    /// Text content
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
    /// Processing instruction
    ProcessingInstruction { target: String, data: String },
    /// Entity reference by name
    EntityRef(String),
    /// Document type declaration
    DocTypeDecl(DocType),
    /// End of the most recently started element
    ElementEnd,
    /// End of a document-rooted stream
    DocumentEnd,
}

impl XmlEvent {
    /// Start an element with no inline attributes or declarations
    pub fn element_start(name: QName) -> Self {
        XmlEvent::ElementStart {
            name,
            attributes: Vec::new(),
            declarations: Vec::new(),
        }
    }

    /// Check if this is an element-start event
    #[inline]
    pub fn is_element_start(&self) -> bool {
        matches!(self, XmlEvent::ElementStart { .. })
    }

    /// Check if this is an element-end event
    #[inline]
    pub fn is_element_end(&self) -> bool {
        matches!(self, XmlEvent::ElementEnd)
    }

    /// Check if this is an attribute event
    #[inline]
    pub fn is_attribute(&self) -> bool {
        matches!(self, XmlEvent::Attribute(_))
    }

    /// Get the element name if this is an element-start
    pub fn element_name(&self) -> Option<&QName> {
        match self {
            XmlEvent::ElementStart { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Get the literal payload of a text or CDATA event
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlEvent::Text(t) | XmlEvent::CData(t) => Some(t),
            _ => None,
        }
    }

    /// Short event name for diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            XmlEvent::DocumentStart => "DocumentStart",
            XmlEvent::ElementStart { .. } => "ElementStart",
            XmlEvent::Attribute(_) => "Attribute",
            XmlEvent::Text(_) => "Text",
            XmlEvent::CData(_) => "CData",
            XmlEvent::Comment(_) => "Comment",
            XmlEvent::ProcessingInstruction { .. } => "ProcessingInstruction",
            XmlEvent::EntityRef(_) => "EntityRef",
            XmlEvent::DocTypeDecl(_) => "DocTypeDecl",
            XmlEvent::ElementEnd => "ElementEnd",
            XmlEvent::DocumentEnd => "DocumentEnd",
        }
    }
}
