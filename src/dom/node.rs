//! XML Node Representation
//!
//! Nodes live in the owning document's arena and are addressed by `NodeId`.
//! `NodeData` is the closed variant over node kinds; every dispatch over it
//! is an exhaustive match, so adding a kind is a compile-time event.

use super::content::ContentList;
use super::name::{Attribute, NamespaceDecl, QName};

/// Compact node identifier (index into the owning document's arena)
///
/// Only the owning document mints these; the arena never frees slots, so an
/// id stays valid for the lifetime of its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The container a node is currently attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// The document root content list
    Document,
    /// An element's content list
    Element(NodeId),
}

/// Kind of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Element node
    Element,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
    /// Entity reference
    EntityRef,
    /// Document type declaration
    DocType,
}

/// A node in the arena: informational back-reference plus kind payload
///
/// The back-reference is a plain lookup field. Ownership flows the other way,
/// from container to node, through the container's content list.
#[derive(Debug)]
pub struct Node {
    /// Current container, `None` while detached
    pub(crate) parent: Option<Parent>,
    /// Kind payload
    pub(crate) data: NodeData,
}

/// Node payload, closed over the seven kinds
#[derive(Debug)]
pub enum NodeData {
    /// Element with name, attributes, declarations, and children
    Element(ElementData),
    /// Text content
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
    /// Processing instruction: target plus data
    ProcessingInstruction { target: String, data: String },
    /// Entity reference by name
    EntityRef(String),
    /// Document type declaration
    DocType(DocType),
}

impl NodeData {
    /// Kind of this payload
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::CData(_) => NodeKind::CData,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
            NodeData::EntityRef(_) => NodeKind::EntityRef,
            NodeData::DocType(_) => NodeKind::DocType,
        }
    }
}

/// Element payload: qualified name, attributes, introduced namespace
/// declarations, and the element's own content list
#[derive(Debug)]
pub struct ElementData {
    /// Qualified element name
    pub(crate) name: QName,
    /// Attributes, unique by (uri, local)
    pub(crate) attributes: Vec<Attribute>,
    /// Namespace declarations introduced at this element
    pub(crate) declarations: Vec<NamespaceDecl>,
    /// Child content
    pub(crate) content: ContentList,
}

impl ElementData {
    pub(crate) fn new(name: QName) -> Self {
        ElementData {
            name,
            attributes: Vec::new(),
            declarations: Vec::new(),
            content: ContentList::new(),
        }
    }
}

/// Document type declaration payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocType {
    /// Name of the document's root element
    pub root_name: String,
    /// PUBLIC identifier, if any
    pub public_id: Option<String>,
    /// SYSTEM identifier, if any
    pub system_id: Option<String>,
    /// Internal subset text, if any
    pub internal_subset: Option<String>,
}

impl DocType {
    /// Create a doctype naming only the root element
    pub fn new(root_name: impl Into<String>) -> Self {
        DocType {
            root_name: root_name.into(),
            public_id: None,
            system_id: None,
            internal_subset: None,
        }
    }
}

impl Node {
    pub(crate) fn detached(data: NodeData) -> Self {
        Node { parent: None, data }
    }

    /// Check if this node is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Current container, `None` while detached
    #[inline]
    pub fn parent(&self) -> Option<Parent> {
        self.parent
    }

    /// Kind of this node
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Payload of this node
    #[inline]
    pub fn data(&self) -> &NodeData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_node() {
        let node = Node::detached(NodeData::Text("hello".into()));
        assert_eq!(node.kind(), NodeKind::Text);
        assert!(node.parent().is_none());
    }

    #[test]
    fn test_kind_dispatch() {
        let pi = NodeData::ProcessingInstruction {
            target: "xml-stylesheet".into(),
            data: "href=\"a.css\"".into(),
        };
        assert_eq!(pi.kind(), NodeKind::ProcessingInstruction);
        assert_eq!(
            NodeData::DocType(DocType::new("html")).kind(),
            NodeKind::DocType
        );
    }
}
