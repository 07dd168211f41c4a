//! XML Document - Arena-based Tree
//!
//! The document owns an arena of nodes addressed by `NodeId` and two levels
//! of content storage: its own root content list and one list per element.
//! All structural mutation goes through the document so the single-parent
//! invariant can be enforced in one place: a node attaches to at most one
//! container at a time, its back-reference always agrees with that container,
//! and inserting an already-attached node is refused rather than silently
//! moved.

use tracing::trace;

use super::content::{ContentCursor, ContentList};
use super::filter::{Filter, FilteredView};
use super::name::{Attribute, NamespaceDecl, QName};
use super::node::{DocType, ElementData, Node, NodeData, NodeId, NodeKind, Parent};
use crate::error::{Result, XmlError};

/// Shared empty list for non-element containers addressed through `Parent`
static EMPTY: ContentList = ContentList {
    items: Vec::new(),
    version: 0,
};

/// An XML document: node arena plus root-level content
///
/// Nodes are created detached via the `new_*` constructors and attached by
/// inserting them into a content list. Removal detaches but never frees; a
/// detached node can be re-inserted anywhere in the same document.
#[derive(Debug, Default)]
pub struct Document {
    /// Arena of nodes
    nodes: Vec<Node>,
    /// Document-level content: at most one element and one doctype, any
    /// number of comments and processing instructions, in input order
    content: ContentList,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Document {
            nodes: Vec::with_capacity(16),
            content: ContentList::new(),
        }
    }

    // === Node construction (all nodes start detached) ===

    fn alloc(&mut self, data: NodeData) -> NodeId {
        // Ids are u32; the arena cannot outgrow them
        assert!(self.nodes.len() < u32::MAX as usize, "node arena is full");
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::detached(data));
        id
    }

    /// Create a detached element
    pub fn new_element(&mut self, name: QName) -> NodeId {
        self.alloc(NodeData::Element(ElementData::new(name)))
    }

    /// Create a detached text node
    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Create a detached CDATA section
    pub fn new_cdata(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::CData(text.into()))
    }

    /// Create a detached comment
    pub fn new_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    /// Create a detached processing instruction
    pub fn new_processing_instruction(
        &mut self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) -> NodeId {
        self.alloc(NodeData::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        })
    }

    /// Create a detached entity reference
    pub fn new_entity_ref(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeData::EntityRef(name.into()))
    }

    /// Create a detached doctype declaration
    pub fn new_doctype(&mut self, doctype: DocType) -> NodeId {
        self.alloc(NodeData::DocType(doctype))
    }

    // === Node access ===

    /// Get a node by id
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Kind of a node
    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].data.kind()
    }

    /// Payload of a node
    #[inline]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()].data
    }

    /// Current container of a node, `None` while detached
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<Parent> {
        self.nodes[id.index()].parent
    }

    /// Qualified name, for elements
    pub fn name(&self, id: NodeId) -> Option<&QName> {
        match &self.nodes[id.index()].data {
            NodeData::Element(el) => Some(&el.name),
            _ => None,
        }
    }

    /// Literal payload of a text or CDATA node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].data {
            NodeData::Text(t) | NodeData::CData(t) => Some(t),
            _ => None,
        }
    }

    /// Number of nodes ever allocated in this document (attached or not)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // === Attributes and namespace declarations ===

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData> {
        match &mut self.nodes[id.index()].data {
            NodeData::Element(el) => Ok(el),
            other => Err(XmlError::TypeViolation(format!(
                "{:?} node has no attributes or declarations",
                other.kind()
            ))),
        }
    }

    /// Attributes of an element (empty slice for non-elements)
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.nodes[id.index()].data {
            NodeData::Element(el) => &el.attributes,
            _ => &[],
        }
    }

    /// Get an attribute value by (uri, local) key
    pub fn attribute(&self, id: NodeId, name: &QName) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name.matches(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing one with the same (uri, local)
    /// key; returns the replaced attribute
    pub fn set_attribute(&mut self, id: NodeId, attr: Attribute) -> Result<Option<Attribute>> {
        let el = self.element_mut(id)?;
        for existing in el.attributes.iter_mut() {
            if existing.name.matches(&attr.name) {
                return Ok(Some(std::mem::replace(existing, attr)));
            }
        }
        el.attributes.push(attr);
        Ok(None)
    }

    /// Remove an attribute by (uri, local) key
    pub fn remove_attribute(&mut self, id: NodeId, name: &QName) -> Result<Option<Attribute>> {
        let el = self.element_mut(id)?;
        match el.attributes.iter().position(|a| a.name.matches(name)) {
            Some(pos) => Ok(Some(el.attributes.remove(pos))),
            None => Ok(None),
        }
    }

    /// Namespace declarations introduced at an element (empty for non-elements)
    pub fn declarations(&self, id: NodeId) -> &[NamespaceDecl] {
        match &self.nodes[id.index()].data {
            NodeData::Element(el) => &el.declarations,
            _ => &[],
        }
    }

    /// Add a namespace declaration to an element, replacing an existing
    /// declaration for the same prefix
    pub fn declare_namespace(&mut self, id: NodeId, decl: NamespaceDecl) -> Result<()> {
        let el = self.element_mut(id)?;
        for existing in el.declarations.iter_mut() {
            if existing.prefix == decl.prefix {
                *existing = decl;
                return Ok(());
            }
        }
        el.declarations.push(decl);
        Ok(())
    }

    // === Content lists ===

    pub(crate) fn list(&self, parent: Parent) -> &ContentList {
        match parent {
            Parent::Document => &self.content,
            Parent::Element(id) => match &self.nodes[id.index()].data {
                NodeData::Element(el) => &el.content,
                // Non-elements have no children; mirrors attributes() and
                // declarations() handing back empty slices
                _ => &EMPTY,
            },
        }
    }

    // Mutating callers run check_container first
    fn list_mut(&mut self, parent: Parent) -> &mut ContentList {
        match parent {
            Parent::Document => &mut self.content,
            Parent::Element(id) => match &mut self.nodes[id.index()].data {
                NodeData::Element(el) => &mut el.content,
                _ => unreachable!("non-element addressed as container"),
            },
        }
    }

    fn check_container(&self, parent: Parent) -> Result<()> {
        match parent {
            Parent::Document => Ok(()),
            Parent::Element(id) => {
                if self.node(id).is_element() {
                    Ok(())
                } else {
                    Err(XmlError::TypeViolation(format!(
                        "{:?} node cannot contain content",
                        self.kind(id)
                    )))
                }
            }
        }
    }

    /// Children of a container, in document order
    #[inline]
    pub fn children(&self, parent: Parent) -> &[NodeId] {
        &self.list(parent).items
    }

    /// Number of children of a container
    #[inline]
    pub fn len(&self, parent: Parent) -> usize {
        self.list(parent).len()
    }

    /// Check if a container has no children
    #[inline]
    pub fn is_empty(&self, parent: Parent) -> bool {
        self.list(parent).is_empty()
    }

    /// Structural version counter of a container's content list
    #[inline]
    pub fn version(&self, parent: Parent) -> u64 {
        self.list(parent).version
    }

    /// The document element, if one is attached
    pub fn root_element(&self) -> Option<NodeId> {
        self.content
            .items
            .iter()
            .copied()
            .find(|&id| self.kind(id) == NodeKind::Element)
    }

    /// The doctype declaration, if one is attached at document level
    pub fn doctype(&self) -> Option<NodeId> {
        self.content
            .items
            .iter()
            .copied()
            .find(|&id| self.kind(id) == NodeKind::DocType)
    }

    // === Structural mutation ===

    /// Insert a detached node into a container at `index`
    ///
    /// Fails with `OwnershipViolation` if the node is attached anywhere
    /// (including this same container), with `TypeViolation` if the node's
    /// variant is not legal here or the target is not a container, and with
    /// `RangeViolation` if `index` is out of `[0, len]`. A failed insert
    /// changes nothing.
    pub fn insert(&mut self, parent: Parent, index: usize, child: NodeId) -> Result<()> {
        self.check_container(parent)?;
        let len = self.len(parent);
        if index > len {
            return Err(XmlError::RangeViolation { index, len });
        }
        if self.parent(child).is_some() {
            return Err(XmlError::OwnershipViolation);
        }
        self.check_content_kind(parent, child)?;
        self.check_ancestry(parent, child)?;

        trace!(?parent, index, child = child.0, "attach node");
        self.nodes[child.index()].parent = Some(parent);
        let list = self.list_mut(parent);
        list.items.insert(index, child);
        list.bump();
        Ok(())
    }

    /// Append a detached node at the end of a container
    pub fn push(&mut self, parent: Parent, child: NodeId) -> Result<()> {
        self.insert(parent, self.len(parent), child)
    }

    /// Remove the child at `index`, detaching it
    pub fn remove(&mut self, parent: Parent, index: usize) -> Result<NodeId> {
        self.check_container(parent)?;
        let len = self.len(parent);
        if index >= len {
            return Err(XmlError::RangeViolation { index, len });
        }
        let list = self.list_mut(parent);
        let removed = list.items.remove(index);
        list.bump();
        self.nodes[removed.index()].parent = None;
        trace!(?parent, index, child = removed.0, "detach node");
        Ok(removed)
    }

    /// Replace the child at `index` with a detached node, returning the old
    /// child
    ///
    /// Replace is detach-then-insert: the old child is detached first and
    /// stays detached even if inserting the new node fails. The old and new
    /// node are never attached simultaneously.
    pub fn replace(&mut self, parent: Parent, index: usize, child: NodeId) -> Result<NodeId> {
        let len = self.len(parent);
        if index >= len {
            return Err(XmlError::RangeViolation { index, len });
        }
        let old = self.remove(parent, index)?;
        self.insert(parent, index, child)?;
        Ok(old)
    }

    /// Detach a node from its container; no-op for detached nodes
    ///
    /// Returns the container the node was removed from.
    pub fn detach(&mut self, child: NodeId) -> Option<Parent> {
        let parent = self.parent(child)?;
        let position = self.children(parent).iter().position(|&id| id == child)?;
        let _ = self.remove(parent, position);
        Some(parent)
    }

    fn check_content_kind(&self, parent: Parent, child: NodeId) -> Result<()> {
        let kind = self.kind(child);
        match parent {
            Parent::Document => match kind {
                NodeKind::Element => {
                    if self.root_element().is_some() {
                        return Err(XmlError::TypeViolation(
                            "document already has a root element".into(),
                        ));
                    }
                    Ok(())
                }
                NodeKind::DocType => {
                    if self.doctype().is_some() {
                        return Err(XmlError::TypeViolation(
                            "document already has a doctype declaration".into(),
                        ));
                    }
                    Ok(())
                }
                NodeKind::Comment | NodeKind::ProcessingInstruction => Ok(()),
                NodeKind::Text | NodeKind::CData | NodeKind::EntityRef => {
                    Err(XmlError::TypeViolation(format!(
                        "{:?} content is not allowed at the document level",
                        kind
                    )))
                }
            },
            // Elements accept every node variant
            Parent::Element(_) => Ok(()),
        }
    }

    /// Reject inserts that would make an element its own ancestor. A detached
    /// element can already contain the target container, so the no-parent
    /// precondition alone does not rule cycles out.
    fn check_ancestry(&self, parent: Parent, child: NodeId) -> Result<()> {
        if self.kind(child) != NodeKind::Element {
            return Ok(());
        }
        let mut walk = parent;
        while let Parent::Element(ancestor) = walk {
            if ancestor == child {
                return Err(XmlError::TypeViolation(
                    "element would become its own ancestor".into(),
                ));
            }
            match self.parent(ancestor) {
                Some(next) => walk = next,
                None => break,
            }
        }
        Ok(())
    }

    // === Cursors and views ===

    /// Bidirectional fail-fast cursor over a container's content
    pub fn cursor(&self, parent: Parent) -> ContentCursor {
        ContentCursor::new(parent, self.version(parent))
    }

    /// Live filtered view of a container's content
    pub fn view(&self, parent: Parent, filter: Filter) -> FilteredView {
        FilteredView::new(parent, filter)
    }
}
