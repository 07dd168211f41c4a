//! Streaming Reader
//!
//! Forward-only pull projection of a subtree into the flat event sequence.
//! The walk is depth-first: element starts in pre-order, element ends in
//! post-order, attributes emitted as standalone events immediately after
//! their element's start. Single-pass and not restartable; a second pass
//! needs a fresh reader. Holding the reader borrows the document, so the
//! tree cannot change mid-walk.

use super::events::XmlEvent;
use crate::dom::{Document, NodeData, NodeId, Parent};
use crate::error::{Result, XmlError};

/// Reader progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    NotStarted,
    BeforeRoot,
    InTree,
    AfterRoot,
    Ended,
}

/// What the reader is rooted at
#[derive(Debug, Clone, Copy)]
enum Root {
    /// Whole document: document markers plus doc-level misc content
    Document,
    /// Single element subtree: no document markers
    Element(NodeId),
}

/// Per-depth child-iteration frame
#[derive(Debug, Clone, Copy)]
struct Frame {
    element: NodeId,
    /// Next attribute to emit
    attr: usize,
    /// Next child to visit
    child: usize,
}

/// Pull iterator turning a tree into ordered events
pub struct TreeReader<'a> {
    doc: &'a Document,
    root: Root,
    state: ReaderState,
    stack: Vec<Frame>,
    /// Position in the document-level content list (document-rooted reads)
    doc_pos: usize,
}

impl<'a> TreeReader<'a> {
    /// Read a whole document, including document markers and doc-level
    /// comments, processing instructions, and doctype
    pub fn document(doc: &'a Document) -> Self {
        TreeReader {
            doc,
            root: Root::Document,
            state: ReaderState::NotStarted,
            stack: Vec::new(),
            doc_pos: 0,
        }
    }

    /// Read a single element subtree, without document markers
    pub fn element(doc: &'a Document, element: NodeId) -> Result<Self> {
        if !doc.node(element).is_element() {
            return Err(XmlError::TypeViolation(format!(
                "cannot stream a {:?} node as a subtree root",
                doc.kind(element)
            )));
        }
        Ok(TreeReader {
            doc,
            root: Root::Element(element),
            state: ReaderState::NotStarted,
            stack: Vec::new(),
            doc_pos: 0,
        })
    }

    /// Build the start event for an element and push its frame
    fn enter(&mut self, element: NodeId) -> XmlEvent {
        self.stack.push(Frame {
            element,
            attr: 0,
            child: 0,
        });
        match self.doc.data(element) {
            NodeData::Element(_) => XmlEvent::ElementStart {
                name: self.doc.name(element).cloned().unwrap_or_default(),
                attributes: Vec::new(),
                declarations: self.doc.declarations(element).to_vec(),
            },
            _ => unreachable!("enter called on non-element"),
        }
    }

    /// Event for a non-element node
    fn leaf(&self, id: NodeId) -> XmlEvent {
        match self.doc.data(id) {
            NodeData::Text(t) => XmlEvent::Text(t.clone()),
            NodeData::CData(t) => XmlEvent::CData(t.clone()),
            NodeData::Comment(t) => XmlEvent::Comment(t.clone()),
            NodeData::ProcessingInstruction { target, data } => {
                XmlEvent::ProcessingInstruction {
                    target: target.clone(),
                    data: data.clone(),
                }
            }
            NodeData::EntityRef(name) => XmlEvent::EntityRef(name.clone()),
            NodeData::DocType(dt) => XmlEvent::DocTypeDecl(dt.clone()),
            NodeData::Element(_) => unreachable!("leaf called on element"),
        }
    }

    fn advance(&mut self) -> Option<XmlEvent> {
        loop {
            match self.state {
                ReaderState::NotStarted => match self.root {
                    Root::Document => {
                        self.state = ReaderState::BeforeRoot;
                        return Some(XmlEvent::DocumentStart);
                    }
                    Root::Element(el) => {
                        self.state = ReaderState::InTree;
                        return Some(self.enter(el));
                    }
                },

                ReaderState::BeforeRoot => {
                    let children = self.doc.children(Parent::Document);
                    if self.doc_pos < children.len() {
                        let id = children[self.doc_pos];
                        self.doc_pos += 1;
                        if self.doc.node(id).is_element() {
                            self.state = ReaderState::InTree;
                            return Some(self.enter(id));
                        }
                        return Some(self.leaf(id));
                    }
                    // Document without a root element
                    self.state = ReaderState::AfterRoot;
                }

                ReaderState::InTree => {
                    let Some(&Frame {
                        element,
                        attr,
                        child,
                    }) = self.stack.last()
                    else {
                        self.state = ReaderState::Ended;
                        return None;
                    };

                    let attrs = self.doc.attributes(element);
                    if attr < attrs.len() {
                        let event = XmlEvent::Attribute(attrs[attr].clone());
                        if let Some(frame) = self.stack.last_mut() {
                            frame.attr += 1;
                        }
                        return Some(event);
                    }

                    let children = self.doc.children(Parent::Element(element));
                    if child < children.len() {
                        let id = children[child];
                        if let Some(frame) = self.stack.last_mut() {
                            frame.child += 1;
                        }
                        if self.doc.node(id).is_element() {
                            return Some(self.enter(id));
                        }
                        return Some(self.leaf(id));
                    }

                    self.stack.pop();
                    if self.stack.is_empty() {
                        self.state = ReaderState::AfterRoot;
                    }
                    return Some(XmlEvent::ElementEnd);
                }

                ReaderState::AfterRoot => match self.root {
                    Root::Element(_) => {
                        self.state = ReaderState::Ended;
                        return None;
                    }
                    Root::Document => {
                        let children = self.doc.children(Parent::Document);
                        if self.doc_pos < children.len() {
                            let id = children[self.doc_pos];
                            self.doc_pos += 1;
                            // A second doc-level element cannot exist
                            return Some(self.leaf(id));
                        }
                        self.state = ReaderState::Ended;
                        return Some(XmlEvent::DocumentEnd);
                    }
                },

                ReaderState::Ended => return None,
            }
        }
    }
}

impl<'a> Iterator for TreeReader<'a> {
    type Item = XmlEvent;

    fn next(&mut self) -> Option<XmlEvent> {
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Attribute, DocType, NamespaceDecl, NodeKind, QName};

    /// <a><b x="1">t1</b><!--c--></a>
    fn scenario_doc() -> Document {
        let mut doc = Document::new();
        let a = doc.new_element(QName::new("a"));
        doc.push(Parent::Document, a).unwrap();
        let b = doc.new_element(QName::new("b"));
        doc.set_attribute(b, Attribute::new("x", "1")).unwrap();
        doc.push(Parent::Element(a), b).unwrap();
        let t1 = doc.new_text("t1");
        doc.push(Parent::Element(b), t1).unwrap();
        let c = doc.new_comment("c");
        doc.push(Parent::Element(a), c).unwrap();
        doc
    }

    #[test]
    fn test_element_rooted_event_order() {
        let doc = scenario_doc();
        let root = doc.root_element().unwrap();
        let events: Vec<XmlEvent> = TreeReader::element(&doc, root).unwrap().collect();

        assert_eq!(events.len(), 7);
        assert_eq!(events[0].element_name().unwrap().local, "a");
        assert_eq!(events[1].element_name().unwrap().local, "b");
        assert_eq!(
            events[2],
            XmlEvent::Attribute(Attribute::new("x", "1"))
        );
        assert_eq!(events[3], XmlEvent::Text("t1".into()));
        assert_eq!(events[4], XmlEvent::ElementEnd);
        assert_eq!(events[5], XmlEvent::Comment("c".into()));
        assert_eq!(events[6], XmlEvent::ElementEnd);
    }

    #[test]
    fn test_document_rooted_adds_markers() {
        let doc = scenario_doc();
        let events: Vec<XmlEvent> = TreeReader::document(&doc).collect();

        assert_eq!(events.first(), Some(&XmlEvent::DocumentStart));
        assert_eq!(events.last(), Some(&XmlEvent::DocumentEnd));
        assert_eq!(events.len(), 9);
    }

    #[test]
    fn test_document_level_misc_content() {
        let mut doc = Document::new();
        let pre = doc.new_comment("before");
        doc.push(Parent::Document, pre).unwrap();
        let dt = doc.new_doctype(DocType::new("root"));
        doc.push(Parent::Document, dt).unwrap();
        let root = doc.new_element(QName::new("root"));
        doc.push(Parent::Document, root).unwrap();
        let post = doc.new_processing_instruction("after", "");
        doc.push(Parent::Document, post).unwrap();

        let events: Vec<XmlEvent> = TreeReader::document(&doc).collect();
        assert_eq!(events[0], XmlEvent::DocumentStart);
        assert_eq!(events[1], XmlEvent::Comment("before".into()));
        assert_eq!(events[2], XmlEvent::DocTypeDecl(DocType::new("root")));
        assert!(events[3].is_element_start());
        assert!(events[4].is_element_end());
        assert_eq!(
            events[5],
            XmlEvent::ProcessingInstruction {
                target: "after".into(),
                data: "".into()
            }
        );
        assert_eq!(events[6], XmlEvent::DocumentEnd);
    }

    #[test]
    fn test_starts_and_ends_nest() {
        let mut doc = Document::new();
        let root = doc.new_element(QName::new("r"));
        doc.push(Parent::Document, root).unwrap();
        let mut parent = root;
        for name in ["x", "y", "z"] {
            let el = doc.new_element(QName::new(name));
            doc.push(Parent::Element(parent), el).unwrap();
            parent = el;
        }

        let mut depth = 0i32;
        for event in TreeReader::element(&doc, root).unwrap() {
            match event {
                XmlEvent::ElementStart { .. } => depth += 1,
                XmlEvent::ElementEnd => {
                    depth -= 1;
                    assert!(depth >= 0);
                }
                _ => {}
            }
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_declarations_are_per_element() {
        let mut doc = Document::new();
        let root = doc.new_element(QName::new("root"));
        doc.declare_namespace(root, NamespaceDecl::new("p", "http://example.com/p"))
            .unwrap();
        doc.push(Parent::Document, root).unwrap();
        let child = doc.new_element(QName::with_namespace("p", "child", "http://example.com/p"));
        doc.push(Parent::Element(root), child).unwrap();

        let events: Vec<XmlEvent> = TreeReader::element(&doc, root).unwrap().collect();
        match &events[0] {
            XmlEvent::ElementStart { declarations, .. } => {
                assert_eq!(declarations.len(), 1);
                assert_eq!(declarations[0].prefix, "p");
            }
            other => panic!("expected ElementStart, got {:?}", other),
        }
        // The child introduces nothing; scope is the consumer's concern
        match &events[1] {
            XmlEvent::ElementStart { declarations, .. } => assert!(declarations.is_empty()),
            other => panic!("expected ElementStart, got {:?}", other),
        }
    }

    #[test]
    fn test_reader_is_not_restartable() {
        let doc = scenario_doc();
        let root = doc.root_element().unwrap();
        let mut reader = TreeReader::element(&doc, root).unwrap();
        while reader.next().is_some() {}
        assert_eq!(reader.next(), None);
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_non_element_root_rejected() {
        let mut doc = Document::new();
        let root = doc.new_element(QName::new("root"));
        doc.push(Parent::Document, root).unwrap();
        let text = doc.new_text("t");
        doc.push(Parent::Element(root), text).unwrap();
        assert_eq!(doc.kind(text), NodeKind::Text);
        assert!(TreeReader::element(&doc, text).is_err());
    }
}
