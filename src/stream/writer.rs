//! Streaming Writer
//!
//! Push-side inverse of the reader: consumes an ordered event sequence and
//! incrementally rebuilds a document, validating structural legality at
//! every step. The writer is strict by design: an out-of-order event fails
//! with a `StructuralSequence` error naming the expected and actual state
//! instead of being coerced into the tree.

use tracing::trace;

use super::events::XmlEvent;
use crate::dom::{Attribute, Document, NamespaceDecl, NodeId, Parent, QName};
use crate::error::{Result, XmlError};

/// Writer progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing written yet; only `DocumentStart` is legal
    BeforeDocument,
    /// Document open, root element not yet started
    DocumentStarted,
    /// Inside one or more open elements
    InElement,
    /// Root element closed, document still open
    AfterRoot,
    /// `DocumentEnd` written; only `finish` is legal
    DocumentEnded,
    /// Document taken; every operation fails
    Closed,
}

/// Incremental tree builder over the event stream
pub struct TreeWriter {
    doc: Document,
    state: WriterState,
    /// Open-element chain, innermost last
    open: Vec<NodeId>,
    /// Whether the innermost open element can still accept attributes
    /// (true until any non-attribute content is added)
    attrs_open: Vec<bool>,
}

impl TreeWriter {
    /// Create a writer awaiting `DocumentStart`
    pub fn new() -> Self {
        TreeWriter {
            doc: Document::new(),
            state: WriterState::BeforeDocument,
            open: Vec::new(),
            attrs_open: Vec::new(),
        }
    }

    /// Current writer state
    #[inline]
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// The document under construction
    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn illegal(&self, event: &XmlEvent, expected: &str) -> XmlError {
        XmlError::StructuralSequence(format!(
            "{} not legal in state {:?} (expected {})",
            event.label(),
            self.state,
            expected
        ))
    }

    /// Container new content goes into
    fn target(&self) -> Parent {
        match self.open.last() {
            Some(&el) => Parent::Element(el),
            None => Parent::Document,
        }
    }

    /// Record that the innermost open element received non-attribute content
    fn close_attributes(&mut self) {
        if let Some(flag) = self.attrs_open.last_mut() {
            *flag = false;
        }
    }

    /// Append a freshly built leaf into the current container
    fn append_leaf(&mut self, node: NodeId) -> Result<()> {
        self.doc.push(self.target(), node)?;
        self.close_attributes();
        Ok(())
    }

    fn start_element(
        &mut self,
        name: QName,
        attributes: Vec<Attribute>,
        declarations: Vec<NamespaceDecl>,
    ) -> Result<()> {
        let element = self.doc.new_element(name);
        for decl in declarations {
            self.doc.declare_namespace(element, decl)?;
        }
        for attr in attributes {
            self.doc.set_attribute(element, attr)?;
        }
        self.doc.push(self.target(), element)?;
        self.close_attributes();
        self.open.push(element);
        self.attrs_open.push(true);
        self.state = WriterState::InElement;
        Ok(())
    }

    /// Consume one event
    pub fn write(&mut self, event: XmlEvent) -> Result<()> {
        trace!(event = event.label(), state = ?self.state, "writer event");
        match event {
            XmlEvent::DocumentStart => match self.state {
                WriterState::BeforeDocument => {
                    self.state = WriterState::DocumentStarted;
                    Ok(())
                }
                _ => Err(self.illegal(&XmlEvent::DocumentStart, "BeforeDocument")),
            },

            XmlEvent::ElementStart {
                name,
                attributes,
                declarations,
            } => match self.state {
                WriterState::DocumentStarted | WriterState::InElement => {
                    self.start_element(name, attributes, declarations)
                }
                _ => {
                    let probe = XmlEvent::element_start(name);
                    Err(self.illegal(&probe, "DocumentStarted or InElement"))
                }
            },

            XmlEvent::Attribute(attr) => match self.state {
                WriterState::InElement if self.attrs_open.last() == Some(&true) => {
                    let element = self.target();
                    match element {
                        Parent::Element(el) => {
                            self.doc.set_attribute(el, attr)?;
                            Ok(())
                        }
                        Parent::Document => unreachable!("InElement with empty open stack"),
                    }
                }
                WriterState::InElement => Err(XmlError::StructuralSequence(
                    "Attribute must precede all other content of its element".into(),
                )),
                _ => Err(self.illegal(&XmlEvent::Attribute(attr), "InElement")),
            },

            XmlEvent::Text(text) => match self.state {
                WriterState::InElement
                | WriterState::DocumentStarted
                | WriterState::AfterRoot => {
                    let node = self.doc.new_text(text);
                    self.append_leaf(node)
                }
                _ => Err(self.illegal(&XmlEvent::Text(text), "InElement")),
            },

            XmlEvent::CData(text) => match self.state {
                WriterState::InElement
                | WriterState::DocumentStarted
                | WriterState::AfterRoot => {
                    let node = self.doc.new_cdata(text);
                    self.append_leaf(node)
                }
                _ => Err(self.illegal(&XmlEvent::CData(text), "InElement")),
            },

            XmlEvent::Comment(text) => match self.state {
                WriterState::InElement
                | WriterState::DocumentStarted
                | WriterState::AfterRoot => {
                    let node = self.doc.new_comment(text);
                    self.append_leaf(node)
                }
                _ => Err(self.illegal(&XmlEvent::Comment(text), "an open document")),
            },

            XmlEvent::ProcessingInstruction { target, data } => match self.state {
                WriterState::InElement
                | WriterState::DocumentStarted
                | WriterState::AfterRoot => {
                    let node = self.doc.new_processing_instruction(target, data);
                    self.append_leaf(node)
                }
                _ => Err(self.illegal(
                    &XmlEvent::ProcessingInstruction { target, data },
                    "an open document",
                )),
            },

            XmlEvent::EntityRef(name) => match self.state {
                WriterState::InElement
                | WriterState::DocumentStarted
                | WriterState::AfterRoot => {
                    let node = self.doc.new_entity_ref(name);
                    self.append_leaf(node)
                }
                _ => Err(self.illegal(&XmlEvent::EntityRef(name), "InElement")),
            },

            XmlEvent::DocTypeDecl(doctype) => match self.state {
                WriterState::InElement
                | WriterState::DocumentStarted
                | WriterState::AfterRoot => {
                    let node = self.doc.new_doctype(doctype);
                    self.append_leaf(node)
                }
                _ => Err(self.illegal(&XmlEvent::DocTypeDecl(doctype), "an open document")),
            },

            XmlEvent::ElementEnd => match self.state {
                WriterState::InElement => {
                    self.open.pop();
                    self.attrs_open.pop();
                    if self.open.is_empty() {
                        self.state = WriterState::AfterRoot;
                    }
                    Ok(())
                }
                _ => Err(self.illegal(&XmlEvent::ElementEnd, "InElement")),
            },

            // DocumentStarted is legal too: a document holding only comments
            // and processing instructions never opens a root element
            XmlEvent::DocumentEnd => match self.state {
                WriterState::DocumentStarted | WriterState::AfterRoot => {
                    self.state = WriterState::DocumentEnded;
                    Ok(())
                }
                _ => Err(self.illegal(&XmlEvent::DocumentEnd, "DocumentStarted or AfterRoot")),
            },
        }
    }

    /// Consume a whole event sequence
    pub fn write_all(&mut self, events: impl IntoIterator<Item = XmlEvent>) -> Result<()> {
        for event in events {
            self.write(event)?;
        }
        Ok(())
    }

    /// Take the finished document; legal only after `DocumentEnd`
    pub fn finish(&mut self) -> Result<Document> {
        match self.state {
            WriterState::DocumentEnded => {
                self.state = WriterState::Closed;
                Ok(std::mem::take(&mut self.doc))
            }
            _ => Err(XmlError::StructuralSequence(format!(
                "finish not legal in state {:?} (expected DocumentEnded)",
                self.state
            ))),
        }
    }
}

impl Default for TreeWriter {
    fn default() -> Self {
        Self::new()
    }
}
