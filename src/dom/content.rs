//! Content List & Cursor
//!
//! The ordered, exclusively-owned child collection of a container, plus the
//! fail-fast bidirectional cursor over it. Every structural mutation bumps
//! the list's version counter; cursors snapshot the counter and refuse to
//! step once it has advanced underneath them, whether the change came through
//! the document, another cursor, or a filtered view of the same list.

use super::document::Document;
use super::node::{NodeId, Parent};
use crate::error::{Result, XmlError};

/// Ordered child storage with a structural version counter
#[derive(Debug, Default)]
pub struct ContentList {
    /// Child node ids in document order
    pub(crate) items: Vec<NodeId>,
    /// Incremented on every insert/remove/reorder
    pub(crate) version: u64,
}

impl ContentList {
    pub(crate) fn new() -> Self {
        ContentList {
            items: Vec::new(),
            version: 0,
        }
    }

    /// Number of children
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the list is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.version += 1;
    }
}

/// Bidirectional fail-fast cursor over one container's content list
///
/// The cursor is a detached handle: it holds no borrow of the document, so
/// every operation takes the document explicitly and re-checks the version
/// snapshot first. A structural change through any other path makes the next
/// step fail with `ConcurrentStructuralChange` rather than skip or duplicate.
#[derive(Debug, Clone)]
pub struct ContentCursor {
    parent: Parent,
    /// Index the next forward step will return
    next: usize,
    /// Index of the node the last step returned, cleared by mutation
    last: Option<usize>,
    version: u64,
}

impl ContentCursor {
    pub(crate) fn new(parent: Parent, version: u64) -> Self {
        ContentCursor {
            parent,
            next: 0,
            last: None,
            version,
        }
    }

    /// Container this cursor walks
    #[inline]
    pub fn parent(&self) -> Parent {
        self.parent
    }

    /// Index the next forward step would return (equals the list length when
    /// the cursor sits after the last child)
    #[inline]
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Index the next backward step would return (`None` before the first
    /// child)
    #[inline]
    pub fn prev_index(&self) -> Option<usize> {
        self.next.checked_sub(1)
    }

    fn check(&self, doc: &Document) -> Result<()> {
        if doc.version(self.parent) != self.version {
            return Err(XmlError::ConcurrentStructuralChange);
        }
        Ok(())
    }

    fn resync(&mut self, doc: &Document) {
        self.version = doc.version(self.parent);
    }

    /// Step forward, returning the next child or `None` past the end
    pub fn next(&mut self, doc: &Document) -> Result<Option<NodeId>> {
        self.check(doc)?;
        let children = doc.children(self.parent);
        if self.next < children.len() {
            let id = children[self.next];
            self.last = Some(self.next);
            self.next += 1;
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    /// Step backward, returning the previous child or `None` before the start
    pub fn prev(&mut self, doc: &Document) -> Result<Option<NodeId>> {
        self.check(doc)?;
        if self.next > 0 {
            self.next -= 1;
            self.last = Some(self.next);
            Ok(Some(doc.children(self.parent)[self.next]))
        } else {
            Ok(None)
        }
    }

    /// Insert a detached node at the cursor position (before the child a
    /// forward step would return)
    pub fn insert(&mut self, doc: &mut Document, node: NodeId) -> Result<()> {
        self.check(doc)?;
        doc.insert(self.parent, self.next, node)?;
        self.next += 1;
        self.last = None;
        self.resync(doc);
        Ok(())
    }

    /// Remove the child the last step returned, detaching it
    pub fn remove(&mut self, doc: &mut Document) -> Result<NodeId> {
        self.check(doc)?;
        let index = self.current()?;
        let removed = doc.remove(self.parent, index)?;
        if index < self.next {
            self.next -= 1;
        }
        self.last = None;
        self.resync(doc);
        Ok(removed)
    }

    /// Replace the child the last step returned
    ///
    /// Replace is detach-then-insert: the old child is detached before the
    /// new insert is attempted, and stays detached if the insert fails. On
    /// failure the cursor is left stale and fails fast on its next step.
    pub fn set(&mut self, doc: &mut Document, node: NodeId) -> Result<NodeId> {
        self.check(doc)?;
        let index = self.current()?;
        let old = doc.replace(self.parent, index, node)?;
        self.resync(doc);
        Ok(old)
    }

    fn current(&self) -> Result<usize> {
        self.last.ok_or_else(|| {
            XmlError::StructuralSequence(
                "cursor has no current node; call next or prev first".into(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::name::QName;
    use crate::dom::node::NodeKind;

    fn doc_with_children() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.new_element(QName::new("root"));
        doc.push(Parent::Document, root).unwrap();
        for name in ["a", "b", "c"] {
            let child = doc.new_element(QName::new(name));
            doc.push(Parent::Element(root), child).unwrap();
        }
        (doc, root)
    }

    #[test]
    fn test_cursor_forward_backward() {
        let (doc, root) = doc_with_children();
        let mut cursor = doc.cursor(Parent::Element(root));

        assert_eq!(cursor.next_index(), 0);
        assert_eq!(cursor.prev_index(), None);

        let a = cursor.next(&doc).unwrap().unwrap();
        let b = cursor.next(&doc).unwrap().unwrap();
        assert_ne!(a, b);
        assert_eq!(cursor.next_index(), 2);
        assert_eq!(cursor.prev_index(), Some(1));

        // Stepping back returns the same node the last forward step did
        assert_eq!(cursor.prev(&doc).unwrap(), Some(b));
        assert_eq!(cursor.prev(&doc).unwrap(), Some(a));
        assert_eq!(cursor.prev(&doc).unwrap(), None);
    }

    #[test]
    fn test_cursor_walks_off_both_ends() {
        let (doc, root) = doc_with_children();
        let mut cursor = doc.cursor(Parent::Element(root));
        for _ in 0..3 {
            assert!(cursor.next(&doc).unwrap().is_some());
        }
        assert_eq!(cursor.next(&doc).unwrap(), None);
        assert_eq!(cursor.next_index(), 3);
    }

    #[test]
    fn test_cursor_fail_fast_on_list_mutation() {
        let (mut doc, root) = doc_with_children();
        let mut cursor = doc.cursor(Parent::Element(root));
        cursor.next(&doc).unwrap();

        // Mutate through the document, not the cursor
        doc.remove(Parent::Element(root), 2).unwrap();

        assert_eq!(
            cursor.next(&doc),
            Err(XmlError::ConcurrentStructuralChange)
        );
        assert_eq!(
            cursor.prev(&doc),
            Err(XmlError::ConcurrentStructuralChange)
        );
    }

    #[test]
    fn test_cursor_fail_fast_on_sibling_cursor() {
        let (mut doc, root) = doc_with_children();
        let mut left = doc.cursor(Parent::Element(root));
        let mut right = doc.cursor(Parent::Element(root));
        right.next(&doc).unwrap();
        right.remove(&mut doc).unwrap();

        assert_eq!(left.next(&doc), Err(XmlError::ConcurrentStructuralChange));
    }

    #[test]
    fn test_cursor_insert_and_continue() {
        let (mut doc, root) = doc_with_children();
        let mut cursor = doc.cursor(Parent::Element(root));
        cursor.next(&doc).unwrap();

        let text = doc.new_text("between");
        cursor.insert(&mut doc, text).unwrap();

        // Cursor-driven mutation re-snapshots; iteration continues
        let after = cursor.next(&doc).unwrap().unwrap();
        assert_eq!(doc.name(after).unwrap().local, "b");
        assert_eq!(doc.children(Parent::Element(root))[1], text);
    }

    #[test]
    fn test_cursor_remove_requires_current() {
        let (mut doc, root) = doc_with_children();
        let mut cursor = doc.cursor(Parent::Element(root));
        match cursor.remove(&mut doc) {
            Err(XmlError::StructuralSequence(_)) => {}
            other => panic!("expected StructuralSequence, got {:?}", other),
        }
    }

    #[test]
    fn test_cursor_set_replaces_current() {
        let (mut doc, root) = doc_with_children();
        let mut cursor = doc.cursor(Parent::Element(root));
        cursor.next(&doc).unwrap();

        let comment = doc.new_comment("swapped in");
        let old = cursor.set(&mut doc, comment).unwrap();

        assert_eq!(doc.name(old).unwrap().local, "a");
        assert!(doc.parent(old).is_none());
        assert_eq!(doc.kind(doc.children(Parent::Element(root))[0]), NodeKind::Comment);
    }
}
