//! Filtered Content Views
//!
//! A filtered view is a live, index-translating projection of one container's
//! content list: a reference to the container plus a predicate, never a copy.
//! Random access walks the underlying list counting matches; sequential
//! iteration is O(1) amortized per step. "Changed" detection is derived from
//! the backing list's single version counter, so mutation through the list,
//! a cursor, or any sibling view is visible to every other view immediately.

use super::document::Document;
use super::node::{NodeId, NodeKind, Parent};
use crate::error::{Result, XmlError};

/// Predicate over nodes: kind test, optionally refined by name and namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Match every node
    Any,
    /// Match one node kind
    Kind(NodeKind),
    /// Match elements, optionally by local name and/or namespace URI
    Element {
        /// Required local name, if any
        name: Option<String>,
        /// Required namespace URI, if any (empty string = no namespace)
        uri: Option<String>,
    },
}

impl Filter {
    /// Match all elements
    pub fn elements() -> Self {
        Filter::Element {
            name: None,
            uri: None,
        }
    }

    /// Match elements with the given local name in any namespace
    pub fn named(local: impl Into<String>) -> Self {
        Filter::Element {
            name: Some(local.into()),
            uri: None,
        }
    }

    /// Match elements with the given local name and namespace URI
    pub fn named_ns(local: impl Into<String>, uri: impl Into<String>) -> Self {
        Filter::Element {
            name: Some(local.into()),
            uri: Some(uri.into()),
        }
    }

    /// Test a node against this predicate
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        match self {
            Filter::Any => true,
            Filter::Kind(kind) => doc.kind(id) == *kind,
            Filter::Element { name, uri } => match doc.name(id) {
                Some(qname) => {
                    name.as_deref().map_or(true, |n| qname.local == n)
                        && uri.as_deref().map_or(true, |u| qname.uri == u)
                }
                None => false,
            },
        }
    }
}

/// Live predicate-restricted projection of a content list
///
/// A strict alias over the backing list: reads walk the list on every call,
/// writes translate filtered indices to underlying positions and delegate.
#[derive(Debug, Clone)]
pub struct FilteredView {
    parent: Parent,
    filter: Filter,
}

impl FilteredView {
    pub(crate) fn new(parent: Parent, filter: Filter) -> Self {
        FilteredView { parent, filter }
    }

    /// Container this view projects
    #[inline]
    pub fn parent(&self) -> Parent {
        self.parent
    }

    /// Predicate of this view
    #[inline]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Number of matching children
    pub fn len(&self, doc: &Document) -> usize {
        doc.children(self.parent)
            .iter()
            .filter(|&&id| self.filter.matches(doc, id))
            .count()
    }

    /// Check if no child matches
    pub fn is_empty(&self, doc: &Document) -> bool {
        self.len(doc) == 0
    }

    /// The k-th matching child, if any
    pub fn get(&self, doc: &Document, index: usize) -> Option<NodeId> {
        doc.children(self.parent)
            .iter()
            .copied()
            .filter(|&id| self.filter.matches(doc, id))
            .nth(index)
    }

    /// Matching children in document order
    pub fn to_vec(&self, doc: &Document) -> Vec<NodeId> {
        self.iter(doc).collect()
    }

    /// Borrowing sequential iterator over matching children
    ///
    /// The shared borrow of the document statically excludes structural
    /// mutation for the iterator's lifetime; use `cursor` for a detached
    /// handle that detects concurrent changes at runtime instead.
    pub fn iter<'a>(&'a self, doc: &'a Document) -> FilteredIter<'a> {
        FilteredIter {
            doc,
            filter: &self.filter,
            items: doc.children(self.parent),
            pos: 0,
        }
    }

    /// Detached bidirectional fail-fast cursor over matching children
    pub fn cursor(&self, doc: &Document) -> FilteredCursor {
        FilteredCursor {
            parent: self.parent,
            filter: self.filter.clone(),
            next: 0,
            last: None,
            version: doc.version(self.parent),
        }
    }

    /// Underlying position for "insert at filtered index k": immediately
    /// before the k-th match, or the end of the underlying list when k equals
    /// the view's size.
    fn insert_position(&self, doc: &Document, index: usize) -> Result<usize> {
        let children = doc.children(self.parent);
        let mut seen = 0usize;
        for (underlying, &id) in children.iter().enumerate() {
            if self.filter.matches(doc, id) {
                if seen == index {
                    return Ok(underlying);
                }
                seen += 1;
            }
        }
        if index == seen {
            Ok(children.len())
        } else {
            Err(XmlError::RangeViolation { index, len: seen })
        }
    }

    /// Underlying position of the k-th match
    fn resolve(&self, doc: &Document, index: usize) -> Result<usize> {
        let mut seen = 0usize;
        for (underlying, &id) in doc.children(self.parent).iter().enumerate() {
            if self.filter.matches(doc, id) {
                if seen == index {
                    return Ok(underlying);
                }
                seen += 1;
            }
        }
        Err(XmlError::RangeViolation { index, len: seen })
    }

    /// Insert a detached node at filtered index `index`
    ///
    /// The node must satisfy the view's predicate (`TypeViolation`
    /// otherwise); placement preserves both the view's apparent order and
    /// the underlying document order.
    pub fn insert(&self, doc: &mut Document, index: usize, node: NodeId) -> Result<()> {
        if !self.filter.matches(doc, node) {
            return Err(XmlError::TypeViolation(
                "node does not match the view's filter".into(),
            ));
        }
        let underlying = self.insert_position(doc, index)?;
        doc.insert(self.parent, underlying, node)
    }

    /// Append a detached node after the view's last match
    pub fn push(&self, doc: &mut Document, node: NodeId) -> Result<()> {
        self.insert(doc, self.len(doc), node)
    }

    /// Remove the k-th matching child, detaching it
    pub fn remove(&self, doc: &mut Document, index: usize) -> Result<NodeId> {
        let underlying = self.resolve(doc, index)?;
        doc.remove(self.parent, underlying)
    }

    /// Replace the k-th matching child (detach-then-insert, as on the list)
    pub fn set(&self, doc: &mut Document, index: usize, node: NodeId) -> Result<NodeId> {
        if !self.filter.matches(doc, node) {
            return Err(XmlError::TypeViolation(
                "node does not match the view's filter".into(),
            ));
        }
        let underlying = self.resolve(doc, index)?;
        doc.replace(self.parent, underlying, node)
    }
}

/// Borrowing iterator over a view's matches
pub struct FilteredIter<'a> {
    doc: &'a Document,
    filter: &'a Filter,
    items: &'a [NodeId],
    pos: usize,
}

impl<'a> Iterator for FilteredIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while self.pos < self.items.len() {
            let id = self.items[self.pos];
            self.pos += 1;
            if self.filter.matches(self.doc, id) {
                return Some(id);
            }
        }
        None
    }
}

/// Detached bidirectional cursor over a view's matches
///
/// Same fail-fast contract as `ContentCursor`: the version snapshot is
/// re-checked before every step, and any intervening structural change in
/// the backing list is a `ConcurrentStructuralChange` error.
#[derive(Debug, Clone)]
pub struct FilteredCursor {
    parent: Parent,
    filter: Filter,
    /// Underlying index the forward scan resumes from
    next: usize,
    last: Option<usize>,
    version: u64,
}

impl FilteredCursor {
    fn check(&self, doc: &Document) -> Result<()> {
        if doc.version(self.parent) != self.version {
            return Err(XmlError::ConcurrentStructuralChange);
        }
        Ok(())
    }

    /// Step forward to the next match
    pub fn next(&mut self, doc: &Document) -> Result<Option<NodeId>> {
        self.check(doc)?;
        let children = doc.children(self.parent);
        while self.next < children.len() {
            let id = children[self.next];
            self.next += 1;
            if self.filter.matches(doc, id) {
                self.last = Some(self.next - 1);
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Step backward to the previous match
    pub fn prev(&mut self, doc: &Document) -> Result<Option<NodeId>> {
        self.check(doc)?;
        let children = doc.children(self.parent);
        while self.next > 0 {
            self.next -= 1;
            let id = children[self.next];
            if self.filter.matches(doc, id) {
                self.last = Some(self.next);
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Insert a detached matching node at the cursor position (after the
    /// match the last forward step returned)
    pub fn insert(&mut self, doc: &mut Document, node: NodeId) -> Result<()> {
        self.check(doc)?;
        if !self.filter.matches(doc, node) {
            return Err(XmlError::TypeViolation(
                "node does not match the view's filter".into(),
            ));
        }
        doc.insert(self.parent, self.next, node)?;
        self.next += 1;
        self.last = None;
        self.version = doc.version(self.parent);
        Ok(())
    }

    /// Remove the match the last step returned, detaching it
    pub fn remove(&mut self, doc: &mut Document) -> Result<NodeId> {
        self.check(doc)?;
        let index = self.current()?;
        let removed = doc.remove(self.parent, index)?;
        if index < self.next {
            self.next -= 1;
        }
        self.last = None;
        self.version = doc.version(self.parent);
        Ok(removed)
    }

    /// Replace the match the last step returned (detach-then-insert, as on
    /// the list)
    pub fn set(&mut self, doc: &mut Document, node: NodeId) -> Result<NodeId> {
        self.check(doc)?;
        let index = self.current()?;
        if !self.filter.matches(doc, node) {
            return Err(XmlError::TypeViolation(
                "node does not match the view's filter".into(),
            ));
        }
        let old = doc.replace(self.parent, index, node)?;
        self.version = doc.version(self.parent);
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

    /// <root>text1 <a/> <!--c1--> <b/> text2 <a/></root>
    fn mixed_doc() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.new_element(QName::new("root"));
        doc.push(Parent::Document, root).unwrap();
        let parent = Parent::Element(root);

        let t1 = doc.new_text("text1");
        let a1 = doc.new_element(QName::new("a"));
        let c1 = doc.new_comment("c1");
        let b = doc.new_element(QName::new("b"));
        let t2 = doc.new_text("text2");
        let a2 = doc.new_element(QName::new("a"));
        for id in [t1, a1, c1, b, t2, a2] {
            doc.push(parent, id).unwrap();
        }
        (doc, root)
    }

    #[test]
    fn test_view_is_subsequence_of_list() {
        let (doc, root) = mixed_doc();
        let view = doc.view(Parent::Element(root), Filter::elements());

        let expected: Vec<NodeId> = doc
            .children(Parent::Element(root))
            .iter()
            .copied()
            .filter(|&id| doc.kind(id) == NodeKind::Element)
            .collect();
        assert_eq!(view.to_vec(&doc), expected);
        assert_eq!(view.len(&doc), 3);
        assert_eq!(view.get(&doc, 2), expected.get(2).copied());
        assert_eq!(view.get(&doc, 3), None);
    }

    #[test]
    fn test_view_by_name() {
        let (doc, root) = mixed_doc();
        let view = doc.view(Parent::Element(root), Filter::named("a"));
        assert_eq!(view.len(&doc), 2);
        for id in view.iter(&doc) {
            assert_eq!(doc.name(id).unwrap().local, "a");
        }
    }

    #[test]
    fn test_view_is_live() {
        let (mut doc, root) = mixed_doc();
        let parent = Parent::Element(root);
        let view = doc.view(parent, Filter::Kind(NodeKind::Comment));
        assert_eq!(view.len(&doc), 1);

        // Mutation through the list is visible on the next view access
        let c2 = doc.new_comment("c2");
        doc.push(parent, c2).unwrap();
        assert_eq!(view.len(&doc), 2);

        doc.remove(parent, 2).unwrap(); // removes c1
        assert_eq!(view.len(&doc), 1);
        assert_eq!(view.get(&doc, 0), Some(c2));
    }

    #[test]
    fn test_view_insert_interleaves_correctly() {
        let (mut doc, root) = mixed_doc();
        let parent = Parent::Element(root);
        let view = doc.view(parent, Filter::elements());

        // Insert at filtered index 1: lands immediately before <b>, which
        // sits at underlying index 3
        let fresh = doc.new_element(QName::new("fresh"));
        view.insert(&mut doc, 1, fresh).unwrap();
        assert_eq!(doc.children(parent)[3], fresh);
        assert_eq!(view.get(&doc, 1), Some(fresh));
    }

    #[test]
    fn test_view_insert_at_end_appends_to_list() {
        let (mut doc, root) = mixed_doc();
        let parent = Parent::Element(root);
        let view = doc.view(parent, Filter::elements());
        let size = view.len(&doc);

        let tail = doc.new_element(QName::new("tail"));
        view.insert(&mut doc, size, tail).unwrap();
        assert_eq!(*doc.children(parent).last().unwrap(), tail);
    }

    #[test]
    fn test_view_rejects_non_matching_insert() {
        let (mut doc, root) = mixed_doc();
        let view = doc.view(Parent::Element(root), Filter::elements());
        let text = doc.new_text("not an element");
        assert!(matches!(
            view.insert(&mut doc, 0, text),
            Err(XmlError::TypeViolation(_))
        ));
        assert!(doc.parent(text).is_none());
    }

    #[test]
    fn test_view_remove_delegates() {
        let (mut doc, root) = mixed_doc();
        let parent = Parent::Element(root);
        let view = doc.view(parent, Filter::named("a"));

        let removed = view.remove(&mut doc, 1).unwrap();
        assert_eq!(doc.name(removed).unwrap().local, "a");
        assert!(doc.parent(removed).is_none());
        assert_eq!(view.len(&doc), 1);
        // Non-matching content is untouched
        assert_eq!(doc.len(parent), 5);
    }

    #[test]
    fn test_view_set_out_of_range() {
        let (mut doc, root) = mixed_doc();
        let view = doc.view(Parent::Element(root), Filter::named("b"));
        let node = doc.new_element(QName::new("b"));
        assert_eq!(
            view.set(&mut doc, 1, node),
            Err(XmlError::RangeViolation { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_filtered_cursor_bidirectional() {
        let (doc, root) = mixed_doc();
        let view = doc.view(Parent::Element(root), Filter::elements());
        let mut cursor = view.cursor(&doc);

        let a1 = cursor.next(&doc).unwrap().unwrap();
        let b = cursor.next(&doc).unwrap().unwrap();
        assert_eq!(doc.name(a1).unwrap().local, "a");
        assert_eq!(doc.name(b).unwrap().local, "b");
        assert_eq!(cursor.prev(&doc).unwrap(), Some(b));
        assert_eq!(cursor.prev(&doc).unwrap(), Some(a1));
        assert_eq!(cursor.prev(&doc).unwrap(), None);
    }

    #[test]
    fn test_filtered_cursor_fail_fast_across_views() {
        let (mut doc, root) = mixed_doc();
        let parent = Parent::Element(root);
        let elements = doc.view(parent, Filter::elements());
        let comments = doc.view(parent, Filter::Kind(NodeKind::Comment));

        let mut cursor = elements.cursor(&doc);
        cursor.next(&doc).unwrap();

        // Structural write through a sibling view of the same list
        comments.remove(&mut doc, 0).unwrap();

        assert_eq!(
            cursor.next(&doc),
            Err(XmlError::ConcurrentStructuralChange)
        );
    }

    #[test]
    fn test_filtered_cursor_insert_at_position() {
        let (mut doc, root) = mixed_doc();
        let view = doc.view(Parent::Element(root), Filter::elements());
        let mut cursor = view.cursor(&doc);
        cursor.next(&doc).unwrap(); // a1, underlying index 1

        let fresh = doc.new_element(QName::new("fresh"));
        cursor.insert(&mut doc, fresh).unwrap();
        // Lands right after the returned match in the underlying list
        assert_eq!(doc.children(Parent::Element(root))[2], fresh);

        // Cursor-driven insert resynchronizes; iteration continues
        let b = cursor.next(&doc).unwrap().unwrap();
        assert_eq!(doc.name(b).unwrap().local, "b");

        let text = doc.new_text("not an element");
        assert!(matches!(
            cursor.insert(&mut doc, text),
            Err(XmlError::TypeViolation(_))
        ));
        assert!(doc.parent(text).is_none());
    }

    #[test]
    fn test_filtered_cursor_set_replaces_match() {
        let (mut doc, root) = mixed_doc();
        let view = doc.view(Parent::Element(root), Filter::named("a"));
        let mut cursor = view.cursor(&doc);
        let first = cursor.next(&doc).unwrap().unwrap();

        let swap = doc.new_element(QName::new("a"));
        let old = cursor.set(&mut doc, swap).unwrap();
        assert_eq!(old, first);
        assert!(doc.parent(old).is_none());
        assert_eq!(doc.children(Parent::Element(root))[1], swap);

        let comment = doc.new_comment("not a match");
        assert!(matches!(
            cursor.set(&mut doc, comment),
            Err(XmlError::TypeViolation(_))
        ));
    }

    #[test]
    fn test_filtered_cursor_remove_resyncs() {
        let (mut doc, root) = mixed_doc();
        let view = doc.view(Parent::Element(root), Filter::named("a"));
        let mut cursor = view.cursor(&doc);

        cursor.next(&doc).unwrap();
        cursor.remove(&mut doc).unwrap();
        // Continues over the remaining match without error
        let second = cursor.next(&doc).unwrap().unwrap();
        assert_eq!(doc.name(second).unwrap().local, "a");
        assert_eq!(cursor.next(&doc).unwrap(), None);
    }
}
