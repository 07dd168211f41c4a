//! Namespace Resolution
//!
//! Two sides of the same scoping rule. The tree side resolves a prefix for a
//! node by walking its ancestor elements toward the root, nearest declaration
//! first, with shadowing (a prefix already seen closer to the node hides any
//! outer declaration for it). The consumer side is a depth-tagged binding
//! stack for code that replays an event stream and needs the same answer
//! incrementally, without a tree to walk.

use std::collections::HashSet;

use super::document::Document;
use super::name::NamespaceDecl;
use super::node::{NodeId, Parent};
use crate::error::{Result, XmlError};

/// Well-known namespace URIs
pub mod ns {
    /// Implicitly bound to the `xml` prefix
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// Implicitly bound to the `xmlns` prefix
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

impl Document {
    /// Nearest enclosing element of a node, including the node itself
    fn scope_start(&self, node: NodeId) -> Option<NodeId> {
        if self.node(node).is_element() {
            return Some(node);
        }
        match self.parent(node) {
            Some(Parent::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Namespace declarations visible at a node, nearest-first
    ///
    /// Walks ancestor elements from the node to the root and records each
    /// element's introduced declarations the first time a prefix is seen;
    /// shadowed outer declarations are invisible. The implicit `xml` and
    /// `xmlns` bindings are appended last unless explicitly redeclared.
    pub fn namespaces_in_scope(&self, node: NodeId) -> Vec<NamespaceDecl> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut result = Vec::new();
        let mut current = self.scope_start(node);
        while let Some(el) = current {
            for decl in self.declarations(el) {
                if seen.insert(decl.prefix.as_str()) {
                    result.push(decl.clone());
                }
            }
            current = match self.parent(el) {
                Some(Parent::Element(up)) => Some(up),
                _ => None,
            };
        }
        if !seen.contains("xml") {
            result.push(NamespaceDecl::new("xml", ns::XML));
        }
        if !seen.contains("xmlns") {
            result.push(NamespaceDecl::new("xmlns", ns::XMLNS));
        }
        result
    }

    /// Resolve a prefix at a node to its bound URI
    ///
    /// The empty prefix resolves to the nearest default declaration or the
    /// no-namespace sentinel `""`; any other prefix with no in-scope
    /// declaration is an `UnboundPrefix` error.
    pub fn resolve_prefix(&self, node: NodeId, prefix: &str) -> Result<&str> {
        if prefix == "xml" {
            return Ok(ns::XML);
        }
        if prefix == "xmlns" {
            return Ok(ns::XMLNS);
        }
        let mut current = self.scope_start(node);
        while let Some(el) = current {
            for decl in self.declarations(el) {
                if decl.prefix == prefix {
                    return Ok(&decl.uri);
                }
            }
            current = match self.parent(el) {
                Some(Parent::Element(up)) => Some(up),
                _ => None,
            };
        }
        if prefix.is_empty() {
            Ok("")
        } else {
            Err(XmlError::UnboundPrefix(prefix.to_string()))
        }
    }
}

/// Namespace binding (prefix -> URI) tagged with the scope that declared it
#[derive(Debug, Clone)]
struct Binding {
    prefix: String,
    uri: String,
    depth: u16,
}

/// Stack-based namespace scope for event-stream consumers
///
/// Push a scope per element start, declare that element's introduced
/// bindings, pop on element end; `resolve` then answers exactly what the
/// tree-side ancestor walk would for the corresponding node.
#[derive(Debug)]
pub struct NamespaceScope {
    bindings: Vec<Binding>,
    depth: u16,
}

impl NamespaceScope {
    /// Create a scope with the `xml` and `xmlns` prefixes pre-bound
    pub fn new() -> Self {
        NamespaceScope {
            bindings: vec![
                Binding {
                    prefix: "xml".into(),
                    uri: ns::XML.into(),
                    depth: 0,
                },
                Binding {
                    prefix: "xmlns".into(),
                    uri: ns::XMLNS.into(),
                    depth: 0,
                },
            ],
            depth: 0,
        }
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, dropping the bindings it declared
    pub fn pop_scope(&mut self) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < self.depth {
                break;
            }
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare a binding in the current scope
    ///
    /// Redeclaring `xml` or `xmlns` is ignored.
    pub fn declare(&mut self, decl: &NamespaceDecl) {
        if decl.prefix == "xml" || decl.prefix == "xmlns" {
            return;
        }
        self.bindings.push(Binding {
            prefix: decl.prefix.clone(),
            uri: decl.uri.clone(),
            depth: self.depth,
        });
    }

    /// Resolve a prefix to the nearest bound URI
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
    }

    /// Resolve the default namespace
    pub fn resolve_default(&self) -> Option<&str> {
        self.resolve("")
    }

    /// Current element depth
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Active bindings, most recent declaration per prefix
    pub fn bindings_in_scope(&self) -> Vec<NamespaceDecl> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.bindings
            .iter()
            .rev()
            .filter(|b| seen.insert(b.prefix.as_str()))
            .map(|b| NamespaceDecl::new(b.prefix.clone(), b.uri.clone()))
            .collect()
    }
}

impl Default for NamespaceScope {
    fn default() -> Self {
        Self::new()
    }
}
