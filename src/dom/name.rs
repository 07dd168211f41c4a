//! Qualified Names
//!
//! Qualified names, attributes, and namespace declarations. An empty prefix
//! or URI string means "none"; the distinction between "no namespace" and an
//! unbound prefix is made at resolution time, not here.

use std::fmt;

/// A qualified name: optional prefix, local part, resolved namespace URI
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix, empty if none
    pub prefix: String,
    /// Local part of the name
    pub local: String,
    /// Namespace URI, empty for no namespace
    pub uri: String,
}

impl QName {
    /// Create a name with no prefix and no namespace
    pub fn new(local: impl Into<String>) -> Self {
        QName {
            prefix: String::new(),
            local: local.into(),
            uri: String::new(),
        }
    }

    /// Create a fully qualified name
    pub fn with_namespace(
        prefix: impl Into<String>,
        local: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        QName {
            prefix: prefix.into(),
            local: local.into(),
            uri: uri.into(),
        }
    }

    /// Split a `prefix:local` string at the colon
    ///
    /// The namespace URI is left empty; resolving the prefix against the
    /// declarations in scope is the caller's concern.
    pub fn parse(qualified: &str) -> Self {
        match memchr::memchr(b':', qualified.as_bytes()) {
            Some(pos) => QName {
                prefix: qualified[..pos].to_string(),
                local: qualified[pos + 1..].to_string(),
                uri: String::new(),
            },
            None => QName::new(qualified),
        }
    }

    /// Check if this name carries a prefix
    #[inline]
    pub fn has_prefix(&self) -> bool {
        !self.prefix.is_empty()
    }

    /// Two names are the same attribute/element key if URI and local part match
    #[inline]
    pub fn matches(&self, other: &QName) -> bool {
        self.local == other.local && self.uri == other.uri
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{}:{}", self.prefix, self.local)
        }
    }
}

/// An element attribute, unique per element by (uri, local)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name
    pub name: QName,
    /// Attribute value
    pub value: String,
}

impl Attribute {
    /// Create an attribute with an unprefixed name
    pub fn new(local: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: QName::new(local),
            value: value.into(),
        }
    }

    /// Create an attribute with a fully qualified name
    pub fn with_name(name: QName, value: impl Into<String>) -> Self {
        Attribute {
            name,
            value: value.into(),
        }
    }
}

/// A namespace declaration introduced by one element
///
/// Immutable once attached; lookup is scope-based (nearest ancestor wins),
/// never stored per-node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceDecl {
    /// Declared prefix, empty for the default namespace
    pub prefix: String,
    /// Bound URI
    pub uri: String,
}

impl NamespaceDecl {
    /// Create a declaration
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        NamespaceDecl {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// Create a default-namespace declaration
    pub fn default_ns(uri: impl Into<String>) -> Self {
        NamespaceDecl {
            prefix: String::new(),
            uri: uri.into(),
        }
    }
}
