//! The boundary between the analysis engine and the environment that owns
//! the documents.
//!
//! The engine only ever reads through [`Host`]: tree structure, computed
//! style, accessible names and frame embedding. [`crate::Page`] is the
//! built-in implementation; a browser binding can supply its own.

use std::fmt;

use crate::dom::{ArenaDom, NodeId};
use crate::style::ComputedStyle;

/// Identifies one document (the top page or a frame's content) inside a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u32);

/// A node of a specific document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub document: DocumentId,
    pub node: NodeId,
}

impl NodeRef {
    pub fn new(document: DocumentId, node: NodeId) -> Self {
        Self { document, node }
    }

    /// Another node of the same document.
    pub fn with_node(self, node: NodeId) -> Self {
        Self { node, ..self }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc{}#{}", self.document.0, self.node.0)
    }
}

/// Environment services the engine consumes.
///
/// Every method is a query: implementations must not mutate documents in
/// response, and all of them are total (an unknown node yields `None` or an
/// empty string).
pub trait Host {
    /// The tree of a document, if the host knows it.
    fn dom(&self, document: DocumentId) -> Option<&ArenaDom>;

    /// Computed `display`/`visibility` of an element. `None` means the style
    /// could not be read; callers treat that as visible.
    fn computed_style(&self, element: NodeRef) -> Option<ComputedStyle>;

    /// Computed style of `element` when its parent element's computed style
    /// is already known (`None` at the root). Walks that go top-down call
    /// this so a host can skip re-resolving the ancestors.
    fn computed_style_from(
        &self,
        element: NodeRef,
        parent: Option<&ComputedStyle>,
    ) -> Option<ComputedStyle> {
        let _ = parent;
        self.computed_style(element)
    }

    /// The element's accessible name per the Accessible Name and Description
    /// Computation. Empty when the element has none.
    fn accessible_name(&self, element: NodeRef) -> String;

    /// The document loaded inside an `iframe`/`frame` element, or `None` when
    /// the frame is cross-origin, not loaded, or not a frame.
    fn embedded_document(&self, frame: NodeRef) -> Option<DocumentId>;
}

impl<H: Host + ?Sized> Host for &H {
    fn dom(&self, document: DocumentId) -> Option<&ArenaDom> {
        (**self).dom(document)
    }

    fn computed_style(&self, element: NodeRef) -> Option<ComputedStyle> {
        (**self).computed_style(element)
    }

    fn computed_style_from(
        &self,
        element: NodeRef,
        parent: Option<&ComputedStyle>,
    ) -> Option<ComputedStyle> {
        (**self).computed_style_from(element, parent)
    }

    fn accessible_name(&self, element: NodeRef) -> String {
        (**self).accessible_name(element)
    }

    fn embedded_document(&self, frame: NodeRef) -> Option<DocumentId> {
        (**self).embedded_document(frame)
    }
}
