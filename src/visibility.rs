//! Hidden-subtree filtering.

use crate::dom::{ArenaDom, NodeId};
use crate::host::{Host, NodeRef};
use crate::style::ComputedStyle;

/// Whether an element renders anything an assistive-technology user can
/// perceive.
///
/// The element is hidden when it, or any ancestor element up to the document
/// root, has computed `display: none`, computed `visibility: hidden` or
/// `collapse`, a `hidden` attribute, or `aria-hidden="true"`. A descendant's
/// `aria-hidden="false"` never re-exposes content under a hidden ancestor.
///
/// Evaluated fresh on every call. Unreadable styles count as visible, and a
/// reference that does not name an element is not perceivable.
pub fn is_perceivable<H: Host + ?Sized>(host: &H, element: NodeRef) -> bool {
    let Some(dom) = host.dom(element.document) else {
        return false;
    };
    if !dom.is_element(element.node) {
        return false;
    }

    let mut chain: Vec<NodeId> = std::iter::once(element.node)
        .chain(dom.ancestors(element.node))
        .filter(|&id| dom.is_element(id))
        .collect();
    chain.reverse();

    // Root first, so each style inherits from the one computed before it.
    let mut parent: Option<ComputedStyle> = None;
    for id in chain {
        if hidden_by_attribute(dom, id) {
            return false;
        }
        let style = host.computed_style_from(element.with_node(id), parent.as_ref());
        if style.is_some_and(|s| s.hides()) {
            return false;
        }
        parent = style;
    }
    true
}

/// The checks that apply to a single element, ignoring its ancestors.
pub(crate) fn hides_itself<H: Host + ?Sized>(host: &H, dom: &ArenaDom, element: NodeRef) -> bool {
    hidden_by_attribute(dom, element.node)
        || host
            .computed_style(element)
            .is_some_and(|style| style.hides())
}

pub(crate) fn hidden_by_attribute(dom: &ArenaDom, id: NodeId) -> bool {
    dom.has_attr(id, "hidden") || dom.get_attr(id, "aria-hidden") == Some("true")
}
