//! Spoken-text rendering of a subtree.
//!
//! Produces the string a screen reader would announce when reading an
//! element from start to end: hidden content is dropped, widgets read as
//! their accessible name (plus value for form fields), and block-level
//! elements are separated by a space.

use crate::accname::selected_options;
use crate::dom::{ArenaDom, NodeId};
use crate::host::{Host, NodeRef};
use crate::roles::{ElementKind, classify};
use crate::style::ComputedStyle;
use crate::util::collapse_whitespace;
use crate::visibility::{hidden_by_attribute, is_perceivable};

/// The accessible text of `node`, trimmed.
///
/// Text nodes read as their raw data and other non-element nodes as nothing.
/// An element that is not perceivable reads as nothing.
///
/// ```
/// use sightline::{Page, accessible_text};
///
/// let page = Page::parse(r#"<p id="p">Press <button aria-label="Close">X</button> now</p>"#);
/// let p = page.element_by_id("p").unwrap();
/// assert_eq!(accessible_text(&page, p), "Press Close now");
/// ```
pub fn accessible_text<H: Host + ?Sized>(host: &H, node: NodeRef) -> String {
    let Some(dom) = host.dom(node.document) else {
        return String::new();
    };
    if dom.is_element(node.node) && !is_perceivable(host, node) {
        return String::new();
    }

    let mut speech = Speech {
        host,
        dom,
        out: String::new(),
        pending: Vec::new(),
    };
    speech.node(node, host.computed_style(node));
    while let Some(work) = speech.pending.pop() {
        match work {
            Work::Child { node, parent } => speech.child(node, parent),
            Work::Space => speech.out.push(' '),
        }
    }
    speech.out.trim().to_string()
}

/// Deferred steps of the depth-first walk.
enum Work {
    /// A child still to be checked for hiding and rendered; `parent` is
    /// the computed style of its parent element.
    Child {
        node: NodeRef,
        parent: Option<ComputedStyle>,
    },
    /// The separator after a block's children.
    Space,
}

/// Walk state: the text so far and the work left, last item next.
struct Speech<'a, H: ?Sized> {
    host: &'a H,
    dom: &'a ArenaDom,
    out: String,
    pending: Vec<Work>,
}

impl<H: Host + ?Sized> Speech<'_, H> {
    fn child(&mut self, node: NodeRef, parent: Option<ComputedStyle>) {
        if !self.dom.is_element(node.node) {
            self.node(node, None);
            return;
        }
        if hidden_by_attribute(self.dom, node.node) {
            return;
        }
        let style = self.host.computed_style_from(node, parent.as_ref());
        if style.is_some_and(|s| s.hides()) {
            return;
        }
        self.node(node, style);
    }

    /// Render a node whose ancestors are already known to be perceivable.
    /// `style` is the node's own computed style.
    fn node(&mut self, node: NodeRef, style: Option<ComputedStyle>) {
        let (host, dom) = (self.host, self.dom);
        if let Some(text) = dom.text_content(node.node) {
            self.out.push_str(text);
            return;
        }
        if !dom.is_element(node.node) {
            return;
        }

        let id = node.node;
        match classify(host, node) {
            ElementKind::Ignored => {}
            ElementKind::Presentational | ElementKind::Graphic => {
                self.out.push_str(&host.accessible_name(node));
            }
            ElementKind::TextField => {
                let value = if dom.has_tag(id, "textarea") {
                    dom.collect_text(id)
                } else {
                    dom.get_attr(id, "value").unwrap_or_default().to_string()
                };
                let spoken = format!("{} {}", host.accessible_name(node), value);
                self.out.push_str(spoken.trim());
            }
            ElementKind::Select => {
                let chosen = selected_options(dom, id)
                    .into_iter()
                    .map(|option| match dom.get_attr(option, "label") {
                        Some(label) => label.to_string(),
                        None => collapse_whitespace(&dom.collect_text(option)),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let spoken = format!("{} {}", host.accessible_name(node), chosen);
                self.out.push_str(spoken.trim());
            }
            ElementKind::Disclosure { open: false } => {
                self.pending.push(Work::Space);
                if let Some(summary) = dom.element_children(id).find(|&c| dom.has_tag(c, "summary")) {
                    self.pending.push(Work::Child {
                        node: node.with_node(summary),
                        parent: style,
                    });
                }
            }
            ElementKind::Disclosure { open: true } => self.children(node, style, false),
            ElementKind::Generic { inline } => self.children(node, style, inline),
        }
    }

    /// Queue the children of `node` so they pop in document order, followed
    /// by a space unless the element is inline.
    fn children(&mut self, node: NodeRef, style: Option<ComputedStyle>, inline: bool) {
        if !inline {
            self.pending.push(Work::Space);
        }
        let children: Vec<NodeId> = self.dom.children(node.node).collect();
        self.pending.extend(children.into_iter().rev().map(|child| Work::Child {
            node: node.with_node(child),
            parent: style,
        }));
    }
}
