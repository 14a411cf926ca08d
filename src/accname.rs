//! Accessible name computation.
//!
//! A practical subset of the W3C Accessible Name and Description Computation
//! with the HTML-AAM native labelling rules: `aria-labelledby`, embedded
//! control values, `aria-label`, native labels (`<label>`, `alt`, `<legend>`,
//! `<caption>`, `<figcaption>`, SVG `<title>`), name from content, then the
//! `title` and `placeholder` tooltips. Pseudo-element content and
//! descriptions are not computed.

use std::collections::HashSet;

use crate::dom::{ArenaDom, NodeId};
use crate::host::{Host, NodeRef};
use crate::roles::{INLINE_TAGS, resolved_role};
use crate::util::collapse_whitespace;
use crate::visibility::hides_itself;

/// Roles whose name is computed from their content.
const NAME_FROM_CONTENT_ROLES: &[&str] = &[
    "button", "cell", "checkbox", "columnheader", "gridcell", "heading", "link", "menuitem",
    "menuitemcheckbox", "menuitemradio", "option", "radio", "row", "rowheader", "switch", "tab",
    "tooltip", "treeitem",
];

/// Elements named by their content regardless of role.
const NAME_FROM_CONTENT_TAGS: &[&str] = &[
    "caption", "figcaption", "h1", "h2", "h3", "h4", "h5", "h6", "label", "legend", "summary",
];

/// Element nesting followed when naming from content; deeper content is
/// left out of the name.
const MAX_CONTENT_DEPTH: usize = 128;

/// Form-associated elements that `<label>` can name.
const LABELABLE_TAGS: &[&str] = &["button", "input", "meter", "output", "progress", "select", "textarea"];

/// Compute the accessible name of `element`, whitespace-collapsed.
///
/// Returns an empty string for non-elements and unnamed elements.
///
/// ```
/// use sightline::{Page, accname::accessible_name};
///
/// let page = Page::parse(r#"<label for="q">Search</label><input id="q">"#);
/// let input = page.element_by_id("q").unwrap();
/// assert_eq!(accessible_name(&page, input), "Search");
/// ```
pub fn accessible_name<H: Host + ?Sized>(host: &H, element: NodeRef) -> String {
    let Some(dom) = host.dom(element.document) else {
        return String::new();
    };
    if !dom.is_element(element.node) {
        return String::new();
    }

    let mut walk = NameWalk {
        host,
        dom,
        element,
        visited: HashSet::new(),
        self_referenced: false,
        depth: 0,
    };
    collapse_whitespace(&walk.name(element.node, Step::ROOT))
}

/// Where in the computation a node is being named.
#[derive(Debug, Clone, Copy)]
struct Step {
    /// Reached through `aria-labelledby`; references are not followed again.
    referenced: bool,
    /// Reached while collecting content; content naming is always allowed.
    in_content: bool,
}

impl Step {
    const ROOT: Step = Step {
        referenced: false,
        in_content: false,
    };
}

struct NameWalk<'a, H: ?Sized> {
    host: &'a H,
    dom: &'a ArenaDom,
    element: NodeRef,
    visited: HashSet<NodeId>,
    /// The element was reached again through its own `aria-labelledby`.
    self_referenced: bool,
    /// Nesting of the `content` calls in progress.
    depth: usize,
}

impl<H: Host + ?Sized> NameWalk<'_, H> {
    fn name(&mut self, id: NodeId, step: Step) -> String {
        if !self.visited.insert(id) {
            // An element labelled by itself is named from its content, once.
            if !(step.referenced && id == self.element.node && !self.self_referenced) {
                return String::new();
            }
            self.self_referenced = true;
        }
        let dom = self.dom;

        if !step.referenced
            && let Some(refs) = dom.get_attr(id, "aria-labelledby")
        {
            let referenced = Step {
                referenced: true,
                in_content: true,
            };
            let parts: Vec<String> = refs
                .split_whitespace()
                .filter_map(|r| dom.get_by_id(r))
                .map(|r| self.name(r, referenced))
                .filter(|part| !part.trim().is_empty())
                .collect();
            if !parts.is_empty() {
                return parts.join(" ");
            }
        }

        if step.in_content
            && let Some(value) = self.embedded_control_value(id)
        {
            return value;
        }

        if let Some(label) = dom.get_attr(id, "aria-label")
            && !label.trim().is_empty()
        {
            return label.to_string();
        }

        let role = resolved_role(dom, id);
        if !matches!(role, Some("presentation" | "none"))
            && let Some(native) = self.native_name(id, step)
            && !native.trim().is_empty()
        {
            return native;
        }

        let tag = dom.tag(id).unwrap_or_default();
        let from_content = step.in_content
            || role.is_some_and(|r| NAME_FROM_CONTENT_ROLES.contains(&r))
            || NAME_FROM_CONTENT_TAGS.contains(&tag);
        if from_content {
            let content = self.content(id, step);
            if !content.trim().is_empty() {
                return content;
            }
        }

        if let Some(title) = dom.get_attr(id, "title")
            && !title.trim().is_empty()
        {
            return title.to_string();
        }
        if matches!(tag, "input" | "textarea")
            && let Some(placeholder) = dom.get_attr(id, "placeholder")
        {
            return placeholder.to_string();
        }
        String::new()
    }

    /// Text of the children, block-level children separated by spaces.
    fn content(&mut self, id: NodeId, step: Step) -> String {
        if self.depth >= MAX_CONTENT_DEPTH {
            return String::new();
        }
        self.depth += 1;
        let dom = self.dom;
        let mut out = String::new();
        let children: Vec<NodeId> = dom.children(id).collect();
        for child in children {
            if let Some(text) = dom.text_content(child) {
                out.push_str(text);
            } else if dom.is_element(child) {
                if hides_itself(self.host, dom, self.element.with_node(child)) {
                    continue;
                }
                let part = self.name(
                    child,
                    Step {
                        in_content: true,
                        ..step
                    },
                );
                if dom.tag(child).is_some_and(|t| INLINE_TAGS.contains(&t)) {
                    out.push_str(&part);
                } else {
                    out.push(' ');
                    out.push_str(&part);
                    out.push(' ');
                }
            }
        }
        self.depth -= 1;
        out
    }

    /// The current value of a form control met inside another element's
    /// label.
    fn embedded_control_value(&self, id: NodeId) -> Option<String> {
        let dom = self.dom;
        match dom.tag(id)? {
            "input" => {
                let kind = dom.get_attr(id, "type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "button" | "submit" | "reset" | "image" | "checkbox" | "radio" | "hidden" => None,
                    _ => Some(dom.get_attr(id, "value").unwrap_or_default().to_string()),
                }
            }
            "textarea" => Some(dom.collect_text(id)),
            "select" => Some(
                selected_options(dom, id)
                    .into_iter()
                    .map(|option| collapse_whitespace(&dom.collect_text(option)))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        }
    }

    /// HTML-native labelling for the element's tag.
    fn native_name(&mut self, id: NodeId, step: Step) -> Option<String> {
        let dom = self.dom;
        let tag = dom.tag(id)?;
        let child_named = |tag: &str| dom.element_children(id).find(|&c| dom.has_tag(c, tag));
        let caption_step = Step {
            in_content: true,
            ..step
        };

        match tag {
            "input" => {
                let kind = dom.get_attr(id, "type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "reset" | "button" => {
                        let value = dom.get_attr(id, "value").filter(|v| !v.trim().is_empty());
                        match (value, kind.as_str()) {
                            (Some(v), _) => Some(v.to_string()),
                            (None, "submit") => Some("Submit".to_string()),
                            (None, "reset") => Some("Reset".to_string()),
                            _ => self.label_text(id),
                        }
                    }
                    "image" => dom
                        .get_attr(id, "alt")
                        .or_else(|| dom.get_attr(id, "value"))
                        .filter(|v| !v.trim().is_empty())
                        .map(str::to_string)
                        .or_else(|| Some("Submit".to_string())),
                    _ => self.label_text(id),
                }
            }
            t if LABELABLE_TAGS.contains(&t) => self.label_text(id),
            "img" | "area" => dom.get_attr(id, "alt").map(str::to_string),
            "fieldset" => child_named("legend").map(|c| self.name(c, caption_step)),
            "figure" => child_named("figcaption").map(|c| self.name(c, caption_step)),
            "table" => child_named("caption").map(|c| self.name(c, caption_step)),
            "svg" => child_named("title").map(|c| dom.collect_text(c)),
            _ => None,
        }
    }

    /// Names of every `<label>` associated with a control: `for=` references
    /// in document order, then the wrapping label.
    fn label_text(&mut self, control: NodeId) -> Option<String> {
        let dom = self.dom;
        let mut labels: Vec<NodeId> = Vec::new();
        if let Some(id_attr) = dom.element_id(control).filter(|s| !s.is_empty()) {
            labels.extend(
                dom.descendants(dom.document())
                    .filter(|&n| dom.has_tag(n, "label") && dom.get_attr(n, "for") == Some(id_attr)),
            );
        }
        if let Some(wrapping) = dom.ancestors(control).find(|&a| dom.has_tag(a, "label"))
            && !labels.contains(&wrapping)
        {
            labels.push(wrapping);
        }

        let step = Step {
            referenced: false,
            in_content: true,
        };
        let text = labels
            .into_iter()
            .map(|label| self.name(label, step))
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!text.trim().is_empty()).then_some(text)
    }
}

/// The options a `<select>` currently reports, in document order. A
/// single-choice select reports one option: the last one marked `selected`,
/// or its first option when none is.
pub(crate) fn selected_options(dom: &ArenaDom, select: NodeId) -> Vec<NodeId> {
    let options: Vec<NodeId> = dom
        .descendants(select)
        .filter(|&n| dom.has_tag(n, "option"))
        .collect();
    let mut selected: Vec<NodeId> = options
        .iter()
        .copied()
        .filter(|&o| dom.has_attr(o, "selected"))
        .collect();
    if dom.has_attr(select, "multiple") {
        return selected;
    }
    match selected.pop() {
        Some(last) => vec![last],
        None => options.into_iter().take(1).collect(),
    }
}
