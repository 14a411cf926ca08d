//! Computed-style resolution for `display` and `visibility`.
//!
//! A [`DocumentStyles`] is built once per parsed document from the
//! user-agent stylesheet and the document's `<style>` elements; the
//! element's `style` attribute is read at compute time. Nothing is cached
//! between calls, so a style query always reflects the current tree.

mod sheet;

pub use sheet::{Declaration, Origin, Property, PropertyValue, Specificity, Stylesheet};

use crate::dom::{ArenaDom, ElementRef, NodeId};
use sheet::{MatchedDeclaration, parse_inline_style};

/// Computed value of the `display` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Display {
    None,
    Contents,
    #[default]
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Flex,
    InlineFlex,
    Grid,
    InlineGrid,
    Table,
    Other,
}

impl Display {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "none" => Display::None,
            "contents" => Display::Contents,
            "inline" => Display::Inline,
            "block" | "flow-root" => Display::Block,
            "inline-block" => Display::InlineBlock,
            "list-item" => Display::ListItem,
            "flex" => Display::Flex,
            "inline-flex" => Display::InlineFlex,
            "grid" => Display::Grid,
            "inline-grid" => Display::InlineGrid,
            "table" | "inline-table" | "table-row" | "table-cell" | "table-row-group"
            | "table-header-group" | "table-footer-group" | "table-column"
            | "table-column-group" | "table-caption" => Display::Table,
            "ruby" | "ruby-text" | "ruby-base" | "run-in" => Display::Other,
            _ => return None,
        })
    }
}

/// Computed value of the `visibility` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "visible" => Some(Visibility::Visible),
            "hidden" => Some(Visibility::Hidden),
            "collapse" => Some(Visibility::Collapse),
            _ => None,
        }
    }
}

/// The subset of an element's computed style that the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
}

impl ComputedStyle {
    /// Whether this style alone hides the element.
    pub fn hides(&self) -> bool {
        self.display == Display::None || self.visibility != Visibility::Visible
    }
}

/// Stylesheets that apply to one document.
#[derive(Debug, Clone)]
pub struct DocumentStyles {
    sheets: Vec<(Stylesheet, Origin)>,
}

impl DocumentStyles {
    /// Collect the user-agent sheet and every `<style>` element of `dom`.
    pub fn from_dom(dom: &ArenaDom) -> Self {
        let mut sheets = vec![(user_agent_stylesheet(), Origin::UserAgent)];
        for id in dom.descendants(dom.document()) {
            if dom.has_tag(id, "style") {
                let sheet = Stylesheet::parse(&dom.collect_text(id));
                if !sheet.is_empty() {
                    sheets.push((sheet, Origin::Author));
                }
            }
        }
        Self { sheets }
    }

    /// Run the cascade for `id`. Returns `None` for non-element nodes.
    ///
    /// Inherited values are resolved top-down from the root, one cascade per
    /// ancestor element.
    pub fn compute(&self, dom: &ArenaDom, id: NodeId) -> Option<ComputedStyle> {
        if !dom.is_element(id) {
            return None;
        }
        let mut chain: Vec<NodeId> = dom.ancestors(id).filter(|&a| dom.is_element(a)).collect();
        chain.reverse();

        let mut parent: Option<ComputedStyle> = None;
        for ancestor in chain {
            parent = self.compute_from(dom, ancestor, parent.as_ref());
        }
        self.compute_from(dom, id, parent.as_ref())
    }

    /// Run the cascade for `id` alone, taking inherited values from
    /// `parent`, the computed style of its parent element (`None` at the
    /// root). Returns `None` for non-element nodes.
    pub fn compute_from(
        &self,
        dom: &ArenaDom,
        id: NodeId,
        parent: Option<&ComputedStyle>,
    ) -> Option<ComputedStyle> {
        if !dom.is_element(id) {
            return None;
        }

        let inline = dom
            .get_attr(id, "style")
            .map(parse_inline_style)
            .unwrap_or_default();

        let elem = ElementRef::new(dom, id);
        let mut matched: Vec<MatchedDeclaration<'_>> = Vec::new();
        let mut order = 0;
        for (sheet, origin) in &self.sheets {
            sheet.matching(elem, *origin, &mut order, &mut matched);
        }
        for declaration in &inline {
            matched.push(MatchedDeclaration {
                declaration,
                origin: Origin::Inline,
                specificity: Specificity::default(),
                order,
            });
            order += 1;
        }
        matched.sort_by(|a, b| a.cascade_cmp(b));

        let mut display = None;
        let mut visibility = None;
        for m in &matched {
            match m.declaration.property {
                Property::Display => display = Some(m.declaration.value),
                Property::Visibility => visibility = Some(m.declaration.value),
            }
        }

        let parent = parent.copied().unwrap_or_default();
        let display = match display {
            Some(PropertyValue::Display(d)) => d,
            Some(PropertyValue::Inherit) => parent.display,
            _ => Display::Inline,
        };
        let visibility = match visibility {
            Some(PropertyValue::Visibility(v)) => v,
            Some(PropertyValue::Initial) => Visibility::Visible,
            _ => parent.visibility,
        };

        Some(ComputedStyle {
            display,
            visibility,
        })
    }
}

/// Default rendering rules browsers apply before any author CSS.
const USER_AGENT_CSS: &str = r#"
html, body, address, article, aside, blockquote, details, dialog, div, dl, dd, dt,
fieldset, figcaption, figure, footer, form, h1, h2, h3, h4, h5, h6, header, hgroup,
hr, main, menu, nav, ol, p, pre, search, section, summary, ul { display: block }
li { display: list-item }
table { display: table }
button, select, textarea, input, img, iframe, video { display: inline-block }
area, base, datalist, head, link, meta, noscript, param, script, style, template, title,
[hidden], input[type=hidden], dialog:not([open]) { display: none }
details:not([open]) > :not(summary:first-of-type) { display: none }
"#;

/// The built-in user-agent stylesheet.
pub fn user_agent_stylesheet() -> Stylesheet {
    Stylesheet::parse(USER_AGENT_CSS)
}
