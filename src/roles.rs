//! ARIA role resolution.
//!
//! Landmark roles follow the HTML-ARIA implicit mapping with its contextual
//! exceptions for sectioning content. [`classify`] reduces an element to the
//! closed set of shapes the speech extractor distinguishes.

use std::fmt;
use std::str::FromStr;

use crate::dom::{ArenaDom, NodeId};
use crate::host::{Host, NodeRef};

/// The eight ARIA landmark roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LandmarkRole {
    Banner,
    Complementary,
    ContentInfo,
    Form,
    Main,
    Navigation,
    Region,
    Search,
}

impl LandmarkRole {
    pub const ALL: [LandmarkRole; 8] = [
        LandmarkRole::Banner,
        LandmarkRole::Complementary,
        LandmarkRole::ContentInfo,
        LandmarkRole::Form,
        LandmarkRole::Main,
        LandmarkRole::Navigation,
        LandmarkRole::Region,
        LandmarkRole::Search,
    ];

    /// The ARIA role token.
    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkRole::Banner => "banner",
            LandmarkRole::Complementary => "complementary",
            LandmarkRole::ContentInfo => "contentinfo",
            LandmarkRole::Form => "form",
            LandmarkRole::Main => "main",
            LandmarkRole::Navigation => "navigation",
            LandmarkRole::Region => "region",
            LandmarkRole::Search => "search",
        }
    }

    /// Parse a role token, ASCII case-insensitively.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for LandmarkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("not a landmark role: {s}"))
    }
}

/// Non-abstract WAI-ARIA 1.2 roles plus the `search` landmark spelling.
const ARIA_ROLES: &[&str] = &[
    "alert", "alertdialog", "application", "article", "banner", "blockquote", "button",
    "caption", "cell", "checkbox", "code", "columnheader", "combobox", "complementary",
    "contentinfo", "definition", "deletion", "dialog", "directory", "document", "emphasis",
    "feed", "figure", "form", "generic", "grid", "gridcell", "group", "heading", "img",
    "image", "insertion", "link", "list", "listbox", "listitem", "log", "main", "marquee",
    "math", "menu", "menubar", "menuitem", "menuitemcheckbox", "menuitemradio", "meter",
    "navigation", "none", "note", "option", "paragraph", "presentation", "progressbar",
    "radio", "radiogroup", "region", "row", "rowgroup", "rowheader", "scrollbar", "search",
    "searchbox", "separator", "slider", "spinbutton", "status", "strong", "subscript",
    "superscript", "switch", "tab", "table", "tablist", "tabpanel", "term", "textbox", "time",
    "timer", "toolbar", "tooltip", "tree", "treegrid", "treeitem",
];

/// Roles whose accessible name stands in for their whole subtree when
/// spoken.
const PRESENTATIONAL_ROLES: &[&str] = &[
    "button",
    "checkbox",
    "img",
    "image",
    "meter",
    "progressbar",
    "radio",
    "scrollbar",
    "slider",
    "spinbutton",
    "switch",
    "tab",
];

/// Elements that never contribute spoken text.
const IGNORED_TAGS: &[&str] = &[
    "base", "frame", "head", "iframe", "link", "meta", "noscript", "object", "script", "style",
    "template", "title",
];

/// Phrasing elements that join their neighbours without a word break.
pub(crate) const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "i", "ins",
    "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time",
    "u", "var",
];

/// Sectioning content that turns `aside`, `header` and `footer` into local
/// (non-landmark) regions.
const SECTIONING_TAGS: &[&str] = &["article", "aside", "nav", "section"];

/// Tags that can become a landmark without an explicit role.
const LANDMARK_TAGS: &[&str] = &[
    "aside", "footer", "form", "header", "main", "nav", "search", "section",
];

/// The last whitespace-separated token of the `role` attribute, as written.
pub fn last_role_token(dom: &ArenaDom, id: NodeId) -> Option<&str> {
    dom.get_attr(id, "role")?.split_whitespace().next_back()
}

/// The explicit role, if the last `role` token is a known ARIA role.
pub fn explicit_role(dom: &ArenaDom, id: NodeId) -> Option<&'static str> {
    let token = last_role_token(dom, id)?;
    ARIA_ROLES
        .iter()
        .copied()
        .find(|role| role.eq_ignore_ascii_case(token))
}

/// The role an element has from its tag alone, for the roles the engine
/// cares about. Landmarks are contextual and resolved separately.
pub fn implicit_role(dom: &ArenaDom, id: NodeId) -> Option<&'static str> {
    let tag = dom.tag(id)?;
    Some(match tag {
        "a" | "area" if dom.has_attr(id, "href") => "link",
        "button" => "button",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "img" if dom.get_attr(id, "alt") == Some("") => "presentation",
        "img" => "img",
        "input" => input_role(dom.get_attr(id, "type").unwrap_or("text"))?,
        "progress" => "progressbar",
        "meter" => "meter",
        "select" => {
            if dom.has_attr(id, "multiple") {
                "listbox"
            } else {
                "combobox"
            }
        }
        "textarea" => "textbox",
        "option" => "option",
        "td" => "cell",
        "th" => "columnheader",
        "tr" => "row",
        "li" => "listitem",
        "ul" | "ol" | "menu" => "list",
        "table" => "table",
        "hr" => "separator",
        "dialog" => "dialog",
        "details" | "fieldset" => "group",
        "figure" => "figure",
        "article" => "article",
        _ => return None,
    })
}

fn input_role(input_type: &str) -> Option<&'static str> {
    Some(match input_type.to_ascii_lowercase().as_str() {
        "button" | "submit" | "reset" | "image" => "button",
        "checkbox" => "checkbox",
        "radio" => "radio",
        "range" => "slider",
        "number" => "spinbutton",
        "search" => "searchbox",
        "text" | "email" | "tel" | "url" | "password" | "" => "textbox",
        _ => return None,
    })
}

/// Explicit role if present, else the implicit one.
pub fn resolved_role(dom: &ArenaDom, id: NodeId) -> Option<&'static str> {
    explicit_role(dom, id).or_else(|| implicit_role(dom, id))
}

/// Whether the element could be a landmark (before context and naming rules).
pub fn is_landmark_candidate(dom: &ArenaDom, id: NodeId) -> bool {
    dom.tag(id).is_some_and(|tag| LANDMARK_TAGS.contains(&tag))
        || last_role_token(dom, id).is_some_and(|t| LandmarkRole::from_token(t).is_some())
}

/// Heading level when the element is a heading candidate: the `hN` suffix,
/// else `aria-level` (default 2, clamped to 6) for an explicit heading role.
pub fn heading_level(dom: &ArenaDom, id: NodeId) -> Option<u8> {
    let tag = dom.tag(id)?;
    if let Some(level) = tag
        .strip_prefix('h')
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=6).contains(n))
        && tag.len() == 2
    {
        return Some(level);
    }

    let is_heading_role =
        last_role_token(dom, id).is_some_and(|t| t.eq_ignore_ascii_case("heading"));
    is_heading_role.then(|| aria_level(dom, id))
}

fn aria_level(dom: &ArenaDom, id: NodeId) -> u8 {
    match dom
        .get_attr(id, "aria-level")
        .and_then(|v| v.trim().parse::<i64>().ok())
    {
        Some(n) if n >= 1 => n.min(6) as u8,
        _ => 2,
    }
}

fn has_ancestor_in(dom: &ArenaDom, id: NodeId, tags: &[&str]) -> bool {
    dom.ancestors(id)
        .any(|a| dom.tag(a).is_some_and(|t| tags.contains(&t)))
}

/// Map an element to its landmark role, if it has one.
///
/// A landmark token in the `role` attribute (last token) wins outright.
/// Otherwise the tag decides: `aside` needs a name when nested in sectioning
/// content, `header`/`footer` are only page-level outside sectioning content
/// and `main`, and `section` needs a name.
pub fn resolve_landmark_role<H: Host + ?Sized>(host: &H, element: NodeRef) -> Option<LandmarkRole> {
    let dom = host.dom(element.document)?;
    let id = element.node;

    if let Some(role) = last_role_token(dom, id).and_then(LandmarkRole::from_token) {
        return Some(role);
    }

    let named = || !host.accessible_name(element).trim().is_empty();

    match dom.tag(id)? {
        "aside" => {
            if has_ancestor_in(dom, id, SECTIONING_TAGS) {
                named().then_some(LandmarkRole::Complementary)
            } else {
                Some(LandmarkRole::Complementary)
            }
        }
        tag @ ("header" | "footer") => {
            if has_ancestor_in(dom, id, SECTIONING_TAGS) || has_ancestor_in(dom, id, &["main"]) {
                None
            } else if tag == "header" {
                Some(LandmarkRole::Banner)
            } else {
                Some(LandmarkRole::ContentInfo)
            }
        }
        "form" => Some(LandmarkRole::Form),
        "main" => Some(LandmarkRole::Main),
        "nav" => Some(LandmarkRole::Navigation),
        "search" => Some(LandmarkRole::Search),
        "section" => named().then_some(LandmarkRole::Region),
        _ => None,
    }
}

/// How the speech extractor treats an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Never spoken (scripts, metadata, embedded frames).
    Ignored,
    /// Spoken as its accessible name only.
    Presentational,
    /// `input`/`textarea`: name then value.
    TextField,
    /// `select`: name then selected options.
    Select,
    /// `svg`: name only, or nothing.
    Graphic,
    /// `details`: only the summary while closed.
    Disclosure { open: bool },
    /// Everything else: children, word-separated unless inline.
    Generic { inline: bool },
}

/// Classify an element once so callers can match exhaustively. Anything
/// that is not an element is `Ignored`.
pub fn classify<H: Host + ?Sized>(host: &H, element: NodeRef) -> ElementKind {
    let Some(dom) = host.dom(element.document) else {
        return ElementKind::Ignored;
    };
    let id = element.node;
    let Some(tag) = dom.tag(id) else {
        return ElementKind::Ignored;
    };

    if IGNORED_TAGS.contains(&tag) {
        return ElementKind::Ignored;
    }
    if resolved_role(dom, id).is_some_and(|role| PRESENTATIONAL_ROLES.contains(&role)) {
        return ElementKind::Presentational;
    }
    match tag {
        "input" | "textarea" => ElementKind::TextField,
        "select" => ElementKind::Select,
        "svg" => ElementKind::Graphic,
        "details" => ElementKind::Disclosure {
            open: dom.has_attr(id, "open"),
        },
        _ => ElementKind::Generic {
            inline: INLINE_TAGS.contains(&tag),
        },
    }
}
