//! HTML document model.
//!
//! Documents are parsed with html5ever into an [`ArenaDom`]. Selector
//! matching against the arena goes through [`ElementRef`] and
//! [`ElementSelector`].

mod arena;
mod element_ref;
mod tree_sink;

pub use arena::{ArenaDom, Attribute, Node, NodeData, NodeId};
pub use element_ref::{ElementRef, ElementSelector, PageSelectors};
pub(crate) use element_ref::{matches_any, parse_selector_list};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::ArenaSink;

/// Parse an HTML document into an arena DOM.
///
/// Parsing never fails: malformed markup is repaired the way browsers do.
///
/// ```
/// use sightline::dom::parse_html;
///
/// let dom = parse_html("<main><h1>Hello</h1></main>");
/// let h1 = dom.find_by_tag("h1").unwrap();
/// assert_eq!(dom.collect_text(h1), "Hello");
/// ```
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = ArenaSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse HTML bytes, sniffing the character encoding from a `<meta charset>`
/// declaration when the bytes are not valid UTF-8.
pub fn parse_html_bytes(html: &[u8]) -> ArenaDom {
    let hint = crate::util::extract_meta_charset(html);
    parse_html(&crate::util::decode_text(html, hint))
}
