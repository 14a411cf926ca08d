//! Table of contents extraction.
//!
//! Walks a document depth-first and records every perceivable heading and
//! landmark in a flat, indexable list. Landmarks nest: each entry points at
//! its nearest enclosing landmark entry, and each landmark lists its
//! children. Frames are outlined on their own and spliced in after the
//! embedding document's entries.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::address::{Address, address_of};
use crate::dom::{ElementSelector, NodeId};
use crate::host::{DocumentId, Host, NodeRef};
use crate::roles::{LandmarkRole, heading_level, is_landmark_candidate, resolve_landmark_role};
use crate::visibility::is_perceivable;

// ============================================================================
// Public Types
// ============================================================================

/// Options for [`build_outline`].
#[derive(Debug, Clone, Default)]
pub struct OutlineOptions {
    /// Elements matching this selector, and everything inside them, are left
    /// out (for example an injected toolbar).
    pub exclude: Option<ElementSelector>,
}

impl OutlineOptions {
    pub fn excluding(selector: ElementSelector) -> Self {
        Self {
            exclude: Some(selector),
        }
    }
}

/// A heading in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeadingEntry {
    pub index: usize,
    pub address: Address,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub parent_landmark_index: Option<usize>,
    /// Heading level (1-6).
    pub level: u8,
    /// Accessible name, trimmed. Never empty.
    pub text: String,
}

/// A landmark region in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LandmarkEntry {
    pub index: usize,
    pub address: Address,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub parent_landmark_index: Option<usize>,
    pub role: LandmarkRole,
    /// Accessible name; may be empty.
    pub label: String,
    /// Tag name of the landmark element.
    pub tag: String,
    /// Headings and landmarks directly inside this one, in document order.
    pub child_indices: Vec<usize>,
    /// 0 for a landmark with no landmark ancestor.
    pub nest_level: usize,
}

/// One outline entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum OutlineEntry {
    Heading(HeadingEntry),
    Landmark(LandmarkEntry),
}

impl OutlineEntry {
    pub fn index(&self) -> usize {
        match self {
            OutlineEntry::Heading(h) => h.index,
            OutlineEntry::Landmark(l) => l.index,
        }
    }

    pub fn address(&self) -> &Address {
        match self {
            OutlineEntry::Heading(h) => &h.address,
            OutlineEntry::Landmark(l) => &l.address,
        }
    }

    pub fn parent_landmark_index(&self) -> Option<usize> {
        match self {
            OutlineEntry::Heading(h) => h.parent_landmark_index,
            OutlineEntry::Landmark(l) => l.parent_landmark_index,
        }
    }

    pub fn as_heading(&self) -> Option<&HeadingEntry> {
        match self {
            OutlineEntry::Heading(h) => Some(h),
            OutlineEntry::Landmark(_) => None,
        }
    }

    pub fn as_landmark(&self) -> Option<&LandmarkEntry> {
        match self {
            OutlineEntry::Landmark(l) => Some(l),
            OutlineEntry::Heading(_) => None,
        }
    }

    /// Move an entry from a frame's own outline into the embedding one: all
    /// indices shift by `offset` and the address gains the frame's prefix.
    fn rebased(self, offset: usize, frame: &Address) -> Self {
        let shift = |i: Option<usize>| i.map(|i| i + offset);
        match self {
            OutlineEntry::Heading(h) => OutlineEntry::Heading(HeadingEntry {
                index: h.index + offset,
                address: h.address.prefixed(frame),
                parent_landmark_index: shift(h.parent_landmark_index),
                ..h
            }),
            OutlineEntry::Landmark(l) => OutlineEntry::Landmark(LandmarkEntry {
                index: l.index + offset,
                address: l.address.prefixed(frame),
                parent_landmark_index: shift(l.parent_landmark_index),
                child_indices: l.child_indices.iter().map(|i| i + offset).collect(),
                ..l
            }),
        }
    }
}

/// The outline of a page: every entry, plus the indices of those without a
/// parent landmark.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableOfContents {
    pub entries: Vec<OutlineEntry>,
    pub top_level_indices: Vec<usize>,
}

impl TableOfContents {
    fn from_entries(entries: Vec<OutlineEntry>) -> Self {
        let top_level_indices = entries
            .iter()
            .filter(|e| e.parent_landmark_index().is_none())
            .map(OutlineEntry::index)
            .collect();
        Self {
            entries,
            top_level_indices,
        }
    }

    pub fn get(&self, index: usize) -> Option<&OutlineEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct children of the entry at `index`. Headings have none.
    pub fn children(&self, index: usize) -> impl Iterator<Item = &OutlineEntry> + '_ {
        self.get(index)
            .and_then(OutlineEntry::as_landmark)
            .map(|l| l.child_indices.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&i| self.get(i))
    }

    /// Entries without a parent landmark, in document order.
    pub fn top_level(&self) -> impl Iterator<Item = &OutlineEntry> + '_ {
        self.top_level_indices.iter().filter_map(|&i| self.get(i))
    }

    pub fn headings(&self) -> impl Iterator<Item = &HeadingEntry> + '_ {
        self.entries.iter().filter_map(OutlineEntry::as_heading)
    }

    pub fn landmarks(&self) -> impl Iterator<Item = &LandmarkEntry> + '_ {
        self.entries.iter().filter_map(OutlineEntry::as_landmark)
    }

    fn fmt_entry(&self, f: &mut fmt::Formatter<'_>, entry: &OutlineEntry, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match entry {
            OutlineEntry::Heading(h) => writeln!(f, "{indent}h{} {}", h.level, h.text)?,
            OutlineEntry::Landmark(l) if l.label.is_empty() => writeln!(f, "{indent}[{}]", l.role)?,
            OutlineEntry::Landmark(l) => writeln!(f, "{indent}[{}] {}", l.role, l.label)?,
        }
        for child in self.children(entry.index()) {
            self.fmt_entry(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TableOfContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.top_level() {
            self.fmt_entry(f, entry, 0)?;
        }
        Ok(())
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Build the outline of `document` and every accessible frame inside it.
///
/// ```
/// use sightline::{Page, OutlineOptions, build_outline};
///
/// let page = Page::parse("<h1>Title</h1><main><h2>Intro</h2></main>");
/// let toc = build_outline(&page, page.top(), &OutlineOptions::default());
/// assert_eq!(toc.len(), 3);
/// assert_eq!(toc.top_level_indices, vec![0, 1]);
/// ```
pub fn build_outline<H: Host + ?Sized>(
    host: &H,
    document: DocumentId,
    options: &OutlineOptions,
) -> TableOfContents {
    let mut frame_path = vec![document];
    let entries = outline_document(host, document, options, &mut frame_path);
    TableOfContents::from_entries(entries)
}

/// The headings of the outline, keeping their outline indices.
pub fn get_headings<H: Host + ?Sized>(host: &H, document: DocumentId) -> Vec<HeadingEntry> {
    build_outline(host, document, &OutlineOptions::default())
        .entries
        .into_iter()
        .filter_map(|e| match e {
            OutlineEntry::Heading(h) => Some(h),
            OutlineEntry::Landmark(_) => None,
        })
        .collect()
}

/// The landmarks of the outline, keeping their outline indices.
pub fn get_landmarks<H: Host + ?Sized>(host: &H, document: DocumentId) -> Vec<LandmarkEntry> {
    build_outline(host, document, &OutlineOptions::default())
        .entries
        .into_iter()
        .filter_map(|e| match e {
            OutlineEntry::Landmark(l) => Some(l),
            OutlineEntry::Heading(_) => None,
        })
        .collect()
}

/// Outline one document, frames last. Indices and addresses are local to
/// `document`; the caller rebases them. `frame_path` holds the documents
/// currently being outlined, `document` included.
fn outline_document<H: Host + ?Sized>(
    host: &H,
    document: DocumentId,
    options: &OutlineOptions,
    frame_path: &mut Vec<DocumentId>,
) -> Vec<OutlineEntry> {
    let Some(dom) = host.dom(document) else {
        return Vec::new();
    };
    let Some(body) = dom.body() else {
        debug!(document = document.0, "document has no body, skipping");
        return Vec::new();
    };

    let admitted = |id: NodeId| {
        is_perceivable(host, NodeRef::new(document, id))
            && !options
                .exclude
                .as_ref()
                .is_some_and(|sel| sel.matches_inclusive_ancestor(dom, id))
    };

    let mut entries: Vec<OutlineEntry> = Vec::new();
    // Landmark elements already emitted, by outline index.
    let mut landmark_entries: HashMap<NodeId, usize> = HashMap::new();
    let mut frames: Vec<NodeId> = Vec::new();

    for id in std::iter::once(body).chain(dom.descendants(body)) {
        let Some(tag) = dom.tag(id) else {
            continue;
        };
        if matches!(tag, "iframe" | "frame") {
            frames.push(id);
            continue;
        }

        let level = heading_level(dom, id);
        if level.is_none() && !is_landmark_candidate(dom, id) {
            continue;
        }
        if !admitted(id) {
            continue;
        }

        let element = NodeRef::new(document, id);
        let index = entries.len();
        let parent = dom
            .ancestors(id)
            .find_map(|a| landmark_entries.get(&a).copied());
        let address = Address::from(address_of(dom, id));

        let entry = if let Some(level) = level {
            let text = host.accessible_name(element).trim().to_string();
            if text.is_empty() {
                continue;
            }
            OutlineEntry::Heading(HeadingEntry {
                index,
                address,
                parent_landmark_index: parent,
                level,
                text,
            })
        } else {
            let Some(role) = resolve_landmark_role(host, element) else {
                continue;
            };
            let label = host.accessible_name(element).trim().to_string();
            if tag == "section" && label.is_empty() {
                continue;
            }
            let nest_level = parent
                .and_then(|p| entries.get(p))
                .and_then(OutlineEntry::as_landmark)
                .map_or(0, |p| p.nest_level + 1);
            landmark_entries.insert(id, index);
            OutlineEntry::Landmark(LandmarkEntry {
                index,
                address,
                parent_landmark_index: parent,
                role,
                label,
                tag: tag.to_string(),
                child_indices: Vec::new(),
                nest_level,
            })
        };

        trace!(index, element = %element, "outline entry");
        if let Some(OutlineEntry::Landmark(p)) = parent.and_then(|p| entries.get_mut(p)) {
            p.child_indices.push(index);
        }
        entries.push(entry);
    }

    for frame in frames {
        if !admitted(frame) {
            continue;
        }
        let frame_ref = NodeRef::new(document, frame);
        let Some(inner) = host.embedded_document(frame_ref) else {
            debug!(frame = %frame_ref, "frame content not accessible");
            continue;
        };
        if frame_path.contains(&inner) {
            debug!(frame = %frame_ref, "frame re-enters an enclosing document");
            continue;
        }

        frame_path.push(inner);
        let sub = outline_document(host, inner, options, frame_path);
        frame_path.pop();

        let offset = entries.len();
        let prefix = Address::from(address_of(dom, frame));
        entries.extend(sub.into_iter().map(|e| e.rebased(offset, &prefix)));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Page;

    fn outline(html: &str) -> TableOfContents {
        let page = Page::parse(html);
        build_outline(&page, page.top(), &OutlineOptions::default())
    }

    #[test]
    fn test_heading_and_main() {
        let toc = outline("<h1>Title</h1><main><h2>Intro</h2></main>");
        assert_eq!(toc.len(), 3);

        let h1 = toc.get(0).unwrap().as_heading().unwrap();
        assert_eq!((h1.level, h1.text.as_str()), (1, "Title"));
        assert_eq!(h1.parent_landmark_index, None);

        let main = toc.get(1).unwrap().as_landmark().unwrap();
        assert_eq!(main.role, LandmarkRole::Main);
        assert_eq!(main.tag, "main");
        assert_eq!(main.child_indices, vec![2]);
        assert_eq!(main.nest_level, 0);

        let h2 = toc.get(2).unwrap().as_heading().unwrap();
        assert_eq!(h2.parent_landmark_index, Some(1));
        assert_eq!(toc.top_level_indices, vec![0, 1]);
    }

    #[test]
    fn test_nested_landmarks() {
        let toc = outline(
            r#"<main><nav aria-label="Chapters"><form><h3>Find</h3></form></nav></main>"#,
        );
        let nest: Vec<usize> = toc.landmarks().map(|l| l.nest_level).collect();
        assert_eq!(nest, vec![0, 1, 2]);
        let nav = toc.get(1).unwrap().as_landmark().unwrap();
        assert_eq!(nav.label, "Chapters");
        assert_eq!(nav.parent_landmark_index, Some(0));
        let heading = toc.headings().next().unwrap();
        assert_eq!(heading.parent_landmark_index, Some(2));
    }

    #[test]
    fn test_children_interleave_in_document_order() {
        let toc = outline(
            "<main><h2>A</h2><nav>links</nav><h2>B</h2><aside>x</aside><h2>C</h2></main>",
        );
        let main = toc.get(0).unwrap().as_landmark().unwrap();
        assert_eq!(main.child_indices, vec![1, 2, 3, 4, 5]);
        // `aside` inside `main` is still complementary: `main` is not sectioning content.
        assert_eq!(
            toc.get(4).unwrap().as_landmark().unwrap().role,
            LandmarkRole::Complementary
        );
    }

    #[test]
    fn test_hidden_and_empty_entries_are_skipped() {
        let toc = outline(
            r#"<h1></h1><h2 hidden>Hidden</h2><div style="display:none"><nav>x</nav></div>
               <section>No name</section><h3>Kept</h3>"#,
        );
        assert_eq!(toc.len(), 1);
        assert_eq!(toc.headings().next().unwrap().text, "Kept");
    }

    #[test]
    fn test_heading_under_filtered_landmark_attaches_upward() {
        let toc = outline(
            r#"<main><section><h2>Inside unnamed section</h2></section></main>"#,
        );
        assert_eq!(toc.len(), 2);
        let h2 = toc.get(1).unwrap().as_heading().unwrap();
        assert_eq!(h2.parent_landmark_index, Some(0));
    }

    #[test]
    fn test_heading_that_is_also_a_landmark_candidate() {
        let toc = outline(r#"<h2 role="heading" aria-level="3">x</h2><nav role="heading">Menu</nav>"#);
        assert_eq!(toc.len(), 2);
        assert!(toc.entries.iter().all(|e| e.as_heading().is_some()));
        assert_eq!(toc.get(0).unwrap().as_heading().unwrap().level, 2);
        assert_eq!(toc.get(1).unwrap().as_heading().unwrap().level, 2);
    }

    #[test]
    fn test_exclude_selector() {
        let page = Page::parse(
            r#"<div id="toolbar"><h1>Injected</h1><nav>Tools</nav></div><h1>Real</h1>"#,
        );
        let options = OutlineOptions::excluding(ElementSelector::parse("#toolbar").unwrap());
        let toc = build_outline(&page, page.top(), &options);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc.headings().next().unwrap().text, "Real");
    }

    #[test]
    fn test_frame_entries_are_rebased() {
        let page = Page::parse(
            r#"<main><h1>Top</h1><iframe srcdoc="<nav><h2>Inner</h2></nav>"></iframe></main><h1>After</h1>"#,
        );
        let toc = build_outline(&page, page.top(), &OutlineOptions::default());
        // main, Top, After, then the frame's nav and heading.
        assert_eq!(toc.len(), 5);
        let nav = toc.get(3).unwrap().as_landmark().unwrap();
        assert_eq!(nav.parent_landmark_index, None);
        assert_eq!(nav.child_indices, vec![4]);
        assert_eq!(nav.address.len(), 2);
        assert_eq!(nav.address.locators()[0].as_str(), "/html/body/main/iframe");

        let inner = toc.get(4).unwrap().as_heading().unwrap();
        assert_eq!(inner.parent_landmark_index, Some(3));
        assert_eq!(toc.top_level_indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_hidden_frame_is_skipped() {
        let toc = outline(r#"<iframe hidden srcdoc="<h1>Inner</h1>"></iframe>"#);
        assert!(toc.is_empty());
    }

    #[test]
    fn test_display_renders_tree() {
        let toc = outline(r#"<h1>Title</h1><nav aria-label="Site"><h2>Menu</h2></nav><main></main>"#);
        assert_eq!(toc.to_string(), "h1 Title\n[navigation] Site\n  h2 Menu\n[main]\n");
    }

    #[test]
    fn test_flat_variants_keep_indices() {
        let page = Page::parse("<main><h1>A</h1></main><nav><h2>B</h2></nav>");
        let headings = get_headings(&page, page.top());
        let indices: Vec<usize> = headings.iter().map(|h| h.index).collect();
        assert_eq!(indices, vec![1, 3]);
        let landmarks = get_landmarks(&page, page.top());
        let indices: Vec<usize> = landmarks.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    /// Host whose single document embeds itself through its frame.
    struct SelfEmbedding(Page);

    impl Host for SelfEmbedding {
        fn dom(&self, document: DocumentId) -> Option<&crate::dom::ArenaDom> {
            self.0.dom(document)
        }
        fn computed_style(&self, element: NodeRef) -> Option<crate::style::ComputedStyle> {
            self.0.computed_style(element)
        }
        fn accessible_name(&self, element: NodeRef) -> String {
            self.0.accessible_name(element)
        }
        fn embedded_document(&self, _frame: NodeRef) -> Option<DocumentId> {
            Some(self.0.top())
        }
    }

    #[test]
    fn test_frame_cycle_terminates() {
        let host = SelfEmbedding(Page::parse("<h1>Loop</h1><iframe></iframe>"));
        let toc = build_outline(&host, host.0.top(), &OutlineOptions::default());
        assert_eq!(toc.len(), 1);
    }
}
