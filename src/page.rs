//! The built-in [`Host`]: a page of parsed HTML documents and the frames that
//! connect them.
//!
//! Frames are bound when the page is built: `srcdoc` content is parsed
//! inline and, for pages loaded from disk, a relative `src` is read from the
//! file it resolves to. Anything else (absolute URLs, missing files, frames
//! past the depth limit) stays unbound and is treated as a cross-origin
//! frame.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::dom::{ArenaDom, NodeId, parse_html, parse_html_bytes};
use crate::error::{Error, Result};
use crate::host::{DocumentId, Host, NodeRef};
use crate::style::{ComputedStyle, DocumentStyles};
use crate::util::resolve_path;

/// Options for building a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// How many levels of nested frames are followed. Frames deeper than
    /// this are left unbound.
    pub max_frame_depth: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { max_frame_depth: 8 }
    }
}

#[derive(Debug)]
struct Document {
    dom: ArenaDom,
    styles: DocumentStyles,
    /// File the document was read from; frames resolve `src` against it.
    path: Option<String>,
}

impl Document {
    fn new(dom: ArenaDom, path: Option<String>) -> Self {
        let styles = DocumentStyles::from_dom(&dom);
        Self { dom, styles, path }
    }
}

/// Where a frame's content comes from.
enum FrameSource {
    Inline(String),
    File(String),
}

/// A top-level document plus every frame document reachable from it.
///
/// ```
/// use sightline::Page;
///
/// let page = Page::parse(r#"<iframe srcdoc="<h1>Inner</h1>"></iframe>"#);
/// assert_eq!(page.document_count(), 2);
/// ```
#[derive(Debug)]
pub struct Page {
    documents: Vec<Document>,
    frames: HashMap<NodeRef, DocumentId>,
}

impl Page {
    /// Parse a page from markup. Only `srcdoc` frames are bound, since there
    /// is no file to resolve `src` against.
    pub fn parse(html: &str) -> Self {
        Self::parse_with(html, &LoadOptions::default())
    }

    pub fn parse_with(html: &str, options: &LoadOptions) -> Self {
        Self::build(parse_html(html), None, options)
    }

    /// Read a page from disk, binding same-tree frame files.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &LoadOptions::default())
    }

    pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let dom = parse_html_bytes(&bytes);
        Ok(Self::build(
            dom,
            Some(path.to_string_lossy().into_owned()),
            options,
        ))
    }

    fn build(dom: ArenaDom, path: Option<String>, options: &LoadOptions) -> Self {
        let mut page = Page {
            documents: Vec::new(),
            frames: HashMap::new(),
        };
        let top = page.push_document(Document::new(dom, path));
        page.bind_frames(top, options, 0);
        page
    }

    fn push_document(&mut self, document: Document) -> DocumentId {
        let id = DocumentId(self.documents.len() as u32);
        self.documents.push(document);
        id
    }

    /// Bind every frame element of `document`, recursing into the frames'
    /// own documents. `depth` is the nesting level of `document`.
    fn bind_frames(&mut self, document: DocumentId, options: &LoadOptions, depth: usize) {
        let Some(doc) = self.documents.get(document.0 as usize) else {
            return;
        };

        let mut sources: Vec<(NodeId, FrameSource)> = Vec::new();
        for node in doc.dom.descendants(doc.dom.document()) {
            let Some(tag @ ("iframe" | "frame")) = doc.dom.tag(node) else {
                continue;
            };
            if tag == "iframe"
                && let Some(srcdoc) = doc.dom.get_attr(node, "srcdoc")
            {
                sources.push((node, FrameSource::Inline(srcdoc.to_string())));
                continue;
            }
            let Some(src) = doc.dom.get_attr(node, "src").filter(|s| !s.trim().is_empty()) else {
                continue;
            };
            match doc.path.as_deref().and_then(|base| resolve_path(base, src.trim())) {
                Some(file) => sources.push((node, FrameSource::File(file))),
                None => debug!(src, "leaving frame unbound"),
            }
        }

        if sources.is_empty() {
            return;
        }
        if depth >= options.max_frame_depth {
            warn!(
                depth,
                skipped = sources.len(),
                "frame nesting limit reached, leaving frames unbound"
            );
            return;
        }

        let parent_path = doc.path.clone();
        for (node, source) in sources {
            let child = match source {
                FrameSource::Inline(html) => Document::new(parse_html(&html), parent_path.clone()),
                FrameSource::File(file) => match std::fs::read(&file) {
                    Ok(bytes) => Document::new(parse_html_bytes(&bytes), Some(file)),
                    Err(error) => {
                        warn!(path = %file, %error, "skipping unreadable frame");
                        continue;
                    }
                },
            };
            let child = self.push_document(child);
            self.frames.insert(NodeRef::new(document, node), child);
            self.bind_frames(child, options, depth + 1);
        }
    }

    /// Bind `frame` to a new document parsed from `html`, replacing any
    /// existing binding. Frames inside `html` are bound from `srcdoc`.
    pub fn attach_frame(&mut self, frame: NodeRef, html: &str) -> Result<DocumentId> {
        let is_frame = self
            .dom(frame.document)
            .and_then(|dom| dom.tag(frame.node))
            .is_some_and(|tag| matches!(tag, "iframe" | "frame"));
        if !is_frame {
            return Err(Error::NotAFrame);
        }

        let child = self.push_document(Document::new(parse_html(html), None));
        self.frames.insert(frame, child);
        self.bind_frames(child, &LoadOptions::default(), 1);
        Ok(child)
    }

    /// Remove a frame's binding so it reads as cross-origin. Returns the
    /// document it was bound to.
    pub fn detach_frame(&mut self, frame: NodeRef) -> Option<DocumentId> {
        self.frames.remove(&frame)
    }

    /// The top-level document.
    pub fn top(&self) -> DocumentId {
        DocumentId(0)
    }

    pub fn top_dom(&self) -> &ArenaDom {
        &self.documents[0].dom
    }

    /// Mutable access to the top-level tree. Call
    /// [`refresh_styles`](Self::refresh_styles) after changing `<style>`
    /// elements.
    pub fn top_dom_mut(&mut self) -> &mut ArenaDom {
        &mut self.documents[0].dom
    }

    pub fn dom_mut(&mut self, document: DocumentId) -> Option<&mut ArenaDom> {
        self.documents
            .get_mut(document.0 as usize)
            .map(|doc| &mut doc.dom)
    }

    /// Re-read the `<style>` elements of a document.
    pub fn refresh_styles(&mut self, document: DocumentId) {
        if let Some(doc) = self.documents.get_mut(document.0 as usize) {
            doc.styles = DocumentStyles::from_dom(&doc.dom);
        }
    }

    /// Number of documents, the top one included.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// File a document was read from, if any.
    pub fn path(&self, document: DocumentId) -> Option<&str> {
        self.documents
            .get(document.0 as usize)
            .and_then(|doc| doc.path.as_deref())
    }

    /// Look up an element of the top-level document by its `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        self.element_by_id_in(self.top(), id)
    }

    pub fn element_by_id_in(&self, document: DocumentId, id: &str) -> Option<NodeRef> {
        let dom = self.dom(document)?;
        dom.get_by_id(id).map(|node| NodeRef::new(document, node))
    }
}

impl Host for Page {
    fn dom(&self, document: DocumentId) -> Option<&ArenaDom> {
        self.documents.get(document.0 as usize).map(|doc| &doc.dom)
    }

    fn computed_style(&self, element: NodeRef) -> Option<ComputedStyle> {
        let doc = self.documents.get(element.document.0 as usize)?;
        doc.styles.compute(&doc.dom, element.node)
    }

    fn computed_style_from(
        &self,
        element: NodeRef,
        parent: Option<&ComputedStyle>,
    ) -> Option<ComputedStyle> {
        let doc = self.documents.get(element.document.0 as usize)?;
        doc.styles.compute_from(&doc.dom, element.node, parent)
    }

    fn accessible_name(&self, element: NodeRef) -> String {
        crate::accname::accessible_name(self, element)
    }

    fn embedded_document(&self, frame: NodeRef) -> Option<DocumentId> {
        self.frames.get(&frame).copied()
    }
}
