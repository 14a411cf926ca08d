//! Multi-document pages loaded from disk.

use std::fs;
use std::path::Path;

use sightline::{
    Host, LoadOptions, OutlineEntry, OutlineOptions, Page, accessible_text, build_outline,
    resolve_address,
};

fn write(dir: &Path, name: &str, html: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, html).unwrap();
}

#[test]
fn test_relative_frame_files_are_outlined_after_the_host_document() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "index.html",
        r#"<main><h1>Top</h1><iframe src="frames/inner.html"></iframe></main><h2>Footer heading</h2>"#,
    );
    write(
        dir.path(),
        "frames/inner.html",
        r#"<nav aria-label="Inner nav"><h1>Inner</h1></nav>"#,
    );

    let page = Page::load(dir.path().join("index.html")).unwrap();
    let toc = build_outline(&page, page.top(), &OutlineOptions::default());

    assert_eq!(toc.len(), 5);
    let nav = toc.get(3).and_then(OutlineEntry::as_landmark).unwrap();
    assert_eq!(nav.label, "Inner nav");
    assert_eq!(nav.parent_landmark_index, None);
    assert_eq!(nav.nest_level, 0);

    let inner = toc.get(4).and_then(OutlineEntry::as_heading).unwrap();
    assert_eq!(inner.parent_landmark_index, Some(3));
    assert_eq!(inner.address.len(), 2);

    let node = resolve_address(&page, page.top(), &inner.address).unwrap();
    assert_eq!(accessible_text(&page, node), "Inner");
}

#[test]
fn test_frameset_pages() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "index.html",
        r#"<frameset cols="20%,80%"><frame src="left.html"><frame src="right.html"></frameset>"#,
    );
    write(dir.path(), "left.html", "<nav><h2>Contents</h2></nav>");
    write(dir.path(), "right.html", "<main><h1>Chapter</h1></main>");

    let page = Page::load(dir.path().join("index.html")).unwrap();
    let toc = build_outline(&page, page.top(), &OutlineOptions::default());
    assert_eq!(
        toc.to_string(),
        "[navigation]\n  h2 Contents\n[main]\n  h1 Chapter\n"
    );

    let first = toc.get(0).unwrap().address();
    assert_eq!(first.locators()[0].as_str(), "/html/frameset/frame[1]");
}

#[test]
fn test_cyclic_frames_stop_at_the_depth_limit() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.html", r#"<h1>A</h1><iframe src="b.html"></iframe>"#);
    write(dir.path(), "b.html", r#"<h1>B</h1><iframe src="a.html"></iframe>"#);

    let options = LoadOptions { max_frame_depth: 3 };
    let page = Page::load_with(dir.path().join("a.html"), &options).unwrap();
    assert_eq!(page.document_count(), 4);

    let toc = build_outline(&page, page.top(), &OutlineOptions::default());
    let texts: Vec<&str> = toc.headings().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B", "A", "B"]);
    assert_eq!(toc.get(3).unwrap().address().len(), 4);
}

#[test]
fn test_unbound_frames_contribute_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "index.html",
        r#"<h1>Top</h1>
           <iframe id="remote" src="https://example.com/embed"></iframe>
           <iframe id="missing" src="gone.html"></iframe>
           <iframe id="empty"></iframe>"#,
    );

    let page = Page::load(dir.path().join("index.html")).unwrap();
    assert_eq!(page.document_count(), 1);
    for id in ["remote", "missing", "empty"] {
        let frame = page.element_by_id(id).unwrap();
        assert_eq!(page.embedded_document(frame), None);
    }

    let toc = build_outline(&page, page.top(), &OutlineOptions::default());
    assert_eq!(toc.len(), 1);
}

#[test]
fn test_excluded_and_hidden_frames_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "index.html",
        r#"<div class="widget"><iframe src="inner.html"></iframe></div>
           <iframe style="display:none" src="inner.html"></iframe>
           <iframe src="inner.html"></iframe>"#,
    );
    write(dir.path(), "inner.html", "<h1>Inner</h1>");

    let page = Page::load(dir.path().join("index.html")).unwrap();
    assert_eq!(page.document_count(), 4);

    let options = OutlineOptions::excluding(sightline::ElementSelector::parse(".widget").unwrap());
    let toc = build_outline(&page, page.top(), &options);
    assert_eq!(toc.len(), 1);
    assert_eq!(
        toc.get(0).unwrap().address().locators()[0].as_str(),
        "/html/body/iframe[2]"
    );
}

#[test]
fn test_frame_charset_is_sniffed() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("index.html"),
        r#"<iframe src="latin1.html"></iframe>"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("latin1.html"),
        b"<meta charset=\"iso-8859-1\"><h1>Caf\xe9</h1>".as_slice(),
    )
    .unwrap();

    let page = Page::load(dir.path().join("index.html")).unwrap();
    let toc = build_outline(&page, page.top(), &OutlineOptions::default());
    assert_eq!(toc.headings().next().unwrap().text, "Café");
}

#[test]
fn test_attached_frame_appears_in_outline() {
    let mut page = Page::parse(r#"<h1>Host</h1><iframe id="f"></iframe>"#);
    let frame = page.element_by_id("f").unwrap();
    page.attach_frame(frame, "<main><h2>Attached</h2></main>").unwrap();

    let toc = build_outline(&page, page.top(), &OutlineOptions::default());
    assert_eq!(toc.len(), 3);
    assert_eq!(toc.top_level_indices, vec![0, 1]);
}
