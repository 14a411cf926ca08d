//! Benchmarks for outline building and speech extraction.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use sightline::{NodeRef, OutlineOptions, Page, accessible_text, build_outline, dom::parse_html};

/// A long article page: site chrome plus `sections` named sections, each
/// with a heading, prose, a form and a closed disclosure.
fn sample_page(sections: usize) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html><html><head><style>.sr-only { display: none }</style></head><body>
        <header><nav aria-label="Primary"><a href="/">Home</a> <a href="/docs">Docs</a></nav></header>
        <main><h1>Handbook</h1>"#,
    );
    for i in 0..sections {
        html.push_str(&format!(
            r##"<section aria-labelledby="s{i}">
                 <h2 id="s{i}">Section {i}</h2>
                 <p>Paragraph with <em>inline</em> text and a <a href="#s{i}">link</a>.</p>
                 <p class="sr-only">Skipped</p>
                 <aside>Note {i}</aside>
                 <form aria-label="Feedback {i}"><label>Rating <input value="{i}"></label></form>
                 <details><summary>More</summary><p>Hidden body</p></details>
               </section>"##
        ));
    }
    html.push_str("</main><footer>Fine print</footer></body></html>");
    html
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let html = sample_page(50);
    c.bench_function("parse_html", |b| {
        b.iter(|| parse_html(black_box(&html)));
    });
}

// ============================================================================
// Analysis
// ============================================================================

fn bench_build_outline(c: &mut Criterion) {
    let page = Page::parse(&sample_page(50));
    let options = OutlineOptions::default();
    c.bench_function("build_outline", |b| {
        b.iter(|| build_outline(&page, page.top(), black_box(&options)));
    });
}

fn bench_build_outline_with_frames(c: &mut Criterion) {
    let inner = sample_page(10).replace('"', "&quot;");
    let html = format!(
        r#"<main><h1>Frames</h1><iframe srcdoc="{inner}"></iframe><iframe srcdoc="{inner}"></iframe></main>"#
    );
    let page = Page::parse(&html);
    let options = OutlineOptions::default();
    c.bench_function("build_outline_frames", |b| {
        b.iter(|| build_outline(&page, page.top(), black_box(&options)));
    });
}

fn bench_accessible_text(c: &mut Criterion) {
    let page = Page::parse(&sample_page(50));
    let body = page.top_dom().body().unwrap();
    let node = NodeRef::new(page.top(), body);
    c.bench_function("accessible_text_body", |b| {
        b.iter(|| accessible_text(&page, black_box(node)));
    });
}

/// `depth` nested divs around a small landmark, a styled hidden block and
/// some text.
fn deep_page(depth: usize) -> String {
    format!(
        r#"<style>.quiet {{ visibility: hidden }}</style>{}<main><h1>Deep</h1><p class="quiet">no</p>text</main>{}"#,
        "<div>".repeat(depth),
        "</div>".repeat(depth)
    )
}

fn bench_deep_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_nesting");
    for depth in [100, 400, 1600] {
        let page = Page::parse(&deep_page(depth));
        let options = OutlineOptions::default();
        let body = page.top_dom().body().unwrap();
        let node = NodeRef::new(page.top(), body);
        group.bench_function(format!("build_outline/{depth}"), |b| {
            b.iter(|| build_outline(&page, page.top(), black_box(&options)));
        });
        group.bench_function(format!("accessible_text/{depth}"), |b| {
            b.iter(|| accessible_text(&page, black_box(node)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_build_outline,
    bench_build_outline_with_frames,
    bench_accessible_text,
    bench_deep_nesting,
);
criterion_main!(benches);
