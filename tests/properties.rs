//! Structural properties of outlines over generated documents.

use proptest::prelude::*;

use sightline::{OutlineOptions, Page, build_outline, resolve_landmark_role};

const TAGS: &[&str] = &[
    "div", "p", "span", "main", "nav", "aside", "header", "footer", "section", "article",
    "form", "search", "h1", "h2", "h3", "h4", "h5", "h6",
];

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Element {
        tag: &'static str,
        label: Option<String>,
        hidden: bool,
        children: Vec<Node>,
    },
}

impl Node {
    fn render(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element {
                tag,
                label,
                hidden,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                if let Some(label) = label {
                    out.push_str(&format!(r#" aria-label="{label}""#));
                }
                if *hidden {
                    out.push_str(" hidden");
                }
                out.push('>');
                for child in children {
                    child.render(out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

fn html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.render(&mut out);
    }
    out
}

fn node() -> impl Strategy<Value = Node> {
    let leaf = "[a-z]{1,6}".prop_map(Node::Text);
    leaf.prop_recursive(4, 40, 4, |inner| {
        (
            prop::sample::select(TAGS),
            prop::option::weighted(0.3, "[A-Z][a-z]{0,5}"),
            prop::bool::weighted(0.1),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, label, hidden, children)| Node::Element {
                tag,
                label,
                hidden,
                children,
            })
    })
}

fn document() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(node(), 1..5)
}

fn leaf_element() -> impl Strategy<Value = Node> {
    (prop::sample::select(TAGS), "[a-z]{1,6}").prop_map(|(tag, text)| Node::Element {
        tag,
        label: None,
        hidden: false,
        children: vec![Node::Text(text)],
    })
}

proptest! {
    #[test]
    fn prop_parent_links_are_consistent(doc in document()) {
        let page = Page::parse(&html(&doc));
        let toc = build_outline(&page, page.top(), &OutlineOptions::default());

        for (position, entry) in toc.entries.iter().enumerate() {
            prop_assert_eq!(entry.index(), position);
            if let Some(parent) = entry.parent_landmark_index() {
                prop_assert!(parent < position);
                let parent = toc.get(parent).and_then(|e| e.as_landmark());
                prop_assert!(parent.is_some(), "parent of {} is not a landmark", position);
                let count = parent
                    .map(|p| p.child_indices.iter().filter(|&&c| c == position).count())
                    .unwrap_or_default();
                prop_assert_eq!(count, 1);
            }
        }
    }

    #[test]
    fn prop_top_level_indices_are_the_parentless_entries(doc in document()) {
        let page = Page::parse(&html(&doc));
        let toc = build_outline(&page, page.top(), &OutlineOptions::default());

        let expected: Vec<usize> = toc
            .entries
            .iter()
            .filter(|e| e.parent_landmark_index().is_none())
            .map(|e| e.index())
            .collect();
        prop_assert_eq!(&toc.top_level_indices, &expected);
        prop_assert!(toc.top_level_indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_nest_level_follows_parent_chain(doc in document()) {
        let page = Page::parse(&html(&doc));
        let toc = build_outline(&page, page.top(), &OutlineOptions::default());

        for landmark in toc.landmarks() {
            let expected = landmark
                .parent_landmark_index
                .and_then(|p| toc.get(p))
                .and_then(|p| p.as_landmark())
                .map_or(0, |p| p.nest_level + 1);
            prop_assert_eq!(landmark.nest_level, expected);
        }
    }

    #[test]
    fn prop_headings_are_named_and_leveled(doc in document()) {
        let page = Page::parse(&html(&doc));
        let toc = build_outline(&page, page.top(), &OutlineOptions::default());

        for heading in toc.headings() {
            prop_assert!((1..=6).contains(&heading.level));
            prop_assert!(!heading.text.is_empty());
            prop_assert_eq!(heading.text.trim(), heading.text.as_str());
        }
    }

    #[test]
    fn prop_build_outline_is_idempotent(doc in document()) {
        let page = Page::parse(&html(&doc));
        let first = build_outline(&page, page.top(), &OutlineOptions::default());
        let second = build_outline(&page, page.top(), &OutlineOptions::default());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_landmark_role_ignores_unrelated_siblings(
        before in prop::collection::vec(leaf_element(), 0..4),
        after in prop::collection::vec(leaf_element(), 0..4),
        target in prop::sample::select(&["aside", "header", "footer", "nav", "section", "form"][..]),
        wrapper in prop::sample::select(&["div", "article", "main"][..]),
    ) {
        let alone = format!(r#"<{wrapper}><{target} id="target">x</{target}></{wrapper}>"#);
        let crowded = format!(
            r#"<{wrapper}>{}<{target} id="target">x</{target}>{}</{wrapper}>"#,
            html(&before),
            html(&after),
        );

        let role = |markup: &str| {
            let page = Page::parse(markup);
            let node = page.element_by_id("target").expect("target element");
            resolve_landmark_role(&page, node)
        };
        prop_assert_eq!(role(&alone), role(&crowded));
    }
}
