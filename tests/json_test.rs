//! JSON shape of outlines and addresses.
#![cfg(feature = "cli")]

use sightline::{Address, Error, OutlineOptions, Page, TableOfContents, build_outline, resolve_address};

#[test]
fn test_outline_json_shape() {
    let page = Page::parse(r#"<main aria-label="Body"><h2>Intro</h2></main>"#);
    let toc = build_outline(&page, page.top(), &OutlineOptions::default());
    let json = serde_json::to_value(&toc).unwrap();

    assert_eq!(json["top_level_indices"], serde_json::json!([0]));
    let main = &json["entries"][0];
    assert_eq!(main["type"], "landmark");
    assert_eq!(main["role"], "main");
    assert_eq!(main["label"], "Body");
    assert_eq!(main["address"], serde_json::json!(["/html/body/main"]));
    assert!(main.get("parent_landmark_index").is_none());

    let heading = &json["entries"][1];
    assert_eq!(heading["type"], "heading");
    assert_eq!(heading["level"], 2);
    assert_eq!(heading["parent_landmark_index"], 0);
}

#[test]
fn test_outline_survives_a_json_round_trip() {
    let page = Page::parse(
        r#"<footer>f</footer><nav><h1>x</h1></nav><iframe srcdoc="<h2>y</h2>"></iframe>"#,
    );
    let toc = build_outline(&page, page.top(), &OutlineOptions::default());
    let json = serde_json::to_string(&toc).unwrap();
    let back: TableOfContents = serde_json::from_str(&json).unwrap();
    assert_eq!(back, toc);

    // Addresses read back from JSON still resolve.
    let last = back.get(back.len() - 1).unwrap();
    assert!(resolve_address(&page, page.top(), last.address()).is_some());
}

#[test]
fn test_address_from_json() {
    let address = Address::from_json(r#"["/html/body/iframe[2]", "/html/body/h1"]"#).unwrap();
    assert_eq!(address.len(), 2);

    for bad in ["[]", "{}", r#"["html/body"]"#, r#"["/html/body[0]"]"#, "not json"] {
        assert!(
            matches!(Address::from_json(bad), Err(Error::InvalidAddress(_))),
            "{bad} should be rejected"
        );
    }
}
