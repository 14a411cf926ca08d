//! # sightline
//!
//! Accessibility analysis of rendered HTML pages: the heading and landmark
//! outline a screen reader would navigate, and the text it would speak.
//!
//! ## Features
//!
//! - Heading and ARIA landmark outline with landmark nesting
//! - Cross-frame traversal with serializable element addresses
//! - Hidden-content filtering (`display`, `visibility`, `hidden`, `aria-hidden`)
//! - Spoken-text extraction for any element
//!
//! ## Quick Start
//!
//! ```
//! use sightline::{Page, OutlineOptions, build_outline, accessible_text, resolve_address};
//!
//! let page = Page::parse(
//!     r#"<header>My site</header><main><h1>Welcome</h1><p>Hello <em>there</em>.</p></main>"#,
//! );
//!
//! let toc = build_outline(&page, page.top(), &OutlineOptions::default());
//! assert_eq!(toc.to_string(), "[banner]\n[main]\n  h1 Welcome\n");
//!
//! let main = toc.get(1).unwrap();
//! let node = resolve_address(&page, page.top(), main.address()).unwrap();
//! assert_eq!(accessible_text(&page, node), "Welcome Hello there.");
//! ```
//!
//! ## Hosts
//!
//! The analysis functions read documents through the [`Host`] trait. [`Page`]
//! is the built-in host for parsed or on-disk HTML; embedders with their own
//! DOM, style engine or accessibility tree implement [`Host`] instead.

pub mod accname;
pub mod address;
pub mod dom;
pub mod error;
pub mod host;
pub mod outline;
pub mod page;
pub mod roles;
pub mod speech;
pub mod style;
pub mod util;
pub mod visibility;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use address::{Address, Locator, address_of, compose_address, resolve_address};
pub use dom::{ArenaDom, ElementSelector, NodeId};
pub use error::{Error, Result};
pub use host::{DocumentId, Host, NodeRef};
pub use outline::{
    HeadingEntry, LandmarkEntry, OutlineEntry, OutlineOptions, TableOfContents, build_outline,
    get_headings, get_landmarks,
};
pub use page::{LoadOptions, Page};
pub use roles::{ElementKind, LandmarkRole, classify, resolve_landmark_role};
pub use speech::accessible_text;
pub use visibility::is_perceivable;
