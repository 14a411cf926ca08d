//! Byte decoding, path resolution and whitespace helpers.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// 1. Try UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, try the hint encoding (from `<meta charset>`)
/// 3. Fall back to Windows-1252, the HTML default for legacy pages
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding label from a `<meta charset="...">` declaration.
///
/// Only the first 1024 bytes are checked, matching the HTML prescan window.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let after = &prefix[pos + 8..];

    let (start, end) = match *after.first()? {
        q @ (b'"' | b'\'') => {
            let len = after[1..].iter().position(|&b| b == q)?;
            (1, 1 + len)
        }
        _ => {
            let len = after
                .iter()
                .position(|&b| b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b';' | b'>' | b'/'))
                .unwrap_or(after.len());
            (0, len)
        }
    };

    let label = std::str::from_utf8(&after[start..end]).ok()?.trim();
    (!label.is_empty()).then_some(label)
}

/// Resolve a relative reference against the path of the including file,
/// logically (no filesystem access). Returns `None` for references that
/// leave the local tree: absolute URLs and scheme-qualified references.
///
/// ```
/// use sightline::util::resolve_path;
///
/// assert_eq!(resolve_path("site/index.html", "frames/nav.html").as_deref(), Some("site/frames/nav.html"));
/// assert_eq!(resolve_path("site/a/index.html", "../b.html").as_deref(), Some("site/b.html"));
/// assert_eq!(resolve_path("index.html", "https://example.com/"), None);
/// ```
pub fn resolve_path(base: &str, rel: &str) -> Option<String> {
    use std::path::{Component, Path};

    let rel = rel.split(['#', '?']).next().unwrap_or_default();
    if rel.is_empty() || rel.contains("://") || rel.starts_with("//") || has_scheme(rel) {
        return None;
    }

    let rel_path = Path::new(rel);
    let mut stack: Vec<&str> = if rel_path.has_root() {
        Vec::new()
    } else {
        Path::new(base)
            .parent()
            .unwrap_or(Path::new(""))
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect()
    };

    for component in rel_path.components() {
        match component {
            Component::ParentDir => {
                stack.pop();
            }
            Component::Normal(c) => {
                if let Some(s) = c.to_str() {
                    stack.push(s);
                }
            }
            _ => {}
        }
    }

    let joined = stack.join("/");
    if Path::new(base).has_root() {
        Some(format!("/{joined}"))
    } else {
        Some(joined)
    }
}

/// `about:`, `data:`, `javascript:` and similar references.
fn has_scheme(rel: &str) -> bool {
    match rel.find(':') {
        Some(pos) => {
            let scheme = &rel[..pos];
            // A single letter is a Windows drive, not a scheme.
            scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Collapse runs of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_passthrough() {
        assert_eq!(decode_text("Grüße".as_bytes(), None), "Grüße");
    }

    #[test]
    fn test_decode_with_hint() {
        // "é" in ISO-8859-1
        let bytes = b"caf\xe9";
        assert_eq!(decode_text(bytes, Some("iso-8859-1")), "café");
        assert_eq!(decode_text(bytes, None), "café");
    }

    #[test]
    fn test_extract_meta_charset() {
        assert_eq!(
            extract_meta_charset(br#"<html><head><meta charset="shift_jis">"#),
            Some("shift_jis")
        );
        assert_eq!(
            extract_meta_charset(
                br#"<meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1">"#
            ),
            Some("iso-8859-1")
        );
        assert_eq!(extract_meta_charset(b"<p>no declaration</p>"), None);
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            resolve_path("site/index.html", "./frame.html").as_deref(),
            Some("site/frame.html")
        );
        assert_eq!(
            resolve_path("/srv/site/index.html", "inner/f.html#top").as_deref(),
            Some("/srv/site/inner/f.html")
        );
        assert_eq!(resolve_path("a.html", "about:blank"), None);
        assert_eq!(resolve_path("a.html", "data:text/html,<p>x</p>"), None);
        assert_eq!(resolve_path("a.html", "//cdn.example.com/x.html"), None);
        assert_eq!(resolve_path("a.html", ""), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
