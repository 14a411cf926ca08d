//! Element addresses that survive serialization and cross frame boundaries.
//!
//! A [`Locator`] is an XPath-like path inside one document, such as
//! `/html/body/div[2]/h1`. An [`Address`] is a list of locators, top
//! document first; every locator but the last names a frame element whose
//! embedded document the next locator is resolved in.

use std::fmt;
use std::str::FromStr;

use crate::dom::{ArenaDom, NodeId};
use crate::error::{Error, Result};
use crate::host::{DocumentId, Host, NodeRef};

/// Path of an element inside a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Locator(String);

impl Locator {
    /// Validate and wrap a path.
    pub fn parse(path: &str) -> Result<Self> {
        if steps(path).is_some() {
            Ok(Locator(path.to_string()))
        } else {
            Err(Error::InvalidAddress(path.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Find the element this path names in `dom`, if it still exists.
    pub fn resolve(&self, dom: &ArenaDom) -> Option<NodeId> {
        steps(&self.0)?
            .into_iter()
            .try_fold(dom.document(), |parent, (tag, position)| {
                dom.element_children(parent)
                    .filter(|&child| dom.has_tag(child, tag))
                    .nth(position.unwrap_or(1) - 1)
            })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Locator::parse(s)
    }
}

/// Split a path into `(tag, position)` steps. `None` for anything malformed.
fn steps(path: &str) -> Option<Vec<(&str, Option<usize>)>> {
    let rest = path.strip_prefix('/')?;
    if rest.is_empty() {
        return None;
    }
    rest.split('/')
        .map(|step| {
            let (tag, position) = match step.split_once('[') {
                Some((tag, index)) => {
                    let n: usize = index.strip_suffix(']')?.parse().ok()?;
                    (tag, Some(n).filter(|&n| n >= 1)?)
                }
                None => (step, 1),
            };
            // Any tag name the parser produces, which never contains these.
            let valid_tag = !tag.is_empty() && !tag.contains(['/', '[', ']']);
            valid_tag.then_some((tag, step.contains('[').then_some(position)))
        })
        .collect()
}

/// Where an element sits, possibly inside nested frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Address(Vec<Locator>);

impl Address {
    pub fn new(locators: Vec<Locator>) -> Self {
        Address(locators)
    }

    pub fn locators(&self) -> &[Locator] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This address as seen from a document that embeds it through the frame
    /// at `frame`.
    pub fn prefixed(&self, frame: &Address) -> Address {
        Address(frame.0.iter().chain(&self.0).cloned().collect())
    }
}

#[cfg(any(feature = "cli", feature = "wasm"))]
impl Address {
    /// Parse the JSON form, an array of locator strings.
    pub fn from_json(json: &str) -> Result<Self> {
        let invalid = || Error::InvalidAddress(json.to_string());
        let address: Address = serde_json::from_str(json).map_err(|_| invalid())?;
        if address.is_empty() || address.0.iter().any(|l| steps(&l.0).is_none()) {
            return Err(invalid());
        }
        Ok(address)
    }
}

impl From<Locator> for Address {
    fn from(locator: Locator) -> Self {
        Address(vec![locator])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, locator) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{locator}")?;
        }
        Ok(())
    }
}

/// Build the locator of an element within its own document.
///
/// A step gets a 1-based `[n]` only when its parent has several element
/// children with the same tag. Non-element nodes are located by their
/// nearest element ancestor.
///
/// ```
/// use sightline::address::address_of;
/// use sightline::dom::parse_html;
///
/// let dom = parse_html("<div></div><div><h1>Title</h1></div>");
/// let h1 = dom.find_by_tag("h1").unwrap();
/// assert_eq!(address_of(&dom, h1).as_str(), "/html/body/div[2]/h1");
/// ```
pub fn address_of(dom: &ArenaDom, element: NodeId) -> Locator {
    let mut steps: Vec<String> = std::iter::once(element)
        .chain(dom.ancestors(element))
        .filter_map(|id| {
            let tag = dom.tag(id)?;
            let Some(parent) = dom.parent(id) else {
                return Some(tag.to_string());
            };
            let mut same_tag = dom.element_children(parent).filter(|&c| dom.has_tag(c, tag));
            let position = same_tag.position(|c| c == id).map_or(1, |p| p + 1);
            // `position` consumed the iterator up to `id`; the remainder tells
            // whether any later sibling shares the tag.
            if position > 1 || same_tag.next().is_some() {
                Some(format!("{tag}[{position}]"))
            } else {
                Some(tag.to_string())
            }
        })
        .collect();
    steps.reverse();
    Locator(format!("/{}", steps.join("/")))
}

/// Append the locator of an element inside a frame to the frame's own
/// address.
pub fn compose_address(frame_address: &Address, inner: Locator) -> Address {
    let mut locators = frame_address.0.clone();
    locators.push(inner);
    Address(locators)
}

/// Follow an address from `top`, descending into each frame's embedded
/// document. `None` if any step no longer resolves, a frame is not
/// accessible, or the address is empty.
pub fn resolve_address<H: Host + ?Sized>(
    host: &H,
    top: DocumentId,
    address: &Address,
) -> Option<NodeRef> {
    let (first, rest) = address.0.split_first()?;
    let mut current = NodeRef::new(top, first.resolve(host.dom(top)?)?);
    for locator in rest {
        let document = host.embedded_document(current)?;
        current = NodeRef::new(document, locator.resolve(host.dom(document)?)?);
    }
    Some(current)
}
