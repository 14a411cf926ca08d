//! Error types for sightline operations.
//!
//! The analysis passes themselves never fail; errors only arise at the edges
//! (loading pages, parsing caller-supplied selectors and addresses).

use thiserror::Error;

/// Errors that can occur while loading pages or parsing caller input.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),

    #[error("node is not an iframe or frame element")]
    NotAFrame,

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, Error>;
