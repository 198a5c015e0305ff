//! Error types for loading and rendering documentation XML.

use thiserror::Error;

/// Fatal errors. Anything recoverable is reported inline or logged instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("<{parent}> has no <{name}> element")]
    MissingElement { parent: String, name: String },

    #[error("{0} is not a paragraph")]
    NotAParagraph(String),
}

pub type Result<T> = std::result::Result<T, Error>;
