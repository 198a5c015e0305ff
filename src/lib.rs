//! xml2texi — render Doxygen function documentation XML as Texinfo.
//!
//! [`tree`] loads the XML into an owned element tree and [`render`] walks
//! its function sections, writing one `@deftypefun` block per documented
//! function.

pub mod error;
pub mod render;
pub mod tree;

pub use error::{Error, Result};
pub use render::{RenderStats, TexinfoRenderer};
