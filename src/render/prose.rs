//! Paragraph rendering for brief and detailed descriptions.

use std::io::Write;

use tracing::warn;

use crate::error::{Error, Result};
use crate::tree::{Element, Node};

/// Prefix of the inline diagnostic written for elements the renderer does
/// not know how to express.
pub const UNKNOWN_ELEMENT_MARKER: &str = "!! Unknown element type: ";

/// Write the text runs of a `<para>` followed by a blank line.
///
/// `<parameterlist>` children are skipped; the parameter block renders them.
/// Any other inline element is replaced by an [`UNKNOWN_ELEMENT_MARKER`]
/// line so the gap stays visible in the output.
pub fn render_paragraph<W: Write>(out: &mut W, para: &Element) -> Result<()> {
    if para.name != "para" {
        return Err(Error::NotAParagraph(format!("<{}>", para.name)));
    }

    let last_text = para
        .children
        .iter()
        .rposition(|c| matches!(c, Node::Text(_)));
    let mut at_start = true;

    for (i, child) in para.children.iter().enumerate() {
        match child {
            Node::Text(text) => {
                let mut text = text.as_str();
                if at_start {
                    text = text.trim_start();
                }
                if Some(i) == last_text {
                    text = text.trim_end();
                }
                out.write_all(text.as_bytes())?;
                at_start = false;
            }
            Node::Element(el) if el.name == "parameterlist" => {}
            Node::Element(el) => {
                warn!(element = %el.name, "unknown element in paragraph");
                write!(out, "\n{}{}\n", UNKNOWN_ELEMENT_MARKER, el.name)?;
                at_start = true;
            }
        }
    }

    out.write_all(b"\n\n")?;
    Ok(())
}

/// Single-line text of a paragraph: its direct text runs, trimmed.
pub fn paragraph_text(para: &Element) -> String {
    para.text().trim().to_string()
}
