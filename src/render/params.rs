//! `@itemize` block for the parameter annotations in a detailed description.
//!
//! The extractor writes each `<parameterlist>` as a flat run of
//! `<parametername>` and `<parameterdescription>` siblings with nothing
//! binding one to the other, so names and descriptions are paired by
//! position. Newer extractors wrap each pair in `<parameteritem>`; the
//! wrappers are walked through so both shapes pair the same way.

use std::io::{self, Write};

use tracing::debug;

use crate::error::Result;
use crate::render::prose::paragraph_text;
use crate::tree::Element;

/// Write the `@itemize` block for every parameter list under `detailed`.
///
/// The block is written even when there are no entries. Returns the number
/// of `@item` lines.
pub fn render_parameters<W: Write>(out: &mut W, detailed: Option<&Element>) -> Result<usize> {
    out.write_all(b"@itemize\n")?;

    let mut items = ItemWriter::new(out);
    if let Some(detailed) = detailed {
        for list in detailed.descendants_named("parameterlist") {
            for entry in list.elements() {
                items.visit(entry)?;
            }
        }
    }
    let count = items.finish()?;

    out.write_all(b"@end itemize\n")?;
    Ok(count)
}

/// Pairs names with the descriptions that follow them.
struct ItemWriter<'w, W: Write> {
    out: &'w mut W,
    /// An `@item` line has been started but not terminated.
    open: bool,
    count: usize,
}

impl<'w, W: Write> ItemWriter<'w, W> {
    fn new(out: &'w mut W) -> Self {
        Self {
            out,
            open: false,
            count: 0,
        }
    }

    fn visit(&mut self, el: &Element) -> io::Result<()> {
        match el.name.as_str() {
            "title" => {}
            "parametername" => {
                self.close_line()?;
                write!(self.out, "@item @code{{{}}}", el.text().trim())?;
                self.open = true;
                self.count += 1;
            }
            "parameterdescription" => {
                if !self.open {
                    debug!("parameter description without a name");
                    return Ok(());
                }
                match el.child("para") {
                    Some(para) => writeln!(self.out, " - {}", paragraph_text(para))?,
                    None => writeln!(self.out)?,
                }
                self.open = false;
            }
            "parameteritem" | "parameternamelist" => {
                for child in el.elements() {
                    self.visit(child)?;
                }
            }
            other => debug!(element = other, "ignoring element in parameter list"),
        }
        Ok(())
    }

    fn close_line(&mut self) -> io::Result<()> {
        if self.open {
            writeln!(self.out)?;
            self.open = false;
        }
        Ok(())
    }

    fn finish(mut self) -> io::Result<usize> {
        self.close_line()?;
        Ok(self.count)
    }
}
