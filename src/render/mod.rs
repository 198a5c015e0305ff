//! Texinfo renderer for function documentation.
//!
//! Each documented `<memberdef>` in a function section becomes one block:
//!
//! ```text
//! @deftypefun int smtp_open (
//!   mailer_t @var{mailer},
//!   int @var{flags})
//! Open an SMTP mailer.
//! An SMTP mailer must be opened before any messages can be sent.
//!
//! Parameters:
//! @itemize
//! @item @code{mailer} - the mailer created by smtp_create()
//! @item @code{flags} - the mailer flags
//! @end itemize
//! @end deftypefun
//! ```

pub mod params;
pub mod prose;
pub mod signature;

use std::io::Write;

use tracing::{debug, trace};

use crate::error::Result;
use crate::tree::Element;

/// `kind` of the `<sectiondef>` holding functions.
pub const FUNCTION_SECTION_KIND: &str = "func";

/// Counters from one pass over a document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub sections: usize,
    pub records: usize,
    pub emitted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct TexinfoRenderer {
    section_kind: String,
}

impl Default for TexinfoRenderer {
    fn default() -> Self {
        Self::new(FUNCTION_SECTION_KIND)
    }
}

impl TexinfoRenderer {
    pub fn new(section_kind: impl Into<String>) -> Self {
        Self {
            section_kind: section_kind.into(),
        }
    }

    /// Write a block for every documented function record under `root`.
    ///
    /// Output is written as it is produced; on error the stream holds
    /// whatever was written before the failing record.
    pub fn render<W: Write>(&self, out: &mut W, root: &Element) -> Result<RenderStats> {
        let mut stats = RenderStats::default();

        let sections = root
            .descendants_named("sectiondef")
            .into_iter()
            .filter(|s| s.attr("kind") == Some(self.section_kind.as_str()));

        for section in sections {
            stats.sections += 1;
            debug!(kind = %self.section_kind, "section {}", section.attr("id").unwrap_or(""));

            for record in section.children_named("memberdef") {
                stats.records += 1;
                if !is_documented(record) {
                    trace!(name = %record_name(record), "skipping undocumented member");
                    stats.skipped += 1;
                    continue;
                }
                render_record(out, record)?;
                stats.emitted += 1;
            }
        }

        Ok(stats)
    }
}

/// Whether the record carries a brief description paragraph. The extractor
/// emits records for undocumented symbols too; those have none.
pub fn is_documented(record: &Element) -> bool {
    record
        .child("briefdescription")
        .and_then(|brief| brief.child("para"))
        .is_some()
}

/// Write the full `@deftypefun` block for one record.
pub fn render_record<W: Write>(out: &mut W, record: &Element) -> Result<()> {
    signature::render_signature(out, record)?;

    if let Some(brief) = record
        .child("briefdescription")
        .and_then(|b| b.child("para"))
    {
        writeln!(out, "{}", prose::paragraph_text(brief))?;
    }

    let detailed = record.child("detaileddescription");
    if let Some(detailed) = detailed {
        for para in detailed.elements() {
            prose::render_paragraph(out, para)?;
        }
    }

    out.write_all(b"Parameters:\n")?;
    params::render_parameters(out, detailed)?;
    out.write_all(b"@end deftypefun\n\n")?;
    Ok(())
}

fn record_name(record: &Element) -> String {
    record
        .child("name")
        .map(|n| n.text().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse;

    const SMTP_OPEN: &str = r#"<doxygen version="1.2.15-20020430">
  <compounddef id="smtp_8c" kind="file">
    <sectiondef kind="func">
      <memberdef kind="function" id="smtp_8c_1a7">
        <type>int</type>
        <name>smtp_open</name>
        <param>
          <type>mailer_t</type>
          <defname>mailer</defname>
        </param>
        <param>
          <type>int</type>
          <defname>flags</defname>
        </param>
        <briefdescription>
<para>Open an SMTP mailer. </para>
        </briefdescription>
        <detaileddescription>
<para>An SMTP mailer must be opened before any messages can be sent. <parameterlist kind="param"><title>Parameters: </title><parametername>mailer</parametername><parameterdescription><para>the mailer created by smtp_create() </para>
</parameterdescription><parametername>flags</parametername><parameterdescription><para>the mailer flags </para>
</parameterdescription></parameterlist></para>
        </detaileddescription>
      </memberdef>
      <memberdef kind="function" id="smtp_8c_1a8">
        <type>static int</type>
        <name>smtp_helper</name>
        <briefdescription>
        </briefdescription>
        <detaileddescription>
        </detaileddescription>
      </memberdef>
    </sectiondef>
  </compounddef>
</doxygen>"#;

    fn render(xml: &str) -> (String, RenderStats) {
        let root = parse(xml).unwrap();
        let mut out = Vec::new();
        let stats = TexinfoRenderer::default().render(&mut out, &root).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn renders_documented_function() {
        let (out, stats) = render(SMTP_OPEN);
        assert_eq!(
            out,
            "@deftypefun int smtp_open (\n\
             \x20 mailer_t @var{mailer},\n\
             \x20 int @var{flags})\n\
             Open an SMTP mailer.\n\
             An SMTP mailer must be opened before any messages can be sent.\n\
             \n\
             Parameters:\n\
             @itemize\n\
             @item @code{mailer} - the mailer created by smtp_create()\n\
             @item @code{flags} - the mailer flags\n\
             @end itemize\n\
             @end deftypefun\n\
             \n"
        );
        assert_eq!(
            stats,
            RenderStats {
                sections: 1,
                records: 2,
                emitted: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn other_section_kinds_are_ignored() {
        let xml = SMTP_OPEN.replace(r#"sectiondef kind="func""#, r#"sectiondef kind="define""#);
        let (out, stats) = render(&xml);
        assert!(out.is_empty());
        assert_eq!(stats.sections, 0);
    }

    #[test]
    fn section_kind_is_configurable() {
        let xml = SMTP_OPEN.replace(r#"sectiondef kind="func""#, r#"sectiondef kind="public-func""#);
        let root = parse(&xml).unwrap();
        let mut out = Vec::new();
        let stats = TexinfoRenderer::new("public-func")
            .render(&mut out, &root)
            .unwrap();
        assert_eq!(stats.emitted, 1);
    }

    #[test]
    fn missing_brief_is_skipped() {
        let (out, stats) = render(
            "<doxygen><compounddef><sectiondef kind=\"func\">\
             <memberdef><type>int</type><name>a</name></memberdef>\
             <memberdef><type>int</type><name>b</name><briefdescription/></memberdef>\
             </sectiondef></compounddef></doxygen>",
        );
        assert!(out.is_empty());
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn one_block_per_documented_record() {
        let (out, stats) = render(
            "<doxygen><compounddef><sectiondef kind=\"func\">\
             <memberdef><name>a</name><briefdescription><para>A.</para></briefdescription></memberdef>\
             <memberdef><name>b</name></memberdef>\
             <memberdef><name>c</name><briefdescription><para>C.</para></briefdescription></memberdef>\
             </sectiondef></compounddef></doxygen>",
        );
        assert_eq!(out.matches("@deftypefun ").count(), 2);
        assert_eq!(out.matches("@end deftypefun\n").count(), 2);
        assert_eq!(stats.emitted, 2);
    }

    #[test]
    fn absent_detailed_description_still_closes_block() {
        let (out, _) = render(
            "<doxygen><compounddef><sectiondef kind=\"func\">\
             <memberdef><name>f</name><briefdescription><para>F.</para></briefdescription></memberdef>\
             </sectiondef></compounddef></doxygen>",
        );
        assert_eq!(
            out,
            "@deftypefun int f (\n  )\nF.\nParameters:\n@itemize\n@end itemize\n@end deftypefun\n\n"
        );
    }

    #[test]
    fn non_paragraph_in_detailed_description_is_fatal() {
        let root = parse(
            "<doxygen><compounddef><sectiondef kind=\"func\">\
             <memberdef><name>f</name><briefdescription><para>F.</para></briefdescription>\
             <detaileddescription><sect1/></detaileddescription></memberdef>\
             </sectiondef></compounddef></doxygen>",
        )
        .unwrap();
        let mut out = Vec::new();
        assert!(TexinfoRenderer::default().render(&mut out, &root).is_err());
    }
}
