//! `@deftypefun` header built from a `<memberdef>`.

use std::io::Write;

use crate::error::{Error, Result};
use crate::tree::Element;

/// Return type used when the declaration has none (macros, K&R functions).
pub const DEFAULT_RETURN_TYPE: &str = "int";

/// Write `@deftypefun <ret> <name> (` and the parameter lines, closed by `)`.
///
/// ```text
/// @deftypefun int smtp_open (
///   mailer_t @var{mailer},
///   int @var{flags})
/// ```
pub fn render_signature<W: Write>(out: &mut W, record: &Element) -> Result<()> {
    let name = record.child("name").ok_or_else(|| Error::MissingElement {
        parent: record.name.clone(),
        name: "name".to_string(),
    })?;

    write!(
        out,
        "@deftypefun {} {} (\n  ",
        return_type(record),
        name.text().trim()
    )?;

    for (i, param) in record.children_named("param").enumerate() {
        if i > 0 {
            out.write_all(b",\n  ")?;
        }
        if let Some(ty) = param.child("type") {
            for fragment in type_fragments(ty) {
                write!(out, "{} ", fragment)?;
            }
        }
        if let Some(name) = param_name(param) {
            write!(out, "@var{{{}}}", name)?;
        }
    }

    out.write_all(b")\n")?;
    Ok(())
}

/// The record's return type, or [`DEFAULT_RETURN_TYPE`] when it is absent or
/// has no text.
pub fn return_type(record: &Element) -> String {
    let fragments: Vec<&str> = record
        .child("type")
        .map(|ty| type_fragments(ty).collect())
        .unwrap_or_default();
    if fragments.is_empty() {
        DEFAULT_RETURN_TYPE.to_string()
    } else {
        fragments.join(" ")
    }
}

/// Non-empty text pieces of a `<type>`, including those of a wrapped `<ref>`.
///
/// Each piece is trimmed and empty pieces are dropped, so
/// `<ref>mailer_t</ref> *` yields `mailer_t` and `*` and renders as
/// `mailer_t * `, not the doubled space of writing ` *` verbatim.
fn type_fragments(ty: &Element) -> impl Iterator<Item = &str> {
    ty.text_fragments()
        .into_iter()
        .map(str::trim)
        .filter(|f| !f.is_empty())
}

/// Declared parameter name: `<declname>` if present, else `<defname>`.
pub fn param_name(param: &Element) -> Option<String> {
    param
        .child("declname")
        .or_else(|| param.child("defname"))
        .map(|n| n.text().trim().to_string())
}
