//! Owned XML tree built from `quick-xml` pull events.
//!
//! Whitespace is compressed while loading: every run of XML whitespace in a
//! text run becomes a single space, and runs that are only whitespace are
//! dropped. Renderers can therefore concatenate text runs without producing
//! spurious blank segments.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::Encoding;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Error, Result};

/// How many levels of nested elements `text_fragments` unwraps.
///
/// Type declarations look like `<type><ref>mailer_t</ref> *</type>`; one
/// level covers the qualifier-plus-base-type shape, deeper markup is not
/// expected there.
pub const NESTED_TEXT_DEPTH: usize = 1;

/// A child of an element: either a nested element or a text run.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Value of the attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Element children, skipping text runs.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    /// All elements called `name` below this one (not including itself),
    /// depth-first in document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_descendants(self, name, &mut found);
        found
    }

    /// Concatenation of the direct text runs.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in &self.children {
            if let Node::Text(t) = child {
                text.push_str(t);
            }
        }
        text
    }

    /// Direct text runs plus the text runs of nested elements down to
    /// [`NESTED_TEXT_DEPTH`], in document order.
    pub fn text_fragments(&self) -> Vec<&str> {
        let mut fragments = Vec::new();
        collect_text(self, NESTED_TEXT_DEPTH, &mut fragments);
        fragments
    }
}

fn collect_descendants<'a>(el: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for child in el.elements() {
        if child.name == name {
            found.push(child);
        }
        collect_descendants(child, name, found);
    }
}

fn collect_text<'a>(el: &'a Element, depth: usize, fragments: &mut Vec<&'a str>) {
    for child in &el.children {
        match child {
            Node::Text(t) => fragments.push(t),
            Node::Element(e) if depth > 0 => collect_text(e, depth - 1, fragments),
            Node::Element(_) => {}
        }
    }
}

/// Read and parse the XML file at `path`.
pub fn load(path: &Path) -> Result<Element> {
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "loaded document");
    let content = decode_document(&bytes)
        .map_err(|e| Error::Malformed(format!("{}: {}", path.display(), e)))?;
    parse(&content)
}

/// Decode raw document bytes using the encoding named in the XML
/// declaration, UTF-8 when there is none. A byte order mark wins over both.
fn decode_document(bytes: &[u8]) -> std::result::Result<Cow<'_, str>, String> {
    let encoding = match declared_encoding(bytes) {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| format!("unsupported encoding {:?}", label))?,
        None => encoding_rs::UTF_8,
    };
    let (text, used, malformed) = encoding.decode(bytes);
    if malformed {
        return Err(format!("invalid {} byte sequence", used.name()));
    }
    Ok(text)
}

/// The `encoding` pseudo-attribute of a leading `<?xml ... ?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let rest = bytes.strip_prefix(b"<?xml")?;
    let end = rest.windows(2).position(|w| w == b"?>")?;
    let decl = String::from_utf8_lossy(&rest[..end]);

    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    let close = value.find(quote)?;
    Some(value[..close].to_string())
}

/// Parse XML text into its root element.
pub fn parse(content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut pending = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                flush_text(&mut pending, &mut stack)?;
                ensure_single_root(&root, &stack)?;
                stack.push(start_element(&e)?);
            }
            Event::Empty(e) => {
                flush_text(&mut pending, &mut stack)?;
                ensure_single_root(&root, &stack)?;
                let el = start_element(&e)?;
                close_element(el, &mut stack, &mut root);
            }
            Event::End(e) => {
                flush_text(&mut pending, &mut stack)?;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let el = stack
                    .pop()
                    .ok_or_else(|| Error::Malformed(format!("unexpected </{}>", name)))?;
                if el.name != name {
                    return Err(Error::Malformed(format!(
                        "expected </{}>, found </{}>",
                        el.name, name
                    )));
                }
                close_element(el, &mut stack, &mut root);
            }
            Event::Text(e) => pending.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => pending.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let resolved = resolve_entity(&entity)
                    .ok_or_else(|| Error::Malformed(format!("unknown entity &{};", entity)))?;
                pending.push_str(&resolved);
            }
            Event::Eof => break,
            // Comments, processing instructions, declaration and doctype.
            _ => {}
        }
    }

    flush_text(&mut pending, &mut stack)?;
    if let Some(open) = stack.last() {
        return Err(Error::Malformed(format!("unclosed <{}>", open.name)));
    }
    root.ok_or_else(|| Error::Malformed("no root element".to_string()))
}

fn start_element(e: &BytesStart) -> Result<Element> {
    let mut el = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| Error::Malformed(e.to_string()))?
            .into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn ensure_single_root(root: &Option<Element>, stack: &[Element]) -> Result<()> {
    if root.is_some() && stack.is_empty() {
        return Err(Error::Malformed("content after the root element".to_string()));
    }
    Ok(())
}

fn close_element(el: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => *root = Some(el),
    }
}

/// Compress the accumulated text and attach it to the open element.
fn flush_text(pending: &mut String, stack: &mut [Element]) -> Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    let text = compress_whitespace(pending);
    pending.clear();
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text));
            Ok(())
        }
        None => Err(Error::Malformed(format!(
            "text outside the root element: {:?}",
            text.trim()
        ))),
    }
}

/// Collapse each run of XML whitespace into a single space.
fn compress_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse().ok()?
    } else {
        return None;
    };
    char::from_u32(code).map(|c| c.to_string())
}
