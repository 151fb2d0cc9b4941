//! XML parsing
//!
//! Consumes the quick-xml token stream in a single pass and rebuilds a mapping from it.
//! Token arrival is push-driven, so nesting is tracked with an explicit [`ElementPath`]
//! stack instead of recursion:
//!
//! - start: push the name (the document element itself is not pushed), bump the
//!   [`ArrayOccurrences`] entry when the element carries `type="array"`, flag the parent as
//!   having a child, drop buffered text
//! - text / CDATA: append to the text buffer
//! - end: check it closes the innermost open element, merge buffered text at the current
//!   path unless the element had children, pop
//!
//! Only leaf elements carry values, so indentation between children never reaches the
//! tree while whitespace-only leaf text does. Decoding stops when the document element
//! closes. Nesting deeper than [`MAX_DEPTH`] elements below the document element is
//! rejected.

use super::merge::{merge, ArrayOccurrences, ElementPath};
use super::NAME;
use crate::error::{FormatError, Result};
use crate::value::Mapping;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

/// Deepest element nesting accepted below the document element.
pub const MAX_DEPTH: usize = 128;

/// Parse a complete XML document into a mapping.
///
/// Input without any element decodes to an empty mapping.
pub fn parse_document<R: BufRead>(input: R) -> Result<Mapping> {
    let mut reader = Reader::from_reader(input);
    reader.expand_empty_elements(true);
    // Mismatched end tags are reported by the decoder itself
    reader.check_end_names(false);

    let mut state = DecodeState::default();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| FormatError::codec(NAME, e))?;
        match event {
            Event::Start(start) => {
                let name = element_name(start.name().local_name().as_ref());
                let marked = has_array_marker(&start)?;
                state.open(name, marked)?;
            }
            Event::End(end) => {
                let name = element_name(end.name().local_name().as_ref());
                if state.close(&name)? {
                    break;
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| FormatError::codec(NAME, e))?;
                state.text(&text);
            }
            Event::CData(cdata) => {
                state.text(&String::from_utf8_lossy(&cdata));
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no data
            _ => {}
        }
        buf.clear();
    }

    state.finish()
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn has_array_marker(start: &BytesStart<'_>) -> Result<bool> {
    let (marker_key, marker_value) = super::ARRAY_MARKER;
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FormatError::codec(NAME, e))?;
        if attr.key.as_ref() != marker_key.as_bytes() {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| FormatError::codec(NAME, e))?;
        if value == marker_value {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Everything carried across one decode pass.
#[derive(Debug, Default)]
struct DecodeState {
    /// Name of the document element once it has been opened.
    root: Option<String>,
    root_closed: bool,
    path: ElementPath,
    /// Per open element in `path`: whether a child element has been opened inside it.
    has_child: Vec<bool>,
    arrays: ArrayOccurrences,
    text: Option<String>,
    document: Mapping,
}

impl DecodeState {
    fn open(&mut self, name: String, marked: bool) -> Result<()> {
        self.text = None;
        if self.root.is_none() {
            tracing::trace!("document element <{name}>");
            self.root = Some(name);
            return Ok(());
        }
        if self.has_child.len() >= MAX_DEPTH {
            return Err(FormatError::StructuralDecode(format!(
                "<{name}> exceeds the maximum nesting depth of {MAX_DEPTH}"
            )));
        }
        if let Some(parent) = self.has_child.last_mut() {
            *parent = true;
        }
        self.path.push(name);
        self.has_child.push(false);
        if marked {
            let count = self.arrays.mark(self.path.dotted());
            tracing::trace!("array element {} #{count}", self.path.dotted());
        }
        Ok(())
    }

    /// Returns true once the document element has been closed.
    fn close(&mut self, name: &str) -> Result<bool> {
        let Some(current) = self.path.last() else {
            if self.root.as_deref() == Some(name) {
                self.root_closed = true;
                return Ok(true);
            }
            return Err(FormatError::StructuralDecode(format!(
                "unexpected </{name}>, expected a start element"
            )));
        };
        if current != name {
            return Err(FormatError::StructuralDecode(format!(
                "expected </{current}>, found </{name}>"
            )));
        }

        let text = self.text.take();
        let had_child = self.has_child.pop().unwrap_or(false);
        if let (Some(text), false) = (text, had_child) {
            merge(&mut self.document, text, self.path.as_slice(), &self.arrays);
        }
        self.path.pop();
        Ok(false)
    }

    fn text(&mut self, chunk: &str) {
        if self.root.is_none() {
            return;
        }
        self.text.get_or_insert_with(String::new).push_str(chunk);
    }

    fn finish(self) -> Result<Mapping> {
        if let Some(open) = self.path.last() {
            return Err(FormatError::StructuralDecode(format!(
                "unexpected end of document, <{open}> is still open"
            )));
        }
        if let (Some(root), false) = (&self.root, self.root_closed) {
            return Err(FormatError::StructuralDecode(format!(
                "unexpected end of document, <{root}> is still open"
            )));
        }
        Ok(self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn parse(input: &str) -> Result<Mapping> {
        parse_document(input.as_bytes())
    }

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_plain_fields() {
        let doc = parse("<root><a>1</a><b><c>x</c></b></root>").unwrap();
        assert_eq!(doc["a"], s("1"));
        assert_eq!(doc["b"].as_mapping().unwrap()["c"], s("x"));
    }

    #[test]
    fn test_array_of_scalars() {
        let doc =
            parse(r#"<root><item type="array">a</item><item type="array">b</item></root>"#)
                .unwrap();
        assert_eq!(doc["item"], Value::Sequence(vec![s("a"), s("b")]));
    }

    #[test]
    fn test_single_marked_element_is_still_a_list() {
        let doc = parse(r#"<root><item type="array">only</item></root>"#).unwrap();
        assert_eq!(doc["item"], Value::Sequence(vec![s("only")]));
    }

    #[test]
    fn test_array_of_mappings() {
        let doc = parse(
            r#"<root><row type="array"><id>1</id></row><row type="array"><id>2</id></row></root>"#,
        )
        .unwrap();
        let rows = doc["row"].as_sequence().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].as_mapping().unwrap()["id"], s("1"));
        assert_eq!(rows[1].as_mapping().unwrap()["id"], s("2"));
    }

    #[test]
    fn test_indented_document() {
        let doc = parse(
            "<xml>\n    <a>1</a>\n    <b>\n        <c>2</c>\n    </b>\n</xml>\n",
        )
        .unwrap();
        assert_eq!(doc["a"], s("1"));
        assert_eq!(doc["b"].as_mapping().unwrap()["c"], s("2"));
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc = parse("<r><a>x &amp; y</a><b><![CDATA[<raw>]]></b></r>").unwrap();
        assert_eq!(doc["a"], s("x & y"));
        assert_eq!(doc["b"], s("<raw>"));
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let doc = parse(r#"<r><a id="7" type="list">v</a></r>"#).unwrap();
        assert_eq!(doc["a"], s("v"));
    }

    #[test]
    fn test_empty_elements_are_absent() {
        let doc = parse("<r><a/><b></b><c>x</c></r>").unwrap();
        assert!(!doc.contains_key("a"));
        assert!(!doc.contains_key("b"));
        assert_eq!(doc["c"], s("x"));
    }

    #[test]
    fn test_text_does_not_leak_into_next_sibling() {
        let doc = parse("<r><a>lead<b></b></a></r>").unwrap();
        assert!(!doc.contains_key("a"));
    }

    #[test]
    fn test_declaration_and_comments_skipped() {
        let doc = parse("<?xml version=\"1.0\"?><!-- c --><r><a>1</a></r>").unwrap();
        assert_eq!(doc["a"], s("1"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_end_element() {
        let err = parse("<r><a>1</b></r>").unwrap_err();
        assert!(matches!(err, FormatError::StructuralDecode(_)));
        assert!(err.to_string().contains("expected </a>, found </b>"));
    }

    #[test]
    fn test_end_without_start() {
        let err = parse("</a>").unwrap_err();
        assert!(matches!(err, FormatError::StructuralDecode(_)));
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse("<r><a>1</a>").unwrap_err();
        assert!(matches!(err, FormatError::StructuralDecode(_)));
    }

    #[test]
    fn test_whitespace_only_leaf_text_is_kept() {
        let doc = parse("<xml>\n    <a> </a>\n    <b>x</b>\n</xml>").unwrap();
        assert_eq!(doc["a"], s(" "));
        assert_eq!(doc["b"], s("x"));
    }

    #[test]
    fn test_indentation_between_children_is_not_a_value() {
        let doc = parse("<r>\n  <a>\n    <b>1</b>\n  </a>\n  <c>\n  </c>\n</r>").unwrap();
        assert_eq!(doc["a"].as_mapping().unwrap().len(), 1);
        assert_eq!(doc["a"].as_mapping().unwrap()["b"], s("1"));
        assert_eq!(doc["c"], s("\n  "));
    }

    fn nested(depth: usize) -> String {
        format!("<r>{}x{}</r>", "<a>".repeat(depth), "</a>".repeat(depth))
    }

    #[test]
    fn test_nesting_up_to_max_depth() {
        let doc = parse(&nested(MAX_DEPTH)).unwrap();
        let mut value = &doc["a"];
        for _ in 1..MAX_DEPTH {
            value = &value.as_mapping().unwrap()["a"];
        }
        assert_eq!(*value, s("x"));
    }

    #[test]
    fn test_nesting_beyond_max_depth_is_rejected() {
        let err = parse(&nested(5000)).unwrap_err();
        assert!(matches!(err, FormatError::StructuralDecode(_)));
        assert!(err.to_string().contains("maximum nesting depth"));
    }

    #[test]
    fn test_nested_array_of_mappings_back_fills_by_global_count() {
        // Occurrences of row.cell are counted across rows, so the second row's list
        // starts at slot 3 and gets two placeholders
        let doc = parse(concat!(
            "<r>",
            r#"<row type="array"><cell type="array"><v>1</v></cell><cell type="array"><v>2</v></cell></row>"#,
            r#"<row type="array"><cell type="array"><v>3</v></cell></row>"#,
            "</r>",
        ))
        .unwrap();

        let cell = |v: &str| {
            let mut map = Mapping::new();
            map.insert("v".into(), s(v));
            Value::Mapping(map)
        };
        let row = |cells: Vec<Value>| {
            let mut map = Mapping::new();
            map.insert("cell".into(), Value::Sequence(cells));
            Value::Mapping(map)
        };
        let empty = Value::Mapping(Mapping::new());

        assert_eq!(
            doc["row"],
            Value::Sequence(vec![
                row(vec![cell("1"), cell("2")]),
                row(vec![empty.clone(), empty, cell("3")]),
            ])
        );
    }

    #[test]
    fn test_element_named_like_root() {
        let doc = parse("<r><r>inner</r><x>1</x></r>").unwrap();
        assert_eq!(doc["r"], s("inner"));
        assert_eq!(doc["x"], s("1"));
    }
}
