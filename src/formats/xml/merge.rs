//! Tree reconstruction for the XML decoder.
//!
//! XML has no native list syntax, so the decoder rebuilds shape from two signals:
//!
//! - the [`ElementPath`] of the element whose text is being merged, and
//! - the [`ArrayOccurrences`] table, counting how often each dotted path was opened with the
//!   `type="array"` marker.
//!
//! [`merge`] walks the path from the document root, creating, promoting or demoting
//! containers as it goes, and stores the text at the leaf. It never backtracks: a container
//! that turns out to have the wrong shape is replaced in place by an empty one of the right
//! shape.
//!
//! Walk rules, per path component:
//!
//! - leaf, marked: the entry becomes (or stays) a sequence and the text is appended, unless
//!   the sequence already starts with a structured element
//! - leaf, unmarked: the text overwrites any scalar; structured entries are left alone
//! - inner, absent: create a sequence if marked, a mapping otherwise
//! - inner, sequence but unmarked: demoted to an empty mapping
//! - inner, mapping but marked: promoted to an empty sequence
//! - inner, scalar: the text is dropped
//! - inside a sequence: the occurrence count of the sequence's path is the 1-based slot being
//!   filled; missing slots are back-filled with empty mappings

use crate::value::{Mapping, Value};
use std::collections::HashMap;

/// Names of the currently open elements, root element excluded.
///
/// The dotted form (`a.b.c`) is kept up to date on every push and pop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ElementPath {
    names: Vec<String>,
    dotted: String,
}

impl ElementPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.names.is_empty() {
            self.dotted.push('.');
        }
        self.dotted.push_str(&name);
        self.names.push(name);
    }

    pub fn pop(&mut self) -> Option<String> {
        let name = self.names.pop()?;
        let cut = self.dotted.len() - name.len();
        // Also drops the separator, unless this was the only name
        self.dotted.truncate(cut.saturating_sub(1));
        Some(name)
    }

    /// Innermost open element.
    pub fn last(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn dotted(&self) -> &str {
        &self.dotted
    }
}

/// Per-document count of array-marked openings, keyed by dotted element path.
///
/// Counts only ever grow during a decode pass.
#[derive(Debug, Default, Clone)]
pub struct ArrayOccurrences {
    counts: HashMap<String, usize>,
}

impl ArrayOccurrences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more marked opening at `dotted`, returning the new count.
    pub fn mark(&mut self, dotted: &str) -> usize {
        let count = self.counts.entry(dotted.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, dotted: &str) -> usize {
        self.counts.get(dotted).copied().unwrap_or(0)
    }

    pub fn is_marked(&self, dotted: &str) -> bool {
        self.count(dotted) > 0
    }
}

enum Cursor<'a> {
    Map(&'a mut Mapping),
    Seq(&'a mut Vec<Value>),
}

/// Store `text`, observed inside the element at `path`, into `root`.
pub fn merge(root: &mut Mapping, text: String, path: &[String], arrays: &ArrayOccurrences) {
    let mut cursor = Cursor::Map(root);
    // Index of the path component the cursor is about to handle
    let mut depth = 0;
    // Dotted form of path[..depth]
    let mut prefix = String::new();

    while depth < path.len() {
        cursor = match cursor {
            Cursor::Map(map) => {
                let key = &path[depth];
                if depth > 0 {
                    prefix.push('.');
                }
                prefix.push_str(key);
                let marked = arrays.is_marked(&prefix);
                depth += 1;
                if depth == path.len() {
                    merge_leaf(map, key, text, marked);
                    return;
                }
                match descend(map, key, marked) {
                    Some(next) => next,
                    None => {
                        tracing::trace!("dropping text under scalar <{key}>");
                        return;
                    }
                }
            }
            Cursor::Seq(items) => {
                let slot = arrays.count(&prefix);
                if slot == 0 {
                    return;
                }
                if items.len() < slot {
                    items.resize_with(slot, || Value::Mapping(Mapping::new()));
                }
                let target = &mut items[slot - 1];
                if !matches!(&*target, Value::Mapping(_)) {
                    *target = Value::Mapping(Mapping::new());
                }
                match target {
                    Value::Mapping(map) => Cursor::Map(map),
                    _ => return,
                }
            }
        };
    }
}

fn empty_container(marked: bool) -> Value {
    if marked {
        Value::Sequence(Vec::new())
    } else {
        Value::Mapping(Mapping::new())
    }
}

/// Move one level down at a non-leaf component, fixing the entry's shape first.
fn descend<'a>(map: &'a mut Mapping, key: &str, marked: bool) -> Option<Cursor<'a>> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| empty_container(marked));
    let reshape = match &*slot {
        Value::Sequence(_) => !marked,
        Value::Mapping(_) => marked,
        _ => false,
    };
    if reshape {
        *slot = empty_container(marked);
    }
    match slot {
        Value::Sequence(items) => Some(Cursor::Seq(items)),
        Value::Mapping(map) => Some(Cursor::Map(map)),
        _ => None,
    }
}

fn merge_leaf(map: &mut Mapping, key: &str, text: String, marked: bool) {
    if marked {
        let slot = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if !matches!(&*slot, Value::Sequence(_)) {
            *slot = Value::Sequence(Vec::new());
        }
        if let Value::Sequence(items) = slot {
            if items.first().is_some_and(Value::is_structured) {
                tracing::trace!("dropping text for <{key}>, list already holds structures");
                return;
            }
            items.push(Value::String(text));
        }
        return;
    }

    if map.get(key).is_some_and(Value::is_structured) {
        tracing::trace!("dropping text for <{key}>, already structured");
        return;
    }
    map.insert(key.to_string(), Value::String(text));
}
