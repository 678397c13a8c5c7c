//! Recursive flattening of a parsed YAML tree into dotted-path entries.

use serde_yaml::{Mapping, Value};
use tracing::debug;
use yamler_core::{Entry, YamlerError};

use crate::locator::KeyLocator;

/// Parse `text` and flatten it into leaf entries in document order.
///
/// Mappings are walked depth-first in insertion order. Scalars and nulls
/// under a key become one entry each. Sequences become one entry per element
/// with a `[i]` path segment; anything nested inside an element is kept as an
/// opaque value.
///
/// # Errors
///
/// Returns [`YamlerError::Parse`] if `text` is not a single valid YAML
/// document. No partial entry list is ever returned.
///
/// # Examples
///
/// ```
/// use yamler_flatten::flatten;
///
/// let entries = flatten("a:\n  b: 1\n  c: 2\n").unwrap();
/// let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
/// assert_eq!(paths, vec!["a.b", "a.c"]);
/// assert_eq!(entries[1].line_number, 2);
/// ```
pub fn flatten(text: &str) -> Result<Vec<Entry>, YamlerError> {
    let root = parse(text)?;
    Ok(flatten_value(text, &root))
}

/// Parse `text` into a YAML tree with merge keys applied.
///
/// An empty or whitespace-only document parses to [`Value::Null`].
///
/// # Errors
///
/// Returns [`YamlerError::Parse`] on malformed YAML or on input containing
/// more than one document.
pub fn parse(text: &str) -> Result<Value, YamlerError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    let mut root: Value = serde_yaml::from_str(text)?;
    root.apply_merge()?;
    Ok(root)
}

/// Flatten an already-parsed tree, using `text` to recover line numbers.
///
/// `text` must be the source `root` was parsed from, otherwise line numbers
/// fall back to 0.
///
/// # Examples
///
/// ```
/// use yamler_flatten::flatten::{flatten_value, parse};
///
/// let text = "a: [1, 2, 3]\n";
/// let root = parse(text).unwrap();
/// let entries = flatten_value(text, &root);
/// assert_eq!(entries.len(), 3);
/// assert_eq!(entries[2].path, "a.[2]");
/// ```
pub fn flatten_value(text: &str, root: &Value) -> Vec<Entry> {
    let mut flattener = Flattener {
        locator: KeyLocator::new(text),
        entries: Vec::new(),
        path: Vec::new(),
    };
    flattener.visit(root, 0);
    debug!(
        entries = flattener.entries.len(),
        lines = flattener.locator.line_count(),
        "flattened document"
    );
    flattener.entries
}

struct Flattener<'a> {
    locator: KeyLocator<'a>,
    entries: Vec<Entry>,
    path: Vec<String>,
}

impl Flattener<'_> {
    fn visit(&mut self, node: &Value, offset: usize) {
        match untag(node) {
            Value::Mapping(map) => self.visit_mapping(map, offset),
            Value::Sequence(items) => self.visit_sequence(items, offset),
            // A bare scalar or null only becomes an entry under a key.
            _ => {}
        }
    }

    fn visit_mapping(&mut self, map: &Mapping, offset: usize) {
        for (key, value) in map {
            let key = key_text(key);
            let line = match self.locator.locate(&key, offset) {
                Some(line) => line,
                None => {
                    debug!(key = %key, offset, "key not found in source, using parent line");
                    offset
                }
            };

            self.path.push(key.clone());
            match untag(value) {
                Value::Mapping(child) => self.visit_mapping(child, line),
                Value::Sequence(items) => self.visit_sequence(items, line),
                leaf => self.push_entry(key, leaf.clone(), line),
            }
            self.path.pop();
        }
    }

    fn visit_sequence(&mut self, items: &[Value], line: usize) {
        for (index, item) in items.iter().enumerate() {
            let key = format!("[{index}]");
            self.path.push(key.clone());
            self.push_entry(key, item.clone(), line);
            self.path.pop();
        }
    }

    fn push_entry(&mut self, key: String, value: Value, line: usize) {
        self.entries
            .push(Entry::new(self.path.join("."), key, value, line));
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Render a mapping key the way it appears as a path segment.
fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".into(),
        Value::Tagged(tagged) => key_text(&tagged.value),
        complex => serde_yaml::to_string(complex)
            .map(|yaml| yaml.trim_end().replace('\n', " "))
            .unwrap_or_default(),
    }
}
