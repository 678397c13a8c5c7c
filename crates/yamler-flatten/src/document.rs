use serde_yaml::Value;
use yamler_core::{ContextLine, Entry, YamlerError};

use crate::context::context_lines;
use crate::flatten::{flatten_value, parse};
use crate::locator::split_lines;

/// A fetched YAML document: its raw text and parsed tree.
///
/// Immutable once built. A new load replaces the whole document.
///
/// # Examples
///
/// ```
/// use yamler_flatten::YamlDocument;
///
/// let doc = YamlDocument::parse("image:\n  repository: nginx\n  tag: latest\n").unwrap();
/// assert_eq!(doc.line_count(), 4);
///
/// let entries = doc.entries();
/// assert_eq!(entries.len(), 2);
///
/// let window = doc.context(entries[1].line_number, 1);
/// assert!(window.iter().any(|l| l.is_target && l.content.contains("tag")));
/// ```
#[derive(Debug, Clone)]
pub struct YamlDocument {
    text: String,
    root: Value,
}

impl YamlDocument {
    /// Parse `text` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`YamlerError::Parse`] if `text` is not a single valid YAML document.
    pub fn parse(text: impl Into<String>) -> Result<Self, YamlerError> {
        let text = text.into();
        let root = parse(&text)?;
        Ok(Self { text, root })
    }

    /// Raw source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed tree.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Number of lines, counting a trailing empty line after the final newline.
    pub fn line_count(&self) -> usize {
        split_lines(&self.text).len()
    }

    /// Flatten the document into leaf entries in document order.
    pub fn entries(&self) -> Vec<Entry> {
        flatten_value(&self.text, &self.root)
    }

    /// Source lines within `window` lines of the 0-based `line_number`.
    pub fn context(&self, line_number: usize, window: usize) -> Vec<ContextLine> {
        context_lines(&self.text, line_number, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_keeps_nothing() {
        let result = YamlDocument::parse("a: [");
        assert!(matches!(result, Err(YamlerError::Parse(_))));
    }

    #[test]
    fn entries_match_free_function() {
        let text = "a:\n  b: 1\nc: [x, y]\n";
        let doc = YamlDocument::parse(text).unwrap();
        assert_eq!(doc.entries(), crate::flatten(text).unwrap());
        assert_eq!(doc.text(), text);
        assert!(doc.root().is_mapping());
    }

    #[test]
    fn context_uses_document_text() {
        let doc = YamlDocument::parse("a: 1\nb: 2\nc: 3").unwrap();
        let lines = doc.context(2, 4);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].content, "c: 3");
        assert!(lines[2].is_target);
    }
}
