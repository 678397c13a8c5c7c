//! Best-effort mapping from a mapping key back to its source line.
//!
//! The parser does not report source positions, so keys are found by
//! scanning the text: the first non-blank line at or after the search offset
//! whose trimmed content starts with `"<key>:"` wins. Callers pass the line of
//! the parent key as the offset, which keeps nested lookups moving forward
//! through the document.
//!
//! The heuristic can pick the wrong line when the same key text appears
//! earlier at a shallower level, or when a value contains `"<key>:"`.

/// Split `text` into lines the same way everywhere in the pipeline.
///
/// Splits on `\n` only, so a trailing newline yields a final empty line and
/// line indices agree between the locator and the context extractor. A
/// trailing `\r` is dropped from each line.
///
/// # Examples
///
/// ```
/// use yamler_flatten::locator::split_lines;
///
/// assert_eq!(split_lines("a: 1\r\nb: 2\n"), vec!["a: 1", "b: 2", ""]);
/// assert_eq!(split_lines(""), vec![""]);
/// ```
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Forward-scanning key finder over the lines of a document.
///
/// # Examples
///
/// ```
/// use yamler_flatten::locator::KeyLocator;
///
/// let text = "webhook:\n  replicas: 2\nservice:\n  replicas: 3\n";
/// let locator = KeyLocator::new(text);
/// assert_eq!(locator.locate("replicas", 0), Some(1));
/// assert_eq!(locator.locate("replicas", 2), Some(3));
/// assert_eq!(locator.locate("missing", 0), None);
/// ```
#[derive(Debug, Clone)]
pub struct KeyLocator<'a> {
    lines: Vec<&'a str>,
}

impl<'a> KeyLocator<'a> {
    /// Build a locator over `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: split_lines(text),
        }
    }

    /// Number of lines in the source text.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Find the first line at or after `from` that introduces `key`.
    ///
    /// Returns `None` when the key is not found before the end of the text.
    pub fn locate(&self, key: &str, from: usize) -> Option<usize> {
        let needle = format!("{key}:");
        self.lines
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, line)| {
                let trimmed = line.trim_start();
                !trimmed.is_empty() && trimmed.starts_with(&needle)
            })
            .map(|(index, _)| index)
    }
}
