use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// One leaf value (or one sequence element) of a flattened YAML document.
///
/// `path` is the dot-joined list of keys from the root, with sequence indices
/// rendered as `[i]`. `line_number` is 0-based and best-effort: when the key
/// cannot be found in the source text it is the nearest located ancestor's line.
///
/// # Examples
///
/// ```
/// use yamler_core::{Entry, Value};
///
/// let entry = Entry::new("webhook.replicas", "replicas", Value::from(2), 1);
/// assert_eq!(entry.path, "webhook.replicas");
/// assert_eq!(entry.value_preview(), "2");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Full dotted path from the document root.
    pub path: String,
    /// Raw value at this path. Mappings inside sequences stay unflattened.
    pub value: Value,
    /// 0-based source line where the key was located.
    pub line_number: usize,
    /// Last path segment.
    pub key: String,
}

impl Entry {
    /// Create a new entry.
    pub fn new(
        path: impl Into<String>,
        key: impl Into<String>,
        value: Value,
        line_number: usize,
    ) -> Self {
        Self {
            path: path.into(),
            value,
            line_number,
            key: key.into(),
        }
    }

    /// Render the value on a single line for listings.
    ///
    /// Scalars are shown bare, `null` as `null`, and nested values as
    /// compact JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use yamler_core::{Entry, Value};
    ///
    /// let entry = Entry::new("image.tag", "tag", Value::from("v1.2.0"), 3);
    /// assert_eq!(entry.value_preview(), "v1.2.0");
    ///
    /// let empty = Entry::new("image.digest", "digest", Value::Null, 4);
    /// assert_eq!(empty.value_preview(), "null");
    /// ```
    pub fn value_preview(&self) -> String {
        preview_value(&self.value)
    }
}

/// Single-line rendering of any YAML value, as used by [`Entry::value_preview`].
pub fn preview_value(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, preview_nested(&tagged.value)),
        nested => preview_nested(nested),
    }
}

fn preview_nested(value: &Value) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(_) => serde_yaml::to_string(value)
            .map(|yaml| yaml.trim_end().replace('\n', " "))
            .unwrap_or_default(),
    }
}

/// One line of a context window around a match.
///
/// # Examples
///
/// ```
/// use yamler_core::ContextLine;
///
/// let line = ContextLine {
///     line_number: 6,
///     content: "  replicas: 2".into(),
///     is_target: true,
/// };
/// assert!(line.is_target);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextLine {
    /// 1-based display line number.
    pub line_number: usize,
    /// Line text without the trailing newline.
    pub content: String,
    /// `true` for the matched line.
    pub is_target: bool,
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use yamler_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listings with context windows.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown with fenced YAML snippets.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
