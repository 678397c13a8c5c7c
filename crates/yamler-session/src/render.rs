use std::fmt::Write;

use serde::Serialize;
use yamler_core::{preview_value, ContextLine, Entry, OutputFormat, Value, YamlerError};

use crate::session::Session;

const BOLD: &str = "\x1b[1m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// One matched entry with its surrounding source lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBlock<'a> {
    pub path: &'a str,
    pub key: &'a str,
    pub value: &'a Value,
    pub line_number: usize,
    pub score: f64,
    pub context_lines: Vec<ContextLine>,
}

/// Everything needed to print the outcome of one query.
///
/// # Examples
///
/// ```
/// use yamler_core::{OutputFormat, YamlerConfig};
/// use yamler_session::{SearchReport, Session};
///
/// let mut session = Session::new(YamlerConfig::default());
/// let ticket = session.begin_load("https://example.com/values.yaml");
/// session.complete_load(ticket, Ok("service:\n  port: 443\n".into()));
/// session.search("port");
///
/// let report = SearchReport::from_session(&session);
/// assert_eq!(report.results.len(), 1);
/// let text = report.render(OutputFormat::Text, false).unwrap();
/// assert!(text.contains("service.port"));
/// assert!(text.contains(">    2 |   port: 443"));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport<'a> {
    pub query: &'a str,
    pub total_entries: usize,
    pub results: Vec<ResultBlock<'a>>,
    /// Set when a non-blank query matched nothing in a non-empty document.
    pub no_results: bool,
}

impl<'a> SearchReport<'a> {
    /// Collect the current results of `session` with their context windows.
    pub fn from_session(session: &'a Session) -> Self {
        let results = session
            .scored_results()
            .into_iter()
            .map(|(entry, score)| ResultBlock {
                path: &entry.path,
                key: &entry.key,
                value: &entry.value,
                line_number: entry.line_number,
                score,
                context_lines: session.context_for(entry),
            })
            .collect();
        Self {
            query: session.search_term(),
            total_entries: session.entries().len(),
            results,
            no_results: session.no_results(),
        }
    }

    /// Render in the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`YamlerError::Serialization`] if JSON output fails.
    pub fn render(&self, format: OutputFormat, use_color: bool) -> Result<String, YamlerError> {
        match format {
            OutputFormat::Text => Ok(self.to_text(use_color)),
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::Json => self.to_json(),
        }
    }

    /// Human-readable listing with a gutter and a `>` on the matched line.
    pub fn to_text(&self, use_color: bool) -> String {
        if self.results.is_empty() {
            return self.empty_line();
        }

        let mut out = String::new();
        for (i, block) in self.results.iter().enumerate() {
            let preview = preview_value(block.value);
            if use_color {
                let _ = writeln!(
                    out,
                    "{BOLD}{}.{RESET} {CYAN}{}{RESET} {DIM}(line {}){RESET} = {preview}",
                    i + 1,
                    block.path,
                    block.line_number + 1,
                );
            } else {
                let _ = writeln!(
                    out,
                    "{}. {} (line {}) = {preview}",
                    i + 1,
                    block.path,
                    block.line_number + 1,
                );
            }
            write_context(&mut out, &block.context_lines, use_color);
            out.push('\n');
        }
        out
    }

    /// GitHub-flavored Markdown with one fenced block per match.
    pub fn to_markdown(&self) -> String {
        if self.results.is_empty() {
            return self.empty_line();
        }

        let mut out = String::new();
        let _ = writeln!(out, "# Results for `{}`\n", self.query);
        for (i, block) in self.results.iter().enumerate() {
            let _ = writeln!(
                out,
                "## {}. `{}` (line {})\n",
                i + 1,
                block.path,
                block.line_number + 1
            );
            let _ = writeln!(out, "```yaml");
            for line in &block.context_lines {
                let _ = writeln!(out, "{}", line.content);
            }
            let _ = writeln!(out, "```\n");
        }
        out
    }

    /// Pretty JSON with camelCase keys.
    ///
    /// # Errors
    ///
    /// Returns [`YamlerError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, YamlerError> {
        serde_json::to_string_pretty(self).map_err(YamlerError::from)
    }

    fn empty_line(&self) -> String {
        if self.no_results {
            format!("No results found for \"{}\"\n", self.query)
        } else if self.total_entries == 0 {
            "No entries to search.\n".into()
        } else {
            String::new()
        }
    }
}

/// Flat listing of every entry in a loaded document.
///
/// # Examples
///
/// ```
/// use yamler_core::{Entry, OutputFormat, Value};
/// use yamler_session::EntryListing;
///
/// let entries = vec![Entry::new("image.tag", "tag", Value::from("v1"), 3)];
/// let listing = EntryListing::new(Some("https://example.com/values.yaml"), &entries);
/// let text = listing.render(OutputFormat::Text, false).unwrap();
/// assert!(text.contains("image.tag"));
/// assert!(text.contains("v1"));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryListing<'a> {
    pub url: Option<&'a str>,
    pub entry_count: usize,
    pub entries: &'a [Entry],
}

impl<'a> EntryListing<'a> {
    pub fn new(url: Option<&'a str>, entries: &'a [Entry]) -> Self {
        Self {
            url,
            entry_count: entries.len(),
            entries,
        }
    }

    /// Render in the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`YamlerError::Serialization`] if JSON output fails.
    pub fn render(&self, format: OutputFormat, use_color: bool) -> Result<String, YamlerError> {
        match format {
            OutputFormat::Text => Ok(self.to_text(use_color)),
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).map_err(YamlerError::from)
            }
        }
    }

    fn to_text(&self, use_color: bool) -> String {
        let width = self
            .entries
            .iter()
            .map(|e| e.path.chars().count())
            .max()
            .unwrap_or(0);
        let mut out = String::new();
        for entry in self.entries {
            let line = entry.line_number + 1;
            let preview = entry.value_preview();
            if use_color {
                let _ = writeln!(
                    out,
                    "{CYAN}{:<width$}{RESET}  {DIM}{line:>5}{RESET}  {preview}",
                    entry.path
                );
            } else {
                let _ = writeln!(out, "{:<width$}  {line:>5}  {preview}", entry.path);
            }
        }
        out
    }

    fn to_markdown(&self) -> String {
        let mut out = String::new();
        if let Some(url) = self.url {
            let _ = writeln!(out, "# Entries in <{url}>\n");
        }
        let _ = writeln!(out, "| Path | Line | Value |");
        let _ = writeln!(out, "|------|------|-------|");
        for entry in self.entries {
            let _ = writeln!(
                out,
                "| `{}` | {} | `{}` |",
                entry.path,
                entry.line_number + 1,
                entry.value_preview().replace('|', "\\|")
            );
        }
        out
    }
}

fn write_context(out: &mut String, lines: &[ContextLine], use_color: bool) {
    for line in lines {
        let marker = if line.is_target { '>' } else { ' ' };
        if line.is_target && use_color {
            let _ = writeln!(
                out,
                "{YELLOW}{marker}{RESET} {DIM}{:>4} |{RESET} {BOLD}{YELLOW}{}{RESET}",
                line.line_number, line.content
            );
        } else if use_color {
            let _ = writeln!(
                out,
                "{marker} {DIM}{:>4} |{RESET} {}",
                line.line_number, line.content
            );
        } else {
            let _ = writeln!(out, "{marker} {:>4} | {}", line.line_number, line.content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yamler_core::YamlerConfig;

    const VALUES: &str = "webhook:\n  replicas: 2\n  image: nginx\nservice:\n  port: 443\n";

    fn session_with(query: &str) -> Session {
        let mut session = Session::new(YamlerConfig::default());
        let ticket = session.begin_load("https://example.com/values.yaml");
        session.complete_load(ticket, Ok(VALUES.into()));
        session.search(query);
        session
    }

    #[test]
    fn text_marks_target_line() {
        let session = session_with("replicas");
        let text = SearchReport::from_session(&session).to_text(false);
        assert!(text.starts_with("1. webhook.replicas (line 2) = 2\n"));
        assert!(text.contains(">    2 |   replicas: 2\n"));
        assert!(text.contains("     1 | webhook:\n"));
    }

    #[test]
    fn colored_text_highlights_target() {
        let session = session_with("replicas");
        let text = SearchReport::from_session(&session).to_text(true);
        assert!(text.contains(YELLOW));
        assert!(text.contains("replicas: 2"));
    }

    #[test]
    fn empty_results_show_indicator() {
        let session = session_with("zzzzz");
        let report = SearchReport::from_session(&session);
        assert_eq!(report.to_text(false), "No results found for \"zzzzz\"\n");
        assert_eq!(report.to_markdown(), "No results found for \"zzzzz\"\n");
    }

    #[test]
    fn blank_query_prints_nothing() {
        let session = session_with("");
        assert_eq!(SearchReport::from_session(&session).to_text(false), "");
    }

    #[test]
    fn json_uses_camel_case() {
        let session = session_with("port");
        let json = SearchReport::from_session(&session).to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["query"], "port");
        assert_eq!(parsed["totalEntries"], 3);
        let first = &parsed["results"][0];
        assert_eq!(first["path"], "service.port");
        assert_eq!(first["lineNumber"], 4);
        assert_eq!(first["value"], 443);
        assert!(first["contextLines"]
            .as_array()
            .unwrap()
            .iter()
            .any(|l| l["isTarget"] == true && l["lineNumber"] == 5));
        assert_eq!(parsed["noResults"], false);
    }

    #[test]
    fn json_flags_empty_results() {
        let session = session_with("zzzzz");
        let json = SearchReport::from_session(&session).to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["noResults"], true);
        assert_eq!(parsed["results"].as_array().unwrap().len(), 0);
        assert_eq!(parsed["totalEntries"], 3);
    }

    #[test]
    fn markdown_fences_context() {
        let session = session_with("image");
        let md = SearchReport::from_session(&session).to_markdown();
        assert!(md.starts_with("# Results for `image`\n"));
        assert!(md.contains("## 1. `webhook.image` (line 3)"));
        assert!(md.contains("```yaml\n"));
    }

    #[test]
    fn listing_renders_every_entry() {
        let session = session_with("");
        let listing = EntryListing::new(None, session.entries());
        let text = listing.render(OutputFormat::Text, false).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("service.port"));

        let json = listing.render(OutputFormat::Json, false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["entryCount"], 3);
        assert_eq!(parsed["entries"][1]["path"], "webhook.image");
        assert_eq!(parsed["entries"][1]["lineNumber"], 2);
    }

    #[test]
    fn listing_markdown_is_a_table() {
        let entries = vec![Entry::new("a", "a", Value::from("x|y"), 0)];
        let md = EntryListing::new(Some("https://example.com/v.yaml"), &entries)
            .render(OutputFormat::Markdown, false)
            .unwrap();
        assert!(md.contains("| Path | Line | Value |"));
        assert!(md.contains("| `a` | 1 | `x\\|y` |"));
    }
}
