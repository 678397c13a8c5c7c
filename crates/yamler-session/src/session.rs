use std::fmt;

use tracing::{info, warn};
use yamler_core::{ContextLine, Entry, YamlerConfig, YamlerError};
use yamler_fetch::FetchClient;
use yamler_flatten::YamlDocument;
use yamler_search::FuzzyIndex;

/// Identifies one load request. Only the most recent ticket may commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    url: String,
}

impl LoadTicket {
    /// The URL this request was issued for, as typed.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What happened when a load resolved.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The document replaced the previous one.
    Loaded {
        /// Number of flattened entries.
        entry_count: usize,
    },
    /// The load failed and the session was cleared.
    Failed(YamlerError),
    /// A newer load was started in the meantime; the result was dropped.
    Stale,
}

/// Where the session is in its load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing has been requested yet.
    Idle,
    /// A fetch is in flight.
    Loading { url: String },
    /// The latest load succeeded.
    Loaded { url: String, entry_count: usize },
    /// The latest load failed.
    Failed { url: String, message: String },
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Idle => write!(f, "No document loaded"),
            LoadState::Loading { url } => write!(f, "Loading {url}..."),
            LoadState::Loaded { entry_count, .. } => {
                write!(f, "YAML loaded successfully ({entry_count} entries found)")
            }
            LoadState::Failed { message, .. } => write!(f, "{message}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Ranked {
    index: usize,
    score: f64,
}

/// The state of one explore session: the loaded document, its entries, and
/// the active search.
///
/// Loading is split into [`Session::begin_load`] and
/// [`Session::complete_load`] so a caller can have several fetches in flight
/// while only the most recent one is allowed to change the session.
///
/// # Examples
///
/// ```
/// use yamler_core::YamlerConfig;
/// use yamler_session::{LoadOutcome, Session};
///
/// let mut session = Session::new(YamlerConfig::default());
/// let ticket = session.begin_load("https://example.com/values.yaml");
/// let outcome = session.complete_load(ticket, Ok("webhook:\n  replicas: 2\n".into()));
/// assert!(matches!(outcome, LoadOutcome::Loaded { entry_count: 1 }));
/// assert_eq!(session.state().to_string(), "YAML loaded successfully (1 entries found)");
///
/// session.search("replica");
/// assert_eq!(session.results()[0].path, "webhook.replicas");
/// ```
#[derive(Debug)]
pub struct Session {
    config: YamlerConfig,
    document: Option<YamlDocument>,
    entries: Vec<Entry>,
    search_term: String,
    results: Vec<Ranked>,
    generation: u64,
    state: LoadState,
}

impl Session {
    /// Start an empty session.
    pub fn new(config: YamlerConfig) -> Self {
        Self {
            config,
            document: None,
            entries: Vec::new(),
            search_term: String::new(),
            results: Vec::new(),
            generation: 0,
            state: LoadState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Returns `true` while the latest load has not resolved.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// Message of the latest failed load, if the latest load failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// The loaded document, if any.
    pub fn document(&self) -> Option<&YamlDocument> {
        self.document.as_ref()
    }

    /// Flattened entries of the loaded document, in document order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The query the current results were computed for.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Register a new load request. Any earlier request still in flight
    /// becomes stale.
    pub fn begin_load(&mut self, url: &str) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading {
            url: url.to_string(),
        };
        LoadTicket {
            generation: self.generation,
            url: url.to_string(),
        }
    }

    /// Apply the fetched text (or fetch error) for `ticket`.
    ///
    /// On success the document and entries are replaced together and the
    /// previous search is cleared. On any error the session is emptied.
    /// Results for tickets other than the latest are discarded.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        fetched: Result<String, YamlerError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            warn!(
                url = %ticket.url,
                stale = ticket.generation,
                latest = self.generation,
                "discarding result of superseded load"
            );
            return LoadOutcome::Stale;
        }

        match fetched.and_then(YamlDocument::parse) {
            Ok(document) => {
                let entries = document.entries();
                let entry_count = entries.len();
                info!(url = %ticket.url, entries = entry_count, "loaded document");

                self.document = Some(document);
                self.entries = entries;
                self.clear_search();
                self.state = LoadState::Loaded {
                    url: ticket.url,
                    entry_count,
                };
                LoadOutcome::Loaded { entry_count }
            }
            Err(err) => {
                warn!(url = %ticket.url, error = %err, "load failed");
                self.document = None;
                self.entries.clear();
                self.clear_search();
                self.state = LoadState::Failed {
                    url: ticket.url,
                    message: err.to_string(),
                };
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Fetch `url` with `client` and apply the result.
    pub async fn load(&mut self, client: &FetchClient, url: &str) -> LoadOutcome {
        let ticket = self.begin_load(url);
        let fetched = client.fetch_text(url).await;
        self.complete_load(ticket, fetched)
    }

    /// Run `term` against the current entries and keep the ranked results.
    ///
    /// A blank term clears the results. Returns the number of matches.
    pub fn search(&mut self, term: &str) -> usize {
        self.search_term = term.to_string();
        self.results = FuzzyIndex::build(&self.entries, &self.config.search)
            .search(term)
            .into_iter()
            .map(|hit| Ranked {
                index: hit.index,
                score: hit.score,
            })
            .collect();
        self.results.len()
    }

    /// Entries matching the current search term, best first.
    pub fn results(&self) -> Vec<&Entry> {
        self.results
            .iter()
            .filter_map(|r| self.entries.get(r.index))
            .collect()
    }

    /// Matching entries paired with their scores, best first.
    pub fn scored_results(&self) -> Vec<(&Entry, f64)> {
        self.results
            .iter()
            .filter_map(|r| self.entries.get(r.index).map(|e| (e, r.score)))
            .collect()
    }

    /// Returns `true` when a non-blank query found nothing in a non-empty
    /// entry set.
    pub fn no_results(&self) -> bool {
        !self.search_term.trim().is_empty() && self.results.is_empty() && !self.entries.is_empty()
    }

    /// The "nothing found" line for the current search term.
    pub fn no_results_message(&self) -> String {
        format!("No results found for \"{}\"", self.search_term)
    }

    /// Source lines around `entry`, sized by `[display] context_lines`.
    pub fn context_for(&self, entry: &Entry) -> Vec<ContextLine> {
        self.document
            .as_ref()
            .map(|doc| doc.context(entry.line_number, self.config.display.context_lines))
            .unwrap_or_default()
    }

    fn clear_search(&mut self) {
        self.search_term.clear();
        self.results.clear();
    }
}
