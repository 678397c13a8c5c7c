//! Fuzzy index over flattened entries.
//!
//! Each entry is indexed by two fields, its full `path` and its last `key`
//! segment, with equal weight. An entry's score is the product over its
//! matching fields of `field_score ^ (weight * norm)`, where `norm` shrinks
//! with the number of space-separated tokens in the field. Entries where no
//! field matched are dropped.

use serde::Serialize;
use tracing::debug;
use yamler_core::{Entry, SearchConfig};

use crate::bitap::BitapSearcher;

/// Weight of each indexed field (path and key share the total equally).
const FIELD_WEIGHT: f64 = 0.5;

/// One ranked match for a query.
///
/// Borrows the entry it refers to; `index` is the entry's position in the
/// list the index was built from.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit<'a> {
    /// The matched entry.
    pub entry: &'a Entry,
    /// Position of the entry in the indexed list.
    pub index: usize,
    /// Combined relevance score, lower is better.
    pub score: f64,
}

#[derive(Debug, Clone)]
struct Field {
    text: String,
    norm: f64,
}

impl Field {
    fn new(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            norm: field_norm(text),
        })
    }
}

#[derive(Debug, Clone)]
struct Record<'a> {
    index: usize,
    entry: &'a Entry,
    fields: Vec<Field>,
}

/// A searchable view over a slice of entries.
///
/// Cheap to build; callers may rebuild it for every query or keep it for as
/// long as the entries live.
///
/// # Examples
///
/// ```
/// use yamler_core::{Entry, SearchConfig, Value};
/// use yamler_search::FuzzyIndex;
///
/// let entries = vec![
///     Entry::new("webhook.replicas", "replicas", Value::from(2), 1),
///     Entry::new("service.port", "port", Value::from(80), 3),
/// ];
/// let index = FuzzyIndex::build(&entries, &SearchConfig::default());
/// let hits = index.search("port");
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].entry.path, "service.port");
/// assert_eq!(hits[0].index, 1);
/// ```
#[derive(Debug, Clone)]
pub struct FuzzyIndex<'a> {
    records: Vec<Record<'a>>,
    options: SearchConfig,
}

impl<'a> FuzzyIndex<'a> {
    /// Index `entries` by path and key.
    pub fn build(entries: &'a [Entry], options: &SearchConfig) -> Self {
        let records = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| Record {
                index,
                entry,
                fields: [entry.path.as_str(), entry.key.as_str()]
                    .into_iter()
                    .filter_map(Field::new)
                    .collect(),
            })
            .collect();
        Self {
            records,
            options: options.clone(),
        }
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rank entries against `query`, best match first.
    ///
    /// Ties keep the original entry order. An empty or whitespace-only
    /// query returns no hits.
    pub fn search(&self, query: &str) -> Vec<SearchHit<'a>> {
        if query.trim().is_empty() || self.records.is_empty() {
            return Vec::new();
        }

        let searcher = BitapSearcher::new(query, &self.options);
        let mut hits: Vec<SearchHit<'a>> = self
            .records
            .iter()
            .filter_map(|record| {
                let mut score = 1.0;
                let mut matched = false;
                for field in &record.fields {
                    let result = searcher.search_in(&field.text);
                    if result.is_match {
                        matched = true;
                        let base = if result.score == 0.0 {
                            f64::EPSILON
                        } else {
                            result.score
                        };
                        score *= base.powf(FIELD_WEIGHT * field.norm);
                    }
                }
                matched.then_some(SearchHit {
                    entry: record.entry,
                    index: record.index,
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.index.cmp(&b.index)));
        if let Some(limit) = self.options.limit {
            hits.truncate(limit);
        }

        debug!(
            query,
            indexed = self.records.len(),
            hits = hits.len(),
            "fuzzy search"
        );
        hits
    }
}

/// `1 / sqrt(token count)` rounded to three decimals.
fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    let norm = 1.0 / (tokens as f64).sqrt();
    (norm * 1000.0).round() / 1000.0
}

/// Build an index over `entries` and return the entries matching `query`,
/// best match first.
///
/// # Examples
///
/// ```
/// use yamler_core::{Entry, SearchConfig, Value};
/// use yamler_search::build_and_search;
///
/// let entries = vec![
///     Entry::new("webhook.replicas", "replicas", Value::from(2), 1),
///     Entry::new("service.port", "port", Value::from(80), 3),
/// ];
/// let options = SearchConfig::default();
///
/// let found = build_and_search(&entries, "replica", &options);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].path, "webhook.replicas");
///
/// assert!(build_and_search(&entries, "", &options).is_empty());
/// assert!(build_and_search(&entries, "zzzzz", &options).is_empty());
/// ```
pub fn build_and_search<'a>(
    entries: &'a [Entry],
    query: &str,
    options: &SearchConfig,
) -> Vec<&'a Entry> {
    FuzzyIndex::build(entries, options)
        .search(query)
        .into_iter()
        .map(|hit| hit.entry)
        .collect()
}
