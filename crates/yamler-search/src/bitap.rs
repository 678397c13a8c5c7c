//! Bitap approximate substring matching.
//!
//! Scores how well a pattern occurs anywhere in a text, allowing edit
//! errors. The per-field score is
//! `errors / pattern_len + |match_location - location| / distance`,
//! and a field only matches when some location scores at or below the
//! configured threshold. Lower is better; an exact full-text match scores 0.

use std::collections::HashMap;

use yamler_core::SearchConfig;

/// Longest pattern handled in one bit mask. Longer patterns are split into
/// chunks whose scores are averaged.
pub const MAX_BITS: usize = 32;

/// Smallest score reported for a non-identical match.
const MIN_SCORE: f64 = 0.001;

/// Outcome of matching a pattern against one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMatch {
    /// `true` if some location scored within the threshold.
    pub is_match: bool,
    /// Score in `[0.0, 1.0]`; 1.0 when there is no match.
    pub score: f64,
}

impl FieldMatch {
    const NONE: FieldMatch = FieldMatch {
        is_match: false,
        score: 1.0,
    };
}

#[derive(Debug, Clone)]
struct Chunk {
    pattern: Vec<char>,
    alphabet: HashMap<char, u32>,
    start_index: usize,
}

impl Chunk {
    fn new(pattern: &[char], start_index: usize) -> Self {
        let len = pattern.len();
        let mut alphabet: HashMap<char, u32> = HashMap::new();
        for (i, c) in pattern.iter().enumerate() {
            *alphabet.entry(*c).or_insert(0) |= 1 << (len - i - 1);
        }
        Self {
            pattern: pattern.to_vec(),
            alphabet,
            start_index,
        }
    }
}

/// Case-insensitive approximate matcher for a single query.
///
/// # Examples
///
/// ```
/// use yamler_core::SearchConfig;
/// use yamler_search::bitap::BitapSearcher;
///
/// let searcher = BitapSearcher::new("replica", &SearchConfig::default());
/// assert!(searcher.search_in("webhook.replicas").is_match);
/// assert!(searcher.search_in("webhook.replcas").is_match);
/// assert!(!searcher.search_in("service.port").is_match);
/// ```
#[derive(Debug, Clone)]
pub struct BitapSearcher {
    pattern: String,
    chunks: Vec<Chunk>,
    options: SearchConfig,
}

impl BitapSearcher {
    /// Prepare `pattern` for matching with the given tuning.
    pub fn new(pattern: &str, options: &SearchConfig) -> Self {
        let pattern = pattern.to_lowercase();
        let chars: Vec<char> = pattern.chars().collect();
        let len = chars.len();

        let mut chunks = Vec::new();
        if len > MAX_BITS {
            let remainder = len % MAX_BITS;
            let end = len - remainder;
            let mut i = 0;
            while i < end {
                chunks.push(Chunk::new(&chars[i..i + MAX_BITS], i));
                i += MAX_BITS;
            }
            if remainder > 0 {
                let start_index = len - MAX_BITS;
                chunks.push(Chunk::new(&chars[start_index..], start_index));
            }
        } else if len > 0 {
            chunks.push(Chunk::new(&chars, 0));
        }

        Self {
            pattern,
            chunks,
            options: options.clone(),
        }
    }

    /// Match the pattern against `text`.
    pub fn search_in(&self, text: &str) -> FieldMatch {
        let text = text.to_lowercase();
        if self.pattern == text {
            return FieldMatch {
                is_match: true,
                score: 0.0,
            };
        }
        if self.chunks.is_empty() {
            return FieldMatch::NONE;
        }

        let text: Vec<char> = text.chars().collect();
        let mut total = 0.0;
        let mut any_match = false;
        for chunk in &self.chunks {
            let result = search_chunk(
                &text,
                chunk,
                &self.options,
                self.options.location + chunk.start_index,
            );
            any_match |= result.is_match;
            total += result.score;
        }

        if any_match {
            FieldMatch {
                is_match: true,
                score: total / self.chunks.len() as f64,
            }
        } else {
            FieldMatch::NONE
        }
    }
}

fn compute_score(
    pattern_len: usize,
    errors: usize,
    current: isize,
    expected: isize,
    options: &SearchConfig,
) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    if options.ignore_location {
        return accuracy;
    }
    let proximity = (expected - current).unsigned_abs();
    if options.distance == 0 {
        return if proximity > 0 { 1.0 } else { accuracy };
    }
    accuracy + proximity as f64 / options.distance as f64
}

fn find_from(text: &[char], pattern: &[char], from: usize) -> Option<usize> {
    let last = text.len().checked_sub(pattern.len())?;
    (from..=last).find(|&i| text[i..i + pattern.len()] == *pattern)
}

/// Run one bitap pass for a chunk of at most [`MAX_BITS`] characters.
///
/// Error levels grow from 0 until even a perfectly placed match with one
/// more error could not beat the best score found so far.
fn search_chunk(
    text: &[char],
    chunk: &Chunk,
    options: &SearchConfig,
    location: usize,
) -> FieldMatch {
    let pattern_len = chunk.pattern.len();
    let text_len = text.len() as isize;
    let expected = (location as isize).min(text_len);
    let mut threshold = options.threshold;

    // Exact occurrences tighten the threshold before the approximate pass.
    let mut from = expected as usize;
    while let Some(index) = find_from(text, &chunk.pattern, from) {
        let score = compute_score(pattern_len, 0, index as isize, expected, options);
        threshold = threshold.min(score);
        from = index + pattern_len;
    }

    let mut best_location: isize = -1;
    let mut best_score = 1.0;
    let mut last_bits: Vec<u32> = Vec::new();
    let mut bin_max = pattern_len as isize + text_len;
    let mask: u32 = 1 << (pattern_len - 1);

    for errors in 0..pattern_len {
        // Widest distance from `expected` that could still beat the threshold.
        let mut bin_min = 0;
        let mut bin_mid = bin_max;
        while bin_min < bin_mid {
            let score = compute_score(pattern_len, errors, expected + bin_mid, expected, options);
            if score <= threshold {
                bin_min = bin_mid;
            } else {
                bin_max = bin_mid;
            }
            bin_mid = (bin_max - bin_min) / 2 + bin_min;
        }
        bin_max = bin_mid;

        let mut start = (expected - bin_mid + 1).max(1);
        let finish = (expected + bin_mid).min(text_len) + pattern_len as isize;

        let mut bits = vec![0u32; (finish + 2) as usize];
        bits[(finish + 1) as usize] = (1u32 << errors) - 1;

        let mut j = finish;
        while j >= start {
            let current = j - 1;
            let char_match = text
                .get(current as usize)
                .and_then(|c| chunk.alphabet.get(c))
                .copied()
                .unwrap_or(0);
            let ju = j as usize;

            bits[ju] = ((bits[ju + 1] << 1) | 1) & char_match;
            if errors > 0 {
                let prev = last_bits.get(ju).copied().unwrap_or(0);
                let prev_next = last_bits.get(ju + 1).copied().unwrap_or(0);
                bits[ju] |= ((prev_next | prev) << 1) | 1 | prev_next;
            }

            if bits[ju] & mask != 0 {
                let score = compute_score(pattern_len, errors, current, expected, options);
                if score <= threshold {
                    threshold = score;
                    best_score = score;
                    best_location = current;
                    if best_location <= expected {
                        break;
                    }
                    start = (2 * expected - best_location).max(1);
                }
            }
            j -= 1;
        }

        let next_level = compute_score(pattern_len, errors + 1, expected, expected, options);
        if next_level > threshold {
            break;
        }
        last_bits = bits;
    }

    if best_location >= 0 {
        FieldMatch {
            is_match: true,
            score: best_score.max(MIN_SCORE),
        }
    } else {
        FieldMatch::NONE
    }
}
