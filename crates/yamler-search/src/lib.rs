//! Fuzzy search over flattened YAML entries.
//!
//! [`bitap`] scores one query against one field; [`index`] combines the
//! path and key fields of every entry into a ranked result list.

pub mod bitap;
pub mod index;

pub use bitap::{BitapSearcher, FieldMatch};
pub use index::{build_and_search, FuzzyIndex, SearchHit};
