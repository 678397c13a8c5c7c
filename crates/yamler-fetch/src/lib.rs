//! Remote document retrieval for yamler.
//!
//! [`url`] validates user input and rewrites repository viewer links to their
//! raw-content form; [`FetchClient`] downloads the result as text.

pub mod client;
pub mod url;

pub use client::FetchClient;
pub use url::{normalize, validate, UrlNormalizer};
