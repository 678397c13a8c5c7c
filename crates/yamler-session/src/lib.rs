//! Explore session state and result rendering.
//!
//! A [`Session`] owns the loaded document, its flattened entries, and the
//! active search. Loads follow a latest-request-wins rule: results for a
//! superseded [`LoadTicket`] are dropped. [`SearchReport`] and
//! [`EntryListing`] turn session state into text, Markdown, or JSON.

pub mod render;
pub mod session;

pub use render::{EntryListing, ResultBlock, SearchReport};
pub use session::{LoadOutcome, LoadState, LoadTicket, Session};
