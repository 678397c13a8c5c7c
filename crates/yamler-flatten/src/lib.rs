//! YAML flattening, key line recovery, and context extraction.
//!
//! Turns YAML text into an ordered list of [`yamler_core::Entry`] values,
//! one per leaf or sequence element, each tagged with a best-effort source
//! line found by [`locator::KeyLocator`]. [`context_lines`] cuts the source
//! window shown around a match.

pub mod context;
pub mod document;
pub mod flatten;
pub mod locator;

pub use context::context_lines;
pub use document::YamlDocument;
pub use flatten::flatten;
