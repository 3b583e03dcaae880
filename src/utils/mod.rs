//! Shared utility functions.
//!
//! - [`content_length`] - Announced body length and truncation checks

pub mod content_length;

pub use content_length::{expected_length, is_truncated, parse_content_range_total};
