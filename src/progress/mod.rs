//! Terminal progress reporting.
//!
//! - `style` - Bar templates and visibility options
//! - `display` - The [`ProgressDisplay`] shared by the workers
//!
//! ```rust
//! use pixie::progress::{ProgressBarOpts, StyleOptions};
//!
//! // Keep the overall bar, hide the per-page ones.
//! let style = StyleOptions::new(StyleOptions::default().main().clone(), ProgressBarOpts::hidden());
//! assert!(style.is_enabled());
//! ```

pub(crate) mod display;
pub(crate) mod style;

pub use display::ProgressDisplay;
pub use style::{ProgressBarOpts, StyleOptions};
