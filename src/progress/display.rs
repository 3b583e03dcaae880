//! Progress display shared by every worker.

use super::style::StyleOptions;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::sync::Arc;

/// Coordinates the main bar and the per-page bars.
///
/// The main bar's length grows as fetch tasks discover illusts, and its
/// position advances as download tasks finish. Cloning shares the bars.
#[derive(Clone)]
pub struct ProgressDisplay {
    multi: Arc<MultiProgress>,
    main: ProgressBar,
    style_options: StyleOptions,
}

impl std::fmt::Debug for ProgressDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressDisplay")
            .field("position", &self.main.position())
            .field("length", &self.main.length())
            .field("style_options", &self.style_options)
            .finish()
    }
}

impl ProgressDisplay {
    pub fn new(style_options: StyleOptions) -> Self {
        let multi = match style_options.is_enabled() {
            true => Arc::new(MultiProgress::new()),
            false => Arc::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden())),
        };
        let main_opts = style_options.main();
        let main = Self::attach(&multi, main_opts.enabled, main_opts.to_progress_bar(0));

        Self {
            multi,
            main,
            style_options,
        }
    }

    // Hidden bars stay out of the multi bar, which would redraw them.
    fn attach(multi: &MultiProgress, enabled: bool, pb: ProgressBar) -> ProgressBar {
        if enabled {
            multi.add(pb)
        } else {
            pb
        }
    }

    /// A display that draws nothing.
    pub fn hidden() -> Self {
        Self::new(StyleOptions::hidden())
    }

    /// Account for `n` newly discovered downloads.
    pub fn add_pending(&self, n: u64) {
        self.main.inc_length(n);
    }

    /// One download reached a terminal status.
    pub fn increment_main(&self) {
        self.main.inc(1);
    }

    /// `(finished, discovered)` downloads.
    pub fn position(&self) -> (u64, u64) {
        (self.main.position(), self.main.length().unwrap_or(0))
    }

    /// A byte bar for one page, starting at `position`.
    pub fn create_child_progress(&self, size: u64, position: u64) -> ProgressBar {
        let child = self.style_options.child();
        Self::attach(
            &self.multi,
            child.enabled,
            child.to_progress_bar(size).with_position(position),
        )
    }

    pub fn finish_child(&self, pb: ProgressBar) {
        if self.style_options.child().clear {
            pb.finish_and_clear();
        } else {
            pb.finish();
        }
    }

    pub fn finish(&self) {
        if self.style_options.main().clear {
            self.main.finish_and_clear();
        } else {
            self.main.finish();
        }
    }
}
