//! Progress bar styles.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::warn;

/// Style of the two bar kinds drawn by the downloader.
///
/// The main bar counts finished downloads against discovered ones and stays
/// on screen; page bars show bytes and disappear once the page is stored.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub(crate) main: ProgressBarOpts,
    pub(crate) child: ProgressBarOpts,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            main: ProgressBarOpts {
                template: Some(ProgressBarOpts::TEMPLATE_ILLUSTS.into()),
                progress_chars: Some(ProgressBarOpts::CHARS_FINE.into()),
                enabled: true,
                clear: false,
            },
            child: ProgressBarOpts::with_pip_style(),
        }
    }
}

impl StyleOptions {
    pub fn new(main: ProgressBarOpts, child: ProgressBarOpts) -> Self {
        Self { main, child }
    }

    /// Both bar kinds hidden.
    pub fn hidden() -> Self {
        Self::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
    }

    /// Return `false` if neither the main nor the page bars are drawn.
    pub fn is_enabled(&self) -> bool {
        self.main.enabled || self.child.enabled
    }

    pub fn main(&self) -> &ProgressBarOpts {
        &self.main
    }

    pub fn child(&self) -> &ProgressBarOpts {
        &self.child
    }
}

/// Options of one progress bar kind.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    template: Option<String>,
    /// At least 3 characters: "filled", "current" and "to do".
    progress_chars: Option<String>,
    pub(crate) enabled: bool,
    /// Clear the bar once finished.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: None,
            progress_chars: None,
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// `████████████░░░░ 11/12 illusts (91%) eta 00:00:02`
    pub const TEMPLATE_ILLUSTS: &'static str =
        "{bar:40.blue} {pos:>}/{len} illusts ({percent}%) eta {eta_precise:.blue}";
    /// Pip-like byte counter for single pages.
    pub const TEMPLATE_PIP: &'static str =
        "{bar:40.green/black} {bytes:>11.green}/{total_bytes:<11.green} {bytes_per_sec:>13.red} {msg}";
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    pub const CHARS_LINE: &'static str = "━╾╴─";

    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            enabled,
            clear,
        }
    }

    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_pip_style() -> Self {
        Self {
            template: Some(Self::TEMPLATE_PIP.into()),
            progress_chars: Some(Self::CHARS_LINE.into()),
            enabled: true,
            clear: true,
        }
    }

    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Build the indicatif style. An invalid template falls back to the
    /// default bar.
    pub fn to_progress_style(&self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = &self.template {
            match ProgressStyle::default_bar().template(template) {
                Ok(templated) => style = templated,
                Err(e) => warn!(template = %template, "Invalid progress template: {}", e),
            }
        }
        if let Some(progress_chars) = &self.progress_chars {
            style = style.progress_chars(progress_chars);
        }
        style
    }

    /// A bar of length `len`. Disabled bars still count, they only skip
    /// drawing.
    pub fn to_progress_bar(&self, len: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::hidden());
        }
        ProgressBar::new(len).with_style(self.to_progress_style())
    }
}
