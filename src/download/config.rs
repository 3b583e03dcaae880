//! Per-listing download configuration.
//!
//! A [`DownloadConfig`] is attached to a fetch task and shared (behind an
//! `Arc`) by every download task the listing expands into.
//!
//! ```rust
//! use pixie::download::DownloadConfig;
//!
//! let config = DownloadConfig::new("downloads/7703097")
//!     .name("{user_id}_{order}_p{page}{ext}")
//!     .replace(true)
//!     .max_tries(3);
//!
//! assert_eq!(config.max_tries, Some(3));
//! ```

use std::collections::BTreeMap;
use std::env::current_dir;
use std::path::PathBuf;

/// How the illusts of one listing are stored.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory where the files are written.
    pub directory: PathBuf,
    /// File name template. The URL's file name is kept when unset.
    ///
    /// Available placeholders: `{id}`, `{title}`, `{user_id}`, `{user_name}`,
    /// `{user_account}`, `{page}` (0-based), `{original_name}`, `{root}`,
    /// `{ext}` (with its dot), `{order}` (1-based position in the listing)
    /// and every key of `addition_naming_info`. The `illust.` prefix is
    /// accepted, e.g. `{illust.user_id}`.
    pub name: Option<String>,
    /// Extra template values. When set, they replace the `{order}` value.
    pub addition_naming_info: Option<BTreeMap<String, String>>,
    /// Convert ugoira archives into GIF files instead of storing the ZIP
    /// alongside a frame-delay `.txt` file.
    pub convert_ugoira: bool,
    /// Overwrite files which already exist.
    pub replace: bool,
    /// Extra directories where an existing file (same file name) means the
    /// page is skipped.
    pub check_exists: Vec<PathBuf>,
    /// Attempts per page before the download fails. `None` retries until
    /// the page is stored.
    pub max_tries: Option<u32>,
    /// Resolve paths and skip every transfer.
    pub fake_download: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: current_dir().unwrap_or_default(),
            name: None,
            addition_naming_info: None,
            convert_ugoira: true,
            replace: false,
            check_exists: Vec::new(),
            max_tries: Some(5),
            fake_download: false,
        }
    }
}

impl DownloadConfig {
    /// Default options, writing into `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, template: impl Into<String>) -> Self {
        self.name = Some(template.into());
        self
    }

    /// Add one extra template value.
    pub fn naming_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.addition_naming_info
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn convert_ugoira(mut self, convert: bool) -> Self {
        self.convert_ugoira = convert;
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn check_exists(mut self, directory: impl Into<PathBuf>) -> Self {
        self.check_exists.push(directory.into());
        self
    }

    /// Accepts a count or `None` for unlimited attempts. A count below 1 is
    /// treated as 1.
    pub fn max_tries(mut self, max_tries: impl Into<Option<u32>>) -> Self {
        self.max_tries = max_tries.into().map(|n| n.max(1));
        self
    }

    pub fn fake_download(mut self, fake: bool) -> Self {
        self.fake_download = fake;
        self
    }
}
