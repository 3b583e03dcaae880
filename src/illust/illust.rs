//! Illustration records.
//!
//! An [`Illust`] is the unit yielded by every listing source. Records are
//! produced by an external API client (or deserialized from its JSON) and are
//! treated as read-only values by the rest of the crate.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Kind of illustration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IllustType {
    /// Single or multi page picture.
    #[default]
    Illust,
    /// Comic pages.
    Manga,
    /// Animation shipped as a ZIP archive of frames.
    Ugoira,
}

/// Age restriction, derived from the illust tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeLimit {
    AllAge,
    R18,
    R18G,
}

/// Metadata of a single illustration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Illust {
    /// Illust ID.
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Description text. May contain HTML.
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub creation_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Original image URLs, one per page. An ugoira has a single URL pointing
    /// to the ZIP archive holding every frame.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Frame durations in milliseconds, `None` for anything but ugoira.
    #[serde(default)]
    pub frame_delays: Option<Vec<u32>>,
    #[serde(rename = "type", default)]
    pub illust_type: IllustType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub user_account: String,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub total_bookmarks: u64,
    #[serde(default)]
    pub total_view: u64,
    /// Position in a ranking, starting from 1. Only set for ranking listings.
    #[serde(default)]
    pub rank: Option<u32>,
}

impl Illust {
    /// Creates an illust with the given id and empty metadata.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Area in pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Width divided by height, or `0.0` for a zero height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn page_count(&self) -> usize {
        self.image_urls.len()
    }

    pub fn is_ugoira(&self) -> bool {
        self.illust_type == IllustType::Ugoira
    }

    /// Age restriction according to the `R-18` / `R-18G` tags.
    pub fn age_limit(&self) -> AgeLimit {
        if self.tags.iter().any(|t| t == "R-18") {
            AgeLimit::R18
        } else if self.tags.iter().any(|t| t == "R-18G") {
            AgeLimit::R18G
        } else {
            AgeLimit::AllAge
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
