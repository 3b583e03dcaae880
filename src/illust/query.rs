//! Query builder for illust listings.
//!
//! Listings are shaped by a small predicate/comparator pipeline: [`Q`]
//! predicates combine with `&`, `|` and `!`, [`OrderBy`] keys sort a listing,
//! and [`Query`] chains them over an [`IllustStream`].
//!
//! ```rust
//! use pixie::illust::{Illust, OrderBy, Query, Q};
//!
//! let popular_originals = Q::tag("original") & Q::min_bookmarks(1000);
//! let query = Query::new()
//!     .order_by(["-total_bookmarks".parse::<OrderBy>().unwrap()])
//!     .limit_after(20)
//!     .filter(popular_originals & !Q::tag("R-18"));
//!
//! assert!(!query.is_empty());
//! ```

use super::illust::{AgeLimit, Illust, IllustType};
use super::source::IllustStream;
use crate::error::{Error, Result};

use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;
use std::sync::Arc;

/// A composable predicate over illusts.
#[derive(Clone)]
pub struct Q {
    predicate: Arc<dyn Fn(&Illust) -> bool + Send + Sync>,
}

impl fmt::Debug for Q {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Q").finish_non_exhaustive()
    }
}

impl Q {
    /// Wraps an arbitrary predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Illust) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, illust: &Illust) -> bool {
        (self.predicate)(illust)
    }

    /// Illusts carrying exactly this tag.
    pub fn tag(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(move |illust| illust.has_tag(&tag))
    }

    pub fn illust_type(illust_type: IllustType) -> Self {
        Self::new(move |illust| illust.illust_type == illust_type)
    }

    pub fn age_limit(age_limit: AgeLimit) -> Self {
        Self::new(move |illust| illust.age_limit() == age_limit)
    }

    pub fn user_id(user_id: u64) -> Self {
        Self::new(move |illust| illust.user_id == user_id)
    }

    pub fn min_bookmarks(count: u64) -> Self {
        Self::new(move |illust| illust.total_bookmarks >= count)
    }

    pub fn min_views(count: u64) -> Self {
        Self::new(move |illust| illust.total_view >= count)
    }

    /// Title contains `needle`, ignoring case.
    pub fn title_contains(needle: impl Into<String>) -> Self {
        let needle = needle.into().to_lowercase();
        Self::new(move |illust| illust.title.to_lowercase().contains(&needle))
    }
}

impl BitAnd for Q {
    type Output = Q;

    fn bitand(self, rhs: Q) -> Q {
        Q::new(move |illust| self.matches(illust) && rhs.matches(illust))
    }
}

impl BitOr for Q {
    type Output = Q;

    fn bitor(self, rhs: Q) -> Q {
        Q::new(move |illust| self.matches(illust) || rhs.matches(illust))
    }
}

impl Not for Q {
    type Output = Q;

    fn not(self) -> Q {
        Q::new(move |illust| !self.matches(illust))
    }
}

/// Sortable illust attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Title,
    CreationTime,
    Width,
    Height,
    Area,
    AspectRatio,
    PageCount,
    TotalBookmarks,
    TotalView,
    Rank,
    UserId,
}

impl Field {
    fn compare(self, a: &Illust, b: &Illust) -> Ordering {
        match self {
            Field::Id => a.id.cmp(&b.id),
            Field::Title => a.title.cmp(&b.title),
            Field::CreationTime => a.creation_time.cmp(&b.creation_time),
            Field::Width => a.width.cmp(&b.width),
            Field::Height => a.height.cmp(&b.height),
            Field::Area => a.area().cmp(&b.area()),
            Field::AspectRatio => a.aspect_ratio().total_cmp(&b.aspect_ratio()),
            Field::PageCount => a.page_count().cmp(&b.page_count()),
            Field::TotalBookmarks => a.total_bookmarks.cmp(&b.total_bookmarks),
            Field::TotalView => a.total_view.cmp(&b.total_view),
            Field::Rank => a.rank.cmp(&b.rank),
            Field::UserId => a.user_id.cmp(&b.user_id),
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let field = match s {
            "id" | "illust_id" => Field::Id,
            "title" => Field::Title,
            "creation_time" => Field::CreationTime,
            "width" => Field::Width,
            "height" => Field::Height,
            "area" => Field::Area,
            "aspect_ratio" => Field::AspectRatio,
            "page_count" => Field::PageCount,
            "total_bookmarks" => Field::TotalBookmarks,
            "total_view" => Field::TotalView,
            "rank" => Field::Rank,
            "user_id" => Field::UserId,
            other => return Err(Error::InvalidOrder(other.to_string())),
        };
        Ok(field)
    }
}

/// One sort key. Parses from `"field"` (ascending) or `"-field"` (descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: Field,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: Field) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: Field) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    pub fn compare(&self, a: &Illust, b: &Illust) -> Ordering {
        let ordering = self.field.compare(a, b);
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl FromStr for OrderBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.strip_prefix('-') {
            Some(field) => Ok(OrderBy::desc(field.parse()?)),
            None => Ok(OrderBy::asc(s.parse()?)),
        }
    }
}

/// Sorts illusts by the given keys, earlier keys taking precedence.
pub fn sort_illusts(illusts: &mut [Illust], keys: &[OrderBy]) {
    illusts.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Listing pipeline applied by a fetch task before it creates downloads.
///
/// Steps run in a fixed order: `order_by`, `limit_before`, `filter` (or
/// `exclude` when no filter is set), then `limit_after`.
#[derive(Debug, Clone, Default)]
pub struct Query {
    order_by: Vec<OrderBy>,
    limit_before: Option<usize>,
    filter: Option<Q>,
    exclude: Option<Q>,
    limit_after: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort the whole listing first. This drains the source before the
    /// first item is produced.
    pub fn order_by(mut self, keys: impl IntoIterator<Item = OrderBy>) -> Self {
        self.order_by = keys.into_iter().collect();
        self
    }

    /// Keep at most `max` items before filtering.
    pub fn limit_before(mut self, max: usize) -> Self {
        self.limit_before = Some(max);
        self
    }

    pub fn filter(mut self, q: Q) -> Self {
        self.filter = Some(q);
        self
    }

    /// Drop matching items. Ignored when a filter is set.
    pub fn exclude(mut self, q: Q) -> Self {
        self.exclude = Some(q);
        self
    }

    /// Keep at most `max` items after filtering.
    pub fn limit_after(mut self, max: usize) -> Self {
        self.limit_after = Some(max);
        self
    }

    /// `true` if the query leaves a listing untouched.
    pub fn is_empty(&self) -> bool {
        self.order_by.is_empty()
            && self.limit_before.is_none()
            && self.filter.is_none()
            && self.exclude.is_none()
            && self.limit_after.is_none()
    }

    /// Applies the pipeline to a listing. Errors from the source pass
    /// through unchanged.
    pub fn apply(&self, source: IllustStream) -> IllustStream {
        let mut stream = source;

        if !self.order_by.is_empty() {
            let keys = self.order_by.clone();
            stream = stream::once(async move {
                let mut illusts: Vec<Illust> = stream.try_collect().await?;
                sort_illusts(&mut illusts, &keys);
                Ok::<_, Error>(stream::iter(illusts.into_iter().map(Ok)))
            })
            .try_flatten()
            .boxed();
        }

        if let Some(max) = self.limit_before {
            stream = stream.take(max).boxed();
        }

        if let Some(q) = self.filter.clone() {
            stream = stream
                .try_filter(move |illust| future::ready(q.matches(illust)))
                .boxed();
        } else if let Some(q) = self.exclude.clone() {
            stream = stream
                .try_filter(move |illust| future::ready(!q.matches(illust)))
                .boxed();
        }

        if let Some(max) = self.limit_after {
            stream = stream.take(max).boxed();
        }

        stream
    }
}
