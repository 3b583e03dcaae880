//! Lazy illust listings.
//!
//! Every listing handed to the downloader is an [`IllustStream`]: a boxed,
//! fallible stream that is polled only as fast as the fetch task consumes
//! it. The helpers here adapt in-memory collections, cursor-paginated API
//! calls and several listings chained together into that shape.

use super::illust::Illust;
use crate::error::Result;

use chrono::{DateTime, FixedOffset};
use futures::future::{self, Future};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

/// A lazy, fallible listing of illusts.
pub type IllustStream = BoxStream<'static, Result<Illust>>;

/// One page returned by a paginated API call.
#[derive(Debug, Clone, Default)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the following page, `None` on the last page.
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<String>) -> Self {
        Self { items, next }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Listing over an in-memory collection.
pub fn from_iter<I>(illusts: I) -> IllustStream
where
    I: IntoIterator<Item = Illust>,
    I::IntoIter: Send + 'static,
{
    stream::iter(illusts.into_iter().map(Ok)).boxed()
}

/// Concatenates several listings, consuming them one after another.
pub fn chain(sources: Vec<IllustStream>) -> IllustStream {
    stream::iter(sources).flatten().boxed()
}

/// Turns a cursor-driven page fetcher into a lazy listing.
///
/// `fetch_page` is called with `None` for the first page and with the
/// previous page's `next` cursor afterwards. The listing ends after a page
/// without a cursor, or right after the first error.
///
/// ```rust
/// use futures::TryStreamExt;
/// use pixie::illust::{paginate, Illust, Page};
///
/// # #[tokio::main]
/// # async fn main() -> pixie::Result<()> {
/// let listing = paginate(|cursor: Option<String>| async move {
///     Ok::<_, pixie::Error>(match cursor.as_deref() {
///         None => Page::new(vec![Illust::new(1), Illust::new(2)], Some("2".into())),
///         _ => Page::last(vec![Illust::new(3)]),
///     })
/// });
/// let ids: Vec<u64> = listing.map_ok(|i| i.id).try_collect().await?;
/// assert_eq!(ids, vec![1, 2, 3]);
/// # Ok(())
/// # }
/// ```
pub fn paginate<F, Fut>(fetch_page: F) -> IllustStream
where
    F: FnMut(Option<String>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Page<Illust>>> + Send + 'static,
{
    // `None` state: listing finished.
    let initial: Option<Option<String>> = Some(None);

    stream::unfold((initial, fetch_page), |(cursor, mut fetch_page)| async move {
        let cursor = cursor?;
        match fetch_page(cursor).await {
            Ok(page) => {
                let next = page.next.map(Some);
                let items = stream::iter(page.items.into_iter().map(Ok));
                Some((Ok(items), (next, fetch_page)))
            }
            Err(e) => Some((Err(e), (None, fetch_page))),
        }
    })
    .try_flatten()
    .boxed()
}

/// Stops a listing at the first illust created before `earliest`.
///
/// Illusts without a creation time never stop the listing.
pub fn until(source: IllustStream, earliest: DateTime<FixedOffset>) -> IllustStream {
    source
        .try_take_while(move |illust| {
            future::ready(Ok(illust
                .creation_time
                .is_none_or(|created| created >= earliest)))
        })
        .boxed()
}
