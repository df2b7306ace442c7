//! Lazy pagination over continuation-token listings.

use super::control_plane::{ControlPlaneError, ControlPlaneResult};
use futures::{Stream, TryStreamExt, stream};
use std::future::Future;

/// Opaque continuation token returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageToken(String);

impl PageToken {
    /// Wraps a provider token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning its text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<PageToken>,
}

impl<T> Page<T> {
    /// Creates the final page of a listing.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// Creates a page followed by another.
    #[must_use]
    pub const fn with_next(items: Vec<T>, next_token: PageToken) -> Self {
        Self {
            items,
            next_token: Some(next_token),
        }
    }
}

enum Cursor {
    First,
    Next(PageToken),
    Exhausted,
}

/// Yields pages lazily, requesting the next one only when polled.
///
/// The stream ends after the first page without a continuation token, or
/// after the first failed call.
pub fn paginate<T, F, Fut>(mut fetch: F) -> impl Stream<Item = ControlPlaneResult<Vec<T>>>
where
    F: FnMut(Option<PageToken>) -> Fut,
    Fut: Future<Output = ControlPlaneResult<Page<T>>>,
{
    stream::try_unfold(Cursor::First, move |cursor| {
        let request = match cursor {
            Cursor::First => Some(fetch(None)),
            Cursor::Next(token) => Some(fetch(Some(token))),
            Cursor::Exhausted => None,
        };
        async move {
            let Some(request) = request else {
                return Ok::<_, ControlPlaneError>(None);
            };
            let page = request.await?;
            let cursor = page.next_token.map_or(Cursor::Exhausted, Cursor::Next);
            Ok(Some((page.items, cursor)))
        }
    })
}

/// Drains a page stream into one owned sequence, keeping every page's items
/// in listing order.
///
/// # Errors
///
/// Returns the first failed call's error.
pub async fn drain<T, S>(pages: S) -> ControlPlaneResult<Vec<T>>
where
    S: Stream<Item = ControlPlaneResult<Vec<T>>>,
{
    pages.try_concat().await
}
