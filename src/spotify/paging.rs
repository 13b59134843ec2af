use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    spotify::{FetchError, RateLimitedFetcher},
    types::PaginationCursor,
};

/// Items gathered by a paginated walk.
///
/// `rate_limited` is set when the walk was cut short by a rate limit that
/// survived the fetcher's retry. The items are still valid, in upstream
/// order, but the collection is incomplete and callers running further
/// requests should stop instead of issuing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub rate_limited: bool,
    /// Delay the service announced with the rate limit that ended the walk.
    pub retry_after: Option<u64>,
}

impl<T> Collected<T> {
    pub fn complete(items: Vec<T>) -> Self {
        Collected {
            items,
            rate_limited: false,
            retry_after: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self::complete(Vec::new())
    }
}

/// Walks an offset-paginated endpoint until the data runs out.
///
/// Each request carries `limit=page_size` and the cursor offset. The walk
/// ends on a short page, on a page object reporting `next: null`, or when
/// `offset` reaches the reported `total`. A rate limit that survives the
/// fetcher's retry ends the walk with the items gathered so far and marks
/// the result as [`Collected::rate_limited`].
pub struct PaginatedCollector<'a> {
    fetcher: &'a RateLimitedFetcher,
}

impl<'a> PaginatedCollector<'a> {
    pub fn new(fetcher: &'a RateLimitedFetcher) -> Self {
        PaginatedCollector { fetcher }
    }

    /// Collects the values `extractor` pulls out of every page item.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Path relative to the API base URL (or an absolute URL)
    ///   of an endpoint answering with `{items: [...]}` pages
    /// * `page_size` - Value sent as `limit`; a page with fewer items ends
    ///   the walk
    /// * `extractor` - Pulls the wanted value out of one page item. Items for
    ///   which it returns `None` (local files, removed tracks) are skipped
    ///   and counted in the log
    ///
    /// # Returns
    ///
    /// - `Ok(Collected)` with every extracted value in upstream order.
    ///   `rate_limited` tells whether the walk stopped on a rate limit.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Rejected`] when a page is refused; a page cannot be
    ///   skipped without losing the offset, so the walk aborts
    /// - [`FetchError::MalformedResponse`] when a page has no `items` array
    /// - [`FetchError::NotAuthenticated`] and [`FetchError::Transport`] from
    ///   the fetcher
    pub async fn collect<T, F>(
        &self,
        endpoint: &str,
        page_size: u32,
        extractor: F,
    ) -> Result<Collected<T>, FetchError>
    where
        F: Fn(&Value) -> Option<T>,
    {
        let mut cursor = PaginationCursor::new(page_size);
        let mut collected = Collected::default();
        let mut skipped = 0usize;

        while !cursor.exhausted {
            let params = [
                ("limit", page_size.to_string()),
                ("offset", cursor.offset.to_string()),
            ];

            let page = match self.fetcher.get(endpoint, &params).await {
                Ok(page) => page,
                Err(FetchError::RateLimitExceeded { retry_after }) => {
                    warn!(
                        endpoint,
                        collected = collected.len(),
                        offset = cursor.offset,
                        "rate limited, returning partial collection"
                    );
                    collected.rate_limited = true;
                    collected.retry_after = Some(retry_after);
                    break;
                }
                Err(e) => return Err(e),
            };

            let items = page
                .get("items")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    FetchError::MalformedResponse(format!("page of {endpoint} has no 'items' array"))
                })?;

            for item in items {
                match extractor(item) {
                    Some(value) => collected.items.push(value),
                    None => skipped += 1,
                }
            }

            let received = u32::try_from(items.len()).unwrap_or(u32::MAX);
            cursor.advance(received);
            debug!(endpoint, received, offset = cursor.offset, "page collected");

            if reports_last_page(&page, cursor.offset) {
                cursor.finish();
            }
        }

        if skipped > 0 {
            warn!(endpoint, skipped, "skipped items without a usable value");
        }

        Ok(collected)
    }
}

fn reports_last_page(page: &Value, offset: u32) -> bool {
    if page.get("next").is_some_and(Value::is_null) {
        return true;
    }
    page.get("total")
        .and_then(Value::as_u64)
        .is_some_and(|total| u64::from(offset) >= total)
}
