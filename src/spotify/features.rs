use tracing::{info, warn};

use crate::{
    spotify::{FetchError, RateLimitedFetcher},
    types::TrackFeatureRecord,
};

/// Outcome of a feature lookup over a list of track IDs.
#[derive(Debug, Clone, Default)]
pub struct FeatureBatch {
    pub records: Vec<TrackFeatureRecord>,
    /// Number of IDs handed to the fetcher.
    pub requested: usize,
    /// IDs whose lookup failed and were skipped.
    pub omitted: Vec<String>,
    /// The loop stopped early because the service kept rate limiting.
    pub rate_limited: bool,
}

impl FeatureBatch {
    pub fn retrieved(&self) -> usize {
        self.records.len()
    }

    /// IDs that were never attempted because of an early stop.
    pub fn unattempted(&self) -> usize {
        self.requested - self.records.len() - self.omitted.len()
    }
}

/// Looks up audio features one track at a time.
///
/// A rejected or malformed lookup skips that ID and continues; a rate
/// limit ends the loop and keeps what was retrieved.
pub struct FeatureFetcher<'a> {
    fetcher: &'a RateLimitedFetcher,
}

impl<'a> FeatureFetcher<'a> {
    pub fn new(fetcher: &'a RateLimitedFetcher) -> Self {
        FeatureFetcher { fetcher }
    }

    /// Audio features of one track (`GET /audio-features/{id}`).
    ///
    /// # Errors
    ///
    /// - [`FetchError::MalformedResponse`] when the body is not a feature
    ///   object
    /// - Any error of [`RateLimitedFetcher::fetch`]
    pub async fn fetch_one(&self, track_id: &str) -> Result<TrackFeatureRecord, FetchError> {
        let value = self
            .fetcher
            .get(&format!("/audio-features/{track_id}"), &[])
            .await?;
        TrackFeatureRecord::try_from(value).map_err(FetchError::MalformedResponse)
    }

    /// Audio features of every ID in `track_ids`, in input order.
    ///
    /// # Returns
    ///
    /// A [`FeatureBatch`] with the retrieved records. Failed lookups are
    /// listed in `omitted`; a rate limit ends the loop and sets
    /// `rate_limited`, leaving the remaining IDs unattempted.
    pub async fn fetch_all<S: AsRef<str>>(&self, track_ids: &[S]) -> FeatureBatch {
        let mut batch = FeatureBatch {
            requested: track_ids.len(),
            ..FeatureBatch::default()
        };

        for id in track_ids {
            let id = id.as_ref();
            match self.fetch_one(id).await {
                Ok(record) => batch.records.push(record),
                Err(e) if e.is_rate_limited() => {
                    batch.rate_limited = true;
                    break;
                }
                Err(e) => {
                    warn!(track_id = id, error = %e, "skipping track without features");
                    batch.omitted.push(id.to_string());
                }
            }
        }

        if batch.rate_limited {
            warn!(
                retrieved = batch.retrieved(),
                requested = batch.requested,
                "rate limited, feature retrieval stopped early"
            );
        } else {
            info!(
                retrieved = batch.retrieved(),
                requested = batch.requested,
                omitted = batch.omitted.len(),
                "feature retrieval finished"
            );
        }

        batch
    }
}
