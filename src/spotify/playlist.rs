use serde::Serialize;
use serde_json::Value;

use crate::{
    spotify::{Collected, DEFAULT_RETRY_AFTER, FetchError, PaginatedCollector, RateLimitedFetcher},
    types::{AddTrackToPlaylistRequest, CreatePlaylistRequest, PlaylistRef, PlaylistSummary},
};

/// The append endpoint accepts at most this many URIs per request.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Creates playlists and fills them with tracks.
///
/// Failures are returned as-is; only the fetcher's single 429 retry
/// applies.
pub struct PlaylistMutator<'a> {
    fetcher: &'a RateLimitedFetcher,
}

impl<'a> PlaylistMutator<'a> {
    pub fn new(fetcher: &'a RateLimitedFetcher) -> Self {
        PlaylistMutator { fetcher }
    }

    /// Creates a private playlist owned by `user_id`.
    ///
    /// # Returns
    ///
    /// The ID and URI of the new playlist.
    ///
    /// # Errors
    ///
    /// - [`FetchError::MalformedResponse`] when the response has no `id`
    /// - Any error of [`RateLimitedFetcher::fetch`]
    pub async fn create(&self, user_id: &str, name: &str) -> Result<PlaylistRef, FetchError> {
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            public: false,
        };
        let body = request_body(&request)?;

        let response = self
            .fetcher
            .post(&format!("/users/{user_id}/playlists"), &body)
            .await?;

        let playlist_id = response
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FetchError::MalformedResponse("playlist response has no 'id'".to_string())
            })?;

        Ok(PlaylistRef {
            playlist_id: playlist_id.to_string(),
        })
    }

    /// Appends `track_uris` in upstream-sized chunks. An empty list sends
    /// nothing.
    ///
    /// # Errors
    ///
    /// The first failing chunk stops the append. Chunks sent before it stay
    /// in the playlist.
    pub async fn append_tracks(
        &self,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<(), FetchError> {
        for chunk in track_uris.chunks(MAX_TRACKS_PER_REQUEST) {
            let request = AddTrackToPlaylistRequest {
                uris: chunk.to_vec(),
            };
            let body = request_body(&request)?;
            self.fetcher
                .post(&format!("/playlists/{playlist_id}/tracks"), &body)
                .await?;
        }
        Ok(())
    }
}

fn request_body<T: Serialize>(request: &T) -> Result<Value, FetchError> {
    serde_json::to_value(request).map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

/// All playlists of `user_id` (`GET /users/{id}/playlists`), in upstream
/// order. A rate limit returns the playlists listed so far, flagged.
pub async fn list_user_playlists(
    fetcher: &RateLimitedFetcher,
    user_id: &str,
) -> Result<Collected<PlaylistSummary>, FetchError> {
    PaginatedCollector::new(fetcher)
        .collect(
            &format!("/users/{user_id}/playlists"),
            PLAYLIST_PAGE_SIZE,
            |item| {
                Some(PlaylistSummary {
                    id: item.get("id")?.as_str()?.to_string(),
                    name: item.get("name")?.as_str()?.to_string(),
                })
            },
        )
        .await
}

/// Whether `playlist_id` is among the playlists of `user_id`.
///
/// A listing cut short by a rate limit cannot prove absence; that case is
/// reported as [`FetchError::RateLimitExceeded`].
pub async fn playlist_exists(
    fetcher: &RateLimitedFetcher,
    user_id: &str,
    playlist_id: &str,
) -> Result<bool, FetchError> {
    let playlists = list_user_playlists(fetcher, user_id).await?;
    if playlists.items.iter().any(|p| p.id == playlist_id) {
        return Ok(true);
    }
    absent_unless_rate_limited(&playlists).map(|()| false)
}

/// ID of the first playlist of `user_id` named `name`.
///
/// Same rate-limit rule as [`playlist_exists`].
pub async fn find_playlist_id(
    fetcher: &RateLimitedFetcher,
    user_id: &str,
    name: &str,
) -> Result<Option<String>, FetchError> {
    let playlists = list_user_playlists(fetcher, user_id).await?;
    if let Some(found) = playlists.items.iter().find(|p| p.name == name) {
        return Ok(Some(found.id.clone()));
    }
    absent_unless_rate_limited(&playlists).map(|()| None)
}

fn absent_unless_rate_limited(playlists: &Collected<PlaylistSummary>) -> Result<(), FetchError> {
    if playlists.rate_limited {
        return Err(FetchError::RateLimitExceeded {
            retry_after: playlists.retry_after.unwrap_or(DEFAULT_RETRY_AFTER),
        });
    }
    Ok(())
}
