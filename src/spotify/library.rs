//! Read access to the user's library: profile, liked tracks, saved albums,
//! album tracks and playlist tracks.
//!
//! Every collection walk returns a [`Collected`] so callers see when a rate
//! limit cut it short.

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    spotify::{Collected, FetchError, PaginatedCollector, RateLimitedFetcher},
    types::UserIdentity,
};

pub const SAVED_TRACKS_PAGE_SIZE: u32 = 50;
pub const SAVED_ALBUMS_PAGE_SIZE: u32 = 50;
pub const PLAYLIST_TRACKS_PAGE_SIZE: u32 = 100;
pub const ALBUM_TRACKS_PAGE_SIZE: u32 = 50;

/// Fetches the profile of the authenticated user (`GET /me`).
///
/// # Errors
///
/// - [`FetchError::MalformedResponse`] when the profile carries no `id`
/// - Any error of [`RateLimitedFetcher::fetch`]
pub async fn current_user(fetcher: &RateLimitedFetcher) -> Result<UserIdentity, FetchError> {
    let me = fetcher.get("/me", &[]).await?;
    let user_id = me
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::MalformedResponse("profile has no 'id'".to_string()))?;

    Ok(UserIdentity {
        user_id: user_id.to_string(),
    })
}

/// IDs of the user's liked tracks (`GET /me/tracks`), newest first.
pub async fn saved_track_ids(
    fetcher: &RateLimitedFetcher,
) -> Result<Collected<String>, FetchError> {
    PaginatedCollector::new(fetcher)
        .collect("/me/tracks", SAVED_TRACKS_PAGE_SIZE, nested_id("track"))
        .await
}

/// IDs of the tracks of one playlist (`GET /playlists/{id}/tracks`).
pub async fn playlist_track_ids(
    fetcher: &RateLimitedFetcher,
    playlist_id: &str,
) -> Result<Collected<String>, FetchError> {
    PaginatedCollector::new(fetcher)
        .collect(
            &format!("/playlists/{playlist_id}/tracks"),
            PLAYLIST_TRACKS_PAGE_SIZE,
            nested_id("track"),
        )
        .await
}

/// IDs of the albums saved in the user's library (`GET /me/albums`).
pub async fn library_album_ids(
    fetcher: &RateLimitedFetcher,
) -> Result<Collected<String>, FetchError> {
    PaginatedCollector::new(fetcher)
        .collect("/me/albums", SAVED_ALBUMS_PAGE_SIZE, nested_id("album"))
        .await
}

/// Track IDs of every album in `album_ids`, album by album.
///
/// # Arguments
///
/// * `fetcher` - Authenticated fetcher
/// * `album_ids` - Albums to walk, in the order their tracks are wanted
///
/// # Returns
///
/// The track IDs of all walked albums in order. A rejected album is logged
/// and skipped. A rate limit on any album stops the walk: the albums after
/// it are never requested and the result is marked `rate_limited`.
///
/// # Errors
///
/// Errors other than a rejected album or a rate limit (malformed pages,
/// transport failures, a missing token) abort the walk.
pub async fn album_track_ids<S: AsRef<str>>(
    fetcher: &RateLimitedFetcher,
    album_ids: &[S],
) -> Result<Collected<String>, FetchError> {
    let collector = PaginatedCollector::new(fetcher);
    let mut tracks = Collected::default();
    let mut skipped_albums = 0usize;

    for (done, album_id) in album_ids.iter().enumerate() {
        let album_id = album_id.as_ref();
        let endpoint = format!("/albums/{album_id}/tracks");
        match collector
            .collect(&endpoint, ALBUM_TRACKS_PAGE_SIZE, top_level_id)
            .await
        {
            Ok(album) => {
                tracks.items.extend(album.items);
                if album.rate_limited {
                    warn!(
                        albums_done = done,
                        albums_total = album_ids.len(),
                        "rate limited, album walk stopped early"
                    );
                    tracks.rate_limited = true;
                    tracks.retry_after = album.retry_after;
                    break;
                }
            }
            Err(FetchError::Rejected { status, .. }) => {
                warn!(album_id, status, "skipping album");
                skipped_albums += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        albums = album_ids.len(),
        skipped_albums,
        tracks = tracks.len(),
        rate_limited = tracks.rate_limited,
        "album tracks collected"
    );
    Ok(tracks)
}

/// Extractor for `items[].<key>.id`. Null entries (local files, removed
/// tracks) yield `None`.
fn nested_id(key: &'static str) -> impl Fn(&Value) -> Option<String> {
    move |item| {
        item.get(key)?
            .get("id")?
            .as_str()
            .map(str::to_string)
    }
}

fn top_level_id(item: &Value) -> Option<String> {
    item.get("id")?.as_str().map(str::to_string)
}
