use clap::ValueEnum;
use indicatif::ProgressBar;

use crate::{
    Res, config, error, info,
    management::TrackStore,
    spotify::{
        Collected, FeatureBatch, FeatureFetcher, FetchError, RateLimitedFetcher, Session, library,
    },
    success,
    types::TrackFeatureRecord,
    utils, warning,
};

use super::{auth::open_session, spinner};

/// Remote collections tracks can be gathered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Liked songs
    Liked,
    /// Tracks of all albums saved in the library
    Albums,
    /// Tracks of one playlist (requires --playlist-id)
    Playlist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Liked,
    Albums,
    Playlist(String),
}

impl Source {
    pub fn from_kind(kind: SourceKind, playlist_id: Option<String>) -> Result<Self, String> {
        match kind {
            SourceKind::Liked => Ok(Source::Liked),
            SourceKind::Albums => Ok(Source::Albums),
            SourceKind::Playlist => playlist_id
                .map(Source::Playlist)
                .ok_or_else(|| "--source playlist requires --playlist-id".to_string()),
        }
    }

    pub fn default_table(&self) -> String {
        match self {
            Source::Liked => "liked_tracks".to_string(),
            Source::Albums => "saved_albums".to_string(),
            Source::Playlist(id) => utils::playlist_table_name(id),
        }
    }

    fn describe(&self) -> String {
        match self {
            Source::Liked => "liked tracks".to_string(),
            Source::Albums => "saved albums".to_string(),
            Source::Playlist(id) => format!("playlist {id}"),
        }
    }
}

/// Where analysed records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataInput {
    Table(String),
    Spotify(Source),
}

/// Collects track IDs from `source` and looks up their features.
///
/// When the ID collection is cut short by a rate limit the feature pass is
/// skipped and the returned batch is empty, flagged `rate_limited`.
pub async fn collect_features(session: &Session, source: &Source) -> Res<FeatureBatch> {
    let pb = spinner(format!("Collecting track IDs from {}...", source.describe()));
    let fetcher = session.fetcher();

    let ids = match source_track_ids(fetcher, source, &pb).await {
        Ok(ids) => ids,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    if ids.rate_limited {
        pb.finish_and_clear();
        warning!(
            "Rate limited while collecting track IDs from {} ({} collected, retry in {}s). Audio features were not fetched.",
            source.describe(),
            ids.len(),
            ids.retry_after.unwrap_or_default()
        );
        return Ok(FeatureBatch {
            requested: ids.len(),
            rate_limited: true,
            ..FeatureBatch::default()
        });
    }

    let mut ids = ids.items;
    utils::remove_duplicate_ids(&mut ids);

    pb.set_message(format!("Fetching audio features of {} tracks...", ids.len()));
    let batch = FeatureFetcher::new(fetcher).fetch_all(&ids).await;
    pb.finish_and_clear();

    if batch.rate_limited {
        warning!(
            "Rate limited: retrieved features of {} of {} tracks.",
            batch.retrieved(),
            batch.requested
        );
    }
    if !batch.omitted.is_empty() {
        warning!("{} tracks have no audio features and were skipped.", batch.omitted.len());
    }

    Ok(batch)
}

async fn source_track_ids(
    fetcher: &RateLimitedFetcher,
    source: &Source,
    pb: &ProgressBar,
) -> Result<Collected<String>, FetchError> {
    match source {
        Source::Liked => library::saved_track_ids(fetcher).await,
        Source::Playlist(id) => library::playlist_track_ids(fetcher, id).await,
        Source::Albums => {
            let albums = library::library_album_ids(fetcher).await?;
            if albums.rate_limited {
                return Ok(Collected {
                    items: Vec::new(),
                    ..albums
                });
            }
            pb.set_message(format!("Collecting tracks of {} albums...", albums.len()));
            library::album_track_ids(fetcher, &albums.items).await
        }
    }
}

/// Loads records from a local table or fetches them from Spotify.
pub async fn load_records(input: &DataInput) -> Res<Vec<TrackFeatureRecord>> {
    match input {
        DataInput::Table(table) => {
            let store = TrackStore::connect(&config::database_path()).await?;
            let table = utils::table_name(table);
            if !store.table_exists(&table).await? {
                return Err(format!("Table {table} does not exist.").into());
            }
            let records = store.read_records(&table).await?;
            store.close().await;
            Ok(records)
        }
        DataInput::Spotify(source) => {
            let session = open_session().await?;
            Ok(collect_features(&session, source).await?.records)
        }
    }
}

/// Fetches features of `source` and optionally saves them to a table.
pub async fn tracks(source: Source, save: bool, table: Option<String>, replace: bool) {
    let session = match open_session().await {
        Ok(session) => session,
        Err(e) => error!("{}", e),
    };

    let batch = match collect_features(&session, &source).await {
        Ok(batch) => batch,
        Err(e) => error!("Failed to collect tracks: {}", e),
    };

    success!(
        "Fetched audio features of {} tracks from {}.",
        batch.retrieved(),
        source.describe()
    );

    if !save {
        return;
    }
    if batch.records.is_empty() {
        warning!("No audio features to save.");
        return;
    }

    let table = utils::table_name(&table.unwrap_or_else(|| source.default_table()));
    if let Err(e) = save_records(&table, &batch.records, replace).await {
        error!("Failed to save tracks to table {}: {}", table, e);
    }
}

async fn save_records(table: &str, records: &[TrackFeatureRecord], replace: bool) -> Res<()> {
    let store = TrackStore::connect(&config::database_path()).await?;

    if store.table_exists(table).await? && !replace {
        warning!(
            "Table {} already exists. Use --replace to flush it and store the new data.",
            table
        );
        store.close().await;
        return Ok(());
    }

    let written = store.replace_records(table, records).await?;
    store.close().await;
    info!("Database: {}", config::database_path().display());
    success!("Saved {} tracks to table {}.", written, table);
    Ok(())
}
