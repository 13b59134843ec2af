use tabled::Table;

use crate::{
    analysis, error, info,
    spotify::{PlaylistMutator, playlist},
    success,
    types::PlaylistTableRow,
    warning,
};

use super::{
    auth::open_session,
    tracks::{DataInput, load_records},
};

/// Lists the playlists of the authenticated user.
pub async fn playlists() {
    let mut session = match open_session().await {
        Ok(session) => session,
        Err(e) => error!("{}", e),
    };

    let user_id = match session.user().await {
        Ok(user) => user.user_id.clone(),
        Err(e) => error!("Cannot read the user profile: {}", e),
    };

    match playlist::list_user_playlists(session.fetcher(), &user_id).await {
        Ok(playlists) => {
            if playlists.rate_limited {
                warning!(
                    "Rate limited: showing the first {} playlists only.",
                    playlists.len()
                );
            }
            let rows: Vec<PlaylistTableRow> = playlists
                .items
                .into_iter()
                .map(|p| PlaylistTableRow {
                    name: p.name,
                    id: p.id,
                })
                .collect();
            println!("{}", Table::new(rows));
        }
        Err(e) => error!("Failed to list playlists: {}", e),
    }
}

/// Builds a private playlist from the tracks whose `parameter` lies within
/// `value ± value·tolerance`.
pub async fn generate(
    input: DataInput,
    parameter: String,
    value: f64,
    tolerance: f64,
    name: String,
) {
    let records = match load_records(&input).await {
        Ok(records) => records,
        Err(e) => error!("Failed to load track data: {}", e),
    };

    let selected = match analysis::filter_by_parameter(&records, &parameter, value, tolerance) {
        Ok(selected) => selected,
        Err(e) => error!("{}", e),
    };

    if selected.is_empty() {
        warning!(
            "No track has a {} within {} ± {}%. Playlist not created.",
            parameter,
            value,
            tolerance * 100.0
        );
        return;
    }

    info!(
        "{} of {} tracks match {} {} ± {}%.",
        selected.len(),
        records.len(),
        parameter,
        value,
        tolerance * 100.0
    );
    let uris = analysis::track_uris(selected);

    let mut session = match open_session().await {
        Ok(session) => session,
        Err(e) => error!("{}", e),
    };

    let user_id = match session.user().await {
        Ok(user) => user.user_id.clone(),
        Err(e) => error!("Cannot read the user profile: {}", e),
    };

    let mutator = PlaylistMutator::new(session.fetcher());
    let playlist = match mutator.create(&user_id, &name).await {
        Ok(playlist) => {
            success!("Playlist {} created.", name);
            playlist
        }
        Err(e) => error!("Failed to create playlist: {}", e),
    };

    match mutator.append_tracks(&playlist.playlist_id, &uris).await {
        Ok(()) => success!("Added {} tracks to playlist {}.", uris.len(), name),
        Err(e) => error!(
            "Playlist {} was created but tracks could not be added: {}",
            name,
            e
        ),
    }
}
