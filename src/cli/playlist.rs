use tabled::Table;

use crate::{
    config, error, info,
    management::{PlaylistReconciler, PlaylistSelectionStore},
    success,
    types::PlaylistTableRow,
};

pub async fn list_playlists() {
    let session = super::session().await;
    let active = match session.store.active_playlist().await {
        Ok(active) => active.or_else(config::target_playlist_id),
        Err(e) => error!("Failed to load store. Err: {}", e),
    };

    let pb = super::spinner("Fetching playlists...");
    let playlists = session.client.list_user_playlists().await;
    pb.finish_and_clear();

    let playlists = match playlists {
        Ok(playlists) => playlists,
        Err(e) => error!("Failed to fetch playlists. Err: {}", e),
    };

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            active: if active.as_deref() == Some(p.id.as_str()) {
                "*".to_string()
            } else {
                String::new()
            },
            name: p.name,
            tracks: p.tracks.map_or(0, |t| t.total),
            id: p.id,
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub async fn select_playlist(playlist_id: String) {
    match super::store().set_active_playlist(playlist_id.clone()).await {
        Ok(()) => success!("Active playlist set to {}.", playlist_id),
        Err(e) => error!("Failed to save selection. Err: {}", e),
    }
}

pub async fn shuffle() {
    let session = super::session().await;
    let playlist_id = super::active_playlist(&session.store).await;

    info!("Shuffling playlist {}...", playlist_id);
    if let Err(e) = PlaylistReconciler::new(&session.client)
        .shuffle_and_replace(&playlist_id)
        .await
    {
        error!("Shuffle failed. Err: {}", e);
    }
}
