use reqwest::Method;

use crate::{
    Res,
    spotify::SpotifyClient,
    types::{Playlist, PlaylistItem, TrackUrisRequest},
};

/// Spotify accepts at most this many URIs per playlist write.
pub const PLAYLIST_BATCH_SIZE: usize = 100;

const PLAYLIST_PAGE_LIMIT: u32 = 100;
const USER_PLAYLISTS_PAGE_LIMIT: u32 = 50;

impl SpotifyClient {
    /// Retrieves every item of a playlist.
    ///
    /// # Returns
    ///
    /// Raw [`PlaylistItem`]s, including entries whose track is gone
    /// (`track: null`). Callers skip those through [`PlaylistItem::uri`].
    ///
    /// # Errors
    ///
    /// A 404 for an unknown playlist, wrapped in [`crate::Error::Exhausted`].
    pub async fn list_playlist_tracks(&self, playlist_id: &str) -> Res<Vec<PlaylistItem>> {
        self.get_all_pages(
            &format!("listPlaylistTracks({playlist_id})"),
            &format!("/playlists/{playlist_id}/tracks"),
            &[],
            PLAYLIST_PAGE_LIMIT,
        )
        .await
    }

    pub async fn list_user_playlists(&self) -> Res<Vec<Playlist>> {
        self.get_all_pages(
            "listUserPlaylists",
            "/me/playlists",
            &[],
            USER_PLAYLISTS_PAGE_LIMIT,
        )
        .await
    }

    /// Appends URIs in order, one request per batch of
    /// [`PLAYLIST_BATCH_SIZE`].
    pub async fn append_tracks_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        for (i, batch) in uris.chunks(PLAYLIST_BATCH_SIZE).enumerate() {
            self.send(
                &format!("appendTracksToPlaylist(batch {})", i + 1),
                Method::POST,
                &format!("/playlists/{playlist_id}/tracks"),
                &[],
                Some(uris_body(batch)?),
            )
            .await?;
        }

        Ok(())
    }

    /// Replaces the playlist's contents with `uris`, keeping their order.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Playlist to rewrite
    /// * `uris` - The complete new contents; empty clears the playlist
    ///
    /// # Behavior
    ///
    /// The first batch replaces (clears and sets) the playlist, the rest is
    /// appended in [`PLAYLIST_BATCH_SIZE`] chunks. A failure after the first
    /// batch leaves the playlist holding only a prefix of `uris`.
    pub async fn replace_all_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        let split = uris.len().min(PLAYLIST_BATCH_SIZE);
        let (first, rest) = uris.split_at(split);

        self.send(
            "replaceAllTracks(batch 1)",
            Method::PUT,
            &format!("/playlists/{playlist_id}/tracks"),
            &[],
            Some(uris_body(first)?),
        )
        .await?;

        self.append_tracks_to_playlist(playlist_id, rest).await
    }
}

fn uris_body(uris: &[String]) -> Res<serde_json::Value> {
    Ok(serde_json::to_value(TrackUrisRequest {
        uris: uris.to_vec(),
    })?)
}
