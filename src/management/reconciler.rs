use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Res,
    filter::ReleaseFilter,
    info,
    management::scanner::{ArtistOutcome, ArtistScan, CatalogScanner},
    spotify::SpotifyClient,
    success,
    types::{Artist, ScannedTrack},
    utils, warning,
};

/// Result of a full catalog sync.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub added: usize,
    pub outcomes: Vec<ArtistOutcome>,
}

/// Keeps the target playlist in line with scan results.
///
/// Writes never introduce a URI that is already in the playlist or that
/// appears earlier in the same batch of candidates.
pub struct PlaylistReconciler<'a> {
    client: &'a SpotifyClient,
}

impl<'a> PlaylistReconciler<'a> {
    pub fn new(client: &'a SpotifyClient) -> Self {
        Self { client }
    }

    /// Appends the candidates that are not yet in the playlist.
    ///
    /// # Arguments
    ///
    /// * `tracks` - Candidates in scan order; repeats and tracks without a
    ///   URI are fine
    /// * `playlist_id` - Target playlist
    ///
    /// # Returns
    ///
    /// How many URIs were appended. Nothing is read or written when
    /// `tracks` is empty.
    ///
    /// # Errors
    ///
    /// Failing to read the playlist or to write a batch. Batches written
    /// before the failure stay in the playlist.
    pub async fn add_missing(&self, tracks: &[ScannedTrack], playlist_id: &str) -> Res<usize> {
        if tracks.is_empty() {
            return Ok(0);
        }

        let mut seen = self.existing_uris(playlist_id).await?;
        let to_add = utils::take_unseen(tracks.iter().map(ScannedTrack::uri), &mut seen);

        if to_add.is_empty() {
            info!("All tracks already in playlist.");
            return Ok(0);
        }

        info!("Adding {} new track(s) to playlist...", to_add.len());
        self.client
            .append_tracks_to_playlist(playlist_id, &to_add)
            .await?;
        success!("Added {} track(s).", to_add.len());

        Ok(to_add.len())
    }

    /// Walks each artist's full catalog and adds every track not yet in the
    /// playlist.
    ///
    /// Duplicates are tracked across artists, so a track credited to two
    /// tracked artists is added once. A failing artist is reported and
    /// skipped; the rest are still written.
    pub async fn sync_all(
        &self,
        artists: &[Artist],
        playlist_id: &str,
        filter: &ReleaseFilter,
    ) -> Res<SyncReport> {
        let scanner = CatalogScanner::new(self.client);
        let mut seen = self.existing_uris(playlist_id).await?;
        info!("Playlist currently has {} track(s).", seen.len());

        let mut report = SyncReport::default();
        let mut to_add = Vec::new();

        for artist in artists {
            let result = match scanner.artist_catalog(artist, filter).await {
                Ok(found) => {
                    let fresh =
                        utils::take_unseen(found.tracks.iter().map(ScannedTrack::uri), &mut seen);
                    info!("  {} new track(s) from {}", fresh.len(), artist.name);
                    let scanned = ArtistScan::Scanned {
                        releases: found.releases,
                        tracks: fresh.len(),
                    };
                    to_add.extend(fresh);
                    scanned
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warning!("Error syncing {}: {}", artist.name, e);
                    ArtistScan::failed(&e)
                }
            };

            report.outcomes.push(ArtistOutcome {
                artist: artist.clone(),
                result,
            });
        }

        if to_add.is_empty() {
            info!("Playlist is already up to date.");
            return Ok(report);
        }

        info!("Adding {} track(s) to playlist...", to_add.len());
        self.client
            .append_tracks_to_playlist(playlist_id, &to_add)
            .await?;
        report.added = to_add.len();
        success!("Sync complete, added {} track(s).", report.added);

        Ok(report)
    }

    /// Rewrites the playlist in a random order.
    ///
    /// # Returns
    ///
    /// The number of tracks written back, the same multiset as before.
    /// An empty playlist is left alone and yields `0`.
    pub async fn shuffle_and_replace(&self, playlist_id: &str) -> Res<usize> {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.shuffle_and_replace_with(playlist_id, &mut rng).await
    }

    /// [`PlaylistReconciler::shuffle_and_replace`] with a caller-chosen RNG.
    pub async fn shuffle_and_replace_with<R: Rng + Send + ?Sized>(
        &self,
        playlist_id: &str,
        rng: &mut R,
    ) -> Res<usize> {
        let items = self.client.list_playlist_tracks(playlist_id).await?;
        let mut uris: Vec<String> = items
            .iter()
            .filter_map(|item| item.uri().map(str::to_string))
            .collect();

        if uris.is_empty() {
            info!("Playlist is empty, nothing to shuffle.");
            return Ok(0);
        }

        utils::shuffle(&mut uris, rng);
        info!("Shuffling {} track(s)...", uris.len());
        self.client.replace_all_tracks(playlist_id, &uris).await?;
        success!("Playlist shuffled.");

        Ok(uris.len())
    }

    async fn existing_uris(&self, playlist_id: &str) -> Res<HashSet<String>> {
        let items = self.client.list_playlist_tracks(playlist_id).await?;
        Ok(items
            .iter()
            .filter_map(|item| item.uri().map(str::to_string))
            .collect())
    }
}
