use chrono::{DateTime, Duration, Utc};

use crate::{
    Error, Res,
    filter::ReleaseFilter,
    info,
    spotify::{ReleaseQuery, SpotifyClient},
    types::{Album, Artist, ScannedTrack},
    warning,
};

/// Lookback used when no checkpoint has been stored yet.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 14;

const INCREMENTAL_GROUPS: &str = "album,single";

/// Lower bound for "new" releases: the checkpoint, or two weeks back.
pub fn cutoff(checkpoint: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    checkpoint.unwrap_or_else(|| now - Duration::days(DEFAULT_LOOKBACK_DAYS))
}

/// Outcome of scanning one artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtistScan {
    Scanned {
        releases: usize,
        tracks: usize,
    },
    Failed {
        reason: String,
        /// Spotify rejected the artist id itself (400/404).
        invalid_artist: bool,
    },
}

impl ArtistScan {
    pub(crate) fn failed(err: &Error) -> Self {
        ArtistScan::Failed {
            reason: err.to_string(),
            invalid_artist: matches!(err.status(), Some(400) | Some(404)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtistOutcome {
    pub artist: Artist,
    pub result: ArtistScan,
}

/// Tracks found in one pass plus what happened for every artist.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub tracks: Vec<ScannedTrack>,
    pub outcomes: Vec<ArtistOutcome>,
}

impl ScanReport {
    pub fn failures(&self) -> impl Iterator<Item = &ArtistOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, ArtistScan::Failed { .. }))
    }

    pub fn releases(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.result {
                ArtistScan::Scanned { releases, .. } => releases,
                ArtistScan::Failed { .. } => 0,
            })
            .sum()
    }
}

/// Selected releases of one artist and their tracks.
#[derive(Debug, Clone, Default)]
pub struct ArtistTracks {
    pub releases: usize,
    pub tracks: Vec<ScannedTrack>,
}

/// Turns tracked artists into candidate tracks.
///
/// Artists are scanned one after another. A failing artist is reported in
/// the [`ScanReport`] and skipped; only fatal errors (see
/// [`Error::is_fatal`]) abort the pass.
pub struct CatalogScanner<'a> {
    client: &'a SpotifyClient,
}

impl<'a> CatalogScanner<'a> {
    pub fn new(client: &'a SpotifyClient) -> Self {
        Self { client }
    }

    /// Tracks from releases dated strictly after the checkpoint.
    ///
    /// # Arguments
    ///
    /// * `artists` - Tracked artists, scanned in order
    /// * `checkpoint` - Last successful scan; `None` falls back to
    ///   [`DEFAULT_LOOKBACK_DAYS`]
    ///
    /// # Returns
    ///
    /// A [`ScanReport`] with every candidate track and one outcome per
    /// artist. Candidates may repeat and may already be in the playlist.
    ///
    /// # Errors
    ///
    /// Only fatal errors ([`Error::is_fatal`]); everything else is recorded
    /// as a failed artist.
    pub async fn scan_new(
        &self,
        artists: &[Artist],
        checkpoint: Option<DateTime<Utc>>,
    ) -> Res<ScanReport> {
        self.scan_since(artists, cutoff(checkpoint, Utc::now()))
            .await
    }

    /// Like [`CatalogScanner::scan_new`] with an explicit cutoff.
    pub async fn scan_since(&self, artists: &[Artist], cutoff: DateTime<Utc>) -> Res<ScanReport> {
        info!("Looking for releases after: {}", cutoff.date_naive());
        let query = ReleaseQuery::new(INCREMENTAL_GROUPS).market(self.client.market());
        let is_new = |album: &Album| album.resolved_date().is_some_and(|d| d > cutoff);

        self.scan(artists, &query, &is_new).await
    }

    /// Full catalog restricted by release type and optional date range.
    ///
    /// Releases with an unreadable date pass only when `filter` has no date
    /// bounds.
    pub async fn scan_all(&self, artists: &[Artist], filter: &ReleaseFilter) -> Res<ScanReport> {
        info!("Fetching {} for {} artist(s)...", filter.describe(), artists.len());
        let query = self.catalog_query(filter);
        let matches = |album: &Album| filter.matches(album);

        self.scan(artists, &query, &matches).await
    }

    /// Catalog of a single artist; errors are returned, not isolated.
    pub async fn artist_catalog(
        &self,
        artist: &Artist,
        filter: &ReleaseFilter,
    ) -> Res<ArtistTracks> {
        let query = self.catalog_query(filter);
        self.scan_artist(artist, &query, &|album: &Album| filter.matches(album))
            .await
    }

    fn catalog_query(&self, filter: &ReleaseFilter) -> ReleaseQuery {
        ReleaseQuery::new(filter.release_type.include_groups()).market(self.client.market())
    }

    async fn scan(
        &self,
        artists: &[Artist],
        query: &ReleaseQuery,
        keep: &(dyn Fn(&Album) -> bool + Sync),
    ) -> Res<ScanReport> {
        info!("Scanning {} artist(s)...", artists.len());
        let mut report = ScanReport::default();

        for artist in artists {
            let result = match self.scan_artist(artist, query, keep).await {
                Ok(found) => {
                    let scanned = ArtistScan::Scanned {
                        releases: found.releases,
                        tracks: found.tracks.len(),
                    };
                    report.tracks.extend(found.tracks);
                    scanned
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warning!("Error scanning {}: {}", artist.name, e);
                    ArtistScan::failed(&e)
                }
            };

            report.outcomes.push(ArtistOutcome {
                artist: artist.clone(),
                result,
            });
        }

        info!("Total tracks found: {}", report.tracks.len());
        Ok(report)
    }

    async fn scan_artist(
        &self,
        artist: &Artist,
        query: &ReleaseQuery,
        keep: &(dyn Fn(&Album) -> bool + Sync),
    ) -> Res<ArtistTracks> {
        info!("Scanning {}...", artist.name);
        let releases = self.client.list_artist_releases(&artist.id, query).await?;
        let selected: Vec<&Album> = releases.iter().filter(|album| keep(album)).collect();

        if selected.is_empty() {
            info!("  No matching releases.");
            return Ok(ArtistTracks::default());
        }
        info!("  Found {} release(s):", selected.len());

        let mut tracks = Vec::new();
        for album in &selected {
            info!("    {} ({}) - {}", album.name, album.album_type, album.release_date);
            let release_tracks = self.client.list_release_tracks(&album.id).await?;
            tracks.extend(release_tracks.into_iter().map(|track| ScannedTrack {
                track,
                release_name: album.name.clone(),
                artist_name: artist.name.clone(),
            }));
        }

        Ok(ArtistTracks {
            releases: selected.len(),
            tracks,
        })
    }
}
