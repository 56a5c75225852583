use chrono::{DateTime, Utc};

use crate::{
    Error, Res,
    filter::{format_checkpoint, parse_checkpoint},
    info,
    management::{
        reconciler::PlaylistReconciler,
        scanner::{ArtistOutcome, CatalogScanner},
        store::{ArtistStore, CheckpointStore},
    },
    spotify::SpotifyClient,
    warning,
};

/// What one incremental scan did.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub found: usize,
    pub added: usize,
    pub failures: Vec<ArtistOutcome>,
}

impl ScanSummary {
    pub fn elapsed(&self) -> std::time::Duration {
        (self.finished - self.started).to_std().unwrap_or_default()
    }
}

/// Scanner, then reconciler, then checkpoint.
pub struct ScanOrchestrator<'a> {
    client: &'a SpotifyClient,
    artists: &'a dyn ArtistStore,
    checkpoints: &'a dyn CheckpointStore,
}

impl<'a> ScanOrchestrator<'a> {
    pub fn new(
        client: &'a SpotifyClient,
        artists: &'a dyn ArtistStore,
        checkpoints: &'a dyn CheckpointStore,
    ) -> Self {
        Self {
            client,
            artists,
            checkpoints,
        }
    }

    /// Adds releases newer than the last checkpoint to `playlist_id`.
    ///
    /// The checkpoint moves to the instant the scan *started*, so releases
    /// published while it runs are picked up next time. If anything
    /// propagates an error the checkpoint is left as it was.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Precondition`] when no artist is tracked
    /// - fatal token errors from the scanner
    /// - any failure reading or writing the playlist or the store
    pub async fn run_scan(&self, playlist_id: &str) -> Res<ScanSummary> {
        let started = Utc::now();
        info!("Scan started at {}", format_checkpoint(started));

        let artists = self.artists.list().await?;
        if artists.is_empty() {
            return Err(Error::precondition(
                "no artists tracked, add some with `releasebot artists add <name>`",
            ));
        }

        let checkpoint = match self.checkpoints.last_checked().await? {
            Some(raw) => {
                let parsed = parse_checkpoint(&raw);
                if parsed.is_none() {
                    warning!("Ignoring unreadable checkpoint \"{}\", using default lookback", raw);
                }
                parsed
            }
            None => None,
        };

        let report = CatalogScanner::new(self.client)
            .scan_new(&artists, checkpoint)
            .await?;
        let added = PlaylistReconciler::new(self.client)
            .add_missing(&report.tracks, playlist_id)
            .await?;

        self.checkpoints
            .set_last_checked(format_checkpoint(started))
            .await?;

        let failures = report.failures().cloned().collect();
        Ok(ScanSummary {
            started,
            finished: Utc::now(),
            found: report.tracks.len(),
            added,
            failures,
        })
    }
}
