//! Domain layer: token lifecycle, persistence, catalog scanning and
//! playlist reconciliation.

mod auth;
mod orchestrator;
mod reconciler;
mod scanner;
mod store;

pub use auth::{ActiveCredential, CredentialStore, REFRESH_WINDOW_MS, TokenFile, TokenGuard, TokenRefresher};
pub use orchestrator::{ScanOrchestrator, ScanSummary};
pub use reconciler::{PlaylistReconciler, SyncReport};
pub use scanner::{
    ArtistOutcome, ArtistScan, ArtistTracks, CatalogScanner, DEFAULT_LOOKBACK_DAYS, ScanReport, cutoff,
};
pub use store::{
    ArtistStore, CheckpointStore, JsonStore, PlaylistSelectionStore, PresetStore, StoreDocument,
    resolve_playlist,
};
