use crate::{
    error,
    filter::{ReleaseFilter, ReleaseType},
    info,
    management::{CatalogScanner, PlaylistReconciler, ScanOrchestrator, ScanSummary},
    success, utils, warning,
};

/// Adds the full (optionally filtered) catalog of every tracked artist.
pub async fn add_all(
    release_type: ReleaseType,
    from: Option<String>,
    to: Option<String>,
    assume_yes: bool,
) {
    let filter = match ReleaseFilter::from_input(release_type, from.as_deref(), to.as_deref()) {
        Ok(filter) => filter,
        Err(e) => error!("{}", e),
    };

    let session = super::session().await;
    let playlist_id = super::active_playlist(&session.store).await;
    let artists = super::tracked_artists(&session.store).await;

    let question = format!(
        "Add {} of {} artist(s) to playlist {}?",
        filter.describe(),
        artists.len(),
        playlist_id
    );
    if !super::confirm(&question, assume_yes).await {
        info!("Cancelled.");
        return;
    }

    let report = match CatalogScanner::new(&session.client)
        .scan_all(&artists, &filter)
        .await
    {
        Ok(report) => report,
        Err(e) => error!("Scan failed. Err: {}", e),
    };
    super::report_failures(report.failures());

    match PlaylistReconciler::new(&session.client)
        .add_missing(&report.tracks, &playlist_id)
        .await
    {
        Ok(added) => success!(
            "{} release(s), {} track(s) found, {} added.",
            report.releases(),
            report.tracks.len(),
            added
        ),
        Err(e) => error!("Failed to update playlist. Err: {}", e),
    }
}

/// Reconciles the playlist against every tracked artist's catalog.
pub async fn sync() {
    let session = super::session().await;
    let playlist_id = super::active_playlist(&session.store).await;
    let artists = super::tracked_artists(&session.store).await;

    info!("Syncing playlist {} with {} artist(s)...", playlist_id, artists.len());
    match PlaylistReconciler::new(&session.client)
        .sync_all(&artists, &playlist_id, &ReleaseFilter::everything())
        .await
    {
        Ok(report) => {
            super::report_failures(&report.outcomes);
            if report.added == 0 {
                success!("Nothing to add.");
            }
        }
        Err(e) => error!("Sync failed. Err: {}", e),
    }
}

pub async fn scan() {
    let session = super::session().await;
    let playlist_id = super::active_playlist(&session.store).await;
    super::tracked_artists(&session.store).await;

    let orchestrator = ScanOrchestrator::new(&session.client, &session.store, &session.store);
    match orchestrator.run_scan(&playlist_id).await {
        Ok(summary) => print_summary(&summary),
        Err(e) => error!("Scan failed. Err: {}", e),
    }
}

pub(crate) fn print_summary(summary: &ScanSummary) {
    super::report_failures(&summary.failures);
    if !summary.failures.is_empty() {
        warning!("{} artist(s) could not be scanned.", summary.failures.len());
    }
    success!(
        "Scan finished in {}: {} track(s) found, {} added.",
        utils::format_duration(summary.elapsed()),
        summary.found,
        summary.added
    );
}
