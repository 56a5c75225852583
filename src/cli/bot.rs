use std::future::Future;

use tokio::time::{self, Interval, MissedTickBehavior};

use crate::{config, error, info, management::ScanOrchestrator, warning};

/// Scans immediately and then every `SCAN_INTERVAL_HOURS` until SIGINT or
/// SIGTERM. A scan already running when the signal arrives is finished.
pub async fn bot() {
    let session = super::session().await;
    let playlist_id = super::active_playlist(&session.store).await;
    super::tracked_artists(&session.store).await;

    let period = config::scan_interval();
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut shutdown = match Shutdown::listen() {
        Ok(shutdown) => shutdown,
        Err(e) => error!("Failed to set up signal handlers. Err: {}", e),
    };

    info!(
        "Bot started. Scanning playlist {} every {}h, press Ctrl+C to stop.",
        playlist_id,
        period.as_secs_f64() / 3600.0
    );

    let orchestrator = ScanOrchestrator::new(&session.client, &session.store, &session.store);
    loop {
        if !wait_for_tick(&mut ticker, shutdown.recv()).await {
            info!("Shutting down, no further scans scheduled.");
            break;
        }

        match orchestrator.run_scan(&playlist_id).await {
            Ok(summary) => super::releases::print_summary(&summary),
            Err(e) => warning!("Scan failed: {}. Will retry on next scheduled run.", e),
        }
    }
}

/// Waits for the next scheduled scan.
///
/// Returns `false` as soon as `shutdown` completes. A pending shutdown wins
/// over a tick that is also due, so a scan that overran its interval is
/// never followed by another one after a stop was requested.
pub async fn wait_for_tick(ticker: &mut Interval, shutdown: impl Future<Output = ()>) -> bool {
    tokio::select! {
        biased;
        _ = shutdown => false,
        _ = ticker.tick() => true,
    }
}

/// Signal listeners registered once, so a signal delivered during a scan
/// is seen by the next `recv`.
struct Shutdown {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl Shutdown {
    #[cfg(unix)]
    fn listen() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    fn listen() -> std::io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        let _ = tokio::signal::ctrl_c().await;
    }
}
