//! # CLI Module
//!
//! User-facing commands of the release bot. Each command checks its
//! preconditions (configuration, stored tokens, a resolvable playlist, at
//! least one tracked artist) before doing any network work, then delegates
//! to the management layer and reports the outcome.
//!
//! ## Commands
//!
//! - [`auth`] - one-time Spotify authorization (PKCE)
//! - [`list_artists`], [`add_artist`], [`remove_artist`], [`import_artists`] -
//!   the tracked artist list
//! - [`list_playlists`], [`select_playlist`], [`shuffle`] - the target playlist
//! - [`add_all`], [`sync`], [`scan`] - filling the playlist
//! - [`bot`] - scheduled scans until interrupted
//! - [`list_presets`], [`save_preset`], [`load_preset`], [`delete_preset`] -
//!   named snapshots of the artist list
//!
//! ## Error Handling
//!
//! Library calls return [`crate::Error`]. Commands turn fatal errors into a
//! message and a non-zero exit through the `error!` macro; partial failures
//! (a single artist that could not be scanned) are printed as warnings and
//! the command carries on.

mod artists;
mod auth;
mod bot;
mod playlist;
mod presets;
mod releases;

use std::{io::Write, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};

pub use artists::{add_artist, import_artists, list_artists, remove_artist};
pub use auth::auth;
pub use bot::{bot, wait_for_tick};
pub use playlist::{list_playlists, select_playlist, shuffle};
pub use presets::{delete_preset, list_presets, load_preset, save_preset};
pub use releases::{add_all, scan, sync};

use crate::{
    Error, config,
    config::ProviderConfig,
    error,
    management::{
        ArtistOutcome, ArtistScan, ArtistStore, CredentialStore, JsonStore, TokenFile,
        resolve_playlist,
    },
    spotify::{HttpTransport, SpotifyClient, Transport},
    types::Artist,
    warning,
};

/// An authenticated client and the local store.
pub(crate) struct Session {
    pub client: SpotifyClient,
    pub store: JsonStore,
}

pub(crate) fn provider_config() -> ProviderConfig {
    match ProviderConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    }
}

/// Builds the client, exiting when no tokens have been stored yet.
pub(crate) async fn session() -> Session {
    let config = provider_config();
    let credentials = TokenFile::new(config::tokens_path());

    match credentials.load().await {
        Ok(Some(_)) => {}
        Ok(None) => error!("{}", Error::Unauthenticated),
        Err(e) => error!("Failed to load tokens. Err: {}", e),
    }

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new());
    Session {
        client: SpotifyClient::from_config(&config, transport, Arc::new(credentials)),
        store: JsonStore::new(config::store_path()),
    }
}

pub(crate) fn store() -> JsonStore {
    JsonStore::new(config::store_path())
}

pub(crate) async fn active_playlist(store: &JsonStore) -> String {
    match resolve_playlist(store, config::target_playlist_id()).await {
        Ok(id) => id,
        Err(e) => error!("{}", e),
    }
}

pub(crate) async fn tracked_artists(store: &JsonStore) -> Vec<Artist> {
    match store.list().await {
        Ok(artists) if artists.is_empty() => error!(
            "{}",
            Error::precondition("no artists tracked, add some with `releasebot artists add <name>`")
        ),
        Ok(artists) => artists,
        Err(e) => error!("Failed to load artists. Err: {}", e),
    }
}

pub(crate) fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Reads one trimmed line from stdin after printing `question`.
pub(crate) async fn prompt(question: &str) -> Option<String> {
    print!("{question} ");
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

pub(crate) async fn confirm(question: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    prompt(&format!("{question} [y/N]"))
        .await
        .is_some_and(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// Prints failed artists and suggests removing ids Spotify rejected.
pub(crate) fn report_failures<'a>(outcomes: impl IntoIterator<Item = &'a ArtistOutcome>) {
    for outcome in outcomes {
        if let ArtistScan::Failed {
            reason,
            invalid_artist,
        } = &outcome.result
        {
            warning!("{} could not be scanned: {}", outcome.artist.name, reason);
            if *invalid_artist {
                warning!(
                    "  Spotify does not know this artist, consider `releasebot artists remove {}`",
                    outcome.artist.id
                );
            }
        }
    }
}
