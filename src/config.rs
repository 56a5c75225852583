//! Configuration management for the release bot.
//!
//! Values come from environment variables, optionally populated from `.env`
//! files. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)
//!
//! Only the Spotify client id is mandatory; everything else has a default
//! matching the public Spotify endpoints.

use std::{env, path::PathBuf, time::Duration};

use crate::{Error, Res};

pub const DEFAULT_SCOPES: &str =
    "playlist-read-private playlist-modify-public playlist-modify-private user-follow-read";

const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_MARKET: &str = "US";
const DEFAULT_SCAN_INTERVAL_HOURS: u64 = 12;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 2000;

/// Loads environment variables from `.env` files.
///
/// The platform-specific data directory (`~/.local/share/releasebot/.env` on
/// Linux) is tried first, then a `.env` in the working directory. Variables
/// already present in the environment are never overwritten, and a missing
/// file is not an error.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Res<()> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    for path in [dir.join(".env"), PathBuf::from(".env")] {
        if !path.is_file() {
            continue;
        }
        dotenv::from_path(&path).map_err(|e| {
            Error::Config(format!("cannot load {}: {}", path.display(), e))
        })?;
    }

    Ok(())
}

/// Directory holding `store.json`, `tokens.json` and the `.env` file.
///
/// Overridable with `RELEASEBOT_DATA_DIR`.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = optional("RELEASEBOT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("releasebot");
    path
}

pub fn store_path() -> PathBuf {
    data_dir().join("store.json")
}

pub fn tokens_path() -> PathBuf {
    data_dir().join("tokens.json")
}

/// Returns the Spotify API client ID.
///
/// # Errors
///
/// Fails with [`Error::Config`] when `SPOTIFY_CLIENT_ID` is not set.
pub fn spotify_client_id() -> Res<String> {
    required("SPOTIFY_CLIENT_ID")
}

/// Returns the client secret for confidential app registrations, if any.
///
/// The PKCE flow does not need it; when set it is sent along with token
/// requests.
pub fn spotify_client_secret() -> Option<String> {
    optional("SPOTIFY_CLIENT_SECRET")
}

pub fn spotify_redirect_uri() -> String {
    optional("SPOTIFY_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
}

/// Address the local OAuth callback server binds to.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
}

pub fn spotify_scope() -> String {
    optional("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPES.to_string())
}

pub fn spotify_apiauth_url() -> String {
    optional("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string())
}

pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string())
}

/// Market used when listing an artist's releases.
pub fn spotify_market() -> String {
    optional("SPOTIFY_MARKET").unwrap_or_else(|| DEFAULT_MARKET.to_string())
}

/// Statically configured playlist, used when none was selected.
pub fn target_playlist_id() -> Option<String> {
    optional("TARGET_PLAYLIST_ID")
}

/// Time between bot scans, from `SCAN_INTERVAL_HOURS`.
///
/// At least one hour; huge values saturate instead of overflowing.
pub fn scan_interval() -> Duration {
    interval_from_hours(parsed("SCAN_INTERVAL_HOURS", DEFAULT_SCAN_INTERVAL_HOURS))
}

pub fn interval_from_hours(hours: u64) -> Duration {
    Duration::from_secs(hours.max(1).saturating_mul(60 * 60))
}

pub fn retry_attempts() -> u32 {
    parsed("RETRY_ATTEMPTS", DEFAULT_RETRY_ATTEMPTS).max(1)
}

pub fn retry_delay() -> Duration {
    Duration::from_millis(parsed("RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS))
}

/// Everything needed to construct a [`crate::spotify::SpotifyClient`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub market: String,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl ProviderConfig {
    pub fn from_env() -> Res<Self> {
        Ok(Self {
            client_id: spotify_client_id()?,
            client_secret: spotify_client_secret(),
            redirect_uri: spotify_redirect_uri(),
            scope: spotify_scope(),
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
            market: spotify_market(),
            retry_attempts: retry_attempts(),
            retry_delay: retry_delay(),
        })
    }
}

fn required(key: &str) -> Res<String> {
    optional(key).ok_or_else(|| Error::Config(format!("{key} must be set")))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    optional(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
