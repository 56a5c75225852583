use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    Error, Res, info, success,
    types::{TokenResponse, TokenState},
    warning,
};

/// Refresh ahead of expiry by this much.
pub const REFRESH_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Where the OAuth tokens live between runs.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `None` means no token was ever persisted.
    async fn load(&self) -> Res<Option<TokenState>>;
    async fn save(&self, state: &TokenState) -> Res<()>;
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Res<TokenResponse>;
}

/// Access token handed to a single outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCredential {
    pub access_token: String,
}

/// Owns the process' token state and refreshes it before it expires.
///
/// The state sits behind one async mutex held across the refresh, so
/// concurrent callers never refresh twice or observe a half-updated token.
pub struct TokenGuard {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    state: Mutex<Option<TokenState>>,
}

impl TokenGuard {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            state: Mutex::new(None),
        }
    }

    /// Returns a usable access token, refreshing and persisting first when
    /// it expires within [`REFRESH_WINDOW_MS`].
    ///
    /// The lock is held across load, refresh and save, so at most one
    /// refresh is in flight no matter how many requests wait on it.
    ///
    /// # Returns
    ///
    /// The access token to put on a single outbound request.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthenticated`] when no token was ever stored
    /// - [`Error::TokenRefresh`] when the refresh call fails; the expired
    ///   token is never handed out
    /// - [`Error::TokenRefresh`] when the refreshed token cannot be
    ///   persisted; it stays in memory so the next call does not refresh
    ///   again with a rotated-out refresh token
    pub async fn ensure_valid(&self) -> Res<ActiveCredential> {
        let mut guard = self.state.lock().await;

        if guard.is_none() {
            *guard = self.store.load().await?;
        }
        let current = guard.as_ref().ok_or(Error::Unauthenticated)?;

        let now = Utc::now().timestamp_millis();
        if now < current.expires_at - REFRESH_WINDOW_MS {
            return Ok(ActiveCredential {
                access_token: current.access_token.clone(),
            });
        }

        info!("Refreshing access token...");
        let response = self
            .refresher
            .refresh(&current.refresh_token)
            .await
            .map_err(|e| match e {
                Error::TokenRefresh(reason) => Error::TokenRefresh(reason),
                other => Error::TokenRefresh(other.to_string()),
            })?;

        let refreshed = TokenState {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| current.refresh_token.clone()),
            expires_at: Utc::now().timestamp_millis() + (response.expires_in as i64) * 1000,
        };
        let credential = ActiveCredential {
            access_token: refreshed.access_token.clone(),
        };
        let saved = self.store.save(&refreshed).await;
        *guard = Some(refreshed);

        if let Err(e) = saved {
            return Err(Error::TokenRefresh(format!(
                "refreshed token could not be saved: {e}"
            )));
        }
        success!("Access token refreshed.");

        Ok(credential)
    }
}

/// `tokens.json` in the data directory.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for TokenFile {
    async fn load(&self) -> Res<Option<TokenState>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warning!("Failed to read tokens from {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &TokenState) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(state)?;
        write_atomically(&self.path, json).await
    }
}

/// Writes to a sibling temp file and renames it over the target.
pub(crate) async fn write_atomically(path: &Path, contents: String) -> Res<()> {
    let tmp = path.with_extension("json.tmp");
    async_fs::write(&tmp, contents).await?;
    async_fs::rename(&tmp, path).await?;
    Ok(())
}
