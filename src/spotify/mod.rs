//! # Spotify Integration Module
//!
//! The integration layer between the bot and the Spotify Web API. It owns
//! HTTP communication, authentication, pagination and the retry policy, and
//! exposes typed accessors to the management layer.
//!
//! ## Architecture
//!
//! ```text
//! Management Layer (scanner, reconciler, orchestrator)
//!          ↓
//! SpotifyClient accessors
//!     ├── artists   (followed artists, search)
//!     ├── releases  (artist releases, release tracks)
//!     └── playlist  (items, user playlists, append, replace)
//!          ↓
//! SpotifyClient::send
//!     ├── TokenGuard::ensure_valid  (before every attempt)
//!     └── RetryingCaller::call      (rate limits, linear backoff)
//!          ↓
//! Transport (reqwest in production)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Pagination
//!
//! - Offset endpoints (`/artists/{id}/albums`, `/albums/{id}/tracks`,
//!   `/playlists/{id}/tracks`, `/me/playlists`) are fetched until
//!   `offset >= total`.
//! - `/me/following` uses an opaque `after` cursor and stops when no cursor
//!   is returned.
//! - Search is a single page.
//!
//! Each page request is its own retried call, so a transient failure on
//! page five does not refetch pages one to four.
//!
//! ## Writes
//!
//! Playlist writes are split into batches of 100 URIs (Spotify's hard
//! limit) and issued sequentially so that playlist order follows the input
//! order.
//!
//! ## Authentication
//!
//! [`auth`] implements the one-time OAuth 2.0 PKCE authorization flow
//! (browser + local callback server) and the token endpoint client used for
//! refreshes.

pub mod artists;
pub mod auth;
pub mod client;
pub mod playlist;
pub mod releases;
pub mod retry;
pub mod transport;

pub use client::SpotifyClient;
pub use playlist::PLAYLIST_BATCH_SIZE;
pub use releases::ReleaseQuery;
pub use retry::RetryingCaller;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
