use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::filter::DatePrecision;

/// OAuth credentials as persisted in `tokens.json`.
///
/// `expires_at` is epoch milliseconds and always describes `access_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenState {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Body of a successful token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<TokenState>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<Followers>,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            genres: Vec::new(),
            followers: None,
        }
    }

    /// The subset worth persisting in the tracked list.
    pub fn tracked(&self) -> Self {
        Self::new(self.id.clone(), self.name.clone())
    }
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub name: String,
    pub id: String,
}

#[derive(Tabled)]
pub struct SearchResultRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub name: String,
    pub followers: u64,
    pub genres: String,
}

/// Offset-paginated list as returned by most Spotify endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowedArtistsResponse {
    pub artists: ArtistsContainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistsContainer {
    pub items: Vec<Artist>,
    pub next: Option<String>,
    pub cursors: Option<Cursors>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArtistsResponse {
    pub artists: Paging<Artist>,
}

/// A catalog release (album, single, EP or compilation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub album_type: String,
    #[serde(default)]
    pub album_group: Option<String>,
    pub release_date: String,
    pub release_date_precision: DatePrecision,
    #[serde(default)]
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub artists: Vec<AlbumArtist>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<AlbumArtist>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub track_number: Option<u32>,
}

/// A track found during a scan, tagged with where it was found.
///
/// The release and artist names are informational only; identity is the
/// track URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTrack {
    pub track: Track,
    pub release_name: String,
    pub artist_name: String,
}

impl ScannedTrack {
    pub fn uri(&self) -> Option<&str> {
        self.track.uri.as_deref().filter(|u| !u.is_empty())
    }
}

/// One entry of a playlist. `track` is `None` for removed or unavailable
/// tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub track: Option<Track>,
}

impl PlaylistItem {
    pub fn uri(&self) -> Option<&str> {
        self.track
            .as_ref()
            .and_then(|t| t.uri.as_deref())
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracksRef>,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksRef {
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub active: String,
    pub name: String,
    pub tracks: u32,
    pub id: String,
}

#[derive(Tabled)]
pub struct PresetTableRow {
    pub name: String,
    pub artists: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUrisRequest {
    pub uris: Vec<String>,
}
