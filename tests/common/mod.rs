#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{Value, json};

use releasebot::{
    Error, Res,
    management::{CredentialStore, TokenGuard, TokenRefresher},
    spotify::{ApiRequest, ApiResponse, RetryingCaller, SpotifyClient, Transport},
    types::{Artist, ScannedTrack, TokenResponse, TokenState, Track},
};

pub const API_URL: &str = "https://api.spotify.test/v1";

/// In-memory stand-in for the Spotify Web API.
///
/// Serves releases, tracks and playlists from plain JSON, applies playlist
/// writes, records every request and can be told to answer a path with
/// canned responses first.
#[derive(Default)]
pub struct FakeSpotify {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    releases: HashMap<String, Vec<Value>>,
    tracks: HashMap<String, Vec<Value>>,
    playlists: HashMap<String, Vec<String>>,
    user_playlists: Vec<Value>,
    followed: Vec<Value>,
    search: Vec<Value>,
    scripted: HashMap<String, VecDeque<ApiResponse>>,
    requests: Vec<ApiRequest>,
}

impl FakeSpotify {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn add_release(&self, artist_id: &str, release: Value, track_ids: &[&str]) {
        let release_id = release["id"].as_str().unwrap().to_string();
        let tracks = track_ids.iter().map(|id| track_json(id)).collect();
        self.with(|s| {
            s.releases
                .entry(artist_id.to_string())
                .or_default()
                .push(release);
            s.tracks.insert(release_id, tracks);
        });
    }

    /// Registers an artist without releases so that scanning it succeeds.
    pub fn add_artist(&self, artist_id: &str) {
        self.with(|s| {
            s.releases.entry(artist_id.to_string()).or_default();
        });
    }

    pub fn set_playlist(&self, playlist_id: &str, uris: &[&str]) {
        self.with(|s| {
            s.playlists.insert(
                playlist_id.to_string(),
                uris.iter().map(|u| u.to_string()).collect(),
            );
        });
    }

    pub fn playlist(&self, playlist_id: &str) -> Vec<String> {
        self.with(|s| s.playlists.get(playlist_id).cloned().unwrap_or_default())
    }

    pub fn set_followed(&self, artists: &[(&str, &str)]) {
        self.with(|s| s.followed = artists.iter().map(|(id, name)| artist_json(id, name)).collect());
    }

    pub fn set_search_results(&self, artists: &[(&str, &str)]) {
        self.with(|s| s.search = artists.iter().map(|(id, name)| artist_json(id, name)).collect());
    }

    pub fn set_user_playlists(&self, playlists: Vec<Value>) {
        self.with(|s| s.user_playlists = playlists);
    }

    /// Answers the next requests to `path` with `responses`, in order.
    pub fn script(&self, path: &str, responses: Vec<ApiResponse>) {
        self.with(|s| {
            s.scripted
                .entry(path.to_string())
                .or_default()
                .extend(responses)
        });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.with(|s| s.requests.clone())
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && path_of(r) == path)
            .collect()
    }

    fn route(state: &mut FakeState, request: &ApiRequest) -> ApiResponse {
        let path = path_of(request);
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["me", "following"]) => followed_page(&state.followed, request),
            ("GET", ["search"]) => ApiResponse::ok(json!({
                "artists": { "items": state.search, "total": state.search.len(), "next": null }
            })),
            ("GET", ["me", "playlists"]) => page(&state.user_playlists, request),
            ("GET", ["artists", id, "albums"]) => match state.releases.get(*id) {
                Some(releases) => {
                    let groups = request.param("include_groups").unwrap_or("album,single");
                    let selected: Vec<Value> = releases
                        .iter()
                        .filter(|r| {
                            let group = r["album_group"].as_str().unwrap_or("album");
                            groups.split(',').any(|g| g == group)
                        })
                        .cloned()
                        .collect();
                    page(&selected, request)
                }
                None => not_found(),
            },
            ("GET", ["albums", id, "tracks"]) => match state.tracks.get(*id) {
                Some(tracks) => page(tracks, request),
                None => not_found(),
            },
            ("GET", ["playlists", id, "tracks"]) => match state.playlists.get(*id) {
                Some(uris) => {
                    let items: Vec<Value> = uris
                        .iter()
                        .map(|uri| json!({ "track": { "name": uri, "uri": uri } }))
                        .collect();
                    page(&items, request)
                }
                None => not_found(),
            },
            ("POST", ["playlists", id, "tracks"]) => {
                let uris = body_uris(request);
                state.playlists.entry(id.to_string()).or_default().extend(uris);
                ApiResponse::with_status(201, json!({ "snapshot_id": "snap" }))
            }
            ("PUT", ["playlists", id, "tracks"]) => {
                state.playlists.insert(id.to_string(), body_uris(request));
                ApiResponse::ok(json!({ "snapshot_id": "snap" }))
            }
            _ => not_found(),
        }
    }
}

#[async_trait]
impl Transport for FakeSpotify {
    async fn execute(&self, request: ApiRequest) -> Res<ApiResponse> {
        self.with(|s| {
            s.requests.push(request.clone());
            let path = path_of(&request);
            if let Some(response) = s.scripted.get_mut(&path).and_then(VecDeque::pop_front) {
                return Ok(response);
            }
            Ok(Self::route(s, &request))
        })
    }
}

pub fn path_of(request: &ApiRequest) -> String {
    request
        .url
        .strip_prefix(API_URL)
        .unwrap_or(&request.url)
        .to_string()
}

fn offset_and_limit(request: &ApiRequest) -> (usize, usize) {
    let offset = request.param("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit = request.param("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    (offset, limit)
}

fn page(items: &[Value], request: &ApiRequest) -> ApiResponse {
    let (offset, limit) = offset_and_limit(request);
    let slice: Vec<Value> = items.iter().skip(offset).take(limit).cloned().collect();
    let next = (offset + limit < items.len()).then(|| "next-page".to_string());
    ApiResponse::ok(json!({ "items": slice, "total": items.len(), "next": next }))
}

fn followed_page(items: &[Value], request: &ApiRequest) -> ApiResponse {
    let start = request.param("after").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit = request.param("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let slice: Vec<Value> = items.iter().skip(start).take(limit).cloned().collect();
    let after = (start + limit < items.len()).then(|| (start + limit).to_string());
    ApiResponse::ok(json!({
        "artists": {
            "items": slice,
            "next": after.as_ref().map(|_| "next-page"),
            "cursors": { "after": after },
            "total": items.len(),
        }
    }))
}

fn body_uris(request: &ApiRequest) -> Vec<String> {
    request
        .json
        .as_ref()
        .and_then(|b| b["uris"].as_array())
        .map(|uris| {
            uris.iter()
                .filter_map(|u| u.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// One page of playlist items, as `GET /playlists/{id}/tracks` returns it.
pub fn playlist_page(items: Vec<Value>) -> ApiResponse {
    let total = items.len();
    ApiResponse::ok(json!({ "items": items, "total": total, "next": null }))
}

pub fn not_found() -> ApiResponse {
    ApiResponse::with_status(404, json!({ "error": { "status": 404, "message": "Non existing id" } }))
}

pub fn server_error() -> ApiResponse {
    ApiResponse::with_status(502, json!({ "error": { "status": 502, "message": "Bad gateway" } }))
}

pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{id}")
}

pub fn track_json(id: &str) -> Value {
    json!({ "id": id, "name": format!("Track {id}"), "uri": track_uri(id), "artists": [] })
}

pub fn artist_json(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "genres": [], "followers": { "total": 10 } })
}

pub fn release_json(id: &str, date: &str, precision: &str, group: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Release {id}"),
        "album_type": group,
        "album_group": group,
        "release_date": date,
        "release_date_precision": precision,
        "total_tracks": 1,
        "artists": [],
    })
}

pub fn playlist_json(id: &str, name: &str, tracks: u32) -> Value {
    json!({ "id": id, "name": name, "collaborative": false, "tracks": { "total": tracks } })
}

pub fn artist(id: &str, name: &str) -> Artist {
    Artist::new(id, name)
}

pub fn scanned(uri: Option<&str>) -> ScannedTrack {
    ScannedTrack {
        track: Track {
            id: None,
            name: "track".into(),
            uri: uri.map(str::to_string),
            artists: Vec::new(),
            duration_ms: None,
            track_number: None,
        },
        release_name: "release".into(),
        artist_name: "artist".into(),
    }
}

/// Credentials kept in memory; counts saves.
#[derive(Default)]
pub struct MemoryCredentials {
    token: tokio::sync::Mutex<Option<TokenState>>,
    saves: AtomicUsize,
    read_only: bool,
}

impl MemoryCredentials {
    pub fn with_token(token: TokenState) -> Arc<Self> {
        Arc::new(Self {
            token: tokio::sync::Mutex::new(Some(token)),
            ..Default::default()
        })
    }

    /// Loads `token` but fails every save, like a full disk.
    pub fn read_only(token: TokenState) -> Arc<Self> {
        Arc::new(Self {
            token: tokio::sync::Mutex::new(Some(token)),
            read_only: true,
            ..Default::default()
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn stored(&self) -> Option<TokenState> {
        self.token.lock().await.clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn load(&self) -> Res<Option<TokenState>> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &TokenState) -> Res<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.read_only {
            return Err(std::io::Error::other("disk full").into());
        }
        *self.token.lock().await = Some(token.clone());
        Ok(())
    }
}

/// Token endpoint stand-in; counts calls.
pub struct FakeRefresher {
    response: Option<TokenResponse>,
    calls: AtomicUsize,
}

impl FakeRefresher {
    pub fn issuing(access_token: &str, refresh_token: Option<&str>, expires_in: u64) -> Arc<Self> {
        Arc::new(Self {
            response: Some(TokenResponse {
                access_token: access_token.into(),
                expires_in,
                refresh_token: refresh_token.map(str::to_string),
                scope: None,
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for FakeRefresher {
    async fn refresh(&self, _refresh_token: &str) -> Res<TokenResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.response.clone().ok_or(Error::Api {
            status: 400,
            message: "invalid_grant".into(),
        })
    }
}

pub fn token_expiring_in(ms: i64) -> TokenState {
    TokenState {
        access_token: "access-old".into(),
        refresh_token: "refresh-old".into(),
        expires_at: Utc::now().timestamp_millis() + ms,
    }
}

/// A client with a token that stays valid for the whole test.
pub fn client(fake: &Arc<FakeSpotify>) -> SpotifyClient {
    client_with_retry(fake, RetryingCaller::new(3, Duration::from_millis(10)))
}

pub fn client_with_retry(fake: &Arc<FakeSpotify>, retry: RetryingCaller) -> SpotifyClient {
    let credentials = MemoryCredentials::with_token(token_expiring_in(60 * 60 * 1000));
    let tokens = Arc::new(TokenGuard::new(
        credentials,
        FakeRefresher::issuing("access-new", None, 3600),
    ));
    let transport: Arc<dyn Transport> = fake.clone();
    SpotifyClient::new(transport, tokens, retry, API_URL, "US")
}
