use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Res, management::auth::write_atomically, types::Artist, warning};

#[async_trait]
pub trait ArtistStore: Send + Sync {
    async fn list(&self) -> Res<Vec<Artist>>;
    /// `false` when an artist with the same id is already tracked.
    async fn add(&self, artist: Artist) -> Res<bool>;
    /// Number of artists actually added.
    async fn add_many(&self, artists: Vec<Artist>) -> Res<usize>;
    async fn remove(&self, artist_id: &str) -> Res<Option<Artist>>;
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn last_checked(&self) -> Res<Option<String>>;
    async fn set_last_checked(&self, instant: String) -> Res<()>;
}

#[async_trait]
pub trait PlaylistSelectionStore: Send + Sync {
    async fn active_playlist(&self) -> Res<Option<String>>;
    async fn set_active_playlist(&self, playlist_id: String) -> Res<()>;
}

#[async_trait]
pub trait PresetStore: Send + Sync {
    async fn presets(&self) -> Res<BTreeMap<String, Vec<Artist>>>;
    /// Saves (or overwrites) a named snapshot.
    async fn save_preset(&self, name: String, artists: Vec<Artist>) -> Res<()>;
    async fn delete_preset(&self, name: &str) -> Res<bool>;
    /// Replaces the tracked list with the preset. Returns the new artist
    /// count, or `None` for an unknown preset.
    async fn apply_preset(&self, name: &str) -> Res<Option<usize>>;
}

/// Selected playlist, falling back to the configured default.
///
/// # Errors
///
/// [`Error::Precondition`] when neither is available.
pub async fn resolve_playlist(
    store: &dyn PlaylistSelectionStore,
    configured: Option<String>,
) -> Res<String> {
    store
        .active_playlist()
        .await?
        .or(configured)
        .ok_or_else(|| {
            Error::precondition(
                "no playlist selected, run `releasebot playlists select <id>` or set TARGET_PLAYLIST_ID",
            )
        })
}

/// The persisted document behind [`JsonStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub last_checked: Option<String>,
    #[serde(default)]
    pub active_playlist_id: Option<String>,
    #[serde(default)]
    pub presets: BTreeMap<String, Vec<Artist>>,
}

/// `store.json`: artists, checkpoint, active playlist and presets.
///
/// Every mutation reads the whole document, changes it and writes it back.
/// There is no locking between processes; the last writer wins.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file reads as an empty document; an unreadable one is
    /// reported and reset.
    pub async fn load(&self) -> Res<StoreDocument> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreDocument::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warning!("Failed to read store, resetting: {}", e);
                Ok(StoreDocument::default())
            }
        }
    }

    pub async fn persist(&self, doc: &StoreDocument) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(doc)?;
        write_atomically(&self.path, json).await
    }

    async fn update<T: Send>(
        &self,
        change: impl FnOnce(&mut StoreDocument) -> T + Send,
    ) -> Res<T> {
        let mut doc = self.load().await?;
        let result = change(&mut doc);
        self.persist(&doc).await?;
        Ok(result)
    }
}

#[async_trait]
impl ArtistStore for JsonStore {
    async fn list(&self) -> Res<Vec<Artist>> {
        Ok(self.load().await?.artists)
    }

    async fn add(&self, artist: Artist) -> Res<bool> {
        let mut doc = self.load().await?;
        if doc.artists.iter().any(|a| a.id == artist.id) {
            return Ok(false);
        }
        doc.artists.push(artist.tracked());
        self.persist(&doc).await?;
        Ok(true)
    }

    async fn add_many(&self, artists: Vec<Artist>) -> Res<usize> {
        let mut doc = self.load().await?;
        let mut added = 0;
        for artist in artists {
            if doc.artists.iter().any(|a| a.id == artist.id) {
                continue;
            }
            doc.artists.push(artist.tracked());
            added += 1;
        }
        if added > 0 {
            self.persist(&doc).await?;
        }
        Ok(added)
    }

    async fn remove(&self, artist_id: &str) -> Res<Option<Artist>> {
        let mut doc = self.load().await?;
        let Some(index) = doc.artists.iter().position(|a| a.id == artist_id) else {
            return Ok(None);
        };
        let removed = doc.artists.remove(index);
        self.persist(&doc).await?;
        Ok(Some(removed))
    }
}

#[async_trait]
impl CheckpointStore for JsonStore {
    async fn last_checked(&self) -> Res<Option<String>> {
        Ok(self.load().await?.last_checked)
    }

    async fn set_last_checked(&self, instant: String) -> Res<()> {
        self.update(|doc| doc.last_checked = Some(instant)).await
    }
}

#[async_trait]
impl PlaylistSelectionStore for JsonStore {
    async fn active_playlist(&self) -> Res<Option<String>> {
        Ok(self.load().await?.active_playlist_id)
    }

    async fn set_active_playlist(&self, playlist_id: String) -> Res<()> {
        self.update(|doc| doc.active_playlist_id = Some(playlist_id)).await
    }
}

#[async_trait]
impl PresetStore for JsonStore {
    async fn presets(&self) -> Res<BTreeMap<String, Vec<Artist>>> {
        Ok(self.load().await?.presets)
    }

    async fn save_preset(&self, name: String, artists: Vec<Artist>) -> Res<()> {
        let artists: Vec<Artist> = artists.iter().map(Artist::tracked).collect();
        self.update(|doc| {
            doc.presets.insert(name, artists);
        })
        .await
    }

    async fn delete_preset(&self, name: &str) -> Res<bool> {
        let mut doc = self.load().await?;
        if doc.presets.remove(name).is_none() {
            return Ok(false);
        }
        self.persist(&doc).await?;
        Ok(true)
    }

    async fn apply_preset(&self, name: &str) -> Res<Option<usize>> {
        let mut doc = self.load().await?;
        let Some(artists) = doc.presets.get(name).cloned() else {
            return Ok(None);
        };
        let count = artists.len();
        doc.artists = artists;
        self.persist(&doc).await?;
        Ok(Some(count))
    }
}
