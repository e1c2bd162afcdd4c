use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use futures_lite::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config;
use crate::management::{StoreError, sanitize_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub spotify_id: String,
    pub name: String,
    /// Release kind: "album", "single" or "track" (feature appearances are
    /// stored as individual tracks).
    pub kind: String,
    pub release: NaiveDate,
    /// Spotify ids of the artists this release belongs to in the store.
    pub artist_ids: Vec<String>,
}

/// Store for album records.
///
/// Albums are shared between artists (collaborations, features), so many
/// sync units can write the same record concurrently. All writers for one
/// album id are serialized through a per-id lock; clones of the manager
/// share the lock map, which is what makes the serialization effective
/// across the task runner's units.
pub struct AlbumManager {
    base: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl Clone for AlbumManager {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl AlbumManager {
    pub fn new() -> Self {
        Self::with_base(config::data_dir().join("albums"))
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self {
            base,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn lock_for(&self, spotify_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(spotify_id.to_string()).or_default())
    }

    pub async fn get(&self, spotify_id: &str) -> Result<Option<AlbumRecord>, StoreError> {
        let path = self.album_path(spotify_id);
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::IoError(err)),
        };
        let album = serde_json::from_str(&content).map_err(StoreError::SerdeError)?;
        Ok(Some(album))
    }

    /// Returns the stored record, creating it first when absent.
    ///
    /// Held under the album's write lock so a creation racing an
    /// [`AlbumManager::add_artist`] on the same id cannot wipe an already
    /// written artist edge.
    pub async fn get_or_create(
        &self,
        spotify_id: &str,
        name: &str,
        kind: &str,
        release: NaiveDate,
    ) -> Result<(AlbumRecord, bool), StoreError> {
        let lock = self.lock_for(spotify_id).await;
        let _guard = lock.lock().await;

        if let Some(existing) = self.get(spotify_id).await? {
            return Ok((existing, false));
        }
        let album = AlbumRecord {
            spotify_id: spotify_id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            release,
            artist_ids: Vec::new(),
        };
        self.save(&album).await?;
        Ok((album, true))
    }

    /// Links an artist to an album. Returns whether the edge was new.
    ///
    /// The read-modify-write runs under the album's lock; concurrent units
    /// linking different artists to a shared release each land their edge.
    pub async fn add_artist(&self, spotify_id: &str, artist_id: &str) -> Result<bool, StoreError> {
        let lock = self.lock_for(spotify_id).await;
        let _guard = lock.lock().await;

        let mut album = self.get(spotify_id).await?.ok_or_else(|| {
            StoreError::CriticalError(format!("unknown album {}", spotify_id))
        })?;
        if album.artist_ids.iter().any(|id| id == artist_id) {
            return Ok(false);
        }
        album.artist_ids.push(artist_id.to_string());
        self.save(&album).await?;
        Ok(true)
    }

    pub async fn save(&self, album: &AlbumRecord) -> Result<(), StoreError> {
        let path = self.album_path(&album.spotify_id);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(StoreError::IoError)?;
        }
        let json = serde_json::to_string_pretty(album).map_err(StoreError::SerdeError)?;
        async_fs::write(path, json)
            .await
            .map_err(StoreError::IoError)
    }

    /// Albums released on or after `date` by any of the given artists.
    /// Backs the weekly playlist query.
    pub async fn released_since(
        &self,
        date: NaiveDate,
        artist_ids: &[String],
    ) -> Result<Vec<AlbumRecord>, StoreError> {
        let mut entries = match async_fs::read_dir(&self.base).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::IoError(err)),
        };

        let mut albums = Vec::new();
        while let Some(entry) = entries.next().await {
            let path = entry.map_err(StoreError::IoError)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = async_fs::read_to_string(&path)
                .await
                .map_err(StoreError::IoError)?;
            let album: AlbumRecord =
                serde_json::from_str(&content).map_err(StoreError::SerdeError)?;

            let followed = album.artist_ids.iter().any(|id| artist_ids.contains(id));
            if followed && album.release >= date {
                albums.push(album);
            }
        }

        albums.sort_by(|a, b| b.release.cmp(&a.release).then(a.name.cmp(&b.name)));
        Ok(albums)
    }

    fn album_path(&self, spotify_id: &str) -> PathBuf {
        self.base.join(format!("{}.json", sanitize_id(spotify_id)))
    }
}
