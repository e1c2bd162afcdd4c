use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::management::{StoreError, sanitize_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub spotify_id: String,
    pub name: String,
    pub synced_at: Option<DateTime<Utc>>,
}

impl ArtistRecord {
    /// True when the artist is due for a release refresh: never synced, or
    /// last synced longer than `hours_delta` ago.
    pub fn can_update(&self, hours_delta: i64) -> bool {
        match self.synced_at {
            None => true,
            Some(synced_at) => Utc::now() - synced_at > Duration::hours(hours_delta),
        }
    }
}

pub struct ArtistManager {
    base: PathBuf,
}

impl Clone for ArtistManager {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl ArtistManager {
    pub fn new() -> Self {
        Self {
            base: config::data_dir().join("artists"),
        }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub async fn get(&self, spotify_id: &str) -> Result<Option<ArtistRecord>, StoreError> {
        let path = self.artist_path(spotify_id);
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::IoError(err)),
        };
        let artist = serde_json::from_str(&content).map_err(StoreError::SerdeError)?;
        Ok(Some(artist))
    }

    pub async fn get_or_create(
        &self,
        spotify_id: &str,
        name: &str,
    ) -> Result<(ArtistRecord, bool), StoreError> {
        if let Some(existing) = self.get(spotify_id).await? {
            return Ok((existing, false));
        }
        let artist = ArtistRecord {
            spotify_id: spotify_id.to_string(),
            name: name.to_string(),
            synced_at: None,
        };
        self.save(&artist).await?;
        Ok((artist, true))
    }

    pub async fn save(&self, artist: &ArtistRecord) -> Result<(), StoreError> {
        let path = self.artist_path(&artist.spotify_id);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(StoreError::IoError)?;
        }
        let json = serde_json::to_string_pretty(artist).map_err(StoreError::SerdeError)?;
        async_fs::write(path, json)
            .await
            .map_err(StoreError::IoError)
    }

    pub async fn update_synced_at(&self, spotify_id: &str) -> Result<(), StoreError> {
        let mut artist = self.get(spotify_id).await?.ok_or_else(|| {
            StoreError::CriticalError(format!("unknown artist {}", spotify_id))
        })?;
        artist.synced_at = Some(Utc::now());
        self.save(&artist).await
    }

    fn artist_path(&self, spotify_id: &str) -> PathBuf {
        self.base.join(format!("{}.json", sanitize_id(spotify_id)))
    }
}
