use std::path::PathBuf;

use futures_lite::stream::StreamExt;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::management::{StoreError, sanitize_id};
use crate::types::Token;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub display_name: String,
    /// Recipient id for the chat notification channel; empty disables
    /// notifications for this user.
    pub chat_id: String,
    pub market: Option<String>,
    pub token: Option<Token>,
    /// Spotify ids of the followed artists known to the store.
    pub follows: Vec<String>,
}

impl UserRecord {
    /// Users without stored token material cannot be synced and are
    /// discarded by the admission filter.
    pub fn has_credentials(&self) -> bool {
        self.token.is_some()
    }
}

pub struct UserManager {
    base: PathBuf,
}

impl UserManager {
    pub fn new() -> Self {
        Self {
            base: config::data_dir().join("users"),
        }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub async fn all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let mut entries = match async_fs::read_dir(&self.base).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::IoError(err)),
        };

        let mut users = Vec::new();
        while let Some(entry) = entries.next().await {
            let path = entry.map_err(StoreError::IoError)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = async_fs::read_to_string(&path)
                .await
                .map_err(StoreError::IoError)?;
            let user: UserRecord =
                serde_json::from_str(&content).map_err(StoreError::SerdeError)?;
            users.push(user);
        }

        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    pub async fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let path = self.user_path(username);
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::IoError(err)),
        };
        let user = serde_json::from_str(&content).map_err(StoreError::SerdeError)?;
        Ok(Some(user))
    }

    pub async fn save(&self, user: &UserRecord) -> Result<(), StoreError> {
        let path = self.user_path(&user.username);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(StoreError::IoError)?;
        }
        let json = serde_json::to_string_pretty(user).map_err(StoreError::SerdeError)?;
        async_fs::write(path, json)
            .await
            .map_err(StoreError::IoError)
    }

    fn user_path(&self, username: &str) -> PathBuf {
        self.base.join(format!("{}.json", sanitize_id(username)))
    }
}
