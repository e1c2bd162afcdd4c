//! Local persistence of users, artists and albums.
//!
//! Everything is stored as one JSON file per record under the application
//! data directory, so concurrently running sync units never rewrite each
//! other's files. The managers here are the repository surface the workers
//! consume; nothing outside this module touches the disk layout.

mod albums;
mod artists;
mod users;

pub use albums::{AlbumManager, AlbumRecord};
pub use artists::{ArtistManager, ArtistRecord};
pub use users::{UserManager, UserRecord};

#[derive(Debug)]
pub enum StoreError {
    IoError(std::io::Error),
    SerdeError(serde_json::Error),
    CriticalError(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(err) => write!(f, "io error: {}", err),
            StoreError::SerdeError(err) => write!(f, "serde error: {}", err),
            StoreError::CriticalError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Keeps record filenames safe regardless of what the remote id contains.
pub(crate) fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
