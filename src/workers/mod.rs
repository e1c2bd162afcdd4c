//! Domain sync workers.
//!
//! Each worker fans one sync flow out over all eligible users through the
//! task runner: followed-artists and release sync, weekly release
//! playlists, and the yearly liked playlist. A worker unit owns everything
//! it needs (client cache handle, store managers, its user record) so units
//! never contend on shared mutable state, and every unit converts its own
//! failures into a report instead of failing the batch.

mod followed;
mod releases;
mod stats;
mod weekly;
mod yearly;

pub use followed::update_users_artists;
pub use weekly::update_users_playlists;
pub use yearly::update_users_liked;

use crate::management::StoreError;
use crate::spotify::client::ApiError;

/// Failure of one sync unit, from either side of the store/API boundary.
#[derive(Debug)]
pub enum SyncError {
    Api(ApiError),
    Store(StoreError),
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        SyncError::Api(err)
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::Store(err)
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Api(err) => write!(f, "{}", err),
            SyncError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SyncError {}

/// Outcome of one user's followed-artists and release sync.
#[derive(Debug)]
pub struct UserReport {
    pub username: String,
    pub new_follows: usize,
    pub lost_follows: usize,
    pub new_albums: usize,
    pub new_tracks: usize,
    pub error: Option<String>,
}

impl UserReport {
    fn failed(username: String, err: &SyncError) -> Self {
        Self {
            username,
            new_follows: 0,
            lost_follows: 0,
            new_albums: 0,
            new_tracks: 0,
            error: Some(err.to_string()),
        }
    }
}

/// Outcome of one user's playlist update (weekly or yearly).
#[derive(Debug)]
pub struct PlaylistReport {
    pub username: String,
    pub playlist: Option<String>,
    pub added: usize,
    pub error: Option<String>,
}

impl PlaylistReport {
    fn failed(username: String, err: &SyncError) -> Self {
        Self {
            username,
            playlist: None,
            added: 0,
            error: Some(err.to_string()),
        }
    }
}
