use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;

use crate::config;
use crate::spotify::client::{ApiClient, ApiError, Transport};
use crate::spotify::pages::fetch_all;
use crate::types::{
    AddTracksRequest, AddTracksResponse, CreatePlaylistRequest, Page, Playlist, PlaylistTrackItem,
};
use crate::warning;

/// All playlists owned by or followed by the given user.
pub async fn get_user_playlists<C: Transport>(
    client: &ApiClient<C>,
    user_id: &str,
) -> Result<Vec<Playlist>, ApiError> {
    let url = format!(
        "{uri}/users/{id}/playlists?limit=50",
        uri = config::spotify_apiurl(),
        id = user_id
    );
    let first: Page<Playlist> = client.get(&url).await?;
    fetch_all(client, first).await
}

/// Tracks currently on a playlist. Null track slots (removed or regionally
/// unavailable entries) survive deserialization and are filtered by the
/// caller.
pub async fn get_playlist_tracks<C: Transport>(
    client: &ApiClient<C>,
    playlist_id: &str,
) -> Result<Vec<PlaylistTrackItem>, ApiError> {
    let url = format!(
        "{uri}/playlists/{id}/tracks?limit=100",
        uri = config::spotify_apiurl(),
        id = playlist_id
    );
    let first: Page<PlaylistTrackItem> = client.get(&url).await?;
    fetch_all(client, first).await
}

/// Creates a new private playlist for the user.
pub async fn create_playlist<C: Transport>(
    client: &ApiClient<C>,
    user_id: &str,
    name: &str,
) -> Result<Playlist, ApiError> {
    let url = format!(
        "{uri}/users/{id}/playlists",
        uri = config::spotify_apiurl(),
        id = user_id
    );
    let body = CreatePlaylistRequest {
        name: name.to_string(),
        description: "Managed by sporlsync.".to_string(),
        public: false,
        collaborative: false,
    };
    client.post(&url, json!(body)).await
}

/// Adds track uris to a playlist in chunks of 100 (the endpoint maximum).
///
/// With `insert_top` the chunks are inserted from position zero, keeping
/// their relative order - used on Fridays, the main release day. A failed
/// chunk is logged and skipped; the rest of the batch still goes through.
/// Requests are paced to stay polite with the rate limiter. Returns how
/// many tracks actually made it onto the playlist.
pub async fn add_tracks<C: Transport>(
    client: &ApiClient<C>,
    playlist_id: &str,
    uris: &[String],
    insert_top: bool,
) -> usize {
    let url = format!(
        "{uri}/playlists/{id}/tracks",
        uri = config::spotify_apiurl(),
        id = playlist_id
    );

    let mut index = 0;
    let mut added = 0;
    for chunk in uris.chunks(100) {
        let body = AddTracksRequest {
            uris: chunk.to_vec(),
            position: insert_top.then_some(index),
        };

        match client
            .post::<AddTracksResponse>(&url, json!(body))
            .await
        {
            Ok(_) => {
                index += chunk.len();
                added += chunk.len();
            }
            Err(err) => {
                warning!(
                    "failed to add {} tracks to playlist {}: {}",
                    chunk.len(),
                    playlist_id,
                    err
                );
            }
        }
        sleep(Duration::from_millis(200)).await;
    }
    added
}
