use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Stored OAuth token material for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Application credentials for the Spotify API.
#[derive(Debug, Clone)]
pub struct SpotifyKeys {
    pub client_id: String,
    pub client_secret: String,
}

/// Chat webhook settings carried into the playlist workers.
#[derive(Debug, Clone)]
pub struct ChatAlert {
    pub url: String,
    pub key: String,
    pub notify: bool,
}

/// One page of a paginated Spotify collection.
///
/// `next` is a complete URL for the following page and is treated as an
/// opaque cursor: present means "fetch again", absent means "stop".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

/// Profile data for the authenticated user (`/me`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
}

/// Envelope around the followed-artists page (`/me/following`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowedArtistsResponse {
    pub artists: Page<Artist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

/// Minimal artist reference embedded in albums and tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// One release as returned by the artist-albums endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseItem {
    pub id: String,
    pub name: String,
    pub release_date: String,
    pub release_date_precision: String,
    pub album_type: String,
    #[serde(rename = "type", default = "default_release_kind")]
    pub kind: String,
    pub artists: Vec<ArtistRef>,
    pub available_markets: Option<Vec<String>>,
}

fn default_release_kind() -> String {
    "album".to_string()
}

/// Full album object (`/albums/{id}`), with its first page of tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumDetail {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub album_type: String,
    pub release_date: String,
    pub artists: Vec<ArtistRef>,
    pub available_markets: Option<Vec<String>>,
    pub tracks: Page<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub artists: Vec<ArtistRef>,
    pub popularity: Option<u32>,
    /// Present on full track objects and saved-track entries, absent on
    /// album-tracks listings.
    pub album: Option<TrackAlbumRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbumRef {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub album_type: String,
    pub release_date: String,
    pub artists: Vec<ArtistRef>,
    pub available_markets: Option<Vec<String>>,
}

/// Saved-track entry (`/me/tracks`); the track slot can come back null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrackItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub uri: String,
}

/// Playlist track entry; Spotify returns null slots for removed or
/// unavailable tracks, which callers must skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksResponse {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct SyncTableRow {
    pub user: String,
    pub follows: String,
    pub albums: String,
    pub tracks: String,
    pub status: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub user: String,
    pub playlist: String,
    pub added: String,
    pub status: String,
}
