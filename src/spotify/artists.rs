use std::collections::HashSet;

use crate::config;
use crate::spotify::client::{ApiClient, ApiError, Transport};
use crate::spotify::pages::fetch_all;
use crate::types::{
    AlbumDetail, Artist, FollowedArtistsResponse, Page, ReleaseItem, SavedTrackItem, Track,
};

/// Retrieves every artist the authenticated user follows.
///
/// The followed-artists endpoint wraps its page in an `artists` envelope on
/// every response, so the generic pager cannot be used directly; the cursor
/// walk happens here. Duplicates (Spotify occasionally repeats entries
/// across page boundaries) are removed, keeping first occurrence order.
pub async fn get_followed_artists<C: Transport>(
    client: &ApiClient<C>,
) -> Result<Vec<Artist>, ApiError> {
    let url = format!(
        "{uri}/me/following?type=artist&limit=50",
        uri = config::spotify_apiurl()
    );

    let mut page = client.get::<FollowedArtistsResponse>(&url).await?.artists;
    let mut artists = std::mem::take(&mut page.items);
    while let Some(next) = page.next.take() {
        page = client.get::<FollowedArtistsResponse>(&next).await?.artists;
        artists.append(&mut page.items);
    }

    let mut seen = HashSet::new();
    artists.retain(|a| seen.insert(a.id.clone()));
    Ok(artists)
}

/// Checks which of the given artist ids the user still follows.
///
/// Returns flags aligned with `ids`. Queried in chunks of 50, the endpoint
/// maximum.
pub async fn following_contains<C: Transport>(
    client: &ApiClient<C>,
    ids: &[String],
) -> Result<Vec<bool>, ApiError> {
    let mut flags = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(50) {
        let url = format!(
            "{uri}/me/following/contains?type=artist&ids={ids}",
            uri = config::spotify_apiurl(),
            ids = chunk.join(",")
        );
        let chunk_flags: Vec<bool> = client.get(&url).await?;
        flags.extend(chunk_flags);
    }
    Ok(flags)
}

/// First page of an artist's releases, all kinds included. The caller
/// drives further pages through the filtered pager with its own window
/// predicate.
pub async fn get_artist_albums<C: Transport>(
    client: &ApiClient<C>,
    artist_id: &str,
) -> Result<Page<ReleaseItem>, ApiError> {
    let url = format!(
        "{uri}/artists/{id}/albums?include_groups=album,single,appears_on&limit=50",
        uri = config::spotify_apiurl(),
        id = artist_id
    );
    client.get(&url).await
}

pub async fn get_album<C: Transport>(
    client: &ApiClient<C>,
    album_id: &str,
) -> Result<AlbumDetail, ApiError> {
    let url = format!(
        "{uri}/albums/{id}",
        uri = config::spotify_apiurl(),
        id = album_id
    );
    client.get(&url).await
}

pub async fn get_album_tracks<C: Transport>(
    client: &ApiClient<C>,
    album_id: &str,
) -> Result<Vec<Track>, ApiError> {
    let url = format!(
        "{uri}/albums/{id}/tracks?limit=50",
        uri = config::spotify_apiurl(),
        id = album_id
    );
    let first: Page<Track> = client.get(&url).await?;
    fetch_all(client, first).await
}

pub async fn get_track<C: Transport>(
    client: &ApiClient<C>,
    track_id: &str,
) -> Result<Track, ApiError> {
    let url = format!(
        "{uri}/tracks/{id}",
        uri = config::spotify_apiurl(),
        id = track_id
    );
    client.get(&url).await
}

/// Every saved ("liked") track of the user, across all pages.
pub async fn get_saved_tracks<C: Transport>(
    client: &ApiClient<C>,
) -> Result<Vec<SavedTrackItem>, ApiError> {
    let url = format!("{uri}/me/tracks?limit=50", uri = config::spotify_apiurl());
    let first: Page<SavedTrackItem> = client.get(&url).await?;
    fetch_all(client, first).await
}
