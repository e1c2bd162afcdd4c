//! Yearly liked-tracks playlist updates.
//!
//! Collects every saved ("liked") track whose release falls in the target
//! year into a "liked from <year>" playlist. The playlist is only created
//! once there is something to put in it, and fresh likes are inserted at
//! the top so the newest finds stay visible.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Utc};

use crate::chatbot;
use crate::config;
use crate::management::{UserManager, UserRecord};
use crate::spotify::artists::get_saved_tracks;
use crate::spotify::auth::{ClientCache, spotify_session};
use crate::spotify::client::HttpTransport;
use crate::spotify::playlist::{add_tracks, create_playlist, get_playlist_tracks, get_user_playlists};
use crate::tasks::run_filtered_tasks;
use crate::types::{ChatAlert, SpotifyKeys};
use crate::workers::stats::{YearlyStats, artist_line};
use crate::workers::{PlaylistReport, SyncError};

/// Updates the liked-from-year playlist for every eligible user.
///
/// `year` overrides the target year; by default the current one.
pub async fn update_users_liked(
    keys: &SpotifyKeys,
    alert: &ChatAlert,
    username: Option<&str>,
    year: Option<i32>,
    dry_run: bool,
) -> Result<Vec<PlaylistReport>, SyncError> {
    let users = UserManager::new().all().await?;
    let cache = Arc::new(ClientCache::new(Arc::new(HttpTransport::new())));
    let year = year.unwrap_or_else(|| Utc::now().year());

    let reports = run_filtered_tasks(
        config::user_tasks_amount(),
        users,
        |user| {
            let keys = keys.clone();
            let alert = alert.clone();
            let cache = Arc::clone(&cache);
            async move {
                let username = user.username.clone();
                match update_user_liked(keys, alert, cache, user, year, dry_run).await {
                    Ok(report) => report,
                    Err(err) => PlaylistReport::failed(username, &err),
                }
            }
        },
        |user| {
            user.has_credentials() && username.is_none_or(|name| name == user.username)
        },
    )
    .await;

    Ok(reports)
}

async fn update_user_liked(
    keys: SpotifyKeys,
    alert: ChatAlert,
    cache: Arc<ClientCache>,
    mut user: UserRecord,
    year: i32,
    dry_run: bool,
) -> Result<PlaylistReport, SyncError> {
    let users = UserManager::new();

    let token = match user.token.clone() {
        Some(token) => token,
        None => {
            return Ok(PlaylistReport {
                username: user.username,
                playlist: None,
                added: 0,
                error: Some("no stored credentials".to_string()),
            });
        }
    };

    let (session, refreshed) = spotify_session(&keys, &token, &cache).await?;
    if refreshed && !dry_run {
        user.token = Some(session.token.clone());
        users.save(&user).await?;
    }

    let name = format!("liked from {}", year);
    let year_prefix = year.to_string();

    let saved = get_saved_tracks(&session.client).await?;

    let playlists = get_user_playlists(&session.client, &session.user.id).await?;
    let mut playlist = playlists.into_iter().find(|p| p.name == name);

    let mut present: HashSet<String> = HashSet::new();
    if let Some(playlist) = &playlist {
        for item in get_playlist_tracks(&session.client, &playlist.id).await? {
            if let Some(track) = item.track {
                present.insert(track.id);
            }
        }
    }

    let mut stats = YearlyStats::new();
    let mut uris: Vec<String> = Vec::new();
    for item in saved {
        let Some(track) = item.track else { continue };
        let from_year = track
            .album
            .as_ref()
            .is_some_and(|album| album.release_date.starts_with(&year_prefix));
        if !from_year {
            continue;
        }
        // Saved tracks can repeat across remasters sharing an id; the
        // presence set also dedupes within this batch.
        if present.insert(track.id.clone()) {
            stats.tracks.push(artist_line(&track.artists, &track.name));
            uris.push(track.uri);
        }
    }

    // On a dry run nothing is sent; report what would have been queued.
    let mut added = if dry_run { uris.len() } else { 0 };
    if !uris.is_empty() && !dry_run {
        let target = match playlist.take() {
            Some(existing) => existing,
            None => create_playlist(&session.client, &session.user.id, &name).await?,
        };
        added = add_tracks(&session.client, &target.id, &uris, true).await;
        playlist = Some(target);
    }

    // Only actual news reaches the chat.
    if stats.has_new() {
        let link = playlist.as_ref().map(|p| p.uri.as_str());
        chatbot::send_message(&user.chat_id, &alert, &stats.describe(&name, link)).await;
    }

    Ok(PlaylistReport {
        username: user.username,
        playlist: Some(name),
        added,
        error: None,
    })
}
