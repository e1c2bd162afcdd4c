//! Weekly release playlist updates.
//!
//! For each eligible user this collects the stored releases of the current
//! week (Monday onward) by the user's followed artists, resolves them to
//! playable tracks, and appends whatever is not already on the week's
//! playlist. The playlist is named after the calendar position, e.g.
//! "August W4 2026", and is created on demand. On Fridays, the main release
//! day, new tracks go to the top of the playlist instead of the bottom.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Utc, Weekday};

use crate::chatbot;
use crate::config;
use crate::management::{AlbumManager, AlbumRecord, UserManager, UserRecord};
use crate::spotify::artists::{get_album, get_track};
use crate::spotify::auth::{ClientCache, Session, spotify_session};
use crate::spotify::client::{HttpTransport, Transport};
use crate::spotify::pages::fetch_all;
use crate::spotify::playlist::{add_tracks, create_playlist, get_playlist_tracks, get_user_playlists};
use crate::tasks::run_filtered_tasks;
use crate::types::{ChatAlert, Playlist, SpotifyKeys, Track};
use crate::utils::{monday_of_week, week_of_month};
use crate::workers::stats::{WeeklyStats, artist_line};
use crate::workers::{PlaylistReport, SyncError};

/// Updates this week's release playlist for every eligible user.
pub async fn update_users_playlists(
    keys: &SpotifyKeys,
    alert: &ChatAlert,
    username: Option<&str>,
    dry_run: bool,
) -> Result<Vec<PlaylistReport>, SyncError> {
    let users = UserManager::new().all().await?;
    let cache = Arc::new(ClientCache::new(Arc::new(HttpTransport::new())));

    let reports = run_filtered_tasks(
        config::user_tasks_amount(),
        users,
        |user| {
            let keys = keys.clone();
            let alert = alert.clone();
            let cache = Arc::clone(&cache);
            async move {
                let username = user.username.clone();
                match update_user_playlist(keys, alert, cache, user, dry_run).await {
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

/// The calendar name of the current week's playlist, e.g. "August W4 2026".
pub fn weekly_playlist_name(date: chrono::NaiveDate) -> String {
    format!(
        "{} W{} {}",
        date.format("%B"),
        week_of_month(date),
        date.year()
    )
}

async fn update_user_playlist(
    keys: SpotifyKeys,
    alert: ChatAlert,
    cache: Arc<ClientCache>,
    mut user: UserRecord,
    dry_run: bool,
) -> Result<PlaylistReport, SyncError> {
    let users = UserManager::new();
    let albums = AlbumManager::new();

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

    let today = Utc::now().date_naive();
    let monday = monday_of_week(today);
    let name = weekly_playlist_name(today);

    let releases = albums.released_since(monday, &user.follows).await?;

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

    let market = user.market.clone().or_else(|| session.user.country.clone());

    let mut stats = WeeklyStats::new();
    let mut uris: Vec<String> = Vec::new();
    for record in &releases {
        queue_release(&session, record, market.as_deref(), &mut present, &mut uris, &mut stats)
            .await?;
    }

    // On a dry run nothing is sent; report what would have been queued.
    let mut added = if dry_run { uris.len() } else { 0 };
    if !uris.is_empty() && !dry_run {
        let target = match playlist.take() {
            Some(existing) => existing,
            None => create_playlist(&session.client, &session.user.id, &name).await?,
        };
        let insert_top = today.weekday() == Weekday::Fri;
        added = add_tracks(&session.client, &target.id, &uris, insert_top).await;
        playlist = Some(target);
    }

    // Quiet weeks stay quiet; only actual news reaches the chat.
    if stats.has_new() {
        let link = playlist.as_ref().map(|p: &Playlist| p.uri.as_str());
        chatbot::send_message(&user.chat_id, &alert, &stats.describe(&name, link)).await;
    }

    Ok(PlaylistReport {
        username: user.username,
        playlist: Some(name),
        added,
        error: None,
    })
}

/// Resolves one stored release to playable track uris, honoring the user's
/// market and skipping tracks already on the playlist.
async fn queue_release<C: Transport>(
    session: &Session<C>,
    record: &AlbumRecord,
    market: Option<&str>,
    present: &mut HashSet<String>,
    uris: &mut Vec<String>,
    stats: &mut WeeklyStats,
) -> Result<(), SyncError> {
    if record.kind == "track" {
        let track = get_track(&session.client, &record.spotify_id).await?;
        if !track_available(&track, market) {
            return Ok(());
        }
        if present.insert(track.id.clone()) {
            stats.features.push(artist_line(&track.artists, &track.name));
            uris.push(track.uri);
        }
        return Ok(());
    }

    let detail = get_album(&session.client, record.spotify_id.as_str()).await?;
    if let (Some(markets), Some(market)) = (&detail.available_markets, market)
        && !markets.iter().any(|m| m == market)
    {
        return Ok(());
    }

    let tracks = fetch_all(&session.client, detail.tracks.clone()).await?;
    let mut fresh = 0;
    for track in tracks {
        if present.insert(track.id.clone()) {
            uris.push(track.uri);
            fresh += 1;
        }
    }
    if fresh == 0 {
        return Ok(());
    }

    let line = artist_line(&detail.artists, &detail.name);
    if record.kind == "album" {
        stats.albums.push(line);
    } else {
        stats.singles.push(line);
    }
    Ok(())
}

fn track_available(track: &Track, market: Option<&str>) -> bool {
    let Some(market) = market else { return true };
    match track.album.as_ref().and_then(|a| a.available_markets.as_ref()) {
        Some(markets) => markets.iter().any(|m| m == market),
        None => true,
    }
}
