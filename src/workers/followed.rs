//! Followed-artists sync.
//!
//! The outermost worker: one unit per user with stored credentials. Each
//! unit acquires a session, reconciles the user's follow list with the API,
//! then drives the release sync for the reconciled artists. Losing a follow
//! is destructive for the local graph, so apparent un-follows are confirmed
//! against the follow-check endpoint before removal; the listing endpoint
//! occasionally drops entries across page boundaries.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config;
use crate::management::{ArtistManager, ArtistRecord, UserManager, UserRecord};
use crate::spotify::artists::{following_contains, get_followed_artists};
use crate::spotify::auth::{ClientCache, spotify_session};
use crate::spotify::client::HttpTransport;
use crate::tasks::run_filtered_tasks;
use crate::types::SpotifyKeys;
use crate::workers::releases::get_new_releases;
use crate::workers::{SyncError, UserReport};

/// Syncs follows and releases for every eligible user.
///
/// Users without stored credentials (or not matching `username`, when
/// given) are discarded by the admission filter. Returns one report per
/// synced user, in completion order.
pub async fn update_users_artists(
    keys: &SpotifyKeys,
    username: Option<&str>,
    force: bool,
    dry_run: bool,
) -> Result<Vec<UserReport>, SyncError> {
    let users = UserManager::new().all().await?;
    let cache = Arc::new(ClientCache::new(Arc::new(HttpTransport::new())));

    let reports = run_filtered_tasks(
        config::user_tasks_amount(),
        users,
        |user| {
            let keys = keys.clone();
            let cache = Arc::clone(&cache);
            async move { sync_user(keys, cache, user, force, dry_run).await }
        },
        |user| {
            user.has_credentials() && username.is_none_or(|name| name == user.username)
        },
    )
    .await;

    Ok(reports)
}

async fn sync_user(
    keys: SpotifyKeys,
    cache: Arc<ClientCache>,
    user: UserRecord,
    force: bool,
    dry_run: bool,
) -> UserReport {
    let username = user.username.clone();
    match sync_user_inner(keys, cache, user, force, dry_run).await {
        Ok(report) => report,
        Err(err) => UserReport::failed(username, &err),
    }
}

async fn sync_user_inner(
    keys: SpotifyKeys,
    cache: Arc<ClientCache>,
    mut user: UserRecord,
    force: bool,
    dry_run: bool,
) -> Result<UserReport, SyncError> {
    let users = UserManager::new();
    let artist_store = ArtistManager::new();

    let token = match user.token.clone() {
        Some(token) => token,
        // Unreachable past the admission filter, but kept honest.
        None => {
            return Ok(UserReport {
                username: user.username,
                new_follows: 0,
                lost_follows: 0,
                new_albums: 0,
                new_tracks: 0,
                error: Some("no stored credentials".to_string()),
            });
        }
    };

    let (session, refreshed) = spotify_session(&keys, &token, &cache).await?;
    if refreshed && !dry_run {
        user.token = Some(session.token.clone());
        users.save(&user).await?;
    }

    let followed = get_followed_artists(&session.client).await?;
    let followed_ids: HashSet<&str> = followed.iter().map(|a| a.id.as_str()).collect();
    let known: HashSet<String> = user.follows.iter().cloned().collect();

    let mut new_follows = 0;
    for artist in &followed {
        if known.contains(&artist.id) {
            continue;
        }
        if !dry_run {
            artist_store.get_or_create(&artist.id, &artist.name).await?;
        }
        user.follows.push(artist.id.clone());
        new_follows += 1;
    }

    // Follows missing from the listing are only removed once the contains
    // endpoint confirms they are really gone.
    let suspects: Vec<String> = user
        .follows
        .iter()
        .filter(|id| !followed_ids.contains(id.as_str()))
        .cloned()
        .collect();
    let mut lost_follows = 0;
    if !suspects.is_empty() {
        let flags = following_contains(&session.client, &suspects).await?;
        let gone: HashSet<&str> = suspects
            .iter()
            .zip(flags)
            .filter(|(_, still_followed)| !still_followed)
            .map(|(id, _)| id.as_str())
            .collect();
        lost_follows = gone.len();
        user.follows.retain(|id| !gone.contains(id.as_str()));
    }

    if !dry_run && (new_follows > 0 || lost_follows > 0) {
        users.save(&user).await?;
    }

    let mut records: Vec<ArtistRecord> = Vec::with_capacity(user.follows.len());
    for id in &user.follows {
        match artist_store.get(id).await? {
            Some(record) => records.push(record),
            // Dry runs never persist newly seen artists; fall back to the
            // listing data so the release sync still covers them.
            None => {
                if let Some(artist) = followed.iter().find(|a| &a.id == id) {
                    records.push(ArtistRecord {
                        spotify_id: artist.id.clone(),
                        name: artist.name.clone(),
                        synced_at: None,
                    });
                }
            }
        }
    }

    let releases = get_new_releases(&session.client, records, force, dry_run).await;

    let error = if releases.errors.is_empty() {
        None
    } else {
        Some(releases.errors.join("; "))
    };

    Ok(UserReport {
        username: user.username,
        new_follows,
        lost_follows,
        new_albums: releases.new_albums,
        new_tracks: releases.new_tracks,
        error,
    })
}
