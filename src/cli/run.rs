use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config, error, info, success,
    types::{ChatAlert, PlaylistTableRow, SpotifyKeys, SyncTableRow},
    warning,
    workers::{self, PlaylistReport, UserReport},
};

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

fn spotify_keys() -> SpotifyKeys {
    SpotifyKeys {
        client_id: config::spotify_client_id(),
        client_secret: config::spotify_client_secret(),
    }
}

fn chat_alert(notify: bool) -> ChatAlert {
    match (config::chat_api_url(), config::chat_api_key()) {
        (Some(url), Some(key)) => ChatAlert { url, key, notify },
        _ => {
            if notify {
                warning!("Chat webhook is not configured; notifications disabled.");
            }
            ChatAlert {
                url: String::new(),
                key: String::new(),
                notify: false,
            }
        }
    }
}

/// Syncs followed artists and new releases for all eligible users.
pub async fn sync_followed(user: Option<String>, force: bool, dry_run: bool) {
    let keys = spotify_keys();

    let pb = spinner("Syncing followed artists and releases...");
    let result = workers::update_users_artists(&keys, user.as_deref(), force, dry_run).await;
    pb.finish_and_clear();

    match result {
        Ok(reports) => print_sync_reports(&reports, dry_run),
        Err(e) => error!("Cannot sync followed artists. Err: {}", e),
    }
}

/// Updates the weekly release playlist for all eligible users.
pub async fn sync_playlists(user: Option<String>, notify: bool, dry_run: bool) {
    let keys = spotify_keys();
    let alert = chat_alert(notify);

    let pb = spinner("Updating weekly playlists...");
    let result = workers::update_users_playlists(&keys, &alert, user.as_deref(), dry_run).await;
    pb.finish_and_clear();

    match result {
        Ok(reports) => print_playlist_reports(&reports, dry_run),
        Err(e) => error!("Cannot update weekly playlists. Err: {}", e),
    }
}

/// Updates the liked-from-year playlist for all eligible users.
pub async fn sync_liked(user: Option<String>, year: Option<i32>, notify: bool, dry_run: bool) {
    let keys = spotify_keys();
    let alert = chat_alert(notify);

    let pb = spinner("Updating liked playlists...");
    let result =
        workers::update_users_liked(&keys, &alert, user.as_deref(), year, dry_run).await;
    pb.finish_and_clear();

    match result {
        Ok(reports) => print_playlist_reports(&reports, dry_run),
        Err(e) => error!("Cannot update liked playlists. Err: {}", e),
    }
}

/// Runs the three sync flows back to back: follows and releases first so the
/// playlist pass sees this run's albums.
pub async fn full_run(force: bool, notify: bool, dry_run: bool) {
    sync_followed(None, force, dry_run).await;
    sync_playlists(None, notify, dry_run).await;
    sync_liked(None, None, notify, dry_run).await;
}

fn print_sync_reports(reports: &[UserReport], dry_run: bool) {
    if reports.is_empty() {
        info!("No users with stored credentials to sync.");
        return;
    }

    let rows: Vec<SyncTableRow> = reports
        .iter()
        .map(|r| SyncTableRow {
            user: r.username.clone(),
            follows: format!("+{} / -{}", r.new_follows, r.lost_follows),
            albums: r.new_albums.to_string(),
            tracks: r.new_tracks.to_string(),
            status: r.error.clone().unwrap_or_else(|| "ok".to_string()),
        })
        .collect();
    println!("{}", Table::new(rows));

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        warning!("{} of {} users finished with errors.", failed, reports.len());
    } else if dry_run {
        success!("Dry run finished for {} users; nothing persisted.", reports.len());
    } else {
        success!("Synced {} users.", reports.len());
    }
}

fn print_playlist_reports(reports: &[PlaylistReport], dry_run: bool) {
    if reports.is_empty() {
        info!("No users with stored credentials to update.");
        return;
    }

    let rows: Vec<PlaylistTableRow> = reports
        .iter()
        .map(|r| PlaylistTableRow {
            user: r.username.clone(),
            playlist: r.playlist.clone().unwrap_or_else(|| "-".to_string()),
            added: r.added.to_string(),
            status: r.error.clone().unwrap_or_else(|| "ok".to_string()),
        })
        .collect();
    println!("{}", Table::new(rows));

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        warning!("{} of {} users finished with errors.", failed, reports.len());
    } else if dry_run {
        success!("Dry run finished for {} users; nothing persisted.", reports.len());
    } else {
        success!("Updated playlists for {} users.", reports.len());
    }
}
