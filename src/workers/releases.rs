//! Release sync for followed artists.
//!
//! For each admitted artist this fetches the current-year window of its
//! releases, classifies them and persists them into the album store. Feature
//! appearances are stored as individual tracks rather than whole albums, and
//! only when the track is popular enough to plausibly matter to the user.

use std::collections::HashSet;

use chrono::{Datelike, Utc};

use crate::config;
use crate::management::{AlbumManager, ArtistManager, ArtistRecord};
use crate::spotify::artists::{get_album_tracks, get_artist_albums, get_track};
use crate::spotify::client::{ApiClient, Transport};
use crate::spotify::pages::fetch_filtered;
use crate::tasks::{run_filtered_tasks, run_tasks};
use crate::types::ReleaseItem;
use crate::utils::generate_release_date;
use crate::workers::SyncError;

const VARIOUS_ARTISTS: &str = "Various Artists";

/// Feature tracks at or below this popularity are noise and not stored.
const FEATURE_POPULARITY_FLOOR: u32 = 40;

/// The artist-albums endpoint interleaves its include groups, each sorted by
/// date on its own. A page full of old albums can still be followed by
/// current-year singles, so pagination stops only once every group has
/// produced an out-of-window item.
pub struct ReleaseWindow {
    year: i32,
    exhausted: HashSet<String>,
}

impl ReleaseWindow {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            exhausted: HashSet::new(),
        }
    }

    /// Keep/stop predicate for the filtered pager: returns the in-window
    /// items of one page and whether more pages are worth fetching.
    pub fn scan(&mut self, items: Vec<ReleaseItem>) -> (Vec<ReleaseItem>, bool) {
        let mut kept = Vec::new();
        for item in items {
            match generate_release_date(&item.release_date, &item.release_date_precision) {
                Ok(date) if date.year() == self.year => kept.push(item),
                Ok(_) => {
                    self.exhausted.insert(item.album_type.clone());
                }
                // Unparseable release dates do occur in the catalog; an
                // undatable release cannot be windowed, so it is dropped.
                Err(_) => {}
            }
        }

        let groups = ["album", "single", "compilation"];
        let fetch_more = !groups.iter().all(|g| self.exhausted.contains(*g));
        (kept, fetch_more)
    }
}

/// Aggregate outcome of one user's release sync across all their artists.
#[derive(Debug, Default)]
pub struct ReleasesOutcome {
    pub new_albums: usize,
    pub new_tracks: usize,
    pub errors: Vec<String>,
}

struct ArtistOutcome {
    new_albums: usize,
    new_tracks: usize,
}

/// Syncs the current-year releases of the given artists into the album
/// store, bounded by the artist task budget.
///
/// The admission filter drops artists refreshed within the staleness window
/// unless `force` is set. A failing artist is reported in the outcome and
/// never interrupts its siblings.
pub async fn get_new_releases<C: Transport>(
    client: &ApiClient<C>,
    artists: Vec<ArtistRecord>,
    force: bool,
    dry_run: bool,
) -> ReleasesOutcome {
    let refresh_hours = config::artist_refresh_hours();
    let albums = AlbumManager::new();
    let artist_store = ArtistManager::new();

    let results = run_filtered_tasks(
        config::artist_tasks_amount(),
        artists,
        |artist| {
            let client = client.clone();
            let albums = albums.clone();
            let artist_store = artist_store.clone();
            async move {
                let name = artist.name.clone();
                let result =
                    update_artist_albums(client, albums, artist_store, artist, dry_run).await;
                (name, result)
            }
        },
        |artist| force || artist.can_update(refresh_hours),
    )
    .await;

    let mut outcome = ReleasesOutcome::default();
    for (name, result) in results {
        match result {
            Ok(artist_outcome) => {
                outcome.new_albums += artist_outcome.new_albums;
                outcome.new_tracks += artist_outcome.new_tracks;
            }
            Err(err) => outcome.errors.push(format!("{}: {}", name, err)),
        }
    }
    outcome
}

/// Syncs one artist: windowed release fetch, per-release persistence with
/// its own inner task budget, then the staleness timestamp.
async fn update_artist_albums<C: Transport>(
    client: ApiClient<C>,
    albums: AlbumManager,
    artist_store: ArtistManager,
    artist: ArtistRecord,
    dry_run: bool,
) -> Result<ArtistOutcome, SyncError> {
    let first = get_artist_albums(&client, &artist.spotify_id).await?;

    let mut window = ReleaseWindow::new(Utc::now().year());
    let releases = fetch_filtered(&client, first, |items| window.scan(items)).await?;

    let artist_id = artist.spotify_id.clone();
    let results = run_tasks(config::album_tasks_amount(), releases, |release| {
        let client = client.clone();
        let albums = albums.clone();
        let artist_id = artist_id.clone();
        async move { handle_release(client, albums, artist_id, release, dry_run).await }
    })
    .await;

    let mut outcome = ArtistOutcome {
        new_albums: 0,
        new_tracks: 0,
    };
    for result in results {
        let release_outcome = result?;
        outcome.new_albums += release_outcome.new_albums;
        outcome.new_tracks += release_outcome.new_tracks;
    }

    if !dry_run {
        artist_store.update_synced_at(&artist.spotify_id).await?;
    }
    Ok(outcome)
}

#[derive(Debug, Default)]
struct ReleaseOutcome {
    new_albums: usize,
    new_tracks: usize,
}

/// Classifies and persists one release for one artist.
///
/// - Compilations and anything credited to "Various Artists" are skipped.
/// - Own releases are stored whole; albums with two tracks or fewer are
///   demoted to singles.
/// - Releases where the artist only appears are reduced to the artist's own
///   tracks, kept only above the popularity floor.
async fn handle_release<C: Transport>(
    client: ApiClient<C>,
    albums: AlbumManager,
    artist_id: String,
    release: ReleaseItem,
    dry_run: bool,
) -> Result<ReleaseOutcome, SyncError> {
    if release.album_type == "compilation"
        || release.artists.iter().any(|a| a.name == VARIOUS_ARTISTS)
    {
        return Ok(ReleaseOutcome::default());
    }

    let date = match generate_release_date(&release.release_date, &release.release_date_precision)
    {
        Ok(date) => date,
        Err(_) => return Ok(ReleaseOutcome::default()),
    };

    let mut outcome = ReleaseOutcome::default();
    let is_own = release.artists.iter().any(|a| a.id == artist_id);

    if is_own {
        let kind = if release.album_type == "album" {
            let tracks = get_album_tracks(&client, &release.id).await?;
            if tracks.len() <= 2 { "single" } else { "album" }
        } else {
            "single"
        };

        if dry_run {
            return Ok(outcome);
        }
        let (_, created) = albums
            .get_or_create(&release.id, &release.name, kind, date)
            .await?;
        albums.add_artist(&release.id, &artist_id).await?;
        if created {
            outcome.new_albums += 1;
        }
        return Ok(outcome);
    }

    // Feature appearance: keep only the artist's own tracks off the host
    // release, and only when they carry real popularity.
    let tracks = get_album_tracks(&client, &release.id).await?;
    for track in tracks {
        if !track.artists.iter().any(|a| a.id == artist_id) {
            continue;
        }
        // Album-tracks listings carry no popularity; the full track does.
        let full = get_track(&client, &track.id).await?;
        if full.popularity.unwrap_or(0) <= FEATURE_POPULARITY_FLOOR {
            continue;
        }

        if dry_run {
            continue;
        }
        let (_, created) = albums
            .get_or_create(&full.id, &full.name, "track", date)
            .await?;
        albums.add_artist(&full.id, &artist_id).await?;
        if created {
            outcome.new_tracks += 1;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArtistRef;

    fn release(id: &str, date: &str, album_type: &str) -> ReleaseItem {
        ReleaseItem {
            id: id.to_string(),
            name: id.to_string(),
            release_date: date.to_string(),
            release_date_precision: "day".to_string(),
            album_type: album_type.to_string(),
            kind: "album".to_string(),
            artists: vec![ArtistRef {
                id: "a1".to_string(),
                name: "Artist".to_string(),
            }],
            available_markets: None,
        }
    }

    #[test]
    fn window_keeps_current_year_only() {
        let year = Utc::now().year();
        let mut window = ReleaseWindow::new(year);
        let (kept, _) = window.scan(vec![
            release("new", &format!("{year}-03-01"), "album"),
            release("old", &format!("{}-11-20", year - 1), "album"),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "new");
    }

    #[test]
    fn window_stops_only_when_all_groups_exhausted() {
        let year = Utc::now().year();
        let mut window = ReleaseWindow::new(year);

        // Old albums alone must not stop the scan; singles may still come.
        let (_, fetch_more) = window.scan(vec![release("a", &format!("{}-01-01", year - 2), "album")]);
        assert!(fetch_more);

        let (_, fetch_more) = window.scan(vec![
            release("s", &format!("{}-01-01", year - 2), "single"),
            release("c", &format!("{}-01-01", year - 2), "compilation"),
        ]);
        assert!(!fetch_more);
    }

    #[test]
    fn window_drops_undatable_releases() {
        let year = Utc::now().year();
        let mut window = ReleaseWindow::new(year);
        let mut bad = release("bad", "not-a-date", "album");
        bad.release_date_precision = "day".to_string();
        let (kept, fetch_more) = window.scan(vec![bad]);
        assert!(kept.is_empty());
        assert!(fetch_more);
    }
}
