use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use sporlsync::management::{AlbumManager, ArtistManager, ArtistRecord, UserManager, UserRecord};
use sporlsync::tasks::run_tasks;
use sporlsync::types::Token;

fn scratch_dir(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "sporlsync-test-{}-{}-{}",
        label,
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    path
}

fn token() -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: "user-follow-read".to_string(),
        expires_in: 3600,
        obtained_at: 0,
    }
}

fn user(name: &str) -> UserRecord {
    UserRecord {
        username: name.to_string(),
        display_name: name.to_string(),
        chat_id: String::new(),
        market: Some("DE".to_string()),
        token: Some(token()),
        follows: Vec::new(),
    }
}

#[tokio::test]
async fn test_user_roundtrip_and_listing() {
    let base = scratch_dir("users");
    let users = UserManager::with_base(base.clone());

    // Empty store lists nothing instead of failing
    assert!(users.all().await.unwrap().is_empty());
    assert!(users.get("nobody").await.unwrap().is_none());

    users.save(&user("zoe")).await.unwrap();
    users.save(&user("adam")).await.unwrap();

    let all = users.all().await.unwrap();
    assert_eq!(all.len(), 2);
    // Listing is sorted by username
    assert_eq!(all[0].username, "adam");
    assert_eq!(all[1].username, "zoe");

    let zoe = users.get("zoe").await.unwrap().unwrap();
    assert!(zoe.has_credentials());
    assert_eq!(zoe.market.as_deref(), Some("DE"));

    let _ = std::fs::remove_dir_all(base);
}

#[tokio::test]
async fn test_user_without_token_has_no_credentials() {
    let mut record = user("pat");
    record.token = None;
    assert!(!record.has_credentials());
}

#[tokio::test]
async fn test_artist_staleness_window() {
    let fresh = ArtistRecord {
        spotify_id: "a1".to_string(),
        name: "Fresh".to_string(),
        synced_at: Some(Utc::now() - Duration::hours(1)),
    };
    let stale = ArtistRecord {
        spotify_id: "a2".to_string(),
        name: "Stale".to_string(),
        synced_at: Some(Utc::now() - Duration::hours(5)),
    };
    let never = ArtistRecord {
        spotify_id: "a3".to_string(),
        name: "Never".to_string(),
        synced_at: None,
    };

    assert!(!fresh.can_update(4));
    assert!(stale.can_update(4));
    assert!(never.can_update(4));
}

#[tokio::test]
async fn test_artist_get_or_create_and_sync_stamp() {
    let base = scratch_dir("artists");
    let artists = ArtistManager::with_base(base.clone());

    let (record, created) = artists.get_or_create("a1", "Band").await.unwrap();
    assert!(created);
    assert!(record.synced_at.is_none());

    // Second call finds the stored record
    let (_, created) = artists.get_or_create("a1", "Band").await.unwrap();
    assert!(!created);

    artists.update_synced_at("a1").await.unwrap();
    let stamped = artists.get("a1").await.unwrap().unwrap();
    assert!(stamped.synced_at.is_some());
    assert!(!stamped.can_update(4));

    // Stamping an unknown artist is an error, not a silent create
    assert!(artists.update_synced_at("missing").await.is_err());

    let _ = std::fs::remove_dir_all(base);
}

#[tokio::test]
async fn test_album_artist_links_accumulate() {
    let base = scratch_dir("albums");
    let albums = AlbumManager::with_base(base.clone());
    let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();

    let (_, created) = albums.get_or_create("r1", "Record", "album", date).await.unwrap();
    assert!(created);

    assert!(albums.add_artist("r1", "a1").await.unwrap());
    assert!(albums.add_artist("r1", "a2").await.unwrap());
    // Adding the same edge twice is a no-op
    assert!(!albums.add_artist("r1", "a1").await.unwrap());

    let record = albums.get("r1").await.unwrap().unwrap();
    assert_eq!(record.artist_ids, vec!["a1", "a2"]);

    let _ = std::fs::remove_dir_all(base);
}

#[tokio::test]
async fn test_concurrent_artist_links_all_survive() {
    let base = scratch_dir("shared-album");
    let albums = AlbumManager::with_base(base.clone());
    let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();

    albums
        .get_or_create("shared", "Collab Record", "album", date)
        .await
        .unwrap();

    // A collab release is linked by many artist sync units at once; every
    // edge must land despite the interleaved read-modify-writes
    let artist_ids: Vec<String> = (0..8).map(|i| format!("artist-{}", i)).collect();
    let results = run_tasks(8, artist_ids.clone(), |artist_id| {
        let albums = albums.clone();
        async move { albums.add_artist("shared", &artist_id).await }
    })
    .await;

    assert_eq!(results.len(), 8);
    for result in &results {
        assert!(*result.as_ref().unwrap());
    }

    let record = albums.get("shared").await.unwrap().unwrap();
    assert_eq!(record.artist_ids.len(), 8);
    for artist_id in &artist_ids {
        assert!(record.artist_ids.contains(artist_id));
    }

    let _ = std::fs::remove_dir_all(base);
}

#[tokio::test]
async fn test_released_since_filters_by_date_and_follows() {
    let base = scratch_dir("released");
    let albums = AlbumManager::with_base(base.clone());
    let monday = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();

    // In range, followed artist
    albums
        .get_or_create("fresh", "Fresh", "album", monday)
        .await
        .unwrap();
    albums.add_artist("fresh", "followed").await.unwrap();

    // Too old
    albums
        .get_or_create("old", "Old", "album", monday - Duration::days(3))
        .await
        .unwrap();
    albums.add_artist("old", "followed").await.unwrap();

    // In range but by somebody else
    albums
        .get_or_create("other", "Other", "single", monday + Duration::days(2))
        .await
        .unwrap();
    albums.add_artist("other", "stranger").await.unwrap();

    let follows = vec!["followed".to_string()];
    let releases = albums.released_since(monday, &follows).await.unwrap();

    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].spotify_id, "fresh");

    let _ = std::fs::remove_dir_all(base);
}
