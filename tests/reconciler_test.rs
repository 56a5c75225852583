mod common;

use std::collections::HashSet;

use common::{FakeSpotify, artist, client, playlist_page, release_json, scanned, track_uri};
use rand::{SeedableRng, rngs::StdRng};
use releasebot::{
    filter::ReleaseFilter,
    management::{ArtistScan, PlaylistReconciler},
};
use reqwest::Method;

#[tokio::test]
async fn test_add_missing_skips_existing_and_repeated_uris() {
    let fake = FakeSpotify::new();
    fake.set_playlist("P", &["uriB"]);
    let client = client(&fake);
    let candidates = [scanned(Some("uriA")), scanned(Some("uriA")), scanned(Some("uriB"))];

    let added = PlaylistReconciler::new(&client)
        .add_missing(&candidates, "P")
        .await
        .unwrap();

    assert_eq!(added, 1);
    assert_eq!(fake.playlist("P"), vec!["uriB", "uriA"]);
    let writes = fake.requests_to(Method::POST, "/playlists/P/tracks");
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].json.as_ref().unwrap()["uris"], serde_json::json!(["uriA"]));
}

#[tokio::test]
async fn test_add_missing_is_idempotent() {
    let fake = FakeSpotify::new();
    fake.set_playlist("P", &[]);
    let client = client(&fake);
    let reconciler = PlaylistReconciler::new(&client);
    let candidates = [scanned(Some("uriA")), scanned(Some("uriB"))];

    assert_eq!(reconciler.add_missing(&candidates, "P").await.unwrap(), 2);
    assert_eq!(reconciler.add_missing(&candidates, "P").await.unwrap(), 0);

    assert_eq!(fake.playlist("P"), vec!["uriA", "uriB"]);
    assert_eq!(fake.requests_to(Method::POST, "/playlists/P/tracks").len(), 1);
}

#[tokio::test]
async fn test_add_missing_with_no_candidates_makes_no_requests() {
    let fake = FakeSpotify::new();
    let client = client(&fake);

    let added = PlaylistReconciler::new(&client).add_missing(&[], "P").await.unwrap();

    assert_eq!(added, 0);
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_tracks_without_uri_are_ignored() {
    let fake = FakeSpotify::new();
    fake.set_playlist("P", &[]);
    let client = client(&fake);

    let added = PlaylistReconciler::new(&client)
        .add_missing(&[scanned(None), scanned(Some(""))], "P")
        .await
        .unwrap();

    assert_eq!(added, 0);
    assert!(fake.requests_to(Method::POST, "/playlists/P/tracks").is_empty());
}

#[tokio::test]
async fn test_unavailable_playlist_entries_are_skipped() {
    let fake = FakeSpotify::new();
    fake.script(
        "/playlists/P/tracks",
        vec![playlist_page(vec![
            serde_json::json!({ "track": null }),
            serde_json::json!({ "track": { "name": "B", "uri": "uriB" } }),
        ])],
    );
    let client = client(&fake);

    let added = PlaylistReconciler::new(&client)
        .add_missing(&[scanned(Some("uriA")), scanned(Some("uriB"))], "P")
        .await
        .unwrap();

    assert_eq!(added, 1);
    assert_eq!(fake.playlist("P"), vec!["uriA"]);
}

#[tokio::test]
async fn test_large_additions_are_batched() {
    let fake = FakeSpotify::new();
    fake.set_playlist("P", &[]);
    let client = client(&fake);
    let uris: Vec<String> = (0..205).map(|i| format!("spotify:track:{i}")).collect();
    let candidates: Vec<_> = uris.iter().map(|u| scanned(Some(u.as_str()))).collect();

    let added = PlaylistReconciler::new(&client)
        .add_missing(&candidates, "P")
        .await
        .unwrap();

    assert_eq!(added, 205);
    assert_eq!(fake.requests_to(Method::POST, "/playlists/P/tracks").len(), 3);
    assert_eq!(fake.playlist("P"), uris);
}

#[tokio::test]
async fn test_sync_adds_each_shared_track_once() {
    let fake = FakeSpotify::new();
    fake.set_playlist("P", &[track_uri("have").as_str()]);
    fake.add_release("A1", release_json("R1", "2020-01-01", "day", "album"), &["have", "shared"]);
    fake.add_release("A2", release_json("R2", "2021", "year", "single"), &["shared", "own"]);
    let client = client(&fake);
    let artists = [artist("A1", "One"), artist("A2", "Two")];

    let report = PlaylistReconciler::new(&client)
        .sync_all(&artists, "P", &ReleaseFilter::everything())
        .await
        .unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(
        fake.playlist("P"),
        vec![track_uri("have"), track_uri("shared"), track_uri("own")]
    );
    assert_eq!(
        report.outcomes[1].result,
        ArtistScan::Scanned {
            releases: 1,
            tracks: 1
        }
    );
}

#[tokio::test]
async fn test_sync_continues_past_a_failing_artist() {
    let fake = FakeSpotify::new();
    fake.set_playlist("P", &[]);
    fake.add_release("A2", release_json("R2", "2021-01-01", "day", "album"), &["t2"]);
    let client = client(&fake);
    let artists = [artist("GONE", "Deleted"), artist("A2", "Two")];

    let report = PlaylistReconciler::new(&client)
        .sync_all(&artists, "P", &ReleaseFilter::everything())
        .await
        .unwrap();

    assert_eq!(report.added, 1);
    assert!(matches!(
        report.outcomes[0].result,
        ArtistScan::Failed {
            invalid_artist: true,
            ..
        }
    ));
}

#[tokio::test]
async fn test_sync_of_up_to_date_playlist_writes_nothing() {
    let fake = FakeSpotify::new();
    fake.set_playlist("P", &[track_uri("t1").as_str()]);
    fake.add_release("A1", release_json("R1", "2020-01-01", "day", "album"), &["t1"]);
    let client = client(&fake);

    let report = PlaylistReconciler::new(&client)
        .sync_all(&[artist("A1", "One")], "P", &ReleaseFilter::everything())
        .await
        .unwrap();

    assert_eq!(report.added, 0);
    assert!(fake.requests_to(Method::POST, "/playlists/P/tracks").is_empty());
}

#[tokio::test]
async fn test_shuffle_keeps_the_same_tracks() {
    let fake = FakeSpotify::new();
    let original: Vec<String> = (0..150).map(|i| format!("spotify:track:{i}")).collect();
    let refs: Vec<&str> = original.iter().map(String::as_str).collect();
    fake.set_playlist("P", &refs);
    let client = client(&fake);

    let count = PlaylistReconciler::new(&client)
        .shuffle_and_replace_with("P", &mut StdRng::seed_from_u64(3))
        .await
        .unwrap();

    let shuffled = fake.playlist("P");
    assert_eq!(count, 150);
    assert_eq!(shuffled.len(), 150);
    assert_ne!(shuffled, original);
    assert_eq!(
        shuffled.iter().collect::<HashSet<_>>(),
        original.iter().collect::<HashSet<_>>()
    );
    assert_eq!(fake.requests_to(Method::PUT, "/playlists/P/tracks").len(), 1);
    assert_eq!(fake.requests_to(Method::POST, "/playlists/P/tracks").len(), 1);
}

#[tokio::test]
async fn test_shuffle_of_empty_playlist_writes_nothing() {
    let fake = FakeSpotify::new();
    fake.set_playlist("P", &[]);
    let client = client(&fake);

    let count = PlaylistReconciler::new(&client)
        .shuffle_and_replace("P")
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(fake.requests_to(Method::PUT, "/playlists/P/tracks").is_empty());
}
