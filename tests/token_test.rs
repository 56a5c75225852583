mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{FakeRefresher, MemoryCredentials, token_expiring_in};
use releasebot::{
    Error,
    management::{CredentialStore, REFRESH_WINDOW_MS, TokenFile, TokenGuard},
    types::TokenState,
};

#[tokio::test]
async fn test_token_inside_refresh_window_is_refreshed_once_and_persisted() {
    let store = MemoryCredentials::with_token(token_expiring_in(4 * 60 * 1000));
    let refresher = FakeRefresher::issuing("access-new", Some("refresh-new"), 3600);
    let guard = TokenGuard::new(store.clone(), refresher.clone());

    let before = Utc::now().timestamp_millis();
    let credential = guard.ensure_valid().await.unwrap();

    assert_eq!(credential.access_token, "access-new");
    assert_eq!(refresher.calls(), 1);
    assert_eq!(store.saves(), 1);

    let saved = store.stored().await.unwrap();
    assert_eq!(saved.access_token, "access-new");
    assert_eq!(saved.refresh_token, "refresh-new");
    assert!(saved.expires_at >= before + 3600 * 1000);

    // The new token is far from expiry, so no second refresh.
    let again = guard.ensure_valid().await.unwrap();
    assert_eq!(again.access_token, "access-new");
    assert_eq!(refresher.calls(), 1);
}

#[tokio::test]
async fn test_fresh_token_is_returned_without_refresh() {
    let store = MemoryCredentials::with_token(token_expiring_in(REFRESH_WINDOW_MS + 60_000));
    let refresher = FakeRefresher::issuing("unused", None, 3600);
    let guard = TokenGuard::new(store.clone(), refresher.clone());

    let credential = guard.ensure_valid().await.unwrap();

    assert_eq!(credential.access_token, "access-old");
    assert_eq!(refresher.calls(), 0);
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let store = MemoryCredentials::with_token(token_expiring_in(-1000));
    let refresher = FakeRefresher::issuing("access-new", None, 3600);
    let guard = Arc::new(TokenGuard::new(store.clone(), refresher.clone()));

    let (a, b, c) = tokio::join!(guard.ensure_valid(), guard.ensure_valid(), guard.ensure_valid());

    for credential in [a, b, c] {
        assert_eq!(credential.unwrap().access_token, "access-new");
    }
    assert_eq!(refresher.calls(), 1);
    assert_eq!(store.saves(), 1);
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let guard = TokenGuard::new(MemoryCredentials::empty(), FakeRefresher::failing());

    let result = guard.ensure_valid().await;

    assert!(matches!(result, Err(Error::Unauthenticated)));
}

#[tokio::test]
async fn test_failed_refresh_keeps_stored_token() {
    let expired = token_expiring_in(-1000);
    let store = MemoryCredentials::with_token(expired.clone());
    let guard = TokenGuard::new(store.clone(), FakeRefresher::failing());

    let result = guard.ensure_valid().await;

    assert!(matches!(result, Err(Error::TokenRefresh(_))));
    assert_eq!(store.saves(), 0);
    assert_eq!(store.stored().await, Some(expired));
}

#[tokio::test]
async fn test_refresh_token_is_kept_when_none_is_issued() {
    let store = MemoryCredentials::with_token(token_expiring_in(0));
    let guard = TokenGuard::new(store.clone(), FakeRefresher::issuing("access-new", None, 3600));

    guard.ensure_valid().await.unwrap();

    let saved = store.stored().await.unwrap();
    assert_eq!(saved.refresh_token, "refresh-old");
}

#[tokio::test]
async fn test_unsaved_refresh_is_kept_in_memory_and_fatal() {
    let expired = token_expiring_in(-1000);
    let store = MemoryCredentials::read_only(expired.clone());
    let refresher = FakeRefresher::issuing("access-new", Some("refresh-rotated"), 3600);
    let guard = TokenGuard::new(store.clone(), refresher.clone());

    let first = guard.ensure_valid().await;
    let err = first.unwrap_err();
    assert!(matches!(err, Error::TokenRefresh(_)));
    assert!(err.is_fatal());

    // The rotated token is still in memory, so no second refresh.
    let second = guard.ensure_valid().await.unwrap();
    assert_eq!(second.access_token, "access-new");
    assert_eq!(refresher.calls(), 1);
    assert_eq!(store.saves(), 1);
    assert_eq!(store.stored().await, Some(expired));
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("releasebot-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test]
async fn test_token_file_round_trips_camel_case_json() {
    let dir = temp_dir("tokens");
    let file = TokenFile::new(dir.join("tokens.json"));
    let token = TokenState {
        access_token: "a".into(),
        refresh_token: "r".into(),
        expires_at: 1_700_000_000_000,
    };

    assert_eq!(file.load().await.unwrap(), None);
    file.save(&token).await.unwrap();

    let raw = std::fs::read_to_string(file.path()).unwrap();
    assert!(raw.contains("\"accessToken\""));
    assert!(raw.contains("\"expiresAt\""));
    assert_eq!(file.load().await.unwrap(), Some(token));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_corrupt_token_file_reads_as_missing() {
    let dir = temp_dir("corrupt-tokens");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tokens.json"), "{ not json").unwrap();

    let file = TokenFile::new(dir.join("tokens.json"));
    assert_eq!(file.load().await.unwrap(), None);

    let _ = std::fs::remove_dir_all(&dir);
}
