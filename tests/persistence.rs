//! Integration tests for the SQLite repository and dedup store.

use std::time::Duration;

use chrono::Utc;
use pulseatlas::dedup::DedupStore;
use pulseatlas::models::{CheckStatus, NewService};
use pulseatlas::persistence::sqlite::{SqliteDedupStore, SqliteRepository};
use pulseatlas::persistence::traits::AppRepository;
use pulseatlas::test_helpers::CheckBuilder;

async fn setup_test_db() -> SqliteRepository {
    let repo = SqliteRepository::new("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");
    repo.run_migrations().await.expect("Failed to run migrations");
    repo
}

fn new_service(name: &str) -> NewService {
    NewService {
        name: name.to_string(),
        url: "http://localhost:9999/health".parse().unwrap(),
        interval_seconds: 60,
        timeout_seconds: 10,
    }
}

#[tokio::test]
async fn service_crud_roundtrip() {
    let repo = setup_test_db().await;

    // Initially empty.
    assert!(repo.list_services().await.unwrap().is_empty());

    let created = repo.insert_service(new_service("api")).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.name, "api");
    assert_eq!(created.interval_seconds, 60);

    let fetched = repo.get_service(created.id).await.unwrap().expect("service exists");
    assert_eq!(fetched.name, "api");
    assert_eq!(fetched.url, "http://localhost:9999/health");

    let all = repo.list_services().await.unwrap();
    assert_eq!(all.len(), 1);

    assert!(repo.delete_service(created.id).await.unwrap());
    assert!(repo.get_service(created.id).await.unwrap().is_none());
    // Deleting again reports that nothing was removed.
    assert!(!repo.delete_service(created.id).await.unwrap());
}

#[tokio::test]
async fn insert_check_assigns_id_and_preserves_snapshot() {
    let repo = setup_test_db().await;
    let service = repo.insert_service(new_service("api")).await.unwrap();

    let check = CheckBuilder::new()
        .service_id(service.id)
        .status(CheckStatus::Error)
        .response_time_ms(812.5)
        .error_rate_percent(25.0)
        .uptime_percent(75.0)
        .apdex_score(0.5)
        .build();

    let stored = repo.insert_check(check).await.unwrap();

    assert!(stored.id > 0);
    assert_eq!(stored.service_id, service.id);
    assert_eq!(stored.status, CheckStatus::Error);
    assert_eq!(stored.response_time_ms, Some(812.5));
    assert_eq!(stored.error_rate_percent, Some(25.0));
    assert_eq!(stored.uptime_percent, Some(75.0));
    assert_eq!(stored.apdex_score, Some(0.5));
}

#[tokio::test]
async fn checks_since_filters_and_orders_ascending() {
    let repo = setup_test_db().await;
    let service = repo.insert_service(new_service("api")).await.unwrap();

    let now = Utc::now();
    for minutes_ago in [120i64, 30, 10, 1] {
        let check = CheckBuilder::new()
            .service_id(service.id)
            .timestamp(now - chrono::Duration::minutes(minutes_ago))
            .status(CheckStatus::Ok)
            .response_time_ms(minutes_ago as f64)
            .build();
        repo.insert_check(check).await.unwrap();
    }

    let window = repo
        .checks_since(service.id, now - chrono::Duration::minutes(60))
        .await
        .unwrap();

    // The two-hour-old check falls outside the window.
    assert_eq!(window.len(), 3);
    assert!(window.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
    assert_eq!(window[0].response_time_ms, Some(30.0));
}

#[tokio::test]
async fn recent_checks_returns_newest_first_with_limit() {
    let repo = setup_test_db().await;
    let service = repo.insert_service(new_service("api")).await.unwrap();

    let now = Utc::now();
    for i in 0..5i64 {
        let check = CheckBuilder::new()
            .service_id(service.id)
            .timestamp(now - chrono::Duration::minutes(i))
            .status(CheckStatus::Ok)
            .response_time_ms(i as f64)
            .build();
        repo.insert_check(check).await.unwrap();
    }

    let recent = repo.recent_checks(service.id, 3).await.unwrap();

    assert_eq!(recent.len(), 3);
    // Newest first: the check with offset 0 minutes leads.
    assert_eq!(recent[0].response_time_ms, Some(0.0));
    assert!(recent.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
}

#[tokio::test]
async fn deleting_a_service_cascades_to_its_checks() {
    let repo = setup_test_db().await;
    let service = repo.insert_service(new_service("api")).await.unwrap();
    let other = repo.insert_service(new_service("web")).await.unwrap();

    repo.insert_check(CheckBuilder::new().service_id(service.id).build()).await.unwrap();
    repo.insert_check(CheckBuilder::new().service_id(other.id).build()).await.unwrap();

    repo.delete_service(service.id).await.unwrap();

    let since = Utc::now() - chrono::Duration::hours(1);
    assert!(repo.checks_since(service.id, since).await.unwrap().is_empty());
    // The other service's history is untouched.
    assert_eq!(repo.checks_since(other.id, since).await.unwrap().len(), 1);
}

#[tokio::test]
async fn dedup_store_admits_once_per_window() {
    let repo = setup_test_db().await;
    let store = SqliteDedupStore::new(&repo);
    let ttl = Duration::from_secs(300);

    assert!(store.set_if_absent("alert_dedupe:1", ttl).await.unwrap());
    assert!(!store.set_if_absent("alert_dedupe:1", ttl).await.unwrap());
    // A different service key is unaffected.
    assert!(store.set_if_absent("alert_dedupe:2", ttl).await.unwrap());
}

#[tokio::test]
async fn dedup_store_readmits_after_expiry() {
    let repo = setup_test_db().await;
    let store = SqliteDedupStore::new(&repo);
    let ttl = Duration::from_millis(500);

    assert!(store.set_if_absent("alert_dedupe:1", ttl).await.unwrap());
    assert!(!store.set_if_absent("alert_dedupe:1", ttl).await.unwrap());

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(store.set_if_absent("alert_dedupe:1", ttl).await.unwrap());
}

#[tokio::test]
async fn dedup_store_is_atomic_under_concurrency() {
    // File-backed database so every pooled connection sees the same tables.
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("dedup.db");
    let repo = SqliteRepository::new(&format!("sqlite:{}", db_path.display())).await.unwrap();
    repo.run_migrations().await.unwrap();
    let repo = std::sync::Arc::new(repo);
    let ttl = Duration::from_secs(300);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let repo = std::sync::Arc::clone(&repo);
        tasks.push(tokio::spawn(async move {
            let store = SqliteDedupStore::new(&repo);
            store.set_if_absent("alert_dedupe:race", ttl).await.unwrap()
        }));
    }

    let admitted = futures::future::join_all(tasks)
        .await
        .into_iter()
        .filter(|r| *r.as_ref().unwrap())
        .count();

    assert_eq!(admitted, 1);
}
