//! Catalog persistence and the demo loader.

use chrono::{Duration, Utc};
use odds_comparator::comparison::views;
use odds_comparator::engine::OddsUpdater;
use odds_comparator::seed::seed_demo_at;
use odds_comparator::storage::{OddsStore, SqliteStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("odds-{}.db", uuid::Uuid::new_v4()));
        Self { path }
    }

    fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let db = TempDb::new();
    let now = Utc::now();

    let store = SqliteStore::connect(&db.url()).await.unwrap();
    let first = seed_demo_at(&store, now).await.unwrap();
    assert_eq!(first.odds_created, 350);
    store.close().await;

    let reopened = SqliteStore::connect(&db.url()).await.unwrap();
    assert_eq!(reopened.count_odds().await.unwrap(), 350);
    let again = seed_demo_at(&reopened, now).await.unwrap();
    assert!(!again.created_anything());
    reopened.close().await;
}

#[tokio::test]
async fn test_demo_catalog_then_update_run() {
    let now = Utc::now();
    let store = SqliteStore::in_memory().await.unwrap();
    seed_demo_at(&store, now).await.unwrap();
    let before = store.all_odds().await.unwrap();

    let engine_store: Arc<dyn OddsStore> = Arc::new(store.clone());
    let mut updater = OddsUpdater::with_rng(engine_store, StdRng::seed_from_u64(11));
    let report = updater.run_at(now, 7, false).await.unwrap();

    assert_eq!(report.events_considered, 7);
    assert_eq!(report.created(), 0);
    assert!(report.updated() > 0);

    let after = store.all_odds().await.unwrap();
    assert_eq!(after.len(), before.len());
    let moved = after
        .iter()
        .zip(&before)
        .filter(|(a, b)| a.value != b.value)
        .count();
    assert_eq!(moved, report.updated());
    for (a, b) in after.iter().zip(&before) {
        if a.value != b.value {
            assert_eq!(a.previous_value, Some(b.value));
        }
    }
}

#[tokio::test]
async fn test_views_over_demo_catalog() {
    let now = Utc::now();
    let store = SqliteStore::in_memory().await.unwrap();
    seed_demo_at(&store, now).await.unwrap();

    let overview = views::overview(&store, now).await.unwrap();
    assert_eq!(overview.total_events, 7);
    // Juventus vs Inter Milan kicks off first
    assert_eq!(overview.events[0].home_team, "Juventus");

    let table = views::best_odds(&store, None, now).await.unwrap();
    assert_eq!(table.bet_type.unwrap().code, "1x2");
    assert_eq!(table.rows.len(), 7);
    for row in &table.rows {
        assert_eq!(row.best.len(), 3);
    }

    let board = views::event_board(&store, overview.events[0].id).await.unwrap();
    for group in &board.bet_types {
        for outcome in &group.outcomes {
            assert_eq!(outcome.quotes.len(), 5);
            let best = outcome.best.as_ref().unwrap();
            assert!(outcome.quotes.iter().all(|q| q.value <= best.value));
        }
    }

    let later = views::overview(&store, now + Duration::days(10)).await.unwrap();
    assert_eq!(later.total_events, 0);
}
