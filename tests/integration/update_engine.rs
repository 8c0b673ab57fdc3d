//! End-to-end runs of the odds update engine over SQLite.

use chrono::{DateTime, Duration, Utc};
use odds_comparator::engine::{OddsUpdater, UpdateKind};
use odds_comparator::error::OddsError;
use odds_comparator::storage::{OddsStore, SqliteStore};
use odds_comparator::types::{Event, NewBetType, NewBookmaker, NewEvent, NewOdds, NewSport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

struct Catalog {
    store: SqliteStore,
    sport_id: i64,
    bet_type_id: i64,
    bookmaker_ids: Vec<i64>,
}

/// Two active bookmakers, one football sport and the 1X2 bet type.
async fn catalog() -> Catalog {
    let store = SqliteStore::in_memory().await.unwrap();
    let sport = store
        .create_sport(&NewSport::new("Football", "football"))
        .await
        .unwrap();
    let bet_type = store
        .create_bet_type(&NewBetType::new("1X2", "1x2", "Full-time result"))
        .await
        .unwrap();
    let mut bookmaker_ids = Vec::new();
    for (name, url) in [("Bet365", "https://www.bet365.com"), ("Bwin", "https://www.bwin.com")] {
        bookmaker_ids.push(store.create_bookmaker(&NewBookmaker::new(name, url)).await.unwrap().id);
    }
    Catalog {
        store,
        sport_id: sport.id,
        bet_type_id: bet_type.id,
        bookmaker_ids,
    }
}

impl Catalog {
    async fn event(&self, home: &str, at: DateTime<Utc>) -> Event {
        self.store
            .create_event(&NewEvent::new(self.sport_id, home, "Visitors", at))
            .await
            .unwrap()
    }

    async fn quote(&self, event_id: i64, outcome: &str, value: Decimal) {
        self.store
            .insert_odds_if_absent(&NewOdds {
                event_id,
                bookmaker_id: self.bookmaker_ids[0],
                bet_type_id: self.bet_type_id,
                outcome: outcome.to_string(),
                value,
            })
            .await
            .unwrap();
    }

    fn updater(&self, seed: u64) -> OddsUpdater {
        let store: Arc<dyn OddsStore> = Arc::new(self.store.clone());
        OddsUpdater::with_rng(store, StdRng::seed_from_u64(seed))
    }
}

#[tokio::test]
async fn test_seed_one_event_two_bookmakers() {
    let now = Utc::now();
    let c = catalog().await;
    let event = c.event("Arsenal", now + Duration::days(1)).await;

    let report = c.updater(1).run_at(now, 7, false).await.unwrap();
    assert_eq!(report.total_units, 6);
    assert_eq!(report.updates[0].kind, UpdateKind::Seeded);

    let rows = c.store.odds_for_event(event.id).await.unwrap();
    assert_eq!(rows.len(), 6);
    for row in &rows {
        assert!(row.value >= dec!(1.5) && row.value <= dec!(4.0), "{}", row.value);
        assert_eq!(row.value, row.value.round_dp(2));
        assert_eq!(row.previous_value, None);
    }
}

#[tokio::test]
async fn test_perturb_stays_within_ten_percent() {
    let now = Utc::now();
    let c = catalog().await;
    let event = c.event("Arsenal", now + Duration::days(1)).await;
    c.quote(event.id, "1", dec!(2.00)).await;

    let mut updater = c.updater(2);
    for _ in 0..50 {
        let before = c.store.odds_for_event(event.id).await.unwrap()[0].clone();
        let report = updater.run_at(now, 7, false).await.unwrap();
        let after = c.store.odds_for_event(event.id).await.unwrap()[0].clone();

        let bound = before.value * dec!(0.10) + dec!(0.01);
        assert!((after.value - before.value).abs() <= bound);
        if report.total_units == 1 {
            assert!((after.value - before.value).abs() > dec!(0.01));
            assert_eq!(after.previous_value, Some(before.value));
        } else {
            assert_eq!(after.value, before.value);
        }
    }
}

#[tokio::test]
async fn test_high_odds_move_at_most_five_percent() {
    let now = Utc::now();
    let c = catalog().await;
    let event = c.event("Arsenal", now + Duration::days(1)).await;
    c.quote(event.id, "2", dec!(8.00)).await;

    let mut updater = c.updater(3);
    for _ in 0..50 {
        let before = c.store.odds_for_event(event.id).await.unwrap()[0].value;
        updater.run_at(now, 7, false).await.unwrap();
        let after = c.store.odds_for_event(event.id).await.unwrap()[0].value;
        if before > dec!(5.0) {
            assert!((after - before).abs() <= before * dec!(0.05) + dec!(0.01));
        }
        assert!(after >= dec!(1.01) && after <= dec!(100.00));
    }
}

#[tokio::test]
async fn test_empty_window_writes_nothing() {
    let now = Utc::now();
    let c = catalog().await;
    let far = c.event("Far", now + Duration::days(30)).await;
    c.quote(far.id, "1", dec!(2.50)).await;

    let report = c.updater(4).run_at(now, 7, false).await.unwrap();
    assert_eq!(report.total_units, 0);
    assert_eq!(report.events_considered, 0);
    assert!(report.updates.is_empty());

    let row = &c.store.odds_for_event(far.id).await.unwrap()[0];
    assert_eq!(row.value, dec!(2.50));
    assert_eq!(row.previous_value, None);
}

#[tokio::test]
async fn test_ineligible_events_untouched() {
    let now = Utc::now();
    let c = catalog().await;
    let past = c.event("Past", now - Duration::hours(2)).await;
    let finished = c.event("Finished", now + Duration::days(1)).await;
    let beyond = c.event("Beyond", now + Duration::days(3)).await;
    let open = c.event("Open", now + Duration::days(1)).await;
    c.store.set_event_finished(finished.id, true).await.unwrap();
    for event in [&past, &finished, &beyond] {
        c.quote(event.id, "X", dec!(3.30)).await;
    }

    let report = c.updater(5).run_at(now, 2, false).await.unwrap();
    assert_eq!(report.events_considered, 1);
    assert_eq!(report.updates[0].event_id, open.id);

    for event in [&past, &finished, &beyond] {
        let rows = c.store.odds_for_event(event.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, dec!(3.30));
        assert_eq!(rows[0].previous_value, None);
    }
}

#[tokio::test]
async fn test_second_run_only_perturbs() {
    let now = Utc::now();
    let c = catalog().await;
    let event = c.event("Arsenal", now + Duration::days(1)).await;

    let mut updater = c.updater(6);
    updater.run_at(now, 7, false).await.unwrap();
    let second = updater.run_at(now, 7, false).await.unwrap();

    assert_eq!(second.created(), 0);
    assert!(second.updates.iter().all(|u| u.kind == UpdateKind::Perturbed));
    assert_eq!(c.store.odds_for_event(event.id).await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_dry_run_matches_real_run() {
    let now = Utc::now();
    let dry = catalog().await;
    let wet = catalog().await;
    for c in [&dry, &wet] {
        c.event("Arsenal", now + Duration::days(1)).await;
        c.event("Everton", now + Duration::days(2)).await;
    }

    // Seeding counts must agree.
    let dry_seed = dry.updater(7).run_at(now, 7, true).await.unwrap();
    let wet_seed = wet.updater(7).run_at(now, 7, false).await.unwrap();
    assert_eq!(dry_seed.total_units, wet_seed.total_units);
    assert_eq!(dry.store.count_odds().await.unwrap(), 0);
    assert_eq!(wet.store.count_odds().await.unwrap(), 12);

    // Give the dry store the same odds, then compare perturbation counts.
    dry.updater(7).run_at(now, 7, false).await.unwrap();
    let snapshot = dry.store.all_odds().await.unwrap();
    let dry_move = dry.updater(8).run_at(now, 7, true).await.unwrap();
    let wet_move = wet.updater(8).run_at(now, 7, false).await.unwrap();

    assert_eq!(dry_move.total_units, wet_move.total_units);
    assert_eq!(dry.store.all_odds().await.unwrap(), snapshot);
}

#[tokio::test]
async fn test_negative_lookahead_rejected() {
    let c = catalog().await;
    let err = c.updater(9).run(-3, false).await.unwrap_err();
    assert!(matches!(err, OddsError::InvalidLookahead(-3)));
}

#[tokio::test]
async fn test_inactive_bookmakers_not_seeded() {
    let now = Utc::now();
    let c = catalog().await;
    c.store.set_bookmaker_active(c.bookmaker_ids[1], false).await.unwrap();
    let event = c.event("Arsenal", now + Duration::days(1)).await;

    let report = c.updater(10).run_at(now, 7, false).await.unwrap();
    assert_eq!(report.total_units, 3);
    let rows = c.store.odds_for_event(event.id).await.unwrap();
    assert!(rows.iter().all(|r| r.bookmaker_id == c.bookmaker_ids[0]));
}
