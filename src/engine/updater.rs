//! Odds update engine.
//!
//! One run walks every unfinished event inside the lookahead window. Events
//! without odds get a full bookmaker × bet type × outcome matrix; events
//! with odds have every quote nudged by the movement model. Dry runs make
//! the same decisions and report the same counts without writing.

use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::report::{EventUpdate, UpdateKind, UpdateReport};
use super::simulator;
use crate::error::{OddsError, Result};
use crate::market::BetKind;
use crate::storage::OddsStore;
use crate::types::{Event, NewOdds, Odds};

pub struct OddsUpdater {
    store: Arc<dyn OddsStore>,
    rng: StdRng,
}

impl OddsUpdater {
    pub fn new(store: Arc<dyn OddsStore>) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Use a caller-supplied random stream (seeded in tests).
    pub fn with_rng(store: Arc<dyn OddsStore>, rng: StdRng) -> Self {
        Self { store, rng }
    }

    /// Update odds for events in `[now, now + lookahead_days]`.
    pub async fn run(&mut self, lookahead_days: i64, dry_run: bool) -> Result<UpdateReport> {
        self.run_at(Utc::now(), lookahead_days, dry_run).await
    }

    pub async fn run_at(
        &mut self,
        now: DateTime<Utc>,
        lookahead_days: i64,
        dry_run: bool,
    ) -> Result<UpdateReport> {
        if lookahead_days < 0 {
            return Err(OddsError::InvalidLookahead(lookahead_days));
        }
        let window_end = TimeDelta::try_days(lookahead_days)
            .and_then(|span| now.checked_add_signed(span))
            .ok_or(OddsError::InvalidLookahead(lookahead_days))?;

        info!(
            lookahead_days,
            dry_run,
            window_start = %now,
            window_end = %window_end,
            "Starting odds update"
        );

        let mut report = UpdateReport::new(now, window_end, dry_run);
        let events: Vec<Event> = self
            .store
            .events_in_window(now, window_end)
            .await?
            .into_iter()
            .filter(|e| e.in_window(now, window_end))
            .collect();

        if events.is_empty() {
            warn!(lookahead_days, "No active events to update");
            return Ok(report);
        }

        for event in &events {
            let update = self.update_event(event, dry_run).await?;
            debug!(
                event_id = event.id,
                kind = ?update.kind,
                units = update.units,
                "Event processed"
            );
            report.record(update);
        }

        info!(
            events = report.events_considered,
            created = report.created(),
            updated = report.updated(),
            total = report.total_units,
            dry_run,
            "Odds update complete"
        );
        Ok(report)
    }

    async fn update_event(&mut self, event: &Event, dry_run: bool) -> Result<EventUpdate> {
        let existing = self.store.odds_for_event(event.id).await?;

        if existing.is_empty() {
            let units = self.seed_event(event, dry_run).await?;
            Ok(EventUpdate::new(event, UpdateKind::Seeded, units))
        } else {
            let units = self.perturb_odds(&existing, dry_run).await?;
            Ok(EventUpdate::new(event, UpdateKind::Perturbed, units))
        }
    }

    /// Create every missing quote of the event's matrix.
    ///
    /// Each planned quote counts as one unit in a dry run. Otherwise only
    /// quotes actually inserted count; tuples already present (e.g. written
    /// by a concurrent run) are skipped by the store.
    pub async fn seed_event(&mut self, event: &Event, dry_run: bool) -> Result<usize> {
        let bookmakers = self.store.active_bookmakers().await?;
        if bookmakers.is_empty() {
            warn!(event_id = event.id, "No active bookmakers, nothing to seed");
            return Ok(0);
        }

        let bet_types = self.store.bet_types().await?;
        if bet_types.is_empty() {
            warn!(event_id = event.id, "No bet types configured, nothing to seed");
            return Ok(0);
        }

        let mut created = 0;
        for bet_type in &bet_types {
            let kind = BetKind::from_code(&bet_type.code);
            for outcome in kind.outcomes() {
                for bookmaker in &bookmakers {
                    let value = simulator::seed_value(kind, &mut self.rng);
                    if dry_run {
                        created += 1;
                        continue;
                    }
                    let new = NewOdds {
                        event_id: event.id,
                        bookmaker_id: bookmaker.id,
                        bet_type_id: bet_type.id,
                        outcome: (*outcome).to_string(),
                        value,
                    };
                    if self.store.insert_odds_if_absent(&new).await? {
                        created += 1;
                    }
                }
            }
        }

        debug!(event_id = event.id, created, dry_run, "Seeded odds matrix");
        Ok(created)
    }

    async fn perturb_odds(&mut self, rows: &[Odds], dry_run: bool) -> Result<usize> {
        let mut updated = 0;
        for odds in rows {
            let step = simulator::perturb(odds.value, &mut self.rng);
            if !step.is_material() {
                continue;
            }
            if !dry_run {
                self.store
                    .update_odds_value(odds.id, step.old, step.new)
                    .await?;
            }
            updated += 1;
        }
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
