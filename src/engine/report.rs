//! Per-run summary of the odds update engine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::types::Event;

/// What the engine did to an event's odds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    /// The event had no odds; an initial matrix was created.
    Seeded,
    /// Existing odds were moved.
    Perturbed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventUpdate {
    pub event_id: i64,
    pub label: String,
    pub kind: UpdateKind,
    pub units: usize,
}

impl EventUpdate {
    pub fn new(event: &Event, kind: UpdateKind, units: usize) -> Self {
        Self {
            event_id: event.id,
            label: event.label(),
            kind,
            units,
        }
    }
}

impl fmt::Display for EventUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            UpdateKind::Seeded => "created",
            UpdateKind::Perturbed => "updated",
        };
        write!(f, "✓ {}: {} odds {verb}", self.label, self.units)
    }
}

/// Result of one `OddsUpdater::run`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub dry_run: bool,
    /// Eligible events found in the window.
    pub events_considered: usize,
    /// Events with at least one unit of work, in processing order.
    pub updates: Vec<EventUpdate>,
    pub total_units: usize,
}

impl UpdateReport {
    pub fn new(window_start: DateTime<Utc>, window_end: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            window_start,
            window_end,
            dry_run,
            events_considered: 0,
            updates: Vec::new(),
            total_units: 0,
        }
    }

    /// Add one event's result. Zero-unit events only count as considered.
    pub fn record(&mut self, update: EventUpdate) {
        self.events_considered += 1;
        self.total_units += update.units;
        if update.units > 0 {
            self.updates.push(update);
        }
    }

    /// Rows created (or, in dry-run, that would be created) by seeding.
    pub fn created(&self) -> usize {
        self.units_of(UpdateKind::Seeded)
    }

    /// Rows moved (or, in dry-run, that would be moved).
    pub fn updated(&self) -> usize {
        self.units_of(UpdateKind::Perturbed)
    }

    fn units_of(&self, kind: UpdateKind) -> usize {
        self.updates
            .iter()
            .filter(|u| u.kind == kind)
            .map(|u| u.units)
            .sum()
    }

    pub fn summary_line(&self) -> String {
        if self.dry_run {
            format!("DRY RUN COMPLETE: {} odds would be updated", self.total_units)
        } else {
            format!("UPDATE COMPLETE: {} odds updated", self.total_units)
        }
    }
}
