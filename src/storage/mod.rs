//! Persistence layer.
//!
//! `OddsStore` is the narrow boundary the update engine runs against.
//! `SqliteStore` implements it on top of an `sqlx` SQLite pool and also
//! carries the wider catalog queries used by the web views and seeding.

pub mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::types::{BetType, Bookmaker, Event, NewOdds, Odds};

/// Storage operations needed by the odds update engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OddsStore: Send + Sync {
    /// Bookmakers with `active = true`, ordered by name.
    async fn active_bookmakers(&self) -> Result<Vec<Bookmaker>>;

    /// All bet types, ordered by name.
    async fn bet_types(&self) -> Result<Vec<BetType>>;

    /// Unfinished events scheduled inside `[from, to]` (inclusive).
    async fn events_in_window(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Event>>;

    async fn odds_for_event(&self, event_id: i64) -> Result<Vec<Odds>>;

    /// Insert a quote unless one already exists for the same
    /// (event, bookmaker, bet type, outcome). Returns whether a row was
    /// inserted. Must be a single atomic statement.
    async fn insert_odds_if_absent(&self, odds: &NewOdds) -> Result<bool>;

    /// Move `previous` into the previous-value column and store `value`.
    async fn update_odds_value(&self, odds_id: i64, previous: Decimal, value: Decimal) -> Result<()>;
}

/// A quote joined with the names the comparison views display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteDetail {
    pub odds: Odds,
    pub bookmaker: String,
    pub bet_type_code: String,
    pub bet_type_name: String,
}

/// Active bookmaker with the number of quotes it currently has.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmakerQuotes {
    pub bookmaker: Bookmaker,
    pub quote_count: i64,
}

/// Optional case-insensitive substring filters for the sport page.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub league: Option<String>,
    pub country: Option<String>,
}
