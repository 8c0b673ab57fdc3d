//! Page payloads served by the dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::{best_per_outcome, build_board, BestQuote, EventBoard};
use crate::error::{OddsError, Result};
use crate::storage::{BookmakerQuotes, EventFilter, OddsStore, SqliteStore};
use crate::types::{BetType, Event, Sport};

/// Events listed on the overview page.
pub const OVERVIEW_EVENT_LIMIT: i64 = 20;
/// Maximum search hits returned.
pub const SEARCH_LIMIT: i64 = 50;
/// Bet type shown on the best-odds page when none is requested.
pub const DEFAULT_BET_TYPE: &str = "1x2";

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub events: Vec<Event>,
    pub sports: Vec<Sport>,
    pub total_events: i64,
    pub total_bookmakers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SportPage {
    pub sport: Sport,
    pub events: Vec<Event>,
    pub leagues: Vec<String>,
    pub countries: Vec<String>,
    pub selected_league: Option<String>,
    pub selected_country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestOddsRow {
    pub event: Event,
    pub best: Vec<BestQuote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestOddsTable {
    /// `None` only when no bet types exist at all.
    pub bet_type: Option<BetType>,
    pub bet_types: Vec<BetType>,
    pub rows: Vec<BestOddsRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<Event>,
}

pub async fn overview(store: &SqliteStore, now: DateTime<Utc>) -> Result<Overview> {
    let events = store.upcoming_events(now, OVERVIEW_EVENT_LIMIT).await?;
    Ok(Overview {
        events,
        sports: store.sports().await?,
        total_events: store.count_upcoming_events(now).await?,
        total_bookmakers: store.active_bookmakers().await?.len(),
    })
}

pub async fn event_board(store: &SqliteStore, event_id: i64) -> Result<EventBoard> {
    let event = store.event(event_id).await?;
    let quotes = store.quotes_for_event(event_id).await?;
    debug!(event_id, quotes = quotes.len(), "Building event board");
    Ok(build_board(event, &quotes))
}

pub async fn sport_page(
    store: &SqliteStore,
    slug: &str,
    filter: EventFilter,
    now: DateTime<Utc>,
) -> Result<SportPage> {
    let sport = store
        .sport_by_slug(slug)
        .await?
        .ok_or_else(|| OddsError::not_found("sport", slug))?;

    let filter = EventFilter {
        league: non_empty(filter.league),
        country: non_empty(filter.country),
    };

    Ok(SportPage {
        events: store.events_for_sport(sport.id, now, &filter).await?,
        leagues: store.leagues_for_sport(sport.id).await?,
        countries: store.countries_for_sport(sport.id).await?,
        selected_league: filter.league,
        selected_country: filter.country,
        sport,
    })
}

/// Best price per outcome for every open event with quotes of the chosen
/// bet type. Unknown codes fall back to the first bet type by name.
pub async fn best_odds(
    store: &SqliteStore,
    code: Option<&str>,
    now: DateTime<Utc>,
) -> Result<BestOddsTable> {
    let bet_types = store.bet_types().await?;
    let code = code.unwrap_or(DEFAULT_BET_TYPE);
    let bet_type = match store.bet_type_by_code(code).await? {
        Some(bt) => Some(bt),
        None => bet_types.first().cloned(),
    };

    let mut rows = Vec::new();
    if let Some(bet_type) = &bet_type {
        for event in store.upcoming_events(now, i64::MAX).await? {
            let quotes = store
                .quotes_for_event_and_bet_type(event.id, bet_type.id)
                .await?;
            if quotes.is_empty() {
                continue;
            }
            rows.push(BestOddsRow {
                best: best_per_outcome(&quotes),
                event,
            });
        }
    }

    Ok(BestOddsTable {
        bet_type,
        bet_types,
        rows,
    })
}

pub async fn search(store: &SqliteStore, query: &str, now: DateTime<Utc>) -> Result<SearchResults> {
    let query = query.trim();
    let results = if query.is_empty() {
        Vec::new()
    } else {
        store.search_events(query, now, SEARCH_LIMIT).await?
    };
    Ok(SearchResults {
        query: query.to_string(),
        results,
    })
}

pub async fn bookmakers(store: &SqliteStore) -> Result<Vec<BookmakerQuotes>> {
    store.bookmaker_quote_counts().await
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
