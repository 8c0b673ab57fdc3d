//! SQLite-backed catalog store.
//!
//! Timestamps are stored as unix milliseconds so window filters compare
//! integers. Odds values are stored as REAL and always read back rounded
//! to two decimal places.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

use super::{BookmakerQuotes, EventFilter, OddsStore, QuoteDetail};
use crate::error::{OddsError, Result};
use crate::types::{
    BetType, Bookmaker, Event, NewBetType, NewBookmaker, NewEvent, NewOdds, NewSport, Odds, Sport,
};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS bookmakers (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL UNIQUE,
        url         TEXT NOT NULL,
        logo_url    TEXT,
        active      INTEGER NOT NULL DEFAULT 1,
        created_at  INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS sports (
        id    INTEGER PRIMARY KEY AUTOINCREMENT,
        name  TEXT NOT NULL UNIQUE,
        slug  TEXT NOT NULL UNIQUE,
        icon  TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS events (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        sport_id      INTEGER NOT NULL REFERENCES sports(id) ON DELETE CASCADE,
        home_team     TEXT NOT NULL,
        away_team     TEXT NOT NULL,
        scheduled_at  INTEGER NOT NULL,
        league        TEXT,
        country       TEXT,
        finished      INTEGER NOT NULL DEFAULT 0,
        created_at    INTEGER NOT NULL,
        updated_at    INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_events_schedule ON events(scheduled_at, finished)",
    r#"CREATE TABLE IF NOT EXISTS bet_types (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        name         TEXT NOT NULL UNIQUE,
        code         TEXT NOT NULL UNIQUE COLLATE NOCASE,
        description  TEXT NOT NULL DEFAULT ''
    )"#,
    r#"CREATE TABLE IF NOT EXISTS odds (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id        INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        bookmaker_id    INTEGER NOT NULL REFERENCES bookmakers(id) ON DELETE CASCADE,
        bet_type_id     INTEGER NOT NULL REFERENCES bet_types(id) ON DELETE CASCADE,
        outcome         TEXT NOT NULL,
        value           REAL NOT NULL,
        previous_value  REAL,
        created_at      INTEGER NOT NULL,
        updated_at      INTEGER NOT NULL,
        UNIQUE (event_id, bookmaker_id, bet_type_id, outcome)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_odds_event_type_outcome ON odds(event_id, bet_type_id, outcome)",
];

const EVENT_SELECT: &str = r#"
    SELECT e.id, e.sport_id, s.name AS sport_name, e.home_team, e.away_team,
           e.scheduled_at, e.league, e.country, e.finished, e.created_at, e.updated_at
    FROM events e
    JOIN sports s ON s.id = e.sport_id
"#;

const ODDS_COLUMNS: &str = "o.id, o.event_id, o.bookmaker_id, o.bet_type_id, o.outcome, \
                            o.value, o.previous_value, o.created_at, o.updated_at";

/// Catalog store over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and apply the schema.
    ///
    /// In-memory databases are pinned to one long-lived connection; each
    /// SQLite connection would otherwise see its own empty database.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;

        info!(url, in_memory, "Odds database ready");
        Ok(store)
    }

    /// Fresh private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!(statements = SCHEMA.len(), "Schema applied");
        Ok(())
    }

    /// Release every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // -- Bookmakers -------------------------------------------------------

    pub async fn create_bookmaker(&self, new: &NewBookmaker) -> Result<Bookmaker> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO bookmakers (name, url, logo_url, active, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.url)
        .bind(&new.logo_url)
        .bind(new.active)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| OddsError::from_insert(e, "bookmaker", &new.name))?
        .last_insert_rowid();

        self.bookmaker(id).await
    }

    /// Get-or-create by name. Returns the row and whether it was created.
    pub async fn ensure_bookmaker(&self, new: &NewBookmaker) -> Result<(Bookmaker, bool)> {
        let created = sqlx::query(
            "INSERT INTO bookmakers (name, url, logo_url, active, created_at) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(&new.name)
        .bind(&new.url)
        .bind(&new.logo_url)
        .bind(new.active)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?
        .rows_affected()
            == 1;

        let row = sqlx::query("SELECT * FROM bookmakers WHERE name = ?")
            .bind(&new.name)
            .fetch_one(&self.pool)
            .await?;
        Ok((bookmaker_from_row(&row)?, created))
    }

    pub async fn bookmaker(&self, id: i64) -> Result<Bookmaker> {
        let row = sqlx::query("SELECT * FROM bookmakers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OddsError::not_found("bookmaker", id))?;
        Ok(bookmaker_from_row(&row)?)
    }

    pub async fn bookmakers(&self, active_only: bool) -> Result<Vec<Bookmaker>> {
        let rows = sqlx::query("SELECT * FROM bookmakers WHERE (? = 0 OR active = 1) ORDER BY name")
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(bookmaker_from_row).collect::<std::result::Result<_, _>>()?)
    }

    pub async fn set_bookmaker_active(&self, id: i64, active: bool) -> Result<()> {
        let affected = sqlx::query("UPDATE bookmakers SET active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(OddsError::not_found("bookmaker", id));
        }
        Ok(())
    }

    /// Active bookmakers with their quote counts, ordered by name.
    pub async fn bookmaker_quote_counts(&self) -> Result<Vec<BookmakerQuotes>> {
        let rows = sqlx::query(
            r#"SELECT b.*, COUNT(o.id) AS quote_count
               FROM bookmakers b
               LEFT JOIN odds o ON o.bookmaker_id = b.id
               WHERE b.active = 1
               GROUP BY b.id
               ORDER BY b.name"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(BookmakerQuotes {
                bookmaker: bookmaker_from_row(row)?,
                quote_count: row.try_get("quote_count")?,
            });
        }
        Ok(out)
    }

    // -- Sports -----------------------------------------------------------

    pub async fn create_sport(&self, new: &NewSport) -> Result<Sport> {
        new.validate()?;
        let id = sqlx::query("INSERT INTO sports (name, slug, icon) VALUES (?, ?, ?)")
            .bind(&new.name)
            .bind(&new.slug)
            .bind(&new.icon)
            .execute(&self.pool)
            .await
            .map_err(|e| OddsError::from_insert(e, "sport", &new.slug))?
            .last_insert_rowid();

        Ok(Sport {
            id,
            name: new.name.clone(),
            slug: new.slug.clone(),
            icon: new.icon.clone(),
        })
    }

    /// Get-or-create by slug.
    pub async fn ensure_sport(&self, new: &NewSport) -> Result<(Sport, bool)> {
        if let Some(existing) = self.sport_by_slug(&new.slug).await? {
            return Ok((existing, false));
        }
        Ok((self.create_sport(new).await?, true))
    }

    pub async fn sport_by_slug(&self, slug: &str) -> Result<Option<Sport>> {
        let row = sqlx::query("SELECT * FROM sports WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(sport_from_row).transpose()?)
    }

    pub async fn sports(&self) -> Result<Vec<Sport>> {
        let rows = sqlx::query("SELECT * FROM sports ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(sport_from_row).collect::<std::result::Result<_, _>>()?)
    }

    // -- Bet types --------------------------------------------------------

    pub async fn create_bet_type(&self, new: &NewBetType) -> Result<BetType> {
        let id = sqlx::query("INSERT INTO bet_types (name, code, description) VALUES (?, ?, ?)")
            .bind(&new.name)
            .bind(&new.code)
            .bind(&new.description)
            .execute(&self.pool)
            .await
            .map_err(|e| OddsError::from_insert(e, "bet type", &new.code))?
            .last_insert_rowid();

        Ok(BetType {
            id,
            name: new.name.clone(),
            code: new.code.clone(),
            description: new.description.clone(),
        })
    }

    /// Get-or-create by code.
    pub async fn ensure_bet_type(&self, new: &NewBetType) -> Result<(BetType, bool)> {
        if let Some(existing) = self.bet_type_by_code(&new.code).await? {
            return Ok((existing, false));
        }
        Ok((self.create_bet_type(new).await?, true))
    }

    /// Case-insensitive lookup by code.
    pub async fn bet_type_by_code(&self, code: &str) -> Result<Option<BetType>> {
        let row = sqlx::query("SELECT * FROM bet_types WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(bet_type_from_row).transpose()?)
    }

    // -- Events -----------------------------------------------------------

    pub async fn create_event(&self, new: &NewEvent) -> Result<Event> {
        let now = Utc::now().timestamp_millis();
        let id = sqlx::query(
            r#"INSERT INTO events
               (sport_id, home_team, away_team, scheduled_at, league, country, finished, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)"#,
        )
        .bind(new.sport_id)
        .bind(&new.home_team)
        .bind(&new.away_team)
        .bind(new.scheduled_at.timestamp_millis())
        .bind(&new.league)
        .bind(&new.country)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.event(id).await
    }

    /// Get-or-create on (sport, home, away, scheduled time).
    pub async fn ensure_event(&self, new: &NewEvent) -> Result<(Event, bool)> {
        let existing = sqlx::query(&format!(
            "{EVENT_SELECT} WHERE e.sport_id = ? AND e.home_team = ? AND e.away_team = ? AND e.scheduled_at = ?"
        ))
        .bind(new.sport_id)
        .bind(&new.home_team)
        .bind(&new.away_team)
        .bind(new.scheduled_at.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(row) => Ok((event_from_row(&row)?, false)),
            None => Ok((self.create_event(new).await?, true)),
        }
    }

    pub async fn event(&self, id: i64) -> Result<Event> {
        self.find_event(id)
            .await?
            .ok_or_else(|| OddsError::not_found("event", id))
    }

    pub async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("{EVENT_SELECT} WHERE e.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(event_from_row).transpose()?)
    }

    pub async fn all_events(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!("{EVENT_SELECT} ORDER BY e.scheduled_at, e.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(event_from_row).collect::<std::result::Result<_, _>>()?)
    }

    /// Open events (unfinished, scheduled at or after `now`), soonest first.
    pub async fn upcoming_events(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "{EVENT_SELECT} WHERE e.finished = 0 AND e.scheduled_at >= ? \
             ORDER BY e.scheduled_at, e.id LIMIT ?"
        ))
        .bind(now.timestamp_millis())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(event_from_row).collect::<std::result::Result<_, _>>()?)
    }

    pub async fn count_upcoming_events(&self, now: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE finished = 0 AND scheduled_at >= ?",
        )
        .bind(now.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Open events of one sport, optionally narrowed by league/country
    /// substrings (case-insensitive).
    pub async fn events_for_sport(
        &self,
        sport_id: i64,
        now: DateTime<Utc>,
        filter: &EventFilter,
    ) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            r#"{EVENT_SELECT}
               WHERE e.sport_id = ? AND e.finished = 0 AND e.scheduled_at >= ?
                 AND (? IS NULL OR instr(lower(e.league), lower(?)) > 0)
                 AND (? IS NULL OR instr(lower(e.country), lower(?)) > 0)
               ORDER BY e.scheduled_at, e.id"#
        ))
        .bind(sport_id)
        .bind(now.timestamp_millis())
        .bind(filter.league.as_deref())
        .bind(filter.league.as_deref())
        .bind(filter.country.as_deref())
        .bind(filter.country.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(event_from_row).collect::<std::result::Result<_, _>>()?)
    }

    /// Distinct non-empty leagues among a sport's unfinished events.
    pub async fn leagues_for_sport(&self, sport_id: i64) -> Result<Vec<String>> {
        self.distinct_labels("league", sport_id).await
    }

    /// Distinct non-empty countries among a sport's unfinished events.
    pub async fn countries_for_sport(&self, sport_id: i64) -> Result<Vec<String>> {
        self.distinct_labels("country", sport_id).await
    }

    async fn distinct_labels(&self, column: &'static str, sport_id: i64) -> Result<Vec<String>> {
        let labels = sqlx::query_scalar(&format!(
            "SELECT DISTINCT {column} FROM events \
             WHERE sport_id = ? AND finished = 0 AND {column} IS NOT NULL AND {column} <> '' \
             ORDER BY {column}"
        ))
        .bind(sport_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(labels)
    }

    /// Open events whose home team, away team or league contains `query`.
    pub async fn search_events(
        &self,
        query: &str,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            r#"{EVENT_SELECT}
               WHERE e.finished = 0 AND e.scheduled_at >= ?
                 AND (instr(lower(e.home_team), lower(?)) > 0
                   OR instr(lower(e.away_team), lower(?)) > 0
                   OR instr(lower(coalesce(e.league, '')), lower(?)) > 0)
               ORDER BY e.scheduled_at, e.id
               LIMIT ?"#
        ))
        .bind(now.timestamp_millis())
        .bind(query)
        .bind(query)
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(event_from_row).collect::<std::result::Result<_, _>>()?)
    }

    pub async fn set_event_finished(&self, id: i64, finished: bool) -> Result<()> {
        let affected = sqlx::query("UPDATE events SET finished = ?, updated_at = ? WHERE id = ?")
            .bind(finished)
            .bind(Utc::now().timestamp_millis())
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(OddsError::not_found("event", id));
        }
        Ok(())
    }

    // -- Odds -------------------------------------------------------------

    /// Quotes of an event with bookmaker and bet-type names, ordered by bet
    /// type name, outcome, then value descending.
    pub async fn quotes_for_event(&self, event_id: i64) -> Result<Vec<QuoteDetail>> {
        self.quotes(event_id, None).await
    }

    /// Quotes of an event restricted to one bet type.
    pub async fn quotes_for_event_and_bet_type(
        &self,
        event_id: i64,
        bet_type_id: i64,
    ) -> Result<Vec<QuoteDetail>> {
        self.quotes(event_id, Some(bet_type_id)).await
    }

    async fn quotes(&self, event_id: i64, bet_type_id: Option<i64>) -> Result<Vec<QuoteDetail>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {ODDS_COLUMNS}, b.name AS bookmaker_name,
                      t.code AS bet_type_code, t.name AS bet_type_name
               FROM odds o
               JOIN bookmakers b ON b.id = o.bookmaker_id
               JOIN bet_types t ON t.id = o.bet_type_id
               WHERE o.event_id = ? AND (? IS NULL OR o.bet_type_id = ?)
               ORDER BY t.name, o.outcome, o.value DESC, o.id"#
        ))
        .bind(event_id)
        .bind(bet_type_id)
        .bind(bet_type_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(QuoteDetail {
                odds: odds_from_row(row)?,
                bookmaker: row.try_get("bookmaker_name")?,
                bet_type_code: row.try_get("bet_type_code")?,
                bet_type_name: row.try_get("bet_type_name")?,
            });
        }
        Ok(out)
    }

    pub async fn count_odds(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM odds")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn all_odds(&self) -> Result<Vec<Odds>> {
        let rows = sqlx::query(&format!("SELECT {ODDS_COLUMNS} FROM odds o ORDER BY o.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(odds_from_row).collect::<std::result::Result<_, _>>()?)
    }
}

#[async_trait]
impl OddsStore for SqliteStore {
    async fn active_bookmakers(&self) -> Result<Vec<Bookmaker>> {
        self.bookmakers(true).await
    }

    async fn bet_types(&self) -> Result<Vec<BetType>> {
        let rows = sqlx::query("SELECT * FROM bet_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(bet_type_from_row).collect::<std::result::Result<_, _>>()?)
    }

    async fn events_in_window(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "{EVENT_SELECT} WHERE e.finished = 0 AND e.scheduled_at >= ? AND e.scheduled_at <= ? \
             ORDER BY e.scheduled_at, e.id"
        ))
        .bind(from.timestamp_millis())
        .bind(to.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(event_from_row).collect::<std::result::Result<_, _>>()?)
    }

    async fn odds_for_event(&self, event_id: i64) -> Result<Vec<Odds>> {
        let rows = sqlx::query(&format!(
            "SELECT {ODDS_COLUMNS} FROM odds o WHERE o.event_id = ? ORDER BY o.id"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(odds_from_row).collect::<std::result::Result<_, _>>()?)
    }

    async fn insert_odds_if_absent(&self, odds: &NewOdds) -> Result<bool> {
        let now = Utc::now().timestamp_millis();
        let inserted = sqlx::query(
            r#"INSERT INTO odds
               (event_id, bookmaker_id, bet_type_id, outcome, value, previous_value, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, NULL, ?, ?)
               ON CONFLICT(event_id, bookmaker_id, bet_type_id, outcome) DO NOTHING"#,
        )
        .bind(odds.event_id)
        .bind(odds.bookmaker_id)
        .bind(odds.bet_type_id)
        .bind(&odds.outcome)
        .bind(to_real(odds.value)?)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected()
            == 1;

        if !inserted {
            debug!(
                event_id = odds.event_id,
                bookmaker_id = odds.bookmaker_id,
                bet_type_id = odds.bet_type_id,
                outcome = %odds.outcome,
                "Quote already present, insert skipped"
            );
        }
        Ok(inserted)
    }

    async fn update_odds_value(
        &self,
        odds_id: i64,
        previous: Decimal,
        value: Decimal,
    ) -> Result<()> {
        let affected = sqlx::query(
            "UPDATE odds SET previous_value = ?, value = ?, updated_at = ? WHERE id = ?",
        )
        .bind(to_real(previous)?)
        .bind(to_real(value)?)
        .bind(Utc::now().timestamp_millis())
        .bind(odds_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(OddsError::not_found("odds", odds_id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

type RowResult<T> = std::result::Result<T, sqlx::Error>;

fn timestamp(row: &SqliteRow, column: &str) -> RowResult<DateTime<Utc>> {
    let millis: i64 = row.try_get(column)?;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| sqlx::Error::Decode(format!("{column} out of range: {millis}").into()))
}

fn decimal(value: f64) -> RowResult<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| sqlx::Error::Decode(format!("not a finite odds value: {value}").into()))
}

fn to_real(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| OddsError::InvalidValue(format!("{value} does not fit in a REAL column")))
}

fn bookmaker_from_row(row: &SqliteRow) -> RowResult<Bookmaker> {
    Ok(Bookmaker {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        url: row.try_get("url")?,
        logo_url: row.try_get("logo_url")?,
        active: row.try_get("active")?,
        created_at: timestamp(row, "created_at")?,
    })
}

fn sport_from_row(row: &SqliteRow) -> RowResult<Sport> {
    Ok(Sport {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        icon: row.try_get("icon")?,
    })
}

fn bet_type_from_row(row: &SqliteRow) -> RowResult<BetType> {
    Ok(BetType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        description: row.try_get("description")?,
    })
}

fn event_from_row(row: &SqliteRow) -> RowResult<Event> {
    Ok(Event {
        id: row.try_get("id")?,
        sport_id: row.try_get("sport_id")?,
        sport_name: row.try_get("sport_name")?,
        home_team: row.try_get("home_team")?,
        away_team: row.try_get("away_team")?,
        scheduled_at: timestamp(row, "scheduled_at")?,
        league: row.try_get("league")?,
        country: row.try_get("country")?,
        finished: row.try_get("finished")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn odds_from_row(row: &SqliteRow) -> RowResult<Odds> {
    let previous: Option<f64> = row.try_get("previous_value")?;
    Ok(Odds {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        bookmaker_id: row.try_get("bookmaker_id")?,
        bet_type_id: row.try_get("bet_type_id")?,
        outcome: row.try_get("outcome")?,
        value: decimal(row.try_get("value")?)?,
        previous_value: previous.map(decimal).transpose()?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    async fn store_with_event(at: DateTime<Utc>) -> (SqliteStore, Event) {
        let store = SqliteStore::in_memory().await.unwrap();
        let sport = store
            .create_sport(&NewSport::new("Football", "football"))
            .await
            .unwrap();
        let event = store
            .create_event(
                &NewEvent::new(sport.id, "Arsenal", "Chelsea", at)
                    .in_league("Premier League", "England"),
            )
            .await
            .unwrap();
        (store, event)
    }

    fn quote(event_id: i64, bookmaker_id: i64, bet_type_id: i64, outcome: &str) -> NewOdds {
        NewOdds {
            event_id,
            bookmaker_id,
            bet_type_id,
            outcome: outcome.to_string(),
            value: dec!(2.15),
        }
    }

    #[tokio::test]
    async fn test_duplicate_names_rejected() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .create_bookmaker(&NewBookmaker::new("Bet365", "https://www.bet365.com"))
            .await
            .unwrap();
        let err = store
            .create_bookmaker(&NewBookmaker::new("Bet365", "https://other.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, OddsError::Duplicate { entity: "bookmaker", .. }));

        store.create_sport(&NewSport::new("Tennis", "tennis")).await.unwrap();
        let err = store
            .create_sport(&NewSport::new("Lawn Tennis", "tennis"))
            .await
            .unwrap_err();
        assert!(matches!(err, OddsError::Duplicate { entity: "sport", .. }));
    }

    #[tokio::test]
    async fn test_bet_type_code_unique_case_insensitive() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .create_bet_type(&NewBetType::new("1X2", "1x2", "Full-time result"))
            .await
            .unwrap();
        let err = store
            .create_bet_type(&NewBetType::new("Match result", "1X2", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, OddsError::Duplicate { .. }));

        let found = store.bet_type_by_code("1X2").await.unwrap().unwrap();
        assert_eq!(found.code, "1x2");
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected_before_insert() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store
            .create_sport(&NewSport::new("Football", "Foot Ball"))
            .await
            .unwrap_err();
        assert!(matches!(err, OddsError::InvalidSlug(_)));
        assert!(store.sports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_odds_if_absent_is_idempotent() {
        let (store, event) = store_with_event(Utc::now() + Duration::days(1)).await;
        let bookie = store
            .create_bookmaker(&NewBookmaker::new("Pinnacle", "https://www.pinnacle.com"))
            .await
            .unwrap();
        let bet_type = store
            .create_bet_type(&NewBetType::new("1X2", "1x2", ""))
            .await
            .unwrap();

        let new = quote(event.id, bookie.id, bet_type.id, "X");
        assert!(store.insert_odds_if_absent(&new).await.unwrap());
        assert!(!store.insert_odds_if_absent(&new).await.unwrap());
        assert_eq!(store.count_odds().await.unwrap(), 1);

        let rows = store.odds_for_event(event.id).await.unwrap();
        assert_eq!(rows[0].value, dec!(2.15));
        assert_eq!(rows[0].previous_value, None);
    }

    #[tokio::test]
    async fn test_update_odds_value_sets_previous() {
        let (store, event) = store_with_event(Utc::now() + Duration::days(1)).await;
        let bookie = store
            .create_bookmaker(&NewBookmaker::new("Bwin", "https://www.bwin.com"))
            .await
            .unwrap();
        let bet_type = store
            .create_bet_type(&NewBetType::new("1X2", "1x2", ""))
            .await
            .unwrap();
        store
            .insert_odds_if_absent(&quote(event.id, bookie.id, bet_type.id, "1"))
            .await
            .unwrap();
        let id = store.odds_for_event(event.id).await.unwrap()[0].id;

        store.update_odds_value(id, dec!(2.15), dec!(2.31)).await.unwrap();
        let row = &store.odds_for_event(event.id).await.unwrap()[0];
        assert_eq!(row.value, dec!(2.31));
        assert_eq!(row.previous_value, Some(dec!(2.15)));

        let err = store.update_odds_value(9999, dec!(1), dec!(2)).await.unwrap_err();
        assert!(matches!(err, OddsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_events_in_window_bounds_and_finished() {
        let now = Utc::now();
        let (store, inside) = store_with_event(now + Duration::days(2)).await;
        let sport_id = inside.sport_id;
        let edge = store
            .create_event(&NewEvent::new(sport_id, "A", "B", now + Duration::days(7)))
            .await
            .unwrap();
        store
            .create_event(&NewEvent::new(sport_id, "C", "D", now + Duration::days(8)))
            .await
            .unwrap();
        store
            .create_event(&NewEvent::new(sport_id, "E", "F", now - Duration::hours(1)))
            .await
            .unwrap();
        let done = store
            .create_event(&NewEvent::new(sport_id, "G", "H", now + Duration::days(1)))
            .await
            .unwrap();
        store.set_event_finished(done.id, true).await.unwrap();

        let events = store
            .events_in_window(now, now + Duration::days(7))
            .await
            .unwrap();
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![inside.id, edge.id]);
        assert_eq!(events[0].sport_name, "Football");
    }

    #[tokio::test]
    async fn test_sport_filters_and_search() {
        let now = Utc::now();
        let (store, event) = store_with_event(now + Duration::days(1)).await;
        store
            .create_event(
                &NewEvent::new(event.sport_id, "Real Madrid", "Barcelona", now + Duration::days(2))
                    .in_league("La Liga", "Spain"),
            )
            .await
            .unwrap();

        let filter = EventFilter {
            league: Some("liga".into()),
            country: None,
        };
        let events = store.events_for_sport(event.sport_id, now, &filter).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].home_team, "Real Madrid");

        let all = store
            .events_for_sport(event.sport_id, now, &EventFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        assert_eq!(
            store.leagues_for_sport(event.sport_id).await.unwrap(),
            vec!["La Liga".to_string(), "Premier League".to_string()]
        );
        assert_eq!(
            store.countries_for_sport(event.sport_id).await.unwrap(),
            vec!["England".to_string(), "Spain".to_string()]
        );

        let hits = store.search_events("CHELSEA", now, 50).await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = store.search_events("premier", now, 50).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(store.search_events("nobody", now, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_is_get_or_create() {
        let store = SqliteStore::in_memory().await.unwrap();
        let new = NewBookmaker::new("Betfair", "https://www.betfair.com");
        let (first, created) = store.ensure_bookmaker(&new).await.unwrap();
        assert!(created);
        let (second, created) = store.ensure_bookmaker(&new).await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);

        let sport = NewSport::new("Golf", "golf");
        assert!(store.ensure_sport(&sport).await.unwrap().1);
        assert!(!store.ensure_sport(&sport).await.unwrap().1);
    }

    #[tokio::test]
    async fn test_inactive_bookmakers_excluded() {
        let store = SqliteStore::in_memory().await.unwrap();
        let a = store
            .create_bookmaker(&NewBookmaker::new("A", "https://a.example"))
            .await
            .unwrap();
        store
            .create_bookmaker(&NewBookmaker::new("B", "https://b.example").inactive())
            .await
            .unwrap();

        let active = store.active_bookmakers().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);
        assert_eq!(store.bookmakers(false).await.unwrap().len(), 2);

        store.set_bookmaker_active(a.id, false).await.unwrap();
        assert!(store.active_bookmakers().await.unwrap().is_empty());
    }
}
