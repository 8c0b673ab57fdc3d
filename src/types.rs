//! Catalog types for the odds comparator.
//!
//! Bookmakers, sports, events, bet types and odds. These are the rows the
//! storage layer reads and writes and the values the engine and the web
//! views pass around.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{OddsError, Result};

// ---------------------------------------------------------------------------
// Bookmaker
// ---------------------------------------------------------------------------

/// A bookmaker quoting odds. Only active bookmakers take part in seeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub logo_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Bookmaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct NewBookmaker {
    pub name: String,
    pub url: String,
    pub logo_url: Option<String>,
    pub active: bool,
}

impl NewBookmaker {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            logo_url: None,
            active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

// ---------------------------------------------------------------------------
// Sport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// Icon class, e.g. `fas fa-futbol`.
    pub icon: Option<String>,
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct NewSport {
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
}

impl NewSport {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if is_valid_slug(&self.slug) {
            Ok(())
        } else {
            Err(OddsError::InvalidSlug(self.slug.clone()))
        }
    }
}

/// URL-safe slug: non-empty, lowercase ASCII letters, digits and `-`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A scheduled sporting event. `sport_name` is joined in by the store so
/// reports and pages can label the event without another lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub sport_id: i64,
    pub sport_name: String,
    pub home_team: String,
    pub away_team: String,
    pub scheduled_at: DateTime<Utc>,
    pub league: Option<String>,
    pub country: Option<String>,
    pub finished: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.home_team, self.away_team)
    }
}

impl Event {
    /// Eligible for odds work inside `[from, to]`, both bounds inclusive.
    pub fn in_window(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        !self.finished && self.scheduled_at >= from && self.scheduled_at <= to
    }

    /// Label used in update reports, e.g. `Football: Arsenal vs Chelsea`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.sport_name, self)
    }

    #[cfg(test)]
    pub fn sample(id: i64, scheduled_at: DateTime<Utc>) -> Self {
        Event {
            id,
            sport_id: 1,
            sport_name: "Football".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            scheduled_at,
            league: Some("Premier League".to_string()),
            country: Some("England".to_string()),
            finished: false,
            created_at: scheduled_at,
            updated_at: scheduled_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub sport_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub scheduled_at: DateTime<Utc>,
    pub league: Option<String>,
    pub country: Option<String>,
}

impl NewEvent {
    pub fn new(
        sport_id: i64,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sport_id,
            home_team: home_team.into(),
            away_team: away_team.into(),
            scheduled_at,
            league: None,
            country: None,
        }
    }

    pub fn in_league(mut self, league: impl Into<String>, country: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self.country = Some(country.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Bet type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetType {
    pub id: i64,
    pub name: String,
    /// Short code such as `1x2` or `over_under`. Unique, case-insensitive.
    pub code: String,
    pub description: String,
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct NewBetType {
    pub name: String,
    pub code: String,
    pub description: String,
}

impl NewBetType {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            description: description.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

/// Direction of the last odds movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Unchanged,
}

impl Trend {
    pub fn from_delta(delta: Decimal) -> Self {
        if delta > Decimal::ZERO {
            Trend::Up
        } else if delta < Decimal::ZERO {
            Trend::Down
        } else {
            Trend::Unchanged
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// One bookmaker's price for one outcome of one bet type on one event.
///
/// (event_id, bookmaker_id, bet_type_id, outcome) is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub id: i64,
    pub event_id: i64,
    pub bookmaker_id: i64,
    pub bet_type_id: i64,
    pub outcome: String,
    pub value: Decimal,
    /// Value before the most recent update; overwritten on every update.
    pub previous_value: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.2}", self.outcome, self.value)?;
        if let Some(prev) = self.previous_value {
            write!(f, " (was {prev:.2})")?;
        }
        Ok(())
    }
}

impl Odds {
    /// Signed change since the previous value, zero when there is none.
    pub fn delta(&self) -> Decimal {
        self.previous_value
            .map(|prev| self.value - prev)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn trend(&self) -> Trend {
        Trend::from_delta(self.delta())
    }

    #[cfg(test)]
    pub fn sample(id: i64, value: Decimal) -> Self {
        let now = Utc::now();
        Odds {
            id,
            event_id: 1,
            bookmaker_id: 1,
            bet_type_id: 1,
            outcome: "1".to_string(),
            value,
            previous_value: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Insert payload for a fresh quote. New rows never carry a previous value.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOdds {
    pub event_id: i64,
    pub bookmaker_id: i64,
    pub bet_type_id: i64,
    pub outcome: String,
    pub value: Decimal,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
