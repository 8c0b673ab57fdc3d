//! Odds comparison.
//!
//! Groups an event's quotes by bet type and outcome so bookmakers can be
//! compared side by side, and picks the best (highest) price per outcome.
//! `views` builds the page payloads on top of the store.

pub mod views;

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::storage::QuoteDetail;
use crate::types::{Event, Trend};

/// One bookmaker's quote as shown in a comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    pub odds_id: i64,
    pub bookmaker: String,
    pub value: Decimal,
    pub previous_value: Option<Decimal>,
    pub delta: Decimal,
    pub trend: Trend,
}

impl From<&QuoteDetail> for QuoteLine {
    fn from(q: &QuoteDetail) -> Self {
        Self {
            odds_id: q.odds.id,
            bookmaker: q.bookmaker.clone(),
            value: q.odds.value,
            previous_value: q.odds.previous_value,
            delta: q.odds.delta(),
            trend: q.odds.trend(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeGroup {
    pub outcome: String,
    /// Highest value first.
    pub quotes: Vec<QuoteLine>,
    pub best: Option<QuoteLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetTypeGroup {
    pub code: String,
    pub name: String,
    pub outcomes: Vec<OutcomeGroup>,
}

/// Everything the event detail page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBoard {
    pub event: Event,
    pub bet_types: Vec<BetTypeGroup>,
}

/// Best available price for one outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestQuote {
    pub outcome: String,
    pub bookmaker: String,
    pub value: Decimal,
}

/// Group quotes by bet type (by name) then outcome (by label), each
/// outcome's quotes sorted by value descending. Ties keep input order, so
/// the best quote is the first one seen at the top price.
pub fn group_quotes(quotes: &[QuoteDetail]) -> Vec<BetTypeGroup> {
    let mut by_type: BTreeMap<(&str, &str), BTreeMap<&str, Vec<QuoteLine>>> = BTreeMap::new();
    for q in quotes {
        by_type
            .entry((q.bet_type_name.as_str(), q.bet_type_code.as_str()))
            .or_default()
            .entry(q.odds.outcome.as_str())
            .or_default()
            .push(QuoteLine::from(q));
    }

    by_type
        .into_iter()
        .map(|((name, code), outcomes)| BetTypeGroup {
            code: code.to_string(),
            name: name.to_string(),
            outcomes: outcomes
                .into_iter()
                .map(|(outcome, mut lines)| {
                    lines.sort_by(|a, b| b.value.cmp(&a.value));
                    OutcomeGroup {
                        outcome: outcome.to_string(),
                        best: lines.first().cloned(),
                        quotes: lines,
                    }
                })
                .collect(),
        })
        .collect()
}

pub fn build_board(event: Event, quotes: &[QuoteDetail]) -> EventBoard {
    EventBoard {
        event,
        bet_types: group_quotes(quotes),
    }
}

/// Highest price per outcome, ordered by outcome label.
pub fn best_per_outcome(quotes: &[QuoteDetail]) -> Vec<BestQuote> {
    let mut best: BTreeMap<&str, &QuoteDetail> = BTreeMap::new();
    for q in quotes {
        best.entry(q.odds.outcome.as_str())
            .and_modify(|current| {
                if q.odds.value > current.odds.value {
                    *current = q;
                }
            })
            .or_insert(q);
    }

    best.into_iter()
        .map(|(outcome, q)| BestQuote {
            outcome: outcome.to_string(),
            bookmaker: q.bookmaker.clone(),
            value: q.odds.value,
        })
        .collect()
}
