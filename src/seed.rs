//! Demo catalog.
//!
//! Loads a handful of bookmakers, sports, bet types and upcoming fixtures,
//! then gives every event its full odds matrix. Every step is get-or-create,
//! so running it again against the same clock adds nothing.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::engine::OddsUpdater;
use crate::error::Result;
use crate::storage::{OddsStore, SqliteStore};
use crate::types::{NewBetType, NewBookmaker, NewEvent, NewSport};

const BOOKMAKERS: &[(&str, &str, &str)] = &[
    ("Bet365", "https://www.bet365.com", "https://logos-world.net/wp-content/uploads/2020/12/Bet365-Logo.png"),
    ("William Hill", "https://www.williamhill.com", "https://logos-world.net/wp-content/uploads/2020/12/William-Hill-Logo.png"),
    ("Pinnacle", "https://www.pinnacle.com", "https://logos-world.net/wp-content/uploads/2020/12/Pinnacle-Logo.png"),
    ("Betfair", "https://www.betfair.com", "https://logos-world.net/wp-content/uploads/2020/12/Betfair-Logo.png"),
    ("Bwin", "https://www.bwin.com", "https://logos-world.net/wp-content/uploads/2020/12/Bwin-Logo.png"),
];

const SPORTS: &[(&str, &str, &str)] = &[
    ("Football", "football", "fas fa-futbol"),
    ("Basketball", "basketball", "fas fa-basketball-ball"),
    ("Tennis", "tennis", "fas fa-table-tennis"),
    ("American Football", "american-football", "fas fa-football-ball"),
    ("Golf", "golf", "fas fa-golf-ball"),
];

const BET_TYPES: &[(&str, &str, &str)] = &[
    ("1X2", "1x2", "Full-time result"),
    ("Over/Under", "over_under", "More or less than a line"),
    ("Handicap", "handicap", "Head start or deficit"),
    ("Double Chance", "double_chance", "Two results covered"),
];

struct Fixture {
    sport: &'static str,
    home: &'static str,
    away: &'static str,
    league: &'static str,
    country: &'static str,
    /// Kick-off offset from the seeding clock, in hours.
    offset_hours: i64,
}

const FIXTURES: &[Fixture] = &[
    Fixture { sport: "football", home: "Real Madrid", away: "Barcelona", league: "La Liga", country: "Spain", offset_hours: 2 * 24 + 20 },
    Fixture { sport: "football", home: "Manchester United", away: "Liverpool", league: "Premier League", country: "England", offset_hours: 3 * 24 + 16 },
    Fixture { sport: "football", home: "Juventus", away: "Inter Milan", league: "Serie A", country: "Italy", offset_hours: 24 + 18 },
    Fixture { sport: "football", home: "PSG", away: "Marseille", league: "Ligue 1", country: "France", offset_hours: 4 * 24 + 21 },
    Fixture { sport: "basketball", home: "Los Angeles Lakers", away: "Golden State Warriors", league: "NBA", country: "United States", offset_hours: 24 + 22 },
    Fixture { sport: "basketball", home: "Real Madrid", away: "Barcelona", league: "ACB", country: "Spain", offset_hours: 3 * 24 + 19 },
    Fixture { sport: "tennis", home: "Rafael Nadal", away: "Roger Federer", league: "ATP", country: "Switzerland", offset_hours: 2 * 24 + 14 },
];

/// Created-vs-existing counts for one demo load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub bookmakers_created: usize,
    pub bookmakers_existing: usize,
    pub sports_created: usize,
    pub sports_existing: usize,
    pub bet_types_created: usize,
    pub bet_types_existing: usize,
    pub events_created: usize,
    pub events_existing: usize,
    pub odds_created: usize,
}

impl SeedSummary {
    pub fn created_anything(&self) -> bool {
        self.bookmakers_created
            + self.sports_created
            + self.bet_types_created
            + self.events_created
            + self.odds_created
            > 0
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  bookmakers: {} created, {} existing", self.bookmakers_created, self.bookmakers_existing)?;
        writeln!(f, "  sports:     {} created, {} existing", self.sports_created, self.sports_existing)?;
        writeln!(f, "  bet types:  {} created, {} existing", self.bet_types_created, self.bet_types_existing)?;
        writeln!(f, "  events:     {} created, {} existing", self.events_created, self.events_existing)?;
        write!(f, "  odds:       {} created", self.odds_created)
    }
}

pub async fn seed_demo(store: &SqliteStore) -> Result<SeedSummary> {
    seed_demo_at(store, Utc::now()).await
}

/// Load the demo catalog with fixtures scheduled relative to `now`.
pub async fn seed_demo_at(store: &SqliteStore, now: DateTime<Utc>) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for (name, url, logo) in BOOKMAKERS {
        let mut new = NewBookmaker::new(*name, *url);
        new.logo_url = Some((*logo).to_string());
        let (_, created) = store.ensure_bookmaker(&new).await?;
        tally(created, &mut summary.bookmakers_created, &mut summary.bookmakers_existing);
    }

    for (name, slug, icon) in SPORTS {
        let (_, created) = store
            .ensure_sport(&NewSport::new(*name, *slug).with_icon(*icon))
            .await?;
        tally(created, &mut summary.sports_created, &mut summary.sports_existing);
    }

    for (name, code, description) in BET_TYPES {
        let (_, created) = store
            .ensure_bet_type(&NewBetType::new(*name, *code, *description))
            .await?;
        tally(created, &mut summary.bet_types_created, &mut summary.bet_types_existing);
    }

    for fixture in FIXTURES {
        let Some(sport) = store.sport_by_slug(fixture.sport).await? else {
            warn!(slug = fixture.sport, "Demo sport missing, fixture skipped");
            continue;
        };
        let new = NewEvent::new(
            sport.id,
            fixture.home,
            fixture.away,
            now + Duration::hours(fixture.offset_hours),
        )
        .in_league(fixture.league, fixture.country);
        let (_, created) = store.ensure_event(&new).await?;
        tally(created, &mut summary.events_created, &mut summary.events_existing);
    }

    let engine_store: Arc<dyn OddsStore> = Arc::new(store.clone());
    let mut updater = OddsUpdater::new(engine_store);
    for event in store.all_events().await? {
        summary.odds_created += updater.seed_event(&event, false).await?;
    }

    info!(
        bookmakers = summary.bookmakers_created,
        sports = summary.sports_created,
        bet_types = summary.bet_types_created,
        events = summary.events_created,
        odds = summary.odds_created,
        "Demo catalog loaded"
    );
    Ok(summary)
}

fn tally(created: bool, created_count: &mut usize, existing_count: &mut usize) {
    if created {
        *created_count += 1;
    } else {
        *existing_count += 1;
    }
}
