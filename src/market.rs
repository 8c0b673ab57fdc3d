//! Bet-type vocabulary: outcome lists and plausible value ranges.
//!
//! Each stored bet type maps, by its code (case-insensitive), to one
//! `BetKind`. Unknown codes use the generic fallback.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetKind {
    /// Home win / draw / away win.
    MatchResult,
    OverUnder,
    Handicap,
    DoubleChance,
    Generic,
}

impl BetKind {
    pub const ALL: &'static [BetKind] = &[
        BetKind::MatchResult,
        BetKind::OverUnder,
        BetKind::Handicap,
        BetKind::DoubleChance,
        BetKind::Generic,
    ];

    /// Map a bet-type code to its kind. Never fails.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "1x2" => BetKind::MatchResult,
            "over_under" => BetKind::OverUnder,
            "handicap" => BetKind::Handicap,
            "double_chance" => BetKind::DoubleChance,
            _ => BetKind::Generic,
        }
    }

    pub fn outcomes(&self) -> &'static [&'static str] {
        match self {
            BetKind::MatchResult => &["1", "X", "2"],
            BetKind::OverUnder => &["Over 2.5", "Under 2.5"],
            BetKind::Handicap => &["Handicap +1", "Handicap -1"],
            BetKind::DoubleChance => &["1X", "12", "X2"],
            BetKind::Generic => &["Option 1", "Option 2", "Option 3"],
        }
    }

    /// Closed `(min, max)` range initial odds are drawn from.
    pub fn base_range(&self) -> (Decimal, Decimal) {
        match self {
            BetKind::MatchResult => (dec!(1.5), dec!(4.0)),
            BetKind::OverUnder => (dec!(1.8), dec!(2.2)),
            BetKind::Handicap => (dec!(1.7), dec!(2.5)),
            BetKind::DoubleChance => (dec!(1.2), dec!(1.8)),
            BetKind::Generic => (dec!(1.5), dec!(3.0)),
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetKind::MatchResult => write!(f, "1x2"),
            BetKind::OverUnder => write!(f, "over_under"),
            BetKind::Handicap => write!(f, "handicap"),
            BetKind::DoubleChance => write!(f, "double_chance"),
            BetKind::Generic => write!(f, "generic"),
        }
    }
}
