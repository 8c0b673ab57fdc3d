//! Odds movement model.
//!
//! Seed values are drawn uniformly from a bet kind's base range. Existing
//! odds move by a uniform relative change in [-10%, +10%], halved for odds
//! above 5.0, clamped to [1.01, 100.00] and rounded to two decimals.

use rand::Rng;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::market::BetKind;

/// Lowest quotable decimal odds.
pub const MIN_ODDS: Decimal = dec!(1.01);
/// Highest quotable decimal odds.
pub const MAX_ODDS: Decimal = dec!(100.00);
/// Bound of the relative change drawn per update.
pub const MAX_SWING: f64 = 0.10;
/// Odds strictly above this move at half speed.
pub const HIGH_ODDS_THRESHOLD: Decimal = dec!(5.0);
pub const HIGH_ODDS_DAMPING: Decimal = dec!(0.5);
/// A new value must differ from the old one by more than this to count.
pub const MATERIALITY: Decimal = dec!(0.01);

/// Draw an initial value for a quote of the given kind, rounded to 2 dp.
pub fn seed_value<R: Rng + ?Sized>(kind: BetKind, rng: &mut R) -> Decimal {
    let (min, max) = kind.base_range();
    let fraction = Decimal::from_f64(rng.gen_range(0.0..=1.0)).unwrap_or_default();
    (min + (max - min) * fraction).round_dp(2).clamp(min, max)
}

/// Draw the relative change for one update of `current`.
pub fn draw_change<R: Rng + ?Sized>(current: Decimal, rng: &mut R) -> Decimal {
    let change = Decimal::from_f64(rng.gen_range(-MAX_SWING..=MAX_SWING)).unwrap_or_default();
    if current > HIGH_ODDS_THRESHOLD {
        change * HIGH_ODDS_DAMPING
    } else {
        change
    }
}

/// Apply a relative change, then clamp and round.
pub fn apply_change(current: Decimal, change: Decimal) -> Decimal {
    (current * (Decimal::ONE + change))
        .clamp(MIN_ODDS, MAX_ODDS)
        .round_dp(2)
}

/// Outcome of moving one quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    pub old: Decimal,
    pub new: Decimal,
}

impl Perturbation {
    /// Whether the move clears the materiality threshold.
    pub fn is_material(&self) -> bool {
        (self.new - self.old).abs() > MATERIALITY
    }
}

pub fn perturb<R: Rng + ?Sized>(current: Decimal, rng: &mut R) -> Perturbation {
    let change = draw_change(current, rng);
    Perturbation {
        old: current,
        new: apply_change(current, change),
    }
}
