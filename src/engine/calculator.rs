//! Devigging, expected value and Kelly stake sizing.

use rust_decimal::Decimal;

/// Fair (margin-free) probabilities of a two-way reference market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FairPrice {
    /// Sum of the implied probabilities (> 1 when the book has a margin).
    pub overround: Decimal,
    /// Fair probability of the outcome priced at `odd`.
    pub fair: Decimal,
    /// Fair probability of the opposite outcome.
    pub fair_opposite: Decimal,
}

/// Kelly sizing for one bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeSizing {
    /// Full Kelly fraction.
    pub kelly: Decimal,
    /// Kelly fraction after the divisor, never negative.
    pub fraction: Decimal,
    /// `fraction * bankroll`.
    pub stake: Decimal,
}

/// Implied probability of a decimal odd. `None` for odds that cannot be inverted.
pub fn implied_probability(odd: Decimal) -> Option<Decimal> {
    if odd <= Decimal::ZERO {
        return None;
    }
    Decimal::ONE.checked_div(odd)
}

/// Remove the margin from a two-way market by proportional normalization.
///
/// `odd` and `opposite` are the reference book's prices for the two outcomes.
/// Returns `None` if either odd is not > 1.
pub fn devig(odd: Decimal, opposite: Decimal) -> Option<FairPrice> {
    if odd <= Decimal::ONE || opposite <= Decimal::ONE {
        return None;
    }

    let p = implied_probability(odd)?;
    let q = implied_probability(opposite)?;
    let overround = p.checked_add(q)?;
    let fair = p.checked_div(overround)?;

    Some(FairPrice {
        overround,
        fair,
        fair_opposite: Decimal::ONE - fair,
    })
}

/// Expected profit per unit staked at `odd` when the true probability is `fair`.
pub fn expected_value(odd: Decimal, fair: Decimal) -> Decimal {
    odd * fair - Decimal::ONE
}

/// Full Kelly fraction: `ev / (odd - 1)`. Zero when the odd pays nothing.
pub fn kelly_fraction(ev: Decimal, odd: Decimal) -> Decimal {
    let payout = odd - Decimal::ONE;
    if payout <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ev.checked_div(payout).unwrap_or(Decimal::ZERO)
}

/// Fractional Kelly stake on `bankroll`.
pub fn size_stake(ev: Decimal, odd: Decimal, divisor: Decimal, bankroll: Decimal) -> StakeSizing {
    let kelly = kelly_fraction(ev, odd);
    let fraction = kelly
        .checked_div(divisor)
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO);

    StakeSizing {
        kelly,
        fraction,
        stake: fraction * bankroll,
    }
}
