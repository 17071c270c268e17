//! Buy-out pricing.
//!
//! The banker prices an offer from the values still sealed outside the
//! player's own container. Every step is integer arithmetic over cents and
//! basis points (1 bp = 1/10,000), so the same inputs always give the same
//! amount. The only randomness is the jitter factor, supplied by a
//! [`JitterSource`] so tests can pin it.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::values::Money;

/// Basis points in 1.0
pub const BPS: u32 = 10_000;

/// Values at or above this count as "high" for the skew adjustment.
pub const HIGH_THRESHOLD: Money = Money::from_units(100_000);
/// Values at or below this count as "low" for the skew adjustment.
pub const LOW_THRESHOLD: Money = Money::from_units(1_000);
/// Offer returned when there is nothing valid to price.
pub const FALLBACK_OFFER: Money = Money::ONE_UNIT;

pub const JITTER_MIN_BPS: u32 = 9_500;
pub const JITTER_MAX_BPS: u32 = 10_500;

/// Default and allowed range for the aggressiveness knob.
pub const DEFAULT_AGGRESSIVENESS_BPS: u32 = BPS;
pub const MIN_AGGRESSIVENESS_BPS: u32 = 5_000;
pub const MAX_AGGRESSIVENESS_BPS: u32 = 15_000;

const ENDGAME_FLOOR_BPS: u32 = 8_500;
const ENDGAME_CEILING_BPS: u32 = 9_500;
const CEILING_BPS: u32 = 8_500;
const MONOTONIC_STEP_BPS: u32 = 10_500;
const ROUND_RAMP_BPS: [u32; 6] = [2_500, 3_500, 4_500, 5_500, 6_500, 7_500];
const LATE_ROUND_BPS: u32 = 7_000;

/// Supplies the multiplicative jitter, in basis points within
/// `JITTER_MIN_BPS..=JITTER_MAX_BPS`.
pub trait JitterSource: Send + fmt::Debug {
    fn draw_bps(&mut self) -> u32;
}

/// Uniform jitter from a seeded ChaCha20 stream.
#[derive(Debug)]
pub struct RngJitter {
    rng: ChaCha20Rng,
}

impl RngJitter {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl JitterSource for RngJitter {
    fn draw_bps(&mut self) -> u32 {
        self.rng.random_range(JITTER_MIN_BPS..=JITTER_MAX_BPS)
    }
}

/// Constant jitter, clamped into the allowed range.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub u32);

impl FixedJitter {
    /// No jitter at all (factor 1.0).
    pub fn neutral() -> Self {
        FixedJitter(BPS)
    }
}

impl JitterSource for FixedJitter {
    fn draw_bps(&mut self) -> u32 {
        self.0.clamp(JITTER_MIN_BPS, JITTER_MAX_BPS)
    }
}

/// Flavour category shown alongside an offer. Presentation metadata only.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferTone {
    Generous,
    Fair,
    Low,
    Pressure,
    Final,
}

impl fmt::Display for OfferTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OfferTone::Generous => "generous",
            OfferTone::Fair => "fair",
            OfferTone::Low => "low",
            OfferTone::Pressure => "pressure",
            OfferTone::Final => "final",
        };
        f.write_str(s)
    }
}

/// Every intermediate term of one offer computation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct OfferBreakdown {
    /// Number of valid values priced
    pub remaining: usize,
    /// Mean of the valid values
    pub expected_value: Money,
    pub round_bps: u32,
    pub psychology_bps: u32,
    pub risk_bps: u32,
    pub aggressiveness_bps: u32,
    /// Formula result before floor and jitter
    pub raw: Money,
    pub jitter_bps: u32,
    /// After floor and jitter, before rounding
    pub jittered: Money,
    /// After granularity rounding
    pub rounded: Money,
    /// Amount shown to the player
    pub amount: Money,
    /// True when a fallback replaced the formula result
    pub degraded: bool,
}

/// A priced buy-out for one round.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub amount: Money,
    pub round: u32,
    pub tone: OfferTone,
    pub breakdown: OfferBreakdown,
}

fn scale(amount: u128, bps: u32) -> u128 {
    amount * u128::from(bps) / u128::from(BPS)
}

fn scale_up(amount: u128, bps: u32) -> u128 {
    (amount * u128::from(bps)).div_ceil(u128::from(BPS))
}

fn to_money(cents: u128) -> Money {
    Money::from_cents(u64::try_from(cents).unwrap_or(u64::MAX))
}

/// Endgame step first (by how many values remain), then the round ramp.
pub fn round_multiplier_bps(remaining: usize, round: u32) -> u32 {
    match remaining {
        0..=2 => 9_500,
        3 => 9_000,
        4..=5 => 8_500,
        6..=10 => 8_000,
        _ => match round {
            1..=6 => ROUND_RAMP_BPS[(round - 1) as usize],
            _ => LATE_ROUND_BPS,
        },
    }
}

/// Banker "psychology": pressure after rejected strong offers, skew by
/// the mix of high and low values, and an endgame bonus. Adjustments compound.
pub fn psychology_multiplier_bps(values: &[Money], expected: Money, history: &[Money]) -> u32 {
    let mut bps = BPS;

    if history.len() >= 3 {
        let last_three: u128 = history[history.len() - 3..]
            .iter()
            .map(|m| u128::from(m.cents()))
            .sum();
        // mean(last three) > 60% of expected
        if last_three * 10 > u128::from(expected.cents()) * 18 {
            bps = scale(u128::from(bps), 11_000) as u32;
        }
    }

    let n = values.len();
    if n > 0 {
        let high = values.iter().filter(|v| **v >= HIGH_THRESHOLD).count();
        let low = values.iter().filter(|v| **v <= LOW_THRESHOLD).count();
        let skew = if high * 10 > n * 6 {
            10_500
        } else if high * 10 > n * 4 {
            10_200
        } else if low * 10 > n * 6 {
            11_500
        } else {
            BPS
        };
        bps = scale(u128::from(bps), skew) as u32;

        if n <= 3 && high > 0 {
            bps = scale(u128::from(bps), 11_000) as u32;
        }
    }

    bps
}

/// More dispersion, more conservative offer. Compares the coefficient of
/// variation against 2, 1.5 and 1 without leaving integers:
/// `cv > k  <=>  n*Σx² - (Σx)² > k²(Σx)²`.
pub fn risk_multiplier_bps(values: &[Money]) -> u32 {
    if values.is_empty() {
        return BPS;
    }
    let n = values.len() as u128;
    let sum: u128 = values.iter().map(|v| u128::from(v.cents())).sum();
    let sum_sq: u128 = values
        .iter()
        .map(|v| u128::from(v.cents()) * u128::from(v.cents()))
        .sum();
    let spread = (n * sum_sq).saturating_sub(sum * sum);
    let s2 = sum * sum;
    if spread > 4 * s2 {
        8_500
    } else if 4 * spread > 9 * s2 {
        9_000
    } else if spread > s2 {
        9_500
    } else {
        BPS
    }
}

/// Rounds to the nearest step appropriate for the size of the amount.
///
/// ```
/// use banker_engine::offer::round_to_granularity;
/// use banker_engine::values::Money;
///
/// assert_eq!(round_to_granularity(Money::from_units(47)), Money::from_units(45));
/// assert_eq!(round_to_granularity(Money::from_units(12_260)), Money::from_units(12_500));
/// assert_eq!(round_to_granularity(Money::from_units(612_400)), Money::from_units(610_000));
/// ```
pub fn round_to_granularity(amount: Money) -> Money {
    let units = amount.cents() / 100;
    let step_units: u64 = match units {
        0..=99 => 5,
        100..=999 => 10,
        1_000..=9_999 => 100,
        10_000..=99_999 => 500,
        100_000..=499_999 => 1_000,
        _ => 5_000,
    };
    let step = step_units * 100;
    Money::from_cents((amount.cents() + step / 2) / step * step)
}

/// Categorizes an offer by its share of the expected value and by stage.
pub fn classify_tone(amount: Money, expected: Money, remaining: usize, round: u32) -> OfferTone {
    if remaining <= 2 {
        return OfferTone::Final;
    }
    if expected.is_zero() {
        return OfferTone::Low;
    }
    let ratio = u128::from(amount.cents()) * u128::from(BPS) / u128::from(expected.cents());
    if ratio >= 7_500 {
        OfferTone::Generous
    } else if round >= 4 && ratio < 5_000 {
        OfferTone::Pressure
    } else if ratio >= 4_500 {
        OfferTone::Fair
    } else {
        OfferTone::Low
    }
}

/// Prices one offer. `values` are the denominations outside the player's
/// container; `history` holds the earlier offers of the session.
///
/// Never fails: an empty or all-zero input yields [`FALLBACK_OFFER`] and a
/// degenerate result falls back to 10% of the smallest value, at least one unit.
///
/// # Examples
///
/// ```
/// use banker_engine::offer::{compute_offer, BPS};
/// use banker_engine::values::Money;
///
/// let values = [Money::from_units(100), Money::from_units(300)];
/// let b = compute_offer(&values, 7, &[], BPS, BPS);
/// assert_eq!(b.expected_value, Money::from_units(200));
/// // endgame: within [85%, 95%] of the expected value
/// assert!(b.amount >= Money::from_units(170) && b.amount <= Money::from_units(190));
/// ```
pub fn compute_offer(
    values: &[Money],
    round: u32,
    history: &[Money],
    aggressiveness_bps: u32,
    jitter_bps: u32,
) -> OfferBreakdown {
    let valid: Vec<Money> = values.iter().copied().filter(|v| !v.is_zero()).collect();
    let jitter_bps = jitter_bps.clamp(JITTER_MIN_BPS, JITTER_MAX_BPS);
    if valid.is_empty() {
        return OfferBreakdown {
            remaining: 0,
            expected_value: Money::ZERO,
            round_bps: 0,
            psychology_bps: 0,
            risk_bps: 0,
            aggressiveness_bps,
            raw: Money::ZERO,
            jitter_bps,
            jittered: Money::ZERO,
            rounded: Money::ZERO,
            amount: FALLBACK_OFFER,
            degraded: true,
        };
    }

    let n = valid.len();
    let sum: u128 = valid.iter().map(|v| u128::from(v.cents())).sum();
    let ev = sum / n as u128;
    let expected_value = to_money(ev);
    let endgame = n <= 3;

    let round_bps = round_multiplier_bps(n, round);
    let psychology_bps = psychology_multiplier_bps(&valid, expected_value, history);
    let risk_bps = risk_multiplier_bps(&valid);

    let mut offer = ev;
    for bps in [round_bps, psychology_bps, risk_bps, aggressiveness_bps] {
        offer = scale(offer, bps);
    }
    let raw = to_money(offer);

    let floor = scale_up(ev, ENDGAME_FLOOR_BPS);
    if endgame {
        offer = offer.max(floor);
    }
    offer = scale(offer, jitter_bps);
    let jittered = to_money(offer);
    let rounded = round_to_granularity(jittered);
    offer = u128::from(rounded.cents());

    if round > 1 {
        if let Some(previous) = history.last() {
            offer = offer.max(scale_up(u128::from(previous.cents()), MONOTONIC_STEP_BPS));
        }
    }

    let ceiling = if endgame {
        scale(ev, ENDGAME_CEILING_BPS)
    } else {
        scale(ev, CEILING_BPS)
    };
    offer = offer.min(ceiling);
    if endgame {
        offer = offer.max(floor.min(ceiling));
    }

    let mut degraded = false;
    if offer == 0 {
        degraded = true;
        let min = valid.iter().min().map_or(0, |m| u128::from(m.cents()));
        offer = (min / 10).max(u128::from(Money::ONE_UNIT.cents()));
    }

    OfferBreakdown {
        remaining: n,
        expected_value,
        round_bps,
        psychology_bps,
        risk_bps,
        aggressiveness_bps,
        raw,
        jitter_bps,
        jittered,
        rounded,
        amount: to_money(offer),
        degraded,
    }
}

/// Stateful pricer for one session: keeps the offer history used for the
/// monotonicity step and the rejection-pressure adjustment.
#[derive(Debug)]
pub struct OfferEngine {
    aggressiveness_bps: u32,
    history: Vec<Money>,
    jitter: Box<dyn JitterSource>,
}

impl OfferEngine {
    pub fn new(jitter: Box<dyn JitterSource>) -> Self {
        Self {
            aggressiveness_bps: DEFAULT_AGGRESSIVENESS_BPS,
            history: Vec::new(),
            jitter,
        }
    }

    /// Sets the single difficulty knob, clamped to the allowed range.
    pub fn with_aggressiveness(mut self, bps: u32) -> Self {
        self.aggressiveness_bps = bps.clamp(MIN_AGGRESSIVENESS_BPS, MAX_AGGRESSIVENESS_BPS);
        self
    }

    pub fn aggressiveness_bps(&self) -> u32 {
        self.aggressiveness_bps
    }

    pub fn history(&self) -> &[Money] {
        &self.history
    }

    pub fn replace_jitter(&mut self, jitter: Box<dyn JitterSource>) {
        self.jitter = jitter;
    }

    /// Forgets earlier offers. The jitter stream continues.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Prices, records and categorizes the offer for `round`.
    pub fn make_offer(&mut self, values: &[Money], round: u32) -> Offer {
        let jitter_bps = self.jitter.draw_bps();
        let breakdown = compute_offer(
            values,
            round,
            &self.history,
            self.aggressiveness_bps,
            jitter_bps,
        );
        if breakdown.degraded {
            tracing::warn!(
                round,
                remaining = breakdown.remaining,
                amount = breakdown.amount.cents(),
                "offer fell back to a minimal amount"
            );
        }
        let tone = classify_tone(
            breakdown.amount,
            breakdown.expected_value,
            breakdown.remaining,
            round,
        );
        self.history.push(breakdown.amount);
        Offer {
            amount: breakdown.amount,
            round,
            tone,
            breakdown,
        }
    }
}
