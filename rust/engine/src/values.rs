use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// A monetary amount counted in cents (1/100 of the base currency unit).
/// All game arithmetic stays in this fixed-point form; only `Display`
/// converts to a human-readable dollar string.
#[derive(
    Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero cents
    pub const ZERO: Money = Money(0);
    /// One base currency unit ($1.00)
    pub const ONE_UNIT: Money = Money(CENTS_PER_UNIT);

    pub const fn from_cents(cents: u64) -> Self {
        Money(cents)
    }

    pub const fn from_units(units: u64) -> Self {
        Money(units * CENTS_PER_UNIT)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Cents per base currency unit
pub const CENTS_PER_UNIT: u64 = 100;

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / CENTS_PER_UNIT;
        let cents = self.0 % CENTS_PER_UNIT;
        let digits = units.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if cents == 0 && units > 0 {
            write!(f, "${}", grouped)
        } else {
            write!(f, "${}.{:02}", grouped, cents)
        }
    }
}

/// Number of containers on the board and values in the standard table.
pub const CONTAINER_COUNT: usize = 26;

/// The standard denomination table in cents, ascending.
const STANDARD_CENTS: [u64; CONTAINER_COUNT] = [
    1,
    100,
    500,
    1_000,
    2_500,
    5_000,
    7_500,
    10_000,
    20_000,
    30_000,
    40_000,
    50_000,
    75_000,
    100_000,
    500_000,
    1_000_000,
    2_500_000,
    5_000_000,
    7_500_000,
    10_000_000,
    20_000_000,
    30_000_000,
    40_000_000,
    50_000_000,
    75_000_000,
    100_000_000,
];

/// Immutable ordered table of distinct positive denominations.
/// Every session assigns exactly these values, one per container.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ValueSet {
    /// Denominations sorted ascending
    values: Vec<Money>,
}

impl ValueSet {
    /// The fixed 26-value table used by every regular session.
    pub fn standard() -> Self {
        Self {
            values: STANDARD_CENTS.iter().copied().map(Money::from_cents).collect(),
        }
    }

    /// Builds a table from arbitrary values, rejecting zero and duplicates.
    ///
    /// The count is not checked here; [`crate::board::Board::initialize`]
    /// refuses a table whose size differs from the container count.
    ///
    /// ```
    /// use banker_engine::values::{Money, ValueSet};
    ///
    /// let set = ValueSet::new(vec![Money::from_units(5), Money::from_units(1)]).unwrap();
    /// assert_eq!(set.as_slice()[0], Money::from_units(1));
    /// assert!(ValueSet::new(vec![Money::ZERO]).is_err());
    /// ```
    pub fn new(mut values: Vec<Money>) -> Result<Self, GameError> {
        if let Some(zero) = values.iter().position(|v| v.is_zero()) {
            return Err(GameError::InvalidValueSet(format!(
                "value at index {} is not positive",
                zero
            )));
        }
        let mut seen = HashSet::with_capacity(values.len());
        for v in &values {
            if !seen.insert(*v) {
                return Err(GameError::InvalidValueSet(format!("duplicate value {}", v)));
            }
        }
        values.sort_unstable();
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Money] {
        &self.values
    }

    pub fn max(&self) -> Option<Money> {
        self.values.last().copied()
    }

    pub fn min(&self) -> Option<Money> {
        self.values.first().copied()
    }
}

impl Default for ValueSet {
    fn default() -> Self {
        Self::standard()
    }
}
