//! Read-only introspection of a running session.
//!
//! [`SessionStats`] never exposes which container holds which value. The
//! value map is only reachable through a [`DebugView`], which requires a
//! [`DebugCapability`] the host creates on purpose.

use serde::{Deserialize, Serialize};

use crate::board::{Board, ContainerId, ContainerState};
use crate::controller::Phase;
use crate::offer::OfferBreakdown;
use crate::values::Money;

/// How a session ended.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The player sold the held container to the banker
    Deal {
        amount: Money,
        held_value: Money,
        round: u32,
    },
    /// The player kept or switched at the last two containers
    Concluded {
        held_id: ContainerId,
        final_value: Money,
        other_value: Money,
        switched: bool,
    },
}

impl Outcome {
    /// What the player walks away with.
    pub fn winnings(&self) -> Money {
        match self {
            Outcome::Deal { amount, .. } => *amount,
            Outcome::Concluded { final_value, .. } => *final_value,
        }
    }
}

/// Snapshot of session counters and value lists for statistics and export.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub session: u64,
    pub round: u32,
    pub phase: Phase,
    pub quota: usize,
    pub eliminated_this_round: usize,
    pub held_id: Option<ContainerId>,
    /// Values still sealed, held one included, ascending
    pub remaining_values: Vec<Money>,
    /// Opened values, ascending
    pub eliminated_values: Vec<Money>,
    pub offer_history: Vec<Money>,
    pub last_offer: Option<OfferBreakdown>,
    pub outcome: Option<Outcome>,
}

impl SessionStats {
    /// Mean of the values still sealed, held one included.
    pub fn expected_value(&self) -> Money {
        if self.remaining_values.is_empty() {
            return Money::ZERO;
        }
        let sum: u128 = self
            .remaining_values
            .iter()
            .map(|v| u128::from(v.cents()))
            .sum();
        let mean = sum / self.remaining_values.len() as u128;
        Money::from_cents(u64::try_from(mean).unwrap_or(u64::MAX))
    }
}

/// Token that unlocks [`DebugView`]. Only the host should create one.
#[derive(Debug)]
pub struct DebugCapability {
    _private: (),
}

impl DebugCapability {
    pub fn grant() -> Self {
        tracing::warn!("debug capability granted; sealed values can be revealed");
        Self { _private: () }
    }
}

/// Peeks at sealed containers. Borrowed from the controller; cannot mutate.
#[derive(Debug, Clone, Copy)]
pub struct DebugView<'a> {
    board: &'a Board,
}

impl<'a> DebugView<'a> {
    pub(crate) fn new(board: &'a Board) -> Self {
        Self { board }
    }

    pub fn reveal(&self, id: ContainerId) -> Option<Money> {
        self.board.container(id).map(|c| c.value())
    }

    /// Every container with its value and state, by id.
    pub fn reveal_all(&self) -> Vec<(ContainerId, Money, ContainerState)> {
        self.board
            .containers()
            .iter()
            .map(|c| (c.id(), c.value(), c.state()))
            .collect()
    }
}
