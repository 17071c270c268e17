use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::values::{Money, ValueSet, CONTAINER_COUNT};

/// Stable container number, 1 through [`CONTAINER_COUNT`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(u8);

impl ContainerId {
    /// Returns `None` when `n` is outside `1..=CONTAINER_COUNT`.
    pub fn new(n: u8) -> Option<Self> {
        if n >= 1 && usize::from(n) <= CONTAINER_COUNT {
            Some(ContainerId(n))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn index(self) -> usize {
        usize::from(self.0) - 1
    }

    /// All ids in ascending order.
    pub fn all() -> impl Iterator<Item = ContainerId> {
        (1..=CONTAINER_COUNT as u8).map(ContainerId)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ContainerState {
    /// Sealed and not owned by the player
    InPlay,
    /// The player's own container
    Held,
    /// Opened and out of the game
    Eliminated,
}

/// One sealed container and the denomination bound to it for the session.
#[derive(Debug, Clone)]
pub struct Container {
    id: ContainerId,
    value: Money,
    state: ContainerState,
}

impl Container {
    pub fn id(&self) -> ContainerId {
        self.id
    }
    pub fn value(&self) -> Money {
        self.value
    }
    pub fn state(&self) -> ContainerState {
        self.state
    }
}

/// Owns the containers, their shuffled value assignment and per-container state.
///
/// # Examples
///
/// ```
/// use banker_engine::board::{Board, ContainerId};
/// use banker_engine::values::ValueSet;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha20Rng;
///
/// let mut board = Board::new(ValueSet::standard());
/// let mut rng = ChaCha20Rng::seed_from_u64(7);
/// board.initialize(&mut rng).unwrap();
///
/// board.select_held(ContainerId::new(7).unwrap()).unwrap();
/// let opened = board.eliminate(ContainerId::new(1).unwrap()).unwrap();
/// assert!(!board.remaining_values().contains(&opened));
/// assert_eq!(board.remaining_count(), 25);
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    /// Denomination table assigned at every initialization
    values: ValueSet,
    /// Containers indexed by `id - 1`; empty until initialized
    containers: Vec<Container>,
}

impl Board {
    pub fn new(values: ValueSet) -> Self {
        Self {
            values,
            containers: Vec::with_capacity(CONTAINER_COUNT),
        }
    }

    /// Recreates all containers with a uniformly random permutation of the table.
    ///
    /// # Errors
    ///
    /// [`GameError::Configuration`] when the table size differs from
    /// [`CONTAINER_COUNT`]; the board is left empty.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.containers.clear();
        if self.values.len() != CONTAINER_COUNT {
            return Err(GameError::Configuration {
                values: self.values.len(),
                containers: CONTAINER_COUNT,
            });
        }
        let mut shuffled = self.values.as_slice().to_vec();
        shuffled.shuffle(rng);
        self.containers = ContainerId::all()
            .zip(shuffled)
            .map(|(id, value)| Container {
                id,
                value,
                state: ContainerState::InPlay,
            })
            .collect();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.containers.len() == CONTAINER_COUNT
    }

    pub fn value_set(&self) -> &ValueSet {
        &self.values
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.index())
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Marks an in-play container as the player's own.
    pub fn select_held(&mut self, id: ContainerId) -> Result<(), GameError> {
        if self.held_id().is_some() || !self.is_available(id) {
            return Err(GameError::InvalidSelection(id));
        }
        self.containers[id.index()].state = ContainerState::Held;
        Ok(())
    }

    /// Opens an in-play, non-held container and returns its value.
    pub fn eliminate(&mut self, id: ContainerId) -> Result<Money, GameError> {
        if !self.is_available(id) {
            return Err(GameError::InvalidElimination(id));
        }
        let container = &mut self.containers[id.index()];
        container.state = ContainerState::Eliminated;
        Ok(container.value)
    }

    /// Returns the previously held container to play and holds `new_id` instead.
    /// Returns the id that was held before the switch.
    pub fn switch_held(&mut self, new_id: ContainerId) -> Result<ContainerId, GameError> {
        let Some(previous) = self.held_id() else {
            return Err(GameError::InvalidSwitch(new_id));
        };
        if !self.is_available(new_id) {
            return Err(GameError::InvalidSwitch(new_id));
        }
        self.containers[previous.index()].state = ContainerState::InPlay;
        self.containers[new_id.index()].state = ContainerState::Held;
        Ok(previous)
    }

    /// Values of all non-eliminated containers, held one included.
    pub fn remaining_values(&self) -> Vec<Money> {
        self.containers
            .iter()
            .filter(|c| c.state != ContainerState::Eliminated)
            .map(|c| c.value)
            .collect()
    }

    /// Values of the in-play containers, held one excluded.
    pub fn unheld_values(&self) -> Vec<Money> {
        self.containers
            .iter()
            .filter(|c| c.state == ContainerState::InPlay)
            .map(|c| c.value)
            .collect()
    }

    pub fn remaining_count(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| c.state != ContainerState::Eliminated)
            .count()
    }

    pub fn eliminated_values(&self) -> Vec<Money> {
        self.containers
            .iter()
            .filter(|c| c.state == ContainerState::Eliminated)
            .map(|c| c.value)
            .collect()
    }

    pub fn eliminated_count(&self) -> usize {
        self.containers.len() - self.remaining_count()
    }

    pub fn held_id(&self) -> Option<ContainerId> {
        self.containers
            .iter()
            .find(|c| c.state == ContainerState::Held)
            .map(|c| c.id)
    }

    pub fn held_value(&self) -> Option<Money> {
        self.held_id().map(|id| self.containers[id.index()].value)
    }

    /// Ids the player may open next: in play and not held.
    pub fn available_for_elimination(&self) -> Vec<ContainerId> {
        self.containers
            .iter()
            .filter(|c| c.state == ContainerState::InPlay)
            .map(|c| c.id)
            .collect()
    }

    pub fn is_available(&self, id: ContainerId) -> bool {
        self.container(id)
            .is_some_and(|c| c.state == ContainerState::InPlay)
    }
}
