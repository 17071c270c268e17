use std::fmt;

use thiserror::Error;

use crate::board::ContainerId;
use crate::controller::{IntentKind, Phase};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Denomination table has {values} values but the board has {containers} containers")]
    Configuration { values: usize, containers: usize },
    #[error("Invalid denomination table: {0}")]
    InvalidValueSet(String),
    #[error("Container {0} cannot be selected")]
    InvalidSelection(ContainerId),
    #[error("Container {0} cannot be eliminated")]
    InvalidElimination(ContainerId),
    #[error("Container {0} cannot become the held container")]
    InvalidSwitch(ContainerId),
    #[error("Intent {intent} rejected during {phase}: {reason}")]
    IllegalIntent {
        intent: IntentKind,
        phase: Phase,
        reason: Rejection,
    },
}

impl GameError {
    /// True for intents refused by the controller; the session is unchanged.
    pub fn is_illegal_intent(&self) -> bool {
        matches!(self, GameError::IllegalIntent { .. })
    }
}

/// Why the controller refused an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The intent is not accepted in the current phase
    WrongPhase,
    /// No container has this id
    UnknownContainer(ContainerId),
    /// The container is the player's own
    ContainerHeld(ContainerId),
    /// The container was already opened
    ContainerEliminated(ContainerId),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::WrongPhase => write!(f, "not allowed in this phase"),
            Rejection::UnknownContainer(id) => write!(f, "no container {}", id),
            Rejection::ContainerHeld(id) => write!(f, "container {} is held", id),
            Rejection::ContainerEliminated(id) => write!(f, "container {} is already open", id),
        }
    }
}
