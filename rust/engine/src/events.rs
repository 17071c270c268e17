//! Outbound notifications for the presentation layer.
//!
//! The controller publishes every [`GameEvent`] to the sinks it owns, in
//! order, and also hands them back from the intent that produced them.

use std::fmt;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::board::ContainerId;
use crate::offer::OfferTone;
use crate::values::Money;

/// Seeds that fully determine a session's shuffle and offer jitter.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionSeeds {
    pub shuffle: u64,
    pub jitter: u64,
}

impl SessionSeeds {
    /// Both seeds drawn from the process RNG.
    pub fn random() -> Self {
        Self {
            shuffle: rand::random(),
            jitter: rand::random(),
        }
    }

    /// Both streams derived from a single seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            shuffle: seed,
            jitter: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17),
        }
    }

    /// Seeds for the session dealt after this one.
    pub fn successor(self) -> Self {
        Self::from_seed(self.shuffle.wrapping_add(0x9E37_79B9_7F4A_7C15))
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SessionStarted {
        session: u64,
        seeds: SessionSeeds,
    },
    ContainerSelected {
        id: ContainerId,
    },
    ContainerEliminated {
        id: ContainerId,
        value: Money,
    },
    OfferMade {
        amount: Money,
        round: u32,
        tone: OfferTone,
    },
    RoundAdvanced {
        round: u32,
        quota: usize,
    },
    DealAccepted {
        amount: Money,
        held_value: Money,
    },
    SwitchOffered {
        other_id: ContainerId,
        held_id: ContainerId,
    },
    SessionConcluded {
        final_value: Money,
        switched: bool,
    },
}

/// Receives published events. Implementations must not call back into the
/// controller.
pub trait EventSink: Send + fmt::Debug {
    fn publish(&mut self, event: &GameEvent);
}

impl EventSink for mpsc::Sender<GameEvent> {
    fn publish(&mut self, event: &GameEvent) {
        if self.send(event.clone()).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}

/// Shared in-memory recorder. Clones see the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut g) = self.events.lock() {
            g.clear();
        }
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, event: &GameEvent) {
        if let Ok(mut g) = self.events.lock() {
            g.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let e = GameEvent::OfferMade {
            amount: Money::from_units(12_500),
            round: 2,
            tone: OfferTone::Fair,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(
            json,
            r#"{"type":"offer_made","amount":1250000,"round":2,"tone":"fair"}"#
        );
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn event_log_clones_share_storage() {
        let log = EventLog::new();
        let mut sink = log.clone();
        sink.publish(&GameEvent::ContainerSelected {
            id: ContainerId::new(3).unwrap(),
        });
        assert_eq!(log.events().len(), 1);
        log.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn channel_sink_forwards_events() {
        let (mut tx, rx) = mpsc::channel();
        tx.publish(&GameEvent::RoundAdvanced { round: 2, quota: 5 });
        assert_eq!(
            rx.try_recv().unwrap(),
            GameEvent::RoundAdvanced { round: 2, quota: 5 }
        );
        drop(rx);
        // a dropped receiver is not an error for the publisher
        tx.publish(&GameEvent::RoundAdvanced { round: 3, quota: 4 });
    }
}
