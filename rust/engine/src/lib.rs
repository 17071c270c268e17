//! # banker-engine: Elimination Game Core
//!
//! Rules for a single-player elimination game: the player holds one of 26
//! sealed containers, opens the others round by round, and a banker offers
//! an increasing buy-out priced from the values still in play. The session
//! ends on an accepted deal or on a final keep-or-switch decision.
//!
//! The crate performs no rendering and no I/O besides the optional
//! [`logger`]; a presentation layer sends intents to
//! [`controller::GameController`] and renders the [`events::GameEvent`]s it
//! publishes.
//!
//! ## Core Modules
//!
//! - [`values`] - Fixed-point money and the denomination table
//! - [`board`] - Containers, shuffled value assignment and container state
//! - [`offer`] - Buy-out pricing and offer tone
//! - [`controller`] - Round/elimination state machine
//! - [`events`] - Outbound notifications and event sinks
//! - [`stats`] - Read-only statistics and the debug capability
//! - [`logger`] - SessionRecord serialization to JSONL
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use banker_engine::board::ContainerId;
//! use banker_engine::controller::{GameController, Phase};
//! use banker_engine::events::{EventLog, GameEvent, SessionSeeds};
//!
//! let log = EventLog::new();
//! let mut game = GameController::builder()
//!     .seeds(SessionSeeds::from_seed(2024))
//!     .sink(Box::new(log.clone()))
//!     .build()
//!     .expect("standard table always fits the board");
//!
//! game.select_container(ContainerId::new(13).unwrap()).unwrap();
//! for id in game.available_for_elimination().into_iter().take(6) {
//!     game.eliminate_container(id).unwrap();
//! }
//! assert_eq!(game.phase(), Phase::OfferPresented);
//! assert!(log
//!     .events()
//!     .iter()
//!     .any(|e| matches!(e, GameEvent::OfferMade { round: 1, .. })));
//! ```
//!
//! ## Deterministic Sessions
//!
//! The shuffle and the offer jitter draw from two independent seeded
//! streams, so the same [`events::SessionSeeds`] replay the same session.

pub mod board;
pub mod controller;
pub mod errors;
pub mod events;
pub mod logger;
pub mod offer;
pub mod stats;
pub mod values;
