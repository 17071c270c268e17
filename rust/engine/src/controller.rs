use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, ContainerId};
use crate::errors::{GameError, Rejection};
use crate::events::{EventSink, GameEvent, SessionSeeds};
use crate::offer::{
    JitterSource, Offer, OfferEngine, RngJitter, DEFAULT_AGGRESSIVENESS_BPS,
};
use crate::stats::{DebugCapability, DebugView, Outcome, SessionStats};
use crate::values::{Money, ValueSet};

/// Containers opened before the first offer.
pub const FIRST_ROUND_QUOTA: usize = 6;

/// Position of a session in the round/elimination state machine.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the player to pick a container
    Selecting,
    /// Opening containers toward the round quota
    Playing,
    /// An offer awaits accept or reject
    OfferPresented,
    /// Two containers left: keep or switch
    SwitchDecision,
    /// Offer accepted (terminal)
    DealAccepted,
    /// Keep-or-switch resolved (terminal)
    Concluded,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::DealAccepted | Phase::Concluded)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Selecting => "selecting",
            Phase::Playing => "playing",
            Phase::OfferPresented => "offer_presented",
            Phase::SwitchDecision => "switch_decision",
            Phase::DealAccepted => "deal_accepted",
            Phase::Concluded => "concluded",
        };
        f.write_str(s)
    }
}

/// The inbound intent an error refers to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IntentKind {
    Select,
    Eliminate,
    Accept,
    Reject,
    ChooseSwitch,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentKind::Select => "select",
            IntentKind::Eliminate => "eliminate",
            IntentKind::Accept => "accept",
            IntentKind::Reject => "reject",
            IntentKind::ChooseSwitch => "choose_switch",
        };
        f.write_str(s)
    }
}

/// Quota for the round after a rejected offer, keyed by how many
/// containers besides the held one are still sealed.
///
/// ```
/// use banker_engine::controller::quota_for_remaining;
///
/// assert_eq!(quota_for_remaining(19), 5);
/// assert_eq!(quota_for_remaining(9), 4);
/// assert_eq!(quota_for_remaining(5), 2);
/// assert_eq!(quota_for_remaining(3), 1);
/// ```
pub fn quota_for_remaining(unheld: usize) -> usize {
    match unheld {
        n if n > 10 => 5,
        n if n > 6 => 4,
        n if n > 3 => 2,
        _ => 1,
    }
}

/// Per-session state owned by the controller.
#[derive(Debug, Clone)]
struct GameSession {
    id: u64,
    seeds: SessionSeeds,
    round: u32,
    phase: Phase,
    quota: usize,
    eliminated_this_round: usize,
    offer_history: Vec<Money>,
    last_offer: Option<Offer>,
    eliminated_order: Vec<ContainerId>,
    initial_pick: Option<ContainerId>,
    outcome: Option<Outcome>,
}

impl GameSession {
    fn new(id: u64, seeds: SessionSeeds) -> Self {
        Self {
            id,
            seeds,
            round: 1,
            phase: Phase::Selecting,
            quota: FIRST_ROUND_QUOTA,
            eliminated_this_round: 0,
            offer_history: Vec::new(),
            last_offer: None,
            eliminated_order: Vec::new(),
            initial_pick: None,
            outcome: None,
        }
    }
}

/// Orchestrates rounds, elimination quotas and offers for one player.
///
/// Intents return the events they published; an intent that is illegal for
/// the current phase or targets an ineligible container fails with
/// [`GameError::IllegalIntent`] and leaves the session untouched.
///
/// # Examples
///
/// ```
/// use banker_engine::board::ContainerId;
/// use banker_engine::controller::{GameController, Phase};
/// use banker_engine::events::SessionSeeds;
///
/// let mut game = GameController::builder()
///     .seeds(SessionSeeds::from_seed(42))
///     .build()
///     .unwrap();
/// game.select_container(ContainerId::new(7).unwrap()).unwrap();
/// for n in 1..=6 {
///     game.eliminate_container(ContainerId::new(n).unwrap()).unwrap();
/// }
/// assert_eq!(game.phase(), Phase::OfferPresented);
/// game.reject_offer().unwrap();
/// assert_eq!(game.round(), 2);
/// assert_eq!(game.quota(), 5);
/// ```
#[derive(Debug)]
pub struct GameController {
    board: Board,
    offers: OfferEngine,
    shuffle_rng: ChaCha20Rng,
    session: GameSession,
    sinks: Vec<Box<dyn EventSink>>,
    sessions_started: u64,
    /// Jitter came from the builder and survives restarts
    pinned_jitter: bool,
}

/// Collects the dependencies of a [`GameController`].
#[derive(Debug, Default)]
pub struct GameControllerBuilder {
    values: Option<ValueSet>,
    seeds: Option<SessionSeeds>,
    jitter: Option<Box<dyn JitterSource>>,
    aggressiveness_bps: Option<u32>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl GameControllerBuilder {
    pub fn values(mut self, values: ValueSet) -> Self {
        self.values = Some(values);
        self
    }

    pub fn seeds(mut self, seeds: SessionSeeds) -> Self {
        self.seeds = Some(seeds);
        self
    }

    /// Overrides the jitter stream otherwise derived from the jitter seed.
    pub fn jitter(mut self, jitter: Box<dyn JitterSource>) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn aggressiveness_bps(mut self, bps: u32) -> Self {
        self.aggressiveness_bps = Some(bps);
        self
    }

    pub fn sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Builds the controller and starts its first session.
    ///
    /// # Errors
    ///
    /// [`GameError::Configuration`] when the denomination table does not
    /// match the container count.
    pub fn build(self) -> Result<GameController, GameError> {
        let seeds = self.seeds.unwrap_or_else(SessionSeeds::random);
        let pinned_jitter = self.jitter.is_some();
        let jitter = self
            .jitter
            .unwrap_or_else(|| Box::new(RngJitter::new_with_seed(seeds.jitter)));
        let offers = OfferEngine::new(jitter)
            .with_aggressiveness(self.aggressiveness_bps.unwrap_or(DEFAULT_AGGRESSIVENESS_BPS));
        let mut controller = GameController {
            board: Board::new(self.values.unwrap_or_default()),
            offers,
            shuffle_rng: ChaCha20Rng::seed_from_u64(seeds.shuffle),
            session: GameSession::new(0, seeds),
            sinks: self.sinks,
            sessions_started: 0,
            pinned_jitter,
        };
        controller.begin(seeds)?;
        Ok(controller)
    }
}

impl GameController {
    pub fn builder() -> GameControllerBuilder {
        GameControllerBuilder::default()
    }

    /// Adds an observer for all later events.
    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Discards the current session and deals a fresh one from the
    /// [`SessionSeeds::successor`] of the current seeds.
    pub fn start_session(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let seeds = self.session.seeds.successor();
        self.start_session_with(seeds)
    }

    /// Discards the current session and deals a fresh one from `seeds`.
    ///
    /// Both streams restart from `seeds`, so a new controller built with
    /// the same seeds replays this session. A jitter source passed to
    /// [`GameControllerBuilder::jitter`] is kept instead of being reseeded.
    pub fn start_session_with(&mut self, seeds: SessionSeeds) -> Result<Vec<GameEvent>, GameError> {
        self.shuffle_rng = ChaCha20Rng::seed_from_u64(seeds.shuffle);
        if !self.pinned_jitter {
            self.offers
                .replace_jitter(Box::new(RngJitter::new_with_seed(seeds.jitter)));
        }
        self.begin(seeds)
    }

    fn begin(&mut self, seeds: SessionSeeds) -> Result<Vec<GameEvent>, GameError> {
        self.board.initialize(&mut self.shuffle_rng)?;
        self.offers.reset();
        self.sessions_started += 1;
        self.session = GameSession::new(self.sessions_started, seeds);
        tracing::info!(
            session = self.session.id,
            shuffle_seed = seeds.shuffle,
            jitter_seed = seeds.jitter,
            "session started"
        );
        Ok(self.emit(vec![GameEvent::SessionStarted {
            session: self.session.id,
            seeds,
        }]))
    }

    /// Picks the player's own container.
    pub fn select_container(&mut self, id: ContainerId) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase(IntentKind::Select, Phase::Selecting)?;
        self.require_available(IntentKind::Select, id)?;
        self.board.select_held(id)?;
        self.session.initial_pick = Some(id);
        self.session.phase = Phase::Playing;
        tracing::debug!(session = self.session.id, container = %id, "container selected");
        Ok(self.emit(vec![GameEvent::ContainerSelected { id }]))
    }

    /// Opens one container. Reaching the round quota either prices an offer
    /// or, with two containers left, moves to the keep-or-switch decision.
    pub fn eliminate_container(&mut self, id: ContainerId) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase(IntentKind::Eliminate, Phase::Playing)?;
        self.require_available(IntentKind::Eliminate, id)?;
        let value = self.board.eliminate(id)?;
        self.session.eliminated_this_round += 1;
        self.session.eliminated_order.push(id);
        tracing::debug!(
            session = self.session.id,
            container = %id,
            value = value.cents(),
            opened = self.session.eliminated_this_round,
            quota = self.session.quota,
            "container eliminated"
        );

        let mut events = vec![GameEvent::ContainerEliminated { id, value }];
        if self.session.eliminated_this_round >= self.session.quota {
            if self.board.remaining_count() <= 2 {
                events.push(self.offer_switch()?);
            } else {
                events.push(self.present_offer());
            }
        }
        Ok(self.emit(events))
    }

    fn present_offer(&mut self) -> GameEvent {
        let offer = self
            .offers
            .make_offer(&self.board.unheld_values(), self.session.round);
        tracing::debug!(
            session = self.session.id,
            round = offer.round,
            amount = offer.amount.cents(),
            expected = offer.breakdown.expected_value.cents(),
            tone = %offer.tone,
            "offer made"
        );
        let event = GameEvent::OfferMade {
            amount: offer.amount,
            round: offer.round,
            tone: offer.tone,
        };
        self.session.offer_history.push(offer.amount);
        self.session.last_offer = Some(offer);
        self.session.phase = Phase::OfferPresented;
        event
    }

    fn offer_switch(&mut self) -> Result<GameEvent, GameError> {
        let (Some(held_id), Some(&other_id)) = (
            self.board.held_id(),
            self.board.available_for_elimination().first(),
        ) else {
            return Err(self.illegal(IntentKind::Eliminate, Rejection::WrongPhase));
        };
        self.session.phase = Phase::SwitchDecision;
        tracing::debug!(session = self.session.id, held = %held_id, other = %other_id, "switch offered");
        Ok(GameEvent::SwitchOffered { other_id, held_id })
    }

    /// Takes the banker's offer and ends the session.
    pub fn accept_offer(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase(IntentKind::Accept, Phase::OfferPresented)?;
        let (Some(offer), Some(held_value)) =
            (self.session.last_offer.as_ref(), self.board.held_value())
        else {
            return Err(self.illegal(IntentKind::Accept, Rejection::WrongPhase));
        };
        let amount = offer.amount;
        self.session.outcome = Some(Outcome::Deal {
            amount,
            held_value,
            round: self.session.round,
        });
        self.session.phase = Phase::DealAccepted;
        tracing::info!(
            session = self.session.id,
            amount = amount.cents(),
            held_value = held_value.cents(),
            "deal accepted"
        );
        Ok(self.emit(vec![GameEvent::DealAccepted { amount, held_value }]))
    }

    /// Turns the offer down and opens the next round.
    pub fn reject_offer(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase(IntentKind::Reject, Phase::OfferPresented)?;
        let unheld = self.board.available_for_elimination().len();
        // never open the last unheld container before the switch decision
        let quota = quota_for_remaining(unheld).min(unheld.saturating_sub(1)).max(1);
        self.session.round += 1;
        self.session.quota = quota;
        self.session.eliminated_this_round = 0;
        self.session.phase = Phase::Playing;
        tracing::debug!(
            session = self.session.id,
            round = self.session.round,
            quota,
            "round advanced"
        );
        Ok(self.emit(vec![GameEvent::RoundAdvanced {
            round: self.session.round,
            quota,
        }]))
    }

    /// Resolves the final decision: `true` swaps to the other sealed container.
    pub fn choose_switch(&mut self, switch: bool) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase(IntentKind::ChooseSwitch, Phase::SwitchDecision)?;
        if switch {
            let Some(&other) = self.board.available_for_elimination().first() else {
                return Err(self.illegal(IntentKind::ChooseSwitch, Rejection::WrongPhase));
            };
            self.board.switch_held(other)?;
        }
        let (Some(held_id), Some(final_value)) = (self.board.held_id(), self.board.held_value())
        else {
            return Err(self.illegal(IntentKind::ChooseSwitch, Rejection::WrongPhase));
        };
        let other_value = self
            .board
            .unheld_values()
            .first()
            .copied()
            .unwrap_or(Money::ZERO);
        self.session.outcome = Some(Outcome::Concluded {
            held_id,
            final_value,
            other_value,
            switched: switch,
        });
        self.session.phase = Phase::Concluded;
        tracing::info!(
            session = self.session.id,
            held = %held_id,
            final_value = final_value.cents(),
            switched = switch,
            "session concluded"
        );
        Ok(self.emit(vec![GameEvent::SessionConcluded {
            final_value,
            switched: switch,
        }]))
    }

    fn require_phase(&self, intent: IntentKind, expected: Phase) -> Result<(), GameError> {
        if self.session.phase == expected {
            Ok(())
        } else {
            Err(self.illegal(intent, Rejection::WrongPhase))
        }
    }

    fn require_available(&self, intent: IntentKind, id: ContainerId) -> Result<(), GameError> {
        use crate::board::ContainerState as S;
        let reason = match self.board.container(id).map(|c| c.state()) {
            Some(S::InPlay) => return Ok(()),
            Some(S::Held) => Rejection::ContainerHeld(id),
            Some(S::Eliminated) => Rejection::ContainerEliminated(id),
            None => Rejection::UnknownContainer(id),
        };
        Err(self.illegal(intent, reason))
    }

    fn illegal(&self, intent: IntentKind, reason: Rejection) -> GameError {
        tracing::warn!(
            session = self.session.id,
            %intent,
            phase = %self.session.phase,
            %reason,
            "intent rejected"
        );
        GameError::IllegalIntent {
            intent,
            phase: self.session.phase,
            reason,
        }
    }

    fn emit(&mut self, events: Vec<GameEvent>) -> Vec<GameEvent> {
        for event in &events {
            for sink in &mut self.sinks {
                sink.publish(event);
            }
        }
        events
    }

    pub fn session_id(&self) -> u64 {
        self.session.id
    }

    pub fn seeds(&self) -> SessionSeeds {
        self.session.seeds
    }

    pub fn round(&self) -> u32 {
        self.session.round
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn quota(&self) -> usize {
        self.session.quota
    }

    pub fn eliminated_this_round(&self) -> usize {
        self.session.eliminated_this_round
    }

    pub fn offer_history(&self) -> &[Money] {
        &self.session.offer_history
    }

    pub fn last_offer(&self) -> Option<&Offer> {
        self.session.last_offer.as_ref()
    }

    pub fn held_id(&self) -> Option<ContainerId> {
        self.board.held_id()
    }

    /// The container the player picked first, before any switch.
    pub fn initial_pick(&self) -> Option<ContainerId> {
        self.session.initial_pick
    }

    /// Ids opened so far, in order.
    pub fn eliminated_order(&self) -> &[ContainerId] {
        &self.session.eliminated_order
    }

    pub fn available_for_elimination(&self) -> Vec<ContainerId> {
        self.board.available_for_elimination()
    }

    /// The denomination table sessions are dealt from.
    pub fn value_set(&self) -> &ValueSet {
        self.board.value_set()
    }

    pub fn is_available(&self, id: ContainerId) -> bool {
        self.board.is_available(id)
    }

    /// Values still in play, held container included, ascending.
    pub fn remaining_values(&self) -> Vec<Money> {
        let mut v = self.board.remaining_values();
        v.sort_unstable();
        v
    }

    /// Opened values, ascending.
    pub fn eliminated_values(&self) -> Vec<Money> {
        let mut v = self.board.eliminated_values();
        v.sort_unstable();
        v
    }

    pub fn remaining_count(&self) -> usize {
        self.board.remaining_count()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.session.outcome.as_ref()
    }

    /// Read-only snapshot for statistics and export.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            session: self.session.id,
            round: self.session.round,
            phase: self.session.phase,
            quota: self.session.quota,
            eliminated_this_round: self.session.eliminated_this_round,
            held_id: self.board.held_id(),
            remaining_values: self.remaining_values(),
            eliminated_values: self.eliminated_values(),
            offer_history: self.session.offer_history.clone(),
            last_offer: self.session.last_offer.clone().map(|o| o.breakdown),
            outcome: self.session.outcome.clone(),
        }
    }

    /// Debug-only view that can reveal sealed values.
    pub fn debug<'a>(&'a self, _capability: &DebugCapability) -> DebugView<'a> {
        DebugView::new(&self.board)
    }
}
