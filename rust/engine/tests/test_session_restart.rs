use banker_engine::controller::GameController;
use banker_engine::events::{EventLog, GameEvent, SessionSeeds};
use banker_engine::logger::SessionRecord;
use banker_engine::offer::{FixedJitter, JITTER_MAX_BPS};
use banker_engine::stats::DebugCapability;
use banker_engine::values::Money;

fn board_values(game: &GameController) -> Vec<Money> {
    game.debug(&DebugCapability::grant())
        .reveal_all()
        .into_iter()
        .map(|(_, value, _)| value)
        .collect()
}

/// Picks the first container and opens the first round.
fn first_offer(game: &mut GameController) -> Money {
    let held = game.available_for_elimination()[0];
    game.select_container(held).unwrap();
    let quota = game.quota();
    for target in game.available_for_elimination().into_iter().take(quota) {
        game.eliminate_container(target).unwrap();
    }
    game.last_offer().expect("first round ends in an offer").amount
}

fn started_seeds(events: &[GameEvent]) -> SessionSeeds {
    match events.first() {
        Some(GameEvent::SessionStarted { seeds, .. }) => *seeds,
        other => panic!("expected SessionStarted, got {:?}", other),
    }
}

#[test]
fn restarted_session_replays_from_reported_seeds() {
    let log = EventLog::new();
    let mut game = GameController::builder()
        .seeds(SessionSeeds::from_seed(42))
        .sink(Box::new(log.clone()))
        .build()
        .unwrap();
    first_offer(&mut game);

    let events = game.start_session().unwrap();
    let reported = started_seeds(&events);
    assert_eq!(game.seeds(), reported);
    assert_ne!(reported, SessionSeeds::from_seed(42));
    assert!(log.events().contains(&events[0]));

    let mut replay = GameController::builder().seeds(reported).build().unwrap();
    assert_eq!(board_values(&game), board_values(&replay));
    assert_eq!(first_offer(&mut game), first_offer(&mut replay));

    let record = SessionRecord::from_controller("20260101-000002".into(), &game);
    assert_eq!(record.seeds, reported);
}

#[test]
fn successive_restarts_deal_different_boards() {
    let mut game = GameController::builder()
        .seeds(SessionSeeds::from_seed(9))
        .build()
        .unwrap();
    let first = board_values(&game);
    game.start_session().unwrap();
    let second = board_values(&game);
    game.start_session().unwrap();
    let third = board_values(&game);
    assert_ne!(first, second);
    assert_ne!(second, third);
}

#[test]
fn restart_with_explicit_seeds_matches_fresh_controller() {
    let seeds = SessionSeeds {
        shuffle: 1234,
        jitter: 5678,
    };
    let mut game = GameController::builder()
        .seeds(SessionSeeds::from_seed(3))
        .build()
        .unwrap();
    first_offer(&mut game);

    let events = game.start_session_with(seeds).unwrap();
    assert_eq!(started_seeds(&events), seeds);

    let mut fresh = GameController::builder().seeds(seeds).build().unwrap();
    assert_eq!(board_values(&game), board_values(&fresh));
    assert_eq!(first_offer(&mut game), first_offer(&mut fresh));
}

#[test]
fn pinned_jitter_survives_restart() {
    let mut game = GameController::builder()
        .seeds(SessionSeeds::from_seed(11))
        .jitter(Box::new(FixedJitter(JITTER_MAX_BPS)))
        .build()
        .unwrap();
    first_offer(&mut game);

    game.start_session_with(SessionSeeds::from_seed(12)).unwrap();
    first_offer(&mut game);
    let breakdown = &game.last_offer().unwrap().breakdown;
    assert_eq!(breakdown.jitter_bps, JITTER_MAX_BPS);

    game.start_session().unwrap();
    first_offer(&mut game);
    assert_eq!(game.last_offer().unwrap().breakdown.jitter_bps, JITTER_MAX_BPS);
}
