use banker_engine::board::ContainerId;
use banker_engine::controller::{GameController, Phase};
use banker_engine::events::{EventLog, GameEvent, SessionSeeds};
use banker_engine::offer::FixedJitter;
use banker_engine::stats::{DebugCapability, Outcome};
use banker_engine::values::Money;

fn id(n: u8) -> ContainerId {
    ContainerId::new(n).unwrap()
}

fn new_game(seed: u64, log: &EventLog) -> GameController {
    GameController::builder()
        .seeds(SessionSeeds::from_seed(seed))
        .sink(Box::new(log.clone()))
        .build()
        .expect("build controller")
}

fn open_quota(game: &mut GameController) {
    let quota = game.quota();
    for target in game.available_for_elimination().into_iter().take(quota) {
        game.eliminate_container(target).expect("eliminate");
    }
}

fn mean_cents(values: &[Money]) -> u128 {
    let sum: u128 = values.iter().map(|v| u128::from(v.cents())).sum();
    sum / values.len() as u128
}

#[test]
fn first_round_offer_then_reject() {
    let log = EventLog::new();
    let mut game = new_game(7, &log);
    game.select_container(id(7)).unwrap();
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.quota(), 6);

    for n in [1, 2, 3, 4, 5] {
        game.eliminate_container(id(n)).unwrap();
        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.eliminated_this_round() <= game.quota());
    }
    let events = game.eliminate_container(id(6)).unwrap();
    assert_eq!(game.phase(), Phase::OfferPresented);
    assert_eq!(game.round(), 1);
    assert_eq!(game.eliminated_this_round(), 6);
    assert!(matches!(events[0], GameEvent::ContainerEliminated { .. }));
    let GameEvent::OfferMade { amount, round, .. } = events[1] else {
        panic!("expected an offer, got {:?}", events[1]);
    };
    assert_eq!(round, 1);

    // 26 - held - 6 opened = 19 unheld values priced
    let stats = game.stats();
    let held = game
        .debug(&DebugCapability::grant())
        .reveal(id(7))
        .unwrap();
    let mut unheld = stats.remaining_values.clone();
    let pos = unheld.iter().position(|v| *v == held).unwrap();
    unheld.remove(pos);
    assert_eq!(unheld.len(), 19);
    assert!(u128::from(amount.cents()) * 100 <= mean_cents(&unheld) * 85);
    assert_eq!(game.offer_history(), &[amount]);

    let events = game.reject_offer().unwrap();
    assert_eq!(events, vec![GameEvent::RoundAdvanced { round: 2, quota: 5 }]);
    assert_eq!(game.round(), 2);
    assert_eq!(game.quota(), 5);
    assert_eq!(game.eliminated_this_round(), 0);
    assert_eq!(game.phase(), Phase::Playing);
}

#[test]
fn quota_sequence_follows_threshold_table() {
    let log = EventLog::new();
    let mut game = new_game(99, &log);
    game.select_container(id(1)).unwrap();

    let mut quotas = vec![game.quota()];
    while game.phase() == Phase::Playing {
        open_quota(&mut game);
        if game.phase() == Phase::OfferPresented {
            game.reject_offer().unwrap();
            quotas.push(game.quota());
        }
    }
    assert_eq!(quotas, vec![6, 5, 5, 4, 2, 1, 1]);
    assert_eq!(game.phase(), Phase::SwitchDecision);
    assert_eq!(game.remaining_count(), 2);
    assert_eq!(game.offer_history().len(), 6);
}

#[test]
fn switch_decision_only_at_two_remaining() {
    let log = EventLog::new();
    let mut game = new_game(5, &log);
    game.select_container(id(3)).unwrap();
    loop {
        open_quota(&mut game);
        match game.phase() {
            Phase::OfferPresented => {
                assert!(game.remaining_count() > 2);
                game.reject_offer().unwrap();
            }
            Phase::SwitchDecision => break,
            other => panic!("unexpected phase {}", other),
        }
    }
    assert_eq!(game.remaining_count(), 2);

    // the last elimination went straight to the switch, no offer
    let events = log.events();
    let n = events.len();
    assert!(matches!(events[n - 2], GameEvent::ContainerEliminated { .. }));
    let GameEvent::SwitchOffered { other_id, held_id } = events[n - 1] else {
        panic!("expected switch offer, got {:?}", events[n - 1]);
    };
    assert_eq!(held_id, id(3));

    let other_value = game
        .debug(&DebugCapability::grant())
        .reveal(other_id)
        .unwrap();
    let events = game.choose_switch(true).unwrap();
    assert_eq!(
        events,
        vec![GameEvent::SessionConcluded {
            final_value: other_value,
            switched: true
        }]
    );
    assert_eq!(game.held_id(), Some(other_id));
    assert_eq!(game.phase(), Phase::Concluded);
    assert_eq!(game.initial_pick(), Some(id(3)));
    match game.outcome() {
        Some(Outcome::Concluded {
            held_id,
            final_value,
            switched,
            ..
        }) => {
            assert_eq!(*held_id, other_id);
            assert_eq!(*final_value, other_value);
            assert!(*switched);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn keeping_reports_original_value() {
    let log = EventLog::new();
    let mut game = new_game(12, &log);
    game.select_container(id(26)).unwrap();
    let original = game
        .debug(&DebugCapability::grant())
        .reveal(id(26))
        .unwrap();
    while game.phase() != Phase::SwitchDecision {
        open_quota(&mut game);
        if game.phase() == Phase::OfferPresented {
            game.reject_offer().unwrap();
        }
    }
    game.choose_switch(false).unwrap();
    assert_eq!(game.held_id(), Some(id(26)));
    assert_eq!(game.outcome().map(|o| o.winnings()), Some(original));
}

#[test]
fn accepting_ends_the_session_with_a_deal() {
    let log = EventLog::new();
    let mut game = new_game(21, &log);
    game.select_container(id(10)).unwrap();
    open_quota(&mut game);
    let offer = game.last_offer().unwrap().amount;
    let held = game
        .debug(&DebugCapability::grant())
        .reveal(id(10))
        .unwrap();

    let events = game.accept_offer().unwrap();
    assert_eq!(
        events,
        vec![GameEvent::DealAccepted {
            amount: offer,
            held_value: held
        }]
    );
    assert_eq!(game.phase(), Phase::DealAccepted);
    assert!(game.phase().is_terminal());
    assert_eq!(
        game.outcome(),
        Some(&Outcome::Deal {
            amount: offer,
            held_value: held,
            round: 1
        })
    );
    // nothing else is accepted after the deal
    assert!(game.reject_offer().unwrap_err().is_illegal_intent());
    assert!(game
        .eliminate_container(game.available_for_elimination()[0])
        .unwrap_err()
        .is_illegal_intent());
}

#[test]
fn same_seeds_replay_the_same_session() {
    let play = |seed: u64| {
        let mut game = GameController::builder()
            .seeds(SessionSeeds::from_seed(seed))
            .build()
            .unwrap();
        game.select_container(id(4)).unwrap();
        while game.phase() != Phase::SwitchDecision {
            open_quota(&mut game);
            if game.phase() == Phase::OfferPresented {
                game.reject_offer().unwrap();
            }
        }
        (game.eliminated_values(), game.offer_history().to_vec())
    };
    assert_eq!(play(314), play(314));
}

#[test]
fn pinned_jitter_separates_offer_from_shuffle() {
    let build = |jitter: u32| {
        let mut game = GameController::builder()
            .seeds(SessionSeeds::from_seed(8))
            .jitter(Box::new(FixedJitter(jitter)))
            .build()
            .unwrap();
        game.select_container(id(1)).unwrap();
        open_quota(&mut game);
        game.last_offer().unwrap().clone()
    };
    let low = build(9_500);
    let high = build(10_500);
    assert_eq!(low.breakdown.expected_value, high.breakdown.expected_value);
    assert_eq!(low.breakdown.raw, high.breakdown.raw);
    assert!(low.breakdown.rounded <= high.breakdown.rounded);
}
