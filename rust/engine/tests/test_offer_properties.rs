use banker_engine::controller::{GameController, Phase};
use banker_engine::events::SessionSeeds;
use banker_engine::offer::{
    compute_offer, round_to_granularity, OfferBreakdown, BPS, JITTER_MAX_BPS, JITTER_MIN_BPS,
};
use banker_engine::values::Money;

fn ceil_bps(cents: u64, bps: u64) -> u64 {
    (cents * bps).div_ceil(BPS as u64)
}

fn floor_bps(cents: u64, bps: u64) -> u64 {
    cents * bps / BPS as u64
}

fn ceiling_of(b: &OfferBreakdown) -> u64 {
    let ev = b.expected_value.cents();
    if b.remaining <= 3 {
        floor_bps(ev, 9_500)
    } else {
        floor_bps(ev, 8_500)
    }
}

/// Plays every seed to the switch decision, rejecting each offer.
fn offers_for_seed(seed: u64) -> Vec<OfferBreakdown> {
    let mut game = GameController::builder()
        .seeds(SessionSeeds::from_seed(seed))
        .build()
        .unwrap();
    let first = game.available_for_elimination()[0];
    game.select_container(first).unwrap();
    let mut seen = Vec::new();
    while game.phase() != Phase::SwitchDecision {
        let quota = game.quota() - game.eliminated_this_round();
        for id in game.available_for_elimination().into_iter().take(quota) {
            game.eliminate_container(id).unwrap();
        }
        if game.phase() == Phase::OfferPresented {
            seen.push(game.last_offer().unwrap().breakdown.clone());
            game.reject_offer().unwrap();
        }
    }
    seen
}

#[test]
fn offers_stay_below_the_ceiling() {
    for seed in 0..50 {
        for b in offers_for_seed(seed) {
            assert!(!b.degraded);
            assert!(
                b.amount.cents() <= ceiling_of(&b),
                "seed {}: {} above ceiling for ev {}",
                seed,
                b.amount,
                b.expected_value
            );
        }
    }
}

#[test]
fn endgame_offers_respect_the_floor() {
    for seed in 0..50 {
        for b in offers_for_seed(seed).iter().filter(|b| b.remaining <= 3) {
            let floor = ceil_bps(b.expected_value.cents(), 8_500).min(ceiling_of(b));
            assert!(
                b.amount.cents() >= floor,
                "seed {}: {} under the endgame floor",
                seed,
                b.amount
            );
        }
    }
}

#[test]
fn later_offers_grow_unless_capped() {
    for seed in 0..50 {
        let offers = offers_for_seed(seed);
        for pair in offers.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let step = ceil_bps(prev.amount.cents(), 10_500);
            assert!(
                next.amount.cents() >= step || next.amount.cents() == ceiling_of(next),
                "seed {}: {} after {} is neither a 5% raise nor the ceiling",
                seed,
                next.amount,
                prev.amount
            );
        }
    }
}

#[test]
fn jitter_only_moves_the_pre_rounding_amount() {
    let values: Vec<Money> = [10, 75, 400, 5_000, 50_000, 300_000]
        .into_iter()
        .map(Money::from_units)
        .collect();
    let low = compute_offer(&values, 4, &[], BPS, JITTER_MIN_BPS);
    let high = compute_offer(&values, 4, &[], BPS, JITTER_MAX_BPS);
    assert_eq!(low.raw, high.raw);
    assert!(low.rounded <= high.rounded);
    // out-of-range draws are clamped
    let wild = compute_offer(&values, 4, &[], BPS, 20_000);
    assert_eq!(wild.jitter_bps, JITTER_MAX_BPS);
    assert_eq!(wild.rounded, high.rounded);
}

#[test]
fn rounded_amounts_land_on_their_granularity() {
    let cases = [
        (4_321, 5),
        (87_654, 10),
        (123_456, 100),
        (6_543_210, 500),
        (23_456_700, 1_000),
        (321_987_600, 5_000),
    ];
    for (cents, step_units) in cases {
        let rounded = round_to_granularity(Money::from_cents(cents));
        assert_eq!(rounded.cents() % (step_units * 100), 0, "{}", cents);
    }
}

#[test]
fn higher_aggressiveness_never_lowers_the_raw_offer() {
    let values: Vec<Money> = [1, 50, 750, 10_000, 200_000, 750_000, 1_000_000]
        .into_iter()
        .map(Money::from_units)
        .collect();
    let soft = compute_offer(&values, 3, &[], 5_000, BPS);
    let hard = compute_offer(&values, 3, &[], 15_000, BPS);
    assert!(soft.raw <= hard.raw);
    assert!(hard.amount.cents() <= ceiling_of(&hard));
}
