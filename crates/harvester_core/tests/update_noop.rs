use std::num::NonZeroUsize;

use harvester_core::{update, Advance, HarvestState, Msg, Phase};

fn cap(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn advance_before_start_is_noop() {
    let state = HarvestState::new(cap(5));
    let (next, effects) = update(state.clone(), Msg::Advanced(Advance::More));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn batch_before_start_is_ignored() {
    let state = HarvestState::new(cap(5));
    let (next, effects) = update(state.clone(), Msg::BatchExtracted(Vec::new()));

    assert_eq!(next.phase(), Phase::Idle);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
