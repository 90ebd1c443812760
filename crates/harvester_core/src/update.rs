use crate::{Advance, Effect, HarvestState, Msg, Phase, StopReason};

/// Pure update function: applies a message to state and returns any effects.
///
/// The cap is checked after every batch, before any disclosure attempt. A batch scraped
/// after a successful disclosure that accepts nothing ends the loop, so a control that
/// never reveals anything new cannot keep it running. Messages that do not fit the
/// current phase leave the state untouched and produce no effects.
pub fn update(mut state: HarvestState, msg: Msg) -> (HarvestState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (Phase::Idle, Msg::Started) => {
            state.set_phase(Phase::Scraping);
            vec![Effect::ScrapeBatch]
        }
        (Phase::Scraping, Msg::BatchExtracted(records)) => {
            state.count_batch();
            let before = state.results().len();
            for record in records {
                state.offer(record);
            }
            let fresh = state.results().len() - before;
            if state.results().is_full() {
                finalize(&mut state, StopReason::CapReached)
            } else if fresh == 0 && state.stats().advances > 0 {
                finalize(&mut state, StopReason::NoProgress)
            } else {
                state.set_phase(Phase::Advancing);
                vec![Effect::AdvanceDisclosure {
                    current: state.results().len(),
                    cap: state.results().cap().get(),
                }]
            }
        }
        (Phase::Scraping, Msg::BatchLocateFailed(_reason)) => {
            finalize(&mut state, StopReason::BatchLocateFailed)
        }
        (Phase::Advancing, Msg::Advanced(Advance::More)) => {
            state.count_advance();
            state.set_phase(Phase::Scraping);
            vec![Effect::ScrapeBatch]
        }
        (Phase::Advancing, Msg::Advanced(Advance::Exhausted)) => {
            finalize(&mut state, StopReason::ControlExhausted)
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn finalize(state: &mut HarvestState, reason: StopReason) -> Vec<Effect> {
    state.stop(reason);
    vec![Effect::Finalize { reason }]
}
