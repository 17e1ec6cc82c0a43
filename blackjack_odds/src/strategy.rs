use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Decision, HandState, PolicyTable};

/// A source of playing decisions, keyed by hand state and dealer up-card value.
pub trait Strategy: Sync {
    /// Returns `None` when the strategy has nothing recorded for the situation.
    fn decision(&self, state: HandState, dealer_up_card_value: u8) -> Option<Decision>;
}

impl Strategy for PolicyTable {
    fn decision(&self, state: HandState, dealer_up_card_value: u8) -> Option<Decision> {
        self.get(state, dealer_up_card_value)
            .map(|entry| entry.best_action)
    }
}

/// A view of another strategy where one hand state always takes a pinned decision.
/// Every other state still resolves through the underlying strategy.
pub struct ForcedAction<'a, S: Strategy> {
    base: &'a S,
    state: HandState,
    decision: Decision,
}

impl<'a, S: Strategy> ForcedAction<'a, S> {
    pub fn new(base: &'a S, state: HandState, decision: Decision) -> Self {
        ForcedAction {
            base,
            state,
            decision,
        }
    }
}

impl<'a, S: Strategy> Strategy for ForcedAction<'a, S> {
    fn decision(&self, state: HandState, dealer_up_card_value: u8) -> Option<Decision> {
        if state == self.state {
            Some(self.decision)
        } else {
            self.base.decision(state, dealer_up_card_value)
        }
    }
}

/// Counts strategy lookups that found nothing and fell back to standing.
#[derive(Debug, Default)]
pub struct Diagnostics {
    missing_entries: AtomicU64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn record_missing_entry(&self, state: HandState, dealer_up_card_value: u8) {
        self.missing_entries.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "no policy entry for {} against {}, standing",
            state,
            dealer_up_card_value
        );
    }

    pub fn missing_entries(&self) -> u64 {
        self.missing_entries.load(Ordering::Relaxed)
    }
}
