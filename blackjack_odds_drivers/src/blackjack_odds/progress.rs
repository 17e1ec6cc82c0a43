use std::path::PathBuf;

use blackjack_odds::calculation::{GenerationEventHandler, TierReport};
use blackjack_odds::{HandState, PolicyEntry, PolicyTable, DEALER_UP_CARD_VALUES};
use blackjack_odds_drivers::write_policy_table;
use indicatif::{ProgressBar, ProgressStyle};

/// Shows one tick per computed entry and saves the table after every tier, so an
/// interrupted run can be resumed from the output file.
pub struct Progress {
    bar: ProgressBar,
    checkpoint: PathBuf,
}

impl Progress {
    pub fn new(number_of_tiers: usize, checkpoint: PathBuf) -> Self {
        let bar = ProgressBar::new((number_of_tiers * DEALER_UP_CARD_VALUES.count()) as u64);
        let template = "{spinner:.green} {msg:<12} [{bar:40.cyan/blue}] {pos}/{len} ({eta})";
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Progress { bar, checkpoint }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl GenerationEventHandler for Progress {
    fn on_tier_begin(&mut self, state: HandState, _tier_index: usize, _number_of_tiers: usize) {
        self.bar.set_message(state.to_string());
    }

    fn on_tier_skipped(&mut self, _state: HandState) {
        self.bar.inc(DEALER_UP_CARD_VALUES.count() as u64);
    }

    fn on_entry_complete(
        &mut self,
        _state: HandState,
        _dealer_up_card_value: u8,
        _entry: &PolicyEntry,
    ) {
        self.bar.inc(1);
    }

    fn on_tier_complete(&mut self, report: &TierReport, table: &PolicyTable) {
        if let Err(e) = write_policy_table(&self.checkpoint, table) {
            log::error!("cannot save progress after tier {}: {:#}", report.state, e);
        }
    }
}
