use super::{SamplingConfig, WorkerPool};
use crate::simulation::player::PolicySimulator;
use crate::simulation::shoe::Shoe;
use crate::strategy::{Diagnostics, Strategy};
use crate::{OddsError, Rule};

/// Expected return per unit bet of full rounds played with a strategy. Negative
/// values are the house's edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseEdge {
    pub expectation: f64,
    pub trials: u64,
    pub missing_entries: u64,
}

const HOUSE_EDGE_STREAM: u64 = u64::MAX;

/// Deals complete rounds from fresh shoes and plays each one with `strategy`.
pub fn estimate_house_edge<S: Strategy>(
    rule: &Rule,
    strategy: &S,
    sampling: &SamplingConfig,
) -> Result<HouseEdge, OddsError> {
    rule.validate()?;
    sampling.validate()?;
    let workers = WorkerPool::new(sampling.number_of_threads)?;
    let diagnostics = Diagnostics::new();
    let simulator = PolicySimulator::new(rule, strategy, &diagnostics)
        .ignore_dealer_blackjack(sampling.ignore_dealer_blackjack);

    let partials = workers.run(sampling.trials, sampling.seed, HOUSE_EDGE_STREAM, |share, rng| {
        let mut total = 0.0;
        for _ in 0..share {
            let mut shoe = Shoe::new(rule.decks_in_shoe);
            shoe.shuffle(rng);
            let player_cards = vec![shoe.draw()?, shoe.draw()?];
            let dealer_up_card = shoe.draw()?;
            total += simulator.simulate(player_cards, dealer_up_card, &mut shoe)?;
        }
        Ok(total)
    })?;

    let total: f64 = partials.into_iter().sum();
    let house_edge = HouseEdge {
        expectation: total / sampling.trials as f64,
        trials: sampling.trials,
        missing_entries: diagnostics.missing_entries(),
    };
    log::info!(
        "{:<32}{:.5} over {} rounds",
        "expected return per unit",
        house_edge.expectation,
        house_edge.trials
    );
    Ok(house_edge)
}
