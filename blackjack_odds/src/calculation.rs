mod house_edge;
mod tiers;

use std::ops;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::simulation::player::PolicySimulator;
use crate::simulation::shoe::Shoe;
use crate::strategy::{Diagnostics, ForcedAction};
use crate::{
    CombinationPools, Decision, HandState, OddsError, PolicyEntry, PolicyTable, Rule,
    DEALER_UP_CARD_VALUES,
};

pub use house_edge::{estimate_house_edge, HouseEdge};
pub use tiers::tier_plan;

/// How many trials to run and how to spread them over workers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub trials: u64,
    /// 0 means one worker per available core.
    pub number_of_threads: usize,
    /// Seeds every worker's generator. Runs with the same seed and thread count
    /// reproduce exactly.
    pub seed: Option<u64>,
    pub ignore_dealer_blackjack: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            trials: 100_000,
            number_of_threads: 0,
            seed: None,
            ignore_dealer_blackjack: false,
        }
    }
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<(), OddsError> {
        if self.trials == 0 {
            return Err(OddsError::ZeroTrials);
        }
        Ok(())
    }
}

/// A fixed-size pool of workers. Each worker owns its random generator; the only
/// thing shared between them is read-only input.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(number_of_threads: usize) -> Result<Self, OddsError> {
        let workers = {
            if number_of_threads == 0 {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            } else {
                number_of_threads
            }
        };
        let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;
        Ok(WorkerPool { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Splits `trials` over the workers and runs `job(share, rng)` once per worker.
    /// Results come back in worker order, independent of scheduling.
    pub fn run<T, F>(
        &self,
        trials: u64,
        seed: Option<u64>,
        stream: u64,
        job: F,
    ) -> Result<Vec<T>, OddsError>
    where
        T: Send,
        F: Fn(u64, &mut StdRng) -> Result<T, OddsError> + Sync,
    {
        let shares = split_trials(trials, self.workers);
        self.pool.install(|| {
            shares
                .into_par_iter()
                .enumerate()
                .map(|(worker, share)| {
                    let mut rng = worker_rng(seed, stream, worker);
                    job(share, &mut rng)
                })
                .collect()
        })
    }
}

fn split_trials(trials: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    (0..workers)
        .map(|worker| trials / workers + u64::from(worker < trials % workers))
        .collect()
}

fn worker_rng(seed: Option<u64>, stream: u64, worker: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(mix_seed(seed, stream, worker as u64)),
        None => StdRng::from_entropy(),
    }
}

/// SplitMix64 finalizer over the run seed, the stream and the worker index.
fn mix_seed(seed: u64, stream: u64, worker: u64) -> u64 {
    let mut z = seed
        ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ worker.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Distinct random stream per (state, up-card) so that tiers don't replay each
/// other's deals.
fn stream_id(state: HandState, dealer_up_card_value: u8) -> u64 {
    let state_code = match state {
        HandState::Hard(total) => total as u64,
        HandState::Soft(total) => 100 + total as u64,
        HandState::Pair(value) => 200 + value as u64,
        HandState::PairAces => 300,
    };
    state_code * 16 + dealer_up_card_value as u64
}

#[derive(Debug, Clone, Copy, Default)]
struct ActionTotals {
    hit: f64,
    double: f64,
    stand: f64,
    split: f64,
}

impl ActionTotals {
    fn record(&mut self, decision: Decision, payoff: f64) {
        match decision {
            Decision::Hit => self.hit += payoff,
            Decision::Double => self.double += payoff,
            Decision::Stand => self.stand += payoff,
            Decision::Split => self.split += payoff,
            Decision::Surrender => {}
        }
    }
}

impl ops::AddAssign for ActionTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.hit += rhs.hit;
        self.double += rhs.double;
        self.stand += rhs.stand;
        self.split += rhs.split;
    }
}

/// Estimates the expectation of every first action for `state` against one dealer
/// up-card.
///
/// Each trial samples a starting hand from the state's pool, removes it and the
/// up-card from a freshly shuffled shoe, then plays one copy of that shoe per
/// candidate action with the state pinned to the candidate. Split is a candidate
/// for pairs only. States reachable only after a split are played as split hands.
#[allow(clippy::too_many_arguments)]
pub fn estimate_entry(
    rule: &Rule,
    pools: &CombinationPools,
    table: &PolicyTable,
    state: HandState,
    dealer_up_card_value: u8,
    sampling: &SamplingConfig,
    workers: &WorkerPool,
    diagnostics: &Diagnostics,
) -> Result<PolicyEntry, OddsError> {
    sampling.validate()?;
    pools.pool(state)?;
    if !DEALER_UP_CARD_VALUES.contains(&dealer_up_card_value) {
        return Err(OddsError::InvalidUpCard(dealer_up_card_value));
    }

    let mut candidates = vec![Decision::Hit, Decision::Double, Decision::Stand];
    if state.is_pair() {
        candidates.push(Decision::Split);
    }

    let after_split = state.reachable_only_after_split();
    let stream = stream_id(state, dealer_up_card_value);
    let partials = workers.run(sampling.trials, sampling.seed, stream, |share, rng| {
        let mut totals = ActionTotals::default();
        for _ in 0..share {
            let (first, second) = pools.sample(state, rng)?;
            let mut shoe = Shoe::new(rule.decks_in_shoe);
            shoe.shuffle(rng);
            shoe.remove(first)?;
            shoe.remove(second)?;
            let dealer_up_card = shoe.remove_value(dealer_up_card_value)?;

            for decision in &candidates {
                let forced = ForcedAction::new(table, state, *decision);
                let simulator = PolicySimulator::new(rule, &forced, diagnostics)
                    .ignore_dealer_blackjack(sampling.ignore_dealer_blackjack);
                let hand = vec![first, second];
                let payoff = if after_split {
                    simulator.simulate_split_hand(hand, dealer_up_card, &mut shoe.clone())?
                } else {
                    simulator.simulate(hand, dealer_up_card, &mut shoe.clone())?
                };
                totals.record(*decision, payoff);
            }
        }
        Ok(totals)
    })?;

    let mut totals = ActionTotals::default();
    for partial in partials {
        totals += partial;
    }
    let trials = sampling.trials as f64;
    let split_ev = state.is_pair().then(|| totals.split / trials);
    Ok(PolicyEntry::from_expectations(
        totals.hit / trials,
        totals.double / trials,
        totals.stand / trials,
        split_ev,
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierReport {
    pub state: HandState,
    pub tier_index: usize,
    pub number_of_tiers: usize,
    /// Strategy lookups during this tier that found no entry and stood.
    pub missing_entries: u64,
}

/// Receives progress while a policy table is generated.
pub trait GenerationEventHandler {
    fn on_tier_begin(&mut self, _state: HandState, _tier_index: usize, _number_of_tiers: usize) {}
    fn on_tier_skipped(&mut self, _state: HandState) {}
    fn on_entry_complete(
        &mut self,
        _state: HandState,
        _dealer_up_card_value: u8,
        _entry: &PolicyEntry,
    ) {
    }
    /// `table` already holds the completed tier.
    fn on_tier_complete(&mut self, _report: &TierReport, _table: &PolicyTable) {}
}

impl GenerationEventHandler for () {}

/// Computes all up-card entries of one state against a read-only table snapshot.
pub fn run_tier(
    rule: &Rule,
    pools: &CombinationPools,
    table: &PolicyTable,
    state: HandState,
    sampling: &SamplingConfig,
    workers: &WorkerPool,
    handler: &mut impl GenerationEventHandler,
) -> Result<(Vec<(u8, PolicyEntry)>, u64), OddsError> {
    let diagnostics = Diagnostics::new();
    let mut entries = Vec::with_capacity(DEALER_UP_CARD_VALUES.count());
    for dealer_up_card_value in DEALER_UP_CARD_VALUES {
        let entry = estimate_entry(
            rule,
            pools,
            table,
            state,
            dealer_up_card_value,
            sampling,
            workers,
            &diagnostics,
        )?;
        handler.on_entry_complete(state, dealer_up_card_value, &entry);
        entries.push((dealer_up_card_value, entry));
    }
    Ok((entries, diagnostics.missing_entries()))
}

/// Builds the policy table tier by tier, starting from `table`.
///
/// States already complete in `table` are skipped, so a table saved after any tier
/// resumes where it stopped. A tier is merged only once all of its entries have
/// been computed.
pub fn generate_policy_table(
    rule: &Rule,
    sampling: &SamplingConfig,
    mut table: PolicyTable,
    handler: &mut impl GenerationEventHandler,
) -> Result<PolicyTable, OddsError> {
    rule.validate()?;
    sampling.validate()?;
    let pools = CombinationPools::new();
    let workers = WorkerPool::new(sampling.number_of_threads)?;

    let plan = tier_plan(rule);
    let number_of_tiers = plan.len();
    for (tier_index, state) in plan.into_iter().enumerate() {
        if table.contains_state(state) {
            log::info!("{:<32}{:<16}", "skipping computed tier", state);
            handler.on_tier_skipped(state);
            continue;
        }

        log::info!(
            "{:<32}{:<16}{}/{}",
            "computing tier",
            state,
            tier_index + 1,
            number_of_tiers
        );
        handler.on_tier_begin(state, tier_index, number_of_tiers);
        let (entries, missing_entries) =
            run_tier(rule, &pools, &table, state, sampling, &workers, handler)?;
        if missing_entries > 0 {
            log::warn!(
                "{} strategy lookups in tier {} found no entry and stood",
                missing_entries,
                state
            );
        }
        table.merge_tier(state, entries)?;
        log::info!("{:<32}{:<16}version {}", "merged tier", state, table.version());

        let report = TierReport {
            state,
            tier_index,
            number_of_tiers,
            missing_entries,
        };
        handler.on_tier_complete(&report, &table);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampling(trials: u64, seed: u64) -> SamplingConfig {
        SamplingConfig {
            trials,
            number_of_threads: 2,
            seed: Some(seed),
            ignore_dealer_blackjack: false,
        }
    }

    fn estimate(
        state: HandState,
        up: u8,
        sampling: &SamplingConfig,
    ) -> Result<PolicyEntry, OddsError> {
        let rule = Rule::default();
        let pools = CombinationPools::new();
        let workers = WorkerPool::new(sampling.number_of_threads).unwrap();
        let diagnostics = Diagnostics::new();
        estimate_entry(
            &rule,
            &pools,
            &PolicyTable::new(),
            state,
            up,
            sampling,
            &workers,
            &diagnostics,
        )
    }

    #[derive(Default)]
    struct Recorder {
        begun: Vec<HandState>,
        skipped: Vec<HandState>,
        entries: usize,
        completed: usize,
        missing_entries: u64,
    }

    impl GenerationEventHandler for Recorder {
        fn on_tier_begin(&mut self, state: HandState, _: usize, _: usize) {
            self.begun.push(state);
        }
        fn on_tier_skipped(&mut self, state: HandState) {
            self.skipped.push(state);
        }
        fn on_entry_complete(&mut self, _: HandState, _: u8, _: &PolicyEntry) {
            self.entries += 1;
        }
        fn on_tier_complete(&mut self, report: &TierReport, table: &PolicyTable) {
            assert!(table.contains_state(report.state));
            self.completed += 1;
            self.missing_entries += report.missing_entries;
        }
    }

    #[test]
    fn trials_are_split_evenly() {
        assert_eq!(split_trials(10, 3), vec![4, 3, 3]);
        assert_eq!(split_trials(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(split_trials(9, 0), vec![9]);
    }

    #[test]
    fn zero_trials_are_rejected() {
        let result = estimate(HandState::Hard(16), 10, &sampling(0, 1));
        assert!(matches!(result, Err(OddsError::ZeroTrials)));
        let result =
            generate_policy_table(&Rule::default(), &sampling(0, 1), PolicyTable::new(), &mut ());
        assert!(matches!(result, Err(OddsError::ZeroTrials)));
    }

    #[test]
    fn states_without_starting_hands_are_rejected() {
        let result = estimate(HandState::Hard(3), 10, &sampling(10, 1));
        assert!(matches!(result, Err(OddsError::EmptyCombinationPool(_))));
        let result = estimate(HandState::Hard(16), 1, &sampling(10, 1));
        assert!(matches!(result, Err(OddsError::InvalidUpCard(1))));
    }

    #[test]
    fn seeded_estimates_are_reproducible() {
        let a = estimate(HandState::Hard(16), 10, &sampling(2_000, 99)).unwrap();
        let b = estimate(HandState::Hard(16), 10, &sampling(2_000, 99)).unwrap();
        assert_eq!(a, b);
        let c = estimate(HandState::Hard(16), 10, &sampling(2_000, 100)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn standing_on_sixteen_against_ten_loses_about_half() {
        let entry = estimate(HandState::Hard(16), 10, &sampling(20_000, 7)).unwrap();
        assert!(entry.stand_ev > -0.62 && entry.stand_ev < -0.46, "{}", entry.stand_ev);
        // With an empty table the hit branch stands after one card, on the same
        // cards the double branch sees.
        assert_eq!(entry.double_ev, 2.0 * entry.hit_ev);
        assert_eq!(entry.split_ev, None);
    }

    #[test]
    fn naturals_always_pay_when_dealer_cannot_have_blackjack() {
        let entry = estimate(HandState::Hard(21), 6, &sampling(500, 3)).unwrap();
        assert_eq!(entry.stand_ev, 1.5);
        assert_eq!(entry.hit_ev, 1.5);
        assert_eq!(entry.double_ev, 1.5);
        assert_eq!(entry.best_action, Decision::Stand);

        let mut config = sampling(500, 3);
        config.ignore_dealer_blackjack = true;
        let entry = estimate(HandState::Hard(21), 11, &config).unwrap();
        assert_eq!(entry.stand_ev, 1.5);
    }

    #[test]
    fn pairs_carry_a_split_expectation() {
        let entry = estimate(HandState::Pair(8), 6, &sampling(200, 5)).unwrap();
        assert!(entry.split_ev.is_some());
        let entry = estimate(HandState::Soft(18), 6, &sampling(200, 5)).unwrap();
        assert!(entry.split_ev.is_none());
        assert_ne!(entry.best_action, Decision::Split);
    }

    #[test]
    fn full_generation_then_resume() {
        let rule = Rule::default();
        let config = sampling(30, 11);
        let mut recorder = Recorder::default();
        let table =
            generate_policy_table(&rule, &config, PolicyTable::new(), &mut recorder).unwrap();

        let plan = tier_plan(&rule);
        assert_eq!(recorder.begun, plan);
        assert_eq!(recorder.missing_entries, 0);
        assert_eq!(recorder.completed, plan.len());
        assert_eq!(recorder.entries, plan.len() * 10);
        assert_eq!(table.len(), plan.len() * 10);
        assert_eq!(table.version() as usize, plan.len());
        for state in &plan {
            assert!(table.contains_state(*state));
        }
        assert!(table
            .rows()
            .iter()
            .filter(|row| !row.state_key.is_pair())
            .all(|row| row.split_ev.is_none() && row.best_action != Decision::Split));

        let mut recorder = Recorder::default();
        let resumed = generate_policy_table(&rule, &config, table.clone(), &mut recorder).unwrap();
        assert!(recorder.begun.is_empty());
        assert_eq!(recorder.skipped, plan);
        assert_eq!(resumed.rows(), table.rows());
    }

    #[test]
    fn partially_saved_tiers_are_not_resumed() {
        let entry = PolicyEntry::from_expectations(0.5, 1.0, -0.2, None);
        let mut table = PolicyTable::new();
        table
            .merge_tier(HandState::Hard(20), DEALER_UP_CARD_VALUES.map(|up| (up, entry)).collect())
            .unwrap();
        let mut rows = table.rows();
        rows.pop();
        let result = PolicyTable::from_rows(rows);
        assert!(matches!(result, Err(OddsError::PartialTier(HandState::Hard(20)))));
    }
}
