use thiserror::Error;

use crate::{simulation::Card, Decision, HandState};

#[derive(Debug, Error)]
pub enum OddsError {
    #[error("cannot draw from an empty shoe")]
    ShoeExhausted,

    #[error("card {0} is not in the shoe")]
    CardNotInShoe(Card),

    #[error("no card of value {0} is left in the shoe")]
    NoCardOfValue(u8),

    #[error("the number of trials must be positive")]
    ZeroTrials,

    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("decision {} is not legal for hand {state}", .decision.as_str())]
    IllegalDecision { decision: Decision, state: String },

    #[error("unknown hand state: {0:?}")]
    UnknownHandState(String),

    #[error("policy entry for {state} against {dealer_up_card_value} already exists")]
    DuplicateEntry {
        state: HandState,
        dealer_up_card_value: u8,
    },

    #[error("policy table holds only part of the entries for {0}")]
    PartialTier(HandState),

    #[error("no starting hand belongs to {0}")]
    EmptyCombinationPool(HandState),

    #[error("invalid dealer up-card value: {0}")]
    InvalidUpCard(u8),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
