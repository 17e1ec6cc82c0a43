pub mod calculation;
mod error;
mod hand_state;
mod policy;
pub mod simulation;
pub mod strategy;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;

pub use error::OddsError;
pub use hand_state::{CombinationPools, HandState};
pub use policy::{
    determine_best_action, PolicyEntry, PolicyRow, PolicyTable, DEALER_UP_CARD_VALUES,
};

/// Casino rules a policy table is built against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub decks_in_shoe: u8,
    pub dealer_hits_soft_17: bool,
    pub double_after_split: bool,
    pub surrender_allowed: bool,
    pub blackjack_payout: f64,
    /// When false, each Ace of a split pair receives exactly one card.
    pub allow_decisions_after_split_aces: bool,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            decks_in_shoe: 6,
            dealer_hits_soft_17: true,
            double_after_split: true,
            surrender_allowed: true,
            blackjack_payout: 1.5,
            allow_decisions_after_split_aces: true,
        }
    }
}

impl Rule {
    /// Combination pools pair two independent decks, so a sampled hand may hold the
    /// same physical card twice. A shoe therefore needs at least 2 decks.
    pub fn validate(&self) -> Result<(), OddsError> {
        if self.decks_in_shoe < 2 {
            return Err(OddsError::InvalidRule(format!(
                "decks_in_shoe must be at least 2, got {}",
                self.decks_in_shoe
            )));
        }
        if !self.blackjack_payout.is_finite() || self.blackjack_payout <= 0.0 {
            return Err(OddsError::InvalidRule(format!(
                "blackjack_payout must be a positive number, got {}",
                self.blackjack_payout
            )));
        }
        Ok(())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    Serialize_enum_str,
    Deserialize_enum_str,
)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

impl Default for Decision {
    fn default() -> Self {
        Decision::Stand
    }
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Hit => "hit",
            Decision::Stand => "stand",
            Decision::Double => "double",
            Decision::Split => "split",
            Decision::Surrender => "surrender",
        }
    }
}
