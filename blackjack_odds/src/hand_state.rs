use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::IntoEnumIterator;

use crate::simulation::hand::{is_soft, score};
use crate::simulation::{Card, Suit};
use crate::OddsError;

/// Canonical bucket of a player hand, used to index the policy table.
///
/// `Pair` carries the value of one of the paired cards (2 to 10). Two Aces are
/// always `PairAces`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandState {
    Hard(u8),
    Soft(u8),
    Pair(u8),
    PairAces,
}

impl HandState {
    /// Classifies a two-card starting hand.
    pub fn classify(first: Card, second: Card) -> HandState {
        if first.is_ace() && second.is_ace() {
            return HandState::PairAces;
        }
        if first.rank == second.rank {
            return HandState::Pair(first.value());
        }
        let total = first.value() + second.value();
        if (first.is_ace() || second.is_ace()) && total < 21 {
            HandState::Soft(total)
        } else {
            HandState::Hard(total)
        }
    }

    /// Keys a hand by its scored total alone, ignoring pairs. Hands that have been
    /// hit or come out of a split are looked up this way.
    pub fn from_total(hand: &[Card]) -> HandState {
        let total = score(hand).min(u8::MAX as u32) as u8;
        if is_soft(hand) {
            HandState::Soft(total)
        } else {
            HandState::Hard(total)
        }
    }

    /// Keys a hand in play: original two-card hands by category, everything else by
    /// total.
    pub fn of_hand(hand: &[Card], after_split: bool) -> HandState {
        match hand {
            [first, second] if !after_split => HandState::classify(*first, *second),
            _ => HandState::from_total(hand),
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, HandState::Pair(_) | HandState::PairAces)
    }

    /// Totals that no starting hand is categorized as, but that a split sub-hand
    /// can hold: a split Two drawing a Two, a split Ace drawing an Ace.
    pub fn reachable_only_after_split(&self) -> bool {
        matches!(self, HandState::Hard(4) | HandState::Soft(12))
    }
}

impl fmt::Display for HandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandState::Hard(total) => write!(f, "{}", total),
            HandState::Soft(total) => write!(f, "soft_{}", total),
            HandState::Pair(value) => write!(f, "paired_{}", value * 2),
            HandState::PairAces => write!(f, "paired_aces"),
        }
    }
}

impl FromStr for HandState {
    type Err = OddsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || OddsError::UnknownHandState(s.to_string());
        if s == "paired_aces" {
            return Ok(HandState::PairAces);
        }
        if let Some(total) = s.strip_prefix("paired_") {
            let total: u8 = total.parse().map_err(|_| unknown())?;
            if total % 2 != 0 || !(4..=20).contains(&total) {
                return Err(unknown());
            }
            return Ok(HandState::Pair(total / 2));
        }
        if let Some(total) = s.strip_prefix("soft_") {
            let total: u8 = total.parse().map_err(|_| unknown())?;
            if !(12..=21).contains(&total) {
                return Err(unknown());
            }
            return Ok(HandState::Soft(total));
        }
        let total: u8 = s.parse().map_err(|_| unknown())?;
        if !(2..=21).contains(&total) {
            return Err(unknown());
        }
        Ok(HandState::Hard(total))
    }
}

impl Serialize for HandState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HandState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Every ordered pair of cards from two independent full decks, bucketed by
/// `HandState`. Sampling uniformly from a bucket matches a uniform two-card deal
/// conditioned on that state.
///
/// Pairs whose plain total is only reachable after a split are also pooled under
/// that total.
#[derive(Debug, Clone)]
pub struct CombinationPools {
    pools: BTreeMap<HandState, Vec<(Card, Card)>>,
}

impl CombinationPools {
    pub fn new() -> CombinationPools {
        let mut pools: BTreeMap<HandState, Vec<(Card, Card)>> = BTreeMap::new();
        let deck: Vec<Card> = Suit::iter()
            .flat_map(|suit| (0..13).map(move |rank| Card::new(rank, suit)))
            .collect();
        for first in &deck {
            for second in &deck {
                let hand = [*first, *second];
                pools
                    .entry(HandState::classify(*first, *second))
                    .or_default()
                    .push((*first, *second));
                let by_total = HandState::from_total(&hand);
                if by_total.reachable_only_after_split() {
                    pools.entry(by_total).or_default().push((*first, *second));
                }
            }
        }
        CombinationPools { pools }
    }

    pub fn pool(&self, state: HandState) -> Result<&[(Card, Card)], OddsError> {
        self.pools
            .get(&state)
            .map(|pool| pool.as_slice())
            .ok_or(OddsError::EmptyCombinationPool(state))
    }

    pub fn sample<R: Rng + ?Sized>(
        &self,
        state: HandState,
        rng: &mut R,
    ) -> Result<(Card, Card), OddsError> {
        self.pool(state)?
            .choose(rng)
            .copied()
            .ok_or(OddsError::EmptyCombinationPool(state))
    }

    pub fn states(&self) -> impl Iterator<Item = HandState> + '_ {
        self.pools.keys().copied()
    }
}

impl Default for CombinationPools {
    fn default() -> Self {
        Self::new()
    }
}
