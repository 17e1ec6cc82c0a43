use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Decision, HandState, OddsError};

pub const DEALER_UP_CARD_VALUES: std::ops::RangeInclusive<u8> = 2..=11;

/// Estimated payoff of each first action for one (hand state, dealer up-card)
/// situation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub hit_ev: f64,
    pub double_ev: f64,
    pub stand_ev: f64,
    pub split_ev: Option<f64>,
    pub best_action: Decision,
}

impl PolicyEntry {
    pub fn from_expectations(
        hit_ev: f64,
        double_ev: f64,
        stand_ev: f64,
        split_ev: Option<f64>,
    ) -> Self {
        PolicyEntry {
            hit_ev,
            double_ev,
            stand_ev,
            split_ev,
            best_action: determine_best_action(hit_ev, double_ev, stand_ev, split_ev),
        }
    }
}

/// Picks the action with the greatest expectation.
///
/// Split must beat every other action strictly. Double must beat stand strictly
/// and wins a tie with hit. Hit must beat stand strictly.
pub fn determine_best_action(
    hit_ev: f64,
    double_ev: f64,
    stand_ev: f64,
    split_ev: Option<f64>,
) -> Decision {
    if let Some(split_ev) = split_ev {
        if split_ev > hit_ev && split_ev > double_ev && split_ev > stand_ev {
            return Decision::Split;
        }
    }
    if double_ev > stand_ev && double_ev >= hit_ev {
        Decision::Double
    } else if hit_ev > stand_ev {
        Decision::Hit
    } else {
        Decision::Stand
    }
}

/// One flattened table entry, the shape handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRow {
    pub state_key: HandState,
    pub dealer_up_card_value: u8,
    pub hit_ev: f64,
    pub double_ev: f64,
    pub stand_ev: f64,
    pub split_ev: Option<f64>,
    pub best_action: Decision,
}

/// Append-only map from (hand state, dealer up-card value) to `PolicyEntry`.
///
/// Entries arrive one tier at a time: a tier is every up-card of one hand state.
/// Entries are never replaced, and `version` counts the merged tiers.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: BTreeMap<(HandState, u8), PolicyEntry>,
    version: u32,
}

impl PolicyTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, state: HandState, dealer_up_card_value: u8) -> Option<&PolicyEntry> {
        self.entries.get(&(state, dealer_up_card_value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of up-card values recorded for the state.
    pub fn coverage(&self, state: HandState) -> usize {
        DEALER_UP_CARD_VALUES
            .filter(|up| self.entries.contains_key(&(state, *up)))
            .count()
    }

    pub fn contains_state(&self, state: HandState) -> bool {
        self.coverage(state) == DEALER_UP_CARD_VALUES.count()
    }

    /// Adds a complete tier. Fails without touching the table if the tier misses an
    /// up-card value or collides with an existing entry.
    pub fn merge_tier(
        &mut self,
        state: HandState,
        entries: Vec<(u8, PolicyEntry)>,
    ) -> Result<(), OddsError> {
        let mut tier: BTreeMap<u8, PolicyEntry> = BTreeMap::new();
        for (dealer_up_card_value, entry) in entries {
            if !DEALER_UP_CARD_VALUES.contains(&dealer_up_card_value) {
                return Err(OddsError::InvalidUpCard(dealer_up_card_value));
            }
            let duplicated = tier.insert(dealer_up_card_value, entry).is_some()
                || self.entries.contains_key(&(state, dealer_up_card_value));
            if duplicated {
                return Err(OddsError::DuplicateEntry {
                    state,
                    dealer_up_card_value,
                });
            }
        }
        if tier.len() != DEALER_UP_CARD_VALUES.count() {
            return Err(OddsError::PartialTier(state));
        }

        for (dealer_up_card_value, entry) in tier {
            self.entries.insert((state, dealer_up_card_value), entry);
        }
        self.version += 1;
        Ok(())
    }

    pub fn rows(&self) -> Vec<PolicyRow> {
        self.entries
            .iter()
            .map(|((state, up), entry)| PolicyRow {
                state_key: *state,
                dealer_up_card_value: *up,
                hit_ev: entry.hit_ev,
                double_ev: entry.double_ev,
                stand_ev: entry.stand_ev,
                split_ev: entry.split_ev,
                best_action: entry.best_action,
            })
            .collect()
    }

    /// Rebuilds a table from previously emitted rows, one tier per hand state.
    pub fn from_rows(rows: Vec<PolicyRow>) -> Result<PolicyTable, OddsError> {
        let mut tiers: BTreeMap<HandState, Vec<(u8, PolicyEntry)>> = BTreeMap::new();
        for row in rows {
            let entry = PolicyEntry {
                hit_ev: row.hit_ev,
                double_ev: row.double_ev,
                stand_ev: row.stand_ev,
                split_ev: row.split_ev,
                best_action: row.best_action,
            };
            tiers
                .entry(row.state_key)
                .or_default()
                .push((row.dealer_up_card_value, entry));
        }

        let mut table = PolicyTable::new();
        for (state, entries) in tiers {
            table.merge_tier(state, entries)?;
        }
        Ok(table)
    }
}
