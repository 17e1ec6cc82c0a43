use anyhow::Context;
use blackjack_odds::calculation::SamplingConfig;
use blackjack_odds::{OddsError, PolicyRow, PolicyTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub odds_generator: ConfigOddsGenerator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub decks_in_shoe: u8,
    pub dealer_hits_soft_17: bool,
    pub double_after_split: bool,
    pub surrender_allowed: bool,
    pub blackjack_payout: f64,
    #[serde(default = "decisions_after_split_aces_by_default")]
    pub allow_decisions_after_split_aces: bool,
}

fn decisions_after_split_aces_by_default() -> bool {
    true
}

impl TryInto<blackjack_odds::Rule> for ConfigRule {
    type Error = OddsError;

    fn try_into(self) -> Result<blackjack_odds::Rule, Self::Error> {
        let rule = blackjack_odds::Rule {
            decks_in_shoe: self.decks_in_shoe,
            dealer_hits_soft_17: self.dealer_hits_soft_17,
            double_after_split: self.double_after_split,
            surrender_allowed: self.surrender_allowed,
            blackjack_payout: self.blackjack_payout,
            allow_decisions_after_split_aces: self.allow_decisions_after_split_aces,
        };
        rule.validate()?;

        Ok(rule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOddsGenerator {
    pub number_of_threads: usize,
    pub trials_per_state: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub ignore_dealer_blackjack: bool,
}

impl ConfigOddsGenerator {
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            trials: self.trials_per_state,
            number_of_threads: self.number_of_threads,
            seed: self.seed,
            ignore_dealer_blackjack: self.ignore_dealer_blackjack,
        }
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &Path) -> anyhow::Result<Config> {
    let file_content = fs::read_to_string(filename)
        .with_context(|| format!("cannot read config file {}", filename.display()))?;
    let config = serde_yaml::from_str(&file_content)
        .with_context(|| format!("cannot parse config file {}", filename.display()))?;
    Ok(config)
}

/// Loads a policy table saved by `write_policy_table`. Only complete tiers are
/// accepted.
pub fn read_policy_table(filename: &Path) -> anyhow::Result<PolicyTable> {
    let file_content = fs::read_to_string(filename)
        .with_context(|| format!("cannot read policy table {}", filename.display()))?;
    let rows: Vec<PolicyRow> = serde_yaml::from_str(&file_content)
        .with_context(|| format!("cannot parse policy table {}", filename.display()))?;
    let table = PolicyTable::from_rows(rows)
        .with_context(|| format!("policy table {} is inconsistent", filename.display()))?;
    Ok(table)
}

pub fn write_policy_table(filename: &Path, table: &PolicyTable) -> anyhow::Result<()> {
    let file_content = serde_yaml::to_string(&table.rows())?;
    fs::write(filename, file_content)
        .with_context(|| format!("cannot write policy table {}", filename.display()))?;
    Ok(())
}
