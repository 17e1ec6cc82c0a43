mod progress;

use std::path::PathBuf;

use anyhow::{bail, Context};
use blackjack_odds::calculation::{estimate_house_edge, generate_policy_table, tier_plan};
use blackjack_odds::{PolicyTable, Rule};
use blackjack_odds_drivers::{parse_config_from_file, read_policy_table, write_policy_table};
use clap::{Parser, Subcommand};

use self::progress::Progress;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_odds.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate the expectation of every first action and write the policy table
    Generate {
        /// Where to write the table. It is rewritten after every tier
        #[arg(short, long)]
        output: PathBuf,
        /// A table written by an earlier run; its complete tiers are kept
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Play whole rounds with a generated table and report the expected return
    HouseEdge {
        #[arg(short, long)]
        table: PathBuf,
        /// Number of rounds (overrides the config)
        #[arg(long)]
        trials: Option<u64>,
    },
}

fn resolve_config_path(config: &str) -> anyhow::Result<PathBuf> {
    if config != DEFAULT_CONFIG_PATH {
        return Ok(PathBuf::from(config));
    }
    let Some(home_dir) = home::home_dir() else {
        bail!("cannot find home directory");
    };
    let config_file_path = home_dir.join(".blackjack_odds.yml");
    if !config_file_path.exists() {
        bail!("config file {} does not exist", config_file_path.display());
    }
    if config_file_path.is_dir() {
        bail!("{} should be a file rather than a directory", config_file_path.display());
    }
    Ok(config_file_path)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandLineArgs::parse();
    let config_path = resolve_config_path(&args.config)?;
    let config = parse_config_from_file(&config_path)?;
    let rule: Rule = config.rule.try_into().context("invalid rule in config")?;
    let mut sampling = config.odds_generator.sampling();
    log::debug!("{:#?}", rule);

    match args.command {
        Command::Generate { output, resume } => {
            let table = match resume {
                Some(path) => read_policy_table(&path)?,
                None => PolicyTable::new(),
            };
            log::info!("starting from {} entries", table.len());
            // Fails early on an unwritable output path.
            write_policy_table(&output, &table)?;

            let mut progress = Progress::new(tier_plan(&rule).len(), output.clone());
            let table = generate_policy_table(&rule, &sampling, table, &mut progress)?;
            progress.finish();
            write_policy_table(&output, &table)?;
            log::info!("wrote {} entries to {}", table.len(), output.display());
        }
        Command::HouseEdge { table, trials } => {
            if let Some(trials) = trials {
                sampling.trials = trials;
            }
            let table = read_policy_table(&table)?;
            let house_edge = estimate_house_edge(&rule, &table, &sampling)?;
            if house_edge.missing_entries > 0 {
                log::warn!(
                    "{} lookups found no entry in the table and stood",
                    house_edge.missing_entries
                );
            }
            println!("Expectation is {:.5}", house_edge.expectation);
        }
    }
    Ok(())
}
