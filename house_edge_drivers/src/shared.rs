pub mod batch;
pub mod results;

use house_edge::{BlackjackError, StrategyKind};
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub use batch::{run_batch, BatchResult, BatchSettings};

/// Largest shoe the simulator is meant to explore.
pub const MAX_NUMBER_OF_DECKS: u8 = 8;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Blackjack(#[from] BlackjackError),
    #[error("hand #{game_index} with {number_of_decks} deck(s) failed: {source}")]
    Hand {
        number_of_decks: u8,
        game_index: u64,
        #[source]
        source: BlackjackError,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("cannot read or write results: {0}")]
    Json(#[from] serde_json::Error),
    #[error("a simulation worker thread panicked")]
    WorkerPanicked,
}

/// What a batch does with a hand that fails, e.g. on an exhausted deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_enum_str, Deserialize_enum_str)]
pub enum HandErrorPolicy {
    Abort,
    Skip,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: ConfigSimulation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSimulation {
    pub deck_counts: Vec<u8>,
    pub games_per_deck_count: u64,
    pub starting_chips: u64,
    pub bet: u64,
    /// 0 means one thread per available core.
    pub number_of_threads: usize,
    pub seed: Option<u64>,
    pub strategy: String,
    pub output_dir: String,
    pub record_game_logs: bool,
    /// Extend result and log files from earlier runs instead of replacing them.
    pub append_results: bool,
    pub on_hand_error: String,
}

impl Default for ConfigSimulation {
    fn default() -> Self {
        ConfigSimulation {
            deck_counts: vec![1, 2, 6, 7, 8],
            games_per_deck_count: 1000,
            starting_chips: 1000,
            bet: 10,
            number_of_threads: 1,
            seed: None,
            strategy: String::from("BasicStrategy"),
            output_dir: String::from("./results"),
            record_game_logs: false,
            append_results: false,
            on_hand_error: String::from("Abort"),
        }
    }
}

impl TryInto<BatchSettings> for ConfigSimulation {
    type Error = DriverError;

    fn try_into(self) -> Result<BatchSettings, Self::Error> {
        if self.deck_counts.is_empty() {
            return Err(DriverError::InvalidConfig(format!(
                "deck_counts must name at least one shoe size"
            )));
        }
        if let Some(n) = self
            .deck_counts
            .iter()
            .find(|n| **n == 0 || **n > MAX_NUMBER_OF_DECKS)
        {
            return Err(DriverError::InvalidConfig(format!(
                "deck count {} is outside 1..={}",
                n, MAX_NUMBER_OF_DECKS
            )));
        }
        if self.bet == 0 {
            return Err(DriverError::InvalidConfig(format!("bet must be positive")));
        }
        if self.bet > self.starting_chips {
            return Err(DriverError::InvalidConfig(format!(
                "bet {} exceeds starting_chips {}",
                self.bet, self.starting_chips
            )));
        }

        let strategy: StrategyKind = self.strategy.parse().map_err(|e| {
            DriverError::InvalidConfig(format!("unknown strategy {:?}: {}", self.strategy, e))
        })?;
        let on_hand_error: HandErrorPolicy = self.on_hand_error.parse().map_err(|e| {
            DriverError::InvalidConfig(format!(
                "unknown on_hand_error {:?}: {}",
                self.on_hand_error, e
            ))
        })?;

        let number_of_threads = {
            if self.number_of_threads == 0 {
                match std::thread::available_parallelism() {
                    Ok(n) => n.get(),
                    Err(_) => 1,
                }
            } else {
                self.number_of_threads
            }
        };

        Ok(BatchSettings {
            games_per_deck_count: self.games_per_deck_count,
            starting_chips: self.starting_chips,
            bet: self.bet,
            number_of_threads,
            seed: self.seed,
            strategy,
            record_game_logs: self.record_game_logs,
            append_results: self.append_results,
            on_hand_error,
        })
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> Result<Config, DriverError> {
    let file_content = fs::read_to_string(filename).map_err(|source| DriverError::Io {
        path: PathBuf::from(filename),
        source,
    })?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> Result<Config, DriverError> {
    Ok(serde_yaml::from_str(content)?)
}
