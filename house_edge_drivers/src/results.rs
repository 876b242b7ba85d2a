use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use house_edge::{GameLogEntry, GameOutcome};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::DriverError;

pub const ANALYSIS_FILE_NAME: &str = "play_analysis_results.json";

pub fn results_path(output_dir: &Path, number_of_decks: u8) -> PathBuf {
    output_dir.join(format!("simulation_results_{}_decks.json", number_of_decks))
}

pub fn game_logs_path(output_dir: &Path, number_of_decks: u8) -> PathBuf {
    output_dir.join(format!("simulation_logs_{}_decks.json", number_of_decks))
}

pub fn analysis_path(output_dir: &Path) -> PathBuf {
    output_dir.join(ANALYSIS_FILE_NAME)
}

/// Chip movement over the hands of one run, each hand starting from the same
/// bankroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChipSummary {
    pub total_staked: u64,
    pub total_chip_delta: i64,
    /// Lowest running sum of chip deltas, 0 if it never went negative.
    pub min_running_delta: i64,
    /// Player loss per chip staked. Positive means the house wins.
    pub house_edge: f64,
}

/// Outcome counts and rates for one deck count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckCountAnalysis {
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
    pub num_games: u64,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub tie_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chips: Option<ChipSummary>,
}

impl DeckCountAnalysis {
    /// Rates are 0 when there are no games.
    pub fn from_outcomes(outcomes: &[GameOutcome]) -> Self {
        let (mut wins, mut losses, mut ties) = (0, 0, 0);
        for outcome in outcomes {
            match outcome {
                GameOutcome::Win => wins += 1,
                GameOutcome::Loss => losses += 1,
                GameOutcome::Tie => ties += 1,
            }
        }
        let num_games = outcomes.len() as u64;
        let rate = |count: u64| {
            if num_games == 0 {
                0.0
            } else {
                count as f64 / num_games as f64
            }
        };

        DeckCountAnalysis {
            wins,
            losses,
            ties,
            num_games,
            win_rate: rate(wins),
            loss_rate: rate(losses),
            tie_rate: rate(ties),
            chips: None,
        }
    }

    pub fn with_chips(mut self, chips: ChipSummary) -> Self {
        self.chips = Some(chips);
        self
    }
}

/// Keyed by deck count.
pub type Analysis = BTreeMap<u8, DeckCountAnalysis>;

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DriverError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| DriverError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DriverError> {
    let file = File::open(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Reads the list already at `path` (empty if there is no file), extends it with
/// `items` and writes it back. Returns the combined list.
fn append_json<T>(path: &Path, items: &[T]) -> Result<Vec<T>, DriverError>
where
    T: Serialize + DeserializeOwned + Clone,
{
    let mut existing: Vec<T> = if path.exists() {
        read_json(path)?
    } else {
        Vec::new()
    };
    existing.extend_from_slice(items);
    write_json(path, &existing)?;
    Ok(existing)
}

/// Writes the outcome of every hand as a JSON list of `"win"`, `"loss"` and
/// `"tie"` tags.
pub fn save_results(
    output_dir: &Path,
    number_of_decks: u8,
    outcomes: &[GameOutcome],
) -> Result<PathBuf, DriverError> {
    let path = results_path(output_dir, number_of_decks);
    write_json(&path, outcomes)?;
    Ok(path)
}

/// Appends to the results of earlier runs. Returns every outcome now in the file.
pub fn append_results(
    output_dir: &Path,
    number_of_decks: u8,
    outcomes: &[GameOutcome],
) -> Result<Vec<GameOutcome>, DriverError> {
    append_json(&results_path(output_dir, number_of_decks), outcomes)
}

pub fn load_results(output_dir: &Path, number_of_decks: u8) -> Result<Vec<GameOutcome>, DriverError> {
    read_json(&results_path(output_dir, number_of_decks))
}

pub fn save_game_logs(
    output_dir: &Path,
    number_of_decks: u8,
    game_logs: &[Vec<GameLogEntry>],
) -> Result<PathBuf, DriverError> {
    let path = game_logs_path(output_dir, number_of_decks);
    write_json(&path, game_logs)?;
    Ok(path)
}

/// Returns the number of game logs now in the file.
pub fn append_game_logs(
    output_dir: &Path,
    number_of_decks: u8,
    game_logs: &[Vec<GameLogEntry>],
) -> Result<usize, DriverError> {
    let all = append_json(&game_logs_path(output_dir, number_of_decks), game_logs)?;
    Ok(all.len())
}

pub fn load_game_logs(
    output_dir: &Path,
    number_of_decks: u8,
) -> Result<Vec<Vec<GameLogEntry>>, DriverError> {
    read_json(&game_logs_path(output_dir, number_of_decks))
}

pub fn save_analysis(output_dir: &Path, analysis: &Analysis) -> Result<PathBuf, DriverError> {
    let path = analysis_path(output_dir);
    write_json(&path, analysis)?;
    Ok(path)
}

pub fn load_analysis(output_dir: &Path) -> Result<Analysis, DriverError> {
    read_json(&analysis_path(output_dir))
}

/// Rebuilds the analysis from saved result files. Deck counts without a result
/// file are skipped with a warning.
pub fn analyze_saved_results(output_dir: &Path, deck_counts: &[u8]) -> Result<Analysis, DriverError> {
    let mut analysis = Analysis::new();
    for &number_of_decks in deck_counts {
        let path = results_path(output_dir, number_of_decks);
        if !path.exists() {
            log::warn!("no results for {} deck(s) at {}", number_of_decks, path.display());
            continue;
        }
        let outcomes = load_results(output_dir, number_of_decks)?;
        analysis.insert(number_of_decks, DeckCountAnalysis::from_outcomes(&outcomes));
    }
    Ok(analysis)
}
