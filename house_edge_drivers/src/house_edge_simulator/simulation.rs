use std::path::Path;

use self::private::Statistics;
use house_edge::{GameOutcome, HandResult};
use house_edge_drivers::results::{self, Analysis, ChipSummary, DeckCountAnalysis};
use house_edge_drivers::{run_batch, BatchResult, BatchSettings, DriverError};

mod private {
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Statistics {
        current_money: i64,
        total_bet: u64,

        min_money: i64,
    }

    impl Statistics {
        pub fn bet_money(&mut self, money: u64) {
            self.total_bet += money;
        }

        pub fn receive_money(&mut self, delta: i64) {
            self.current_money += delta;
            if self.min_money > self.current_money {
                self.min_money = self.current_money;
            }
        }

        pub fn get_current_money(&self) -> i64 {
            self.current_money
        }

        pub fn get_total_bet(&self) -> u64 {
            self.total_bet
        }

        /// 0 when nothing was bet.
        pub fn get_rate(&self) -> f64 {
            if self.total_bet == 0 {
                0.0
            } else {
                self.current_money as f64 / self.total_bet as f64
            }
        }

        pub fn get_min_money(&self) -> i64 {
            self.min_money
        }
    }
}

fn summarize_chips(games: &[HandResult]) -> ChipSummary {
    let mut stat = Statistics::default();
    for game in games {
        stat.bet_money(game.stake);
        stat.receive_money(game.chip_delta);
    }
    ChipSummary {
        total_staked: stat.get_total_bet(),
        total_chip_delta: stat.get_current_money(),
        min_running_delta: stat.get_min_money(),
        house_edge: -stat.get_rate(),
    }
}

/// Counts cover every outcome in the results file, chips only this run.
fn analyze_batch(outcomes: &[GameOutcome], batch: &BatchResult) -> DeckCountAnalysis {
    DeckCountAnalysis::from_outcomes(outcomes).with_chips(summarize_chips(&batch.games))
}

fn print_summary(number_of_decks: u8, analysis: &DeckCountAnalysis) {
    print!(
        "{} deck(s): {} games. Win: {:.2}%. Loss: {:.2}%. Tie: {:.2}%.",
        number_of_decks,
        analysis.num_games,
        analysis.win_rate * 100.0,
        analysis.loss_rate * 100.0,
        analysis.tie_rate * 100.0,
    );
    if let Some(chips) = &analysis.chips {
        print!(
            " Money: {}. Total bet: {}. House edge: {:.2}%. Min money: {}.",
            chips.total_chip_delta,
            chips.total_staked,
            chips.house_edge * 100.0,
            chips.min_running_delta,
        );
    }
    println!();
}

/// Runs one batch per deck count, saving results (and game logs when asked)
/// after each, then the combined analysis. With `append_results` the files
/// keep the hands of earlier runs.
pub fn simulate_all_deck_counts(
    settings: &BatchSettings,
    deck_counts: &[u8],
    output_dir: &Path,
) -> Result<Analysis, DriverError> {
    let mut analysis = Analysis::new();
    for &number_of_decks in deck_counts {
        let batch = run_batch(settings, number_of_decks)?;
        if batch.skipped_hands > 0 {
            log::warn!(
                "{} hand(s) skipped with {} deck(s)",
                batch.skipped_hands,
                number_of_decks
            );
        }

        let outcomes = if settings.append_results {
            let outcomes = results::append_results(output_dir, number_of_decks, &batch.outcomes())?;
            log::info!(
                "results for {} deck(s) appended, {} games in total",
                number_of_decks,
                outcomes.len()
            );
            outcomes
        } else {
            let outcomes = batch.outcomes();
            let path = results::save_results(output_dir, number_of_decks, &outcomes)?;
            log::info!("results for {} deck(s) saved to {}", number_of_decks, path.display());
            outcomes
        };
        if settings.record_game_logs {
            if settings.append_results {
                let total =
                    results::append_game_logs(output_dir, number_of_decks, &batch.game_logs)?;
                log::info!(
                    "game logs for {} deck(s) appended, {} logs in total",
                    number_of_decks,
                    total
                );
            } else {
                let path =
                    results::save_game_logs(output_dir, number_of_decks, &batch.game_logs)?;
                log::info!("game logs for {} deck(s) saved to {}", number_of_decks, path.display());
            }
        }

        let deck_analysis = analyze_batch(&outcomes, &batch);
        print_summary(number_of_decks, &deck_analysis);
        analysis.insert(number_of_decks, deck_analysis);
    }

    let path = results::save_analysis(output_dir, &analysis)?;
    log::info!("analysis saved to {}", path.display());
    Ok(analysis)
}

/// Rebuilds `play_analysis_results.json` from result files of an earlier run.
pub fn analyze_only(deck_counts: &[u8], output_dir: &Path) -> Result<Analysis, DriverError> {
    let analysis = results::analyze_saved_results(output_dir, deck_counts)?;
    for (number_of_decks, deck_analysis) in &analysis {
        print_summary(*number_of_decks, deck_analysis);
    }
    let path = results::save_analysis(output_dir, &analysis)?;
    log::info!("analysis saved to {}", path.display());
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use house_edge::StrategyKind;
    use house_edge_drivers::HandErrorPolicy;
    use std::fs;

    fn settings() -> BatchSettings {
        BatchSettings {
            games_per_deck_count: 120,
            starting_chips: 1000,
            bet: 10,
            number_of_threads: 2,
            seed: Some(2024),
            strategy: StrategyKind::BasicStrategy,
            record_game_logs: true,
            append_results: false,
            on_hand_error: HandErrorPolicy::Abort,
        }
    }

    #[test]
    fn statistics_track_the_lowest_point() {
        let mut stat = Statistics::default();
        stat.bet_money(10);
        stat.receive_money(-10);
        stat.bet_money(20);
        stat.receive_money(-20);
        stat.bet_money(10);
        stat.receive_money(10);
        assert_eq!(stat.get_current_money(), -20);
        assert_eq!(stat.get_total_bet(), 40);
        assert_eq!(stat.get_min_money(), -30);
        assert_eq!(stat.get_rate(), -0.5);
        assert_eq!(Statistics::default().get_rate(), 0.0);
    }

    #[test]
    fn full_run_writes_every_file() {
        let dir = std::env::temp_dir().join(format!("house_edge_run_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let analysis = simulate_all_deck_counts(&settings(), &[1, 6], &dir).unwrap();
        assert_eq!(analysis.len(), 2);
        for number_of_decks in [1, 6] {
            assert!(results::results_path(&dir, number_of_decks).exists());
            assert!(results::game_logs_path(&dir, number_of_decks).exists());
            let deck_analysis = &analysis[&number_of_decks];
            assert_eq!(deck_analysis.num_games, 120);
            assert_eq!(
                deck_analysis.wins + deck_analysis.losses + deck_analysis.ties,
                120
            );
            let chips = deck_analysis.chips.unwrap();
            assert!(chips.total_staked >= 1200);
            assert!(chips.min_running_delta <= 0);
        }
        assert_eq!(results::load_analysis(&dir).unwrap(), analysis);

        // Re-analysis only knows the outcome counts.
        let rebuilt = analyze_only(&[1, 6], &dir).unwrap();
        for number_of_decks in [1, 6] {
            let mut expected = analysis[&number_of_decks].clone();
            expected.chips = None;
            assert_eq!(rebuilt[&number_of_decks], expected);
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn appending_runs_accumulate_in_the_files() {
        let dir = std::env::temp_dir().join(format!("house_edge_append_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut settings = settings();
        settings.append_results = true;
        simulate_all_deck_counts(&settings, &[2], &dir).unwrap();
        settings.seed = Some(2025);
        let analysis = simulate_all_deck_counts(&settings, &[2], &dir).unwrap();

        assert_eq!(results::load_results(&dir, 2).unwrap().len(), 240);
        assert_eq!(results::load_game_logs(&dir, 2).unwrap().len(), 240);
        assert_eq!(analysis[&2].num_games, 240);
        // The chip summary covers the latest run only.
        assert!(analysis[&2].chips.unwrap().total_staked < 2 * 1200);

        // Without appending the next run replaces the files.
        settings.append_results = false;
        simulate_all_deck_counts(&settings, &[2], &dir).unwrap();
        assert_eq!(results::load_results(&dir, 2).unwrap().len(), 120);

        fs::remove_dir_all(&dir).unwrap();
    }
}
