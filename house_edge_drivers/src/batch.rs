use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use house_edge::{
    BlackjackError, Deck, GameLogEntry, GameLogRecorder, GameOutcome, HandResult, HandSimulator,
    Strategy, StrategyKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{DriverError, HandErrorPolicy};

const PROGRESS_INTERVAL: u64 = 100;

/// Validated settings shared by every batch of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub games_per_deck_count: u64,
    pub starting_chips: u64,
    pub bet: u64,
    pub number_of_threads: usize,
    pub seed: Option<u64>,
    pub strategy: StrategyKind,
    pub record_game_logs: bool,
    pub append_results: bool,
    pub on_hand_error: HandErrorPolicy,
}

/// Every hand played for one deck count, in game index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub number_of_decks: u8,
    pub seed: u64,
    pub games: Vec<HandResult>,
    /// Empty unless game logs were requested.
    pub game_logs: Vec<Vec<GameLogEntry>>,
    pub skipped_hands: u64,
}

impl BatchResult {
    pub fn outcomes(&self) -> Vec<GameOutcome> {
        self.games.iter().map(|game| game.outcome).collect()
    }
}

#[derive(Debug, Clone)]
struct GameRecord {
    result: HandResult,
    game_log: Option<Vec<GameLogEntry>>,
}

type IndexedGame = (u64, Result<GameRecord, BlackjackError>);

/// Seed of the deck for one game. Depends only on its inputs, so a batch gives
/// the same hands whatever the number of threads.
pub fn game_seed(base_seed: u64, number_of_decks: u8, game_index: u64) -> u64 {
    base_seed
        .wrapping_add(u64::from(number_of_decks).wrapping_mul(0xD1B5_4A32_D192_ED03))
        .wrapping_add(game_index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Plays `games_per_deck_count` independent hands, each on a freshly shuffled
/// deck of `number_of_decks` decks.
pub fn run_batch(settings: &BatchSettings, number_of_decks: u8) -> Result<BatchResult, DriverError> {
    let seed = match settings.seed {
        Some(seed) => seed,
        None => rand::thread_rng().gen(),
    };
    let total = settings.games_per_deck_count;
    log::info!(
        "simulating {} games with {} deck(s) on {} thread(s), seed {}",
        total,
        number_of_decks,
        settings.number_of_threads,
        seed
    );

    let strategy = settings.strategy.build();
    let mut progress = Progress::new(number_of_decks, total);
    let games = if settings.number_of_threads <= 1 || total <= 1 {
        let mut games = Vec::with_capacity(total as usize);
        for game_index in 0..total {
            let outcome = simulate_game(settings, &*strategy, number_of_decks, seed, game_index);
            let failed = outcome.is_err();
            games.push((game_index, outcome));
            progress.advance();
            if failed && settings.on_hand_error == HandErrorPolicy::Abort {
                break;
            }
        }
        games
    } else {
        run_worker_pool(settings, &*strategy, number_of_decks, seed, &mut progress)?
    };

    collect_games(number_of_decks, seed, settings.on_hand_error, games)
}

fn simulate_game<S>(
    settings: &BatchSettings,
    strategy: &S,
    number_of_decks: u8,
    base_seed: u64,
    game_index: u64,
) -> Result<GameRecord, BlackjackError>
where
    S: Strategy + ?Sized,
{
    let mut rng = StdRng::seed_from_u64(game_seed(base_seed, number_of_decks, game_index));
    let deck = Deck::shuffled(number_of_decks, &mut rng)?;

    if settings.record_game_logs {
        let mut recorder = GameLogRecorder::new();
        let result = HandSimulator::play_with(
            deck,
            settings.starting_chips,
            settings.bet,
            strategy,
            &mut recorder,
        )?;
        Ok(GameRecord {
            result,
            game_log: Some(recorder.take_game()),
        })
    } else {
        let result =
            HandSimulator::play_with(deck, settings.starting_chips, settings.bet, strategy, &mut ())?;
        Ok(GameRecord {
            result,
            game_log: None,
        })
    }
}

/// Worker `w` plays games `w, w + n, w + 2n, ...` and sends them back over a
/// channel. The receiving side puts them back in game index order. Under
/// `Abort`, the first failed hand stops every worker before its next game.
fn run_worker_pool(
    settings: &BatchSettings,
    strategy: &(dyn Strategy + Send + Sync),
    number_of_decks: u8,
    seed: u64,
    progress: &mut Progress,
) -> Result<Vec<IndexedGame>, DriverError> {
    let total = settings.games_per_deck_count;
    let number_of_threads = (settings.number_of_threads as u64).min(total).max(1);
    let (sender, receiver) = mpsc::channel::<IndexedGame>();
    let stop = AtomicBool::new(false);
    let stop = &stop;
    let abort_on_error = settings.on_hand_error == HandErrorPolicy::Abort;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(number_of_threads as usize);
        for worker in 0..number_of_threads {
            let sender = sender.clone();
            handles.push(scope.spawn(move || {
                let mut game_index = worker;
                while game_index < total && !stop.load(Ordering::Relaxed) {
                    let outcome =
                        simulate_game(settings, strategy, number_of_decks, seed, game_index);
                    if outcome.is_err() && abort_on_error {
                        stop.store(true, Ordering::Relaxed);
                    }
                    if sender.send((game_index, outcome)).is_err() {
                        break;
                    }
                    game_index += number_of_threads;
                }
            }));
        }
        drop(sender);

        let mut slots: Vec<Option<Result<GameRecord, BlackjackError>>> =
            (0..total).map(|_| None).collect();
        for (game_index, outcome) in receiver {
            slots[game_index as usize] = Some(outcome);
            progress.advance();
        }

        for handle in handles {
            handle.join().map_err(|_| DriverError::WorkerPanicked)?;
        }

        Ok(slots
            .into_iter()
            .enumerate()
            .filter_map(|(game_index, slot)| slot.map(|outcome| (game_index as u64, outcome)))
            .collect())
    })
}

fn collect_games(
    number_of_decks: u8,
    seed: u64,
    policy: HandErrorPolicy,
    games: Vec<IndexedGame>,
) -> Result<BatchResult, DriverError> {
    let mut batch = BatchResult {
        number_of_decks,
        seed,
        ..Default::default()
    };

    for (game_index, outcome) in games {
        match outcome {
            Ok(record) => {
                if let Some(game_log) = record.game_log {
                    batch.game_logs.push(game_log);
                }
                batch.games.push(record.result);
            }
            Err(source) => match policy {
                HandErrorPolicy::Abort => {
                    return Err(DriverError::Hand {
                        number_of_decks,
                        game_index,
                        source,
                    })
                }
                HandErrorPolicy::Skip => {
                    log::warn!(
                        "skipping hand #{} with {} deck(s): {}",
                        game_index,
                        number_of_decks,
                        source
                    );
                    batch.skipped_hands += 1;
                }
            },
        }
    }

    Ok(batch)
}

struct Progress {
    number_of_decks: u8,
    total: u64,
    done: u64,
}

impl Progress {
    fn new(number_of_decks: u8, total: u64) -> Self {
        Progress {
            number_of_decks,
            total,
            done: 0,
        }
    }

    fn advance(&mut self) {
        self.done += 1;
        if self.done % PROGRESS_INTERVAL == 0 || self.done == self.total {
            log::info!(
                "{} deck(s): {}/{} games played",
                self.number_of_decks,
                self.done,
                self.total
            );
        }
    }
}
