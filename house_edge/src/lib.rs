pub mod error;
pub mod simulation;
pub mod strategy;

use serde::{Deserialize, Serialize};

pub use error::BlackjackError;
pub use simulation::{
    deck::Deck,
    game_log::{GameLogEntry, GameLogRecorder},
    hand::{hand_value, is_blackjack, is_bust, is_soft, Hand},
    Card, HandResult, HandSimulator, Rank, RoundPhase, SimulatorEventHandler, Suit,
};
pub use strategy::{BasicStrategy, HitBelowSeventeen, Strategy, StrategyKind};

/// What a strategy recommends for the current hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

/// What the simulator actually did with a recommended `Action`.
///
/// Splitting and surrendering are not executed, and doubling needs enough chips
/// to cover a second stake. The fallback variants keep those cases apart from a
/// genuine hit or stand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Play {
    Hit,
    Stand,
    Double,
    DoubleFallbackHit,
    SplitAsHit,
    SurrenderAsStand,
}

impl Play {
    pub fn as_str(&self) -> &'static str {
        match self {
            Play::Hit => "hit",
            Play::Stand => "stand",
            Play::Double => "double",
            Play::DoubleFallbackHit => "double_fallback_hit",
            Play::SplitAsHit => "split_as_hit",
            Play::SurrenderAsStand => "surrender_as_stand",
        }
    }

    /// Whether this play draws a card for the player.
    pub fn draws_card(&self) -> bool {
        matches!(
            self,
            Play::Hit | Play::Double | Play::DoubleFallbackHit | Play::SplitAsHit
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
    Tie,
}

impl GameOutcome {
    /// The tag written to result files.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOutcome::Win => "win",
            GameOutcome::Loss => "loss",
            GameOutcome::Tie => "tie",
        }
    }

    /// Signed chip change for a hand settled at `stake`.
    pub fn chip_delta(&self, stake: u64) -> i64 {
        let stake = stake as i64;
        match self {
            GameOutcome::Win => stake,
            GameOutcome::Loss => -stake,
            GameOutcome::Tie => 0,
        }
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
