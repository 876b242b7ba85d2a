use serde::{Deserialize, Serialize};

use super::{hand::is_bust, Card, HandResult, SimulatorEventHandler};
use crate::{Action, GameOutcome, Play};

/// One step of a played hand: both hands as they were, and what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLogEntry {
    pub player_hand: Vec<Card>,
    pub dealer_hand: Vec<Card>,
    pub action: String,
}

impl GameLogEntry {
    fn new(player_hand: &[Card], dealer_hand: &[Card], action: &str) -> Self {
        GameLogEntry {
            player_hand: player_hand.to_vec(),
            dealer_hand: dealer_hand.to_vec(),
            action: action.to_string(),
        }
    }
}

/// Records the step-by-step log of every hand it observes. Call `take_game` after
/// each hand to collect that hand's entries.
#[derive(Debug, Clone, Default)]
pub struct GameLogRecorder {
    entries: Vec<GameLogEntry>,
}

impl GameLogRecorder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn entries(&self) -> &[GameLogEntry] {
        &self.entries
    }

    pub fn take_game(&mut self) -> Vec<GameLogEntry> {
        std::mem::take(&mut self.entries)
    }
}

impl SimulatorEventHandler for GameLogRecorder {
    fn on_deal_cards(&mut self, player_cards: &[Card], dealer_cards: &[Card]) {
        self.entries
            .push(GameLogEntry::new(player_cards, dealer_cards, "initial_deal"));
    }

    fn on_make_decision(
        &mut self,
        _action: Action,
        play: Play,
        player_cards: &[Card],
        dealer_cards: &[Card],
    ) {
        self.entries
            .push(GameLogEntry::new(player_cards, dealer_cards, play.as_str()));
    }

    fn on_player_bust(&mut self, player_cards: &[Card], dealer_cards: &[Card]) {
        self.entries
            .push(GameLogEntry::new(player_cards, dealer_cards, "bust"));
    }

    fn on_summary_game(&mut self, result: &HandResult) {
        let (player, dealer) = (&result.player_cards, &result.dealer_cards);
        if is_bust(player) {
            return;
        }
        self.entries
            .push(GameLogEntry::new(player, dealer, "final_hands"));
        let closing = match result.outcome {
            GameOutcome::Win if is_bust(dealer) => "dealer_bust",
            outcome => outcome.as_str(),
        };
        self.entries.push(GameLogEntry::new(player, dealer, closing));
    }
}
