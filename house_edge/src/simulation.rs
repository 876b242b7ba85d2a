pub mod deck;
pub mod game_log;
pub mod hand;

use crate::{
    error::BlackjackError,
    strategy::{BasicStrategy, Strategy},
    Action, GameOutcome, Play,
};
use house_edge_macros::allowed_phase;
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use self::{deck::Deck, hand::Hand};

static RANK_TO_BLACKJACK_VALUE: [u16; 13] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10, 11];

/// The dealer draws until reaching this total and stands on every 17, soft or hard.
const DEALER_STAND_VALUE: u16 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum Suit {
    Hearts = 0,
    Diamonds,
    Clubs,
    Spades,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two = 0,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// Represents a card in the real world with a rank and a suit. The suit never
/// affects play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    /// Face cards count 10, an Ace counts 11 until the hand demotes it.
    pub fn blackjack_value(&self) -> u16 {
        RANK_TO_BLACKJACK_VALUE[self.rank as usize]
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit {
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
            Suit::Spades => 'S',
        };
        let value = match self.rank {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        };
        write!(f, "{}{}", suit, value)
    }
}

/// Position of the card inside one unshuffled deck.
impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.rank as u8 * 4 + card.suit as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Dealing,
    PlayerActing,
    DealerActing,
    Resolved,
}

/// Everything the orchestration layer needs to know about a finished hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub outcome: GameOutcome,
    pub final_chips: u64,
    /// `final_chips - starting_chips`. A doubled hand has already paid the
    /// original bet, so it ends on +bet, -bet or -3 x bet.
    pub chip_delta: i64,
    /// The bet at resolution time, twice the initial bet after a double.
    pub stake: u64,
    pub doubled: bool,
    pub player_cards: Vec<Card>,
    pub dealer_cards: Vec<Card>,
}

/// Simulates a single hand of blackjack against the dealer. The simulator owns
/// its deck for the whole hand; the deck is dropped with the simulator.
///
/// Each step is only callable in its own phase:
/// `Dealing -> PlayerActing -> (DealerActing ->) Resolved`. A player bust skips
/// the dealer turn entirely.
#[derive(Debug)]
pub struct HandSimulator {
    phase: RoundPhase,
    deck: Deck,
    starting_chips: u64,
    /// Balance before settlement. A double takes the original bet out of it.
    chips: u64,
    stake: u64,
    doubled: bool,
    player_hand: Hand,
    dealer_hand: Hand,
}

impl HandSimulator {
    pub fn new(deck: Deck, starting_chips: u64, bet: u64) -> Result<Self, BlackjackError> {
        if bet == 0 {
            return Err(BlackjackError::InvalidConfiguration(format!(
                "bet must be positive"
            )));
        }
        if bet > starting_chips {
            return Err(BlackjackError::InvalidConfiguration(format!(
                "bet {} exceeds the {} chips available",
                bet, starting_chips
            )));
        }
        Ok(Self {
            phase: RoundPhase::Dealing,
            deck,
            starting_chips,
            chips: starting_chips,
            stake: bet,
            doubled: false,
            player_hand: Hand::new(),
            dealer_hand: Hand::new(),
        })
    }

    /// Plays one hand with `BasicStrategy` and returns its result.
    pub fn play(deck: Deck, starting_chips: u64, bet: u64) -> Result<HandResult, BlackjackError> {
        let strategy = BasicStrategy::new();
        Self::play_with(deck, starting_chips, bet, &strategy, &mut ())
    }

    /// Plays one hand from the initial deal to the settlement, asking `strategy`
    /// for every player decision and reporting each step to `handler`.
    pub fn play_with<S, U>(
        deck: Deck,
        starting_chips: u64,
        bet: u64,
        strategy: &S,
        handler: &mut U,
    ) -> Result<HandResult, BlackjackError>
    where
        S: Strategy + ?Sized,
        U: SimulatorEventHandler,
    {
        let mut simulator = Self::new(deck, starting_chips, bet)?;
        simulator.deal_initial_cards()?;
        handler.on_deal_cards(simulator.player_cards(), simulator.dealer_cards());

        while let (RoundPhase::PlayerActing, Some(dealer_up_card)) =
            (simulator.phase, simulator.dealer_up_card())
        {
            let action = strategy.make_decision(simulator.player_cards(), dealer_up_card);
            let cards_before = simulator.player_hand.len();
            let play = simulator.apply_action(action)?;
            handler.on_make_decision(
                action,
                play,
                &simulator.player_cards()[..cards_before],
                simulator.dealer_cards(),
            );
        }

        if simulator.phase == RoundPhase::DealerActing {
            simulator.dealer_plays()?;
        } else {
            handler.on_player_bust(simulator.player_cards(), simulator.dealer_cards());
        }

        let result = simulator.into_result()?;
        handler.on_summary_game(&result);
        Ok(result)
    }

    /// Can be called at Dealing phase.
    /// Deals player, dealer, player, dealer. A natural 21 skips the player turn.
    #[allowed_phase(Dealing)]
    pub fn deal_initial_cards(&mut self) -> Result<(), BlackjackError> {
        for _ in 0..2 {
            let card = self.deck.deal()?;
            self.player_hand.receive_card(card);
            let card = self.deck.deal()?;
            self.dealer_hand.receive_card(card);
        }
        log::trace!(
            "dealt player {:?} ({}), dealer up card {}",
            self.player_hand.get_cards(),
            self.player_hand.value(),
            self.dealer_hand.get_cards()[0]
        );

        self.phase = RoundPhase::PlayerActing;
        if self.player_hand.value() >= 21 {
            self.finish_player_turn();
        }
        Ok(())
    }

    /// Can be called at PlayerActing phase.
    /// Applies a recommended action and returns what was actually played.
    /// The player turn ends on stand, double, surrender, or once the hand
    /// reaches 21 or more.
    #[allowed_phase(PlayerActing)]
    pub fn apply_action(&mut self, action: Action) -> Result<Play, BlackjackError> {
        let play = match action {
            Action::Hit => Play::Hit,
            Action::Stand => Play::Stand,
            Action::Double => {
                if self.can_double() {
                    Play::Double
                } else {
                    log::debug!(
                        "insufficient chips for double: {} chips against a bet of {}, hitting instead",
                        self.chips,
                        self.stake
                    );
                    Play::DoubleFallbackHit
                }
            }
            Action::Split => Play::SplitAsHit,
            Action::Surrender => Play::SurrenderAsStand,
        };
        log::trace!("recommended {:?}, playing {}", action, play.as_str());

        if play == Play::Double {
            self.chips -= self.stake;
            self.stake *= 2;
            self.doubled = true;
        }
        if play.draws_card() {
            let card = self.deck.deal()?;
            self.player_hand.receive_card(card);
        }

        let turn_over = matches!(play, Play::Stand | Play::Double | Play::SurrenderAsStand);
        if turn_over || self.player_hand.value() >= 21 {
            self.finish_player_turn();
        }
        Ok(play)
    }

    /// Can be called at DealerActing phase.
    /// The dealer draws below 17 and the hand is settled.
    #[allowed_phase(DealerActing)]
    pub fn dealer_plays(&mut self) -> Result<(), BlackjackError> {
        while self.dealer_hand.value() < DEALER_STAND_VALUE {
            let card = self.deck.deal()?;
            self.dealer_hand.receive_card(card);
        }

        log::trace!(
            "player {} against dealer {}: {}",
            self.player_hand.value(),
            self.dealer_hand.value(),
            self.outcome()
        );
        self.phase = RoundPhase::Resolved;
        Ok(())
    }

    /// Can be called at Resolved phase.
    #[allowed_phase(Resolved)]
    pub fn into_result(self) -> Result<HandResult, BlackjackError> {
        let outcome = self.outcome();
        let final_chips = self
            .chips
            .saturating_add_signed(outcome.chip_delta(self.stake));
        let chip_delta = final_chips as i64 - self.starting_chips as i64;
        Ok(HandResult {
            outcome,
            final_chips,
            chip_delta,
            stake: self.stake,
            doubled: self.doubled,
            player_cards: self.player_hand.into_cards(),
            dealer_cards: self.dealer_hand.into_cards(),
        })
    }

    pub fn get_phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn player_cards(&self) -> &[Card] {
        self.player_hand.get_cards()
    }

    pub fn dealer_cards(&self) -> &[Card] {
        self.dealer_hand.get_cards()
    }

    /// `None` before the initial deal.
    pub fn dealer_up_card(&self) -> Option<Card> {
        self.dealer_hand.get_cards().first().copied()
    }

    pub fn get_stake(&self) -> u64 {
        self.stake
    }

    pub fn remaining_cards(&self) -> usize {
        self.deck.remaining()
    }

    fn can_double(&self) -> bool {
        self.chips >= self.stake.saturating_mul(2)
    }

    fn finish_player_turn(&mut self) {
        if self.player_hand.is_bust() {
            log::trace!("player busts with {}", self.player_hand.value());
            self.phase = RoundPhase::Resolved;
        } else {
            self.phase = RoundPhase::DealerActing;
        }
    }

    /// A bust loses before the dealer plays; otherwise compare totals.
    fn outcome(&self) -> GameOutcome {
        if self.player_hand.is_bust() {
            return GameOutcome::Loss;
        }
        let player_value = self.player_hand.value();
        let dealer_value = self.dealer_hand.value();
        if dealer_value > 21 || player_value > dealer_value {
            GameOutcome::Win
        } else if player_value < dealer_value {
            GameOutcome::Loss
        } else {
            GameOutcome::Tie
        }
    }
}

/// Observes a hand while `HandSimulator::play_with` runs it. All methods default
/// to doing nothing.
pub trait SimulatorEventHandler {
    fn on_deal_cards(&mut self, _player_cards: &[Card], _dealer_cards: &[Card]) {}
    /// Called after each player decision with the player cards as they were
    /// when the decision was made.
    fn on_make_decision(
        &mut self,
        _action: Action,
        _play: Play,
        _player_cards: &[Card],
        _dealer_cards: &[Card],
    ) {
    }
    fn on_player_bust(&mut self, _player_cards: &[Card], _dealer_cards: &[Card]) {}
    fn on_summary_game(&mut self, _result: &HandResult) {}
}

impl SimulatorEventHandler for () {}
