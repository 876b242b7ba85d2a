use crate::error::BlackjackError;

use super::{Card, Rank, Suit};

use strum::IntoEnumIterator;

use rand::seq::SliceRandom;
use rand::Rng;

/// Represents the shoe for a single hand: `number_of_decks` standard decks.
/// Cards are dealt from the end of the sequence.
#[derive(Debug, Clone)]
pub struct Deck {
    number_of_decks: u8,
    cards: Vec<Card>,
}

impl Deck {
    /// Creates a new deck with ordered cards: rank by rank, each rank in every
    /// suit, repeated once per deck.
    pub fn new(number_of_decks: u8) -> Result<Deck, BlackjackError> {
        if number_of_decks == 0 {
            return Err(BlackjackError::InvalidConfiguration(format!(
                "number_of_decks must be at least 1"
            )));
        }

        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks {
            for rank in Rank::iter() {
                for suit in Suit::iter() {
                    cards.push(Card { rank, suit });
                }
            }
        }
        Ok(Deck {
            number_of_decks,
            cards,
        })
    }

    /// Creates a new deck and shuffles it with `rng`.
    pub fn shuffled<R: Rng + ?Sized>(
        number_of_decks: u8,
        rng: &mut R,
    ) -> Result<Deck, BlackjackError> {
        let mut deck = Deck::new(number_of_decks)?;
        deck.shuffle(rng);
        Ok(deck)
    }

    /// Uniformly permutes the remaining cards in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Deals the top card, or `EmptyDeck` when nothing is left.
    pub fn deal(&mut self) -> Result<Card, BlackjackError> {
        self.cards.pop().ok_or(BlackjackError::EmptyDeck)
    }

    /// Moves one card of each given rank to the top so that they are dealt in
    /// the given order. The deck keeps the same cards. Fails without touching
    /// the deck if a rank has run out.
    pub fn put_on_top(&mut self, firsts: &[Rank]) -> Result<(), BlackjackError> {
        let mut cards = self.cards.clone();
        let mut picked = Vec::with_capacity(firsts.len());
        for rank in firsts {
            let index = cards
                .iter()
                .rposition(|card| card.rank == *rank)
                .ok_or_else(|| {
                    BlackjackError::InvalidConfiguration(format!(
                        "no {:?} left in the deck",
                        rank
                    ))
                })?;
            picked.push(cards.remove(index));
        }
        cards.extend(picked.into_iter().rev());
        self.cards = cards;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn number_of_decks(&self) -> u8 {
        self.number_of_decks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn number_of_cards_is_correct(deck: &Deck) -> bool {
        let mut counts = [0 as u8; 52];
        for card in &deck.cards {
            let card_integer: u8 = (*card).into();
            counts[card_integer as usize] += 1;
        }

        counts.iter().all(|count| *count == deck.number_of_decks)
    }

    #[test]
    fn new_deck_is_ordered() {
        let number_of_decks = 3;
        let deck = Deck::new(number_of_decks).unwrap();
        assert!(number_of_cards_is_correct(&deck));
        assert_eq!(deck.remaining(), number_of_decks as usize * 52);
        assert_eq!(deck.cards[0], Card::new(Rank::Two, Suit::Hearts));
        assert_eq!(deck.cards[1], Card::new(Rank::Two, Suit::Diamonds));
        assert_eq!(deck.cards[51], Card::new(Rank::Ace, Suit::Spades));
        for (i, card) in deck.cards.iter().enumerate() {
            let card_integer: u8 = (*card).into();
            assert_eq!(card_integer as usize, i % 52);
        }
    }

    #[test]
    fn new_deck_is_deterministic() {
        let a = Deck::new(2).unwrap();
        let b = Deck::new(2).unwrap();
        assert_eq!(a.cards, b.cards);
    }

    #[test]
    fn zero_decks_is_rejected() {
        assert!(matches!(
            Deck::new(0),
            Err(BlackjackError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn deal_pops_from_the_end_until_empty() {
        let mut deck = Deck::new(1).unwrap();
        assert_eq!(deck.deal(), Ok(Card::new(Rank::Ace, Suit::Spades)));
        assert_eq!(deck.deal(), Ok(Card::new(Rank::Ace, Suit::Clubs)));
        for _ in 0..50 {
            assert!(deck.deal().is_ok());
        }
        assert!(deck.is_empty());
        assert_eq!(deck.deal(), Err(BlackjackError::EmptyDeck));
    }

    #[test]
    fn shuffle_keeps_every_card() {
        let mut deck = Deck::new(2).unwrap();
        deck.shuffle(&mut StdRng::seed_from_u64(1));
        assert!(number_of_cards_is_correct(&deck));
        assert_ne!(deck.cards, Deck::new(2).unwrap().cards);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let a = Deck::shuffled(6, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = Deck::shuffled(6, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a.cards, b.cards);
    }

    #[test]
    fn test_put_on_top() {
        let mut deck = Deck::shuffled(1, &mut StdRng::seed_from_u64(3)).unwrap();
        let firsts = [Rank::Ace, Rank::Two, Rank::Six, Rank::Six, Rank::Nine];
        deck.put_on_top(&firsts).unwrap();
        assert!(number_of_cards_is_correct(&deck));
        for rank in firsts {
            assert_eq!(deck.deal().unwrap().rank, rank);
        }
    }

    #[test]
    fn put_on_top_fails_when_rank_runs_out() {
        let mut deck = Deck::new(1).unwrap();
        let before = deck.cards.clone();
        let firsts = [Rank::Six; 5];
        assert!(deck.put_on_top(&firsts).is_err());
        assert_eq!(deck.cards, before);
    }
}
