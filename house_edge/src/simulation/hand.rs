use super::Card;

/// Returns the best total of the given cards together with the number of Aces
/// still counted as 11.
fn evaluate(cards: &[Card]) -> (u16, u8) {
    let mut total = 0;
    let mut usable_aces = 0;
    for card in cards {
        if card.is_ace() {
            usable_aces += 1;
        }
        total += card.blackjack_value();
    }

    // Demote one Ace at a time and re-check.
    while total > 21 && usable_aces > 0 {
        total -= 10;
        usable_aces -= 1;
    }

    (total, usable_aces)
}

/// Calculates the value of a blackjack hand. Every Ace starts at 11 and is
/// demoted to 1 only while the total is over 21.
pub fn hand_value(cards: &[Card]) -> u16 {
    evaluate(cards).0
}

pub fn is_bust(cards: &[Card]) -> bool {
    hand_value(cards) > 21
}

/// Exactly two cards totalling 21.
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards) == 21
}

/// Whether at least one Ace is still counted as 11.
pub fn is_soft(cards: &[Card]) -> bool {
    evaluate(cards).1 > 0
}

/// The cards dealt to one party. A hand only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(4),
        }
    }

    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn get_cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn value(&self) -> u16 {
        hand_value(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        is_bust(&self.cards)
    }

    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    pub fn is_soft(&self) -> bool {
        is_soft(&self.cards)
    }
}
