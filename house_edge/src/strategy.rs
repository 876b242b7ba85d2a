use crate::{
    simulation::{hand::hand_value, Card},
    Action,
};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

pub trait Strategy {
    fn make_decision(&self, player_cards: &[Card], dealer_up_card: Card) -> Action;
}

impl<T: Strategy + ?Sized> Strategy for Box<T> {
    fn make_decision(&self, player_cards: &[Card], dealer_up_card: Card) -> Action {
        (**self).make_decision(player_cards, dealer_up_card)
    }
}

/// Strategies selectable by name from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_enum_str, Deserialize_enum_str)]
pub enum StrategyKind {
    BasicStrategy,
    HitBelowSeventeen,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn Strategy + Send + Sync> {
        match self {
            StrategyKind::BasicStrategy => Box::new(BasicStrategy::new()),
            StrategyKind::HitBelowSeventeen => Box::new(HitBelowSeventeen),
        }
    }
}

/// Fixed basic strategy. Columns are the dealer up card from 2 to Ace.
///
/// Pairs are looked up first, then any hand holding an Ace with a total from 13
/// to 20, then the hard total.
#[derive(Debug, Clone)]
pub struct BasicStrategy {
    hard_charts: [[Action; 10]; 10],
    soft_charts: [[Action; 10]; 8],
    pair_charts: [[Action; 10]; 13],
}

impl BasicStrategy {
    pub fn new() -> BasicStrategy {
        const H: Action = Action::Hit;
        const S: Action = Action::Stand;
        const D: Action = Action::Double;
        const P: Action = Action::Split;

        BasicStrategy {
            hard_charts: [
                [H, H, H, H, H, H, H, H, H, H], // 8 or less
                [H, D, D, D, D, H, H, H, H, H], // 9
                [D, D, D, D, D, D, D, D, H, H],
                [D, D, D, D, D, D, D, D, D, D],
                [H, H, S, S, S, H, H, H, H, H], // 12
                [S, S, S, S, S, H, H, H, H, H],
                [S, S, S, S, S, H, H, H, H, H],
                [S, S, S, S, S, H, H, H, H, H],
                [S, S, S, S, S, H, H, H, H, H], // 16
                [S, S, S, S, S, S, S, S, S, S], // 17+
            ],
            soft_charts: [
                [H, H, H, D, D, H, H, H, H, H], // 13
                [H, H, H, D, D, H, H, H, H, H],
                [H, H, D, D, D, H, H, H, H, H],
                [H, H, D, D, D, H, H, H, H, H],
                [H, D, D, D, D, H, H, H, H, H], // 17
                [D, D, D, D, D, S, S, H, H, H],
                [S, S, S, S, D, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S], // 20
            ],
            pair_charts: [
                [P, P, P, P, P, P, H, H, H, H], // Double 2
                [P, P, P, P, P, P, H, H, H, H],
                [H, H, H, P, P, H, H, H, H, H],
                [D, D, D, D, D, D, D, D, H, H],
                [P, P, P, P, P, H, H, H, H, H],
                [P, P, P, P, P, P, H, H, H, H],
                [P, P, P, P, P, P, P, P, P, P], // Double 8
                [P, P, P, P, P, S, P, P, S, S],
                [S, S, S, S, S, S, S, S, S, S], // Double 10
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S],
                [S, S, S, S, S, S, S, S, S, S], // Double K
                [P, P, P, P, P, P, P, P, P, P], // Double Ace
            ],
        }
    }
}

impl Default for BasicStrategy {
    fn default() -> Self {
        BasicStrategy::new()
    }
}

impl Strategy for BasicStrategy {
    fn make_decision(&self, player_cards: &[Card], dealer_up_card: Card) -> Action {
        let col = (hand_value(&[dealer_up_card]) - 2) as usize;

        if player_cards.len() == 2 && player_cards[0].rank == player_cards[1].rank {
            // Pair
            let row = player_cards[0].rank as usize;
            return self.pair_charts[row][col];
        }

        let total = hand_value(player_cards);
        // Any Ace routes here, even one already counted as 1.
        if player_cards.iter().any(Card::is_ace) && (13..=20).contains(&total) {
            let row = (total - 13) as usize;
            return self.soft_charts[row][col];
        }

        let row = match total {
            0..=8 => 0,
            9..=16 => total - 8,
            _ => 9,
        } as usize;
        self.hard_charts[row][col]
    }
}

/// Hits any total below 17 and stands otherwise, whatever the dealer shows.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitBelowSeventeen;

impl Strategy for HitBelowSeventeen {
    fn make_decision(&self, player_cards: &[Card], _dealer_up_card: Card) -> Action {
        if hand_value(player_cards) < 17 {
            Action::Hit
        } else {
            Action::Stand
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Rank, Suit};

    use crate::Action::*;

    const DEALER_RANKS: [Rank; 10] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Ace,
    ];

    fn hand(ranks: &[Rank]) -> Vec<Card> {
        let suits = [Suit::Hearts, Suit::Spades, Suit::Clubs, Suit::Diamonds];
        ranks
            .iter()
            .zip(suits.iter().cycle())
            .map(|(rank, suit)| Card::new(*rank, *suit))
            .collect()
    }

    fn up(rank: Rank) -> Card {
        Card::new(rank, Suit::Clubs)
    }

    /// Decisions against dealer 2, 3, ..., 10, Ace.
    fn row(strategy: &BasicStrategy, ranks: &[Rank]) -> Vec<Action> {
        let cards = hand(ranks);
        DEALER_RANKS
            .iter()
            .map(|dealer| strategy.make_decision(&cards, up(*dealer)))
            .collect()
    }

    #[test]
    fn pair_of_eights_against_six_splits() {
        let strategy = BasicStrategy::new();
        let decision = strategy.make_decision(&hand(&[Rank::Eight, Rank::Eight]), up(Rank::Six));
        assert_eq!(decision, Split);
    }

    #[test]
    fn soft_nineteen_against_six_doubles() {
        let strategy = BasicStrategy::new();
        let decision = strategy.make_decision(&hand(&[Rank::Ace, Rank::Eight]), up(Rank::Six));
        assert_eq!(decision, Double);
        let decision = strategy.make_decision(&hand(&[Rank::Ace, Rank::Eight]), up(Rank::Five));
        assert_eq!(decision, Stand);
    }

    #[test]
    fn pair_rows() {
        let s = BasicStrategy::new();
        assert_eq!(row(&s, &[Rank::Ace, Rank::Ace]), vec![Split; 10]);
        assert_eq!(row(&s, &[Rank::Ten, Rank::Ten]), vec![Stand; 10]);
        assert_eq!(row(&s, &[Rank::Queen, Rank::Queen]), vec![Stand; 10]);
        assert_eq!(
            row(&s, &[Rank::Nine, Rank::Nine]),
            vec![Split, Split, Split, Split, Split, Stand, Split, Split, Stand, Stand]
        );
        assert_eq!(row(&s, &[Rank::Eight, Rank::Eight]), vec![Split; 10]);
        assert_eq!(
            row(&s, &[Rank::Seven, Rank::Seven]),
            vec![Split, Split, Split, Split, Split, Split, Hit, Hit, Hit, Hit]
        );
        assert_eq!(
            row(&s, &[Rank::Six, Rank::Six]),
            vec![Split, Split, Split, Split, Split, Hit, Hit, Hit, Hit, Hit]
        );
        assert_eq!(
            row(&s, &[Rank::Five, Rank::Five]),
            vec![Double, Double, Double, Double, Double, Double, Double, Double, Hit, Hit]
        );
        assert_eq!(
            row(&s, &[Rank::Four, Rank::Four]),
            vec![Hit, Hit, Hit, Split, Split, Hit, Hit, Hit, Hit, Hit]
        );
        for pair in [Rank::Two, Rank::Three] {
            assert_eq!(
                row(&s, &[pair, pair]),
                vec![Split, Split, Split, Split, Split, Split, Hit, Hit, Hit, Hit]
            );
        }
    }

    #[test]
    fn mixed_ten_values_are_not_a_pair() {
        let s = BasicStrategy::new();
        // Hard 20 stands anyway.
        assert_eq!(row(&s, &[Rank::King, Rank::Queen]), vec![Stand; 10]);
    }

    #[test]
    fn soft_rows() {
        let s = BasicStrategy::new();
        assert_eq!(row(&s, &[Rank::Ace, Rank::Nine]), vec![Stand; 10]);
        assert_eq!(
            row(&s, &[Rank::Ace, Rank::Seven]),
            vec![Double, Double, Double, Double, Double, Stand, Stand, Hit, Hit, Hit]
        );
        assert_eq!(
            row(&s, &[Rank::Ace, Rank::Six]),
            vec![Hit, Double, Double, Double, Double, Hit, Hit, Hit, Hit, Hit]
        );
        for other in [Rank::Four, Rank::Five] {
            assert_eq!(
                row(&s, &[Rank::Ace, other]),
                vec![Hit, Hit, Double, Double, Double, Hit, Hit, Hit, Hit, Hit]
            );
        }
        for other in [Rank::Two, Rank::Three] {
            assert_eq!(
                row(&s, &[Rank::Ace, other]),
                vec![Hit, Hit, Hit, Double, Double, Hit, Hit, Hit, Hit, Hit]
            );
        }
    }

    #[test]
    fn hand_with_demoted_ace_still_uses_soft_chart() {
        let s = BasicStrategy::new();
        // Ace + 5 + 9 is a hard 15 but holds an Ace.
        assert_eq!(
            row(&s, &[Rank::Ace, Rank::Five, Rank::Nine]),
            vec![Hit, Hit, Double, Double, Double, Hit, Hit, Hit, Hit, Hit]
        );
    }

    #[test]
    fn soft_twelve_falls_through_to_hard_chart() {
        let s = BasicStrategy::new();
        // Ace + Ace + Ten is 12.
        assert_eq!(
            row(&s, &[Rank::Ace, Rank::Ten, Rank::Ace]),
            vec![Hit, Hit, Stand, Stand, Stand, Hit, Hit, Hit, Hit, Hit]
        );
    }

    #[test]
    fn hard_rows() {
        let s = BasicStrategy::new();
        assert_eq!(row(&s, &[Rank::Ten, Rank::Seven]), vec![Stand; 10]);
        assert_eq!(row(&s, &[Rank::Ten, Rank::Six, Rank::Five]), vec![Stand; 10]);
        for ranks in [
            [Rank::Ten, Rank::Three],
            [Rank::Ten, Rank::Four],
            [Rank::Ten, Rank::Five],
            [Rank::Ten, Rank::Six],
        ] {
            assert_eq!(
                row(&s, &ranks),
                vec![Stand, Stand, Stand, Stand, Stand, Hit, Hit, Hit, Hit, Hit]
            );
        }
        assert_eq!(
            row(&s, &[Rank::Ten, Rank::Two]),
            vec![Hit, Hit, Stand, Stand, Stand, Hit, Hit, Hit, Hit, Hit]
        );
        assert_eq!(row(&s, &[Rank::Nine, Rank::Two]), vec![Double; 10]);
        assert_eq!(
            row(&s, &[Rank::Six, Rank::Four]),
            vec![Double, Double, Double, Double, Double, Double, Double, Double, Hit, Hit]
        );
        assert_eq!(
            row(&s, &[Rank::Six, Rank::Three]),
            vec![Hit, Double, Double, Double, Double, Hit, Hit, Hit, Hit, Hit]
        );
        assert_eq!(row(&s, &[Rank::Five, Rank::Three]), vec![Hit; 10]);
        assert_eq!(row(&s, &[Rank::Two, Rank::Three]), vec![Hit; 10]);
    }

    #[test]
    fn decision_is_deterministic() {
        let s = BasicStrategy::new();
        let cards = hand(&[Rank::Ten, Rank::Six]);
        let first = s.make_decision(&cards, up(Rank::Nine));
        assert_eq!(first, s.make_decision(&cards, up(Rank::Nine)));
    }

    #[test]
    fn hit_below_seventeen() {
        let s = HitBelowSeventeen;
        assert_eq!(s.make_decision(&hand(&[Rank::Ten, Rank::Six]), up(Rank::Six)), Hit);
        assert_eq!(s.make_decision(&hand(&[Rank::Ten, Rank::Seven]), up(Rank::Ace)), Stand);
        assert_eq!(s.make_decision(&hand(&[Rank::Ace, Rank::Six]), up(Rank::Two)), Stand);
    }

    #[test]
    fn strategy_kind_parses_and_builds() {
        let kind: StrategyKind = "HitBelowSeventeen".parse().unwrap();
        assert_eq!(kind, StrategyKind::HitBelowSeventeen);
        assert!("NotAStrategy".parse::<StrategyKind>().is_err());
        let boxed = StrategyKind::BasicStrategy.build();
        let decision = boxed.make_decision(&hand(&[Rank::Eight, Rank::Eight]), up(Rank::Ten));
        assert_eq!(decision, Split);
    }
}
