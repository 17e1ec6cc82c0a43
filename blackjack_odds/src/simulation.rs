pub mod hand;
pub mod outcome;
pub mod player;
pub mod shoe;

use strum_macros::EnumIter;

use crate::OddsError;

pub const ACE: u8 = 12;
const RANK_CHARS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

/// Represents a card in the real world with a suit and a rank.
///
/// Ranks run from 0 (a Two) to 12 (an Ace); ranks 8 to 11 are the Ten and the
/// face cards, all worth 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    pub rank: u8,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: u8, suit: Suit) -> Card {
        debug_assert!(rank <= ACE, "rank out of range: {}", rank);
        Card { rank, suit }
    }

    /// Blackjack value with the Ace counted high.
    pub fn value(&self) -> u8 {
        if self.rank == ACE {
            11
        } else if self.rank >= 8 {
            10
        } else {
            self.rank + 2
        }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == ACE
    }

    /// Returns the Diamond card carrying the given blackjack value (2 to 11).
    /// A value of 10 maps to the Ten.
    pub fn from_value(value: u8) -> Result<Card, OddsError> {
        match value {
            2..=10 => Ok(Card::new(value - 2, Suit::Diamond)),
            11 => Ok(Card::new(ACE, Suit::Diamond)),
            _ => Err(OddsError::InvalidUpCard(value)),
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        };
        let rank = RANK_CHARS.get(self.rank as usize).copied().unwrap_or('?');
        write!(f, "{}{}", suit, rank)
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.suit as u8 * 13 + card.rank
    }
}

impl TryFrom<u8> for Card {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value >= 52 {
            return Err(());
        }
        let suit = match value / 13 {
            0 => Suit::Diamond,
            1 => Suit::Club,
            2 => Suit::Heart,
            _ => Suit::Spade,
        };
        Ok(Card {
            suit,
            rank: value % 13,
        })
    }
}
