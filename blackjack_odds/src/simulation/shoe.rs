use super::{Card, Suit};
use crate::OddsError;

use strum::IntoEnumIterator;

use rand::seq::SliceRandom;
use rand::Rng;

/// Represents a shoe in the real world: several 52-card packs merged together and
/// drawn without replacement.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
    initial_size: usize,
    drawn_count: usize,
    removed_count: usize,
}

impl Shoe {
    /// Creates a new shoe with ordered cards.
    pub fn new(number_of_decks: u8) -> Shoe {
        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks {
            for suit in Suit::iter() {
                for rank in 0..13 {
                    cards.push(Card { rank, suit });
                }
            }
        }
        Self::from_cards(cards)
    }

    /// Creates a shoe holding exactly the given cards. The last card is drawn first.
    pub fn from_cards(cards: Vec<Card>) -> Shoe {
        Shoe {
            initial_size: cards.len(),
            cards,
            drawn_count: 0,
            removed_count: 0,
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Result<Card, OddsError> {
        let card = self.cards.pop().ok_or(OddsError::ShoeExhausted)?;
        self.drawn_count += 1;
        Ok(card)
    }

    /// Takes one instance of the given card out of the shoe.
    pub fn remove(&mut self, card: Card) -> Result<(), OddsError> {
        let index = self
            .cards
            .iter()
            .position(|c| *c == card)
            .ok_or(OddsError::CardNotInShoe(card))?;
        self.cards.remove(index);
        self.removed_count += 1;
        Ok(())
    }

    /// Takes out the first card of the given blackjack value (2 to 11) and returns it.
    pub fn remove_value(&mut self, value: u8) -> Result<Card, OddsError> {
        let index = self
            .cards
            .iter()
            .position(|c| c.value() == value)
            .ok_or(OddsError::NoCardOfValue(value))?;
        self.removed_count += 1;
        Ok(self.cards.remove(index))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn initial_size(&self) -> usize {
        self.initial_size
    }

    pub fn drawn_count(&self) -> usize {
        self.drawn_count
    }

    pub fn removed_count(&self) -> usize {
        self.removed_count
    }
}
