use super::Card;

/// Counts every Ace as 11, then re-values Aces down to 1 while the total exceeds 21.
/// Returns the total and how many Aces are still counted as 11.
fn reduce(hand: &[Card]) -> (u32, u32) {
    let mut total: u32 = hand.iter().map(|card| card.value() as u32).sum();
    let mut soft_aces = hand.iter().filter(|card| card.is_ace()).count() as u32;
    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    (total, soft_aces)
}

/// Best blackjack total of the hand. Exceeds 21 only when the hand busts even with
/// every Ace counted as 1.
pub fn score(hand: &[Card]) -> u32 {
    reduce(hand).0
}

/// Whether at least one Ace is still counted as 11 in the scored total.
pub fn is_soft(hand: &[Card]) -> bool {
    reduce(hand).1 > 0
}

pub fn is_blackjack(hand: &[Card]) -> bool {
    hand.len() == 2 && score(hand) == 21
}

pub fn is_bust(hand: &[Card]) -> bool {
    score(hand) > 21
}
