use super::hand::{is_blackjack, is_soft, score};
use super::shoe::Shoe;
use super::Card;
use crate::{OddsError, Rule};

/// Whether the dealer takes another card. The dealer always hits below 17 and hits a
/// soft 17 only under the corresponding rule.
pub fn dealer_hits(rule: &Rule, dealer_hand: &[Card]) -> bool {
    let total = score(dealer_hand);
    total < 17 || (total == 17 && rule.dealer_hits_soft_17 && is_soft(dealer_hand))
}

pub fn dealer_plays(
    rule: &Rule,
    dealer_hand: &mut Vec<Card>,
    shoe: &mut Shoe,
) -> Result<(), OddsError> {
    while dealer_hits(rule, dealer_hand) {
        dealer_hand.push(shoe.draw()?);
    }
    Ok(())
}

/// Plays out the dealer's hand from its two starting cards and settles a finished
/// player hand. Returns the payoff for one unit bet.
///
/// The dealer draws from the given shoe, so call this once per played hand.
/// With `ignore_dealer_blackjack`, a player blackjack is paid even against a dealer
/// blackjack.
pub fn evaluate(
    rule: &Rule,
    player_final_hand: &[Card],
    mut dealer_hand: Vec<Card>,
    shoe: &mut Shoe,
    ignore_dealer_blackjack: bool,
) -> Result<f64, OddsError> {
    dealer_plays(rule, &mut dealer_hand, shoe)?;

    if is_blackjack(player_final_hand) {
        if !ignore_dealer_blackjack && is_blackjack(&dealer_hand) {
            return Ok(0.0);
        }
        return Ok(rule.blackjack_payout);
    }

    let player_score = score(player_final_hand);
    let dealer_score = score(&dealer_hand);
    let payoff = if player_score > 21 {
        -1.0
    } else if dealer_score > 21 || player_score > dealer_score {
        1.0
    } else if player_score < dealer_score {
        -1.0
    } else {
        0.0
    };
    Ok(payoff)
}
