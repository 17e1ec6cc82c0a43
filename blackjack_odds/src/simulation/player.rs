use super::hand::score;
use super::outcome::evaluate;
use super::shoe::Shoe;
use super::Card;
use crate::strategy::{Diagnostics, Strategy};
use crate::{Decision, HandState, OddsError, Rule};

/// Plays a player hand to the end by following a strategy, then settles it against
/// the dealer.
pub struct PolicySimulator<'a, S: Strategy> {
    rule: &'a Rule,
    strategy: &'a S,
    diagnostics: &'a Diagnostics,
    ignore_dealer_blackjack: bool,
}

impl<'a, S: Strategy> PolicySimulator<'a, S> {
    pub fn new(rule: &'a Rule, strategy: &'a S, diagnostics: &'a Diagnostics) -> Self {
        PolicySimulator {
            rule,
            strategy,
            diagnostics,
            ignore_dealer_blackjack: false,
        }
    }

    pub fn ignore_dealer_blackjack(mut self, ignore: bool) -> Self {
        self.ignore_dealer_blackjack = ignore;
        self
    }

    /// Returns the payoff of the hand for one unit bet. After a split this is the
    /// sum of both sub-hands.
    ///
    /// The dealer's hole card is drawn from the shoe only once the player has
    /// finished.
    pub fn simulate(
        &self,
        player_cards: Vec<Card>,
        dealer_up_card: Card,
        shoe: &mut Shoe,
    ) -> Result<f64, OddsError> {
        self.play(player_cards, dealer_up_card, shoe, false)
    }

    /// Plays a two-card hand as one half of a split: it is keyed by total and may
    /// not split again.
    pub fn simulate_split_hand(
        &self,
        player_cards: Vec<Card>,
        dealer_up_card: Card,
        shoe: &mut Shoe,
    ) -> Result<f64, OddsError> {
        self.play(player_cards, dealer_up_card, shoe, true)
    }

    fn play(
        &self,
        mut hand: Vec<Card>,
        dealer_up_card: Card,
        shoe: &mut Shoe,
        after_split: bool,
    ) -> Result<f64, OddsError> {
        loop {
            let decision = self.decide(&hand, dealer_up_card, after_split)?;
            let multiplier = match decision {
                Decision::Stand => 1.0,
                Decision::Hit => {
                    hand.push(shoe.draw()?);
                    if score(&hand) <= 20 {
                        continue;
                    }
                    1.0
                }
                Decision::Double => {
                    hand.push(shoe.draw()?);
                    2.0
                }
                Decision::Split => {
                    let first = vec![hand[0], shoe.draw()?];
                    let second = vec![hand[1], shoe.draw()?];
                    let first = self.play(first, dealer_up_card, shoe, true)?;
                    let second = self.play(second, dealer_up_card, shoe, true)?;
                    return Ok(first + second);
                }
                Decision::Surrender => return Ok(-0.5),
            };

            let dealer_hand = vec![dealer_up_card, shoe.draw()?];
            let payoff = evaluate(
                self.rule,
                &hand,
                dealer_hand,
                shoe,
                self.ignore_dealer_blackjack,
            )?;
            return Ok(multiplier * payoff);
        }
    }

    fn decide(
        &self,
        hand: &[Card],
        dealer_up_card: Card,
        after_split: bool,
    ) -> Result<Decision, OddsError> {
        if score(hand) > 20 {
            return Ok(Decision::Stand);
        }
        if after_split && hand[0].is_ace() && !self.rule.allow_decisions_after_split_aces {
            return Ok(Decision::Stand);
        }

        let state = HandState::of_hand(hand, after_split);
        let up = dealer_up_card.value();
        let decision = match self.strategy.decision(state, up) {
            Some(decision) => decision,
            None => {
                self.diagnostics.record_missing_entry(state, up);
                Decision::Stand
            }
        };

        let illegal = || OddsError::IllegalDecision {
            decision,
            state: state.to_string(),
        };
        match decision {
            Decision::Split => {
                let is_pair = !after_split && hand.len() == 2 && hand[0].rank == hand[1].rank;
                if !is_pair {
                    return Err(illegal());
                }
            }
            Decision::Surrender => {
                if !self.rule.surrender_allowed || after_split || hand.len() != 2 {
                    return Err(illegal());
                }
            }
            Decision::Double if after_split && !self.rule.double_after_split => {
                return Ok(Decision::Hit);
            }
            _ => {}
        }
        Ok(decision)
    }
}
