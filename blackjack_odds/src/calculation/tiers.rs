use crate::{HandState, Rule};

/// The order in which hand states are computed.
///
/// Every state a hand can move into by drawing comes before it, so each tier only
/// reads entries of tiers already merged: hard totals from 20 down to 10, soft
/// totals from 20 down to 13, small hard totals, then pairs.
pub fn tier_plan(rule: &Rule) -> Vec<HandState> {
    let mut plan: Vec<HandState> = Vec::new();
    plan.extend((10..=20).rev().map(HandState::Hard));
    plan.extend((13..=20).rev().map(HandState::Soft));
    plan.extend((4..=9).rev().map(HandState::Hard));
    if rule.allow_decisions_after_split_aces {
        plan.push(HandState::Soft(12));
    }
    plan.extend((2..=10).rev().map(HandState::Pair));
    plan.push(HandState::PairAces);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CombinationPools;

    fn add_card(state: HandState, value: u8) -> HandState {
        match state {
            HandState::Hard(total) if value == 11 && total + 11 <= 21 => {
                HandState::Soft(total + 11)
            }
            HandState::Hard(total) if value == 11 => HandState::Hard(total + 1),
            HandState::Hard(total) => HandState::Hard(total + value),
            HandState::Soft(total) if value == 11 => add_card(HandState::Soft(total), 1),
            HandState::Soft(total) if total + value <= 21 => HandState::Soft(total + value),
            HandState::Soft(total) => HandState::Hard(total + value - 10),
            _ => unreachable!(),
        }
    }

    /// States looked up after the first action of `state`.
    fn successors(rule: &Rule, state: HandState) -> Vec<HandState> {
        let (hit_from, split_from) = match state {
            HandState::Pair(value) => (HandState::Hard(value * 2), Some(HandState::Hard(value))),
            HandState::PairAces if rule.allow_decisions_after_split_aces => {
                (HandState::Soft(12), Some(HandState::Soft(11)))
            }
            HandState::PairAces => (HandState::Soft(12), None),
            other => (other, None),
        };
        let mut next = Vec::new();
        for value in 2..=11 {
            next.push(add_card(hit_from, value));
            if let Some(split_from) = split_from {
                next.push(add_card(split_from, value));
            }
        }
        next.retain(|state| match state {
            HandState::Hard(total) | HandState::Soft(total) => *total <= 20,
            _ => false,
        });
        next
    }

    #[test]
    fn plan_covers_every_starting_category_once() {
        let plan = tier_plan(&Rule::default());
        assert_eq!(plan.len(), 11 + 8 + 6 + 1 + 9 + 1);
        assert!(plan.contains(&HandState::Soft(12)));
        let restricted = Rule {
            allow_decisions_after_split_aces: false,
            ..Default::default()
        };
        assert!(!tier_plan(&restricted).contains(&HandState::Soft(12)));
        assert_eq!(plan.first(), Some(&HandState::Hard(20)));
        assert_eq!(plan.last(), Some(&HandState::PairAces));
        let mut deduped = plan.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), plan.len());
    }

    #[test]
    fn every_planned_state_has_starting_hands() {
        let pools = CombinationPools::new();
        for state in tier_plan(&Rule::default()) {
            assert!(!pools.pool(state).unwrap().is_empty(), "{}", state);
        }
    }

    #[test]
    fn tiers_only_read_earlier_tiers() {
        for allow in [false, true] {
            let rule = Rule {
                allow_decisions_after_split_aces: allow,
                ..Default::default()
            };
            let plan = tier_plan(&rule);
            for (index, state) in plan.iter().enumerate() {
                for next in successors(&rule, *state) {
                    let position = plan.iter().position(|s| *s == next);
                    assert!(
                        matches!(position, Some(p) if p < index),
                        "{} reads {} which is not computed before it",
                        state,
                        next
                    );
                }
            }
        }
    }
}
