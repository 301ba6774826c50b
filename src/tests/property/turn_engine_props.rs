//! Property-based tests for the turn engine
//!
//! Tests invariants:
//! - A full cycle of advances adds exactly one round and returns to the top
//! - Retreat right after advance restores pointer, round and every duration
//! - Round stays in [1, ROUND_MAX] and the pointer stays valid

use proptest::prelude::*;

use super::{apply, arb_condition, arb_op, roster};
use crate::core::session::{CombatSession, ROUND_MAX};

fn durations(session: &CombatSession) -> Vec<Vec<u32>> {
    session
        .encounter()
        .combatants()
        .iter()
        .map(|c| c.conditions.iter().map(|cond| cond.remaining).collect())
        .collect()
}

proptest! {
    #[test]
    fn full_cycle_adds_one_round(size in 1usize..8, start in 0usize..8, round in 1u32..50) {
        let (mut session, ids) = roster(size);
        for _ in 1..round {
            for _ in 0..size {
                session.advance_turn();
            }
        }
        let start = start % size;
        session.set_active(&ids[start]);
        let before = session.encounter().round();

        for _ in 0..size {
            session.advance_turn();
        }

        prop_assert_eq!(session.encounter().active_id(), Some(&ids[start]));
        prop_assert_eq!(session.encounter().round(), (before + 1).min(ROUND_MAX));
    }

    #[test]
    fn retreat_undoes_advance(
        size in 1usize..6,
        steps in 0usize..20,
        conds in prop::collection::vec((0usize..6, arb_condition(), 0i64..5), 0..8),
    ) {
        let (mut session, ids) = roster(size);
        for (who, name, duration) in conds {
            session.add_condition(&ids[who % size], name, Some(duration)).unwrap();
        }
        for _ in 0..steps {
            session.advance_turn();
        }
        let round = session.encounter().round();
        let active = session.encounter().active_id().cloned();

        session.advance_turn();
        let after_advance = durations(&session);
        session.retreat_turn();

        prop_assert_eq!(session.encounter().active_id().cloned(), active);
        prop_assert_eq!(session.encounter().round(), round);
        prop_assert_eq!(durations(&session), after_advance);
    }

    #[test]
    fn round_and_pointer_stay_valid(ops in prop::collection::vec(arb_op(), 0..120)) {
        let (mut session, _) = roster(4);
        for op in &ops {
            apply(&mut session, op);

            let encounter = session.encounter();
            prop_assert!((1..=ROUND_MAX).contains(&encounter.round()));
            match encounter.active_id() {
                Some(_) => prop_assert!(encounter.active_index().is_some()),
                None => prop_assert!(encounter.is_empty()),
            }
        }
    }
}
