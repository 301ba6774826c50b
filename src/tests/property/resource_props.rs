//! Property-based tests for HP/MP bookkeeping
//!
//! Tests invariants:
//! - MP never observably goes below zero
//! - Maxima are only changed by explicit edits to the maximum itself
//! - HP stays negative until something raises it

use proptest::prelude::*;

use super::{apply, arb_op, arb_pool, roster, Op};
use crate::core::session::{Pool, ResourceField, RESOURCE_LIMIT};

proptest! {
    #[test]
    fn mp_never_negative(ops in prop::collection::vec(arb_op(), 0..150)) {
        let (mut session, _) = roster(3);
        for op in &ops {
            apply(&mut session, op);
            for c in session.encounter().combatants() {
                prop_assert!(c.mp_cur >= 0, "{} has {} MP", c.name, c.mp_cur);
                prop_assert!(c.hp_cur >= -RESOURCE_LIMIT && c.hp_cur <= RESOURCE_LIMIT);
            }
        }
    }

    #[test]
    fn maxima_ignore_current_changes(
        deltas in prop::collection::vec((arb_pool(), -100..100i32), 0..60),
        sets in prop::collection::vec((prop_oneof![Just(ResourceField::HpCurrent), Just(ResourceField::MpCurrent)], -500i64..500), 0..20),
    ) {
        let (mut session, ids) = roster(1);
        let id = &ids[0];
        for (pool, delta) in deltas {
            session.apply_delta(id, pool, delta);
        }
        for (field, value) in sets {
            session.update_field(id, field, value);
        }

        let c = session.encounter().combatant(id).unwrap();
        prop_assert_eq!((c.hp_max, c.mp_max), (30, 10));
    }

    #[test]
    fn hp_stays_negative_until_raised(hit in 31..200i32, noise in prop::collection::vec(arb_op(), 0..40)) {
        let (mut session, ids) = roster(1);
        session.apply_delta(&ids[0], Pool::Hp, -hit);
        for op in noise.iter().filter(|op| matches!(op, Op::Advance | Op::Retreat | Op::ResetRound | Op::AddCondition { .. } | Op::Bump { .. })) {
            apply(&mut session, op);
        }

        let c = session.encounter().combatant(&ids[0]).unwrap();
        prop_assert_eq!(c.hp_cur, 30 - hit);
        prop_assert!(c.is_dying());
    }

    #[test]
    fn delta_then_inverse_restores_hp(start in -1000..1000i64, delta in -500..500i32) {
        let (mut session, ids) = roster(1);
        session.update_field(&ids[0], ResourceField::HpCurrent, start);
        session.apply_delta(&ids[0], Pool::Hp, delta);
        session.apply_delta(&ids[0], Pool::Hp, -delta);
        prop_assert_eq!(i64::from(session.encounter().combatant(&ids[0]).unwrap().hp_cur), start);
    }
}
