//! Property-based tests for the combat engine
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Test Modules
//!
//! - `turn_engine_props`: turn pointer and round counter
//!   - A full cycle of advances adds exactly one round
//!   - Retreat right after advance restores pointer, round and durations
//!   - Round stays within bounds for any mix of turn operations
//!
//! - `resource_props`: HP/MP bookkeeping
//!   - MP never goes below zero
//!   - Maxima never move when current values do
//!
//! - `naming_props`: duplicate name derivation
//!   - Trailing counters always increase by one
//!   - Names without a counter get " 2"
//!
//! - `event_log_props`: the capped log
//!   - Never more than 200 entries, oldest evicted first
//!
//! - `snapshot_props`: persistence
//!   - Restoring a saved session gives the same session back
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod naming_props;
mod resource_props;
mod snapshot_props;
mod turn_engine_props;

use proptest::prelude::*;

use crate::core::session::{CombatSession, CombatantId, Pool, ResourceField};
use crate::tests::common::fixtures::draft;

/// One user action against a session.
#[derive(Debug, Clone)]
pub(crate) enum Op {
    Advance,
    Retreat,
    ResetRound,
    Delta { who: usize, pool: Pool, delta: i32 },
    Set { who: usize, field: ResourceField, value: i64 },
    AddCondition { who: usize, name: &'static str, duration: i64 },
    Bump { who: usize, index: usize, delta: i32 },
    Duplicate { who: usize },
    Remove { who: usize },
    Sort,
}

pub(crate) fn arb_pool() -> impl Strategy<Value = Pool> {
    prop_oneof![Just(Pool::Hp), Just(Pool::Mp)]
}

pub(crate) fn arb_field() -> impl Strategy<Value = ResourceField> {
    prop::sample::select(ResourceField::ALL.to_vec())
}

pub(crate) fn arb_condition() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["Cego", "Lento", "Sangrando", "Em Chamas", "Abalado"])
}

pub(crate) fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Advance),
        2 => Just(Op::Retreat),
        1 => Just(Op::ResetRound),
        3 => (0..8usize, arb_pool(), -50..50i32)
            .prop_map(|(who, pool, delta)| Op::Delta { who, pool, delta }),
        2 => (0..8usize, arb_field(), -2_000_000i64..2_000_000)
            .prop_map(|(who, field, value)| Op::Set { who, field, value }),
        2 => (0..8usize, arb_condition(), -3i64..6)
            .prop_map(|(who, name, duration)| Op::AddCondition { who, name, duration }),
        2 => (0..8usize, 0..3usize, -2..3i32)
            .prop_map(|(who, index, delta)| Op::Bump { who, index, delta }),
        1 => (0..8usize).prop_map(|who| Op::Duplicate { who }),
        1 => (0..8usize).prop_map(|who| Op::Remove { who }),
        1 => Just(Op::Sort),
    ]
}

/// Session with `size` combatants named `C0..`, initiatives descending.
pub(crate) fn roster(size: usize) -> (CombatSession, Vec<CombatantId>) {
    let mut session = CombatSession::new();
    let ids = (0..size)
        .map(|i| {
            session
                .add_combatant(draft(&format!("C{i}"), 20 - i as i32, 30, 10))
                .expect("valid combatant")
        })
        .collect();
    (session, ids)
}

fn pick(session: &CombatSession, who: usize) -> Option<CombatantId> {
    let roster = session.encounter().combatants();
    if roster.is_empty() {
        None
    } else {
        Some(roster[who % roster.len()].id.clone())
    }
}

pub(crate) fn apply(session: &mut CombatSession, op: &Op) {
    match *op {
        Op::Advance => session.advance_turn(),
        Op::Retreat => session.retreat_turn(),
        Op::ResetRound => session.reset_round(),
        Op::Sort => session.sort(),
        Op::Delta { who, pool, delta } => {
            if let Some(id) = pick(session, who) {
                session.apply_delta(&id, pool, delta);
            }
        }
        Op::Set { who, field, value } => {
            if let Some(id) = pick(session, who) {
                session.update_field(&id, field, value);
            }
        }
        Op::AddCondition { who, name, duration } => {
            if let Some(id) = pick(session, who) {
                let _ = session.add_condition(&id, name, Some(duration));
            }
        }
        Op::Bump { who, index, delta } => {
            if let Some(id) = pick(session, who) {
                session.bump_condition(&id, index, delta);
            }
        }
        Op::Duplicate { who } => {
            if let Some(id) = pick(session, who) {
                session.duplicate_combatant(&id);
            }
        }
        Op::Remove { who } => {
            if let Some(id) = pick(session, who) {
                session.remove_combatant(&id);
            }
        }
    }
}
