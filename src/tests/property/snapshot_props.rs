//! Property-based tests for snapshot persistence
//!
//! Tests invariants:
//! - Restoring a saved session yields the same session
//! - Import of any JSON object never panics and yields a valid session

use proptest::prelude::*;
use serde_json::{json, Value};

use super::{apply, arb_op, roster};
use crate::core::session::{DURATION_MAX, RESOURCE_LIMIT, ROUND_MAX};
use crate::core::storage::snapshot;

/// Loosely-typed JSON leaf values, the kind hand-edited exports contain.
fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1e9f64..1e9).prop_map(|n| json!(n)),
        "[0-9 -]{0,8}".prop_map(Value::String),
        "\\PC{0,12}".prop_map(Value::String),
    ]
}

fn arb_combatant() -> impl Strategy<Value = Value> {
    (
        prop::option::of("[a-c]{0,2}"),
        arb_leaf(),
        arb_leaf(),
        arb_leaf(),
        arb_leaf(),
        arb_leaf(),
        prop::collection::vec((arb_leaf(), arb_leaf()), 0..3),
    )
        .prop_map(|(id, name, init, hp_cur, hp_max, mp_cur, conditions)| {
            let conditions: Vec<Value> = conditions
                .into_iter()
                .map(|(name, remaining)| json!({ "name": name, "remaining": remaining }))
                .collect();
            json!({
                "id": id,
                "name": name,
                "init": init,
                "hpCur": hp_cur,
                "hpMax": hp_max,
                "mpCur": mp_cur,
                "conditions": conditions,
            })
        })
}

proptest! {
    #[test]
    fn restore_of_saved_session_is_identity(ops in prop::collection::vec(arb_op(), 0..80)) {
        let (mut session, _) = roster(4);
        for op in &ops {
            apply(&mut session, op);
        }
        let text = snapshot::to_json(&session).unwrap();
        prop_assert_eq!(snapshot::restore(&text), session);
    }

    #[test]
    fn import_normalises_anything(
        round in arb_leaf(),
        active in arb_leaf(),
        combatants in prop::collection::vec(arb_combatant(), 0..6),
    ) {
        let text = json!({ "round": round, "activeId": active, "combatants": combatants }).to_string();
        let session = snapshot::import(&text).unwrap();
        let encounter = session.encounter();

        prop_assert!((1..=ROUND_MAX).contains(&encounter.round()));
        prop_assert_eq!(encounter.active_id().is_some(), !encounter.is_empty());

        let mut ids = std::collections::HashSet::new();
        for c in encounter.combatants() {
            prop_assert!(ids.insert(c.id.clone()), "duplicate id {}", c.id);
            prop_assert!(!c.id.as_str().trim().is_empty());
            prop_assert!(!c.name.trim().is_empty());
            prop_assert!(c.hp_cur.abs() <= RESOURCE_LIMIT);
            prop_assert!((0..=RESOURCE_LIMIT).contains(&c.hp_max));
            prop_assert!((0..=RESOURCE_LIMIT).contains(&c.mp_cur));
            prop_assert!((0..=RESOURCE_LIMIT).contains(&c.mp_max));
            for cond in &c.conditions {
                prop_assert!(!cond.name.trim().is_empty());
                prop_assert!(cond.remaining <= DURATION_MAX);
            }
        }
    }
}
