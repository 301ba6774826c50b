//! Turn Engine Tests

use rstest::rstest;

use crate::core::session::{CombatSession, ROUND_MAX};
use crate::tests::common::fixtures::*;

// =============================================================================
// Advancing
// =============================================================================

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn test_full_cycle_increments_round_once(#[case] size: usize) {
    let names: Vec<String> = (0..size).map(|i| format!("C{i}")).collect();
    let roster: Vec<(&str, i32)> = names.iter().map(|n| (n.as_str(), 10)).collect();
    let (mut session, ids) = session_with(&roster);

    for _ in 0..size {
        session.advance_turn();
    }

    assert_eq!(session.encounter().round(), 2);
    assert_eq!(session.encounter().active_id(), Some(&ids[0]));
}

#[test]
fn test_advance_narrates_round_before_turn() {
    let (mut session, _) = skirmish();
    session.advance_turn();
    session.advance_turn();
    session.advance_turn();

    assert_eq!(
        messages(&session),
        vec![
            "[R1] Turn: Goblin",
            "[R1] Turn: Ogro",
            "[R2] — Round 2 —",
            "[R2] Turn: Valeria",
        ]
    );
}

#[test]
fn test_empty_roster_is_a_no_op() {
    let mut session = CombatSession::new();
    session.advance_turn();
    session.retreat_turn();

    assert_eq!(session.encounter().round(), 1);
    assert!(session.encounter().active_id().is_none());
    assert!(session.log().is_empty());
}

#[test]
fn test_removed_active_falls_back_to_top() {
    let (mut session, ids) = skirmish();
    session.set_active(&ids[1]);
    session.remove_combatant(&ids[1]);

    assert_eq!(active_name(&session).as_deref(), Some("Valeria"));
    session.advance_turn();
    assert_eq!(active_name(&session).as_deref(), Some("Ogro"));
}

// =============================================================================
// Retreating
// =============================================================================

#[test]
fn test_retreat_undoes_advance() {
    let (mut session, ids) = skirmish();
    session.advance_turn();
    let (round, active) = (session.encounter().round(), session.encounter().active_id().cloned());

    session.advance_turn();
    session.retreat_turn();

    assert_eq!(session.encounter().round(), round);
    assert_eq!(session.encounter().active_id().cloned(), active);
    assert_eq!(active, Some(ids[1].clone()));
}

#[test]
fn test_retreat_across_round_boundary() {
    let (mut session, ids) = skirmish();
    for _ in 0..3 {
        session.advance_turn();
    }
    assert_eq!(session.encounter().round(), 2);

    session.clear_log();
    session.retreat_turn();

    assert_eq!(session.encounter().round(), 1);
    assert_eq!(session.encounter().active_id(), Some(&ids[2]));
    assert_eq!(messages(&session), vec!["[R1] ↩ back (Round 1)", "[R1] Turn: Ogro"]);
}

#[test]
fn test_retreat_in_round_one_stays_in_round_one() {
    let (mut session, _) = skirmish();
    session.retreat_turn();
    session.retreat_turn();
    assert_eq!(session.encounter().round(), 1);
    assert_eq!(active_name(&session).as_deref(), Some("Goblin"));
}

// =============================================================================
// Round bookkeeping
// =============================================================================

#[test]
fn test_reset_round_keeps_pointer_and_conditions() {
    let (mut session, ids) = skirmish();
    session.add_condition(&ids[0], "Lento", Some(3)).unwrap();
    for _ in 0..4 {
        session.advance_turn();
    }
    let active = session.encounter().active_id().cloned();
    let conditions = conditions_of(&session, &ids[0]);

    session.reset_round();

    assert_eq!(session.encounter().round(), 1);
    assert_eq!(session.encounter().active_id().cloned(), active);
    assert_eq!(conditions_of(&session, &ids[0]), conditions);
    assert!(messages(&session).last().unwrap().ends_with("⟳ Round reset to 1"));
}

#[test]
fn test_round_is_capped() {
    let (mut session, _) = session_with(&[("Solo", 1)]);
    for _ in 0..(ROUND_MAX + 5) {
        session.advance_turn();
    }
    assert_eq!(session.encounter().round(), ROUND_MAX);
}

#[test]
fn test_set_active_does_not_decay() {
    let (mut session, ids) = skirmish();
    session.add_condition(&ids[0], "Cego", Some(1)).unwrap();
    session.set_active(&ids[2]);
    session.set_active(&ids[0]);
    assert_eq!(conditions_of(&session, &ids[0]), vec![("Cego".to_string(), 1)]);
}
