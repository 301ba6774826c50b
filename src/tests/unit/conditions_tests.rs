//! Condition Lifecycle Tests
//!
//! Timed conditions tick down when their bearer's turn ends, never when the
//! pointer moves backwards.

use rstest::rstest;

use crate::core::session::{Rejection, DURATION_MAX};
use crate::tests::common::fixtures::*;

// =============================================================================
// Decay
// =============================================================================

/// A(10) and B(15) in insertion order, turn on B, Cego(2) on A.
#[test]
fn test_blinded_scenario_trace() {
    let (mut session, ids) = session_with(&[("A", 10), ("B", 15)]);
    let (a, b) = (&ids[0], &ids[1]);
    session.set_active(b);
    session.add_condition(a, "Cego", Some(2)).unwrap();
    session.clear_log();

    // B has nothing to decay; wraps to A in round 2
    session.advance_turn();
    assert_eq!(session.encounter().round(), 2);
    assert_eq!(session.encounter().active_id(), Some(a));
    assert_eq!(conditions_of(&session, a), vec![("Cego".to_string(), 2)]);

    // leaving A ticks Cego quietly
    session.advance_turn();
    assert_eq!(session.encounter().active_id(), Some(b));
    assert_eq!(conditions_of(&session, a), vec![("Cego".to_string(), 1)]);

    session.advance_turn();
    assert_eq!(session.encounter().round(), 3);
    assert_eq!(session.encounter().active_id(), Some(a));

    // second tick on A expires it
    session.advance_turn();
    assert!(conditions_of(&session, a).is_empty());

    assert_eq!(
        messages(&session),
        vec![
            "[R2] — Round 2 —",
            "[R2] Turn: A",
            "[R2] Turn: B",
            "[R3] — Round 3 —",
            "[R3] Turn: A",
            "[R3] A: condition \"Cego\" ended",
            "[R3] Turn: B",
        ]
    );
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(7)]
fn test_condition_expires_on_dth_decay(#[case] duration: u32) {
    let (mut session, ids) = session_with(&[("Solo", 10)]);
    session
        .add_condition(&ids[0], "Sangrando", Some(duration as i64))
        .unwrap();

    for turn in 1..=duration {
        session.advance_turn();
        let still_there = !conditions_of(&session, &ids[0]).is_empty();
        assert_eq!(still_there, turn < duration, "after {turn} decays");
    }
    assert_eq!(count_matching(&session, "\"Sangrando\" ended"), 1);

    session.advance_turn();
    assert_eq!(count_matching(&session, "\"Sangrando\" ended"), 1);
}

#[test]
fn test_zero_duration_condition_expires_on_first_decay() {
    let (mut session, ids) = session_with(&[("Solo", 10)]);
    session.add_condition(&ids[0], "Pasmo", Some(0)).unwrap();
    assert_eq!(conditions_of(&session, &ids[0]), vec![("Pasmo".to_string(), 0)]);

    session.advance_turn();
    assert!(conditions_of(&session, &ids[0]).is_empty());
    assert_eq!(count_matching(&session, "\"Pasmo\" ended"), 1);
}

#[test]
fn test_only_the_departing_combatant_decays() {
    let (mut session, ids) = skirmish();
    for id in &ids {
        session.add_condition(id, "Lento", Some(5)).unwrap();
    }
    session.advance_turn();

    assert_eq!(conditions_of(&session, &ids[0]), vec![("Lento".to_string(), 4)]);
    assert_eq!(conditions_of(&session, &ids[1]), vec![("Lento".to_string(), 5)]);
    assert_eq!(conditions_of(&session, &ids[2]), vec![("Lento".to_string(), 5)]);
}

#[test]
fn test_advance_then_retreat_leaves_durations_alone() {
    let (mut session, ids) = skirmish();
    session.add_condition(&ids[1], "Atordoado", Some(3)).unwrap();
    session.advance_turn();
    let before = conditions_of(&session, &ids[1]);

    session.advance_turn();
    session.retreat_turn();
    session.advance_turn();
    session.retreat_turn();

    // only the two advances out of Goblin's turn count
    assert_eq!(before, vec![("Atordoado".to_string(), 3)]);
    assert_eq!(conditions_of(&session, &ids[1]), vec![("Atordoado".to_string(), 1)]);
}

#[test]
fn test_decay_expiry_follows_list_order() {
    let (mut session, ids) = session_with(&[("Solo", 10)]);
    session.add_condition(&ids[0], "Ofuscado", Some(1)).unwrap();
    session.add_condition(&ids[0], "Lento", Some(2)).unwrap();
    session.add_condition(&ids[0], "Cego", Some(1)).unwrap();
    session.clear_log();

    session.advance_turn();

    assert_eq!(conditions_of(&session, &ids[0]), vec![("Lento".to_string(), 1)]);
    assert_eq!(
        messages(&session),
        vec![
            "[R1] Solo: condition \"Ofuscado\" ended",
            "[R1] Solo: condition \"Cego\" ended",
            "[R2] — Round 2 —",
            "[R2] Turn: Solo",
        ]
    );
}

// =============================================================================
// Manual adjustments
// =============================================================================

#[test]
fn test_bump_to_zero_narrates_change_then_expiry() {
    let (mut session, ids) = skirmish();
    session.add_condition(&ids[0], "Em Chamas", Some(1)).unwrap();
    session.clear_log();

    session.bump_condition(&ids[0], 0, -1);

    assert!(conditions_of(&session, &ids[0]).is_empty());
    assert_eq!(
        messages(&session),
        vec![
            "[R1] Valeria: Em Chamas → 0r",
            "[R1] Valeria: condition \"Em Chamas\" ended",
        ]
    );
}

#[test]
fn test_bump_up_is_capped() {
    let (mut session, ids) = skirmish();
    session.add_condition(&ids[0], "Lento", Some(998)).unwrap();
    session.bump_condition(&ids[0], 0, 1);
    session.bump_condition(&ids[0], 0, 1);
    assert_eq!(conditions_of(&session, &ids[0]), vec![("Lento".to_string(), DURATION_MAX)]);
    assert_eq!(count_matching(&session, "Lento → 999r"), 2);
}

#[test]
fn test_remove_by_index_and_out_of_range() {
    let (mut session, ids) = skirmish();
    session.add_condition(&ids[0], "Cego", Some(2)).unwrap();
    session.add_condition(&ids[0], "Surdo", Some(2)).unwrap();
    session.clear_log();

    session.remove_condition(&ids[0], 5);
    assert!(session.log().is_empty());

    session.remove_condition(&ids[0], 0);
    assert_eq!(conditions_of(&session, &ids[0]), vec![("Surdo".to_string(), 2)]);
    assert_eq!(messages(&session), vec!["[R1] Valeria: - condition \"Cego\""]);
}

#[test]
fn test_same_condition_can_stack() {
    let (mut session, ids) = skirmish();
    session.add_condition(&ids[2], "Sangrando", Some(1)).unwrap();
    session.add_condition(&ids[2], "Sangrando", Some(4)).unwrap();
    assert_eq!(
        conditions_of(&session, &ids[2]),
        vec![("Sangrando".to_string(), 1), ("Sangrando".to_string(), 4)]
    );
}

// =============================================================================
// Validation
// =============================================================================

#[rstest]
#[case("", Rejection::UnknownCondition(String::new()))]
#[case("Sonolento", Rejection::UnknownCondition("Sonolento".into()))]
fn test_unknown_names_are_rejected(#[case] name: &str, #[case] expected: Rejection) {
    let (mut session, ids) = skirmish();
    assert_eq!(session.add_condition(&ids[0], name, Some(2)), Err(expected));
    assert!(conditions_of(&session, &ids[0]).is_empty());
    assert!(session.log().is_empty());
}

#[rstest]
#[case(None, 1)]
#[case(Some(-4), 0)]
#[case(Some(5000), 999)]
fn test_duration_is_clamped(#[case] requested: Option<i64>, #[case] stored: u32) {
    let (mut session, ids) = skirmish();
    session.add_condition(&ids[0], "Caído", requested).unwrap();
    assert_eq!(conditions_of(&session, &ids[0]), vec![("Caído".to_string(), stored)]);
}
