//! Test Fixtures
//!
//! Builders for sessions with a known roster, plus accessors that read the
//! log without its wall-clock prefix.

use crate::core::session::{CombatSession, Combatant, CombatantId, NewCombatant};

// =============================================================================
// Combatant Fixtures
// =============================================================================

pub fn draft(name: &str, init: i32, hp: i32, mp: i32) -> NewCombatant {
    NewCombatant {
        name: name.to_string(),
        init: Some(init),
        hp,
        mp,
    }
}

/// Session with one combatant per `(name, init)`, in the given order, each at
/// 20 HP / 5 MP. The first entry is active and the log starts empty.
pub fn session_with(roster: &[(&str, i32)]) -> (CombatSession, Vec<CombatantId>) {
    let mut session = CombatSession::new();
    let ids = roster
        .iter()
        .map(|&(name, init)| {
            session
                .add_combatant(draft(name, init, 20, 5))
                .expect("fixture combatant is valid")
        })
        .collect();
    session.clear_log();
    (session, ids)
}

/// Three-way fight used across suites: Valeria (18), Goblin (12), Ogro (7).
pub fn skirmish() -> (CombatSession, Vec<CombatantId>) {
    session_with(&[("Valeria", 18), ("Goblin", 12), ("Ogro", 7)])
}

pub fn combatant<'a>(session: &'a CombatSession, id: &CombatantId) -> &'a Combatant {
    session
        .encounter()
        .combatant(id)
        .expect("combatant exists in fixture")
}

pub fn active_name(session: &CombatSession) -> Option<String> {
    session.encounter().active().map(|c| c.name.clone())
}

pub fn roster_names(session: &CombatSession) -> Vec<String> {
    session
        .encounter()
        .combatants()
        .iter()
        .map(|c| c.name.clone())
        .collect()
}

/// `(name, remaining)` for each condition on `id`, in list order.
pub fn conditions_of(session: &CombatSession, id: &CombatantId) -> Vec<(String, u32)> {
    combatant(session, id)
        .conditions
        .iter()
        .map(|c| (c.name.clone(), c.remaining))
        .collect()
}

// =============================================================================
// Log Helpers
// =============================================================================

/// Log lines oldest first, with the `HH:MM:SS ` stamp stripped.
pub fn messages(session: &CombatSession) -> Vec<String> {
    session
        .log()
        .iter()
        .map(|line| line.split_once(' ').map_or(line, |(_, rest)| rest).to_string())
        .collect()
}

pub fn count_matching(session: &CombatSession, needle: &str) -> usize {
    session.log().iter().filter(|line| line.contains(needle)).count()
}
