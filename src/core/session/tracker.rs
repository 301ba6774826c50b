//! The combat session front-ends talk to.
//!
//! [`CombatSession`] owns the [`Encounter`] and its [`EventLog`]. Each method
//! runs the encounter operation and writes whatever it narrated into the log.

use super::combat::{CombatantId, Encounter, NewCombatant, Rejection, ResourceField, StatField};
use super::log::{Change, EventLog, Narration, Pool};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatSession {
    encounter: Encounter,
    log: EventLog,
    log_open: bool,
}

impl CombatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(encounter: Encounter, log: EventLog, log_open: bool) -> Self {
        Self {
            encounter,
            log,
            log_open,
        }
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn log_open(&self) -> bool {
        self.log_open
    }

    fn commit(&mut self, changes: Vec<Change>) -> usize {
        self.log.record_all(&changes);
        changes.len()
    }

    // --- roster ---------------------------------------------------------

    pub fn add_combatant(&mut self, draft: NewCombatant) -> Result<CombatantId, Rejection> {
        let (id, changes) = self.encounter.add_combatant(draft)?;
        self.commit(changes);
        Ok(id)
    }

    pub fn remove_combatant(&mut self, id: &CombatantId) -> bool {
        let changes = self.encounter.remove_combatant(id);
        self.commit(changes) > 0
    }

    pub fn duplicate_combatant(&mut self, id: &CombatantId) -> Option<CombatantId> {
        let (copy, changes) = self.encounter.duplicate_combatant(id)?;
        self.commit(changes);
        Some(copy)
    }

    pub fn update_field(&mut self, id: &CombatantId, field: ResourceField, value: i64) -> bool {
        self.encounter.update_field(id, field, value)
    }

    pub fn apply_delta(&mut self, id: &CombatantId, pool: Pool, delta: i32) {
        let changes = self.encounter.apply_delta(id, pool, delta);
        self.commit(changes);
    }

    pub fn update_initiative(&mut self, id: &CombatantId, init: i32) {
        let changes = self.encounter.update_initiative(id, init);
        self.commit(changes);
    }

    pub fn set_auto_sort(&mut self, on: bool) {
        self.encounter.set_auto_sort(on);
    }

    pub fn update_notes(&mut self, id: &CombatantId, notes: impl Into<String>) -> bool {
        self.encounter.update_notes(id, notes)
    }

    pub fn update_stat(&mut self, id: &CombatantId, field: StatField, value: impl Into<String>) -> bool {
        self.encounter.update_stat(id, field, value)
    }

    pub fn toggle_open(&mut self, id: &CombatantId) -> bool {
        self.encounter.toggle_open(id)
    }

    pub fn collapse_all(&mut self) {
        self.encounter.collapse_all();
    }

    pub fn sort(&mut self) {
        let changes = self.encounter.sort();
        self.commit(changes);
    }

    pub fn reorder(&mut self, order: &[CombatantId]) {
        let changes = self.encounter.reorder(order);
        self.commit(changes);
    }

    pub fn shift(&mut self, id: &CombatantId, offset: isize) -> bool {
        let changes = self.encounter.shift(id, offset);
        self.commit(changes) > 0
    }

    // --- turns ----------------------------------------------------------

    pub fn advance_turn(&mut self) {
        let changes = self.encounter.advance_turn();
        self.commit(changes);
    }

    pub fn retreat_turn(&mut self) {
        let changes = self.encounter.retreat_turn();
        self.commit(changes);
    }

    pub fn reset_round(&mut self) {
        let changes = self.encounter.reset_round();
        self.commit(changes);
    }

    pub fn set_active(&mut self, id: &CombatantId) {
        let changes = self.encounter.set_active(id);
        self.commit(changes);
    }

    // --- conditions -----------------------------------------------------

    pub fn add_condition(
        &mut self,
        id: &CombatantId,
        name: &str,
        duration: Option<i64>,
    ) -> Result<(), Rejection> {
        let changes = self.encounter.add_condition(id, name, duration)?;
        self.commit(changes);
        Ok(())
    }

    pub fn bump_condition(&mut self, id: &CombatantId, index: usize, delta: i32) {
        let changes = self.encounter.bump_condition(id, index, delta);
        self.commit(changes);
    }

    pub fn remove_condition(&mut self, id: &CombatantId, index: usize) {
        let changes = self.encounter.remove_condition(id, index);
        self.commit(changes);
    }

    // --- session --------------------------------------------------------

    /// Throw everything away: round 1, empty roster, empty log.
    pub fn new_combat(&mut self) {
        tracing::info!("starting a new combat");
        *self = Self::new();
    }

    pub fn toggle_log(&mut self) {
        self.log_open = !self.log_open;
    }

    pub fn set_log_open(&mut self, open: bool) {
        self.log_open = open;
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Narrate a wholesale replacement of the session (import).
    pub fn mark_loaded(&mut self) {
        let change = Change::new(self.encounter.round(), Narration::CombatLoaded);
        self.commit(vec![change]);
    }
}
