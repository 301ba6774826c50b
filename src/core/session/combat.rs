//! Combat Management Module
//!
//! The encounter state machine: the ordered roster, the turn pointer and the
//! round counter. Every mutating operation hands back the [`Change`]s it
//! produced instead of writing to a log, so the engine can be driven and
//! inspected without any narration harness attached.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::collation_key;
use super::conditions::ConditionTracker;
use super::log::{Change, Narration, Pool, UNNAMED};
use super::naming::increment_name;

/// Absolute bound for HP/MP values.
pub const RESOURCE_LIMIT: i32 = 999_999;

/// Highest round the counter will reach.
pub const ROUND_MAX: u32 = 9_999;

// ============================================================================
// Identifiers and field selectors
// ============================================================================

/// Opaque combatant identifier. Fresh ids are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(String);

impl CombatantId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CombatantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CombatantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Directly editable numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceField {
    HpCurrent,
    HpMaximum,
    MpCurrent,
    MpMaximum,
}

impl ResourceField {
    pub const ALL: [ResourceField; 4] = [
        ResourceField::HpCurrent,
        ResourceField::HpMaximum,
        ResourceField::MpCurrent,
        ResourceField::MpMaximum,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::HpCurrent => "HP",
            Self::HpMaximum => "HP max",
            Self::MpCurrent => "MP",
            Self::MpMaximum => "MP max",
        }
    }

    /// Only current HP may go below zero.
    pub fn clamp(self, value: i64) -> i32 {
        let floor = match self {
            Self::HpCurrent => -RESOURCE_LIMIT,
            _ => 0,
        };
        value.clamp(floor as i64, RESOURCE_LIMIT as i64) as i32
    }
}

/// Free-text stat fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    Defense,
    Resistances,
    DifficultyClass,
}

impl StatField {
    pub const ALL: [StatField; 3] = [
        StatField::Defense,
        StatField::Resistances,
        StatField::DifficultyClass,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Defense => "Defense",
            Self::Resistances => "Resistances",
            Self::DifficultyClass => "DC",
        }
    }
}

// ============================================================================
// Combatant
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(rename = "def", default)]
    pub defense: String,
    #[serde(rename = "res", default)]
    pub resistances: String,
    #[serde(rename = "cd", default)]
    pub difficulty_class: String,
}

impl StatBlock {
    pub fn get(&self, field: StatField) -> &str {
        match field {
            StatField::Defense => &self.defense,
            StatField::Resistances => &self.resistances,
            StatField::DifficultyClass => &self.difficulty_class,
        }
    }

    pub fn set(&mut self, field: StatField, value: impl Into<String>) {
        let slot = match field {
            StatField::Defense => &mut self.defense,
            StatField::Resistances => &mut self.resistances,
            StatField::DifficultyClass => &mut self.difficulty_class,
        };
        *slot = value.into();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub init: i32,
    /// May be negative (dying); not capped by `hp_max`.
    pub hp_cur: i32,
    /// Display ceiling; only ever changed by an explicit edit.
    pub hp_max: i32,
    pub mp_cur: i32,
    pub mp_max: i32,
    pub notes: String,
    pub stats: StatBlock,
    pub conditions: ConditionTracker,
    /// Expanded in the UI. Carries no combat meaning.
    pub open: bool,
}

impl Combatant {
    /// Create a combatant at full pools: the entered HP/MP become both
    /// current and maximum.
    pub fn new(name: impl Into<String>, init: i32, hp: i32, mp: i32) -> Self {
        let hp = hp.clamp(0, RESOURCE_LIMIT);
        let mp = mp.clamp(0, RESOURCE_LIMIT);
        Self {
            id: CombatantId::generate(),
            name: name.into(),
            init,
            hp_cur: hp,
            hp_max: hp,
            mp_cur: mp,
            mp_max: mp,
            notes: String::new(),
            stats: StatBlock::default(),
            conditions: ConditionTracker::new(),
            open: false,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNNAMED
        } else {
            &self.name
        }
    }

    pub fn field(&self, field: ResourceField) -> i32 {
        match field {
            ResourceField::HpCurrent => self.hp_cur,
            ResourceField::HpMaximum => self.hp_max,
            ResourceField::MpCurrent => self.mp_cur,
            ResourceField::MpMaximum => self.mp_max,
        }
    }

    fn field_mut(&mut self, field: ResourceField) -> &mut i32 {
        match field {
            ResourceField::HpCurrent => &mut self.hp_cur,
            ResourceField::HpMaximum => &mut self.hp_max,
            ResourceField::MpCurrent => &mut self.mp_cur,
            ResourceField::MpMaximum => &mut self.mp_max,
        }
    }

    /// Filled fraction of the HP bar in `[0, 1]`.
    pub fn hp_ratio(&self) -> f64 {
        fill_ratio(self.hp_cur, self.hp_max)
    }

    pub fn mp_ratio(&self) -> f64 {
        fill_ratio(self.mp_cur, self.mp_max)
    }

    /// Current above maximum; the renderer prefixes these with `+`.
    pub fn is_over_max(&self, pool: Pool) -> bool {
        match pool {
            Pool::Hp => self.hp_cur > self.hp_max,
            Pool::Mp => self.mp_cur > self.mp_max,
        }
    }

    /// Below zero HP.
    pub fn is_dying(&self) -> bool {
        self.hp_cur < 0
    }

    /// Under a quarter of max HP but not yet dying.
    pub fn is_low(&self) -> bool {
        self.hp_max > 0 && self.hp_cur >= 0 && (self.hp_cur as f64 / self.hp_max as f64) < 0.25
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}

fn fill_ratio(current: i32, max: i32) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    current.clamp(0, max) as f64 / max as f64
}

/// Add-form input. `init` is `None` when the field was left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCombatant {
    pub name: String,
    pub init: Option<i32>,
    pub hp: i32,
    pub mp: i32,
}

/// Why an operation refused to run. State is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Name is required")]
    MissingName,
    #[error("Initiative is required")]
    MissingInitiative,
    #[error("No combatant with id {0}")]
    UnknownCombatant(CombatantId),
    #[error("\"{0}\" is not a known condition")]
    UnknownCondition(String),
}

// ============================================================================
// Encounter
// ============================================================================

/// Roster + turn pointer + round counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encounter {
    round: u32,
    active_id: Option<CombatantId>,
    combatants: Vec<Combatant>,
    auto_sort: bool,
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Encounter {
    pub fn new() -> Self {
        Self {
            round: 1,
            active_id: None,
            combatants: Vec::new(),
            auto_sort: false,
        }
    }

    /// Assemble from restored parts, repairing the round and turn pointer.
    pub fn from_parts(
        round: u32,
        active_id: Option<CombatantId>,
        combatants: Vec<Combatant>,
        auto_sort: bool,
    ) -> Self {
        let mut encounter = Self {
            round: round.clamp(1, ROUND_MAX),
            active_id,
            combatants,
            auto_sort,
        };
        if encounter.active_index().is_none() {
            encounter.active_id = encounter.combatants.first().map(|c| c.id.clone());
        }
        encounter
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn active_id(&self) -> Option<&CombatantId> {
        self.active_id.as_ref()
    }

    pub fn active(&self) -> Option<&Combatant> {
        self.active_id.as_ref().and_then(|id| self.combatant(id))
    }

    /// Roster position of the active combatant, if it is still present.
    pub fn active_index(&self) -> Option<usize> {
        self.active_id.as_ref().and_then(|id| self.index_of(id))
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn auto_sort(&self) -> bool {
        self.auto_sort
    }

    pub fn index_of(&self, id: &CombatantId) -> Option<usize> {
        self.combatants.iter().position(|c| &c.id == id)
    }

    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| &c.id == id)
    }

    pub(super) fn combatant_mut(&mut self, id: &CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| &c.id == id)
    }

    fn change(&self, narration: Narration) -> Change {
        Change::new(self.round, narration)
    }

    // ------------------------------------------------------------------------
    // Combatant store
    // ------------------------------------------------------------------------

    /// Add a combatant at full HP/MP. The first one in an empty turn order
    /// becomes active.
    pub fn add_combatant(
        &mut self,
        draft: NewCombatant,
    ) -> Result<(CombatantId, Vec<Change>), Rejection> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(Rejection::MissingName);
        }
        let init = draft.init.ok_or(Rejection::MissingInitiative)?;

        let combatant = Combatant::new(name, init, draft.hp, draft.mp);
        let id = combatant.id.clone();
        let narration = Narration::CombatantAdded {
            name: combatant.name.clone(),
            init,
        };
        self.combatants.push(combatant);
        if self.active_id.is_none() {
            self.active_id = Some(id.clone());
        }
        tracing::debug!(combatant = %id, init, "combatant added");

        Ok((id, vec![self.change(narration)]))
    }

    /// Remove by id. Losing the active combatant hands the turn to the top
    /// of the roster.
    pub fn remove_combatant(&mut self, id: &CombatantId) -> Vec<Change> {
        let Some(pos) = self.index_of(id) else {
            return Vec::new();
        };
        let removed = self.combatants.remove(pos);
        if self.active_id.as_ref() == Some(id) {
            self.active_id = self.combatants.first().map(|c| c.id.clone());
        }
        tracing::debug!(combatant = %id, "combatant removed");

        vec![self.change(Narration::CombatantRemoved { name: removed.name })]
    }

    /// Deep copy placed right after the source, with an incremented name and
    /// a fresh id. The copy starts collapsed.
    pub fn duplicate_combatant(&mut self, id: &CombatantId) -> Option<(CombatantId, Vec<Change>)> {
        let pos = self.index_of(id)?;
        let source = &self.combatants[pos];

        let mut copy = source.clone();
        copy.id = CombatantId::generate();
        copy.name = if source.name.trim().is_empty() {
            increment_name("Copy")
        } else {
            increment_name(&source.name)
        };
        copy.open = false;

        let narration = Narration::CombatantDuplicated {
            source: source.name.clone(),
            copy: copy.name.clone(),
        };
        let copy_id = copy.id.clone();
        self.combatants.insert(pos + 1, copy);
        tracing::debug!(source = %id, copy = %copy_id, "combatant duplicated");

        Some((copy_id, vec![self.change(narration)]))
    }

    /// Direct edit of a numeric field. Silent; returns whether it applied.
    pub fn update_field(&mut self, id: &CombatantId, field: ResourceField, value: i64) -> bool {
        let Some(combatant) = self.combatant_mut(id) else {
            return false;
        };
        *combatant.field_mut(field) = field.clamp(value);
        true
    }

    /// Relative adjustment of current HP or MP. MP stops at zero, HP does not.
    pub fn apply_delta(&mut self, id: &CombatantId, pool: Pool, delta: i32) -> Vec<Change> {
        let round = self.round;
        let Some(combatant) = self.combatant_mut(id) else {
            return Vec::new();
        };
        let field = match pool {
            Pool::Hp => ResourceField::HpCurrent,
            Pool::Mp => ResourceField::MpCurrent,
        };
        let slot = combatant.field_mut(field);
        *slot = field.clamp(*slot as i64 + delta as i64);
        let value = *slot;

        vec![Change::new(
            round,
            Narration::ResourceChanged {
                name: combatant.name.clone(),
                pool,
                delta,
                value,
            },
        )]
    }

    /// Edit initiative. With auto-sort on, the roster is re-sorted at once.
    pub fn update_initiative(&mut self, id: &CombatantId, init: i32) -> Vec<Change> {
        let Some(combatant) = self.combatant_mut(id) else {
            return Vec::new();
        };
        combatant.init = init;
        if self.auto_sort {
            self.sort()
        } else {
            Vec::new()
        }
    }

    pub fn set_auto_sort(&mut self, on: bool) {
        self.auto_sort = on;
    }

    pub fn update_notes(&mut self, id: &CombatantId, notes: impl Into<String>) -> bool {
        match self.combatant_mut(id) {
            Some(c) => {
                c.notes = notes.into();
                true
            }
            None => false,
        }
    }

    pub fn update_stat(&mut self, id: &CombatantId, field: StatField, value: impl Into<String>) -> bool {
        match self.combatant_mut(id) {
            Some(c) => {
                c.stats.set(field, value);
                true
            }
            None => false,
        }
    }

    pub fn toggle_open(&mut self, id: &CombatantId) -> bool {
        match self.combatant_mut(id) {
            Some(c) => {
                c.open = !c.open;
                true
            }
            None => false,
        }
    }

    /// Close every details panel.
    pub fn collapse_all(&mut self) {
        for combatant in &mut self.combatants {
            combatant.open = false;
        }
    }

    /// Highest initiative first; ties by name, ignoring case and accents.
    pub fn sort(&mut self) -> Vec<Change> {
        self.combatants.sort_by(|a, b| {
            b.init
                .cmp(&a.init)
                .then_with(|| collation_key(&a.name).cmp(&collation_key(&b.name)))
        });
        if self.active_index().is_none() {
            self.active_id = self.combatants.first().map(|c| c.id.clone());
        }
        vec![self.change(Narration::Sorted)]
    }

    /// Manual order from an external gesture. Ids missing from `order` keep
    /// their relative order after the listed ones; unknown ids are ignored.
    pub fn reorder(&mut self, order: &[CombatantId]) -> Vec<Change> {
        let mut rank: HashMap<&CombatantId, usize> = HashMap::with_capacity(order.len());
        for (i, id) in order.iter().enumerate() {
            rank.entry(id).or_insert(i);
        }
        self.combatants
            .sort_by_key(|c| rank.get(&c.id).copied().unwrap_or(usize::MAX));
        vec![self.change(Narration::Reordered)]
    }

    /// Swap a combatant with its neighbour (`offset` of -1 or +1) via [`Self::reorder`].
    pub fn shift(&mut self, id: &CombatantId, offset: isize) -> Vec<Change> {
        let Some(pos) = self.index_of(id) else {
            return Vec::new();
        };
        let target = pos as isize + offset;
        if target < 0 || target as usize >= self.combatants.len() {
            return Vec::new();
        }
        let mut order: Vec<CombatantId> = self.combatants.iter().map(|c| c.id.clone()).collect();
        order.swap(pos, target as usize);
        self.reorder(&order)
    }

    // ------------------------------------------------------------------------
    // Turn engine
    // ------------------------------------------------------------------------

    /// Hand the turn to the next combatant.
    ///
    /// The combatant being left decays first; wrapping past the end of the
    /// roster starts a new round. A stale pointer counts as position 0.
    pub fn advance_turn(&mut self) -> Vec<Change> {
        if self.combatants.is_empty() {
            return Vec::new();
        }

        let mut changes = self.decay_on_leave_turn();

        let mut next = self.active_index().unwrap_or(0) + 1;
        if next >= self.combatants.len() {
            next = 0;
            self.round = (self.round + 1).min(ROUND_MAX);
            changes.push(self.change(Narration::RoundStarted { round: self.round }));
        }

        let next_combatant = &self.combatants[next];
        self.active_id = Some(next_combatant.id.clone());
        let narration = Narration::TurnChanged {
            name: next_combatant.name.clone(),
        };
        changes.push(self.change(narration));

        tracing::debug!(round = self.round, index = next, "turn advanced");
        changes
    }

    /// Move the pointer back one place. Never touches conditions; wrapping
    /// below the top goes to the last combatant of the previous round
    /// (round stays at least 1).
    pub fn retreat_turn(&mut self) -> Vec<Change> {
        if self.combatants.is_empty() {
            return Vec::new();
        }

        let mut changes = Vec::new();
        let current = self.active_index().unwrap_or(0);
        let prev = if current == 0 {
            self.round = self.round.saturating_sub(1).max(1);
            changes.push(self.change(Narration::RoundRewound { round: self.round }));
            self.combatants.len() - 1
        } else {
            current - 1
        };

        let prev_combatant = &self.combatants[prev];
        self.active_id = Some(prev_combatant.id.clone());
        let narration = Narration::TurnChanged {
            name: prev_combatant.name.clone(),
        };
        changes.push(self.change(narration));

        tracing::debug!(round = self.round, index = prev, "turn retreated");
        changes
    }

    /// Round back to 1. Pointer and conditions stay as they are.
    pub fn reset_round(&mut self) -> Vec<Change> {
        self.round = 1;
        vec![self.change(Narration::RoundReset)]
    }

    /// Give the turn to a specific combatant without decay or round changes.
    pub fn set_active(&mut self, id: &CombatantId) -> Vec<Change> {
        let Some(combatant) = self.combatant(id) else {
            return Vec::new();
        };
        let narration = Narration::TurnChanged {
            name: combatant.name.clone(),
        };
        self.active_id = Some(id.clone());
        vec![self.change(narration)]
    }
}

// ============================================================================
// Tests
// ============================================================================
