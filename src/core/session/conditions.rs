//! Condition Lifecycle
//!
//! Timed status effects attached to a combatant: add, bump, remove, and the
//! quiet per-turn decay that runs when the bearer's turn is left.
//!
//! Decay is one-directional. Retreating the turn pointer never gives rounds
//! back, so advance → retreat → advance ticks a condition exactly twice.

use serde::{Deserialize, Serialize};

use super::catalog::ConditionCatalog;
use super::combat::{CombatantId, Encounter, Rejection};
use super::log::{Change, Narration};

/// Upper bound for a condition's remaining rounds.
pub const DURATION_MAX: u32 = 999;

/// Duration used when none (or garbage) is supplied.
pub const DEFAULT_DURATION: u32 = 1;

/// Clamp a requested duration into `[0, DURATION_MAX]`, defaulting when absent.
pub fn clamp_duration(requested: Option<i64>) -> u32 {
    match requested {
        Some(n) => n.clamp(0, DURATION_MAX as i64) as u32,
        None => DEFAULT_DURATION,
    }
}

/// One condition on one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionInstance {
    /// Catalog name.
    pub name: String,
    /// Rounds left before automatic expiry.
    pub remaining: u32,
}

impl ConditionInstance {
    pub fn new(name: impl Into<String>, remaining: u32) -> Self {
        Self {
            name: name.into(),
            remaining: remaining.min(DURATION_MAX),
        }
    }
}

/// Result of nudging a condition's duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bumped {
    pub condition: ConditionInstance,
    /// The bump drove it to zero and it was taken off the list.
    pub expired: bool,
}

/// Ordered condition list for a single combatant.
///
/// Insertion order is display order and index order; nothing here sorts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionTracker {
    conditions: Vec<ConditionInstance>,
}

impl ConditionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_instances(conditions: Vec<ConditionInstance>) -> Self {
        Self { conditions }
    }

    /// Append a condition at the end of the list.
    pub fn push(&mut self, condition: ConditionInstance) {
        self.conditions.push(condition);
    }

    /// Shift remaining rounds by `delta`, clamped to `[0, DURATION_MAX]`.
    /// Reaching zero removes the instance.
    pub fn bump(&mut self, index: usize, delta: i32) -> Option<Bumped> {
        let condition = self.conditions.get_mut(index)?;
        let next = (condition.remaining as i64 + delta as i64).clamp(0, DURATION_MAX as i64);
        condition.remaining = next as u32;

        let snapshot = condition.clone();
        let expired = snapshot.remaining == 0;
        if expired {
            self.conditions.remove(index);
        }
        Some(Bumped {
            condition: snapshot,
            expired,
        })
    }

    /// Remove by position.
    pub fn remove(&mut self, index: usize) -> Option<ConditionInstance> {
        if index < self.conditions.len() {
            Some(self.conditions.remove(index))
        } else {
            None
        }
    }

    /// One tick: every positive duration drops by one, then everything at
    /// zero is filtered out. Returns the removed instances in list order.
    pub fn decay(&mut self) -> Vec<ConditionInstance> {
        for condition in &mut self.conditions {
            if condition.remaining > 0 {
                condition.remaining -= 1;
            }
        }

        let mut expired = Vec::new();
        self.conditions.retain(|c| {
            if c.remaining == 0 {
                expired.push(c.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn get(&self, index: usize) -> Option<&ConditionInstance> {
        self.conditions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConditionInstance> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConditionTracker {
    type Item = &'a ConditionInstance;
    type IntoIter = std::slice::Iter<'a, ConditionInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Lifecycle operations on the encounter
// ============================================================================

impl Encounter {
    /// Attach a catalog condition to a combatant.
    ///
    /// Blank or unknown names and unknown combatants are refused without
    /// touching state.
    pub fn add_condition(
        &mut self,
        id: &CombatantId,
        name: &str,
        duration: Option<i64>,
    ) -> Result<Vec<Change>, Rejection> {
        let name = name.trim();
        if !ConditionCatalog::tormenta20().is_known(name) {
            return Err(Rejection::UnknownCondition(name.to_string()));
        }
        let round = self.round();
        let combatant = self
            .combatant_mut(id)
            .ok_or_else(|| Rejection::UnknownCombatant(id.clone()))?;

        let duration = clamp_duration(duration);
        combatant.conditions.push(ConditionInstance::new(name, duration));
        tracing::debug!(combatant = %combatant.id, condition = name, duration, "condition added");

        Ok(vec![Change::new(
            round,
            Narration::ConditionAdded {
                name: combatant.name.clone(),
                condition: name.to_string(),
                duration,
            },
        )])
    }

    /// Nudge a condition's remaining rounds. The change is always narrated;
    /// reaching zero also removes it and narrates the expiry afterwards.
    pub fn bump_condition(&mut self, id: &CombatantId, index: usize, delta: i32) -> Vec<Change> {
        let round = self.round();
        let Some(combatant) = self.combatant_mut(id) else {
            return Vec::new();
        };
        let Some(bumped) = combatant.conditions.bump(index, delta) else {
            return Vec::new();
        };

        let mut changes = vec![Change::new(
            round,
            Narration::ConditionChanged {
                name: combatant.name.clone(),
                condition: bumped.condition.name.clone(),
                remaining: bumped.condition.remaining,
            },
        )];
        if bumped.expired {
            changes.push(Change::new(
                round,
                Narration::ConditionExpired {
                    name: combatant.name.clone(),
                    condition: bumped.condition.name,
                },
            ));
        }
        changes
    }

    /// Drop a condition by position regardless of its remaining rounds.
    pub fn remove_condition(&mut self, id: &CombatantId, index: usize) -> Vec<Change> {
        let round = self.round();
        let Some(combatant) = self.combatant_mut(id) else {
            return Vec::new();
        };
        let Some(removed) = combatant.conditions.remove(index) else {
            return Vec::new();
        };
        vec![Change::new(
            round,
            Narration::ConditionRemoved {
                name: combatant.name.clone(),
                condition: removed.name,
            },
        )]
    }

    /// Tick the active combatant's conditions. Only the turn advance calls this.
    pub(super) fn decay_on_leave_turn(&mut self) -> Vec<Change> {
        let round = self.round();
        let Some(active) = self.active_id().cloned() else {
            return Vec::new();
        };
        let Some(combatant) = self.combatant_mut(&active) else {
            return Vec::new();
        };

        combatant
            .conditions
            .decay()
            .into_iter()
            .map(|expired| {
                Change::new(
                    round,
                    Narration::ConditionExpired {
                        name: combatant.name.clone(),
                        condition: expired.name,
                    },
                )
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
