//! Session Module
//!
//! The combat engine: roster, turn order and rounds, timed conditions, the
//! Tormenta20 condition catalog and the narrated event log.

pub mod catalog;
pub mod combat;
pub mod conditions;
pub mod log;
pub mod naming;
pub mod tracker;

// Re-exports for convenience
pub use catalog::{collation_key, CatalogEntry, ConditionCatalog};

pub use combat::{
    Combatant, CombatantId, Encounter, NewCombatant, Rejection, ResourceField, StatBlock,
    StatField, RESOURCE_LIMIT, ROUND_MAX,
};

pub use conditions::{
    clamp_duration, Bumped, ConditionInstance, ConditionTracker, DEFAULT_DURATION, DURATION_MAX,
};

pub use log::{Change, EventLog, Narration, Pool, LOG_CAPACITY, UNNAMED};

pub use naming::increment_name;

pub use tracker::CombatSession;
