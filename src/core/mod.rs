pub mod logging;

// Combat engine: roster, turns, conditions, narration
pub mod session;

// Snapshot persistence and import/export
pub mod storage;
