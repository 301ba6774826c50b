//! In-crate test suites.
//!
//! - `unit`: scenario tests that drive [`CombatSession`](crate::core::session::CombatSession)
//!   through whole encounters and check state plus narration.
//! - `property`: proptest suites for the engine invariants.

mod common;
mod property;
