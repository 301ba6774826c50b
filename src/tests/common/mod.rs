//! Common Test Utilities
//!
//! Session builders and log helpers shared by the unit and property suites.

pub mod fixtures;
