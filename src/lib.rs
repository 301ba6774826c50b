/// Combat Tracker - Tormenta20 initiative tracker (TUI Edition)
///
/// Core library providing the turn/round engine, timed conditions,
/// HP/MP bookkeeping and snapshot persistence for tabletop game masters.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
