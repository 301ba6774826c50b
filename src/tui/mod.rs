//! Terminal front-end: the combat screen, its widgets and theme.

pub mod app;
pub mod theme;
pub mod views;
pub mod widgets;
