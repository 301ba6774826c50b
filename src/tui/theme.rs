//! Color theme for the combat tracker TUI.
//!
//! All color constants are RGB truecolor. Views import from here
//! instead of using inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

// ── Palette ─────────────────────────────────────────────────────────────────

/// Crimson: titles, the active turn marker.
pub const PRIMARY: Color = Color::Rgb(0xC6, 0x28, 0x28);
/// Parchment gold: round counter, focused borders.
pub const ACCENT: Color = Color::Rgb(0xE0, 0xB0, 0x4A);

pub const BG_BASE: Color = Color::Rgb(0x14, 0x12, 0x10);
/// Row background for the combatant whose turn it is.
pub const BG_ACTIVE: Color = Color::Rgb(0x3A, 0x1E, 0x1A);

pub const TEXT: Color = Color::Rgb(0xE8, 0xE2, 0xD6);
pub const TEXT_MUTED: Color = Color::Rgb(0x8C, 0x86, 0x7C);
pub const TEXT_DIM: Color = Color::Rgb(0x55, 0x50, 0x4A);

// ── Semantic ────────────────────────────────────────────────────────────────

pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
pub const SUCCESS: Color = Color::Rgb(0x66, 0xBB, 0x6A);
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);

// ── Domain ──────────────────────────────────────────────────────────────────

/// Mana bar.
pub const MANA: Color = Color::Rgb(0x42, 0x8B, 0xF5);
/// Condition chips.
pub const CONDITION: Color = Color::Rgb(0xBA, 0x68, 0xC8);

// ── Style helpers ───────────────────────────────────────────────────────────

pub fn title() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn heading() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Selected (cursor) row.
pub fn highlight() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// The row whose turn it is.
pub fn active_row() -> Style {
    Style::default().bg(BG_ACTIVE)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Key hint style (e.g., "[q]:quit").
pub fn key_hint() -> Style {
    Style::default().fg(ACCENT)
}

pub fn condition_chip() -> Style {
    Style::default().fg(CONDITION)
}

pub fn error() -> Style {
    Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
}

/// HP gauge color: green when healthy, amber when low, red when dying.
pub fn hp_color(ratio: f64, low: bool, dying: bool) -> Color {
    if dying {
        ERROR
    } else if low {
        WARNING
    } else if ratio > 0.0 {
        SUCCESS
    } else {
        TEXT_DIM
    }
}

/// Mode badge in the status bar.
pub fn mode_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

// ── Block builders ──────────────────────────────────────────────────────────

/// A bordered block with focused styling.
pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

/// A bordered block with default (unfocused) styling.
pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}
