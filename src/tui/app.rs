use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame, Terminal,
};

use super::theme;
use super::views::combat::{CombatViewState, Outcome};
use crate::config::AppConfig;
use crate::core::session::CombatSession;
use crate::core::storage::{self, SessionStore};

pub struct App {
    running: bool,
    show_help: bool,
    combat: CombatViewState,
    store: Box<dyn SessionStore>,
}

impl App {
    pub fn new(session: CombatSession, store: Box<dyn SessionStore>, config: &AppConfig) -> Self {
        Self {
            running: true,
            show_help: false,
            combat: CombatViewState::new(
                session,
                config.combat.default_condition_duration,
                config.export_path(),
            ),
            store,
        }
    }

    pub fn session(&self) -> &CombatSession {
        self.combat.session()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ── Event loop ──────────────────────────────────────────────────────

    /// Main loop: render → poll → update, until the view asks to quit.
    pub fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                let event = event::read()?;
                self.handle_event(&event);
            }
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press && self.handle_global_key(key) {
                return;
            }
        }

        match self.combat.handle_input(event) {
            Outcome::Changed => self.persist(),
            Outcome::Quit => self.running = false,
            Outcome::Handled | Outcome::Ignored => {}
        }
    }

    fn handle_global_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return true;
        }
        if self.show_help {
            // any key dismisses
            self.show_help = false;
            return true;
        }
        if key.code == KeyCode::F(1) {
            self.show_help = true;
            return true;
        }
        false
    }

    fn persist(&self) {
        storage::persist(self.store.as_ref(), self.combat.session());
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        self.combat.render(frame, area);
        if self.show_help {
            render_help_modal(frame, area);
        }
    }
}

const HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Turns",
        &[
            ("Space", "Next turn"),
            ("Backspace", "Previous turn"),
            ("t", "Give the turn to the selected combatant"),
            ("R", "Reset round to 1"),
        ],
    ),
    (
        "Roster",
        &[
            ("j/k", "Select"),
            ("a", "Add combatant"),
            ("D", "Duplicate"),
            ("X", "Remove"),
            ("s / A", "Sort by initiative / toggle auto-sort"),
            ("J/K", "Move down / up"),
            ("Enter", "Expand / collapse"),
        ],
    ),
    (
        "Sheet",
        &[
            ("[ ] { }", "HP -1 +1 -5 +5"),
            (", . < >", "MP -1 +1 -5 +5"),
            ("e", "Edit HP/MP (Tab cycles)"),
            ("i", "Edit initiative"),
            ("n", "Edit notes & stats (Tab cycles)"),
        ],
    ),
    (
        "Conditions",
        &[
            ("c", "Add condition"),
            ("C", "Manage conditions (+/- rounds, x remove)"),
        ],
    ),
    (
        "Session",
        &[
            ("l / L", "Show log / clear log"),
            ("PgUp/PgDn", "Scroll log (Home newest, End oldest)"),
            ("E / I", "Export / import"),
            ("N", "New combat"),
            ("q", "Quit"),
        ],
    ),
];

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let modal = centered_rect(60, 80, area);
    let mut lines = Vec::new();
    for (section, keys) in HELP {
        lines.push(Line::from(Span::styled(*section, theme::heading())));
        for (key, action) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<12}"), theme::key_hint()),
                Span::styled(*action, Style::default().fg(theme::TEXT)),
            ]));
        }
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(Span::styled("Press any key to close", theme::dim())));

    frame.render_widget(Clear, modal);
    frame.render_widget(
        Paragraph::new(lines).block(theme::block_focused("Help")),
        modal,
    );
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
