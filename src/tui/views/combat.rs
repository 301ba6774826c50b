//! Combat Tracker view.
//!
//! One screen: the turn order on the left, the selected combatant's sheet on
//! the right, an optional event log underneath. Modal prompts (add form,
//! numeric edits, condition picker, confirmations) are drawn as overlays.
//!
//! The view drives a [`CombatSession`] and reports through [`Outcome`]
//! whether the session changed, so the caller knows when to persist.

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::core::session::{
    CombatSession, Combatant, CombatantId, ConditionCatalog, NewCombatant, Pool, ResourceField,
    StatField,
};
use crate::core::storage::snapshot;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::InputBuffer;

/// Log lines moved per PageUp/PageDown.
const LOG_PAGE: usize = 5;

// ============================================================================
// Modes
// ============================================================================

/// Result of feeding one event to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    /// Consumed; only view state changed.
    Handled,
    /// The session changed and should be persisted.
    Changed,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddField {
    Name,
    Initiative,
    HitPoints,
    Mana,
}

impl AddField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Initiative,
            Self::Initiative => Self::HitPoints,
            Self::HitPoints => Self::Mana,
            Self::Mana => Self::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Name => Self::Mana,
            Self::Initiative => Self::Name,
            Self::HitPoints => Self::Initiative,
            Self::Mana => Self::HitPoints,
        }
    }
}

#[derive(Debug, Clone)]
struct AddForm {
    field: AddField,
    name: InputBuffer,
    init: InputBuffer,
    hp: InputBuffer,
    mp: InputBuffer,
    error: Option<String>,
}

impl AddForm {
    fn new() -> Self {
        Self {
            field: AddField::Name,
            name: InputBuffer::new(),
            init: InputBuffer::integer(),
            hp: InputBuffer::integer(),
            mp: InputBuffer::integer(),
            error: None,
        }
    }

    fn focused(&mut self) -> &mut InputBuffer {
        match self.field {
            AddField::Name => &mut self.name,
            AddField::Initiative => &mut self.init,
            AddField::HitPoints => &mut self.hp,
            AddField::Mana => &mut self.mp,
        }
    }

    fn draft(&self) -> NewCombatant {
        NewCombatant {
            name: self.name.text().to_string(),
            init: self.init.parse_int().map(saturate_i32),
            hp: self.hp.parse_int().map_or(0, saturate_i32),
            mp: self.mp.parse_int().map_or(0, saturate_i32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberTarget {
    Resource(ResourceField),
    Initiative,
}

impl NumberTarget {
    fn label(self) -> &'static str {
        match self {
            Self::Resource(field) => field.label(),
            Self::Initiative => "Initiative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    Notes,
    Stat(StatField),
}

impl TextTarget {
    const CYCLE: [TextTarget; 4] = [
        TextTarget::Notes,
        TextTarget::Stat(StatField::Defense),
        TextTarget::Stat(StatField::Resistances),
        TextTarget::Stat(StatField::DifficultyClass),
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Notes => "Notes",
            Self::Stat(field) => field.label(),
        }
    }

    fn next(self) -> Self {
        let pos = Self::CYCLE.iter().position(|t| *t == self).unwrap_or(0);
        Self::CYCLE[(pos + 1) % Self::CYCLE.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Remove(CombatantId),
    ClearLog,
    NewCombat,
}

impl Pending {
    fn question(&self, session: &CombatSession) -> String {
        match self {
            Self::Remove(id) => {
                let name = session
                    .encounter()
                    .combatant(id)
                    .map(|c| c.display_name().to_string())
                    .unwrap_or_default();
                format!("Remove {name} from combat?")
            }
            Self::ClearLog => "Clear the combat log?".to_string(),
            Self::NewCombat => "Start a new combat? Everything will be lost.".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Normal,
    Add(AddForm),
    EditNumber { target: NumberTarget, input: InputBuffer },
    EditText { target: TextTarget, input: InputBuffer },
    ConditionPicker { cursor: usize, duration: InputBuffer },
    ConditionFocus { index: usize },
    Confirm(Pending),
}

impl Mode {
    fn badge(&self) -> &'static str {
        match self {
            Self::Normal => "COMBAT",
            Self::Add(_) => "ADD",
            Self::EditNumber { .. } | Self::EditText { .. } => "EDIT",
            Self::ConditionPicker { .. } => "CONDITION",
            Self::ConditionFocus { .. } => "CONDITIONS",
            Self::Confirm(_) => "CONFIRM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Status {
    text: String,
    is_error: bool,
}

// ============================================================================
// Combat View State
// ============================================================================

pub struct CombatViewState {
    session: CombatSession,
    selected: usize,
    mode: Mode,
    status: Option<Status>,
    default_duration: u32,
    export_path: PathBuf,
    /// Lines scrolled past the newest log entry. Clamped when drawn.
    log_scroll: usize,
}

impl CombatViewState {
    pub fn new(session: CombatSession, default_duration: u32, export_path: PathBuf) -> Self {
        let selected = session.encounter().active_index().unwrap_or(0);
        Self {
            session,
            selected,
            mode: Mode::Normal,
            status: None,
            default_duration,
            export_path,
            log_scroll: 0,
        }
    }

    pub fn session(&self) -> &CombatSession {
        &self.session
    }

    fn selected_combatant(&self) -> Option<&Combatant> {
        self.session.encounter().combatants().get(self.selected)
    }

    fn selected_id(&self) -> Option<CombatantId> {
        self.selected_combatant().map(|c| c.id.clone())
    }

    fn select(&mut self, id: &CombatantId) {
        if let Some(pos) = self.session.encounter().index_of(id) {
            self.selected = pos;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.session.encounter().len();
        self.selected = if len == 0 { 0 } else { self.selected.min(len - 1) };
    }

    fn follow_turn(&mut self) {
        if let Some(pos) = self.session.encounter().active_index() {
            self.selected = pos;
        }
    }

    fn scroll_log_down(&mut self, n: usize) {
        let max = self.session.log().len().saturating_sub(1);
        self.log_scroll = self.log_scroll.saturating_add(n).min(max);
    }

    fn scroll_log_up(&mut self, n: usize) {
        self.log_scroll = self.log_scroll.saturating_sub(n);
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    fn fail(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: true,
        });
    }

    // ────────────────────────────────────────────────────────────────────
    // Input handling
    // ────────────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event) -> Outcome {
        let Event::Key(key) = event else {
            return Outcome::Ignored;
        };
        if key.kind != KeyEventKind::Press {
            return Outcome::Ignored;
        }

        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let (next, outcome) = match mode {
            Mode::Normal => (Mode::Normal, Outcome::Ignored),
            Mode::Add(form) => self.handle_add(form, key),
            Mode::EditNumber { target, input } => self.handle_edit_number(target, input, key),
            Mode::EditText { target, input } => self.handle_edit_text(target, input, key),
            Mode::ConditionPicker { cursor, duration } => {
                self.handle_condition_picker(cursor, duration, key)
            }
            Mode::ConditionFocus { index } => self.handle_condition_focus(index, key),
            Mode::Confirm(pending) => self.handle_confirm(pending, key),
        };
        self.mode = next;

        if matches!(self.mode, Mode::Normal) && outcome == Outcome::Ignored {
            return self.handle_normal(key);
        }
        outcome
    }

    fn handle_normal(&mut self, key: &KeyEvent) -> Outcome {
        let len = self.session.encounter().len();
        let selected = self.selected_id();

        match key.code {
            KeyCode::Char('q') => Outcome::Quit,
            KeyCode::Char('j') | KeyCode::Down => {
                if len > 0 {
                    self.selected = (self.selected + 1) % len;
                }
                Outcome::Handled
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if len > 0 {
                    self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
                }
                Outcome::Handled
            }

            // turns
            KeyCode::Char(' ') => {
                self.session.advance_turn();
                self.follow_turn();
                Outcome::Changed
            }
            KeyCode::Backspace => {
                self.session.retreat_turn();
                self.follow_turn();
                Outcome::Changed
            }
            KeyCode::Char('R') => {
                self.session.reset_round();
                Outcome::Changed
            }
            KeyCode::Char('t') => match selected {
                Some(id) => {
                    self.session.set_active(&id);
                    Outcome::Changed
                }
                None => Outcome::Handled,
            },

            // roster
            KeyCode::Char('a') => {
                self.mode = Mode::Add(AddForm::new());
                Outcome::Handled
            }
            KeyCode::Char('D') => match selected.and_then(|id| self.session.duplicate_combatant(&id)) {
                Some(copy) => {
                    self.select(&copy);
                    Outcome::Changed
                }
                None => Outcome::Handled,
            },
            KeyCode::Char('X') => {
                if let Some(id) = selected {
                    self.mode = Mode::Confirm(Pending::Remove(id));
                }
                Outcome::Handled
            }
            KeyCode::Char('s') => {
                self.session.sort();
                if let Some(id) = selected {
                    self.select(&id);
                }
                Outcome::Changed
            }
            KeyCode::Char('A') => {
                let on = !self.session.encounter().auto_sort();
                self.session.set_auto_sort(on);
                self.info(if on { "Auto-sort on" } else { "Auto-sort off" });
                Outcome::Changed
            }
            KeyCode::Char('J') | KeyCode::Char('K') => {
                let offset = if key.code == KeyCode::Char('J') { 1 } else { -1 };
                match selected {
                    Some(id) if self.session.shift(&id, offset) => {
                        self.select(&id);
                        Outcome::Changed
                    }
                    _ => Outcome::Handled,
                }
            }
            KeyCode::Enter => match selected {
                Some(id) => {
                    self.session.toggle_open(&id);
                    Outcome::Changed
                }
                None => Outcome::Handled,
            },

            // resources
            KeyCode::Char(c @ ('[' | ']' | '{' | '}' | ',' | '.' | '<' | '>')) => {
                let Some(id) = selected else {
                    return Outcome::Handled;
                };
                let (pool, delta) = match c {
                    '[' => (Pool::Hp, -1),
                    ']' => (Pool::Hp, 1),
                    '{' => (Pool::Hp, -5),
                    '}' => (Pool::Hp, 5),
                    ',' => (Pool::Mp, -1),
                    '.' => (Pool::Mp, 1),
                    '<' => (Pool::Mp, -5),
                    _ => (Pool::Mp, 5),
                };
                self.session.apply_delta(&id, pool, delta);
                Outcome::Changed
            }
            KeyCode::Char('e') => self.open_number_editor(NumberTarget::Resource(ResourceField::HpCurrent)),
            KeyCode::Char('i') => self.open_number_editor(NumberTarget::Initiative),
            KeyCode::Char('n') => self.open_text_editor(TextTarget::Notes),

            // conditions
            KeyCode::Char('c') => {
                if selected.is_some() {
                    self.mode = Mode::ConditionPicker {
                        cursor: 0,
                        duration: InputBuffer::integer().with_value(self.default_duration.to_string()),
                    };
                }
                Outcome::Handled
            }
            KeyCode::Char('C') => {
                if self.selected_combatant().is_some_and(|c| !c.conditions.is_empty()) {
                    self.mode = Mode::ConditionFocus { index: 0 };
                }
                Outcome::Handled
            }

            // log & session
            KeyCode::Char('l') => {
                self.session.toggle_log();
                Outcome::Changed
            }
            KeyCode::Char('L') => {
                self.mode = Mode::Confirm(Pending::ClearLog);
                Outcome::Handled
            }
            KeyCode::PageDown => {
                self.scroll_log_down(LOG_PAGE);
                Outcome::Handled
            }
            KeyCode::PageUp => {
                self.scroll_log_up(LOG_PAGE);
                Outcome::Handled
            }
            KeyCode::Home => {
                self.log_scroll = 0;
                Outcome::Handled
            }
            KeyCode::End => {
                self.scroll_log_down(usize::MAX);
                Outcome::Handled
            }
            KeyCode::Char('N') => {
                self.mode = Mode::Confirm(Pending::NewCombat);
                Outcome::Handled
            }
            KeyCode::Char('E') => {
                match snapshot::export_to(&self.session, &self.export_path) {
                    Ok(()) => self.info(format!("Exported to {}", self.export_path.display())),
                    Err(e) => self.fail(e.to_string()),
                }
                Outcome::Handled
            }
            KeyCode::Char('I') => match snapshot::import_from(&self.export_path) {
                Ok(session) => {
                    self.session = session;
                    self.selected = self.session.encounter().active_index().unwrap_or(0);
                    self.log_scroll = 0;
                    self.info(format!("Imported {}", self.export_path.display()));
                    Outcome::Changed
                }
                Err(e) => {
                    self.fail(e.to_string());
                    Outcome::Handled
                }
            },
            KeyCode::Esc => {
                self.status = None;
                Outcome::Handled
            }
            _ => Outcome::Ignored,
        }
    }

    fn open_number_editor(&mut self, target: NumberTarget) -> Outcome {
        if let Some(c) = self.selected_combatant() {
            let current = number_value(c, target);
            self.mode = Mode::EditNumber {
                target,
                input: InputBuffer::integer().with_value(current.to_string()),
            };
        }
        Outcome::Handled
    }

    fn open_text_editor(&mut self, target: TextTarget) -> Outcome {
        if let Some(c) = self.selected_combatant() {
            let current = text_value(c, target).to_string();
            self.mode = Mode::EditText {
                target,
                input: InputBuffer::new().with_value(current),
            };
        }
        Outcome::Handled
    }

    fn handle_add(&mut self, mut form: AddForm, key: &KeyEvent) -> (Mode, Outcome) {
        match key.code {
            KeyCode::Esc => (Mode::Normal, Outcome::Handled),
            KeyCode::Tab => {
                form.field = form.field.next();
                (Mode::Add(form), Outcome::Handled)
            }
            KeyCode::BackTab => {
                form.field = form.field.prev();
                (Mode::Add(form), Outcome::Handled)
            }
            KeyCode::Enter => match self.session.add_combatant(form.draft()) {
                Ok(id) => {
                    self.select(&id);
                    // keep the form open for the next entry
                    (Mode::Add(AddForm::new()), Outcome::Changed)
                }
                Err(rejection) => {
                    form.error = Some(rejection.to_string());
                    (Mode::Add(form), Outcome::Handled)
                }
            },
            _ => {
                form.focused().handle_key(key);
                form.error = None;
                (Mode::Add(form), Outcome::Handled)
            }
        }
    }

    fn handle_edit_number(
        &mut self,
        target: NumberTarget,
        mut input: InputBuffer,
        key: &KeyEvent,
    ) -> (Mode, Outcome) {
        match key.code {
            KeyCode::Esc => (Mode::Normal, Outcome::Handled),
            KeyCode::Enter => {
                let outcome = self.commit_number(target, &input);
                (Mode::Normal, outcome)
            }
            KeyCode::Tab => {
                let NumberTarget::Resource(field) = target else {
                    return (Mode::EditNumber { target, input }, Outcome::Handled);
                };
                let outcome = self.commit_number(target, &input);
                let pos = ResourceField::ALL.iter().position(|f| *f == field).unwrap_or(0);
                let next = NumberTarget::Resource(ResourceField::ALL[(pos + 1) % ResourceField::ALL.len()]);
                let value = self.selected_combatant().map_or(0, |c| number_value(c, next));
                let input = InputBuffer::integer().with_value(value.to_string());
                (Mode::EditNumber { target: next, input }, outcome)
            }
            _ => {
                input.handle_key(key);
                (Mode::EditNumber { target, input }, Outcome::Handled)
            }
        }
    }

    fn commit_number(&mut self, target: NumberTarget, input: &InputBuffer) -> Outcome {
        let Some(id) = self.selected_id() else {
            return Outcome::Handled;
        };
        match target {
            NumberTarget::Resource(field) => match input.parse_int() {
                Some(value) if self.session.update_field(&id, field, value) => Outcome::Changed,
                _ => Outcome::Handled,
            },
            NumberTarget::Initiative => {
                let init = input.parse_int().map_or(0, saturate_i32);
                self.session.update_initiative(&id, init);
                self.select(&id);
                Outcome::Changed
            }
        }
    }

    fn handle_edit_text(
        &mut self,
        target: TextTarget,
        mut input: InputBuffer,
        key: &KeyEvent,
    ) -> (Mode, Outcome) {
        match key.code {
            KeyCode::Esc => (Mode::Normal, Outcome::Handled),
            KeyCode::Enter => {
                let outcome = self.commit_text(target, &input);
                (Mode::Normal, outcome)
            }
            KeyCode::Tab => {
                let outcome = self.commit_text(target, &input);
                let next = target.next();
                let value = self
                    .selected_combatant()
                    .map(|c| text_value(c, next).to_string())
                    .unwrap_or_default();
                (
                    Mode::EditText {
                        target: next,
                        input: InputBuffer::new().with_value(value),
                    },
                    outcome,
                )
            }
            _ => {
                input.handle_key(key);
                (Mode::EditText { target, input }, Outcome::Handled)
            }
        }
    }

    fn commit_text(&mut self, target: TextTarget, input: &InputBuffer) -> Outcome {
        let Some(id) = self.selected_id() else {
            return Outcome::Handled;
        };
        let applied = match target {
            TextTarget::Notes => self.session.update_notes(&id, input.text()),
            TextTarget::Stat(field) => self.session.update_stat(&id, field, input.text()),
        };
        if applied {
            Outcome::Changed
        } else {
            Outcome::Handled
        }
    }

    fn handle_condition_picker(
        &mut self,
        cursor: usize,
        mut duration: InputBuffer,
        key: &KeyEvent,
    ) -> (Mode, Outcome) {
        let catalog = ConditionCatalog::tormenta20();
        let count = catalog.len().max(1);
        match key.code {
            KeyCode::Esc => (Mode::Normal, Outcome::Handled),
            KeyCode::Down | KeyCode::Char('j') => (
                Mode::ConditionPicker { cursor: (cursor + 1) % count, duration },
                Outcome::Handled,
            ),
            KeyCode::Up | KeyCode::Char('k') => (
                Mode::ConditionPicker { cursor: (cursor + count - 1) % count, duration },
                Outcome::Handled,
            ),
            KeyCode::Enter => {
                let (Some(id), Some(entry)) = (self.selected_id(), catalog.entries().get(cursor)) else {
                    return (Mode::Normal, Outcome::Handled);
                };
                match self.session.add_condition(&id, entry.name, duration.parse_int()) {
                    Ok(()) => (Mode::Normal, Outcome::Changed),
                    Err(rejection) => {
                        self.fail(rejection.to_string());
                        (Mode::Normal, Outcome::Handled)
                    }
                }
            }
            _ => {
                duration.handle_key(key);
                (Mode::ConditionPicker { cursor, duration }, Outcome::Handled)
            }
        }
    }

    fn handle_condition_focus(&mut self, index: usize, key: &KeyEvent) -> (Mode, Outcome) {
        let Some(id) = self.selected_id() else {
            return (Mode::Normal, Outcome::Handled);
        };
        let count = self.selected_combatant().map_or(0, |c| c.conditions.len());
        if count == 0 {
            return (Mode::Normal, Outcome::Handled);
        }

        let outcome = match key.code {
            KeyCode::Esc | KeyCode::Char('C') => return (Mode::Normal, Outcome::Handled),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Right => {
                return (Mode::ConditionFocus { index: (index + 1) % count }, Outcome::Handled);
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Left => {
                return (
                    Mode::ConditionFocus { index: (index + count - 1) % count },
                    Outcome::Handled,
                );
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.session.bump_condition(&id, index, 1);
                Outcome::Changed
            }
            KeyCode::Char('-') => {
                self.session.bump_condition(&id, index, -1);
                Outcome::Changed
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                self.session.remove_condition(&id, index);
                Outcome::Changed
            }
            _ => Outcome::Handled,
        };

        let remaining = self.selected_combatant().map_or(0, |c| c.conditions.len());
        if remaining == 0 {
            (Mode::Normal, outcome)
        } else {
            (Mode::ConditionFocus { index: index.min(remaining - 1) }, outcome)
        }
    }

    fn handle_confirm(&mut self, pending: Pending, key: &KeyEvent) -> (Mode, Outcome) {
        let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter);
        if !confirmed {
            return (Mode::Normal, Outcome::Handled);
        }
        match pending {
            Pending::Remove(id) => {
                self.session.remove_combatant(&id);
                self.clamp_selection();
            }
            Pending::ClearLog => {
                self.session.clear_log();
                self.log_scroll = 0;
            }
            Pending::NewCombat => {
                self.session.new_combat();
                self.selected = 0;
                self.log_scroll = 0;
            }
        }
        (Mode::Normal, Outcome::Changed)
    }

    // ────────────────────────────────────────────────────────────────────
    // Rendering
    // ────────────────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(area);

        self.render_header(frame, rows[0]);

        let body = if self.session.log_open() {
            let split = Layout::vertical([Constraint::Min(6), Constraint::Length(10)]).split(rows[1]);
            self.render_log(frame, split[1]);
            split[0]
        } else {
            rows[1]
        };

        let columns =
            Layout::horizontal([Constraint::Percentage(58), Constraint::Percentage(42)]).split(body);
        self.render_turn_order(frame, columns[0]);
        self.render_sheet(frame, columns[1]);

        self.render_footer(frame, rows[2]);

        match &self.mode {
            Mode::Normal | Mode::ConditionFocus { .. } => {}
            Mode::Add(form) => self.render_add_form(frame, area, form),
            Mode::EditNumber { target, input } => {
                render_prompt(frame, area, target.label(), input)
            }
            Mode::EditText { target, input } => render_prompt(frame, area, target.label(), input),
            Mode::ConditionPicker { cursor, duration } => {
                self.render_condition_picker(frame, area, *cursor, duration)
            }
            Mode::Confirm(pending) => render_confirm(frame, area, &pending.question(&self.session)),
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let encounter = self.session.encounter();
        let turn = encounter.active().map(Combatant::display_name).unwrap_or("—");

        let mut spans = vec![
            Span::styled(" Tormenta20 Combat ", theme::title()),
            Span::styled(format!(" Round {} ", encounter.round()), theme::heading()),
            Span::styled("│ ", theme::dim()),
            Span::styled("Turn: ", theme::muted()),
            Span::styled(turn.to_string(), Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD)),
        ];
        if encounter.auto_sort() {
            spans.push(Span::styled("  ⇅ auto", theme::muted()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_turn_order(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Initiative");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let encounter = self.session.encounter();
        if encounter.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" No combatants. Press a to add one.", theme::dim())),
                inner,
            );
            return;
        }

        let active = encounter.active_index();
        let name_width = (inner.width as usize).saturating_sub(32).max(6);
        let mut lines: Vec<Line> = Vec::new();
        let mut selected_line = 0;

        for (i, c) in encounter.combatants().iter().enumerate() {
            let is_active = Some(i) == active;
            let is_selected = i == self.selected;
            if is_selected {
                selected_line = lines.len();
            }

            let marker = match (is_active, is_selected) {
                (true, true) => "▸▶",
                (true, false) => " ▶",
                (false, true) => "▸ ",
                (false, false) => "  ",
            };
            let name_style = if is_selected {
                theme::highlight()
            } else if c.is_dying() {
                Style::default().fg(theme::ERROR)
            } else {
                Style::default().fg(theme::TEXT)
            };

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(theme::PRIMARY)),
                Span::styled(format!("{:>3} ", c.init), theme::heading()),
                Span::styled(format!("{:<name_width$}", truncate_name(c.display_name(), name_width)), name_style),
                resource_span(c, Pool::Hp),
                resource_span(c, Pool::Mp),
            ];
            if c.has_notes() {
                spans.push(Span::styled(" ✎", theme::muted()));
            }
            for cond in &c.conditions {
                spans.push(Span::styled(format!(" {}({})", cond.name, cond.remaining), theme::condition_chip()));
            }

            let mut line = Line::from(spans);
            if is_active {
                line = line.style(theme::active_row());
            }
            lines.push(line);

            if c.open {
                lines.push(Line::from(vec![
                    Span::raw("      "),
                    Span::styled(
                        format!(
                            "Def {}  Res {}  DC {}",
                            or_dash(&c.stats.defense),
                            or_dash(&c.stats.resistances),
                            or_dash(&c.stats.difficulty_class)
                        ),
                        theme::muted(),
                    ),
                ]));
                if c.has_notes() {
                    lines.push(Line::from(vec![
                        Span::raw("      "),
                        Span::styled(c.notes.clone(), theme::dim()),
                    ]));
                }
            }
        }

        let visible = inner.height as usize;
        let scroll = selected_line.saturating_sub(visible.saturating_sub(1));
        frame.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), inner);
    }

    fn render_sheet(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_default("Combatant");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(c) = self.selected_combatant() else {
            frame.render_widget(Paragraph::new(Span::styled(" Nothing selected", theme::dim())), inner);
            return;
        };

        let bar_width = (inner.width as usize).saturating_sub(22).clamp(4, 24);
        let mut lines = vec![
            Line::from(vec![
                Span::styled(c.display_name().to_string(), theme::title()),
                Span::styled(format!("  INIT {}", c.init), theme::heading()),
            ]),
            gauge_line("HP", c.hp_cur, c.hp_max, c.hp_ratio(), bar_width, theme::hp_color(c.hp_ratio(), c.is_low(), c.is_dying()), c.is_over_max(Pool::Hp)),
            gauge_line("MP", c.mp_cur, c.mp_max, c.mp_ratio(), bar_width, theme::MANA, c.is_over_max(Pool::Mp)),
        ];
        if c.is_dying() {
            lines.push(Line::from(Span::styled(" Dying", theme::error())));
        }

        lines.push(Line::raw(""));
        for field in StatField::ALL {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<12}", field.label()), theme::muted()),
                Span::raw(or_dash(c.stats.get(field)).to_string()),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(" Conditions", theme::heading())));
        if c.conditions.is_empty() {
            lines.push(Line::from(Span::styled("  none", theme::dim())));
        }
        let focus = match self.mode {
            Mode::ConditionFocus { index } => Some(index),
            _ => None,
        };
        let catalog = ConditionCatalog::tormenta20();
        for (i, cond) in c.conditions.iter().enumerate() {
            let focused = focus == Some(i);
            let style = if focused { theme::highlight() } else { theme::condition_chip() };
            lines.push(Line::from(vec![
                Span::styled(if focused { " ▸ " } else { "   " }, style),
                Span::styled(cond.name.clone(), style),
                Span::styled(format!("  {}r", cond.remaining), theme::muted()),
            ]));
            if focused {
                if let Some(text) = catalog.description(&cond.name) {
                    lines.push(Line::from(Span::styled(format!("     {text}"), theme::dim())));
                }
            }
        }

        if c.has_notes() {
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled(" Notes: ", theme::muted()),
                Span::raw(c.notes.clone()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn render_log(&self, frame: &mut Frame, area: Rect) {
        let log = self.session.log();
        let title = format!("Log ({})", log.len());
        let block = theme::block_default(&title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if log.is_empty() {
            frame.render_widget(Paragraph::new(Span::styled(" No events yet", theme::dim())), inner);
            return;
        }

        let visible_height = inner.height as usize;
        let total = log.len();
        let max_scroll = total.saturating_sub(visible_height);
        let offset = self.log_scroll.min(max_scroll);

        let lines: Vec<Line> = log
            .newest_first()
            .skip(offset)
            .take(visible_height)
            .map(|entry| Line::from(Span::styled(entry.to_string(), theme::muted())))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        if total > visible_height {
            let mut state = ScrollbarState::new(max_scroll).position(offset);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .thumb_style(Style::default().fg(theme::ACCENT))
                    .track_style(theme::dim()),
                inner,
                &mut state,
            );
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hints: &[(&str, &str)] = match self.mode {
            Mode::ConditionFocus { .. } => &[("j/k", "pick"), ("+/-", "rounds"), ("x", "remove"), ("Esc", "back")],
            Mode::Normal => &[
                ("Space", "next"),
                ("⌫", "prev"),
                ("a", "add"),
                ("[ ] { }", "HP"),
                (", . < >", "MP"),
                ("c", "cond"),
                ("C", "conds"),
                ("e", "edit"),
                ("s", "sort"),
                ("l", "log"),
                ("q", "quit"),
            ],
            _ => &[("Enter", "ok"), ("Tab", "next field"), ("Esc", "cancel")],
        };

        let mut spans = vec![Span::styled(format!(" {} ", self.mode.badge()), theme::mode_badge()), Span::raw(" ")];
        for (key, label) in hints {
            spans.push(Span::styled(*key, theme::key_hint()));
            spans.push(Span::styled(format!(":{label} "), theme::dim()));
        }

        let status = match &self.status {
            Some(Status { text, is_error: true }) => Line::from(Span::styled(format!(" {text}"), theme::error())),
            Some(Status { text, .. }) => Line::from(Span::styled(format!(" {text}"), theme::muted())),
            None => Line::raw(""),
        };
        frame.render_widget(Paragraph::new(vec![Line::from(spans), status]), area);
    }

    fn render_add_form(&self, frame: &mut Frame, area: Rect, form: &AddForm) {
        let modal = centered(area, 44, 8);
        frame.render_widget(Clear, modal);
        let block = theme::block_focused("Add Combatant").style(Style::default().bg(theme::BG_BASE));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let label = theme::muted();
        let mut lines = vec![
            form.name.line("Name", form.field == AddField::Name, label),
            form.init.line("Init", form.field == AddField::Initiative, label),
            form.hp.line("HP  ", form.field == AddField::HitPoints, label),
            form.mp.line("MP  ", form.field == AddField::Mana, label),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(error.clone(), theme::error())));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_condition_picker(&self, frame: &mut Frame, area: Rect, cursor: usize, duration: &InputBuffer) {
        let catalog = ConditionCatalog::tormenta20();
        let modal = centered(area, 64, 22);
        frame.render_widget(Clear, modal);
        let block = theme::block_focused("Add Condition").style(Style::default().bg(theme::BG_BASE));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let parts = Layout::horizontal([Constraint::Length(20), Constraint::Min(10)]).split(inner);

        let names: Vec<Line> = catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                if i == cursor {
                    Line::from(Span::styled(format!("▸ {}", entry.name), theme::highlight()))
                } else {
                    Line::from(Span::raw(format!("  {}", entry.name)))
                }
            })
            .collect();
        let visible = parts[0].height as usize;
        let scroll = cursor.saturating_sub(visible.saturating_sub(1));
        frame.render_widget(Paragraph::new(names).scroll((scroll as u16, 0)), parts[0]);

        let description = catalog
            .entries()
            .get(cursor)
            .map(|e| e.description)
            .unwrap_or_default();
        let detail = vec![
            duration.line("Rounds", true, theme::muted()),
            Line::raw(""),
            Line::from(Span::styled(description, Style::default().fg(theme::TEXT))),
        ];
        frame.render_widget(
            Paragraph::new(detail)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::LEFT).border_style(theme::dim())),
            parts[1],
        );
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn number_value(c: &Combatant, target: NumberTarget) -> i32 {
    match target {
        NumberTarget::Resource(field) => c.field(field),
        NumberTarget::Initiative => c.init,
    }
}

fn text_value(c: &Combatant, target: TextTarget) -> &str {
    match target {
        TextTarget::Notes => &c.notes,
        TextTarget::Stat(field) => c.stats.get(field),
    }
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        "—"
    } else {
        text
    }
}

/// `cur/max`, with a `+` when current runs over the maximum.
fn resource_text(cur: i32, max: i32, over: bool) -> String {
    if over {
        format!("+{cur}/{max}")
    } else {
        format!("{cur}/{max}")
    }
}

fn resource_span(c: &Combatant, pool: Pool) -> Span<'static> {
    let (cur, max, color) = match pool {
        Pool::Hp => (c.hp_cur, c.hp_max, theme::hp_color(c.hp_ratio(), c.is_low(), c.is_dying())),
        Pool::Mp => (c.mp_cur, c.mp_max, theme::MANA),
    };
    Span::styled(
        format!(" {}:{:>11}", pool.label(), resource_text(cur, max, c.is_over_max(pool))),
        Style::default().fg(color),
    )
}

fn gauge_line(
    label: &'static str,
    cur: i32,
    max: i32,
    ratio: f64,
    width: usize,
    color: ratatui::style::Color,
    over: bool,
) -> Line<'static> {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    Line::from(vec![
        Span::styled(format!(" {label} "), theme::muted()),
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled("░".repeat(width - filled), theme::dim()),
        Span::styled(
            format!(" {}", resource_text(cur, max, over)),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn truncate_name(name: &str, max: usize) -> String {
    let count = name.chars().count();
    if count <= max {
        name.to_string()
    } else if max > 1 {
        let mut out: String = name.chars().take(max - 1).collect();
        out.push('…');
        out
    } else {
        name.chars().take(max).collect()
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn render_prompt(frame: &mut Frame, area: Rect, label: &str, input: &InputBuffer) {
    let modal = centered(area, 50, 3);
    frame.render_widget(Clear, modal);
    let block = theme::block_focused(label).style(Style::default().bg(theme::BG_BASE));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);
    frame.render_widget(Paragraph::new(input.line(">", true, theme::muted())), inner);
}

fn render_confirm(frame: &mut Frame, area: Rect, question: &str) {
    let modal = centered(area, 50, 4);
    frame.render_widget(Clear, modal);
    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::WARNING))
        .style(Style::default().bg(theme::BG_BASE));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);
    frame.render_widget(
        Paragraph::new(vec![
            Line::raw(question.to_string()),
            Line::from(vec![
                Span::styled("y", theme::key_hint()),
                Span::styled(":yes  ", theme::dim()),
                Span::styled("any other key", theme::key_hint()),
                Span::styled(":no", theme::dim()),
            ]),
        ]),
        inner,
    );
}

// ============================================================================
// Tests
// ============================================================================
