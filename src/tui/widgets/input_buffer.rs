//! Shared text input buffer with cursor management.
//!
//! Used by the add form, the numeric and text editors and the condition
//! picker of the combat view. The cursor is a byte offset that always sits on
//! a char boundary, so accented names edit like plain ASCII ones.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// A simple text input buffer with cursor positioning.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
    /// Only digits, plus a sign in first position.
    numeric: bool,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            numeric: false,
        }
    }

    pub fn integer() -> Self {
        Self {
            numeric: true,
            ..Self::new()
        }
    }

    /// Prefill and park the cursor at the end.
    pub fn with_value(mut self, value: impl AsRef<str>) -> Self {
        self.content = value.as_ref().to_string();
        self.cursor = self.content.len();
        self
    }

    fn accepts(&self, c: char) -> bool {
        if self.numeric {
            c.is_ascii_digit() || (matches!(c, '-' | '+') && self.cursor == 0)
        } else {
            !c.is_control()
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.accepts(c) {
            return;
        }
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.content[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.content.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            let next = self.next_boundary();
            self.content.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.content[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.content.len() {
            self.cursor = self.next_boundary();
        }
    }

    fn next_boundary(&self) -> usize {
        self.content[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.content.len())
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    /// Integer value, `None` when blank or unparseable.
    pub fn parse_int(&self) -> Option<i64> {
        self.content.trim().parse().ok()
    }

    /// Apply an editing key. Returns `false` for keys the buffer does not
    /// use (Enter, Esc, Tab…) so the caller can treat them as commands.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('u') {
                self.clear();
                return true;
            }
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    /// `label: text`, with a reversed block over the cursor when focused.
    pub fn line<'a>(&self, label: &'a str, focused: bool, label_style: Style) -> Line<'a> {
        let mut spans = vec![Span::styled(format!("{label}: "), label_style)];
        if !focused {
            spans.push(Span::raw(self.content.clone()));
            return Line::from(spans);
        }

        let (before, rest) = self.content.split_at(self.cursor);
        let mut chars = rest.chars();
        let at = chars.next().unwrap_or(' ');
        spans.push(Span::raw(before.to_string()));
        spans.push(Span::styled(
            at.to_string(),
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::raw(chars.as_str().to_string()));
        Line::from(spans)
    }
}
