//! Matrix Editor
//!
//! Cursor-driven grid editing for the bus and line data steps, plus bulk
//! paste from the terminal's bracketed-paste events.

use super::wizard_render::{ACCENT_GOLD, BRAND_BLUE, BRAND_GOLD};
use crate::matrix::Matrix;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Width of one rendered cell
const CELL_WIDTH: usize = 11;

/// Editable grid with a cell cursor
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixEditor {
    pub label: &'static str,
    matrix: Matrix,
    cursor: (usize, usize),
    edit_buffer: Option<String>,
    paste_error: Option<String>,
}

impl MatrixEditor {
    pub fn new(matrix: Matrix, label: &'static str) -> Self {
        Self {
            label,
            matrix,
            cursor: (0, 0),
            edit_buffer: None,
            paste_error: None,
        }
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn is_editing(&self) -> bool {
        self.edit_buffer.is_some()
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.edit_buffer.as_deref()
    }

    /// Inline paste error, if the last paste was rejected
    pub fn error_message(&self) -> Option<&str> {
        self.paste_error.as_deref()
    }

    /// Handle a key. Returns `false` when the key is not an editor key,
    /// so the caller may treat it as navigation (e.g. Enter to advance).
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        if event.modifiers.contains(KeyModifiers::CONTROL)
            || event.modifiers.contains(KeyModifiers::ALT)
        {
            return false;
        }

        match event.code {
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Tab => self.move_cursor(0, 1),
            KeyCode::Char(c) if is_numeric_char(c) => {
                self.edit_buffer.get_or_insert_with(String::new).push(c);
            }
            KeyCode::Backspace => {
                self.edit_buffer.get_or_insert_with(String::new).pop();
            }
            KeyCode::Enter if self.is_editing() => self.commit_edit(),
            KeyCode::Esc if self.is_editing() => self.edit_buffer = None,
            _ => return false,
        }
        true
    }

    /// Write the open edit into the grid. Unparseable text stores 0.
    pub fn commit_edit(&mut self) {
        if let Some(buffer) = self.edit_buffer.take() {
            let value = buffer.trim().parse::<f64>().unwrap_or(0.0);
            let (row, col) = self.cursor;
            self.matrix = self.matrix.with_cell(row, col, value);
        }
    }

    /// Bulk paste. On failure the grid is kept and the error is shown inline.
    pub fn handle_paste(&mut self, text: &str) {
        self.edit_buffer = None;
        match self.matrix.paste(text) {
            Ok(next) => {
                tracing::debug!("{}: pasted {} values", self.label, next.capacity());
                self.matrix = next;
                self.paste_error = None;
                self.clamp_cursor();
            }
            Err(e) => {
                tracing::debug!("{}: paste rejected: {}", self.label, e);
                self.paste_error = Some(e.to_string());
            }
        }
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        self.commit_edit();
        let (row, col) = self.cursor;
        let max_row = self.matrix.rows().saturating_sub(1);
        let max_col = self.matrix.cols().saturating_sub(1);
        self.cursor = (
            row.saturating_add_signed(d_row).min(max_row),
            col.saturating_add_signed(d_col).min(max_col),
        );
    }

    fn clamp_cursor(&mut self) {
        let (row, col) = self.cursor;
        self.cursor = (
            row.min(self.matrix.rows().saturating_sub(1)),
            col.min(self.matrix.cols().saturating_sub(1)),
        );
    }

    /// Rows shown in a window of `height` rows that keeps the cursor visible
    pub fn visible_rows(&self, height: usize) -> std::ops::Range<usize> {
        let rows = self.matrix.rows();
        let height = height.max(1).min(rows);
        let start = self
            .cursor
            .0
            .saturating_sub(height / 2)
            .min(rows.saturating_sub(height));
        start..start + height
    }

    /// Render the label, any paste error, and a window of grid rows
    pub fn render_lines(&self, height: usize) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();

        lines.push(Line::from(Span::styled(
            self.label.to_string(),
            Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
        )));

        if let Some(err) = &self.paste_error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(""));

        let window = self.visible_rows(height);
        let total_rows = self.matrix.rows();
        if window.start > 0 {
            lines.push(Line::from(Span::styled(
                format!("↑ {} more", window.start),
                Style::default().fg(Color::DarkGray),
            )));
        }

        for row in window.clone() {
            let mut spans: Vec<Span<'static>> = vec![Span::styled(
                format!("{:>4} ", row + 1),
                Style::default().fg(BRAND_BLUE),
            )];

            for col in 0..self.matrix.cols() {
                let selected = (row, col) == self.cursor;
                let text = match (&self.edit_buffer, selected) {
                    (Some(buffer), true) => format!("{}_", buffer),
                    _ => format_cell(self.matrix.get(row, col).unwrap_or_default()),
                };
                let style = if selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(ACCENT_GOLD)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                spans.push(Span::raw(" "));
                spans.push(Span::styled(format!("{:>width$}", text, width = CELL_WIDTH), style));
            }
            lines.push(Line::from(spans));
        }

        if window.end < total_rows {
            lines.push(Line::from(Span::styled(
                format!("↓ {} more", total_rows - window.end),
                Style::default().fg(Color::DarkGray),
            )));
        }

        lines
    }
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

/// Shortest readable form of a cell value
fn format_cell(value: f64) -> String {
    let text = value.to_string();
    if text.len() > CELL_WIDTH {
        format!("{:.4e}", value)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn type_str(editor: &mut MatrixEditor, text: &str) {
        for c in text.chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_type_and_commit_cell() {
        let mut editor = MatrixEditor::new(Matrix::zeros(2, 3), "grid");
        editor.handle_key(key(KeyCode::Right));
        type_str(&mut editor, "-1.5e2");
        assert_eq!(editor.edit_buffer(), Some("-1.5e2"));

        assert!(editor.handle_key(key(KeyCode::Enter)));
        assert!(!editor.is_editing());
        assert_eq!(editor.matrix().get(0, 1), Some(-150.0));
    }

    #[test]
    fn test_enter_without_edit_is_not_consumed() {
        let mut editor = MatrixEditor::new(Matrix::zeros(2, 2), "grid");
        assert!(!editor.handle_key(key(KeyCode::Enter)));
    }

    #[test]
    fn test_esc_cancels_edit() {
        let mut editor = MatrixEditor::new(Matrix::zeros(2, 2), "grid");
        type_str(&mut editor, "42");
        assert!(editor.handle_key(key(KeyCode::Esc)));
        assert_eq!(editor.matrix().get(0, 0), Some(0.0));
    }

    #[test]
    fn test_unparseable_edit_stores_zero() {
        let mut editor = MatrixEditor::new(Matrix::zeros(1, 2).with_cell(0, 0, 9.0), "grid");
        type_str(&mut editor, "1e");
        editor.commit_edit();
        assert_eq!(editor.matrix().get(0, 0), Some(0.0));
    }

    #[test]
    fn test_moving_commits_open_edit() {
        let mut editor = MatrixEditor::new(Matrix::zeros(3, 3), "grid");
        type_str(&mut editor, "7");
        editor.handle_key(key(KeyCode::Down));
        assert_eq!(editor.matrix().get(0, 0), Some(7.0));
        assert_eq!(editor.cursor(), (1, 0));
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut editor = MatrixEditor::new(Matrix::zeros(2, 2), "grid");
        editor.handle_key(key(KeyCode::Up));
        editor.handle_key(key(KeyCode::Left));
        assert_eq!(editor.cursor(), (0, 0));
        for _ in 0..5 {
            editor.handle_key(key(KeyCode::Down));
            editor.handle_key(key(KeyCode::Right));
        }
        assert_eq!(editor.cursor(), (1, 1));
    }

    #[test]
    fn test_letters_are_ignored() {
        let mut editor = MatrixEditor::new(Matrix::zeros(2, 2), "grid");
        assert!(!editor.handle_key(key(KeyCode::Char('x'))));
        assert!(!editor.is_editing());
    }

    #[test]
    fn test_paste_success_clears_error() {
        let mut editor = MatrixEditor::new(Matrix::zeros(2, 3), "grid");
        editor.handle_paste("1 2");
        assert!(editor.error_message().is_some());

        editor.handle_paste("1 2 3\n4 5 6");
        assert!(editor.error_message().is_none());
        assert_eq!(
            editor.matrix().to_rows(),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]
        );
    }

    #[test]
    fn test_paste_failure_keeps_grid() {
        let mut editor = MatrixEditor::new(Matrix::zeros(2, 3).with_cell(1, 2, 3.5), "grid");
        let before = editor.matrix().clone();
        editor.handle_paste("1 2 3 4 5");
        assert_eq!(editor.matrix(), &before);
        assert_eq!(
            editor.error_message(),
            Some("Invalid values found. Please ensure the pasted data has exactly 6 numeric values.")
        );
    }

    #[test]
    fn test_visible_rows_follow_cursor() {
        let mut editor = MatrixEditor::new(Matrix::bus_default(), "bus");
        assert_eq!(editor.visible_rows(10), 0..10);

        for _ in 0..32 {
            editor.handle_key(key(KeyCode::Down));
        }
        assert_eq!(editor.visible_rows(10), 23..33);
        assert_eq!(editor.visible_rows(100), 0..33);
    }

    #[test]
    fn test_render_uses_one_based_row_labels() {
        let editor = MatrixEditor::new(Matrix::zeros(3, 2), "grid");
        let lines = editor.render_lines(3);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l.trim_start().starts_with("1 ")));
        assert!(text.iter().any(|l| l.trim_start().starts_with("3 ")));
        assert!(!text.iter().any(|l| l.trim_start().starts_with("0 ")));
    }
}
