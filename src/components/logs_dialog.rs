//! Logs dialog
//!
//! Shows the in-memory log buffer with colored levels. Follows the tail
//! until the user scrolls up.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::inset;
use crate::logger::{self, LogEntry};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use log::Level;
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

const VISIBLE_ENTRIES: usize = 500;

/// Logs dialog
pub struct LogsDialog {
    /// Lines scrolled up from the bottom
    offset_from_bottom: usize,
}

impl Default for LogsDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl LogsDialog {
    pub fn new() -> Self {
        Self {
            offset_from_bottom: 0,
        }
    }

    pub fn reset(&mut self) {
        self.offset_from_bottom = 0;
    }

    pub fn is_following(&self) -> bool {
        self.offset_from_bottom == 0
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Cyan,
        Level::Trace => Color::DarkGray,
    }
}

fn entry_line(entry: &LogEntry) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{} ", entry.timestamp),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{:>5} ", entry.level),
            Style::default()
                .fg(level_color(entry.level))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{}: ", entry.target),
            Style::default().fg(Color::Blue),
        ),
        Span::raw(entry.msg.clone()),
    ])
}

impl Component for LogsDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('l') => Some(Action::CloseModal),
            KeyCode::Char('k') | KeyCode::Up => {
                self.offset_from_bottom = self.offset_from_bottom.saturating_add(1);
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.offset_from_bottom = self.offset_from_bottom.saturating_sub(1);
                None
            }
            KeyCode::PageUp => {
                self.offset_from_bottom = self.offset_from_bottom.saturating_add(10);
                None
            }
            KeyCode::PageDown => {
                self.offset_from_bottom = self.offset_from_bottom.saturating_sub(10);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.reset();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let dialog_area = inset(area, 2);
        frame.render_widget(Clear, dialog_area);

        let lines: Vec<Line> = logger::recent(VISIBLE_ENTRIES)
            .iter()
            .map(entry_line)
            .collect();
        let total = lines.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;
        let max_scroll = total.saturating_sub(visible_height);

        self.offset_from_bottom = self.offset_from_bottom.min(max_scroll);
        let scroll = max_scroll - self.offset_from_bottom;

        let title = if self.is_following() {
            format!(" Logs ({}) ", logger::len())
        } else {
            format!(" Logs ({}) - scrolled, G to follow ", logger::len())
        };

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((scroll as u16, 0));
        frame.render_widget(paragraph, dialog_area);

        if total > visible_height {
            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                dialog_area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_scroll_up_stops_following() {
        let mut dialog = LogsDialog::new();
        assert!(dialog.is_following());

        dialog
            .handle_key_event(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE))
            .unwrap();
        assert!(!dialog.is_following());

        dialog
            .handle_key_event(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::NONE))
            .unwrap();
        assert!(dialog.is_following());
    }

    #[test]
    fn test_entry_line_includes_level_and_target() {
        let entry = LogEntry {
            timestamp: "12:00:00".to_string(),
            level: Level::Warn,
            target: "pokedex_tui::app".to_string(),
            msg: "favorite toggle failed".to_string(),
        };
        let text: String = entry_line(&entry)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "12:00:00  WARN pokedex_tui::app: favorite toggle failed");
    }
}
