//! Add-to-collection dialog
//!
//! Collection picker with a quantity field and a result message. Closes on
//! its own shortly after a successful add.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::input::TextInput;
use crate::model::account::Collection;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

/// How long the success message stays up before the dialog closes
pub const CLOSE_DELAY: Duration = Duration::from_millis(1500);

pub const ADDED_MESSAGE: &str = "Card added successfully!";
pub const FAILED_MESSAGE: &str = "Failed to add card";

/// Add-to-collection dialog
pub struct CollectionDialog {
    /// Name of the card being added
    pub card_name: String,
    /// `(id, name)` of the user's collections, newest first
    collections: Vec<(String, String)>,
    list_state: ListState,
    quantity: TextInput,
    /// Result of the last submit, `true` when it succeeded
    message: Option<(String, bool)>,
    /// Set while a submit is in flight
    pending: bool,
    close_at: Option<Instant>,
}

impl Default for CollectionDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionDialog {
    pub fn new() -> Self {
        let mut quantity = TextInput::numeric();
        quantity.set("1");
        Self {
            card_name: String::new(),
            collections: Vec::new(),
            list_state: ListState::default(),
            quantity,
            message: None,
            pending: false,
            close_at: None,
        }
    }

    /// Reset the dialog for a new card
    pub fn open(&mut self, card_name: &str, collections: &[Collection]) {
        *self = Self::new();
        self.card_name = card_name.to_string();
        self.set_collections(collections);
    }

    /// Refresh the picker, keeping the selected collection when possible
    pub fn set_collections(&mut self, collections: &[Collection]) {
        let selected_id = self.selected_collection().map(str::to_string);
        self.collections = collections
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();

        let index = selected_id
            .and_then(|id| self.collections.iter().position(|(cid, _)| *cid == id))
            .or(if self.collections.is_empty() { None } else { Some(0) });
        self.list_state.select(index);
    }

    pub fn selected_collection(&self) -> Option<&str> {
        self.list_state
            .selected()
            .and_then(|i| self.collections.get(i))
            .map(|(id, _)| id.as_str())
    }

    /// Quantity to add, never below 1
    pub fn quantity(&self) -> u32 {
        self.quantity.trimmed().parse::<u32>().unwrap_or(1).max(1)
    }

    fn adjust_quantity(&mut self, delta: i64) {
        let next = (self.quantity() as i64 + delta).clamp(1, u32::MAX as i64);
        self.quantity.set(&next.to_string());
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(m, _)| m.as_str())
    }

    pub fn begin_submit(&mut self) {
        self.pending = true;
        self.message = None;
    }

    /// Record the outcome of an add; success schedules the close
    pub fn finish_submit(&mut self, success: bool, now: Instant) {
        self.pending = false;
        if success {
            self.message = Some((ADDED_MESSAGE.to_string(), true));
            self.close_at = Some(now + CLOSE_DELAY);
        } else {
            self.message = Some((FAILED_MESSAGE.to_string(), false));
        }
    }

    /// Whether the close delay after a success has elapsed
    pub fn should_close(&self, now: Instant) -> bool {
        self.close_at.is_some_and(|at| now >= at)
    }

    fn move_selection(&mut self, delta: isize) {
        if self.collections.is_empty() {
            return;
        }
        let len = self.collections.len() as isize;
        let current = self.list_state.selected().unwrap_or(0) as isize;
        self.list_state
            .select(Some((current + delta).rem_euclid(len) as usize));
    }
}

impl Component for CollectionDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter if !self.pending && self.close_at.is_none() => self
                .selected_collection()
                .map(|id| Action::AddToCollection {
                    collection_id: id.to_string(),
                    quantity: self.quantity(),
                }),
            KeyCode::Char('n') => Some(Action::OpenNewCollection),
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('+') | KeyCode::Right => {
                self.adjust_quantity(1);
                None
            }
            KeyCode::Char('-') | KeyCode::Left => {
                self.adjust_quantity(-1);
                None
            }
            _ => {
                self.quantity.handle_key(key);
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let height = (self.collections.len() as u16 + 9).clamp(12, 24);
        let popup_area = centered_popup(area, 56, height);
        frame.render_widget(Clear, popup_area);

        let outer = Block::default()
            .borders(Borders::ALL)
            .title(" Add to Collection ")
            .title_style(
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::Magenta));
        let inner = outer.inner(popup_area);
        frame.render_widget(outer, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Card name
                Constraint::Min(3),    // Collections
                Constraint::Length(1), // Quantity
                Constraint::Length(1), // Message
                Constraint::Length(1), // Help
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                self.card_name.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(ratatui::layout::Alignment::Center),
            chunks[0],
        );

        let list_block = Block::default()
            .borders(Borders::ALL)
            .title(" Collection ")
            .border_style(Style::default().fg(Color::DarkGray));
        if self.collections.is_empty() {
            let empty = Paragraph::new(Span::styled(
                "No collections yet. Press n to create one.",
                Style::default().fg(Color::Yellow),
            ))
            .block(list_block);
            frame.render_widget(empty, chunks[1]);
        } else {
            let items: Vec<ListItem> = self
                .collections
                .iter()
                .map(|(_, name)| ListItem::new(name.clone()))
                .collect();
            let list = List::new(items)
                .block(list_block)
                .highlight_style(
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");
            frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
        }

        frame.render_widget(
            Paragraph::new(self.quantity.render("Quantity", true)),
            chunks[2],
        );

        let message = match (&self.message, self.pending) {
            (_, true) => Span::styled("Adding...", Style::default().fg(Color::Cyan)),
            (Some((text, true)), _) => {
                Span::styled(text.clone(), Style::default().fg(Color::Green))
            }
            (Some((text, false)), _) => Span::styled(text.clone(), Style::default().fg(Color::Red)),
            (None, _) => Span::raw(""),
        };
        frame.render_widget(Paragraph::new(Line::from(message)), chunks[3]);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Green)),
            Span::raw("Add  "),
            Span::styled(" +/- ", Style::default().fg(Color::Cyan)),
            Span::raw("Quantity  "),
            Span::styled(" n ", Style::default().fg(Color::Cyan)),
            Span::raw("New  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
            Span::raw("Close"),
        ]))
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(help, chunks[4]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crossterm::event::KeyModifiers;

    fn collection(id: &str, name: &str) -> Collection {
        Collection {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_submit_uses_selection_and_quantity() {
        let mut dialog = CollectionDialog::new();
        dialog.open("Pikachu", &[collection("c-1", "Decks"), collection("c-2", "Binder")]);

        dialog.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        dialog.handle_key_event(key(KeyCode::Char('+'))).unwrap();
        dialog.handle_key_event(key(KeyCode::Char('+'))).unwrap();

        let action = dialog.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(
            action,
            Some(Action::AddToCollection {
                collection_id: "c-2".to_string(),
                quantity: 3,
            })
        );
    }

    #[test]
    fn test_quantity_never_below_one() {
        let mut dialog = CollectionDialog::new();
        dialog.handle_key_event(key(KeyCode::Char('-'))).unwrap();
        assert_eq!(dialog.quantity(), 1);

        dialog.handle_key_event(key(KeyCode::Backspace)).unwrap();
        assert_eq!(dialog.quantity(), 1);

        dialog.handle_key_event(key(KeyCode::Char('0'))).unwrap();
        assert_eq!(dialog.quantity(), 1);
    }

    #[test]
    fn test_no_submit_without_collection() {
        let mut dialog = CollectionDialog::new();
        dialog.open("Pikachu", &[]);
        assert_eq!(dialog.handle_key_event(key(KeyCode::Enter)).unwrap(), None);
    }

    #[test]
    fn test_success_closes_after_delay() {
        let mut dialog = CollectionDialog::new();
        dialog.open("Pikachu", &[collection("c-1", "Decks")]);
        let now = Instant::now();

        dialog.begin_submit();
        dialog.finish_submit(true, now);
        assert_eq!(dialog.message(), Some(ADDED_MESSAGE));
        assert!(!dialog.should_close(now));
        assert!(dialog.should_close(now + CLOSE_DELAY));
        assert_eq!(dialog.handle_key_event(key(KeyCode::Enter)).unwrap(), None);
    }

    #[test]
    fn test_failure_keeps_dialog_open() {
        let mut dialog = CollectionDialog::new();
        dialog.open("Pikachu", &[collection("c-1", "Decks")]);
        dialog.begin_submit();
        dialog.finish_submit(false, Instant::now());

        assert_eq!(dialog.message(), Some(FAILED_MESSAGE));
        assert!(!dialog.should_close(Instant::now() + CLOSE_DELAY));
    }

    #[test]
    fn test_refresh_keeps_selection() {
        let mut dialog = CollectionDialog::new();
        dialog.open("Pikachu", &[collection("c-1", "Decks"), collection("c-2", "Binder")]);
        dialog.handle_key_event(key(KeyCode::Char('j'))).unwrap();

        dialog.set_collections(&[
            collection("c-3", "Holo Rares"),
            collection("c-1", "Decks"),
            collection("c-2", "Binder"),
        ]);
        assert_eq!(dialog.selected_collection(), Some("c-2"));
    }
}
