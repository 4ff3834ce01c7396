//! New collection form

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::input::TextInput;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Form for creating a collection
#[derive(Default)]
pub struct NewCollectionDialog {
    name: TextInput,
    description: TextInput,
    description_focused: bool,
    /// Validation or backend error
    pub error: Option<String>,
    pending: bool,
}

impl NewCollectionDialog {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn begin_submit(&mut self) {
        self.pending = true;
        self.error = None;
    }

    pub fn fail(&mut self, message: String) {
        self.pending = false;
        self.error = Some(message);
    }

    fn submit(&mut self) -> Option<Action> {
        if self.pending {
            return None;
        }
        let name = self.name.trimmed();
        if name.is_empty() {
            self.error = Some("Name is required".to_string());
            return None;
        }
        let description = Some(self.description.trimmed())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Some(Action::CreateCollection {
            name: name.to_string(),
            description,
        })
    }
}

impl Component for NewCollectionDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.description_focused = !self.description_focused;
                None
            }
            _ => {
                if self.description_focused {
                    self.description.handle_key(key);
                } else {
                    self.name.handle_key(key);
                }
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup(area, 56, 10);
        frame.render_widget(Clear, popup_area);

        let status = if self.pending {
            Span::styled("Creating...", Style::default().fg(Color::Cyan))
        } else if let Some(error) = &self.error {
            Span::styled(error.clone(), Style::default().fg(Color::Red))
        } else {
            Span::raw("")
        };

        let content = vec![
            Line::from(""),
            self.name.render("Name", !self.description_focused),
            self.description
                .render("Description", self.description_focused),
            Line::from(""),
            Line::from(status),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Enter ", Style::default().fg(Color::Green)),
                Span::raw("Create  "),
                Span::styled(" Tab ", Style::default().fg(Color::Cyan)),
                Span::raw("Next field  "),
                Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
                Span::raw("Cancel"),
            ]),
        ];

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" New Collection ")
                .title_style(
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
        );

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}
