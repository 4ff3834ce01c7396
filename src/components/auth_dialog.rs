//! Sign in / sign up form

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::input::TextInput;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

/// Email and password form
pub struct AuthDialog {
    pub mode: AuthMode,
    email: TextInput,
    password: TextInput,
    password_focused: bool,
    /// Message and whether it reports an error
    message: Option<(String, bool)>,
    pending: bool,
}

impl Default for AuthDialog {
    fn default() -> Self {
        Self {
            mode: AuthMode::SignIn,
            email: TextInput::default(),
            password: TextInput::masked(),
            password_focused: false,
            message: None,
            pending: false,
        }
    }
}

impl AuthDialog {
    /// Clear the form, keeping the email for convenience
    pub fn reset(&mut self) {
        let email = self.email.value.clone();
        *self = Self::default();
        self.email.set(&email);
        self.password_focused = !email.is_empty();
    }

    pub fn begin_submit(&mut self) {
        self.pending = true;
        self.message = None;
    }

    pub fn fail(&mut self, message: String) {
        self.pending = false;
        self.password.clear();
        self.message = Some((message, true));
    }

    /// Sign-up accepted but the account still needs email confirmation
    pub fn awaiting_confirmation(&mut self) {
        self.pending = false;
        self.password.clear();
        self.mode = AuthMode::SignIn;
        self.message = Some((
            "Check your email to confirm your account, then sign in.".to_string(),
            false,
        ));
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(m, _)| m.as_str())
    }

    fn submit(&mut self) -> Option<Action> {
        if self.pending {
            return None;
        }
        let email = self.email.trimmed().to_string();
        let password = self.password.value.clone();
        if email.is_empty() || password.is_empty() {
            self.message = Some(("Email and password are required".to_string(), true));
            return None;
        }
        if self.mode == AuthMode::SignUp && password.chars().count() < 6 {
            self.message = Some((
                "Password must be at least 6 characters".to_string(),
                true,
            ));
            return None;
        }
        Some(match self.mode {
            AuthMode::SignIn => Action::SignIn { email, password },
            AuthMode::SignUp => Action::SignUp { email, password },
        })
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.message = None;
    }
}

impl Component for AuthDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter if !self.password_focused => {
                self.password_focused = true;
                None
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.password_focused = !self.password_focused;
                None
            }
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.toggle_mode();
                None
            }
            _ => {
                if self.password_focused {
                    self.password.handle_key(key);
                } else {
                    self.email.handle_key(key);
                }
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup(area, 60, 12);
        frame.render_widget(Clear, popup_area);

        let (title, submit_label, toggle_label) = match self.mode {
            AuthMode::SignIn => (" Sign In ", "Sign in", "Create an account instead"),
            AuthMode::SignUp => (" Sign Up ", "Create account", "Sign in instead"),
        };

        let status = match (&self.message, self.pending) {
            (_, true) => Span::styled("Please wait...", Style::default().fg(Color::Cyan)),
            (Some((message, true)), _) => {
                Span::styled(message.clone(), Style::default().fg(Color::Red))
            }
            (Some((message, false)), _) => {
                Span::styled(message.clone(), Style::default().fg(Color::Green))
            }
            (None, _) => Span::raw(""),
        };

        let content = vec![
            Line::from(""),
            self.email.render("Email", !self.password_focused),
            self.password.render("Password", self.password_focused),
            Line::from(""),
            Line::from(status),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Enter ", Style::default().fg(Color::Green)),
                Span::raw(format!("{}  ", submit_label)),
                Span::styled(" Tab ", Style::default().fg(Color::Cyan)),
                Span::raw("Next field  "),
                Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
                Span::raw("Cancel"),
            ]),
            Line::from(vec![
                Span::styled(" Ctrl+t ", Style::default().fg(Color::Magenta)),
                Span::raw(toggle_label),
            ]),
        ];

        let paragraph = Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue))
                    .title(title)
                    .title_style(
                        Style::default()
                            .fg(Color::Blue)
                            .add_modifier(Modifier::BOLD),
                    ),
            );

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}
