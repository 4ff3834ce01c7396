//! Single-line text field shared by the form dialogs

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    /// Render bullets instead of the text
    pub masked: bool,
    /// Only accept ASCII digits
    pub numeric: bool,
}

impl TextInput {
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Default::default()
        }
    }

    pub fn numeric() -> Self {
        Self {
            numeric: true,
            ..Default::default()
        }
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Apply an editing key; returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
                true
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => false,
            KeyCode::Char(c) => {
                if self.numeric && !c.is_ascii_digit() {
                    return true;
                }
                self.value.push(c);
                true
            }
            KeyCode::Backspace => {
                self.value.pop();
                true
            }
            _ => false,
        }
    }

    /// `label: value_` with the cursor shown when focused
    pub fn render(&self, label: &str, focused: bool) -> Line<'static> {
        let shown = if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };
        let cursor = if focused { "_" } else { "" };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        Line::from(vec![
            Span::styled(format!("{:>12} ", label), label_style),
            Span::styled(format!("{}{}", shown, cursor), Style::default().fg(Color::White)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::default();
        for c in "Holo".chars() {
            assert!(input.handle_key(key(KeyCode::Char(c))));
        }
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value, "Hol");
        assert!(!input.handle_key(key(KeyCode::Enter)));
    }

    #[test]
    fn test_numeric_rejects_letters() {
        let mut input = TextInput::numeric();
        input.handle_key(key(KeyCode::Char('1')));
        input.handle_key(key(KeyCode::Char('x')));
        input.handle_key(key(KeyCode::Char('0')));
        assert_eq!(input.value, "10");
    }

    #[test]
    fn test_masked_render_hides_value() {
        let mut input = TextInput::masked();
        input.set("secret");
        let line = input.render("Password", false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(!text.contains("secret"));
        assert!(text.contains("••••••"));
    }
}
