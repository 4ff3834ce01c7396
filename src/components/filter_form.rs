//! Filter form dialog
//!
//! Composes a `SearchFilters` from a name query, a supertype, a minimum HP,
//! one set, and multi-select type / subtype / rarity lists.

use crate::action::Action;
use crate::component::Component;
use crate::components::input::TextInput;
use crate::components::layout::inset;
use crate::model::domain::FilterOptions;
use crate::model::search::{SearchFilters, SUPERTYPES};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Query,
    Supertype,
    MinHp,
    Set,
    Types,
    Subtypes,
    Rarities,
}

impl Field {
    const ORDER: [Field; 7] = [
        Field::Query,
        Field::Supertype,
        Field::MinHp,
        Field::Set,
        Field::Types,
        Field::Subtypes,
        Field::Rarities,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// A multi-select list with a cursor
#[derive(Debug, Default)]
struct CheckList {
    options: Vec<String>,
    checked: BTreeSet<String>,
    state: ListState,
}

impl CheckList {
    fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
        self.state
            .select(if self.options.is_empty() { None } else { Some(0) });
    }

    fn set_checked(&mut self, values: &[String]) {
        self.checked = values.iter().cloned().collect();
    }

    fn move_by(&mut self, delta: isize) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len() as isize;
        let current = self.state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len);
        self.state.select(Some(next as usize));
    }

    fn toggle(&mut self) {
        let Some(value) = self.state.selected().and_then(|i| self.options.get(i)) else {
            return;
        };
        if !self.checked.remove(value) {
            self.checked.insert(value.clone());
        }
    }

    /// Checked values in option order
    fn values(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| self.checked.contains(*o))
            .cloned()
            .collect()
    }
}

/// Filter form dialog
pub struct FilterDialog {
    focus: Field,
    query: TextInput,
    min_hp: TextInput,
    /// 0 means any supertype
    supertype: usize,
    /// 0 means any set
    set_index: usize,
    /// `(id, name)` pairs, newest release first
    sets: Vec<(String, String)>,
    types: CheckList,
    subtypes: CheckList,
    rarities: CheckList,
    /// Validation message shown under the scalar fields
    pub error: Option<String>,
}

impl Default for FilterDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterDialog {
    pub fn new() -> Self {
        Self {
            focus: Field::Query,
            query: TextInput::default(),
            min_hp: TextInput::numeric(),
            supertype: 0,
            set_index: 0,
            sets: Vec::new(),
            types: CheckList::default(),
            subtypes: CheckList::default(),
            rarities: CheckList::default(),
            error: None,
        }
    }

    /// Populate the pickers from the catalog enumerations
    pub fn set_options(&mut self, options: &FilterOptions) {
        self.sets = options
            .sets
            .iter()
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect();
        self.types.set_options(options.types.clone());
        self.subtypes.set_options(options.subtypes.clone());
        self.rarities.set_options(options.rarities.clone());
    }

    /// Show the filters currently applied
    pub fn set_filters(&mut self, filters: &SearchFilters) {
        self.focus = Field::Query;
        self.error = None;
        self.query.set(&filters.query);
        self.min_hp
            .set(&filters.min_hp.map(|hp| hp.to_string()).unwrap_or_default());
        self.supertype = SUPERTYPES
            .iter()
            .position(|s| *s == filters.supertype)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.set_index = self
            .sets
            .iter()
            .position(|(id, _)| *id == filters.set_id)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.types.set_checked(&filters.types);
        self.subtypes.set_checked(&filters.subtypes);
        self.rarities.set_checked(&filters.rarities);
    }

    /// Filters described by the form
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            query: self.query.trimmed().to_string(),
            types: self.types.values(),
            subtypes: self.subtypes.values(),
            rarities: self.rarities.values(),
            set_id: self
                .set_index
                .checked_sub(1)
                .and_then(|i| self.sets.get(i))
                .map(|(id, _)| id.clone())
                .unwrap_or_default(),
            supertype: self
                .supertype
                .checked_sub(1)
                .map(|i| SUPERTYPES[i].to_string())
                .unwrap_or_default(),
            min_hp: self.min_hp.trimmed().parse().ok(),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        let min_hp = self.min_hp.trimmed();
        if !min_hp.is_empty() && min_hp.parse::<u32>().is_err() {
            self.focus = Field::MinHp;
            self.error = Some(format!("Min HP must be at most {}", u32::MAX));
            return None;
        }
        self.error = None;
        Some(Action::ApplyFilters(self.filters()))
    }

    fn cycle(current: usize, choices: usize, forward: bool) -> usize {
        let len = choices + 1;
        if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        }
    }

    fn check_list(&mut self) -> Option<&mut CheckList> {
        match self.focus {
            Field::Types => Some(&mut self.types),
            Field::Subtypes => Some(&mut self.subtypes),
            Field::Rarities => Some(&mut self.rarities),
            _ => None,
        }
    }

    fn handle_field_key(&mut self, key: KeyEvent) {
        let forward = matches!(
            key.code,
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j')
        );
        let backward = matches!(
            key.code,
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k')
        );

        match self.focus {
            Field::Query => {
                self.query.handle_key(key);
            }
            Field::MinHp => {
                if self.min_hp.handle_key(key) {
                    self.error = None;
                }
            }
            Field::Supertype if forward || backward => {
                self.supertype = Self::cycle(self.supertype, SUPERTYPES.len(), forward);
            }
            Field::Set if forward || backward => {
                self.set_index = Self::cycle(self.set_index, self.sets.len(), forward);
            }
            _ => {
                let Some(list) = self.check_list() else {
                    return;
                };
                match key.code {
                    KeyCode::Char(' ') => list.toggle(),
                    _ if forward => list.move_by(1),
                    _ if backward => list.move_by(-1),
                    _ => {}
                }
            }
        }
    }

    fn field_style(&self, field: Field) -> Style {
        if self.focus == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    fn choice_line(&self, field: Field, label: &str, value: &str) -> Line<'static> {
        let focused = self.focus == field;
        Line::from(vec![
            Span::styled(format!("{}: ", label), self.field_style(field)),
            Span::styled(
                if focused {
                    format!("◀ {} ▶", value)
                } else {
                    value.to_string()
                },
                Style::default().fg(Color::White),
            ),
        ])
    }

    fn render_check_list(&mut self, frame: &mut Frame, area: Rect, field: Field, title: &str) {
        let focused = self.focus == field;
        let border = self.field_style(field);
        let list = match field {
            Field::Types => &mut self.types,
            Field::Subtypes => &mut self.subtypes,
            _ => &mut self.rarities,
        };

        let items: Vec<ListItem> = list
            .options
            .iter()
            .map(|option| {
                let checked = list.checked.contains(option);
                ListItem::new(Line::from(vec![
                    Span::styled(
                        if checked { "[x] " } else { "[ ] " },
                        Style::default().fg(Color::Green),
                    ),
                    Span::raw(option.clone()),
                ]))
            })
            .collect();

        let title = format!(" {} ({}) ", title, list.checked.len());
        let widget = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(border),
            )
            .highlight_style(if focused {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            });

        frame.render_stateful_widget(widget, area, &mut list.state);
    }
}

impl Component for FilterDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => self.submit(),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ResetFilters)
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                None
            }
            _ => {
                self.handle_field_key(key);
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = inset(area, 3);
        frame.render_widget(Clear, popup_area);

        let outer = Block::default()
            .borders(Borders::ALL)
            .title(" Filters ")
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
                Constraint::Length(5), // Scalar fields and error
                Constraint::Min(3),    // Lists
                Constraint::Length(1), // Help bar
            ])
            .split(inner);

        let supertype = self
            .supertype
            .checked_sub(1)
            .map(|i| SUPERTYPES[i])
            .unwrap_or("Any");
        let set = self
            .set_index
            .checked_sub(1)
            .and_then(|i| self.sets.get(i))
            .map(|(_, name)| name.as_str())
            .unwrap_or("Any");

        let mut scalars = vec![
            self.query.render("Name", self.focus == Field::Query),
            self.choice_line(Field::Supertype, "Supertype", supertype),
            self.min_hp.render("Min HP", self.focus == Field::MinHp),
            self.choice_line(Field::Set, "Set", set),
        ];
        if let Some(error) = &self.error {
            scalars.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(scalars), chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(33),
                Constraint::Percentage(34),
            ])
            .split(chunks[1]);
        self.render_check_list(frame, columns[0], Field::Types, "Types");
        self.render_check_list(frame, columns[1], Field::Subtypes, "Subtypes");
        self.render_check_list(frame, columns[2], Field::Rarities, "Rarities");

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Tab ", Style::default().fg(Color::Cyan)),
            Span::raw("Next field  "),
            Span::styled(" ←/→ ", Style::default().fg(Color::Cyan)),
            Span::raw("Change  "),
            Span::styled(" Space ", Style::default().fg(Color::Cyan)),
            Span::raw("Toggle  "),
            Span::styled(" Enter ", Style::default().fg(Color::Green)),
            Span::raw("Apply  "),
            Span::styled(" Ctrl+r ", Style::default().fg(Color::Red)),
            Span::raw("Reset  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
            Span::raw("Cancel"),
        ]))
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(help, chunks[2]);

        Ok(())
    }
}
