//! Card detail component
//!
//! Renders every field of a card, including the price breakdown. Used both
//! as the side panel on the home screen and as the full-screen detail view.

use crate::action::Action;
use crate::component::Component;
use crate::model::card::{Card, PriceRange, TypeModifier};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

/// Card detail component
#[derive(Default)]
pub struct DetailComponent {
    /// Current scroll offset
    scroll: usize,
    /// Cached content lines
    content: Vec<Line<'static>>,
    /// Id and favorite state the cache was built for
    shown: Option<(String, bool)>,
    /// Full-screen mode shows key hints in the border
    pub expanded: bool,
}

impl DetailComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `card`, keeping the scroll position if it is already shown
    pub fn set_card(&mut self, card: Option<&Card>, is_favorite: bool) {
        let key = card.map(|c| (c.id.clone(), is_favorite));
        if key == self.shown {
            return;
        }

        if self.shown.as_ref().map(|(id, _)| id) != key.as_ref().map(|(id, _)| id) {
            self.scroll = 0;
        }
        self.content = match card {
            Some(card) => card_lines(card, is_favorite),
            None => vec![Line::from(Span::styled(
                "No card selected",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        self.shown = key;
    }

    fn title(&self) -> &'static str {
        if self.expanded {
            " Card Details (Esc close, Space favorite, a add to collection) "
        } else {
            " Card "
        }
    }
}

fn heading(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn modifiers(values: &[TypeModifier]) -> String {
    values
        .iter()
        .map(|m| format!("{} {}", m.kind, m.value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `$1.23`, or `-` when the catalog has no figure
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${:.2}", v),
        None => "-".to_string(),
    }
}

fn price_line(label: String, range: &PriceRange) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<24}", label), Style::default().fg(Color::Cyan)),
        Span::raw(format!(
            "low {}  mid {}  high {}  ",
            format_price(range.low),
            format_price(range.mid),
            format_price(range.high)
        )),
        Span::styled(
            format!("market {}", format_price(range.market)),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Build the detail lines for a card
pub fn card_lines(card: &Card, is_favorite: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let mut title = vec![Span::styled(
        card.name.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(hp) = &card.hp {
        title.push(Span::styled(format!("  HP {}", hp), Style::default().fg(Color::Red)));
    }
    if is_favorite {
        title.push(Span::styled("  ♥", Style::default().fg(Color::Magenta)));
    }
    lines.push(Line::from(title));

    let mut kind = card.supertype.clone();
    if !card.subtypes.is_empty() {
        kind = format!("{} - {}", kind, card.subtypes.join(", "));
    }
    lines.push(Line::from(Span::styled(kind, Style::default().fg(Color::DarkGray))));
    if !card.types.is_empty() {
        lines.push(field("Types", card.types.join(", ")));
    }
    if let Some(from) = &card.evolves_from {
        lines.push(field("Evolves from", from.clone()));
    }

    if !card.abilities.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Abilities"));
        for ability in &card.abilities {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", ability.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("[{}]", ability.kind), Style::default().fg(Color::Magenta)),
            ]));
            if !ability.text.is_empty() {
                lines.push(Line::from(format!("    {}", ability.text)));
            }
        }
    }

    if !card.attacks.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Attacks"));
        for attack in &card.attacks {
            let mut spans = vec![
                Span::styled(
                    format!("  [{}] ", attack.cost.join(" ")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(attack.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ];
            if !attack.damage.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", attack.damage),
                    Style::default().fg(Color::Red),
                ));
            }
            lines.push(Line::from(spans));
            if !attack.text.is_empty() {
                lines.push(Line::from(format!("    {}", attack.text)));
            }
        }
    }

    if !card.weaknesses.is_empty() || !card.resistances.is_empty() || !card.retreat_cost.is_empty()
    {
        lines.push(Line::from(""));
        if !card.weaknesses.is_empty() {
            lines.push(field("Weakness", modifiers(&card.weaknesses)));
        }
        if !card.resistances.is_empty() {
            lines.push(field("Resistance", modifiers(&card.resistances)));
        }
        if !card.retreat_cost.is_empty() {
            lines.push(field("Retreat", card.retreat_cost.len().to_string()));
        }
    }

    lines.push(Line::from(""));
    lines.push(heading("Set"));
    lines.push(field("Set", format!("{} ({})", card.set.name, card.set.series)));
    lines.push(field("Number", card.collector_number()));
    if !card.set.release_date.is_empty() {
        lines.push(field("Released", card.set.release_date.clone()));
    }
    if let Some(rarity) = &card.rarity {
        lines.push(field("Rarity", rarity.clone()));
    }
    if let Some(artist) = &card.artist {
        lines.push(field("Artist", artist.clone()));
    }

    if let Some(flavor) = &card.flavor_text {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            flavor.clone(),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let prices = card.price_breakdown();
    if !prices.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Prices (TCGplayer)"));
        for (label, range) in prices {
            lines.push(price_line(label, range));
        }
        if let Some(tcg) = &card.tcgplayer {
            if !tcg.updated_at.is_empty() {
                lines.push(field("Updated", tcg.updated_at.clone()));
            }
            if !tcg.url.is_empty() {
                lines.push(field("Buy", tcg.url.clone()));
            }
        }
    }

    if !card.images.large.is_empty() {
        lines.push(Line::from(""));
        lines.push(field("Image", card.images.large.clone()));
    }

    lines
}

impl Component for DetailComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageDown)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageUp)
            }
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::Char(' ') => Some(Action::ToggleFavorite),
            KeyCode::Char('a') => Some(Action::OpenAddToCollection),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let max_scroll = self.content.len().saturating_sub(1);

        match action {
            Action::ScrollDown => {
                if self.scroll < max_scroll {
                    self.scroll += 1;
                }
            }
            Action::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            Action::PageDown => {
                self.scroll = (self.scroll + 20).min(max_scroll);
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(20);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let visible_height = area.height.saturating_sub(2) as usize;
        let border = if self.expanded { Color::Cyan } else { Color::DarkGray };

        let paragraph = Paragraph::new(self.content.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.title())
                    .border_style(Style::default().fg(border)),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll as u16, 0));

        frame.render_widget(paragraph, area);

        // Render scrollbar if content exceeds visible area
        let total = self.content.len();
        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(self.scroll);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}
