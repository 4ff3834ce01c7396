//! Home component - Main application screen
//!
//! Displays the view tabs, the card or collection list, the card panel, and
//! the status and key hint bars. Owns list navigation state.

use crate::action::Action;
use crate::component::Component;
use crate::components::{calculate_main_layout, DetailComponent};
use crate::model::account::{Collection, CollectionEntry};
use crate::model::card::Card;
use crate::model::domain::{DomainState, LoadState};
use crate::model::ui::View;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use std::time::Instant;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Display columns reserved for the card name in list rows
const NAME_WIDTH: usize = 24;

// ═══════════════════════════════════════════════════════════════════════════════
// Home Component
// ═══════════════════════════════════════════════════════════════════════════════

/// Home component for the main application view
pub struct HomeComponent {
    /// Current view
    pub view: View,

    /// List selection state
    pub list_state: ListState,

    /// Quick name search text
    pub search_query: String,

    /// Whether quick search input is active
    pub search_mode: bool,

    /// Whether the Collections view is showing one collection's cards
    pub collection_open: bool,

    /// Advances every tick while something is loading
    spinner_frame: usize,
}

impl Default for HomeComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeComponent {
    pub fn new() -> Self {
        Self {
            view: View::Search,
            list_state: ListState::default(),
            search_query: String::new(),
            search_mode: false,
            collection_open: false,
            spinner_frame: 0,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Select next item, wrapping to the first
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(next));
    }

    /// Select previous item, wrapping to the last
    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let prev = match self.list_state.selected() {
            Some(i) if i > 0 && i < len => i - 1,
            _ => len - 1,
        };
        self.list_state.select(Some(prev));
    }

    pub fn select_first(&mut self, len: usize) {
        self.list_state.select(if len == 0 { None } else { Some(0) });
    }

    pub fn select_last(&mut self, len: usize) {
        self.list_state.select(len.checked_sub(1));
    }

    /// Keep the selection inside a list that may have shrunk
    pub fn clamp(&mut self, len: usize) {
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
    }

    fn spinner(&self) -> &'static str {
        SPINNER[self.spinner_frame]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
    }

    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }

    pub fn search_input(&mut self, c: char) {
        self.search_query.push(c);
    }

    pub fn search_backspace(&mut self) {
        self.search_query.pop();
    }

    fn handle_search_key(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::ExitSearchMode),
            KeyCode::Enter => Some(Action::SubmitSearch),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(c) => Some(Action::SearchInput(c)),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for HomeComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.search_mode {
            return Ok(self.handle_search_key(key));
        }

        let browsing_collections = self.view == View::Collections && !self.collection_open;

        let action = match key.code {
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Tab => Some(Action::NextView),
            KeyCode::BackTab => Some(Action::PrevView),
            KeyCode::Char('1') => Some(Action::SwitchView(View::Search)),
            KeyCode::Char('2') => Some(Action::SwitchView(View::Favorites)),
            KeyCode::Char('3') => Some(Action::SwitchView(View::Collections)),
            KeyCode::Char('g') => Some(Action::FirstItem),
            KeyCode::Char('G') => Some(Action::LastItem),

            // Card panel scrolling
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ScrollDown)
            }
            KeyCode::Char('y') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ScrollUp)
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageDown)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageUp)
            }
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),

            // Collections
            KeyCode::Enter if browsing_collections => Some(Action::OpenCollection),
            KeyCode::Char('n') if self.view == View::Collections => {
                Some(Action::OpenNewCollection)
            }
            KeyCode::Char('d') if browsing_collections => Some(Action::OpenDeleteCollection),
            KeyCode::Char('d') if self.collection_open => Some(Action::RemoveFromCollection),
            KeyCode::Esc | KeyCode::Backspace if self.collection_open => {
                Some(Action::CloseCollection)
            }

            // Cards
            KeyCode::Enter if !browsing_collections => Some(Action::OpenCardDetail),
            KeyCode::Char(' ') if !browsing_collections => Some(Action::ToggleFavorite),
            KeyCode::Char('a') if !browsing_collections => Some(Action::OpenAddToCollection),

            // Search
            KeyCode::Char('/') => Some(Action::EnterSearchMode),
            KeyCode::Char('f') => Some(Action::OpenFilters),
            KeyCode::Char('x') => Some(Action::ResetFilters),
            KeyCode::Char('m') => Some(Action::LoadMore),
            KeyCode::Char('r') => Some(Action::Refresh),

            // Account
            KeyCode::Char('u') => Some(Action::OpenAuth),
            KeyCode::Char('U') => Some(Action::SignOut),

            // Modals
            KeyCode::Char('l') => Some(Action::OpenLogs),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ForceQuit)
            }

            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::EnterSearchMode => self.enter_search_mode(),
            Action::ExitSearchMode => self.exit_search_mode(),
            Action::SearchInput(c) => self.search_input(c),
            Action::SearchBackspace => self.search_backspace(),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Drawing is done through draw_home_screen which takes full context
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Context needed for rendering the home screen
pub struct HomeRenderContext<'a> {
    pub domain: &'a DomainState,
    pub backend_enabled: bool,
    /// When the oldest unfinished request started
    pub busy_since: Option<Instant>,
    pub status_message: Option<&'a str>,
}

/// One list row for a card
pub fn card_row(card: &Card, is_favorite: bool) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            if is_favorite { "♥ " } else { "  " },
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            fit_width(&card.name, NAME_WIDTH),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if let Some(hp) = &card.hp {
        spans.push(Span::styled(format!("  HP {}", hp), Style::default().fg(Color::Red)));
    }
    if !card.types.is_empty() {
        spans.push(Span::styled(
            format!("  {}", card.types.join("/")),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        format!("  {} {}", card.set.name, card.collector_number()),
        Style::default().fg(Color::DarkGray),
    ));
    if let Some(rarity) = &card.rarity {
        spans.push(Span::styled(
            format!("  {}", rarity),
            Style::default().fg(Color::Cyan),
        ));
    }

    Line::from(spans)
}

/// Pad or truncate `text` to exactly `width` terminal columns
fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        let padding = width - text.width();
        return format!("{}{}", text, " ".repeat(padding));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// One list row for a collection
pub fn collection_row(collection: &Collection) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            collection.name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", collection.description_or_default()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("  created {}", collection.formatted_created()),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn entry_row(entry: &CollectionEntry, is_favorite: bool) -> Line<'static> {
    let mut row = card_row(&entry.card_data, is_favorite);
    row.spans.insert(
        0,
        Span::styled(
            format!("x{:<3}", entry.quantity),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    );
    row
}

/// Draw the home screen
pub fn draw_home_screen(
    frame: &mut Frame,
    area: Rect,
    home: &mut HomeComponent,
    detail: &mut DetailComponent,
    ctx: &HomeRenderContext,
) -> Result<()> {
    let layout = calculate_main_layout(area);

    render_tabs(frame, layout.tabs, home, ctx);
    render_list(frame, layout.list, home, ctx);

    let selected = home.selected().and_then(|i| match home.view {
        View::Search | View::Favorites => ctx.domain.cards.get(i),
        View::Collections => ctx
            .domain
            .open_collection
            .as_ref()
            .and_then(|open| open.entries.get(i))
            .map(|e| &e.card_data),
    });
    let is_favorite = selected.is_some_and(|c| ctx.domain.is_favorite(&c.id));
    detail.set_card(selected, is_favorite);
    detail.draw(frame, layout.detail)?;

    render_status_bar(frame, layout.status, home, ctx);
    render_help_bar(frame, layout.help, home);

    Ok(())
}

fn render_tabs(frame: &mut Frame, area: Rect, home: &HomeComponent, ctx: &HomeRenderContext) {
    let all_views = View::all();
    let titles: Vec<String> = all_views
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{} {}", i + 1, v.name()))
        .collect();
    let selected = all_views
        .iter()
        .position(|v| *v == home.view)
        .unwrap_or(0);

    let account = match (&ctx.domain.session, ctx.backend_enabled) {
        (Some(session), _) => format!(" {} ", session.email()),
        (None, true) => " not signed in ".to_string(),
        (None, false) => " offline ".to_string(),
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" Pokédex ")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .title(ratatui::widgets::block::Title::from(account).alignment(Alignment::Right)),
        )
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn list_title(home: &HomeComponent, domain: &DomainState) -> String {
    let mut title = match home.view {
        View::Search => {
            let mut t = format!(" Search ({} of {})", domain.cards.len(), domain.total_count);
            let active = domain.filters.active_filter_count();
            if !domain.filters.query.trim().is_empty() {
                t = format!("{} \"{}\"", t, domain.filters.query.trim());
            }
            if active > 0 {
                t = format!("{} [{} filters]", t, active);
            }
            t
        }
        View::Favorites => format!(" Favorites ({})", domain.cards.len()),
        View::Collections => match &domain.open_collection {
            Some(open) => format!(
                " {} ({} cards, {} entries)",
                open.collection.name,
                open.total_cards(),
                open.entries.len()
            ),
            None => format!(" Collections ({})", domain.collections.len()),
        },
    };
    if domain.load_state.is_loading() {
        title.push_str(" loading...");
    }
    title.push(' ');
    title
}

fn empty_message(home: &HomeComponent, ctx: &HomeRenderContext) -> &'static str {
    let domain = ctx.domain;
    if domain.load_state.is_loading() {
        return "Loading...";
    }
    if matches!(domain.load_state, LoadState::Failed(_)) {
        return "Could not load this list. Press r to retry.";
    }
    if home.view.requires_account() && domain.session.is_none() {
        return if ctx.backend_enabled {
            "Sign in with u to see your favorites and collections."
        } else {
            "Backend is not configured."
        };
    }
    match home.view {
        View::Search => "No cards found.",
        View::Favorites => "No favorites yet. Press Space on a card to add one.",
        View::Collections if domain.open_collection.is_some() => {
            "This collection is empty. Add cards with a from the search view."
        }
        View::Collections => "No collections yet. Press n to create one.",
    }
}

fn render_list(frame: &mut Frame, area: Rect, home: &mut HomeComponent, ctx: &HomeRenderContext) {
    let domain = ctx.domain;

    let items: Vec<ListItem> = match home.view {
        View::Search | View::Favorites => domain
            .cards
            .iter()
            .map(|c| ListItem::new(card_row(c, domain.is_favorite(&c.id))))
            .collect(),
        View::Collections => match &domain.open_collection {
            Some(open) => open
                .entries
                .iter()
                .map(|e| ListItem::new(entry_row(e, domain.is_favorite(&e.card_id))))
                .collect(),
            None => domain
                .collections
                .iter()
                .map(|c| ListItem::new(collection_row(c)))
                .collect(),
        },
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(list_title(home, domain))
        .border_style(Style::default().fg(Color::DarkGray));

    if items.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            empty_message(home, ctx),
            Style::default().fg(Color::DarkGray),
        )))
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let mut block = block;
    if home.view == View::Search && domain.has_more() {
        block = block.title_bottom(Line::from(" m: load more ").alignment(Alignment::Right));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut home.list_state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, home: &HomeComponent, ctx: &HomeRenderContext) {
    let mut spans = vec![];

    if let Some(since) = ctx.busy_since {
        let waited = since.elapsed().as_secs();
        let label = if waited >= 2 {
            format!(" {} {}s ", home.spinner(), waited)
        } else {
            format!(" {} ", home.spinner())
        };
        spans.push(Span::styled(label, Style::default().fg(Color::Cyan)));
    }

    if let LoadState::Failed(error) = &ctx.domain.load_state {
        spans.push(Span::styled(
            format!(" Error: {} ", error),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(status) = ctx.status_message {
        spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans));
    frame.render_widget(paragraph, area);
}

fn key_hint(key: &str, label: &str, color: Color) -> [Span<'static>; 2] {
    [
        Span::styled(
            format!(" {} ", key),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{} ", label)),
    ]
}

fn render_help_bar(frame: &mut Frame, area: Rect, home: &HomeComponent) {
    let mut help_spans: Vec<Span> = Vec::new();

    if home.search_mode {
        help_spans.extend(key_hint("Esc", "Cancel", Color::Yellow));
        help_spans.extend(key_hint("Enter", "Search", Color::Green));
        help_spans.push(Span::styled(
            format!("Name: {}_", home.search_query),
            Style::default().fg(Color::Cyan),
        ));
    } else {
        help_spans.extend(key_hint("q", "Quit", Color::Yellow));
        match (home.view, home.collection_open) {
            (View::Collections, false) => {
                help_spans.extend(key_hint("Enter", "Open", Color::Green));
                help_spans.extend(key_hint("n", "New", Color::Green));
                help_spans.extend(key_hint("d", "Delete", Color::Red));
            }
            (View::Collections, true) => {
                help_spans.extend(key_hint("Esc", "Back", Color::Yellow));
                help_spans.extend(key_hint("Enter", "Details", Color::Green));
                help_spans.extend(key_hint("d", "Remove", Color::Red));
            }
            _ => {
                help_spans.extend(key_hint("Enter", "Details", Color::Green));
                help_spans.extend(key_hint("Space", "Favorite", Color::Magenta));
                help_spans.extend(key_hint("a", "Add to collection", Color::Magenta));
                help_spans.extend(key_hint("/", "Name", Color::Cyan));
                help_spans.extend(key_hint("f", "Filters", Color::Cyan));
            }
        }
        help_spans.extend(key_hint("u", "Account", Color::Blue));
        help_spans.extend(key_hint("?", "Help", Color::White));
    }

    let paragraph = Paragraph::new(Line::from(help_spans)).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}
