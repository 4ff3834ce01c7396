//! Domain state - business/data state separate from UI concerns

use super::account::{Collection, CollectionEntry, Session};
use super::card::{Card, CardSet};
use super::search::SearchFilters;
use std::collections::HashSet;

/// Progress of the list currently on screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Enumerations backing the filter form, loaded once from the catalog
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Newest release first
    pub sets: Vec<CardSet>,
    pub types: Vec<String>,
    pub subtypes: Vec<String>,
    pub rarities: Vec<String>,
}

impl FilterOptions {
    pub fn is_loaded(&self) -> bool {
        !self.sets.is_empty() || !self.types.is_empty()
    }

    /// Sort sets by release date, newest first
    ///
    /// Release dates are `YYYY/MM/DD`, so string order is date order.
    pub fn sort_sets(&mut self) {
        self.sets
            .sort_by(|a, b| b.release_date.cmp(&a.release_date).then(a.id.cmp(&b.id)));
    }
}

/// A collection opened for browsing
#[derive(Debug, Clone)]
pub struct OpenCollection {
    pub collection: Collection,
    pub entries: Vec<CollectionEntry>,
}

impl OpenCollection {
    pub fn total_cards(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }
}

/// Domain state containing all business data
#[derive(Debug, Default)]
pub struct DomainState {
    /// Cards in the displayed list (search results or favorites)
    pub cards: Vec<Card>,

    /// Last page successfully appended to `cards`
    pub page: u32,

    /// Total matches reported by the catalog for the current filters
    pub total_count: u32,

    /// Filters the displayed search results were fetched with
    pub filters: SearchFilters,

    /// State of the displayed list
    pub load_state: LoadState,

    /// Bumped whenever the displayed list is replaced
    pub generation: u64,

    /// Card ids the signed-in user has favorited
    pub favorite_ids: HashSet<String>,

    /// The signed-in user's collections, newest first
    pub collections: Vec<Collection>,

    /// Collection whose entries are being browsed
    pub open_collection: Option<OpenCollection>,

    /// Filter form enumerations
    pub filter_options: FilterOptions,

    /// Current auth session
    pub session: Option<Session>,
}

impl DomainState {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    pub fn is_favorite(&self, card_id: &str) -> bool {
        self.favorite_ids.contains(card_id)
    }

    pub fn has_more(&self) -> bool {
        (self.cards.len() as u64) < u64::from(self.total_count)
    }

    /// Start a new list, invalidating responses for the previous one
    pub fn begin_list(&mut self) -> u64 {
        self.generation += 1;
        self.load_state = LoadState::Loading;
        self.generation
    }

    /// Forget everything tied to the signed-in user
    pub fn clear_user_data(&mut self) {
        self.session = None;
        self.favorite_ids.clear();
        self.collections.clear();
        self.open_collection = None;
    }
}
