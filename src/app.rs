//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! It turns Actions into background jobs and applies their outcomes to the
//! domain state when they come back.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::inset;
use crate::components::{
    draw_home_screen, AuthDialog, CollectionDialog, ConfirmDialog, DetailComponent, FilterDialog,
    HelpDialog, HomeComponent, HomeRenderContext, LogsDialog, NewCollectionDialog,
};
use crate::config::Config;
use crate::model::account::{Collection, Session};
use crate::model::card::Card;
use crate::model::domain::{DomainState, FilterOptions, LoadState, OpenCollection};
use crate::model::modal::{Modal, ModalStack};
use crate::model::search::{SearchFilters, SearchParams};
use crate::model::ui::View;
use crate::services::{
    add_card_to_collection, ApiError, Backend, BackendError, CardCatalog, JobOutcome, JobRunner,
    PokemonTcgClient, SupabaseClient,
};
use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, widgets::Clear, Frame};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Domain state (business data)
    pub domain: DomainState,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Background job runner
    pub job_runner: JobRunner,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    catalog: Arc<dyn CardCatalog>,

    /// `None` when Supabase is not configured
    backend: Option<Arc<dyn Backend>>,

    page_size: u32,

    /// Save and restore the session file
    persist_session: bool,

    /// Card shown by the detail dialog
    detail_card: Option<Card>,

    /// Card the collection picker is adding
    add_card: Option<Card>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub home: HomeComponent,
    pub detail: DetailComponent,
    pub card_detail: DetailComponent,
    pub filter_dialog: FilterDialog,
    pub collection_dialog: CollectionDialog,
    pub new_collection_dialog: NewCollectionDialog,
    pub auth_dialog: AuthDialog,
    pub help_dialog: HelpDialog,
    pub logs_dialog: LogsDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Create the app with the real catalog and backend clients
    pub fn new(config: &Config) -> App {
        let catalog: Arc<dyn CardCatalog> = Arc::new(PokemonTcgClient::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
        ));
        let backend = config
            .backend
            .clone()
            .map(|b| Arc::new(SupabaseClient::new(b)) as Arc<dyn Backend>);

        if backend.is_none() {
            log::warn!("SUPABASE_URL / SUPABASE_ANON_KEY not set, accounts are disabled");
        }

        let mut app = Self::with_services(catalog, backend, JobRunner::new(), config.page_size);
        app.persist_session = true;
        app
    }

    /// Create the app over arbitrary services
    pub fn with_services(
        catalog: Arc<dyn CardCatalog>,
        backend: Option<Arc<dyn Backend>>,
        job_runner: JobRunner,
        page_size: u32,
    ) -> App {
        let mut card_detail = DetailComponent::new();
        card_detail.expanded = true;

        App {
            domain: DomainState::new(),
            modals: ModalStack::new(),
            job_runner,
            should_quit: false,
            status_message: None,
            catalog,
            backend,
            page_size,
            persist_session: false,
            detail_card: None,
            add_card: None,
            home: HomeComponent::new(),
            detail: DetailComponent::new(),
            card_detail,
            filter_dialog: FilterDialog::new(),
            collection_dialog: CollectionDialog::new(),
            new_collection_dialog: NewCollectionDialog::default(),
            auth_dialog: AuthDialog::default(),
            help_dialog: HelpDialog::default(),
            logs_dialog: LogsDialog::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of rows in the displayed list
    fn list_len(&self) -> usize {
        match self.home.view {
            View::Search | View::Favorites => self.domain.cards.len(),
            View::Collections => match &self.domain.open_collection {
                Some(open) => open.entries.len(),
                None => self.domain.collections.len(),
            },
        }
    }

    /// Card under the cursor in the displayed list
    pub fn selected_card(&self) -> Option<&Card> {
        let index = self.home.selected()?;
        match self.home.view {
            View::Search | View::Favorites => self.domain.cards.get(index),
            View::Collections => self
                .domain
                .open_collection
                .as_ref()?
                .entries
                .get(index)
                .map(|e| &e.card_data),
        }
    }

    /// Card that card actions apply to: the detail dialog's, else the selection
    fn target_card(&self) -> Option<Card> {
        if self.modals.top() == Some(&Modal::CardDetail) {
            return self.detail_card.clone();
        }
        self.selected_card().cloned()
    }

    fn selected_collection(&self) -> Option<&Collection> {
        if self.home.view != View::Collections || self.domain.open_collection.is_some() {
            return None;
        }
        self.domain.collections.get(self.home.selected()?)
    }

    /// Backend and session for a user action
    ///
    /// Anonymous users get the sign-in form instead.
    fn require_session(&mut self) -> Option<(Arc<dyn Backend>, Session)> {
        let Some(backend) = self.backend.clone() else {
            self.status_message = Some(BackendError::NotConfigured.to_string());
            return None;
        };
        match self.domain.session.clone() {
            Some(session) => Some((backend, session)),
            None => {
                self.open_auth();
                None
            }
        }
    }

    fn open_auth(&mut self) {
        if self.backend.is_none() {
            self.status_message = Some(BackendError::NotConfigured.to_string());
            return;
        }
        if !self.modals.contains(&Modal::Auth) {
            self.auth_dialog.reset();
            self.modals.push(Modal::Auth);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the search results with page 1 for `filters`
    fn search(&mut self, filters: SearchFilters) {
        let generation = self.domain.begin_list();
        let params = SearchParams::new(filters, 1, self.page_size);
        self.fetch_page(generation, params, false);
    }

    fn fetch_page(&mut self, generation: u64, params: SearchParams, append: bool) {
        log::debug!(
            "search page {} q={:?}",
            params.effective_page(),
            params.query_expression()
        );
        let catalog = Arc::clone(&self.catalog);
        self.job_runner.spawn(move || {
            let result = catalog.search_cards(&params);
            JobOutcome::Cards {
                generation,
                params,
                append,
                result,
            }
        });
    }

    /// Append the next page of the current search
    fn load_more(&mut self) {
        if self.home.view != View::Search
            || self.domain.load_state.is_loading()
            || !self.domain.has_more()
        {
            return;
        }
        self.domain.load_state = LoadState::Loading;
        let params = SearchParams::new(
            self.domain.filters.clone(),
            self.domain.page + 1,
            self.page_size,
        );
        self.fetch_page(self.domain.generation, params, true);
    }

    fn load_filter_options(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        self.job_runner
            .spawn(move || JobOutcome::FilterOptions(fetch_filter_options(catalog.as_ref())));
    }

    fn load_favorite_cards(&mut self) {
        let Some((backend, session)) = self.require_session() else {
            return;
        };
        let generation = self.domain.begin_list();
        self.job_runner.spawn(move || JobOutcome::FavoriteCards {
            generation,
            result: backend.list_favorite_cards(&session),
        });
    }

    fn load_favorite_ids(&mut self) {
        let Some((backend, session)) = self.require_session() else {
            return;
        };
        self.job_runner
            .spawn(move || JobOutcome::FavoriteIds(backend.list_favorite_ids(&session)));
    }

    fn load_collections(&mut self) {
        let Some((backend, session)) = self.require_session() else {
            return;
        };
        if self.home.view == View::Collections && self.domain.open_collection.is_none() {
            self.domain.load_state = LoadState::Loading;
        }
        self.job_runner
            .spawn(move || JobOutcome::Collections(backend.list_collections(&session)));
    }

    fn load_collection_entries(&mut self, collection: Collection) {
        let Some((backend, session)) = self.require_session() else {
            return;
        };
        let generation = self.domain.begin_list();
        self.job_runner.spawn(move || {
            let result = backend.list_collection_entries(&session, &collection.id);
            JobOutcome::CollectionEntries {
                generation,
                collection,
                result,
            }
        });
    }

    /// Validate the saved session, refreshing it if it has expired
    fn restore_session(&mut self) {
        if !self.persist_session {
            return;
        }
        let (Some(backend), Some(saved)) = (self.backend.clone(), Session::load()) else {
            return;
        };

        log::info!("restoring session for {}", saved.email());
        self.job_runner.spawn(move || {
            let result = if saved.is_expired(Utc::now()) {
                if saved.refresh_token.is_empty() {
                    Err(BackendError::NoSession)
                } else {
                    backend.refresh(&saved.refresh_token)
                }
            } else {
                backend
                    .get_user(&saved)
                    .map(|user| Session { user, ..saved })
            };
            JobOutcome::Authenticated {
                restored: true,
                result: result.map(Some),
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────────────

    fn switch_view(&mut self, view: View) {
        if view.requires_account() && self.domain.session.is_none() {
            self.open_auth();
            return;
        }

        self.home.view = view;
        self.home.collection_open = false;
        self.home.exit_search_mode();
        self.home.list_state.select(None);
        self.domain.open_collection = None;
        self.domain.cards.clear();
        self.domain.total_count = 0;
        self.domain.page = 1;

        match view {
            View::Search => {
                self.home.search_query.clear();
                self.search(SearchFilters::default());
            }
            View::Favorites => self.load_favorite_cards(),
            View::Collections => {
                self.domain.begin_list();
                self.load_collections();
            }
        }
    }

    /// Reload the displayed list with its current parameters
    fn refresh(&mut self) {
        match self.home.view {
            View::Search => self.search(self.domain.filters.clone()),
            View::Favorites => self.load_favorite_cards(),
            View::Collections => match self.domain.open_collection.clone() {
                Some(open) => self.load_collection_entries(open.collection),
                None => {
                    self.domain.begin_list();
                    self.load_collections();
                }
            },
        }
    }

    /// Run a search from the home screen, switching to the Search view
    fn submit_search(&mut self, filters: SearchFilters) {
        if self.home.view != View::Search {
            self.home.view = View::Search;
            self.home.collection_open = false;
            self.domain.open_collection = None;
            self.domain.cards.clear();
            self.domain.total_count = 0;
        }
        self.home.search_query = filters.query.clone();
        self.search(filters);
    }

    fn close_collection(&mut self) {
        if self.domain.open_collection.take().is_some() {
            // Drop any entry load still in flight
            self.domain.generation += 1;
            self.domain.load_state = LoadState::Loaded;
        }
        self.home.collection_open = false;
        self.home.clamp(self.list_len());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    fn toggle_favorite(&mut self) {
        let Some(card) = self.target_card() else {
            return;
        };
        let Some((backend, session)) = self.require_session() else {
            return;
        };

        let favorite = !self.domain.is_favorite(&card.id);
        self.job_runner.spawn(move || {
            let result = if favorite {
                backend.add_favorite(&session, &card)
            } else {
                backend.remove_favorite(&session, &card.id)
            };
            JobOutcome::FavoriteToggled {
                card_id: card.id,
                favorite,
                result,
            }
        });
    }

    fn open_add_to_collection(&mut self) {
        let Some(card) = self.target_card() else {
            return;
        };
        if self.require_session().is_none() {
            return;
        }
        self.collection_dialog
            .open(&card.name, &self.domain.collections);
        self.add_card = Some(card);
        self.modals.push(Modal::AddToCollection);
        self.load_collections();
    }

    fn add_to_collection(&mut self, collection_id: String, quantity: u32) {
        let Some(card) = self.add_card.clone() else {
            return;
        };
        let Some((backend, session)) = self.require_session() else {
            return;
        };

        self.collection_dialog.begin_submit();
        self.job_runner.spawn(move || {
            JobOutcome::CardAdded(add_card_to_collection(
                backend.as_ref(),
                &session,
                &collection_id,
                &card,
                quantity,
            ))
        });
    }

    fn open_new_collection(&mut self) {
        if self.require_session().is_none() {
            return;
        }
        self.new_collection_dialog.reset();
        self.modals.push(Modal::NewCollection);
    }

    fn create_collection(&mut self, name: String, description: Option<String>) {
        let Some((backend, session)) = self.require_session() else {
            return;
        };
        self.new_collection_dialog.begin_submit();
        self.job_runner.spawn(move || {
            JobOutcome::CollectionCreated(backend.create_collection(
                &session,
                &name,
                description.as_deref(),
            ))
        });
    }

    fn delete_collection(&mut self, collection_id: String) {
        let Some((backend, session)) = self.require_session() else {
            return;
        };
        self.job_runner.spawn(move || {
            let result = backend.delete_collection(&session, &collection_id);
            JobOutcome::CollectionDeleted {
                collection_id,
                result,
            }
        });
    }

    fn remove_from_collection(&mut self) {
        let Some(entry_id) = self.home.selected().and_then(|i| {
            self.domain
                .open_collection
                .as_ref()
                .and_then(|open| open.entries.get(i))
                .map(|e| e.id.clone())
        }) else {
            return;
        };
        let Some((backend, session)) = self.require_session() else {
            return;
        };
        self.job_runner.spawn(move || {
            let result = backend.remove_collection_entry(&session, &entry_id);
            JobOutcome::EntryRemoved { entry_id, result }
        });
    }

    fn authenticate(&mut self, email: String, password: String, sign_up: bool) {
        let Some(backend) = self.backend.clone() else {
            self.auth_dialog.fail(BackendError::NotConfigured.to_string());
            return;
        };
        self.auth_dialog.begin_submit();
        self.job_runner.spawn(move || {
            let result = if sign_up {
                backend.sign_up(&email, &password)
            } else {
                backend.sign_in(&email, &password).map(Some)
            };
            JobOutcome::Authenticated {
                restored: false,
                result,
            }
        });
    }

    fn sign_out(&mut self) {
        let Some(session) = self.domain.session.clone() else {
            self.status_message = Some("Not signed in".to_string());
            return;
        };

        if let Some(backend) = self.backend.clone() {
            self.job_runner
                .spawn(move || JobOutcome::SignedOut(backend.sign_out(&session)));
        }
        if self.persist_session {
            Session::clear_saved();
        }
        self.domain.clear_user_data();
        self.status_message = Some("Signed out".to_string());

        if self.home.view.requires_account() {
            self.switch_view(View::Search);
        }
    }

    fn open_card_detail(&mut self) {
        let Some(card) = self.selected_card().cloned() else {
            return;
        };

        // Favorites and collections hold a copy taken when it was saved
        if self.home.view != View::Search {
            let catalog = Arc::clone(&self.catalog);
            let id = card.id.clone();
            self.job_runner
                .spawn(move || JobOutcome::CardFetched(catalog.get_card(&id)));
        }

        self.detail_card = Some(card);
        self.modals.push(Modal::CardDetail);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Job Outcomes
    // ─────────────────────────────────────────────────────────────────────────

    fn apply_outcome(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Cards {
                generation,
                params,
                append,
                result,
            } => {
                if generation != self.domain.generation {
                    log::debug!("dropping stale page {} (list {})", params.page, generation);
                    return;
                }
                match result {
                    Ok(page) => {
                        log::info!(
                            "page {}: {} cards of {}",
                            params.effective_page(),
                            page.data.len(),
                            page.total_count
                        );
                        if append {
                            self.domain.cards.extend(page.data);
                        } else {
                            self.domain.cards = page.data;
                            self.home.select_first(self.domain.cards.len());
                        }
                        self.domain.page = params.effective_page();
                        self.domain.total_count = page.total_count;
                        self.domain.filters = params.filters;
                        self.domain.load_state = LoadState::Loaded;
                        self.home.clamp(self.domain.cards.len());
                    }
                    Err(e) => {
                        log::error!("search failed: {}", e);
                        self.domain.load_state = LoadState::Failed(e.to_string());
                    }
                }
            }
            JobOutcome::CardFetched(result) => match result {
                Ok(card) => {
                    if self.detail_card.as_ref().is_some_and(|c| c.id == card.id) {
                        self.detail_card = Some(card);
                    }
                }
                Err(e) => log::debug!("card refresh failed: {}", e),
            },
            JobOutcome::FavoriteCards { generation, result } => {
                if generation != self.domain.generation {
                    log::debug!("dropping stale favorites (list {})", generation);
                    return;
                }
                match result {
                    Ok(cards) => {
                        self.domain.total_count = cards.len() as u32;
                        self.domain.cards = cards;
                        self.domain.page = 1;
                        self.domain.load_state = LoadState::Loaded;
                        self.home.select_first(self.domain.cards.len());
                    }
                    Err(e) => {
                        log::error!("loading favorites failed: {}", e);
                        self.domain.load_state = LoadState::Failed(e.to_string());
                        self.check_session_error(&e);
                    }
                }
            }
            JobOutcome::FilterOptions(result) => match result {
                Ok(mut options) => {
                    options.sort_sets();
                    log::debug!(
                        "filter options: {} sets, {} types",
                        options.sets.len(),
                        options.types.len()
                    );
                    self.domain.filter_options = options;
                }
                Err(e) => {
                    log::warn!("loading filter options failed: {}", e);
                    self.status_message = Some("Could not load filter options".to_string());
                }
            },
            JobOutcome::Authenticated { restored, result } => {
                self.apply_authenticated(restored, result)
            }
            JobOutcome::SignedOut(result) => {
                if let Err(e) = result {
                    log::warn!("sign out request failed: {}", e);
                }
            }
            JobOutcome::FavoriteIds(result) => match result {
                Ok(ids) => {
                    self.domain.favorite_ids = ids.into_iter().collect::<HashSet<_>>();
                }
                Err(e) => {
                    log::warn!("loading favorite ids failed: {}", e);
                    self.check_session_error(&e);
                }
            },
            JobOutcome::FavoriteToggled {
                card_id,
                favorite,
                result,
            } => match result {
                Ok(()) if self.domain.session.is_some() => {
                    if favorite {
                        self.domain.favorite_ids.insert(card_id);
                    } else {
                        self.domain.favorite_ids.remove(&card_id);
                        if self.home.view == View::Favorites {
                            self.domain.cards.retain(|c| c.id != card_id);
                            self.domain.total_count = self.domain.cards.len() as u32;
                            self.home.clamp(self.domain.cards.len());
                        }
                    }
                }
                Ok(()) => {}
                Err(e) => {
                    log::warn!("favorite toggle for {} failed: {}", card_id, e);
                    self.check_session_error(&e);
                }
            },
            JobOutcome::Collections(result) => {
                let listing = self.home.view == View::Collections
                    && self.domain.open_collection.is_none();
                match result {
                    Ok(collections) => {
                        self.collection_dialog.set_collections(&collections);
                        self.domain.collections = collections;
                        if listing {
                            self.domain.load_state = LoadState::Loaded;
                            self.home.clamp(self.domain.collections.len());
                        }
                    }
                    Err(e) => {
                        log::error!("loading collections failed: {}", e);
                        if listing {
                            self.domain.load_state = LoadState::Failed(e.to_string());
                        }
                        self.check_session_error(&e);
                    }
                }
            }
            JobOutcome::CollectionCreated(result) => match result {
                Ok(collection) => {
                    log::info!("created collection {}", collection.name);
                    self.status_message = Some(format!("Created \"{}\"", collection.name));
                    self.modals.remove(&Modal::NewCollection);
                    self.load_collections();
                }
                Err(e) => {
                    log::warn!("creating collection failed: {}", e);
                    self.new_collection_dialog.fail(e.to_string());
                }
            },
            JobOutcome::CollectionDeleted {
                collection_id,
                result,
            } => match result {
                Ok(()) => {
                    self.domain.collections.retain(|c| c.id != collection_id);
                    if self
                        .domain
                        .open_collection
                        .as_ref()
                        .is_some_and(|open| open.collection.id == collection_id)
                    {
                        self.close_collection();
                    }
                    self.home.clamp(self.list_len());
                    self.status_message = Some("Collection deleted".to_string());
                }
                Err(e) => {
                    log::warn!("deleting collection failed: {}", e);
                    self.status_message = Some(format!("Could not delete collection: {}", e));
                }
            },
            JobOutcome::CollectionEntries {
                generation,
                collection,
                result,
            } => {
                if generation != self.domain.generation {
                    log::debug!("dropping stale entries of {}", collection.id);
                    return;
                }
                match result {
                    Ok(entries) => {
                        let len = entries.len();
                        self.domain.open_collection = Some(OpenCollection {
                            collection,
                            entries,
                        });
                        self.domain.load_state = LoadState::Loaded;
                        self.home.collection_open = true;
                        self.home.select_first(len);
                    }
                    Err(e) => {
                        log::error!("loading collection {} failed: {}", collection.id, e);
                        self.domain.load_state = LoadState::Failed(e.to_string());
                    }
                }
            }
            JobOutcome::CardAdded(result) => {
                let ok = result.is_ok();
                match result {
                    Ok(quantity) => log::info!("card added, now x{}", quantity),
                    Err(e) => log::warn!("adding card to collection failed: {}", e),
                }
                self.collection_dialog.finish_submit(ok, Instant::now());
                if ok {
                    self.load_collections();
                    if let Some(open) = self.domain.open_collection.clone() {
                        self.load_collection_entries(open.collection);
                    }
                }
            }
            JobOutcome::EntryRemoved { entry_id, result } => match result {
                Ok(()) => {
                    if let Some(open) = self.domain.open_collection.as_mut() {
                        open.entries.retain(|e| e.id != entry_id);
                    }
                    self.home.clamp(self.list_len());
                }
                Err(e) => {
                    log::warn!("removing entry failed: {}", e);
                    self.status_message = Some(format!("Could not remove card: {}", e));
                }
            },
        }
    }

    /// A rejected token means the session is gone server-side
    fn check_session_error(&mut self, error: &BackendError) {
        if !error.is_unauthorized() || self.domain.session.is_none() {
            return;
        }
        log::warn!("session rejected by backend, signing out");
        if self.persist_session {
            Session::clear_saved();
        }
        self.domain.clear_user_data();
        self.status_message = Some("Session expired, please sign in again".to_string());
        self.open_auth();
    }

    fn apply_authenticated(&mut self, restored: bool, result: Result<Option<Session>, BackendError>) {
        match result {
            Ok(Some(session)) => {
                log::info!("signed in as {}", session.email());
                if self.persist_session {
                    if let Err(e) = session.save() {
                        log::warn!("could not save session: {}", e);
                    }
                }
                self.status_message = Some(format!("Signed in as {}", session.email()));
                self.domain.session = Some(session);
                self.modals.remove(&Modal::Auth);
                self.load_favorite_ids();
                self.load_collections();
            }
            Ok(None) => {
                log::info!("sign up awaiting email confirmation");
                self.auth_dialog.awaiting_confirmation();
            }
            Err(e) if restored => {
                log::info!("saved session discarded: {}", e);
                if self.persist_session {
                    Session::clear_saved();
                }
            }
            Err(e) => {
                log::warn!("authentication failed: {}", e);
                self.auth_dialog.fail(e.to_string());
            }
        }
    }

    /// Apply every finished job
    fn poll_jobs(&mut self) {
        for outcome in self.job_runner.poll() {
            self.apply_outcome(outcome);
        }
    }
}

/// Every enumeration the filter form offers, in one job
fn fetch_filter_options(catalog: &dyn CardCatalog) -> Result<FilterOptions, ApiError> {
    Ok(FilterOptions {
        sets: catalog.get_sets()?,
        types: catalog.get_types()?,
        subtypes: catalog.get_subtypes()?,
        rarities: catalog.get_rarities()?,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<()> {
        self.search(SearchFilters::default());
        self.load_filter_options();
        self.restore_session();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(modal) = self.modals.top().cloned() {
            self.handle_modal_key_event(&modal, key)
        } else {
            self.home.handle_key_event(key)
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let action = match mouse.kind {
            MouseEventKind::ScrollDown if self.modals.is_empty() => Some(Action::NextItem),
            MouseEventKind::ScrollUp if self.modals.is_empty() => Some(Action::PrevItem),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action != Action::Tick {
            log::trace!("action {}", action);
        }

        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                self.poll_jobs();
                if self.job_runner.is_busy() {
                    self.home.tick();
                }
                if self.modals.contains(&Modal::AddToCollection)
                    && self.collection_dialog.should_close(Instant::now())
                {
                    self.modals.remove(&Modal::AddToCollection);
                    self.add_card = None;
                }
            }
            Action::Resize(_, _) => {}
            Action::ForceQuit => {
                self.should_quit = true;
            }

            // ─────────────────────────────────────────────────────────────────
            // Navigation (delegate to HomeComponent)
            // ─────────────────────────────────────────────────────────────────
            Action::NextItem => self.home.next(self.list_len()),
            Action::PrevItem => self.home.previous(self.list_len()),
            Action::FirstItem => self.home.select_first(self.list_len()),
            Action::LastItem => self.home.select_last(self.list_len()),
            Action::NextView => self.switch_view(self.home.view.next()),
            Action::PrevView => self.switch_view(self.home.view.previous()),
            Action::SwitchView(view) => self.switch_view(view),

            // ─────────────────────────────────────────────────────────────────
            // Scrolling (delegate to DetailComponent)
            // ─────────────────────────────────────────────────────────────────
            Action::ScrollUp | Action::ScrollDown | Action::PageUp | Action::PageDown => {
                if self.modals.top() == Some(&Modal::CardDetail) {
                    self.card_detail.update(action)?;
                } else {
                    self.detail.update(action)?;
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => self.modals.push(Modal::QuitConfirm),
            Action::OpenHelp => self.modals.push(Modal::Help),
            Action::OpenLogs => {
                self.logs_dialog.reset();
                self.modals.push(Modal::Logs);
            }
            Action::OpenCardDetail => self.open_card_detail(),
            Action::CloseModal => {
                if self.modals.pop() == Some(Modal::AddToCollection) {
                    self.add_card = None;
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Search
            // ─────────────────────────────────────────────────────────────────
            Action::EnterSearchMode => {
                self.home.search_query = self.domain.filters.query.clone();
                self.home.update(action)?;
            }
            Action::ExitSearchMode | Action::SearchInput(_) | Action::SearchBackspace => {
                self.home.update(action)?;
            }
            Action::SubmitSearch => {
                self.home.exit_search_mode();
                let filters = SearchFilters {
                    query: self.home.search_query.trim().to_string(),
                    ..self.domain.filters.clone()
                };
                self.submit_search(filters);
            }
            Action::OpenFilters => {
                if !self.domain.filter_options.is_loaded() {
                    self.load_filter_options();
                }
                self.filter_dialog.set_options(&self.domain.filter_options);
                self.filter_dialog.set_filters(&self.domain.filters);
                self.modals.push(Modal::Filters);
            }
            Action::ApplyFilters(filters) => {
                self.modals.remove(&Modal::Filters);
                self.submit_search(filters);
            }
            Action::ResetFilters => {
                self.modals.remove(&Modal::Filters);
                self.submit_search(SearchFilters::default());
            }
            Action::LoadMore => self.load_more(),
            Action::Refresh => self.refresh(),

            // ─────────────────────────────────────────────────────────────────
            // Favorites & Collections
            // ─────────────────────────────────────────────────────────────────
            Action::ToggleFavorite => self.toggle_favorite(),
            Action::OpenAddToCollection => self.open_add_to_collection(),
            Action::AddToCollection {
                collection_id,
                quantity,
            } => self.add_to_collection(collection_id, quantity),
            Action::OpenNewCollection => self.open_new_collection(),
            Action::CreateCollection { name, description } => {
                self.create_collection(name, description)
            }
            Action::OpenCollection => {
                if let Some(collection) = self.selected_collection().cloned() {
                    self.load_collection_entries(collection);
                }
            }
            Action::CloseCollection => self.close_collection(),
            Action::OpenDeleteCollection => {
                if let Some(collection) = self.selected_collection() {
                    self.modals.push(Modal::DeleteCollection {
                        collection_id: collection.id.clone(),
                        name: collection.name.clone(),
                    });
                }
            }
            Action::DeleteCollection(collection_id) => {
                self.modals.pop();
                self.delete_collection(collection_id);
            }
            Action::RemoveFromCollection => self.remove_from_collection(),

            // ─────────────────────────────────────────────────────────────────
            // Account
            // ─────────────────────────────────────────────────────────────────
            Action::OpenAuth => {
                if let Some(session) = &self.domain.session {
                    self.status_message =
                        Some(format!("Signed in as {} (U to sign out)", session.email()));
                } else {
                    self.open_auth();
                }
            }
            Action::SignIn { email, password } => self.authenticate(email, password, false),
            Action::SignUp { email, password } => self.authenticate(email, password, true),
            Action::SignOut => self.sign_out(),
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let ctx = HomeRenderContext {
            domain: &self.domain,
            backend_enabled: self.backend.is_some(),
            busy_since: self.job_runner.busy_since(),
            status_message: self.status_message.as_deref(),
        };

        draw_home_screen(frame, area, &mut self.home, &mut self.detail, &ctx)?;

        // Lower modals stay visible under the top one
        let modals: Vec<Modal> = self.modals.iter().cloned().collect();
        for modal in &modals {
            self.draw_modal(frame, area, modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => ConfirmDialog::quit().handle_key_event(key),
            Modal::DeleteCollection {
                collection_id,
                name,
            } => ConfirmDialog::delete_collection(collection_id, name).handle_key_event(key),
            Modal::CardDetail => self.card_detail.handle_key_event(key),
            Modal::Filters => self.filter_dialog.handle_key_event(key),
            Modal::AddToCollection => self.collection_dialog.handle_key_event(key),
            Modal::NewCollection => self.new_collection_dialog.handle_key_event(key),
            Modal::Auth => self.auth_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::Logs => self.logs_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => ConfirmDialog::quit().draw(frame, area)?,
            Modal::DeleteCollection {
                collection_id,
                name,
            } => ConfirmDialog::delete_collection(collection_id, name).draw(frame, area)?,
            Modal::CardDetail => {
                let is_favorite = self
                    .detail_card
                    .as_ref()
                    .is_some_and(|c| self.domain.is_favorite(&c.id));
                self.card_detail
                    .set_card(self.detail_card.as_ref(), is_favorite);
                let detail_area = inset(area, 2);
                frame.render_widget(Clear, detail_area);
                self.card_detail.draw(frame, detail_area)?;
            }
            Modal::Filters => self.filter_dialog.draw(frame, area)?,
            Modal::AddToCollection => self.collection_dialog.draw(frame, area)?,
            Modal::NewCollection => self.new_collection_dialog.draw(frame, area)?,
            Modal::Auth => self.auth_dialog.draw(frame, area)?,
            Modal::Help => self.help_dialog.draw(frame, area)?,
            Modal::Logs => self.logs_dialog.draw(frame, area)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collection_dialog::{ADDED_MESSAGE, FAILED_MESSAGE};
    use crate::model::card::sample_card;
    use crate::services::testing::{MemoryBackend, MemoryCatalog};

    const EMAIL: &str = "ash@example.com";

    fn app_with(catalog: Arc<MemoryCatalog>, backend: Option<Arc<MemoryBackend>>) -> App {
        let backend = backend.map(|b| b as Arc<dyn Backend>);
        let mut app = App::with_services(catalog, backend, JobRunner::inline(), 20);
        app.init().unwrap();
        settle(&mut app);
        app
    }

    /// Tick until every job, including follow-up jobs, has been applied
    fn settle(app: &mut App) {
        for _ in 0..10 {
            app.update(Action::Tick).unwrap();
            if !app.job_runner.is_busy() {
                return;
            }
        }
    }

    fn run(app: &mut App, action: Action) {
        app.update(action).unwrap();
        settle(app);
    }

    fn sign_in(app: &mut App) {
        run(
            app,
            Action::SignIn {
                email: EMAIL.to_string(),
                password: "pikachu".to_string(),
            },
        );
        assert!(app.domain.session.is_some());
    }

    fn signed_in() -> (App, Arc<MemoryCatalog>, Arc<MemoryBackend>) {
        let catalog = Arc::new(MemoryCatalog::numbered(45));
        let backend = Arc::new(MemoryBackend::new());
        let mut app = app_with(Arc::clone(&catalog), Some(Arc::clone(&backend)));
        sign_in(&mut app);
        (app, catalog, backend)
    }

    fn query(name: &str) -> SearchFilters {
        SearchFilters {
            query: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_search_on_start() {
        let catalog = Arc::new(MemoryCatalog::numbered(45));
        let app = app_with(Arc::clone(&catalog), None);

        assert_eq!(catalog.requested_pages(), vec![1]);
        assert_eq!(app.domain.cards.len(), 20);
        assert_eq!(app.domain.total_count, 45);
        assert_eq!(app.domain.load_state, LoadState::Loaded);
        assert_eq!(app.home.selected(), Some(0));
        assert!(app.domain.filter_options.is_loaded());
    }

    #[test]
    fn test_load_more_appends_next_page_until_total() {
        let catalog = Arc::new(MemoryCatalog::numbered(45));
        let mut app = app_with(Arc::clone(&catalog), None);

        run(&mut app, Action::LoadMore);
        assert_eq!(app.domain.cards.len(), 40);
        assert_eq!(app.domain.cards[20].id, "card-20");

        run(&mut app, Action::LoadMore);
        assert_eq!(app.domain.cards.len(), 45);
        assert!(!app.domain.has_more());

        run(&mut app, Action::LoadMore);
        assert_eq!(catalog.requested_pages(), vec![1, 2, 3]);
        assert_eq!(app.domain.cards.len(), 45);
    }

    #[test]
    fn test_load_more_ignored_while_loading() {
        let catalog = Arc::new(MemoryCatalog::numbered(45));
        let mut app = app_with(Arc::clone(&catalog), None);

        app.update(Action::LoadMore).unwrap();
        app.update(Action::LoadMore).unwrap();
        settle(&mut app);

        assert_eq!(catalog.requested_pages(), vec![1, 2]);
        assert_eq!(app.domain.page, 2);
    }

    #[test]
    fn test_failed_load_more_keeps_list_and_page() {
        let catalog = Arc::new(MemoryCatalog::numbered(45));
        let mut app = app_with(Arc::clone(&catalog), None);

        *catalog.fail.lock().unwrap() = true;
        run(&mut app, Action::LoadMore);

        assert_eq!(app.domain.cards.len(), 20);
        assert_eq!(app.domain.page, 1);
        assert!(matches!(app.domain.load_state, LoadState::Failed(_)));

        *catalog.fail.lock().unwrap() = false;
        run(&mut app, Action::LoadMore);
        assert_eq!(app.domain.cards.len(), 40);
    }

    #[test]
    fn test_search_by_name_returns_matching_cards() {
        let cards = vec![
            sample_card("base1-58", "Pikachu"),
            sample_card("base1-14", "Raichu"),
            sample_card("swsh4-44", "Pikachu VMAX"),
            sample_card("base1-4", "Charizard"),
        ];
        let catalog = Arc::new(MemoryCatalog::new(cards));
        let mut app = app_with(Arc::clone(&catalog), None);

        run(&mut app, Action::ApplyFilters(query("Pikachu")));

        assert_eq!(app.domain.cards.len(), 2);
        assert!(app.domain.cards.iter().all(|c| c.name.contains("Pikachu")));
        assert_eq!(app.domain.filters.query, "Pikachu");
        assert_eq!(app.domain.page, 1);
    }

    #[test]
    fn test_quick_search_keeps_other_filters() {
        let catalog = Arc::new(MemoryCatalog::numbered(5));
        let mut app = app_with(Arc::clone(&catalog), None);
        let filters = SearchFilters {
            types: vec!["Lightning".to_string()],
            ..Default::default()
        };
        run(&mut app, Action::ApplyFilters(filters));

        app.update(Action::EnterSearchMode).unwrap();
        for c in "Card 3".chars() {
            app.update(Action::SearchInput(c)).unwrap();
        }
        run(&mut app, Action::SubmitSearch);

        let last = catalog.requests.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.filters.query, "Card 3");
        assert_eq!(last.filters.types, vec!["Lightning"]);
        assert_eq!(last.page, 1);
        assert!(!app.home.search_mode);
    }

    #[test]
    fn test_stale_search_response_is_dropped() {
        let cards = vec![sample_card("base1-4", "Charizard"), sample_card("base1-58", "Pikachu")];
        let catalog = Arc::new(MemoryCatalog::new(cards));
        let mut app = app_with(Arc::clone(&catalog), None);

        // Both jobs finish before the next tick; only the newer one counts
        app.update(Action::ApplyFilters(query("Charizard"))).unwrap();
        app.update(Action::ApplyFilters(query("Pikachu"))).unwrap();
        settle(&mut app);

        assert_eq!(app.domain.cards.len(), 1);
        assert_eq!(app.domain.cards[0].name, "Pikachu");
        assert_eq!(app.domain.filters.query, "Pikachu");
    }

    #[test]
    fn test_failed_search_keeps_previous_list() {
        let catalog = Arc::new(MemoryCatalog::numbered(5));
        let mut app = app_with(Arc::clone(&catalog), None);

        *catalog.fail.lock().unwrap() = true;
        run(&mut app, Action::ApplyFilters(query("Card 1")));

        assert_eq!(app.domain.cards.len(), 5);
        assert_eq!(app.domain.filters.query, "");
        assert!(matches!(app.domain.load_state, LoadState::Failed(_)));
    }

    #[test]
    fn test_reset_filters_reissues_initial_search() {
        let catalog = Arc::new(MemoryCatalog::numbered(30));
        let mut app = app_with(Arc::clone(&catalog), None);
        run(&mut app, Action::ApplyFilters(query("Card 2")));
        run(&mut app, Action::ResetFilters);

        assert!(app.domain.filters.is_empty());
        assert_eq!(app.domain.cards.len(), 20);
        assert_eq!(app.domain.total_count, 30);
    }

    #[test]
    fn test_toggle_favorite_twice_restores_state() {
        let (mut app, _, backend) = signed_in();
        let before = app.domain.favorite_ids.clone();
        let card_id = app.selected_card().unwrap().id.clone();

        run(&mut app, Action::ToggleFavorite);
        assert!(app.domain.is_favorite(&card_id));
        assert_eq!(app.domain.favorite_ids.len(), before.len() + 1);

        run(&mut app, Action::ToggleFavorite);
        assert!(!app.domain.is_favorite(&card_id));
        assert_eq!(app.domain.favorite_ids, before);
        assert_eq!(backend.write_count(), 2);
    }

    #[test]
    fn test_failed_toggle_leaves_set_untouched() {
        let (mut app, _, backend) = signed_in();
        let card = app.selected_card().cloned().unwrap();
        let session = app.domain.session.clone().unwrap();

        // Favorited elsewhere, so the insert hits the unique constraint
        backend.add_favorite(&session, &card).unwrap();
        run(&mut app, Action::ToggleFavorite);

        assert!(!app.domain.is_favorite(&card.id));
    }

    #[test]
    fn test_anonymous_card_actions_open_auth_without_writes() {
        let catalog = Arc::new(MemoryCatalog::numbered(3));
        let backend = Arc::new(MemoryBackend::new());
        let mut app = app_with(catalog, Some(Arc::clone(&backend)));

        run(&mut app, Action::ToggleFavorite);
        assert_eq!(app.modals.top(), Some(&Modal::Auth));
        app.update(Action::CloseModal).unwrap();

        run(&mut app, Action::OpenAddToCollection);
        assert_eq!(app.modals.top(), Some(&Modal::Auth));
        assert!(!app.modals.contains(&Modal::AddToCollection));

        assert_eq!(backend.write_count(), 0);
        assert!(app.domain.favorite_ids.is_empty());
    }

    #[test]
    fn test_unconfigured_backend_reports_status() {
        let catalog = Arc::new(MemoryCatalog::numbered(3));
        let mut app = app_with(catalog, None);

        run(&mut app, Action::ToggleFavorite);
        assert!(app.modals.is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Backend is not configured"));

        run(&mut app, Action::SwitchView(View::Favorites));
        assert_eq!(app.home.view, View::Search);
    }

    #[test]
    fn test_sign_in_loads_user_data() {
        let (mut app, _, backend) = signed_in();
        let session = app.domain.session.clone().unwrap();
        backend.create_collection(&session, "Binder", None).unwrap();
        backend
            .add_favorite(&session, &sample_card("base1-58", "Pikachu"))
            .unwrap();

        run(&mut app, Action::SignOut);
        assert!(app.domain.session.is_none());
        assert!(app.domain.collections.is_empty());

        sign_in(&mut app);
        assert!(app.domain.is_favorite("base1-58"));
        assert_eq!(app.domain.collections.len(), 1);
        assert!(!app.modals.contains(&Modal::Auth));
    }

    #[test]
    fn test_failed_sign_in_shows_message() {
        let catalog = Arc::new(MemoryCatalog::numbered(3));
        let backend = Arc::new(MemoryBackend::new());
        let mut app = app_with(catalog, Some(backend));

        app.update(Action::OpenAuth).unwrap();
        run(
            &mut app,
            Action::SignIn {
                email: EMAIL.to_string(),
                password: String::new(),
            },
        );

        assert!(app.domain.session.is_none());
        assert_eq!(app.modals.top(), Some(&Modal::Auth));
        assert_eq!(
            app.auth_dialog.message(),
            Some("Invalid login credentials (400)")
        );
    }

    #[test]
    fn test_rejected_token_signs_out() {
        let (mut app, _, _) = signed_in();
        app.apply_outcome(JobOutcome::Collections(Err(BackendError::Rejected {
            status: 401,
            message: "JWT expired".to_string(),
        })));

        assert!(app.domain.session.is_none());
        assert_eq!(app.modals.top(), Some(&Modal::Auth));
    }

    #[test]
    fn test_create_collection_then_list_includes_it() {
        let (mut app, _, _) = signed_in();
        run(&mut app, Action::OpenNewCollection);
        assert_eq!(app.modals.top(), Some(&Modal::NewCollection));

        run(
            &mut app,
            Action::CreateCollection {
                name: "Holo Rares".to_string(),
                description: None,
            },
        );
        assert!(!app.modals.contains(&Modal::NewCollection));

        run(&mut app, Action::SwitchView(View::Collections));
        assert_eq!(app.home.view, View::Collections);
        assert!(app
            .domain
            .collections
            .iter()
            .any(|c| c.name == "Holo Rares"));
        assert_eq!(app.domain.load_state, LoadState::Loaded);
    }

    #[test]
    fn test_add_to_collection_merges_quantities() {
        let (mut app, _, backend) = signed_in();
        let session = app.domain.session.clone().unwrap();
        let collection = backend.create_collection(&session, "Binder", None).unwrap();
        let card_id = app.selected_card().unwrap().id.clone();

        for quantity in [2, 3] {
            run(&mut app, Action::OpenAddToCollection);
            assert_eq!(app.modals.top(), Some(&Modal::AddToCollection));
            run(
                &mut app,
                Action::AddToCollection {
                    collection_id: collection.id.clone(),
                    quantity,
                },
            );
            assert_eq!(app.collection_dialog.message(), Some(ADDED_MESSAGE));
            app.update(Action::CloseModal).unwrap();
        }

        let entries = backend
            .list_collection_entries(&session, &collection.id)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].card_id, card_id);
        assert_eq!(entries[0].quantity, 5);
    }

    #[test]
    fn test_add_to_collection_failure_message() {
        let (mut app, _, _) = signed_in();
        run(&mut app, Action::OpenAddToCollection);
        run(
            &mut app,
            Action::AddToCollection {
                collection_id: "missing".to_string(),
                quantity: 1,
            },
        );

        assert_eq!(app.collection_dialog.message(), Some(FAILED_MESSAGE));
        assert_eq!(app.modals.top(), Some(&Modal::AddToCollection));
    }

    #[test]
    fn test_open_collection_and_remove_entry() {
        let (mut app, _, backend) = signed_in();
        let session = app.domain.session.clone().unwrap();
        let collection = backend.create_collection(&session, "Binder", None).unwrap();
        add_card_to_collection(backend.as_ref(), &session, &collection.id, &sample_card("a", "Pikachu"), 2)
            .unwrap();
        add_card_to_collection(backend.as_ref(), &session, &collection.id, &sample_card("b", "Raichu"), 1)
            .unwrap();

        run(&mut app, Action::SwitchView(View::Collections));
        run(&mut app, Action::OpenCollection);
        let open = app.domain.open_collection.as_ref().unwrap();
        assert_eq!(open.entries.len(), 2);
        assert_eq!(open.total_cards(), 3);
        assert!(app.home.collection_open);

        run(&mut app, Action::RemoveFromCollection);
        assert_eq!(app.domain.open_collection.as_ref().unwrap().entries.len(), 1);

        app.update(Action::CloseCollection).unwrap();
        assert!(app.domain.open_collection.is_none());
        assert!(!app.home.collection_open);
    }

    #[test]
    fn test_delete_collection_after_confirmation() {
        let (mut app, _, backend) = signed_in();
        let session = app.domain.session.clone().unwrap();
        backend.create_collection(&session, "Old", None).unwrap();

        run(&mut app, Action::SwitchView(View::Collections));
        run(&mut app, Action::OpenDeleteCollection);
        let Some(Modal::DeleteCollection { collection_id, .. }) = app.modals.top().cloned() else {
            panic!("confirmation not shown");
        };

        run(&mut app, Action::DeleteCollection(collection_id));
        assert!(app.modals.is_empty());
        assert!(app.domain.collections.is_empty());
        assert!(backend.list_collections(&session).unwrap().is_empty());
    }

    #[test]
    fn test_rejected_delete_keeps_collection_and_entries() {
        let (mut app, _, backend) = signed_in();
        let session = app.domain.session.clone().unwrap();
        let collection = backend.create_collection(&session, "Binder", None).unwrap();
        add_card_to_collection(backend.as_ref(), &session, &collection.id, &sample_card("a", "Pikachu"), 3)
            .unwrap();

        run(&mut app, Action::SwitchView(View::Collections));
        backend
            .deny_writes
            .store(true, std::sync::atomic::Ordering::SeqCst);
        run(&mut app, Action::DeleteCollection(collection.id.clone()));

        assert_eq!(app.domain.collections.len(), 1);
        assert!(app
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Could not delete collection")));
        assert_eq!(backend.list_collections(&session).unwrap().len(), 1);
        let entries = backend
            .list_collection_entries(&session, &collection.id)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 3);
    }

    #[test]
    fn test_unfavorite_in_favorites_view_removes_card() {
        let (mut app, _, _) = signed_in();
        run(&mut app, Action::ToggleFavorite);
        run(&mut app, Action::NextItem);
        run(&mut app, Action::ToggleFavorite);

        run(&mut app, Action::SwitchView(View::Favorites));
        assert_eq!(app.domain.cards.len(), 2);
        // Newest first
        assert_eq!(app.domain.cards[0].id, "card-1");

        run(&mut app, Action::ToggleFavorite);
        assert_eq!(app.domain.cards.len(), 1);
        assert_eq!(app.domain.cards[0].id, "card-0");
        assert_eq!(app.home.selected(), Some(0));
    }

    #[test]
    fn test_stale_favorites_dropped_after_view_switch() {
        let (mut app, catalog, _) = signed_in();
        app.update(Action::SwitchView(View::Favorites)).unwrap();
        app.update(Action::SwitchView(View::Search)).unwrap();
        settle(&mut app);

        assert_eq!(app.home.view, View::Search);
        assert_eq!(app.domain.cards.len(), 20);
        assert_eq!(catalog.requested_pages().last(), Some(&1));
    }

    #[test]
    fn test_sign_out_leaves_account_views() {
        let (mut app, _, _) = signed_in();
        run(&mut app, Action::SwitchView(View::Collections));
        run(&mut app, Action::SignOut);

        assert_eq!(app.home.view, View::Search);
        assert!(app.domain.favorite_ids.is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Signed out"));
    }

    #[test]
    fn test_card_detail_refreshes_stored_copy() {
        let (mut app, _, _) = signed_in();
        run(&mut app, Action::ToggleFavorite);
        run(&mut app, Action::SwitchView(View::Favorites));

        run(&mut app, Action::OpenCardDetail);
        assert_eq!(app.modals.top(), Some(&Modal::CardDetail));
        assert_eq!(app.detail_card.as_ref().map(|c| c.id.as_str()), Some("card-0"));

        // Card actions inside the dialog target the shown card
        run(&mut app, Action::ToggleFavorite);
        assert!(!app.domain.is_favorite("card-0"));
    }

    #[test]
    fn test_collection_dialog_closes_after_delay() {
        let (mut app, _, backend) = signed_in();
        let session = app.domain.session.clone().unwrap();
        let collection = backend.create_collection(&session, "Binder", None).unwrap();

        run(&mut app, Action::OpenAddToCollection);
        run(
            &mut app,
            Action::AddToCollection {
                collection_id: collection.id,
                quantity: 1,
            },
        );
        assert!(app.modals.contains(&Modal::AddToCollection));

        std::thread::sleep(crate::components::collection_dialog::CLOSE_DELAY);
        app.update(Action::Tick).unwrap();
        assert!(!app.modals.contains(&Modal::AddToCollection));
    }
}
