//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::search::SearchFilters;
use crate::model::ui::View;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for animations/updates and collecting finished jobs
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Move to next item in list
    NextItem,
    /// Move to previous item in list
    PrevItem,
    /// Jump to first item
    FirstItem,
    /// Jump to last item
    LastItem,
    /// Move to next view
    NextView,
    /// Move to previous view
    PrevView,
    /// Jump to a view
    SwitchView(View),

    // ─────────────────────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    /// Scroll card detail up one line
    ScrollUp,
    /// Scroll card detail down one line
    ScrollDown,
    /// Scroll card detail up one page
    PageUp,
    /// Scroll card detail down one page
    PageDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Open the recent log lines
    OpenLogs,
    /// Open the selected card's details
    OpenCardDetail,
    /// Close the current modal
    CloseModal,

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────
    /// Enter quick name search mode
    EnterSearchMode,
    /// Leave quick search without searching
    ExitSearchMode,
    /// Add character to the quick search query
    SearchInput(char),
    /// Remove last character from the quick search query
    SearchBackspace,
    /// Search with the quick search query and the current filters
    SubmitSearch,
    /// Open the filter form
    OpenFilters,
    /// Run a fresh search with these filters
    ApplyFilters(SearchFilters),
    /// Clear all filters and reload the initial results
    ResetFilters,
    /// Fetch the next page of results
    LoadMore,
    /// Reload the current view
    Refresh,

    // ─────────────────────────────────────────────────────────────────────────
    // Favorites & Collections
    // ─────────────────────────────────────────────────────────────────────────
    /// Favorite or unfavorite the selected card
    ToggleFavorite,
    /// Open the collection picker for the selected card
    OpenAddToCollection,
    /// Add the picked card to a collection
    AddToCollection { collection_id: String, quantity: u32 },
    /// Open the new collection form
    OpenNewCollection,
    /// Create a collection
    CreateCollection {
        name: String,
        description: Option<String>,
    },
    /// Browse the selected collection's cards
    OpenCollection,
    /// Back to the collection list
    CloseCollection,
    /// Ask to delete the selected collection
    OpenDeleteCollection,
    /// Delete a collection and its cards
    DeleteCollection(String),
    /// Remove the selected card from the open collection
    RemoveFromCollection,

    // ─────────────────────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────────────────────
    /// Open the sign in / sign up form
    OpenAuth,
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextItem => write!(f, "NextItem"),
            Action::PrevItem => write!(f, "PrevItem"),
            Action::FirstItem => write!(f, "FirstItem"),
            Action::LastItem => write!(f, "LastItem"),
            Action::NextView => write!(f, "NextView"),
            Action::PrevView => write!(f, "PrevView"),
            Action::SwitchView(view) => write!(f, "SwitchView({})", view.name()),
            Action::ScrollUp => write!(f, "ScrollUp"),
            Action::ScrollDown => write!(f, "ScrollDown"),
            Action::PageUp => write!(f, "PageUp"),
            Action::PageDown => write!(f, "PageDown"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::OpenLogs => write!(f, "OpenLogs"),
            Action::OpenCardDetail => write!(f, "OpenCardDetail"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::EnterSearchMode => write!(f, "EnterSearchMode"),
            Action::ExitSearchMode => write!(f, "ExitSearchMode"),
            Action::SearchInput(c) => write!(f, "SearchInput('{}')", c),
            Action::SearchBackspace => write!(f, "SearchBackspace"),
            Action::SubmitSearch => write!(f, "SubmitSearch"),
            Action::OpenFilters => write!(f, "OpenFilters"),
            Action::ApplyFilters(filters) => {
                write!(f, "ApplyFilters({})", filters.clauses().join(" "))
            }
            Action::ResetFilters => write!(f, "ResetFilters"),
            Action::LoadMore => write!(f, "LoadMore"),
            Action::Refresh => write!(f, "Refresh"),
            Action::ToggleFavorite => write!(f, "ToggleFavorite"),
            Action::OpenAddToCollection => write!(f, "OpenAddToCollection"),
            Action::AddToCollection {
                collection_id,
                quantity,
            } => write!(f, "AddToCollection({}, {})", collection_id, quantity),
            Action::OpenNewCollection => write!(f, "OpenNewCollection"),
            Action::CreateCollection { name, .. } => write!(f, "CreateCollection({})", name),
            Action::OpenCollection => write!(f, "OpenCollection"),
            Action::CloseCollection => write!(f, "CloseCollection"),
            Action::OpenDeleteCollection => write!(f, "OpenDeleteCollection"),
            Action::DeleteCollection(id) => write!(f, "DeleteCollection({})", id),
            Action::RemoveFromCollection => write!(f, "RemoveFromCollection"),
            Action::OpenAuth => write!(f, "OpenAuth"),
            // Passwords stay out of the logs
            Action::SignIn { email, .. } => write!(f, "SignIn({})", email),
            Action::SignUp { email, .. } => write!(f, "SignUp({})", email),
            Action::SignOut => write!(f, "SignOut"),
        }
    }
}
