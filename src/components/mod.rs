//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod auth_dialog;
pub mod collection_dialog;
pub mod confirm_dialog;
pub mod detail;
pub mod filter_form;
pub mod help_dialog;
pub mod home;
pub mod input;
pub mod layout;
pub mod logs_dialog;
pub mod new_collection_dialog;

pub use auth_dialog::AuthDialog;
pub use collection_dialog::CollectionDialog;
pub use confirm_dialog::ConfirmDialog;
pub use detail::DetailComponent;
pub use filter_form::FilterDialog;
pub use help_dialog::HelpDialog;
pub use home::{draw_home_screen, HomeComponent, HomeRenderContext};
pub use layout::{calculate_main_layout, centered_popup};
pub use logs_dialog::LogsDialog;
pub use new_collection_dialog::NewCollectionDialog;
