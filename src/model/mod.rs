//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - `Card`, `CardPage`, `CardSet` - Catalog records
//! - `SearchFilters`, `SearchParams` - Search expression composition
//! - `Session`, `Collection`, `CollectionEntry` - Backend rows
//! - `DomainState` - Business/data state (cards, favorites, collections)
//! - `ModalStack` - Modal overlay management
//! - `View` - The home screen tabs

pub mod account;
pub mod card;
pub mod domain;
pub mod modal;
pub mod search;
pub mod ui;

