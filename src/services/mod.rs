//! External service interactions
//!
//! This module contains services for interacting with external systems:
//! - Pokémon TCG card catalog
//! - Supabase auth and row storage
//! - Collection merge-on-insert
//! - Background job execution

pub mod backend;
pub mod catalog;
pub mod collections;
pub mod error;
pub mod job_runner;
#[cfg(test)]
pub mod testing;

pub use backend::{Backend, SupabaseClient};
pub use catalog::{CardCatalog, PokemonTcgClient};
pub use collections::add_card_to_collection;
pub use error::{ApiError, BackendError};
pub use job_runner::{JobOutcome, JobRunner};
