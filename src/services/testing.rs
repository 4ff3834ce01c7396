//! In-memory service doubles for driving the app without a network

use super::backend::Backend;
use super::catalog::CardCatalog;
use super::error::{ApiError, BackendError};
use crate::model::account::{Collection, CollectionEntry, Session, User};
use crate::model::card::{sample_card, Card, CardPage, CardSet};
use crate::model::search::SearchParams;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Catalog over a fixed card list
///
/// Only the name filter is honoured: a card matches when its name contains
/// the query, case-insensitively.
pub struct MemoryCatalog {
    cards: Vec<Card>,
    pub requests: Mutex<Vec<SearchParams>>,
    pub fail: Mutex<bool>,
}

impl MemoryCatalog {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            requests: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    /// `count` cards named `Card 0`, `Card 1`, ...
    pub fn numbered(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| sample_card(&format!("card-{}", i), &format!("Card {}", i)))
                .collect(),
        )
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests
            .lock()
            .map(|r| r.iter().map(|p| p.page).collect())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.fail.lock().map(|f| *f).unwrap_or(false) {
            return Err(ApiError::Status {
                status: 500,
                body: "catalog unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl CardCatalog for MemoryCatalog {
    fn search_cards(&self, params: &SearchParams) -> Result<CardPage, ApiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(params.clone());
        }
        self.check()?;

        let needle = params.filters.query.trim().to_lowercase();
        let matches: Vec<&Card> = self
            .cards
            .iter()
            .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
            .collect();

        let size = params.effective_page_size() as usize;
        let start = (params.effective_page() as usize - 1) * size;
        let data: Vec<Card> = matches.iter().skip(start).take(size).map(|c| (*c).clone()).collect();

        Ok(CardPage {
            count: data.len() as u32,
            data,
            page: params.effective_page(),
            page_size: params.effective_page_size(),
            total_count: matches.len() as u32,
        })
    }

    fn get_card(&self, id: &str) -> Result<Card, ApiError> {
        self.check()?;
        self.cards
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: format!("no card {}", id),
            })
    }

    fn get_sets(&self) -> Result<Vec<CardSet>, ApiError> {
        self.check()?;
        let mut sets: Vec<CardSet> = Vec::new();
        for card in &self.cards {
            if !sets.iter().any(|s| s.id == card.set.id) {
                sets.push(card.set.clone());
            }
        }
        Ok(sets)
    }

    fn get_types(&self) -> Result<Vec<String>, ApiError> {
        self.check()?;
        Ok(vec!["Fire".to_string(), "Lightning".to_string(), "Water".to_string()])
    }

    fn get_subtypes(&self) -> Result<Vec<String>, ApiError> {
        self.check()?;
        Ok(vec!["Basic".to_string(), "Stage 1".to_string()])
    }

    fn get_rarities(&self) -> Result<Vec<String>, ApiError> {
        self.check()?;
        Ok(vec!["Common".to_string(), "Rare Holo".to_string()])
    }
}

#[derive(Default)]
struct Tables {
    favorites: Vec<(String, String, Card)>,
    collections: Vec<Collection>,
    entries: Vec<CollectionEntry>,
}

/// Backend keeping rows in memory, one account per email
///
/// Every mutating call bumps `writes`. While `deny_writes` is set, row
/// writes fail with 403 and leave the tables untouched.
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    next_id: AtomicUsize,
    pub writes: AtomicUsize,
    pub deny_writes: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            next_id: AtomicUsize::new(1),
            writes: AtomicUsize::new(0),
            deny_writes: AtomicBool::new(false),
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn session_for(email: &str) -> Session {
        Session {
            access_token: format!("token-{}", email),
            refresh_token: String::new(),
            expires_at: Utc::now() + Duration::hours(1),
            user: User {
                id: format!("user-{}", email),
                email: Some(email.to_string()),
            },
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn tables(&self) -> Result<std::sync::MutexGuard<'_, Tables>, BackendError> {
        self.tables.lock().map_err(|_| BackendError::Rejected {
            status: 500,
            message: "poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<(), BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.deny_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected {
                status: 403,
                message: "denied by row-level security".to_string(),
            });
        }
        Ok(())
    }

    /// Timestamps must be strictly increasing for newest-first ordering
    fn stamp(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::milliseconds(self.next_id.load(Ordering::SeqCst) as i64)
    }
}

impl Backend for MemoryBackend {
    fn sign_up(&self, email: &str, _password: &str) -> Result<Option<Session>, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Self::session_for(email)))
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        if password.is_empty() {
            return Err(BackendError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            });
        }
        Ok(Self::session_for(email))
    }

    fn refresh(&self, _refresh_token: &str) -> Result<Session, BackendError> {
        Err(BackendError::NoSession)
    }

    fn sign_out(&self, _session: &Session) -> Result<(), BackendError> {
        Ok(())
    }

    fn get_user(&self, session: &Session) -> Result<User, BackendError> {
        Ok(session.user.clone())
    }

    fn list_favorite_ids(&self, session: &Session) -> Result<Vec<String>, BackendError> {
        Ok(self
            .tables()?
            .favorites
            .iter()
            .filter(|(user, _, _)| user == session.user_id())
            .map(|(_, id, _)| id.clone())
            .collect())
    }

    fn list_favorite_cards(&self, session: &Session) -> Result<Vec<Card>, BackendError> {
        Ok(self
            .tables()?
            .favorites
            .iter()
            .rev()
            .filter(|(user, _, _)| user == session.user_id())
            .map(|(_, _, card)| card.clone())
            .collect())
    }

    fn add_favorite(&self, session: &Session, card: &Card) -> Result<(), BackendError> {
        self.write()?;
        let mut tables = self.tables()?;
        if tables
            .favorites
            .iter()
            .any(|(user, id, _)| user == session.user_id() && *id == card.id)
        {
            return Err(BackendError::Rejected {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        tables
            .favorites
            .push((session.user_id().to_string(), card.id.clone(), card.clone()));
        Ok(())
    }

    fn remove_favorite(&self, session: &Session, card_id: &str) -> Result<(), BackendError> {
        self.write()?;
        self.tables()?
            .favorites
            .retain(|(user, id, _)| !(user == session.user_id() && id == card_id));
        Ok(())
    }

    fn list_collections(&self, session: &Session) -> Result<Vec<Collection>, BackendError> {
        let mut collections: Vec<Collection> = self
            .tables()?
            .collections
            .iter()
            .filter(|c| c.user_id == session.user_id())
            .cloned()
            .collect();
        collections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(collections)
    }

    fn create_collection(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> Result<Collection, BackendError> {
        self.write()?;
        let collection = Collection {
            id: self.next_id("collection"),
            user_id: session.user_id().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: self.stamp(),
        };
        self.tables()?.collections.push(collection.clone());
        Ok(collection)
    }

    fn delete_collection(
        &self,
        session: &Session,
        collection_id: &str,
    ) -> Result<(), BackendError> {
        self.write()?;
        let mut tables = self.tables()?;
        let Some(index) = tables
            .collections
            .iter()
            .position(|c| c.id == collection_id && c.user_id == session.user_id())
        else {
            return Ok(());
        };
        tables.collections.remove(index);
        // ON DELETE CASCADE
        tables.entries.retain(|e| e.collection_id != collection_id);
        Ok(())
    }

    fn list_collection_entries(
        &self,
        _session: &Session,
        collection_id: &str,
    ) -> Result<Vec<CollectionEntry>, BackendError> {
        Ok(self
            .tables()?
            .entries
            .iter()
            .rev()
            .filter(|e| e.collection_id == collection_id)
            .cloned()
            .collect())
    }

    fn find_collection_entry(
        &self,
        _session: &Session,
        collection_id: &str,
        card_id: &str,
    ) -> Result<Option<CollectionEntry>, BackendError> {
        Ok(self
            .tables()?
            .entries
            .iter()
            .find(|e| e.collection_id == collection_id && e.card_id == card_id)
            .cloned())
    }

    fn insert_collection_entry(
        &self,
        _session: &Session,
        collection_id: &str,
        card: &Card,
        quantity: u32,
    ) -> Result<CollectionEntry, BackendError> {
        self.write()?;
        let mut tables = self.tables()?;
        if !tables.collections.iter().any(|c| c.id == collection_id) {
            return Err(BackendError::Rejected {
                status: 409,
                message: "insert violates foreign key constraint".to_string(),
            });
        }
        let entry = CollectionEntry {
            id: self.next_id("entry"),
            collection_id: collection_id.to_string(),
            card_id: card.id.clone(),
            card_data: card.clone(),
            quantity,
            added_at: self.stamp(),
        };
        tables.entries.push(entry.clone());
        Ok(entry)
    }

    fn update_entry_quantity(
        &self,
        _session: &Session,
        entry_id: &str,
        quantity: u32,
    ) -> Result<(), BackendError> {
        self.write()?;
        let mut tables = self.tables()?;
        let entry = tables
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| BackendError::Rejected {
                status: 404,
                message: format!("no collection entry {}", entry_id),
            })?;
        entry.quantity = quantity;
        Ok(())
    }

    fn remove_collection_entry(
        &self,
        _session: &Session,
        entry_id: &str,
    ) -> Result<(), BackendError> {
        self.write()?;
        self.tables()?.entries.retain(|e| e.id != entry_id);
        Ok(())
    }
}
