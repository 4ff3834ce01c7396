//! Background job runner service
//!
//! Runs blocking network calls off the UI thread. Each job produces exactly
//! one `JobOutcome`, which the UI thread collects on its next tick.

use super::error::{ApiError, BackendError};
use crate::model::account::{Collection, CollectionEntry, Session};
use crate::model::card::{Card, CardPage};
use crate::model::domain::FilterOptions;
use crate::model::search::SearchParams;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Instant;

/// Result of a finished background job
#[derive(Debug)]
pub enum JobOutcome {
    /// A page of search results for list `generation`
    Cards {
        generation: u64,
        params: SearchParams,
        append: bool,
        result: Result<CardPage, ApiError>,
    },
    /// Fresh catalog copy of a stored card, for the detail dialog
    CardFetched(Result<Card, ApiError>),
    /// The favorites view list
    FavoriteCards {
        generation: u64,
        result: Result<Vec<Card>, BackendError>,
    },
    /// Enumerations for the filter form
    FilterOptions(Result<FilterOptions, ApiError>),
    /// Sign in, sign up, or a restored session
    Authenticated {
        restored: bool,
        result: Result<Option<Session>, BackendError>,
    },
    SignedOut(Result<(), BackendError>),
    FavoriteIds(Result<Vec<String>, BackendError>),
    /// A favorite was added (`favorite == true`) or removed
    FavoriteToggled {
        card_id: String,
        favorite: bool,
        result: Result<(), BackendError>,
    },
    Collections(Result<Vec<Collection>, BackendError>),
    CollectionCreated(Result<Collection, BackendError>),
    CollectionDeleted {
        collection_id: String,
        result: Result<(), BackendError>,
    },
    /// Entries of the collection opened in list `generation`
    CollectionEntries {
        generation: u64,
        collection: Collection,
        result: Result<Vec<CollectionEntry>, BackendError>,
    },
    /// Quantity now held after adding a card to a collection
    CardAdded(Result<u32, BackendError>),
    EntryRemoved {
        entry_id: String,
        result: Result<(), BackendError>,
    },
}

/// Job runner service for executing requests off the UI thread
pub struct JobRunner {
    sender: Sender<JobOutcome>,
    receiver: Receiver<JobOutcome>,
    /// Run jobs on the calling thread
    inline: bool,
    pending: usize,
    /// When the oldest unfinished job started
    busy_since: Option<Instant>,
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRunner {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            inline: false,
            pending: 0,
            busy_since: None,
        }
    }

    /// A runner that executes each job synchronously inside `spawn`
    ///
    /// Outcomes are still delivered through `poll`, so callers observe the
    /// same ordering as with background threads.
    pub fn inline() -> Self {
        Self {
            inline: true,
            ..Self::new()
        }
    }

    /// Whether any job has not been collected yet
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    pub fn busy_since(&self) -> Option<Instant> {
        self.busy_since
    }

    /// Spawn a new background job
    pub fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce() -> JobOutcome + Send + 'static,
    {
        if self.pending == 0 {
            self.busy_since = Some(Instant::now());
        }
        self.pending += 1;

        if self.inline {
            let _ = self.sender.send(job());
            return;
        }

        let tx = self.sender.clone();
        thread::spawn(move || {
            let _ = tx.send(job());
        });
    }

    /// Collect every finished job, in completion order
    pub fn poll(&mut self) -> Vec<JobOutcome> {
        let mut outcomes = Vec::new();

        loop {
            match self.receiver.try_recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(TryRecvError::Empty) => break,
                // Unreachable while `self.sender` is alive
                Err(TryRecvError::Disconnected) => break,
            }
        }

        self.pending = self.pending.saturating_sub(outcomes.len());
        if self.pending == 0 {
            self.busy_since = None;
        }

        outcomes
    }
}
