use std::sync::Arc;

use fittrack_api::Quote;
use fittrack_cache::{FetchHandle, RequestStatus, RequestStore, SnapshotStore};

use super::Singleton;
use crate::service::FitnessService;
use crate::Result;

pub const QUOTES_SNAPSHOT: &str = "quotes";

/// Motivational quotes, plus the one currently on screen
pub struct QuotesSlice {
    service: Arc<dyn FitnessService>,
    quotes: RequestStore<String, Quote>,
    current: RequestStore<Singleton, String>,
}

impl QuotesSlice {
    pub fn new(service: Arc<dyn FitnessService>) -> Self {
        Self {
            service,
            quotes: RequestStore::new("quotes"),
            current: RequestStore::new("current_quote"),
        }
    }

    pub async fn fetch_quote(&self, quote_id: &str) -> RequestStatus {
        let service = Arc::clone(&self.service);
        let id = quote_id.to_string();
        self.quotes
            .fetch(id.clone(), move || async move { service.get_quote(&id).await })
            .await
    }

    /// Ask the server for a random quote and make it the current one
    pub fn dispatch_random_quote(&self) -> FetchHandle {
        let service = Arc::clone(&self.service);
        let quotes = self.quotes.clone();
        let generation = quotes.generation();
        self.current.dispatch(Singleton, move || async move {
            let quote = service.get_random_quote().await?;
            let id = quote.quote_id.clone();
            quotes.insert_fulfilled_if_current(generation, id.clone(), quote);
            Ok::<String, fittrack_api::ApiError>(id)
        })
    }

    pub async fn fetch_random_quote(&self) -> RequestStatus {
        self.dispatch_random_quote().await
    }

    pub fn quote(&self, quote_id: &str) -> Option<Quote> {
        self.quotes.entity(&quote_id.to_string())
    }

    pub fn status(&self, quote_id: &str) -> RequestStatus {
        self.quotes.status(&quote_id.to_string())
    }

    pub fn error(&self, quote_id: &str) -> Option<String> {
        self.quotes.error(&quote_id.to_string())
    }

    pub fn current_quote(&self) -> Option<Quote> {
        self.current
            .entity(&Singleton)
            .and_then(|id| self.quotes.entity(&id))
    }

    pub fn current_status(&self) -> RequestStatus {
        self.current.status(&Singleton)
    }

    pub fn current_error(&self) -> Option<String> {
        self.current.error(&Singleton)
    }

    pub fn reset(&self) {
        self.quotes.reset();
        self.current.reset();
    }

    pub fn persist(&self, snapshot: &SnapshotStore) -> Result<usize> {
        Ok(snapshot.save_all(QUOTES_SNAPSHOT, &self.quotes.fulfilled_entries())?)
    }

    pub fn restore(&self, snapshot: &SnapshotStore) -> Result<usize> {
        let entries = snapshot.load_all::<Quote>(QUOTES_SNAPSHOT)?;
        let count = entries.len();
        for (id, quote) in entries {
            self.quotes.insert_fulfilled(id, quote);
        }
        Ok(count)
    }
}
