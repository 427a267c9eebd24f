// src/store/mod.rs
//! Record store seam: the scheduler talks to persistence only through [`RecordStore`].
//!
//! Every method is its own unit of work; nothing spans a transaction across calls.

pub mod memory;
pub mod sqlite;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::edition::Edition;
use crate::news::{NewsRecord, ReviewStatus};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Store failures. All of them abort the current run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("store query failed: {operation}: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("undecodable `{field}` value: {value}")]
    Decode { field: &'static str, value: String },
}

impl StoreError {
    pub fn query(operation: &'static str, source: sqlx::Error) -> Self {
        Self::Query { operation, source }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Predicate for candidates of one edition run.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityQuery {
    /// Inclusive bounds over `published_at`.
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub excluded_sources: Vec<String>,
    /// Upper bound on `importance_score` (inclusive).
    pub max_importance: f64,
}

impl EligibilityQuery {
    pub const DEFAULT_MAX_IMPORTANCE: f64 = 1.0;

    pub fn for_edition(edition: Edition, date: NaiveDate, excluded_sources: &[String]) -> Self {
        let (window_start, window_end) = edition.eligibility_window(date);
        Self {
            window_start,
            window_end,
            excluded_sources: excluded_sources.to_vec(),
            max_importance: Self::DEFAULT_MAX_IMPORTANCE,
        }
    }

    /// In-process form of the eligibility predicate.
    pub fn matches(&self, r: &NewsRecord) -> bool {
        let in_window = r
            .published_at
            .is_some_and(|p| p >= self.window_start && p <= self.window_end);

        r.analyzed_at.is_some()
            && r.review_status == ReviewStatus::Unreviewed
            && in_window
            && r.edition.is_none()
            && r.importance_score <= self.max_importance
            && !r.translated_title.is_empty()
            && !self.excluded_sources.iter().any(|s| s == &r.source)
    }
}

/// Persistence operations the selection pipeline needs.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Reset `queued_today` rows last updated before `today`: status → unreviewed,
    /// edition cleared, `updated_at = now`. Returns the number of rows reset.
    async fn reset_stale(&self, today: NaiveDate, now: NaiveDateTime) -> StoreResult<u64>;

    /// Eligible records ordered by `published_at` descending (ties by ascending id).
    async fn fetch_eligible(&self, query: &EligibilityQuery) -> StoreResult<Vec<NewsRecord>>;

    /// Queue exactly `ids` for `edition`. Returns the number of rows updated.
    async fn assign_edition(
        &self,
        ids: &[i64],
        edition: Edition,
        now: NaiveDateTime,
    ) -> StoreResult<u64>;

    async fn get(&self, id: i64) -> StoreResult<Option<NewsRecord>>;

    /// Insert a record and return its id. A record id of 0 asks the store to assign one.
    async fn insert(&self, record: &NewsRecord) -> StoreResult<i64>;
}
