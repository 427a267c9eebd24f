// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod edition;
pub mod logging;
pub mod news;
pub mod relevance;
pub mod scheduler;
pub mod selector;
pub mod source_weights;
pub mod store;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::edition::Edition;
pub use crate::news::{Candidate, NewsRecord, ReviewStatus, ScoredCandidate};
pub use crate::relevance::{FilterTables, RelevanceFilter};
pub use crate::scheduler::{EditionScheduler, SelectionSummary};
pub use crate::selector::balance_categories;
pub use crate::store::{MemoryStore, RecordStore, SqliteStore};
