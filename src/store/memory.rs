// src/store/memory.rs
//! In-process record store for tests and dry runs.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{EligibilityQuery, RecordStore, StoreResult};
use crate::edition::Edition;
use crate::news::{NewsRecord, ReviewStatus};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<i64, NewsRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = NewsRecord>) -> Self {
        let rows = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Copy of every row, ordered by id.
    pub fn snapshot(&self) -> Vec<NewsRecord> {
        self.rows
            .lock()
            .expect("memory store mutex poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Apply an out-of-band change (e.g. the downstream review step).
    pub fn update<F: FnOnce(&mut NewsRecord)>(&self, id: i64, f: F) -> bool {
        let mut rows = self.rows.lock().expect("memory store mutex poisoned");
        match rows.get_mut(&id) {
            Some(r) => {
                f(r);
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn reset_stale(&self, today: NaiveDate, now: NaiveDateTime) -> StoreResult<u64> {
        let mut rows = self.rows.lock().expect("memory store mutex poisoned");
        let mut n = 0u64;
        for r in rows.values_mut() {
            if r.review_status == ReviewStatus::QueuedToday && r.updated_at.date() < today {
                r.review_status = ReviewStatus::Unreviewed;
                r.edition = None;
                r.updated_at = now;
                n += 1;
            }
        }
        Ok(n)
    }

    async fn fetch_eligible(&self, query: &EligibilityQuery) -> StoreResult<Vec<NewsRecord>> {
        let rows = self.rows.lock().expect("memory store mutex poisoned");
        // BTreeMap iterates by ascending id, so the stable sort leaves id order on ties.
        let mut out: Vec<NewsRecord> = rows.values().filter(|r| query.matches(r)).cloned().collect();
        out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(out)
    }

    async fn assign_edition(
        &self,
        ids: &[i64],
        edition: Edition,
        now: NaiveDateTime,
    ) -> StoreResult<u64> {
        let mut rows = self.rows.lock().expect("memory store mutex poisoned");
        let mut n = 0u64;
        for id in ids {
            if let Some(r) = rows.get_mut(id) {
                r.review_status = ReviewStatus::QueuedToday;
                r.edition = Some(edition);
                r.updated_at = now;
                n += 1;
            }
        }
        Ok(n)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<NewsRecord>> {
        let rows = self.rows.lock().expect("memory store mutex poisoned");
        Ok(rows.get(&id).cloned())
    }

    async fn insert(&self, record: &NewsRecord) -> StoreResult<i64> {
        let mut rows = self.rows.lock().expect("memory store mutex poisoned");
        let id = if record.id == 0 {
            rows.keys().next_back().copied().unwrap_or(0) + 1
        } else {
            record.id
        };
        let mut r = record.clone();
        r.id = id;
        rows.insert(id, r);
        Ok(id)
    }
}
