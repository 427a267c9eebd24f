// src/scheduler.rs
//! Edition scheduler: one batch run per invocation.
//!
//! Order within a run:
//! 1) reset stale `queued_today` rows from previous days
//! 2) fetch eligible candidates for the edition's window on "today"
//! 3) relevance filter → balanced selection
//! 4) commit: queue exactly the selected ids for this edition
//!
//! Each step is a separate store call. Runs must not overlap; the store offers no
//! conflict detection between concurrent commits.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::edition::Edition;
use crate::news::{Candidate, ScoredCandidate};
use crate::relevance::RelevanceFilter;
use crate::selector::{balance, DEFAULT_TARGET_COUNT};
use crate::store::{EligibilityQuery, RecordStore};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub edition: Edition,
    pub label: &'static str,
    pub reset_count: u64,
    pub candidate_count: usize,
    pub filtered_count: usize,
    pub selected_count: usize,
    pub updated_count: u64,
    pub selected_ids: Vec<i64>,
    /// Category → count within the selection.
    pub categories: BTreeMap<String, usize>,
    /// Source → count within the selection.
    pub sources: BTreeMap<String, usize>,
    pub dry_run: bool,
    pub timestamp: NaiveDateTime,
}

impl fmt::Display for SelectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = self
            .selected_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if self.dry_run {
            writeln!(f, "Edition selection preview ({}, dry run):", self.label)?;
        } else {
            writeln!(f, "Edition selection completed ({}):", self.label)?;
        }
        writeln!(f, "  - Edition: {}", self.edition)?;
        writeln!(f, "  - Reset from stale queue: {}", self.reset_count)?;
        writeln!(f, "  - Selected: {}", self.selected_count)?;
        writeln!(f, "  - Updated to queued_today: {}", self.updated_count)?;
        write!(f, "  - News IDs: [{ids}]")
    }
}

/// Filter + selector output for one candidate batch.
#[derive(Debug, Clone)]
pub struct Selection {
    pub filtered_count: usize,
    pub selected: Vec<ScoredCandidate>,
}

/// Tally by key, ordered for stable logs and summaries.
fn distribution<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for k in keys {
        *out.entry(k.to_string()).or_insert(0) += 1;
    }
    out
}

pub struct EditionScheduler<S> {
    store: S,
    filter: Arc<RelevanceFilter>,
    target_count: usize,
    dry_run: bool,
}

impl<S: RecordStore> EditionScheduler<S> {
    pub fn new(store: S, filter: Arc<RelevanceFilter>) -> Self {
        Self {
            store,
            filter,
            target_count: DEFAULT_TARGET_COUNT,
            dry_run: false,
        }
    }

    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    /// Preview mode: no reset, no commit.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn filter(&self) -> &RelevanceFilter {
        &self.filter
    }

    /// Reset yesterday's (and older) unreviewed queue entries. Today's rows are untouched.
    pub async fn reset_stale_queue(&self, now: NaiveDateTime) -> Result<u64> {
        let n = self
            .store
            .reset_stale(now.date(), now)
            .await
            .context("reset stale queue")?;
        if n > 0 {
            info!(target: "selection", reset = n, "reset stale items from previous days");
        }
        Ok(n)
    }

    /// Candidates for `edition` on the date of `now`, newest first.
    pub async fn eligible_candidates(
        &self,
        edition: Edition,
        now: NaiveDateTime,
    ) -> Result<Vec<Candidate>> {
        let query = EligibilityQuery::for_edition(
            edition,
            now.date(),
            &self.filter.tables().excluded_sources,
        );
        let records = self
            .store
            .fetch_eligible(&query)
            .await
            .with_context(|| format!("fetch eligible candidates for {edition}"))?;
        Ok(records.iter().map(|r| r.candidate()).collect())
    }

    /// Pure part of a run: filter then balance.
    pub fn select(&self, candidates: &[Candidate]) -> Selection {
        let filtered = self.filter.filter_news(candidates);
        let filtered_count = filtered.len();
        let balanced = balance(
            filtered,
            self.target_count,
            &self.filter.tables().category_names(),
        );
        debug!(
            target: "selection",
            round_robin = balanced.round_robin,
            fill = balanced.selected.len() - balanced.round_robin,
            "selection phases"
        );
        Selection {
            filtered_count,
            selected: balanced.selected,
        }
    }

    /// Queue `ids` for `edition`.
    pub async fn update_selected_status(
        &self,
        ids: &[i64],
        edition: Edition,
        now: NaiveDateTime,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let n = self
            .store
            .assign_edition(ids, edition, now)
            .await
            .with_context(|| format!("commit selection for {edition}"))?;
        info!(target: "selection", %edition, updated = n, "updated news items to queued_today");
        Ok(n)
    }

    /// Run for `edition` (or the one matching the local clock).
    pub async fn run_edition_selection(&self, edition: Option<Edition>) -> Result<SelectionSummary> {
        let now = chrono::Local::now().naive_local();
        self.run_edition_selection_at(edition, now).await
    }

    /// Auto-detected edition at the current local time.
    pub async fn run_daily_selection(&self) -> Result<SelectionSummary> {
        self.run_edition_selection(None).await
    }

    /// Full run against an explicit "now".
    pub async fn run_edition_selection_at(
        &self,
        edition: Option<Edition>,
        now: NaiveDateTime,
    ) -> Result<SelectionSummary> {
        let edition = edition.unwrap_or_else(|| Edition::for_time(now.time()));
        info!(
            target: "selection",
            %edition,
            label = edition.label(),
            dry_run = self.dry_run,
            "starting edition selection"
        );

        let reset_count = if self.dry_run {
            0
        } else {
            self.reset_stale_queue(now).await?
        };

        let candidates = self.eligible_candidates(edition, now).await?;
        if candidates.is_empty() {
            warn!(target: "selection", %edition, "no eligible candidates found");
        } else {
            info!(target: "selection", %edition, candidates = candidates.len(), "found eligible candidates");
        }

        let Selection {
            filtered_count,
            selected,
        } = self.select(&candidates);
        info!(
            target: "selection",
            %edition,
            filtered = filtered_count,
            selected = selected.len(),
            "filter and balance done"
        );

        let categories = distribution(selected.iter().map(|s| s.category.as_str()));
        let sources = distribution(selected.iter().map(|s| s.source()));
        if !selected.is_empty() {
            info!(target: "selection", %edition, ?categories, "category distribution");
            info!(target: "selection", %edition, ?sources, "source distribution");
        }

        let selected_ids: Vec<i64> = selected.iter().map(|s| s.id()).collect();
        let updated_count = if self.dry_run {
            0
        } else {
            self.update_selected_status(&selected_ids, edition, now).await?
        };

        crate::telemetry::record_run(
            edition.as_str(),
            reset_count,
            candidates.len(),
            candidates.len() - filtered_count,
            selected_ids.len(),
            chrono::Utc::now().timestamp(),
        );

        let summary = SelectionSummary {
            edition,
            label: edition.label(),
            reset_count,
            candidate_count: candidates.len(),
            filtered_count,
            selected_count: selected_ids.len(),
            updated_count,
            selected_ids,
            categories,
            sources,
            dry_run: self.dry_run,
            timestamp: now,
        };
        info!(target: "selection", %edition, selected = summary.selected_count, updated = summary.updated_count, "edition selection complete");
        Ok(summary)
    }
}
