// src/telemetry.rs
//! Selection-run telemetry through the `metrics` facade.
//!
//! Nothing is exported unless the embedding process installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up once a recorder exists).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("selection_runs_total", "Edition selection runs started.");
        describe_counter!(
            "selection_reset_total",
            "Stale queued_today rows reset to unreviewed."
        );
        describe_counter!(
            "selection_candidates_total",
            "Eligible candidates fetched for an edition."
        );
        describe_counter!(
            "selection_filtered_out_total",
            "Candidates dropped by the relevance filter."
        );
        describe_counter!(
            "selection_selected_total",
            "Candidates chosen for the review queue."
        );
        describe_gauge!(
            "selection_last_run_ts",
            "Unix ts when an edition selection last completed."
        );
    });
}

/// Counters for one finished run.
pub(crate) fn record_run(
    edition: &'static str,
    reset: u64,
    candidates: usize,
    filtered_out: usize,
    selected: usize,
    finished_ts: i64,
) {
    ensure_metrics_described();
    counter!("selection_runs_total", "edition" => edition).increment(1);
    counter!("selection_reset_total").increment(reset);
    counter!("selection_candidates_total", "edition" => edition).increment(candidates as u64);
    counter!("selection_filtered_out_total", "edition" => edition).increment(filtered_out as u64);
    counter!("selection_selected_total", "edition" => edition).increment(selected as u64);
    gauge!("selection_last_run_ts").set(finished_ts as f64);
}
