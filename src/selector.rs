// src/selector.rs
//! Candidate selection: pick up to `target_count` items spread over categories and sources.
//!
//! - Phase 1 walks the declared categories in order and takes the best-ranked item of
//!   each whose source has fewer than [`PHASE1_SOURCE_CAP`] picks so far.
//! - Phase 2 fills the remaining slots from everything left (default category included),
//!   best-ranked first, while a source stays under [`TOTAL_SOURCE_CAP`].
//!
//! Rank is `(priority_score, published_at)` descending. All sorts are stable, so exact
//! ties keep their input order and the output is reproducible.

use std::collections::HashMap;

use crate::news::ScoredCandidate;

pub const DEFAULT_TARGET_COUNT: usize = 10;
pub const PHASE1_SOURCE_CAP: usize = 2;
pub const TOTAL_SOURCE_CAP: usize = 3;

/// Stable sort, best first.
fn sort_by_rank(items: &mut [ScoredCandidate]) {
    items.sort_by(|a, b| b.rank_key().cmp(&a.rank_key()));
}

/// Selection plus how many of its leading items came from the category round-robin.
#[derive(Debug, Clone, PartialEq)]
pub struct Balanced {
    pub selected: Vec<ScoredCandidate>,
    /// `selected[..round_robin]` are phase-1 picks, the rest are phase-2 fill.
    pub round_robin: usize,
}

/// Select up to `target_count` candidates. `categories` is the declared category order.
pub fn balance_categories(
    candidates: Vec<ScoredCandidate>,
    target_count: usize,
    categories: &[String],
) -> Vec<ScoredCandidate> {
    balance(candidates, target_count, categories).selected
}

/// [`balance_categories`] keeping the phase boundary.
pub fn balance(
    candidates: Vec<ScoredCandidate>,
    target_count: usize,
    categories: &[String],
) -> Balanced {
    // Groups in order of first appearance; phase 2 pools them in this order.
    let mut groups: Vec<(String, Vec<ScoredCandidate>)> = Vec::new();
    let mut group_idx: HashMap<String, usize> = HashMap::new();
    for c in candidates {
        let idx = *group_idx.entry(c.category.clone()).or_insert_with(|| {
            groups.push((c.category.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(c);
    }
    for (_, items) in groups.iter_mut() {
        sort_by_rank(items);
    }

    let mut selected: Vec<ScoredCandidate> = Vec::with_capacity(target_count);
    let mut by_source: HashMap<String, usize> = HashMap::new();

    // Phase 1: one per category.
    for category in categories {
        if selected.len() >= target_count {
            break;
        }
        let Some(&idx) = group_idx.get(category) else {
            continue;
        };
        let items = &mut groups[idx].1;
        let pick = items.iter().position(|c| {
            by_source.get(c.source()).copied().unwrap_or(0) < PHASE1_SOURCE_CAP
        });
        if let Some(pos) = pick {
            let chosen = items.remove(pos);
            *by_source.entry(chosen.source().to_string()).or_insert(0) += 1;
            selected.push(chosen);
        }
    }
    let round_robin = selected.len();

    // Phase 2: fill from the remainder.
    if selected.len() < target_count {
        let mut remaining: Vec<ScoredCandidate> = groups
            .into_iter()
            .flat_map(|(_, items)| items)
            .collect();
        sort_by_rank(&mut remaining);

        for c in remaining {
            if selected.len() >= target_count {
                break;
            }
            let count = by_source.entry(c.source().to_string()).or_insert(0);
            if *count < TOTAL_SOURCE_CAP {
                *count += 1;
                selected.push(c);
            }
        }
    }

    selected.truncate(target_count);
    Balanced {
        round_robin: round_robin.min(selected.len()),
        selected,
    }
}
