//! News record data model shared by the store, the relevance filter and the selector.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::edition::Edition;

/// Review state of a record in the expert queue.
///
/// A stored `NULL` and the literal `"none"` both mean "never queued" and decode
/// to [`ReviewStatus::Unreviewed`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ReviewStatus {
    #[default]
    Unreviewed,
    QueuedToday,
    Skipped,
    Reviewed,
    /// Any other terminal state written by the downstream review step.
    Other(String),
}

impl ReviewStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ReviewStatus::Unreviewed => "none",
            ReviewStatus::QueuedToday => "queued_today",
            ReviewStatus::Skipped => "skipped",
            ReviewStatus::Reviewed => "reviewed",
            ReviewStatus::Other(s) => s.as_str(),
        }
    }

    /// Decode a stored column value; `None` and empty strings are `Unreviewed`.
    pub fn from_db(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("none") => ReviewStatus::Unreviewed,
            Some("queued_today") => ReviewStatus::QueuedToday,
            Some("skipped") => ReviewStatus::Skipped,
            Some("reviewed") => ReviewStatus::Reviewed,
            Some(other) => ReviewStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ReviewStatus {
    fn from(s: String) -> Self {
        ReviewStatus::from_db(Some(&s))
    }
}

impl From<ReviewStatus> for String {
    fn from(s: ReviewStatus) -> Self {
        s.as_str().to_string()
    }
}

/// A persisted news record as the selection pipeline sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: i64,
    pub source: String,
    /// Original-language title.
    pub title: String,
    /// Original-language body, possibly empty.
    pub content: String,
    /// Filled in by the external enrichment step; empty until then.
    pub translated_title: String,
    pub published_at: Option<NaiveDateTime>,
    pub analyzed_at: Option<NaiveDateTime>,
    pub importance_score: f64,
    pub review_status: ReviewStatus,
    pub edition: Option<Edition>,
    pub updated_at: NaiveDateTime,
}

impl NewsRecord {
    /// A freshly collected, not yet enriched record.
    pub fn new(
        id: i64,
        source: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        published_at: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            source: source.into(),
            title: title.into(),
            content: content.into(),
            translated_title: String::new(),
            published_at,
            analyzed_at: None,
            importance_score: 0.5,
            review_status: ReviewStatus::Unreviewed,
            edition: None,
            updated_at: now,
        }
    }

    /// Mark as enriched (analysis timestamp + translated title), which makes it eligible.
    pub fn enriched(mut self, translated_title: impl Into<String>, at: NaiveDateTime) -> Self {
        self.translated_title = translated_title.into();
        self.analyzed_at = Some(at);
        self
    }

    pub fn candidate(&self) -> Candidate {
        Candidate {
            id: self.id,
            source: self.source.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            published_at: self.published_at,
        }
    }
}

/// Raw input of the relevance filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub source: String,
    pub title: String,
    pub content: String,
    pub published_at: Option<NaiveDateTime>,
}

impl Candidate {
    /// `title + content`, the text every heuristic runs against.
    pub fn text(&self) -> String {
        let mut s = String::with_capacity(self.title.len() + self.content.len());
        s.push_str(&self.title);
        s.push_str(&self.content);
        s
    }
}

/// A candidate that passed the filter, with its transient annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub category: String,
    pub is_domestic: bool,
    pub priority_score: i32,
}

impl ScoredCandidate {
    pub fn id(&self) -> i64 {
        self.candidate.id
    }

    pub fn source(&self) -> &str {
        &self.candidate.source
    }

    /// Sort key used by both selection phases (compared descending).
    pub(crate) fn rank_key(&self) -> (i32, Option<NaiveDateTime>) {
        (self.priority_score, self.candidate.published_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_none_collapse_to_unreviewed() {
        assert_eq!(ReviewStatus::from_db(None), ReviewStatus::Unreviewed);
        assert_eq!(ReviewStatus::from_db(Some("none")), ReviewStatus::Unreviewed);
        assert_eq!(ReviewStatus::from_db(Some("")), ReviewStatus::Unreviewed);
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let s = ReviewStatus::from_db(Some("published"));
        assert_eq!(s, ReviewStatus::Other("published".into()));
        assert_eq!(s.as_str(), "published");
        assert_eq!(ReviewStatus::from_db(Some("skipped")), ReviewStatus::Skipped);
    }

    #[test]
    fn text_concatenates_title_and_content() {
        let c = Candidate {
            id: 1,
            source: "ce".into(),
            title: "标题".into(),
            content: "正文".into(),
            published_at: None,
        };
        assert_eq!(c.text(), "标题正文");
    }
}
