// src/store/sqlite.rs
//! SQLite-backed record store (`news` table).
//!
//! Timestamps are written by sqlx as `YYYY-MM-DD HH:MM:SS[.fff]` text, so window
//! bounds compare lexicographically in SQL.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::str::FromStr;
use tracing::{info, warn};

use super::{EligibilityQuery, RecordStore, StoreError, StoreResult};
use crate::edition::Edition;
use crate::news::{NewsRecord, ReviewStatus};

const NEWS_COLUMNS: &str = "id, source, original_title, original_content, translated_title, \
     published_at, analyzed_at, importance_score, expert_review_status, edition, updated_at";

#[derive(Debug, FromRow)]
struct NewsRow {
    id: i64,
    source: Option<String>,
    original_title: Option<String>,
    original_content: Option<String>,
    translated_title: Option<String>,
    published_at: Option<String>,
    analyzed_at: Option<String>,
    importance_score: Option<f64>,
    expert_review_status: Option<String>,
    edition: Option<String>,
    updated_at: Option<String>,
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Lenient timestamp read. Offsets are dropped (wall-clock kept); a bare date is midnight.
/// Anything else is `None`.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(dt) = TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Malformed stored timestamps degrade to `None` instead of failing the read.
fn timestamp_column(id: i64, field: &'static str, raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        warn!(id, field, value = raw, "unparsable timestamp, treated as unset");
    }
    parsed
}

impl TryFrom<NewsRow> for NewsRecord {
    type Error = StoreError;

    fn try_from(row: NewsRow) -> Result<Self, Self::Error> {
        let edition = match row.edition.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Edition::from_str(raw).map_err(|_| StoreError::Decode {
                field: "edition",
                value: raw.to_string(),
            })?),
        };

        Ok(NewsRecord {
            id: row.id,
            source: row.source.unwrap_or_default(),
            title: row.original_title.unwrap_or_default(),
            content: row.original_content.unwrap_or_default(),
            translated_title: row.translated_title.unwrap_or_default(),
            published_at: timestamp_column(row.id, "published_at", row.published_at.as_deref()),
            analyzed_at: timestamp_column(row.id, "analyzed_at", row.analyzed_at.as_deref()),
            importance_score: row.importance_score.unwrap_or(0.5),
            review_status: ReviewStatus::from_db(row.expert_review_status.as_deref()),
            edition,
            updated_at: timestamp_column(row.id, "updated_at", row.updated_at.as_deref())
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating the file and its directory if needed) the database at `url`.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::Connect)?
            .create_if_missing(true);

        if let Some(parent) = opts.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Connect(sqlx::Error::Io(e)))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(StoreError::Connect)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the `news` table and its indexes if missing.
    pub async fn init_schema(&self) -> StoreResult<()> {
        info!("Initializing news schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source VARCHAR(100) NOT NULL,
                original_url TEXT UNIQUE,
                original_title TEXT NOT NULL,
                original_content TEXT,
                translated_title TEXT,
                summary TEXT,
                importance_score REAL DEFAULT 0.5,
                published_at DATETIME,
                collected_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                analyzed_at DATETIME,
                expert_review_status TEXT DEFAULT 'none',
                edition TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::query("create news table", e))?;

        for ddl in [
            "CREATE INDEX IF NOT EXISTS idx_news_published ON news(published_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_news_source ON news(source)",
            "CREATE INDEX IF NOT EXISTS idx_news_review ON news(expert_review_status, edition)",
        ] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::query("create news index", e))?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for SqliteStore {
    async fn reset_stale(&self, today: NaiveDate, now: NaiveDateTime) -> StoreResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE news
            SET expert_review_status = 'none',
                edition = NULL,
                updated_at = ?
            WHERE expert_review_status = 'queued_today'
              AND DATE(updated_at) < ?
            "#,
        )
        .bind(now)
        .bind(today)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::query("reset stale queue", e))?;

        Ok(res.rows_affected())
    }

    async fn fetch_eligible(&self, query: &EligibilityQuery) -> StoreResult<Vec<NewsRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {NEWS_COLUMNS} FROM news WHERE "));
        qb.push(
            "analyzed_at IS NOT NULL \
             AND COALESCE(NULLIF(TRIM(expert_review_status), ''), 'none') = 'none' \
             AND published_at IS NOT NULL \
             AND edition IS NULL \
             AND COALESCE(translated_title, '') != ''",
        );
        qb.push(" AND published_at >= ").push_bind(query.window_start);
        qb.push(" AND published_at <= ").push_bind(query.window_end);
        qb.push(" AND importance_score <= ").push_bind(query.max_importance);

        if !query.excluded_sources.is_empty() {
            qb.push(" AND source NOT IN (");
            let mut separated = qb.separated(", ");
            for s in &query.excluded_sources {
                separated.push_bind(s.clone());
            }
            separated.push_unseparated(")");
        }

        qb.push(" ORDER BY published_at DESC, id ASC");

        let rows = qb
            .build_query_as::<NewsRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::query("fetch eligible candidates", e))?;

        rows.into_iter().map(NewsRecord::try_from).collect()
    }

    async fn assign_edition(
        &self,
        ids: &[i64],
        edition: Edition,
        now: NaiveDateTime,
    ) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "UPDATE news SET expert_review_status = 'queued_today', edition = ",
        );
        qb.push_bind(edition.as_str());
        qb.push(", updated_at = ").push_bind(now);
        qb.push(" WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let res = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::query("assign edition", e))?;

        Ok(res.rows_affected())
    }

    async fn get(&self, id: i64) -> StoreResult<Option<NewsRecord>> {
        let row = sqlx::query_as::<_, NewsRow>(&format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::query("get news", e))?;

        row.map(NewsRecord::try_from).transpose()
    }

    async fn insert(&self, r: &NewsRecord) -> StoreResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO news (");
        if r.id != 0 {
            qb.push("id, ");
        }
        qb.push(
            "source, original_title, original_content, translated_title, published_at, \
             analyzed_at, importance_score, expert_review_status, edition, updated_at) VALUES (",
        );
        let mut separated = qb.separated(", ");
        if r.id != 0 {
            separated.push_bind(r.id);
        }
        separated
            .push_bind(r.source.clone())
            .push_bind(r.title.clone())
            .push_bind(r.content.clone())
            .push_bind(r.translated_title.clone())
            .push_bind(r.published_at)
            .push_bind(r.analyzed_at)
            .push_bind(r.importance_score)
            .push_bind(r.review_status.as_str().to_string())
            .push_bind(r.edition.map(|e| e.as_str()))
            .push_bind(r.updated_at);
        separated.push_unseparated(")");

        let res = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::query("insert news", e))?;

        Ok(res.last_insert_rowid())
    }
}
