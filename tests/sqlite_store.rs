// tests/sqlite_store.rs
// SQLite backend against a temp-file database; results are checked against MemoryStore.

use chrono::{NaiveDate, NaiveDateTime};
use edition_selector::store::{EligibilityQuery, StoreError};
use edition_selector::{Edition, MemoryStore, NewsRecord, RecordStore, ReviewStatus, SqliteStore};
use tempfile::TempDir;

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 9, d)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 10).unwrap()
}

fn rec(id: i64, source: &str, published: NaiveDateTime) -> NewsRecord {
    NewsRecord::new(id, source, format!("标题{id}"), "正文", Some(published), published)
        .enriched(format!("제목 {id}"), published)
}

fn records() -> Vec<NewsRecord> {
    let mut skipped = rec(4, "caixin", at(10, 9, 0));
    skipped.review_status = ReviewStatus::Skipped;

    let mut assigned = rec(5, "caixin", at(10, 9, 0));
    assigned.edition = Some(Edition::Morning);

    let mut stale = rec(6, "stcn", at(9, 9, 0));
    stale.review_status = ReviewStatus::QueuedToday;
    stale.edition = Some(Edition::Afternoon);
    stale.updated_at = at(9, 14, 0);

    let mut heavy = rec(7, "ce", at(10, 10, 0));
    heavy.importance_score = 1.5;

    vec![
        rec(1, "people", at(10, 8, 0)),
        rec(2, "caixin", at(10, 13, 59)),
        rec(3, "gov", at(10, 11, 0)),
        skipped,
        assigned,
        stale,
        heavy,
        rec(8, "ce", at(10, 14, 0)),
        rec(9, "36kr", at(10, 9, 0)),
        NewsRecord::new(10, "ce", "未分析", "", Some(at(10, 9, 0)), at(10, 9, 0)),
    ]
}

async fn open(dir: &TempDir) -> SqliteStore {
    // nested path: connect creates the missing directory
    let url = format!("sqlite://{}", dir.path().join("data/news.db").display());
    let store = SqliteStore::connect(&url).await.expect("connect");
    store.init_schema().await.expect("schema");
    store
}

async fn seeded(dir: &TempDir) -> SqliteStore {
    let store = open(dir).await;
    for r in records() {
        store.insert(&r).await.expect("insert");
    }
    store
}

fn query() -> EligibilityQuery {
    EligibilityQuery::for_edition(Edition::Afternoon, today(), &["gov".to_string()])
}

#[tokio::test]
async fn insert_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded(&dir).await;
    for r in records() {
        let got = store.get(r.id).await.unwrap().expect("row exists");
        assert_eq!(got, r);
    }
    assert!(store.get(999).await.unwrap().is_none());
}

#[tokio::test]
async fn zero_id_gets_assigned() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded(&dir).await;
    let id = store.insert(&rec(0, "ce", at(10, 8, 0))).await.unwrap();
    assert_eq!(id, 11);
}

#[tokio::test]
async fn fetch_matches_memory_store() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = seeded(&dir).await;
    let memory = MemoryStore::with_records(records());

    let from_sql: Vec<i64> = sqlite
        .fetch_eligible(&query())
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    let from_mem: Vec<i64> = memory
        .fetch_eligible(&query())
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();

    // newest first, equal timestamps by id
    assert_eq!(from_sql, vec![2, 9, 1]);
    assert_eq!(from_sql, from_mem);
}

#[tokio::test]
async fn reset_only_touches_previous_days() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded(&dir).await;

    let mut today_queue = rec(11, "huxiu", at(10, 8, 0));
    today_queue.review_status = ReviewStatus::QueuedToday;
    today_queue.edition = Some(Edition::Morning);
    today_queue.updated_at = at(10, 7, 0);
    store.insert(&today_queue).await.unwrap();

    let now = at(10, 14, 0);
    assert_eq!(store.reset_stale(today(), now).await.unwrap(), 1);

    let r6 = store.get(6).await.unwrap().unwrap();
    assert_eq!(r6.review_status, ReviewStatus::Unreviewed);
    assert_eq!(r6.edition, None);
    assert_eq!(r6.updated_at, now);

    assert_eq!(store.get(11).await.unwrap().unwrap(), today_queue);

    // nothing left to reset
    assert_eq!(store.reset_stale(today(), now).await.unwrap(), 0);
}

#[tokio::test]
async fn assign_queues_exactly_the_given_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded(&dir).await;
    let now = at(10, 14, 0);

    assert_eq!(store.assign_edition(&[], Edition::Evening, now).await.unwrap(), 0);
    assert_eq!(
        store.assign_edition(&[1, 9], Edition::Afternoon, now).await.unwrap(),
        2
    );

    for id in [1, 9] {
        let r = store.get(id).await.unwrap().unwrap();
        assert_eq!(r.review_status, ReviewStatus::QueuedToday);
        assert_eq!(r.edition, Some(Edition::Afternoon));
        assert_eq!(r.updated_at, now);
    }
    let ids: Vec<i64> = store
        .fetch_eligible(&query())
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn null_review_status_counts_as_unreviewed() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir).await;
    sqlx::query(
        "INSERT INTO news (id, source, original_title, translated_title, published_at, analyzed_at, expert_review_status) \
         VALUES (1, 'ce', 't', 'T', '2026-09-10 09:00:00', '2026-09-10 09:10:00', NULL)",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let got = store.fetch_eligible(&query()).await.unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].review_status, ReviewStatus::Unreviewed);
    assert_eq!(got[0].importance_score, 0.5);
    assert_eq!(got[0].content, "");
}

#[tokio::test]
async fn malformed_timestamps_do_not_drop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir).await;
    for stmt in [
        // well-formed
        "INSERT INTO news (id, source, original_title, translated_title, published_at, analyzed_at, updated_at) \
         VALUES (1, 'ce', 'a', 'A', '2026-09-10 09:00:00', '2026-09-10 09:10:00', '2026-09-10 09:10:00')",
        // analysis marker that is not a timestamp
        "INSERT INTO news (id, source, original_title, translated_title, published_at, analyzed_at, updated_at) \
         VALUES (2, 'ce', 'b', 'B', '2026-09-10 10:00:00', 'done', '2026-09-10 10:10:00')",
        // empty updated_at
        "INSERT INTO news (id, source, original_title, translated_title, published_at, analyzed_at, updated_at) \
         VALUES (3, 'ce', 'c', 'C', '2026-09-10 11:00:00', '2026-09-10 11:10:00', '')",
        // offset-qualified publication time
        "INSERT INTO news (id, source, original_title, translated_title, published_at, analyzed_at, updated_at) \
         VALUES (4, 'ce', 'd', 'D', '2026-09-10 08:00:00 +0800', '2026-09-10 08:10:00', '2026-09-10 08:10:00')",
    ] {
        sqlx::query(stmt).execute(store.pool()).await.unwrap();
    }

    let got = store.fetch_eligible(&query()).await.expect("fetch survives bad values");
    let ids: Vec<i64> = got.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 2, 1, 4]);

    assert_eq!(got[1].analyzed_at, None);
    assert_eq!(got[0].updated_at, NaiveDateTime::default());
    assert_eq!(got[0].analyzed_at, Some(at(10, 11, 10)));
    assert_eq!(got[3].published_at, Some(at(10, 8, 0)));

    let r2 = store.get(2).await.unwrap().expect("row 2");
    assert_eq!(r2.published_at, Some(at(10, 10, 0)));
}

#[tokio::test]
async fn unknown_edition_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir).await;
    sqlx::query(
        "INSERT INTO news (id, source, original_title, edition) VALUES (1, 'ce', 't', 'midnight')",
    )
    .execute(store.pool())
    .await
    .unwrap();

    match store.get(1).await {
        Err(StoreError::Decode { field, value }) => {
            assert_eq!(field, "edition");
            assert_eq!(value, "midnight");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn schema_init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded(&dir).await;
    store.init_schema().await.unwrap();
    assert!(store.get(1).await.unwrap().is_some());
}
