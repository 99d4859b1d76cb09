//! # vt-db-sqlite
//!
//! This crate implements the data mapping between the SQLite relational model
//! and the `vt-core` domain models. One `SqliteStore` implements every
//! repository port.
//!
//! Identifiers are stored as 16-byte BLOBs. Timestamps are stored as
//! fixed-width RFC 3339 text so that lexical order is chronological order.

mod comment;
mod dashboard;
mod like;
mod playlist;
mod subscription;
mod tweet;
mod video;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;
use vt_core::pagination::{Page, PageRequest};
use vt_core::UserSummary;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// A user row, inserted by fixtures and by whatever system owns accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: String,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and applies migrations.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, 5).await
    }

    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to `:memory:` is its own database, so an in-memory
        // store must live on exactly one connection that is never recycled.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(url, "sqlite store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn insert_user(&self, user: &UserRecord) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, avatar, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.avatar)
        .bind(ts(Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Fixed-width UTC timestamp (microsecond precision).
pub(crate) fn ts(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Builds the public user projection from LEFT JOINed columns.
pub(crate) fn user_summary(
    id: Option<Uuid>,
    username: Option<String>,
    avatar: Option<String>,
) -> Option<UserSummary> {
    Some(UserSummary {
        id: id?,
        username: username?,
        avatar: avatar.unwrap_or_default(),
    })
}

/// A row of a "count + slice" query: every row carries the total of the
/// filtered set, and the item columns are NULL when the slice is empty.
pub(crate) trait FacetRow {
    type Item;
    fn total(&self) -> i64;
    fn into_item(self) -> Option<Self::Item>;
}

pub(crate) fn into_page<R: FacetRow>(rows: Vec<R>, request: PageRequest) -> Page<R::Item> {
    let total = rows.first().map(|r| r.total()).unwrap_or(0).max(0) as u64;
    let items = rows.into_iter().filter_map(FacetRow::into_item).collect();
    Page::new(items, total, request)
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern and wraps the
/// needle for substring matching.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
