//! # Snippet store
//!
//! Durable home of every snippet record, backed by one SQLite connection.
//!
//! The connection is opened once at start, shared behind a mutex and closed
//! explicitly at shutdown. Every operation runs on the blocking pool and holds
//! the lock for exactly one logical operation, so single-record reads and
//! writes are atomic and a list sees its page and total from the same state.
//!
//! Ids are UUID v4 strings. A malformed id can never match a row, so it is
//! reported as [`CodarchError::NotFound`] like any other absent id.
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CodarchError, Result};
use crate::models::{Language, Snippet, SnippetInput};
use crate::pagination::{Pagination, SnippetPage};

pub const MEMORY_URL: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS snippets (
    id          TEXT PRIMARY KEY NOT NULL,
    title       TEXT NOT NULL,
    language    TEXT NOT NULL,
    code        TEXT NOT NULL,
    version     INTEGER NOT NULL DEFAULT 1,
    author      TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_snippets_created_at ON snippets (created_at DESC);
CREATE INDEX IF NOT EXISTS idx_snippets_title ON snippets (title);
CREATE INDEX IF NOT EXISTS idx_snippets_author_created ON snippets (author, created_at DESC);
";

const COLUMNS: &str = "id, title, language, code, version, author, created_at, updated_at";

/// Handle to the snippet collection. Cheap to clone.
#[derive(Clone)]
pub struct SnippetStore {
    conn: Arc<Mutex<Connection>>,
}

impl SnippetStore {
    /// Open the store at `url`: a file path, optionally prefixed with
    /// `sqlite://`, or `:memory:`.
    pub fn open(url: &str) -> Result<Self> {
        let url = url.trim();
        let conn = if url == MEMORY_URL {
            Connection::open_in_memory()?
        } else {
            let path = url.strip_prefix("sqlite://").unwrap_or(url);
            if path.is_empty() {
                return Err(CodarchError::InvalidConfig(
                    "database path is empty".to_string(),
                ));
            }
            Connection::open(Path::new(path))?
        };

        info!("Opened snippet store at {url}");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// One round trip to the database.
    pub async fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }

    /// A page of snippets, newest first, with the total count.
    pub async fn list(&self, page: Pagination) -> Result<SnippetPage> {
        debug!(skip = page.skip, limit = page.limit, "listing snippets");
        self.with_conn(move |conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM snippets", [], |row| row.get(0))?;

            let offset = i64::try_from(page.skip).unwrap_or(i64::MAX);
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM snippets ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let items = stmt
                .query_map(params![i64::from(page.limit), offset], snippet_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(SnippetPage {
                total: total.max(0) as u64,
                skip: page.skip,
                limit: page.limit,
                items,
            })
        })
        .await
    }

    pub async fn get(&self, id: &str) -> Result<Snippet> {
        let id = parse_id(id)?;
        debug!(%id, "fetching snippet");
        self.with_conn(move |conn| select_by_id(conn, &id)?.ok_or(CodarchError::NotFound))
            .await
    }

    /// Validate and insert a new snippet.
    pub async fn create(&self, input: SnippetInput) -> Result<Snippet> {
        let snippet = Snippet::new(input.into_new()?);
        debug!(id = %snippet.id, "creating snippet");

        self.with_conn(move |conn| {
            conn.execute(
                &format!("INSERT INTO snippets ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                params![
                    snippet.id.to_string(),
                    snippet.title,
                    snippet.language,
                    snippet.code,
                    snippet.version,
                    snippet.author,
                    format_timestamp(&snippet.created_at),
                    format_timestamp(&snippet.updated_at),
                ],
            )?;
            Ok(snippet)
        })
        .await
    }

    /// Validate `input` and apply the supplied fields to an existing snippet.
    /// Nothing is written when validation fails or the id is unknown.
    pub async fn update(&self, id: &str, input: SnippetInput) -> Result<Snippet> {
        let id = parse_id(id)?;
        let patch = input.into_patch()?;
        debug!(%id, "updating snippet");

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut snippet = select_by_id(&tx, &id)?.ok_or(CodarchError::NotFound)?;
            snippet.apply(patch);

            tx.execute(
                "UPDATE snippets
                 SET title = ?1, language = ?2, code = ?3, version = ?4, author = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    snippet.title,
                    snippet.language,
                    snippet.code,
                    snippet.version,
                    snippet.author,
                    format_timestamp(&snippet.updated_at),
                    id.to_string(),
                ],
            )?;
            tx.commit()?;
            Ok(snippet)
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        debug!(%id, "deleting snippet");
        self.with_conn(move |conn| {
            let removed = conn.execute("DELETE FROM snippets WHERE id = ?1", params![id.to_string()])?;
            if removed == 0 {
                return Err(CodarchError::NotFound);
            }
            Ok(())
        })
        .await
    }

    /// Close the underlying connection. Handles still held elsewhere keep it
    /// alive until they drop.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex.into_inner().map_err(|_| CodarchError::Poisoned)?;
                conn.close().map_err(|(_, e)| CodarchError::from(e))?;
                info!("Snippet store closed");
                Ok(())
            }
            Err(_) => {
                warn!("Snippet store still in use, connection closes when the last handle drops");
                Ok(())
            }
        }
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| CodarchError::Poisoned)?;
            f(&mut guard)
        })
        .await?
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| CodarchError::NotFound)
}

fn select_by_id(conn: &Connection, id: &Uuid) -> Result<Option<Snippet>> {
    let snippet = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM snippets WHERE id = ?1"),
            params![id.to_string()],
            snippet_from_row,
        )
        .optional()?;
    Ok(snippet)
}

fn snippet_from_row(row: &Row<'_>) -> rusqlite::Result<Snippet> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(Snippet {
        id,
        title: row.get(1)?,
        language: row.get(2)?,
        code: row.get(3)?,
        version: row.get(4)?,
        author: row.get(5)?,
        created_at: parse_timestamp(row, 6)?,
        updated_at: parse_timestamp(row, 7)?,
    })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    // Fixed width, so text order matches time order.
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl ToSql for Language {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Language {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
