//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide per-owner CRUD and search APIs over the `notes` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every query filters on `owner_id`; cross-owner access by id reports
//!   not-found, indistinguishable from a genuinely missing note.
//! - `add_note` rejects text that is empty after trimming.
//! - Lists are ordered newest first (`id DESC`) and bounded by a limit.

use crate::db::DbError;
use crate::model::note::{Note, NoteId, OwnerId};
use crate::repo::{ensure_schema_version, ensure_table};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT id, owner_id, text, created_at FROM notes";

/// List/find limit applied when the caller passes none (or zero).
pub const DEFAULT_LIST_LIMIT: u32 = 50;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by note persistence and the catalog registry.
#[derive(Debug)]
pub enum RepoError {
    /// Caller-supplied data is empty or malformed. Recoverable by the caller
    /// with a user-facing message.
    InvalidInput(String),
    /// A uniqueness/foreign-key/check constraint was breached. Indicates a
    /// logic or race bug; never retried silently.
    Constraint(String),
    /// The bounded lock wait expired while another writer held the store.
    /// Transient; safe for the caller to retry with backoff.
    Unavailable,
    /// Transport-level database failure.
    Db(DbError),
    /// The connection was not bootstrapped through `db::open_db`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Constraint(message) => write!(f, "constraint violation: {message}"),
            Self::Unavailable => write!(f, "storage unavailable: write lock wait exceeded"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not initialized: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, ref message) = value {
            match err.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => return Self::Unavailable,
                ErrorCode::ConstraintViolation => {
                    return Self::Constraint(message.clone().unwrap_or_else(|| err.to_string()));
                }
                _ => {}
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for per-owner note operations.
///
/// Not-found and not-owned are indistinguishable by contract: `update_note`
/// and `delete_note` return `false`, `get_note` returns `None`.
pub trait NoteRepository {
    /// Inserts one note and returns its storage-assigned id.
    fn add_note(&self, owner_id: OwnerId, text: &str) -> RepoResult<NoteId>;
    /// Gets one note by id, scoped to the owner.
    fn get_note(&self, owner_id: OwnerId, note_id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists the owner's notes, newest first, bounded by `limit`.
    fn list_notes(&self, owner_id: OwnerId, limit: Option<u32>) -> RepoResult<Vec<Note>>;
    /// Lists the owner's notes whose text contains `query` as a literal
    /// substring. An empty query matches every note.
    fn find_notes(&self, owner_id: OwnerId, query: &str, limit: Option<u32>)
        -> RepoResult<Vec<Note>>;
    /// Replaces the text of one owned note. Returns `false` when no owned
    /// row matched.
    fn update_note(&self, owner_id: OwnerId, note_id: NoteId, text: &str) -> RepoResult<bool>;
    /// Deletes one owned note. Returns `false` when no owned row matched.
    fn delete_note(&self, owner_id: OwnerId, note_id: NoteId) -> RepoResult<bool>;
    /// Counts the owner's notes. Capacity policy lives in the caller; the
    /// repository only provides the efficient count.
    fn count_notes(&self, owner_id: OwnerId) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table(conn, "notes", &["id", "owner_id", "text", "created_at"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn add_note(&self, owner_id: OwnerId, text: &str) -> RepoResult<NoteId> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RepoError::InvalidInput(
                "note text must not be empty".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO notes (owner_id, text) VALUES (?1, ?2);",
            params![owner_id, trimmed],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_note(&self, owner_id: OwnerId, note_id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE owner_id = ?1 AND id = ?2;"))?;
        let mut rows = stmt.query(params![owner_id, note_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list_notes(&self, owner_id: OwnerId, limit: Option<u32>) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY id DESC
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![owner_id, normalize_limit(limit)])?;
        collect_notes(&mut rows)
    }

    fn find_notes(
        &self,
        owner_id: OwnerId,
        query: &str,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Note>> {
        // LIKE metacharacters in the query are escaped so the match is a
        // literal substring test, not a pattern.
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_id = ?1 AND text LIKE ?2 ESCAPE '\\'
             ORDER BY id DESC
             LIMIT ?3;"
        ))?;
        let mut rows = stmt.query(params![owner_id, pattern, normalize_limit(limit)])?;
        collect_notes(&mut rows)
    }

    fn update_note(&self, owner_id: OwnerId, note_id: NoteId, text: &str) -> RepoResult<bool> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RepoError::InvalidInput(
                "note text must not be empty".to_string(),
            ));
        }

        let changed = self.conn.execute(
            "UPDATE notes SET text = ?1 WHERE owner_id = ?2 AND id = ?3;",
            params![trimmed, owner_id, note_id],
        )?;
        Ok(changed > 0)
    }

    fn delete_note(&self, owner_id: OwnerId, note_id: NoteId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE owner_id = ?1 AND id = ?2;",
            params![owner_id, note_id],
        )?;
        Ok(changed > 0)
    }

    fn count_notes(&self, owner_id: OwnerId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notes WHERE owner_id = ?1;",
            [owner_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Normalizes the list/find limit according to the repository contract.
pub fn normalize_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => DEFAULT_LIST_LIMIT,
        Some(value) => value,
    }
}

/// Escapes `%`, `_` and the escape character itself for a literal LIKE match.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn collect_notes(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Note>> {
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }
    Ok(notes)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
    })
}
