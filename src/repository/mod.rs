mod embedded;
mod error;


pub use error::StoreError;

use embedded::migrations;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use std::{
    fs,
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{config::PoolConfig, models::Note};

const SELECT_ONE: &str = "SELECT id, title, content, created_at FROM notes WHERE id = ?1";
const SELECT_ALL: &str = "SELECT id, title, content, created_at FROM notes ORDER BY id";
const SELECT_MATCHING: &str = "SELECT id, title, content, created_at FROM notes \
     WHERE title LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\' ORDER BY id";

/// Upper bound on bound parameters per `DELETE ... IN (...)` statement.
const DELETE_CHUNK: usize = 500;

type NoteRow = (i64, String, String, Option<DateTime<Utc>>);
type Connection = PooledConnection<SqliteConnectionManager>;

/// SQLite-backed note store.
///
/// Every call checks a connection out of the pool and hands it back on drop.
/// Mutating calls additionally hold `write_lock`, so at most one of them runs
/// at a time per store; reads never take it.
pub struct Repository {
    pool: Pool<SqliteConnectionManager>,
    write_lock: Mutex<()>,
}

impl Repository {
    pub fn new(database_path: &Path, pool_config: &PoolConfig) -> Result<Self, StoreError> {
        if pool_config.max_size == 0 {
            return Err(StoreError::invalid("pool.max_size must be at least 1"));
        }

        if let Some(parent) = database_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;",
            )
        });

        let pool = Pool::builder()
            .max_size(pool_config.max_size)
            .connection_timeout(pool_config.connection_timeout)
            .build(manager)?;

        tracing::info!(
            "Database connection pool initialized: {} (max {} connections)",
            database_path.display(),
            pool_config.max_size
        );

        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
        })
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        let _writes = self.lock_writes();
        let mut conn = self.connection()?;

        let migrations_report = migrations::runner().run(&mut *conn)?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }

    /// Inserts `note` and writes the generated identifier back into it.
    ///
    /// The id is only assigned after the row is committed, so a failed insert
    /// leaves the note transient.
    pub fn create_note(&self, note: &mut Note) -> Result<(), StoreError> {
        let _writes = self.lock_writes();
        let conn = self.connection()?;

        let id: i64 = conn.query_row(
            "INSERT INTO notes (title, content, created_at) VALUES (?1, ?2, ?3) RETURNING id",
            params![note.title(), note.content(), note.created_at()],
            |row| row.get(0),
        )?;
        note.set_id(id)?;

        tracing::info!("Note created: {id}");
        Ok(())
    }

    /// Looks a note up by id. Non-positive ids are answered with `None`
    /// without touching the database.
    pub fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        if id <= 0 {
            tracing::warn!("Attempted to get note with invalid ID: {id}");
            return Ok(None);
        }

        let conn = self.connection()?;
        let row = conn.query_row(SELECT_ONE, [id], read_row).optional()?;

        row.map(into_note).transpose()
    }

    pub fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(SELECT_ALL)?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(into_note).collect()
    }

    /// Overwrites title and content of an existing note. Zero affected rows
    /// is reported as [`StoreError::NotFound`].
    pub fn update_note(&self, note: &Note) -> Result<(), StoreError> {
        if !note.is_persisted() {
            return Err(StoreError::invalid(
                "Cannot update a note with an invalid ID.",
            ));
        }

        let _writes = self.lock_writes();
        self.write_update(note)
    }

    /// Reads note `id`, lets `apply` change it and stores the result, all
    /// under the write lock, so concurrent read-modify-write cycles on the
    /// same note cannot overwrite each other's fields.
    ///
    /// Nothing is written when `apply` fails.
    pub fn update_with<F>(&self, id: i64, apply: F) -> Result<Note, StoreError>
    where
        F: FnOnce(&mut Note) -> Result<(), StoreError>,
    {
        let _writes = self.lock_writes();

        let mut note = self.get_note(id)?.ok_or(StoreError::NotFound(id))?;
        apply(&mut note)?;
        self.write_update(&note)?;

        Ok(note)
    }

    /// Removes a note. Returns whether a row existed; a missing row is not an error.
    pub fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        if id <= 0 {
            return Err(StoreError::invalid(format!(
                "Cannot delete note with invalid ID: {id}"
            )));
        }

        let _writes = self.lock_writes();
        let conn = self.connection()?;

        let rows = conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;

        tracing::info!("Deleted note: {id}");
        Ok(rows > 0)
    }

    /// Notes whose title or content contains `query`, by ascending id.
    /// A blank or absent query matches nothing.
    pub fn search_notes(&self, query: Option<&str>) -> Result<Vec<Note>, StoreError> {
        let Some(query) = query.filter(|q| !q.trim().is_empty()) else {
            return Ok(Vec::new());
        };

        let pattern = format!("%{}%", escape_like(query));

        let conn = self.connection()?;
        let mut stmt = conn.prepare(SELECT_MATCHING)?;
        let rows = stmt
            .query_map([pattern], read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(into_note).collect()
    }

    pub fn count_notes(&self) -> Result<i64, StoreError> {
        let conn = self.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Deletes every note whose id is listed, in one transaction.
    ///
    /// All ids are parsed before anything is deleted; one malformed id fails
    /// the whole batch. Unknown ids are ignored. Returns the number of rows
    /// removed.
    pub fn bulk_delete<S: AsRef<str>>(&self, ids: &[S]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids = ids
            .iter()
            .map(|raw| parse_id(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let _writes = self.lock_writes();
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let mut removed = 0;
        for chunk in ids.chunks(DELETE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            removed += tx.execute(
                &format!("DELETE FROM notes WHERE id IN ({placeholders})"),
                params_from_iter(chunk),
            )?;
        }

        tx.commit()?;

        tracing::info!("Bulk deleted {removed} notes ({} ids requested)", ids.len());
        Ok(removed)
    }

    /// Caller must hold `write_lock`.
    fn write_update(&self, note: &Note) -> Result<(), StoreError> {
        let conn = self.connection()?;

        let rows = conn.execute(
            "UPDATE notes SET title = ?1, content = ?2 WHERE id = ?3",
            params![note.title(), note.content(), note.id()],
        )?;

        if rows == 0 {
            tracing::warn!("Attempted to update non-existent note: {}", note.id());
            return Err(StoreError::NotFound(note.id()));
        }

        tracing::info!("Note updated: {}", note.id());
        Ok(())
    }

    fn connection(&self) -> Result<Connection, StoreError> {
        Ok(self.pool.get()?)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, a panicked writer leaves nothing to repair.
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok((
        row.get("id")?,
        row.get("title")?,
        row.get("content")?,
        row.get("created_at")?,
    ))
}

fn into_note((id, title, content, created_at): NoteRow) -> Result<Note, StoreError> {
    Note::restore(id, title, content, created_at)
        .map_err(|e| StoreError::Storage(format!("corrupt row for note {id}: {e}").into()))
}

fn parse_id(raw: &str) -> Result<i64, StoreError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| StoreError::invalid(format!("Invalid note ID: '{trimmed}'")))
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
