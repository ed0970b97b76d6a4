//! Photo metadata persistence.
//!
//! One SQLite table, one entity. The repository owns a single shared
//! connection behind a mutex; SQLite's own locking handles everything else.
//! Components receive the repository at construction, so tests can hand in
//! an in-memory database instead of a file.
//!
//! Column-to-field mapping is 1:1; JSON keys are camelCase (`filePath`,
//! `fileSize`, `createdAt`) for compatibility with the browser frontend.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("photo {0} not found")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A stored photo record.
///
/// `filename`, `file_path`, `file_size` and `created_at` are fixed at
/// creation; only `title` is ever rewritten afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub title: String,
    /// Base name of the normalized file (e.g. `a1b2….jpg`).
    pub filename: String,
    /// Relative storage path the frontend fetches (e.g. `uploads/a1b2….jpg`).
    pub file_path: String,
    /// Size in bytes of the stored, post-conversion file.
    pub file_size: i64,
    /// `%Y-%m-%d %H:%M:%S`, set once at creation.
    pub created_at: String,
}

/// A photo record about to be created (no id yet).
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub title: String,
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub created_at: String,
}

/// CRUD over the `photos` table.
pub struct PhotoRepository {
    conn: Mutex<Connection>,
}

impl PhotoRepository {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, RepoError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, RepoError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepoError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS photos (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL DEFAULT '',
                filename    TEXT NOT NULL,
                file_path   TEXT NOT NULL,
                file_size   INTEGER NOT NULL,
                created_at  TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned mutex only means another request panicked mid-query;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a new record and return it with the store-assigned id.
    pub fn create(&self, photo: NewPhoto) -> Result<Photo, RepoError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO photos (title, filename, file_path, file_size, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                photo.title,
                photo.filename,
                photo.file_path,
                photo.file_size,
                photo.created_at
            ],
        )?;
        Ok(Photo {
            id: conn.last_insert_rowid(),
            title: photo.title,
            filename: photo.filename,
            file_path: photo.file_path,
            file_size: photo.file_size,
            created_at: photo.created_at,
        })
    }

    /// Every record, in no defined order.
    pub fn list_all(&self) -> Result<Vec<Photo>, RepoError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, filename, file_path, file_size, created_at FROM photos",
        )?;
        let rows = stmt.query_map([], row_to_photo)?;
        let mut photos = Vec::new();
        for photo in rows {
            photos.push(photo?);
        }
        Ok(photos)
    }

    pub fn get(&self, id: i64) -> Result<Photo, RepoError> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, title, filename, file_path, file_size, created_at
             FROM photos WHERE id = ?1",
            params![id],
            row_to_photo,
        )
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => RepoError::NotFound(id),
            other => other.into(),
        })
    }

    /// Persist a full rewrite of the record as given, keyed by its id.
    pub fn update(&self, photo: &Photo) -> Result<(), RepoError> {
        self.conn().execute(
            "UPDATE photos
             SET title = ?1, filename = ?2, file_path = ?3, file_size = ?4, created_at = ?5
             WHERE id = ?6",
            params![
                photo.title,
                photo.filename,
                photo.file_path,
                photo.file_size,
                photo.created_at,
                photo.id
            ],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<(), RepoError> {
        let deleted = self
            .conn()
            .execute("DELETE FROM photos WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn row_to_photo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        title: row.get(1)?,
        filename: row.get(2)?,
        file_path: row.get(3)?,
        file_size: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl std::fmt::Debug for PhotoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoRepository").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::new_photo;

    #[test]
    fn create_assigns_unique_ids() {
        let repo = PhotoRepository::open_in_memory().unwrap();
        let a = repo.create(new_photo("first")).unwrap();
        let b = repo.create(new_photo("second")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, "first");
    }

    #[test]
    fn list_all_returns_every_record() {
        let repo = PhotoRepository::open_in_memory().unwrap();
        for title in ["a", "b", "c"] {
            repo.create(new_photo(title)).unwrap();
        }
        let mut titles: Vec<String> = repo
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        titles.sort();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[test]
    fn get_round_trips_all_fields() {
        let repo = PhotoRepository::open_in_memory().unwrap();
        let created = repo.create(new_photo("round trip")).unwrap();
        let fetched = repo.get(created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn get_missing_id_is_not_found() {
        let repo = PhotoRepository::open_in_memory().unwrap();
        let err = repo.get(999_999).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(999_999)), "got {err:?}");
    }

    #[test]
    fn update_rewrites_record() {
        let repo = PhotoRepository::open_in_memory().unwrap();
        let mut photo = repo.create(new_photo("before")).unwrap();
        photo.title = "after".to_string();
        repo.update(&photo).unwrap();

        let fetched = repo.get(photo.id).unwrap();
        assert_eq!(fetched.title, "after");
        // Everything except title is untouched.
        assert_eq!(fetched.filename, photo.filename);
        assert_eq!(fetched.file_path, photo.file_path);
        assert_eq!(fetched.file_size, photo.file_size);
        assert_eq!(fetched.created_at, photo.created_at);
    }

    #[test]
    fn delete_removes_record() {
        let repo = PhotoRepository::open_in_memory().unwrap();
        let photo = repo.create(new_photo("doomed")).unwrap();
        repo.delete(photo.id).unwrap();
        assert!(matches!(
            repo.get(photo.id),
            Err(RepoError::NotFound(_))
        ));
    }

    #[test]
    fn delete_missing_id_is_not_found() {
        let repo = PhotoRepository::open_in_memory().unwrap();
        let err = repo.delete(42).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(42)), "got {err:?}");
    }

    #[test]
    fn photo_serializes_with_camel_case_keys() {
        let photo = Photo {
            id: 1,
            title: "t".into(),
            filename: "f.jpg".into(),
            file_path: "uploads/f.jpg".into(),
            file_size: 10,
            created_at: "2026-01-01 00:00:00".into(),
        };
        let json = serde_json::to_value(&photo).unwrap();
        assert!(json.get("filePath").is_some());
        assert!(json.get("fileSize").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
