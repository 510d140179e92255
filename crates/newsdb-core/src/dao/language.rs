//! Language accessor

use rusqlite::{params, Connection, OptionalExtension};

use crate::database::{count_rows, NewsDatabase};
use crate::models::Language;
use crate::storage::schema::LANGUAGES;
use crate::storage::StorageResult;

/// Read-facing access to the `languages` table
pub struct LanguageFrontEndDao<'a> {
    db: &'a NewsDatabase,
}

impl<'a> LanguageFrontEndDao<'a> {
    pub(crate) fn new(db: &'a NewsDatabase) -> Self {
        Self { db }
    }

    /// All languages, by name
    pub fn find_all(&self) -> StorageResult<Vec<Language>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM languages ORDER BY name")?;
            let languages = stmt
                .query_map([], row_to_language)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(languages)
        })
    }

    pub fn find_by_id(&self, id: i64) -> StorageResult<Option<Language>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name FROM languages WHERE id = ?1",
                params![id],
                row_to_language,
            )
            .optional()
        })
    }

    pub fn count(&self) -> StorageResult<i64> {
        self.db.with_conn(|conn| count_rows(conn, LANGUAGES.name))
    }

    /// Insert or update languages, returns the number written
    pub fn add_languages(&self, languages: &[Language]) -> StorageResult<usize> {
        self.db
            .with_transaction(|tx| Ok(insert_languages(tx, languages)?))
    }
}

pub(crate) fn insert_languages(
    conn: &Connection,
    languages: &[Language],
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO languages (id, name) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
    )?;
    for language in languages {
        stmt.execute(params![language.id, language.name])?;
    }
    Ok(languages.len())
}

fn row_to_language(row: &rusqlite::Row) -> rusqlite::Result<Language> {
    Ok(Language {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
