//! Newspaper accessor

use rusqlite::{params, Connection, OptionalExtension};

use crate::database::{count_rows, NewsDatabase};
use crate::models::Newspaper;
use crate::storage::schema::NEWSPAPERS;
use crate::storage::StorageResult;

const SELECT_NEWSPAPERS: &str =
    "SELECT id, name, country_id, language_id, active FROM newspapers";

/// Read-facing access to the `newspapers` table
pub struct NewsPaperFrontEndDao<'a> {
    db: &'a NewsDatabase,
}

impl<'a> NewsPaperFrontEndDao<'a> {
    pub(crate) fn new(db: &'a NewsDatabase) -> Self {
        Self { db }
    }

    /// All newspapers, by id
    pub fn find_all(&self) -> StorageResult<Vec<Newspaper>> {
        self.query(&format!("{} ORDER BY id", SELECT_NEWSPAPERS), [])
    }

    /// Newspapers currently served
    pub fn find_active(&self) -> StorageResult<Vec<Newspaper>> {
        self.query(
            &format!("{} WHERE active = 1 ORDER BY id", SELECT_NEWSPAPERS),
            [],
        )
    }

    pub fn find_by_id(&self, id: i64) -> StorageResult<Option<Newspaper>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{} WHERE id = ?1", SELECT_NEWSPAPERS),
                params![id],
                row_to_newspaper,
            )
            .optional()
        })
    }

    pub fn find_by_country(&self, country_id: i64) -> StorageResult<Vec<Newspaper>> {
        self.query(
            &format!("{} WHERE country_id = ?1 ORDER BY id", SELECT_NEWSPAPERS),
            [country_id],
        )
    }

    pub fn find_by_language(&self, language_id: i64) -> StorageResult<Vec<Newspaper>> {
        self.query(
            &format!("{} WHERE language_id = ?1 ORDER BY id", SELECT_NEWSPAPERS),
            [language_id],
        )
    }

    pub fn count(&self) -> StorageResult<i64> {
        self.db.with_conn(|conn| count_rows(conn, NEWSPAPERS.name))
    }

    /// Insert or update newspapers, returns the number written
    ///
    /// Fails if a newspaper references a country or language that is not
    /// stored.
    pub fn add_newspapers(&self, newspapers: &[Newspaper]) -> StorageResult<usize> {
        self.db
            .with_transaction(|tx| Ok(insert_newspapers(tx, newspapers)?))
    }

    /// Flip the active flag, returns whether the newspaper exists
    pub fn set_active(&self, id: i64, active: bool) -> StorageResult<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE newspapers SET active = ?1 WHERE id = ?2",
                params![active, id],
            )?;
            Ok(changed > 0)
        })
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> StorageResult<Vec<Newspaper>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let newspapers = stmt
                .query_map(params, row_to_newspaper)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(newspapers)
        })
    }
}

pub(crate) fn insert_newspapers(
    conn: &Connection,
    newspapers: &[Newspaper],
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO newspapers (id, name, country_id, language_id, active)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            country_id = excluded.country_id,
            language_id = excluded.language_id,
            active = excluded.active
        "#,
    )?;
    for newspaper in newspapers {
        stmt.execute(params![
            newspaper.id,
            newspaper.name,
            newspaper.country_id,
            newspaper.language_id,
            newspaper.active
        ])?;
    }
    Ok(newspapers.len())
}

fn row_to_newspaper(row: &rusqlite::Row) -> rusqlite::Result<Newspaper> {
    Ok(Newspaper {
        id: row.get(0)?,
        name: row.get(1)?,
        country_id: row.get(2)?,
        language_id: row.get(3)?,
        active: row.get(4)?,
    })
}
