//! User preference accessor

use rusqlite::{params, OptionalExtension};

use crate::database::{count_rows, NewsDatabase};
use crate::models::UserPreferenceData;
use crate::storage::converters::{
    read_column, ColumnConverter, DateConverter, IntDataListConverter, IntListConverter,
};
use crate::storage::schema::USER_PREFERENCE_DATA;
use crate::storage::StorageResult;

const SELECT_PREFERENCES: &str = "SELECT id, favourite_page_ids, inactive_newspaper_ids, \
     page_read_counts, last_modified FROM user_preference_data";

/// Access to the `user_preference_data` table
pub struct UserPreferenceDataDao<'a> {
    db: &'a NewsDatabase,
}

impl<'a> UserPreferenceDataDao<'a> {
    pub(crate) fn new(db: &'a NewsDatabase) -> Self {
        Self { db }
    }

    pub fn find_by_id(&self, id: i64) -> StorageResult<Option<UserPreferenceData>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{} WHERE id = ?1", SELECT_PREFERENCES),
                params![id],
                row_to_preferences,
            )
            .optional()
        })
    }

    pub fn find_all(&self) -> StorageResult<Vec<UserPreferenceData>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_PREFERENCES))?;
            let prefs = stmt
                .query_map([], row_to_preferences)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(prefs)
        })
    }

    /// Insert or replace the stored preferences with the same id
    pub fn save(&self, prefs: &UserPreferenceData) -> StorageResult<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO user_preference_data
                    (id, favourite_page_ids, inactive_newspaper_ids, page_read_counts, last_modified)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    favourite_page_ids = excluded.favourite_page_ids,
                    inactive_newspaper_ids = excluded.inactive_newspaper_ids,
                    page_read_counts = excluded.page_read_counts,
                    last_modified = excluded.last_modified
                "#,
                params![
                    prefs.id,
                    IntListConverter::encode(&prefs.favourite_page_ids),
                    IntListConverter::encode(&prefs.inactive_newspaper_ids),
                    IntDataListConverter::encode(&prefs.page_read_counts),
                    DateConverter::encode(&prefs.last_modified),
                ],
            )?;
            Ok(())
        })
    }

    /// Delete preferences, returns whether a row was removed
    pub fn delete(&self, id: i64) -> StorageResult<bool> {
        self.db.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM user_preference_data WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    pub fn count(&self) -> StorageResult<i64> {
        self.db
            .with_conn(|conn| count_rows(conn, USER_PREFERENCE_DATA.name))
    }
}

fn row_to_preferences(row: &rusqlite::Row) -> rusqlite::Result<UserPreferenceData> {
    Ok(UserPreferenceData {
        id: row.get(0)?,
        favourite_page_ids: read_column::<IntListConverter>(row, 1)?,
        inactive_newspaper_ids: read_column::<IntListConverter>(row, 2)?,
        page_read_counts: read_column::<IntDataListConverter>(row, 3)?,
        last_modified: read_column::<DateConverter>(row, 4)?,
    })
}
