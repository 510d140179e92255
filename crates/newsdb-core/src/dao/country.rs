//! Country accessor

use rusqlite::{params, Connection, OptionalExtension};

use crate::database::{count_rows, NewsDatabase};
use crate::models::Country;
use crate::storage::schema::COUNTRIES;
use crate::storage::StorageResult;

/// Read-facing access to the `countries` table
pub struct CountryFrontEndDao<'a> {
    db: &'a NewsDatabase,
}

impl<'a> CountryFrontEndDao<'a> {
    pub(crate) fn new(db: &'a NewsDatabase) -> Self {
        Self { db }
    }

    /// All countries, by name
    pub fn find_all(&self) -> StorageResult<Vec<Country>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM {} ORDER BY name",
                COUNTRIES.column_list(),
                COUNTRIES.name
            ))?;
            let countries = stmt
                .query_map([], row_to_country)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(countries)
        })
    }

    pub fn find_by_id(&self, id: i64) -> StorageResult<Option<Country>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    COUNTRIES.column_list(),
                    COUNTRIES.name
                ),
                params![id],
                row_to_country,
            )
            .optional()
        })
    }

    pub fn count(&self) -> StorageResult<i64> {
        self.db.with_conn(|conn| count_rows(conn, COUNTRIES.name))
    }

    /// Insert or update countries, returns the number written
    pub fn add_countries(&self, countries: &[Country]) -> StorageResult<usize> {
        self.db
            .with_transaction(|tx| Ok(insert_countries(tx, countries)?))
    }
}

pub(crate) fn insert_countries(
    conn: &Connection,
    countries: &[Country],
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO countries (id, name, country_code, time_zone)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            country_code = excluded.country_code,
            time_zone = excluded.time_zone
        "#,
    )?;
    for country in countries {
        stmt.execute(params![
            country.id,
            country.name,
            country.country_code,
            country.time_zone
        ])?;
    }
    Ok(countries.len())
}

fn row_to_country(row: &rusqlite::Row) -> rusqlite::Result<Country> {
    Ok(Country {
        id: row.get(0)?,
        name: row.get(1)?,
        country_code: row.get(2)?,
        time_zone: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find_countries() {
        let db = NewsDatabase::open_in_memory().unwrap();
        let dao = db.country_dao();

        let written = dao
            .add_countries(&[
                Country::new(2, "United Kingdom", "GB", "Europe/London"),
                Country::new(1, "Bangladesh", "BD", "Asia/Dhaka"),
            ])
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(dao.count().unwrap(), 2);

        let all = dao.find_all().unwrap();
        assert_eq!(all[0].name, "Bangladesh");
        assert_eq!(all[1].name, "United Kingdom");

        let uk = dao.find_by_id(2).unwrap().unwrap();
        assert_eq!(uk.time_zone, "Europe/London");
        assert!(dao.find_by_id(42).unwrap().is_none());
    }

    #[test]
    fn test_add_countries_updates_existing() {
        let db = NewsDatabase::open_in_memory().unwrap();
        let dao = db.country_dao();

        dao.add_countries(&[Country::new(1, "Bangla", "BD", "Asia/Dhaka")])
            .unwrap();
        dao.add_countries(&[Country::new(1, "Bangladesh", "BD", "Asia/Dhaka")])
            .unwrap();

        assert_eq!(dao.count().unwrap(), 1);
        assert_eq!(dao.find_by_id(1).unwrap().unwrap().name, "Bangladesh");
    }
}
