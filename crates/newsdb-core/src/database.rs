//! Process-wide database handle
//!
//! `NewsDatabase` owns the single SQLite connection backing every table
//! accessor. It is opened lazily on the first call to
//! [`NewsDatabase::get_instance`] and then shared for the rest of the
//! process; there is no close or reset.
//!
//! ## Usage
//!
//! ```ignore
//! let config = Config::load()?;
//! let db = NewsDatabase::get_instance(&config)?;
//!
//! let active = db.newspaper_dao().find_active()?;
//! let top_pages = db.page_dao().find_top_pages(active[0].id)?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use rusqlite::{Connection, Transaction};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::dao::{
    CountryFrontEndDao, LanguageFrontEndDao, NewsPaperFrontEndDao, PageFrontEndDao,
    UserPreferenceDataDao,
};
use crate::storage::schema::{self, init_schema, needs_init};
use crate::storage::{StorageError, StorageResult};

/// Logical name of the database, fixed for the application
pub const DATABASE_NAME: &str = "news_server_database";

static INSTANCE: DatabaseCell = DatabaseCell::new();

/// At-most-once holder for a shared `NewsDatabase`
///
/// Concurrent callers of `get_or_*` block until the first initializer
/// finishes and then all observe the same handle. A failed initializer
/// leaves the cell empty.
pub struct DatabaseCell {
    cell: OnceCell<Arc<NewsDatabase>>,
}

impl DatabaseCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The cached handle, if initialized
    pub fn get(&self) -> Option<Arc<NewsDatabase>> {
        self.cell.get().map(Arc::clone)
    }

    /// Get the handle, opening the configured database on first use
    pub fn get_or_open(&self, config: &Config) -> StorageResult<Arc<NewsDatabase>> {
        self.get_or_try_init(|| NewsDatabase::open(&config.database_path()))
    }

    /// Get the handle, running `init` to construct it on first use
    pub fn get_or_try_init<F>(&self, init: F) -> StorageResult<Arc<NewsDatabase>>
    where
        F: FnOnce() -> StorageResult<NewsDatabase>,
    {
        self.cell
            .get_or_try_init(|| init().map(Arc::new))
            .map(Arc::clone)
    }
}

impl Default for DatabaseCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Row counts for every persisted table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub countries: i64,
    pub languages: i64,
    pub newspapers: i64,
    pub pages: i64,
    pub page_groups: i64,
    pub articles: i64,
    pub user_preferences: i64,
    pub article_visits: i64,
}

/// The local news database
pub struct NewsDatabase {
    conn: Mutex<Connection>,
    /// `None` for in-memory databases
    path: Option<PathBuf>,
}

impl NewsDatabase {
    /// Get the process-wide database, opening it on first call
    ///
    /// `config` is only consulted by the call that performs the
    /// initialization; every call returns the same shared instance.
    pub fn get_instance(config: &Config) -> StorageResult<Arc<NewsDatabase>> {
        INSTANCE.get_or_open(config)
    }

    /// Open (or create) a database file at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        info!("Opening database at {:?}", path);
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if needs_init(&conn) {
            debug!("Initializing schema version {}", schema::SCHEMA_VERSION);
            init_schema(&conn)?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Path of the database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Execute a function with the database connection
    pub fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        f(&conn).map_err(Into::into)
    }

    /// Execute a function inside a single transaction
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise. The connection
    /// lock is held while `f` runs, so `f` must only use `tx`: calling a DAO
    /// or `with_conn` on this handle from inside `f` deadlocks.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction) -> Result<T, E>,
        E: From<StorageError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| E::from(StorageError::LockPoisoned))?;
        let tx = conn
            .transaction()
            .map_err(|e| E::from(StorageError::from(e)))?;

        let value = f(&tx)?;

        tx.commit().map_err(|e| E::from(StorageError::from(e)))?;
        Ok(value)
    }

    // ==================== Table Accessors ====================

    pub fn country_dao(&self) -> CountryFrontEndDao<'_> {
        CountryFrontEndDao::new(self)
    }

    pub fn language_dao(&self) -> LanguageFrontEndDao<'_> {
        LanguageFrontEndDao::new(self)
    }

    pub fn newspaper_dao(&self) -> NewsPaperFrontEndDao<'_> {
        NewsPaperFrontEndDao::new(self)
    }

    /// Pages and page groups
    pub fn page_dao(&self) -> PageFrontEndDao<'_> {
        PageFrontEndDao::new(self)
    }

    pub fn user_preference_dao(&self) -> UserPreferenceDataDao<'_> {
        UserPreferenceDataDao::new(self)
    }

    // ==================== Stats ====================

    /// Count rows in every table
    pub fn table_counts(&self) -> StorageResult<TableCounts> {
        self.with_conn(|conn| {
            Ok(TableCounts {
                countries: count_rows(conn, schema::COUNTRIES.name)?,
                languages: count_rows(conn, schema::LANGUAGES.name)?,
                newspapers: count_rows(conn, schema::NEWSPAPERS.name)?,
                pages: count_rows(conn, schema::PAGES.name)?,
                page_groups: count_rows(conn, schema::PAGE_GROUPS.name)?,
                articles: count_rows(conn, schema::ARTICLES.name)?,
                user_preferences: count_rows(conn, schema::USER_PREFERENCE_DATA.name)?,
                article_visits: count_rows(conn, schema::ARTICLE_VISIT_HISTORY.name)?,
            })
        })
    }
}

/// `SELECT COUNT(*)` over a table
pub(crate) fn count_rows(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
}
