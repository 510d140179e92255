//! newsdb Core Library
//!
//! Local storage for a news reader: the newspaper catalogue (countries,
//! languages, newspapers, pages and page groups), user preferences and
//! article history, kept in a single SQLite database.
//!
//! # Architecture
//!
//! - **SQLite**: one connection per process, shared through
//!   [`NewsDatabase::get_instance`]
//! - **Accessors**: one DAO per table (group), borrowed from the handle
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let db = NewsDatabase::get_instance(&config)?;
//!
//! for paper in db.newspaper_dao().find_active()? {
//!     println!("{}", paper.name);
//! }
//! ```
//!
//! # Modules
//!
//! - `database`: Process-wide database handle (main entry point)
//! - `dao`: Table accessors
//! - `models`: Records stored in the tables
//! - `settings`: Loading remote settings snapshots
//! - `storage`: Schema, column converters and errors
//! - `config`: Application configuration

pub mod config;
pub mod dao;
pub mod database;
pub mod models;
pub mod settings;
pub mod storage;

pub use config::Config;
pub use dao::{
    CountryFrontEndDao, LanguageFrontEndDao, NewsPaperFrontEndDao, PageFrontEndDao,
    UserPreferenceDataDao,
};
pub use database::{DatabaseCell, NewsDatabase, TableCounts, DATABASE_NAME};
pub use models::{
    Article, ArticleVisitHistory, Country, ImageLink, IntData, Language, Newspaper, Page,
    PageGroup, UserPreferenceData,
};
pub use settings::{AppSettings, LoadSummary};
pub use storage::{ConversionError, StorageError, StorageResult};
