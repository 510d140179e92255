//! Table accessors
//!
//! Each accessor is a borrowed view over the shared `NewsDatabase` scoped to
//! one table or table group. Reads map rows into `models`; writes are
//! upserts so that rows referenced by children survive a reload.
//!
//! The bulk insert helpers take a plain `&Connection` so the settings loader
//! can run several of them inside one transaction.

mod country;
mod language;
mod newspaper;
mod page;
mod user_preference;

pub use country::CountryFrontEndDao;
pub use language::LanguageFrontEndDao;
pub use newspaper::NewsPaperFrontEndDao;
pub use page::PageFrontEndDao;
pub use user_preference::UserPreferenceDataDao;

pub(crate) use country::insert_countries;
pub(crate) use language::insert_languages;
pub(crate) use newspaper::insert_newspapers;
pub(crate) use page::{insert_page_groups, insert_pages};
