//! Data models for newsdb
//!
//! Plain data carriers for every table in the store. Relationships between
//! entities are always held as identifiers and resolved by lookup, never as
//! owned references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parent id shared by every top-level page of a newspaper
pub const TOP_LEVEL_PAGE_PARENT_ID: i64 = 0;

/// A country that newspapers are published in
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub country_code: String,
    pub time_zone: String,
}

impl Country {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        country_code: impl Into<String>,
        time_zone: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            country_code: country_code.into(),
            time_zone: time_zone.into(),
        }
    }
}

/// A publication language
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    pub id: i64,
    pub name: String,
}

impl Language {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A newspaper entry
///
/// Fields are independent: there is no cross-field validation and no derived
/// state. `Default` yields the empty record (0 / "" / false) which
/// deserializers and row mappers populate afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "RemoteNewspaper")]
pub struct Newspaper {
    /// Externally assigned identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Id of the owning country
    pub country_id: i64,
    /// Id of the publication language
    pub language_id: i64,
    /// Whether the newspaper is currently served
    pub active: bool,
}

/// Newspaper as published remotely
///
/// The flag arrives as `isActive` or `active`. When both are present
/// `isActive` wins.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RemoteNewspaper {
    id: i64,
    name: String,
    country_id: i64,
    language_id: i64,
    active: Option<bool>,
    is_active: Option<bool>,
}

impl From<RemoteNewspaper> for Newspaper {
    fn from(remote: RemoteNewspaper) -> Self {
        Self {
            id: remote.id,
            name: remote.name,
            country_id: remote.country_id,
            language_id: remote.language_id,
            active: remote.is_active.or(remote.active).unwrap_or_default(),
        }
    }
}

impl Newspaper {
    /// Create a fully populated newspaper
    pub fn new(
        id: i64,
        name: impl Into<String>,
        country_id: i64,
        language_id: i64,
        active: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            country_id,
            language_id,
            active,
        }
    }
}

/// A section page of a newspaper
///
/// `active` and `link_format` only exist on pages coming from a remote
/// settings snapshot and are never persisted. `has_child` and `has_data` are
/// computed locally when the snapshot is loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Page {
    pub id: i64,
    #[serde(alias = "newsPaperId")]
    pub newspaper_id: i64,
    pub parent_page_id: i64,
    pub name: String,
    pub active: bool,
    pub link_format: Option<String>,
    #[serde(skip_deserializing)]
    pub has_child: bool,
    #[serde(skip_deserializing)]
    pub has_data: bool,
}

impl Page {
    pub fn new(id: i64, newspaper_id: i64, parent_page_id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            newspaper_id,
            parent_page_id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether this page sits directly under its newspaper
    pub fn is_top_level(&self) -> bool {
        self.parent_page_id == TOP_LEVEL_PAGE_PARENT_ID
    }
}

/// A named group of pages shown together
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PageGroup {
    pub name: String,
    pub active: bool,
    /// Member page ids, in display order
    pub page_list: Vec<i64>,
}

impl PageGroup {
    pub fn new(name: impl Into<String>, active: bool, page_list: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            active,
            page_list,
        }
    }
}

/// An image attached to an article
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageLink {
    pub link: String,
    pub caption: Option<String>,
}

/// A single article of a page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub page_id: i64,
    pub newspaper_id: i64,
    pub title: String,
    pub modification_time: Option<DateTime<Utc>>,
    pub publication_time: Option<DateTime<Utc>>,
    pub article_text: Option<String>,
    pub image_links: Vec<ImageLink>,
    pub preview_image_link: Option<String>,
}

/// A keyed integer, e.g. a page id and how often it was read
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntData {
    pub key: i64,
    pub value: i64,
}

impl IntData {
    pub fn new(key: i64, value: i64) -> Self {
        Self { key, value }
    }
}

/// Per-user reading preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferenceData {
    pub id: i64,
    pub favourite_page_ids: Vec<i64>,
    pub inactive_newspaper_ids: Vec<i64>,
    pub page_read_counts: Vec<IntData>,
    pub last_modified: DateTime<Utc>,
}

impl UserPreferenceData {
    /// Create empty preferences
    pub fn new(id: i64) -> Self {
        Self {
            id,
            favourite_page_ids: Vec::new(),
            inactive_newspaper_ids: Vec::new(),
            page_read_counts: Vec::new(),
            last_modified: Utc::now(),
        }
    }

    /// Mark a page as favourite
    pub fn add_favourite_page(&mut self, page_id: i64) {
        if !self.favourite_page_ids.contains(&page_id) {
            self.favourite_page_ids.push(page_id);
            self.last_modified = Utc::now();
        }
    }

    /// Remove a page from favourites
    pub fn remove_favourite_page(&mut self, page_id: i64) {
        if let Some(pos) = self.favourite_page_ids.iter().position(|id| *id == page_id) {
            self.favourite_page_ids.remove(pos);
            self.last_modified = Utc::now();
        }
    }

    /// Count one more read of a page
    pub fn record_page_read(&mut self, page_id: i64) {
        match self.page_read_counts.iter_mut().find(|d| d.key == page_id) {
            Some(entry) => entry.value += 1,
            None => self.page_read_counts.push(IntData::new(page_id, 1)),
        }
        self.last_modified = Utc::now();
    }
}

/// One visit to an article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleVisitHistory {
    /// Assigned by the store; `None` until inserted
    pub id: Option<i64>,
    pub article_id: String,
    pub visit_time: DateTime<Utc>,
}

impl ArticleVisitHistory {
    pub fn new(article_id: impl Into<String>) -> Self {
        Self {
            id: None,
            article_id: article_id.into(),
            visit_time: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newspaper_new() {
        let newspaper = Newspaper::new(5, "Times", 1, 2, true);
        assert_eq!(newspaper.id, 5);
        assert_eq!(newspaper.name, "Times");
        assert_eq!(newspaper.country_id, 1);
        assert_eq!(newspaper.language_id, 2);
        assert!(newspaper.active);
    }

    #[test]
    fn test_newspaper_default_is_empty() {
        let newspaper = Newspaper::default();
        assert_eq!(newspaper.id, 0);
        assert!(newspaper.name.is_empty());
        assert_eq!(newspaper.country_id, 0);
        assert_eq!(newspaper.language_id, 0);
        assert!(!newspaper.active);
    }

    #[test]
    fn test_newspaper_populated_after_default_matches_new() {
        let mut newspaper = Newspaper::default();
        newspaper.id = 5;
        newspaper.name = "Times".to_string();
        newspaper.country_id = 1;
        newspaper.language_id = 2;
        newspaper.active = true;

        assert_eq!(newspaper, Newspaper::new(5, "Times", 1, 2, true));
    }

    #[test]
    fn test_newspaper_instances_are_independent() {
        let original = Newspaper::new(5, "Times", 1, 2, true);
        let mut copy = original.clone();
        copy.name = "Herald".to_string();
        copy.active = false;

        assert_eq!(original.name, "Times");
        assert!(original.active);
    }

    #[test]
    fn test_newspaper_deserializes_remote_shape() {
        let json = r#"{"id":7,"name":"Daily Star","countryId":1,"languageId":3,"isActive":true}"#;
        let newspaper: Newspaper = serde_json::from_str(json).unwrap();
        assert_eq!(newspaper, Newspaper::new(7, "Daily Star", 1, 3, true));

        // Missing fields fall back to defaults
        let partial: Newspaper = serde_json::from_str(r#"{"id":9}"#).unwrap();
        assert_eq!(partial.id, 9);
        assert!(!partial.active);
    }

    #[test]
    fn test_newspaper_accepts_either_active_key() {
        let plain: Newspaper = serde_json::from_str(r#"{"id":1,"active":true}"#).unwrap();
        assert!(plain.active);

        let both: Newspaper =
            serde_json::from_str(r#"{"id":1,"active":true,"isActive":true}"#).unwrap();
        assert!(both.active);

        let conflicting: Newspaper =
            serde_json::from_str(r#"{"id":1,"active":true,"isActive":false}"#).unwrap();
        assert!(!conflicting.active);

        // Serialized form still uses `active`
        let json = serde_json::to_value(&both).unwrap();
        assert_eq!(json["active"], true);
        assert!(json.get("isActive").is_none());
    }

    #[test]
    fn test_page_top_level() {
        let top = Page::new(1, 10, TOP_LEVEL_PAGE_PARENT_ID, "Home");
        let child = Page::new(2, 10, 1, "Sports");
        assert!(top.is_top_level());
        assert!(!child.is_top_level());
    }

    #[test]
    fn test_page_ignores_computed_flags_on_input() {
        let json = r#"{"id":1,"newsPaperId":4,"parentPageId":0,"name":"Home","active":true,"hasChild":true}"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.newspaper_id, 4);
        assert!(page.active);
        assert!(!page.has_child);
        assert!(page.link_format.is_none());
    }

    #[test]
    fn test_user_preference_favourites() {
        let mut prefs = UserPreferenceData::new(1);
        prefs.add_favourite_page(3);
        prefs.add_favourite_page(5);
        prefs.add_favourite_page(3);
        assert_eq!(prefs.favourite_page_ids, vec![3, 5]);

        prefs.remove_favourite_page(3);
        assert_eq!(prefs.favourite_page_ids, vec![5]);
    }

    #[test]
    fn test_user_preference_read_counts() {
        let mut prefs = UserPreferenceData::new(1);
        prefs.record_page_read(8);
        prefs.record_page_read(8);
        prefs.record_page_read(2);
        assert_eq!(
            prefs.page_read_counts,
            vec![IntData::new(8, 2), IntData::new(2, 1)]
        );
    }
}
