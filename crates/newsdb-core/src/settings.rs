//! Application settings snapshot
//!
//! The remote service publishes the catalogue (languages, countries,
//! newspapers, pages, page groups) as one snapshot of keyed maps. Loading a
//! snapshot writes it into the local tables in a single transaction:
//!
//! - only active newspapers are kept
//! - only active pages of kept newspapers are kept
//! - `has_data` marks pages with a link format
//! - `has_child` marks top-level pages with at least one active child
//!
//! The snapshot's update time is recorded so callers can tell whether a
//! newer one is available.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dao::{
    insert_countries, insert_languages, insert_newspapers, insert_page_groups, insert_pages,
};
use crate::database::NewsDatabase;
use crate::models::{Country, Language, Newspaper, Page, PageGroup};
use crate::storage::schema::{get_meta, set_meta};

/// Metadata key holding the update time of the last loaded snapshot
const SETTINGS_UPDATE_TIME_KEY: &str = "app_settings_updated_at";

/// Remote settings snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub languages: Option<HashMap<String, Language>>,
    pub countries: Option<HashMap<String, Country>>,
    pub newspapers: Option<HashMap<String, Newspaper>>,
    pub pages: Option<HashMap<String, Page>>,
    pub page_groups: Option<HashMap<String, PageGroup>>,
    /// Publication times of the snapshot, epoch millis
    pub update_time: Option<HashMap<String, i64>>,
}

impl AppSettings {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse app settings JSON")
    }

    /// Latest update time in the snapshot
    pub fn latest_update_time(&self) -> Option<i64> {
        self.update_time
            .as_ref()
            .and_then(|times| times.values().copied().max())
    }
}

/// Rows written by [`load_app_settings`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub languages: usize,
    pub countries: usize,
    pub newspapers: usize,
    pub pages: usize,
    pub page_groups: usize,
    pub update_time: Option<i64>,
}

/// Write a settings snapshot into the database
pub fn load_app_settings(db: &NewsDatabase, settings: &AppSettings) -> Result<LoadSummary> {
    let languages = sorted_values(&settings.languages, |l: &Language| l.id);
    let countries = sorted_values(&settings.countries, |c: &Country| c.id);

    let newspapers: Vec<Newspaper> = sorted_values(&settings.newspapers, |n: &Newspaper| n.id)
        .into_iter()
        .filter(|n| n.active)
        .collect();

    let all_pages = sorted_values(&settings.pages, |p: &Page| p.id);
    let pages = prepare_pages(&all_pages, &newspapers);

    let mut page_groups: Vec<PageGroup> = settings
        .page_groups
        .as_ref()
        .map(|groups| groups.values().cloned().collect())
        .unwrap_or_default();
    page_groups.sort_by(|a, b| a.name.cmp(&b.name));

    let update_time = settings.latest_update_time();

    let summary = db.with_transaction(|tx| -> Result<LoadSummary> {
        let summary = LoadSummary {
            languages: insert_languages(tx, &languages)
                .context("Failed to store languages")?,
            countries: insert_countries(tx, &countries)
                .context("Failed to store countries")?,
            newspapers: insert_newspapers(tx, &newspapers)
                .context("Failed to store newspapers")?,
            pages: insert_pages(tx, &pages).context("Failed to store pages")?,
            page_groups: insert_page_groups(tx, &page_groups)
                .context("Failed to store page groups")?,
            update_time,
        };

        if let Some(time) = update_time {
            set_meta(tx, SETTINGS_UPDATE_TIME_KEY, &time.to_string())
                .context("Failed to record settings update time")?;
        }

        Ok(summary)
    })?;

    info!(
        "Loaded app settings: {} languages, {} countries, {} newspapers, {} pages, {} page groups",
        summary.languages,
        summary.countries,
        summary.newspapers,
        summary.pages,
        summary.page_groups
    );

    Ok(summary)
}

/// Update time of the last loaded snapshot
pub fn local_update_time(db: &NewsDatabase) -> Result<Option<i64>> {
    let value = db
        .with_conn(|conn| get_meta(conn, SETTINGS_UPDATE_TIME_KEY))
        .context("Failed to read settings update time")?;
    Ok(value.and_then(|v| v.parse().ok()))
}

/// Whether the server has a snapshot newer than the loaded one
pub fn is_app_settings_updated(db: &NewsDatabase, server_update_time: i64) -> Result<bool> {
    let local = local_update_time(db)?.unwrap_or(0);
    debug!(
        "Settings update time: local={}, server={}",
        local, server_update_time
    );
    Ok(server_update_time > local)
}

/// Whether every catalogue table has been populated
pub fn is_settings_data_loaded(db: &NewsDatabase) -> Result<bool> {
    let counts = db
        .table_counts()
        .context("Failed to count catalogue tables")?;
    Ok(counts.languages > 0
        && counts.countries > 0
        && counts.newspapers > 0
        && counts.pages > 0
        && counts.page_groups > 0)
}

/// Filter pages to active pages of stored newspapers and fill in the
/// computed flags
fn prepare_pages(all_pages: &[Page], newspapers: &[Newspaper]) -> Vec<Page> {
    let newspaper_ids: HashSet<i64> = newspapers.iter().map(|n| n.id).collect();

    let active_parents: HashSet<i64> = all_pages
        .iter()
        .filter(|p| p.active)
        .map(|p| p.parent_page_id)
        .collect();

    all_pages
        .iter()
        .filter(|p| p.active && newspaper_ids.contains(&p.newspaper_id))
        .map(|p| {
            let mut page = p.clone();
            page.has_data = page.link_format.is_some();
            page.has_child = page.is_top_level() && active_parents.contains(&page.id);
            page
        })
        .collect()
}

fn sorted_values<T: Clone>(map: &Option<HashMap<String, T>>, key: impl Fn(&T) -> i64) -> Vec<T> {
    let mut values: Vec<T> = map
        .as_ref()
        .map(|m| m.values().cloned().collect())
        .unwrap_or_default();
    values.sort_by_key(|v| key(v));
    values
}
