//! Newspaper command handlers

use anyhow::{Context, Result};

use newsdb_core::{NewsDatabase, Newspaper};

use crate::output::Output;

/// Filters accepted by `newspapers`
#[derive(Debug, Default, Clone, Copy)]
pub struct NewspaperFilter {
    /// Include inactive newspapers
    pub all: bool,
    pub country_id: Option<i64>,
    pub language_id: Option<i64>,
}

impl NewspaperFilter {
    fn matches(&self, paper: &Newspaper) -> bool {
        (self.all || paper.active)
            && self.country_id.map_or(true, |id| paper.country_id == id)
            && self.language_id.map_or(true, |id| paper.language_id == id)
    }
}

/// List newspapers, active ones only unless `filter.all` is set
pub fn list(db: &NewsDatabase, filter: NewspaperFilter, output: &Output) -> Result<()> {
    let dao = db.newspaper_dao();

    // Narrow in SQL where possible, the rest is filtered in memory
    let newspapers = match (filter.country_id, filter.language_id) {
        (Some(country_id), _) => dao.find_by_country(country_id),
        (None, Some(language_id)) => dao.find_by_language(language_id),
        (None, None) if filter.all => dao.find_all(),
        (None, None) => dao.find_active(),
    }
    .context("Failed to load newspapers")?;

    let newspapers: Vec<Newspaper> = newspapers
        .into_iter()
        .filter(|paper| filter.matches(paper))
        .collect();

    output.print_newspapers(&newspapers);
    Ok(())
}
