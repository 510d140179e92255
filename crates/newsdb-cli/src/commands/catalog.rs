//! Country and language command handlers

use anyhow::{Context, Result};

use newsdb_core::NewsDatabase;

use crate::output::Output;

/// List all countries
pub fn countries(db: &NewsDatabase, output: &Output) -> Result<()> {
    let countries = db
        .country_dao()
        .find_all()
        .context("Failed to load countries")?;
    output.print_countries(&countries);
    Ok(())
}

/// List all languages
pub fn languages(db: &NewsDatabase, output: &Output) -> Result<()> {
    let languages = db
        .language_dao()
        .find_all()
        .context("Failed to load languages")?;
    output.print_languages(&languages);
    Ok(())
}
