//! Status command handler

use anyhow::{Context, Result};

use newsdb_core::settings;
use newsdb_core::NewsDatabase;

use crate::output::{format_millis, Output, OutputFormat};

/// Show database location, table sizes and settings state
pub fn show(db: &NewsDatabase, output: &Output) -> Result<()> {
    let counts = db.table_counts().context("Failed to count tables")?;
    let updated_at = settings::local_update_time(db)?;
    let loaded = settings::is_settings_data_loaded(db)?;
    let location = db
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "database": location,
                    "settings_loaded": loaded,
                    "settings_updated_at": updated_at,
                    "counts": counts
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", location);
        }
        OutputFormat::Human => {
            println!("newsdb Status");
            println!("=============");
            println!();
            println!("Database: {}", location);
            println!();
            println!("Settings:");
            println!("  Loaded:  {}", if loaded { "yes" } else { "no" });
            println!(
                "  Updated: {}",
                updated_at
                    .map(format_millis)
                    .unwrap_or_else(|| "never".to_string())
            );
            println!();
            println!("Contents:");
            println!("  Countries:        {}", counts.countries);
            println!("  Languages:        {}", counts.languages);
            println!("  Newspapers:       {}", counts.newspapers);
            println!("  Pages:            {}", counts.pages);
            println!("  Page groups:      {}", counts.page_groups);
            println!("  Articles:         {}", counts.articles);
            println!("  User preferences: {}", counts.user_preferences);
            println!("  Article visits:   {}", counts.article_visits);
        }
    }

    Ok(())
}
