//! Import command handler

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use newsdb_core::settings::{self, AppSettings};
use newsdb_core::NewsDatabase;

use crate::output::Output;

/// Load an app settings snapshot from a JSON file
///
/// With `if_newer`, a snapshot that is not newer than the loaded one is
/// skipped.
pub fn import(db: &NewsDatabase, file: &Path, if_newer: bool, output: &Output) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read settings file: {:?}", file))?;
    let app_settings = AppSettings::from_json(&json)
        .with_context(|| format!("Invalid settings file: {:?}", file))?;

    if if_newer && !is_newer(db, &app_settings)? {
        info!("Skipping import of {:?}, settings are up to date", file);
        output.message("Settings are already up to date.");
        return Ok(());
    }

    let summary = settings::load_app_settings(db, &app_settings)?;
    output.print_load_summary(&summary);
    Ok(())
}

/// Whether the snapshot is newer than the loaded settings
///
/// A snapshot without an update time never counts as newer.
fn is_newer(db: &NewsDatabase, app_settings: &AppSettings) -> Result<bool> {
    match app_settings.latest_update_time() {
        Some(server_time) => settings::is_app_settings_updated(db, server_time),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    const SNAPSHOT: &str = r#"
    {
        "languages": { "l1": { "id": 1, "name": "English" } },
        "countries": { "c1": { "id": 1, "name": "UK", "countryCode": "GB", "timeZone": "Europe/London" } },
        "newspapers": { "n1": { "id": 1, "name": "Times", "countryId": 1, "languageId": 1, "isActive": true } },
        "update_time": { "t": 2000 }
    }
    "#;

    fn write_snapshot(dir: &tempfile::TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("settings.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_import_if_newer_skips_stale_snapshot() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = write_snapshot(&temp_dir, SNAPSHOT);
        let db = NewsDatabase::open_in_memory().unwrap();
        let output = Output::new(OutputFormat::Quiet);

        import(&db, &path, true, &output).unwrap();
        assert_eq!(db.newspaper_dao().count().unwrap(), 1);

        // Same update time: nothing is written
        db.newspaper_dao().set_active(1, false).unwrap();
        import(&db, &path, true, &output).unwrap();
        assert!(!db.newspaper_dao().find_by_id(1).unwrap().unwrap().active);

        // Without the flag the snapshot is always loaded
        import(&db, &path, false, &output).unwrap();
        assert!(db.newspaper_dao().find_by_id(1).unwrap().unwrap().active);
    }

    #[test]
    fn test_is_newer_without_update_time() {
        let db = NewsDatabase::open_in_memory().unwrap();
        assert!(!is_newer(&db, &AppSettings::default()).unwrap());

        let settings = AppSettings::from_json(SNAPSHOT).unwrap();
        assert!(is_newer(&db, &settings).unwrap());
    }

    #[test]
    fn test_import_rejects_invalid_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = write_snapshot(&temp_dir, "{ not json");
        let db = NewsDatabase::open_in_memory().unwrap();
        let output = Output::new(OutputFormat::Quiet);

        assert!(import(&db, &path, false, &output).is_err());
        let missing = temp_dir.path().join("missing.json");
        assert!(import(&db, &missing, false, &output).is_err());
    }
}
