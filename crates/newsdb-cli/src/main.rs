//! newsdb CLI
//!
//! Command-line interface for the local news database.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use newsdb_core::{Config, NewsDatabase};

mod commands;
mod output;

use commands::newspaper::NewspaperFilter;
use output::{Output, OutputFormat};

/// Log filter used when neither NEWSDB_LOG nor the config sets one
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(name = "newsdb")]
#[command(about = "newsdb - Local newspaper catalogue database")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show database location and table counts
    Status,
    /// Load an app settings snapshot (JSON)
    Import {
        /// Path to the snapshot file
        file: PathBuf,
        /// Only load the snapshot if it is newer than the loaded settings
        #[arg(long)]
        if_newer: bool,
    },
    /// List countries
    Countries,
    /// List languages
    Languages,
    /// List newspapers (active only by default)
    #[command(alias = "ls")]
    Newspapers {
        /// Include inactive newspapers
        #[arg(short, long)]
        all: bool,
        /// Filter by country ID
        #[arg(short, long)]
        country: Option<i64>,
        /// Filter by language ID
        #[arg(short, long)]
        language: Option<i64>,
    },
    /// List the pages of a newspaper
    Pages {
        /// Newspaper ID
        newspaper_id: i64,
    },
    /// List page groups, or the pages of one group
    Groups {
        /// Group name
        name: Option<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_level, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't open the database
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let db = match NewsDatabase::get_instance(&config) {
        Ok(db) => db,
        Err(e) => {
            if let Some(hint) = e.recovery_suggestion().filter(|_| !output.is_quiet()) {
                eprintln!("{}", hint);
            }
            return Err(e).context("Failed to open database");
        }
    };
    debug!("Using database at {:?}", db.path());

    match cli.command {
        Commands::Status => commands::status::show(&db, &output),
        Commands::Import { file, if_newer } => {
            commands::import::import(&db, &file, if_newer, &output)
        }
        Commands::Countries => commands::catalog::countries(&db, &output),
        Commands::Languages => commands::catalog::languages(&db, &output),
        Commands::Newspapers {
            all,
            country,
            language,
        } => {
            let filter = NewspaperFilter {
                all,
                country_id: country,
                language_id: language,
            };
            commands::newspaper::list(&db, filter, &output)
        }
        Commands::Pages { newspaper_id } => commands::page::list(&db, newspaper_id, &output),
        Commands::Groups { name } => commands::page::groups(&db, name, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// The filter comes from NEWSDB_LOG, then the config's log_level. Logs go
/// to stderr unless the config names a log file.
fn init_logging(config: &Config) {
    let log_level = std::env::var("NEWSDB_LOG")
        .ok()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let env_filter = EnvFilter::new(filter_directive(&log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore the error if a subscriber is already installed
    match &config.log_file {
        Some(log_path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(log_file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

/// Expand a bare level into per-crate directives, pass anything else through
fn filter_directive(log_level: &str) -> String {
    if log_level.contains('=') || log_level.contains(',') {
        log_level.to_string()
    } else {
        format!("newsdb_core={},newsdb={}", log_level, log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_newspapers_filters() {
        let cli = Cli::parse_from(["newsdb", "--json", "newspapers", "--all", "--country", "3"]);
        assert!(cli.json);
        match cli.command {
            Commands::Newspapers {
                all,
                country,
                language,
            } => {
                assert!(all);
                assert_eq!(country, Some(3));
                assert_eq!(language, None);
            }
            _ => panic!("expected newspapers command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["newsdb", "status", "--quiet", "--config", "/tmp/c.toml"]);
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_parse_import_if_newer() {
        let cli = Cli::parse_from(["newsdb", "import", "settings.json", "--if-newer"]);
        match cli.command {
            Commands::Import { file, if_newer } => {
                assert_eq!(file, PathBuf::from("settings.json"));
                assert!(if_newer);
            }
            _ => panic!("expected import command"),
        }
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("debug"), "newsdb_core=debug,newsdb=debug");
        assert_eq!(filter_directive("newsdb_core=trace"), "newsdb_core=trace");
    }
}
