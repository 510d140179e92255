//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{TimeZone, Utc};
use serde::Serialize;

use newsdb_core::{Country, Language, LoadSummary, Newspaper, Page, PageGroup};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// A top-level page with its children, as printed by `pages`
#[derive(Debug, Serialize)]
pub struct PageTree {
    #[serde(flatten)]
    pub page: Page,
    pub children: Vec<Page>,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a list of countries
    pub fn print_countries(&self, countries: &[Country]) {
        match self.format {
            OutputFormat::Human => {
                if countries.is_empty() {
                    println!("No countries found.");
                    return;
                }
                for country in countries {
                    println!(
                        "{:>4} | {:<3} | {} | {}",
                        country.id,
                        country.country_code,
                        truncate(&country.name, 30),
                        country.time_zone
                    );
                }
                let count = countries.len();
                println!("\n{} countr{}", count, plural(count, "y", "ies"));
            }
            OutputFormat::Json => print_json(&countries),
            OutputFormat::Quiet => {
                for country in countries {
                    println!("{}", country.id);
                }
            }
        }
    }

    /// Print a list of languages
    pub fn print_languages(&self, languages: &[Language]) {
        match self.format {
            OutputFormat::Human => {
                if languages.is_empty() {
                    println!("No languages found.");
                    return;
                }
                for language in languages {
                    println!("{:>4} | {}", language.id, language.name);
                }
                println!("\n{} language(s)", languages.len());
            }
            OutputFormat::Json => print_json(&languages),
            OutputFormat::Quiet => {
                for language in languages {
                    println!("{}", language.id);
                }
            }
        }
    }

    /// Print a list of newspapers
    pub fn print_newspapers(&self, newspapers: &[Newspaper]) {
        match self.format {
            OutputFormat::Human => {
                if newspapers.is_empty() {
                    println!("No newspapers found.");
                    return;
                }
                for paper in newspapers {
                    let status = if paper.active { "" } else { " [inactive]" };
                    println!(
                        "{:>4} | {}{} | country {} | language {}",
                        paper.id,
                        truncate(&paper.name, 35),
                        status,
                        paper.country_id,
                        paper.language_id
                    );
                }
                println!("\n{} newspaper(s)", newspapers.len());
            }
            OutputFormat::Json => print_json(&newspapers),
            OutputFormat::Quiet => {
                for paper in newspapers {
                    println!("{}", paper.id);
                }
            }
        }
    }

    /// Print top-level pages with their children indented below
    pub fn print_page_trees(&self, trees: &[PageTree]) {
        match self.format {
            OutputFormat::Human => {
                if trees.is_empty() {
                    println!("No pages found.");
                    return;
                }
                for tree in trees {
                    let page = &tree.page;
                    println!("{:>5} | {}{}", page.id, page.name, data_marker(page));
                    for child in &tree.children {
                        println!("{:>5} |   {}{}", child.id, child.name, data_marker(child));
                    }
                }
                let total: usize = trees.iter().map(|t| 1 + t.children.len()).sum();
                println!("\n{} page(s)", total);
            }
            OutputFormat::Json => print_json(&trees),
            OutputFormat::Quiet => {
                for tree in trees {
                    println!("{}", tree.page.id);
                    for child in &tree.children {
                        println!("{}", child.id);
                    }
                }
            }
        }
    }

    /// Print a flat list of pages
    pub fn print_pages(&self, pages: &[Page]) {
        match self.format {
            OutputFormat::Human => {
                if pages.is_empty() {
                    println!("No pages found.");
                    return;
                }
                for page in pages {
                    println!(
                        "{:>5} | {}{} | newspaper {}",
                        page.id,
                        truncate(&page.name, 35),
                        data_marker(page),
                        page.newspaper_id
                    );
                }
                println!("\n{} page(s)", pages.len());
            }
            OutputFormat::Json => print_json(&pages),
            OutputFormat::Quiet => {
                for page in pages {
                    println!("{}", page.id);
                }
            }
        }
    }

    /// Print a list of page groups
    pub fn print_page_groups(&self, groups: &[PageGroup]) {
        match self.format {
            OutputFormat::Human => {
                if groups.is_empty() {
                    println!("No page groups found.");
                    return;
                }
                for group in groups {
                    let status = if group.active { "" } else { " [inactive]" };
                    println!(
                        "{}{} ({} page{})",
                        group.name,
                        status,
                        group.page_list.len(),
                        plural(group.page_list.len(), "", "s")
                    );
                }
                println!("\n{} group(s)", groups.len());
            }
            OutputFormat::Json => print_json(&groups),
            OutputFormat::Quiet => {
                for group in groups {
                    println!("{}", group.name);
                }
            }
        }
    }

    /// Print what a settings import wrote
    pub fn print_load_summary(&self, summary: &LoadSummary) {
        match self.format {
            OutputFormat::Human => {
                println!("✓ Imported app settings");
                println!("  Languages:   {}", summary.languages);
                println!("  Countries:   {}", summary.countries);
                println!("  Newspapers:  {}", summary.newspapers);
                println!("  Pages:       {}", summary.pages);
                println!("  Page groups: {}", summary.page_groups);
                if let Some(time) = summary.update_time {
                    println!("  Updated at:  {}", format_millis(time));
                }
            }
            OutputFormat::Json => print_json(summary),
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Format epoch millis as a UTC timestamp, falling back to the raw number
pub fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn data_marker(page: &Page) -> &'static str {
    if page.has_data {
        ""
    } else {
        " (no feed)"
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Truncate a string to max chars, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
