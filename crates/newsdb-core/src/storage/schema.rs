//! SQLite schema
//!
//! Every table is described explicitly by a [`TableDef`]: its columns,
//! column types, foreign keys and indexes. The DDL handed to SQLite is
//! generated from these descriptions when the database is opened.

use rusqlite::{params, Connection, OptionalExtension, Result};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Key/value table for schema version and other store metadata
pub const META_TABLE: &str = "meta";

/// Storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    /// Stored as INTEGER 0/1
    Boolean,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }
}

/// A single column
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub autoincrement: bool,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            primary_key: false,
            autoincrement: false,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    pub const fn autoincrement(self) -> Self {
        Self {
            primary_key: true,
            autoincrement: true,
            ..self
        }
    }

    fn definition(&self) -> String {
        let mut def = format!("{} {}", self.name, self.ty.sql());
        if self.primary_key {
            def.push_str(" PRIMARY KEY");
            if self.autoincrement {
                def.push_str(" AUTOINCREMENT");
            }
        } else if !self.nullable {
            def.push_str(" NOT NULL");
        }
        def
    }
}

/// A reference from a child column to a parent table's column
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
    pub on_delete_cascade: bool,
}

impl ForeignKey {
    pub const fn new(
        column: &'static str,
        parent_table: &'static str,
        parent_column: &'static str,
    ) -> Self {
        Self {
            column,
            parent_table,
            parent_column,
            on_delete_cascade: false,
        }
    }

    pub const fn cascade(self) -> Self {
        Self {
            on_delete_cascade: true,
            ..self
        }
    }

    fn definition(&self) -> String {
        let mut def = format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            self.column, self.parent_table, self.parent_column
        );
        if self.on_delete_cascade {
            def.push_str(" ON DELETE CASCADE");
        }
        def
    }
}

/// Description of one table
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
    /// Columns that get a single-column index
    pub indices: &'static [&'static str],
}

impl TableDef {
    /// `CREATE TABLE` statement for this table
    pub fn create_table_sql(&self) -> String {
        let body = self
            .columns
            .iter()
            .map(Column::definition)
            .chain(self.foreign_keys.iter().map(ForeignKey::definition))
            .collect::<Vec<_>>()
            .join(",\n    ");
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
            self.name, body
        )
    }

    /// `CREATE INDEX` statements for this table
    pub fn create_index_sql(&self) -> Vec<String> {
        self.indices
            .iter()
            .map(|column| {
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column});",
                    table = self.name,
                    column = column
                )
            })
            .collect()
    }

    /// Comma separated column list, in declaration order
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub const COUNTRIES: TableDef = TableDef {
    name: "countries",
    columns: &[
        Column::integer("id").primary_key(),
        Column::text("name"),
        Column::text("country_code"),
        Column::text("time_zone"),
    ],
    foreign_keys: &[],
    indices: &[],
};

pub const LANGUAGES: TableDef = TableDef {
    name: "languages",
    columns: &[Column::integer("id").primary_key(), Column::text("name")],
    foreign_keys: &[],
    indices: &[],
};

pub const NEWSPAPERS: TableDef = TableDef {
    name: "newspapers",
    columns: &[
        Column::integer("id").primary_key(),
        Column::text("name"),
        Column::integer("country_id"),
        Column::integer("language_id"),
        Column::boolean("active"),
    ],
    foreign_keys: &[
        ForeignKey::new("country_id", "countries", "id"),
        ForeignKey::new("language_id", "languages", "id"),
    ],
    indices: &["country_id", "language_id"],
};

pub const PAGES: TableDef = TableDef {
    name: "pages",
    columns: &[
        Column::integer("id").primary_key(),
        Column::integer("newspaper_id"),
        Column::integer("parent_page_id"),
        Column::text("name"),
        Column::boolean("has_child"),
        Column::boolean("has_data"),
    ],
    foreign_keys: &[ForeignKey::new("newspaper_id", "newspapers", "id")],
    indices: &["newspaper_id", "parent_page_id"],
};

pub const PAGE_GROUPS: TableDef = TableDef {
    name: "page_groups",
    columns: &[
        Column::text("name").primary_key(),
        Column::boolean("active"),
        // IntListConverter
        Column::text("page_list"),
    ],
    foreign_keys: &[],
    indices: &[],
};

pub const ARTICLES: TableDef = TableDef {
    name: "articles",
    columns: &[
        Column::text("id").primary_key(),
        Column::integer("page_id"),
        Column::integer("newspaper_id"),
        Column::text("title"),
        // DateConverter
        Column::integer("modification_time").nullable(),
        Column::integer("publication_time").nullable(),
        Column::text("article_text").nullable(),
        // ImageLinkListConverter
        Column::text("image_links"),
        Column::text("preview_image_link").nullable(),
    ],
    foreign_keys: &[
        ForeignKey::new("page_id", "pages", "id"),
        ForeignKey::new("newspaper_id", "newspapers", "id"),
    ],
    indices: &["page_id", "newspaper_id"],
};

pub const USER_PREFERENCE_DATA: TableDef = TableDef {
    name: "user_preference_data",
    columns: &[
        Column::integer("id").primary_key(),
        Column::text("favourite_page_ids"),
        Column::text("inactive_newspaper_ids"),
        // IntDataListConverter
        Column::text("page_read_counts"),
        Column::integer("last_modified"),
    ],
    foreign_keys: &[],
    indices: &[],
};

pub const ARTICLE_VISIT_HISTORY: TableDef = TableDef {
    name: "article_visit_history",
    columns: &[
        Column::integer("id").autoincrement(),
        Column::text("article_id"),
        Column::integer("visit_time"),
    ],
    foreign_keys: &[ForeignKey::new("article_id", "articles", "id").cascade()],
    indices: &["article_id"],
};

/// Every persisted table, parents before children
pub const TABLES: &[TableDef] = &[
    COUNTRIES,
    LANGUAGES,
    NEWSPAPERS,
    PAGES,
    PAGE_GROUPS,
    ARTICLES,
    USER_PREFERENCE_DATA,
    ARTICLE_VISIT_HISTORY,
];

/// Full DDL for the store, generated from [`TABLES`]
pub fn schema_sql() -> String {
    let mut statements = vec![format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    key TEXT PRIMARY KEY,\n    value TEXT NOT NULL\n);",
        META_TABLE
    )];
    for table in TABLES {
        statements.push(table.create_table_sql());
        statements.extend(table.create_index_sql());
    }
    statements.join("\n")
}

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(&schema_sql())?;
    set_meta(conn, "version", &SCHEMA_VERSION.to_string())?;
    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    Ok(get_meta(conn, "version")?.and_then(|v| v.parse().ok()))
}

/// Check if schema needs initialization
pub fn needs_init(conn: &Connection) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1")
        .and_then(|mut stmt| stmt.exists([META_TABLE]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

/// Read a metadata value
pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        &format!("SELECT value FROM {} WHERE key = ?1", META_TABLE),
        params![key],
        |row| row.get(0),
    )
    .optional()
}

/// Write a metadata value
pub fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            META_TABLE
        ),
        params![key, value],
    )?;
    Ok(())
}
