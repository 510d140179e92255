//! Storage layer
//!
//! Schema description, column converters and storage errors shared by the
//! database handle and the table accessors.

pub mod converters;
pub mod error;
pub mod schema;

pub use converters::{
    ColumnConverter, ConversionError, DateConverter, ImageLinkListConverter, IntDataListConverter,
    IntListConverter,
};
pub use error::{StorageError, StorageResult};
pub use schema::{init_schema, needs_init, TableDef, SCHEMA_VERSION, TABLES};
