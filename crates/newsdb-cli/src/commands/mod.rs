//! Command handlers

pub mod catalog;
pub mod config;
pub mod import;
pub mod newspaper;
pub mod page;
pub mod status;
