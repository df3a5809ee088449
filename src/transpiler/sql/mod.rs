//! Identifier and string formatting per backend.

pub mod ansi;
pub mod mysql;
pub mod plain;
pub mod sqlserver;
