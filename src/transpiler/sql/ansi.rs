use crate::transpiler::traits::SqlGenerator;

/// Standard SQL: `"name"`. Used by Postgres and SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiGenerator;

impl SqlGenerator for AnsiGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
