use crate::transpiler::traits::SqlGenerator;

/// MySQL Generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlGenerator;

impl SqlGenerator for MysqlGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    // Backslash is an escape character in MySQL string literals unless
    // NO_BACKSLASH_ESCAPES is set.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}
