use crate::transpiler::traits::SqlGenerator;

/// SQL Server Generator: `[name]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerGenerator;

impl SqlGenerator for SqlServerGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }
}
