use crate::transpiler::traits::SqlGenerator;

/// No identifier delimiters at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainGenerator;

impl SqlGenerator for PlainGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        name.to_string()
    }
}
