/// Backend-specific text formatting.
///
/// Only identifiers and string literals vary between backends; numbers,
/// `NULL` and booleans (`1`/`0`) are rendered the same everywhere.
pub trait SqlGenerator: Send + Sync {
    /// Quote a single identifier segment.
    fn quote_identifier(&self, name: &str) -> String;

    /// Render a string literal with internal quotes escaped.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Quote a possibly dotted name (`Model.field`) one segment at a time.
/// A `*` segment is left alone.
pub fn quote_name(generator: &dyn SqlGenerator, name: &str) -> String {
    name.split('.')
        .map(|part| {
            if part == "*" {
                part.to_string()
            } else {
                generator.quote_identifier(part)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// True for `name` or `a.b.c` made of word characters only, i.e. something
/// that is safe to quote. Anything else is treated as an expression.
pub fn is_identifier_path(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_')
        })
}
