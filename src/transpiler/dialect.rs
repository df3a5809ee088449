use std::str::FromStr;

use serde::Deserialize;

use crate::error::RelqError;
use crate::transpiler::sql::ansi::AnsiGenerator;
use crate::transpiler::sql::mysql::MysqlGenerator;
use crate::transpiler::sql::plain::PlainGenerator;
use crate::transpiler::sql::sqlserver::SqlServerGenerator;
use crate::transpiler::traits::SqlGenerator;

/// Supported SQL Dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "postgres", alias = "sqlite")]
    Ansi,
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "mssql")]
    SqlServer,
    /// Identifiers are emitted without delimiters.
    #[serde(alias = "none")]
    Plain,
}

impl Dialect {
    pub fn generator(&self) -> Box<dyn SqlGenerator> {
        match self {
            Dialect::Ansi => Box::new(AnsiGenerator),
            Dialect::MySql => Box::new(MysqlGenerator),
            Dialect::SqlServer => Box::new(SqlServerGenerator),
            Dialect::Plain => Box::new(PlainGenerator),
        }
    }
}

impl FromStr for Dialect {
    type Err = RelqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ansi" | "postgres" | "sqlite" => Ok(Dialect::Ansi),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "plain" | "none" => Ok(Dialect::Plain),
            other => Err(RelqError::Config(format!("unknown dialect '{other}'"))),
        }
    }
}
