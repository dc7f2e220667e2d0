use std::fmt;
use std::path::Path;

use crate::error::Error;
use crate::types::Dialect;

// --------------------------------------------------------------------------------------------------------------------
// Generation settings
// --------------------------------------------------------------------------------------------------------------------

/// What to read from the catalog, and how to render it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub dialect: Dialect,
    pub schemas: Vec<String>,
    pub exclude: Vec<String>,
    pub functions: bool,
    pub prelude: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            schemas: vec!["public".to_string()],
            exclude: Vec::new(),
            functions: true,
            prelude: "sqlbind::prelude".to_string(),
        }
    }
}

impl Config {
    /// Read the settings from a RON file, missing keys take their default value
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, Error> {
        Ok(ron::from_str(text)?)
    }
}

// --------------------------------------------------------------------------------------------------------------------
// Diagnostics
// --------------------------------------------------------------------------------------------------------------------

/// Sink for skip and omission notices. Fatal errors never go through here.
pub trait Logger {
    fn logf(&self, args: fmt::Arguments<'_>);
    fn log(&self, message: &str);
}

/// Forwards every notice to `tracing` at warning level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn logf(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(target: "catalog_bindgen", "{}", args);
    }

    fn log(&self, message: &str) {
        tracing::warn!(target: "catalog_bindgen", "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_keys_use_defaults() {
        let config = Config::from_ron("(schemas: [\"public\", \"geo\"])").unwrap();
        assert_eq!(config.schemas, vec!["public", "geo"]);
        assert_eq!(config.dialect, Dialect::Postgres);
        assert!(config.exclude.is_empty());
        assert!(config.functions);
        assert_eq!(config.prelude, "sqlbind::prelude");
    }

    #[test]
    fn reads_a_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "(dialect: mysql, schemas: [\"shop\"], exclude: [\"Migrations\"], functions: false, prelude: \"crate::sql\")"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.dialect, Dialect::Mysql);
        assert_eq!(config.schemas, vec!["shop"]);
        assert_eq!(config.exclude, vec!["Migrations"]);
        assert!(!config.functions);
        assert_eq!(config.prelude, "crate::sql");
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(matches!(Config::from_ron("(schemas: 3)"), Err(Error::Config(_))));
    }
}
