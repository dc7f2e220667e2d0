use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Dialect;

/// Schema that sorts before every other one in PostgreSQL listings
pub const DEFAULT_SCHEMA: &str = "public";

/// Introspection query with its positional parameters, `[schemas..., excluded...]`
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub sql: String,
    pub params: Vec<String>,
}

// --------------------------------------------------------------------------------------------------------------------
// Public functions
// --------------------------------------------------------------------------------------------------------------------

/// One row per column of every table and view in `schemas`, except the `exclude`d ones
pub fn tables(dialect: Dialect, schemas: &[String], exclude: &[String]) -> CatalogQuery {
    let mut builder = Builder::new(schemas, exclude);
    match dialect {
        Dialect::Postgres => {
            builder.select(include_str!("resources/postgres_tables.sql"));
            builder.filter_schemas("c.table_schema::text");
            builder.filter_excluded("lower(c.table_name::text)");
            builder.finish(&[
                format!("c.table_schema::text <> '{}'", DEFAULT_SCHEMA).as_str(),
                "c.table_schema",
                "t.table_type",
                "c.table_name",
                "c.column_name",
            ])
        }
        Dialect::Mysql => {
            builder.select(include_str!("resources/mysql_tables.sql"));
            builder.filter_schemas("t.TABLE_SCHEMA");
            builder.filter_excluded("LOWER(t.TABLE_NAME)");
            let query = builder.finish(&["t.TABLE_SCHEMA", "t.TABLE_TYPE", "t.TABLE_NAME", "c.COLUMN_NAME"]);
            CatalogQuery {
                sql: rewrite_placeholders(&query.sql),
                params: query.params,
            }
        }
    }
}

/// One row per plain function signature in `schemas`, overloads included.
///
/// `prokind` only exists since PostgreSQL 11, older servers need the three legacy columns
/// to leave out aggregates, window functions and procedures.
pub fn functions(schemas: &[String], exclude: &[String], has_prokind: bool) -> CatalogQuery {
    let mut builder = Builder::new(schemas, exclude);
    builder.select(include_str!("resources/postgres_functions.sql"));
    builder.filter_schemas("n.nspname::text");
    if has_prokind {
        builder.filter("p.prokind = 'f'");
    } else {
        builder.filter("NOT p.proisagg AND NOT p.proiswindow AND p.prorettype <> 0");
    }
    builder.filter_excluded("lower(p.proname::text)");
    builder.finish(&[
        format!("n.nspname::text <> '{}'", DEFAULT_SCHEMA).as_str(),
        "n.nspname",
        "p.proname",
        "pg_catalog.pg_get_function_identity_arguments(p.oid)",
    ])
}

/// Query that reports the server version as text
pub fn server_version() -> &'static str {
    "SHOW server_version"
}

/// `$first, $first+1, ...`, or `NULL` for an empty list so the query stays valid
pub fn placeholders(first: usize, count: usize) -> String {
    if count == 0 {
        return "NULL".to_string();
    }
    (first..first + count).map(|n| format!("${}", n)).join(", ")
}

/// Turn numbered placeholders (`$1`) into positional markers (`?`)
pub fn rewrite_placeholders(sql: &str) -> String {
    static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\d+").unwrap());
    NUMBERED.replace_all(sql, "?").into_owned()
}

// --------------------------------------------------------------------------------------------------------------------
// Private stuff
// --------------------------------------------------------------------------------------------------------------------

struct Builder<'a> {
    schemas: &'a [String],
    exclude: &'a [String],
    sql: String,
    filters: Vec<String>,
}

impl<'a> Builder<'a> {
    fn new(schemas: &'a [String], exclude: &'a [String]) -> Self {
        Self {
            schemas,
            exclude,
            sql: String::new(),
            filters: Vec::new(),
        }
    }

    fn select(&mut self, base: &str) {
        self.sql = base.trim_end().to_string();
    }

    fn filter(&mut self, predicate: &str) {
        self.filters.push(predicate.to_string());
    }

    fn filter_schemas(&mut self, column: &str) {
        self.filter(&format!("{} IN ({})", column, placeholders(1, self.schemas.len())));
    }

    fn filter_excluded(&mut self, column: &str) {
        if !self.exclude.is_empty() {
            let first = self.schemas.len() + 1;
            self.filter(&format!("{} NOT IN ({})", column, placeholders(first, self.exclude.len())));
        }
    }

    /// Append the filters and the ordering, and bind the parameters
    fn finish(mut self, order: &[&str]) -> CatalogQuery {
        if !self.filters.is_empty() {
            self.sql.push_str("\nWHERE ");
            self.sql.push_str(&self.filters.join("\n  AND "));
        }
        self.sql.push_str("\nORDER BY ");
        self.sql.push_str(&order.join(", "));

        let params = self
            .schemas
            .iter()
            .cloned()
            .chain(self.exclude.iter().map(|name| name.to_lowercase()))
            .collect();
        CatalogQuery { sql: self.sql, params }
    }
}
