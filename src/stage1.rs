use std::collections::HashMap;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::config::Config;
use crate::error::Error;
use crate::executor::{Executor, Row};
use crate::query;
use crate::types::*;

/// First PostgreSQL major version with `pg_proc.prokind`
const PROKIND_SINCE: u32 = 11;

// --------------------------------------------------------------------------------------------------------------------
// Collected entities
// --------------------------------------------------------------------------------------------------------------------

/// Entities keyed by qualified name, in the order the catalog listed them
#[derive(Debug, Clone, PartialEq)]
pub struct Collected<T> {
    entries: IndexMap<String, T>,
    // Counted once per qualified name, so overloads don't count as collisions
    occurrences: HashMap<String, usize>,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            occurrences: HashMap::new(),
        }
    }
}

impl<T> Collected<T> {
    /// Get the entity for `schema.name`, creating it on first sight
    pub fn get_or_insert_with<F>(&mut self, schema: &str, name: &str, create: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        match self.entries.entry(format!("{}.{}", schema, name)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                *self.occurrences.entry(name.to_string()).or_insert(0) += 1;
                entry.insert(create())
            }
        }
    }

    /// Whether the unqualified `name` appears in more than one schema
    pub fn is_duplicate(&self, name: &str) -> bool {
        self.occurrences.get(name).map_or(false, |&n| n > 1)
    }

    /// Entities in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.entries.iter()
    }

    pub fn get(&self, qualified: &str) -> Option<&T> {
        self.entries.get(qualified)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything read from the catalog in one run
#[derive(Debug, Default)]
pub struct Catalog {
    pub tables: Collected<RawTable>,
    pub functions: Collected<Vec<RawFunction>>,
}

// --------------------------------------------------------------------------------------------------------------------
// Functions
// --------------------------------------------------------------------------------------------------------------------

/// Read every table, view and (for PostgreSQL) function definition selected by `config`
pub fn run<E: Executor>(executor: &mut E, config: &Config) -> Result<Catalog, Error> {
    let tables = collect_tables(executor, config)?;
    tracing::debug!("collected {} tables and views", tables.len());

    let functions = if config.functions && config.dialect == Dialect::Postgres {
        let has_prokind = server_has_prokind(executor)?;
        let functions = collect_functions(executor, config, has_prokind)?;
        tracing::debug!("collected {} functions", functions.len());
        functions
    } else {
        Collected::default()
    };

    Ok(Catalog { tables, functions })
}

/// Scan one row per column, grouping the columns under their table
pub fn collect_tables<E: Executor>(executor: &mut E, config: &Config) -> Result<Collected<RawTable>, Error> {
    let query = query::tables(config.dialect, &config.schemas, &config.exclude);
    let mut tables = Collected::default();
    for row in executor.execute(&query.sql, &query.params)? {
        let (table, column) = scan_column(&row)?;
        tables
            .get_or_insert_with(&table.schema, &table.name, || table.clone())
            .columns
            .push(column);
    }
    Ok(tables)
}

/// Scan one row per function signature, grouping overloads under their qualified name
pub fn collect_functions<E: Executor>(
    executor: &mut E,
    config: &Config,
    has_prokind: bool,
) -> Result<Collected<Vec<RawFunction>>, Error> {
    let query = query::functions(&config.schemas, &config.exclude, has_prokind);
    let mut functions = Collected::default();
    for row in executor.execute(&query.sql, &query.params)? {
        let function = scan_function(&row)?;
        functions
            .get_or_insert_with(&function.schema, &function.name, Vec::new)
            .push(function);
    }
    Ok(functions)
}

/// Ask the server whether `pg_proc.prokind` is available
pub fn server_has_prokind<E: Executor>(executor: &mut E) -> Result<bool, Error> {
    let row = executor.query_one(query::server_version())?;
    let major = parse_major_version(row.text(0)?)?;
    tracing::debug!("server major version {}", major);
    Ok(major >= PROKIND_SINCE)
}

/// `"14.5 (Debian 14.5-1)"` -> 14, `"9.6.24"` -> 9, `"16devel"` -> 16
pub fn parse_major_version(version: &str) -> Result<u32, Error> {
    let digits: String = version.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().map_err(|_| Error::Version(version.to_string()))
}

// --------------------------------------------------------------------------------------------------------------------
// Private stuff
// --------------------------------------------------------------------------------------------------------------------

/// Columns: schema, table, table type, column, general type, exact type
fn scan_column(row: &Row) -> Result<(RawTable, RawField), Error> {
    let table = RawTable {
        schema: row.text(0)?.to_string(),
        name: row.text(1)?.to_string(),
        table_type: row.text(2)?.to_string(),
        columns: Vec::new(),
    };
    let column = RawField {
        name: row.text(3)?.to_string(),
        data_type: row.text(4)?.to_string(),
        exact_type: row.opt_text(5)?.map(str::to_string),
    };
    Ok((table, column))
}

/// Columns: schema, name, arguments, result
fn scan_function(row: &Row) -> Result<RawFunction, Error> {
    Ok(RawFunction {
        schema: row.text(0)?.to_string(),
        name: row.text(1)?.to_string(),
        arguments: row.text(2)?.to_string(),
        result: row.text(3)?.to_string(),
    })
}
