use derive_deref::Deref;
use postgres::types::ToSql;

use crate::error::Error;

// --------------------------------------------------------------------------------------------------------------------
// Query execution
// --------------------------------------------------------------------------------------------------------------------

/// Blocking access to the catalog. Every selected column is expected to be text.
pub trait Executor {
    /// Run a query with positional text parameters and fetch every row
    fn execute(&mut self, sql: &str, params: &[String]) -> Result<Vec<Row>, Error>;

    /// Run a parameterless query that yields exactly one row
    fn query_one(&mut self, sql: &str) -> Result<Row, Error>;
}

/// One result row, each column as nullable text
#[derive(Debug, Clone, PartialEq, Deref)]
pub struct Row(Vec<Option<String>>);

impl Row {
    pub fn new(columns: Vec<Option<String>>) -> Self {
        Row(columns)
    }

    /// Non-null text column
    pub fn text(&self, column: usize) -> Result<&str, Error> {
        self.opt_text(column)?.ok_or(Error::Scan(column, "unexpected NULL"))
    }

    /// Nullable text column
    pub fn opt_text(&self, column: usize) -> Result<Option<&str>, Error> {
        match self.0.get(column) {
            Some(value) => Ok(value.as_deref()),
            None => Err(Error::Scan(column, "column out of range")),
        }
    }
}

impl<S: Into<String>> From<Vec<Option<S>>> for Row {
    fn from(columns: Vec<Option<S>>) -> Self {
        Row(columns.into_iter().map(|c| c.map(Into::into)).collect())
    }
}

// --------------------------------------------------------------------------------------------------------------------
// PostgreSQL
// --------------------------------------------------------------------------------------------------------------------

impl Executor for postgres::Client {
    fn execute(&mut self, sql: &str, params: &[String]) -> Result<Vec<Row>, Error> {
        let params: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        postgres::Client::query(self, sql, &params)?
            .iter()
            .map(scan_row)
            .collect()
    }

    fn query_one(&mut self, sql: &str) -> Result<Row, Error> {
        match postgres::Client::query(self, sql, &[])?.first() {
            Some(row) => scan_row(row),
            None => Err(Error::NoRows(sql.to_string())),
        }
    }
}

fn scan_row(row: &postgres::Row) -> Result<Row, Error> {
    let columns = (0..row.len())
        .map(|i| row.try_get::<_, Option<String>>(i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Row(columns))
}
