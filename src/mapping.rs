use crate::types::{Dialect, Kind};

// --------------------------------------------------------------------------------------------------------------------
// Public functions
// --------------------------------------------------------------------------------------------------------------------

/// Resolve the kind of a column from its catalog type.
///
/// `exact_type` is the full column type with size information (MySQL `COLUMN_TYPE`);
/// it is only needed to tell a `tinyint(1)` flag from a real integer. `None` means unresolved.
pub fn resolve(dialect: Dialect, data_type: &str, exact_type: Option<&str>) -> Option<Kind> {
    let data_type = data_type.trim().to_lowercase();
    match dialect {
        Dialect::Postgres => postgres_kind(&data_type),
        Dialect::Mysql => mysql_kind(&data_type, exact_type.map(|t| t.trim().to_lowercase())),
    }
}

// --------------------------------------------------------------------------------------------------------------------
// PostgreSQL, information_schema.columns.data_type
// --------------------------------------------------------------------------------------------------------------------

fn postgres_kind(data_type: &str) -> Option<Kind> {
    let kind = match data_type {
        "boolean" | "bool" => Kind::Boolean,
        "json" | "jsonb" => Kind::Json,
        "smallint" | "integer" | "bigint" | "int2" | "int4" | "int8" | "smallserial" | "serial" | "bigserial"
        | "numeric" | "decimal" | "real" | "double precision" | "float4" | "float8" | "oid" => Kind::Number,
        "character varying" | "varchar" | "character" | "char" | "bpchar" | "text" | "name" | "citext" => Kind::String,
        "date"
        | "time"
        | "timetz"
        | "time without time zone"
        | "time with time zone"
        | "timestamp"
        | "timestamptz"
        | "timestamp without time zone"
        | "timestamp with time zone" => Kind::Time,
        "user-defined" => Kind::Enum,
        "array" => Kind::Array,
        "bytea" => Kind::Binary,
        "uuid" => Kind::Uuid,
        _ => return None,
    };
    Some(kind)
}

// --------------------------------------------------------------------------------------------------------------------
// MySQL, information_schema.COLUMNS.DATA_TYPE and COLUMN_TYPE
// --------------------------------------------------------------------------------------------------------------------

fn mysql_kind(data_type: &str, exact_type: Option<String>) -> Option<Kind> {
    // tinyint(1) is how MySQL spells BOOLEAN
    if data_type == "tinyint" && exact_type.map_or(false, |t| t.starts_with("tinyint(1)")) {
        return Some(Kind::Boolean);
    }
    if data_type.starts_with("json") {
        return Some(Kind::Json);
    }
    let kind = match data_type {
        "bool" | "boolean" => Kind::Boolean,
        "decimal" | "numeric" | "float" | "double" | "real" | "tinyint" | "smallint" | "mediumint" | "int"
        | "integer" | "bigint" | "serial" | "year" => Kind::Number,
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" => Kind::String,
        "date" | "datetime" | "timestamp" | "time" => Kind::Time,
        "enum" => Kind::Enum,
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" | "bit" => Kind::Binary,
        _ => return None,
    };
    Some(kind)
}
