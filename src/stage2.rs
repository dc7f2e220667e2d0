use std::collections::HashSet;

use heck::SnakeCase;

use crate::config::Logger;
use crate::mapping;
use crate::signature::{self, ParsedField};
use crate::stage1::Catalog;
use crate::types::*;

// Identifiers that have to be written as raw identifiers in the generated code
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn", "else", "enum",
    "extern", "false", "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut",
    "override", "priv", "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

// Path keywords, `r#` is not allowed on these
const PATH_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

// --------------------------------------------------------------------------------------------------------------------
// Public functions
// --------------------------------------------------------------------------------------------------------------------

/// Turn the raw catalog into the model to be rendered, logging everything that is left out
pub fn run(catalog: Catalog, dialect: Dialect, logger: &dyn Logger) -> Model {
    let tables = catalog
        .tables
        .iter()
        .map(|(_, raw)| populate_table(raw, catalog.tables.is_duplicate(&raw.name), dialect, logger))
        .collect();

    let mut functions = Vec::new();
    for (_, overloads) in catalog.functions.iter() {
        for (i, raw) in overloads.iter().enumerate() {
            let is_duplicate = catalog.functions.is_duplicate(&raw.name);
            let overload = if overloads.len() > 1 { Some(i + 1) } else { None };
            match populate_function(raw, is_duplicate, overload) {
                Ok(function) => functions.push(function),
                Err(reason) => logger.log(&reason),
            }
        }
    }

    Model { tables, functions }
}

/// Name a table and resolve its columns.
/// Columns with an unknown type or a case-sensitive name are dropped.
pub fn populate_table(raw: &RawTable, is_duplicate: bool, dialect: Dialect, logger: &dyn Logger) -> Table {
    let constructor = gen_constructor_name(&raw.schema, &raw.name, is_duplicate);
    let prefix = if raw.is_view() { "VIEW_" } else { "TABLE_" };

    let mut fields = Vec::new();
    for column in &raw.columns {
        if column.name != column.name.to_lowercase() {
            logger.logf(format_args!(
                "Skipping column {}.{}.{}: case-sensitive identifiers are not supported",
                raw.schema, raw.name, column.name
            ));
            continue;
        }
        match mapping::resolve(dialect, &column.data_type, column.exact_type.as_deref()) {
            Some(kind) => fields.push(gen_field(&column.name, kind)),
            None => logger.logf(format_args!(
                "Skipping column {}.{}.{}: unsupported type '{}'",
                raw.schema,
                raw.name,
                column.name,
                column.exact_type.as_deref().unwrap_or(&column.data_type)
            )),
        }
    }

    Table {
        schema: raw.schema.clone(),
        name: raw.name.clone(),
        is_view: raw.is_view(),
        struct_name: format!("{}{}", prefix, constructor),
        constructor,
        fields,
    }
}

/// Name a function signature and parse its arguments and results.
/// `overload` is the 1-based position among signatures sharing the same qualified name, if there are several.
pub fn populate_function(raw: &RawFunction, is_duplicate: bool, overload: Option<usize>) -> Result<Function, String> {
    let skip = |e: signature::Rejection| {
        format!(
            "Skipping function {}.{}({}) -> {}: {}",
            raw.schema, raw.name, raw.arguments, raw.result, e
        )
    };
    let arguments = signature::parse_arguments(&raw.arguments).map_err(skip)?;
    let results = signature::parse_result(&raw.result).map_err(skip)?;

    let mut constructor = gen_constructor_name(&raw.schema, &raw.name, is_duplicate);
    if let Some(n) = overload {
        constructor = format!("{}{}", constructor, n);
    }

    Ok(Function {
        schema: raw.schema.clone(),
        name: raw.name.clone(),
        signature: raw.arguments.clone(),
        struct_name: format!("FUNCTION_{}", constructor),
        constructor,
        arguments: dedupe(arguments.into_iter().map(gen_argument).collect::<Vec<_>>(), |a| &mut a.ident),
        results: dedupe(
            results.into_iter().map(|r| gen_field(&r.name, r.kind)).collect::<Vec<_>>(),
            |r| &mut r.ident,
        ),
    })
}

/// Exported form of a catalog name: uppercase, spaces turned into underscores
pub fn gen_ident(name: &str) -> String {
    name.to_uppercase().replace(' ', "_")
}

// --------------------------------------------------------------------------------------------------------------------
// Private functions
// --------------------------------------------------------------------------------------------------------------------

/// Names colliding across schemas get the schema as a prefix
fn gen_constructor_name(schema: &str, name: &str, is_duplicate: bool) -> String {
    if is_duplicate {
        format!("{}__{}", gen_ident(schema), gen_ident(name))
    } else {
        gen_ident(name)
    }
}

fn gen_field(name: &str, kind: Kind) -> Field {
    Field {
        name: name.to_string(),
        ident: gen_ident(name),
        kind,
        constructor: kind.constructor().to_string(),
    }
}

/// Constructor arguments follow Rust naming, names that already do are kept as they are
fn gen_argument(parsed: ParsedField) -> Argument {
    let mut ident = if is_snake_case(&parsed.name) {
        parsed.name.clone()
    } else {
        parsed.name.to_snake_case()
    };
    if RUST_KEYWORDS.contains(&ident.as_str()) {
        ident = format!("r#{}", ident);
    } else if PATH_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    Argument {
        name: parsed.name,
        ident,
        kind: parsed.kind,
        rs_type: parsed.rs_type,
    }
}

fn is_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_lowercase())
        && chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Suffix `_2`, `_3`, ... to identifiers already taken within the same item
fn dedupe<T>(mut items: Vec<T>, ident_of: impl Fn(&mut T) -> &mut String) -> Vec<T> {
    let mut taken = HashSet::new();
    for item in &mut items {
        let ident = ident_of(item);
        let mut candidate = ident.clone();
        let mut n = 2;
        while !taken.insert(candidate.clone()) {
            candidate = format!("{}_{}", ident, n);
            n += 1;
        }
        *ident = candidate;
    }
    items
}
