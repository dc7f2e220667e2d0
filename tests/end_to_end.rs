use std::cell::RefCell;
use std::fmt;

use catalog_bindgen::types::{Dialect, Kind};
use catalog_bindgen::{Config, Error, Executor, Logger, Row};

/// In-memory catalog answering the introspection queries with fixed rows
struct Fixture {
    version: &'static str,
    columns: Vec<Row>,
    functions: Vec<Row>,
    params: Vec<Vec<String>>,
}

impl Executor for Fixture {
    fn execute(&mut self, sql: &str, params: &[String]) -> Result<Vec<Row>, Error> {
        self.params.push(params.to_vec());
        if sql.contains("pg_proc") {
            Ok(self.functions.clone())
        } else {
            Ok(self.columns.clone())
        }
    }

    fn query_one(&mut self, sql: &str) -> Result<Row, Error> {
        assert_eq!(sql, "SHOW server_version");
        Ok(Row::from(vec![Some(self.version)]))
    }
}

/// Executor whose queries always fail
struct Offline;

impl Executor for Offline {
    fn execute(&mut self, _sql: &str, _params: &[String]) -> Result<Vec<Row>, Error> {
        Err(Error::Driver("connection refused".to_string()))
    }

    fn query_one(&mut self, _sql: &str) -> Result<Row, Error> {
        Err(Error::Driver("connection refused".to_string()))
    }
}

#[derive(Default)]
struct Recorder(RefCell<Vec<String>>);

impl Logger for Recorder {
    fn logf(&self, args: fmt::Arguments<'_>) {
        self.0.borrow_mut().push(args.to_string());
    }

    fn log(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

fn column(schema: &str, table: &str, table_type: &str, name: &str, data_type: &str) -> Row {
    Row::from(vec![Some(schema), Some(table), Some(table_type), Some(name), Some(data_type), None])
}

fn function(schema: &str, name: &str, arguments: &str, result: &str) -> Row {
    Row::from(vec![Some(schema), Some(name), Some(arguments), Some(result)])
}

fn postgres_fixture() -> Fixture {
    Fixture {
        version: "14.9 (Debian 14.9-1.pgdg120+1)",
        columns: vec![
            column("public", "users", "BASE TABLE", "created_at", "timestamp with time zone"),
            column("public", "users", "BASE TABLE", "Email", "character varying"),
            column("public", "users", "BASE TABLE", "id", "integer"),
            column("public", "users", "BASE TABLE", "name", "text"),
            column("public", "users", "BASE TABLE", "settings", "jsonb"),
            column("public", "user_stats", "VIEW", "active", "boolean"),
            column("public", "user_stats", "VIEW", "total", "bigint"),
            column("geo", "places", "BASE TABLE", "id", "uuid"),
            column("geo", "places", "BASE TABLE", "kind", "USER-DEFINED"),
            column("geo", "places", "BASE TABLE", "photo", "bytea"),
            column("geo", "places", "BASE TABLE", "span", "interval"),
            column("geo", "places", "BASE TABLE", "tags", "ARRAY"),
            column("geo", "users", "BASE TABLE", "id", "uuid"),
            column("geo", "users", "BASE TABLE", "location", "USER-DEFINED"),
        ],
        functions: vec![
            function("public", "add", "a integer, b integer", "integer"),
            function("public", "add", "a numeric, b numeric", "numeric"),
            function("public", "log_event", "message text", "void"),
            function(
                "public",
                "search",
                "query text, max_rows integer DEFAULT 10",
                "TABLE(id integer, title character varying)",
            ),
            function("public", "sum_all", "VARIADIC xs integer[]", "integer"),
            function("public", "touch", "", "trigger"),
            function("geo", "nearest", "lat double precision, lon double precision", "SETOF uuid"),
        ],
        params: Vec::new(),
    }
}

fn postgres_config() -> Config {
    Config {
        schemas: vec!["public".to_string(), "geo".to_string()],
        exclude: vec!["Schema_Migrations".to_string()],
        ..Default::default()
    }
}

#[test]
fn renders_the_pinned_bindings() {
    let mut fixture = postgres_fixture();
    let logger = Recorder::default();
    let code = catalog_bindgen::run(&mut fixture, &postgres_config(), &logger).unwrap().to_string();

    assert_eq!(format!("{}\n", code), include_str!("fixtures/postgres_bindings.expected"));
}

#[test]
fn parameters_are_schemas_then_exclusions() {
    let mut fixture = postgres_fixture();
    catalog_bindgen::model(&mut fixture, &postgres_config(), &Recorder::default()).unwrap();

    let expected = vec!["public".to_string(), "geo".to_string(), "schema_migrations".to_string()];
    assert_eq!(fixture.params, vec![expected.clone(), expected]);
}

#[test]
fn every_skip_is_logged_once() {
    let mut fixture = postgres_fixture();
    let logger = Recorder::default();
    let model = catalog_bindgen::model(&mut fixture, &postgres_config(), &logger).unwrap();

    assert_eq!(model.tables.len(), 4);
    assert_eq!(model.functions.len(), 5);

    let messages = logger.0.borrow();
    assert_eq!(messages.len(), 4, "{:#?}", messages);
    assert!(messages[0].contains("public.users.Email"));
    assert!(messages[1].contains("geo.places.span"));
    assert!(messages[2].contains("public.sum_all(VARIADIC xs integer[])"));
    assert!(messages[3].contains("public.touch()"));
}

#[test]
fn tables_only() {
    let mut fixture = postgres_fixture();
    let config = Config {
        functions: false,
        ..postgres_config()
    };
    let model = catalog_bindgen::model(&mut fixture, &config, &Recorder::default()).unwrap();

    assert!(model.functions.is_empty());
    assert_eq!(fixture.params.len(), 1);
}

#[test]
fn model_keeps_the_row_order() {
    let mut fixture = Fixture {
        version: "16.2",
        columns: vec![
            column("public", "zones", "BASE TABLE", "width", "integer"),
            column("public", "zones", "BASE TABLE", "area", "integer"),
            column("public", "accounts", "BASE TABLE", "owner", "text"),
            column("public", "accounts", "BASE TABLE", "balance", "numeric"),
            column("public", "zones", "BASE TABLE", "code", "text"),
        ],
        functions: vec![
            function("public", "zap", "", "integer"),
            function("public", "apply", "b text", "text"),
            function("public", "apply", "a integer", "integer"),
        ],
        params: Vec::new(),
    };
    let model = catalog_bindgen::model(&mut fixture, &Config::default(), &Recorder::default()).unwrap();

    let tables: Vec<_> = model.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tables, vec!["zones", "accounts"]);
    let zones: Vec<_> = model.tables[0].fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(zones, vec!["width", "area", "code"]);
    let accounts: Vec<_> = model.tables[1].fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(accounts, vec!["owner", "balance"]);

    let functions: Vec<_> = model.functions.iter().map(|f| (f.constructor.as_str(), f.signature.as_str())).collect();
    assert_eq!(functions, vec![("ZAP", ""), ("APPLY1", "b text"), ("APPLY2", "a integer")]);
}

#[test]
fn mysql_catalog() {
    let row = |table: &str, table_type: &str, name: &str, data_type: &str, exact_type: &str| {
        Row::from(vec![
            Some("shop"),
            Some(table),
            Some(table_type),
            Some(name),
            Some(data_type),
            Some(exact_type),
        ])
    };
    let mut fixture = Fixture {
        version: "",
        columns: vec![
            row("items", "BASE TABLE", "id", "bigint", "bigint(20) unsigned"),
            row("items", "BASE TABLE", "meta", "json", "json"),
            row("items", "BASE TABLE", "shape", "geometry", "geometry"),
            row("items", "BASE TABLE", "visible", "tinyint", "tinyint(1)"),
            row("stock", "SYSTEM VIEW", "count", "int", "int(11)"),
        ],
        functions: Vec::new(),
        params: Vec::new(),
    };
    let config = Config {
        dialect: Dialect::Mysql,
        schemas: vec!["shop".to_string()],
        ..Default::default()
    };
    let logger = Recorder::default();
    let model = catalog_bindgen::model(&mut fixture, &config, &logger).unwrap();

    assert_eq!(model.tables.len(), 2);
    let items = &model.tables[0];
    assert_eq!(items.struct_name, "TABLE_ITEMS");
    let kinds: Vec<_> = items.fields.iter().map(|f| (f.ident.as_str(), f.kind)).collect();
    assert_eq!(kinds, vec![("ID", Kind::Number), ("META", Kind::Json), ("VISIBLE", Kind::Boolean)]);
    assert_eq!(model.tables[1].struct_name, "VIEW_STOCK");
    assert!(model.functions.is_empty());

    let messages = logger.0.borrow();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("shop.items.shape"));
}

#[test]
fn query_failures_abort_the_run() {
    let result = catalog_bindgen::run(&mut Offline, &Config::default(), &Recorder::default());
    assert!(matches!(result, Err(Error::Driver(_))));
}
