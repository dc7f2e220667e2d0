quick_error! {
    /// Errors that abort a whole generation run
    #[derive(Debug)]
    pub enum Error {
        Postgres(err: postgres::Error) {
            from()
            source(err)
            display("catalog query failed: {}", err)
        }
        Driver(message: String) {
            display("catalog query failed: {}", message)
        }
        Scan(column: usize, reason: &'static str) {
            display("cannot scan column #{}: {}", column, reason)
        }
        NoRows(query: String) {
            display("query returned no rows: {}", query)
        }
        Version(version: String) {
            display("cannot read a major version number from '{}'", version)
        }
        Io(err: std::io::Error) {
            from()
            source(err)
            display("{}", err)
        }
        Config(err: ron::Error) {
            from()
            source(err)
            display("invalid configuration: {}", err)
        }
        Json(err: serde_json::Error) {
            from()
            source(err)
            display("cannot serialize the model: {}", err)
        }
        Unsupported(what: String) {
            display("unsupported: {}", what)
        }
    }
}
