use catalog_bindgen::{types::Dialect, Config, Error, TracingLogger};
use clap::Parser;
use std::{io::prelude::*, path::PathBuf, str::FromStr};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, author = "José Franco Campos <franco.jose@qst.go.jp>", about)]
struct Opts {
    /// PostgreSQL connection string,
    /// for details please refer to https://www.postgresql.org/docs/current/libpq-connect.html#LIBPQ-CONNSTRING
    #[arg(long, conflicts_with_all = ["host", "port", "user", "password", "dbname"])]
    url: Option<String>,
    /// PostgreSQL host name
    #[arg(long, default_value = "localhost")]
    host: String,
    /// PostgreSQL port
    #[arg(short, long, default_value = "5432")]
    port: u16,
    /// PostgreSQL user name
    #[arg(short, long, default_value = "postgres")]
    user: String,
    /// PostgreSQL password
    #[arg(short = 'w', long)]
    password: Option<String>,
    /// PostgreSQL database name
    #[arg(short, long, default_value = "postgres")]
    dbname: String,
    /// Generation settings in RON format, command line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Schema to generate bindings for, may be repeated
    #[arg(short, long = "schema")]
    schemas: Vec<String>,
    /// Table or function to leave out (case-insensitive), may be repeated
    #[arg(short = 'x', long)]
    exclude: Vec<String>,
    /// Do not generate bindings for stored functions
    #[arg(long)]
    no_functions: bool,
    /// Module the generated code imports the query-builder types from
    #[arg(long)]
    prelude: Option<String>,
    /// Write the intermediate model as JSON instead of source code
    #[arg(long)]
    json: bool,
    /// Ouput file, if no file is provided results will be written to stdout
    #[arg(short, long)]
    output_file: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Parse the program options
    let opts: Opts = Opts::parse();
    if let Err(e) = run(opts) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> Result<(), Error> {
    // Read the generation settings
    let mut config = match &opts.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if !opts.schemas.is_empty() {
        config.schemas = opts.schemas.clone();
    }
    if !opts.exclude.is_empty() {
        config.exclude = opts.exclude.clone();
    }
    if opts.no_functions {
        config.functions = false;
    }
    if let Some(prelude) = &opts.prelude {
        config.prelude = prelude.clone();
    }
    if config.dialect != Dialect::Postgres {
        return Err(Error::Unsupported(format!("no bundled driver for the {} dialect", config.dialect)));
    }

    // Read the PostgreSQL connection configuration
    let mut conn_config = postgres::config::Config::new();
    if let Some(url) = &opts.url {
        conn_config = postgres::config::Config::from_str(url)?;
    } else {
        conn_config.host(&opts.host);
        conn_config.port(opts.port);
        conn_config.user(&opts.user);
        if let Some(password) = &opts.password {
            conn_config.password(password);
        }
        conn_config.dbname(&opts.dbname);
    }
    let mut client = conn_config.connect(postgres::NoTls)?;

    // Run the transformation
    let code = if opts.json {
        let model = catalog_bindgen::model(&mut client, &config, &TracingLogger)?;
        serde_json::to_string_pretty(&model)?
    } else {
        catalog_bindgen::run(&mut client, &config, &TracingLogger)?.to_string()
    };

    // Write the result
    if let Some(path) = opts.output_file {
        // Create the output directory if it doesn't exist
        let output_dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        std::fs::create_dir_all(output_dir)?;

        let mut file = std::fs::File::create(path)?;
        writeln!(file, "{}", code)?;
    } else {
        println!("{}", code);
    }
    Ok(())
}
