use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sql_shim::prelude::*;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a named prepared statement against a SQLite database")]
struct Args {
    /// JSON connection options, including the statements to register
    #[arg(long)]
    config: PathBuf,
    /// SQLite database path; overrides the url in the config file
    #[arg(long)]
    db: Option<String>,
    /// Name of the registered statement to run
    #[arg(long)]
    statement: String,
    /// Parameter value as column=value; repeat for each parameter
    #[arg(long = "value", value_parser = parse_key_val)]
    values: Vec<(String, String)>,
    /// Print returned rows as JSON instead of running an update and committing
    #[arg(long)]
    query: bool,
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got {s:?}"))?;
    if key.trim().is_empty() {
        return Err(format!("empty column name in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn run(args: Args) -> Result<(), SqlShimError> {
    let mut options = ConnectOptions::from_path(&args.config)?;
    if let Some(db) = args.db {
        options.params.url = db;
    }
    let mut conn = Connection::connect(SqliteDriver::new(), options)?;
    let values: ColumnMap = args.values.into_iter().collect();

    if args.query {
        let result = conn.query_prepared(&args.statement, &values)?;
        let rows: Vec<BTreeMap<String, String>> = result.iter().map(ResultRow::to_map).collect();
        let json = serde_json::to_string_pretty(&rows)
            .map_err(|e| SqlShimError::InvalidArgument(format!("cannot render rows: {e}")))?;
        println!("{json}");
    } else {
        let count = conn.execute_prepared(&args.statement, &values)?;
        if !conn.autocommit() {
            conn.commit()?;
        }
        println!("{count}");
    }
    conn.close();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(args.log_level)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
