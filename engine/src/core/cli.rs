use clap::{Args, Parser, Subcommand};

use std::path::PathBuf;

use crate::data::sql::Backend;

use super::constants::{ENV_CONFIG, ENV_DATABASE, ENV_DIALECT};

#[derive(Parser)]
#[command(name = "contentquery")]
#[command(version, about = "Compile query-string filters into parameterized SQL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// SQL dialect (sqlite, postgres, duckdb)
    #[arg(long, short = 'd', global = true, env = ENV_DIALECT, value_parser = parse_backend)]
    pub dialect: Option<Backend>,

    /// SQLite database URL or path used by `run`
    #[arg(long, global = true, env = ENV_DATABASE)]
    pub database: Option<String>,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    match s.to_lowercase().as_str() {
        "sqlite" => Ok(Backend::Sqlite),
        "postgres" | "postgresql" => Ok(Backend::Postgres),
        "duckdb" => Ok(Backend::Duckdb),
        _ => Err(format!(
            "Invalid dialect '{}'. Valid options: sqlite, postgres, duckdb",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Print the SQL and bound values for a query
    Compile(QueryArgs),
    /// Execute a query against SQLite and print rows as JSON lines
    Run(QueryArgs),
}

#[derive(Args, Clone, Debug)]
pub struct QueryArgs {
    /// Content type to query
    #[arg(long = "type", short = 't')]
    pub content_type: String,

    /// Return at most one row
    #[arg(long)]
    pub single: bool,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,

    /// Parameters as a JSON object, applied before positional pairs
    #[arg(long, value_name = "JSON")]
    pub params: Option<String>,

    /// Accepted parameter keys, overriding configured whitelists (repeatable)
    #[arg(long = "allow", value_name = "KEY")]
    pub allow: Vec<String>,

    /// Filter parameters as `key=value` pairs
    #[arg(value_name = "KEY=VALUE")]
    pub parameters: Vec<String>,
}

/// Global options shared by every command
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub dialect: Option<Backend>,
    pub database: Option<String>,
}

pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        dialect: cli.dialect,
        database: cli.database,
    };
    (config, cli.command)
}
