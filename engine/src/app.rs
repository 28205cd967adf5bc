//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::CommandFactory;
use serde_json::json;

use crate::core::cli::{self, Cli, CliConfig, Commands, QueryArgs};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::data::filters::RawParameters;
use crate::data::query::{QueryBuilder, SelectQuery};
use crate::data::sql::Backend;
use crate::data::{QueryExecutor, SqliteExecutor};
use crate::domain::{ContentTypeRegistry, QueryService};
use crate::utils::file::resolve_database;

pub struct CoreApp {
    pub config: AppConfig,
    pub queries: QueryService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let Some(command) = command else {
            Cli::command().print_help()?;
            println!();
            return Ok(());
        };

        let app = Self::init(&cli_config)?;
        match command {
            Commands::Compile(args) => app.compile(&args),
            Commands::Run(args) => app.execute(&args).await,
        }
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let registry = ContentTypeRegistry::from_config(&config.content_types)
            .context("Failed to build content type registry")?;
        tracing::debug!(content_types = registry.len(), "Registry initialized");

        let queries = QueryService::new(
            Arc::new(registry),
            config.dialect,
            config.whitelist.clone(),
        );
        Ok(Self { config, queries })
    }

    fn init_logging() {
        let default_filter = format!("warn,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Coordinator for `args`: JSON parameters first, then `key=value` pairs
    fn prepare(&self, args: &QueryArgs) -> Result<SelectQuery> {
        let mut params = match &args.params {
            Some(raw) => {
                let value: serde_json::Value =
                    serde_json::from_str(raw).context("Failed to parse --params")?;
                RawParameters::from_json(&value)
                    .context("--params must be a JSON object")?
            }
            None => RawParameters::new(),
        };
        for (key, value) in RawParameters::from_pairs(&args.parameters).iter() {
            params.insert(key, value.clone());
        }

        let mut query = self
            .queries
            .select(&args.content_type)
            .with_context(|| format!("Cannot query '{}'", args.content_type))?;
        if !args.allow.is_empty() {
            query.set_parameter_whitelist(args.allow.iter().cloned());
        }
        query.set_single_fetch_mode(args.single);
        query.set_parameters(&params);

        if query.filters().len() < params.len() {
            tracing::info!(
                content_type = %args.content_type,
                parameters = params.len(),
                filters = query.filters().len(),
                "Some parameters were ignored"
            );
        }
        Ok(query)
    }

    fn compile(&self, args: &QueryArgs) -> Result<()> {
        let built = self.prepare(args)?.build();
        let positional = built.positional()?;

        if args.json {
            let output = json!({
                "content_type": args.content_type,
                "dialect": self.config.dialect,
                "sql": positional.sql,
                "values": positional.values,
                "named_sql": built.sql(),
                "parameters": built.parameters(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("{}", positional.sql);
        for (index, value) in positional.values.iter().enumerate() {
            println!("  {} = {:?}", built.backend().dialect().placeholder(index + 1), value);
        }
        Ok(())
    }

    async fn execute(&self, args: &QueryArgs) -> Result<()> {
        if self.config.dialect != Backend::Sqlite {
            anyhow::bail!(
                "run executes against SQLite, but the configured dialect is {}",
                self.config.dialect
            );
        }
        let database = self
            .config
            .database
            .as_deref()
            .context("No database configured (use --database or CONTENTQUERY_DATABASE)")?;

        let built = self.prepare(args)?.build();
        let executor = SqliteExecutor::connect(&resolve_database(database))
            .await
            .with_context(|| format!("Failed to open database: {}", database))?;

        let result = executor.fetch_all(&built).await;
        executor.close().await;

        let rows = match result {
            Ok(rows) => rows,
            Err(e) if e.is_transient() => {
                return Err(e).context("Database temporarily unavailable, try again");
            }
            Err(e) => return Err(e).context("Query failed"),
        };
        tracing::debug!(backend = executor.backend_name(), rows = rows.len(), "Query executed");

        if args.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            for row in &rows {
                println!("{}", serde_json::to_string(row)?);
            }
        }
        Ok(())
    }
}
