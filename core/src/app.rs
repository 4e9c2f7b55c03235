//! Core application

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::cli::{self, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::filters::{FilterCompiler, FilterRequest, parse_pair, parse_params};
use crate::store::{MemoryStore, to_mongo};

pub struct CoreApp {
    pub config: AppConfig,
    pub compiler: FilterCompiler,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let config = AppConfig::load(&cli_config)?;
        let app = Self::init(config);

        match command {
            Commands::Query { filters, pretty } => app.query(&filters, pretty),
            Commands::Find {
                path,
                filters,
                pretty,
            } => app.find(&path, &filters, pretty),
            Commands::Operators => {
                app.print_operators();
                Ok(())
            }
        }
    }

    pub fn init(config: AppConfig) -> Self {
        let compiler = FilterCompiler::from_config(config.filters.clone());
        Self { config, compiler }
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }

    /// Parse `key=value` arguments into filter requests
    pub fn parse_filters(&self, filters: &[String]) -> Result<Vec<FilterRequest>> {
        let requests = parse_params(
            filters.iter().map(|f| parse_pair(f)),
            self.compiler.registry(),
        )?;
        Ok(requests)
    }

    /// Compile filters into a Mongo query document
    pub fn compile_to_mongo(&self, filters: &[String]) -> Result<Value> {
        let requests = self.parse_filters(filters)?;
        let predicate = self.compiler.compile(&requests)?;
        tracing::debug!(predicate = %predicate, "Compiled query");
        Ok(to_mongo(&predicate))
    }

    /// Load documents from `path` and return the ones matching `filters`
    pub fn find_in_file(&self, path: &Path, filters: &[String]) -> Result<Vec<Value>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read documents: {}", path.display()))?;
        let store = MemoryStore::from_json_str(&content)
            .with_context(|| format!("Failed to load documents: {}", path.display()))?;
        let requests = self.parse_filters(filters)?;
        Ok(self.compiler.apply(&store, &requests)?)
    }

    fn query(&self, filters: &[String], pretty: bool) -> Result<()> {
        let document = self.compile_to_mongo(filters)?;
        println!("{}", render(&document, pretty)?);
        Ok(())
    }

    fn find(&self, path: &Path, filters: &[String], pretty: bool) -> Result<()> {
        let found = self.find_in_file(path, filters)?;
        println!("{}", render(&Value::Array(found), pretty)?);
        Ok(())
    }

    fn print_operators(&self) {
        let registry = self.compiler.registry();
        println!("Operators:");
        for name in registry.names() {
            if let Some(operator) = registry.get(name) {
                println!(
                    "  {:<12} {:<14} negatable={}",
                    name,
                    operator.kind().id(),
                    operator.allows_negation()
                );
            }
        }

        let overrides = registry.field_overrides();
        if !overrides.is_empty() {
            println!("\nField overrides:");
            for (field, name, operator) in overrides {
                println!(
                    "  {}__{:<10} {:<14} negatable={}",
                    field,
                    name,
                    operator.kind().id(),
                    operator.allows_negation()
                );
            }
        }
    }
}

fn render(value: &Value, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}
