use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{ENV_CONFIG, ENV_MAX_FILTERS, ENV_MAX_VALUE_BYTES};

#[derive(Parser)]
#[command(name = "restfilter")]
#[command(
    version,
    about = "Compile query-string filters into document store predicates",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Maximum number of filters accepted per query
    #[arg(long, global = true, env = ENV_MAX_FILTERS)]
    pub max_filters: Option<usize>,

    /// Maximum size of a single raw filter value in bytes
    #[arg(long, global = true, env = ENV_MAX_VALUE_BYTES)]
    pub max_value_bytes: Option<usize>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Compile filters and print the resulting Mongo query document
    Query {
        /// Filter parameter, e.g. `age__gte=18` or `name__not__icontains=bot`
        #[arg(short = 'f', long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Load documents from a JSON file and print the ones matching the filters
    Find {
        /// JSON array or JSON-lines file of documents
        path: PathBuf,

        /// Filter parameter, e.g. `age__gte=18` or `name__not__icontains=bot`
        #[arg(short = 'f', long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List registered operators and field overrides
    Operators,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub max_filters: Option<usize>,
    pub max_value_bytes: Option<usize>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        max_filters: cli.max_filters,
        max_value_bytes: cli.max_value_bytes,
    };
    (config, cli.command)
}
