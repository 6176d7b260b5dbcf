use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repofilter::config::LoggingConfig;
use repofilter::datasource::schema;
use repofilter::{Config, GitHubClient, ReadInput, RepositoriesDataSource};

#[derive(Parser)]
#[command(name = "repofilter")]
#[command(about = "List an organization's repositories whose names match regex filters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the repositories data source
    Read {
        /// Repository name filter (regular expression), repeatable
        #[arg(short, long = "filter", value_name = "REGEX")]
        filters: Vec<String>,

        /// Read input document (YAML or JSON with a `filters` list)
        #[arg(short, long, conflicts_with = "filters")]
        input: Option<PathBuf>,

        /// Organization to list (overrides github.organization)
        #[arg(long)]
        org: Option<String>,

        /// Output format of the result record
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the data source's field declarations
    Schema,

    /// Manage authentication
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Show authentication status
    Status,
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormat {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config)?;

    init_logging(cli.verbose, &config.logging)?;
    info!("Starting repofilter v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Read {
            filters,
            input,
            org,
            format,
        } => cmd_read(filters, input, org, format, &config).await,
        Commands::Schema => cmd_schema(),
        Commands::Auth { auth_command } => cmd_auth(auth_command, &config).await,
    }
}

/// Initialize logging based on verbosity level and configuration
fn init_logging(verbose: bool, logging: &LoggingConfig) -> Result<()> {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the result record
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(logging.color),
        )
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

/// Read the data source and print the resulting record
async fn cmd_read(
    filters: Vec<String>,
    input: Option<PathBuf>,
    org: Option<String>,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    // Filters are validated before any authentication or network access
    let input = match input {
        Some(path) => ReadInput::load(&path)?,
        None if filters.is_empty() => bail!("No filters given. Pass --filter <REGEX> or --input <FILE>"),
        None => ReadInput::new(filters)?,
    };

    let organization = config.organization(org.as_deref())?;

    let client = GitHubClient::new(config)?;
    let source =
        RepositoriesDataSource::new(client, organization).with_per_page(config.github.per_page);

    let result = source
        .read(&input)
        .await
        .with_context(|| format!("Failed to read repositories of {}", source.organization()))?;

    let state = result.to_state()?;
    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&state).context("Failed to render result as JSON")?
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&state).context("Failed to render result as YAML")?
        }
    };

    println!("{}", rendered.trim_end());
    Ok(())
}

/// Print the data source schema
fn cmd_schema() -> Result<()> {
    let rendered = serde_json::to_string_pretty(&schema()).context("Failed to render schema")?;
    println!("{}", rendered);
    Ok(())
}

/// Handle authentication commands
async fn cmd_auth(auth_command: AuthCommands, config: &Config) -> Result<()> {
    match auth_command {
        AuthCommands::Status => {
            match GitHubClient::new(config) {
                Ok(client) => match client.authenticated_user().await {
                    Ok(username) => {
                        println!("✅ Authentication successful");
                        println!("   Username: {}", username);
                    }
                    Err(e) => {
                        println!("❌ Authentication failed: {:#}", e);
                    }
                },
                Err(e) => {
                    println!("❌ Authentication failed: {:#}", e);
                }
            }
            Ok(())
        }
    }
}
