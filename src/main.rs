//! Calendar Dispatch - Entry Point
//!
//! Serves the HTTP command endpoint, or runs single commands and catalog
//! output from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use calendar_dispatch::auth::ServiceAccountTokenSource;
use calendar_dispatch::calendar::GoogleCalendar;
use calendar_dispatch::command::{builtin_registry, CommandExecutor, CommandRegistry};
use calendar_dispatch::core::error::Result;
use calendar_dispatch::core::Config;
use calendar_dispatch::server::{self, AppState};

use clap::{Parser, Subcommand, ValueEnum};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Korean natural language commands for Google Calendar
#[derive(Parser, Debug)]
#[command(name = "calendar-dispatch")]
#[command(about = "Dispatch short Korean calendar commands via a service account")]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the HTTP server
    Serve {
        /// TOML config file (environment variables override it)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Listen address, overriding config
        #[arg(long)]
        listen: Option<String>,
    },

    /// Execute one command and print the reply
    Run {
        #[arg(long)]
        config: Option<PathBuf>,

        text: String,
    },

    /// Show which command and parameters a text resolves to (no network)
    Resolve { text: String },

    /// Print the command catalog
    Catalog {
        #[arg(long, value_enum, default_value_t = CatalogFormat::Text)]
        format: CatalogFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CatalogFormat {
    Text,
    Markdown,
    Json,
}

fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("calendar_dispatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let registry = Arc::new(builtin_registry());

    match args.command {
        Cmd::Serve { config, listen } => {
            let config = Config::load(config.as_deref())?;
            let listen_addr = listen.unwrap_or_else(|| config.listen_addr.clone());
            if config.api_key.is_none() {
                tracing::warn!("API_KEY not set - every /command request will be rejected");
            }

            let rt = Runtime::new()?;
            let executor = build_executor(&config, registry)?;
            let state = Arc::new(AppState::new(executor, config.api_key.clone()));
            rt.block_on(server::serve(&listen_addr, state))?;
        }
        Cmd::Run { config, text } => {
            let config = Config::load(config.as_deref())?;
            let rt = Runtime::new()?;
            let executor = build_executor(&config, registry)?;
            let reply = rt.block_on(executor.execute(&text));
            println!("{}", reply);
        }
        Cmd::Resolve { text } => print_resolution(&registry, text.trim())?,
        Cmd::Catalog { format } => match format {
            CatalogFormat::Text => println!("{}", registry.help_text()),
            CatalogFormat::Markdown => println!("{}", registry.catalog_markdown()),
            CatalogFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&registry.catalog())?)
            }
        },
    }

    Ok(())
}

fn build_executor(config: &Config, registry: Arc<CommandRegistry>) -> Result<CommandExecutor> {
    let tokens = ServiceAccountTokenSource::from_config(config)?;
    let calendar = GoogleCalendar::new(
        config.api_base.clone(),
        config.calendar_id.clone(),
        config.http_timeout,
    )?;
    tracing::info!(
        issuer = %config.service_account_email,
        cache_tokens = config.cache_tokens,
        "executor ready"
    );
    Ok(CommandExecutor::new(
        registry,
        Arc::new(tokens),
        Arc::new(calendar),
    ))
}

fn print_resolution(registry: &CommandRegistry, text: &str) -> Result<()> {
    match registry.resolve(text) {
        Some(resolved) => {
            println!("command: {}", resolved.command.id());
            println!("{}", serde_json::to_string_pretty(&resolved.params)?);
        }
        None => println!("no command matched"),
    }
    Ok(())
}
