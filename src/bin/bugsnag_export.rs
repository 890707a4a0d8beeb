//! bugsnag-export: download the events of a Bugsnag error as CSV
//!
//! Usage:
//!   # Generate a map of every column in the newest events
//!   bugsnag-export csv-map --project-id P --error-id E -o csv_map.json
//!
//!   # Download all events of the error through the (edited) map
//!   bugsnag-export events --project-id P --error-id E --csv-map-path csv_map.json > events.csv
//!
//! The token is read from --token or BUGSNAG_PERSONAL_AUTH_TOKEN. Logs go to
//! stderr so CSV on stdout stays clean.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use bugsnag_export::config::DEFAULT_API_URL;
use bugsnag_export::{
    BugsnagClient, ClientConfig, ErrorEvents, FetchRequest, GenerateCsvMap,
};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "bugsnag-export")]
#[command(version, about = "Download Bugsnag error events as CSV", long_about = None)]
struct Cli {
    /// Personal auth token
    #[arg(short = 't', long, env = "BUGSNAG_PERSONAL_AUTH_TOKEN", hide_env_values = true)]
    token: String,

    /// API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Events requested per page (server default if omitted)
    #[arg(long)]
    per_page: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Log filter, e.g. "info" or "bugsnag_export=debug"
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download every event of an error and print it as CSV
    Events {
        #[arg(long)]
        project_id: Option<String>,

        #[arg(long)]
        error_id: Option<String>,

        /// Map of CSV headers to JSON paths
        #[arg(long)]
        csv_map_path: Option<PathBuf>,

        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Generate a CSV map from the newest page of events
    CsvMap {
        #[arg(long)]
        project_id: Option<String>,

        #[arg(long)]
        error_id: Option<String>,

        /// Keep stacktrace columns
        #[arg(long)]
        include_stacktrace: bool,

        /// Keep breadcrumb columns
        #[arg(long)]
        include_breadcrumbs: bool,

        /// Indent the JSON for editing
        #[arg(long)]
        pretty: bool,

        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let mut config = ClientConfig::new(cli.token);
    config.api_url = cli.api_url;
    config.per_page = cli.per_page;
    config.timeout = Duration::from_secs(cli.timeout);
    let api = BugsnagClient::new(config).context("Failed to create API client")?;

    match cli.command {
        Command::Events {
            project_id,
            error_id,
            csv_map_path,
            output,
        } => {
            let request = FetchRequest {
                project_id,
                error_id,
                csv_map_path,
                ..Default::default()
            };
            let csv = ErrorEvents::new(api, &request)?
                .run()
                .context("Failed to download error events")?;
            write_output(output, &csv)?;
        }
        Command::CsvMap {
            project_id,
            error_id,
            include_stacktrace,
            include_breadcrumbs,
            pretty,
            output,
        } => {
            let request = FetchRequest {
                project_id,
                error_id,
                include_stacktrace,
                include_breadcrumbs,
                ..Default::default()
            };
            let map = GenerateCsvMap::new(api, &request)?
                .build()
                .context("Failed to generate csv map")?;
            let mut json = if pretty {
                map.to_json_pretty()?
            } else {
                map.to_json()?
            };
            json.push('\n');
            write_output(output, &json)?;
        }
    }

    Ok(())
}

/// Write to a file if given, else to stdout
fn write_output(output: Option<PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(&path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Initialize the tracing subscriber, logging to stderr
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
