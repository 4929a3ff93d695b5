//! alert-import: import Grafana alert rules from JSON files
//!
//! Creates or updates each rule against the provisioning API, keyed by UID.
//! Accepts single rules, lists of rules, and Grafana export documents.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use alertsync::{import, GrafanaClient, GrafanaConfig};

/// Import Grafana alert rules from JSON files
#[derive(Parser)]
#[command(name = "alert-import")]
#[command(author, version, about)]
struct Cli {
    /// JSON file(s) containing alert definitions
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Validate files without importing
    #[arg(long)]
    dry_run: bool,

    /// Override folder UID for all alerts
    #[arg(long, value_name = "UID")]
    folder: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = match GrafanaConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Grafana URL: {}", config.url);
    println!("Auth: {}", config.auth_label());
    println!();

    let summary = if cli.dry_run {
        println!("DRY RUN - Validating files only");
        println!();
        import::check(&cli.files)
    } else {
        let client = match GrafanaClient::new(&config) {
            Ok(client) => client,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        };
        import::run(&client, &cli.files, cli.folder.as_deref()).await
    };

    if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
