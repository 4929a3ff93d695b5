//! alert-remove: remove Grafana alert rules by name or UID

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use dialoguer::Confirm;

use alertsync::remove::{self, Selector};
use alertsync::{GrafanaClient, GrafanaConfig};

/// Remove Grafana alert rules by name or UID
#[derive(Parser)]
#[command(name = "alert-remove")]
#[command(author, version, about)]
struct Cli {
    /// Alert name or UID to remove
    identifier: Option<String>,

    /// Remove alert by UID
    #[arg(long)]
    uid: Option<String>,

    /// Remove alert by name/title
    #[arg(long)]
    name: Option<String>,

    /// Show what would be deleted without deleting
    #[arg(long)]
    dry_run: bool,

    /// List all alert rules
    #[arg(long)]
    list: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,

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

    let client = match GrafanaClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.list {
        return match remove::list_rules(&client).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error listing alerts: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let Some(selector) = Selector::from_args(cli.uid, cli.name, cli.identifier) else {
        Cli::command().print_help().ok();
        return ExitCode::FAILURE;
    };

    let target = match remove::resolve(&client, &selector).await {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    remove::print_target(&target);

    if cli.dry_run {
        println!("DRY RUN - No changes made");
        return ExitCode::SUCCESS;
    }

    if !cli.force {
        match Confirm::new()
            .with_prompt("Are you sure you want to delete this alert?")
            .default(false)
            .interact()
        {
            Ok(true) => {}
            Ok(false) => {
                println!("Aborted.");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    match client.delete_alert_rule(&target.uid).await {
        Ok(()) => {
            println!("✓ Deleted: {} (UID: {})", target.title(), target.uid);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error deleting alert: {e}");
            ExitCode::FAILURE
        }
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
