//! DVS CLI - Exports and alert management from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Export every admin to CSV on stdout
//! DVS_PASSWORD=... dvs-cli --email owner@school.in export admins
//!
//! # Export the second page of third-party users to a file
//! DVS_PASSWORD=... dvs-cli --email owner@school.in export thirdparty --page 2 -o users.csv
//!
//! # List alerts, then re-broadcast one
//! DVS_PASSWORD=... dvs-cli --email owner@school.in alerts list
//! DVS_PASSWORD=... dvs-cli --email owner@school.in alerts broadcast 65f1c2
//! ```
//!
//! # Commands
//!
//! - `export` - Write admins or third-party users as CSV
//! - `alerts list` - Print every alert
//! - `alerts broadcast` - Push an alert to its audience again
//!
//! The password is never accepted as an argument; it is read from
//! `DVS_PASSWORD` so it stays out of shell history.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "dvs-cli")]
#[command(author, version, about = "DVS super-admin command-line tools")]
struct Cli {
    /// Super admin email address
    #[arg(short, long)]
    email: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export accounts as CSV
    Export {
        /// Which accounts to export
        #[arg(value_enum)]
        target: ExportTarget,

        /// Export a single page (1-based) instead of every page
        #[arg(short, long)]
        page: Option<usize>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage global alerts
    Alerts {
        #[command(subcommand)]
        action: AlertAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportTarget {
    /// School administrators
    Admins,
    /// Third-party users
    Thirdparty,
}

#[derive(Subcommand)]
enum AlertAction {
    /// List every alert
    List,
    /// Broadcast an existing alert
    Broadcast {
        /// Alert id
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let session = commands::Session::login(&cli.email).await?;
    match cli.command {
        Commands::Export {
            target,
            page,
            output,
        } => {
            let csv = match target {
                ExportTarget::Admins => commands::export::admins(&session, page).await?,
                ExportTarget::Thirdparty => commands::export::third_party(&session, page).await?,
            };
            commands::write_output(output.as_deref(), &csv)?;
        }
        Commands::Alerts { action } => match action {
            AlertAction::List => {
                let listing = commands::alerts::list(&session).await?;
                commands::write_output(None, &listing)?;
            }
            AlertAction::Broadcast { id } => commands::alerts::broadcast(&session, &id).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_with_page_and_output() {
        let cli = Cli::try_parse_from([
            "dvs-cli",
            "--email",
            "owner@school.in",
            "export",
            "thirdparty",
            "--page",
            "2",
            "-o",
            "users.csv",
        ])
        .unwrap();
        assert_eq!(cli.email, "owner@school.in");
        match cli.command {
            Commands::Export {
                target,
                page,
                output,
            } => {
                assert_eq!(target, ExportTarget::Thirdparty);
                assert_eq!(page, Some(2));
                assert_eq!(output, Some(PathBuf::from("users.csv")));
            }
            Commands::Alerts { .. } => panic!("expected export"),
        }
    }

    #[test]
    fn test_parse_alert_broadcast() {
        let cli = Cli::try_parse_from([
            "dvs-cli", "-e", "owner@school.in", "alerts", "broadcast", "al-1",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Alerts {
                action: AlertAction::Broadcast { ref id }
            } if id == "al-1"
        ));
    }

    #[test]
    fn test_email_is_required() {
        assert!(Cli::try_parse_from(["dvs-cli", "alerts", "list"]).is_err());
    }

    #[test]
    fn test_password_is_not_an_argument() {
        assert!(
            Cli::try_parse_from([
                "dvs-cli",
                "-e",
                "owner@school.in",
                "--password",
                "secret",
                "alerts",
                "list",
            ])
            .is_err()
        );
    }
}
