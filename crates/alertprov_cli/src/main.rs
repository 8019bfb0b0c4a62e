//! `alertprov` command-line entry point.
//!
//! # Responsibility
//! - Open the notification database and run provisioning against a directory.
//! - Offer small inspection helpers (`list`, `org add`) for operators.

use alertprov_core::db::open_db;
use alertprov_core::{
    default_log_level, init_logging, provision, SqliteNotificationStore, DEFAULT_ORG_ID,
};
use clap::{Parser, Subcommand};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "alertprov", version, about = "Provision alert notification channels")]
struct Cli {
    /// SQLite database holding organizations and notification channels.
    #[arg(long, env = "ALERTPROV_DB", global = true)]
    db: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = "ALERTPROV_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[arg(long, env = "ALERTPROV_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply every provisioning file in a directory.
    Apply {
        /// Directory containing `*.yaml` / `*.yml` provisioning files.
        config_dir: PathBuf,
    },
    /// List stored notification channels of one organization.
    List {
        #[arg(long, default_value_t = DEFAULT_ORG_ID)]
        org_id: i64,
    },
    /// Organization management.
    Org {
        #[command(subcommand)]
        command: OrgCommand,
    },
}

#[derive(Debug, Subcommand)]
enum OrgCommand {
    /// Create an organization and print its id.
    Add { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, cli.log_dir.as_deref()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let db_path = cli
        .db
        .ok_or("missing database path; pass --db or set ALERTPROV_DB")?;
    let conn = open_db(&db_path)?;
    let store = SqliteNotificationStore::try_new(&conn)?;

    match cli.command {
        Command::Apply { config_dir } => {
            let applied = provision(&config_dir, &store)?;
            println!("applied {applied} document(s) from {}", config_dir.display());
        }
        Command::List { org_id } => {
            for notification in store.list_notifications(org_id)? {
                println!(
                    "{}\t{}\t{}\tdefault={}\t{}",
                    notification.id,
                    notification.name,
                    notification.kind,
                    notification.is_default,
                    notification.settings
                );
            }
        }
        Command::Org {
            command: OrgCommand::Add { name },
        } => {
            let org = store.create_organization(&name)?;
            println!("{}\t{}", org.id, org.name);
        }
    }

    Ok(())
}
