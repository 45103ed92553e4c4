//! opsync CLI - queue, inspect, and reconcile record synchronization from
//! the terminal.

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("opsync=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = commands::common::resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Queue {
            kind,
            entity_type,
            entity_id,
            payload,
        } => {
            commands::queue::run_queue(
                kind.into(),
                entity_type.into(),
                &entity_id,
                &payload,
                &db_path,
            )
            .await?;
        }
        Commands::Sync => commands::sync::run_sync(&db_path).await?,
        Commands::Status { json } => commands::status::run_status(json, &db_path).await?,
        Commands::Operations { status, json } => {
            commands::operations::run_operations(status.map(Into::into), json, &db_path).await?;
        }
        Commands::Conflicts {
            resolved,
            unresolved,
            json,
        } => {
            let filter = match (resolved, unresolved) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::conflicts::run_conflicts(filter, json, &db_path).await?;
        }
        Commands::Resolve { id, resolution, by } => {
            commands::conflicts::run_resolve(&id, resolution.into(), by.as_deref(), &db_path)
                .await?;
        }
        Commands::Retry => commands::sync::run_retry(&db_path).await?,
        Commands::Clear { older_than_days } => {
            commands::sync::run_clear(older_than_days, &db_path).await?;
        }
        Commands::Completions { shell, output } => {
            commands::completions::run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
