use crate::config::AppConfig;
use crate::db::connection::init_db;
use crate::router::handle;
use crate::state::AppState;
use astra::Server;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

mod auth;
mod cache;
mod config;
mod db;
mod domain;
mod errors;
mod geos;
mod handlers;
mod import;
mod logging;
mod mailer;
mod responses;
mod router;
mod seo;
mod state;
mod templates;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "laundry-finder", author, version, about = "Laundromat directory server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Import laundromats from a CSV file and print the result as JSON
    Import {
        /// Path to the CSV export
        file: PathBuf,
    },
    /// Expire or renew lapsed subscriptions and purge dead sign-in rows
    ExpireSubscriptions,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(&cfg.log_level);

    let state = AppState::new(&cfg);
    if let Err(e) = init_db(&state.db, &cfg.schema_path) {
        error!(error = %e, "database initialization failed");
        return ExitCode::FAILURE;
    }

    let outcome = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cfg, state),
        Command::Import { file } => run_import(state, &file),
        Command::ExpireSubscriptions => run_expiry(&state),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn serve(cfg: &AppConfig, state: AppState) -> Result<(), String> {
    info!(addr = %cfg.bind_addr, workers = cfg.max_workers, "starting server");

    let server = Server::bind(cfg.bind_addr).max_workers(cfg.max_workers);
    server
        .serve(move |req, _info| handle(req, &state))
        .map_err(|e| format!("server ended with error: {e}"))?;

    info!("server shut down cleanly");
    Ok(())
}

fn run_import(state: AppState, file: &PathBuf) -> Result<(), String> {
    let mut db = state.db;
    let result = import::import_file(&mut db, file).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn run_expiry(state: &AppState) -> Result<(), String> {
    let now = chrono::Utc::now().timestamp();
    let (report, purged) = state
        .db
        .with_conn(|conn| {
            let report = db::subscriptions::expire_subscriptions(conn, now)?;
            let purged = db::auth::purge_stale_auth(conn, now)?;
            Ok((report, purged))
        })
        .map_err(|e| e.to_string())?;
    state.cache.invalidate();
    info!(purged, "stale sign-in rows removed");
    println!("renewed {} expired {}", report.renewed, report.expired);
    Ok(())
}
