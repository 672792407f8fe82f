// Expense Tracker - Web Server

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use expense_tracker::{init_logging, router, Config, ExpenseRepository, ServerArgs, Store};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "expense-server", version, about = "Expense Tracker HTTP API")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(flatten)]
    server: ServerArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config;

    init_logging(&config.log_level, config.log_json).map_err(|e| anyhow!(e))?;

    let addr = cli.server.listen_addr().map_err(|e| anyhow!(e))?;

    let store = Store::open(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database))?;
    let app = router(ExpenseRepository::new(store));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, database = %config.database, "expense tracker API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
