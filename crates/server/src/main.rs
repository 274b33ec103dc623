mod api;
mod background;
mod cli;
mod db;
mod router;
mod startup;
mod state;

use clap::Parser;
use tracing::info;

use sitewatch_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    sitewatch_core::config::load_dotenv();
    let config = Config::from_env();

    let cli = cli::Cli::parse();
    match cli.command {
        cli::Command::Serve => serve(config).await,
        cli::Command::RunOnce => run_once(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();

    let state = startup::build_state(config).await?;
    let _scheduler = background::spawn_scheduler(state.clone());

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_once(config: Config) -> anyhow::Result<()> {
    let state = startup::build_state(config).await?;

    let timeout = std::time::Duration::from_secs(state.config.escalation.pass_timeout_secs);
    let stats = tokio::time::timeout(timeout, state.pass.run())
        .await
        .map_err(|_| anyhow::anyhow!("escalation pass timed out after {}s", timeout.as_secs()))??;

    let summary = api::escalations::RunSummary::from_stats(&stats);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
