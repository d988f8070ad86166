use anyhow::Context;
use dotenv::dotenv;
use tracing::info;

use atelier_backend::{app, app_state::AppState, config, db, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let telemetry = telemetry::init_telemetry(None).await?;

    let env = config::init()?.clone();
    let pool = db::init_pool().await?;
    let state = AppState::new(pool, env);

    let addr = state.env.server_addr();
    info!("{} listening on {}", state.env.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app::create_router(state))
        .await
        .context("Failed to serve application")?;

    telemetry.shutdown().await?;

    Ok(())
}
