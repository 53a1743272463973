use anyhow::Context;
use colibri_backend::config::AppConfig;
use colibri_backend::{create_router, initialize_backend, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    logging::init();

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config);

    info!("Starting server on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!("Listening on {}", config.addr);

    axum::serve(listener, app).await?;
    Ok(())
}
