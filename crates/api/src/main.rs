use anyhow::Context;

use yatube_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    yatube_observability::init();

    let config = ApiConfig::from_env()?;
    let store = yatube_api::app::build_store(&config.store).await?;
    let app = yatube_api::app::build_app(config.jwt_secret.clone(), store);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
