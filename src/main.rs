use chirpy::{
    api::routes::build_router, db::DatabaseProvider, utils::config::Config, AppState,
};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "chirpy={level},chirpy_server={level},tower_http=info",
            level = config.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::parse();
    init_tracing(&config);
    config.validate()?;

    info!(?config, "starting chirpy");

    let db = DatabaseProvider::from_path(&config.database_path)
        .create_client()
        .await?;
    info!(path = %config.database_path, "database ready");

    let listen = config.listen;
    let state = AppState::new(config, Arc::new(db));
    let app = build_router(state);

    let listener = TcpListener::bind(listen).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
