use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_recommender::{
    cache::build_cache,
    config::Config,
    routes::{create_router, AppState},
    services::{providers::TmdbProvider, MetadataService, RecommendationEngine},
    store::Stores,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Without valid artifacts no request can be served
    let stores = Stores::load(&config.movies_path, &config.similarity_path).with_context(|| {
        format!(
            "Failed to load recommendation data from {} and {}",
            config.movies_path, config.similarity_path
        )
    })?;

    let (cache, cache_writer) = build_cache(&config).await?;
    let provider = TmdbProvider::from_config(&config)?;
    let metadata = MetadataService::new(
        Arc::new(provider),
        cache,
        config.metadata_links(),
        config.metadata_timeout(),
    );

    let state = Arc::new(AppState {
        engine: RecommendationEngine::new(Arc::new(stores), config.self_exclusion),
        metadata,
        default_top_n: config.default_top_n,
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        address = %addr,
        self_exclusion = ?config.self_exclusion,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
