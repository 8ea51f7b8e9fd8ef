mod api;
mod config;
mod core;
mod error;
mod infra;
mod models;

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

pub mod ax_state {
    use crate::config::AppConfig;
    use crate::core::catalog::QueryCatalog;
    use crate::core::session::SessionRegistry;
    use crate::core::synthesizer::FilterSynthesizer;
    use crate::infra::store::AsteroidStore;

    pub struct AppState {
        pub catalog: QueryCatalog,
        pub synthesizer: FilterSynthesizer,
        pub sessions: SessionRegistry,
        pub store: AsteroidStore,
    }

    impl AppState {
        pub fn new(config: &AppConfig) -> Self {
            let catalog = QueryCatalog;
            Self {
                catalog,
                synthesizer: FilterSynthesizer::new(config.splice_mode),
                sessions: SessionRegistry::new(catalog),
                store: AsteroidStore::new(config.store.clone()),
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("asteroid_dashboard=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let state = Arc::new(ax_state::AppState::new(&config));

    // 连接失败对整个会话是致命的，启动时就暴露出来
    if let Err(e) = state.store.pool().await {
        error!("无法连接 MySQL 数据库: {}", e);
        return Err(e.into());
    }

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!(
        "🚀 小行星仪表盘运行在 http://{} (splice_mode={:?})",
        config.bind_addr, config.splice_mode
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
