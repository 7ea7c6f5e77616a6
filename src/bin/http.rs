#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use rollout_tool::persistence::{GroupPlanStore, MemoryGroupStore};
    use rollout_tool::{EngineConfig, http_api};
    use tracing::info;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr: SocketAddr = std::env::var("ROLLOUT_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let engine = EngineConfig::from_env()?.build_engine()?;
    let store: Arc<dyn GroupPlanStore> = match std::env::var("ROLLOUT_DB_PATH") {
        #[cfg(feature = "sqlite")]
        Ok(path) => {
            info!(%path, "using sqlite group store");
            Arc::new(rollout_tool::persistence::sqlite::SqliteGroupStore::new(path)?)
        }
        _ => {
            info!("using in-memory group store");
            Arc::new(MemoryGroupStore::new())
        }
    };

    let state = http_api::AppState::with_shared(Arc::new(engine), store);
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
