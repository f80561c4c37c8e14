mod config;
mod import;
mod persist;
mod seed;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use numu_api::AppStateInner;
use numu_core::Marketplace;
use numu_remote::{Backend, HttpBackend, OfflineBackend};

use crate::config::Config;
use crate::persist::Persister;

const DEFAULT_LOG_FILTER: &str = "numu_server=debug,numu_api=debug,numu_core=debug,numu_db=debug,\
numu_gateway=debug,numu_remote=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = numu_db::Database::open(&PathBuf::from(&config.db_path))?;
    let mut market = persist::restore(&db)?.unwrap_or_else(Marketplace::new);
    let persisted = market.version();
    if config.seed {
        seed::seed_if_empty(&mut market);
    }

    let remote: Arc<dyn Backend> = match &config.remote {
        Some(remote) => {
            info!("Mirroring to remote backend at {}", remote.url);
            Arc::new(HttpBackend::new(&remote.url, &remote.key))
        }
        None => {
            info!("No remote backend configured, running local-only");
            Arc::new(OfflineBackend)
        }
    };
    let has_remote = config.remote.is_some();

    let state = AppStateInner::new(db, market, remote, config.jwt_secret.clone());
    if has_remote {
        import::import_remote_catalog(&state).await;
    }

    let (stop_persister, persister_stopped) = oneshot::channel();
    let persister = tokio::spawn(
        Persister::new(state.clone(), persisted, config.snapshot_keep)
            .run(config.persist_interval, persister_stopped),
    );

    let app = numu_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Numu server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    let _ = stop_persister.send(());
    persister.await?;
    Ok(())
}
