use std::sync::Arc;

use axum::http::StatusCode;
use tokio::sync::RwLock;
use tracing::error;

use numu_core::Marketplace;
use numu_db::Database;
use numu_gateway::Dispatcher;
use numu_remote::Backend;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub market: RwLock<Marketplace>,
    pub remote: Arc<dyn Backend>,
    pub dispatcher: Dispatcher,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(
        db: Database,
        market: Marketplace,
        remote: Arc<dyn Backend>,
        jwt_secret: String,
    ) -> AppState {
        Arc::new(Self {
            db,
            market: RwLock::new(market),
            remote,
            dispatcher: Dispatcher::new(),
            jwt_secret,
        })
    }
}

/// Runs a blocking database call off the async runtime.
pub async fn run_db<T, F>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("Database error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
