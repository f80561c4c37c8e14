use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use numu_api::AppState;
use numu_core::{MarketSnapshot, Marketplace};
use numu_db::Database;

/// Rebuilds the marketplace from the newest stored snapshot, if any.
pub fn restore(db: &Database) -> Result<Option<Marketplace>> {
    let Some(row) = db.latest_snapshot()? else {
        return Ok(None);
    };
    let snapshot: MarketSnapshot = serde_json::from_str(&row.payload)
        .with_context(|| format!("snapshot v{} is corrupt", row.version))?;
    Ok(Some(Marketplace::restore(snapshot)))
}

/// Writes a snapshot whenever the marketplace version has moved past the
/// last one written. Mutations never persist on their own.
pub struct Persister {
    state: AppState,
    persisted: u64,
    keep: u32,
}

impl Persister {
    pub fn new(state: AppState, persisted: u64, keep: u32) -> Self {
        Self {
            state,
            persisted,
            keep,
        }
    }

    pub fn persisted_version(&self) -> u64 {
        self.persisted
    }

    /// Returns whether a snapshot was written.
    pub async fn flush(&mut self) -> Result<bool> {
        let snapshot = {
            let market = self.state.market.read().await;
            if market.version() <= self.persisted {
                return Ok(false);
            }
            market.snapshot()
        };

        let version = snapshot.version;
        let payload = serde_json::to_string(&snapshot)?;
        let state = self.state.clone();
        let keep = self.keep;
        let pruned = tokio::task::spawn_blocking(move || {
            state.db.save_snapshot(version, &payload)?;
            state.db.prune_snapshots(keep)
        })
        .await??;

        self.persisted = version;
        debug!("Persisted marketplace v{} (pruned {})", version, pruned);
        Ok(true)
    }

    /// Flushes every `interval` until `shutdown` fires, then flushes once more.
    pub async fn run(mut self, interval: Duration, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.flush().await {
                        error!("Snapshot write failed: {:#}", e);
                    }
                }
                _ = &mut shutdown => break,
            }
        }

        match self.flush().await {
            Ok(_) => info!("Final snapshot at v{}", self.persisted),
            Err(e) => error!("Final snapshot write failed: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use numu_api::AppStateInner;
    use numu_remote::OfflineBackend;

    use super::*;
    use crate::seed;

    fn state() -> AppState {
        AppStateInner::new(
            Database::open_in_memory().unwrap(),
            Marketplace::new(),
            Arc::new(OfflineBackend),
            "secret".into(),
        )
    }

    #[tokio::test]
    async fn writes_only_when_the_version_moves() {
        let state = state();
        let mut persister = Persister::new(state.clone(), 0, 10);
        assert!(!persister.flush().await.unwrap());

        seed::seed_if_empty(&mut *state.market.write().await);
        assert!(persister.flush().await.unwrap());
        assert!(!persister.flush().await.unwrap());
        assert_eq!(persister.persisted_version(), state.market.read().await.version());
    }

    #[tokio::test]
    async fn restore_reads_back_the_latest_snapshot() {
        let state = state();
        assert!(restore(&state.db).unwrap().is_none());

        seed::seed_if_empty(&mut *state.market.write().await);
        let mut persister = Persister::new(state.clone(), 0, 10);
        persister.flush().await.unwrap();

        let restored = restore(&state.db).unwrap().unwrap();
        let live = state.market.read().await;
        assert_eq!(restored.version(), live.version());
        assert_eq!(restored.catalog().len(), live.catalog().len());
    }

    #[tokio::test]
    async fn run_flushes_on_shutdown() {
        let state = state();
        let persister = Persister::new(state.clone(), 0, 10);
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(persister.run(Duration::from_secs(3600), rx));

        seed::seed_if_empty(&mut *state.market.write().await);
        tx.send(()).unwrap();
        task.await.unwrap();

        let row = state.db.latest_snapshot().unwrap().unwrap();
        assert_eq!(row.version, state.market.read().await.version());
    }
}
