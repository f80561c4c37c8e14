use async_trait::async_trait;
use serde_json::Value;

use crate::{Backend, Filter, Order, RemoteError, RemoteUser, Session};

/// Stand-in used when no hosted backend is configured. Every call fails
/// with [`RemoteError::Offline`], so mutations are reported local-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

#[async_trait]
impl Backend for OfflineBackend {
    async fn select(&self, _: &str, _: &[Filter], _: Option<&Order>) -> Result<Vec<Value>, RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn insert(&self, _: &str, _: Value) -> Result<Value, RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn update(&self, _: &str, _: &str, _: Value) -> Result<(), RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn delete(&self, _: &str, _: &str) -> Result<(), RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn sign_in_with_password(&self, _: &str, _: &str) -> Result<Session, RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn sign_up(&self, _: &str, _: &str) -> Result<RemoteUser, RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn sign_out(&self, _: &str) -> Result<(), RemoteError> {
        Err(RemoteError::Offline)
    }

    async fn get_session(&self, _: &str) -> Result<RemoteUser, RemoteError> {
        Err(RemoteError::Offline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EQUIPMENT;

    #[tokio::test]
    async fn every_call_is_offline() {
        let backend = OfflineBackend;
        assert!(matches!(
            backend.select(EQUIPMENT, &[], None).await,
            Err(RemoteError::Offline)
        ));
        assert!(matches!(
            backend.sign_in_with_password("a@numu.sa", "secret123").await,
            Err(RemoteError::Offline)
        ));
    }
}
