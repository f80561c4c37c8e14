use tracing::warn;

use numu_types::api::{SyncStatus, SyncedResponse};

use crate::RemoteError;

/// A locally applied value plus whether its remote mirror succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum Synced<T> {
    Remote(T),
    LocalOnly { value: T, reason: String },
}

impl<T> Synced<T> {
    /// Pairs `value` with the outcome of mirroring it. `what` names the
    /// operation in the warning logged on failure.
    pub fn from_remote<R>(value: T, result: Result<R, RemoteError>, what: &str) -> Self {
        match result {
            Ok(_) => Synced::Remote(value),
            Err(e) => {
                warn!("Remote {} failed, kept local copy: {}", what, e);
                Synced::LocalOnly {
                    value,
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Synced::Remote(value) | Synced::LocalOnly { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Synced::Remote(value) | Synced::LocalOnly { value, .. } => value,
        }
    }

    pub fn is_local_only(&self) -> bool {
        matches!(self, Synced::LocalOnly { .. })
    }

    pub fn status(&self) -> SyncStatus {
        match self {
            Synced::Remote(_) => SyncStatus::Remote,
            Synced::LocalOnly { .. } => SyncStatus::LocalOnly,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Synced<U> {
        match self {
            Synced::Remote(value) => Synced::Remote(f(value)),
            Synced::LocalOnly { value, reason } => Synced::LocalOnly {
                value: f(value),
                reason,
            },
        }
    }

    pub fn into_response(self) -> SyncedResponse<T> {
        match self {
            Synced::Remote(data) => SyncedResponse {
                data,
                sync: SyncStatus::Remote,
                sync_error: None,
            },
            Synced::LocalOnly { value, reason } => SyncedResponse {
                data: value,
                sync: SyncStatus::LocalOnly,
                sync_error: Some(reason),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_keeps_the_local_value() {
        let synced = Synced::from_remote(7, Err::<(), _>(RemoteError::Offline), "insert");
        assert!(synced.is_local_only());
        assert_eq!(*synced.value(), 7);

        let response = synced.into_response();
        assert_eq!(response.sync, SyncStatus::LocalOnly);
        assert_eq!(response.sync_error.as_deref(), Some("remote backend is not configured"));
    }

    #[test]
    fn success_reports_remote() {
        let synced = Synced::from_remote("row", Ok::<_, RemoteError>(()), "insert").map(str::len);
        assert_eq!(synced, Synced::Remote(3));
        assert_eq!(synced.status(), SyncStatus::Remote);
        assert!(synced.into_response().sync_error.is_none());
    }
}
