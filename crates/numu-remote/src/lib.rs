//! Client side of the hosted backend (a PostgREST data API plus a GoTrue
//! auth API). The local marketplace stays authoritative; everything here is
//! a best-effort mirror whose outcome is reported through [`Synced`].

pub mod error;
pub mod http;
pub mod offline;
pub mod rows;
pub mod synced;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::RemoteError;
pub use http::HttpBackend;
pub use offline::OfflineBackend;
pub use synced::Synced;

pub const USERS: &str = "users";
pub const EQUIPMENT: &str = "equipment";
pub const BOOKINGS: &str = "bookings";
pub const REVIEWS: &str = "reviews";

/// Equality predicate on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &str, value: impl ToString) -> Self {
        Self {
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: RemoteUser,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, RemoteError>;

    /// Returns the row as stored remotely.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, RemoteError>;

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<(), RemoteError>;

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, RemoteError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<RemoteUser, RemoteError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), RemoteError>;

    /// The user behind `access_token`, if the backend still honours it.
    async fn get_session(&self, access_token: &str) -> Result<RemoteUser, RemoteError>;
}
