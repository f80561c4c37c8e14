use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::{Backend, Filter, Order, RemoteError, RemoteUser, Session};

/// PostgREST data routes under `/rest/v1` and GoTrue auth routes under
/// `/auth/v1`, authenticated with the project's anon key.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// `bearer` defaults to the anon key for unauthenticated calls.
    fn request(&self, method: Method, url: &str, bearer: Option<&str>) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer.unwrap_or(self.api_key.as_str()))
    }
}

/// Query pairs for a PostgREST select.
pub fn select_params(filters: &[Filter], order: Option<&Order>) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for f in filters {
        params.push((f.column.clone(), format!("eq.{}", f.value)));
    }
    if let Some(order) = order {
        let dir = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
    }
    params
}

async fn checked(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(RemoteError::Http {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    let body = checked(resp).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, RemoteError> {
        let resp = self
            .request(Method::GET, &self.rest_url(table), None)
            .query(&select_params(filters, order))
            .send()
            .await?;
        let rows: Vec<Value> = decode(resp).await?;
        debug!("Selected {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, RemoteError> {
        let resp = self
            .request(Method::POST, &self.rest_url(table), None)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        // PostgREST answers with an array of the inserted rows.
        let mut rows: Vec<Value> = decode(resp).await?;
        Ok(if rows.is_empty() { row } else { rows.swap_remove(0) })
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<(), RemoteError> {
        let resp = self
            .request(Method::PATCH, &self.rest_url(table), None)
            .query(&[("id", format!("eq.{}", id))])
            .json(&patch)
            .send()
            .await?;
        checked(resp).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError> {
        let resp = self
            .request(Method::DELETE, &self.rest_url(table), None)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        checked(resp).await?;
        Ok(())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, RemoteError> {
        let resp = self
            .request(Method::POST, &self.auth_url("token"), None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        decode(resp).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<RemoteUser, RemoteError> {
        let resp = self
            .request(Method::POST, &self.auth_url("signup"), None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: Value = decode(resp).await?;
        signed_up_user(body)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), RemoteError> {
        let resp = self
            .request(Method::POST, &self.auth_url("logout"), Some(access_token))
            .send()
            .await?;
        checked(resp).await?;
        Ok(())
    }

    async fn get_session(&self, access_token: &str) -> Result<RemoteUser, RemoteError> {
        let resp = self
            .request(Method::GET, &self.auth_url("user"), Some(access_token))
            .send()
            .await?;
        decode(resp).await
    }
}

/// Signup returns a bare user when email confirmation is pending and a full
/// session otherwise.
fn signed_up_user(mut body: Value) -> Result<RemoteUser, RemoteError> {
    let user = match body.get_mut("user") {
        Some(user) => user.take(),
        None => body,
    };
    Ok(serde_json::from_value(user)?)
}
