//! PostgREST data client.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::auth_client::build_http_client;
use super::{BackendError, DataStore, Query};
use crate::config::BackendConfig;
use crate::models::AccessToken;

/// Client for the `/rest/v1` endpoints.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base: Url,
    anon_key: SecretString,
}

impl RestClient {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = build_http_client(config)?;
        let base = config
            .url
            .join("rest/v1/")
            .map_err(|e| BackendError::Malformed(format!("invalid REST URL: {e}")))?;

        Ok(Self {
            client,
            base,
            anon_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self, table: &str, params: &[(String, String)]) -> Result<Url, BackendError> {
        let mut url = self
            .base
            .join(table)
            .map_err(|e| BackendError::Malformed(format!("invalid table name {table}: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Authorize as the signed-in user, or as the anonymous role.
    fn authorize(&self, request: RequestBuilder, token: Option<&AccessToken>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request.bearer_auth(self.anon_key.expose_secret()),
        }
    }

    async fn rows(request: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::from_response(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&body)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }
}

#[async_trait]
impl DataStore for RestClient {
    #[instrument(skip(self, token), fields(table = query.table_name()))]
    async fn select(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(query.table_name(), &query.params())?;
        Self::rows(self.authorize(self.client.get(url), token)).await
    }

    #[instrument(skip(self, token, rows), fields(table = table, count = rows.len()))]
    async fn insert(
        &self,
        token: Option<&AccessToken>,
        table: &str,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table, &[])?;
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(&rows);
        Self::rows(self.authorize(request, token)).await
    }

    #[instrument(skip(self, token, patch), fields(table = query.table_name()))]
    async fn update(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(query.table_name(), &query.filter_params())?;
        let request = self
            .client
            .patch(url)
            .header("Prefer", "return=representation")
            .json(&patch);
        Self::rows(self.authorize(request, token)).await
    }

    #[instrument(skip(self, token), fields(table = query.table_name()))]
    async fn delete(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(query.table_name(), &query.filter_params())?;
        let request = self
            .client
            .delete(url)
            .header("Prefer", "return=representation");
        Self::rows(self.authorize(request, token)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client() -> RestClient {
        let config = BackendConfig::new(
            "https://abcd1234.supabase.co",
            SecretString::from("anon-key-value"),
            Duration::from_secs(5),
        )
        .unwrap();
        RestClient::new(&config).unwrap()
    }

    #[test]
    fn test_select_url_carries_filters_and_order() {
        let query = Query::table("cart_items")
            .eq("user_id", "c1a7e0f2-4b9d-4d8e-a2f3-5e6d7c8b9a01")
            .order("created_at", false);
        let url = client()
            .table_url(query.table_name(), &query.params())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abcd1234.supabase.co/rest/v1/cart_items?select=*&user_id=eq.c1a7e0f2-4b9d-4d8e-a2f3-5e6d7c8b9a01&order=created_at.desc"
        );
    }

    #[test]
    fn test_mutation_url_has_no_select() {
        let query = Query::table("users").eq("email", "a+b@c.co");
        let url = client()
            .table_url(query.table_name(), &query.filter_params())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abcd1234.supabase.co/rest/v1/users?email=eq.a%2Bb%40c.co"
        );
    }

    #[test]
    fn test_insert_url_is_bare_table() {
        let url = client().table_url("cart_items", &[]).unwrap();
        assert_eq!(url.as_str(), "https://abcd1234.supabase.co/rest/v1/cart_items");
    }
}
