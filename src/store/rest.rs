//! HTTP client for the hosted data platform's REST surface.
//!
//! Speaks the PostgREST dialect the platform exposes under `/rest/v1`:
//! equality filters as `column=eq.value` query parameters, merge upserts via
//! `on_conflict` plus a `Prefer: resolution=merge-duplicates` header, and
//! exact counts read back from the `Content-Range` header.

use serde_json::Value;

use crate::config::Config;

use super::{Filter, RemoteStore, SelectQuery, StoreError};

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl RestStore {
    /// Build a client from the environment-derived [`Config`]. The request
    /// timeout applies to every call.
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.remote_url.trim_end_matches('/').to_string(),
            api_key: config.remote_api_key.clone(),
            access_token: config.remote_access_token.clone(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    /// Every request carries the project key; the bearer token is the
    /// session token when one exists, otherwise the key again (anonymous
    /// access level).
    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {bearer}"))
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            let body = read_body(response).await;
            return Err(StoreError::Conflict(body));
        }
        if !status.is_success() {
            let body = read_body(response).await;
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_rows(response: reqwest::Response) -> Result<Vec<Value>, StoreError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Vec<Value>>().await?)
    }

    /// A `return=representation` write comes back as a one-row array.
    async fn parse_row(response: reqwest::Response) -> Result<Value, StoreError> {
        let mut rows = Self::parse_rows(response).await?;
        if rows.is_empty() {
            return Err(StoreError::Api {
                status: 200,
                body: "write returned no representation".into(),
            });
        }
        Ok(rows.remove(0))
    }
}

async fn read_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string())
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
        .collect()
}

fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(&query.filters));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// `Content-Range: 0-24/3573` carries the exact count after the slash;
/// `*/0` when nothing matched.
fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.parse().ok()
}

#[async_trait::async_trait]
impl RemoteStore for RestStore {
    async fn insert(&self, collection: &str, row: Value) -> Result<Value, StoreError> {
        let response = self
            .request(reqwest::Method::POST, self.collection_url(collection))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::parse_row(response).await
    }

    async fn upsert(
        &self,
        collection: &str,
        conflict_columns: &[&str],
        row: Value,
    ) -> Result<Value, StoreError> {
        let url = format!(
            "{}?on_conflict={}",
            self.collection_url(collection),
            conflict_columns.join(",")
        );
        let response = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row)
            .send()
            .await?;
        Self::parse_row(response).await
    }

    async fn select(
        &self,
        collection: &str,
        query: SelectQuery,
    ) -> Result<Vec<Value>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, self.collection_url(collection))
            .query(&select_params(&query))
            .send()
            .await?;
        Self::parse_rows(response).await
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let response = self
            .request(reqwest::Method::HEAD, self.collection_url(collection))
            .query(&filter_params(filters))
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let count = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .unwrap_or(0);
        Ok(count)
    }
}
