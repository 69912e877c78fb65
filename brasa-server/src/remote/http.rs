//! HTTP implementation of the remote store
//!
//! Talks to a Firebase-style REST tree: every path maps to
//! `{base}/{path}.json`, `POST` generates a child key and returns it as
//! `{"name": "<key>"}`, `PATCH` merges fields, `GET` on an interior path
//! returns the subtree keyed by child id.

use super::{RemoteError, RemoteResult, RemoteStore};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Request timeout; a slow backend must not stall the flush loop
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote store client over HTTP
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base: String,
}

impl HttpRemote {
    /// Create a client for the given base URL (trailing slash tolerated)
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base, path.trim_matches('/'))
    }

    async fn check_status(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(RemoteError::Status(status.as_u16()))
        }
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn push(&self, path: &str, value: &Value) -> RemoteResult<String> {
        let response = self
            .client
            .post(self.url(path))
            .json(value)
            .send()
            .await
            .map_err(transport)?;
        let body: Value = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        body.get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RemoteError::Decode("push response missing generated key".to_string()))
    }

    async fn set(&self, path: &str, value: &Value) -> RemoteResult<()> {
        let response = self
            .client
            .put(self.url(path))
            .json(value)
            .send()
            .await
            .map_err(transport)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn update(&self, path: &str, value: &Value) -> RemoteResult<()> {
        let response = self
            .client
            .patch(self.url(path))
            .json(value)
            .send()
            .await
            .map_err(transport)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn get(&self, path: &str) -> RemoteResult<Option<Value>> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport)?;
        let body: Value = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        // The backend encodes "nothing here" as JSON null
        if body.is_null() { Ok(None) } else { Ok(Some(body)) }
    }

    async fn delete(&self, path: &str) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(transport)?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_building_trims_slashes() {
        let remote = HttpRemote::new("https://pos.example.com/db/");
        assert_eq!(
            remote.url("orders/abc"),
            "https://pos.example.com/db/orders/abc.json"
        );
        assert_eq!(remote.url("/sales"), "https://pos.example.com/db/sales.json");
    }
}
