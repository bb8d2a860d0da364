//! HTTP implementation of the remote source

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::sync::error::RemoteError;
use crate::sync::remote::RemoteSource;
use crate::sync::types::UpdateDescriptor;

/// Remote source backed by plain GET requests against a static file host
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    update_path: String,
    payload_path: String,
}

impl HttpRemote {
    /// Creates a new HttpRemote with custom base URL and endpoint paths
    pub fn new(base_url: &str, update_path: &str, payload_path: &str) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("stats-cache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            update_path: update_path.trim_start_matches('/').to_string(),
            payload_path: payload_path.trim_start_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Self::new(&config.base_url, &config.update_path, &config.payload_path())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<D: DeserializeOwned>(&self, path: &str) -> Result<D, RemoteError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(url));
        }

        if !status.is_success() {
            warn!("Remote returned status {}: {}", status, url);
            return Err(RemoteError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse response from {}: {}", url, e);
            RemoteError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_update_descriptor(&self) -> Result<UpdateDescriptor, RemoteError> {
        self.get_json(&self.update_path).await
    }

    async fn fetch_payload(&self) -> Result<serde_json::Value, RemoteError> {
        self.get_json(&self.payload_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SUPPORTED_SCHEMA_VERSION;
    use mockito::Server;
    use serde_json::json;

    fn remote_for(server: &Server) -> HttpRemote {
        HttpRemote::new(&server.url(), "update.json", "versions/1.8/stats.json").unwrap()
    }

    #[tokio::test]
    async fn fetch_update_descriptor_parses_descriptor() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/update.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"lastUpdate": 1712345678, "schemaVersion": "1.8"}"#)
            .create_async()
            .await;

        let remote = remote_for(&server);
        let result = remote.fetch_update_descriptor().await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            result,
            UpdateDescriptor {
                last_update: 1_712_345_678,
                schema_version: "1.8".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn fetch_payload_returns_raw_document() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/versions/1.8/stats.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"Titan": {"Mobility": [0, 1, 2]}}"#)
            .create_async()
            .await;

        let remote = remote_for(&server);
        let result = remote.fetch_payload().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({"Titan": {"Mobility": [0, 1, 2]}}));
    }

    #[tokio::test]
    async fn from_config_fetches_payload_for_supported_schema() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock(
                "GET",
                format!("/versions/{}/CharacterStatInfo-NI.json", SUPPORTED_SCHEMA_VERSION).as_str(),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let config = RemoteConfig {
            base_url: server.url(),
            ..RemoteConfig::default()
        };
        let remote = HttpRemote::from_config(&config).unwrap();
        let result = remote.fetch_payload().await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({}));
    }

    #[tokio::test]
    async fn fetch_update_descriptor_returns_not_found_on_404() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/update.json")
            .with_status(404)
            .create_async()
            .await;

        let remote = remote_for(&server);
        let result = remote.fetch_update_descriptor().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RemoteError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_payload_returns_invalid_response_on_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/versions/1.8/stats.json")
            .with_status(500)
            .create_async()
            .await;

        let remote = remote_for(&server);
        let result = remote.fetch_payload().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RemoteError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn fetch_update_descriptor_returns_invalid_response_on_malformed_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/update.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let remote = remote_for(&server);
        let result = remote.fetch_update_descriptor().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RemoteError::InvalidResponse(_))));
    }

    #[test]
    fn url_joins_base_and_path_without_duplicate_slashes() {
        let remote = HttpRemote::new("https://example.com/data/", "/update.json", "p.json").unwrap();
        assert_eq!(
            remote.url(&remote.update_path),
            "https://example.com/data/update.json"
        );
    }
}
