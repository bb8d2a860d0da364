//! Remote test utilities

use std::sync::Arc;

use mockito::{Mock, ServerGuard};
use serde_json::Value;

use stats_cache::sync::remote::RemoteSource;
use stats_cache::sync::remotes::HttpRemote;

pub const UPDATE_PATH: &str = "/update.json";
pub const PAYLOAD_PATH: &str = "/versions/1.8/CharacterStatInfo-NI.json";

/// Mock the update endpoint, expecting exactly one request
pub async fn mock_update(server: &mut ServerGuard, last_update: i64, schema_version: &str) -> Mock {
    server
        .mock("GET", UPDATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "lastUpdate": last_update,
                "schemaVersion": schema_version,
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await
}

/// Mock the payload endpoint, expecting `hits` requests
pub async fn mock_payload(server: &mut ServerGuard, body: &Value, hits: usize) -> Mock {
    server
        .mock("GET", PAYLOAD_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(hits)
        .create_async()
        .await
}

pub fn http_remote(server: &ServerGuard) -> Arc<dyn RemoteSource> {
    Arc::new(HttpRemote::new(&server.url(), UPDATE_PATH, PAYLOAD_PATH).unwrap())
}

/// Remote pointing at a port nothing listens on
pub fn unreachable_remote() -> Arc<dyn RemoteSource> {
    Arc::new(HttpRemote::new("http://127.0.0.1:9", UPDATE_PATH, PAYLOAD_PATH).unwrap())
}
