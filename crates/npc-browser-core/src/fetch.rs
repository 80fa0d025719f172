// Fetcher: one GET against the Strapi NPC collection, parsed and normalized.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::BrowserError;
use crate::host::{HttpResponse, HttpSource};
use crate::model::{NpcRecord, RawEnvelope};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Collection path relative to the API base URL.
pub const NPC_RESOURCE_PATH: &str = "/api/npcs";

/// Ask Strapi to expand every relation (portraits live in one).
pub const POPULATE_ALL: &str = "populate=*";

/// Full request URL for the NPC collection.
pub fn npc_collection_url(base_url: &str) -> String {
    format!("{base_url}{NPC_RESOURCE_PATH}?{POPULATE_ALL}")
}

// ---------------------------------------------------------------------------
// ReqwestSource
// ---------------------------------------------------------------------------

/// Production HTTP transport.
#[derive(Clone)]
pub struct ReqwestSource {
    http: reqwest::Client,
}

impl ReqwestSource {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Client with an overall request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }
}

impl Default for ReqwestSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpSource for ReqwestSource {
    async fn get(&self, url: &str) -> Result<HttpResponse, BrowserError> {
        let response = self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| BrowserError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BrowserError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// NpcFetcher
// ---------------------------------------------------------------------------

/// Issues the collection request through an `HttpSource` and normalizes the
/// result. No caching and no retry: every call goes to the network.
pub struct NpcFetcher<S> {
    source: S,
}

impl<S: HttpSource> NpcFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch every NPC under `base_url`.
    pub async fn fetch_all(&self, base_url: &str) -> Result<Vec<NpcRecord>, BrowserError> {
        let url = npc_collection_url(base_url);
        debug!(%url, "requesting NPC collection");

        let response = self.source.get(&url).await?;
        if !response.is_success() {
            warn!(status = response.status, "NPC collection request failed");
            return Err(BrowserError::Remote {
                status: response.status,
            });
        }

        let records = parse_npc_envelope(&response.body, base_url)?;
        info!(count = records.len(), "fetched NPCs");
        Ok(records)
    }
}

/// Parse a Strapi collection body and normalize every item.
///
/// Only an envelope that fails to parse is an error; individual garbled
/// attributes fall back to their defaults.
pub fn parse_npc_envelope(body: &str, base_url: &str) -> Result<Vec<NpcRecord>, BrowserError> {
    let envelope: RawEnvelope = serde_json::from_str(body)
        .map_err(|e| BrowserError::MalformedResponse(e.to_string()))?;

    Ok(envelope
        .data
        .into_iter()
        .map(|raw| raw.normalize(base_url))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHttpSource;
    use crate::model::{NpcId, PLACEHOLDER_PORTRAIT};

    const BASE: &str = "https://api.example.com";

    fn responding(status: u16, body: &'static str) -> MockHttpSource {
        let mut source = MockHttpSource::new();
        source
            .expect_get()
            .withf(|url| url.to_string() == "https://api.example.com/api/npcs?populate=*")
            .times(1)
            .returning(move |_| {
                Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                })
            });
        source
    }

    #[test]
    fn collection_url_requests_full_population() {
        assert_eq!(
            npc_collection_url("http://localhost:1337"),
            "http://localhost:1337/api/npcs?populate=*"
        );
    }

    #[test]
    fn parse_envelope_normalizes_each_item() {
        let body = r#"{
            "data": [
                { "id": 1, "attributes": { "name": "Goblin", "campanha": "A",
                  "img": { "data": { "attributes": { "url": "/uploads/g.png" } } } } },
                { "id": 2, "attributes": { "name": null } }
            ],
            "meta": { "pagination": { "total": 2 } }
        }"#;
        let records = parse_npc_envelope(body, BASE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].image_url, "https://api.example.com/uploads/g.png");
        assert_eq!(records[1].id, NpcId::Int(2));
        assert_eq!(records[1].name, "Unnamed NPC");
        assert_eq!(records[1].image_url, PLACEHOLDER_PORTRAIT);
    }

    #[test]
    fn parse_envelope_rejects_non_json() {
        let err = parse_npc_envelope("<html>502</html>", BASE).unwrap_err();
        assert!(matches!(err, BrowserError::MalformedResponse(_)));
    }

    #[test]
    fn parse_envelope_rejects_missing_data() {
        let err = parse_npc_envelope(r#"{ "error": "nope" }"#, BASE).unwrap_err();
        assert!(matches!(err, BrowserError::MalformedResponse(_)));
    }

    #[test]
    fn parse_envelope_accepts_empty_data() {
        let records = parse_npc_envelope(r#"{ "data": [] }"#, BASE).unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn fetch_all_returns_records_on_success() {
        let fetcher = NpcFetcher::new(responding(
            200,
            r#"{ "data": [ { "id": 5, "attributes": { "name": "Orc" } } ] }"#,
        ));
        let records = fetcher.fetch_all(BASE).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Orc");
    }

    #[tokio::test]
    async fn fetch_all_maps_status_to_remote_error() {
        let fetcher = NpcFetcher::new(responding(500, "Internal Server Error"));
        let err = fetcher.fetch_all(BASE).await.unwrap_err();
        assert!(matches!(err, BrowserError::Remote { status: 500 }));
    }

    #[tokio::test]
    async fn fetch_all_maps_bad_body_to_malformed() {
        let fetcher = NpcFetcher::new(responding(200, "{ truncated"));
        let err = fetcher.fetch_all(BASE).await.unwrap_err();
        assert!(matches!(err, BrowserError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn fetch_all_passes_transport_errors_through() {
        let mut source = MockHttpSource::new();
        source
            .expect_get()
            .returning(|_| Err(BrowserError::Transport("connection refused".into())));
        let fetcher = NpcFetcher::new(source);
        let err = fetcher.fetch_all(BASE).await.unwrap_err();
        assert!(matches!(err, BrowserError::Transport(_)));
    }
}
