use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::traits::QuoteApi;
use super::types::{ApiResponse, StatusUpdate};
use crate::app::ApiConfig;
use crate::models::{Quote, QuoteStatus};
use crate::utils::{AdminError, Result};

/// `QuoteApi` over HTTP, speaking the `/api/1.0/` envelope protocol
pub struct HttpQuoteApi {
    client: Client,
    base_url: String,
}

impl HttpQuoteApi {
    /// Create a client rooted at `base_url` (e.g. `http://host/api/1.0`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one quote; the id is an opaque string and goes in as a single path segment
    fn quote_url(&self, id: &str, suffix: &str) -> String {
        self.url(&format!("/quotes/{}{}", urlencoding::encode(id), suffix))
    }

    /// Send a request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            AdminError::NetworkError(format!("Failed to connect to {}: {}", self.base_url, e))
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!("quotes API answered {} ({} bytes)", status, body.len());

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(AdminError::ApplicationError(format!(
                    "Server responded with status {}",
                    status
                )));
            }
            Err(e) => {
                return Err(AdminError::ApplicationError(format!(
                    "Malformed response from server: {}",
                    e
                )));
            }
        };

        if !envelope.success || !status.is_success() {
            let message = if envelope.message.trim().is_empty() {
                format!("Request failed with status {}", status)
            } else {
                envelope.message
            };
            return Err(AdminError::ApplicationError(message));
        }

        envelope.data.ok_or_else(|| {
            AdminError::ApplicationError("Response did not include any data".to_string())
        })
    }
}

#[async_trait]
impl QuoteApi for HttpQuoteApi {
    async fn list_quotes(&self) -> Result<Vec<Quote>> {
        self.send(self.client.get(self.url("/quotes"))).await
    }

    async fn update_quote(&self, id: &str, payload: &Quote) -> Result<Quote> {
        let request = self
            .client
            .put(self.quote_url(id, ""))
            .json(payload);
        self.send(request).await
    }

    async fn update_status(&self, id: &str, status: QuoteStatus) -> Result<Quote> {
        let request = self
            .client
            .patch(self.quote_url(id, "/status"))
            .json(&StatusUpdate { status });
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_quote;
    use httpmock::prelude::*;
    use serde_json::json;

    fn api_for(server: &MockServer) -> HttpQuoteApi {
        HttpQuoteApi::new(&server.url("/api/1.0/"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let api = HttpQuoteApi::new("http://localhost:3000/api/1.0/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000/api/1.0");
        assert_eq!(api.url("/quotes"), "http://localhost:3000/api/1.0/quotes");
    }

    #[test]
    fn test_quote_ids_are_escaped_as_one_segment() {
        let api = HttpQuoteApi::new("http://localhost:3000/api/1.0", Duration::from_secs(1)).unwrap();
        assert_eq!(api.quote_url("q-1", ""), "http://localhost:3000/api/1.0/quotes/q-1");
        assert_eq!(
            api.quote_url("q#1/a?b", "/status"),
            "http://localhost:3000/api/1.0/quotes/q%231%2Fa%3Fb/status"
        );
    }

    #[tokio::test]
    async fn test_status_update_for_id_with_reserved_characters() {
        let server = MockServer::start_async().await;
        let mut approved = sample_quote("q#1", QuoteStatus::Approved);
        approved.updated_at = Some("2024-03-21T09:00:00Z".to_string());

        let status_mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path_prefix("/api/1.0/quotes/q")
                    .path_includes("/status");
                then.status(200)
                    .json_body(json!({"success": true, "message": "ok", "data": approved}));
            })
            .await;
        let truncated_mock = server
            .mock_async(|when, then| {
                when.method(PATCH).path("/api/1.0/quotes/q");
                then.status(200)
                    .json_body(json!({"success": true, "message": "ok", "data": approved}));
            })
            .await;

        let updated = api_for(&server)
            .update_status("q#1", QuoteStatus::Approved)
            .await
            .unwrap();

        assert_eq!(status_mock.hits_async().await, 1);
        assert_eq!(truncated_mock.hits_async().await, 0);
        assert_eq!(updated.id, "q#1");
    }

    #[tokio::test]
    async fn test_list_quotes() {
        let server = MockServer::start_async().await;
        let quote = sample_quote("q-1", QuoteStatus::Pending);
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/1.0/quotes");
                then.status(200)
                    .json_body(json!({"success": true, "message": "ok", "data": [quote]}));
            })
            .await;

        let quotes = api_for(&server).list_quotes().await.unwrap();

        mock.assert_async().await;
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].id, "q-1");
        assert_eq!(quotes[0].status, QuoteStatus::Pending);
    }

    #[tokio::test]
    async fn test_success_false_is_an_application_error_on_200() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/1.0/quotes");
                then.status(200)
                    .json_body(json!({"success": false, "message": "Session expired"}));
            })
            .await;

        let err = api_for(&server).list_quotes().await.unwrap_err();
        match err {
            AdminError::ApplicationError(msg) => assert_eq!(msg, "Session expired"),
            other => panic!("Expected application error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_without_envelope() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/1.0/quotes/q-1");
                then.status(502).body("Bad Gateway");
            })
            .await;

        let quote = sample_quote("q-1", QuoteStatus::Pending);
        let err = api_for(&server).update_quote("q-1", &quote).await.unwrap_err();
        match err {
            AdminError::ApplicationError(msg) => assert!(msg.contains("502")),
            other => panic!("Expected application error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_quote_sends_full_payload() {
        let server = MockServer::start_async().await;
        let mut quote = sample_quote("q-1", QuoteStatus::Pending);
        quote.extra.insert("channel".to_string(), json!("web"));
        let mut recalculated = quote.clone();
        recalculated.final_premium = Some(700.0);

        let sent = serde_json::to_value(&quote).unwrap();
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/1.0/quotes/q-1")
                    .json_body(sent.clone());
                then.status(200)
                    .json_body(json!({"success": true, "message": "updated", "data": recalculated}));
            })
            .await;

        let updated = api_for(&server).update_quote("q-1", &quote).await.unwrap();

        mock.assert_async().await;
        assert_eq!(updated.final_premium, Some(700.0));
    }

    #[tokio::test]
    async fn test_update_status_sends_only_status() {
        let server = MockServer::start_async().await;
        let mut approved = sample_quote("q-1", QuoteStatus::Approved);
        approved.updated_at = Some("2024-03-21T09:00:00Z".to_string());

        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/api/1.0/quotes/q-1/status")
                    .json_body(json!({"status": "approved"}));
                then.status(200)
                    .json_body(json!({"success": true, "message": "ok", "data": approved}));
            })
            .await;

        let updated = api_for(&server)
            .update_status("q-1", QuoteStatus::Approved)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(updated.status, QuoteStatus::Approved);
    }

    #[tokio::test]
    async fn test_missing_data_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/1.0/quotes");
                then.status(200).json_body(json!({"success": true, "message": "ok"}));
            })
            .await;

        let err = api_for(&server).list_quotes().await.unwrap_err();
        assert!(matches!(err, AdminError::ApplicationError(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_error() {
        // Port 1 is reserved and refuses connections
        let api = HttpQuoteApi::new("http://127.0.0.1:1/api/1.0", Duration::from_secs(2)).unwrap();
        let err = api.list_quotes().await.unwrap_err();
        assert!(matches!(err, AdminError::NetworkError(_)));
    }
}
