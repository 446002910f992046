use crate::domain::ports::WebhookSender;
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use url::Url;

/// Delivers subscriber payloads with a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct ReqwestWebhookSender {
    client: reqwest::Client,
}

impl ReqwestWebhookSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookSender for ReqwestWebhookSender {
    async fn post_json(&self, uri: &Url, body: Bytes) -> Result<u16> {
        let response = self
            .client
            .post(uri.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| RelayError::DeliveryError(format!("POST {}: {}", uri, e)))?;

        Ok(response.status().as_u16())
    }
}
