use crate::domain::account::AccountResource;
use crate::domain::ports::BankingApi;
use crate::domain::transaction::TransactionResource;
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Single-resource response document.
#[derive(Debug, Deserialize)]
struct Document<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct PageLinks {
    #[serde(default)]
    next: Option<String>,
}

/// Paginated collection response document.
#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
    #[serde(default)]
    links: PageLinks,
}

/// HTTP client for the Up banking API.
#[derive(Clone)]
pub struct UpClient {
    client: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl UpClient {
    /// Creates a client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.up.com.au/api/v1/`.
    /// * `access_token` - Personal access token sent as a bearer token.
    /// * `timeout` - Budget for each request.
    pub fn new(base_url: &str, access_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| RelayError::UpstreamError(format!("invalid API base url: {}", e)))?;
        // Relative joins drop the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            access_token: access_token.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RelayError::UpstreamError(format!("invalid endpoint {}: {}", path, e)))
    }

    async fn request<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamError(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamError(format!(
                "GET {} returned HTTP {}",
                url, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RelayError::UpstreamError(format!("GET {}: invalid body: {}", url, e)))
    }

    /// Fetches every transaction, following pagination links.
    pub async fn list_transactions(&self, page_size: u16) -> Result<Vec<TransactionResource>> {
        let mut url = self.endpoint("transactions")?;
        url.query_pairs_mut()
            .append_pair("page[size]", &page_size.to_string());

        let mut transactions = Vec::new();
        loop {
            let page: Page<TransactionResource> = self.request(url).await?;
            tracing::debug!(count = page.data.len(), "fetched transaction page");
            transactions.extend(page.data);

            match page.links.next {
                Some(next) => {
                    url = Url::parse(&next).map_err(|e| {
                        RelayError::UpstreamError(format!("invalid next link {}: {}", next, e))
                    })?
                }
                None => break,
            }
        }

        Ok(transactions)
    }
}

#[async_trait]
impl BankingApi for UpClient {
    async fn get_transaction(&self, id: &str) -> Result<TransactionResource> {
        let url = self.endpoint(&format!("transactions/{}", id))?;
        let document: Document<TransactionResource> = self.request(url).await?;
        Ok(document.data)
    }

    async fn get_account(&self, id: &str) -> Result<AccountResource> {
        let url = self.endpoint(&format!("accounts/{}", id))?;
        let document: Document<AccountResource> = self.request(url).await?;
        Ok(document.data)
    }
}
