use super::{AccountStatus, Record, RemoteStore, Subscription};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Container identifier header sent on every request.
const CONTAINER_HEADER: &str = "X-Container-Id";

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[allow(dead_code)]
    error: String,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    records: Vec<QueryResult>,
}

/// One record slot in a query response; the server reports undeliverable
/// records in place rather than dropping them from the batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
enum QueryResult {
    Success { record: Record },
    Failure { key: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct AccountStatusResponse {
    status: AccountStatus,
}

/// `RemoteStore` over the record database's JSON HTTP API.
pub struct HttpStore {
    client: Client,
    base_url: String,
    container_id: String,
}

impl HttpStore {
    pub fn new(base_url: String, container_id: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(HttpStore {
            client,
            base_url,
            container_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(CONTAINER_HEADER, &self.container_id)
    }

    /// Map a non-success response onto the typed error kinds.
    async fn reject(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::NotAuthenticated,
            StatusCode::INSUFFICIENT_STORAGE => StoreError::QuotaExceeded,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::ServerRejected(message)
            }
            status => StoreError::Other(format!("unexpected status {status}: {message}")),
        }
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn save(&self, record: Record) -> Result<Record> {
        let url = format!("{}/records", self.base_url);
        debug!("Saving record {} to {url}", record.key);

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&record)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json::<Record>().await?),
            _ => Err(Self::reject(response).await),
        }
    }

    async fn query_all(&self, record_type: &str) -> Result<Vec<Result<Record>>> {
        let url = format!("{}/records/{record_type}", self.base_url);
        debug!("Querying all {record_type} records at {url}");

        let response = self.request(reqwest::Method::GET, &url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body: QueryResponse = response.json().await?;
                Ok(body
                    .records
                    .into_iter()
                    .map(|slot| match slot {
                        QueryResult::Success { record } => Ok(record),
                        QueryResult::Failure { key, reason } => {
                            Err(StoreError::Decode(format!("record {key}: {reason}")))
                        }
                    })
                    .collect())
            }
            _ => Err(Self::reject(response).await),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let url = format!("{}/records/{key}", self.base_url);
        debug!("Deleting record at {url}");

        let response = self.request(reqwest::Method::DELETE, &url).send().await?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            // Already gone counts as deleted.
            StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Self::reject(response).await),
        }
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let url = format!("{}/subscriptions", self.base_url);
        debug!("Listing subscriptions at {url}");

        let response = self.request(reqwest::Method::GET, &url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<Vec<Subscription>>().await?),
            _ => Err(Self::reject(response).await),
        }
    }

    async fn create_subscription(&self, subscription: Subscription) -> Result<()> {
        let url = format!("{}/subscriptions", self.base_url);
        debug!("Creating subscription {} at {url}", subscription.id);

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&subscription)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            _ => Err(Self::reject(response).await),
        }
    }

    async fn account_status(&self) -> Result<AccountStatus> {
        let url = format!("{}/account/status", self.base_url);
        debug!("Checking account status at {url}");

        let response = self.request(reqwest::Method::GET, &url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body: AccountStatusResponse = response.json().await?;
                Ok(body.status)
            }
            _ => Err(Self::reject(response).await),
        }
    }
}
