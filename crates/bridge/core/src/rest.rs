use std::{collections::HashMap, time::Duration};

use reqwest::Client;
use tracing::{debug, trace};

use crate::error::ServiceConnectivityError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Base backoff in milliseconds.
const BASE_BACKOFF_MILLIS: Duration = Duration::from_millis(256);

pub const RETRYABLE_ERROR_CODES: [u16; 3] = [
    429, // TOO_MANY_REQUESTS
    500, // INTERNAL_SERVER_ERROR
    503, // SERVICE_UNAVAILABLE
];

pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait RestClient: Send + Sync {
    /// Makes a GET request and logs on DEBUG.
    /// ### Arguments
    /// - `url`: the URL on which GET will be called
    /// - `headers`: optional headers that will be set on the request
    async fn get(
        &self,
        url: String,
        headers: Option<HashMap<String, String>>,
    ) -> Result<RestResponse, ServiceConnectivityError>;
}

pub struct ReqwestRestClient {
    client: Client,
}

impl ReqwestRestClient {
    pub fn new() -> Result<Self, ServiceConnectivityError> {
        let client = Client::builder()
            .build()
            .map_err(Into::<ServiceConnectivityError>::into)?;
        Ok(ReqwestRestClient { client })
    }
}

#[async_trait::async_trait]
impl RestClient for ReqwestRestClient {
    async fn get(
        &self,
        url: String,
        headers: Option<HashMap<String, String>>,
    ) -> Result<RestResponse, ServiceConnectivityError> {
        debug!("Making GET request to: {url}");
        let mut req = self.client.get(url).timeout(REQUEST_TIMEOUT);
        if let Some(headers) = headers {
            for (key, value) in &headers {
                req = req.header(key, value);
            }
        }
        let response = req.send().await?;
        let status = response.status().into();
        let body = response.text().await?;
        debug!("Received response, status: {status}");
        trace!("raw response body: {body}");

        Ok(RestResponse { status, body })
    }
}

/// Builds `base/path?key=value...` with the query parameters percent-encoded.
pub fn build_url(
    base_url: &str,
    path: &str,
    params: &[(&str, String)],
) -> Result<String, ServiceConnectivityError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), path);
    reqwest::Url::parse_with_params(&url, params)
        .map(String::from)
        .map_err(|e| ServiceConnectivityError::Builder(format!("invalid url {url}: {e}")))
}

/// GETs `url`, retrying with exponential backoff while the service answers with a
/// retryable status code. Any other non-success status is returned as an error.
pub async fn get_with_retry(
    max_retries: usize,
    url: &str,
    client: &dyn RestClient,
) -> Result<String, ServiceConnectivityError> {
    let mut delay = BASE_BACKOFF_MILLIS;
    let mut attempts = 0_usize;

    loop {
        let response = client.get(url.to_string(), None).await?;
        match response.status {
            status if attempts < max_retries && is_status_retryable(status) => {
                debug!("Retrying GET {url} after status {status}, attempt {attempts}");
                tokio::time::sleep(delay).await;
                attempts = attempts.saturating_add(1);
                delay = delay.saturating_mul(2);
            }
            _ if response.is_success() => return Ok(response.body),
            status => {
                return Err(ServiceConnectivityError::Status {
                    status,
                    body: response.body,
                });
            }
        }
    }
}

fn is_status_retryable(status: u16) -> bool {
    RETRYABLE_ERROR_CODES.contains(&status)
}

pub fn parse_json<T>(json: &str) -> Result<T, ServiceConnectivityError>
where
    for<'a> T: serde::de::Deserialize<'a>,
{
    serde_json::from_str::<T>(json).map_err(|e| ServiceConnectivityError::Json(e.to_string()))
}
