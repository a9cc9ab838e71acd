use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use tracing::debug;

use crate::{
    error::ServiceConnectivityError,
    rest::{RestClient, RestResponse},
};

#[derive(Debug)]
pub struct MockResponse {
    pub(crate) status_code: u16,
    pub(crate) text: String,
}

impl MockResponse {
    pub fn new(status_code: u16, text: String) -> Self {
        MockResponse { status_code, text }
    }
}

/// Replays queued responses in order and records every requested url
#[derive(Default)]
pub struct MockRestClient {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<String>>,
}

impl MockRestClient {
    pub fn new() -> Self {
        MockRestClient::default()
    }

    pub fn add_response(&self, response: MockResponse) -> &Self {
        debug!("Push response: {response:?}");
        let mut responses = self.responses.lock().unwrap();
        responses.push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RestClient for MockRestClient {
    async fn get(
        &self,
        url: String,
        _headers: Option<HashMap<String, String>>,
    ) -> Result<RestResponse, ServiceConnectivityError> {
        self.requests.lock().unwrap().push(url);
        let mut responses = self.responses.lock().unwrap();
        let response = responses.pop_front().ok_or_else(|| {
            ServiceConnectivityError::Other(String::from("No response available for GET request"))
        })?;
        debug!("Pop GET response: {response:?}");

        Ok(RestResponse {
            status: response.status_code,
            body: response.text,
        })
    }
}
