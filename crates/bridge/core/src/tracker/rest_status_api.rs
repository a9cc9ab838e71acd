use std::sync::Arc;

use tracing::info;

use crate::{
    BridgeError,
    models::{StatusRequest, StatusResponse},
    rest::{RestClient, build_url, get_with_retry, parse_json},
};

use super::StatusApi;

const STATUS_PATH: &str = "getTxStatus";

/// Status service of the bridge API
pub struct RestStatusApi {
    base_url: String,
    client: Arc<dyn RestClient>,
    max_retries: usize,
}

impl RestStatusApi {
    pub fn new(base_url: String, client: Arc<dyn RestClient>, max_retries: usize) -> Self {
        Self {
            base_url,
            client,
            max_retries,
        }
    }

    fn status_url(&self, request: &StatusRequest) -> Result<String, BridgeError> {
        let mut params = vec![
            ("bridgeId", request.bridge_id.clone()),
            ("srcTxHash", request.src_tx_hash.clone()),
            ("bridge", request.bridge.clone()),
            ("srcChainId", request.src_chain_id.to_string()),
            ("destChainId", request.dest_chain_id.to_string()),
        ];
        if let Some(refuel) = request.refuel {
            params.push(("refuel", refuel.to_string()));
        }
        Ok(build_url(&self.base_url, STATUS_PATH, &params)?)
    }
}

#[async_trait::async_trait]
impl StatusApi for RestStatusApi {
    async fn get_tx_status(&self, request: StatusRequest) -> Result<StatusResponse, BridgeError> {
        let url = self.status_url(&request)?;
        info!("Fetching bridge status for {}", request.src_tx_hash);
        let body = get_with_retry(self.max_retries, &url, self.client.as_ref()).await?;
        Ok(parse_json(&body)?)
    }
}
