pub mod rest_status_api;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    BridgeError, BridgeHistoryStorage,
    models::{BridgeHistoryItem, StartTrackingRequest, StatusRequest, StatusResponse},
    status::{StatusUpdate, apply_status},
};

/// Source of status snapshots for submitted bridge transactions
#[async_trait::async_trait]
pub trait StatusApi: Send + Sync {
    async fn get_tx_status(&self, request: StatusRequest) -> Result<StatusResponse, BridgeError>;
}

/// Keeps the bridge history of submitted transactions up to date.
///
/// Status writes go through a single lock, so concurrent polls never interleave their
/// read-modify-write of an item and the last applied snapshot wins.
pub struct BridgeStatusTracker {
    storage: Arc<dyn BridgeHistoryStorage>,
    status_api: Arc<dyn StatusApi>,
    write_lock: Mutex<()>,
}

impl BridgeStatusTracker {
    pub fn new(storage: Arc<dyn BridgeHistoryStorage>, status_api: Arc<dyn StatusApi>) -> Self {
        Self {
            storage,
            status_api,
            write_lock: Mutex::new(()),
        }
    }

    /// Records a submitted bridge transaction as pending.
    ///
    /// A transaction that is already tracked is returned as stored.
    pub async fn start_tracking(
        &self,
        request: StartTrackingRequest,
    ) -> Result<BridgeHistoryItem, BridgeError> {
        let src_tx_hash = request.src_tx_hash.trim();
        if src_tx_hash.is_empty() {
            return Err(BridgeError::InvalidInput(
                "source tx hash is required".to_string(),
            ));
        }
        if request.account.trim().is_empty() {
            return Err(BridgeError::InvalidInput("account is required".to_string()));
        }

        let quote_response = request.quote_response;
        let item = BridgeHistoryItem {
            status: StatusResponse::pending(quote_response.quote.src_chain_id, src_tx_hash),
            estimated_processing_time_in_seconds: quote_response
                .estimated_processing_time_in_seconds,
            quote: quote_response.quote,
            start_time: Some(
                request
                    .start_time
                    .unwrap_or_else(|| Utc::now().timestamp_millis()),
            ),
            slippage_percentage: request.slippage_percentage,
            completion_time: None,
            pricing_data: request.pricing_data,
            initial_dest_asset_balance: request.initial_dest_asset_balance,
            target_contract_address: request.target_contract_address,
            account: request.account,
        };

        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self
            .storage
            .get_history_item(item.src_tx_hash().to_string())
            .await?
        {
            info!(
                "Bridge tx {} is already tracked with status {}",
                existing.src_tx_hash(),
                existing.status.status
            );
            return Ok(existing);
        }
        self.storage.insert_history_item(item.clone()).await?;
        info!(
            "Started tracking bridge tx {} from chain {} to chain {}",
            item.src_tx_hash(),
            item.quote.src_chain_id,
            item.quote.dest_chain_id
        );
        Ok(item)
    }

    /// Applies a status snapshot to the stored item and returns the resulting item.
    pub async fn apply_status(
        &self,
        src_tx_hash: &str,
        status: StatusResponse,
    ) -> Result<BridgeHistoryItem, BridgeError> {
        let _guard = self.write_lock.lock().await;
        let item = self.get_existing(src_tx_hash).await?;
        let previous = item.status.status;

        match apply_status(&item, status, Utc::now().timestamp_millis())? {
            StatusUpdate::Updated(updated) => {
                self.storage.update_history_item((*updated).clone()).await?;
                if previous != updated.status.status {
                    info!(
                        "Bridge tx {src_tx_hash} status changed: {previous} -> {}",
                        updated.status.status
                    );
                }
                Ok(*updated)
            }
            StatusUpdate::Unchanged => Ok(item),
        }
    }

    /// Fetches the latest status of a transaction once and applies it. Terminal items are
    /// returned without contacting the status service.
    pub async fn poll_status(&self, src_tx_hash: &str) -> Result<BridgeHistoryItem, BridgeError> {
        let item = self.get_existing(src_tx_hash).await?;
        if item.status.status.is_terminal() {
            return Ok(item);
        }

        let status = match self.status_api.get_tx_status(item.status_request()).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to fetch bridge status for {src_tx_hash}: {e}");
                return Err(e);
            }
        };
        self.apply_status(src_tx_hash, status).await
    }

    pub async fn history_item(
        &self,
        src_tx_hash: &str,
    ) -> Result<Option<BridgeHistoryItem>, BridgeError> {
        Ok(self
            .storage
            .get_history_item(src_tx_hash.to_string())
            .await?)
    }

    pub async fn history_for_account(
        &self,
        account: &str,
    ) -> Result<Vec<BridgeHistoryItem>, BridgeError> {
        Ok(self
            .storage
            .list_history_items(Some(account.to_string()))
            .await?)
    }

    pub async fn history(&self) -> Result<Vec<BridgeHistoryItem>, BridgeError> {
        Ok(self.storage.list_history_items(None).await?)
    }

    pub async fn wipe_history(&self) -> Result<(), BridgeError> {
        let _guard = self.write_lock.lock().await;
        self.storage.wipe_history().await?;
        info!("Wiped bridge history");
        Ok(())
    }

    async fn get_existing(&self, src_tx_hash: &str) -> Result<BridgeHistoryItem, BridgeError> {
        self.storage
            .get_history_item(src_tx_hash.to_string())
            .await?
            .ok_or_else(|| BridgeError::NotFound {
                src_tx_hash: src_tx_hash.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        SqliteStorage,
        models::{DestChainStatus, StatusTypes},
        test_utils::{ACCOUNT, DEST_TX_HASH, SRC_TX_HASH, quote_response},
    };

    #[derive(Default)]
    struct MockStatusApi {
        responses: StdMutex<Vec<StatusResponse>>,
        calls: StdMutex<usize>,
    }

    impl MockStatusApi {
        fn with_responses(responses: Vec<StatusResponse>) -> Self {
            Self {
                responses: StdMutex::new(responses),
                calls: StdMutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl StatusApi for MockStatusApi {
        async fn get_tx_status(
            &self,
            _request: StatusRequest,
        ) -> Result<StatusResponse, BridgeError> {
            *self.calls.lock().unwrap() += 1;
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(BridgeError::Network {
                    reason: "no response".to_string(),
                    code: None,
                });
            }
            Ok(responses.remove(0))
        }
    }

    fn start_request() -> StartTrackingRequest {
        StartTrackingRequest {
            src_tx_hash: SRC_TX_HASH.to_string(),
            quote_response: quote_response(),
            pricing_data: None,
            slippage_percentage: Decimal::new(5, 1),
            start_time: Some(1_700_000_000_000),
            initial_dest_asset_balance: None,
            target_contract_address: None,
            account: ACCOUNT.to_string(),
        }
    }

    fn complete_status() -> StatusResponse {
        let mut status = StatusResponse::pending(10, SRC_TX_HASH);
        status.status = StatusTypes::Complete;
        status.dest_chain = Some(DestChainStatus {
            chain_id: 137,
            tx_hash: Some(DEST_TX_HASH.to_string()),
            amount: None,
            token: None,
        });
        status
    }

    fn tracker(
        temp_dir: &tempdir::TempDir,
        api: Arc<MockStatusApi>,
    ) -> BridgeStatusTracker {
        let storage = SqliteStorage::new(temp_dir.path()).unwrap();
        BridgeStatusTracker::new(Arc::new(storage), api)
    }

    #[tokio::test]
    async fn test_start_tracking_is_pending() {
        let temp_dir = tempdir::TempDir::new("tracker_start").unwrap();
        let tracker = tracker(&temp_dir, Arc::new(MockStatusApi::default()));

        let item = tracker.start_tracking(start_request()).await.unwrap();
        assert_eq!(item.status.status, StatusTypes::Pending);
        assert_eq!(item.status.src_chain.tx_hash, SRC_TX_HASH);
        assert_eq!(item.estimated_processing_time_in_seconds, 60);

        let stored = tracker.history_item(SRC_TX_HASH).await.unwrap();
        assert_eq!(stored, Some(item));
    }

    #[tokio::test]
    async fn test_start_tracking_requires_hash() {
        let temp_dir = tempdir::TempDir::new("tracker_hash").unwrap();
        let tracker = tracker(&temp_dir, Arc::new(MockStatusApi::default()));

        let request = StartTrackingRequest {
            src_tx_hash: " ".to_string(),
            ..start_request()
        };
        assert!(matches!(
            tracker.start_tracking(request).await,
            Err(BridgeError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_poll_until_complete() {
        let temp_dir = tempdir::TempDir::new("tracker_poll").unwrap();
        let api = Arc::new(MockStatusApi::with_responses(vec![
            StatusResponse::pending(10, SRC_TX_HASH),
            complete_status(),
        ]));
        let tracker = tracker(&temp_dir, api.clone());
        tracker.start_tracking(start_request()).await.unwrap();

        let item = tracker.poll_status(SRC_TX_HASH).await.unwrap();
        assert_eq!(item.status.status, StatusTypes::Pending);

        let item = tracker.poll_status(SRC_TX_HASH).await.unwrap();
        assert_eq!(item.status.status, StatusTypes::Complete);
        assert!(item.completion_time.is_some());

        // Terminal items are not fetched again
        let again = tracker.poll_status(SRC_TX_HASH).await.unwrap();
        assert_eq!(again, item);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_start_tracking_again_keeps_completed_item() {
        let temp_dir = tempdir::TempDir::new("tracker_restart").unwrap();
        let tracker = tracker(&temp_dir, Arc::new(MockStatusApi::default()));
        tracker.start_tracking(start_request()).await.unwrap();
        let completed = tracker
            .apply_status(SRC_TX_HASH, complete_status())
            .await
            .unwrap();
        assert!(completed.completion_time.is_some());

        let restarted = tracker
            .start_tracking(StartTrackingRequest {
                start_time: Some(1_700_000_500_000),
                ..start_request()
            })
            .await
            .unwrap();
        assert_eq!(restarted, completed);

        let stored = tracker.history_item(SRC_TX_HASH).await.unwrap().unwrap();
        assert_eq!(stored.status.status, StatusTypes::Complete);
        assert_eq!(stored.completion_time, completed.completion_time);
        assert_eq!(stored, completed);
    }

    #[tokio::test]
    async fn test_apply_complete_twice_is_idempotent() {
        let temp_dir = tempdir::TempDir::new("tracker_idempotent").unwrap();
        let tracker = tracker(&temp_dir, Arc::new(MockStatusApi::default()));
        tracker.start_tracking(start_request()).await.unwrap();

        let once = tracker
            .apply_status(SRC_TX_HASH, complete_status())
            .await
            .unwrap();
        let twice = tracker
            .apply_status(SRC_TX_HASH, complete_status())
            .await
            .unwrap();
        assert_eq!(once, twice);
        assert_eq!(tracker.history_item(SRC_TX_HASH).await.unwrap(), Some(once));
    }

    #[tokio::test]
    async fn test_invalid_status_is_not_stored() {
        let temp_dir = tempdir::TempDir::new("tracker_invalid").unwrap();
        let tracker = tracker(&temp_dir, Arc::new(MockStatusApi::default()));
        let started = tracker.start_tracking(start_request()).await.unwrap();

        let mut invalid = complete_status();
        invalid.src_chain.tx_hash = String::new();
        let result = tracker.apply_status(SRC_TX_HASH, invalid).await;
        assert!(matches!(result, Err(BridgeError::InvalidStatus(_))));
        assert_eq!(
            tracker.history_item(SRC_TX_HASH).await.unwrap(),
            Some(started)
        );
    }

    #[tokio::test]
    async fn test_unknown_tx_is_not_found() {
        let temp_dir = tempdir::TempDir::new("tracker_not_found").unwrap();
        let tracker = tracker(&temp_dir, Arc::new(MockStatusApi::default()));

        assert!(matches!(
            tracker.poll_status("0xmissing").await,
            Err(BridgeError::NotFound { .. })
        ));
        assert!(matches!(
            tracker.apply_status("0xmissing", complete_status()).await,
            Err(BridgeError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_item_unchanged() {
        let temp_dir = tempdir::TempDir::new("tracker_fetch_failure").unwrap();
        let tracker = tracker(&temp_dir, Arc::new(MockStatusApi::default()));
        let started = tracker.start_tracking(start_request()).await.unwrap();

        assert!(tracker.poll_status(SRC_TX_HASH).await.is_err());
        assert_eq!(
            tracker.history_item(SRC_TX_HASH).await.unwrap(),
            Some(started)
        );
    }

    #[tokio::test]
    async fn test_history_for_account_and_wipe() {
        let temp_dir = tempdir::TempDir::new("tracker_history").unwrap();
        let tracker = tracker(&temp_dir, Arc::new(MockStatusApi::default()));
        tracker.start_tracking(start_request()).await.unwrap();
        tracker
            .start_tracking(StartTrackingRequest {
                src_tx_hash: "0x02".to_string(),
                account: "0x9a2f3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c".to_string(),
                ..start_request()
            })
            .await
            .unwrap();

        assert_eq!(tracker.history_for_account(ACCOUNT).await.unwrap().len(), 1);
        assert_eq!(tracker.history().await.unwrap().len(), 2);

        tracker.wipe_history().await.unwrap();
        assert!(tracker.history().await.unwrap().is_empty());
    }
}
