pub(crate) mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::BridgeHistoryItem;

/// Errors that can occur during storage operations
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Underline implementation error: {0}")]
    Implementation(String),

    /// Database initialization error
    #[error("Failed to initialize database: {0}")]
    InitializationError(String),

    #[error("Failed to serialize/deserialize data: {0}")]
    Serialization(String),

    #[error("Bridge history item already exists: {0}")]
    Conflict(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Durable store of bridge history items, keyed by source-chain tx hash
#[async_trait]
pub trait BridgeHistoryStorage: Send + Sync {
    /// Inserts a new history item. Fails with [`StorageError::Conflict`] when an item with
    /// the same source tx hash already exists.
    async fn insert_history_item(&self, item: BridgeHistoryItem) -> Result<(), StorageError>;

    async fn get_history_item(
        &self,
        src_tx_hash: String,
    ) -> Result<Option<BridgeHistoryItem>, StorageError>;

    /// Lists history items, most recently started first
    ///
    /// # Arguments
    ///
    /// * `account` - Only list items submitted by this account, compared case-insensitively
    async fn list_history_items(
        &self,
        account: Option<String>,
    ) -> Result<Vec<BridgeHistoryItem>, StorageError>;

    /// Overwrites an existing history item as a whole
    async fn update_history_item(&self, item: BridgeHistoryItem) -> Result<(), StorageError>;

    async fn wipe_history(&self) -> Result<(), StorageError>;
}
