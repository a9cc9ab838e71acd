use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use async_trait::async_trait;
use rusqlite::{
    Connection, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use rusqlite_migration::{M, Migrations};
use rust_decimal::Decimal;

use crate::models::{BridgeHistoryItem, Quote, QuoteMetadata, StatusResponse, StatusTypes};

use super::{BridgeHistoryStorage, StorageError};

const DEFAULT_DB_FILENAME: &str = "bridge.sql";

const SELECT_HISTORY_ITEM: &str = "SELECT src_tx_hash
    ,       quote
    ,       status_response
    ,       start_time
    ,       estimated_processing_time_in_seconds
    ,       slippage_percentage
    ,       completion_time
    ,       pricing_data
    ,       initial_dest_asset_balance
    ,       target_contract_address
    ,       account
     FROM bridge_history";

/// SQLite-based storage implementation
pub struct SqliteStorage {
    db_dir: PathBuf,
}

impl SqliteStorage {
    /// Creates a new `SQLite` storage
    ///
    /// # Arguments
    ///
    /// * `path` - Directory holding the `SQLite` database file
    ///
    /// # Returns
    ///
    /// A new `SqliteStorage` instance or an error
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let storage = Self {
            db_dir: path.to_path_buf(),
        };

        std::fs::create_dir_all(path)
            .map_err(|e| StorageError::InitializationError(e.to_string()))?;

        storage.migrate()?;
        Ok(storage)
    }

    pub(crate) fn get_connection(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(self.get_db_path())?)
    }

    fn get_db_path(&self) -> PathBuf {
        self.db_dir.join(DEFAULT_DB_FILENAME)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        let migrations =
            Migrations::new(Self::current_migrations().into_iter().map(M::up).collect());
        let mut conn = self.get_connection()?;
        migrations.to_latest(&mut conn)?;
        Ok(())
    }

    pub(crate) fn current_migrations() -> Vec<&'static str> {
        vec![
            "CREATE TABLE IF NOT EXISTS bridge_history (
              src_tx_hash TEXT PRIMARY KEY,
              account TEXT NOT NULL,
              status TEXT NOT NULL,
              quote TEXT NOT NULL,
              status_response TEXT NOT NULL,
              start_time INTEGER,
              estimated_processing_time_in_seconds INTEGER NOT NULL,
              slippage_percentage TEXT NOT NULL,
              completion_time INTEGER,
              pricing_data TEXT,
              initial_dest_asset_balance TEXT,
              target_contract_address TEXT
            );",
            "CREATE INDEX IF NOT EXISTS idx_bridge_history_account
              ON bridge_history (account COLLATE NOCASE);",
        ]
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        StorageError::Implementation(value.to_string())
    }
}

impl From<rusqlite_migration::Error> for StorageError {
    fn from(value: rusqlite_migration::Error) -> Self {
        StorageError::Implementation(value.to_string())
    }
}

#[async_trait]
impl BridgeHistoryStorage for SqliteStorage {
    async fn insert_history_item(&self, item: BridgeHistoryItem) -> Result<(), StorageError> {
        let connection = self.get_connection()?;

        let result = connection.execute(
            "INSERT INTO bridge_history (
                src_tx_hash
              , account
              , status
              , quote
              , status_response
              , start_time
              , estimated_processing_time_in_seconds
              , slippage_percentage
              , completion_time
              , pricing_data
              , initial_dest_asset_balance
              , target_contract_address
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                item.src_tx_hash(),
                item.account,
                item.status.status,
                item.quote,
                item.status,
                item.start_time,
                i64::try_from(item.estimated_processing_time_in_seconds)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?,
                item.slippage_percentage.to_string(),
                item.completion_time,
                item.pricing_data,
                item.initial_dest_asset_balance.map(|b| b.to_string()),
                item.target_contract_address,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::Conflict(item.src_tx_hash().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_history_item(
        &self,
        src_tx_hash: String,
    ) -> Result<Option<BridgeHistoryItem>, StorageError> {
        let connection = self.get_connection()?;

        let mut stmt =
            connection.prepare(&format!("{SELECT_HISTORY_ITEM} WHERE src_tx_hash = ?"))?;
        let result = stmt.query_row(params![src_tx_hash], map_history_item);

        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_history_items(
        &self,
        account: Option<String>,
    ) -> Result<Vec<BridgeHistoryItem>, StorageError> {
        let connection = self.get_connection()?;

        let query = format!(
            "{SELECT_HISTORY_ITEM}
             WHERE ?1 IS NULL OR account = ?1 COLLATE NOCASE
             ORDER BY start_time DESC, src_tx_hash"
        );
        let mut stmt = connection.prepare(&query)?;
        let items = stmt
            .query_map(params![account], map_history_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    async fn update_history_item(&self, item: BridgeHistoryItem) -> Result<(), StorageError> {
        let connection = self.get_connection()?;

        let updated = connection.execute(
            "UPDATE bridge_history
             SET status = ?
               , status_response = ?
               , completion_time = ?
               , pricing_data = ?
               , initial_dest_asset_balance = ?
               , target_contract_address = ?
             WHERE src_tx_hash = ?",
            params![
                item.status.status,
                item.status,
                item.completion_time,
                item.pricing_data,
                item.initial_dest_asset_balance.map(|b| b.to_string()),
                item.target_contract_address,
                item.src_tx_hash(),
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::Implementation(format!(
                "No bridge history item for {}",
                item.src_tx_hash()
            )));
        }
        Ok(())
    }

    async fn wipe_history(&self) -> Result<(), StorageError> {
        let connection = self.get_connection()?;
        connection.execute("DELETE FROM bridge_history", [])?;
        Ok(())
    }
}

fn map_history_item(row: &Row<'_>) -> rusqlite::Result<BridgeHistoryItem> {
    let estimated_processing_time_in_seconds: i64 = row.get(4)?;
    let slippage_percentage: String = row.get(5)?;
    let initial_dest_asset_balance: Option<String> = row.get(8)?;

    Ok(BridgeHistoryItem {
        quote: row.get(1)?,
        status: row.get(2)?,
        start_time: row.get(3)?,
        estimated_processing_time_in_seconds: u64::try_from(estimated_processing_time_in_seconds)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(e)))?,
        slippage_percentage: parse_decimal(5, &slippage_percentage)?,
        completion_time: row.get(6)?,
        pricing_data: row.get(7)?,
        initial_dest_asset_balance: initial_dest_asset_balance
            .map(|balance| parse_decimal(8, &balance))
            .transpose()?,
        target_contract_address: row.get(9)?,
        account: row.get(10)?,
    })
}

fn parse_decimal(column: usize, value: &str) -> rusqlite::Result<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e))
    })
}

impl ToSql for StatusTypes {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(rusqlite::types::ToSqlOutput::from(self.to_string()))
    }
}

/// Stores the type as a JSON text column
macro_rules! impl_json_sql {
    ($type:ty) => {
        impl ToSql for $type {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                let json = serde_json::to_string(self)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                Ok(rusqlite::types::ToSqlOutput::from(json))
            }
        }

        impl FromSql for $type {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                match value {
                    ValueRef::Text(i) => {
                        let s = std::str::from_utf8(i)
                            .map_err(|e| FromSqlError::Other(Box::new(e)))?;
                        serde_json::from_str(s).map_err(|e| FromSqlError::Other(Box::new(e)))
                    }
                    _ => Err(FromSqlError::InvalidType),
                }
            }
        }
    };
}

impl_json_sql!(Quote);
impl_json_sql!(StatusResponse);
impl_json_sql!(QuoteMetadata);
