use thiserror::Error;

use crate::persist::StorageError;

/// Error type for the bridge quote and status pipeline
#[derive(Debug, Error, Clone)]
pub enum BridgeError {
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A provider status snapshot that breaks the history invariants
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Bridge history item not found: {src_tx_hash}")]
    NotFound { src_tx_hash: String },

    /// Network error
    #[error("Network error: {reason} (code: {code:?})")]
    Network { reason: String, code: Option<u16> },

    /// Storage error
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Error: {0}")]
    Generic(String),
}

impl From<StorageError> for BridgeError {
    fn from(e: StorageError) -> Self {
        BridgeError::StorageError(e.to_string())
    }
}

impl From<ServiceConnectivityError> for BridgeError {
    fn from(value: ServiceConnectivityError) -> Self {
        match value {
            ServiceConnectivityError::Status { status, body } => BridgeError::Network {
                reason: body,
                code: Some(status),
            },
            other => BridgeError::Network {
                reason: other.to_string(),
                code: None,
            },
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::InvalidInput(e.to_string())
    }
}

impl From<rust_decimal::Error> for BridgeError {
    fn from(e: rust_decimal::Error) -> Self {
        BridgeError::InvalidAmount(e.to_string())
    }
}

/// Errors raised by the REST layer talking to external bridge services
#[derive(Clone, Debug, Error)]
pub enum ServiceConnectivityError {
    #[error("Builder error: {0}")]
    Builder(String),
    #[error("Redirect error: {0}")]
    Redirect(String),
    #[error("Status error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Timeout error: {0}")]
    Timeout(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Connect error: {0}")]
    Connect(String),
    #[error("Body error: {0}")]
    Body(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Json error: {0}")]
    Json(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for ServiceConnectivityError {
    fn from(err: reqwest::Error) -> Self {
        let mut err_str = err.to_string();
        let mut walk: &dyn std::error::Error = &err;
        while let Some(src) = walk.source() {
            err_str.push_str(format!(" : {src}").as_str());
            walk = src;
        }
        if err.is_connect() {
            Self::Connect(err_str)
        } else if err.is_builder() {
            Self::Builder(err_str)
        } else if err.is_redirect() {
            Self::Redirect(err_str)
        } else if err.is_status() {
            Self::Status {
                status: err.status().unwrap_or_default().into(),
                body: err_str,
            }
        } else if err.is_timeout() {
            Self::Timeout(err_str)
        } else if err.is_request() {
            Self::Request(err_str)
        } else if err.is_body() {
            Self::Body(err_str)
        } else if err.is_decode() {
            Self::Decode(err_str)
        } else {
            Self::Other(err_str)
        }
    }
}
