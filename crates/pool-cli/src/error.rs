//! Error types, one enum per layer.
//!
//! [`StoreError`] comes from a pool store, [`TransferError`] from bulk
//! import/export, and [`CliError`] is what a command reports to `main`.

use std::path::PathBuf;

use pool_proto::ProtoError;
use thiserror::Error;

/// Errors returned by a [`PoolStore`](crate::store::PoolStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named pool does not exist.
    #[error("pool not found: {0}")]
    NotFound(String),

    /// The registry rejected the request.
    #[error("validation error: {0}")]
    Validation(String),

    /// The registry answered with an error code the client does not map.
    #[error("registry error {code}: {message}")]
    Registry {
        /// Error code from the registry.
        code: u32,
        /// Error message from the registry.
        message: String,
    },

    /// Registry connection failed or dropped.
    #[error("connection error: {0}")]
    Connection(String),

    /// Connect or request timed out.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The registry sent something the protocol does not allow.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid registry configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A local state file could not be read or written.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<ProtoError> for StoreError {
    fn from(err: ProtoError) -> Self {
        match err {
            ProtoError::Validation(msg) => Self::Validation(msg),
            other => Self::Protocol(other.to_string()),
        }
    }
}

/// Errors returned by bulk import and export.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The import file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    SourceUnavailable {
        /// Import file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The export file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    DestinationUnavailable {
        /// Export file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The import document is not a JSON object.
    #[error("malformed pools file: {0}")]
    MalformedInput(String),

    /// The export document could not be encoded.
    #[error("cannot encode pools file: {0}")]
    Encoding(String),

    /// The pool store failed; fatal to the whole transfer.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// `get` or `delete` named a pool the registry does not have.
    #[error("Pool {0} does not exist")]
    PoolNotFound(String),

    /// The import file does not exist.
    #[error("Missing pools file {}", .0.display())]
    MissingPoolsFile(PathBuf),

    /// The import file is not a pools document.
    #[error("Invalid json file: {0}")]
    InvalidJson(String),

    /// Some import entries were not pool definitions.
    #[error("Failed to update pool(s): {}", .0.join(", "))]
    ImportFailed(Vec<String>),

    /// Pool store failure.
    #[error(transparent)]
    Store(StoreError),

    /// Bulk transfer failure.
    #[error(transparent)]
    Transfer(TransferError),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<TransferError> for CliError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::SourceUnavailable { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::MissingPoolsFile(path)
            }
            TransferError::MalformedInput(detail) => Self::InvalidJson(detail),
            TransferError::Store(store) => Self::Store(store),
            other => Self::Transfer(other),
        }
    }
}
