//! Registry protocol messages.
//!
//! Every request is one JSON text frame answered by exactly one response
//! frame. Messages are internally tagged by `"type"`.
//!
//! # Example
//!
//! ```rust
//! use pool_proto::{RegistryRequest, RegistryResponse};
//!
//! let request = RegistryRequest::GetPool { name: "gpu".into() };
//! let json = request.to_json().unwrap();
//! assert!(json.contains("get_pool"));
//!
//! let response = RegistryResponse::from_json(r#"
//!     {"type": "pool", "pool": {"name": "gpu", "slots": 4, "description": ""}}
//! "#).unwrap();
//! assert!(!response.is_error());
//! ```

use serde::{Deserialize, Serialize};

use crate::pool::Pool;
use crate::ProtoError;

/// Protocol version for registry communication.
pub const PROTOCOL_VERSION: u32 = 1;

/// Error codes carried by [`RegistryResponse::Error`].
pub mod error_codes {
    /// The named pool does not exist.
    pub const POOL_NOT_FOUND: u32 = 1001;
    /// The request was rejected by validation.
    pub const INVALID_REQUEST: u32 = 1002;
    /// The registry failed internally.
    pub const INTERNAL_ERROR: u32 = 1003;
    /// Client and registry protocol versions are incompatible.
    pub const PROTOCOL_MISMATCH: u32 = 1004;
}

/// Messages sent from a client to the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryRequest {
    /// Handshake identifying the client.
    Hello {
        /// Client version.
        version: String,
        /// Protocol version.
        protocol_version: u32,
    },

    /// List every pool.
    ListPools,

    /// Fetch one pool.
    GetPool {
        /// Pool name.
        name: String,
    },

    /// Create or update a pool.
    CreatePool {
        /// Pool name.
        name: String,
        /// Slot capacity.
        slots: u32,
        /// Description.
        description: String,
    },

    /// Delete a pool.
    DeletePool {
        /// Pool name.
        name: String,
    },
}

impl RegistryRequest {
    /// Create a hello message for the current protocol version.
    #[must_use]
    pub fn hello(version: impl Into<String>) -> Self {
        Self::Hello {
            version: version.into(),
            protocol_version: PROTOCOL_VERSION,
        }
    }

    /// Get the request type name for error reporting.
    #[must_use]
    pub fn request_type(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "hello",
            Self::ListPools => "list_pools",
            Self::GetPool { .. } => "get_pool",
            Self::CreatePool { .. } => "create_pool",
            Self::DeletePool { .. } => "delete_pool",
        }
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }
}

/// Messages sent from the registry to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryResponse {
    /// Handshake accepted.
    Welcome {
        /// Registry version.
        server_version: String,
        /// Protocol version spoken by the registry.
        protocol_version: u32,
    },

    /// Every pool, in registry order.
    Pools {
        /// Pools.
        pools: Vec<Pool>,
    },

    /// A single pool, answering `get_pool` or `create_pool`.
    Pool {
        /// The pool.
        pool: Pool,
    },

    /// A pool was removed.
    PoolDeleted {
        /// Name of the removed pool.
        name: String,
    },

    /// Error response.
    Error {
        /// Error code, see [`error_codes`].
        code: u32,
        /// Error message.
        message: String,
        /// Original request type (if applicable).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_type: Option<String>,
    },
}

impl RegistryResponse {
    /// Create an error response.
    #[must_use]
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
            request_type: None,
        }
    }

    /// Create an error response tied to a request type.
    #[must_use]
    pub fn error_for_request(
        code: u32,
        message: impl Into<String>,
        request_type: impl Into<String>,
    ) -> Self {
        Self::Error {
            code,
            message: message.into(),
            request_type: Some(request_type.into()),
        }
    }

    /// Check if this is an error response.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }
}
