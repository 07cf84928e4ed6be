//! # pool-proto
//!
//! Pool data model and the JSON protocol spoken between `poolctl` and a
//! pool registry.
//!
//! ```text
//! ┌─────────┐   RegistryRequest    ┌────────────────┐
//! │ poolctl │─────────────────────►│ pool registry  │
//! │         │◄─────────────────────│                │
//! └─────────┘   RegistryResponse   └────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod messages;
pub mod pool;

pub use error::ProtoError;
pub use messages::{error_codes, RegistryRequest, RegistryResponse, PROTOCOL_VERSION};
pub use pool::{
    parse_slots, parse_slots_str, validate_name, Pool, DEFAULT_POOL_DESCRIPTION,
    DEFAULT_POOL_NAME, DEFAULT_POOL_SLOTS, MAX_POOL_NAME_LEN,
};
