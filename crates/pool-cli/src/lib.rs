//! # pool-cli
//!
//! `poolctl`: administration of named, slot-bounded pools.
//!
//! Provides:
//! - Pool listing, inspection, create/update and deletion
//! - Bulk import/export of pools files with partial-failure reporting
//!
//! # Architecture
//!
//! Commands talk to a [`store::PoolStore`]. The production store is the
//! [`client::RegistryClient`], which speaks the `pool-proto` protocol to a
//! remote registry over WebSocket; [`local::LocalPoolStore`] keeps the
//! registry in a local JSON file instead.
//!
//! ```text
//! ┌───────────┐                        ┌────────────────┐
//! │  poolctl  │◄──────────────────────►│ pool registry  │
//! │           │  pool-proto over WS    └────────────────┘
//! │           │
//! │           │◄──────────────────────► pools.json (file://)
//! └───────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod local;
pub mod output;
pub mod store;
pub mod transfer;

pub use cli::{Cli, Commands, Format};
pub use client::RegistryClient;
pub use config::RegistryConfig;
pub use error::{CliError, StoreError, TransferError};
pub use local::LocalPoolStore;
pub use output::OutputFormat;
pub use store::{PoolStore, Registry};
pub use transfer::{export_pools, import_pools, ImportOutcome};
