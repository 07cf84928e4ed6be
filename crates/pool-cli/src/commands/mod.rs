//! CLI command implementations.
//!
//! - [`pools`] - pool CRUD and bulk import/export

pub mod pools;

pub use pools::PoolsCommand;
