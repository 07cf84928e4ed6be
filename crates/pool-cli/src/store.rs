//! The pool store seam.
//!
//! [`PoolStore`] is what commands and bulk transfers talk to. The remote
//! [`RegistryClient`] and the file-backed [`LocalPoolStore`] both
//! implement it, and [`Registry`] picks one of them from configuration.

use std::future::Future;

use pool_proto::Pool;
use tracing::debug;

use crate::client::RegistryClient;
use crate::config::{RegistryConfig, RegistryTarget};
use crate::error::StoreError;
use crate::local::LocalPoolStore;

/// Typed access to a pool registry.
///
/// Every call is one round trip; implementations keep no cached view of
/// the registry.
pub trait PoolStore: Send {
    /// List all pools, in registry order.
    fn list(&mut self) -> impl Future<Output = Result<Vec<Pool>, StoreError>> + Send;

    /// Fetch one pool. Fails with [`StoreError::NotFound`] if absent.
    fn get(&mut self, name: &str) -> impl Future<Output = Result<Pool, StoreError>> + Send;

    /// Create the pool, or overwrite it if the name exists.
    fn create(
        &mut self,
        name: &str,
        slots: u32,
        description: &str,
    ) -> impl Future<Output = Result<Pool, StoreError>> + Send;

    /// Delete a pool. Fails with [`StoreError::NotFound`] if absent.
    fn delete(&mut self, name: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// A pool store chosen at runtime from a [`RegistryConfig`].
#[derive(Debug)]
pub enum Registry {
    /// Remote registry over WebSocket.
    Remote(RegistryClient),
    /// Local JSON state file.
    Local(LocalPoolStore),
}

impl Registry {
    /// Open the registry described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is unsupported, the remote registry
    /// cannot be reached, or the local state file cannot be loaded.
    pub async fn open(config: &RegistryConfig) -> Result<Self, StoreError> {
        match config.target()? {
            RegistryTarget::Remote(url) => {
                let mut client =
                    RegistryClient::connect_with_timeout(&url, config.connect_timeout).await?;
                client.set_request_timeout(config.request_timeout);
                Ok(Self::Remote(client))
            }
            RegistryTarget::Local(path) => {
                debug!(path = %path.display(), "Using local pool registry");
                Ok(Self::Local(LocalPoolStore::open(path)?))
            }
        }
    }

    /// Release the registry connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote connection does not close cleanly.
    pub async fn close(self) -> Result<(), StoreError> {
        match self {
            Self::Remote(client) => client.close().await,
            Self::Local(_) => Ok(()),
        }
    }
}

impl PoolStore for Registry {
    async fn list(&mut self) -> Result<Vec<Pool>, StoreError> {
        match self {
            Self::Remote(client) => client.list().await,
            Self::Local(store) => store.list().await,
        }
    }

    async fn get(&mut self, name: &str) -> Result<Pool, StoreError> {
        match self {
            Self::Remote(client) => client.get(name).await,
            Self::Local(store) => store.get(name).await,
        }
    }

    async fn create(&mut self, name: &str, slots: u32, description: &str) -> Result<Pool, StoreError> {
        match self {
            Self::Remote(client) => client.create(name, slots, description).await,
            Self::Local(store) => store.create(name, slots, description).await,
        }
    }

    async fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        match self {
            Self::Remote(client) => client.delete(name).await,
            Self::Local(store) => store.delete(name).await,
        }
    }
}
