//! File-backed pool registry.
//!
//! [`LocalPoolStore`] applies the registry's policy in-process instead of
//! going through a remote registry: names are validated, `create` is an
//! upsert, the default pool always exists and cannot be deleted. State is
//! kept in a JSON file that is rewritten after every mutation, or only in
//! memory when built with [`LocalPoolStore::in_memory`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use pool_proto::{validate_name, Pool, DEFAULT_POOL_NAME};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::PoolStore;

/// On-disk layout of the state file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    pools: Vec<Pool>,
}

/// Pool registry held in a local JSON file.
#[derive(Debug, Clone)]
pub struct LocalPoolStore {
    pools: Vec<Pool>,
    path: Option<PathBuf>,
}

impl LocalPoolStore {
    /// Open the registry stored at `path`.
    ///
    /// A missing file is an empty registry. The default pool is added (and
    /// persisted) if the file does not have it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the file exists but cannot be
    /// read or parsed, or the default pool cannot be written back.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let pools = match fs::read_to_string(&path) {
            Ok(text) => {
                let state: StateFile =
                    serde_json::from_str(&text).map_err(|e| persistence_error(&path, e))?;
                state.pools
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(persistence_error(&path, e)),
        };
        check_loaded(&pools).map_err(|e| persistence_error(&path, e))?;
        debug!(path = %path.display(), count = pools.len(), "Loaded pools from disk");

        let mut store = Self {
            pools,
            path: Some(path),
        };
        if store.seed_default_pool() {
            store.snapshot(&store.pools)?;
        }
        Ok(store)
    }

    /// A registry that lives only in memory, holding just the default pool.
    #[must_use]
    pub fn in_memory() -> Self {
        let mut store = Self {
            pools: Vec::new(),
            path: None,
        };
        store.seed_default_pool();
        store
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All pools in insertion order.
    #[must_use]
    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// Look up a pool by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an invalid name and
    /// [`StoreError::NotFound`] if there is no such pool.
    pub fn find(&self, name: &str) -> Result<&Pool, StoreError> {
        validate_name(name)?;
        self.pools
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Create or overwrite a pool. An existing pool keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an invalid name and
    /// [`StoreError::Persistence`] if the state file cannot be written.
    pub fn upsert(&mut self, name: &str, slots: u32, description: &str) -> Result<Pool, StoreError> {
        validate_name(name)?;
        let pool = Pool::new(name, slots, description);

        let mut next = self.pools.clone();
        match next.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = pool.clone(),
            None => next.push(pool.clone()),
        }
        self.commit(next)?;

        debug!(pool = %name, slots, "Pool upserted");
        Ok(pool)
    }

    /// Remove a pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an invalid name or the default
    /// pool, [`StoreError::NotFound`] if there is no such pool, and
    /// [`StoreError::Persistence`] if the state file cannot be written.
    pub fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        validate_name(name)?;
        if name == DEFAULT_POOL_NAME {
            return Err(StoreError::Validation(format!("{DEFAULT_POOL_NAME} cannot be deleted")));
        }
        if !self.pools.iter().any(|p| p.name == name) {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let next = self.pools.iter().filter(|p| p.name != name).cloned().collect();
        self.commit(next)?;

        debug!(pool = %name, "Pool removed");
        Ok(())
    }

    /// Adds the default pool if missing. Returns whether it was added.
    fn seed_default_pool(&mut self) -> bool {
        if self.pools.iter().any(Pool::is_default) {
            return false;
        }
        info!("Creating missing default pool");
        self.pools.push(Pool::default_pool());
        true
    }

    fn commit(&mut self, next: Vec<Pool>) -> Result<(), StoreError> {
        self.snapshot(&next)?;
        self.pools = next;
        Ok(())
    }

    /// Write `pools` to the state file through a temp file and rename.
    fn snapshot(&self, pools: &[Pool]) -> Result<(), StoreError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persistence_error(path, e))?;
        }

        let state = StateFile {
            pools: pools.to_vec(),
        };
        let json = serde_json::to_string_pretty(&state).map_err(|e| persistence_error(path, e))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| persistence_error(path, e))?;
        fs::rename(&tmp, path).map_err(|e| persistence_error(path, e))?;
        Ok(())
    }
}

/// Loaded pools must have valid, unique names.
fn check_loaded(pools: &[Pool]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(pools.len());
    for pool in pools {
        validate_name(&pool.name).map_err(|e| e.to_string())?;
        if !seen.insert(pool.name.as_str()) {
            return Err(format!("duplicate pool {}", pool.name));
        }
    }
    Ok(())
}

fn persistence_error(path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::Persistence(format!("{}: {err}", path.display()))
}

impl PoolStore for LocalPoolStore {
    async fn list(&mut self) -> Result<Vec<Pool>, StoreError> {
        Ok(self.pools.clone())
    }

    async fn get(&mut self, name: &str) -> Result<Pool, StoreError> {
        self.find(name).cloned()
    }

    async fn create(&mut self, name: &str, slots: u32, description: &str) -> Result<Pool, StoreError> {
        self.upsert(name, slots, description)
    }

    async fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.remove(name)
    }
}
