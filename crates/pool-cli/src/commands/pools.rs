//! Pool command implementation.
//!
//! Provides subcommands for:
//! - Listing and inspecting pools
//! - Creating/updating and deleting pools
//! - Importing and exporting pools files

use std::io::Write;
use std::path::Path;

use pool_proto::parse_slots_str;
use tracing::debug;

use crate::cli::Commands;
use crate::error::{CliError, StoreError};
use crate::output::{Message, OutputFormat, PoolTable};
use crate::store::PoolStore;
use crate::transfer::{export_pools, import_pools};

/// Pool command executor.
#[derive(Debug)]
pub struct PoolsCommand<'a, S> {
    store: &'a mut S,
}

impl<'a, S: PoolStore> PoolsCommand<'a, S> {
    /// Create a pool command bound to a store.
    #[must_use]
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Execute a pool subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails. An import with failed
    /// entries is an error even though its valid entries were applied.
    pub async fn execute<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        command: &Commands,
    ) -> Result<(), CliError> {
        debug!(?command, "Executing pool command");
        match command {
            Commands::List => self.list(writer, format).await,
            Commands::Get { name } => self.get(writer, format, name).await,
            Commands::Set {
                name,
                slots,
                description,
            } => self.set(writer, format, name, slots, description).await,
            Commands::Delete { name } => self.delete(writer, format, name).await,
            Commands::Import { filepath } => self.import(writer, format, Path::new(filepath)).await,
            Commands::Export { filepath } => self.export(writer, format, Path::new(filepath)).await,
        }
    }

    async fn list<W: Write>(&mut self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let pools = self.store.list().await?;
        format.write(writer, &PoolTable::new(pools))
    }

    async fn get<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        name: &str,
    ) -> Result<(), CliError> {
        let pool = self.store.get(name).await.map_err(not_found_as_missing_pool)?;
        format.write(writer, &PoolTable::new([pool]))
    }

    async fn set<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        name: &str,
        slots: &str,
        description: &str,
    ) -> Result<(), CliError> {
        let slots = parse_slots_str(slots).map_err(StoreError::from)?;
        self.store.create(name, slots, description).await?;
        format.write(writer, &Message::new(format!("Pool {name} created")))
    }

    async fn delete<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        name: &str,
    ) -> Result<(), CliError> {
        self.store.delete(name).await.map_err(not_found_as_missing_pool)?;
        format.write(writer, &Message::new(format!("Pool {name} deleted")))
    }

    async fn import<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        path: &Path,
    ) -> Result<(), CliError> {
        let outcome = import_pools(&mut *self.store, path).await?;
        if !outcome.is_complete() {
            return Err(CliError::ImportFailed(outcome.failed));
        }
        let msg = Message::new(format!("Uploaded {} pool(s)", outcome.imported.len()));
        format.write(writer, &msg)
    }

    async fn export<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        path: &Path,
    ) -> Result<(), CliError> {
        let pools = export_pools(&mut *self.store, path).await?;
        let msg = Message::new(format!("Exported {} pools to {}", pools.len(), path.display()));
        format.write(writer, &msg)
    }
}

fn not_found_as_missing_pool(err: StoreError) -> CliError {
    match err {
        StoreError::NotFound(name) => CliError::PoolNotFound(name),
        other => CliError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use crate::local::LocalPoolStore;
    use pool_proto::{Pool, DEFAULT_POOL_NAME};

    async fn run(store: &mut LocalPoolStore, command: Commands) -> Result<String, CliError> {
        let mut out = Vec::new();
        PoolsCommand::new(store)
            .execute(&mut out, &OutputFormat::default(), &command)
            .await?;
        Ok(String::from_utf8(out).expect("utf-8"))
    }

    #[tokio::test]
    async fn set_then_list() {
        let mut store = LocalPoolStore::in_memory();
        let out = run(
            &mut store,
            Commands::Set {
                name: "foo".into(),
                slots: "1".into(),
                description: "test".into(),
            },
        )
        .await
        .expect("set");
        assert_eq!(out, "Pool foo created\n");
        assert_eq!(store.pools().len(), 2);

        let out = run(&mut store, Commands::List).await.expect("list");
        assert!(out.contains("foo"));
        assert!(out.contains("Total: 2 pool(s)"));
    }

    #[tokio::test]
    async fn set_with_bad_slots_is_validation_error() {
        let mut store = LocalPoolStore::in_memory();
        let err = run(
            &mut store,
            Commands::Set {
                name: "foo".into(),
                slots: "many".into(),
                description: String::new(),
            },
        )
        .await
        .expect_err("bad slots");
        assert!(matches!(err, CliError::Store(StoreError::Validation(_))));
        assert_eq!(store.pools().len(), 1);
    }

    #[tokio::test]
    async fn get_existing_pool_as_json() {
        let mut store = LocalPoolStore::in_memory();
        let mut out = Vec::new();
        PoolsCommand::new(&mut store)
            .execute(
                &mut out,
                &OutputFormat::new(Format::Json),
                &Commands::Get { name: DEFAULT_POOL_NAME.into() },
            )
            .await
            .expect("get");

        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value[0]["pool"], DEFAULT_POOL_NAME);
        assert_eq!(value[0]["slots"], 128);
    }

    #[tokio::test]
    async fn get_and_delete_missing_pool() {
        let mut store = LocalPoolStore::in_memory();

        let err = run(&mut store, Commands::Get { name: "nonexistent".into() })
            .await
            .expect_err("missing");
        assert_eq!(err.to_string(), "Pool nonexistent does not exist");

        let err = run(&mut store, Commands::Delete { name: "nonexistent".into() })
            .await
            .expect_err("missing");
        assert_eq!(err.to_string(), "Pool nonexistent does not exist");
        assert_eq!(store.pools(), [Pool::default_pool()]);
    }

    #[tokio::test]
    async fn delete_existing_pool() {
        let mut store = LocalPoolStore::in_memory();
        store.upsert("foo", 1, "test").expect("create");

        let out = run(&mut store, Commands::Delete { name: "foo".into() }).await.expect("delete");
        assert_eq!(out, "Pool foo deleted\n");
        assert_eq!(store.pools().len(), 1);
    }

    #[tokio::test]
    async fn import_with_failed_entries_reports_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pools.json");
        std::fs::write(
            &path,
            r#"{"a": {"slots": 1, "description": ""}, "b": {"description": "only one field"}}"#,
        )
        .expect("write");

        let mut store = LocalPoolStore::in_memory();
        let err = run(&mut store, Commands::Import { filepath: path.display().to_string() })
            .await
            .expect_err("partial failure");

        assert_eq!(err.to_string(), "Failed to update pool(s): b");
        assert!(store.find("a").is_ok());
    }

    #[tokio::test]
    async fn import_missing_file() {
        let mut store = LocalPoolStore::in_memory();
        let err = run(&mut store, Commands::Import { filepath: "nonexistent.json".into() })
            .await
            .expect_err("missing");
        assert_eq!(err.to_string(), "Missing pools file nonexistent.json");
    }

    #[tokio::test]
    async fn import_and_export_messages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let import = dir.path().join("in.json");
        let export = dir.path().join("out.json");
        std::fs::write(&import, r#"{"gpu": {"slots": 4, "description": "GPU jobs"}}"#)
            .expect("write");

        let mut store = LocalPoolStore::in_memory();
        let out = run(&mut store, Commands::Import { filepath: import.display().to_string() })
            .await
            .expect("import");
        assert_eq!(out, "Uploaded 1 pool(s)\n");

        let out = run(&mut store, Commands::Export { filepath: export.display().to_string() })
            .await
            .expect("export");
        assert_eq!(out, format!("Exported 2 pools to {}\n", export.display()));
    }
}
