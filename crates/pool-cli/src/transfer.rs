//! Bulk import and export of pool definitions.
//!
//! The pools file maps pool names to `{"slots", "description"}` objects:
//!
//! ```json
//! {
//!     "pool_1": {
//!         "description": "",
//!         "slots": 5
//!     }
//! }
//! ```
//!
//! Import applies entries one at a time in document order. An entry that
//! is not a two-field pool object is recorded as failed and skipped;
//! entries before and after it are still applied. Only an unreadable file,
//! a document that is not a JSON object, or a store error abort the run,
//! and a store error leaves earlier entries applied.
//!
//! Export output is deterministic: keys sorted at every level and 4-space
//! indentation, so exporting the same registry twice gives identical bytes.

use std::collections::BTreeMap;
use std::path::Path;

use pool_proto::{parse_slots, Pool};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{StoreError, TransferError};
use crate::store::PoolStore;

/// Result of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Pools created or updated, in document order.
    pub imported: Vec<Pool>,
    /// Names of entries that were not pool definitions.
    pub failed: Vec<String>,
}

impl ImportOutcome {
    /// Whether every entry was applied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One pool in the file, keyed by name in the enclosing map.
///
/// Fields are declared in sorted order so the export keys come out sorted.
#[derive(Debug, Serialize)]
struct PoolFileEntry<'a> {
    description: &'a str,
    slots: u32,
}

/// Import pools from the file at `source` into `store`.
///
/// # Errors
///
/// - [`TransferError::SourceUnavailable`] if the file cannot be read.
/// - [`TransferError::MalformedInput`] if it is not a JSON object; the
///   store is not touched.
/// - [`TransferError::Store`] if a slot value is not integer-like, a
///   description is not a string, or the store rejects a pool. Entries
///   applied before the failing one remain applied.
pub async fn import_pools<S: PoolStore>(
    store: &mut S,
    source: &Path,
) -> Result<ImportOutcome, TransferError> {
    let bytes = tokio::fs::read(source)
        .await
        .map_err(|e| TransferError::SourceUnavailable {
            path: source.to_path_buf(),
            source: e,
        })?;

    let document = parse_pools_document(&bytes)?;
    debug!(path = %source.display(), entries = document.len(), "Parsed pools file");

    let mut outcome = ImportOutcome::default();
    for (name, value) in &document {
        let Some((slots, description)) = pool_fields(value) else {
            warn!(pool = %name, "Skipping entry that is not a pool definition");
            outcome.failed.push(name.clone());
            continue;
        };

        let slots = parse_slots(slots).map_err(StoreError::from)?;
        let description = description.as_str().ok_or_else(|| {
            StoreError::Validation(format!("bad value for `description`: {description}"))
        })?;

        let pool = store.create(name, slots, description).await?;
        outcome.imported.push(pool);
    }

    info!(
        imported = outcome.imported.len(),
        failed = outcome.failed.len(),
        "Pool import finished"
    );
    Ok(outcome)
}

/// Export every pool in `store` to the file at `destination`.
///
/// Returns the pools as listed by the store.
///
/// # Errors
///
/// - [`TransferError::Store`] if listing fails.
/// - [`TransferError::DestinationUnavailable`] if the file cannot be
///   written.
pub async fn export_pools<S: PoolStore>(
    store: &mut S,
    destination: &Path,
) -> Result<Vec<Pool>, TransferError> {
    let pools = store.list().await?;
    let rendered = render_pools_document(&pools)?;

    tokio::fs::write(destination, rendered)
        .await
        .map_err(|e| TransferError::DestinationUnavailable {
            path: destination.to_path_buf(),
            source: e,
        })?;

    info!(count = pools.len(), path = %destination.display(), "Pool export finished");
    Ok(pools)
}

/// Parse a pools document, keeping entries in document order.
///
/// # Errors
///
/// Returns [`TransferError::MalformedInput`] if the bytes are not UTF-8
/// JSON or the top level is not an object.
pub fn parse_pools_document(bytes: &[u8]) -> Result<Map<String, Value>, TransferError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TransferError::MalformedInput(format!(
            "expected an object of pools, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(TransferError::MalformedInput(e.to_string())),
    }
}

/// Render pools as a pools document: sorted keys, 4-space indent, no
/// trailing newline.
///
/// # Errors
///
/// Returns [`TransferError::Encoding`] if serialization fails.
pub fn render_pools_document(pools: &[Pool]) -> Result<String, TransferError> {
    let entries: BTreeMap<&str, PoolFileEntry<'_>> = pools
        .iter()
        .map(|pool| {
            (
                pool.name.as_str(),
                PoolFileEntry {
                    description: &pool.description,
                    slots: pool.slots,
                },
            )
        })
        .collect();

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    entries
        .serialize(&mut serializer)
        .map_err(|e| TransferError::Encoding(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| TransferError::Encoding(e.to_string()))
}

/// The `slots` and `description` values of a well-formed entry.
fn pool_fields(value: &Value) -> Option<(&Value, &Value)> {
    let fields = value.as_object()?;
    if fields.len() != 2 {
        return None;
    }
    Some((fields.get("slots")?, fields.get("description")?))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
