use crate::snapshot::{CurrencySnapshot, SnapshotDraft};
use crate::store::SnapshotStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

/// Fjall-backed snapshot store.
///
/// Rows are keyed `{currency_id}/{timestamp}` with zero-padded components,
/// so byte order equals (currency_id, timestamp) order and the most recent
/// snapshot for a currency is the last entry under its prefix.
pub struct FjallSnapshotStore {
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl FjallSnapshotStore {
    pub fn open(data_dir: &Path, collection: &str) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let keyspace = fjall::Config::new(data_dir).open()?;
        let partition = keyspace.open_partition(collection, PartitionCreateOptions::default())?;

        Ok(Self {
            _keyspace: keyspace,
            partition,
        })
    }

    fn row_key(currency_id: u32, timestamp: &DateTime<Utc>) -> String {
        let nanos = timestamp.timestamp_nanos_opt().unwrap_or_default();
        format!("{currency_id:010}/{nanos:020}")
    }

    fn currency_prefix(currency_id: u32) -> String {
        format!("{currency_id:010}/")
    }
}

#[async_trait]
impl SnapshotStore for FjallSnapshotStore {
    async fn append(&self, draft: SnapshotDraft) -> Result<CurrencySnapshot> {
        // The store assigns the timestamp at write time, not the caller.
        let snapshot = draft.into_snapshot(Utc::now());
        let key = Self::row_key(snapshot.currency_id, &snapshot.timestamp);

        self.partition
            .insert(&key, serde_json::to_vec(&snapshot)?)
            .with_context(|| format!("Failed to append snapshot row: {key}"))?;

        debug!(key, "Store APPEND");
        Ok(snapshot)
    }

    async fn last_known(&self, currency_id: u32) -> Result<Option<CurrencySnapshot>> {
        let Some(entry) = self
            .partition
            .prefix(Self::currency_prefix(currency_id))
            .next_back()
        else {
            debug!(currency_id, "Store MISS, never priced");
            return Ok(None);
        };

        let (_key, value) = entry?;
        let snapshot: CurrencySnapshot =
            serde_json::from_slice(&value).context("Failed to decode snapshot row")?;

        debug!(currency_id, gold_rate = snapshot.gold_rate, "Store HIT");
        Ok(Some(snapshot))
    }
}
