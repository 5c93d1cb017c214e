pub mod disk;
pub mod memory;

use crate::snapshot::{CurrencySnapshot, SnapshotDraft};
use anyhow::Result;
use async_trait::async_trait;

/// Append-only snapshot persistence with a "most recent by currency" lookup.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Appends a snapshot, stamping it with the store's write-time instant.
    async fn append(&self, draft: SnapshotDraft) -> Result<CurrencySnapshot>;

    /// Most recent snapshot for the currency, or `None` when it was never
    /// priced before. Absence is a normal outcome, not an error.
    async fn last_known(&self, currency_id: u32) -> Result<Option<CurrencySnapshot>>;
}
