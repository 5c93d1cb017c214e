use crate::snapshot::{CurrencySnapshot, SnapshotDraft};
use crate::store::SnapshotStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory snapshot store, used by tests.
#[derive(Default)]
pub struct MemorySnapshotStore {
    rows: Mutex<Vec<CurrencySnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows in insertion order.
    pub async fn rows(&self) -> Vec<CurrencySnapshot> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn append(&self, draft: SnapshotDraft) -> Result<CurrencySnapshot> {
        let snapshot = draft.into_snapshot(Utc::now());
        debug!(currency_id = snapshot.currency_id, "Store APPEND");
        self.rows.lock().await.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn last_known(&self, currency_id: u32) -> Result<Option<CurrencySnapshot>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|s| s.currency_id == currency_id)
            .max_by_key(|s| s.timestamp)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::RateSource;

    fn draft(currency_id: u32, gold_rate: f64) -> SnapshotDraft {
        SnapshotDraft {
            country: "Alba".to_string(),
            currency: "ALB".to_string(),
            currency_id,
            gold_rate,
            source: RateSource::Live,
        }
    }

    #[tokio::test]
    async fn test_last_known_returns_newest() {
        let store = MemorySnapshotStore::new();
        store.append(draft(7, 1.0)).await.unwrap();
        store.append(draft(7, 2.0)).await.unwrap();

        let latest = store.last_known(7).await.unwrap().unwrap();
        assert_eq!(latest.gold_rate, 2.0);
    }

    #[tokio::test]
    async fn test_last_known_absent_currency() {
        let store = MemorySnapshotStore::new();
        store.append(draft(7, 1.0)).await.unwrap();

        assert!(store.last_known(8).await.unwrap().is_none());
    }
}
