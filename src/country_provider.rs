//! Country listing abstractions for the snapshot job.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyRef {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub currency: Option<CurrencyRef>,
}

impl CountryRecord {
    /// Currency id when the record is eligible for rate resolution.
    pub fn currency_id(&self) -> Option<u32> {
        self.currency.as_ref().and_then(|c| c.id)
    }

    pub fn currency_name(&self) -> &str {
        self.currency.as_ref().map_or("", |c| c.name.as_str())
    }
}

#[async_trait]
pub trait CountryProvider: Send + Sync {
    async fn fetch_countries(&self) -> Result<Vec<CountryRecord>>;
}
