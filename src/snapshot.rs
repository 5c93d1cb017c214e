//! Snapshot types and the per-run orchestrator.

use crate::country_provider::{CountryProvider, CountryRecord};
use crate::rate_provider::RateProvider;
use crate::store::SnapshotStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How a snapshot's rate was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Cached,
}

/// One persisted rate observation for one currency. Append-only; the
/// timestamp is assigned by the store at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencySnapshot {
    pub country: String,
    pub currency: String,
    pub currency_id: u32,
    pub gold_rate: f64,
    pub unit: String,
    pub source: RateSource,
    pub timestamp: DateTime<Utc>,
}

/// A snapshot minus the write-time timestamp.
#[derive(Debug, Clone)]
pub struct SnapshotDraft {
    pub country: String,
    pub currency: String,
    pub currency_id: u32,
    pub gold_rate: f64,
    pub source: RateSource,
}

impl SnapshotDraft {
    pub fn into_snapshot(self, timestamp: DateTime<Utc>) -> CurrencySnapshot {
        CurrencySnapshot {
            country: self.country,
            currency: self.currency,
            currency_id: self.currency_id,
            gold_rate: self.gold_rate,
            unit: "1g".to_string(),
            source: self.source,
            timestamp,
        }
    }
}

/// Outcome of resolving one currency's rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Live(f64),
    Cached(f64),
    Unresolved,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub stored: u64,
    pub reused: u64,
    pub skipped: u64,
}

impl RunStats {
    pub fn total(&self) -> u64 {
        self.stored + self.skipped
    }
}

/// Drives one snapshot run over all countries, sequentially.
///
/// Capabilities are injected so tests can substitute fakes. Per-currency
/// failures are isolated: a transport or persist error for one currency is
/// logged and counted as skipped, never aborting the run.
pub struct SnapshotRunner<'a> {
    countries: &'a dyn CountryProvider,
    rates: &'a dyn RateProvider,
    store: &'a dyn SnapshotStore,
}

impl<'a> SnapshotRunner<'a> {
    pub fn new(
        countries: &'a dyn CountryProvider,
        rates: &'a dyn RateProvider,
        store: &'a dyn SnapshotStore,
    ) -> Self {
        Self {
            countries,
            rates,
            store,
        }
    }

    /// Performs one run to completion and returns its stats.
    ///
    /// An empty country list is a valid outcome (all-zero stats), not an
    /// error. Currencies are processed one at a time to stay within the
    /// upstream rate-limit tolerance.
    pub async fn run_once(&self, progress: Option<&ProgressBar>) -> Result<RunStats> {
        let countries = self.countries.fetch_countries().await?;
        info!(total = countries.len(), "Fetched country list");

        let mut stats = RunStats::default();
        if countries.is_empty() {
            return Ok(stats);
        }

        if let Some(pb) = progress {
            pb.set_length(countries.len() as u64);
        }

        for country in &countries {
            self.process_country(country, &mut stats).await;
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        Ok(stats)
    }

    async fn process_country(&self, country: &CountryRecord, stats: &mut RunStats) {
        let Some(currency_id) = country.currency_id() else {
            debug!(country = %country.name, "No currency id, skipping");
            stats.skipped += 1;
            return;
        };

        let resolution = match self.resolve_rate(currency_id).await {
            Ok(resolution) => resolution,
            Err(error) => {
                warn!(country = %country.name, currency_id, %error, "Rate resolution failed");
                stats.skipped += 1;
                return;
            }
        };

        let (gold_rate, source) = match resolution {
            Resolution::Live(rate) => (rate, RateSource::Live),
            Resolution::Cached(rate) => (rate, RateSource::Cached),
            Resolution::Unresolved => {
                debug!(country = %country.name, currency_id, "No live or cached rate, skipping");
                stats.skipped += 1;
                return;
            }
        };

        let draft = SnapshotDraft {
            country: country.name.clone(),
            currency: country.currency_name().to_string(),
            currency_id,
            gold_rate,
            source,
        };

        match self.store.append(draft).await {
            Ok(_) => {
                debug!(country = %country.name, gold_rate, ?source, "Stored snapshot");
                stats.stored += 1;
                if source == RateSource::Cached {
                    stats.reused += 1;
                }
            }
            Err(error) => {
                warn!(country = %country.name, currency_id, %error, "Failed to persist snapshot");
                stats.skipped += 1;
            }
        }
    }

    /// Live quote first, last-known fallback second.
    async fn resolve_rate(&self, currency_id: u32) -> Result<Resolution> {
        if let Some(rate) = self.rates.fetch_rate(currency_id).await? {
            return Ok(Resolution::Live(rate));
        }

        match self.store.last_known(currency_id).await? {
            Some(previous) => Ok(Resolution::Cached(previous.gold_rate)),
            None => Ok(Resolution::Unresolved),
        }
    }
}
