use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Best (lowest) live sell rate for the currency, in gold per unit.
    ///
    /// `Ok(None)` means the market currently has no usable offer; transport
    /// and decode failures are errors.
    async fn fetch_rate(&self, currency_id: u32) -> Result<Option<f64>>;
}
