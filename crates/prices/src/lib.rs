//! Process-wide ETH/USD price: fetched from an external feed on an interval,
//! cached, and always available synchronously with a hardcoded fallback
//! before the first successful fetch.

pub mod cache;
pub mod coinbase;

pub use {
    cache::{EthUsdPriceCache, FALLBACK_ETH_USD},
    coinbase::CoinbaseEthPrice,
};

use {anyhow::Result, async_trait::async_trait};

/// External ETH/USD price lookup.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait EthPriceEstimating: Send + Sync {
    async fn eth_usd(&self) -> Result<f64>;
}
