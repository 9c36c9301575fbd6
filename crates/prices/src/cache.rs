//! Background-refreshed cache around an [`EthPriceEstimating`]
//! implementation.

use {
    crate::EthPriceEstimating,
    std::{
        sync::{Arc, Mutex, Weak},
        time::Duration,
    },
};

/// Price assumed until the first successful fetch. Intentionally rough; it
/// only affects cosmetic USD conversions.
pub const FALLBACK_ETH_USD: f64 = 3_500.;

/// Cached ETH/USD price, refreshed on a fixed interval by a background task.
///
/// Reads never block on the network. A failed refresh keeps the previous
/// value so the cache degrades to a stale price rather than an error.
pub struct EthUsdPriceCache(Arc<Inner>);

struct Inner {
    estimator: Box<dyn EthPriceEstimating>,
    price: Mutex<f64>,
}

impl EthUsdPriceCache {
    /// Creates the cache and spawns its updater. `fallback` is served until
    /// the first fetch succeeds. The updater performs one fetch immediately
    /// and then again every `interval`, and exits once the cache itself is
    /// dropped.
    pub fn new(estimator: Box<dyn EthPriceEstimating>, fallback: f64, interval: Duration) -> Self {
        let inner = Arc::new(Inner {
            estimator,
            price: Mutex::new(fallback),
        });
        tokio::task::spawn(updater(Arc::downgrade(&inner), interval));
        Self(inner)
    }

    /// The most recently fetched price, or the fallback if no fetch has
    /// succeeded yet.
    pub fn current(&self) -> f64 {
        self.0.price.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).to_owned()
    }
}

async fn updater(inner: Weak<Inner>, interval: Duration) {
    loop {
        let Some(inner) = inner.upgrade() else {
            tracing::debug!("eth price cache dropped; stopping updater");
            return;
        };
        match inner.estimator.eth_usd().await {
            Ok(price) => {
                tracing::debug!(price, "fetched eth price");
                *inner.price.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = price;
            }
            Err(err) => {
                tracing::warn!(?err, "failed to fetch eth price; keeping previous value");
            }
        }
        // Drop the strong reference before sleeping so the cache can be
        // reclaimed mid-interval.
        drop(inner);
        tokio::time::sleep(interval).await;
    }
}
