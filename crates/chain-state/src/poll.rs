//! Interval polling of contract state.
//!
//! Each polled query gets its own timer; nothing synchronizes a slots refresh
//! with a miner refresh landing at the same moment. A failed fetch logs and
//! keeps the previous snapshot until the next scheduled tick
//! (stale-while-revalidate); there are no retries in between.

use {
    std::{
        fmt::Debug,
        future::Future,
        sync::Arc,
        time::{Duration, Instant},
    },
    tokio::sync::{Notify, watch},
    tracing::Instrument,
};

/// One successfully fetched value plus the metadata consumers need to tell
/// refreshes apart.
#[derive(Clone, Debug)]
pub struct Snapshot<T> {
    pub value: T,
    /// Increases by one on every successful refresh, even when the value is
    /// numerically identical. This is the reset signal for interpolation.
    pub version: u64,
    pub observed_at: Instant,
}

/// Watchers start at `None` ("no data yet") and never regress to it.
pub type StateWatcher<T> = watch::Receiver<Option<Snapshot<T>>>;

/// Requests an immediate out-of-band refresh of one poller, e.g. right after
/// a confirmed transaction changed the polled state.
#[derive(Clone, Debug, Default)]
pub struct RefreshHandle(Arc<Notify>);

impl RefreshHandle {
    pub fn refresh(&self) {
        self.0.notify_one();
    }
}

/// Spawns a task that runs `fetch` on the given interval and publishes the
/// results on the returned watcher.
///
/// The watcher is cloneable so the query only runs once per tick no matter
/// how many consumers there are. The task stops once all receivers are
/// dropped.
pub fn poll<T, F, Fut, E>(
    name: &'static str,
    interval: Duration,
    fetch: F,
) -> (StateWatcher<T>, RefreshHandle)
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send,
    E: Debug,
{
    let (sender, receiver) = watch::channel(None);
    let handle = RefreshHandle::default();
    let notify = handle.0.clone();

    let update_future = async move {
        let mut version = 0u64;
        loop {
            match fetch().await {
                Ok(value) => {
                    version += 1;
                    let snapshot = Snapshot {
                        value,
                        version,
                        observed_at: Instant::now(),
                    };
                    tracing::debug!(version, "refreshed state");
                    if sender.send(Some(snapshot)).is_err() {
                        tracing::debug!("all receivers dropped, stopping poller");
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(?err, "state refresh failed, keeping previous value");
                    if sender.is_closed() {
                        break;
                    }
                }
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => (),
                _ = notify.notified() => (),
            }
        }
    };
    tokio::task::spawn(update_future.instrument(tracing::info_span!("state_poller", name)));

    (receiver, handle)
}
