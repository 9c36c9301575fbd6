//! Readiness signaling toward an embedding host.
//!
//! The client declares itself ready as soon as it has something meaningful
//! to show, but never later than [`MAX_READY_DELAY`] after startup. A slow
//! node must not keep the host's splash screen up indefinitely.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

pub const MAX_READY_DELAY: Duration = Duration::from_millis(1_200);

/// Identity of the person the host is embedding the client for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Viewer {
    pub fid: u64,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait HostSignaling: Send + Sync {
    /// The viewer the host resolved, if it resolved one.
    fn viewer(&self) -> Option<Viewer>;

    /// Tells the host the client has rendered something meaningful.
    fn ready(&self);
}

/// Host used when the client runs standalone: no viewer, readiness is only
/// logged.
pub struct LogHost;

impl HostSignaling for LogHost {
    fn viewer(&self) -> Option<Viewer> {
        None
    }

    fn ready(&self) {
        tracing::info!("client ready");
    }
}

/// Fires the host's ready callback exactly once, no matter how many code
/// paths race to trigger it.
pub struct ReadySignal {
    host: Arc<dyn HostSignaling>,
    fired: AtomicBool,
}

impl ReadySignal {
    pub fn new(host: Arc<dyn HostSignaling>) -> Self {
        Self {
            host,
            fired: AtomicBool::new(false),
        }
    }

    /// Signals readiness; later calls are no-ops.
    pub fn fire(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.host.ready();
        }
    }
}

/// Waits for `first_data` or [`MAX_READY_DELAY`], whichever comes first,
/// then fires the signal.
pub async fn signal_when_ready(signal: &ReadySignal, first_data: impl Future<Output = ()>) {
    tokio::select! {
        () = first_data => (),
        () = tokio::time::sleep(MAX_READY_DELAY) => (),
    }
    signal.fire();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fires_at_most_once() {
        let mut host = MockHostSignaling::new();
        host.expect_ready().times(1).return_const(());

        let signal = ReadySignal::new(Arc::new(host));
        signal.fire();
        signal.fire();
    }

    #[tokio::test(start_paused = true)]
    async fn data_beats_the_timer() {
        let mut host = MockHostSignaling::new();
        host.expect_ready().times(1).return_const(());

        let signal = ReadySignal::new(Arc::new(host));
        signal_when_ready(&signal, std::future::ready(())).await;
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_without_data() {
        let mut host = MockHostSignaling::new();
        host.expect_ready().times(1).return_const(());

        let signal = ReadySignal::new(Arc::new(host));
        signal_when_ready(&signal, std::future::pending()).await;
    }
}
