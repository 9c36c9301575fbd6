//! Read side of the mining game: typed contract state fetching plus interval
//! polling with stale-while-revalidate semantics.
//!
//! All game state is authoritative on chain. This crate only observes it:
//! every query is idempotent, a failed refresh keeps the previous value and
//! is retried on the next scheduled tick, and consumers see "no data yet"
//! instead of errors.

pub mod poll;
pub mod reader;
pub mod state;

pub use {
    poll::{RefreshHandle, Snapshot, StateWatcher, poll},
    reader::{Error, OnchainStateReader, StateReading},
    state::{AuctionState, MinerState, SlotState},
};

#[cfg(any(test, feature = "test-util"))]
pub use reader::MockStateReading;
