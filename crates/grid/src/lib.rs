//! Pure display logic for the pixel grid: which slots an identity controls,
//! smooth interpolation of mined counters between refreshes, and the small
//! pieces of derived math (PnL, effective rate, ripple detection) the pages
//! show.
//!
//! Everything here is computed from snapshots delivered by `chain-state` and
//! is for display only. None of it feeds back into transactions; the
//! sequencer re-reads authoritative state before submitting.

pub mod interpolate;
pub mod pnl;
pub mod view;

pub use {
    interpolate::{Interpolator, MultiplierCountdown, elapsed_since},
    pnl::slot_pnl,
    view::{
        SLOT_CAPACITY,
        current_index,
        effective_pps,
        owned_indices,
        ripple_source,
    },
};
