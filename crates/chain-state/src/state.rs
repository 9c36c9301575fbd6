//! Domain types mirroring the contract's state tuples.
//!
//! All amounts are 18-decimal fixed point unless stated otherwise. These are
//! snapshots: the client never mutates them, it only replaces them with the
//! next successful read.

use {
    alloy::primitives::{Address, U256},
    contracts::GridMulticall,
};

/// Aggregate mining state for one wallet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinerState {
    /// Pixels accrued per second across all controlled slots.
    pub pps: U256,
    /// Price of the pixel token in ETH terms.
    pub pixel_price: U256,
    pub pixel_balance: U256,
    pub eth_balance: U256,
    pub weth_balance: U256,
}

/// One independently auctioned mining slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotState {
    /// Incremented exactly once per successful purchase. Must be echoed back
    /// unchanged in a `mine` transaction; the contract rejects stale epochs.
    pub epoch_id: U256,
    /// Auction price at the start of the current epoch.
    pub init_price: U256,
    /// Unix timestamp the current epoch started at.
    pub start_time: U256,
    /// Current Dutch-auction price, non-increasing within an epoch.
    pub price: U256,
    /// Pixels accrued per second by the controller of this slot.
    pub pps: U256,
    /// Accrual boost, 18-decimal fixed point (1e18 = no boost).
    pub multiplier: U256,
    /// Seconds the multiplier has left.
    pub multiplier_time: U256,
    /// Cumulative pixels mined by this slot as of the read.
    pub mined: U256,
    /// Controlling address, zero when unclaimed.
    pub miner: Address,
    /// Display attribute chosen by the controller, usually a `#RRGGBB` color.
    pub color: String,
}

/// The account-wide secondary auction: pay in the LP token, receive the
/// accumulated wrapped-native pot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuctionState {
    pub epoch_id: u16,
    pub init_price: U256,
    pub start_time: u64,
    pub payment_token: Address,
    pub price: U256,
    /// Price of the payment token in ETH terms.
    pub payment_token_price: U256,
    /// Claimable wrapped-native amount.
    pub weth_accumulated: U256,
    pub weth_balance: U256,
    /// The queried account's payment token balance.
    pub payment_token_balance: U256,
}

impl From<GridMulticall::MinerState> for MinerState {
    fn from(state: GridMulticall::MinerState) -> Self {
        Self {
            pps: state.pps,
            pixel_price: state.pixelPrice,
            pixel_balance: state.pixelBalance,
            eth_balance: state.ethBalance,
            weth_balance: state.wethBalance,
        }
    }
}

impl From<GridMulticall::SlotState> for SlotState {
    fn from(state: GridMulticall::SlotState) -> Self {
        Self {
            epoch_id: state.epochId,
            init_price: state.initPrice,
            start_time: state.startTime,
            price: state.price,
            pps: state.pps,
            multiplier: state.multiplier,
            multiplier_time: state.multiplierTime,
            mined: state.mined,
            miner: state.miner,
            color: state.color,
        }
    }
}

impl From<GridMulticall::AuctionState> for AuctionState {
    fn from(state: GridMulticall::AuctionState) -> Self {
        Self {
            epoch_id: state.epochId,
            init_price: state.initPrice.to::<U256>(),
            start_time: state.startTime.to::<u64>(),
            payment_token: state.paymentToken,
            price: state.price,
            payment_token_price: state.paymentTokenPrice,
            weth_accumulated: state.wethAccumulated,
            weth_balance: state.wethBalance,
            payment_token_balance: state.paymentTokenBalance,
        }
    }
}
