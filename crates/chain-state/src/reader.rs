use {
    crate::state::{AuctionState, MinerState, SlotState},
    alloy::primitives::{Address, U256},
    async_trait::async_trait,
    thiserror::Error as ThisError,
};

#[derive(Clone, Debug, ThisError)]
#[error("chain read failed: {0}")]
pub struct Error(pub String);

/// Typed reads against the game contract. Each query is independent,
/// idempotent and side-effect free from the caller's perspective.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait StateReading: Send + Sync {
    async fn fetch_miner(&self, account: Address) -> Result<MinerState, Error>;

    async fn fetch_slot(&self, index: u64) -> Result<SlotState, Error>;

    /// Fetches the inclusive index range in one call.
    async fn fetch_slots(&self, start: u64, end: u64) -> Result<Vec<SlotState>, Error>;

    async fn fetch_auction(&self, account: Address) -> Result<AuctionState, Error>;

    /// Fee the entropy provider charges on top of the slot price.
    async fn entropy_fee(&self) -> Result<U256, Error>;
}

pub struct OnchainStateReader {
    pub multicall: contracts::Instance,
}

impl OnchainStateReader {
    pub fn new(multicall: contracts::Instance) -> Self {
        Self { multicall }
    }
}

#[async_trait]
impl StateReading for OnchainStateReader {
    async fn fetch_miner(&self, account: Address) -> Result<MinerState, Error> {
        self.multicall
            .getMiner(account)
            .call()
            .await
            .map(Into::into)
            .map_err(|err| Error(err.to_string()))
    }

    async fn fetch_slot(&self, index: u64) -> Result<SlotState, Error> {
        self.multicall
            .getSlot(U256::from(index))
            .call()
            .await
            .map(Into::into)
            .map_err(|err| Error(err.to_string()))
    }

    async fn fetch_slots(&self, start: u64, end: u64) -> Result<Vec<SlotState>, Error> {
        self.multicall
            .getSlots(U256::from(start), U256::from(end))
            .call()
            .await
            .map(|states| states.into_iter().map(Into::into).collect())
            .map_err(|err| Error(err.to_string()))
    }

    async fn fetch_auction(&self, account: Address) -> Result<AuctionState, Error> {
        self.multicall
            .getAuction(account)
            .call()
            .await
            .map(Into::into)
            .map_err(|err| Error(err.to_string()))
    }

    async fn entropy_fee(&self) -> Result<U256, Error> {
        self.multicall
            .getEntropyFee()
            .call()
            .await
            .map_err(|err| Error(err.to_string()))
    }
}
