//! Transaction signing and submission seam.
//!
//! The sequencer never talks to the node directly for writes; it hands fully
//! formed [`TransactionRequest`]s to a [`Wallet`]. The default implementation
//! submits through the RPC node's managed account, which is how headless
//! deployments run.

use {
    alloy::{
        primitives::{Address, B256},
        providers::{DynProvider, Provider},
        rpc::types::TransactionRequest,
    },
    anyhow::{Context, Result},
    async_trait::async_trait,
    std::time::Duration,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TxStatus {
    Success,
    Reverted,
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait Wallet: Send + Sync {
    /// The currently connected account, or `None` when not connected yet.
    fn address(&self) -> Option<Address>;

    /// Establishes a connection and returns the account to send from. Fails
    /// when no account can be resolved at all.
    async fn connect(&self) -> Result<Address>;

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256>;

    /// Blocks until the transaction is mined and reports whether it executed
    /// successfully.
    async fn wait_for_receipt(&self, hash: B256) -> Result<TxStatus>;
}

const RECEIPT_POLL: Duration = Duration::from_secs(2);

/// Wallet backed by an account the connected RPC node manages. With no
/// account configured it reports disconnected and submissions fail upfront.
pub struct NodeWallet {
    provider: DynProvider,
    account: Option<Address>,
}

impl NodeWallet {
    pub fn new(provider: DynProvider, account: Option<Address>) -> Self {
        Self { provider, account }
    }
}

#[async_trait]
impl Wallet for NodeWallet {
    fn address(&self) -> Option<Address> {
        self.account
    }

    async fn connect(&self) -> Result<Address> {
        self.account.context("no account configured")
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("failed to submit transaction")?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<TxStatus> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(hash)
                .await
                .context("failed to fetch receipt")?;
            match receipt {
                Some(receipt) if receipt.status() => return Ok(TxStatus::Success),
                Some(_) => return Ok(TxStatus::Reverted),
                None => tokio::time::sleep(RECEIPT_POLL).await,
            }
        }
    }
}
