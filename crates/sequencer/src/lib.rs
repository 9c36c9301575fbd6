//! Write side of the mining game: a single-flight state machine that turns
//! "mine this slot" and "buy the pot" intents into signed transactions.
//!
//! Only one submission may be in flight at a time. Every flow re-reads the
//! chain immediately before building calldata so epoch ids and price caps are
//! as fresh as possible, reports success or failure on a watch channel, and
//! returns the machine to idle shortly after.

pub mod wallet;

pub use wallet::{NodeWallet, TxStatus, Wallet};

use {
    alloy::{
        primitives::{Address, Bytes, TxKind, U256},
        rpc::types::{TransactionInput, TransactionRequest},
        sol_types::SolCall,
    },
    chain_state::{RefreshHandle, StateReading},
    contracts::{Deployment, GridMulticall, IERC20},
    number::U256Ext,
    std::{
        sync::Arc,
        time::{Duration, SystemTime, UNIX_EPOCH},
    },
    thiserror::Error as ThisError,
    tokio::sync::watch,
};

/// How long a `mine` transaction stays valid. Generous because the price cap
/// already bounds the damage of late inclusion.
const MINE_DEADLINE: Duration = Duration::from_secs(15 * 60);
/// How long a `buy` transaction stays valid. Tight because the auction price
/// only decays and a late fill would overpay.
const BUY_DEADLINE: Duration = Duration::from_secs(5 * 60);

/// Delay before the machine returns to idle after an outcome is published.
const RESET_DELAY: Duration = Duration::from_millis(500);
/// How long the published outcome stays visible in total.
const OUTCOME_HOLD: Duration = Duration::from_millis(3_000);

/// Where an in-flight submission currently is. A mine submission is a single
/// transaction and enters [`Step::Buying`] directly; a pot purchase passes
/// through [`Step::Approving`] first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    Idle,
    Approving,
    Buying,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0} transaction reverted")]
    Reverted(&'static str),
    #[error(transparent)]
    Read(#[from] chain_state::Error),
    #[error(transparent)]
    Wallet(#[from] anyhow::Error),
}

pub struct TransactionSequencer {
    wallet: Arc<dyn Wallet>,
    reader: Arc<dyn StateReading>,
    deployment: Deployment,
    step: Arc<watch::Sender<Step>>,
    outcome: Arc<watch::Sender<Option<Outcome>>>,
    /// Pollers to nudge after a confirmed transaction changed their state.
    refresh: Vec<RefreshHandle>,
}

impl TransactionSequencer {
    pub fn new(
        wallet: Arc<dyn Wallet>,
        reader: Arc<dyn StateReading>,
        deployment: Deployment,
        refresh: Vec<RefreshHandle>,
    ) -> Self {
        Self {
            wallet,
            reader,
            deployment,
            step: Arc::new(watch::channel(Step::Idle).0),
            outcome: Arc::new(watch::channel(None).0),
            refresh,
        }
    }

    pub fn steps(&self) -> watch::Receiver<Step> {
        self.step.subscribe()
    }

    pub fn outcomes(&self) -> watch::Receiver<Option<Outcome>> {
        self.outcome.subscribe()
    }

    /// Claims the slot at `index`, painting it with `color`.
    ///
    /// Returns `None` without doing anything when another submission is
    /// already in flight.
    pub async fn submit_mine(&self, index: u64, color: String) -> Option<Outcome> {
        if !self.try_begin(Step::Buying) {
            tracing::debug!(index, "submission already in flight");
            return None;
        }
        let result = self.mine_flow(index, color).await;
        Some(self.finish(result))
    }

    /// Buys the accumulated pot in the account-wide auction, approving the
    /// payment token first.
    ///
    /// Returns `None` without doing anything when another submission is
    /// already in flight.
    pub async fn submit_buy(&self) -> Option<Outcome> {
        if !self.try_begin(Step::Approving) {
            tracing::debug!("submission already in flight");
            return None;
        }
        let result = self.buy_flow().await;
        Some(self.finish(result))
    }

    async fn mine_flow(&self, index: u64, color: String) -> Result<(), Error> {
        let account = self.resolve_account().await?;
        let slot = self.reader.fetch_slot(index).await?;
        let fee = self.reader.entropy_fee().await?;
        let call = GridMulticall::mineCall {
            provider: self.deployment.mining_provider,
            index: U256::from(index),
            epochId: slot.epoch_id,
            deadline: deadline(MINE_DEADLINE),
            // Tolerate small price movements between the read and inclusion.
            maxPrice: slot.price.mul_div(105, 100),
            color,
        };
        let tx = request(
            account,
            self.deployment.multicall,
            slot.price.saturating_add(fee),
            call.abi_encode(),
        );
        self.execute(tx, "mine").await
    }

    async fn buy_flow(&self) -> Result<(), Error> {
        let account = self.resolve_account().await?;
        let auction = self.reader.fetch_auction(account).await?;
        let approve = IERC20::approveCall {
            spender: self.deployment.multicall,
            amount: auction.price,
        };
        let tx = request(
            account,
            self.deployment.payment_token,
            U256::ZERO,
            approve.abi_encode(),
        );
        self.execute(tx, "approve").await?;
        self.advance(Step::Buying);

        // The approval may have taken long enough for the auction epoch to
        // roll over; re-read so a stale epoch id fails here instead of on
        // chain.
        let auction = self.reader.fetch_auction(account).await?;
        let buy = GridMulticall::buyCall {
            epochId: U256::from(auction.epoch_id),
            deadline: deadline(BUY_DEADLINE),
            maxPaymentTokenAmount: auction.price,
        };
        let tx = request(account, self.deployment.multicall, U256::ZERO, buy.abi_encode());
        self.execute(tx, "buy").await
    }

    /// The connected account, connecting on demand.
    async fn resolve_account(&self) -> Result<Address, Error> {
        match self.wallet.address() {
            Some(account) => Ok(account),
            None => Ok(self.wallet.connect().await?),
        }
    }

    async fn execute(&self, tx: TransactionRequest, label: &'static str) -> Result<(), Error> {
        let hash = self.wallet.send_transaction(tx).await?;
        tracing::debug!(?hash, label, "transaction submitted");
        match self.wallet.wait_for_receipt(hash).await? {
            TxStatus::Success => Ok(()),
            TxStatus::Reverted => Err(Error::Reverted(label)),
        }
    }

    /// Atomically moves the machine out of idle; fails when a submission is
    /// already in flight.
    fn try_begin(&self, first: Step) -> bool {
        self.step.send_if_modified(|step| {
            if *step == Step::Idle {
                *step = first;
                true
            } else {
                false
            }
        })
    }

    fn advance(&self, step: Step) {
        let _ = self.step.send(step);
    }

    /// Publishes the outcome and schedules the return to idle. The outcome
    /// stays visible a while longer than the step so consumers can show it
    /// after the machine is already accepting new submissions.
    fn finish(&self, result: Result<(), Error>) -> Outcome {
        let outcome = match result {
            Ok(()) => {
                for handle in &self.refresh {
                    handle.refresh();
                }
                Outcome::Success
            }
            Err(err) => {
                tracing::warn!(?err, "submission failed");
                Outcome::Failure
            }
        };
        let _ = self.outcome.send(Some(outcome));
        let step = Arc::clone(&self.step);
        let published = Arc::clone(&self.outcome);
        tokio::task::spawn(async move {
            tokio::time::sleep(RESET_DELAY).await;
            let _ = step.send(Step::Idle);
            tokio::time::sleep(OUTCOME_HOLD - RESET_DELAY).await;
            let _ = published.send(None);
        });
        outcome
    }
}

fn request(from: Address, to: Address, value: U256, data: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        from: Some(from),
        to: Some(TxKind::Call(to)),
        value: (!value.is_zero()).then_some(value),
        input: TransactionInput::new(Bytes::from(data)),
        ..Default::default()
    }
}

fn deadline(validity: Duration) -> U256 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    U256::from((now + validity).as_secs())
}

#[cfg(test)]
mod tests {
    use {
        super::{wallet::MockWallet, *},
        alloy::primitives::{B256, address},
        async_trait::async_trait,
        chain_state::{AuctionState, MockStateReading, SlotState},
        std::sync::Mutex,
        tokio::sync::Notify,
    };

    fn account() -> Address {
        address!("0x0000000000000000000000000000000000000001")
    }

    fn deployment() -> Deployment {
        Deployment {
            multicall: address!("0x00000000000000000000000000000000000000aa"),
            pixel: address!("0x00000000000000000000000000000000000000bb"),
            payment_token: address!("0x00000000000000000000000000000000000000cc"),
            weth: address!("0x00000000000000000000000000000000000000dd"),
            mining_provider: address!("0x00000000000000000000000000000000000000ee"),
        }
    }

    fn sequencer(wallet: MockWallet, reader: MockStateReading) -> TransactionSequencer {
        TransactionSequencer::new(Arc::new(wallet), Arc::new(reader), deployment(), vec![])
    }

    #[tokio::test]
    async fn missing_account_fails_without_sending() {
        let mut wallet = MockWallet::new();
        wallet.expect_address().returning(|| None);
        wallet
            .expect_connect()
            .returning(|| Err(anyhow::anyhow!("no connector available")));
        wallet.expect_send_transaction().never();

        let sequencer = sequencer(wallet, MockStateReading::new());
        assert_eq!(sequencer.submit_buy().await, Some(Outcome::Failure));
        assert_eq!(*sequencer.outcomes().borrow(), Some(Outcome::Failure));
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_approval_stops_the_purchase() {
        let mut wallet = MockWallet::new();
        wallet.expect_address().returning(|| Some(account()));
        wallet
            .expect_send_transaction()
            .times(1)
            .returning(|_| Ok(B256::ZERO));
        wallet
            .expect_wait_for_receipt()
            .times(1)
            .returning(|_| Ok(TxStatus::Reverted));

        let mut reader = MockStateReading::new();
        reader.expect_fetch_auction().times(1).returning(|_| {
            Ok(AuctionState {
                epoch_id: 7,
                price: U256::from(1_000u64),
                ..Default::default()
            })
        });

        let sequencer = sequencer(wallet, reader);
        assert_eq!(sequencer.submit_buy().await, Some(Outcome::Failure));
        // The machine never advanced past the approval.
        assert_eq!(*sequencer.steps().borrow(), Step::Approving);
    }

    #[tokio::test(start_paused = true)]
    async fn buy_uses_the_epoch_from_a_fresh_read() {
        let sent = Arc::new(Mutex::new(Vec::new()));

        let mut wallet = MockWallet::new();
        wallet.expect_address().returning(|| Some(account()));
        wallet.expect_send_transaction().times(2).returning({
            let sent = sent.clone();
            move |tx| {
                sent.lock().unwrap().push(tx);
                Ok(B256::ZERO)
            }
        });
        wallet
            .expect_wait_for_receipt()
            .times(2)
            .returning(|_| Ok(TxStatus::Success));

        // The epoch rolls over while the approval confirms.
        let epochs = Arc::new(Mutex::new(vec![2u16, 1]));
        let mut reader = MockStateReading::new();
        reader.expect_fetch_auction().times(2).returning({
            let epochs = epochs.clone();
            move |_| {
                Ok(AuctionState {
                    epoch_id: epochs.lock().unwrap().pop().unwrap(),
                    price: U256::from(500u64),
                    ..Default::default()
                })
            }
        });

        let sequencer = sequencer(wallet, reader);
        assert_eq!(sequencer.submit_buy().await, Some(Outcome::Success));

        let sent = sent.lock().unwrap();
        let approval = &sent[0];
        assert_eq!(approval.to, Some(TxKind::Call(deployment().payment_token)));
        let data = approval.input.input.clone().unwrap();
        let call = IERC20::approveCall::abi_decode(&data).unwrap();
        assert_eq!(call.spender, deployment().multicall);
        assert_eq!(call.amount, U256::from(500u64));

        let purchase = &sent[1];
        assert_eq!(purchase.to, Some(TxKind::Call(deployment().multicall)));
        let data = purchase.input.input.clone().unwrap();
        let call = GridMulticall::buyCall::abi_decode(&data).unwrap();
        assert_eq!(call.epochId, U256::from(2u64));
        assert_eq!(call.maxPaymentTokenAmount, U256::from(500u64));
    }

    #[tokio::test(start_paused = true)]
    async fn mine_caps_the_price_and_pays_the_fee() {
        let sent = Arc::new(Mutex::new(Vec::new()));

        let mut wallet = MockWallet::new();
        wallet.expect_address().returning(|| Some(account()));
        wallet.expect_send_transaction().times(1).returning({
            let sent = sent.clone();
            move |tx| {
                sent.lock().unwrap().push(tx);
                Ok(B256::ZERO)
            }
        });
        wallet
            .expect_wait_for_receipt()
            .times(1)
            .returning(|_| Ok(TxStatus::Success));

        let mut reader = MockStateReading::new();
        reader.expect_fetch_slot().times(1).returning(|_| {
            Ok(SlotState {
                epoch_id: U256::from(9u64),
                price: U256::from(1_000u64),
                ..Default::default()
            })
        });
        reader
            .expect_entropy_fee()
            .times(1)
            .returning(|| Ok(U256::from(25u64)));

        let sequencer = sequencer(wallet, reader);
        assert_eq!(
            sequencer.submit_mine(3, "#ff8800".to_owned()).await,
            Some(Outcome::Success)
        );

        let sent = sent.lock().unwrap();
        let tx = &sent[0];
        assert_eq!(tx.to, Some(TxKind::Call(deployment().multicall)));
        assert_eq!(tx.value, Some(U256::from(1_025u64)));
        let data = tx.input.input.clone().unwrap();
        let call = GridMulticall::mineCall::abi_decode(&data).unwrap();
        assert_eq!(call.provider, deployment().mining_provider);
        assert_eq!(call.index, U256::from(3u64));
        assert_eq!(call.epochId, U256::from(9u64));
        assert_eq!(call.maxPrice, U256::from(1_050u64));
        assert_eq!(call.color, "#ff8800");

        // The machine returns to idle before the outcome clears.
        tokio::time::sleep(RESET_DELAY + Duration::from_millis(100)).await;
        assert_eq!(*sequencer.steps().borrow(), Step::Idle);
        assert_eq!(*sequencer.outcomes().borrow(), Some(Outcome::Success));
        tokio::time::sleep(OUTCOME_HOLD).await;
        assert_eq!(*sequencer.outcomes().borrow(), None);
    }

    /// Wallet whose receipts only arrive once the test says so.
    struct BlockingWallet {
        release: Notify,
    }

    #[async_trait]
    impl Wallet for BlockingWallet {
        fn address(&self) -> Option<Address> {
            Some(account())
        }

        async fn connect(&self) -> anyhow::Result<Address> {
            Ok(account())
        }

        async fn send_transaction(&self, _tx: TransactionRequest) -> anyhow::Result<B256> {
            Ok(B256::ZERO)
        }

        async fn wait_for_receipt(&self, _hash: B256) -> anyhow::Result<TxStatus> {
            self.release.notified().await;
            Ok(TxStatus::Success)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submissions_are_rejected() {
        let wallet = Arc::new(BlockingWallet {
            release: Notify::new(),
        });

        let mut reader = MockStateReading::new();
        reader
            .expect_fetch_slot()
            .times(1)
            .returning(|_| Ok(SlotState::default()));
        reader
            .expect_entropy_fee()
            .times(1)
            .returning(|| Ok(U256::ZERO));

        let sequencer = Arc::new(TransactionSequencer::new(
            wallet.clone(),
            Arc::new(reader),
            deployment(),
            vec![],
        ));

        let first = tokio::task::spawn({
            let sequencer = sequencer.clone();
            async move { sequencer.submit_mine(0, "#ffffff".to_owned()).await }
        });
        // Let the first submission reach the receipt wait.
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(sequencer.submit_mine(1, "#000000".to_owned()).await, None);
        assert_eq!(sequencer.submit_buy().await, None);

        wallet.release.notify_one();
        assert_eq!(first.await.unwrap(), Some(Outcome::Success));
    }
}
