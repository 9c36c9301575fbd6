//! Wiring of the pixel mining client: pollers for the three contract state
//! queries, the ETH/USD price cache, the transaction sequencer and a once a
//! second status report driven by the interpolated counters.

pub mod arguments;
pub mod host;
pub mod profile;

use {
    crate::host::{LogHost, ReadySignal},
    alloy::primitives::Address,
    chain_state::{AuctionState, MinerState, OnchainStateReader, SlotState, StateReading, StateWatcher},
    grid::{Interpolator, MultiplierCountdown},
    number::U256Ext,
    prices::{CoinbaseEthPrice, EthUsdPriceCache},
    sequencer::{NodeWallet, TransactionSequencer},
    std::{
        sync::Arc,
        time::{Duration, SystemTime, UNIX_EPOCH},
    },
};

pub async fn main(args: arguments::Arguments) {
    let provider = ethrpc::provider(&args.node_url);
    let mut deployment = contracts::deployment(&provider)
        .await
        .expect("no game deployment for the connected chain");
    if let Some(address) = args.multicall_address {
        deployment.multicall = address;
    }
    let multicall = contracts::Instance::new(deployment.multicall, provider.clone());
    let reader: Arc<dyn StateReading> = Arc::new(OnchainStateReader::new(multicall));

    let account = args.account;
    let (miners, miner_refresh) = chain_state::poll("miner", args.miner_poll_interval, {
        let reader = reader.clone();
        move || {
            let reader = reader.clone();
            async move { reader.fetch_miner(account.unwrap_or_default()).await }
        }
    });
    let (slots, slots_refresh) = chain_state::poll("slots", args.slots_poll_interval, {
        let reader = reader.clone();
        move || {
            let reader = reader.clone();
            async move { reader.fetch_slots(0, grid::SLOT_CAPACITY - 1).await }
        }
    });
    let (auctions, auction_refresh) = chain_state::poll("auction", args.auction_poll_interval, {
        let reader = reader.clone();
        move || {
            let reader = reader.clone();
            async move { reader.fetch_auction(account.unwrap_or_default()).await }
        }
    });

    let eth_price = EthUsdPriceCache::new(
        Box::new(CoinbaseEthPrice::new(reqwest::Client::new())),
        prices::FALLBACK_ETH_USD,
        args.eth_price_refresh_interval,
    );

    let wallet = Arc::new(NodeWallet::new(provider.clone(), account));
    let sequencer = TransactionSequencer::new(
        wallet,
        reader.clone(),
        deployment,
        vec![miner_refresh, slots_refresh, auction_refresh],
    );

    // Tell the host we are up once the grid has data, or after the grace
    // period if the node is slow.
    let embedding_host: Arc<dyn host::HostSignaling> = Arc::new(LogHost);
    if let Some(viewer) = embedding_host.viewer() {
        tracing::info!(fid = viewer.fid, username = ?viewer.username, "host viewer");
    }
    let ready = ReadySignal::new(embedding_host);
    host::signal_when_ready(&ready, first_snapshot(slots.clone())).await;

    if let (Some(api), Some(account)) = (&args.profile_api, account) {
        let profiles = profile::ProfileClient::new(reqwest::Client::new(), api.clone());
        match profiles.lookup(account).await {
            Some(profile) => tracing::info!(username = profile.username, "tracking account"),
            None => tracing::info!(
                avatar = profile::placeholder_avatar(account),
                "tracking account without a profile"
            ),
        }
    }

    if let Some(index) = args.mine_slot {
        let outcome = sequencer.submit_mine(index, args.mine_color.clone()).await;
        tracing::info!(index, ?outcome, "mine submission finished");
    }
    if args.buy_pot {
        let outcome = sequencer.submit_buy().await;
        tracing::info!(?outcome, "pot purchase finished");
    }

    let status = status_loop(
        account,
        args.selected_slot,
        miners,
        slots,
        auctions,
        eth_price,
    );
    futures::pin_mut!(status);
    tokio::select! {
        () = &mut status => panic!("status loop exited"),
        () = shutdown_signal() => tracing::info!("shutting down"),
    }
}

/// Ticks once a second, advancing the local counters and logging a snapshot
/// of everything a dashboard would show. Parts that have not loaded yet are
/// simply absent from the report; the counters that are available get logged
/// from the first tick.
async fn status_loop(
    account: Option<Address>,
    selected_slot: u64,
    mut miners: StateWatcher<MinerState>,
    mut slots: StateWatcher<Vec<SlotState>>,
    mut auctions: StateWatcher<AuctionState>,
    eth_price: EthUsdPriceCache,
) {
    let mut balance: Option<Interpolator> = None;
    let mut repaints = RepaintTracker::default();
    // Countdown for the presented slot's multiplier, keyed by the snapshot
    // version it was initialized from.
    let mut multiplier: Option<(u64, MultiplierCountdown)> = None;
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let miner = miners
            .borrow_and_update()
            .as_ref()
            .map(|snapshot| (snapshot.value.clone(), snapshot.version));
        if let Some((miner, version)) = &miner {
            if let Some(balance) = balance.as_mut() {
                balance.observe(miner.pixel_balance, miner.pps, *version);
            } else {
                balance = Some(Interpolator::new(miner.pixel_balance, miner.pps, *version));
            }
        }
        if let Some(balance) = balance.as_mut() {
            balance.tick();
        }

        let (owned_count, current, slot_info, repaint) = {
            let snapshot = slots.borrow_and_update();
            match snapshot.as_ref() {
                Some(snapshot) => {
                    let repaint = repaints.observe(snapshot.version, &snapshot.value);
                    let owned = grid::owned_indices(&snapshot.value, account);
                    let current = grid::current_index(&owned, selected_slot as usize);
                    let slot = snapshot.value.get(current).cloned();
                    (
                        owned.len(),
                        current,
                        slot.map(|slot| (slot, snapshot.version)),
                        repaint,
                    )
                }
                None => (0, selected_slot as usize, None, None),
            }
        };
        if let Some((index, color)) = repaint {
            tracing::info!(slot = index, color, "slot repainted");
        }

        if let Some((slot, version)) = &slot_info
            && multiplier.as_ref().is_none_or(|(seen, _)| seen != version)
        {
            multiplier = Some((
                *version,
                MultiplierCountdown::new(slot.multiplier_time.saturating_to()),
            ));
        }
        if let Some((_, countdown)) = multiplier.as_mut() {
            countdown.tick();
        }

        let eth_usd = eth_price.current();
        let pot = auctions
            .borrow_and_update()
            .as_ref()
            .map(|snapshot| snapshot.value.weth_accumulated)
            .unwrap_or_default();

        let miner = miner.as_ref().map(|(miner, _)| miner);
        let slot = slot_info.as_ref().map(|(slot, _)| slot);
        let pps = grid::effective_pps(slot, miner);

        tracing::info!(
            balance = balance
                .as_ref()
                .map(|balance| balance.value().to_f64_units(18)),
            balance_usd = balance_usd(balance.as_ref(), miner, eth_usd),
            owned_slots = owned_count,
            slot = current,
            slot_price_eth = slot.map(|slot| slot.price.to_f64_units(18)),
            slot_pps = pps.to_f64_units(18),
            slot_pnl_usd = slot.map(|slot| {
                grid::pnl::eth_to_usd(grid::slot_pnl(slot.price, slot.init_price), eth_usd)
            }),
            slot_age_secs = slot
                .map(|slot| grid::elapsed_since(slot.start_time.saturating_to(), now_secs())),
            multiplier_secs = multiplier.map(|(_, countdown)| countdown.remaining()),
            pot_eth = pot.to_f64_units(18),
            eth_usd,
            "status",
        );
    }
}

/// USD value of the interpolated pixel balance. `None` until both the balance
/// and the pixel price have loaded.
fn balance_usd(
    balance: Option<&Interpolator>,
    miner: Option<&MinerState>,
    eth_usd: f64,
) -> Option<f64> {
    let balance = balance?;
    let miner = miner?;
    Some(grid::pnl::pixels_to_usd(
        balance.value(),
        miner.pixel_price,
        eth_usd,
    ))
}

/// Remembers the last seen grid snapshot and reports the slot that changed
/// color when a newer one arrives.
#[derive(Default)]
struct RepaintTracker {
    last: Option<(u64, Vec<SlotState>)>,
}

impl RepaintTracker {
    fn observe(&mut self, version: u64, slots: &[SlotState]) -> Option<(usize, String)> {
        if self.last.as_ref().is_some_and(|(seen, _)| *seen == version) {
            return None;
        }
        let repaint = match &self.last {
            Some((_, previous)) => grid::ripple_source(previous, slots)
                .map(|(index, color)| (index, color.to_owned())),
            None => None,
        };
        self.last = Some((version, slots.to_vec()));
        repaint
    }
}

async fn first_snapshot<T: Clone + Send + Sync>(mut watcher: StateWatcher<T>) {
    let _ = watcher.wait_for(|snapshot| snapshot.is_some()).await;
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(unix)]
async fn shutdown_signal() {
    // Intercept signals for graceful shutdown. Kubernetes sends sigterm,
    // Ctrl-C sends sigint.
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .unwrap()
            .recv()
            .await
    };
    let sigint = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .unwrap()
            .recv()
            .await;
    };
    futures::pin_mut!(sigint);
    futures::pin_mut!(sigterm);
    futures::future::select(sigterm, sigint).await;
}

#[cfg(windows)]
async fn shutdown_signal() {
    // No support for signal handling on Windows.
    std::future::pending().await
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::U256,
        number::EthUnit,
    };

    fn slot(color: &str) -> SlotState {
        SlotState {
            color: color.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn repaint_needs_a_newer_snapshot() {
        let mut repaints = RepaintTracker::default();

        // The initial load is not a repaint.
        let first = vec![slot("#ff0000"), slot("#00ff00")];
        assert_eq!(repaints.observe(1, &first), None);

        // Re-reading the same version must not report anything, even if the
        // caller hands in different data.
        let mut changed = first.clone();
        changed[1].color = "#123abc".to_string();
        assert_eq!(repaints.observe(1, &changed), None);

        // A newer version with a changed color does.
        assert_eq!(
            repaints.observe(2, &changed),
            Some((1, "#123abc".to_string()))
        );
        assert_eq!(repaints.observe(2, &changed), None);
    }

    #[test]
    fn repaint_ignores_unchanged_snapshots() {
        let mut repaints = RepaintTracker::default();
        let slots = vec![slot("#ff0000")];
        assert_eq!(repaints.observe(1, &slots), None);
        assert_eq!(repaints.observe(2, &slots), None);
    }

    #[test]
    fn balance_usd_works_without_grid_data() {
        // 10 pixels at 0.001 ETH each and 3000 USD/ETH. Only the miner poll
        // needs to have data for the report.
        let balance = Interpolator::new(10u64.eth(), U256::ZERO, 1);
        let miner = MinerState {
            pixel_price: 0.001f64.eth(),
            ..Default::default()
        };
        let usd = balance_usd(Some(&balance), Some(&miner), 3000.0).unwrap();
        assert!((usd - 30.0).abs() < 1e-9);
    }

    #[test]
    fn balance_usd_needs_both_inputs() {
        let balance = Interpolator::new(10u64.eth(), U256::ZERO, 1);
        assert_eq!(balance_usd(Some(&balance), None, 3000.0), None);
        assert_eq!(balance_usd(None, Some(&MinerState::default()), 3000.0), None);
    }
}
