use {alloy::primitives::Address, clap::Parser, std::time::Duration, url::Url};

#[derive(Parser)]
pub struct Arguments {
    /// The RPC node to read game state from and submit transactions through.
    #[clap(long, env, default_value = "https://mainnet.base.org")]
    pub node_url: Url,

    /// Overrides the game contract address autodetected from the chain id.
    #[clap(long, env)]
    pub multicall_address: Option<Address>,

    /// The account to track and submit from. Read-only mode when omitted.
    #[clap(long, env)]
    pub account: Option<Address>,

    /// How often to refresh the tracked account's mining state.
    #[clap(long, env, default_value = "10s", value_parser = humantime::parse_duration)]
    pub miner_poll_interval: Duration,

    /// How often to refresh the full slot grid.
    #[clap(long, env, default_value = "8s", value_parser = humantime::parse_duration)]
    pub slots_poll_interval: Duration,

    /// How often to refresh the pot auction state.
    #[clap(long, env, default_value = "12s", value_parser = humantime::parse_duration)]
    pub auction_poll_interval: Duration,

    /// How often to refresh the cached ETH/USD price.
    #[clap(long, env, default_value = "60s", value_parser = humantime::parse_duration)]
    pub eth_price_refresh_interval: Duration,

    /// Slot to present while the account owns none.
    #[clap(long, env, default_value = "0")]
    pub selected_slot: u64,

    /// Claims this slot once the first snapshots are in.
    #[clap(long, env)]
    pub mine_slot: Option<u64>,

    /// Color to paint the slot claimed via --mine-slot with.
    #[clap(long, env, default_value = "#ffffff")]
    pub mine_color: String,

    /// Buys the accumulated pot once the first snapshots are in.
    #[clap(long, env)]
    pub buy_pot: bool,

    /// Base URL of the optional profile lookup service.
    #[clap(long, env)]
    pub profile_api: Option<Url>,

    #[clap(
        long,
        env,
        default_value = "warn,app=debug,chain_state=debug,sequencer=debug,prices=debug"
    )]
    pub log_filter: String,
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "node_url: {}", self.node_url)?;
        writeln!(f, "multicall_address: {:?}", self.multicall_address)?;
        writeln!(f, "account: {:?}", self.account)?;
        writeln!(f, "miner_poll_interval: {:?}", self.miner_poll_interval)?;
        writeln!(f, "slots_poll_interval: {:?}", self.slots_poll_interval)?;
        writeln!(f, "auction_poll_interval: {:?}", self.auction_poll_interval)?;
        writeln!(
            f,
            "eth_price_refresh_interval: {:?}",
            self.eth_price_refresh_interval
        )?;
        writeln!(f, "selected_slot: {}", self.selected_slot)?;
        writeln!(f, "mine_slot: {:?}", self.mine_slot)?;
        writeln!(f, "mine_color: {}", self.mine_color)?;
        writeln!(f, "buy_pot: {}", self.buy_pot)?;
        writeln!(f, "profile_api: {:?}", self.profile_api)?;
        writeln!(f, "log_filter: {}", self.log_filter)?;
        Ok(())
    }
}
