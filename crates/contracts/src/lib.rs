//! Bindings for the on-chain side of the pixel mining game.
//!
//! The game exposes a single aggregating "multicall" contract for both reads
//! (miner/slot/auction state tuples) and writes (`mine`, `buy`). Payment for
//! the secondary auction goes through a plain ERC-20 approval, so a minimal
//! `IERC20` interface is included as well.

use {
    alloy::{
        primitives::{Address, address},
        providers::{DynProvider, Provider},
        sol,
    },
    anyhow::{Context, Result},
    std::{collections::HashMap, sync::LazyLock},
};

pub mod networks {
    pub const BASE: u64 = 8453;
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface GridMulticall {
        struct MinerState {
            uint256 pps;
            uint256 pixelPrice;
            uint256 pixelBalance;
            uint256 ethBalance;
            uint256 wethBalance;
        }

        struct SlotState {
            uint256 epochId;
            uint256 initPrice;
            uint256 startTime;
            uint256 price;
            uint256 pps;
            uint256 multiplier;
            uint256 multiplierTime;
            uint256 mined;
            address miner;
            string color;
        }

        struct AuctionState {
            uint16 epochId;
            uint192 initPrice;
            uint40 startTime;
            address paymentToken;
            uint256 price;
            uint256 paymentTokenPrice;
            uint256 wethAccumulated;
            uint256 wethBalance;
            uint256 paymentTokenBalance;
        }

        function mine(
            address provider,
            uint256 index,
            uint256 epochId,
            uint256 deadline,
            uint256 maxPrice,
            string memory color
        ) external payable;

        function buy(
            uint256 epochId,
            uint256 deadline,
            uint256 maxPaymentTokenAmount
        ) external;

        function getMiner(address account) external view returns (MinerState memory state);

        function getSlot(uint256 index) external view returns (SlotState memory state);

        function getSlots(uint256 startIndex, uint256 endIndex)
            external
            view
            returns (SlotState[] memory states);

        function getEntropyFee() external view returns (uint256);

        function getAuction(address account) external view returns (AuctionState memory state);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);

        function balanceOf(address owner) external view returns (uint256);
    }
}

pub type Instance = GridMulticall::GridMulticallInstance<DynProvider>;

/// Addresses of one deployment of the game.
#[derive(Clone, Copy, Debug)]
pub struct Deployment {
    /// The aggregating read/write contract everything goes through.
    pub multicall: Address,
    /// The mined ERC-20 token.
    pub pixel: Address,
    /// Token the secondary auction is paid in (an LP token on Base).
    pub payment_token: Address,
    /// Wrapped native token of the chain.
    pub weth: Address,
    /// Provider address that must be passed along with every `mine` call.
    pub mining_provider: Address,
}

pub static DEPLOYMENTS: LazyLock<HashMap<u64, Deployment>> = LazyLock::new(|| {
    maplit::hashmap! {
        networks::BASE => Deployment {
            multicall: address!("0xF51A1059F155930305e9DddA4120B9f46BafB92E"),
            pixel: address!("0xA5db7214F7cc61c8b01AE05bD0042F50BEb46647"),
            payment_token: address!("0xD1DbB2E56533C55C3A637D13C53aeEf65c5D5703"),
            weth: address!("0x4200000000000000000000000000000000000006"),
            mining_provider: address!("0xba366c82815983ff130c23ced78bd95e1f2c18ea"),
        },
    }
});

/// Returns the deployment for the chain the provider is connected to.
pub async fn deployment(provider: &DynProvider) -> Result<Deployment> {
    let chain_id = provider
        .get_chain_id()
        .await
        .context("could not fetch current chain id")?;
    DEPLOYMENTS
        .get(&chain_id)
        .copied()
        .with_context(|| format!("no deployment info for chain {chain_id:?}"))
}
