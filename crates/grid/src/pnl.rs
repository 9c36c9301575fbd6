//! Display-only profit and loss math, mirroring the on-chain formulas.

use {
    alloy::primitives::{I256, U256},
    number::U256Ext,
};

/// Mark-to-market for a held slot in ETH terms: 80% of the current resale
/// price minus the half of the entry price that was burned on purchase.
pub fn slot_pnl(price: U256, init_price: U256) -> I256 {
    let resale = price.mul_div(80, 100);
    let entry = init_price / U256::from(2u64);
    signed(resale) - signed(entry)
}

/// USD value of a pixel amount, going through the pixel/ETH price and the
/// cached ETH/USD price.
pub fn pixels_to_usd(amount: U256, pixel_price: U256, eth_usd: f64) -> f64 {
    amount.to_f64_units(18) * pixel_price.to_f64_units(18) * eth_usd
}

/// USD value of a signed ETH amount.
pub fn eth_to_usd(amount: I256, eth_usd: f64) -> f64 {
    let unsigned = amount.unsigned_abs().to_f64_units(18) * eth_usd;
    if amount.is_negative() { -unsigned } else { unsigned }
}

fn signed(value: U256) -> I256 {
    I256::try_from(value).unwrap_or(I256::MAX)
}

#[cfg(test)]
mod tests {
    use {super::*, number::EthUnit};

    #[test]
    fn profitable_slot() {
        // Bought at 1 ETH, price has doubled: 2 * 0.8 - 0.5 = 1.1 ETH.
        let pnl = slot_pnl(2u64.eth(), 1u64.eth());
        assert_eq!(pnl, I256::try_from(1.1f64.eth()).unwrap());
    }

    #[test]
    fn losing_slot() {
        // Price decayed to a tenth: 0.1 * 0.8 - 0.5 = -0.42 ETH.
        let pnl = slot_pnl(0.1f64.eth(), 1u64.eth());
        assert_eq!(pnl, -I256::try_from(0.42f64.eth()).unwrap());
    }

    #[test]
    fn usd_conversions() {
        let usd = pixels_to_usd(10u64.eth(), 0.001f64.eth(), 3000.0);
        assert!((usd - 30.0).abs() < 1e-9);

        assert_eq!(eth_to_usd(I256::try_from(2u64.eth()).unwrap(), 1000.0), 2000.0);
        assert_eq!(eth_to_usd(-I256::try_from(2u64.eth()).unwrap(), 1000.0), -2000.0);
    }
}
