//! Extension trait for U256 arithmetic and display conversions.

use alloy::primitives::U256;

/// Extension trait for U256 to add utility methods.
pub trait U256Ext: Sized {
    /// Lossy conversion to `f64`, scaled down by `decimals` decimal places.
    ///
    /// Used for display math only (USD values, rate labels). Amounts on the
    /// wire stay in fixed point; the contract never sees the result of this.
    fn to_f64_units(&self, decimals: u8) -> f64;

    /// `self * numer / denom` with the multiplication carried out first to
    /// keep precision, saturating instead of overflowing.
    fn mul_div(&self, numer: u64, denom: u64) -> Self;
}

impl U256Ext for U256 {
    fn to_f64_units(&self, decimals: u8) -> f64 {
        // Precise enough for display purposes; U256 decimal strings always
        // parse as (possibly infinite) f64.
        let value: f64 = self.to_string().parse().unwrap_or(f64::INFINITY);
        value / 10f64.powi(i32::from(decimals))
    }

    fn mul_div(&self, numer: u64, denom: u64) -> Self {
        assert!(denom != 0, "division by zero");
        self.saturating_mul(U256::from(numer)) / U256::from(denom)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::units::EthUnit};

    #[test]
    fn converts_fixed_point_to_f64() {
        assert_eq!(U256::ZERO.to_f64_units(18), 0.0);
        assert_eq!(2u64.eth().to_f64_units(18), 2.0);
        assert_eq!(U256::from(1_500_000u64).to_f64_units(6), 1.5);
    }

    #[test]
    fn mul_div_keeps_precision() {
        // 5% markup on an amount that is not divisible by 100.
        let amount = U256::from(101u64);
        assert_eq!(amount.mul_div(105, 100), U256::from(106u64));
    }

    #[test]
    fn mul_div_saturates() {
        assert_eq!(U256::MAX.mul_div(2, 1), U256::MAX / U256::from(1u64));
    }
}
