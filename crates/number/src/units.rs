use alloy::primitives::{
    U256,
    utils::{ParseUnits, Unit, parse_units},
};

/// Conveniences for writing 18-decimal fixed point amounts in tests and
/// display math.
pub trait EthUnit: Sized {
    /// The amount as wei.
    fn wei(self) -> U256;

    /// The amount as ETH (1e18 wei).
    fn eth(self) -> U256 {
        self.wei() * Unit::ETHER.wei()
    }
}

impl EthUnit for u64 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}

impl EthUnit for f64 {
    fn wei(self) -> U256 {
        match parse_units(&self.to_string(), "wei").unwrap() {
            ParseUnits::U256(value) => value,
            _ => panic!("could not parse number as u256: {self}"),
        }
    }

    fn eth(self) -> U256 {
        match parse_units(&self.to_string(), "ether").unwrap() {
            ParseUnits::U256(value) => value,
            _ => panic!("could not parse number as u256: {self}"),
        }
    }
}
