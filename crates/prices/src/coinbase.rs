//! ETH/USD spot price from the public Coinbase API.

use {
    crate::EthPriceEstimating,
    anyhow::{Context, Result},
    async_trait::async_trait,
    serde::Deserialize,
    url::Url,
};

pub struct CoinbaseEthPrice {
    client: reqwest::Client,
    url: Url,
}

impl CoinbaseEthPrice {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            // Only fails on a malformed literal.
            url: Url::parse("https://api.coinbase.com/v2/prices/ETH-USD/spot").unwrap(),
        }
    }
}

#[async_trait]
impl EthPriceEstimating for CoinbaseEthPrice {
    async fn eth_usd(&self) -> Result<f64> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .context("failed to send price request")?
            .error_for_status()
            .context("price request failed")?
            .json::<Response>()
            .await
            .context("failed to decode price response")?;
        response
            .data
            .amount
            .parse()
            .context("price is not a number")
    }
}

#[derive(Deserialize)]
struct Response {
    data: Data,
}

#[derive(Deserialize)]
struct Data {
    amount: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_spot_price_response() {
        let response: Response = serde_json::from_str(
            r#"{"data":{"amount":"3123.45","base":"ETH","currency":"USD"}}"#,
        )
        .unwrap();
        assert_eq!(response.data.amount.parse::<f64>().unwrap(), 3123.45);
    }
}
