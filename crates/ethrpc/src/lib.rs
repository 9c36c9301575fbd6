//! Thin provider construction layer. Every crate that talks to the chain
//! clones one [`AlloyProvider`] built here instead of owning its own
//! connection setup.

use {
    alloy::{
        providers::{Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
    },
    url::Url,
};

pub type AlloyProvider = alloy::providers::DynProvider;

/// Creates a provider talking JSON-RPC over HTTP to the given node.
///
/// The provider is cheap to clone; create it once and share it.
pub fn provider(url: &Url) -> AlloyProvider {
    let rpc = ClientBuilder::default().http(url.clone());
    ProviderBuilder::new().connect_client(rpc).erased()
}
