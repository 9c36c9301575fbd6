//! Optional lookup of a display profile for an address.

use {
    alloy::primitives::Address,
    anyhow::{Context, Result},
    serde::Deserialize,
    url::Url,
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
}

#[derive(Deserialize)]
struct Response {
    user: Option<Profile>,
}

pub struct ProfileClient {
    client: reqwest::Client,
    base: Url,
}

impl ProfileClient {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Returns `None` both when the service knows no profile for the address
    /// and when the lookup fails outright. Profiles are cosmetic; nothing
    /// downstream should depend on one existing.
    pub async fn lookup(&self, address: Address) -> Option<Profile> {
        match self.fetch(address).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::debug!(?err, "profile lookup failed");
                None
            }
        }
    }

    async fn fetch(&self, address: Address) -> Result<Option<Profile>> {
        let mut url = self
            .base
            .join("api/neynar/user")
            .context("invalid profile api base url")?;
        url.query_pairs_mut()
            .append_pair("address", &format!("{address:#x}"));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("failed to send profile request")?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let response = response
            .json::<Response>()
            .await
            .context("failed to decode profile response")?;
        Ok(response.user)
    }
}

/// Deterministic placeholder avatar for addresses without a profile.
pub fn placeholder_avatar(address: Address) -> String {
    format!("https://api.dicebear.com/7.x/shapes/svg?seed={address:#x}")
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    #[test]
    fn decodes_profile_response() {
        let response: Response = serde_json::from_str(
            r#"{"user":{"username":"pixel-miner","displayName":"Pixel Miner","pfpUrl":"https://example.com/pfp.png"}}"#,
        )
        .unwrap();
        assert_eq!(
            response.user,
            Some(Profile {
                username: "pixel-miner".to_string(),
                display_name: Some("Pixel Miner".to_string()),
                pfp_url: Some("https://example.com/pfp.png".to_string()),
            })
        );
    }

    #[test]
    fn decodes_missing_profile() {
        let response: Response = serde_json::from_str(r#"{"user":null}"#).unwrap();
        assert_eq!(response.user, None);
    }

    #[test]
    fn placeholder_seed_is_lowercase_hex() {
        let avatar = placeholder_avatar(address!("0xBA366c82815983Ff130C23ceD78bd95e1F2c18EA"));
        assert_eq!(
            avatar,
            "https://api.dicebear.com/7.x/shapes/svg?seed=0xba366c82815983ff130c23ced78bd95e1f2c18ea"
        );
    }
}
