//! Fetching the model asset from a content-addressed gateway.
//!
//! The asset is identified by content, not location; the gateway resolves the
//! identifier to bytes over plain HTTPS.

use anyhow::bail;

/// Content identifier of the demo model.
pub const MODEL_CID: &str = "QmT4oGT1W769GizCXxfe1EX5jf2TVYrbobBmx4fkqfnarq";

/// Public gateway resolving content identifiers.
pub const IPFS_GATEWAY: &str = "https://ipfs.io";

/// Resolve a content identifier against the gateway URL template.
pub fn gateway_url(cid: &str) -> String {
    format!("{IPFS_GATEWAY}/ipfs/{cid}")
}

/// Fetch a binary payload, treating any non-success status as an error.
pub async fn fetch_binary(url: &str) -> anyhow::Result<Vec<u8>> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        bail!("gateway returned {status} for {url}");
    }
    Ok(response.bytes().await?.to_vec())
}
