use xrview::resources::fetch::{IPFS_GATEWAY, MODEL_CID, fetch_binary, gateway_url};

#[test]
fn gateway_url_substitutes_the_content_identifier() {
    assert_eq!(
        gateway_url(MODEL_CID),
        "https://ipfs.io/ipfs/QmT4oGT1W769GizCXxfe1EX5jf2TVYrbobBmx4fkqfnarq"
    );
    assert_eq!(gateway_url("abc"), format!("{IPFS_GATEWAY}/ipfs/abc"));
}

#[test]
fn model_cid_is_a_v0_content_identifier() {
    assert!(MODEL_CID.starts_with("Qm"));
    assert_eq!(MODEL_CID.len(), 46);
}

#[tokio::test]
async fn transport_failures_surface_as_errors() {
    // Port 1 is unassigned; the connection is refused immediately.
    let result = fetch_binary("http://127.0.0.1:1/ipfs/whatever").await;
    assert!(result.is_err());
}
