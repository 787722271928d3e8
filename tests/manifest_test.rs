//! Deployment manifest deserialization and validation tests.

use ratewire::RatewireError;
use ratewire::manifest::DeploymentManifest;

const MANIFEST_JSON: &str = include_str!("fixtures/manifest.json");

fn fixture() -> DeploymentManifest {
    serde_json::from_str(MANIFEST_JSON).expect("failed to deserialize manifest fixture")
}

#[test]
fn manifest_deserializes() {
    let manifest = fixture();

    assert_eq!(
        manifest.balancer_vault,
        "0xBA12222222228d8Ba445958a75a0704d566BF2C8"
    );
    assert_eq!(manifest.tranches.len(), 2);
    assert_eq!(
        manifest.tokens["dai"],
        "0x6B175474E89094C44Da98b954EedeAC495271d0F"
    );

    let dai = &manifest.tranches["dai"];
    assert_eq!(dai.len(), 2);
    assert_eq!(dai[0].address, "0x449D7C2e096E9f867339078535b15440d42F78E8");
    assert_eq!(dai[0].expiration, 1758222640);
    assert_eq!(
        dai[0].pt_pool.pool_id,
        "0xedf085f65b4f6c155e13155502ef925c9a7560030002000000000000000000c8"
    );
}

#[test]
fn tranche_order_within_a_term_is_preserved() {
    let manifest = fixture();

    let dai = &manifest.tranches["dai"];
    assert!(dai[0].expiration < dai[1].expiration);
}

#[test]
fn valid_manifest_passes_validation() {
    fixture().validate().expect("fixture should validate");
}

#[test]
fn unknown_term_key_fails_validation() {
    let mut manifest = fixture();
    let tranches = manifest.tranches["dai"].clone();
    manifest.tranches.insert("shib".to_string(), tranches);
    manifest
        .tokens
        .insert("shib".to_string(), "0x0000000000000000000000000000000000000001".to_string());

    let err = manifest.validate().unwrap_err();
    assert!(
        matches!(err, RatewireError::UnknownTerm(ref key) if key == "shib"),
        "got {err}"
    );
}

#[test]
fn missing_base_asset_token_fails_validation() {
    let mut manifest = fixture();
    manifest.tokens.remove("usdc");

    let err = manifest.validate().unwrap_err();
    assert!(matches!(err, RatewireError::Config(_)), "got {err}");
    assert!(err.to_string().contains("usdc"), "got {err}");
}
