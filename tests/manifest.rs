//! Build profile checks

/// Release builds must unwind so a panic still restores automatic fan control
#[test]
fn test_release_profile_unwinds() {
    let manifest: toml::Value = toml::from_str(include_str!("../Cargo.toml")).unwrap();
    let panic = manifest
        .get("profile")
        .and_then(|p| p.get("release"))
        .and_then(|r| r.get("panic"))
        .and_then(|v| v.as_str());
    assert_ne!(panic, Some("abort"));
}
