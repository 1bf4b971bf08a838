use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ShadowError::layout("x")
            .to_string()
            .contains("layout anomaly:")
    );
    assert!(ShadowError::mount("x").to_string().contains("mount failure:"));
    assert!(
        ShadowError::actor("x")
            .to_string()
            .contains("actor unavailable:")
    );
    assert!(
        ShadowError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(ShadowError::LookupMiss(Tag(3)).to_string(), "unknown tag #3");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ShadowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn lookup_miss_is_classified() {
    assert!(ShadowError::LookupMiss(Tag(1)).is_lookup_miss());
    assert!(!ShadowError::layout("nan").is_lookup_miss());
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "invariant violation: broken")]
fn invariant_is_fatal_in_debug_builds() {
    let _ = invariant("broken");
}

#[test]
fn absorb_swallows_every_error_kind() {
    absorb("test", Ok(()));
    absorb("test", Err(ShadowError::LookupMiss(Tag(9))));
    absorb("test", Err(ShadowError::layout("nan")));
    absorb("test", Err(ShadowError::mount("panicked")));
}
