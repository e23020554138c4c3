use cardlink_core::{LinkError, LinkGenerator, PlatformRegistry, PlatformSpec};

#[test]
fn generate_substitutes_handle_into_platform_template() {
    let generator = LinkGenerator::default();
    assert_eq!(
        generator.generate("Instagram", "alice").unwrap(),
        "https://instagram.com/alice"
    );
    assert_eq!(
        generator.generate("YouTube", "alice").unwrap(),
        "https://youtube.com/@alice"
    );
}

#[test]
fn generate_is_deterministic_and_trims_handle() {
    let generator = LinkGenerator::default();
    let first = generator.generate("GitHub", "  alice ").unwrap();
    let second = generator.generate("github", "alice").unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "https://github.com/alice");
}

#[test]
fn generate_percent_encodes_handle_segment() {
    let generator = LinkGenerator::default();
    assert_eq!(
        generator.generate("Twitter", "a b/c").unwrap(),
        "https://twitter.com/a%20b%2Fc"
    );
}

#[test]
fn generate_rejects_unknown_platform_and_blank_handle() {
    let generator = LinkGenerator::default();
    assert_eq!(
        generator.generate("Bogus", "alice").unwrap_err(),
        LinkError::UnknownPlatform("Bogus".to_string())
    );
    assert_eq!(
        generator.generate("Instagram", "   ").unwrap_err(),
        LinkError::EmptyHandle
    );
}

#[test]
fn auto_sync_eligibility_reads_registry_and_fails_closed() {
    let generator = LinkGenerator::default();
    assert!(generator.is_auto_sync_eligible("Instagram"));
    assert!(!generator.is_auto_sync_eligible("LinkedIn"));
    assert!(!generator.is_auto_sync_eligible("Bogus"));
}

#[test]
fn injected_registry_replaces_builtin_table() {
    let registry = PlatformRegistry::new(vec![PlatformSpec::new(
        "Mastodon",
        "https://mastodon.social/@{handle}",
        true,
        "user",
    )])
    .unwrap();
    let generator = LinkGenerator::new(registry);

    assert_eq!(
        generator.generate("Mastodon", "alice").unwrap(),
        "https://mastodon.social/@alice"
    );
    assert!(matches!(
        generator.generate("Instagram", "alice"),
        Err(LinkError::UnknownPlatform(_))
    ));
}
