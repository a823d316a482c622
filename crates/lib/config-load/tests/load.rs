//! Tests for config loading.

use config_core::*;
use config_load::{Format, LoadError, load};

#[tokio::test]
async fn loads_toml_fixture() {
    let loaded = load(&["tests/fixtures/sample.toml"]).await.unwrap();
    let config = loaded.config;

    assert_eq!(config.check_interval_seconds, 30);
    assert_eq!(config.imap.server, "imap.example.com");
    assert_eq!(config.imap.effective_port(), 993);
    assert_eq!(config.imap.password.as_str(), "secret");
    assert!(config.imap.use_ssl);

    assert_eq!(config.monitor.len(), 2);
    let inbox = &config.monitor[0];
    assert_eq!(inbox.mailbox, "INBOX");
    assert_eq!(config.effective_interval_secs(inbox), 30);
    assert_eq!(
        inbox.triggers[0],
        TriggerConfig {
            regex_pattern: Some("urgent.*alert".to_owned()),
            command: "echo alert".to_owned(),
            ..Default::default()
        }
    );
    assert_eq!(inbox.triggers[1].from.as_deref(), Some("boss@example\\.com"));
    assert_eq!(inbox.triggers[1].ignore_case, Some(false));
    assert!(inbox.triggers[1].is_final);

    let alerts = &config.monitor[1];
    assert_eq!(config.effective_interval_secs(alerts), 5);
    assert_eq!(alerts.triggers[0].to.as_deref(), Some("ops@"));
}

#[tokio::test]
async fn loads_yaml_fixture_with_defaults() {
    let loaded = load(&["tests/fixtures/sample.yaml"]).await.unwrap();
    let config = loaded.config;

    assert_eq!(config.check_interval_seconds, DEFAULT_CHECK_INTERVAL_SECS);
    assert!(!config.imap.use_ssl);
    assert_eq!(config.imap.effective_port(), 143);
    assert_eq!(
        config.monitor[0].triggers[0].subject.as_deref(),
        Some("power (on|off)")
    );
    assert_eq!(config.monitor[0].triggers[0].ignore_case, None);
}

#[tokio::test]
async fn skips_missing_paths() {
    let loaded = load(&["tests/fixtures/nonexistent.toml", "tests/fixtures/sample.yaml"])
        .await
        .unwrap();
    assert_eq!(
        loaded.path,
        std::path::PathBuf::from("tests/fixtures/sample.yaml")
    );
}

#[tokio::test]
async fn reports_not_found() {
    let err = load(&["tests/fixtures/nonexistent1.toml", "tests/fixtures/nonexistent2.yaml"])
        .await
        .unwrap_err();
    match err {
        LoadError::NotFound { paths } => assert_eq!(paths.len(), 2),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn reports_parse_errors() {
    assert!(Format::Toml.parse("imap = 3").is_err());
    assert!(Format::Yaml.parse("imap: [").is_err());
}

#[test]
fn picks_format_by_extension() {
    use std::path::Path;

    assert_eq!(Format::from_path(Path::new("a/config.yml")), Format::Yaml);
    assert_eq!(Format::from_path(Path::new("a/config.YAML")), Format::Yaml);
    assert_eq!(Format::from_path(Path::new("a/config.toml")), Format::Toml);
    assert_eq!(Format::from_path(Path::new("a/config")), Format::Toml);
}
