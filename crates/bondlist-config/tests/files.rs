//! Loading configuration and list files from disk.

use std::io::Write;
use std::path::PathBuf;

use bondlist_config::{Blacklist, ConfigError, EmitentComments, ScanConfig, Validate};
use bondlist_core::types::BondType;
use tempfile::{NamedTempFile, TempDir};

fn file_with(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn scan_config_from_file() {
    let dir = TempDir::new().unwrap();
    let blacklist = dir.path().join("emitent.blacklist");
    std::fs::write(&blacklist, "Лютик\n").unwrap();

    let file = file_with(&format!(
        r#"
bond_types = ["gov", "corp"]
commission_percent = 0.05
statistics_days = 2

[lists]
emitent_blacklist = "{}"

[enrichment]
detail_pages = true
workers = 4

[http]
timeout_secs = 10
"#,
        blacklist.display()
    ));

    let config = ScanConfig::from_file(file.path()).unwrap();
    assert!(config.is_valid());
    assert_eq!(config.bond_types, vec![BondType::Government, BondType::Corporate]);
    assert_eq!(config.commission_percent, 0.05);
    assert_eq!(config.statistics_days, 2);
    assert_eq!(config.enrichment.workers, 4);
    assert_eq!(config.http.timeout_secs, 10);
    assert_eq!(config.lists.securities_blacklist, None);

    let list = Blacklist::load(config.lists.emitent_blacklist.as_deref()).unwrap();
    assert_eq!(list.matches("ООО Лютик"), Some("Лютик"));
}

#[test]
fn missing_config_file_is_io_error() {
    let err = ScanConfig::from_file("/nonexistent/bondlist.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { ref path, .. } if path == &PathBuf::from("/nonexistent/bondlist.toml")));
}

#[test]
fn invalid_toml_names_the_file() {
    let file = file_with("commission_percent = \"a lot\"");
    match ScanConfig::from_file(file.path()).unwrap_err() {
        ConfigError::Parse { origin, .. } => assert_eq!(origin, file.path().display().to_string()),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn comments_file_error_names_path_and_line() {
    let file = file_with("ПАО Ромашка -> ок\nПАО Лютик\n");
    let err = EmitentComments::from_file(file.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains(&format!("{}:2", file.path().display())), "{message}");
}

#[test]
fn missing_list_file_is_error() {
    assert!(matches!(
        Blacklist::from_file("/nonexistent/securities.blacklist"),
        Err(ConfigError::Io { .. })
    ));
}
