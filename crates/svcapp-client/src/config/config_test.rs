use std::path::PathBuf;
use std::time::Duration;

use tempfile::tempdir;

use crate::config::ClientConfig;

#[test]
fn test_file_overrides_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("svcapp.toml");
    std::fs::write(&path, "unit_dir = \"/run/units\"\npoll_interval_ms = 10\n").unwrap();

    let config = ClientConfig::load(Some(&path)).unwrap();
    assert_eq!(PathBuf::from("/run/units"), config.unit_dir);
    assert_eq!(Duration::from_millis(10), config.poll_interval());
    assert_eq!(Duration::from_secs(20), config.default_stop_timeout());
}

#[test]
fn test_invalid_file_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("svcapp.toml");
    std::fs::write(&path, "poll_interval_ms = \"soon\"\n").unwrap();

    let err = ClientConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("svcapp.toml"), "{err}");
}

#[test]
fn test_template_lists_settings() {
    let template = ClientConfig::template();
    assert!(template.contains("unit_dir"));
    assert!(template.contains("poll_interval_ms"));
    assert!(template.contains("default_stop_timeout_ms"));
}
