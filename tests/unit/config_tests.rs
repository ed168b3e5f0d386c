use std::time::Duration;

use probe_console::{config::GlobalConfig, AppError};

fn sample_toml(plugin_dir: &str) -> String {
    format!(
        r"
db_path = '/tmp/probe-console/events.db'
plugin_dir = '{plugin_dir}'
exit_poll_ms = 750
"
    )
}

fn minimal_toml(plugin_dir: &str) -> String {
    format!(
        r"
db_path = '/tmp/probe-console/events.db'
plugin_dir = '{plugin_dir}'
"
    )
}

#[test]
fn parses_full_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config =
        GlobalConfig::from_toml_str(&sample_toml(&dir.path().display().to_string()))
            .expect("valid config");

    assert_eq!(config.db_path.to_string_lossy(), "/tmp/probe-console/events.db");
    assert_eq!(config.exit_poll_ms, 750);
    assert_eq!(config.exit_poll(), Duration::from_millis(750));
}

#[test]
fn exit_poll_defaults_when_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config =
        GlobalConfig::from_toml_str(&minimal_toml(&dir.path().display().to_string()))
            .expect("valid config");

    assert_eq!(config.exit_poll_ms, 250);
}

#[test]
fn plugin_dir_is_canonicalized() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config =
        GlobalConfig::from_toml_str(&minimal_toml(&dir.path().display().to_string()))
            .expect("valid config");

    let expected = dir.path().canonicalize().expect("canonicalize tempdir");
    assert_eq!(config.plugin_dir(), expected.as_path());
    assert!(config.plugin_dir().is_absolute());
}

#[test]
fn zero_exit_poll_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toml = format!(
        r"
db_path = '/tmp/probe-console/events.db'
plugin_dir = '{dir}'
exit_poll_ms = 0
",
        dir = dir.path().display(),
    );

    let err = GlobalConfig::from_toml_str(&toml).expect_err("zero poll must fail");
    assert!(matches!(err, AppError::Config(_)), "got {err:?}");
    assert!(err.to_string().contains("exit_poll_ms"));
}

#[test]
fn empty_db_path_is_rejected() {
    let toml = r"
db_path = ''
plugin_dir = '/definitely/missing'
";

    let err = GlobalConfig::from_toml_str(toml).expect_err("empty db_path must fail");
    assert!(err.to_string().contains("db_path"));
}

#[test]
fn missing_plugin_dir_is_rejected() {
    let toml = r"
db_path = '/tmp/probe-console/events.db'
plugin_dir = '/definitely/missing/plugin-dir'
";

    let err = GlobalConfig::from_toml_str(toml).expect_err("missing plugin_dir must fail");
    assert!(matches!(err, AppError::Config(_)), "got {err:?}");
    assert!(err.to_string().contains("plugin_dir"));
}

#[test]
fn missing_required_field_is_rejected() {
    let err = GlobalConfig::from_toml_str("plugin_dir = '/tmp'").expect_err("db_path required");
    assert!(matches!(err, AppError::Config(_)), "got {err:?}");
}

#[test]
fn load_from_path_reads_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("probe-console.toml");
    std::fs::write(
        &config_path,
        sample_toml(&dir.path().display().to_string()),
    )
    .expect("write config");

    let config = GlobalConfig::load_from_path(&config_path).expect("load config");
    assert_eq!(config.exit_poll_ms, 750);
}

#[test]
fn load_from_missing_path_fails_loudly() {
    let err = GlobalConfig::load_from_path("/definitely/missing/probe-console.toml")
        .expect_err("missing file must fail");
    assert!(matches!(err, AppError::Config(_)), "got {err:?}");
    assert!(err.to_string().starts_with("config:"));
}
