//! Unit tests for `AppError` display formats and conversions.

use probe_console::AppError;

#[test]
fn display_carries_lowercase_prefix_per_variant() {
    let cases: Vec<(AppError, &str)> = vec![
        (AppError::Config("bad toml".into()), "config: bad toml"),
        (AppError::Db("locked".into()), "db: locked"),
        (AppError::NoSuchProcess(42), "no such process: 42"),
        (AppError::Serialize("bad body".into()), "serialize: bad body"),
        (AppError::Spawn("enoent".into()), "spawn: enoent"),
        (AppError::Io("denied".into()), "io: denied"),
    ];

    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn display_has_no_trailing_period() {
    let err = AppError::Spawn("launch failed".into());
    let s = err.to_string();
    assert!(
        !s.ends_with('.'),
        "error message must not end with a period: {s}"
    );
}

#[test]
fn sqlx_errors_map_to_db() {
    let err = AppError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, AppError::Db(_)), "got {err:?}");
}

#[test]
fn serde_json_errors_map_to_serialize() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err = AppError::from(json_err);
    assert!(matches!(err, AppError::Serialize(_)), "got {err:?}");
}

#[test]
fn io_errors_map_to_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = AppError::from(io_err);
    assert!(matches!(err, AppError::Io(_)), "got {err:?}");
}

#[test]
fn toml_errors_map_to_config() {
    let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
    let err = AppError::from(toml_err);
    assert!(matches!(err, AppError::Config(_)), "got {err:?}");
    assert!(err.to_string().starts_with("config:"));
}

#[test]
fn implements_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(AppError::NoSuchProcess(7));
    assert_eq!(err.to_string(), "no such process: 7");
}
