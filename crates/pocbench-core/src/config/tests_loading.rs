use std::io::Write;

use serial_test::serial;
use tempfile::TempDir;

use super::*;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("pocbench.toml");
    let mut file = std::fs::File::create(&path).expect("create config");
    file.write_all(body.as_bytes()).expect("write config");
    path
}

fn clear_env() {
    for key in [
        "POCBENCH_BIND",
        "POCBENCH_DB_READ_CUSTOMER_ID",
        "POCBENCH_DATABASE_BACKEND",
        "POCBENCH_DATABASE_URL",
        "POCBENCH_DATABASE_LOCK_TIMEOUT_MS",
        "POCBENCH_DATABASE_MAX_CONNECTIONS",
        "POCBENCH_LOG_FILTER",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_explicit_file_overrides_only_named_keys() {
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
[database]
backend = "memory"
lock_timeout_ms = 250
"#,
    );

    let config = load_config(Some(path.as_path())).expect("load");
    assert_eq!(config.database.backend, StoreBackend::Memory);
    assert_eq!(config.database.lock_timeout_ms, 250);
    assert_eq!(config.database.max_connections, 20);
    assert_eq!(config.server.bind, "0.0.0.0:8080");
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    let result = load_config(Some(dir.path().join("nope.toml").as_path()));
    assert!(matches!(
        result,
        Err(crate::Error::Validation(crate::ValidationError::InvalidConfig(_)))
    ));
}

#[test]
#[serial]
fn test_malformed_toml_is_parse_error() {
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "[database\nbackend = ");
    let result = load_config(Some(path.as_path()));
    assert!(matches!(
        result,
        Err(crate::Error::Validation(crate::ValidationError::ParseError(_)))
    ));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "[database]\nlock_timeout_ms = 250\n");

    std::env::set_var("POCBENCH_DATABASE_LOCK_TIMEOUT_MS", "900");
    std::env::set_var("POCBENCH_DATABASE_BACKEND", "memory");
    let result = load_config(Some(path.as_path()));
    clear_env();

    let config = result.expect("load");
    assert_eq!(config.database.lock_timeout_ms, 900);
    assert_eq!(config.database.backend, StoreBackend::Memory);
}

#[test]
#[serial]
fn test_unparsable_env_value_is_rejected() {
    clear_env();
    std::env::set_var("POCBENCH_DATABASE_MAX_CONNECTIONS", "lots");
    let result = Config::default().apply_env_vars();
    clear_env();

    let err = result.expect_err("should reject");
    assert!(err.to_string().contains("POCBENCH_DATABASE_MAX_CONNECTIONS"));
}

#[test]
fn test_directory_is_not_a_config_file() {
    let dir = TempDir::new().expect("tempdir");
    assert!(load_toml_file(dir.path()).is_err());
}

#[test]
fn test_merge_tables_is_deep() {
    let base: toml::Table = "[database]\nurl = \"a\"\nmax_connections = 5\n"
        .parse()
        .expect("base");
    let overlay: toml::Table = "[database]\nurl = \"b\"\n[logging]\nfilter = \"debug\"\n"
        .parse()
        .expect("overlay");

    let merged = merge_tables(base, overlay);
    let db = merged["database"].as_table().expect("database table");
    assert_eq!(db["url"].as_str(), Some("b"));
    assert_eq!(db["max_connections"].as_integer(), Some(5));
    assert_eq!(merged["logging"]["filter"].as_str(), Some("debug"));
}

#[test]
fn test_global_config_path_ends_with_config_toml() {
    if let Some(path) = global_config_path() {
        assert!(path.ends_with("config.toml"));
    }
}

#[test]
#[serial]
fn test_loading_defers_validation_to_the_caller() {
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        r#"
[server]
bind = "not-an-address"

[database]
backend = "postgres"
url = ""
"#,
    );

    let mut config = load_config(Some(path.as_path())).expect("load without validating");
    assert!(config.validate().is_err());

    config.database.backend = StoreBackend::Memory;
    config.server.bind = "127.0.0.1:8080".to_string();
    assert!(config.validate().is_ok());
}
