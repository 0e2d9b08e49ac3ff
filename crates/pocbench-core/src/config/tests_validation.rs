use super::*;

#[test]
fn test_defaults_are_valid() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_memory_backend_allows_empty_url() {
    let mut config = Config::default();
    config.database = DatabaseConfig::memory();
    config.database.url = String::new();
    assert!(config.validate().is_ok());
}

#[test]
fn test_postgres_requires_url() {
    let mut config = Config::default();
    config.database.url = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_min_connections_cannot_exceed_max() {
    let mut config = Config::default();
    config.database.min_connections = 30;
    config.database.max_connections = 10;
    let err = config.validate().expect_err("should reject");
    assert!(err.to_string().contains("min_connections"));
}

#[test]
fn test_zero_max_connections_rejected() {
    let mut config = Config::default();
    config.database.min_connections = 0;
    config.database.max_connections = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_lock_timeout_rejected() {
    let mut config = Config::default();
    config.database.lock_timeout_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_bad_bind_address_rejected() {
    let mut config = Config::default();
    config.server.bind = "localhost-ish".to_string();
    let err = config.validate().expect_err("should reject");
    assert!(err.to_string().contains("server.bind"));
}
