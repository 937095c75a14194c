use ragscope_core::config::{Config, OnQueryError, StorageConfig};

#[test]
fn test_storage_config_defaults() {
    let config = StorageConfig::default();
    assert_eq!(config.provider, "fixture");
    assert_eq!(config.collection, "documents");
    assert_eq!(config.timeout_secs, 30);
    assert!(config.fixture_path.is_none());
    assert!(config.base_url.is_none());
    assert!(config.api_key.is_none());
}

#[test]
fn test_config_validation_storage_provider() {
    let mut config = Config::default();

    config.storage.provider = "mock".to_string();
    assert!(config.validate().is_ok());

    config.storage.provider = "fixture".to_string();
    config.storage.fixture_path = Some("hits.json".to_string());
    assert!(config.validate().is_ok());

    config.storage.provider = "invalid".to_string();
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid storage provider"));
}

#[test]
fn test_on_query_error_parses_snake_case() {
    let config = Config::from_toml_str(
        r#"
        [evaluation]
        on_query_error = "abort"
        "#,
    )
    .expect("valid TOML");
    assert_eq!(config.evaluation.on_query_error, OnQueryError::Abort);

    let result = Config::from_toml_str(
        r#"
        [evaluation]
        on_query_error = "skip"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_k_values_kept_as_written() {
    let config = Config::from_toml_str(
        r#"
        [evaluation]
        k_values = [5, 1, 20, 3]
        "#,
    )
    .expect("valid TOML");
    assert_eq!(config.evaluation.k_values, vec![5, 1, 20, 3]);
}
