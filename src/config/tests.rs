use std::collections::HashMap;
use std::time::Duration;

use crate::config::{ApiStyle, Config, ConfigError, LogFormat, UpstreamCredential};

fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_missing_base_url_fails() {
    let err = config_from(&[("N8N_USER", "admin"), ("N8N_PASS", "secret")]).unwrap_err();
    assert_eq!(err, ConfigError::Missing("N8N_URL"));
}

#[test]
fn test_missing_credential_fails() {
    let err = config_from(&[("N8N_URL", "http://localhost:5678")]).unwrap_err();
    assert_eq!(err, ConfigError::MissingCredential);
}

#[test]
fn test_partial_basic_credential_fails() {
    let err = config_from(&[("N8N_URL", "http://localhost:5678"), ("N8N_USER", "admin")]).unwrap_err();
    assert_eq!(err, ConfigError::Missing("N8N_PASS"));

    let err = config_from(&[("N8N_URL", "http://localhost:5678"), ("N8N_PASS", "secret")]).unwrap_err();
    assert_eq!(err, ConfigError::Missing("N8N_USER"));
}

#[test]
fn test_basic_defaults() {
    let config = config_from(&[
        ("N8N_URL", "http://localhost:5678/"),
        ("N8N_USER", "admin"),
        ("N8N_PASS", "secret"),
    ])
    .unwrap();

    assert_eq!(config.base_url, "http://localhost:5678");
    assert_eq!(config.api_style, ApiStyle::Versioned);
    assert_eq!(
        config.credential,
        UpstreamCredential::Basic {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }
    );
    assert_eq!(config.request_timeout, None);
    assert_eq!(config.listen_addr.to_string(), "127.0.0.1:4000");
    assert!(config.static_dir.is_none());
    assert_eq!(config.log_format, LogFormat::Pretty);
}

#[test]
fn test_api_key_takes_precedence() {
    let config = config_from(&[
        ("N8N_URL", "https://n8n.example.com"),
        ("N8N_API_KEY", "key-123"),
        ("N8N_USER", "admin"),
        ("N8N_PASS", "secret"),
    ])
    .unwrap();

    assert_eq!(
        config.credential,
        UpstreamCredential::ApiKey {
            header: "X-N8N-API-KEY".to_string(),
            key: "key-123".to_string(),
        }
    );
}

#[test]
fn test_empty_values_count_as_unset() {
    let config = config_from(&[
        ("N8N_URL", "http://localhost:5678"),
        ("N8N_API_KEY", ""),
        ("N8N_USER", "admin"),
        ("N8N_PASS", "secret"),
        ("N8N_TIMEOUT_SECS", "  "),
    ])
    .unwrap();

    assert_eq!(config.credential.mode(), "basic");
    assert_eq!(config.request_timeout, None);
}

#[test]
fn test_legacy_style_and_overrides() {
    let config = config_from(&[
        ("N8N_URL", "http://n8n:5678"),
        ("N8N_API_STYLE", "Legacy"),
        ("N8N_API_KEY", "k"),
        ("N8N_API_KEY_HEADER", "X-Custom-Key"),
        ("N8N_TIMEOUT_SECS", "15"),
        ("PROXY_LISTEN_ADDR", "0.0.0.0:8080"),
        ("PROXY_STATIC_DIR", "public"),
        ("LOG_FORMAT", "json"),
    ])
    .unwrap();

    assert_eq!(config.api_style, ApiStyle::Legacy);
    assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    assert_eq!(config.listen_addr.port(), 8080);
    assert_eq!(config.static_dir.as_deref(), Some(std::path::Path::new("public")));
    assert_eq!(config.log_format, LogFormat::Json);
    match config.credential {
        UpstreamCredential::ApiKey { header, .. } => assert_eq!(header, "X-Custom-Key"),
        other => panic!("unexpected credential {:?}", other),
    }
}

#[test]
fn test_invalid_values_are_rejected() {
    let base = [("N8N_URL", "http://localhost:5678"), ("N8N_API_KEY", "k")];

    let mut vars = base.to_vec();
    vars.push(("N8N_API_STYLE", "v2"));
    assert!(matches!(
        config_from(&vars),
        Err(ConfigError::Invalid { key: "N8N_API_STYLE", .. })
    ));

    let mut vars = base.to_vec();
    vars.push(("N8N_TIMEOUT_SECS", "0"));
    assert!(matches!(
        config_from(&vars),
        Err(ConfigError::Invalid { key: "N8N_TIMEOUT_SECS", .. })
    ));

    let mut vars = base.to_vec();
    vars.push(("PROXY_LISTEN_ADDR", "localhost"));
    assert!(matches!(
        config_from(&vars),
        Err(ConfigError::Invalid { key: "PROXY_LISTEN_ADDR", .. })
    ));

    assert!(matches!(
        config_from(&[("N8N_URL", "ftp://files"), ("N8N_API_KEY", "k")]),
        Err(ConfigError::Invalid { key: "N8N_URL", .. })
    ));
    assert!(matches!(
        config_from(&[("N8N_URL", "not a url"), ("N8N_API_KEY", "k")]),
        Err(ConfigError::Invalid { key: "N8N_URL", .. })
    ));
}

#[test]
fn test_debug_output_redacts_secrets() {
    let basic = UpstreamCredential::Basic {
        username: "admin".to_string(),
        password: "hunter2".to_string(),
    };
    let key = UpstreamCredential::ApiKey {
        header: "X-N8N-API-KEY".to_string(),
        key: "sk-live".to_string(),
    };

    assert!(!format!("{:?}", basic).contains("hunter2"));
    assert!(!format!("{:?}", key).contains("sk-live"));
    assert!(format!("{:?}", basic).contains("admin"));
}

#[test]
fn test_api_style_conventions() {
    assert_eq!(ApiStyle::Versioned.prefix(), "/api/v1");
    assert_eq!(ApiStyle::Legacy.prefix(), "/rest");
    assert_eq!(ApiStyle::Versioned.run_verb(), "start");
    assert_eq!(ApiStyle::Legacy.run_verb(), "run");
    assert_eq!(ApiStyle::Versioned.executions_filter("7"), "filters[workflowId]=7");
    assert_eq!(ApiStyle::Legacy.executions_filter("7"), "workflowId=7");
}
