//! Logging system integration tests.
//!
//! Tests log configuration presets and repeated initialization.

use paygate_core::logging::{LogConfig, LogFormat, LogLevel, try_init_logging};
use std::sync::Once;

static INIT: Once = Once::new();

/// Ensure logging system is initialized only once across tests.
fn setup_logging(config: &LogConfig) {
    INIT.call_once(|| {
        try_init_logging(config);
    });
}

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(config.show_target);
}

#[test]
fn test_log_config_development() {
    let config = LogConfig::development();
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(config.show_span_events);
}

#[test]
fn test_log_config_production() {
    let config = LogConfig::production();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Json);
    assert!(config.show_thread_ids);
}

#[test]
fn test_log_config_test() {
    let config = LogConfig::test();
    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(config.format, LogFormat::Compact);
    assert!(!config.show_span_events);
}

#[test]
fn test_try_init_logging_is_repeatable() {
    setup_logging(&LogConfig::test());

    // A subscriber is already installed; this must not panic.
    try_init_logging(&LogConfig::production());
}

#[tokio::test]
async fn test_client_logs_under_subscriber() {
    use paygate_core::http_client::{HttpClient, HttpConfig};

    setup_logging(&LogConfig::test());
    let client = HttpClient::new(HttpConfig {
        verbose: true,
        ..Default::default()
    })
    .unwrap();

    let request = client.request().path("relative/only").build();
    assert!(client.fetch(request).await.is_err());
}
