//! Unit tests for config module
//!
//! Tests defaults, TOML overrides, validation and file loading.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use tempfile::TempDir;

use crate::BridgeError;
use crate::config::{BridgeConfig, LogFormat, LogLevel, MprisConfig};

#[test]
fn config_default_is_valid() {
    let config = BridgeConfig::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.general.log_format, LogFormat::Pretty);
    assert_eq!(config.session.endpoint, "127.0.0.1:8927");
    assert_eq!(config.reconnect.initial_attempts, None);
    assert_eq!(config.mpris.bus_name(), "org.mpris.MediaPlayer2.Sendspin");
}

#[test]
fn config_empty_toml_gives_defaults() {
    let config = BridgeConfig::from_toml("", None).unwrap();
    assert_eq!(config, BridgeConfig::default());
}

#[test]
fn config_toml_overrides_fields() {
    let toml_str = r#"
        [general]
        log_level = "debug"
        log_format = "json"

        [session]
        endpoint = "10.0.0.5:9000"
        token = "secret"
        liveness_timeout_ms = 15000

        [mpris]
        name = "Living Room"
        desktop_entry = "sendspin"

        [reconnect]
        initial_delay_ms = 250
        multiplier = 1.5
        initial_attempts = 3
    "#;

    let config = BridgeConfig::from_toml(toml_str, None).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.general.log_format, LogFormat::Json);
    assert_eq!(config.session.endpoint, "10.0.0.5:9000");
    assert_eq!(config.session.token.as_deref(), Some("secret"));
    assert_eq!(config.session.liveness_timeout_ms, Some(15_000));
    assert_eq!(config.session.client_name, "sendspin-mpris");
    assert_eq!(config.mpris.desktop_entry.as_deref(), Some("sendspin"));
    assert_eq!(config.reconnect.initial_delay_ms, 250);
    assert_eq!(config.reconnect.max_delay_ms, 30_000);
    assert_eq!(config.reconnect.initial_attempts, Some(3));
}

#[test]
fn config_unknown_field_is_rejected() {
    let err = BridgeConfig::from_toml("[session]\nendpiont = \"x:1\"\n", None).unwrap_err();
    assert!(matches!(err, BridgeError::Config(_)));
}

#[test]
fn config_invalid_log_level_is_rejected() {
    let err = BridgeConfig::from_toml("[general]\nlog_level = \"loud\"\n", None).unwrap_err();
    assert!(matches!(err, BridgeError::Config(_)));
}

mod validation {
    use super::*;

    fn rejects(toml_str: &str, field: &str) {
        match BridgeConfig::from_toml(toml_str, None) {
            Err(BridgeError::Config(message)) => {
                assert!(message.contains(field), "{message} should name {field}");
            }
            other => panic!("expected config error for {field}, got {other:?}"),
        }
    }

    #[test]
    fn endpoint_needs_port() {
        rejects("[session]\nendpoint = \"localhost\"\n", "session.endpoint");
    }

    #[test]
    fn zero_connect_timeout() {
        rejects("[session]\nconnect_timeout_ms = 0\n", "session.connect_timeout_ms");
    }

    #[test]
    fn zero_liveness_timeout() {
        rejects("[session]\nliveness_timeout_ms = 0\n", "session.liveness_timeout_ms");
    }

    #[test]
    fn empty_player_name() {
        rejects("[mpris]\nname = \"  \"\n", "mpris.name");
    }

    #[test]
    fn max_delay_below_initial() {
        rejects(
            "[reconnect]\ninitial_delay_ms = 5000\nmax_delay_ms = 1000\n",
            "reconnect.max_delay_ms",
        );
    }

    #[test]
    fn shrinking_multiplier() {
        rejects("[reconnect]\nmultiplier = 0.5\n", "reconnect.multiplier");
    }

    #[test]
    fn zero_initial_attempts() {
        rejects("[reconnect]\ninitial_attempts = 0\n", "reconnect.initial_attempts");
    }
}

mod bus_name {
    use super::*;

    fn bus_name(name: &str) -> String {
        MprisConfig {
            name: name.to_string(),
            desktop_entry: None,
        }
        .bus_name()
    }

    #[test]
    fn spaces_and_punctuation_are_replaced() {
        assert_eq!(bus_name("Living Room!"), "org.mpris.MediaPlayer2.Living_Room_");
    }

    #[test]
    fn leading_digit_is_prefixed() {
        assert_eq!(bus_name("2nd floor"), "org.mpris.MediaPlayer2._2nd_floor");
    }

    #[test]
    fn identity_keeps_original_name() {
        let config = MprisConfig {
            name: "Living Room".to_string(),
            desktop_entry: None,
        };
        assert_eq!(config.identity(), "Living Room");
    }
}

mod loading {
    use super::*;

    #[test]
    fn explicit_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[mpris]\nname = \"Kitchen\"\n").unwrap();

        let config = BridgeConfig::load(Some(&path)).unwrap();

        assert_eq!(config.mpris.name, "Kitchen");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let err = BridgeConfig::load(Some(&path)).unwrap_err();

        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[session\nendpoint = ").unwrap();

        let err = BridgeConfig::load(Some(&path)).unwrap_err();

        assert!(err.to_string().contains("broken.toml"));
    }
}

#[test]
fn json_schema_lists_sections() {
    let schema = BridgeConfig::json_schema().unwrap();

    for section in ["general", "session", "mpris", "reconnect"] {
        assert!(schema.contains(section), "schema is missing {section}");
    }
}
