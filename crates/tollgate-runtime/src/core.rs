//! Core runtime types: configuration and error handling

use anchor_lang::prelude::Pubkey;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tollgate::{LedgerError, TollgateError};
use tracing::warn;

use crate::acl::AclError;

// ================================
// Configuration Types
// ================================

fn default_event_buffer() -> usize {
    1000
}

/// Deployment configuration for one tollgate instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Instance identity; a fresh one is generated when absent
    #[serde(default, with = "optional_pubkey")]
    pub instance: Option<Pubkey>,

    /// Ledger mint fees are charged in
    #[serde(with = "pubkey_string")]
    pub fee_token: Pubkey,

    /// Fee per forwarded action in base token units
    pub fee_amount: u128,

    /// Recipient of collected fees
    #[serde(with = "pubkey_string")]
    pub fee_destination: Pubkey,

    /// Capacity of the runtime event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl DeploymentConfig {
    pub fn new(fee_token: Pubkey, fee_amount: u128, fee_destination: Pubkey) -> Self {
        Self {
            instance: None,
            fee_token,
            fee_amount,
            fee_destination,
            event_buffer: default_event_buffer(),
        }
    }

    /// Load configuration from `TOLLGATE_*` environment variables
    pub fn from_env() -> Result<Self> {
        let instance = std::env::var("TOLLGATE_INSTANCE")
            .ok()
            .map(|value| parse_pubkey("TOLLGATE_INSTANCE", &value))
            .transpose()?;

        let fee_token = parse_pubkey("TOLLGATE_FEE_TOKEN", &required_var("TOLLGATE_FEE_TOKEN")?)?;
        let fee_destination = parse_pubkey(
            "TOLLGATE_FEE_DESTINATION",
            &required_var("TOLLGATE_FEE_DESTINATION")?,
        )?;

        let fee_amount = match std::env::var("TOLLGATE_FEE_AMOUNT") {
            Ok(value) => value.trim().parse::<u128>().map_err(|e| {
                RuntimeError::InvalidConfiguration(format!("TOLLGATE_FEE_AMOUNT: {e}"))
            })?,
            Err(_) => {
                warn!("TOLLGATE_FEE_AMOUNT not set, forwarding without a fee");
                0
            }
        };

        let event_buffer = std::env::var("TOLLGATE_EVENT_BUFFER")
            .ok()
            .map(|value| value.parse::<usize>())
            .transpose()
            .map_err(|e| RuntimeError::InvalidConfiguration(format!("TOLLGATE_EVENT_BUFFER: {e}")))?
            .unwrap_or_else(default_event_buffer);

        let config = Self {
            instance,
            fee_token,
            fee_amount,
            fee_destination,
            event_buffer,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fee_token == Pubkey::default() {
            return Err(RuntimeError::InvalidConfiguration(
                "fee_token cannot be the null address".to_string(),
            ));
        }
        if self.fee_destination == Pubkey::default() {
            return Err(RuntimeError::InvalidConfiguration(
                "fee_destination cannot be the null address".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(RuntimeError::InvalidConfiguration(
                "event_buffer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| RuntimeError::InvalidConfiguration(format!("{name} must be set")))
}

fn parse_pubkey(name: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value.trim())
        .map_err(|e| RuntimeError::InvalidConfiguration(format!("{name}: {e}")))
}

mod pubkey_string {
    use anchor_lang::prelude::Pubkey;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let value = String::deserialize(deserializer)?;
        Pubkey::from_str(&value).map_err(de::Error::custom)
    }
}

mod optional_pubkey {
    use anchor_lang::prelude::Pubkey;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Option<Pubkey>, serializer: S) -> Result<S::Ok, S::Error> {
        match key {
            Some(key) => serializer.collect_str(key),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Pubkey>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|value| Pubkey::from_str(&value).map_err(de::Error::custom))
            .transpose()
    }
}

// ================================
// Error Types
// ================================

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Tollgate(#[from] TollgateError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Permission error: {0}")]
    Acl(#[from] AclError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    #[test]
    fn test_config_from_file() {
        let fee_token = Pubkey::new_unique();
        let fee_destination = Pubkey::new_unique();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"fee_token": "{fee_token}", "fee_amount": 1000000000000000000, "fee_destination": "{fee_destination}"}}"#
        )
        .unwrap();

        let config = DeploymentConfig::from_file(file.path()).unwrap();

        assert_eq!(config.instance, None);
        assert_eq!(config.fee_token, fee_token);
        assert_eq!(config.fee_amount, 1_000_000_000_000_000_000);
        assert_eq!(config.fee_destination, fee_destination);
        assert_eq!(config.event_buffer, 1000);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = DeploymentConfig::new(Pubkey::new_unique(), 0, Pubkey::new_unique());
        config.instance = Some(Pubkey::new_unique());

        let json = serde_json::to_string(&config).unwrap();
        let parsed: DeploymentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_rejects_null_addresses() {
        let config = DeploymentConfig::new(Pubkey::default(), 1, Pubkey::new_unique());
        assert!(matches!(config.validate(), Err(RuntimeError::InvalidConfiguration(_))));

        let config = DeploymentConfig::new(Pubkey::new_unique(), 1, Pubkey::default());
        assert!(matches!(config.validate(), Err(RuntimeError::InvalidConfiguration(_))));
    }

    // Environment variables are process-wide
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 5] = [
        "TOLLGATE_INSTANCE",
        "TOLLGATE_FEE_TOKEN",
        "TOLLGATE_FEE_AMOUNT",
        "TOLLGATE_FEE_DESTINATION",
        "TOLLGATE_EVENT_BUFFER",
    ];

    fn with_env<R>(vars: &[(&str, String)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        let result = f();
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        result
    }

    #[test]
    fn test_config_from_env() {
        let instance = Pubkey::new_unique();
        let fee_token = Pubkey::new_unique();
        let fee_destination = Pubkey::new_unique();

        let config = with_env(
            &[
                ("TOLLGATE_INSTANCE", instance.to_string()),
                ("TOLLGATE_FEE_TOKEN", fee_token.to_string()),
                ("TOLLGATE_FEE_AMOUNT", "100000000000000000000".to_string()),
                ("TOLLGATE_FEE_DESTINATION", fee_destination.to_string()),
                ("TOLLGATE_EVENT_BUFFER", "64".to_string()),
            ],
            DeploymentConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.instance, Some(instance));
        assert_eq!(config.fee_token, fee_token);
        assert_eq!(config.fee_amount, 100_000_000_000_000_000_000);
        assert_eq!(config.fee_destination, fee_destination);
        assert_eq!(config.event_buffer, 64);
    }

    #[test]
    fn test_config_from_env_defaults() {
        let config = with_env(
            &[
                ("TOLLGATE_FEE_TOKEN", Pubkey::new_unique().to_string()),
                ("TOLLGATE_FEE_DESTINATION", Pubkey::new_unique().to_string()),
            ],
            DeploymentConfig::from_env,
        )
        .unwrap();

        assert_eq!(config.instance, None);
        assert_eq!(config.fee_amount, 0);
        assert_eq!(config.event_buffer, 1000);
    }

    #[test]
    fn test_config_from_env_requires_fee_token() {
        let result = with_env(
            &[("TOLLGATE_FEE_DESTINATION", Pubkey::new_unique().to_string())],
            DeploymentConfig::from_env,
        );

        match result {
            Err(RuntimeError::InvalidConfiguration(message)) => {
                assert!(message.contains("TOLLGATE_FEE_TOKEN"));
            }
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_config_from_env_rejects_bad_values() {
        let fee_token = Pubkey::new_unique().to_string();
        let fee_destination = Pubkey::new_unique().to_string();
        let cases = [
            ("TOLLGATE_FEE_DESTINATION", "not-a-key"),
            ("TOLLGATE_FEE_AMOUNT", "1e18"),
            ("TOLLGATE_FEE_AMOUNT", "-1"),
            ("TOLLGATE_EVENT_BUFFER", "0"),
        ];

        for (name, value) in cases {
            let mut vars = vec![
                ("TOLLGATE_FEE_TOKEN", fee_token.clone()),
                ("TOLLGATE_FEE_DESTINATION", fee_destination.clone()),
            ];
            vars.retain(|(existing, _)| *existing != name);
            vars.push((name, value.to_string()));

            let result = with_env(&vars, DeploymentConfig::from_env);
            assert!(
                matches!(result, Err(RuntimeError::InvalidConfiguration(_))),
                "{name}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_config_rejects_bad_pubkey() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"fee_token": "not-a-key", "fee_amount": 1, "fee_destination": "{}"}}"#,
            Pubkey::new_unique()
        )
        .unwrap();

        let result = DeploymentConfig::from_file(file.path());
        assert!(matches!(result, Err(RuntimeError::Serialization(_))));
    }
}
