//! Configuration management for cashora
//!
//! This module handles loading, validation, and management of
//! cashora configuration from YAML files.

pub mod error;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// A literal email/password pair accepted by a sign-in screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Literal comparison, nothing more
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

/// Sign-in configuration for both consoles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Credentials for the user dashboard
    #[serde(default = "default_user_credentials")]
    pub user: Credentials,
    /// Credentials for the admin console
    #[serde(default = "default_admin_credentials")]
    pub admin: Credentials,
    /// Prefix of the session cookies; the console's role is appended
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user: default_user_credentials(),
            admin: default_admin_credentials(),
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_user_credentials() -> Credentials {
    Credentials {
        email: "user@cashora.com".to_string(),
        password: "user123".to_string(),
    }
}

fn default_admin_credentials() -> Credentials {
    Credentials {
        email: "admin@cashora.com".to_string(),
        password: "admin123".to_string(),
    }
}

fn default_cookie_name() -> String {
    "cashora_session".to_string()
}

/// Wallet and fee settings for the user dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Symbol prepended to rendered amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Balance the send screen starts with
    #[serde(default = "default_opening_balance")]
    pub opening_balance: Decimal,
    /// Fee charged on withdrawals, as a fraction of the amount
    #[serde(default = "default_withdrawal_fee_rate")]
    pub withdrawal_fee_rate: Decimal,
    /// Fee charged on transfers, as a fraction of the amount
    #[serde(default = "default_send_fee_rate")]
    pub send_fee_rate: Decimal,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            opening_balance: default_opening_balance(),
            withdrawal_fee_rate: default_withdrawal_fee_rate(),
            send_fee_rate: default_send_fee_rate(),
        }
    }
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_opening_balance() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_withdrawal_fee_rate() -> Decimal {
    Decimal::new(1, 2)
}

fn default_send_fee_rate() -> Decimal {
    Decimal::new(5, 3)
}

/// Support chat settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Delay before the bot answers, in milliseconds
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    /// First message of every conversation
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            greeting: default_greeting(),
        }
    }
}

fn default_reply_delay_ms() -> u64 {
    1000
}

fn default_greeting() -> String {
    "Hello! How can I help you today?".to_string()
}

/// Longest reply delay accepted by validation
pub const MAX_REPLY_DELAY_MS: u64 = 60_000;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Sign-in settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Wallet and fee settings
    #[serde(default)]
    pub wallet: WalletConfig,
    /// Support chat settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        for (field, rate) in [
            ("wallet.withdrawal_fee_rate", self.wallet.withdrawal_fee_rate),
            ("wallet.send_fee_rate", self.wallet.send_fee_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "Fee rate must be between 0 and 1".to_string(),
                });
            }
        }

        if self.wallet.opening_balance < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "wallet.opening_balance".to_string(),
                reason: "Opening balance cannot be negative".to_string(),
            });
        }

        if self.chat.reply_delay_ms > MAX_REPLY_DELAY_MS {
            return Err(ConfigError::InvalidValue {
                field: "chat.reply_delay_ms".to_string(),
                reason: format!("Reply delay must not exceed {} ms", MAX_REPLY_DELAY_MS),
            });
        }

        if self.auth.cookie_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "auth.cookie_name".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.auth.user.email, "user@cashora.com");
        assert_eq!(config.auth.admin.email, "admin@cashora.com");
        assert_eq!(config.wallet.opening_balance, Decimal::new(10_000, 0));
        assert_eq!(config.chat.reply_delay_ms, 1000);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = Config::from_yaml("server:\n  port: 9000\nchat:\n  reply_delay_ms: 250\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.chat.reply_delay_ms, 250);
        assert_eq!(config.wallet.currency_symbol, "$");
    }

    #[test]
    fn test_bundled_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.wallet.send_fee_rate, Decimal::new(5, 3));
        assert_eq!(config.wallet.withdrawal_fee_rate, Decimal::new(1, 2));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.port"));
    }

    #[test]
    fn test_fee_rate_out_of_range_rejected() {
        let err = Config::from_yaml("wallet:\n  send_fee_rate: \"1.5\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "wallet.send_fee_rate"));
    }

    #[test]
    fn test_reply_delay_limit() {
        let err = Config::from_yaml("chat:\n  reply_delay_ms: 120000\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/definitely/not/here/cashora.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_credentials_literal_match() {
        let creds = default_user_credentials();
        assert!(creds.matches("user@cashora.com", "user123"));
        assert!(!creds.matches("USER@cashora.com", "user123"));
        assert!(!creds.matches("user@cashora.com", "user1234"));
    }
}
