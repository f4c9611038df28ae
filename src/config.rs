//! Per-network client configuration.
//!
//! Every field has a default so a minimal TOML document works:
//!
//! ```toml
//! nick = "ferris"
//! autojoin = ["#rust"]
//! ```

use serde::{Deserialize, Serialize};

use crate::caps;
use crate::charset::Encoding;
use crate::error::ConfigError;

/// Identity, timers and behavior switches of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Display name, used only in logs.
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_nick")]
    pub nick: String,
    /// Tried once when `nick` is taken during registration.
    #[serde(default)]
    pub alternate_nick: String,
    #[serde(default = "default_ident")]
    pub ident: String,
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Server password sent as `PASS`.
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_quit_message")]
    pub quit_message: String,
    /// Seconds without any received line before the connection is dropped.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
    /// Seconds between keepalive pings.
    #[serde(default = "default_ping_rate")]
    pub ping_rate: u64,
    /// Seconds to wait for capability negotiation before logging in anyway.
    #[serde(default = "default_cap_grace_period")]
    pub cap_grace_period: u64,
    #[serde(default = "default_true")]
    pub enable_ircv3: bool,
    #[serde(default = "caps::default_requested")]
    pub requested_caps: Vec<String>,
    /// Channels joined once the server has sent `RPL_MYINFO`.
    #[serde(default)]
    pub autojoin: Vec<String>,
    /// Services password for `identify_template`.
    #[serde(default)]
    pub services_password: String,
    /// Raw line with `$nickname` and `$password` placeholders.
    #[serde(default = "default_identify_template")]
    pub identify_template: String,
    #[serde(default)]
    pub auto_identify: bool,
    #[serde(default)]
    pub encoding: Encoding,
    /// Minimum spacing between queued sends, in milliseconds.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
    /// Change our own nick only when the server echoes the `NICK`.
    #[serde(default = "default_true")]
    pub resolve_self_changes: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            nick: default_nick(),
            alternate_nick: String::new(),
            ident: default_ident(),
            realname: default_realname(),
            password: String::new(),
            quit_message: default_quit_message(),
            ping_timeout: default_ping_timeout(),
            ping_rate: default_ping_rate(),
            cap_grace_period: default_cap_grace_period(),
            enable_ircv3: true,
            requested_caps: caps::default_requested(),
            autojoin: Vec::new(),
            services_password: String::new(),
            identify_template: default_identify_template(),
            auto_identify: false,
            encoding: Encoding::default(),
            send_delay_ms: default_send_delay_ms(),
            resolve_self_changes: true,
        }
    }
}

impl NetworkConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: NetworkConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the reducer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nick.is_empty() || self.nick.contains(' ') {
            return Err(invalid("nick", "must be a single non-empty word"));
        }
        if self.ident.contains(' ') {
            return Err(invalid("ident", "must not contain spaces"));
        }
        if self.ping_timeout == 0 {
            return Err(invalid("ping_timeout", "must be at least one second"));
        }
        if self.ping_rate == 0 {
            return Err(invalid("ping_rate", "must be at least one second"));
        }
        if self.ping_rate >= self.ping_timeout {
            tracing::warn!(
                ping_rate = self.ping_rate,
                ping_timeout = self.ping_timeout,
                "ping_rate is not below ping_timeout, idle connections may time out"
            );
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn default_true() -> bool {
    true
}

fn default_nick() -> String {
    "slirc".to_string()
}

fn default_ident() -> String {
    "slirc".to_string()
}

fn default_realname() -> String {
    "slirc-client".to_string()
}

fn default_quit_message() -> String {
    "Leaving".to_string()
}

fn default_ping_timeout() -> u64 {
    60
}

fn default_ping_rate() -> u64 {
    20
}

fn default_cap_grace_period() -> u64 {
    10
}

fn default_identify_template() -> String {
    "PRIVMSG NickServ identify $nickname $password".to_string()
}

fn default_send_delay_ms() -> u64 {
    800
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document() {
        let config = NetworkConfig::from_toml_str("nick = \"ferris\"\nautojoin = [\"#rust\"]").unwrap();
        assert_eq!(config.nick, "ferris");
        assert_eq!(config.autojoin, vec!["#rust".to_string()]);
        assert_eq!(config.ping_timeout, 60);
        assert_eq!(config.ping_rate, 20);
        assert_eq!(config.send_delay_ms, 800);
        assert!(config.enable_ircv3);
        assert!(config.requested_caps.iter().any(|c| c == "multi-prefix"));
    }

    #[test]
    fn test_encoding_and_flags() {
        let config = NetworkConfig::from_toml_str("encoding = \"latin1\"\nenable_ircv3 = false").unwrap();
        assert_eq!(config.encoding, Encoding::Latin1);
        assert!(!config.enable_ircv3);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = NetworkConfig::from_toml_str("nick = \"two words\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "nick", .. }));

        let err = NetworkConfig::from_toml_str("ping_timeout = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "ping_timeout", .. }));

        assert!(matches!(
            NetworkConfig::from_toml_str("nick = 5"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(NetworkConfig::default().validate().is_ok());
    }
}
