//! Server addresses in `irc://` URL form.
//!
//! ```text
//! irc.libera.chat
//! irc://irc.libera.chat:6667/#rust
//! ircs://[2001:db8::1]:6697
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Port used when an address names none.
pub const DEFAULT_PORT: u16 = 6667;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub ipv6: bool,
    /// Path after the host, e.g. a channel to join.
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub password: String,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16, tls: bool) -> Self {
        Self {
            host: host.into(),
            port,
            tls,
            ipv6: false,
            suffix: String::new(),
            nick: String::new(),
            password: String::new(),
        }
    }

    /// Parse an address. The input is lowercased and trimmed first.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            field: "address",
            reason: format!("{}: {:?}", reason, url),
        };

        let lowered = url.trim().to_lowercase();
        if lowered.is_empty() || lowered.contains(' ') {
            return Err(invalid("expected a host without spaces"));
        }

        let (tls, rest) = if let Some(rest) = lowered.strip_prefix("ircs://") {
            (true, rest)
        } else {
            (false, lowered.strip_prefix("irc://").unwrap_or(&lowered))
        };

        let (authority, suffix) = rest.split_once('/').unwrap_or((rest, ""));

        let (host, port, ipv6) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, after) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid("unterminated IPv6 literal"))?;
            let port = match after.strip_prefix(':') {
                Some(port) => parse_port(port).ok_or_else(|| invalid("bad port"))?,
                None => DEFAULT_PORT,
            };
            (host, port, true)
        } else {
            match authority.split_once(':') {
                Some((host, port)) => (host, parse_port(port).ok_or_else(|| invalid("bad port"))?, false),
                None => (authority, DEFAULT_PORT, false),
            }
        };

        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            tls,
            ipv6,
            suffix: suffix.to_string(),
            nick: String::new(),
            password: String::new(),
        })
    }

    /// `host:port` form for socket APIs.
    pub fn socket_addr_string(&self) -> String {
        if self.ipv6 {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn parse_port(s: &str) -> Option<u16> {
    s.parse().ok().filter(|&p| p != 0)
}

impl FromStr for ServerAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.tls { "ircs" } else { "irc" };
        write!(f, "{}://{}", scheme, self.socket_addr_string())?;
        if !self.suffix.is_empty() {
            write!(f, "/{}", self.suffix)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host() {
        let addr: ServerAddress = "irc.libera.chat".parse().unwrap();
        assert_eq!(addr.host, "irc.libera.chat");
        assert_eq!(addr.port, DEFAULT_PORT);
        assert!(!addr.tls);
    }

    #[test]
    fn test_url_with_port_and_suffix() {
        let addr = ServerAddress::parse("ircs://Irc.Example.org:6697/#rust").unwrap();
        assert_eq!(addr.host, "irc.example.org");
        assert_eq!(addr.port, 6697);
        assert!(addr.tls);
        assert_eq!(addr.suffix, "#rust");
        assert_eq!(addr.to_string(), "ircs://irc.example.org:6697/#rust");
    }

    #[test]
    fn test_ipv6() {
        let addr = ServerAddress::parse("irc://[2001:db8::1]:7000").unwrap();
        assert!(addr.ipv6);
        assert_eq!(addr.host, "2001:db8::1");
        assert_eq!(addr.port, 7000);
        assert_eq!(addr.socket_addr_string(), "[2001:db8::1]:7000");

        assert!(ServerAddress::parse("[2001:db8::1").is_err());
    }

    #[test]
    fn test_invalid() {
        assert!(ServerAddress::parse("irc example org").is_err());
        assert!(ServerAddress::parse("host:notaport").is_err());
        assert!(ServerAddress::parse("irc://:6667").is_err());
    }
}
