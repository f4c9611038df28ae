//! Error types for the IRC client library.
//!
//! Wire input never produces these: malformed server lines surface as
//! [`Event::Invalid`](crate::Event::Invalid) or
//! [`Event::Broken`](crate::Event::Broken). The errors here belong to the
//! caller-facing API (outbound commands, snapshots, configuration, transport).

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors returned by the outbound API of a [`Network`](crate::Network).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The network is not connected, nothing can be sent.
    #[error("not connected")]
    NotConnected,

    /// A target (nick or channel) was empty or contained whitespace.
    #[error("invalid target: {0:?}")]
    InvalidTarget(String),

    /// Snapshot could not be produced or restored.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Reasons a raw line is rejected by the [`Line`](crate::Line) parser.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LineParseError {
    /// Line was empty after stripping the line terminator.
    #[error("empty line")]
    Empty,

    /// Line does not start with `:` and is not a bare `PING :token`.
    #[error("line has no source prefix")]
    MissingColon,

    /// A source prefix was present but no command followed it.
    #[error("line has no command after source")]
    MissingCommand,

    /// The tokenizer failed at a given position.
    #[error("parsing failed at position {position}: {context}")]
    Malformed {
        /// Character position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: &'static str,
    },
}

/// Errors encountered when converting entities to or from snapshot maps.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    /// The JSON value could not be mapped onto the entity.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The entity did not serialize to a map.
    #[error("snapshot of {0} is not a map")]
    NotAMap(&'static str),

    /// A map did not carry a field the entity requires.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field was present but held an unusable value.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors encountered when loading a [`NetworkConfig`](crate::NetworkConfig).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// TOML syntax or type error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors that terminate a transport-level connection.
#[cfg(feature = "tokio")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// I/O error during connect, read or write.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake failed and the caller did not override it.
    #[error("tls error: {0}")]
    Tls(String),

    /// The server address could not be used.
    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    /// Host name resolution produced no usable address.
    #[error("could not resolve {0}")]
    Dns(String),

    /// The connection is already closed.
    #[error("connection closed")]
    Closed,

    /// A received line exceeded the framing limit.
    #[error("line too long: {0} bytes")]
    LineTooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LineParseError::Malformed {
            position: 4,
            context: "parsing source",
        };
        assert_eq!(format!("{}", err), "parsing failed at position 4: parsing source");
        assert_eq!(format!("{}", ClientError::NotConnected), "not connected");
    }

    #[test]
    fn test_snapshot_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let snap: SnapshotError = json_err.into();
        let client: ClientError = snap.into();
        match client {
            ClientError::Snapshot(SnapshotError::Json(_)) => {}
            other => panic!("Expected Snapshot(Json), got {:?}", other),
        }
    }

    #[test]
    fn test_error_source_chaining() {
        let snap = SnapshotError::MissingField("nick");
        let client = ClientError::Snapshot(snap);
        let source = std::error::Error::source(&client).unwrap();
        assert_eq!(source.to_string(), "missing field: nick");
    }
}
