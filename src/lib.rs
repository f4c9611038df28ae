//! # slirc-client
//!
//! The client side of IRC: a line parser, channel and user models, mode
//! algebra and a sans-IO network reducer that tracks one connection's
//! state from registration to disconnect.
//!
//! ## Features
//!
//! - Line parsing with IRCv3 message tags and `server-time`
//! - Channel user ranks (`@`, `+`, ...) learned from `ISUPPORT`
//! - Ban, exception and invite lists with setter and time
//! - IRCv3 capability negotiation with a grace period
//! - Keepalive, lag measurement and ping timeout
//! - Throttled, prioritized send queue
//! - Snapshots of every entity to JSON maps and back
//! - Optional Tokio driver with TLS
//!
//! ## Quick Start
//!
//! ### Parsing lines
//!
//! ```rust
//! use slirc_client::{numeric, Line};
//!
//! let line = Line::parse(":nick!user@host PRIVMSG #channel :Hello!").unwrap();
//! assert_eq!(line.numeric(), numeric::RAW_PRIVMSG);
//! assert_eq!(line.source_nick(), "nick");
//! assert_eq!(line.text(), "Hello!");
//! ```
//!
//! ### Driving a network
//!
//! ```rust
//! use std::time::Instant;
//! use slirc_client::{Event, Network, NetworkConfig};
//!
//! let mut network = Network::new(NetworkConfig {
//!     nick: "ferris".into(),
//!     enable_ircv3: false,
//!     ..NetworkConfig::default()
//! });
//! let now = Instant::now();
//! network.begin_connect();
//! network.transport_connected(now);
//! network.feed_line(":irc.example.com 001 ferris :Welcome", now);
//! network.feed_line(":ferris!f@host JOIN #rust", now);
//! network.feed_line(":irc.example.com 353 ferris = #rust :@alice +bob ferris", now);
//!
//! let channel = network.channel("#rust").unwrap();
//! assert_eq!(channel.user("alice").unwrap().highest_prefix(), Some('@'));
//!
//! for event in network.drain_events() {
//!     println!("{}", event.name());
//! }
//! ```

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod caps;
pub mod casemap;
pub mod channel;
pub mod charset;
pub mod config;
pub mod error;
pub mod isupport;
pub mod line;
pub mod mode;
pub mod mode_help;
pub mod mode_helper;
pub mod network;
pub mod numeric;
pub mod outbound;
pub mod scheduler;
pub mod server;
pub mod server_address;
pub mod snapshot;
pub mod tags;
pub mod user;
pub mod util;

#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod codec;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod connection;

pub use self::caps::{CapNegotiator, CapState, Capability};
pub use self::casemap::{irc_eq, irc_to_lower, CaseMapping};
pub use self::channel::Channel;
pub use self::charset::Encoding;
pub use self::config::NetworkConfig;
pub use self::error::{ClientError, ConfigError, LineParseError, Result, SnapshotError};
pub use self::isupport::{ChanModes, Isupport, IsupportEntry, PrefixSpec};
pub use self::line::Line;
pub use self::mode::{Mode, ModeList, ParamMode, SingleMode};
pub use self::network::{ConnectionState, DisconnectReason, Event, Network, WhoisReply};
pub use self::outbound::{Priority, SendQueue};
pub use self::server::Server;
pub use self::server_address::ServerAddress;
pub use self::snapshot::{Snapshot, SnapshotRegistry};
pub use self::tags::Tag;
pub use self::user::User;

#[cfg(feature = "tokio")]
pub use self::codec::LineCodec;
#[cfg(feature = "tokio")]
pub use self::connection::{CertificatePrompt, Connection};
#[cfg(feature = "tokio")]
pub use self::error::ConnectionError;
