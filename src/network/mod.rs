//! The network reducer.
//!
//! A [`Network`] owns everything known about one IRC connection: the local
//! user, the server, every joined channel and the mode taxonomies learned
//! from `ISUPPORT`. It performs no I/O. The caller feeds it received lines
//! and clock ticks, then drains:
//!
//! - [`Event`]s from [`Network::drain_events`], in the order they happened,
//! - raw outgoing lines from the [`SendQueue`] behind [`Network::send_queue`].
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use slirc_client::{Event, Network, NetworkConfig};
//!
//! let mut config = NetworkConfig::default();
//! config.nick = "ferris".into();
//! config.enable_ircv3 = false;
//!
//! let mut network = Network::new(config);
//! let now = Instant::now();
//! network.begin_connect();
//! network.transport_connected(now);
//! network.feed_line(":irc.example.com 001 ferris :Welcome", now);
//! network.feed_line(":ferris!f@host JOIN #rust", now);
//!
//! assert!(network.channel("#RUST").is_some());
//! assert!(network
//!     .drain_events()
//!     .iter()
//!     .any(|e| matches!(e, Event::SelfJoin { .. })));
//! ```

mod commands;
mod event;
mod handlers;
mod lifecycle;
mod modes;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::caps::CapNegotiator;
use crate::casemap::CaseMapping;
use crate::channel::Channel;
use crate::charset::Encoding;
use crate::config::NetworkConfig;
use crate::mode::Mode;
use crate::outbound::{Priority, SendQueue};
use crate::scheduler::Timers;
use crate::server::Server;
use crate::snapshot::Snapshot;
use crate::user::User;

pub use self::event::{DisconnectReason, Event, WhoisReply};
pub use self::lifecycle::ConnectionState;

/// Connection-scoped state that is never snapshotted.
#[derive(Debug)]
struct Runtime {
    state: ConnectionState,
    /// Origin of keepalive timestamps.
    epoch: Instant,
    timers: Timers,
    last_received: Option<Instant>,
    events: VecDeque<Event>,
    queue: Arc<SendQueue>,
    /// `USER`/`NICK` already sent on this connection.
    login_sent: bool,
    alternate_tried: bool,
    nick_suffix: u32,
    /// Our nick before a rename applied ahead of the server's echo.
    renamed_from: Option<String>,
    pings_sent: u64,
    tls: bool,
    reconnect_requested: bool,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            epoch: Instant::now(),
            timers: Timers::default(),
            last_received: None,
            events: VecDeque::new(),
            queue: Arc::new(SendQueue::new()),
            login_sent: false,
            alternate_tried: false,
            nick_suffix: 0,
            renamed_from: None,
            pings_sent: 0,
            tls: false,
            reconnect_requested: false,
        }
    }
}

/// State of one IRC network connection.
///
/// All nick and channel lookups are case-insensitive under the server's
/// [`CaseMapping`]. Channels are owned by value; a channel we leave is gone.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    config: NetworkConfig,
    local_user: User,
    user_mode: Mode,
    server: Server,
    /// Keyed by case-folded name.
    channels: HashMap<String, Channel>,
    /// Display prefixes, highest rank first, parallel to `cu_modes`.
    channel_user_prefixes: Vec<char>,
    /// Rank modes, highest first.
    cu_modes: Vec<char>,
    /// `CHANMODES` group D: flags.
    c_modes: Vec<char>,
    /// Group A: list modes.
    cp_modes: Vec<char>,
    /// Group B: parameter on set and unset.
    cr_modes: Vec<char>,
    /// Group C: parameter on set only.
    cc_modes: Vec<char>,
    statusmsg: Vec<char>,
    casemapping: CaseMapping,
    chantypes: Vec<char>,
    network_name: String,
    caps: CapNegotiator,
    ircv3_enabled: bool,
    channel_mode_help: HashMap<char, String>,
    lag_ms: Option<u64>,
    bytes_received: u64,
    #[serde(skip)]
    rt: Runtime,
}

impl Default for Network {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

impl PartialEq for Network {
    /// Compares the snapshotted state; connection runtime is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.local_user == other.local_user
            && self.user_mode == other.user_mode
            && self.server == other.server
            && self.channels == other.channels
            && self.channel_user_prefixes == other.channel_user_prefixes
            && self.cu_modes == other.cu_modes
            && self.c_modes == other.c_modes
            && self.cp_modes == other.cp_modes
            && self.cr_modes == other.cr_modes
            && self.cc_modes == other.cc_modes
            && self.statusmsg == other.statusmsg
            && self.casemapping == other.casemapping
            && self.chantypes == other.chantypes
            && self.network_name == other.network_name
            && self.caps == other.caps
            && self.ircv3_enabled == other.ircv3_enabled
            && self.channel_mode_help == other.channel_mode_help
            && self.lag_ms == other.lag_ms
            && self.bytes_received == other.bytes_received
    }
}

impl Snapshot for Network {
    const KIND: &'static str = "network";
}

impl Network {
    /// A disconnected network with RFC 1459 defaults until `ISUPPORT`
    /// says otherwise.
    pub fn new(config: NetworkConfig) -> Self {
        let local_user = User {
            nick: config.nick.clone(),
            ident: config.ident.clone(),
            realname: config.realname.clone(),
            ..User::default()
        };
        Self {
            caps: CapNegotiator::new(config.requested_caps.clone()),
            ircv3_enabled: config.enable_ircv3,
            network_name: config.name.clone(),
            local_user,
            config,
            user_mode: Mode::new(),
            server: Server::default(),
            channels: HashMap::new(),
            channel_user_prefixes: vec!['@', '+'],
            cu_modes: vec!['o', 'v'],
            c_modes: vec!['i', 'm', 'n', 'p', 's', 't'],
            cp_modes: vec!['b', 'e', 'I'],
            cr_modes: vec!['k'],
            cc_modes: vec!['l'],
            statusmsg: vec!['@', '+'],
            casemapping: CaseMapping::default(),
            chantypes: vec!['#', '&'],
            channel_mode_help: HashMap::new(),
            lag_ms: None,
            bytes_received: 0,
            rt: Runtime::default(),
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Changes take effect on the next connection.
    pub fn config_mut(&mut self) -> &mut NetworkConfig {
        &mut self.config
    }

    pub fn local_user(&self) -> &User {
        &self.local_user
    }

    /// Our current nick as the server knows it.
    pub fn nick(&self) -> &str {
        &self.local_user.nick
    }

    pub fn user_mode(&self) -> &Mode {
        &self.user_mode
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    /// `NETWORK=` from `ISUPPORT`, or the configured name.
    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn casemapping(&self) -> CaseMapping {
        self.casemapping
    }

    pub fn encoding(&self) -> Encoding {
        self.config.encoding
    }

    pub fn channel_user_prefixes(&self) -> &[char] {
        &self.channel_user_prefixes
    }

    pub fn cu_modes(&self) -> &[char] {
        &self.cu_modes
    }

    pub fn c_modes(&self) -> &[char] {
        &self.c_modes
    }

    pub fn cp_modes(&self) -> &[char] {
        &self.cp_modes
    }

    pub fn cr_modes(&self) -> &[char] {
        &self.cr_modes
    }

    pub fn cc_modes(&self) -> &[char] {
        &self.cc_modes
    }

    pub fn statusmsg_modes(&self) -> &[char] {
        &self.statusmsg
    }

    pub fn chantypes(&self) -> &[char] {
        &self.chantypes
    }

    /// Override the rank taxonomy, e.g. when resuming without `ISUPPORT`.
    /// Lists of unequal length are rejected.
    pub fn set_cu_modes(&mut self, modes: Vec<char>, prefixes: Vec<char>) -> bool {
        if modes.len() != prefixes.len() {
            return false;
        }
        self.cu_modes = modes;
        self.channel_user_prefixes = prefixes;
        true
    }

    pub fn caps(&self) -> &CapNegotiator {
        &self.caps
    }

    /// False once negotiation was abandoned on this connection.
    pub fn ircv3_enabled(&self) -> bool {
        self.ircv3_enabled
    }

    pub fn channel_mode_help(&self) -> &HashMap<char, String> {
        &self.channel_mode_help
    }

    /// Description of a channel mode letter for this server's daemon.
    pub fn mode_help_for(&self, letter: char) -> Option<&str> {
        self.channel_mode_help.get(&letter).map(String::as_str)
    }

    /// Round-trip time of the last answered keepalive.
    pub fn lag_ms(&self) -> Option<u64> {
        self.lag_ms
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn bytes_sent(&self) -> u64 {
        self.rt.queue.bytes_sent()
    }

    /// Keepalive pings sent on this connection.
    pub fn pings_sent(&self) -> u64 {
        self.rt.pings_sent
    }

    pub fn state(&self) -> ConnectionState {
        self.rt.state
    }

    pub fn is_connected(&self) -> bool {
        self.rt.state.is_connected()
    }

    pub fn is_using_tls(&self) -> bool {
        self.rt.tls
    }

    /// The outgoing queue. The transport drains it; the handle can be
    /// shared with another task.
    pub fn send_queue(&self) -> Arc<SendQueue> {
        Arc::clone(&self.rt.queue)
    }

    /// Take every event produced so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.rt.events.drain(..).collect()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.rt.events.is_empty()
    }

    /// True if `name` starts with one of the server's channel types.
    pub fn is_channel_name(&self, name: &str) -> bool {
        name.chars().next().is_some_and(|c| self.chantypes.contains(&c))
    }

    /// True if `nick` is us.
    pub fn is_self(&self, nick: &str) -> bool {
        self.casemapping.equals(nick, &self.local_user.nick)
    }

    fn channel_key(&self, name: &str) -> String {
        self.casemapping.to_lower(name)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&self.channel_key(name))
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        let key = self.channel_key(name);
        self.channels.get_mut(&key)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Set our nick without telling the server. For resuming a session
    /// whose identity is already known.
    pub fn set_nick_unchecked(&mut self, nick: impl Into<String>) {
        self.local_user.nick = nick.into();
    }

    /// Forget every channel without parting.
    pub fn clear_channels(&mut self) {
        self.channels.clear();
    }

    /// Adopt a channel, e.g. from another network's snapshot. Replaces a
    /// channel of the same name.
    pub fn insert_channel(&mut self, mut channel: Channel) -> Option<Channel> {
        channel.set_casemapping(self.casemapping);
        let key = self.channel_key(channel.name());
        self.channels.insert(key, channel)
    }

    fn emit(&mut self, event: Event) {
        trace!(event = event.name(), "emit");
        self.rt.events.push_back(event);
    }

    fn send(&self, line: String, priority: Priority) {
        trace!(%line, ?priority, "queue");
        self.rt.queue.push(line, priority);
    }

    /// Apply a new case mapping and re-key everything.
    fn set_casemapping(&mut self, casemapping: CaseMapping) {
        if casemapping == self.casemapping {
            return;
        }
        self.casemapping = casemapping;
        let channels = std::mem::take(&mut self.channels);
        self.channels = channels
            .into_values()
            .map(|mut channel| {
                channel.set_casemapping(casemapping);
                (casemapping.to_lower(channel.name()), channel)
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let network = Network::default();
        assert_eq!(network.cu_modes(), ['o', 'v']);
        assert_eq!(network.channel_user_prefixes(), ['@', '+']);
        assert_eq!(network.state(), ConnectionState::Disconnected);
        assert!(network.is_channel_name("#rust"));
        assert!(!network.is_channel_name("rust"));
        assert!(!network.is_channel_name(""));
    }

    #[test]
    fn test_insert_channel_and_lookup() {
        let mut network = Network::default();
        network.insert_channel(Channel::new("#Foo"));
        assert!(network.channel("#foo").is_some());
        assert!(network.channel("#FOO").is_some());
        assert_eq!(network.channel_count(), 1);
        network.clear_channels();
        assert!(network.channel("#foo").is_none());
    }

    #[test]
    fn test_set_cu_modes_rejects_mismatch() {
        let mut network = Network::default();
        assert!(!network.set_cu_modes(vec!['q', 'o'], vec!['~']));
        assert!(network.set_cu_modes(vec!['q', 'o'], vec!['~', '@']));
        assert_eq!(network.cu_modes(), ['q', 'o']);
    }
}
