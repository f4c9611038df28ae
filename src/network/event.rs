//! Events emitted by the reducer.
//!
//! Events are queued in the order the reducer produces them and drained by
//! the caller after each fed line or tick. Order is significant:
//! [`Event::SelfPart`] and [`Event::SelfKick`] come before the generic
//! [`Event::Part`]/[`Event::Kick`], and carry the channel that has just been
//! removed from the network.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::channel::Channel;
use crate::error::LineParseError;
use crate::line::Line;
use crate::mode::{Mode, ParamMode, SingleMode};
use crate::user::User;

/// Why a connection ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Nothing was received for longer than the ping timeout.
    PingTimeout,
    /// The caller asked to disconnect.
    Quit,
    /// The server closed the stream.
    RemoteClosed,
    /// The server sent `ERROR`.
    ServerError(String),
    /// Transport failure (socket or TLS).
    Transport(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PingTimeout => f.write_str("ping timeout"),
            Self::Quit => f.write_str("quit"),
            Self::RemoteClosed => f.write_str("connection closed by server"),
            Self::ServerError(msg) => write!(f, "server error: {}", msg),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

/// One part of a WHOIS reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WhoisReply {
    /// 311: identity and realname.
    User(User),
    /// 312: server the user is on, with its description.
    Server { nick: String, server: String, info: String },
    /// 313
    Operator { nick: String },
    /// 317: idle seconds and, when the server sends it, sign-on time.
    Idle {
        nick: String,
        seconds: u64,
        signon: Option<DateTime<Utc>>,
    },
    /// 319: channels with their prefixes, as sent.
    Channels { nick: String, channels: Vec<String> },
    /// 330: services account.
    Account { nick: String, account: String },
    /// 307
    Registered { nick: String },
    /// 378: actual host.
    Host { nick: String, text: String },
    /// 379: user modes.
    Modes { nick: String, text: String },
    /// 671: secure connection.
    Secure { nick: String },
    /// 320: free-form server specific line.
    Special { nick: String, text: String },
    /// 318
    End { nick: String },
}

/// Everything the reducer reports.
///
/// Variants that stem from a server line carry it as `line`. Channel names
/// are given as the server spelled them; look the channel up with
/// [`Network::channel`](crate::Network::channel) when its state is needed.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Event {
    /// A raw line that matched neither accepted shape.
    Invalid { raw: String, error: LineParseError },
    /// A recognised line whose content made no sense: wrong parameter
    /// count, unknown channel, unknown user.
    Broken { line: Arc<Line>, reason: String },
    /// A valid line no handler claims.
    Unknown { line: Arc<Line> },
    /// 421: the server did not know a command we sent.
    NumericUnknown { line: Arc<Line> },

    /// Transport is up, registration begins.
    Connected,
    /// 001
    Welcome { line: Arc<Line> },
    Disconnected { reason: DisconnectReason },
    /// 002, 003 and similar informational numerics.
    Info { line: Arc<Line> },
    /// 375, 372 and 376. `text` is the trailing text.
    Motd { line: Arc<Line>, text: String },
    /// 004
    ServerInfo { line: Arc<Line> },
    /// 005, after the taxonomies have been updated.
    Isupport { line: Arc<Line> },

    /// We joined. `channel` is a copy of the new channel.
    SelfJoin { line: Arc<Line>, channel: Channel },
    Join { line: Arc<Line>, channel: String, user: User },
    /// We left. `channel` is the removed channel itself.
    SelfPart { line: Arc<Line>, channel: Channel },
    Part {
        line: Arc<Line>,
        channel: String,
        user: User,
        reason: String,
    },
    /// We were kicked. `channel` is the removed channel itself.
    SelfKick {
        line: Arc<Line>,
        channel: Channel,
        by: User,
        reason: String,
    },
    Kick {
        line: Arc<Line>,
        channel: String,
        by: User,
        target: String,
        reason: String,
    },
    /// One per channel a quitting user was in.
    PerChannelQuit { line: Arc<Line>, channel: String, user: User },
    Quit { line: Arc<Line>, user: User, reason: String },
    Nick {
        line: Arc<Line>,
        old: String,
        new: String,
        is_self: bool,
    },

    Privmsg {
        line: Arc<Line>,
        target: String,
        user: User,
        text: String,
    },
    Notice {
        line: Arc<Line>,
        target: String,
        user: User,
        text: String,
    },
    /// A `PRIVMSG` framed in `\x01`.
    Ctcp {
        line: Arc<Line>,
        target: String,
        user: User,
        command: String,
        parameters: String,
    },

    /// Any `MODE` line, after its specific events.
    Mode { line: Arc<Line>, target: String },
    /// Our user mode changed. Carries the new mode.
    UserMode { line: Arc<Line>, mode: Mode },
    /// A user's highest rank in a channel changed.
    CUModeChanged {
        line: Arc<Line>,
        channel: String,
        user: User,
        mode: SingleMode,
    },
    /// A rank changed that is not the user's highest.
    CUSubModeChanged {
        line: Arc<Line>,
        channel: String,
        user: User,
        mode: SingleMode,
    },
    PModeInserted {
        line: Arc<Line>,
        channel: String,
        mode: ParamMode,
    },
    PModeRemoved {
        line: Arc<Line>,
        channel: String,
        mode: ParamMode,
    },

    /// `TOPIC` change. `old_topic` is what the channel had before.
    Topic {
        line: Arc<Line>,
        channel: String,
        old_topic: String,
    },
    /// 332
    TopicInfo {
        line: Arc<Line>,
        channel: String,
        old_topic: String,
    },
    /// 333
    TopicWhoTime { line: Arc<Line>, channel: String },
    /// 331
    NoTopic { line: Arc<Line>, channel: String },

    /// 433 or 437 after registration.
    NickCollision { line: Arc<Line>, nick: String },
    /// 352. `user` is the updated roster entry, or the parsed reply when
    /// the user is not tracked.
    WhoReply {
        line: Arc<Line>,
        channel: String,
        user: User,
    },
    EndOfWho { line: Arc<Line> },
    /// 353. The users parsed from this line.
    Names {
        line: Arc<Line>,
        channel: String,
        users: Vec<User>,
    },
    EndOfNames { line: Arc<Line>, channel: String },
    Whois { line: Arc<Line>, reply: WhoisReply },

    /// 367, 348 or 346, after the entry was stored.
    ListEntry {
        line: Arc<Line>,
        channel: String,
        mode: ParamMode,
    },
    /// 368, 349 or 347. `letter` is the list mode that ended.
    EndOfList {
        line: Arc<Line>,
        channel: String,
        letter: char,
    },
    /// 324
    ModeInfo { line: Arc<Line>, channel: String },
    /// 329
    CreationTime {
        line: Arc<Line>,
        channel: String,
        time: DateTime<Utc>,
    },

    /// Any `CAP` line, after negotiation state was updated.
    Cap { line: Arc<Line>, subcommand: String },
    /// A capability we wanted that the server does not offer.
    CapUnsupported { capability: String },
    /// Negotiation was abandoned; the connection continues without IRCv3.
    Ircv3Disabled,

    /// A user's away flag flipped. `user` carries the new state.
    AwayChanged { line: Arc<Line>, user: User },
    /// 306
    NowAway { line: Arc<Line> },
    /// 305
    Unaway { line: Arc<Line> },
    /// `user` carries the new ident and host.
    ChgHost {
        line: Arc<Line>,
        user: User,
        old_ident: String,
        old_host: String,
    },
    Invite {
        line: Arc<Line>,
        user: User,
        target: String,
        channel: String,
    },
    Metadata {
        line: Arc<Line>,
        target: String,
        key: String,
        value: String,
    },
    /// Server `PING`, after the `PONG` went out.
    Ping { line: Arc<Line> },
    /// Reply to our keepalive. `lag` in milliseconds when the payload was
    /// one of our timestamps.
    Pong { line: Arc<Line>, lag: Option<u64> },
    /// Server `ERROR` line. A disconnect follows.
    Error { line: Arc<Line>, message: String },
}

impl Event {
    /// The server line behind this event, if any.
    pub fn line(&self) -> Option<&Line> {
        match self {
            Event::Invalid { .. }
            | Event::Connected
            | Event::Disconnected { .. }
            | Event::CapUnsupported { .. }
            | Event::Ircv3Disabled => None,
            Event::Broken { line, .. }
            | Event::Unknown { line }
            | Event::NumericUnknown { line }
            | Event::Welcome { line }
            | Event::Info { line }
            | Event::Motd { line, .. }
            | Event::ServerInfo { line }
            | Event::Isupport { line }
            | Event::SelfJoin { line, .. }
            | Event::Join { line, .. }
            | Event::SelfPart { line, .. }
            | Event::Part { line, .. }
            | Event::SelfKick { line, .. }
            | Event::Kick { line, .. }
            | Event::PerChannelQuit { line, .. }
            | Event::Quit { line, .. }
            | Event::Nick { line, .. }
            | Event::Privmsg { line, .. }
            | Event::Notice { line, .. }
            | Event::Ctcp { line, .. }
            | Event::Mode { line, .. }
            | Event::UserMode { line, .. }
            | Event::CUModeChanged { line, .. }
            | Event::CUSubModeChanged { line, .. }
            | Event::PModeInserted { line, .. }
            | Event::PModeRemoved { line, .. }
            | Event::Topic { line, .. }
            | Event::TopicInfo { line, .. }
            | Event::TopicWhoTime { line, .. }
            | Event::NoTopic { line, .. }
            | Event::NickCollision { line, .. }
            | Event::WhoReply { line, .. }
            | Event::EndOfWho { line }
            | Event::Names { line, .. }
            | Event::EndOfNames { line, .. }
            | Event::Whois { line, .. }
            | Event::ListEntry { line, .. }
            | Event::EndOfList { line, .. }
            | Event::ModeInfo { line, .. }
            | Event::CreationTime { line, .. }
            | Event::Cap { line, .. }
            | Event::AwayChanged { line, .. }
            | Event::NowAway { line }
            | Event::Unaway { line }
            | Event::ChgHost { line, .. }
            | Event::Invite { line, .. }
            | Event::Metadata { line, .. }
            | Event::Ping { line }
            | Event::Pong { line, .. }
            | Event::Error { line, .. } => Some(line),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Invalid { .. } => "invalid",
            Event::Broken { .. } => "broken",
            Event::Unknown { .. } => "unknown",
            Event::NumericUnknown { .. } => "numeric_unknown",
            Event::Connected => "connected",
            Event::Welcome { .. } => "welcome",
            Event::Disconnected { .. } => "disconnected",
            Event::Info { .. } => "info",
            Event::Motd { .. } => "motd",
            Event::ServerInfo { .. } => "server_info",
            Event::Isupport { .. } => "isupport",
            Event::SelfJoin { .. } => "self_join",
            Event::Join { .. } => "join",
            Event::SelfPart { .. } => "self_part",
            Event::Part { .. } => "part",
            Event::SelfKick { .. } => "self_kick",
            Event::Kick { .. } => "kick",
            Event::PerChannelQuit { .. } => "per_channel_quit",
            Event::Quit { .. } => "quit",
            Event::Nick { .. } => "nick",
            Event::Privmsg { .. } => "privmsg",
            Event::Notice { .. } => "notice",
            Event::Ctcp { .. } => "ctcp",
            Event::Mode { .. } => "mode",
            Event::UserMode { .. } => "user_mode",
            Event::CUModeChanged { .. } => "cu_mode_changed",
            Event::CUSubModeChanged { .. } => "cu_sub_mode_changed",
            Event::PModeInserted { .. } => "pmode_inserted",
            Event::PModeRemoved { .. } => "pmode_removed",
            Event::Topic { .. } => "topic",
            Event::TopicInfo { .. } => "topic_info",
            Event::TopicWhoTime { .. } => "topic_who_time",
            Event::NoTopic { .. } => "no_topic",
            Event::NickCollision { .. } => "nick_collision",
            Event::WhoReply { .. } => "who_reply",
            Event::EndOfWho { .. } => "end_of_who",
            Event::Names { .. } => "names",
            Event::EndOfNames { .. } => "end_of_names",
            Event::Whois { .. } => "whois",
            Event::ListEntry { .. } => "list_entry",
            Event::EndOfList { .. } => "end_of_list",
            Event::ModeInfo { .. } => "mode_info",
            Event::CreationTime { .. } => "creation_time",
            Event::Cap { .. } => "cap",
            Event::CapUnsupported { .. } => "cap_unsupported",
            Event::Ircv3Disabled => "ircv3_disabled",
            Event::AwayChanged { .. } => "away_changed",
            Event::NowAway { .. } => "now_away",
            Event::Unaway { .. } => "unaway",
            Event::ChgHost { .. } => "chghost",
            Event::Invite { .. } => "invite",
            Event::Metadata { .. } => "metadata",
            Event::Ping { .. } => "ping",
            Event::Pong { .. } => "pong",
            Event::Error { .. } => "error",
        }
    }
}
