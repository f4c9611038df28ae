//! Per-command handlers.
//!
//! Every handler receives the parsed line and either updates state and
//! emits its events, or emits [`Event::Broken`] and leaves state alone.
//! Nothing here returns an error.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use super::{DisconnectReason, Event, Network, WhoisReply};
use crate::channel::Channel;
use crate::line::Line;
use crate::mode::ParamMode;
use crate::mode_help;
use crate::numeric::*;
use crate::outbound::{self, Priority, CTCP_DELIM};
use crate::user::User;

/// Unix timestamp as sent in 329/333/317/367.
fn unix_time(s: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = s.parse().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

impl Network {
    pub(super) fn dispatch(&mut self, line: Arc<Line>, now: Instant) {
        match line.numeric() {
            RAW_PING => self.on_ping(line),
            RAW_PONG => self.on_pong(line, now),
            RAW_JOIN => self.on_join(line),
            RAW_PART => self.on_part(line),
            RAW_KICK => self.on_kick(line),
            RAW_QUIT => self.on_quit(line),
            RAW_NICK => self.on_nick(line),
            RAW_MODE => self.on_mode(line),
            RAW_TOPIC => self.on_topic(line),
            RAW_PRIVMSG => self.on_privmsg(line),
            RAW_NOTICE => self.on_notice(line),
            RAW_CAP => self.on_cap(line, now),
            RAW_AWAY => self.on_away_notify(line),
            RAW_CHGHOST => self.on_chghost(line),
            RAW_INVITE => self.on_invite(line),
            RAW_METADATA => self.on_metadata(line),
            RAW_UNKNOWN if line.command().eq_ignore_ascii_case("ERROR") => self.on_error(line),
            RAW_UNKNOWN => self.emit(Event::Unknown { line }),

            WELCOME => self.on_welcome(line, now),
            YOURHOST | CREATED => self.emit(Event::Info { line }),
            MYINFO => self.on_myinfo(line),
            ISUPPORT => self.on_isupport(line),

            AWAY => self.on_rpl_away(line),
            UNAWAY => self.on_self_away(line, false),
            NOWAWAY => self.on_self_away(line, true),

            n if is_whois(n) => self.on_whois(line),

            MODEINFO => self.on_mode_info(line),
            CREATIONTIME => self.on_creation_time(line),
            NOTOPIC => self.on_no_topic(line),
            TOPICINFO => self.on_topic_info(line),
            TOPICWHOTIME => self.on_topic_who_time(line),

            BAN => self.on_list_entry(line, 'b'),
            EXCEPTION => self.on_list_entry(line, 'e'),
            INVITELIST => self.on_list_entry(line, 'I'),
            ENDOFBANS => self.on_end_of_list(line, 'b'),
            ENDOFEXCEPTS => self.on_end_of_list(line, 'e'),
            ENDOFINVITELIST => self.on_end_of_list(line, 'I'),

            WHOREPLY => self.on_who_reply(line),
            ENDOFWHO => self.emit(Event::EndOfWho { line }),
            NAMREPLY => self.on_names(line),
            ENDOFNAMES => {
                let channel = line.parameter(1).unwrap_or_default().to_string();
                self.emit(Event::EndOfNames { line, channel });
            }

            MOTDBEGIN | MOTD | MOTDEND => {
                let text = line.text().to_string();
                self.emit(Event::Motd { line, text });
            }

            ERR_INVALIDCAPCMD => {
                warn!(text = line.text(), "server rejected a CAP subcommand");
                self.abandon_caps(now);
                self.emit(Event::Unknown { line });
            }
            UNKNOWN => self.emit(Event::NumericUnknown { line }),
            NICKUSED | NICKISNOTAVAILABLE => self.on_nick_used(line),

            _ => self.emit(Event::Unknown { line }),
        }
    }

    /// Report a line that could not be applied.
    pub(super) fn broken(&mut self, line: Arc<Line>, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(numeric = line.numeric(), %reason, raw = line.raw(), "broken line");
        self.emit(Event::Broken { line, reason });
    }

    fn source_user(line: &Line) -> User {
        line.user().cloned().unwrap_or_default()
    }

    fn on_ping(&mut self, line: Arc<Line>) {
        let reply = match line.parameters().first() {
            Some(token) => format!("PONG :{}", token),
            None if line.has_text() => format!("PONG :{}", line.text()),
            None => "PONG".to_string(),
        };
        self.send(reply, Priority::RealTime);
        self.emit(Event::Ping { line });
    }

    fn on_pong(&mut self, line: Arc<Line>, now: Instant) {
        let payload = line.last_argument().unwrap_or_default();
        let lag = self.lag_from_payload(payload, now);
        if lag.is_some() {
            self.lag_ms = lag;
        }
        self.emit(Event::Pong { line, lag });
    }

    fn on_error(&mut self, line: Arc<Line>) {
        let message = line.last_argument().unwrap_or_default().to_string();
        warn!(%message, "server sent ERROR");
        self.emit(Event::Error {
            line,
            message: message.clone(),
        });
        self.transport_closed(DisconnectReason::ServerError(message));
    }

    fn on_welcome(&mut self, line: Arc<Line>, now: Instant) {
        if let Some(nick) = line.parameter(0) {
            self.local_user.nick = nick.to_string();
        }
        self.mark_logged_in(now);
        info!(nick = %self.local_user.nick, "logged in");
        self.emit(Event::Welcome { line });
    }

    fn on_myinfo(&mut self, line: Arc<Line>) {
        let params = line.parameters();
        if params.len() < 3 {
            return self.broken(line, "RPL_MYINFO with fewer than 3 parameters");
        }
        self.server.name = params[1].clone();
        self.server.version = params[2].clone();
        self.server.user_modes = params.get(3).cloned().unwrap_or_default();
        self.server.channel_modes = params.get(4).cloned().unwrap_or_default();
        self.channel_mode_help = mode_help::channel_mode_help(&self.server.version);
        debug!(server = %self.server.name, version = %self.server.version, "server info");

        if self.config.auto_identify && !self.config.services_password.is_empty() {
            let identify = outbound::identify(
                &self.config.identify_template,
                &self.local_user.nick,
                &self.config.services_password,
            );
            self.send(identify, Priority::High);
        }
        for channel in self.config.autojoin.clone() {
            self.send(outbound::join(&channel, None), Priority::Normal);
        }

        self.emit(Event::ServerInfo { line });
    }

    fn on_nick_used(&mut self, line: Arc<Line>) {
        let nick = line.parameter(1).unwrap_or_default().to_string();
        if self.logged_in() {
            debug!(%nick, "nick collision");
            return self.emit(Event::NickCollision { line, nick });
        }
        let candidate = self.next_nick_candidate();
        info!(taken = %nick, trying = %candidate, "nick in use during registration");
        self.local_user.nick.clone_from(&candidate);
        self.send(outbound::nick(&candidate), Priority::High);
        self.emit(Event::NickCollision { line, nick });
    }

    fn on_join(&mut self, line: Arc<Line>) {
        let name = match line.parameter(0) {
            Some(name) => name.to_string(),
            None if !line.text().is_empty() => line.text().to_string(),
            None => return self.broken(line, "JOIN without channel"),
        };
        let mut user = Self::source_user(&line);
        // extended-join: JOIN #chan account :realname
        if line.parameters().len() >= 2 && line.has_text() {
            user.realname = line.text().to_string();
        }

        if self.is_self(&user.nick) {
            self.local_user.ident.clone_from(&user.ident);
            self.local_user.host.clone_from(&user.host);
            let key = self.channel_key(&name);
            if self.channels.contains_key(&key) {
                debug!(channel = %name, "server joined us to a channel we are already in");
            } else {
                let mut channel = Channel::with_casemapping(name.clone(), self.casemapping);
                channel.insert_user(&self.local_user);
                self.channels.insert(key, channel.clone());
                info!(channel = %name, "joined");
                self.emit(Event::SelfJoin {
                    line: Arc::clone(&line),
                    channel,
                });
            }
        } else {
            match self.channel_mut(&name) {
                Some(channel) => {
                    channel.insert_user(&user);
                }
                None => {
                    debug!(channel = %name, nick = %user.nick, "join to unknown channel");
                    return self.broken(line, format!("JOIN for unknown channel {}", name));
                }
            }
        }
        self.emit(Event::Join {
            line,
            channel: name,
            user,
        });
    }

    fn on_part(&mut self, line: Arc<Line>) {
        let (name, reason) = match line.parameter(0) {
            Some(name) => (name.to_string(), line.text().to_string()),
            None if !line.text().is_empty() => (line.text().to_string(), String::new()),
            None => return self.broken(line, "PART without channel"),
        };
        let user = Self::source_user(&line);

        if self.is_self(&user.nick) {
            let key = self.channel_key(&name);
            match self.channels.remove(&key) {
                Some(channel) => {
                    info!(channel = %name, "parted");
                    self.emit(Event::SelfPart {
                        line: Arc::clone(&line),
                        channel,
                    });
                }
                None => return self.broken(line, format!("PART from unknown channel {}", name)),
            }
        } else {
            match self.channel_mut(&name) {
                Some(channel) => {
                    if channel.remove_user(&user.nick).is_none() {
                        debug!(channel = %name, nick = %user.nick, "part by user not in roster");
                    }
                }
                None => return self.broken(line, format!("PART from unknown channel {}", name)),
            }
        }
        self.emit(Event::Part {
            line,
            channel: name,
            user,
            reason,
        });
    }

    fn on_kick(&mut self, line: Arc<Line>) {
        let params = line.parameters();
        if params.len() < 2 {
            return self.broken(line, "KICK with fewer than 2 parameters");
        }
        let name = params[0].clone();
        let target = params[1].clone();
        let reason = line.text().to_string();
        let by = Self::source_user(&line);

        if self.is_self(&target) {
            let key = self.channel_key(&name);
            match self.channels.remove(&key) {
                Some(channel) => {
                    info!(channel = %name, by = %by.nick, "kicked");
                    self.emit(Event::SelfKick {
                        line: Arc::clone(&line),
                        channel,
                        by: by.clone(),
                        reason: reason.clone(),
                    });
                }
                None => return self.broken(line, format!("KICK from unknown channel {}", name)),
            }
        } else {
            match self.channel_mut(&name) {
                Some(channel) => {
                    channel.remove_user(&target);
                }
                None => return self.broken(line, format!("KICK from unknown channel {}", name)),
            }
        }
        self.emit(Event::Kick {
            line,
            channel: name,
            by,
            target,
            reason,
        });
    }

    fn on_quit(&mut self, line: Arc<Line>) {
        let user = Self::source_user(&line);
        let reason = line.text().to_string();
        let mut left = Vec::new();
        for channel in self.channels.values_mut() {
            if channel.remove_user(&user.nick).is_some() {
                left.push(channel.name().to_string());
            }
        }
        for channel in left {
            self.emit(Event::PerChannelQuit {
                line: Arc::clone(&line),
                channel,
                user: user.clone(),
            });
        }
        self.emit(Event::Quit { line, user, reason });
    }

    fn on_nick(&mut self, line: Arc<Line>) {
        let new = match line.parameter(0) {
            Some(nick) => nick.to_string(),
            None if !line.text().is_empty() => line.text().to_string(),
            None => return self.broken(line, "NICK without new nick"),
        };
        let old = line.source_nick().to_string();
        for channel in self.channels.values_mut() {
            channel.change_nick(&old, &new);
        }
        let echoed = match &self.rt.renamed_from {
            Some(previous) => self.casemapping.equals(previous, &old) && self.is_self(&new),
            None => false,
        };
        if echoed {
            self.rt.renamed_from = None;
        }
        let is_self = echoed || self.is_self(&old);
        if is_self {
            info!(%old, %new, "nick changed");
            self.local_user.nick.clone_from(&new);
        }
        self.emit(Event::Nick {
            line,
            old,
            new,
            is_self,
        });
    }

    fn on_topic(&mut self, line: Arc<Line>) {
        let Some(name) = line.parameter(0).map(str::to_string) else {
            return self.broken(line, "TOPIC without channel");
        };
        let setter = line.source().unwrap_or_default().to_string();
        let time = line.time();
        let topic = line.text().to_string();
        let Some(channel) = self.channel_mut(&name) else {
            return self.broken(line, format!("TOPIC for unknown channel {}", name));
        };
        let old_topic = channel.set_topic(topic);
        channel.topic_set_by = setter;
        channel.topic_set_at = Some(time);
        self.emit(Event::Topic {
            line,
            channel: name,
            old_topic,
        });
    }

    fn on_topic_info(&mut self, line: Arc<Line>) {
        let Some(name) = line.parameter(1).map(str::to_string) else {
            return self.broken(line, "RPL_TOPIC without channel");
        };
        let topic = line.text().to_string();
        let Some(channel) = self.channel_mut(&name) else {
            return self.broken(line, format!("RPL_TOPIC for unknown channel {}", name));
        };
        let old_topic = channel.set_topic(topic);
        self.emit(Event::TopicInfo {
            line,
            channel: name,
            old_topic,
        });
    }

    fn on_topic_who_time(&mut self, line: Arc<Line>) {
        let params = line.parameters();
        if params.len() < 3 {
            return self.broken(line, "RPL_TOPICWHOTIME with fewer than 3 parameters");
        }
        let name = params[1].clone();
        let setter = params[2].clone();
        let stamp = params.get(3).map(String::as_str).unwrap_or(line.text());
        let time = unix_time(stamp);
        let Some(channel) = self.channel_mut(&name) else {
            return self.broken(line, format!("RPL_TOPICWHOTIME for unknown channel {}", name));
        };
        channel.topic_set_by = setter;
        channel.topic_set_at = time;
        self.emit(Event::TopicWhoTime { line, channel: name });
    }

    fn on_no_topic(&mut self, line: Arc<Line>) {
        let name = line.parameter(1).unwrap_or_default().to_string();
        if let Some(channel) = self.channel_mut(&name) {
            channel.set_topic(String::new());
        }
        self.emit(Event::NoTopic { line, channel: name });
    }

    fn on_privmsg(&mut self, line: Arc<Line>) {
        let Some(target) = line.parameter(0).map(str::to_string) else {
            return self.broken(line, "PRIVMSG without target");
        };
        let user = Self::source_user(&line);
        let text = line.text();

        if let Some(body) = text.strip_prefix(CTCP_DELIM) {
            let body = body.strip_suffix(CTCP_DELIM).unwrap_or(body);
            let (command, parameters) = body.split_once(' ').unwrap_or((body, ""));
            let command = command.to_string();
            let parameters = parameters.to_string();
            return self.emit(Event::Ctcp {
                line,
                target,
                user,
                command,
                parameters,
            });
        }

        let text = text.to_string();
        self.emit(Event::Privmsg {
            line,
            target,
            user,
            text,
        });
    }

    fn on_notice(&mut self, line: Arc<Line>) {
        let target = line.parameter(0).unwrap_or_default().to_string();
        let user = Self::source_user(&line);
        let text = line.text().to_string();
        self.emit(Event::Notice {
            line,
            target,
            user,
            text,
        });
    }

    fn on_cap(&mut self, line: Arc<Line>, now: Instant) {
        if line.parameters().len() < 2 {
            return self.broken(line, "CAP with fewer than 2 parameters");
        }
        let actions = self.caps.feed(line.parameters(), line.text());
        self.apply_cap_actions(actions, now);
        let subcommand = line.parameters()[1].to_ascii_uppercase();
        self.emit(Event::Cap { line, subcommand });
    }

    /// Set the away state of `nick` everywhere we see them. Returns the
    /// updated user if the flag flipped anywhere.
    fn update_away(&mut self, nick: &str, away: bool, message: &str) -> Option<User> {
        let mut flipped = None;
        if self.is_self(nick) {
            if self.local_user.is_away != away {
                flipped = Some(self.local_user.clone());
            }
            self.local_user.is_away = away;
            self.local_user.away_message = message.to_string();
        }
        for channel in self.channels.values_mut() {
            if let Some(user) = channel.user_mut(nick) {
                let changed = user.is_away != away;
                user.is_away = away;
                user.away_message = message.to_string();
                if changed && flipped.is_none() {
                    flipped = Some(user.clone());
                }
            }
        }
        flipped.map(|mut user| {
            user.is_away = away;
            user.away_message = message.to_string();
            user
        })
    }

    fn on_away_notify(&mut self, line: Arc<Line>) {
        let nick = line.source_nick().to_string();
        let message = line.text().to_string();
        let away = !message.is_empty();
        if let Some(user) = self.update_away(&nick, away, &message) {
            self.emit(Event::AwayChanged { line, user });
        }
    }

    /// 301, seen in WHOIS replies and when messaging an away user.
    fn on_rpl_away(&mut self, line: Arc<Line>) {
        let Some(nick) = line.parameter(1).map(str::to_string) else {
            return self.broken(line, "RPL_AWAY without nick");
        };
        let message = line.text().to_string();
        if let Some(user) = self.update_away(&nick, true, &message) {
            self.emit(Event::AwayChanged { line, user });
        }
    }

    fn on_self_away(&mut self, line: Arc<Line>, away: bool) {
        let nick = self.local_user.nick.clone();
        let message = if away {
            self.local_user.away_message.clone()
        } else {
            String::new()
        };
        if self.update_away(&nick, away, &message).is_none() {
            return;
        }
        if away {
            self.emit(Event::NowAway { line });
        } else {
            self.emit(Event::Unaway { line });
        }
    }

    fn on_chghost(&mut self, line: Arc<Line>) {
        let params = line.parameters();
        let (ident, host) = match (params.first(), params.get(1)) {
            (Some(ident), Some(host)) => (ident.clone(), host.clone()),
            (Some(ident), None) if line.has_text() => (ident.clone(), line.text().to_string()),
            _ => return self.broken(line, "CHGHOST without ident and host"),
        };
        let source = Self::source_user(&line);
        let nick = source.nick.clone();

        if self.is_self(&nick) {
            self.local_user.ident.clone_from(&ident);
            self.local_user.host.clone_from(&host);
        }
        for channel in self.channels.values_mut() {
            if let Some(user) = channel.user_mut(&nick) {
                user.ident.clone_from(&ident);
                user.host.clone_from(&host);
            }
        }

        let user = User {
            ident,
            host,
            ..source.clone()
        };
        self.emit(Event::ChgHost {
            line,
            user,
            old_ident: source.ident,
            old_host: source.host,
        });
    }

    fn on_invite(&mut self, line: Arc<Line>) {
        let target = line.parameter(0).unwrap_or_default().to_string();
        let channel = match line.parameter(1) {
            Some(channel) => channel.to_string(),
            None if line.has_text() => line.text().to_string(),
            None => return self.broken(line, "INVITE without channel"),
        };
        let user = Self::source_user(&line);
        self.emit(Event::Invite {
            line,
            user,
            target,
            channel,
        });
    }

    fn on_metadata(&mut self, line: Arc<Line>) {
        let params = line.parameters();
        if params.len() < 2 {
            return self.broken(line, "METADATA with fewer than 2 parameters");
        }
        let target = params[0].clone();
        let key = params[1].clone();
        let value = line.text().to_string();
        self.emit(Event::Metadata {
            line,
            target,
            key,
            value,
        });
    }

    fn on_names(&mut self, line: Arc<Line>) {
        // 353 me [=*@] #chan :[prefixes]nick ...
        let Some(name) = line.parameters().last().filter(|_| line.parameters().len() >= 2).cloned() else {
            return self.broken(line, "RPL_NAMREPLY without channel");
        };

        let (users, nameless): (Vec<User>, Vec<User>) = line
            .text()
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(|token| self.parse_names_entry(token))
            .partition(|user| !user.nick.is_empty());
        if !nameless.is_empty() {
            self.broken(Arc::clone(&line), "RPL_NAMREPLY entry without nick");
        }

        match self.channel_mut(&name) {
            Some(channel) => {
                for user in &users {
                    match channel.user_mut(&user.nick) {
                        Some(existing) => {
                            existing.channel_user_modes.clone_from(&user.channel_user_modes);
                            existing.channel_prefixes.clone_from(&user.channel_prefixes);
                            if !user.ident.is_empty() {
                                existing.ident.clone_from(&user.ident);
                            }
                            if !user.host.is_empty() {
                                existing.host.clone_from(&user.host);
                            }
                        }
                        None => {
                            channel.insert_user(user);
                        }
                    }
                }
            }
            None => debug!(channel = %name, "names for a channel we are not in"),
        }

        self.emit(Event::Names {
            line,
            channel: name,
            users,
        });
    }

    fn on_who_reply(&mut self, line: Arc<Line>) {
        // 352 me #chan ident host server nick flags :hops realname
        let params = line.parameters();
        if params.len() < 7 {
            return self.broken(line, "RPL_WHOREPLY with fewer than 7 parameters");
        }
        let name = params[1].clone();
        let (hops, realname) = line.text().split_once(' ').unwrap_or((line.text(), ""));
        let reply = User {
            nick: params[5].clone(),
            ident: params[2].clone(),
            host: params[3].clone(),
            server_name: params[4].clone(),
            realname: realname.to_string(),
            hops: hops.parse().unwrap_or(0),
            is_away: params[6].starts_with('G'),
            ..User::default()
        };

        let tracked = self.channel_mut(&name).and_then(|channel| channel.user_mut(&reply.nick));
        let user = match tracked {
            Some(user) => {
                user.ident.clone_from(&reply.ident);
                user.host.clone_from(&reply.host);
                user.server_name.clone_from(&reply.server_name);
                user.realname.clone_from(&reply.realname);
                user.hops = reply.hops;
                user.is_away = reply.is_away;
                user.clone()
            }
            None => reply,
        };
        self.emit(Event::WhoReply {
            line,
            channel: name,
            user,
        });
    }

    fn on_whois(&mut self, line: Arc<Line>) {
        let Some(nick) = line.parameter(1).map(str::to_string) else {
            return self.broken(line, "WHOIS reply without nick");
        };
        let text = line.text().to_string();
        let reply = match line.numeric() {
            WHOISUSER => {
                let params = line.parameters();
                if params.len() < 4 {
                    return self.broken(line, "RPL_WHOISUSER with fewer than 4 parameters");
                }
                WhoisReply::User(User {
                    nick,
                    ident: params[2].clone(),
                    host: params[3].clone(),
                    realname: text,
                    ..User::default()
                })
            }
            WHOISSERVER => WhoisReply::Server {
                nick,
                server: line.parameter(2).unwrap_or_default().to_string(),
                info: text,
            },
            WHOISOPERATOR => WhoisReply::Operator { nick },
            WHOISIDLE => WhoisReply::Idle {
                nick,
                seconds: line.parameter(2).and_then(|s| s.parse().ok()).unwrap_or(0),
                signon: line.parameter(3).and_then(unix_time),
            },
            WHOISCHANNELS => WhoisReply::Channels {
                nick,
                channels: text.split_whitespace().map(str::to_string).collect(),
            },
            WHOISACCOUNT => WhoisReply::Account {
                nick,
                account: line.parameter(2).unwrap_or_default().to_string(),
            },
            WHOISREGNICK => WhoisReply::Registered { nick },
            WHOISHOST => WhoisReply::Host { nick, text },
            WHOISMODES => WhoisReply::Modes { nick, text },
            WHOISSECURE => WhoisReply::Secure { nick },
            WHOISSPECIAL => WhoisReply::Special { nick, text },
            _ => WhoisReply::End { nick },
        };
        self.emit(Event::Whois { line, reply });
    }

    fn on_creation_time(&mut self, line: Arc<Line>) {
        let params = line.parameters();
        let (Some(name), Some(time)) = (params.get(1).cloned(), params.get(2).and_then(|s| unix_time(s))) else {
            return self.broken(line, "RPL_CREATIONTIME without channel or time");
        };
        match self.channel_mut(&name) {
            Some(channel) => channel.created_at = Some(time),
            None => debug!(channel = %name, "creation time for a channel we are not in"),
        }
        self.emit(Event::CreationTime {
            line,
            channel: name,
            time,
        });
    }

    fn on_list_entry(&mut self, line: Arc<Line>, letter: char) {
        // 367 me #chan mask [setter [time]]
        let params = line.parameters();
        if params.len() < 3 {
            return self.broken(line, "list reply with fewer than 3 parameters");
        }
        let name = params[1].clone();
        let set_by = params.get(3).map(|s| User::from_source(s));
        let set_at = params.get(4).and_then(|s| unix_time(s)).unwrap_or_else(|| line.time());
        let mode = ParamMode::new(letter, params[2].clone(), set_by, set_at);

        let Some(channel) = self.channel_mut(&name) else {
            return self.broken(line, format!("list reply for unknown channel {}", name));
        };
        channel.set_pmode(mode.clone());
        self.emit(Event::ListEntry {
            line,
            channel: name,
            mode,
        });
    }

    fn on_end_of_list(&mut self, line: Arc<Line>, letter: char) {
        let channel = line.parameter(1).unwrap_or_default().to_string();
        self.emit(Event::EndOfList { line, channel, letter });
    }
}
