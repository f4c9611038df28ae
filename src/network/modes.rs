//! `MODE`, `RPL_CHANNELMODEIS` and `ISUPPORT`: everything that reads or
//! writes the mode taxonomies.

use std::sync::Arc;

use tracing::debug;

use super::{Event, Network};
use crate::isupport::Isupport;
use crate::line::Line;
use crate::mode::{ParamMode, SingleMode};
use crate::mode_helper::{mode_for_prefix, prefix_for_mode, rank_of, sort_cu_modes};
use crate::user::User;

impl Network {
    /// Letters that consume a parameter in the given direction.
    fn takes_parameter(&self, letter: char, including: bool) -> bool {
        self.cu_modes.contains(&letter)
            || self.cp_modes.contains(&letter)
            || self.cr_modes.contains(&letter)
            || (including && self.cc_modes.contains(&letter))
    }

    /// The part of a delta that describes channel flags: rank and list
    /// letters are stripped, signs are kept.
    fn static_part(&self, delta: &str) -> String {
        delta
            .chars()
            .filter(|c| !self.cu_modes.contains(c) && !self.cp_modes.contains(c))
            .collect()
    }

    pub(super) fn on_mode(&mut self, line: Arc<Line>) {
        let params = line.parameters();
        let Some(target) = params.first().cloned() else {
            return self.broken(line, "MODE without target");
        };
        let mut args: Vec<String> = params[1..].to_vec();
        args.extend(line.text().split(' ').filter(|s| !s.is_empty()).map(str::to_string));
        if args.is_empty() {
            return self.broken(line, "MODE without mode string");
        }
        let delta = args.remove(0);

        if self.is_self(&target) {
            self.user_mode.apply_delta(&delta, true);
            let mode = self.user_mode.clone();
            self.emit(Event::UserMode {
                line: Arc::clone(&line),
                mode,
            });
        } else if self.is_channel_name(&target) {
            self.apply_channel_mode(&line, &target, &delta, &args);
        } else {
            debug!(%target, "mode change for a user that is not us");
        }

        self.emit(Event::Mode { line, target });
    }

    fn apply_channel_mode(&mut self, line: &Arc<Line>, name: &str, delta: &str, args: &[String]) {
        let flags = self.static_part(delta);
        let Some(channel) = self.channel_mut(name) else {
            return self.broken(Arc::clone(line), format!("MODE for unknown channel {}", name));
        };
        channel.static_mode.apply_delta(&flags, true);

        let list = SingleMode::to_mode_list_with(delta, args, |letter, including| {
            self.takes_parameter(letter, including)
        });
        if let Some(letter) = list.missing_parameter {
            self.broken(
                Arc::clone(line),
                format!("mode {} in {:?} is missing its parameter", letter, delta),
            );
        }

        for single in list {
            if self.cu_modes.contains(&single.letter) {
                self.apply_cu_mode(line, name, single);
            } else if self.cp_modes.contains(&single.letter) {
                self.apply_param_mode(line, name, single);
            }
        }
    }

    /// Grant or revoke a rank.
    ///
    /// A grant above the user's current highest rank (or to a user with
    /// none) is a primary change and goes to the front. Anything else is a
    /// submode change and the lists are re-sorted. Revoking the highest
    /// rank is primary, revoking another one is a submode change.
    fn apply_cu_mode(&mut self, line: &Arc<Line>, name: &str, single: SingleMode) {
        let Some(nick) = single.parameter.clone() else {
            return self.broken(Arc::clone(line), format!("mode {} without nick", single.letter));
        };
        let letter = single.letter;
        let cu_modes = self.cu_modes.clone();
        let prefix = prefix_for_mode(&cu_modes, &self.channel_user_prefixes, letter).unwrap_or(letter);

        let Some(user) = self.channel_mut(name).and_then(|c| c.user_mut(&nick)) else {
            return self.broken(
                Arc::clone(line),
                format!("mode {} for {} who is not in {}", letter, nick, name),
            );
        };

        let primary = if single.including {
            if user.has_cu_mode(letter) {
                return;
            }
            let new_rank = rank_of(&cu_modes, letter);
            let current = user.highest_cu_mode().and_then(|m| rank_of(&cu_modes, m));
            let primary = match (new_rank, current) {
                (_, None) => true,
                (Some(new), Some(cur)) => new < cur,
                (None, Some(_)) => false,
            };
            if primary {
                user.channel_user_modes.insert(0, letter);
                user.channel_prefixes.insert(0, prefix);
            } else {
                user.channel_user_modes.push(letter);
                user.channel_prefixes.push(prefix);
                sort_cu_modes(&cu_modes, &mut user.channel_user_modes, &mut user.channel_prefixes);
            }
            primary
        } else if user.highest_cu_mode() == Some(letter) {
            user.channel_user_modes.remove(0);
            if !user.channel_prefixes.is_empty() {
                user.channel_prefixes.remove(0);
            }
            true
        } else if user.remove_cu_mode(letter) {
            false
        } else {
            return;
        };

        let user = user.clone();
        let line = Arc::clone(line);
        let channel = name.to_string();
        if primary {
            self.emit(Event::CUModeChanged {
                line,
                channel,
                user,
                mode: single,
            });
        } else {
            self.emit(Event::CUSubModeChanged {
                line,
                channel,
                user,
                mode: single,
            });
        }
    }

    /// Add or remove a ban, exception or invite entry.
    fn apply_param_mode(&mut self, line: &Arc<Line>, name: &str, single: SingleMode) {
        let Some(parameter) = single.parameter else {
            return self.broken(Arc::clone(line), format!("mode {} without mask", single.letter));
        };
        let mode = ParamMode::new(single.letter, parameter, line.user().cloned(), line.time());
        let Some(channel) = self.channel_mut(name) else {
            return;
        };
        let channel_name = name.to_string();
        if single.including {
            if channel.set_pmode(mode.clone()) {
                self.emit(Event::PModeInserted {
                    line: Arc::clone(line),
                    channel: channel_name,
                    mode,
                });
            }
        } else if channel.remove_pmode(mode.letter, &mode.parameter) {
            self.emit(Event::PModeRemoved {
                line: Arc::clone(line),
                channel: channel_name,
                mode,
            });
        }
    }

    /// 324: the channel's current flags, e.g. `+ntk key`.
    pub(super) fn on_mode_info(&mut self, line: Arc<Line>) {
        let params = line.parameters();
        if params.len() < 3 {
            return self.broken(line, "RPL_CHANNELMODEIS with fewer than 3 parameters");
        }
        let name = params[1].clone();
        let flags = self.static_part(&params[2]);
        match self.channel_mut(&name) {
            Some(channel) => {
                channel.static_mode.clear();
                channel.static_mode.apply_delta(&flags, true);
            }
            None => return self.broken(line, format!("RPL_CHANNELMODEIS for unknown channel {}", name)),
        }
        self.emit(Event::ModeInfo { line, channel: name });
    }

    pub(super) fn on_isupport(&mut self, line: Arc<Line>) {
        let Some(isupport) = Isupport::from_line(&line) else {
            return self.broken(line, "ISUPPORT without tokens");
        };
        let mut problems = Vec::new();

        match isupport.prefix() {
            Some(Ok(prefix)) => {
                self.cu_modes = prefix.mode_letters();
                self.channel_user_prefixes = prefix.prefix_chars();
            }
            Some(Err(raw)) => problems.push(format!("unusable PREFIX token {:?}", raw)),
            None => {}
        }
        match isupport.chanmodes() {
            Some(Ok(groups)) => {
                self.cp_modes = groups.a.chars().collect();
                self.cr_modes = groups.b.chars().collect();
                self.cc_modes = groups.c.chars().collect();
                self.c_modes = groups.d.chars().collect();
            }
            Some(Err(raw)) => problems.push(format!("unusable CHANMODES token {:?}", raw)),
            None => {}
        }
        if let Some(network) = isupport.network() {
            self.network_name = network.to_string();
        }
        if let Some(statusmsg) = isupport.statusmsg() {
            self.statusmsg = statusmsg.chars().collect();
        }
        if let Some(chantypes) = isupport.chantypes() {
            self.chantypes = chantypes.chars().collect();
        }
        if let Some(casemapping) = isupport.casemapping() {
            self.set_casemapping(casemapping);
        }

        for reason in problems {
            self.broken(Arc::clone(&line), reason);
        }
        self.emit(Event::Isupport { line });
    }

    /// One `RPL_NAMREPLY` token: any number of rank prefixes, then a nick
    /// or, with `userhost-in-names`, a full `nick!ident@host`.
    pub(super) fn parse_names_entry(&self, token: &str) -> User {
        let mut modes = Vec::new();
        let mut prefixes = Vec::new();
        let mut rest = token;
        while let Some(c) = rest.chars().next() {
            match mode_for_prefix(&self.cu_modes, &self.channel_user_prefixes, c) {
                Some(mode) => {
                    modes.push(mode);
                    prefixes.push(c);
                    rest = &rest[c.len_utf8()..];
                }
                None => break,
            }
        }
        sort_cu_modes(&self.cu_modes, &mut modes, &mut prefixes);

        let mut user = User::from_source(rest);
        user.channel_user_modes = modes;
        user.channel_prefixes = prefixes;
        user
    }
}
