//! Users and their per-channel decorations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// A user as seen by the client: identity, presence and, when stored in a
/// channel roster, the rank modes held in that channel.
///
/// `channel_prefixes` and `channel_user_modes` are parallel lists. Index 0 is
/// the highest rank held, as long as callers keep them sorted against the
/// server's rank order (see [`mode_helper::sort_cu_modes`](crate::mode_helper::sort_cu_modes)).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub nick: String,
    pub ident: String,
    pub host: String,
    pub realname: String,
    /// Server the user is connected to, as reported by WHO/WHOIS.
    pub server_name: String,
    pub hops: u32,
    pub is_away: bool,
    pub away_message: String,
    pub channel_prefixes: Vec<char>,
    pub channel_user_modes: Vec<char>,
}

impl User {
    /// Build a user from a `nick!ident@host` source.
    ///
    /// Never fails: without `!` the whole string is the nick, without `@` the
    /// remainder after `!` is the ident and the host stays empty.
    pub fn from_source(source: &str) -> Self {
        let (nick, rest) = match source.split_once('!') {
            Some((nick, rest)) => (nick, Some(rest)),
            None => (source, None),
        };
        let (ident, host) = match rest {
            Some(rest) => match rest.split_once('@') {
                Some((ident, host)) => (ident, host),
                None => (rest, ""),
            },
            None => ("", ""),
        };
        Self {
            nick: nick.to_string(),
            ident: ident.to_string(),
            host: host.to_string(),
            ..Self::default()
        }
    }

    /// Convenience constructor for a bare nick.
    pub fn with_nick(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            ..Self::default()
        }
    }

    /// The first rank mode held, or `None` when the user holds none.
    pub fn highest_cu_mode(&self) -> Option<char> {
        self.channel_user_modes.first().copied()
    }

    /// The display prefix belonging to [`highest_cu_mode`](Self::highest_cu_mode).
    pub fn highest_prefix(&self) -> Option<char> {
        self.channel_prefixes.first().copied()
    }

    /// Nick decorated with the highest display prefix, e.g. `@alice`.
    pub fn prefixed_nick(&self) -> String {
        match self.highest_prefix() {
            Some(prefix) => format!("{}{}", prefix, self.nick),
            None => self.nick.clone(),
        }
    }

    pub fn has_cu_mode(&self, mode: char) -> bool {
        self.channel_user_modes.contains(&mode)
    }

    /// Copy the mutable fields of `other` onto `self`, keeping the nick.
    pub(crate) fn merge_from(&mut self, other: &User) {
        self.ident.clone_from(&other.ident);
        self.host.clone_from(&other.host);
        self.realname.clone_from(&other.realname);
        self.server_name.clone_from(&other.server_name);
        self.hops = other.hops;
        self.is_away = other.is_away;
        self.away_message.clone_from(&other.away_message);
        self.channel_prefixes.clone_from(&other.channel_prefixes);
        self.channel_user_modes.clone_from(&other.channel_user_modes);
    }

    /// Remove a rank mode and its prefix by value. Returns false if absent.
    pub(crate) fn remove_cu_mode(&mut self, mode: char) -> bool {
        match self.channel_user_modes.iter().position(|&m| m == mode) {
            Some(index) => {
                self.channel_user_modes.remove(index);
                if index < self.channel_prefixes.len() {
                    self.channel_prefixes.remove(index);
                }
                true
            }
            None => false,
        }
    }

    /// Drop every per-channel decoration.
    pub fn reset_cu_modes(&mut self) {
        self.channel_prefixes.clear();
        self.channel_user_modes.clear();
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nick)?;
        if !self.ident.is_empty() {
            write!(f, "!{}", self.ident)?;
        }
        if !self.host.is_empty() {
            write!(f, "@{}", self.host)?;
        }
        Ok(())
    }
}

impl Snapshot for User {
    const KIND: &'static str = "user";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_full_source() {
        let user = User::from_source("alice!al@example.org");
        assert_eq!(user.nick, "alice");
        assert_eq!(user.ident, "al");
        assert_eq!(user.host, "example.org");
        assert_eq!(user.to_string(), "alice!al@example.org");
    }

    #[test]
    fn test_from_bare_nick() {
        let user = User::from_source("irc.example.com");
        assert_eq!(user.nick, "irc.example.com");
        assert!(user.ident.is_empty());
        assert!(user.host.is_empty());
    }

    #[test]
    fn test_from_source_without_host() {
        let user = User::from_source("bob!b");
        assert_eq!(user.nick, "bob");
        assert_eq!(user.ident, "b");
        assert_eq!(user.host, "");
    }

    #[test]
    fn test_highest_cu_mode() {
        let mut user = User::with_nick("carol");
        assert_eq!(user.highest_cu_mode(), None);
        assert_eq!(user.prefixed_nick(), "carol");

        user.channel_user_modes = vec!['o', 'v'];
        user.channel_prefixes = vec!['@', '+'];
        assert_eq!(user.highest_cu_mode(), Some('o'));
        assert_eq!(user.prefixed_nick(), "@carol");

        assert!(user.remove_cu_mode('o'));
        assert_eq!(user.channel_prefixes, vec!['+']);
        assert!(!user.remove_cu_mode('h'));
    }
}
