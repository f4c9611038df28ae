//! Channel state: topic, flags, list modes and the user roster.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::casemap::CaseMapping;
use crate::mode::{Mode, ParamMode};
use crate::snapshot::Snapshot;
use crate::user::User;

/// A joined channel.
///
/// The roster is keyed by the case-folded nick, folded with the channel's
/// [`CaseMapping`]. Users are owned by value: leaving the channel deletes
/// the entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub topic_set_by: String,
    #[serde(default)]
    pub topic_set_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub static_mode: Mode,
    #[serde(default)]
    param_modes: Vec<ParamMode>,
    #[serde(default)]
    users: HashMap<String, User>,
    #[serde(default)]
    casemapping: CaseMapping,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_casemapping(name, CaseMapping::default())
    }

    pub fn with_casemapping(name: impl Into<String>, casemapping: CaseMapping) -> Self {
        Self {
            name: name.into(),
            topic: String::new(),
            topic_set_by: String::new(),
            topic_set_at: None,
            created_at: None,
            static_mode: Mode::new(),
            param_modes: Vec::new(),
            users: HashMap::new(),
            casemapping,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name comparison under this channel's mapping.
    pub fn is_named(&self, name: &str) -> bool {
        self.casemapping.equals(&self.name, name)
    }

    fn key(&self, nick: &str) -> String {
        self.casemapping.to_lower(nick)
    }

    /// Switch case mapping and re-key the roster.
    pub fn set_casemapping(&mut self, casemapping: CaseMapping) {
        if casemapping == self.casemapping {
            return;
        }
        self.casemapping = casemapping;
        let users = std::mem::take(&mut self.users);
        self.users = users
            .into_values()
            .map(|u| (casemapping.to_lower(&u.nick), u))
            .collect();
    }

    /// Insert `candidate` or update the existing entry with the same nick.
    ///
    /// An existing entry keeps its identity; its mutable fields are
    /// overwritten from `candidate`. Returns the live entry.
    pub fn insert_user(&mut self, candidate: &User) -> &mut User {
        let key = self.key(&candidate.nick);
        let entry = self.users.entry(key).or_insert_with(|| User::with_nick(candidate.nick.clone()));
        entry.merge_from(candidate);
        entry
    }

    pub fn remove_user(&mut self, nick: &str) -> Option<User> {
        let key = self.key(nick);
        self.users.remove(&key)
    }

    pub fn contains_user(&self, nick: &str) -> bool {
        self.users.contains_key(&self.key(nick))
    }

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(&self.key(nick))
    }

    pub fn user_mut(&mut self, nick: &str) -> Option<&mut User> {
        let key = self.key(nick);
        self.users.get_mut(&key)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn users_mut(&mut self) -> impl Iterator<Item = &mut User> {
        self.users.values_mut()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn clear_users(&mut self) {
        self.users.clear();
    }

    /// Re-key a roster entry after a nick change.
    ///
    /// If `new` already names a different entry it is overwritten. Returns
    /// false when `old` is not in the roster.
    pub fn change_nick(&mut self, old: &str, new: &str) -> bool {
        let old_key = self.key(old);
        match self.users.remove(&old_key) {
            Some(mut user) => {
                user.nick = new.to_string();
                let new_key = self.key(new);
                self.users.insert(new_key, user);
                true
            }
            None => false,
        }
    }

    /// Add a list mode entry. Returns false if the same entry already exists.
    pub fn set_pmode(&mut self, mode: ParamMode) -> bool {
        if self.param_modes.iter().any(|m| m.same_entry(mode.letter, &mode.parameter)) {
            return false;
        }
        self.param_modes.push(mode);
        true
    }

    /// Remove a list mode entry. Returns false if there was none.
    pub fn remove_pmode(&mut self, letter: char, parameter: &str) -> bool {
        let before = self.param_modes.len();
        self.param_modes.retain(|m| !m.same_entry(letter, parameter));
        before != self.param_modes.len()
    }

    pub fn param_modes(&self) -> &[ParamMode] {
        &self.param_modes
    }

    /// Entries for one list mode letter.
    pub fn pmodes_of(&self, letter: char) -> impl Iterator<Item = &ParamMode> {
        self.param_modes.iter().filter(move |m| m.letter == letter)
    }

    pub fn bans(&self) -> Vec<&ParamMode> {
        self.pmodes_of('b').collect()
    }

    pub fn exceptions(&self) -> Vec<&ParamMode> {
        self.pmodes_of('e').collect()
    }

    pub fn invite_exceptions(&self) -> Vec<&ParamMode> {
        self.pmodes_of('I').collect()
    }

    /// Previous topic is returned so callers can diff.
    pub fn set_topic(&mut self, topic: impl Into<String>) -> String {
        std::mem::replace(&mut self.topic, topic.into())
    }
}

impl Snapshot for Channel {
    const KIND: &'static str = "channel";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_user_upserts() {
        let mut channel = Channel::new("#rust");
        channel.insert_user(&User::from_source("Alice!a@one"));
        let live = channel.insert_user(&User::from_source("alice!b@two"));
        assert_eq!(live.nick, "Alice");
        assert_eq!(live.ident, "b");
        assert_eq!(channel.user_count(), 1);
        assert_eq!(channel.user("ALICE").unwrap().host, "two");
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut channel = Channel::new("#Rust");
        channel.insert_user(&User::with_nick("Nick[1]"));
        assert!(channel.contains_user("nick{1}"));
        assert!(channel.is_named("#rust"));
        assert!(channel.remove_user("NICK{1}").is_some());
        assert_eq!(channel.user_count(), 0);
    }

    #[test]
    fn test_change_nick() {
        let mut channel = Channel::new("#rust");
        channel.insert_user(&User::with_nick("old"));
        assert!(channel.change_nick("OLD", "New"));
        assert!(channel.contains_user("new"));
        assert!(!channel.contains_user("old"));
        assert_eq!(channel.user("new").unwrap().nick, "New");
        assert!(!channel.change_nick("ghost", "x"));
    }

    #[test]
    fn test_pmode_uniqueness() {
        let mut channel = Channel::new("#rust");
        let now = Utc::now();
        assert!(channel.set_pmode(ParamMode::new('b', "*!*@spam", None, now)));
        assert!(!channel.set_pmode(ParamMode::new('b', "*!*@spam", None, now)));
        assert!(channel.set_pmode(ParamMode::new('e', "*!*@spam", None, now)));
        assert_eq!(channel.bans().len(), 1);
        assert_eq!(channel.exceptions().len(), 1);
        assert!(channel.remove_pmode('b', "*!*@spam"));
        assert!(!channel.remove_pmode('b', "*!*@spam"));
        assert!(channel.bans().is_empty());
    }

    #[test]
    fn test_casemapping_switch_rekeys() {
        let mut channel = Channel::new("#rust");
        channel.insert_user(&User::with_nick("a[b]"));
        channel.set_casemapping(CaseMapping::Ascii);
        assert!(channel.contains_user("A[B]"));
        assert!(!channel.contains_user("a{b}"));
    }
}
