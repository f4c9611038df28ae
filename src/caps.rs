//! IRCv3 capability negotiation.
//!
//! [`CapNegotiator`] is a sans-IO state machine: it is fed the `CAP` lines
//! the server sends and returns [`CapAction`]s for the caller to carry out.
//! It never blocks login; the caller abandons it when its grace period
//! expires.
//!
//! # Reference
//! - IRCv3 Capability Negotiation: <https://ircv3.net/specs/extensions/capability-negotiation>

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Capabilities this library knows how to use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Show all user prefix modes in NAMES
    MultiPrefix,
    /// Notify of away status changes
    AwayNotify,
    /// Notify of hostname changes
    ChgHost,
    /// Full nick!user@host in NAMES
    UserhostInNames,
    /// Notify of capability changes
    CapNotify,
    /// Server-time message tags
    ServerTime,
    /// Notify of channel invites
    InviteNotify,
    /// JOIN includes account + realname
    ExtendedJoin,
    /// Unknown/custom capability
    Custom(String),
}

impl AsRef<str> for Capability {
    fn as_ref(&self) -> &str {
        match self {
            Self::MultiPrefix => "multi-prefix",
            Self::AwayNotify => "away-notify",
            Self::ChgHost => "chghost",
            Self::UserhostInNames => "userhost-in-names",
            Self::CapNotify => "cap-notify",
            Self::ServerTime => "server-time",
            Self::InviteNotify => "invite-notify",
            Self::ExtendedJoin => "extended-join",
            Self::Custom(s) => s,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        match s {
            "multi-prefix" => Self::MultiPrefix,
            "away-notify" => Self::AwayNotify,
            "chghost" => Self::ChgHost,
            "userhost-in-names" => Self::UserhostInNames,
            "cap-notify" => Self::CapNotify,
            "server-time" => Self::ServerTime,
            "invite-notify" => Self::InviteNotify,
            "extended-join" => Self::ExtendedJoin,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// Capabilities requested when the configuration names none.
pub fn default_requested() -> Vec<String> {
    [
        Capability::MultiPrefix,
        Capability::AwayNotify,
        Capability::ChgHost,
        Capability::UserhostInNames,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

/// Name part of a `name=value` capability token.
fn cap_name(token: &str) -> &str {
    token.split('=').next().unwrap_or(token)
}

/// Where the negotiation stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapState {
    /// `CAP LS` not sent yet.
    #[default]
    Idle,
    /// Collecting `CAP LS` replies.
    Listing,
    /// `CAP REQ` sent, waiting for `ACK` or `NAK`.
    Requesting,
    /// `CAP END` sent.
    Finished,
    /// Given up: grace period expired or the server rejected a subcommand.
    Abandoned,
}

/// What the caller must do after feeding the negotiator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CapAction {
    /// Send this raw line to the server.
    Send(String),
    /// A desired capability the server does not offer.
    Unsupported(String),
    /// Negotiation is over, continue with standard login.
    Finished,
}

/// Sub-state machine for `CAP LS/REQ/ACK/NAK/END` plus `cap-notify`.
///
/// `supported`, `requested` and `subscribed` are independent sets: what the
/// server offers, what we asked for, and what the server granted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapNegotiator {
    desired: Vec<String>,
    supported: BTreeSet<String>,
    requested: BTreeSet<String>,
    subscribed: BTreeSet<String>,
    state: CapState,
}

impl CapNegotiator {
    #[must_use]
    pub fn new(desired: Vec<String>) -> Self {
        Self {
            desired,
            ..Self::default()
        }
    }

    pub fn state(&self) -> CapState {
        self.state
    }

    pub fn desired(&self) -> &[String] {
        &self.desired
    }

    pub fn supported(&self) -> &BTreeSet<String> {
        &self.supported
    }

    pub fn requested(&self) -> &BTreeSet<String> {
        &self.requested
    }

    pub fn subscribed(&self) -> &BTreeSet<String> {
        &self.subscribed
    }

    pub fn is_subscribed(&self, cap: &str) -> bool {
        self.subscribed.contains(cap)
    }

    /// True while `LS` or `REQ` is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, CapState::Listing | CapState::Requesting)
    }

    /// Forget everything learned from a previous connection.
    pub fn reset(&mut self) {
        self.supported.clear();
        self.requested.clear();
        self.subscribed.clear();
        self.state = CapState::Idle;
    }

    /// Begin negotiation. Returns the line to send.
    #[must_use]
    pub fn start(&mut self) -> String {
        self.reset();
        self.state = CapState::Listing;
        "CAP LS 302".to_string()
    }

    /// Stop negotiating without telling the server, e.g. because it
    /// finished registration on its own.
    pub fn cancel(&mut self) {
        if self.is_pending() {
            debug!(state = ?self.state, "capability negotiation cancelled");
            self.state = CapState::Abandoned;
        }
    }

    /// Give up on a pending negotiation.
    ///
    /// Returns the actions that let login continue, or nothing if no
    /// negotiation was pending.
    #[must_use]
    pub fn abandon(&mut self) -> Vec<CapAction> {
        if !self.is_pending() {
            return Vec::new();
        }
        warn!(state = ?self.state, "abandoning capability negotiation");
        self.state = CapState::Abandoned;
        vec![CapAction::Send("CAP END".to_string()), CapAction::Finished]
    }

    /// Feed one `CAP` line.
    ///
    /// `parameters` are the line's non-trailing parameters (target nick,
    /// subcommand, optional `*`), `text` the trailing capability list.
    #[must_use]
    pub fn feed(&mut self, parameters: &[String], text: &str) -> Vec<CapAction> {
        let Some(subcommand) = parameters.get(1) else {
            return Vec::new();
        };
        let more_follows = parameters.get(2).map(String::as_str) == Some("*");
        match subcommand.to_ascii_uppercase().as_str() {
            "LS" => self.on_ls(text, more_follows),
            "ACK" => self.on_ack(text),
            "NAK" => self.on_nak(text),
            "NEW" => self.on_new(text),
            "DEL" => {
                for token in text.split_whitespace() {
                    let name = cap_name(token);
                    self.supported.remove(name);
                    self.subscribed.remove(name);
                }
                Vec::new()
            }
            "LIST" => {
                if !more_follows {
                    self.subscribed.clear();
                }
                self.subscribed
                    .extend(text.split_whitespace().map(|t| cap_name(t).to_string()));
                Vec::new()
            }
            other => {
                debug!(subcommand = other, "ignoring unknown CAP subcommand");
                Vec::new()
            }
        }
    }

    fn on_ls(&mut self, text: &str, more_follows: bool) -> Vec<CapAction> {
        self.supported
            .extend(text.split_whitespace().map(|t| cap_name(t).to_string()));
        if more_follows || self.state != CapState::Listing {
            return Vec::new();
        }

        let mut actions = Vec::new();
        let mut wanted = Vec::new();
        for cap in &self.desired {
            if self.supported.contains(cap) {
                wanted.push(cap.clone());
            } else {
                actions.push(CapAction::Unsupported(cap.clone()));
            }
        }

        if wanted.is_empty() {
            actions.extend(self.finish());
        } else {
            self.requested.extend(wanted.iter().cloned());
            self.state = CapState::Requesting;
            actions.push(CapAction::Send(format!("CAP REQ :{}", wanted.join(" "))));
        }
        actions
    }

    fn on_ack(&mut self, text: &str) -> Vec<CapAction> {
        for token in text.split_whitespace() {
            match token.strip_prefix('-') {
                Some(name) => {
                    self.subscribed.remove(name);
                }
                None => {
                    self.subscribed.insert(cap_name(token).to_string());
                }
            }
        }
        self.finish_request()
    }

    fn on_nak(&mut self, text: &str) -> Vec<CapAction> {
        warn!(caps = text, "server refused capability request");
        self.finish_request()
    }

    fn on_new(&mut self, text: &str) -> Vec<CapAction> {
        let mut fresh = Vec::new();
        for token in text.split_whitespace() {
            let name = cap_name(token).to_string();
            if self.desired.contains(&name) && !self.subscribed.contains(&name) {
                fresh.push(name.clone());
            }
            self.supported.insert(name);
        }
        if fresh.is_empty() || self.state == CapState::Abandoned {
            return Vec::new();
        }
        self.requested.extend(fresh.iter().cloned());
        vec![CapAction::Send(format!("CAP REQ :{}", fresh.join(" ")))]
    }

    /// `ACK` and `NAK` both end an outstanding request.
    fn finish_request(&mut self) -> Vec<CapAction> {
        if self.state == CapState::Requesting {
            self.finish()
        } else {
            Vec::new()
        }
    }

    fn finish(&mut self) -> Vec<CapAction> {
        self.state = CapState::Finished;
        vec![CapAction::Send("CAP END".to_string()), CapAction::Finished]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn negotiator() -> CapNegotiator {
        CapNegotiator::new(vec!["multi-prefix".into(), "away-notify".into()])
    }

    #[test]
    fn test_capability_names() {
        assert_eq!(Capability::MultiPrefix.as_ref(), "multi-prefix");
        assert_eq!(Capability::from("chghost"), Capability::ChgHost);
        assert_eq!(Capability::from("sts"), Capability::Custom("sts".to_string()));
        assert_eq!(default_requested().len(), 4);
    }

    #[test]
    fn test_ls_then_req_then_ack() {
        let mut caps = negotiator();
        assert_eq!(caps.start(), "CAP LS 302");

        let actions = caps.feed(&params(&["*", "LS", "*"]), "multi-prefix sasl=PLAIN");
        assert!(actions.is_empty());
        assert_eq!(caps.state(), CapState::Listing);

        let actions = caps.feed(&params(&["*", "LS"]), "server-time");
        assert_eq!(
            actions,
            vec![
                CapAction::Unsupported("away-notify".into()),
                CapAction::Send("CAP REQ :multi-prefix".into()),
            ]
        );
        assert!(caps.supported().contains("sasl"));

        let actions = caps.feed(&params(&["me", "ACK"]), "multi-prefix");
        assert_eq!(actions, vec![CapAction::Send("CAP END".into()), CapAction::Finished]);
        assert!(caps.is_subscribed("multi-prefix"));
        assert_eq!(caps.state(), CapState::Finished);
    }

    #[test]
    fn test_nak_still_finishes() {
        let mut caps = negotiator();
        let _ = caps.start();
        let _ = caps.feed(&params(&["*", "LS"]), "multi-prefix away-notify");
        let actions = caps.feed(&params(&["*", "NAK"]), "multi-prefix away-notify");
        assert_eq!(actions.last(), Some(&CapAction::Finished));
        assert!(caps.subscribed().is_empty());
        assert_eq!(caps.requested().len(), 2);
    }

    #[test]
    fn test_nothing_to_request_ends_immediately() {
        let mut caps = negotiator();
        let _ = caps.start();
        let actions = caps.feed(&params(&["*", "LS"]), "sasl");
        assert_eq!(actions.last(), Some(&CapAction::Finished));
        assert!(actions.contains(&CapAction::Send("CAP END".into())));
    }

    #[test]
    fn test_abandon_only_when_pending() {
        let mut caps = negotiator();
        assert!(caps.abandon().is_empty());
        let _ = caps.start();
        assert_eq!(caps.abandon().last(), Some(&CapAction::Finished));
        assert_eq!(caps.state(), CapState::Abandoned);
        assert!(caps.abandon().is_empty());
    }

    #[test]
    fn test_cancel_sends_nothing() {
        let mut caps = negotiator();
        caps.cancel();
        assert_eq!(caps.state(), CapState::Idle);
        let _ = caps.start();
        caps.cancel();
        assert_eq!(caps.state(), CapState::Abandoned);
        assert!(!caps.is_pending());
        assert!(caps.abandon().is_empty());
    }

    #[test]
    fn test_cap_notify_new_and_del() {
        let mut caps = negotiator();
        let _ = caps.start();
        let _ = caps.feed(&params(&["*", "LS"]), "multi-prefix");
        let _ = caps.feed(&params(&["*", "ACK"]), "multi-prefix");

        let actions = caps.feed(&params(&["me", "NEW"]), "away-notify");
        assert_eq!(actions, vec![CapAction::Send("CAP REQ :away-notify".into())]);
        let actions = caps.feed(&params(&["me", "ACK"]), "away-notify");
        assert!(actions.is_empty());
        assert!(caps.is_subscribed("away-notify"));

        let _ = caps.feed(&params(&["me", "DEL"]), "away-notify");
        assert!(!caps.is_subscribed("away-notify"));
        assert!(!caps.supported().contains("away-notify"));
    }
}
