//! Outgoing commands. Each call validates its arguments, formats the line
//! and queues it; nothing is written here.

use tracing::debug;

use super::Network;
use crate::error::{ClientError, ConfigError};
use crate::outbound::{self, validate_target, Priority};
use crate::util::{split_message, MAX_TEXT_BYTES};

impl Network {
    fn ensure_connected(&self) -> Result<(), ClientError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ClientError::NotConnected)
        }
    }

    /// Send a `PRIVMSG`. Long text is split into several lines at word
    /// boundaries.
    pub fn send_message(&self, target: &str, text: &str, priority: Priority) -> Result<(), ClientError> {
        self.ensure_connected()?;
        validate_target(target)?;
        for chunk in split_message(&outbound::sanitize(text), MAX_TEXT_BYTES) {
            self.send(outbound::privmsg(target, &chunk), priority);
        }
        Ok(())
    }

    pub fn send_notice(&self, target: &str, text: &str, priority: Priority) -> Result<(), ClientError> {
        self.ensure_connected()?;
        validate_target(target)?;
        for chunk in split_message(&outbound::sanitize(text), MAX_TEXT_BYTES) {
            self.send(outbound::notice(target, &chunk), priority);
        }
        Ok(())
    }

    /// `/me`.
    pub fn send_action(&self, target: &str, text: &str, priority: Priority) -> Result<(), ClientError> {
        self.ensure_connected()?;
        validate_target(target)?;
        self.send(outbound::action(target, text), priority);
        Ok(())
    }

    pub fn send_ctcp(
        &self,
        target: &str,
        command: &str,
        parameters: &str,
        priority: Priority,
    ) -> Result<(), ClientError> {
        self.ensure_connected()?;
        validate_target(target)?;
        self.send(outbound::ctcp(target, command, parameters), priority);
        Ok(())
    }

    /// Ask to join. The channel exists locally once the server echoes the
    /// `JOIN`.
    pub fn join(&self, channel: &str, key: Option<&str>) -> Result<(), ClientError> {
        self.ensure_connected()?;
        validate_target(channel)?;
        self.send(outbound::join(channel, key), Priority::Normal);
        Ok(())
    }

    pub fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), ClientError> {
        self.ensure_connected()?;
        validate_target(channel)?;
        self.send(outbound::part(channel, reason.unwrap_or_default()), Priority::Normal);
        Ok(())
    }

    /// Ask for a new nick.
    ///
    /// Before 001, or with `resolve_self_changes` off, the local nick
    /// changes right away. Otherwise it changes when the server confirms.
    pub fn request_nick(&mut self, nick: &str) -> Result<(), ClientError> {
        self.ensure_connected()?;
        validate_target(nick)?;
        self.send(outbound::nick(nick), Priority::High);
        if !self.logged_in() || !self.config.resolve_self_changes {
            debug!(old = %self.local_user.nick, new = %nick, "nick applied locally");
            if self.logged_in() {
                self.rt.renamed_from = Some(self.local_user.nick.clone());
            }
            self.local_user.nick = nick.to_string();
        }
        Ok(())
    }

    /// Identify to services with the configured template. `None` uses the
    /// configured services password.
    pub fn identify(&self, password: Option<&str>) -> Result<(), ClientError> {
        self.ensure_connected()?;
        let password = password.unwrap_or(&self.config.services_password);
        if password.is_empty() {
            return Err(ClientError::Config(ConfigError::Invalid {
                field: "services_password",
                reason: "no password to identify with".to_string(),
            }));
        }
        let line = outbound::identify(&self.config.identify_template, &self.local_user.nick, password);
        self.send(line, Priority::High);
        Ok(())
    }

    /// Mark ourselves away with `message`, or back with `None`. The away
    /// flag itself flips on the server's 306/305.
    pub fn set_away(&mut self, message: Option<&str>) -> Result<(), ClientError> {
        self.ensure_connected()?;
        self.local_user.away_message = message.map(|m| outbound::sanitize(m).into_owned()).unwrap_or_default();
        self.send(outbound::away(message), Priority::Normal);
        Ok(())
    }

    /// Queue an arbitrary line. CR, LF and NUL are stripped.
    pub fn send_raw(&self, line: &str, priority: Priority) -> Result<(), ClientError> {
        self.ensure_connected()?;
        let line = outbound::sanitize(line);
        if line.trim().is_empty() {
            return Ok(());
        }
        self.send(line.into_owned(), priority);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::NetworkConfig;
    use crate::network::Event;

    fn connected() -> Network {
        let config = NetworkConfig {
            nick: "ferris".into(),
            enable_ircv3: false,
            ..NetworkConfig::default()
        };
        let mut network = Network::new(config);
        network.begin_connect();
        network.transport_connected(Instant::now());
        let queue = network.send_queue();
        while queue.pop_due(Instant::now(), Duration::ZERO).is_some() {}
        network
    }

    fn drain(network: &Network) -> Vec<String> {
        let queue = network.send_queue();
        let mut lines = queue.drain_realtime();
        while let Some(line) = queue.pop_due(Instant::now(), Duration::ZERO) {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_not_connected() {
        let network = Network::default();
        assert!(matches!(
            network.send_message("#rust", "hi", Priority::Normal),
            Err(ClientError::NotConnected)
        ));
    }

    #[test]
    fn test_invalid_target() {
        let network = connected();
        assert!(matches!(
            network.join("#a b", None),
            Err(ClientError::InvalidTarget(_))
        ));
        assert!(drain(&network).is_empty());
    }

    #[test]
    fn test_long_message_is_split() {
        let network = connected();
        let text = "word ".repeat(200);
        network.send_message("#rust", &text, Priority::Normal).unwrap();
        let lines = drain(&network);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.starts_with("PRIVMSG #rust :")));
    }

    #[test]
    fn test_request_nick_before_welcome() {
        let mut network = connected();
        network.request_nick("crab").unwrap();
        assert_eq!(network.nick(), "crab");
        assert_eq!(drain(&network), vec!["NICK crab"]);
    }

    #[test]
    fn test_request_nick_waits_for_echo() {
        let mut network = connected();
        network.feed_line(":irc 001 ferris :hi", Instant::now());
        network.request_nick("crab").unwrap();
        assert_eq!(network.nick(), "ferris");
        network.feed_line(":ferris!f@h NICK crab", Instant::now());
        assert_eq!(network.nick(), "crab");
    }

    #[test]
    fn test_request_nick_applied_early_still_reports_self() {
        let mut network = connected();
        network.config_mut().resolve_self_changes = false;
        network.feed_line(":irc 001 ferris :hi", Instant::now());
        network.drain_events();
        network.request_nick("crab").unwrap();
        assert_eq!(network.nick(), "crab");
        network.feed_line(":ferris!f@h NICK crab", Instant::now());
        assert_eq!(network.nick(), "crab");
        assert!(matches!(
            network.drain_events().as_slice(),
            [Event::Nick { old, new, is_self: true, .. }] if old == "ferris" && new == "crab"
        ));
    }

    #[test]
    fn test_identify_and_raw() {
        let mut network = connected();
        network.config_mut().services_password = "hunter2".into();
        network.identify(None).unwrap();
        network.send_raw("WHO #rust\r\n", Priority::Low).unwrap();
        assert_eq!(
            drain(&network),
            vec!["PRIVMSG NickServ identify ferris hunter2", "WHO #rust"]
        );
    }
}
