//! Connection lifecycle: connect, registration, keepalive and teardown.
//!
//! ```text
//! Disconnected -> Connecting -> [TlsHandshake] -> NegotiatingCaps -> Registering -> LoggedIn
//!                                              \________________________/
//!                                                   (IRCv3 disabled)
//! ```
//!
//! Any state returns to `Disconnected` on quit, transport loss or ping
//! timeout. Channel and user state survive the transition.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::{DisconnectReason, Event, Network};
use crate::caps::CapAction;
use crate::line::Line;
use crate::outbound::{self, Priority};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Transport is opening.
    Connecting,
    TlsHandshake,
    /// `CAP LS` sent, registration waits for negotiation to end.
    NegotiatingCaps,
    /// `USER`/`NICK` sent, waiting for 001.
    Registering,
    /// 001 received.
    LoggedIn,
}

impl ConnectionState {
    /// Transport is up and lines may be sent.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::NegotiatingCaps | Self::Registering | Self::LoggedIn)
    }
}

impl Network {
    /// The transport starts opening. Resets per-connection state.
    pub fn begin_connect(&mut self) {
        info!(network = %self.config.name, "connecting");
        self.rt.timers.cancel_all();
        self.rt.queue.clear();
        self.rt.state = ConnectionState::Connecting;
        self.rt.login_sent = false;
        self.rt.alternate_tried = false;
        self.rt.nick_suffix = 0;
        self.rt.renamed_from = None;
        self.rt.pings_sent = 0;
        self.rt.tls = false;
        self.rt.reconnect_requested = false;
        self.rt.last_received = None;
        self.caps = crate::caps::CapNegotiator::new(self.config.requested_caps.clone());
        self.ircv3_enabled = self.config.enable_ircv3;
        self.lag_ms = None;
        self.local_user.nick.clone_from(&self.config.nick);
        self.local_user.ident.clone_from(&self.config.ident);
        self.local_user.realname.clone_from(&self.config.realname);
    }

    /// The transport is negotiating TLS.
    pub fn tls_started(&mut self) {
        self.rt.state = ConnectionState::TlsHandshake;
        self.rt.tls = true;
    }

    /// The transport is up. Starts capability negotiation when enabled,
    /// otherwise registers right away.
    pub fn transport_connected(&mut self, now: Instant) {
        info!(network = %self.config.name, tls = self.rt.tls, "connected");
        self.rt.last_received = Some(now);
        self.emit(Event::Connected);

        if self.ircv3_enabled {
            self.rt.state = ConnectionState::NegotiatingCaps;
            let line = self.caps.start();
            self.send(line, Priority::High);
            let grace = Duration::from_secs(self.config.cap_grace_period);
            self.rt.timers.cap_grace.arm_once(now, grace);
        } else {
            self.standard_login(now);
        }
    }

    /// Send `USER`/`NICK` and start the keepalive timers. Does nothing the
    /// second time on the same connection.
    pub(super) fn standard_login(&mut self, now: Instant) {
        if self.rt.login_sent {
            return;
        }
        self.rt.login_sent = true;
        if self.rt.state != ConnectionState::LoggedIn {
            self.rt.state = ConnectionState::Registering;
        }

        for line in outbound::registration(
            &self.config.password,
            &self.config.ident,
            &self.config.realname,
            &self.local_user.nick,
        ) {
            self.send(line, Priority::High);
        }
        self.arm_keepalive(now);
    }

    fn arm_keepalive(&mut self, now: Instant) {
        let timers = &mut self.rt.timers;
        if !timers.ping.is_armed() {
            timers.ping.arm_repeating(now, Duration::from_secs(self.config.ping_rate));
        }
        if !timers.ping_timeout.is_armed() {
            // The watchdog looks every second; the timeout itself is measured
            // from the last received line.
            timers.ping_timeout.arm_repeating(now, Duration::from_secs(1));
        }
    }

    /// Feed one received line, already decoded. Any trailing CR/LF is
    /// ignored.
    pub fn feed_line(&mut self, raw: &str, now: Instant) {
        self.bytes_received += raw.len() as u64;
        self.process_line(raw, now);
    }

    /// Feed one received line as bytes, decoded with the configured
    /// encoding. Empty lines are skipped.
    pub fn feed_bytes(&mut self, bytes: &[u8], now: Instant) {
        self.bytes_received += bytes.len() as u64;
        let text = self.config.encoding.decode(bytes);
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return;
        }
        self.process_line(text, now);
    }

    fn process_line(&mut self, raw: &str, now: Instant) {
        self.rt.last_received = Some(now);
        match Line::parse(raw) {
            Ok(line) => {
                trace!(numeric = line.numeric(), command = line.command(), "dispatch");
                self.dispatch(Arc::new(line), now);
            }
            Err(error) => {
                warn!(%error, raw, "invalid line");
                self.emit(Event::Invalid {
                    raw: raw.to_string(),
                    error,
                });
            }
        }
    }

    /// Advance the clock: fires the capability grace period, the ping
    /// watchdog and the keepalive sender as they come due.
    pub fn tick(&mut self, now: Instant) {
        if self.rt.state == ConnectionState::Disconnected {
            return;
        }

        if self.rt.timers.cap_grace.poll(now) {
            warn!("capability negotiation timed out");
            self.abandon_caps(now);
        }

        if self.rt.timers.ping_timeout.poll(now) {
            let limit = Duration::from_secs(self.config.ping_timeout);
            let idle = self
                .rt
                .last_received
                .map(|last| now.saturating_duration_since(last));
            if idle.is_some_and(|idle| idle > limit) {
                warn!(timeout = self.config.ping_timeout, "ping timeout");
                self.teardown(DisconnectReason::PingTimeout);
                return;
            }
        }

        if self.rt.timers.ping.poll(now) {
            self.send_keepalive(now);
        }
    }

    /// Earliest instant [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.rt.timers.next_due()
    }

    fn send_keepalive(&mut self, now: Instant) {
        let stamp = now.saturating_duration_since(self.rt.epoch).as_millis();
        self.send(format!("PING :{}", stamp), Priority::RealTime);
        self.rt.pings_sent += 1;
    }

    /// Lag in milliseconds if `payload` is one of our keepalive stamps.
    pub(super) fn lag_from_payload(&self, payload: &str, now: Instant) -> Option<u64> {
        let sent: u128 = payload.trim().parse().ok()?;
        let elapsed = now.saturating_duration_since(self.rt.epoch).as_millis();
        u64::try_from(elapsed.checked_sub(sent)?).ok()
    }

    /// Give up on a pending capability negotiation and log in without
    /// IRCv3.
    pub(super) fn abandon_caps(&mut self, now: Instant) {
        let actions = self.caps.abandon();
        if actions.is_empty() {
            return;
        }
        self.ircv3_enabled = false;
        self.emit(Event::Ircv3Disabled);
        self.apply_cap_actions(actions, now);
    }

    pub(super) fn apply_cap_actions(&mut self, actions: Vec<CapAction>, now: Instant) {
        for action in actions {
            match action {
                CapAction::Send(line) => self.send(line, Priority::High),
                CapAction::Unsupported(capability) => {
                    warn!(%capability, "server does not support capability");
                    self.emit(Event::CapUnsupported { capability });
                }
                CapAction::Finished => {
                    self.rt.timers.cap_grace.cancel();
                    self.standard_login(now);
                }
            }
        }
    }

    /// Quit and drop the connection. The `QUIT` is left in the real-time
    /// queue for the transport to flush before closing.
    pub fn disconnect(&mut self, reason: Option<&str>) {
        if self.rt.state == ConnectionState::Disconnected {
            return;
        }
        self.rt.queue.clear();
        if self.rt.state.is_connected() {
            let message = reason.unwrap_or(&self.config.quit_message);
            self.send(outbound::quit(message), Priority::RealTime);
        }
        self.teardown(DisconnectReason::Quit);
    }

    /// Disconnect, then ask the transport to connect again.
    pub fn reconnect(&mut self, reason: Option<&str>) {
        self.disconnect(reason);
        self.rt.reconnect_requested = true;
    }

    /// True once after [`reconnect`](Self::reconnect) was called.
    pub fn take_reconnect_request(&mut self) -> bool {
        std::mem::take(&mut self.rt.reconnect_requested)
    }

    /// The transport went away on its own.
    pub fn transport_closed(&mut self, reason: DisconnectReason) {
        if self.rt.state == ConnectionState::Disconnected {
            debug!(%reason, "transport closed while already disconnected");
            return;
        }
        self.teardown(reason);
    }

    fn teardown(&mut self, reason: DisconnectReason) {
        self.rt.timers.cancel_all();
        self.rt.state = ConnectionState::Disconnected;
        self.rt.login_sent = false;
        info!(network = %self.config.name, %reason, "disconnected");
        self.emit(Event::Disconnected { reason });
    }

    /// Current state as the reducer sees it. Used by handlers that behave
    /// differently before 001.
    pub(super) fn logged_in(&self) -> bool {
        self.rt.state == ConnectionState::LoggedIn
    }

    pub(super) fn mark_logged_in(&mut self, now: Instant) {
        if self.caps.is_pending() {
            debug!("welcome arrived during capability negotiation");
            self.rt.timers.cap_grace.cancel();
            self.caps.cancel();
        }
        self.rt.login_sent = true;
        self.rt.state = ConnectionState::LoggedIn;
        self.arm_keepalive(now);
    }

    /// Next nick to try after 433 during registration.
    pub(super) fn next_nick_candidate(&mut self) -> String {
        if !self.rt.alternate_tried && !self.config.alternate_nick.is_empty() {
            self.rt.alternate_tried = true;
            return self.config.alternate_nick.clone();
        }
        self.rt.nick_suffix += 1;
        format!("{}{}", self.config.nick, self.rt.nick_suffix)
    }
}
