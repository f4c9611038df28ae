//! Outgoing line formatting and the throttled send queue.
//!
//! Formatters are pure: they build one raw line (without CRLF) and strip
//! any CR, LF or NUL from caller-supplied text so a payload can never
//! inject a second command.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::ClientError;

/// CTCP delimiter.
pub const CTCP_DELIM: char = '\x01';

/// How urgently a line must go out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    /// Skips the queue and its throttle. Used for `PING`/`PONG` so the
    /// keepalive never waits behind user traffic.
    RealTime,
}

/// Remove characters that would end the line early.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.contains(['\r', '\n', '\0']) {
        Cow::Owned(text.chars().filter(|c| !matches!(c, '\r' | '\n' | '\0')).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// A nick or channel is usable as a command target.
pub fn validate_target(target: &str) -> Result<(), ClientError> {
    if target.is_empty() || target.contains([' ', ',', '\r', '\n', '\0']) {
        return Err(ClientError::InvalidTarget(target.to_string()));
    }
    Ok(())
}

pub fn privmsg(target: &str, text: &str) -> String {
    format!("PRIVMSG {} :{}", target, sanitize(text))
}

pub fn notice(target: &str, text: &str) -> String {
    format!("NOTICE {} :{}", target, sanitize(text))
}

/// CTCP request framed in a `PRIVMSG`. Empty `parameters` sends the bare
/// command.
pub fn ctcp(target: &str, command: &str, parameters: &str) -> String {
    let body = if parameters.is_empty() {
        sanitize(command).into_owned()
    } else {
        format!("{} {}", sanitize(command), sanitize(parameters))
    };
    format!("PRIVMSG {} :{}{}{}", target, CTCP_DELIM, body, CTCP_DELIM)
}

/// `/me` action.
pub fn action(target: &str, text: &str) -> String {
    ctcp(target, "ACTION", text)
}

pub fn join(channel: &str, key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() => format!("JOIN {} {}", channel, sanitize(key)),
        _ => format!("JOIN {}", channel),
    }
}

pub fn part(channel: &str, reason: &str) -> String {
    if reason.is_empty() {
        format!("PART {}", channel)
    } else {
        format!("PART {} :{}", channel, sanitize(reason))
    }
}

pub fn nick(nick: &str) -> String {
    format!("NICK {}", sanitize(nick))
}

pub fn quit(reason: &str) -> String {
    format!("QUIT :{}", sanitize(reason))
}

/// `AWAY :message`, or a bare `AWAY` to come back.
pub fn away(message: Option<&str>) -> String {
    match message {
        Some(message) => format!("AWAY :{}", sanitize(message)),
        None => "AWAY".to_string(),
    }
}

/// Fill a services identify template.
///
/// `$nickname` and `$password` are replaced; everything else is sent as is.
pub fn identify(template: &str, nickname: &str, password: &str) -> String {
    sanitize(&template.replace("$nickname", nickname).replace("$password", password)).into_owned()
}

/// Registration lines in order: optional `PASS`, then `USER`, then `NICK`.
pub fn registration(password: &str, ident: &str, realname: &str, nickname: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if !password.is_empty() {
        lines.push(format!("PASS {}", sanitize(password)));
    }
    lines.push(format!("USER {} 8 * :{}", sanitize(ident), sanitize(realname)));
    lines.push(nick(nickname));
    lines
}

#[derive(Debug, Default)]
struct QueueInner {
    /// Low, Normal, High.
    levels: [VecDeque<String>; 3],
    realtime: VecDeque<String>,
    bytes_sent: u64,
    lines_sent: u64,
    last_send: Option<Instant>,
}

impl QueueInner {
    fn account(&mut self, line: &str) {
        // Counted with the CRLF the transport appends.
        self.bytes_sent += line.len() as u64 + 2;
        self.lines_sent += 1;
    }
}

/// Multi-level FIFO of raw lines waiting for the transport.
///
/// Shared between the reducer, which pushes, and the transport task, which
/// drains on a timer. One mutex guards the lines and the byte counters.
#[derive(Debug, Default)]
pub struct SendQueue {
    inner: Mutex<QueueInner>,
}

impl SendQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: String, priority: Priority) {
        let mut inner = self.inner.lock();
        match priority {
            Priority::RealTime => inner.realtime.push_back(line),
            Priority::High => inner.levels[2].push_back(line),
            Priority::Normal => inner.levels[1].push_back(line),
            Priority::Low => inner.levels[0].push_back(line),
        }
    }

    /// Take every real-time line. These are written immediately and do not
    /// move the throttle clock.
    pub fn drain_realtime(&self) -> Vec<String> {
        let mut inner = self.inner.lock();
        let lines: Vec<String> = inner.realtime.drain(..).collect();
        for line in &lines {
            inner.account(line);
        }
        lines
    }

    /// Next queued line, if `spacing` has passed since the previous one.
    /// Higher levels always go first.
    pub fn pop_due(&self, now: Instant, spacing: Duration) -> Option<String> {
        let mut inner = self.inner.lock();
        if let Some(last) = inner.last_send {
            if now.saturating_duration_since(last) < spacing {
                return None;
            }
        }
        let line = inner.levels.iter_mut().rev().find_map(VecDeque::pop_front)?;
        inner.last_send = Some(now);
        inner.account(&line);
        Some(line)
    }

    /// When the next queued line may go out, `None` when nothing waits.
    pub fn next_due(&self, spacing: Duration) -> Option<Option<Instant>> {
        let inner = self.inner.lock();
        if inner.levels.iter().all(VecDeque::is_empty) {
            return None;
        }
        Some(inner.last_send.map(|last| last + spacing))
    }

    /// Lines waiting, real-time included.
    pub fn len(&self) -> usize {
        let inner = self.inner.lock();
        inner.realtime.len() + inner.levels.iter().map(VecDeque::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes_sent(&self) -> u64 {
        self.inner.lock().bytes_sent
    }

    pub fn lines_sent(&self) -> u64 {
        self.inner.lock().lines_sent
    }

    /// Drop every pending line, e.g. on disconnect. Counters survive.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.realtime.clear();
        for level in &mut inner.levels {
            level.clear();
        }
        inner.last_send = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatters() {
        assert_eq!(privmsg("#rust", "hi"), "PRIVMSG #rust :hi");
        assert_eq!(notice("bob", "psst"), "NOTICE bob :psst");
        assert_eq!(action("#rust", "waves"), "PRIVMSG #rust :\x01ACTION waves\x01");
        assert_eq!(ctcp("bob", "VERSION", ""), "PRIVMSG bob :\x01VERSION\x01");
        assert_eq!(join("#rust", None), "JOIN #rust");
        assert_eq!(join("#secret", Some("key")), "JOIN #secret key");
        assert_eq!(part("#rust", ""), "PART #rust");
        assert_eq!(part("#rust", "bye"), "PART #rust :bye");
        assert_eq!(away(None), "AWAY");
    }

    #[test]
    fn test_injection_is_stripped() {
        assert_eq!(privmsg("#c", "hi\r\nQUIT :pwned"), "PRIVMSG #c :hiQUIT :pwned");
        assert_eq!(sanitize("clean"), Cow::Borrowed("clean"));
    }

    #[test]
    fn test_identify_template() {
        let line = identify("PRIVMSG NickServ identify $nickname $password", "ferris", "hunter2");
        assert_eq!(line, "PRIVMSG NickServ identify ferris hunter2");
    }

    #[test]
    fn test_registration_order() {
        assert_eq!(
            registration("pw", "id", "Real Name", "nick"),
            vec!["PASS pw", "USER id 8 * :Real Name", "NICK nick"]
        );
        assert_eq!(registration("", "id", "r", "n").len(), 2);
    }

    #[test]
    fn test_validate_target() {
        assert!(validate_target("#rust").is_ok());
        assert!(matches!(validate_target(""), Err(ClientError::InvalidTarget(_))));
        assert!(validate_target("a b").is_err());
        assert!(validate_target("#a,#b").is_err());
    }

    #[test]
    fn test_queue_priority_and_throttle() {
        let queue = SendQueue::new();
        let start = Instant::now();
        let spacing = Duration::from_millis(500);

        queue.push("low".into(), Priority::Low);
        queue.push("normal".into(), Priority::Normal);
        queue.push("high".into(), Priority::High);
        queue.push("PONG :x".into(), Priority::RealTime);
        assert_eq!(queue.len(), 4);

        assert_eq!(queue.drain_realtime(), vec!["PONG :x".to_string()]);
        assert_eq!(queue.pop_due(start, spacing).as_deref(), Some("high"));
        assert_eq!(queue.pop_due(start + Duration::from_millis(100), spacing), None);
        assert_eq!(
            queue.pop_due(start + spacing, spacing).as_deref(),
            Some("normal")
        );
        assert_eq!(
            queue.pop_due(start + spacing * 2, spacing).as_deref(),
            Some("low")
        );
        assert!(queue.is_empty());
        assert_eq!(queue.lines_sent(), 4);
        assert_eq!(queue.bytes_sent(), (7 + 4 + 6 + 3 + 4 * 2) as u64);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let queue = SendQueue::new();
        queue.push("a".into(), Priority::Normal);
        assert!(queue.pop_due(Instant::now(), Duration::ZERO).is_some());
        queue.push("b".into(), Priority::Normal);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.bytes_sent(), 3);
    }
}
