//! String helpers for outgoing lines.

/// Maximum length of an IRC line body, CRLF excluded.
pub const MAX_LINE_BODY: usize = 510;

/// Bytes of message text sent per line. Leaves room for the
/// `:nick!ident@host PRIVMSG target :` the server prepends when relaying.
pub const MAX_TEXT_BYTES: usize = 400;

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char
/// boundary.
///
/// ```
/// use slirc_client::util::truncate_at_boundary;
///
/// assert_eq!(truncate_at_boundary("Hello 👋 World", 8), "Hello ");
/// assert_eq!(truncate_at_boundary("hi", 10), "hi");
/// ```
#[inline]
pub fn truncate_at_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Splits a long message into chunks of at most `max_bytes`, never inside a
/// UTF-8 character. A chunk boundary prefers the last space in range.
///
/// # Examples
///
/// ```
/// use slirc_client::util::split_message;
///
/// let chunks: Vec<_> = split_message("Hello World! This is a test.", 13).collect();
/// assert_eq!(chunks, vec!["Hello World!", "This is a", "test."]);
/// ```
pub fn split_message(s: &str, max_bytes: usize) -> impl Iterator<Item = &str> {
    SplitMessage {
        remaining: s,
        max_bytes: max_bytes.max(4),
    }
}

struct SplitMessage<'a> {
    remaining: &'a str,
    max_bytes: usize,
}

impl<'a> Iterator for SplitMessage<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }

        let window = truncate_at_boundary(self.remaining, self.max_bytes);
        if window.len() == self.remaining.len() {
            self.remaining = "";
            return Some(window);
        }

        let (chunk, consumed) = match window.rfind(' ') {
            Some(space) if space > 0 => (&window[..space], space + 1),
            _ => (window, window.len()),
        };
        self.remaining = &self.remaining[consumed..];
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_inside_two_byte_char() {
        assert_eq!(truncate_at_boundary("héllo", 2), "h");
        assert_eq!(truncate_at_boundary("héllo", 3), "hé");
        assert_eq!(truncate_at_boundary("", 0), "");
    }

    #[test]
    fn test_split_message_without_spaces() {
        let chunks: Vec<_> = split_message("abcdefghij", 4).collect();
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_split_message_short() {
        let chunks: Vec<_> = split_message("short", MAX_TEXT_BYTES).collect();
        assert_eq!(chunks, vec!["short"]);
        assert_eq!(split_message("", 10).count(), 0);
    }
}
