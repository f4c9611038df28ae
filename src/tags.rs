//! IRCv3 message tags.
//!
//! A line may start with `@key=value;key2 ` before its source. Tags are split
//! off before classification; only `time` is interpreted by the reducer, the
//! rest are kept on the [`Line`](crate::Line) for callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One `key[=value]` entry of a tag block, value already unescaped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: Option<String>,
}

/// Split a raw tag block (without the leading `@`) into tags.
///
/// Empty entries are skipped. A key without `=` or with an empty value
/// yields `None`.
pub fn parse_tags(block: &str) -> Vec<Tag> {
    block
        .split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !value.is_empty() => Tag {
                key: key.to_string(),
                value: Some(unescape_tag_value(value)),
            },
            Some((key, _)) => Tag {
                key: key.to_string(),
                value: None,
            },
            None => Tag {
                key: entry.to_string(),
                value: None,
            },
        })
        .collect()
}

/// Look up the `time` tag and parse it as an RFC 3339 timestamp.
pub fn server_time(tags: &[Tag]) -> Option<DateTime<Utc>> {
    tags.iter()
        .rfind(|t| t.key == "time")
        .and_then(|t| t.value.as_deref())
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Unescape a tag value from wire format.
///
/// `\:` `\s` `\\` `\r` `\n` map to `;` space `\` CR LF. Any other escaped
/// character stands for itself and a trailing lone backslash is dropped.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}
