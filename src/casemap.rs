//! IRC case-mapping.
//!
//! Nick and channel keys are compared case-insensitively everywhere. Which
//! characters fold together depends on the server's `CASEMAPPING` token;
//! `rfc1459` (the default) also folds `[]\~` onto `{}|^`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Case mapping advertised by a server in `ISUPPORT`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseMapping {
    /// Only `A-Z` fold to `a-z`.
    Ascii,
    /// ASCII plus `[]\~` → `{}|^`.
    #[default]
    Rfc1459,
    /// ASCII plus `[]\` → `{}|` (no tilde).
    StrictRfc1459,
}

impl CaseMapping {
    #[inline]
    fn fold(self, c: char) -> char {
        match (self, c) {
            (_, 'A'..='Z') => c.to_ascii_lowercase(),
            (Self::Ascii, _) => c,
            (_, '[') => '{',
            (_, ']') => '}',
            (_, '\\') => '|',
            (Self::Rfc1459, '~') => '^',
            _ => c,
        }
    }

    /// Fold a string to its lowercase key under this mapping.
    pub fn to_lower(self, s: &str) -> String {
        s.chars().map(|c| self.fold(c)).collect()
    }

    /// Compare two strings case-insensitively under this mapping.
    pub fn equals(self, a: &str, b: &str) -> bool {
        a.len() == b.len() && a.chars().zip(b.chars()).all(|(x, y)| self.fold(x) == self.fold(y))
    }

    /// Token value as it appears in `CASEMAPPING=`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Rfc1459 => "rfc1459",
            Self::StrictRfc1459 => "strict-rfc1459",
        }
    }
}

impl FromStr for CaseMapping {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Self::Ascii),
            "rfc1459" => Ok(Self::Rfc1459),
            "strict-rfc1459" => Ok(Self::StrictRfc1459),
            _ => Err(()),
        }
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    CaseMapping::Rfc1459.to_lower(s)
}

/// Compare two strings using RFC 1459 case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    CaseMapping::Rfc1459.equals(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc1459_folds_brackets() {
        assert_eq!(irc_to_lower("Nick[Away]"), "nick{away}");
        assert!(irc_eq("FOO\\bar~", "foo|BAR^"));
    }

    #[test]
    fn test_ascii_keeps_brackets() {
        assert_eq!(CaseMapping::Ascii.to_lower("A[b]"), "a[b]");
        assert!(!CaseMapping::Ascii.equals("[", "{"));
    }

    #[test]
    fn test_strict_does_not_fold_tilde() {
        assert!(!CaseMapping::StrictRfc1459.equals("~", "^"));
        assert!(CaseMapping::StrictRfc1459.equals("[", "{"));
    }

    #[test]
    fn test_from_token() {
        assert_eq!("RFC1459".parse(), Ok(CaseMapping::Rfc1459));
        assert_eq!("strict-rfc1459".parse(), Ok(CaseMapping::StrictRfc1459));
        assert!("rfc7613".parse::<CaseMapping>().is_err());
    }
}
