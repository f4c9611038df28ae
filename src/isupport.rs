//! `RPL_ISUPPORT` (005) token parsing.
//!
//! ```text
//! :server 005 nick PREFIX=(ov)@+ CHANMODES=beI,k,l,imnpst NETWORK=Libera :are supported by this server
//! ```

use crate::casemap::CaseMapping;
use crate::line::Line;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

/// The tokens of one 005 line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    pub fn parse_params<S: AsRef<str>>(params: &'a [S]) -> Self {
        let mut entries = Vec::with_capacity(params.len());
        for p in params {
            let p = p.as_ref();
            if p.is_empty() {
                continue;
            }
            let (key, value) = match p.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (p, None),
            };
            entries.push(IsupportEntry { key, value });
        }
        Isupport { entries }
    }

    /// Tokens of a 005 line: every parameter after the target nick. The
    /// trailing human-readable text is not a token.
    pub fn from_line(line: &'a Line) -> Option<Self> {
        let params = line.parameters();
        if params.is_empty() {
            return None;
        }
        Some(Self::parse_params(&params[1..]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    /// Value of the last entry named `key`. `Some(None)` for a bare key.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    pub fn casemapping(&self) -> Option<CaseMapping> {
        self.get("CASEMAPPING").flatten().and_then(|v| v.parse().ok())
    }

    pub fn chantypes(&self) -> Option<&'a str> {
        self.get("CHANTYPES").flatten()
    }

    pub fn network(&self) -> Option<&'a str> {
        self.get("NETWORK").flatten()
    }

    pub fn statusmsg(&self) -> Option<&'a str> {
        self.get("STATUSMSG").flatten()
    }

    /// `None` when the token is absent; `Some(Err(raw))` when it is present
    /// but unusable.
    pub fn prefix(&self) -> Option<Result<PrefixSpec<'a>, &'a str>> {
        self.get("PREFIX").flatten().map(|v| PrefixSpec::parse(v).ok_or(v))
    }

    pub fn chanmodes(&self) -> Option<Result<ChanModes<'a>, &'a str>> {
        self.get("CHANMODES").flatten().map(|v| ChanModes::parse(v).ok_or(v))
    }
}

/// `PREFIX=(modes)prefixes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    pub modes: &'a str,
    pub prefixes: &'a str,
}

impl<'a> PrefixSpec<'a> {
    /// Parse the token value. Mode and prefix lists must have the same
    /// number of characters, otherwise the whole token is rejected.
    pub fn parse(s: &'a str) -> Option<Self> {
        let inner = s.strip_prefix('(')?;
        let (modes, prefixes) = inner.split_once(')')?;
        if modes.chars().count() != prefixes.chars().count() {
            return None;
        }
        Some(PrefixSpec { modes, prefixes })
    }

    pub fn mode_letters(&self) -> Vec<char> {
        self.modes.chars().collect()
    }

    pub fn prefix_chars(&self) -> Vec<char> {
        self.prefixes.chars().collect()
    }
}

/// `CHANMODES=A,B,C,D`.
///
/// - `a`: list modes, parameter always (`beI`)
/// - `b`: parameter always, one value per channel (`k`)
/// - `c`: parameter only when set (`l`)
/// - `d`: flags (`imnpst`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChanModes<'a> {
    pub a: &'a str,
    pub b: &'a str,
    pub c: &'a str,
    pub d: &'a str,
}

impl<'a> ChanModes<'a> {
    /// Later groups some servers append after `D` are ignored.
    pub fn parse(s: &'a str) -> Option<Self> {
        let mut parts = s.split(',');
        let (a, b, c, d) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        Some(ChanModes { a, b, c, d })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line() {
        let line = Line::parse(
            ":srv 005 me PREFIX=(qov)~@+ CHANMODES=beI,k,l,imnpst NETWORK=Test EXCEPTS :are supported",
        )
        .unwrap();
        let isupport = Isupport::from_line(&line).unwrap();
        assert_eq!(isupport.network(), Some("Test"));
        assert_eq!(isupport.get("EXCEPTS"), Some(None));
        assert_eq!(isupport.get("are"), None);

        let prefix = isupport.prefix().unwrap().unwrap();
        assert_eq!(prefix.mode_letters(), vec!['q', 'o', 'v']);
        assert_eq!(prefix.prefix_chars(), vec!['~', '@', '+']);

        let chanmodes = isupport.chanmodes().unwrap().unwrap();
        assert_eq!(chanmodes.a, "beI");
        assert_eq!(chanmodes.d, "imnpst");
    }

    #[test]
    fn test_prefix_length_mismatch_rejected() {
        assert!(PrefixSpec::parse("(ov)@").is_none());
        assert!(PrefixSpec::parse("ov@+").is_none());
        assert_eq!(
            PrefixSpec::parse("(ov)@+"),
            Some(PrefixSpec {
                modes: "ov",
                prefixes: "@+"
            })
        );
    }

    #[test]
    fn test_casemapping_token() {
        let params = ["CASEMAPPING=ascii", "STATUSMSG=@+"];
        let isupport = Isupport::parse_params(&params[..]);
        assert_eq!(isupport.casemapping(), Some(CaseMapping::Ascii));
        assert_eq!(isupport.statusmsg(), Some("@+"));
    }

    #[test]
    fn test_chanmodes_too_few_groups() {
        assert!(ChanModes::parse("b,k,l").is_none());
        assert!(ChanModes::parse("b,k,l,n,Z").is_some());
    }
}
