//! Mode deltas: flag sets, single mode changes and channel list entries.
//!
//! A delta string such as `+nt-s` is applied left to right: `+` and `-`
//! switch direction, every other character is a mode letter. User modes and
//! channel modes share the same representation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;
use crate::user::User;

pub const MODE_INCLUDE: char = '+';
pub const MODE_EXCLUDE: char = '-';

/// Include/exclude sets built from mode deltas.
///
/// A letter is never in both sets: including it drops it from `excluded`
/// and vice versa. Letters keep the order they were first seen in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mode {
    included: Vec<char>,
    excluded: Vec<char>,
}

impl Mode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mode from a single delta string.
    pub fn from_delta(delta: &str) -> Self {
        let mut mode = Self::new();
        mode.apply_delta(delta, false);
        mode
    }

    /// Apply a delta string.
    ///
    /// With `reset_on_exclude` letters after `-` are removed from both sets
    /// instead of being recorded as excluded, which is what a channel's
    /// current flag state wants.
    pub fn apply_delta(&mut self, delta: &str, reset_on_exclude: bool) {
        let mut including = true;
        for c in delta.chars() {
            match c {
                MODE_INCLUDE => including = true,
                MODE_EXCLUDE => including = false,
                _ if including => self.include(c),
                _ if reset_on_exclude => self.reset(c),
                _ => self.exclude(c),
            }
        }
    }

    pub fn include(&mut self, mode: char) {
        self.excluded.retain(|&m| m != mode);
        if !self.included.contains(&mode) {
            self.included.push(mode);
        }
    }

    pub fn exclude(&mut self, mode: char) {
        self.included.retain(|&m| m != mode);
        if !self.excluded.contains(&mode) {
            self.excluded.push(mode);
        }
    }

    /// Forget a letter entirely.
    pub fn reset(&mut self, mode: char) {
        self.included.retain(|&m| m != mode);
        self.excluded.retain(|&m| m != mode);
    }

    pub fn includes(&self, mode: char) -> bool {
        self.included.contains(&mode)
    }

    pub fn excludes(&self, mode: char) -> bool {
        self.excluded.contains(&mode)
    }

    pub fn included(&self) -> &[char] {
        &self.included
    }

    pub fn excluded(&self) -> &[char] {
        &self.excluded
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }

    pub fn clear(&mut self) {
        self.included.clear();
        self.excluded.clear();
    }
}

impl fmt::Display for Mode {
    /// Canonical `+abc-xyz` form; an empty segment is omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.included.is_empty() {
            write!(f, "{}", MODE_INCLUDE)?;
            for c in &self.included {
                write!(f, "{}", c)?;
            }
        }
        if !self.excluded.is_empty() {
            write!(f, "{}", MODE_EXCLUDE)?;
            for c in &self.excluded {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

impl Snapshot for Mode {
    const KIND: &'static str = "mode";
}

/// One mode change with its optional parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleMode {
    pub letter: char,
    pub including: bool,
    pub parameter: Option<String>,
}

impl SingleMode {
    pub fn new(letter: char, including: bool, parameter: Option<String>) -> Self {
        Self {
            letter,
            including,
            parameter,
        }
    }

    /// Tokenize a delta against the letters that take one parameter each.
    ///
    /// Parameters are consumed front to back in letter order. When a letter
    /// needs a parameter and none is left, tokenizing stops and the modes
    /// parsed so far are returned with
    /// [`ModeList::missing_parameter`] set to the starving letter.
    pub fn to_mode_list(delta: &str, parameters: &[String], parameter_letters: &[char]) -> ModeList {
        Self::to_mode_list_with(delta, parameters, |letter, _| parameter_letters.contains(&letter))
    }

    /// Like [`to_mode_list`](Self::to_mode_list), with a predicate deciding
    /// per letter and direction whether a parameter is consumed.
    ///
    /// Channel modes such as `l` take a parameter only when set; the
    /// predicate receives `including` so callers can express that.
    pub fn to_mode_list_with<F>(delta: &str, parameters: &[String], takes_parameter: F) -> ModeList
    where
        F: Fn(char, bool) -> bool,
    {
        let mut list = ModeList::default();
        let mut args = parameters.iter();
        let mut including = true;

        for c in delta.chars() {
            match c {
                MODE_INCLUDE => including = true,
                MODE_EXCLUDE => including = false,
                _ => {
                    let parameter = if takes_parameter(c, including) {
                        match args.next() {
                            Some(arg) => Some(arg.clone()),
                            None => {
                                list.missing_parameter = Some(c);
                                return list;
                            }
                        }
                    } else {
                        None
                    };
                    list.modes.push(SingleMode::new(c, including, parameter));
                }
            }
        }

        list
    }
}

impl fmt::Display for SingleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.including { MODE_INCLUDE } else { MODE_EXCLUDE };
        match &self.parameter {
            Some(p) => write!(f, "{}{} {}", sign, self.letter, p),
            None => write!(f, "{}{}", sign, self.letter),
        }
    }
}

impl Snapshot for SingleMode {
    const KIND: &'static str = "single_mode";
}

/// Result of tokenizing a mode delta.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeList {
    pub modes: Vec<SingleMode>,
    /// Letter that ran out of parameters, if tokenizing stopped early.
    pub missing_parameter: Option<char>,
}

impl ModeList {
    pub fn is_complete(&self) -> bool {
        self.missing_parameter.is_none()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SingleMode> {
        self.modes.iter()
    }
}

impl IntoIterator for ModeList {
    type Item = SingleMode;
    type IntoIter = std::vec::IntoIter<SingleMode>;

    fn into_iter(self) -> Self::IntoIter {
        self.modes.into_iter()
    }
}

/// A list-type channel mode entry: ban, ban exception or invite exception.
///
/// Two entries are the same entry when letter and parameter match; setter
/// and time are informational.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMode {
    pub letter: char,
    pub parameter: String,
    pub set_by: Option<User>,
    pub set_at: DateTime<Utc>,
}

impl ParamMode {
    pub fn new(letter: char, parameter: impl Into<String>, set_by: Option<User>, set_at: DateTime<Utc>) -> Self {
        Self {
            letter,
            parameter: parameter.into(),
            set_by,
            set_at,
        }
    }

    pub fn same_entry(&self, letter: char, parameter: &str) -> bool {
        self.letter == letter && self.parameter == parameter
    }
}

impl Snapshot for ParamMode {
    const KIND: &'static str = "param_mode";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apply_delta() {
        let mut mode = Mode::from_delta("+nt-s");
        assert!(mode.includes('n'));
        assert!(mode.excludes('s'));
        assert_eq!(mode.to_string(), "+nt-s");

        mode.apply_delta("+s-n", false);
        assert_eq!(mode.to_string(), "+ts-n");
    }

    #[test]
    fn test_reset_on_exclude() {
        let mut mode = Mode::from_delta("+nts");
        mode.apply_delta("-s", true);
        assert_eq!(mode.to_string(), "+nt");
        assert!(!mode.excludes('s'));
    }

    #[test]
    fn test_no_prefix_means_include() {
        let mode = Mode::from_delta("iw");
        assert_eq!(mode.to_string(), "+iw");
        assert_eq!(Mode::new().to_string(), "");
        assert_eq!(Mode::from_delta("-x").to_string(), "-x");
    }

    #[test]
    fn test_mode_list_pairs_parameters() {
        let list = SingleMode::to_mode_list("+ov", &params(&["alice", "bob"]), &['o', 'v']);
        assert!(list.is_complete());
        assert_eq!(
            list.modes,
            vec![
                SingleMode::new('o', true, Some("alice".into())),
                SingleMode::new('v', true, Some("bob".into())),
            ]
        );
    }

    #[test]
    fn test_mode_list_underflow_stops() {
        let list = SingleMode::to_mode_list("+oo", &params(&["alice"]), &['o']);
        assert_eq!(list.len(), 1);
        assert_eq!(list.missing_parameter, Some('o'));
    }

    #[test]
    fn test_mode_list_mixed_directions() {
        let list = SingleMode::to_mode_list("+m-v+b", &params(&["carol", "*!*@x"]), &['v', 'b']);
        let rendered: Vec<String> = list.iter().map(|m| m.to_string()).collect();
        assert_eq!(rendered, vec!["+m", "-v carol", "+b *!*@x"]);
    }

    #[test]
    fn test_mode_list_with_set_only_letters() {
        let takes = |c: char, including: bool| c == 'k' || (c == 'l' && including);
        let list = SingleMode::to_mode_list_with("-l+l", &params(&["10"]), takes);
        assert!(list.is_complete());
        assert_eq!(list.modes[0], SingleMode::new('l', false, None));
        assert_eq!(list.modes[1], SingleMode::new('l', true, Some("10".into())));
    }

    #[test]
    fn test_param_mode_identity() {
        let entry = ParamMode::new('b', "*!*@spam", None, Utc::now());
        assert!(entry.same_entry('b', "*!*@spam"));
        assert!(!entry.same_entry('e', "*!*@spam"));
    }
}
