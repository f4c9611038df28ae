//! Rank ordering helpers for channel user modes.
//!
//! A server advertises its ranks through `PREFIX=(qaohv)~&@%+`: the mode
//! letters and their display prefixes, highest rank first. Position in that
//! list is the rank, lower index meaning higher privilege.

/// Rank of `mode` in `cu_modes`, or `None` if the server does not know it.
pub fn rank_of(cu_modes: &[char], mode: char) -> Option<usize> {
    cu_modes.iter().position(|&m| m == mode)
}

/// Display prefix belonging to a rank mode letter.
pub fn prefix_for_mode(cu_modes: &[char], prefixes: &[char], mode: char) -> Option<char> {
    rank_of(cu_modes, mode).and_then(|i| prefixes.get(i).copied())
}

/// Rank mode letter belonging to a display prefix.
pub fn mode_for_prefix(cu_modes: &[char], prefixes: &[char], prefix: char) -> Option<char> {
    prefixes
        .iter()
        .position(|&p| p == prefix)
        .and_then(|i| cu_modes.get(i).copied())
}

/// Return `modes` sorted highest rank first.
///
/// Letters the server does not rank sort after every known rank and keep
/// their relative order.
pub fn sorted_cu_modes(cu_modes: &[char], modes: &[char]) -> Vec<char> {
    let mut sorted = modes.to_vec();
    sorted.sort_by_key(|&m| rank_of(cu_modes, m).unwrap_or(usize::MAX));
    sorted
}

/// Sort a user's parallel rank lists in place, keeping each prefix next to
/// its mode letter.
pub fn sort_cu_modes(cu_modes: &[char], user_modes: &mut Vec<char>, user_prefixes: &mut Vec<char>) {
    let mut pairs: Vec<(char, char)> = user_modes.iter().copied().zip(user_prefixes.iter().copied()).collect();
    pairs.sort_by_key(|&(m, _)| rank_of(cu_modes, m).unwrap_or(usize::MAX));
    (*user_modes, *user_prefixes) = pairs.into_iter().unzip();
}
