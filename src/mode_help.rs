//! Human-readable descriptions of channel mode letters.
//!
//! Daemons disagree on what most letters mean, so the table is picked by
//! the version string from `RPL_MYINFO`. Letters every family agrees on come
//! from the base table and may be overridden.

use std::collections::HashMap;

type Table = &'static [(char, &'static str)];

const BASE: Table = &[
    ('m', "Moderated - will suppress all messages from people who don't have voice (+v) or higher."),
    ('t', "Topic changes restricted - only allow privileged users to change the topic."),
    ('i', "A user must be invited to join the channel"),
    ('n', "Users cannot send messages to the channel externally"),
    ('s', "Secret channel, not shown in channel list or user whois except to users already on the channel"),
    ('p', "Private channel, listed in channel list as prv according to RFC 1459"),
];

const CHARYBDIS: Table = &[
    ('n', "No external messages.  Only channel members may talk in the channel."),
    ('t', "Ops Topic.  Only opped (+o) users may set the topic."),
    ('s', "Secret.  Channel will not be shown in /whois and /list etc."),
    ('p', "Private.  Disables /knock to the channel."),
    ('m', "Moderated.  Only opped/voiced users may talk in channel."),
    ('i', "Invite only.  Users need to be /invite'd or match a +I to join the channel."),
    ('r', "Registered users only.  Only users identified to services may join."),
    ('c', "No color.  All color codes in messages are stripped."),
    ('g', "Free invite.  Everyone may invite users.  Significantly weakens +i control."),
    ('z', "Op moderated.  Messages blocked by +m, +b and +q are instead sent to ops."),
    ('L', "Large ban list.  Increase maximum number of +beIq entries. Only settable by opers."),
    ('P', "Permanent.  Channel does not disappear when empty.  Only settable by opers."),
    ('F', "Free target.  Anyone may set forwards to this (otherwise ops are necessary)."),
    (
        'Q',
        "Disable forward.  Users cannot be forwarded to the channel (however, new forwards can still be set subject to +F).",
    ),
    ('C', "Disable CTCP. All CTCP messages to the channel, except ACTION, are disallowed."),
];

const SOLANUM_EXTRA: Table = &[
    ('O', "IRC Operator only channel"),
    ('A', "IRC server administrator only channel"),
    ('T', "No NOTICEs allowed in the channel"),
    (
        'S',
        "Only users connected via SSL/TLS may join the channel while this mode is set. Users already in the channel are not affected.",
    ),
];

const UNREAL: Table = &[
    ('c', "Block messages containing mIRC color codes [o]"),
    ('G', "Filters out all Bad words in messages with <censored> [o]"),
    ('i', "A user must be invited to join the channel [h]"),
    ('K', "/KNOCK is not allowed [o]"),
    ('m', "Moderated channel (only +vhoaq users may speak) [h]"),
    ('n', "Users outside the channel can not send PRIVMSGs to the channel [h]"),
    ('O', "IRC Operator only channel (settable by IRCops)"),
    ('p', "Private channel [o]"),
    ('Q', "No kicks allowed [o]"),
    ('R', "Only registered (+r) users may join the channel [o]"),
    ('r', "The channel is registered (settable by services only)"),
    ('s', "Secret channel [o]"),
    ('S', "Strips mIRC color codes [o]"),
    ('T', "No NOTICEs allowed in the channel [o]"),
    ('t', "Only +hoaq may change the topic [h]"),
    ('V', "/INVITE is not allowed [o]"),
    ('z', "Only Clients on a Secure Connection (SSL) can join [o]"),
];

const UNREAL3_EXTRA: Table = &[
    ('A', "Server/Net Admin only channel (settable by Admins)"),
    ('C', "No CTCPs allowed in the channel [o]"),
    ('M', "Must be using a registered nick (+r), or have voice access to talk [o]"),
    ('N', "No Nickname changes are permitted in the channel [o]"),
    ('u', "Auditorium mode (/names and /who #channel only show channel ops) [q]"),
];

const UNREAL4_EXTRA: Table = &[
    ('C', "No CTCPs allowed in the channel [h]"),
    (
        'D',
        "Delays someone's JOIN message until that person speaks. Chanops and higher, opers and ulines/services are exempt.  [o]",
    ),
    ('M', "Must be using a registered nick (+r), or have voice access to talk [h]"),
    ('N', "No Nickname changes are permitted in the channel [h]"),
    (
        'Z',
        "All users on the channel are on a Secure connection (SSL) [server] (This mode is set/unset by the server. Only if the channel is also +z)",
    ),
];

/// Channel mode descriptions for a daemon version string.
pub fn channel_mode_help(version: &str) -> HashMap<char, String> {
    let families: &[Table] = if version.starts_with("Unreal3") {
        &[UNREAL, UNREAL3_EXTRA]
    } else if version.starts_with("UnrealIRCd-4") {
        &[UNREAL, UNREAL4_EXTRA]
    } else if version.starts_with("ircd-seven-1") {
        &[CHARYBDIS]
    } else if version.starts_with("solanum-") {
        &[CHARYBDIS, SOLANUM_EXTRA]
    } else {
        &[]
    };

    std::iter::once(BASE)
        .chain(families.iter().copied())
        .flat_map(|table| table.iter())
        .map(|&(letter, text)| (letter, text.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_table() {
        let help = channel_mode_help("hybrid-8.2");
        assert_eq!(help.len(), BASE.len());
        assert!(help[&'n'].contains("externally"));
    }

    #[test]
    fn test_family_overrides_base() {
        let help = channel_mode_help("solanum-1.0-dev");
        assert!(help[&'t'].starts_with("Ops Topic"));
        assert!(help.contains_key(&'S'));

        let seven = channel_mode_help("ircd-seven-1.1.9");
        assert!(!seven.contains_key(&'S'));
        assert!(seven.contains_key(&'Q'));
    }

    #[test]
    fn test_unreal_variants() {
        assert!(channel_mode_help("Unreal3.2.10").contains_key(&'u'));
        let four = channel_mode_help("UnrealIRCd-4.2.0");
        assert!(four.contains_key(&'D'));
        assert!(!four.contains_key(&'u'));
    }
}
