//! The numeric code space lines are dispatched on.
//!
//! Server replies carry a three digit numeric on the wire and keep it.
//! Textual commands have no numeric, so they are mapped onto small negative
//! sentinels (`RAW_*`) which never collide with a real reply code. `RAW_PONG`
//! is the only textual command mapped to `0`, a value no server sends.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - <https://www.alien.net.au/irc/irc2numerics.html>

/// A line that did not match either accepted shape.
pub const INVALID: i32 = -200;
/// A textual command that is not in the command table.
pub const RAW_UNKNOWN: i32 = -100;

pub const RAW_PING: i32 = -1;
pub const RAW_PRIVMSG: i32 = -2;
pub const RAW_NOTICE: i32 = -3;
pub const RAW_KICK: i32 = -4;
pub const RAW_QUIT: i32 = -5;
pub const RAW_PART: i32 = -6;
pub const RAW_JOIN: i32 = -7;
pub const RAW_NICK: i32 = -8;
pub const RAW_MODE: i32 = -9;
pub const RAW_TOPIC: i32 = -10;
pub const RAW_CTCP: i32 = -11;
pub const RAW_CAP: i32 = -12;
pub const RAW_AWAY: i32 = -13;
pub const RAW_METADATA: i32 = -14;
pub const RAW_INVITE: i32 = -15;
/// <https://ircv3.net/specs/extensions/chghost>
pub const RAW_CHGHOST: i32 = -16;
pub const RAW_PONG: i32 = 0;

// === Connection Registration (001-099) ===
/// 001 - Welcome to the IRC network
pub const WELCOME: i32 = 1;
/// 002 - Your host is running version
pub const YOURHOST: i32 = 2;
/// 003 - Server creation date
pub const CREATED: i32 = 3;
/// 004 - Server name, version, user modes, channel modes
pub const MYINFO: i32 = 4;
/// 005 - Server supported features
pub const ISUPPORT: i32 = 5;

// === Command Responses (200-399) ===
/// 301 - Target user is away
pub const AWAY: i32 = 301;
/// 305 - You are no longer marked as away
pub const UNAWAY: i32 = 305;
/// 306 - You have been marked as away
pub const NOWAWAY: i32 = 306;
/// 307 - WHOIS registered nick
pub const WHOISREGNICK: i32 = 307;
/// 311 - WHOIS user info
pub const WHOISUSER: i32 = 311;
/// 312 - WHOIS server
pub const WHOISSERVER: i32 = 312;
/// 313 - WHOIS operator
pub const WHOISOPERATOR: i32 = 313;
/// 315 - End of WHO
pub const ENDOFWHO: i32 = 315;
/// 317 - WHOIS idle time
pub const WHOISIDLE: i32 = 317;
/// 318 - End of WHOIS
pub const ENDOFWHOIS: i32 = 318;
/// 319 - WHOIS channels
pub const WHOISCHANNELS: i32 = 319;
/// 320 - WHOIS special (Unreal)
pub const WHOISSPECIAL: i32 = 320;
/// 324 - Channel mode is
pub const MODEINFO: i32 = 324;
/// 329 - Channel creation time
pub const CREATIONTIME: i32 = 329;
/// 330 - WHOIS account
pub const WHOISACCOUNT: i32 = 330;
/// 331 - No topic set
pub const NOTOPIC: i32 = 331;
/// 332 - Channel topic
pub const TOPICINFO: i32 = 332;
/// 333 - Topic setter and time
pub const TOPICWHOTIME: i32 = 333;
/// 346 - Invite exception list entry
pub const INVITELIST: i32 = 346;
/// 347 - End of invite exception list
pub const ENDOFINVITELIST: i32 = 347;
/// 348 - Ban exception list entry
pub const EXCEPTION: i32 = 348;
/// 349 - End of ban exception list
pub const ENDOFEXCEPTS: i32 = 349;
/// 352 - WHO reply
pub const WHOREPLY: i32 = 352;
/// 353 - NAMES reply
pub const NAMREPLY: i32 = 353;
/// 366 - End of NAMES
pub const ENDOFNAMES: i32 = 366;
/// 367 - Ban list entry
pub const BAN: i32 = 367;
/// 368 - End of ban list
pub const ENDOFBANS: i32 = 368;
/// 372 - MOTD line
pub const MOTD: i32 = 372;
/// 375 - MOTD start
pub const MOTDBEGIN: i32 = 375;
/// 376 - End of MOTD
pub const MOTDEND: i32 = 376;
/// 378 - WHOIS connecting host (Unreal)
pub const WHOISHOST: i32 = 378;
/// 379 - WHOIS user modes (Unreal)
pub const WHOISMODES: i32 = 379;

// === Error Replies (400-599) ===
/// 410 - Invalid CAP subcommand
pub const ERR_INVALIDCAPCMD: i32 = 410;
/// 421 - Unknown command
pub const UNKNOWN: i32 = 421;
/// 433 - Nickname is already in use
pub const NICKUSED: i32 = 433;
/// 437 - Nick/channel is temporarily unavailable
pub const NICKISNOTAVAILABLE: i32 = 437;

// === Extended (600-999) ===
/// 671 - WHOIS secure connection
pub const WHOISSECURE: i32 = 671;

/// Map a textual command onto its `RAW_*` sentinel.
///
/// Commands are matched case-sensitively, as servers send them upper case.
pub fn from_command(command: &str) -> i32 {
    match command {
        "PING" => RAW_PING,
        "JOIN" => RAW_JOIN,
        "NICK" => RAW_NICK,
        "PONG" => RAW_PONG,
        "NOTICE" => RAW_NOTICE,
        "MODE" => RAW_MODE,
        "PRIVMSG" => RAW_PRIVMSG,
        "KICK" => RAW_KICK,
        "TOPIC" => RAW_TOPIC,
        "PART" => RAW_PART,
        "QUIT" => RAW_QUIT,
        "AWAY" => RAW_AWAY,
        "CAP" => RAW_CAP,
        "METADATA" => RAW_METADATA,
        "INVITE" => RAW_INVITE,
        "CHGHOST" => RAW_CHGHOST,
        _ => RAW_UNKNOWN,
    }
}

/// Returns true for the numerics that belong to a WHOIS reply.
pub fn is_whois(numeric: i32) -> bool {
    matches!(
        numeric,
        WHOISREGNICK
            | WHOISUSER
            | WHOISSERVER
            | WHOISOPERATOR
            | WHOISIDLE
            | ENDOFWHOIS
            | WHOISCHANNELS
            | WHOISSPECIAL
            | WHOISACCOUNT
            | WHOISHOST
            | WHOISMODES
            | WHOISSECURE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_table() {
        assert_eq!(from_command("PRIVMSG"), RAW_PRIVMSG);
        assert_eq!(from_command("CHGHOST"), RAW_CHGHOST);
        assert_eq!(from_command("PONG"), RAW_PONG);
        assert_eq!(from_command("WALLOPS"), RAW_UNKNOWN);
    }

    #[test]
    fn test_sentinels_do_not_collide() {
        let raws = [
            RAW_PING, RAW_PRIVMSG, RAW_NOTICE, RAW_KICK, RAW_QUIT, RAW_PART, RAW_JOIN, RAW_NICK,
            RAW_MODE, RAW_TOPIC, RAW_CTCP, RAW_CAP, RAW_AWAY, RAW_METADATA, RAW_INVITE,
            RAW_CHGHOST,
        ];
        for raw in raws {
            assert!(raw < 0);
            assert_ne!(raw, INVALID);
            assert_ne!(raw, RAW_UNKNOWN);
        }
    }
}
