//! Classification of server lines into the numeric dispatch space.
//!
//! Run with: `cargo test --test line_parsing`

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use slirc_client::{numeric, Line, LineParseError};

mod classification {
    use super::*;

    #[test]
    fn test_welcome_is_numeric_one() {
        let line = Line::parse(":irc.example.com 001 Nick :Welcome").unwrap();
        assert_eq!(line.numeric(), 1);
        assert_eq!(line.command(), "001");
        assert_eq!(line.source(), Some("irc.example.com"));
    }

    #[test]
    fn test_privmsg_sentinel_and_source_user() {
        let line = Line::parse(":a!b@c PRIVMSG #chan :hi").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_PRIVMSG);
        assert!(line.numeric() < 0);
        let user = line.user().unwrap();
        assert_eq!(user.nick, "a");
        assert_eq!(user.ident, "b");
        assert_eq!(user.host, "c");
        assert_eq!(line.parameters(), ["#chan"]);
        assert_eq!(line.text(), "hi");
    }

    #[test]
    fn test_bare_ping() {
        let line = Line::parse("PING :abc").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_PING);
        assert_eq!(line.parameters(), ["abc"]);
        assert_eq!(line.source(), None);
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(Line::parse("garbage"), Err(LineParseError::MissingColon));
    }

    #[test]
    fn test_empty_is_invalid() {
        assert_eq!(Line::parse("\r\n"), Err(LineParseError::Empty));
    }

    #[test]
    fn test_source_without_command() {
        assert_eq!(Line::parse(":server"), Err(LineParseError::MissingCommand));
    }

    #[test]
    fn test_bare_notice_is_invalid() {
        assert!(Line::parse("NOTICE * :hello").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let line = Line::parse(":server WALLOPS :hey").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_UNKNOWN);
        assert_eq!(line.command(), "WALLOPS");
    }

    #[test]
    fn test_pong_maps_to_zero() {
        let line = Line::parse(":server PONG server :123").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_PONG);
        assert_eq!(line.numeric(), 0);
    }

    #[test]
    fn test_empty_parameters_are_dropped() {
        let line = Line::parse(":s 353 me  =  #chan :a b").unwrap();
        assert_eq!(line.parameters(), ["me", "=", "#chan"]);
    }

    #[test]
    fn test_trailing_text_keeps_colons_and_spaces() {
        let line = Line::parse(":n!u@h PRIVMSG #c :a :b  c").unwrap();
        assert_eq!(line.text(), "a :b  c");
    }

    #[test]
    fn test_no_trailing_text() {
        let line = Line::parse(":n!u@h JOIN #chan").unwrap();
        assert!(!line.has_text());
        assert_eq!(line.last_argument(), Some("#chan"));
    }

    #[test]
    fn test_crlf_is_stripped() {
        let line = Line::parse(":n!u@h NICK new\r\n").unwrap();
        assert_eq!(line.raw(), ":n!u@h NICK new");
    }
}

mod tags {
    use super::*;

    #[test]
    fn test_server_time_overrides_receive_time() {
        let received = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let line = Line::parse_at(
            "@time=2011-10-19T16:40:51.620Z :n!u@h PRIVMSG #c :hi",
            received,
        )
        .unwrap();
        assert_eq!(
            line.time(),
            Utc.with_ymd_and_hms(2011, 10, 19, 16, 40, 51).unwrap()
                + chrono::Duration::milliseconds(620)
        );
    }

    #[test]
    fn test_bad_time_falls_back() {
        let received = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let line = Line::parse_at("@time=yesterday :n!u@h PRIVMSG #c :hi", received).unwrap();
        assert_eq!(line.time(), received);
    }

    #[test]
    fn test_tags_are_unescaped() {
        let line = Line::parse("@label=a\\sb;draft/flag :s NOTICE * :x").unwrap();
        assert_eq!(line.tag("label"), Some("a b"));
        assert_eq!(line.tag("draft/flag"), None);
        assert_eq!(line.tags().len(), 2);
        assert_eq!(line.raw(), ":s NOTICE * :x");
        assert!(line.original_raw().starts_with("@label"));
    }

    #[test]
    fn test_tagged_bare_ping() {
        let line = Line::parse("@msgid=1 PING :tok").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_PING);
        assert_eq!(line.tag("msgid"), Some("1"));
    }
}

proptest! {
    #[test]
    fn parser_never_panics(input in "[^\r\n]{0,300}") {
        let _ = Line::parse(&input);
    }

    #[test]
    fn numeric_replies_keep_their_number(code in 1u32..1000, nick in "[a-zA-Z][a-zA-Z0-9]{0,8}") {
        let raw = format!(":irc.example.com {:03} {} :text", code, nick);
        let line = Line::parse(&raw).unwrap();
        prop_assert_eq!(line.numeric(), code as i32);
        prop_assert_eq!(line.parameters(), [nick]);
    }

    #[test]
    fn lines_without_colon_are_invalid_unless_bare(word in "[A-Z]{1,10}") {
        prop_assume!(word != "PING" && word != "ERROR");
        let raw = format!("{} :x", word);
        prop_assert!(Line::parse(&raw).is_err());
    }
}
