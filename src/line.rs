//! Classification of raw server lines.
//!
//! Two shapes are accepted:
//!
//! ```text
//! PING :token
//! ERROR :reason
//! :source command [param ...] [:trailing text]
//! ```
//!
//! An optional `@tags ` block may precede either. Anything else is invalid
//! and never reaches the reducer's dispatch.

use chrono::{DateTime, Utc};
use nom::{
    bytes::complete::{tag, take_until, take_while1},
    character::complete::char,
    branch::alt,
    combinator::{opt, rest},
    error::{context, VerboseError, VerboseErrorKind},
    sequence::{pair, preceded, terminated},
    IResult,
};

use crate::error::LineParseError;
use crate::numeric;
use crate::tags::{parse_tags, server_time, Tag};
use crate::user::User;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Tag block including the separating space.
fn parse_tag_block(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRCv3 message tags",
        terminated(preceded(char('@'), take_until(" ")), char(' ')),
    )(input)
}

/// Source prefix: everything after `:` up to the first space.
fn parse_source(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing line source",
        terminated(preceded(char(':'), take_while1(|c| c != ' ')), char(' ')),
    )(input)
}

fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context("parsing command", take_while1(|c| c != ' '))(input)
}

/// The two commands servers send without a source.
fn parse_bare(input: &str) -> ParseResult<&str, (&str, &str)> {
    context(
        "parsing sourceless line",
        pair(terminated(alt((tag("PING"), tag("ERROR"))), tag(" :")), rest),
    )(input)
}

/// One classified server line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    original_raw: String,
    raw: String,
    tags: Vec<Tag>,
    source: Option<String>,
    user: Option<User>,
    command: String,
    numeric: i32,
    parameters: Vec<String>,
    text: Option<String>,
    time: DateTime<Utc>,
}

impl Line {
    /// Parse one line. A trailing CR/LF is ignored.
    ///
    /// The receive time is now unless a `time` tag says otherwise.
    pub fn parse(input: &str) -> Result<Self, LineParseError> {
        Self::parse_at(input, Utc::now())
    }

    /// Parse with an explicit receive time.
    pub fn parse_at(input: &str, received: DateTime<Utc>) -> Result<Self, LineParseError> {
        let original_raw = input.trim_end_matches(['\r', '\n']);
        if original_raw.is_empty() {
            return Err(LineParseError::Empty);
        }

        let (body, tags) = match opt(parse_tag_block)(original_raw) {
            Ok((body, block)) => (body, block.map(parse_tags).unwrap_or_default()),
            Err(e) => return Err(to_parse_error(original_raw, e)),
        };
        let time = server_time(&tags).unwrap_or(received);

        let mut line = Line {
            original_raw: original_raw.to_string(),
            raw: body.to_string(),
            tags,
            source: None,
            user: None,
            command: String::new(),
            numeric: numeric::INVALID,
            parameters: Vec::new(),
            text: None,
            time,
        };

        if !body.starts_with(':') {
            let (_, (command, token)) = parse_bare(body).map_err(|_| LineParseError::MissingColon)?;
            line.command = command.to_string();
            line.numeric = obtain_numeric(command);
            if line.numeric == numeric::RAW_PING {
                line.parameters = split_parameters(token);
            }
            line.text = Some(token.to_string());
            return Ok(line);
        }

        let (remainder, source) = parse_source(body).map_err(|_| LineParseError::MissingCommand)?;
        let (remainder, command) = parse_command(remainder).map_err(|_| LineParseError::MissingCommand)?;

        let (middle, text) = match remainder.find(" :") {
            Some(i) => (&remainder[..i], Some(&remainder[i + 2..])),
            None => (remainder, None),
        };

        line.source = Some(source.to_string());
        line.user = Some(User::from_source(source));
        line.command = command.to_string();
        line.numeric = obtain_numeric(command);
        line.parameters = split_parameters(middle);
        line.text = text.map(str::to_string);
        Ok(line)
    }

    /// The exact input, tags included.
    pub fn original_raw(&self) -> &str {
        &self.original_raw
    }

    /// The input with any tag block removed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.iter().rfind(|t| t.key == key).and_then(|t| t.value.as_deref())
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Source parsed as `nick!ident@host`, present whenever a source is.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Nick part of the source, or empty.
    pub fn source_nick(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.nick.as_str())
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Dispatch code: the reply number, a `RAW_*` sentinel or `INVALID`.
    pub fn numeric(&self) -> i32 {
        self.numeric
    }

    /// Non-trailing parameters, command excluded, empty tokens dropped.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }

    /// Trailing text after ` :`, or empty.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// Last parameter, or the trailing text when there is one.
    pub fn last_argument(&self) -> Option<&str> {
        self.text.as_deref().or_else(|| self.parameters.last().map(String::as_str))
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

impl std::str::FromStr for Line {
    type Err = LineParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Line::parse(s)
    }
}

/// Map a command token onto the dispatch space.
///
/// A token that parses as an integer is its own numeric; textual commands
/// go through the `RAW_*` table.
pub fn obtain_numeric(command: &str) -> i32 {
    if !command.is_empty() && command.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = command.parse::<i32>() {
            return n;
        }
    }
    numeric::from_command(command)
}

fn split_parameters(s: &str) -> Vec<String> {
    s.split(' ').filter(|p| !p.is_empty()).map(str::to_string).collect()
}

fn to_parse_error(input: &str, err: nom::Err<VerboseError<&str>>) -> LineParseError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let mut position = input.len();
            let mut context_info = "parsing line";
            for (error_input, kind) in &e.errors {
                position = input.len() - error_input.len();
                if let VerboseErrorKind::Context(ctx) = kind {
                    context_info = *ctx;
                }
            }
            LineParseError::Malformed {
                position,
                context: context_info,
            }
        }
        nom::Err::Incomplete(_) => LineParseError::Malformed {
            position: input.len(),
            context: "incomplete input",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_reply() {
        let line = Line::parse(":irc.example.com 001 Nick :Welcome").unwrap();
        assert_eq!(line.numeric(), 1);
        assert_eq!(line.source(), Some("irc.example.com"));
        assert_eq!(line.parameters(), ["Nick"]);
        assert_eq!(line.text(), "Welcome");
    }

    #[test]
    fn test_privmsg_source_user() {
        let line = Line::parse(":a!b@c PRIVMSG #chan :hi there").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_PRIVMSG);
        let user = line.user().unwrap();
        assert_eq!((user.nick.as_str(), user.ident.as_str(), user.host.as_str()), ("a", "b", "c"));
        assert_eq!(line.parameters(), ["#chan"]);
        assert_eq!(line.text(), "hi there");
    }

    #[test]
    fn test_bare_ping() {
        let line = Line::parse("PING :abc").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_PING);
        assert_eq!(line.parameters(), ["abc"]);
        assert!(line.source().is_none());
    }

    #[test]
    fn test_bare_error() {
        let line = Line::parse("ERROR :Closing Link: host (Quit: bye)").unwrap();
        assert_eq!(line.command(), "ERROR");
        assert_eq!(line.numeric(), numeric::RAW_UNKNOWN);
        assert!(line.parameters().is_empty());
        assert_eq!(line.text(), "Closing Link: host (Quit: bye)");
    }

    #[test]
    fn test_invalid_shapes() {
        assert_eq!(Line::parse("garbage"), Err(LineParseError::MissingColon));
        assert_eq!(Line::parse("PING abc"), Err(LineParseError::MissingColon));
        assert_eq!(Line::parse(""), Err(LineParseError::Empty));
        assert_eq!(Line::parse("\r\n"), Err(LineParseError::Empty));
        assert_eq!(Line::parse(":nospace"), Err(LineParseError::MissingCommand));
    }

    #[test]
    fn test_unknown_command_sentinel() {
        let line = Line::parse(":server WALLOPS :hello").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_UNKNOWN);
        assert_ne!(line.numeric(), numeric::INVALID);
    }

    #[test]
    fn test_trailing_only() {
        let line = Line::parse(":nick!u@h JOIN :#chan\r\n").unwrap();
        assert!(line.parameters().is_empty());
        assert_eq!(line.text(), "#chan");
        assert_eq!(line.original_raw(), ":nick!u@h JOIN :#chan");
    }

    #[test]
    fn test_empty_tokens_dropped() {
        let line = Line::parse(":server 353 me  =  #chan :a b").unwrap();
        assert_eq!(line.parameters(), ["me", "=", "#chan"]);
    }

    #[test]
    fn test_tags_and_time() {
        let raw = "@time=2023-01-01T12:00:00.000Z;msgid=x :n!u@h PRIVMSG #c :yo";
        let line = Line::parse(raw).unwrap();
        assert_eq!(line.original_raw(), raw);
        assert_eq!(line.raw(), ":n!u@h PRIVMSG #c :yo");
        assert_eq!(line.tag("msgid"), Some("x"));
        assert_eq!(line.time().timestamp(), 1_672_574_400);
    }

    #[test]
    fn test_tagged_bare_ping() {
        let line = Line::parse("@label=1 PING :tok").unwrap();
        assert_eq!(line.numeric(), numeric::RAW_PING);
        assert_eq!(line.tag("label"), Some("1"));
    }

    #[test]
    fn test_unterminated_tag_block() {
        let err = Line::parse("@tags-without-body").unwrap_err();
        assert!(matches!(err, LineParseError::MissingColon | LineParseError::Malformed { .. }));
    }
}
