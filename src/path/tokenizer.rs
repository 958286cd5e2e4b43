//! Path string -> [`PathToken`]s.
//!
//! Accepted forms:
//!
//! ```text
//! $.store.book[0].title        names and indices
//! $['first name']["x"]         quoted names
//! $.`*                         backtick: literal name
//! $..author  $.*  $[*]         recursive descent, wildcard
//! $[1:-1:2]  $[-1]             slices, negative indices
//! $[?(@.price < 10)]  $[(@.length-1)]
//! $.a^  $.*~  $..*@string()    parent, property name, type check
//! $['a','b',0]                 union
//! ```
//!
//! The leading `$` is optional. Filter and script sources are captured
//! verbatim; they are parsed by the expression parser on first use.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tokens::{PathToken, Slice, ValueType};
use crate::{
    lexer::{
        AT_CODE, BACKTICK_CODE, BSLASH_CODE, CARET_CODE, CBRACK_CODE, COMMA_CODE, CPAREN_CODE,
        DOLLAR_CODE, DQUOTE_CODE, EOF_CODE, Lexer, OBRACK_CODE, OPAREN_CODE, PERIOD_CODE,
        QUMARK_CODE, SQUOTE_CODE, STAR_CODE, TILDE_CODE,
    },
    parser::{ParseError, ParseResult},
};

static SLICE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d*):(-?\d*)(?::(-?\d*))?$").expect("Failed to compile slice regex")
});

static INDEX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+$").expect("Failed to compile index regex"));

static TYPE_CHECK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([A-Za-z]+)\(\)").expect("Failed to compile type check regex"));

/// Splits a path string into tokens.
pub fn tokenize(path: &str) -> ParseResult<Vec<PathToken>> {
    PathTokenizer::new(path).tokenize()
}

struct PathTokenizer {
    lexer: Lexer,
    tokens: Vec<PathToken>,
}

impl PathTokenizer {
    fn new(path: &str) -> Self {
        PathTokenizer {
            lexer: Lexer::new(path),
            tokens: Vec::new(),
        }
    }

    fn error(&self, description: impl Into<String>) -> ParseError {
        ParseError::new(description, self.lexer.position())
    }

    fn unexpected(&self) -> ParseError {
        match self.lexer.current_char() {
            Some(c) => self.error(format!("Unexpected \"{}\"", c)),
            None => self.error("Unexpected end of path"),
        }
    }

    fn tokenize(mut self) -> ParseResult<Vec<PathToken>> {
        match self.lexer.current_code() {
            DOLLAR_CODE => self.lexer.advance(),
            PERIOD_CODE | OBRACK_CODE | CARET_CODE | TILDE_CODE | AT_CODE | EOF_CODE => {}
            _ => self.member_name()?,
        }

        while !self.lexer.at_end() {
            match self.lexer.current_code() {
                PERIOD_CODE if self.lexer.code_at(1) == PERIOD_CODE => {
                    self.lexer.advance_by(2);
                    self.tokens.push(PathToken::Descendant);
                    match self.lexer.current_code() {
                        EOF_CODE | OBRACK_CODE | CARET_CODE | TILDE_CODE | AT_CODE => {}
                        PERIOD_CODE => return Err(self.unexpected()),
                        _ => self.member_name()?,
                    }
                }
                PERIOD_CODE => {
                    self.lexer.advance();
                    match self.lexer.current_code() {
                        // `.[` reads as `[`
                        OBRACK_CODE | AT_CODE => {}
                        EOF_CODE | PERIOD_CODE | CARET_CODE | TILDE_CODE => {
                            return Err(self.unexpected());
                        }
                        _ => self.member_name()?,
                    }
                }
                OBRACK_CODE => self.bracket()?,
                CARET_CODE => {
                    self.lexer.advance();
                    self.tokens.push(PathToken::Parent);
                }
                TILDE_CODE => {
                    self.lexer.advance();
                    self.tokens.push(PathToken::PropertyName);
                }
                AT_CODE => self.type_check()?,
                _ => return Err(self.unexpected()),
            }
        }
        Ok(self.tokens)
    }

    /// `*`, a backtick literal, or a plain name after `.` / `..`.
    fn member_name(&mut self) -> ParseResult<()> {
        match self.lexer.current_code() {
            STAR_CODE => {
                self.lexer.advance();
                self.tokens.push(PathToken::Wildcard);
            }
            BACKTICK_CODE => {
                self.lexer.advance();
                let name = self.read_name();
                self.tokens.push(PathToken::Name(name));
            }
            _ => {
                let name = self.read_name();
                if name.is_empty() {
                    return Err(self.unexpected());
                }
                self.tokens.push(PathToken::Name(name));
            }
        }
        Ok(())
    }

    /// Characters up to the next `.`, `[`, `^`, `~` or type check.
    fn read_name(&mut self) -> String {
        let start = self.lexer.position();
        while !self.lexer.at_end() {
            match self.lexer.current_code() {
                PERIOD_CODE | OBRACK_CODE | CARET_CODE | TILDE_CODE => break,
                AT_CODE if self.at_type_check() => break,
                _ => self.lexer.advance(),
            }
        }
        self.lexer.slice(start, self.lexer.position())
    }

    fn at_type_check(&self) -> bool {
        let rest = self.lexer.lookahead(self.lexer.remaining());
        TYPE_CHECK_REGEX
            .captures(&rest)
            .and_then(|caps| caps.get(1))
            .is_some_and(|name| ValueType::from_name(name.as_str()).is_some())
    }

    fn type_check(&mut self) -> ParseResult<()> {
        let rest = self.lexer.lookahead(self.lexer.remaining());
        let Some(caps) = TYPE_CHECK_REGEX.captures(&rest) else {
            return Err(self.unexpected());
        };
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            return Err(self.unexpected());
        };
        let Some(value_type) = ValueType::from_name(name.as_str()) else {
            return Err(self.error(format!("Unknown value type {}", name.as_str())));
        };
        self.lexer.advance_by(whole.as_str().chars().count());
        self.tokens.push(PathToken::TypeCheck(value_type));
        Ok(())
    }

    fn bracket(&mut self) -> ParseResult<()> {
        let open = self.lexer.position();
        self.lexer.advance();
        self.lexer.skip_whitespace();

        let token = match self.lexer.current_code() {
            QUMARK_CODE if self.lexer.code_at(1) == OPAREN_CODE => {
                self.lexer.advance();
                PathToken::Filter(self.parenthesized()?)
            }
            OPAREN_CODE => PathToken::Script(self.parenthesized()?),
            _ => {
                let mut members = self.members(open)?;
                if members.len() == 1 {
                    members.remove(0)
                } else {
                    PathToken::Union(members)
                }
            }
        };

        if matches!(token, PathToken::Filter(_) | PathToken::Script(_)) {
            self.lexer.skip_whitespace();
            if self.lexer.current_code() != CBRACK_CODE {
                return Err(ParseError::new("Unclosed [", open));
            }
            self.lexer.advance();
        }
        self.tokens.push(token);
        Ok(())
    }

    /// Source between a `(` at the cursor and its matching `)`, skipping
    /// over quoted strings.
    fn parenthesized(&mut self) -> ParseResult<String> {
        let open = self.lexer.position();
        self.lexer.advance();
        let start = self.lexer.position();
        let mut depth = 1usize;
        let mut quote: Option<u32> = None;

        while !self.lexer.at_end() {
            let code = self.lexer.current_code();
            match quote {
                Some(_) if code == BSLASH_CODE => self.lexer.advance(),
                Some(q) if code == q => quote = None,
                Some(_) => {}
                None => match code {
                    SQUOTE_CODE | DQUOTE_CODE => quote = Some(code),
                    OPAREN_CODE => depth += 1,
                    CPAREN_CODE => {
                        depth -= 1;
                        if depth == 0 {
                            let source = self.lexer.slice(start, self.lexer.position());
                            self.lexer.advance();
                            return Ok(source);
                        }
                    }
                    _ => {}
                },
            }
            self.lexer.advance();
        }
        Err(ParseError::new("Unclosed (", open))
    }

    /// Comma-separated bracket members up to and including `]`.
    fn members(&mut self, open: usize) -> ParseResult<Vec<PathToken>> {
        let mut members = Vec::new();
        loop {
            self.lexer.skip_whitespace();
            let member = match self.lexer.current_code() {
                EOF_CODE => return Err(ParseError::new("Unclosed [", open)),
                SQUOTE_CODE | DQUOTE_CODE => PathToken::Name(self.quoted()?),
                BACKTICK_CODE => {
                    self.lexer.advance();
                    PathToken::Name(self.raw_member().trim_end().to_string())
                }
                STAR_CODE => {
                    self.lexer.advance();
                    PathToken::Wildcard
                }
                _ => {
                    let raw = self.raw_member();
                    let raw = raw.trim();
                    if raw.is_empty() {
                        let description = if members.is_empty() && self.lexer.current_code() == CBRACK_CODE {
                            "Empty brackets"
                        } else {
                            "Expected name, index or slice"
                        };
                        return Err(self.error(description));
                    }
                    classify_member(raw).map_err(|d| self.error(d))?
                }
            };
            members.push(member);

            self.lexer.skip_whitespace();
            match self.lexer.current_code() {
                COMMA_CODE => self.lexer.advance(),
                CBRACK_CODE => {
                    self.lexer.advance();
                    return Ok(members);
                }
                EOF_CODE => return Err(ParseError::new("Unclosed [", open)),
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn raw_member(&mut self) -> String {
        let start = self.lexer.position();
        while !self.lexer.at_end()
            && !matches!(self.lexer.current_code(), COMMA_CODE | CBRACK_CODE)
        {
            self.lexer.advance();
        }
        self.lexer.slice(start, self.lexer.position())
    }

    /// Quoted name; a backslash keeps the following character as is.
    fn quoted(&mut self) -> ParseResult<String> {
        let open = self.lexer.position();
        let quote = self.lexer.current_code();
        self.lexer.advance();
        let mut name = String::new();
        while let Some(ch) = self.lexer.current_char() {
            self.lexer.advance();
            let code = ch as u32;
            if code == quote {
                return Ok(name);
            }
            if code == BSLASH_CODE {
                if let Some(escaped) = self.lexer.current_char() {
                    self.lexer.advance();
                    name.push(escaped);
                }
                continue;
            }
            name.push(ch);
        }
        Err(ParseError::new(
            format!("Unclosed quote after \"{}\"", name),
            open,
        ))
    }
}

fn parse_bound(text: Option<regex::Match<'_>>) -> Result<Option<i64>, String> {
    match text.map(|m| m.as_str()).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("Slice bound out of range: {}", s)),
    }
}

fn classify_member(raw: &str) -> Result<PathToken, String> {
    if let Some(caps) = SLICE_REGEX.captures(raw) {
        return Ok(PathToken::Slice(Slice {
            start: parse_bound(caps.get(1))?,
            end: parse_bound(caps.get(2))?,
            step: parse_bound(caps.get(3))?,
        }));
    }
    if INDEX_REGEX.is_match(raw) {
        return raw
            .parse::<i64>()
            .map(PathToken::Index)
            .map_err(|_| format!("Index out of range: {}", raw));
    }
    Ok(PathToken::Name(raw.to_string()))
}
