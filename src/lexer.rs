//! Scan cursor shared by the expression parser and the path tokenizer.
//!
//! The cursor never buffers tokens: callers inspect the current character
//! code and consume input inline. Characters are classified by numeric code
//! against fixed boundaries rather than by string comparison.

pub const EOF_CODE: u32 = u32::MAX;

pub const TAB_CODE: u32 = 9;
pub const LF_CODE: u32 = 10;
pub const CR_CODE: u32 = 13;
pub const SPACE_CODE: u32 = 32;
pub const DQUOTE_CODE: u32 = 34;
pub const DOLLAR_CODE: u32 = 36;
pub const SQUOTE_CODE: u32 = 39;
pub const OPAREN_CODE: u32 = 40;
pub const CPAREN_CODE: u32 = 41;
pub const STAR_CODE: u32 = 42;
pub const PLUS_CODE: u32 = 43;
pub const COMMA_CODE: u32 = 44;
pub const MINUS_CODE: u32 = 45;
pub const PERIOD_CODE: u32 = 46;
pub const FSLASH_CODE: u32 = 47;
pub const COLON_CODE: u32 = 58;
pub const SEMCOL_CODE: u32 = 59;
pub const QUMARK_CODE: u32 = 63;
pub const AT_CODE: u32 = 64;
pub const OBRACK_CODE: u32 = 91;
pub const BSLASH_CODE: u32 = 92;
pub const CBRACK_CODE: u32 = 93;
pub const CARET_CODE: u32 = 94;
pub const BACKTICK_CODE: u32 = 96;
pub const TILDE_CODE: u32 = 126;

/// `0`-`9`
pub fn is_decimal_digit(code: u32) -> bool {
    (48..=57).contains(&code)
}

/// `A`-`Z` or `a`-`z`
pub fn is_ascii_letter(code: u32) -> bool {
    (65..=90).contains(&code) || (97..=122).contains(&code)
}

pub fn is_space(code: u32) -> bool {
    code == SPACE_CODE || code == TAB_CODE || code == LF_CODE || code == CR_CODE
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn remaining(&self) -> usize {
        self.input.len().saturating_sub(self.position)
    }

    pub fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Code of the current character, or [`EOF_CODE`] past the end.
    pub fn current_code(&self) -> u32 {
        self.code_at(0)
    }

    pub fn code_at(&self, offset: usize) -> u32 {
        self.peek_char(offset).map_or(EOF_CODE, |c| c as u32)
    }

    pub fn previous_code(&self) -> u32 {
        self.position
            .checked_sub(1)
            .and_then(|p| self.input.get(p))
            .map_or(EOF_CODE, |c| *c as u32)
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }

    pub fn advance_by(&mut self, count: usize) {
        self.position += count;
    }

    pub fn retreat(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Up to `len` characters starting at the cursor.
    pub fn lookahead(&self, len: usize) -> String {
        let end = (self.position + len).min(self.input.len());
        self.slice(self.position, end)
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.input.len());
        if start >= end {
            return String::new();
        }
        self.input[start..end].iter().collect()
    }

    pub fn skip_whitespace(&mut self) {
        while is_space(self.current_code()) {
            self.advance();
        }
    }
}
