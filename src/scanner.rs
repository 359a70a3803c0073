//! Lexer for Rox source text.
//!
//! [`Scanner`] walks the UTF‑8 input once and yields `Result<Token>` items:
//! one per lexeme, one `Err` per lexical error, and exactly one trailing `EOF`
//! token.  Scanning never stops at an error; the offending input is skipped
//! and the next lexeme is tried.
//!
//! Whitespace and `//` comments produce nothing.  Strings may span lines and
//! carry no escapes.  Numbers are decimal with an optional fractional part;
//! a trailing `.` is not consumed.
//!
//! Lexeme boundaries always fall on ASCII bytes (or on a code point boundary
//! for an unexpected character), so slicing the source `&str` never splits a
//! code point.
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! for result in Scanner::new("print 123; // example") {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("Lex error: {}", err),
//!     }
//! }
//! ```

use std::iter::FusedIterator;

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::diagnostics::Diagnostics;
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

/// Reserved words, looked up once an identifier has been scanned.
static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "for"    => TokenType::FOR,
    "fun"    => TokenType::FUN,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    start: usize, // first byte of the lexeme being scanned
    pos: usize,   // next byte to examine
    line: usize,
    done: bool, // EOF already emitted
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        info!("Scanner created over {} bytes", text.len());

        Self {
            text,
            bytes: text.as_bytes(),
            start: 0,
            pos: 0,
            line: 1,
            done: false,
        }
    }

    /// Scan the whole input, reporting lexical errors to `diagnostics` and
    /// returning every well‑formed token (always terminated by `EOF`).
    pub fn scan(self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();

        for result in self {
            match result {
                Ok(token) => tokens.push(token),
                Err(e) => diagnostics.report(e),
            }
        }

        info!("Scanned {} tokens", tokens.len());
        tokens
    }

    #[inline(always)]
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Byte `ahead` positions past the cursor, or `0` beyond the input.
    #[inline(always)]
    fn peek_at(&self, ahead: usize) -> u8 {
        self.bytes.get(self.pos + ahead).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn bump(&mut self) -> u8 {
        let b = self.bytes[self.pos];
        self.pos += 1;
        b
    }

    /// `long` if the next byte is `=` (consuming it), `short` otherwise.
    fn with_equal(&mut self, long: TokenType, short: TokenType) -> TokenType {
        if self.peek_at(0) == b'=' {
            self.pos += 1;
            long
        } else {
            short
        }
    }

    fn lexeme(&self) -> &'a str {
        &self.text[self.start..self.pos]
    }

    /// Scan one lexeme starting at `self.start`.  `Ok(None)` means it was
    /// whitespace or a comment.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.with_equal(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.with_equal(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.with_equal(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.with_equal(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' if self.peek_at(0) == b'/' => {
                // The newline itself is left for the main loop to count.
                self.pos = match memchr(b'\n', &self.bytes[self.pos..]) {
                    Some(offset) => self.pos + offset,
                    None => self.bytes.len(),
                };
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),
            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                let c: char = self.text[self.start..].chars().next().unwrap_or('?');
                self.pos = self.start + c.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        };

        Ok(Some(kind))
    }

    fn string(&mut self) -> Result<TokenType> {
        let open_line = self.line;

        match memchr(b'"', &self.bytes[self.pos..]) {
            Some(offset) => {
                let body: &str = &self.text[self.pos..self.pos + offset];
                self.line += body.bytes().filter(|&b| b == b'\n').count();
                self.pos += offset + 1;

                Ok(TokenType::STRING(body.to_owned()))
            }
            None => {
                let rest: &str = &self.text[self.pos..];
                self.line += rest.bytes().filter(|&b| b == b'\n').count();
                self.pos = self.bytes.len();

                debug!("String opened on line {} never closes", open_line);
                Err(LoxError::lex(self.line, "Unterminated string."))
            }
        }
    }

    fn number(&mut self) -> TokenType {
        while self.peek_at(0).is_ascii_digit() {
            self.pos += 1;
        }

        if self.peek_at(0) == b'.' && self.peek_at(1).is_ascii_digit() {
            self.pos += 1;
            while self.peek_at(0).is_ascii_digit() {
                self.pos += 1;
            }
        }

        // Only digits and at most one interior '.', so this always parses.
        TokenType::NUMBER(self.lexeme().parse::<f64>().unwrap_or_default())
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.peek_at(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }

        KEYWORDS
            .get(self.lexeme())
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.at_end() {
            self.start = self.pos;

            match self.scan_token() {
                Ok(Some(kind)) => {
                    debug!("Scanned {} on line {}", kind.name(), self.line);
                    return Some(Ok(Token::new(kind, self.lexeme(), self.line)));
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl FusedIterator for Scanner<'_> {}
