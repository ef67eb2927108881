//! The lexer sits directly on top of a stream of `char`s and produces fully formed [Token]s
//! along with the [Span] over which each token was matched.  It is a simple LA(1) lexer which
//! skips over insignificant whitespace between tokens.
//!
//! Strings are fully unescaped during lexing, so that the DOM parser can move them directly
//! into the resulting tree.
use std::fmt::{Display, Formatter};

use crate::coords::{Coords, Span};
use crate::errors::{Details, ParserResult};
use crate::lexer_error;

/// Sequence of literal characters forming a 'null' token
const NULL_SEQUENCE: &str = "null";
/// Sequence of literal characters forming a 'true' token
const TRUE_SEQUENCE: &str = "true";
/// Sequence of literal characters forming a 'false' token
const FALSE_SEQUENCE: &str = "false";

/// Default string buffer capacity
const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Enumeration of valid JSON tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Colon,
    Comma,
    Str(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
    Null,
    EndOfInput,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::StartObject => write!(f, "StartObject"),
            Token::EndObject => write!(f, "EndObject"),
            Token::StartArray => write!(f, "StartArray"),
            Token::EndArray => write!(f, "EndArray"),
            Token::Colon => write!(f, "Colon"),
            Token::Comma => write!(f, "Comma"),
            Token::Str(str) => write!(f, "String(\"{}\")", str),
            Token::Float(num) => write!(f, "Float({})", num),
            Token::Integer(num) => write!(f, "Integer({})", num),
            Token::Boolean(bool) => write!(f, "Boolean({})", bool),
            Token::Null => write!(f, "Null"),
            Token::EndOfInput => write!(f, "EndOfInput"),
        }
    }
}

/// A packed token consists of a [Token] and the [Span] associated with it
pub type PackedToken = (Token, Span);

/// Convenience macro for packing tokens along with their positional information
macro_rules! packed_token {
    ($t:expr, $s:expr, $e:expr) => {
        ($t, Span { start: $s, end: $e })
    };
    ($t:expr, $s:expr) => {
        ($t, Span { start: $s, end: $s })
    };
}

/// A lexer implementation which will consume a stream of `char`s and produce a stream of
/// [Token]s.
pub struct Lexer<'a> {
    /// The underlying source of characters
    chars: &'a mut dyn Iterator<Item = char>,
    /// Single character lookahead
    lookahead: Option<char>,
    /// Coordinates of the next character to be consumed
    coords: Coords,
    /// Internal buffer for hoovering up numeric lexemes from the input
    buffer: String,
}

impl<'a> Lexer<'a> {
    pub fn new(chars: &'a mut dyn Iterator<Item = char>) -> Self {
        Lexer {
            chars,
            lookahead: None,
            coords: Coords::default(),
            buffer: String::with_capacity(DEFAULT_BUFFER_CAPACITY),
        }
    }

    /// The coordinates of the next character to be consumed from the input
    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// Consume the next token from the input stream. Looks ahead a single character (after
    /// skipping whitespace) and then, based on the grammar rules, attempts to match a token
    /// based on the prefix found.  Once the input is exhausted, every subsequent call will
    /// produce [Token::EndOfInput].
    pub fn consume(&mut self) -> ParserResult<PackedToken> {
        self.skip_whitespace();
        let start = self.coords;
        match self.peek() {
            None => Ok(packed_token!(Token::EndOfInput, start)),
            Some(c) => match c {
                '{' => self.match_single(Token::StartObject),
                '}' => self.match_single(Token::EndObject),
                '[' => self.match_single(Token::StartArray),
                ']' => self.match_single(Token::EndArray),
                ':' => self.match_single(Token::Colon),
                ',' => self.match_single(Token::Comma),
                '"' => self.match_string(),
                'n' => self.match_literal(NULL_SEQUENCE, Token::Null),
                't' => self.match_literal(TRUE_SEQUENCE, Token::Boolean(true)),
                'f' => self.match_literal(FALSE_SEQUENCE, Token::Boolean(false)),
                '-' | '0'..='9' => self.match_number(),
                c => lexer_error!(Details::InvalidCharacter(c), start),
            },
        }
    }

    /// Peek at the next character in the input without consuming it
    #[inline]
    fn peek(&mut self) -> Option<char> {
        if self.lookahead.is_none() {
            self.lookahead = self.chars.next();
        }
        self.lookahead
    }

    /// Consume the next character in the input, updating the current coordinates
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let next = match self.lookahead.take() {
            Some(c) => Some(c),
            None => self.chars.next(),
        };
        if let Some(c) = next {
            self.coords.advance(c);
        }
        next
    }

    /// Only the four whitespace characters allowed by RFC 8259 are skipped
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.peek() {
            self.advance();
        }
    }

    /// Consume a single structural character and return the associated [PackedToken]
    fn match_single(&mut self, token: Token) -> ParserResult<PackedToken> {
        let start = self.coords;
        self.advance();
        Ok(packed_token!(token, start))
    }

    /// Consume and match (exactly) a sequence of literal characters from the input stream
    fn match_literal(&mut self, seq: &str, token: Token) -> ParserResult<PackedToken> {
        let start = self.coords;
        for expected in seq.chars() {
            match self.advance() {
                Some(c) if c == expected => (),
                Some(_) => return lexer_error!(Details::MatchFailed, self.coords),
                None => return lexer_error!(Details::EndOfInput, self.coords),
            }
        }
        Ok(packed_token!(token, start, self.coords))
    }

    /// Consume a run of decimal digits into the internal buffer, returning the number of
    /// digits found
    fn match_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(d @ '0'..='9') = self.peek() {
            self.buffer.push(d);
            self.advance();
            count += 1;
        }
        count
    }

    /// Attempt to match on a number representation. The lexeme is validated against the JSON
    /// number grammar first, given that fast_float will happily accept things like multiple
    /// leading zeros.  Integral values are parsed with lexical when mixed numerics are enabled,
    /// and everything else is handed to fast_float.
    fn match_number(&mut self) -> ParserResult<PackedToken> {
        let start = self.coords;
        self.buffer.clear();
        let mut integral = true;

        if self.peek() == Some('-') {
            self.buffer.push('-');
            self.advance();
        }

        match self.peek() {
            Some('0') => {
                self.buffer.push('0');
                self.advance();
                if let Some('0'..='9') = self.peek() {
                    return self.invalid_number();
                }
            }
            Some('1'..='9') => {
                self.match_digits();
            }
            _ => return self.invalid_number(),
        }

        if self.peek() == Some('.') {
            integral = false;
            self.buffer.push('.');
            self.advance();
            if self.match_digits() == 0 {
                return self.invalid_number();
            }
        }

        if let Some(e @ ('e' | 'E')) = self.peek() {
            integral = false;
            self.buffer.push(e);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.buffer.push(sign);
                self.advance();
            }
            if self.match_digits() == 0 {
                return self.invalid_number();
            }
        }

        let token = if integral {
            self.integral_token()?
        } else {
            self.float_token()?
        };
        Ok(packed_token!(token, start, self.coords))
    }

    #[cfg(feature = "mixed_numerics")]
    fn integral_token(&self) -> ParserResult<Token> {
        match lexical::parse::<i64, _>(self.buffer.as_bytes()) {
            Ok(value) => Ok(Token::Integer(value)),
            Err(_) => self.float_token(),
        }
    }

    #[cfg(not(feature = "mixed_numerics"))]
    fn integral_token(&self) -> ParserResult<Token> {
        self.float_token()
    }

    fn float_token(&self) -> ParserResult<Token> {
        match fast_float::parse::<f64, _>(self.buffer.as_bytes()) {
            Ok(value) => Ok(Token::Float(value)),
            Err(_) => lexer_error!(
                Details::InvalidNumericRepresentation(self.buffer.clone()),
                self.coords
            ),
        }
    }

    fn invalid_number<T>(&mut self) -> ParserResult<T> {
        if let Some(c) = self.peek() {
            self.buffer.push(c);
        }
        lexer_error!(
            Details::InvalidNumericRepresentation(self.buffer.clone()),
            self.coords
        )
    }

    /// Attempts to match a string token, translating any escape sequences found along the
    /// way. Raw control characters are rejected.
    fn match_string(&mut self) -> ParserResult<PackedToken> {
        let start = self.coords;
        let mut value = String::new();
        self.advance();
        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => self.match_escape_sequence(&mut value)?,
                Some(c) if c < '\u{20}' => {
                    return lexer_error!(Details::InvalidCharacter(c), self.coords)
                }
                Some(c) => value.push(c),
                None => return lexer_error!(Details::EndOfInput, self.coords),
            }
        }
        Ok(packed_token!(Token::Str(value), start, self.coords))
    }

    /// Match a valid string escape sequence, pushing the translated character
    fn match_escape_sequence(&mut self, value: &mut String) -> ParserResult<()> {
        match self.advance() {
            Some('"') => value.push('"'),
            Some('\\') => value.push('\\'),
            Some('/') => value.push('/'),
            Some('b') => value.push('\u{08}'),
            Some('f') => value.push('\u{0c}'),
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some('t') => value.push('\t'),
            Some('u') => value.push(self.match_unicode_escape_sequence()?),
            Some(c) => {
                return lexer_error!(Details::InvalidEscapeSequence(format!("\\{}", c)), self.coords)
            }
            None => return lexer_error!(Details::EndOfInput, self.coords),
        }
        Ok(())
    }

    /// Match a unicode escape sequence in the form uXXXX, where each X is a valid hex digit.
    /// High surrogates must be immediately followed by an escaped low surrogate
    fn match_unicode_escape_sequence(&mut self) -> ParserResult<char> {
        let high = self.match_hex_quad()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if self.advance() != Some('\\') || self.advance() != Some('u') {
                    return lexer_error!(
                        Details::InvalidUnicodeEscapeSequence(format!("\\u{:04x}", high)),
                        self.coords
                    );
                }
                let low = self.match_hex_quad()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return lexer_error!(
                        Details::InvalidUnicodeEscapeSequence(format!(
                            "\\u{:04x}\\u{:04x}",
                            high, low
                        )),
                        self.coords
                    );
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return lexer_error!(
                    Details::InvalidUnicodeEscapeSequence(format!("\\u{:04x}", high)),
                    self.coords
                )
            }
            code => code,
        };
        match char::from_u32(code) {
            Some(c) => Ok(c),
            None => lexer_error!(
                Details::InvalidUnicodeEscapeSequence(format!("\\u{:04x}", code)),
                self.coords
            ),
        }
    }

    fn match_hex_quad(&mut self) -> ParserResult<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            match self.advance() {
                Some(c) => match c.to_digit(16) {
                    Some(d) => code = (code << 4) | d,
                    None => {
                        return lexer_error!(
                            Details::InvalidUnicodeEscapeSequence(format!("\\u..{}", c)),
                            self.coords
                        )
                    }
                },
                None => return lexer_error!(Details::EndOfInput, self.coords),
            }
        }
        Ok(code)
    }
}
