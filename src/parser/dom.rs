//! The DOM parser
//!
//! Consumes [Token]s from a [Lexer] and builds a complete [JsonValue] tree.  Any JSON value is
//! accepted at the root, and the root value must account for the whole of the input: anything
//! other than whitespace following it is reported as [Details::TrailingContent].
//!
//! Objects and arrays may be nested at most [MAX_NESTING_DEPTH] deep, unless the parser is
//! configured otherwise. Anything deeper is reported as [Details::NestingTooDeep].
use std::borrow::Cow;
use std::io::BufReader;

use log::trace;

use crate::decoders::{DecoderSelector, Encoding};
use crate::errors::{Details, ParserResult};
use crate::lexer::{Lexer, PackedToken, Token};
use crate::parser_error;
use crate::JsonValue;

/// Default limit on the number of nested objects and arrays
pub const MAX_NESTING_DEPTH: usize = 128;

/// Main JSON parser struct
pub struct Parser {
    decoders: DecoderSelector,
    encoding: Encoding,
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            decoders: Default::default(),
            encoding: Default::default(),
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl Parser {
    /// Create a new instance of the parser using a specific [Encoding]
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Default::default()
        }
    }

    /// Change the limit on nested objects and arrays
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    /// The deepest nesting of objects and arrays the parser will accept
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The [Encoding] applied when parsing raw bytes
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Parse a slice of raw bytes, decoding them according to the configured [Encoding]
    pub fn parse_bytes(&self, bytes: &[u8]) -> ParserResult<JsonValue<'static>> {
        trace!("parsing {} bytes as {:?}", bytes.len(), self.encoding);
        let mut reader = BufReader::new(bytes);
        let mut chars = self.decoders.new_decoder(&mut reader, self.encoding);
        self.parse(&mut chars)
    }

    /// Parse a string slice.  The input is already decoded, so no byte decoder is involved
    pub fn parse_str(&self, str: &str) -> ParserResult<JsonValue<'static>> {
        self.parse(&mut str.chars())
    }

    pub fn parse(
        &self,
        chars: &mut impl Iterator<Item = char>,
    ) -> ParserResult<JsonValue<'static>> {
        let mut lexer = Lexer::new(chars);
        let value = self.parse_value(&mut lexer, 0)?;
        match lexer.consume()? {
            (Token::EndOfInput, _) => Ok(value),
            (_, span) => parser_error!(Details::TrailingContent, span.start),
        }
    }

    /// `depth` is the number of objects and arrays currently open around the value
    fn parse_value(&self, lexer: &mut Lexer, depth: usize) -> ParserResult<JsonValue<'static>> {
        let packed = lexer.consume()?;
        self.parse_packed(packed, lexer, depth)
    }

    /// Build a value starting from a token which has already been consumed
    fn parse_packed(
        &self,
        packed: PackedToken,
        lexer: &mut Lexer,
        depth: usize,
    ) -> ParserResult<JsonValue<'static>> {
        match packed {
            (Token::StartObject | Token::StartArray, span) if depth >= self.max_depth => {
                parser_error!(Details::NestingTooDeep, span.start)
            }
            (Token::StartObject, _) => self.parse_object(lexer, depth + 1),
            (Token::StartArray, _) => self.parse_array(lexer, depth + 1),
            (Token::Str(str), _) => Ok(JsonValue::String(Cow::Owned(str))),
            (Token::Float(value), _) => Ok(JsonValue::Float(value)),
            (Token::Integer(value), _) => Ok(JsonValue::Integer(value)),
            (Token::Boolean(value), _) => Ok(JsonValue::Boolean(value)),
            (Token::Null, _) => Ok(JsonValue::Null),
            (Token::EndOfInput, span) => parser_error!(Details::EndOfInput, span.start),
            (token, span) => parser_error!(Details::UnexpectedToken(token), span.start),
        }
    }

    /// An object is just a list of comma separated KV pairs
    fn parse_object(&self, lexer: &mut Lexer, depth: usize) -> ParserResult<JsonValue<'static>> {
        let mut pairs = vec![];
        match lexer.consume()? {
            (Token::EndObject, _) => return Ok(JsonValue::Object(pairs)),
            (Token::Str(key), _) => pairs.push(self.parse_pair(key, lexer, depth)?),
            (_, span) => return parser_error!(Details::InvalidObject, span.start),
        }
        loop {
            match lexer.consume()? {
                (Token::Comma, _) => match lexer.consume()? {
                    (Token::Str(key), _) => pairs.push(self.parse_pair(key, lexer, depth)?),
                    (_, span) => return parser_error!(Details::PairExpected, span.start),
                },
                (Token::EndObject, _) => return Ok(JsonValue::Object(pairs)),
                (_, span) => return parser_error!(Details::InvalidObject, span.start),
            }
        }
    }

    fn parse_pair(
        &self,
        key: String,
        lexer: &mut Lexer,
        depth: usize,
    ) -> ParserResult<(String, JsonValue<'static>)> {
        match lexer.consume()? {
            (Token::Colon, _) => Ok((key, self.parse_value(lexer, depth)?)),
            (_, span) => parser_error!(Details::PairExpected, span.start),
        }
    }

    /// An array is just a list of comma separated values
    fn parse_array(&self, lexer: &mut Lexer, depth: usize) -> ParserResult<JsonValue<'static>> {
        let mut values = vec![];
        match lexer.consume()? {
            (Token::EndArray, _) => return Ok(JsonValue::Array(values)),
            packed => values.push(self.parse_packed(packed, lexer, depth)?),
        }
        loop {
            match lexer.consume()? {
                (Token::Comma, _) => values.push(self.parse_value(lexer, depth)?),
                (Token::EndArray, _) => return Ok(JsonValue::Array(values)),
                (_, span) => return parser_error!(Details::InvalidArray, span.start),
            }
        }
    }
}
