//! General error types for the parser and the batch decoders

use std::fmt::{Display, Formatter};

use crate::coords::Coords;
use crate::lexer::Token;

/// Global result type used throughout the parser stages
pub type ParserResult<T> = Result<T, Error>;

/// Enumeration of the various different stages that can produce an error
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    /// The lexer stage of the parser
    Lexer,
    /// The parsing/DOM construction stage of the parser
    Parser,
    /// Batch level checks carried out around the parser
    Batch,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lexer => write!(f, "lexer"),
            Stage::Parser => write!(f, "parser"),
            Stage::Batch => write!(f, "batch"),
        }
    }
}

/// A global enumeration of error codes
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    EndOfInput,
    UnexpectedToken(Token),
    PairExpected,
    InvalidObject,
    InvalidArray,
    TrailingContent,
    NestingTooDeep,
    InvalidCharacter(char),
    MatchFailed,
    InvalidNumericRepresentation(String),
    InvalidEscapeSequence(String),
    InvalidUnicodeEscapeSequence(String),
    BatchLengthMismatch { expected: usize, found: usize },
    InvalidRepeatCount,
}

impl Display for Details {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Details::EndOfInput => write!(f, "end of input reached"),
            Details::UnexpectedToken(token) => write!(f, "unexpected token found: {}", token),
            Details::PairExpected => write!(f, "expected a key-value pair"),
            Details::InvalidObject => write!(f, "invalid object"),
            Details::InvalidArray => write!(f, "invalid array"),
            Details::TrailingContent => write!(f, "trailing content after the root value"),
            Details::NestingTooDeep => write!(f, "objects and arrays nested too deeply"),
            Details::InvalidCharacter(c) => write!(f, "invalid character found: '{}'", c),
            Details::MatchFailed => write!(f, "failed to match a literal"),
            Details::InvalidNumericRepresentation(repr) => {
                write!(f, "invalid numeric representation: {}", repr)
            }
            Details::InvalidEscapeSequence(seq) => write!(f, "invalid escape sequence: {}", seq),
            Details::InvalidUnicodeEscapeSequence(seq) => {
                write!(f, "invalid unicode escape sequence: {}", seq)
            }
            Details::BatchLengthMismatch { expected, found } => write!(
                f,
                "decoded {} values from a batch of {} payloads",
                found, expected
            ),
            Details::InvalidRepeatCount => write!(f, "repeat count must be at least 1"),
        }
    }
}

/// The general error structure
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The originating stage for the error
    pub stage: Stage,
    /// The global error code for the error
    pub details: Details,
    /// Optional parser coordinates
    pub coords: Option<Coords>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.coords {
            Some(coords) => write!(f, "{} error: {} at {}", self.stage, self.details, coords),
            None => write!(f, "{} error: {}", self.stage, self.details),
        }
    }
}

impl std::error::Error for Error {}

#[macro_export]
macro_rules! lexer_error {
    ($details: expr, $coords : expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Lexer,
            details: $details,
            coords: Some($coords),
        })
    };
}

#[macro_export]
macro_rules! parser_error {
    ($details: expr, $coords: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Parser,
            details: $details,
            coords: Some($coords),
        })
    };
}

#[macro_export]
macro_rules! batch_error {
    ($details: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Batch,
            details: $details,
            coords: None,
        })
    };
}

#[cfg(test)]
mod tests {
    use crate::coords::Coords;
    use crate::errors::{Details, Error, ParserResult, Stage};

    #[test]
    fn should_render_coords_when_present() {
        let result: ParserResult<()> =
            lexer_error!(Details::InvalidCharacter('x'), Coords::default());
        let err = result.unwrap_err();
        assert_eq!(err.stage, Stage::Lexer);
        assert_eq!(
            err.to_string(),
            "lexer error: invalid character found: 'x' at [abs: 0, line: 0, column: 0]"
        );
    }

    #[test]
    fn should_render_batch_errors_without_coords() {
        let result: ParserResult<()> = batch_error!(Details::BatchLengthMismatch {
            expected: 2,
            found: 3
        });
        let err: Error = result.unwrap_err();
        assert!(err.coords.is_none());
        assert_eq!(
            err.to_string(),
            "batch error: decoded 3 values from a batch of 2 payloads"
        );
    }
}
