//! The two batch decode strategies.
//!
//! A batch is an ordered slice of payloads, each of which should hold exactly one JSON value.
//! [decode_per_item] parses each payload in turn, and so can say exactly which payload was
//! malformed.  [decode_joined] frames the whole batch as a single JSON array and parses it in
//! one go, which amortises the per-parse setup cost but loses the ability to attribute a
//! failure to a particular payload.  [locate_malformed] is available as an explicit second
//! pass for callers who need that attribution after a joined decode fails.
//!
//! For identical input both strategies produce value-equal, positionally aligned results.
use std::fmt::{Display, Formatter};

use log::trace;

use crate::batch_error;
use crate::errors::{Details, Error, ParserResult};
use crate::parser::dom::Parser;
use crate::JsonValue;

/// The decode strategies which can be applied to a batch
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Each payload is parsed independently
    PerItem,
    /// The batch is joined into a single array literal and parsed once
    Joined,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::PerItem => write!(f, "per-item"),
            Strategy::Joined => write!(f, "joined"),
        }
    }
}

/// Error raised when a batch fails to decode
#[derive(Debug, Clone, PartialEq)]
pub struct BatchError {
    /// The strategy which was being applied
    pub strategy: Strategy,
    /// Index of the offending payload. Only ever set by [decode_per_item]
    pub index: Option<usize>,
    /// The underlying parser error
    pub source: Error,
}

impl BatchError {
    fn per_item(index: usize, source: Error) -> Self {
        BatchError {
            strategy: Strategy::PerItem,
            index: Some(index),
            source,
        }
    }

    fn joined(source: Error) -> Self {
        BatchError {
            strategy: Strategy::Joined,
            index: None,
            source,
        }
    }
}

impl Display for BatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "{} decode failed for payload {}: {}",
                self.strategy, index, self.source
            ),
            None => write!(f, "{} batch decode failed: {}", self.strategy, self.source),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Result type for the batch decoders
pub type BatchResult<T> = Result<T, BatchError>;

/// Parse each payload independently and in order. Stops at the first malformed payload.
pub fn decode_per_item<S: AsRef<str>>(batch: &[S]) -> BatchResult<Vec<JsonValue<'static>>> {
    trace!("per-item decode of {} payloads", batch.len());
    let parser = Parser::default();
    batch
        .iter()
        .enumerate()
        .map(|(index, payload)| {
            parser
                .parse_str(payload.as_ref())
                .map_err(|err| BatchError::per_item(index, err))
        })
        .collect()
}

/// Join the batch into a single JSON array and parse it once.
///
/// An empty payload, or one which is not a complete JSON value, breaks the array framing and
/// fails the whole batch. A payload which smuggles in extra elements (`1,2` say) frames
/// correctly but is caught by a final length check, reported as
/// [Details::BatchLengthMismatch].
///
/// The enclosing array takes up one level of nesting, so the parser allows one more level than
/// [decode_per_item] does.
pub fn decode_joined<S: AsRef<str>>(batch: &[S]) -> BatchResult<Vec<JsonValue<'static>>> {
    trace!("joined decode of {} payloads", batch.len());
    let joined = join_payloads(batch);
    let parser = Parser::default();
    let max_depth = parser.max_depth() + 1;
    parser
        .with_max_depth(max_depth)
        .parse_str(&joined)
        .and_then(|parsed| aligned_values(batch.len(), parsed))
        .map_err(BatchError::joined)
}

/// Build the array literal used by [decode_joined]: payloads separated by commas, wrapped in
/// brackets. An empty batch becomes `[]`
pub fn join_payloads<S: AsRef<str>>(batch: &[S]) -> String {
    let capacity = batch.iter().map(|p| p.as_ref().len() + 1).sum::<usize>() + 2;
    let mut joined = String::with_capacity(capacity);
    joined.push('[');
    for (index, payload) in batch.iter().enumerate() {
        if index > 0 {
            joined.push(',');
        }
        joined.push_str(payload.as_ref());
    }
    joined.push(']');
    joined
}

/// Find the index of the first payload which does not parse on its own, if any
pub fn locate_malformed<S: AsRef<str>>(batch: &[S]) -> Option<usize> {
    let parser = Parser::default();
    batch
        .iter()
        .position(|payload| parser.parse_str(payload.as_ref()).is_err())
}

fn aligned_values(
    expected: usize,
    parsed: JsonValue<'static>,
) -> ParserResult<Vec<JsonValue<'static>>> {
    match parsed {
        JsonValue::Array(values) if values.len() == expected => Ok(values),
        JsonValue::Array(values) => batch_error!(Details::BatchLengthMismatch {
            expected,
            found: values.len()
        }),
        _ => batch_error!(Details::InvalidArray),
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::{
        decode_joined, decode_per_item, join_payloads, locate_malformed, Strategy,
    };
    use crate::errors::{Details, Stage};
    use crate::parser::dom::MAX_NESTING_DEPTH;
    use crate::payloads;
    use crate::JsonValue;

    #[cfg(feature = "mixed_numerics")]
    fn number(n: i64) -> JsonValue<'static> {
        JsonValue::Integer(n)
    }

    #[cfg(not(feature = "mixed_numerics"))]
    fn number(n: i64) -> JsonValue<'static> {
        JsonValue::Float(n as f64)
    }

    fn a_equals_one() -> JsonValue<'static> {
        JsonValue::Object(vec![("a".to_string(), number(1))])
    }

    #[test]
    fn should_frame_payloads_as_an_array() {
        assert_eq!(join_payloads(&payloads![]), "[]");
        assert_eq!(join_payloads(&payloads!["1"]), "[1]");
        assert_eq!(
            join_payloads(&payloads!["{\"a\": 1}", "null", "[2]"]),
            "[{\"a\": 1},null,[2]]"
        );
    }

    #[test]
    fn should_decode_empty_batches() {
        let batch = payloads![];
        assert!(decode_per_item(&batch).unwrap().is_empty());
        assert!(decode_joined(&batch).unwrap().is_empty());
    }

    #[test]
    fn should_agree_on_a_thousand_objects() {
        let batch = payloads!["{\"a\": 1}"; 1000];
        let per_item = decode_per_item(&batch).unwrap();
        let joined = decode_joined(&batch).unwrap();
        assert_eq!(per_item.len(), 1000);
        assert!(per_item.iter().all(|v| *v == a_equals_one()));
        assert_eq!(per_item, joined);
    }

    #[test]
    fn should_preserve_input_order() {
        let batch = payloads!["{\"id\": 3}", "[true, null]", "\"x\"", "-1.5", "{}"];
        let per_item = decode_per_item(&batch).unwrap();
        let joined = decode_joined(&batch).unwrap();
        assert_eq!(per_item, joined);
        assert_eq!(per_item[0].get("id"), Some(&number(3)));
        assert_eq!(per_item[3], JsonValue::Float(-1.5));
        assert_eq!(per_item[4], JsonValue::Object(vec![]));
    }

    #[test]
    fn should_attribute_per_item_failures() {
        let batch = payloads!["{\"a\": 1}", "not json"];
        let err = decode_per_item(&batch).unwrap_err();
        assert_eq!(err.strategy, Strategy::PerItem);
        assert_eq!(err.index, Some(1));
        assert_eq!(err.source.details, Details::MatchFailed);

        let err = decode_joined(&batch).unwrap_err();
        assert_eq!(err.strategy, Strategy::Joined);
        assert_eq!(err.index, None);
        assert!(err.to_string().starts_with("joined batch decode failed"));
    }

    #[test]
    fn should_stop_at_the_first_failure() {
        let batch = payloads!["{", "{\"a\": 1}", "]"];
        assert_eq!(decode_per_item(&batch).unwrap_err().index, Some(0));
    }

    #[test]
    fn should_reject_trailing_data_in_either_strategy() {
        let batch = payloads!["{\"a\": 1}", "{\"a\": 1} {\"b\": 2}"];
        assert_eq!(decode_per_item(&batch).unwrap_err().index, Some(1));
        assert!(decode_joined(&batch).is_err());
    }

    #[test]
    fn should_reject_empty_payloads_when_joined() {
        let err = decode_joined(&payloads!["{\"a\": 1}", ""]).unwrap_err();
        assert_eq!(err.index, None);

        let err = decode_joined(&payloads![""]).unwrap_err();
        assert_eq!(err.source.stage, Stage::Batch);
        assert_eq!(
            err.source.details,
            Details::BatchLengthMismatch {
                expected: 1,
                found: 0
            }
        );
        assert_eq!(decode_per_item(&payloads![""]).unwrap_err().index, Some(0));
    }

    #[test]
    fn should_catch_smuggled_elements() {
        let batch = payloads!["1,2", "3"];
        assert_eq!(decode_per_item(&batch).unwrap_err().index, Some(0));
        let err = decode_joined(&batch).unwrap_err();
        assert_eq!(
            err.source.details,
            Details::BatchLengthMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn should_be_idempotent() {
        let batch = payloads!["{\"a\": [1, 2.5, \"s\"]}", "false"];
        let snapshot = batch.clone();
        assert_eq!(decode_per_item(&batch), decode_per_item(&batch));
        assert_eq!(decode_joined(&batch), decode_joined(&batch));
        assert_eq!(batch, snapshot);
    }

    #[test]
    fn should_ignore_separators_inside_strings() {
        let batch = payloads!["\"a,b\"", "\"]\"", "{\"k,[\": \"}, {\"}"];
        let per_item = decode_per_item(&batch).unwrap();
        let joined = decode_joined(&batch).unwrap();
        assert_eq!(per_item.len(), 3);
        assert_eq!(per_item, joined);
        assert_eq!(per_item[0], JsonValue::String("a,b".into()));
        assert_eq!(per_item[1], JsonValue::String("]".into()));
        assert_eq!(
            per_item[2].get("k,["),
            Some(&JsonValue::String("}, {".into()))
        );
    }

    #[test]
    fn should_report_deep_nesting_as_an_error() {
        let deep = "[".repeat(200_000) + &"]".repeat(200_000);
        let batch = payloads!["1", deep];
        let err = decode_per_item(&batch).unwrap_err();
        assert_eq!(err.index, Some(1));
        assert_eq!(err.source.details, Details::NestingTooDeep);

        let err = decode_joined(&batch).unwrap_err();
        assert_eq!(err.index, None);
        assert_eq!(err.source.details, Details::NestingTooDeep);
    }

    #[test]
    fn should_agree_at_the_nesting_limit() {
        let limit = "[".repeat(MAX_NESTING_DEPTH) + &"]".repeat(MAX_NESTING_DEPTH);
        let batch = payloads![limit, "{}"];
        assert_eq!(decode_per_item(&batch).unwrap(), decode_joined(&batch).unwrap());
    }

    #[test]
    fn should_locate_malformed_payloads_on_request() {
        assert_eq!(locate_malformed(&payloads!["1", "2"]), None);
        assert_eq!(locate_malformed(&payloads!["1", "{", "nul"]), Some(1));
    }
}
