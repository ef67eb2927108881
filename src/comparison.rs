//! Timing harness which runs both decode strategies over the same batch and reports how long
//! each took.
//!
//! Each strategy is run `repeat_count` times back to back on the calling thread, and timed as a
//! whole. Building the batch is left to the caller, so it never falls inside a measured
//! interval. Building the joined buffer is part of the joined strategy and is measured with it.
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use log::{debug, warn};

pub use crate::batch::Strategy;
use crate::batch::{decode_joined, decode_per_item, BatchError, BatchResult};
use crate::batch_error;
use crate::errors::{Details, Error};
use crate::JsonValue;

/// Default number of payloads in a generated batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Default number of times each strategy is run
pub const DEFAULT_REPEAT_COUNT: usize = 100;
/// The payload used to build sample batches
pub const SAMPLE_PAYLOAD: &str = r#"{"a": 1}"#;

/// Configuration for a comparison run
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComparisonConfig {
    /// Number of payloads in a generated batch
    pub batch_size: usize,
    /// Number of times each strategy is run
    pub repeat_count: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            repeat_count: DEFAULT_REPEAT_COUNT,
        }
    }
}

impl ComparisonConfig {
    /// Build a batch of `batch_size` copies of [SAMPLE_PAYLOAD]
    pub fn sample_batch(&self) -> Vec<String> {
        vec![SAMPLE_PAYLOAD.to_string(); self.batch_size]
    }
}

/// The elapsed time for a single strategy
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimingResult {
    /// The strategy which was timed
    pub strategy: Strategy,
    /// Number of times the strategy was run
    pub repeat_count: usize,
    /// Total time across all repeats
    pub elapsed: Duration,
}

impl TimingResult {
    /// Mean time taken by a single run
    pub fn mean(&self) -> Duration {
        match self.repeat_count {
            0 => Duration::ZERO,
            n => Duration::from_nanos((self.elapsed.as_nanos() / n as u128) as u64),
        }
    }
}

impl Display for TimingResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:?} over {} runs ({:?} per run)",
            self.strategy,
            self.elapsed,
            self.repeat_count,
            self.mean()
        )
    }
}

/// Outcome of a comparison run. The decoded values are those produced by the final repeat of
/// each strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Timing for [Strategy::PerItem]
    pub per_item: TimingResult,
    /// Timing for [Strategy::Joined]
    pub joined: TimingResult,
    /// Values decoded by [Strategy::PerItem]
    pub per_item_values: Vec<JsonValue<'static>>,
    /// Values decoded by [Strategy::Joined]
    pub joined_values: Vec<JsonValue<'static>>,
}

impl Comparison {
    /// Whether both strategies decoded to value-equal sequences
    pub fn outputs_match(&self) -> bool {
        self.per_item_values == self.joined_values
    }

    /// How many times faster the joined strategy ran. [None] if the joined run was too quick
    /// to register on the clock
    pub fn speedup(&self) -> Option<f64> {
        let joined = self.joined.elapsed.as_secs_f64();
        if joined > 0.0 {
            Some(self.per_item.elapsed.as_secs_f64() / joined)
        } else {
            None
        }
    }
}

/// Errors raised by a comparison run
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonError {
    /// The run was badly configured, and nothing was timed
    Config(Error),
    /// One of the strategies failed to decode the batch
    Decode(BatchError),
}

impl Display for ComparisonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonError::Config(err) => write!(f, "invalid comparison: {}", err),
            ComparisonError::Decode(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ComparisonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComparisonError::Config(err) => Some(err),
            ComparisonError::Decode(err) => Some(err),
        }
    }
}

impl From<BatchError> for ComparisonError {
    fn from(err: BatchError) -> Self {
        ComparisonError::Decode(err)
    }
}

impl ComparisonError {
    /// The strategy which failed, if the failure came from a decode
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            ComparisonError::Config(_) => None,
            ComparisonError::Decode(err) => Some(err.strategy),
        }
    }
}

/// Run both strategies `repeat_count` times over the batch, timing each independently.  The
/// per-item strategy runs first. A failure in either strategy ends the run.
pub fn run_comparison<S: AsRef<str>>(
    batch: &[S],
    repeat_count: usize,
) -> Result<Comparison, ComparisonError> {
    if repeat_count == 0 {
        return batch_error!(Details::InvalidRepeatCount).map_err(ComparisonError::Config);
    }

    let (per_item, per_item_values) =
        time_strategy(Strategy::PerItem, batch, repeat_count, decode_per_item)?;
    debug!("{} payloads, {}", batch.len(), per_item);
    let (joined, joined_values) =
        time_strategy(Strategy::Joined, batch, repeat_count, decode_joined)?;
    debug!("{} payloads, {}", batch.len(), joined);

    let comparison = Comparison {
        per_item,
        joined,
        per_item_values,
        joined_values,
    };
    if !comparison.outputs_match() {
        warn!("per-item and joined decodes of {} payloads diverged", batch.len());
    }
    Ok(comparison)
}

/// Run a comparison over a caller supplied batch, using the repeat count from a
/// [ComparisonConfig]. The config's `batch_size` only applies to
/// [ComparisonConfig::sample_batch], so the batch is never resized here
pub fn run_with<S: AsRef<str>>(
    config: &ComparisonConfig,
    batch: &[S],
) -> Result<Comparison, ComparisonError> {
    run_comparison(batch, config.repeat_count)
}

fn time_strategy<S, F>(
    strategy: Strategy,
    batch: &[S],
    repeat_count: usize,
    decode: F,
) -> BatchResult<(TimingResult, Vec<JsonValue<'static>>)>
where
    S: AsRef<str>,
    F: Fn(&[S]) -> BatchResult<Vec<JsonValue<'static>>>,
{
    let mut values = vec![];
    let start = Instant::now();
    for _ in 0..repeat_count {
        values = decode(batch)?;
    }
    let timing = TimingResult {
        strategy,
        repeat_count,
        elapsed: start.elapsed(),
    };
    Ok((timing, values))
}
