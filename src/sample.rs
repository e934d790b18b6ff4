//! Column sampling.
//!
//! Reads rows from a row source, deduplicates and caps the values kept per
//! column, and hands them to the value-format guesser in randomized order
//! so downstream guessing carries no order-dependent bias.

use foldhash::{HashMap, HashSet, HashSetExt};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::cancel::CancelToken;
use crate::error::{Result, SniffError};

/// Values kept per column, at most.
pub const MAX_SAMPLE_VALUES: usize = 10_000;

/// Warning rows logged before going quiet.
const MAX_LOGGED_WARNINGS: usize = 5;

/// One row as delivered by a row source.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub values: Vec<String>,
    /// Field- or row-level warnings raised while reading. Rows with any
    /// warning are skipped for sampling but still count toward the record
    /// budget.
    pub warning_count: usize,
}

/// A source of rows, typically a tokenized reader or a `csv::Reader`.
pub trait RowSource {
    fn read_row(&mut self) -> Result<Option<Row>>;

    /// Whether the source can restart from its beginning.
    fn supports_reset(&self) -> bool {
        false
    }

    fn reset(&mut self) -> Result<()> {
        Err(SniffError::NotSeekable)
    }
}

/// Sampled values for one column.
#[derive(Debug, Clone, Default)]
pub struct SampleResult {
    /// Rows the collector consumed, warned rows included.
    pub records_read: usize,
    /// Deduplicated values in randomized order.
    pub values: Vec<String>,
}

/// Collect per-column sample values.
///
/// Reads until `max_records` rows were consumed or the source is exhausted,
/// restarting once from the top when the source supports it. Values are
/// trimmed, truncated to `max_chars` characters, null-filtered and
/// deduplicated case-insensitively, keeping at most
/// [`MAX_SAMPLE_VALUES`] per column.
pub fn collect_samples(
    source: &mut dyn RowSource,
    max_records: usize,
    columns: &[usize],
    null_tokens: &[&str],
    max_chars: usize,
    cancel: &CancelToken,
) -> Result<HashMap<usize, SampleResult>> {
    if columns.is_empty() {
        return Err(SniffError::InvalidArgument(
            "no columns to sample".to_string(),
        ));
    }

    struct ColumnState {
        seen: HashSet<String>,
        values: Vec<String>,
    }
    let mut states: HashMap<usize, ColumnState> = columns
        .iter()
        .map(|&col| {
            (
                col,
                ColumnState {
                    seen: HashSet::new(),
                    values: Vec::new(),
                },
            )
        })
        .collect();

    let mut records_read = 0usize;
    let mut warnings_logged = 0usize;
    let mut restarted = false;

    while records_read < max_records {
        if cancel.is_cancelled() {
            break;
        }
        let row = match source.read_row()? {
            Some(row) => row,
            None => {
                if restarted || !source.supports_reset() || records_read == 0 {
                    break;
                }
                source.reset()?;
                restarted = true;
                continue;
            }
        };
        records_read += 1;
        if row.warning_count > 0 {
            if warnings_logged < MAX_LOGGED_WARNINGS {
                log::warn!(
                    "skipping row {} with {} warning(s) during sampling",
                    records_read,
                    row.warning_count
                );
                warnings_logged += 1;
            }
            continue;
        }
        for (&col, state) in states.iter_mut() {
            if state.values.len() >= MAX_SAMPLE_VALUES {
                continue;
            }
            let Some(raw) = row.values.get(col) else {
                continue;
            };
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if null_tokens.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
                continue;
            }
            let value: String = trimmed.chars().take(max_chars).collect();
            if state.seen.insert(value.to_lowercase()) {
                state.values.push(value);
            }
        }
    }

    let mut rng = SmallRng::from_entropy();
    let results = states
        .into_iter()
        .map(|(col, mut state)| {
            state.values.shuffle(&mut rng);
            (
                col,
                SampleResult {
                    records_read,
                    values: state.values,
                },
            )
        })
        .collect();
    Ok(results)
}

/// Adapter exposing a `csv::Reader` as a [`RowSource`].
///
/// A record the parser rejects surfaces as a warned row rather than an
/// error, so one bad record never aborts the whole sampling pass.
pub struct CsvRowSource<R: std::io::Read> {
    reader: csv::Reader<R>,
}

impl<R: std::io::Read> CsvRowSource<R> {
    pub fn new(reader: csv::Reader<R>) -> Self {
        Self { reader }
    }
}

impl<R: std::io::Read> RowSource for CsvRowSource<R> {
    fn read_row(&mut self) -> Result<Option<Row>> {
        let mut record = csv::StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => Ok(Some(Row {
                values: record.iter().map(str::to_string).collect(),
                warning_count: 0,
            })),
            Ok(false) => Ok(None),
            Err(err) if err.is_io_error() => Err(err.into()),
            Err(_) => Ok(Some(Row {
                values: Vec::new(),
                warning_count: 1,
            })),
        }
    }
}
