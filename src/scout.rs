//! The detection entry point.
//!
//! `Scout` runs the sniffers in dependency order over one character source,
//! honors any forced dialect properties, then samples the body and infers a
//! format per column. The result carries a human-readable change log of
//! every guess made, for display by the surrounding viewer layer.

use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::cancel::CancelToken;
use crate::culture::Culture;
use crate::dialect::{
    Comment, DelimiterGuess, Dialect, Escape, Header, HeaderGuess, QualifierGuess, Quote, printable,
};
use crate::error::{Result, SniffError};
use crate::infer::{GuessOptions, SERIAL_DATE_FORMAT, guess_value_format};
use crate::reader::{CharSource, TextSource};
use crate::sample::{Row, RowSource, collect_samples};
use crate::sniff::{
    DEFAULT_QUALIFIERS, detect_comment_prefix, detect_delimiter, detect_escape_prefix,
    detect_header, detect_qualifier, detect_record_delimiter, detect_start_row,
    validate_comment_prefix,
};
use crate::tokenizer::read_record;
use crate::value_format::{DataType, ValueFormat};

/// Bytes read from a file before sniffing; all scans are bounded anyway.
const SNIFF_BYTE_LIMIT: u64 = 1 << 20;

/// Characters kept per sampled value.
const MAX_VALUE_CHARS: usize = 1000;

/// Cell values treated as null during sampling.
const NULL_TOKENS: [&str; 3] = ["NULL", "n/a", "NaN"];

/// Detected format for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFormat {
    pub name: String,
    pub format: ValueFormat,
    /// True when every sample matched; false for a possible-match or
    /// fallback format.
    pub confident: bool,
}

/// Aggregated result of a detection run.
#[derive(Debug, Clone)]
pub struct Detection {
    pub dialect: Dialect,
    pub num_fields: usize,
    pub columns: Vec<ColumnFormat>,
    pub delimiter_guess: DelimiterGuess,
    pub qualifier_guess: QualifierGuess,
    pub header_guess: HeaderGuess,
    /// Human-readable log of the guesses made, for UI display.
    pub change_log: Vec<String>,
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.dialect)?;
        writeln!(f, "Fields: {}", self.num_fields)?;
        for column in &self.columns {
            writeln!(f, "  {}: {}", column.name, column.format)?;
        }
        Ok(())
    }
}

/// Dialect and column-format sniffer.
///
/// # Example
///
/// ```no_run
/// use csv_scout::Scout;
///
/// let detection = Scout::new().sniff_path("data.csv").unwrap();
/// println!("Delimiter: {}", detection.dialect.delimiter);
/// println!("Has header: {}", detection.dialect.header.has_header_row);
/// ```
#[derive(Debug, Clone)]
pub struct Scout {
    culture: Culture,
    delimiter: Option<char>,
    quote: Option<Quote>,
    escape: Option<Escape>,
    comment: Option<Comment>,
    has_header: Option<bool>,
    min_required_samples: usize,
    sample_rows: usize,
    allow_serial_date: bool,
    cancel: CancelToken,
}

impl Default for Scout {
    fn default() -> Self {
        Self::new()
    }
}

impl Scout {
    pub fn new() -> Self {
        Self {
            culture: Culture::default(),
            delimiter: None,
            quote: None,
            escape: None,
            comment: None,
            has_header: None,
            min_required_samples: 5,
            sample_rows: 150,
            allow_serial_date: false,
            cancel: CancelToken::new(),
        }
    }

    /// Locale hints used for delimiter candidates and value parsing.
    pub fn culture(&mut self, culture: Culture) -> &mut Self {
        self.culture = culture;
        self
    }

    /// Force a specific delimiter (skips delimiter detection).
    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Force a specific quote configuration.
    pub fn quote(&mut self, quote: Quote) -> &mut Self {
        self.quote = Some(quote);
        self
    }

    /// Force a specific escape configuration.
    pub fn escape(&mut self, escape: Escape) -> &mut Self {
        self.escape = Some(escape);
        self
    }

    /// Force a specific comment configuration.
    pub fn comment(&mut self, comment: Comment) -> &mut Self {
        self.comment = Some(comment);
        self
    }

    /// Force the header decision.
    pub fn has_header(&mut self, has_header: bool) -> &mut Self {
        self.has_header = Some(has_header);
        self
    }

    /// Distinct samples required before value formats are guessed.
    pub fn min_required_samples(&mut self, count: usize) -> &mut Self {
        self.min_required_samples = count;
        self
    }

    /// Rows scanned when sampling column values.
    pub fn sample_rows(&mut self, rows: usize) -> &mut Self {
        self.sample_rows = rows;
        self
    }

    /// Allow numeric day-count values to be read as dates.
    pub fn allow_serial_date(&mut self, allow: bool) -> &mut Self {
        self.allow_serial_date = allow;
        self
    }

    /// Cancellation token observed at row and block boundaries.
    pub fn cancel_token(&mut self, cancel: CancelToken) -> &mut Self {
        self.cancel = cancel;
        self
    }

    /// Sniff a file. Only a bounded prefix is read.
    pub fn sniff_path<P: AsRef<Path>>(&self, path: P) -> Result<Detection> {
        let file = std::fs::File::open(path)?;
        let mut data = Vec::new();
        file.take(SNIFF_BYTE_LIMIT).read_to_end(&mut data)?;
        self.sniff_bytes(&data)
    }

    /// Sniff from any reader. Only a bounded prefix is read.
    pub fn sniff_reader<R: Read>(&self, reader: R) -> Result<Detection> {
        let mut data = Vec::new();
        reader.take(SNIFF_BYTE_LIMIT).read_to_end(&mut data)?;
        self.sniff_bytes(&data)
    }

    /// Sniff decoded-as-UTF-8 bytes.
    pub fn sniff_bytes(&self, data: &[u8]) -> Result<Detection> {
        if data.is_empty() {
            return Err(SniffError::EmptyData);
        }
        let mut scout = self.clone();
        // Cheap whole-buffer pre-check: without a single quote character in
        // sight, the per-candidate qualifier scans have nothing to find.
        if scout.quote.is_none()
            && bytecount::count(data, b'"') == 0
            && bytecount::count(data, b'\'') == 0
        {
            scout.quote = Some(Quote::None);
        }
        let text = String::from_utf8_lossy(data);
        let mut source = TextSource::new(&text);
        scout.sniff_source(&mut source)
    }

    /// Sniff in-memory text.
    pub fn sniff_text(&self, text: &str) -> Result<Detection> {
        let mut source = TextSource::new(text);
        self.sniff_source(&mut source)
    }

    /// Run the sniffers over a character source.
    ///
    /// The full pipeline is multi-pass and needs a seekable source; the
    /// individual sniffers in [`crate::sniff`] also work over forward-only
    /// sources.
    pub fn sniff_source(&self, reader: &mut dyn CharSource) -> Result<Detection> {
        if reader.at_end() {
            return Err(SniffError::EmptyData);
        }
        let cancel = &self.cancel;
        let mut change_log: Vec<String> = Vec::new();

        let quote_hint = match self.quote {
            Some(Quote::Some(q)) => Some(q),
            Some(Quote::None) => None,
            None => Some('"'),
        };

        let terminator = detect_record_delimiter(reader, quote_hint, cancel);
        change_log.push(format!("Record delimiter: {terminator}"));

        let comment_prefix = match &self.comment {
            Some(comment) => comment.prefix().to_string(),
            None => {
                let prefix = detect_comment_prefix(reader, cancel);
                if !prefix.is_empty() {
                    change_log.push(format!("Comment marker candidate: {prefix}"));
                }
                prefix
            }
        };

        let delimiter_guess = match self.delimiter {
            Some(delimiter) => DelimiterGuess {
                delimiter,
                is_detected: true,
                from_magic_keyword: false,
            },
            None => {
                let guess = detect_delimiter(
                    reader,
                    quote_hint,
                    self.escape.and_then(|e| e.char()),
                    &[],
                    &self.culture,
                    cancel,
                );
                change_log.push(match (guess.from_magic_keyword, guess.is_detected) {
                    (true, _) => format!("Delimiter: {} (sep= keyword)", printable(guess.delimiter)),
                    (false, true) => format!("Delimiter: {}", printable(guess.delimiter)),
                    (false, false) => {
                        format!("Delimiter not detected, assuming {}", printable(guess.delimiter))
                    }
                });
                guess
            }
        };
        let delimiter = delimiter_guess.delimiter;

        let comment = match &self.comment {
            Some(comment) => comment.clone(),
            None if comment_prefix.is_empty() => Comment::Disabled,
            None => {
                if validate_comment_prefix(reader, &comment_prefix, delimiter, cancel) {
                    change_log.push(format!("Comment marker: {comment_prefix}"));
                    Comment::Enabled(comment_prefix.clone())
                } else {
                    change_log.push(format!(
                        "Comment marker candidate {comment_prefix} rejected"
                    ));
                    Comment::Disabled
                }
            }
        };

        let (quote, qualifier_guess) = match self.quote {
            Some(quote) => (quote, QualifierGuess::not_detected()),
            None => {
                let guess = detect_qualifier(
                    reader,
                    delimiter,
                    self.escape.and_then(|e| e.char()),
                    &DEFAULT_QUALIFIERS,
                    cancel,
                );
                let quote = if guess.score > 0 {
                    change_log.push(format!(
                        "Qualifier: {} (score {})",
                        guess.qualifier, guess.score
                    ));
                    Quote::Some(guess.qualifier)
                } else {
                    change_log.push("No qualifier in use".to_string());
                    Quote::None
                };
                (quote, guess)
            }
        };

        let escape = match self.escape {
            Some(escape) => escape,
            None => {
                let escape = detect_escape_prefix(reader, delimiter, quote.char(), cancel);
                if let Escape::Enabled(c) = escape {
                    change_log.push(format!("Escape prefix: {c}"));
                }
                escape
            }
        };

        let start_row = detect_start_row(
            reader,
            delimiter,
            quote.char(),
            escape.char(),
            comment.prefix(),
            cancel,
        );
        if start_row > 0 {
            change_log.push(format!("Data starts at row {start_row}"));
        }

        let header_guess = match self.has_header {
            Some(has_header) => HeaderGuess {
                message: "Header presence set by caller".to_string(),
                has_header,
            },
            None => {
                let guess = detect_header(
                    reader,
                    delimiter,
                    quote.char(),
                    escape.char(),
                    comment.prefix(),
                    start_row,
                    cancel,
                );
                change_log.push(guess.message.clone());
                guess
            }
        };

        let dialect = Dialect {
            delimiter,
            quote,
            escape,
            comment,
            terminator,
            header: Header {
                has_header_row: header_guess.has_header,
                data_start_row: start_row,
            },
        };

        let (num_fields, columns) =
            self.examine_columns(reader, &dialect, &mut change_log)?;

        Ok(Detection {
            dialect,
            num_fields,
            columns,
            delimiter_guess,
            qualifier_guess,
            header_guess,
            change_log,
        })
    }

    /// Tokenize the body, sample every column and guess its format.
    fn examine_columns(
        &self,
        reader: &mut dyn CharSource,
        dialect: &Dialect,
        change_log: &mut Vec<String>,
    ) -> Result<(usize, Vec<ColumnFormat>)> {
        reader.rewind_to_start()?;
        for _ in 0..dialect.header.data_start_row {
            if reader.read_line().is_none() {
                break;
            }
        }
        let Some(first) = read_record(
            reader,
            dialect.delimiter,
            dialect.quote.char(),
            dialect.escape.char(),
            dialect.comment.prefix(),
        ) else {
            return Ok((0, Vec::new()));
        };
        let num_fields = first.len();
        let names: Vec<String> = if dialect.header.has_header_row {
            first
                .iter()
                .enumerate()
                .map(|(i, raw)| {
                    let trimmed = raw.trim();
                    if trimmed.is_empty() {
                        format!("column_{}", i + 1)
                    } else {
                        trimmed.to_string()
                    }
                })
                .collect()
        } else {
            (0..num_fields).map(|i| format!("column_{}", i + 1)).collect()
        };

        let column_indices: Vec<usize> = (0..num_fields).collect();
        if column_indices.is_empty() {
            return Ok((0, Vec::new()));
        }
        // With a header the cursor already sits on the first data row;
        // without one, the record just read was data and must be re-read.
        let mut rows = TokenizedRows {
            reader,
            dialect,
            expected: num_fields,
            primed: dialect.header.has_header_row,
        };
        let samples = collect_samples(
            &mut rows,
            self.sample_rows,
            &column_indices,
            &NULL_TOKENS,
            MAX_VALUE_CHARS,
            &self.cancel,
        )?;

        let mut columns = Vec::with_capacity(num_fields);
        let mut prior_date: Option<ValueFormat> = None;
        for (index, name) in names.into_iter().enumerate() {
            let options = GuessOptions {
                min_required_samples: self.min_required_samples,
                allow_serial_date: self.allow_serial_date,
                prior_date_format: prior_date.clone(),
                culture: self.culture.clone(),
                ..GuessOptions::default()
            };
            let values: &[String] = samples
                .get(&index)
                .map(|s| s.values.as_slice())
                .unwrap_or(&[]);
            let result = guess_value_format(values, &options, &self.cancel);
            let (format, confident) = match result.found_format {
                Some(format) => (format, true),
                None => (
                    result.possible_match.unwrap_or_default(),
                    false,
                ),
            };
            if confident
                && format.data_type == DataType::DateTime
                && format.date_format != SERIAL_DATE_FORMAT
            {
                prior_date = Some(format.clone());
            }
            change_log.push(format!("Column '{name}': {format}"));
            columns.push(ColumnFormat {
                name,
                format,
                confident,
            });
        }
        Ok((num_fields, columns))
    }
}

/// Rows for the sample collector, straight from the tokenizer.
///
/// The source is created already positioned past the preamble and header;
/// `reset` re-skips both. A row whose field count differs from the header's
/// surfaces as a warned row.
struct TokenizedRows<'a> {
    reader: &'a mut dyn CharSource,
    dialect: &'a Dialect,
    expected: usize,
    primed: bool,
}

impl TokenizedRows<'_> {
    fn prime(&mut self) -> Result<()> {
        self.reader.rewind_to_start()?;
        for _ in 0..self.dialect.header.data_start_row {
            if self.reader.read_line().is_none() {
                break;
            }
        }
        if self.dialect.header.has_header_row {
            read_record(
                self.reader,
                self.dialect.delimiter,
                self.dialect.quote.char(),
                self.dialect.escape.char(),
                self.dialect.comment.prefix(),
            );
        }
        Ok(())
    }
}

impl RowSource for TokenizedRows<'_> {
    fn read_row(&mut self) -> Result<Option<Row>> {
        if !self.primed {
            self.prime()?;
            self.primed = true;
        }
        let Some(values) = read_record(
            self.reader,
            self.dialect.delimiter,
            self.dialect.quote.char(),
            self.dialect.escape.char(),
            self.dialect.comment.prefix(),
        ) else {
            return Ok(None);
        };
        let warning_count = usize::from(!values.is_empty() && values.len() != self.expected);
        Ok(Some(Row {
            values,
            warning_count,
        }))
    }

    fn supports_reset(&self) -> bool {
        self.reader.can_seek()
    }

    fn reset(&mut self) -> Result<()> {
        self.prime()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_simple_csv() {
        let data = "id,name,amount\n1,alice,10.5\n2,bob,11.25\n3,carol,9.75\n\
                    4,dave,8.00\n5,erin,12.5\n6,frank,7.25\n";
        let detection = Scout::new().sniff_text(data).unwrap();
        assert_eq!(detection.dialect.delimiter, ',');
        assert!(detection.dialect.header.has_header_row);
        assert_eq!(detection.num_fields, 3);
        assert_eq!(detection.columns[0].name, "id");
        assert_eq!(detection.columns[0].format.data_type, DataType::Integer);
        assert_eq!(detection.columns[2].format.data_type, DataType::Numeric);
    }

    #[test]
    fn test_forced_delimiter_respected() {
        let data = "a;b|c\n1;2|3\n4;5|6\n7;8|9\n";
        let detection = Scout::new().delimiter('|').sniff_text(data).unwrap();
        assert_eq!(detection.dialect.delimiter, '|');
        assert_eq!(detection.num_fields, 2);
    }

    #[test]
    fn test_header_column_names() {
        let data = "name,age\nalice,30\nbob,25\ncarol,41\ndave,29\nerin,33\n";
        let detection = Scout::new().sniff_text(data).unwrap();
        let names: Vec<&str> = detection.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
    }

    #[test]
    fn test_generated_column_names() {
        let data = "1,2\n3,4\n5,6\n7,8\n9,10\n";
        let detection = Scout::new().sniff_text(data).unwrap();
        assert!(!detection.dialect.header.has_header_row);
        assert_eq!(detection.columns[0].name, "column_1");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            Scout::new().sniff_bytes(b""),
            Err(SniffError::EmptyData)
        ));
    }

    #[test]
    fn test_change_log_populated() {
        let data = "a,b\n1,2\n3,4\n";
        let detection = Scout::new().sniff_text(data).unwrap();
        assert!(
            detection
                .change_log
                .iter()
                .any(|entry| entry.contains("Delimiter"))
        );
    }
}
