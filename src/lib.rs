//! csv-scout: dialect and column-format sniffer for delimited text files
//!
//! Given an arbitrary character stream, csv-scout infers the structural
//! dialect of the file (field delimiter, quote character, escape prefix,
//! comment marker, record terminator, header presence, first data row) and
//! then the semantic format of each column (integer, decimal, boolean,
//! date/time, GUID, percentage, or text) from sampled values, without any
//! user-supplied schema. It is the engine behind a delimited-file viewer.
//!
//! # Quick Start
//!
//! ```no_run
//! use csv_scout::Scout;
//!
//! let detection = Scout::new().sniff_path("data.csv").unwrap();
//!
//! println!("Delimiter: {}", detection.dialect.delimiter);
//! println!("Has header: {}", detection.dialect.header.has_header_row);
//! for column in &detection.columns {
//!     println!("{}: {}", column.name, column.format);
//! }
//! ```
//!
//! # How detection works
//!
//! Each dialect property has its own bounded, read-only sniffer over a
//! rewindable character source ([`CharSource`]); the sniffers are
//! independent and may run in any order, each restoring the cursor before
//! returning. A `sep=` magic-keyword line short-circuits delimiter
//! analysis entirely. Once the dialect is known, the character-level
//! tokenizer splits the body into records, the sample collector gathers
//! deduplicated per-column values, and the value-format guesser tries
//! boolean, GUID, numeric (with locale-aware separators) and date/time
//! formats in order, falling back to a weaker "possible match" when no
//! format fits every sample.
//!
//! Malformed input is never an error: every sniffer has a defined "not
//! detected" sentinel and callers fall back to defaults. Only contract
//! violations (empty input, no columns to sample) fail fast.
//!
//! # Forcing dialect properties
//!
//! ```no_run
//! use csv_scout::{Comment, Escape, Quote, Scout};
//!
//! let mut scout = Scout::new();
//! scout
//!     .delimiter(';')
//!     .quote(Quote::Some('\''))
//!     .escape(Escape::Disabled)
//!     .comment(Comment::Enabled("#".to_string()));
//! ```

pub mod cancel;
pub mod culture;
pub mod dialect;
pub mod error;
pub mod infer;
pub mod reader;
pub mod sample;
mod scout;
pub mod sniff;
pub mod tokenizer;
pub mod value_format;

pub use cancel::CancelToken;
pub use culture::Culture;
pub use dialect::{
    Comment, DelimiterGuess, Dialect, Escape, Header, HeaderGuess, QualifierGuess, Quote,
    RecordDelimiter,
};
pub use error::{Result, SniffError};
pub use infer::{CheckResult, GuessOptions, guess_value_format};
pub use reader::{CharSource, TextSource};
pub use sample::{MAX_SAMPLE_VALUES, Row, RowSource, SampleResult, collect_samples};
pub use scout::{ColumnFormat, Detection, Scout};
pub use tokenizer::read_record;
pub use value_format::{DataType, ValueFormat};
