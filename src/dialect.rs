//! Dialect descriptor and per-sniffer guess results.

use std::fmt;

use crate::culture::Culture;

/// The syntactic conventions that make a delimited text file parseable.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialect {
    /// Field delimiter character.
    pub delimiter: char,
    /// Quote character configuration.
    pub quote: Quote,
    /// Escape prefix configuration.
    pub escape: Escape,
    /// Line comment configuration.
    pub comment: Comment,
    /// Record terminator.
    pub terminator: RecordDelimiter,
    /// Header configuration.
    pub header: Header,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: Quote::Some('"'),
            escape: Escape::Disabled,
            comment: Comment::Disabled,
            terminator: RecordDelimiter::Crlf,
            header: Header::default(),
        }
    }
}

impl Dialect {
    /// Build a `csv::ReaderBuilder` configured for this dialect.
    ///
    /// Multi-character comment prefixes and the LFCR/NL terminators have no
    /// `csv`-crate equivalent; they fall back to the first prefix character
    /// and the default terminator respectively.
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(ascii_or(self.delimiter, b','))
            .has_headers(self.header.has_header_row)
            .terminator(self.terminator.to_csv_terminator())
            .flexible(true);
        match self.quote {
            Quote::Some(q) => {
                builder.quoting(true);
                builder.quote(ascii_or(q, b'"'));
            }
            Quote::None => {
                builder.quoting(false);
            }
        }
        if let Escape::Enabled(e) = self.escape {
            builder.escape(Some(ascii_or(e, b'\\')));
            builder.double_quote(false);
        }
        if let Comment::Enabled(ref prefix) = self.comment
            && let Some(first) = prefix.chars().next()
        {
            builder.comment(Some(ascii_or(first, b'#')));
        }
        builder
    }
}

fn ascii_or(c: char, fallback: u8) -> u8 {
    if c.is_ascii() { c as u8 } else { fallback }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Delimiter: {}", printable(self.delimiter))?;
        writeln!(f, "Quote: {}", self.quote)?;
        writeln!(f, "Escape: {}", self.escape)?;
        writeln!(f, "Comment: {}", self.comment)?;
        writeln!(f, "Terminator: {}", self.terminator)?;
        writeln!(f, "Has header: {}", self.header.has_header_row)?;
        write!(f, "Data starts at row: {}", self.header.data_start_row)
    }
}

/// Render control characters readably in reports.
pub(crate) fn printable(c: char) -> String {
    match c {
        '\t' => "Tab".to_string(),
        '\u{001F}' => "US".to_string(),
        '\u{001E}' => "RS".to_string(),
        other => other.to_string(),
    }
}

/// Quote character configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    /// No quoting.
    None,
    /// Quote with the specified character.
    Some(char),
}

impl Quote {
    pub fn char(&self) -> Option<char> {
        match self {
            Quote::None => None,
            Quote::Some(c) => Some(*c),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::None => write!(f, "none"),
            Quote::Some(c) => write!(f, "{c}"),
        }
    }
}

/// Escape prefix configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Escape {
    /// No escape prefix in this dialect.
    Disabled,
    /// Escape with the specified prefix character.
    Enabled(char),
}

impl Escape {
    pub fn char(&self) -> Option<char> {
        match self {
            Escape::Disabled => None,
            Escape::Enabled(c) => Some(*c),
        }
    }
}

impl fmt::Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escape::Disabled => write!(f, "none"),
            Escape::Enabled(c) => write!(f, "{c}"),
        }
    }
}

/// Line comment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Comment {
    /// Comments do not exist in this dialect.
    #[default]
    Disabled,
    /// Lines starting with the prefix are skipped.
    Enabled(String),
}

impl Comment {
    pub fn prefix(&self) -> &str {
        match self {
            Comment::Disabled => "",
            Comment::Enabled(p) => p,
        }
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comment::Disabled => write!(f, "none"),
            Comment::Enabled(p) => write!(f, "{p}"),
        }
    }
}

/// Record terminator kinds, including the rare control-character forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordDelimiter {
    /// Not detected; callers fall back to a default.
    #[default]
    None,
    /// Carriage return + line feed.
    Crlf,
    /// Line feed.
    Lf,
    /// Carriage return.
    Cr,
    /// Line feed + carriage return.
    Lfcr,
    /// Record separator (U+001E).
    Rs,
    /// Unit separator (U+001F).
    Us,
    /// Next line (U+0085).
    Nl,
}

impl RecordDelimiter {
    /// The character sequence for this terminator, empty for `None`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordDelimiter::None => "",
            RecordDelimiter::Crlf => "\r\n",
            RecordDelimiter::Lf => "\n",
            RecordDelimiter::Cr => "\r",
            RecordDelimiter::Lfcr => "\n\r",
            RecordDelimiter::Rs => "\u{001E}",
            RecordDelimiter::Us => "\u{001F}",
            RecordDelimiter::Nl => "\u{0085}",
        }
    }

    fn to_csv_terminator(self) -> csv::Terminator {
        match self {
            RecordDelimiter::Lf => csv::Terminator::Any(b'\n'),
            RecordDelimiter::Cr => csv::Terminator::Any(b'\r'),
            RecordDelimiter::Rs => csv::Terminator::Any(0x1E),
            RecordDelimiter::Us => csv::Terminator::Any(0x1F),
            _ => csv::Terminator::CRLF,
        }
    }
}

impl fmt::Display for RecordDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordDelimiter::None => "none",
            RecordDelimiter::Crlf => "CRLF",
            RecordDelimiter::Lf => "LF",
            RecordDelimiter::Cr => "CR",
            RecordDelimiter::Lfcr => "LFCR",
            RecordDelimiter::Rs => "RS",
            RecordDelimiter::Us => "US",
            RecordDelimiter::Nl => "NL",
        };
        write!(f, "{name}")
    }
}

/// Header configuration for a delimited file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// Whether the first structural record holds column labels.
    pub has_header_row: bool,
    /// Zero-based row index where structural data starts.
    pub data_start_row: usize,
}

/// Result of the delimiter sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterGuess {
    /// The winning delimiter; only authoritative when `is_detected` is set.
    pub delimiter: char,
    /// False when no candidate survived and the value is a fallback default.
    pub is_detected: bool,
    /// True when a `sep=` magic-keyword line decided the delimiter.
    pub from_magic_keyword: bool,
}

impl DelimiterGuess {
    pub(crate) fn not_detected() -> Self {
        Self {
            delimiter: '\t',
            is_detected: false,
            from_magic_keyword: false,
        }
    }
}

/// Result of the qualifier sniffer for one candidate quote character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifierGuess {
    /// The candidate quote character.
    pub qualifier: char,
    /// Confidence score, 0–99.
    pub score: u8,
    /// A doubled qualifier was observed (quote-doubling escapes in use).
    pub duplicate_qualifier: bool,
    /// An escape-prefixed qualifier was observed.
    pub escaped_qualifier: bool,
}

impl QualifierGuess {
    pub(crate) fn not_detected() -> Self {
        Self {
            qualifier: '"',
            score: 0,
            duplicate_qualifier: false,
            escaped_qualifier: false,
        }
    }
}

/// Result of the header sniffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderGuess {
    /// Human-readable explanation of the decision, for UI display.
    pub message: String,
    /// Whether the first structural record is a header.
    pub has_header: bool,
}

/// The built-in delimiter candidates plus the locale list separator.
pub(crate) fn delimiter_candidates(culture: &Culture) -> Vec<char> {
    let mut candidates = vec!['\t', ',', ';', '|'];
    if !candidates.contains(&culture.list_separator) {
        candidates.push(culture.list_separator);
    }
    candidates.push('\u{001F}');
    candidates.push('\u{001E}');
    candidates
}
