//! Header sniffer.
//!
//! Decides whether the first structural record is a header or data, by the
//! shape of its cells: genuine column labels are short, unique, non-numeric
//! and free of values that look like data (dates, GUIDs, booleans).

use foldhash::{HashSet, HashSetExt};

use crate::cancel::CancelToken;
use crate::dialect::HeaderGuess;
use crate::infer::patterns::{
    BOOLEAN_WORD_PATTERN, DATE_LIKE_PATTERN, GUID_PATTERN, NUMERIC_LIKE_PATTERN,
    UNCOMMON_SYMBOL_PATTERN, WORD_DIGIT_PATTERN,
};
use crate::reader::CharSource;
use crate::tokenizer::read_record;

/// Body rows examined to get a representative field count.
const BODY_ROWS: usize = 12;

/// Column names longer than this are considered data, not labels.
const MAX_NAME_LEN: usize = 128;

/// Decide whether the record at `data_start_row` is a header.
pub fn detect_header(
    reader: &mut dyn CharSource,
    delimiter: char,
    qualifier: Option<char>,
    escape: Option<char>,
    comment: &str,
    data_start_row: usize,
    cancel: &CancelToken,
) -> HeaderGuess {
    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }
    for _ in 0..data_start_row {
        if reader.read_line().is_none() {
            break;
        }
    }

    let Some(mut first) = read_record(reader, delimiter, qualifier, escape, comment) else {
        return HeaderGuess {
            message: "No data to examine".to_string(),
            has_header: false,
        };
    };
    while first.last().is_some_and(|f| f.trim().is_empty()) {
        first.pop();
    }

    let guess = if first.len() < 2 {
        single_column_heuristic(reader, comment, data_start_row)
    } else {
        shape_heuristic(reader, delimiter, qualifier, escape, comment, &first, cancel)
    };

    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }
    guess
}

/// With a single column there is no field-count shape to lean on; only a
/// short word-like line qualifies as a header.
fn single_column_heuristic(
    reader: &mut dyn CharSource,
    comment: &str,
    data_start_row: usize,
) -> HeaderGuess {
    if reader.rewind_to_start().is_err() {
        return HeaderGuess {
            message: "Single column and no way to re-read the first line".to_string(),
            has_header: false,
        };
    }
    for _ in 0..data_start_row {
        if reader.read_line().is_none() {
            break;
        }
    }
    let mut line = None;
    while let Some(candidate) = reader.read_line() {
        let trimmed = candidate.trim_start();
        if trimmed.is_empty() || (!comment.is_empty() && trimmed.starts_with(comment)) {
            continue;
        }
        line = Some(candidate);
        break;
    }
    let Some(line) = line else {
        return HeaderGuess {
            message: "No line to examine".to_string(),
            has_header: false,
        };
    };
    if line.chars().any(char::is_control) {
        return HeaderGuess {
            message: "Control characters in the first line".to_string(),
            has_header: false,
        };
    }
    let trimmed = line.trim();
    if WORD_DIGIT_PATTERN.is_match(trimmed) {
        HeaderGuess {
            message: format!("Header '{trimmed}'"),
            has_header: true,
        }
    } else {
        HeaderGuess {
            message: format!("'{trimmed}' does not look like a column name"),
            has_header: false,
        }
    }
}

fn shape_heuristic(
    reader: &mut dyn CharSource,
    delimiter: char,
    qualifier: Option<char>,
    escape: Option<char>,
    comment: &str,
    header: &[String],
    cancel: &CancelToken,
) -> HeaderGuess {
    // Representative field count from the rows after the candidate header.
    let mut body_counts: Vec<usize> = Vec::new();
    while body_counts.len() < BODY_ROWS {
        if cancel.is_cancelled() {
            break;
        }
        let Some(row) = read_record(reader, delimiter, qualifier, escape, comment) else {
            break;
        };
        if row.is_empty() {
            continue;
        }
        body_counts.push(row.len());
    }
    let rows_checked = body_counts.len().max(1);
    let field_count = modal_count(&body_counts).unwrap_or(header.len());

    let mut numeric = 0usize;
    let mut dates = 0usize;
    let mut booleans = 0usize;
    let mut guids = 0usize;
    let mut empty = 0usize;
    let mut special = 0usize;
    let mut overlong = 0usize;
    let mut duplicates = 0usize;
    let mut seen: HashSet<String> = HashSet::new();

    for cell in header {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            empty += 1;
            continue;
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            overlong += 1;
        }
        if !seen.insert(trimmed.to_lowercase()) {
            duplicates += 1;
        }
        if BOOLEAN_WORD_PATTERN.is_match(trimmed) {
            booleans += 1;
        } else if GUID_PATTERN.is_match(trimmed) {
            guids += 1;
        } else if NUMERIC_LIKE_PATTERN.is_match(trimmed) {
            numeric += 1;
        } else if DATE_LIKE_PATTERN.is_match(trimmed) {
            dates += 1;
        } else if UNCOMMON_SYMBOL_PATTERN.is_match(trimmed) {
            special += 1;
        }
    }

    let raw = (field_count as f64 / 2.0 / rows_checked as f64).ceil() as i64 - special as i64;
    let border = raw.max(3);
    let suspicious = (numeric + dates + booleans + empty + guids + special) as i64;

    // A row where every cell looks like data is data, however narrow the
    // table is.
    let has_header =
        overlong == 0 && suspicious < border && suspicious < header.len() as i64;
    let message = if has_header {
        format!(
            "Header row with {} columns accepted",
            header.len()
        )
    } else if overlong > 0 {
        format!("{overlong} column name(s) longer than {MAX_NAME_LEN} characters")
    } else {
        format!(
            "First row looks like data: {numeric} numeric, {dates} date, {booleans} boolean, \
             {guids} GUID, {empty} empty, {special} unusual, {duplicates} duplicate"
        )
    };
    HeaderGuess {
        message,
        has_header,
    }
}

fn modal_count(counts: &[usize]) -> Option<usize> {
    if counts.is_empty() {
        return None;
    }
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for &c in counts {
        match tally.iter_mut().find(|(value, _)| *value == c) {
            Some((_, n)) => *n += 1,
            None => tally.push((c, 1)),
        }
    }
    tally
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(value, _)| value)
}
