//! Start-row sniffer.
//!
//! Preamble lines (titles, export banners) rarely carry the same delimiter
//! density as the table body. The sniffer takes the density of the last
//! structural row in its window as the target and returns the first
//! structural row matching it.

use crate::cancel::CancelToken;
use crate::reader::CharSource;

/// Maximum rows scanned.
const SCAN_ROWS: usize = 50;

struct RowInfo {
    index: usize,
    delimiters: usize,
    structural: bool,
}

/// Returns the zero-based index of the first row where structural data
/// starts, 0 when fewer than two structural rows exist (or on cancellation).
pub fn detect_start_row(
    reader: &mut dyn CharSource,
    delimiter: char,
    qualifier: Option<char>,
    escape: Option<char>,
    comment: &str,
    cancel: &CancelToken,
) -> usize {
    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let mut rows: Vec<RowInfo> = Vec::new();
    let mut index = 0usize;
    let mut in_quotes = false;
    let mut delimiters = 0usize;
    let mut row_text = String::new();

    'scan: while rows.len() < SCAN_ROWS {
        if cancel.is_cancelled() {
            return 0;
        }
        let Some(c) = reader.read() else {
            push_row(&mut rows, index, delimiters, &row_text, comment);
            break 'scan;
        };
        if Some(c) == escape {
            reader.read();
            row_text.push(c);
            continue;
        }
        if Some(c) == qualifier {
            in_quotes = !in_quotes;
            row_text.push(c);
            continue;
        }
        if !in_quotes && (c == '\n' || c == '\r') {
            let pair = if c == '\n' { '\r' } else { '\n' };
            if reader.peek() == Some(pair) {
                reader.read();
            }
            push_row(&mut rows, index, delimiters, &row_text, comment);
            index += 1;
            delimiters = 0;
            row_text.clear();
            continue;
        }
        if !in_quotes && c == delimiter {
            delimiters += 1;
        }
        row_text.push(c);
    }

    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let structural: Vec<&RowInfo> = rows.iter().filter(|r| r.structural).collect();
    if structural.len() < 2 {
        return 0;
    }
    let target = structural[structural.len() - 1].delimiters;
    structural
        .iter()
        .find(|r| r.delimiters == target)
        .map(|r| r.index)
        .unwrap_or(0)
}

fn push_row(rows: &mut Vec<RowInfo>, index: usize, delimiters: usize, text: &str, comment: &str) {
    let trimmed = text.trim_start();
    let structural =
        !trimmed.is_empty() && (comment.is_empty() || !trimmed.starts_with(comment));
    rows.push(RowInfo {
        index,
        delimiters,
        structural,
    });
}
