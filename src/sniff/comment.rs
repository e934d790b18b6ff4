//! Line-comment sniffer.
//!
//! Two operations: `detect_comment_prefix` picks the most frequent marker
//! from a fixed ordered list, and `validate_comment_prefix` guards against
//! promoting a data convention (say, a leading `#` identifier column) to a
//! comment marker.

use crate::cancel::CancelToken;
use crate::reader::CharSource;

/// Ordered marker list; longer markers come before their prefixes so a
/// `##` line is never double-counted as `#`.
const MARKERS: [&str; 10] = ["<!--", "##", "//", "==", "\\\\", "''", "#", "/", "\\", "'"];

/// Non-empty lines examined by `detect_comment_prefix`.
const DETECT_LINES: usize = 50;

/// Non-matching lines sampled for the density comparison in
/// `validate_comment_prefix`.
const VALIDATE_LINES: usize = 100;

/// Overall line bound for the validation scan.
const VALIDATE_SCAN_LINES: usize = 512;

/// Returns the most frequent comment marker over the first 50 non-empty
/// lines, or an empty string when no marker ever matched (or on
/// cancellation).
pub fn detect_comment_prefix(reader: &mut dyn CharSource, cancel: &CancelToken) -> String {
    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let mut counts = [0usize; MARKERS.len()];
    let mut seen = 0usize;
    while seen < DETECT_LINES {
        if cancel.is_cancelled() {
            return String::new();
        }
        let Some(line) = reader.read_line() else {
            break;
        };
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        seen += 1;
        // First match wins per line.
        if let Some(idx) = MARKERS.iter().position(|m| trimmed.starts_with(m)) {
            counts[idx] += 1;
        }
    }

    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let (best_idx, best_count) = counts
        .iter()
        .enumerate()
        .max_by_key(|&(_, count)| *count)
        .map(|(idx, count)| (idx, *count))
        .unwrap_or((0, 0));
    if best_count == 0 {
        String::new()
    } else {
        MARKERS[best_idx].to_string()
    }
}

/// Checks whether `prefix` genuinely marks comments rather than data.
///
/// Zero matching lines is invalid; more than two is assumed valid; in
/// between, the delimiter count of the first matching line must be within
/// ±10% of the average over up to 100 subsequent non-matching lines.
pub fn validate_comment_prefix(
    reader: &mut dyn CharSource,
    prefix: &str,
    delimiter: char,
    cancel: &CancelToken,
) -> bool {
    if prefix.is_empty() {
        return false;
    }
    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let mut matching = 0usize;
    let mut first_match_count: Option<usize> = None;
    let mut other_counts: Vec<usize> = Vec::new();
    let mut scanned = 0usize;

    while scanned < VALIDATE_SCAN_LINES {
        if cancel.is_cancelled() {
            break;
        }
        let Some(line) = reader.read_line() else {
            break;
        };
        scanned += 1;
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with(prefix) {
            matching += 1;
            if matching > 2 {
                if reader.can_seek() {
                    let _ = reader.rewind_to_start();
                }
                return true;
            }
            if first_match_count.is_none() {
                let rest = &trimmed[prefix.len()..];
                first_match_count = Some(rest.chars().filter(|&c| c == delimiter).count());
            }
        } else if first_match_count.is_some() && other_counts.len() < VALIDATE_LINES {
            other_counts.push(line.chars().filter(|&c| c == delimiter).count());
        }
    }

    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let Some(commented) = first_match_count else {
        return false;
    };
    if other_counts.is_empty() {
        // Nothing to compare against: the whole window was commented.
        return true;
    }
    let average = other_counts.iter().sum::<usize>() as f64 / other_counts.len() as f64;
    (commented as f64 - average).abs() <= average * 0.10
}
