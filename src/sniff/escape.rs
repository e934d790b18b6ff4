//! Escape-prefix sniffer.
//!
//! An escape prefix only earns its keep when it is consistently followed by
//! a character worth escaping. Occurrences before ordinary text count
//! against the candidate, so backslashes in file paths or prose do not get
//! promoted to an escape convention.

use crate::cancel::CancelToken;
use crate::dialect::Escape;
use crate::reader::CharSource;

/// Maximum lines scanned.
const SCAN_LINES: usize = 500;

/// Candidate escape prefixes, in preference order.
const CANDIDATES: [char; 2] = ['\\', '/'];

/// Characters commonly protected by an escape prefix: the active delimiter
/// and qualifier plus the usual alternatives for both.
fn commonly_escaped(delimiter: char, qualifier: Option<char>) -> Vec<char> {
    let mut set = vec![delimiter, '\t', ',', ';', '|', ':', '"', '\''];
    if let Some(q) = qualifier
        && !set.contains(&q)
    {
        set.push(q);
    }
    set
}

/// Detect the escape prefix, `Escape::Disabled` when no candidate scores
/// above zero (or on cancellation).
pub fn detect_escape_prefix(
    reader: &mut dyn CharSource,
    delimiter: char,
    qualifier: Option<char>,
    cancel: &CancelToken,
) -> Escape {
    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let escaped_set = commonly_escaped(delimiter, qualifier);
    let mut scores = [0i64; CANDIDATES.len()];

    let mut lines_read = 0usize;
    while lines_read < SCAN_LINES {
        if cancel.is_cancelled() {
            return Escape::Disabled;
        }
        let Some(line) = reader.read_line() else {
            break;
        };
        lines_read += 1;
        let chars: Vec<char> = line.chars().collect();
        for (slot, &candidate) in CANDIDATES.iter().enumerate() {
            let mut i = 0;
            while i < chars.len() {
                if chars[i] == candidate {
                    match chars.get(i + 1) {
                        Some(next) if escaped_set.contains(next) => {
                            scores[slot] += 2;
                            i += 2;
                            continue;
                        }
                        _ => scores[slot] -= 1,
                    }
                }
                i += 1;
            }
        }
    }

    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let (best_slot, best_score) = scores
        .iter()
        .enumerate()
        .max_by_key(|&(_, score)| *score)
        .map(|(slot, score)| (slot, *score))
        .unwrap_or((0, 0));
    if best_score > 0 {
        Escape::Enabled(CANDIDATES[best_slot])
    } else {
        Escape::Disabled
    }
}
