//! Delimiter sniffer.
//!
//! A `sep=` magic-keyword line short-circuits everything. Otherwise the
//! sniffer builds a per-row frequency table over a fixed candidate set,
//! filters candidates by row coverage, and ranks survivors by how evenly
//! their per-row counts are distributed.

use crate::cancel::CancelToken;
use crate::culture::Culture;
use crate::dialect::{DelimiterGuess, delimiter_candidates};
use crate::reader::CharSource;

/// Maximum rows observed by the frequency scan.
const SCAN_ROWS: usize = 300;

/// Per-call scratch state: a rows × candidates count matrix plus
/// positional scores. Allocated fresh per detection call and discarded
/// once the winner is chosen.
struct FrequencyTable {
    candidates: Vec<char>,
    rows: Vec<Vec<u32>>,
    position_score: Vec<u32>,
}

impl FrequencyTable {
    fn new(candidates: Vec<char>) -> Self {
        let len = candidates.len();
        Self {
            candidates,
            rows: Vec::new(),
            position_score: vec![0; len],
        }
    }

    /// Rows a candidate occurs in, over all scanned rows.
    fn coverage(&self, slot: usize) -> usize {
        self.rows.iter().filter(|row| row[slot] > 0).count()
    }
}

/// Detect the field delimiter.
///
/// `qualifier` and `escape` describe the (assumed or already detected)
/// quoting convention so delimiters inside quoted text are not counted.
/// Candidates listed in `disallowed` are never considered.
pub fn detect_delimiter(
    reader: &mut dyn CharSource,
    qualifier: Option<char>,
    escape: Option<char>,
    disallowed: &[char],
    culture: &Culture,
    cancel: &CancelToken,
) -> DelimiterGuess {
    if reader.can_seek() {
        let _ = reader.rewind_to_start();
        if let Some(delimiter) = read_magic_keyword(reader) {
            let _ = reader.rewind_to_start();
            return DelimiterGuess {
                delimiter,
                is_detected: true,
                from_magic_keyword: true,
            };
        }
        let _ = reader.rewind_to_start();
    }

    let candidates: Vec<char> = delimiter_candidates(culture)
        .into_iter()
        .filter(|c| !disallowed.contains(c))
        .collect();
    let Some(table) = scan_frequencies(reader, qualifier, escape, candidates, cancel) else {
        return DelimiterGuess::not_detected();
    };

    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    choose_delimiter(&table)
}

/// Parses the `sep=<value>` magic keyword from the first line, whitespace
/// stripped, case-insensitive. The literal text `\t` means Tab.
fn read_magic_keyword(reader: &mut dyn CharSource) -> Option<char> {
    let line = reader.read_line()?;
    let compact: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() < 5 {
        return None;
    }
    let prefix: String = compact[..4].iter().collect();
    if !prefix.eq_ignore_ascii_case("sep=") {
        return None;
    }
    let value = &compact[4..];
    if value.len() == 2 && value[0] == '\\' && value[1].eq_ignore_ascii_case(&'t') {
        return Some('\t');
    }
    if value.len() == 1 {
        return Some(value[0]);
    }
    None
}

/// Walks characters directly (not through the tokenizer), tracking quote
/// state, and records per-row candidate counts. Empty rows are not
/// recorded. Returns `None` on cancellation.
fn scan_frequencies(
    reader: &mut dyn CharSource,
    qualifier: Option<char>,
    escape: Option<char>,
    candidates: Vec<char>,
    cancel: &CancelToken,
) -> Option<FrequencyTable> {
    let mut table = FrequencyTable::new(candidates);
    let mut row = vec![0u32; table.candidates.len()];
    let mut row_has_content = false;
    let mut in_quotes = false;
    let mut prev: Option<char> = None;

    while table.rows.len() < SCAN_ROWS {
        let Some(c) = reader.read() else {
            break;
        };
        if Some(c) == escape {
            reader.read();
            prev = None;
            row_has_content = true;
            continue;
        }
        if Some(c) == qualifier {
            in_quotes = !in_quotes;
            prev = Some(c);
            row_has_content = true;
            continue;
        }
        if in_quotes {
            prev = Some(c);
            continue;
        }
        if c == '\n' || c == '\r' {
            if cancel.is_cancelled() {
                return None;
            }
            let pair = if c == '\n' { '\r' } else { '\n' };
            if reader.peek() == Some(pair) {
                reader.read();
            }
            if row_has_content {
                table.rows.push(std::mem::replace(
                    &mut row,
                    vec![0u32; table.candidates.len()],
                ));
            } else {
                row.iter_mut().for_each(|v| *v = 0);
            }
            row_has_content = false;
            prev = None;
            continue;
        }
        row_has_content = true;
        if let Some(slot) = table.candidates.iter().position(|&d| d == c) {
            row[slot] += 1;
            // Positional bonus: a delimiter right after a closing qualifier
            // or after ordinary text is better evidence than one floating
            // in whitespace.
            match prev {
                Some(p) if Some(p) == qualifier => table.position_score[slot] += 2,
                Some(p) if !p.is_whitespace() && p != c => table.position_score[slot] += 1,
                _ => {}
            }
        }
        prev = Some(c);
    }
    if row_has_content {
        table.rows.push(row);
    }
    Some(table)
}

fn choose_delimiter(table: &FrequencyTable) -> DelimiterGuess {
    let rows = table.rows.len();
    if rows == 0 {
        return DelimiterGuess::not_detected();
    }

    // Row-coverage filter, skipped entirely for very short files.
    let surviving: Vec<usize> = if rows <= 3 {
        (0..table.candidates.len())
            .filter(|&slot| table.coverage(slot) > 0)
            .collect()
    } else {
        let needed = coverage_threshold(rows);
        (0..table.candidates.len())
            .filter(|&slot| table.coverage(slot) >= needed)
            .collect()
    };

    // Larger files often open with an unstructured introductory block;
    // statistics are taken over the window past it.
    let start_row = if rows > 60 {
        15
    } else if rows > 20 {
        5
    } else {
        0
    };
    let window = &table.rows[start_row..];

    match surviving.len() {
        0 => fallback_by_total(table, window),
        1 => DelimiterGuess {
            delimiter: table.candidates[surviving[0]],
            is_detected: true,
            from_magic_keyword: false,
        },
        _ => rank_survivors(table, window, &surviving)
            .unwrap_or_else(|| fallback_by_total(table, window)),
    }
}

/// Coverage needed to stay a candidate: 75% of rows, relaxed to 50% (with
/// a +1 adjustment when that rounds to a single row) for short files.
fn coverage_threshold(rows: usize) -> usize {
    if rows <= 20 {
        let mut needed = ((rows as f64) * 0.5).round() as usize;
        if needed == 1 {
            needed = 2;
        }
        needed
    } else {
        ((rows as f64) * 0.75).round() as usize
    }
}

/// Step-4 fallback: the single highest total-occurrence candidate over the
/// window, not detected when even that total is zero.
fn fallback_by_total(table: &FrequencyTable, window: &[Vec<u32>]) -> DelimiterGuess {
    let mut best_slot = 0usize;
    let mut best_total = 0u64;
    for slot in 0..table.candidates.len() {
        let total: u64 = window.iter().map(|row| u64::from(row[slot])).sum();
        if total > best_total {
            best_total = total;
            best_slot = slot;
        }
    }
    if best_total == 0 {
        return DelimiterGuess::not_detected();
    }
    DelimiterGuess {
        delimiter: table.candidates[best_slot],
        is_detected: true,
        from_magic_keyword: false,
    }
}

/// Multi-candidate ranking: mean per-row count over non-zero rows, discard
/// unstable candidates, then order by `variance * 4 / mean` ascending with
/// the positional score breaking ties.
fn rank_survivors(
    table: &FrequencyTable,
    window: &[Vec<u32>],
    surviving: &[usize],
) -> Option<DelimiterGuess> {
    struct Ranked {
        slot: usize,
        key: f64,
        position_score: u32,
    }

    let mut ranked: Vec<Ranked> = Vec::with_capacity(surviving.len());
    for &slot in surviving {
        let occupied: Vec<u32> = window
            .iter()
            .map(|row| row[slot])
            .filter(|&count| count > 0)
            .collect();
        let zero_rows = window.len() - occupied.len();
        if window.is_empty() || occupied.len() <= 1 {
            continue;
        }
        if zero_rows * 100 > window.len() * 80 {
            continue;
        }
        let total: u64 = occupied.iter().map(|&c| u64::from(c)).sum();
        let mean = total as f64 / occupied.len() as f64;
        if mean < 1.0 {
            continue;
        }
        let variance: f64 = occupied
            .iter()
            .map(|&count| (f64::from(count) - mean).abs())
            .sum();
        ranked.push(Ranked {
            slot,
            key: variance * 4.0 / mean,
            position_score: table.position_score[slot],
        });
    }

    ranked
        .into_iter()
        .min_by(|a, b| {
            a.key
                .partial_cmp(&b.key)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.position_score.cmp(&a.position_score))
        })
        .map(|winner| DelimiterGuess {
            delimiter: table.candidates[winner.slot],
            is_detected: true,
            from_magic_keyword: false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{ForwardOnly, TextSource};

    fn detect(text: &str) -> DelimiterGuess {
        let mut source = TextSource::new(text);
        detect_delimiter(
            &mut source,
            Some('"'),
            None,
            &[],
            &Culture::EN_US,
            &CancelToken::new(),
        )
    }

    #[test]
    fn test_magic_keyword_wins() {
        let guess = detect("sep=;\na,b,c\nd,e,f\n");
        assert_eq!(guess.delimiter, ';');
        assert!(guess.is_detected);
        assert!(guess.from_magic_keyword);
    }

    #[test]
    fn test_magic_keyword_tab_text() {
        let guess = detect("SEP = \\t\nx\ty\n");
        assert_eq!(guess.delimiter, '\t');
        assert!(guess.from_magic_keyword);
    }

    #[test]
    fn test_magic_keyword_ignored_on_forward_only_source() {
        let mut source = ForwardOnly::new(TextSource::new("sep=;\na;b\nc;d\nd;e\n"));
        let guess = detect_delimiter(
            &mut source,
            Some('"'),
            None,
            &[],
            &Culture::EN_US,
            &CancelToken::new(),
        );
        assert!(!guess.from_magic_keyword);
        assert_eq!(guess.delimiter, ';');
    }

    #[test]
    fn test_clean_comma_file() {
        let mut data = String::new();
        for i in 0..10 {
            data.push_str(&format!("a{i},b{i},c{i},d{i}\n"));
        }
        let guess = detect(&data);
        assert_eq!(guess.delimiter, ',');
        assert!(guess.is_detected);
        assert!(!guess.from_magic_keyword);
    }

    #[test]
    fn test_semicolon_beats_stray_commas() {
        let mut data = String::new();
        for i in 0..12 {
            data.push_str(&format!("name {i};note, with a comma;{i}\n"));
        }
        assert_eq!(detect(&data).delimiter, ';');
    }

    #[test]
    fn test_delimiters_inside_quotes_ignored() {
        let mut data = String::new();
        for i in 0..8 {
            data.push_str(&format!("\"a,b,c,{i}\";x;y\n"));
        }
        assert_eq!(detect(&data).delimiter, ';');
    }

    #[test]
    fn test_no_delimiter_at_all() {
        let guess = detect("plain text\nmore text\nanother line\nlast one\n");
        assert!(!guess.is_detected);
        assert_eq!(guess.delimiter, '\t');
    }

    #[test]
    fn test_pipe_detection() {
        let mut data = String::new();
        for i in 0..6 {
            data.push_str(&format!("x{i}|y{i}|z{i}\n"));
        }
        assert_eq!(detect(&data).delimiter, '|');
    }

    #[test]
    fn test_disallowed_candidate_excluded() {
        let mut source = TextSource::new("a;b;c\nd;e;f\ng;h;i\nj;k;l\n");
        let guess = detect_delimiter(
            &mut source,
            Some('"'),
            None,
            &[';'],
            &Culture::EN_US,
            &CancelToken::new(),
        );
        assert_ne!(guess.delimiter, ';');
    }

    #[test]
    fn test_cancelled_returns_sentinel() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut source = ForwardOnly::new(TextSource::new("a,b\nc,d\ne,f\ng,h\n"));
        let guess = detect_delimiter(
            &mut source,
            Some('"'),
            None,
            &[],
            &Culture::EN_US,
            &cancel,
        );
        assert!(!guess.is_detected);
    }
}
