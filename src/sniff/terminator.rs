//! Record-delimiter sniffer.
//!
//! Scans up to 8 KB of characters through a reusable block buffer, tracking
//! quote state so terminators inside quoted fields are not counted, and
//! tallies the seven terminator kinds.

use crate::cancel::CancelToken;
use crate::dialect::RecordDelimiter;
use crate::reader::CharSource;

/// Scan limit in characters; keeps detection latency flat on huge files.
const SCAN_LIMIT: usize = 8192;
/// Reusable block buffer size.
const BLOCK_SIZE: usize = 4096;

/// Tally indices, in tie-break priority order.
const KINDS: [RecordDelimiter; 7] = [
    RecordDelimiter::Crlf,
    RecordDelimiter::Lf,
    RecordDelimiter::Cr,
    RecordDelimiter::Lfcr,
    RecordDelimiter::Rs,
    RecordDelimiter::Us,
    RecordDelimiter::Nl,
];

/// Detect the record terminator, or `RecordDelimiter::None` when the scan
/// window contains no terminator at all (or the call was cancelled).
pub fn detect_record_delimiter(
    reader: &mut dyn CharSource,
    qualifier: Option<char>,
    cancel: &CancelToken,
) -> RecordDelimiter {
    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let mut counts = [0usize; 7];
    let mut buf = ['\0'; BLOCK_SIZE];
    let mut scanned = 0usize;
    let mut in_quotes = false;
    // A lone CR/LF at a block boundary waiting for its potential partner.
    let mut dangling: Option<char> = None;

    while scanned < SCAN_LIMIT {
        if cancel.is_cancelled() {
            return RecordDelimiter::None;
        }
        let want = BLOCK_SIZE.min(SCAN_LIMIT - scanned);
        let n = reader.read_block(&mut buf[..want]);
        if n == 0 {
            break;
        }
        scanned += n;

        let mut i = 0;
        while i < n {
            let c = buf[i];
            if let Some(prev) = dangling.take() {
                if prev == '\r' && c == '\n' {
                    counts[0] += 1;
                    i += 1;
                    continue;
                }
                if prev == '\n' && c == '\r' {
                    counts[3] += 1;
                    i += 1;
                    continue;
                }
                counts[if prev == '\r' { 2 } else { 1 }] += 1;
            }
            if Some(c) == qualifier {
                in_quotes = !in_quotes;
                i += 1;
                continue;
            }
            if in_quotes {
                i += 1;
                continue;
            }
            match c {
                '\r' | '\n' => {
                    if i + 1 < n {
                        let next = buf[i + 1];
                        if c == '\r' && next == '\n' {
                            counts[0] += 1;
                            i += 1;
                        } else if c == '\n' && next == '\r' {
                            counts[3] += 1;
                            i += 1;
                        } else {
                            counts[if c == '\r' { 2 } else { 1 }] += 1;
                        }
                    } else {
                        dangling = Some(c);
                    }
                }
                '\u{001E}' => counts[4] += 1,
                '\u{001F}' => counts[5] += 1,
                '\u{0085}' => counts[6] += 1,
                _ => {}
            }
            i += 1;
        }
    }
    if let Some(prev) = dangling {
        counts[if prev == '\r' { 2 } else { 1 }] += 1;
    }

    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return RecordDelimiter::None;
    }
    // First kind in priority order holding the maximum wins.
    for (idx, kind) in KINDS.iter().enumerate() {
        if counts[idx] == max {
            return *kind;
        }
    }
    RecordDelimiter::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::TextSource;

    fn detect(text: &str) -> RecordDelimiter {
        let mut source = TextSource::new(text);
        detect_record_delimiter(&mut source, Some('"'), &CancelToken::new())
    }

    #[test]
    fn test_detect_lf() {
        assert_eq!(detect("a,b\nc,d\ne,f\n"), RecordDelimiter::Lf);
    }

    #[test]
    fn test_detect_crlf() {
        assert_eq!(detect("a,b\r\nc,d\r\n"), RecordDelimiter::Crlf);
    }

    #[test]
    fn test_detect_cr() {
        assert_eq!(detect("a,b\rc,d\r"), RecordDelimiter::Cr);
    }

    #[test]
    fn test_tie_prefers_crlf() {
        // One CRLF and one bare LF: equal counts, CRLF has priority.
        assert_eq!(detect("a,b\r\nc,d\ne,f"), RecordDelimiter::Crlf);
    }

    #[test]
    fn test_terminator_inside_quotes_not_counted() {
        assert_eq!(detect("\"a\nb\",c\r\nd,e\r\n"), RecordDelimiter::Crlf);
    }

    #[test]
    fn test_no_terminator() {
        assert_eq!(detect("a,b,c"), RecordDelimiter::None);
    }

    #[test]
    fn test_record_separator_control_char() {
        assert_eq!(detect("a,b\u{001E}c,d\u{001E}"), RecordDelimiter::Rs);
    }

    #[test]
    fn test_cancel_returns_sentinel() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut source = TextSource::new("a,b\nc,d\n");
        assert_eq!(
            detect_record_delimiter(&mut source, None, &cancel),
            RecordDelimiter::None
        );
    }
}
