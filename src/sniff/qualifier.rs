//! Qualifier (quote character) sniffer.
//!
//! Each candidate gets scored against a normalized view of the stream where
//! runs of the same kind of character collapse to a single symbol. Quote
//! characters sitting right next to delimiters score as opening/closing
//! pairs; consistent pairs are the strongest signal.

use crate::cancel::CancelToken;
use crate::dialect::QualifierGuess;
use crate::reader::CharSource;

/// Normalized buffer limit in symbols; bounds worst-case latency on huge
/// files and must stay fixed, not configurable.
const BUFFER_LIMIT: usize = 8192;

/// Default candidate quote characters, the common case first.
pub const DEFAULT_QUALIFIERS: [char; 2] = ['"', '\''];

/// Symbol kinds of the normalized buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Symbol {
    /// Delimiter or line break.
    Delimiter,
    /// The candidate quote character.
    Quote,
    /// Anything else, escaped sequences included.
    Text,
}

/// Score every candidate and return the best result.
///
/// A score of zero means the candidate never appeared in a quoting
/// position; callers treat that as "no quoting".
pub fn detect_qualifier(
    reader: &mut dyn CharSource,
    delimiter: char,
    escape: Option<char>,
    candidates: &[char],
    cancel: &CancelToken,
) -> QualifierGuess {
    let mut best = QualifierGuess::not_detected();
    for &candidate in candidates {
        if cancel.is_cancelled() {
            return QualifierGuess::not_detected();
        }
        let result = score_candidate(reader, delimiter, escape, candidate, cancel);
        if result.score > best.score {
            best = result;
        }
    }
    best
}

fn score_candidate(
    reader: &mut dyn CharSource,
    delimiter: char,
    escape: Option<char>,
    candidate: char,
    cancel: &CancelToken,
) -> QualifierGuess {
    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let mut guess = QualifierGuess {
        qualifier: candidate,
        score: 0,
        duplicate_qualifier: false,
        escaped_qualifier: false,
    };

    // Leading delimiter pad keeps the open/close checks in range.
    let mut buffer: Vec<Symbol> = Vec::with_capacity(BUFFER_LIMIT + 2);
    buffer.push(Symbol::Delimiter);
    let mut processed = 0usize;
    while buffer.len() < BUFFER_LIMIT + 1 {
        let Some(c) = reader.read() else {
            break;
        };
        processed += 1;
        if processed % 1024 == 0 && cancel.is_cancelled() {
            return QualifierGuess::not_detected();
        }
        let symbol = if Some(c) == escape {
            if reader.peek() == Some(candidate) {
                guess.escaped_qualifier = true;
            }
            reader.read();
            Symbol::Text
        } else if c == delimiter || c == '\n' || c == '\r' {
            Symbol::Delimiter
        } else if c == candidate {
            Symbol::Quote
        } else {
            Symbol::Text
        };
        // Runs collapse to one symbol; adjacent quotes additionally flag
        // quote-doubling.
        if buffer.last() == Some(&symbol) {
            if symbol == Symbol::Quote {
                guess.duplicate_qualifier = true;
            }
            continue;
        }
        buffer.push(symbol);
    }
    buffer.push(Symbol::Delimiter);

    if reader.can_seek() {
        let _ = reader.rewind_to_start();
    }

    let mut total = 0usize;
    let mut open_simple = 0usize;
    let mut open_strict = 0usize;
    let mut close_simple = 0usize;
    let mut close_strict = 0usize;
    for i in 1..buffer.len() - 1 {
        if buffer[i] != Symbol::Quote {
            continue;
        }
        total += 1;
        let opens = buffer[i - 1] == Symbol::Delimiter;
        let closes = buffer[i + 1] == Symbol::Delimiter;
        if opens {
            open_simple += 1;
            if buffer[i + 1] == Symbol::Text {
                open_strict += 1;
            }
        }
        if closes {
            close_simple += 1;
            if !opens {
                close_strict += 1;
            }
        }
    }

    let signal = if open_strict > 0
        && close_strict > 0
        && consistent(open_strict, close_strict)
    {
        open_strict + close_strict
    } else if open_simple + close_simple > 0 {
        open_simple + close_simple
    } else {
        total
    };

    let mut score = (signal * 100 / buffer.len()).min(99);
    if candidate == '"' && signal > 0 {
        // Tie-break toward the common case.
        score = score.min(85) + 25;
        score = score.min(99);
    }
    guess.score = score as u8;
    guess
}

/// Strict open/close counts are usable when neither side outnumbers the
/// other by more than 1.5×.
fn consistent(a: usize, b: usize) -> bool {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    high * 2 <= low * 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::TextSource;

    fn detect(text: &str) -> QualifierGuess {
        let mut source = TextSource::new(text);
        detect_qualifier(
            &mut source,
            ',',
            None,
            &DEFAULT_QUALIFIERS,
            &CancelToken::new(),
        )
    }

    #[test]
    fn test_consistent_double_quotes_win() {
        let mut data = String::new();
        for i in 0..10 {
            data.push_str(&format!("\"field {i}\",\"other {i}\",plain\n"));
        }
        let guess = detect(&data);
        assert_eq!(guess.qualifier, '"');
        assert!(guess.score > 25, "score was {}", guess.score);
        assert!(!guess.duplicate_qualifier);
    }

    #[test]
    fn test_double_beats_sparse_single_before_bonus() {
        // `"` consistently hugs the delimiter; `'` floats inside prose.
        let mut data = String::new();
        for i in 0..10 {
            data.push_str(&format!("\"a {i}\",it's fine,\"b {i}\"\n"));
        }
        let mut source = TextSource::new(&data);
        let cancel = CancelToken::new();
        let double = score_candidate(&mut source, ',', None, '"', &cancel);
        source.rewind_to_start().unwrap();
        let single = score_candidate(&mut source, ',', None, '\'', &cancel);
        let double_raw = double.score.saturating_sub(25);
        assert!(
            double_raw > single.score,
            "raw {} vs single {}",
            double_raw,
            single.score
        );
    }

    #[test]
    fn test_quote_doubling_flagged() {
        let mut data = String::new();
        for i in 0..6 {
            data.push_str(&format!("\"say \"\"hi\"\" {i}\",x\n"));
        }
        let guess = detect(&data);
        assert_eq!(guess.qualifier, '"');
        assert!(guess.duplicate_qualifier);
    }

    #[test]
    fn test_escaped_qualifier_flagged() {
        let mut source = TextSource::new("\"a \\\" b\",c\n\"d\",e\n");
        let guess = detect_qualifier(
            &mut source,
            ',',
            Some('\\'),
            &DEFAULT_QUALIFIERS,
            &CancelToken::new(),
        );
        assert_eq!(guess.qualifier, '"');
        assert!(guess.escaped_qualifier);
    }

    #[test]
    fn test_no_quotes_scores_zero() {
        let guess = detect("a,b,c\nd,e,f\n");
        assert_eq!(guess.score, 0);
    }
}
