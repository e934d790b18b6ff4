//! Character-level record tokenizer.
//!
//! Turns a character stream into one record (an ordered list of field
//! strings) while honoring quoting, escaping and comment rules. Shared by
//! the header and start-row sniffers and by the full read that follows
//! detection.
//!
//! Malformed quoting never raises: an unterminated quote simply runs to the
//! end of the stream.

use std::collections::VecDeque;

use crate::reader::CharSource;

/// Reads one logical record from `reader`.
///
/// Returns `None` at end of stream, `Some(vec![])` for a genuinely empty
/// line, and otherwise at least one field (trailing fields may be empty
/// strings). Records that start with `comment` (after optional leading
/// whitespace) are consumed in full and the next record is read
/// transparently.
pub fn read_record(
    reader: &mut dyn CharSource,
    delimiter: char,
    qualifier: Option<char>,
    escape: Option<char>,
    comment: &str,
) -> Option<Vec<String>> {
    loop {
        if reader.at_end() {
            return None;
        }
        let mut pending = VecDeque::new();
        if !comment.is_empty() && consume_comment(reader, delimiter, comment, &mut pending) {
            continue;
        }
        let mut chars = Chars { pending, reader };
        return Some(parse_fields(&mut chars, delimiter, qualifier, escape));
    }
}

/// Single-character lookahead over a pushback buffer plus the reader.
///
/// The pushback buffer holds characters consumed during a failed comment
/// prefix match; they are ordinary data and flow through the field state
/// machine first.
struct Chars<'a> {
    pending: VecDeque<char>,
    reader: &'a mut dyn CharSource,
}

impl Chars<'_> {
    fn next(&mut self) -> Option<char> {
        self.pending.pop_front().or_else(|| self.reader.read())
    }

    fn peek(&mut self) -> Option<char> {
        self.pending.front().copied().or_else(|| self.reader.peek())
    }
}

/// Tries to match a comment line at the current position.
///
/// On a match the whole line (terminator included) is consumed and `true`
/// is returned. On a miss the characters read so far are left in `pending`
/// and `false` is returned.
fn consume_comment(
    reader: &mut dyn CharSource,
    delimiter: char,
    comment: &str,
    pending: &mut VecDeque<char>,
) -> bool {
    while let Some(c) = reader.peek() {
        if c == ' ' || (c == '\t' && delimiter != '\t') {
            pending.push_back(c);
            reader.read();
        } else {
            break;
        }
    }
    let mut matched = 0usize;
    for expected in comment.chars() {
        if reader.peek() == Some(expected) {
            reader.read();
            pending.push_back(expected);
            matched += 1;
        } else {
            break;
        }
    }
    if matched < comment.chars().count() {
        return false;
    }
    // Commented record: discard up to and including the terminator.
    pending.clear();
    while let Some(c) = reader.read() {
        if c == '\n' || c == '\r' {
            let pair = if c == '\n' { '\r' } else { '\n' };
            if reader.peek() == Some(pair) {
                reader.read();
            }
            break;
        }
    }
    true
}

fn parse_fields(
    chars: &mut Chars<'_>,
    delimiter: char,
    qualifier: Option<char>,
    escape: Option<char>,
) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Still inside the leading space/tab run of the current field.
    let mut leading = true;
    let mut consumed_data = false;

    loop {
        let Some(c) = chars.next() else {
            break;
        };

        if escape == Some(c) {
            consumed_data = true;
            leading = false;
            match chars.next() {
                Some(next) => {
                    if Some(next) == escape || next == delimiter || Some(next) == qualifier {
                        field.push(next);
                    } else {
                        field.push(c);
                        field.push(next);
                    }
                }
                None => field.push(c),
            }
            continue;
        }

        if in_quotes {
            if Some(c) == qualifier {
                if chars.peek() == qualifier {
                    // Doubled qualifier is a literal one, except when the
                    // pair sits immediately before the end of the field.
                    chars.next();
                    field.push(c);
                    match chars.peek() {
                        None => in_quotes = false,
                        Some(n) if n == delimiter || n == '\n' || n == '\r' => in_quotes = false,
                        _ => {}
                    }
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        if c == delimiter {
            consumed_data = true;
            fields.push(std::mem::take(&mut field));
            leading = true;
            continue;
        }

        if c == '\n' || c == '\r' {
            let pair = if c == '\n' { '\r' } else { '\n' };
            if chars.peek() == Some(pair) {
                chars.next();
            }
            break;
        }

        consumed_data = true;
        if Some(c) == qualifier && leading {
            // Qualifier as the first non-space character opens a quoted
            // field; the leading whitespace run is dropped.
            field.clear();
            in_quotes = true;
            leading = false;
            continue;
        }
        if leading && (c == ' ' || (c == '\t' && delimiter != '\t')) {
            field.push(c);
            continue;
        }
        leading = false;
        field.push(c);
    }

    if !consumed_data {
        return Vec::new();
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::TextSource;

    fn record(text: &str) -> Option<Vec<String>> {
        let mut source = TextSource::new(text);
        read_record(&mut source, ',', Some('"'), None, "")
    }

    #[test]
    fn test_plain_record() {
        assert_eq!(record("a,b,c\n"), Some(vec!["a".into(), "b".into(), "c".into()]));
    }

    #[test]
    fn test_quoted_roundtrip() {
        // Embedded delimiter, doubled quote, plain fields.
        assert_eq!(
            record("a,\"b,c\",\"d\"\"e\",f\n"),
            Some(vec!["a".into(), "b,c".into(), "d\"e".into(), "f".into()])
        );
    }

    #[test]
    fn test_doubled_quote_before_end_of_field() {
        assert_eq!(record("\"abc\"\",x\n"), Some(vec!["abc\"".into(), "x".into()]));
    }

    #[test]
    fn test_newline_inside_quotes_is_data() {
        let mut source = TextSource::new("\"a\r\nb\",c\n");
        let rec = read_record(&mut source, ',', Some('"'), None, "").unwrap();
        assert_eq!(rec, vec!["a\r\nb".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_empty_line_yields_zero_fields() {
        assert_eq!(record("\nnext"), Some(vec![]));
    }

    #[test]
    fn test_single_empty_field_is_distinguishable() {
        assert_eq!(record(",\n"), Some(vec!["".to_string(), "".to_string()]));
    }

    #[test]
    fn test_trailing_empty_fields() {
        assert_eq!(
            record("a,b,\n"),
            Some(vec!["a".into(), "b".into(), "".into()])
        );
    }

    #[test]
    fn test_leading_whitespace_preserved_without_quote() {
        assert_eq!(record("  a,b\n"), Some(vec!["  a".into(), "b".into()]));
    }

    #[test]
    fn test_leading_whitespace_dropped_before_quote() {
        assert_eq!(record("  \"a\",b\n"), Some(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_escape_before_special_is_dropped() {
        let mut source = TextSource::new("a\\,b,c\n");
        let rec = read_record(&mut source, ',', Some('"'), Some('\\'), "").unwrap();
        assert_eq!(rec, vec!["a,b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_escape_before_ordinary_char_is_kept() {
        let mut source = TextSource::new("a\\nb,c\n");
        let rec = read_record(&mut source, ',', Some('"'), Some('\\'), "").unwrap();
        assert_eq!(rec, vec!["a\\nb".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_comment_line_skipped_transparently() {
        let mut source = TextSource::new("# remark\na,b\n");
        let rec = read_record(&mut source, ',', Some('"'), None, "#").unwrap();
        assert_eq!(rec, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_partial_comment_prefix_is_data() {
        let mut source = TextSource::new("/a,b\n");
        let rec = read_record(&mut source, ',', Some('"'), None, "//").unwrap();
        assert_eq!(rec, vec!["/a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(record("\"abc,def"), Some(vec!["abc,def".into()]));
    }

    #[test]
    fn test_end_of_stream() {
        let mut source = TextSource::new("");
        assert_eq!(read_record(&mut source, ',', Some('"'), None, ""), None);
    }

    #[test]
    fn test_comment_only_file_yields_none() {
        let mut source = TextSource::new("# one\n# two\n");
        assert_eq!(read_record(&mut source, ',', Some('"'), None, "#"), None);
    }

    #[test]
    fn test_lfcr_pair_is_one_terminator() {
        let mut source = TextSource::new("a,b\n\rc,d\n");
        let first = read_record(&mut source, ',', Some('"'), None, "").unwrap();
        let second = read_record(&mut source, ',', Some('"'), None, "").unwrap();
        assert_eq!(first, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(second, vec!["c".to_string(), "d".to_string()]);
    }
}
