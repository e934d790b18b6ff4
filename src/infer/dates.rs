//! Date and time sample matching.
//!
//! Patterns are written in `yyyy`/`MM`/`dd`/`HH`/`mm`/`ss` tokens with `/`
//! and `:` standing in for the date and time separators. Candidate
//! separators come from the samples themselves; a pattern is only tried
//! when its expected width matches the samples' mean length.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::culture::Culture;
use crate::value_format::ValueFormat;

/// Marker pattern for numeric day-count (serial) dates.
pub const SERIAL_DATE_FORMAT: &str = "SerialDate";

/// OLE-automation day zero: serial dates count days from here.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial values outside this range do not map to representable dates.
const SERIAL_MIN: f64 = -657_435.0;
const SERIAL_MAX: f64 = 2_958_466.0;

/// Standard patterns, most common first. Packed patterns carry no `/`.
const DATE_PATTERNS: &[&str] = &[
    "MM/dd/yyyy",
    "dd/MM/yyyy",
    "yyyy/MM/dd",
    "MM/dd/yy",
    "dd/MM/yy",
    "yyyyMMdd",
    "MM/dd/yyyy HH:mm:ss",
    "dd/MM/yyyy HH:mm:ss",
    "yyyy/MM/dd HH:mm:ss",
    "yyyy/MM/ddTHH:mm:ss",
    "MM/dd/yyyy HH:mm",
    "dd/MM/yyyy HH:mm",
    "HH:mm:ss",
    "HH:mm",
];

/// Date separators a sample can reveal.
const SEPARATOR_CANDIDATES: [char; 3] = ['/', '-', '.'];

/// Expected sample width of a pattern under a given separator.
fn expected_len(pattern: &str, separator: Option<char>) -> usize {
    pattern
        .chars()
        .map(|c| {
            if c == '/' {
                usize::from(separator.is_some())
            } else {
                1
            }
        })
        .sum()
}

/// Translate a token pattern into a chrono format string. Patterns are
/// ASCII by construction.
fn to_chrono(pattern: &str, separator: Option<char>, time_separator: char) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < pattern.len() {
        let rest = &pattern[i..];
        let (token, len) = if rest.starts_with("yyyy") {
            ("%Y", 4)
        } else if rest.starts_with("yy") {
            ("%y", 2)
        } else if rest.starts_with("MM") {
            ("%m", 2)
        } else if rest.starts_with("dd") {
            ("%d", 2)
        } else if rest.starts_with("HH") {
            ("%H", 2)
        } else if rest.starts_with("mm") {
            ("%M", 2)
        } else if rest.starts_with("ss") {
            ("%S", 2)
        } else {
            ("", 1)
        };
        if token.is_empty() {
            match rest.as_bytes()[0] as char {
                '/' => {
                    if let Some(sep) = separator {
                        out.push(sep);
                    }
                }
                ':' => out.push(time_separator),
                other => out.push(other),
            }
        } else {
            out.push_str(token);
        }
        i += len;
    }
    out
}

fn has_date_part(pattern: &str) -> bool {
    pattern.contains("dd") || pattern.contains("yyyy") || pattern.contains("yy")
}

fn has_time_part(pattern: &str) -> bool {
    pattern.contains("HH")
}

/// Check one sample against a translated pattern.
fn parses(sample: &str, fmt: &str, date: bool, time: bool) -> bool {
    match (date, time) {
        (true, true) => NaiveDateTime::parse_from_str(sample, fmt).is_ok(),
        (true, false) => NaiveDate::parse_from_str(sample, fmt).is_ok(),
        (false, _) => NaiveTime::parse_from_str(sample, fmt).is_ok(),
    }
}

/// Check every sample against one fully resolved format.
pub(crate) fn all_match(samples: &[String], format: &ValueFormat) -> bool {
    if format.date_format == SERIAL_DATE_FORMAT {
        return samples.iter().all(|s| parse_serial(s).is_some());
    }
    let fmt = to_chrono(
        &format.date_format,
        format.date_separator,
        format.time_separator,
    );
    let date = has_date_part(&format.date_format);
    let time = has_time_part(&format.date_format);
    samples.iter().all(|s| parses(s, &fmt, date, time))
}

/// Expected width of an already resolved format, for the prior-format
/// shortcut.
pub(crate) fn format_len(format: &ValueFormat) -> usize {
    expected_len(&format.date_format, format.date_separator)
}

/// Mean sample length in characters.
pub(crate) fn mean_len(samples: &[String]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.chars().count()).sum::<usize>() as f64 / samples.len() as f64
}

/// Try the standard patterns against the samples.
///
/// Returns the first fully matching format, or the best partial fit with
/// its non-matching examples.
pub(crate) fn guess_dates(
    samples: &[String],
    culture: &Culture,
) -> (Option<ValueFormat>, Option<(ValueFormat, Vec<String>)>) {
    let mean = mean_len(samples);

    // Keep every separator tied for most occurrences.
    let counts: Vec<(char, usize)> = SEPARATOR_CANDIDATES
        .iter()
        .map(|&sep| {
            (
                sep,
                samples
                    .iter()
                    .map(|s| s.chars().filter(|&c| c == sep).count())
                    .sum(),
            )
        })
        .collect();
    let top = counts.iter().map(|&(_, n)| n).max().unwrap_or(0);
    let separators: Vec<char> = counts
        .iter()
        .filter(|&&(_, n)| n > 0 && n == top)
        .map(|&(sep, _)| sep)
        .collect();

    let mut ordered: Vec<&str> = Vec::with_capacity(DATE_PATTERNS.len());
    ordered.push(culture.date_format);
    ordered.extend(DATE_PATTERNS.iter().filter(|&&p| p != culture.date_format));

    let mut best_partial: Option<(ValueFormat, Vec<String>)> = None;
    for pattern in ordered {
        let candidate_seps: Vec<Option<char>> = if pattern.contains('/') {
            separators.iter().map(|&s| Some(s)).collect()
        } else {
            vec![None]
        };
        for sep in candidate_seps {
            let expected = expected_len(pattern, sep);
            if (mean - expected as f64).abs() > 0.5 {
                continue;
            }
            let fmt = to_chrono(pattern, sep, ':');
            let date = has_date_part(pattern);
            let time = has_time_part(pattern);
            let non_matches: Vec<String> = samples
                .iter()
                .filter(|s| !parses(s, &fmt, date, time))
                .cloned()
                .collect();
            let format = ValueFormat::date(pattern, sep, ':');
            if non_matches.is_empty() {
                return (Some(format), best_partial);
            }
            if non_matches.len() < samples.len() {
                let better = match &best_partial {
                    Some((_, existing)) => non_matches.len() < existing.len(),
                    None => true,
                };
                if better {
                    let mut examples = non_matches;
                    examples.truncate(3);
                    best_partial = Some((format, examples));
                }
            }
        }
    }
    (None, best_partial)
}

/// Eight digits shaped like `yyyyMMdd`; tried before numeric detection so
/// packed dates are not misread as integers.
pub(crate) fn check_packed_date(samples: &[String]) -> Option<ValueFormat> {
    if samples.is_empty() {
        return None;
    }
    let all_packed = samples.iter().all(|s| {
        s.chars().count() == 8
            && s.chars().all(|c| c.is_ascii_digit())
            && NaiveDate::parse_from_str(s, "%Y%m%d").is_ok()
    });
    if all_packed {
        Some(ValueFormat::date("yyyyMMdd", None, ':'))
    } else {
        None
    }
}

/// Numeric day-count dates.
pub(crate) fn check_serial_date(samples: &[String]) -> Option<ValueFormat> {
    if samples.is_empty() {
        return None;
    }
    if samples.iter().all(|s| parse_serial(s).is_some()) {
        Some(ValueFormat::date(SERIAL_DATE_FORMAT, None, ':'))
    } else {
        None
    }
}

/// Parse a serial day-count into a timestamp.
pub fn parse_serial(sample: &str) -> Option<NaiveDateTime> {
    let value: f64 = sample.trim().parse().ok()?;
    if !(SERIAL_MIN..SERIAL_MAX).contains(&value) {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_time(NaiveTime::MIN);
    let seconds = (value * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn to_samples(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_iso_dates() {
        let samples = to_samples(&["2023-01-15", "2022-12-31", "2024-06-01"]);
        let (found, _) = guess_dates(&samples, &Culture::EN_US);
        let format = found.unwrap();
        assert_eq!(format.date_format, "yyyy/MM/dd");
        assert_eq!(format.date_separator, Some('-'));
    }

    #[test]
    fn test_us_dates() {
        let samples = to_samples(&["01/15/2023", "12/31/2022"]);
        let (found, _) = guess_dates(&samples, &Culture::EN_US);
        let format = found.unwrap();
        assert_eq!(format.date_format, "MM/dd/yyyy");
        assert_eq!(format.date_separator, Some('/'));
    }

    #[test]
    fn test_german_dates() {
        let samples = to_samples(&["31.12.2023", "01.06.2024"]);
        let (found, _) = guess_dates(&samples, &Culture::EN_US);
        let format = found.unwrap();
        assert_eq!(format.date_format, "dd/MM/yyyy");
        assert_eq!(format.date_separator, Some('.'));
    }

    #[test]
    fn test_datetime_with_time() {
        let samples = to_samples(&["2023-01-15 10:30:00", "2022-12-31 23:59:59"]);
        let (found, _) = guess_dates(&samples, &Culture::EN_US);
        let format = found.unwrap();
        assert_eq!(format.date_format, "yyyy/MM/dd HH:mm:ss");
    }

    #[test]
    fn test_time_only() {
        let samples = to_samples(&["10:30:00", "23:59:59"]);
        let (found, _) = guess_dates(&samples, &Culture::EN_US);
        assert_eq!(found.unwrap().date_format, "HH:mm:ss");
    }

    #[test]
    fn test_invalid_month_rejected() {
        let samples = to_samples(&["2023-13-01", "2023-14-02"]);
        let (found, _) = guess_dates(&samples, &Culture::EN_US);
        assert!(found.is_none());
    }

    #[test]
    fn test_packed_date() {
        let samples = to_samples(&["20230101", "20230215", "20221231"]);
        let format = check_packed_date(&samples).unwrap();
        assert_eq!(format.date_format, "yyyyMMdd");
        assert_eq!(format.date_separator, None);
    }

    #[test]
    fn test_packed_rejects_non_dates() {
        // Eight digits but month 23 does not exist.
        assert!(check_packed_date(&to_samples(&["20231540"])).is_none());
    }

    #[test]
    fn test_serial_date_conversion() {
        // Day 2 of the serial calendar is 1900-01-01.
        let parsed = parse_serial("2").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (1900, 1, 1));
        // Fractional part carries the time of day.
        let noon = parse_serial("2.5").unwrap();
        assert_eq!(noon.hour(), 12);
    }

    #[test]
    fn test_serial_range() {
        assert!(parse_serial("3000000").is_none());
        assert!(parse_serial("44927.25").is_some());
    }

    #[test]
    fn test_partial_match_tracked() {
        let samples = to_samples(&["2023-01-15", "2022-12-31", "not a date"]);
        let (found, partial) = guess_dates(&samples, &Culture::EN_US);
        assert!(found.is_none());
        let (format, examples) = partial.unwrap();
        assert_eq!(format.date_format, "yyyy/MM/dd");
        assert_eq!(examples, vec!["not a date".to_string()]);
    }
}
