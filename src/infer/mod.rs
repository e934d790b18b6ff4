//! Value-format guessing.
//!
//! Given deduplicated sample values for one column, infer the narrowest
//! matching semantic format: boolean, GUID, numeric, date/time, or
//! fallback text. Attempts short-circuit on the first full match; partial
//! fits are remembered so the caller can still surface a "possible match".

pub mod dates;
pub mod numeric;
pub mod patterns;

use crate::cancel::CancelToken;
use crate::culture::Culture;
use crate::value_format::{DataType, ValueFormat};

pub use dates::{SERIAL_DATE_FORMAT, parse_serial};

/// How many non-matching examples a `CheckResult` retains.
const MAX_NON_MATCH_EXAMPLES: usize = 3;

/// Built-in boolean literal pairs, tried after the configured pair.
const BOOLEAN_PAIRS: [(&str, &str); 4] = [
    ("true", "false"),
    ("yes", "no"),
    ("y", "n"),
    ("1", "0"),
];

/// Options controlling one guess call.
#[derive(Debug, Clone)]
pub struct GuessOptions {
    /// Below this many distinct samples, only the prior-date shortcut runs.
    pub min_required_samples: usize,
    pub detect_numeric: bool,
    pub detect_date: bool,
    pub detect_boolean: bool,
    pub detect_guid: bool,
    pub detect_percentage: bool,
    /// Whether numeric day-count values may be read as dates.
    pub allow_serial_date: bool,
    /// Strip currency symbols before numeric parsing.
    pub remove_currency: bool,
    /// Configured boolean literals, tried before the built-in pairs.
    pub true_text: String,
    pub false_text: String,
    /// Date format already established for a sibling column; files tend to
    /// share one date convention, so it is tried first.
    pub prior_date_format: Option<ValueFormat>,
    pub culture: Culture,
}

impl Default for GuessOptions {
    fn default() -> Self {
        Self {
            min_required_samples: 5,
            detect_numeric: true,
            detect_date: true,
            detect_boolean: true,
            detect_guid: true,
            detect_percentage: true,
            allow_serial_date: false,
            remove_currency: true,
            true_text: "True".to_string(),
            false_text: "False".to_string(),
            prior_date_format: None,
            culture: Culture::default(),
        }
    }
}

/// Outcome of fitting a sample set to the candidate formats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckResult {
    /// Set only when every sample matched.
    pub found_format: Option<ValueFormat>,
    /// Best partial fit seen, fewest non-matching examples winning and
    /// ties going to the earliest candidate.
    pub possible_match: Option<ValueFormat>,
    /// Examples that broke the best partial fit, bounded.
    pub example_non_matches: Vec<String>,
}

impl CheckResult {
    pub fn has_possible_match(&self) -> bool {
        self.possible_match.is_some()
    }

    /// Keep the better of the current and the offered partial fit.
    pub(crate) fn keep_best_possible_match(
        &mut self,
        format: ValueFormat,
        mut non_matches: Vec<String>,
    ) {
        non_matches.truncate(MAX_NON_MATCH_EXAMPLES);
        let better = match &self.possible_match {
            Some(_) => non_matches.len() < self.example_non_matches.len(),
            None => true,
        };
        if better {
            self.possible_match = Some(format);
            self.example_non_matches = non_matches;
        }
    }
}

/// Infer the narrowest matching format for the samples.
///
/// Cancellation returns the best result accumulated so far; formats are
/// discovered monotonically, so a partial result is always valid.
pub fn guess_value_format(
    samples: &[String],
    options: &GuessOptions,
    cancel: &CancelToken,
) -> CheckResult {
    let mut result = CheckResult::default();
    if samples.is_empty() {
        return result;
    }

    // Booleans only ever have two distinct values.
    if options.detect_boolean
        && samples.len() <= 2
        && let Some(format) = check_boolean(samples, options)
    {
        result.found_format = Some(format);
        return result;
    }
    if cancel.is_cancelled() {
        return result;
    }

    if options.detect_guid
        && samples.iter().all(|s| patterns::GUID_PATTERN.is_match(s))
    {
        result.found_format = Some(ValueFormat::new(DataType::Guid));
        return result;
    }
    if cancel.is_cancelled() {
        return result;
    }

    // A sibling column's date format short-circuits the sample-count gate:
    // files tend to share one date convention.
    if options.detect_date
        && let Some(prior) = &options.prior_date_format
        && prior.data_type == DataType::DateTime
    {
        let expected = dates::format_len(prior) as f64;
        if (dates::mean_len(samples) - expected).abs() <= 0.5 && dates::all_match(samples, prior) {
            result.found_format = Some(prior.clone());
            return result;
        }
    }

    if samples.len() < options.min_required_samples {
        return serial_date_retry(samples, options, result);
    }

    // Packed yyyyMMdd dates look exactly like integers; decide before the
    // numeric check gets a chance.
    if options.detect_date
        && let Some(format) = dates::check_packed_date(samples)
    {
        result.found_format = Some(format);
        return result;
    }
    if cancel.is_cancelled() {
        return result;
    }

    if options.detect_date
        && options.allow_serial_date
        && options.detect_numeric
        && let Some(format) = dates::check_serial_date(samples)
    {
        result.found_format = Some(format);
        return result;
    }

    if options.detect_numeric {
        let (found, partial) = numeric::guess_numeric(
            samples,
            options.culture.decimal_separator,
            options.detect_percentage,
            options.remove_currency,
        );
        if let Some(format) = found {
            result.found_format = Some(format);
            return result;
        }
        if let Some((format, non_matches)) = partial {
            result.keep_best_possible_match(format, non_matches);
        }
    }
    if cancel.is_cancelled() {
        return result;
    }

    if options.detect_date {
        let (found, partial) = dates::guess_dates(samples, &options.culture);
        if let Some(format) = found {
            result.found_format = Some(format);
            return result;
        }
        if let Some((format, non_matches)) = partial {
            result.keep_best_possible_match(format, non_matches);
        }
    }

    // Last resort: numeric-ish text is still worth flagging as a possible
    // numeric column even when no separator pairing fit every sample.
    if !result.has_possible_match()
        && samples.iter().all(|s| patterns::NUMERIC_ISH_PATTERN.is_match(s))
    {
        result.possible_match = Some(ValueFormat::numeric(
            options.culture.decimal_separator,
            None,
        ));
    }

    serial_date_retry(samples, options, result)
}

/// When dates with serial support were requested but numeric detection was
/// off, serial dates get one more chance, unhampered by the sample-count
/// gate.
fn serial_date_retry(
    samples: &[String],
    options: &GuessOptions,
    mut result: CheckResult,
) -> CheckResult {
    if result.found_format.is_none()
        && options.detect_date
        && options.allow_serial_date
        && !options.detect_numeric
        && let Some(format) = dates::check_serial_date(samples)
    {
        result.found_format = Some(format);
    }
    result
}

fn check_boolean(samples: &[String], options: &GuessOptions) -> Option<ValueFormat> {
    let configured = (options.true_text.as_str(), options.false_text.as_str());
    for (true_text, false_text) in std::iter::once(configured).chain(BOOLEAN_PAIRS) {
        let all = samples.iter().all(|s| {
            let t = s.trim();
            t.eq_ignore_ascii_case(true_text) || t.eq_ignore_ascii_case(false_text)
        });
        if all {
            return Some(ValueFormat::boolean(true_text, false_text));
        }
    }
    None
}
