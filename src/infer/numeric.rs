//! Numeric sample matching with locale-aware separators.
//!
//! The guesser tries every plausible pairing of decimal and thousands
//! separator actually observed in the samples; a pairing matches only when
//! every sample parses under it.

use crate::value_format::{DataType, ValueFormat};

/// Decimal separators worth trying.
const DECIMAL_CANDIDATES: [char; 2] = ['.', ','];

/// Thousands separators worth trying.
const GROUP_CANDIDATES: [char; 5] = ['.', ',', ' ', '\u{00A0}', '\''];

/// Currency symbols stripped before parsing when enabled.
const CURRENCY_SYMBOLS: [char; 6] = ['$', '€', '£', '¥', '₹', '¢'];

/// Outcome of parsing one sample under a separator pairing.
struct ParsedNumber {
    integral: bool,
    exponent: bool,
    digits: usize,
    percent: bool,
    permille: bool,
}

/// Try the observed separator combinations; the first pairing under which
/// every sample parses wins. Returns the matching format, or the best
/// partial pairing with its non-matching examples.
pub(crate) fn guess_numeric(
    samples: &[String],
    default_decimal: char,
    allow_percentage: bool,
    remove_currency: bool,
) -> (Option<ValueFormat>, Option<(ValueFormat, Vec<String>)>) {
    let decimals: Vec<char> = {
        let mut observed: Vec<char> = DECIMAL_CANDIDATES
            .iter()
            .copied()
            .filter(|&sep| samples.iter().any(|s| s.contains(sep)))
            .collect();
        if observed.is_empty() {
            // No separator in sight: fall back to the culture default.
            observed.push(default_decimal);
        }
        observed
    };
    let mut groups: Vec<Option<char>> = vec![None];
    groups.extend(
        GROUP_CANDIDATES
            .iter()
            .copied()
            .filter(|&sep| samples.iter().any(|s| s.contains(sep)))
            .map(Some),
    );

    let mut best_partial: Option<(ValueFormat, Vec<String>)> = None;
    for &decimal in &decimals {
        for &group in &groups {
            if group == Some(decimal) {
                continue;
            }
            let mut non_matches: Vec<String> = Vec::new();
            let mut integral = true;
            let mut exponent = false;
            let mut max_digits = 0usize;
            let mut percent = 0usize;
            let mut permille = 0usize;
            for sample in samples {
                match parse_number(sample, decimal, group, allow_percentage, remove_currency) {
                    Some(parsed) => {
                        integral &= parsed.integral;
                        exponent |= parsed.exponent;
                        max_digits = max_digits.max(parsed.digits);
                        if parsed.percent {
                            percent += 1;
                        }
                        if parsed.permille {
                            permille += 1;
                        }
                    }
                    None => non_matches.push(sample.clone()),
                }
            }
            let format = classify(
                samples.len() - non_matches.len(),
                integral,
                exponent,
                max_digits,
                percent,
                permille,
                decimal,
                group,
            );
            let Some(format) = format else {
                continue;
            };
            if non_matches.is_empty() {
                return (Some(format), best_partial);
            }
            let better = match &best_partial {
                Some((_, existing)) => non_matches.len() < existing.len(),
                None => true,
            };
            if better {
                non_matches.truncate(3);
                best_partial = Some((format, non_matches));
            }
        }
    }
    (None, best_partial)
}

#[allow(clippy::too_many_arguments)]
fn classify(
    matched: usize,
    integral: bool,
    exponent: bool,
    max_digits: usize,
    percent: usize,
    permille: usize,
    decimal: char,
    group: Option<char>,
) -> Option<ValueFormat> {
    if matched == 0 {
        return None;
    }
    // Mixed percent and permille markers cannot share one scale.
    if percent > 0 && permille > 0 {
        return None;
    }
    let data_type = if permille > 0 {
        DataType::Permille
    } else if percent > 0 {
        DataType::Percentage
    } else if exponent || max_digits > 15 {
        DataType::Double
    } else if integral {
        DataType::Integer
    } else {
        DataType::Numeric
    };
    Some(ValueFormat {
        data_type,
        decimal_separator: decimal,
        group_separator: group,
        ..ValueFormat::default()
    })
}

/// Parse one trimmed sample under a separator pairing. Grouped digits must
/// come in blocks of three left of the decimal separator.
fn parse_number(
    sample: &str,
    decimal: char,
    group: Option<char>,
    allow_percentage: bool,
    remove_currency: bool,
) -> Option<ParsedNumber> {
    let mut s = sample.trim().to_string();
    if remove_currency {
        s = s
            .trim_matches(|c: char| CURRENCY_SYMBOLS.contains(&c) || c.is_whitespace())
            .to_string();
    }

    let mut percent = false;
    let mut permille = false;
    if allow_percentage {
        for (marker, flag) in [('%', &mut percent), ('‰', &mut permille)] {
            if let Some(rest) = s.strip_suffix(marker).or_else(|| s.strip_prefix(marker)) {
                *flag = true;
                s = rest.trim().to_string();
                break;
            }
        }
    }

    let body = s.strip_prefix(['+', '-']).unwrap_or(&s);
    if body.is_empty() {
        return None;
    }

    // Split off the fraction at the (single) decimal separator.
    let mut parts = body.splitn(2, decimal);
    let int_part = parts.next().unwrap_or("");
    let rest = parts.next();
    if rest.is_some_and(|r| r.contains(decimal)) {
        return None;
    }
    // Fraction may end in an exponent.
    let (frac_part, exp_part) = match rest {
        Some(r) => match r.split_once(['e', 'E']) {
            Some((frac, exp)) => (Some(frac), Some(exp)),
            None => (Some(r), None),
        },
        None => match int_part.split_once(['e', 'E']) {
            Some((int, exp)) => {
                return finish(int, None, Some(exp), group, percent, permille);
            }
            None => (None, None),
        },
    };
    finish(int_part, frac_part, exp_part, group, percent, permille)
}

fn finish(
    int_part: &str,
    frac_part: Option<&str>,
    exp_part: Option<&str>,
    group: Option<char>,
    percent: bool,
    permille: bool,
) -> Option<ParsedNumber> {
    let int_digits = strip_groups(int_part, group)?;
    if !int_digits.chars().all(|c| c.is_ascii_digit()) || int_digits.is_empty() {
        return None;
    }
    if let Some(frac) = frac_part
        && (frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    if let Some(exp) = exp_part {
        let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp.is_empty() || !exp.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    let digits = int_digits.len() + frac_part.map_or(0, str::len);
    Some(ParsedNumber {
        integral: frac_part.is_none() && exp_part.is_none(),
        exponent: exp_part.is_some(),
        digits,
        percent,
        permille,
    })
}

/// Remove a thousands separator, insisting on 3-digit grouping.
fn strip_groups(int_part: &str, group: Option<char>) -> Option<String> {
    let Some(group) = group else {
        return Some(int_part.to_string());
    };
    if !int_part.contains(group) {
        return Some(int_part.to_string());
    }
    let chunks: Vec<&str> = int_part.split(group).collect();
    let first = chunks.first()?;
    if first.is_empty() || first.len() > 3 {
        return None;
    }
    for chunk in &chunks[1..] {
        if chunk.len() != 3 {
            return None;
        }
    }
    Some(chunks.concat())
}
