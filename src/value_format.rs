//! Semantic column formats produced by the value-format guesser.

use std::fmt;

/// Semantic data types a column can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// Text/string value (fallback type).
    #[default]
    String,
    /// Whole number.
    Integer,
    /// Floating point number (scientific notation or > 15 significant digits).
    Double,
    /// Decimal number.
    Numeric,
    /// Boolean value.
    Boolean,
    /// Date or date+time value.
    DateTime,
    /// Globally unique identifier in canonical format.
    Guid,
    /// Decimal number expressed with a trailing/leading percent sign (÷100).
    Percentage,
    /// Decimal number expressed with a per-mille sign (÷1000).
    Permille,
    /// A delimited part of a composite text value.
    TextPart,
}

impl DataType {
    /// Returns true for the numeric family, percentage variants included.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Integer
                | DataType::Double
                | DataType::Numeric
                | DataType::Percentage
                | DataType::Permille
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "String",
            DataType::Integer => "Integer",
            DataType::Double => "Double",
            DataType::Numeric => "Numeric",
            DataType::Boolean => "Boolean",
            DataType::DateTime => "DateTime",
            DataType::Guid => "Guid",
            DataType::Percentage => "Percentage",
            DataType::Permille => "Permille",
            DataType::TextPart => "TextPart",
        };
        write!(f, "{name}")
    }
}

/// A fully specified column format.
///
/// Only the fields relevant to `data_type` are meaningful; the rest keep
/// their defaults. Equality compares exactly the relevant fields.
#[derive(Debug, Clone)]
pub struct ValueFormat {
    pub data_type: DataType,
    /// Date pattern, `yyyy`/`MM`/`dd`/`HH`/`mm`/`ss` tokens with `/` and `:`
    /// standing in for the separators below.
    pub date_format: String,
    /// Separator substituted for `/` in `date_format`; `None` for packed
    /// patterns such as `yyyyMMdd`.
    pub date_separator: Option<char>,
    /// Separator substituted for `:` in `date_format`.
    pub time_separator: char,
    /// Thousands separator, `None` when digits are not grouped.
    pub group_separator: Option<char>,
    /// Decimal separator.
    pub decimal_separator: char,
    /// Literal accepted as true.
    pub true_text: String,
    /// Literal accepted as false.
    pub false_text: String,
    /// One-based part number for `TextPart`.
    pub part: usize,
    /// Splitter character for `TextPart`.
    pub part_splitter: char,
    /// Whether the part extends to the end of the value.
    pub part_to_end: bool,
}

impl Default for ValueFormat {
    fn default() -> Self {
        Self {
            data_type: DataType::String,
            date_format: "MM/dd/yyyy".to_string(),
            date_separator: Some('/'),
            time_separator: ':',
            group_separator: None,
            decimal_separator: '.',
            true_text: "True".to_string(),
            false_text: "False".to_string(),
            part: 1,
            part_splitter: ':',
            part_to_end: false,
        }
    }
}

impl ValueFormat {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Self::default()
        }
    }

    pub fn integer() -> Self {
        Self::new(DataType::Integer)
    }

    pub fn numeric(decimal_separator: char, group_separator: Option<char>) -> Self {
        Self {
            data_type: DataType::Numeric,
            decimal_separator,
            group_separator,
            ..Self::default()
        }
    }

    pub fn date(format: &str, date_separator: Option<char>, time_separator: char) -> Self {
        Self {
            data_type: DataType::DateTime,
            date_format: format.to_string(),
            date_separator,
            time_separator,
            ..Self::default()
        }
    }

    pub fn boolean(true_text: &str, false_text: &str) -> Self {
        Self {
            data_type: DataType::Boolean,
            true_text: true_text.to_string(),
            false_text: false_text.to_string(),
            ..Self::default()
        }
    }
}

impl PartialEq for ValueFormat {
    fn eq(&self, other: &Self) -> bool {
        if self.data_type != other.data_type {
            return false;
        }
        match self.data_type {
            DataType::String | DataType::Integer | DataType::Guid => true,
            DataType::Double | DataType::Numeric | DataType::Percentage | DataType::Permille => {
                self.decimal_separator == other.decimal_separator
                    && self.group_separator == other.group_separator
            }
            DataType::Boolean => {
                self.true_text.eq_ignore_ascii_case(&other.true_text)
                    && self.false_text.eq_ignore_ascii_case(&other.false_text)
            }
            DataType::DateTime => {
                self.date_format == other.date_format
                    && self.date_separator == other.date_separator
                    && self.time_separator == other.time_separator
            }
            DataType::TextPart => {
                self.part == other.part
                    && self.part_splitter == other.part_splitter
                    && self.part_to_end == other.part_to_end
            }
        }
    }
}

impl Eq for ValueFormat {}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data_type {
            DataType::DateTime => {
                let mut pattern = self.date_format.clone();
                if let Some(sep) = self.date_separator {
                    pattern = pattern.replace('/', &sep.to_string());
                } else {
                    pattern = pattern.replace('/', "");
                }
                pattern = pattern.replace(':', &self.time_separator.to_string());
                write!(f, "{} ({})", self.data_type, pattern)
            }
            DataType::Numeric | DataType::Double | DataType::Percentage | DataType::Permille => {
                match self.group_separator {
                    Some(group) => write!(
                        f,
                        "{} (decimal '{}', group '{}')",
                        self.data_type, self.decimal_separator, group
                    ),
                    None => write!(f, "{} (decimal '{}')", self.data_type, self.decimal_separator),
                }
            }
            DataType::Boolean => {
                write!(f, "{} ({}/{})", self.data_type, self.true_text, self.false_text)
            }
            _ => write!(f, "{}", self.data_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_irrelevant_fields() {
        let mut a = ValueFormat::integer();
        let mut b = ValueFormat::integer();
        a.decimal_separator = '.';
        b.decimal_separator = ',';
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_compares_relevant_fields() {
        let a = ValueFormat::numeric(',', Some('.'));
        let b = ValueFormat::numeric('.', Some(','));
        assert_ne!(a, b);
        assert_eq!(a, ValueFormat::numeric(',', Some('.')));
    }

    #[test]
    fn test_date_display_substitutes_separators() {
        let format = ValueFormat::date("yyyy/MM/dd", Some('-'), ':');
        assert_eq!(format.to_string(), "DateTime (yyyy-MM-dd)");
        let packed = ValueFormat::date("yyyyMMdd", None, ':');
        assert_eq!(packed.to_string(), "DateTime (yyyyMMdd)");
    }
}
