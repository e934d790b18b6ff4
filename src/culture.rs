//! Explicit locale hints for detection.
//!
//! Number and date parsing never read the ambient system locale; callers pass
//! a [`Culture`] so detection is deterministic and testable. The default is
//! en-US conventions.

/// Locale-dependent separators and the preferred short date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Culture {
    /// The list separator, a delimiter candidate alongside the built-in set.
    pub list_separator: char,
    /// Decimal separator assumed when the samples give no hint.
    pub decimal_separator: char,
    /// Thousands separator assumed when the samples give no hint.
    pub group_separator: char,
    /// Preferred short date pattern, tried first among equal-length patterns.
    pub date_format: &'static str,
}

impl Default for Culture {
    fn default() -> Self {
        Self::EN_US
    }
}

impl Culture {
    /// United States conventions (`,` list, `.` decimal, `MM/dd/yyyy`).
    pub const EN_US: Culture = Culture {
        list_separator: ',',
        decimal_separator: '.',
        group_separator: ',',
        date_format: "MM/dd/yyyy",
    };

    /// German conventions (`;` list, `,` decimal, `dd.MM.yyyy`).
    pub const DE_DE: Culture = Culture {
        list_separator: ';',
        decimal_separator: ',',
        group_separator: '.',
        date_format: "dd/MM/yyyy",
    };
}
