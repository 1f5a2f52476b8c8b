//! Integer datatypes with locale-aware formatting.

use std::sync::Arc;

use num_bigint::{BigInt, Sign};

use super::format_strings::FormatStringsRegistry;
use super::Datatype;
use crate::error::{AppError, AppResult};

/// Pattern used when a locale has no format strings.
const DEFAULT_INTEGER_PATTERN: &str = "0";

/// Integer number format derived from a decimal pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    /// Digits per group, `None` when grouping is off
    grouping_size: Option<usize>,
    grouping_separator: char,
    decimal_separator: char,
}

impl NumberFormat {
    /// Build a format from a pattern such as `#,##0` or `0`.
    ///
    /// The group size is the number of integer-part pattern characters
    /// after the last `,`.
    pub fn from_pattern(pattern: &str, grouping_separator: char, decimal_separator: char) -> Self {
        let integer_part = pattern.split('.').next().unwrap_or_default();
        let grouping_size = integer_part
            .rfind(',')
            .map(|idx| integer_part[idx + 1..].chars().count())
            .filter(|size| *size > 0);

        Self {
            grouping_size,
            grouping_separator,
            decimal_separator,
        }
    }

    pub fn default_integer() -> Self {
        Self::from_pattern(DEFAULT_INTEGER_PATTERN, ',', '.')
    }

    /// Format a sign and magnitude digits.
    pub fn format_integer(&self, negative: bool, digits: &str) -> String {
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if negative {
            out.push('-');
        }

        match self.grouping_size {
            Some(size) => {
                let len = digits.len();
                for (i, ch) in digits.chars().enumerate() {
                    if i > 0 && (len - i) % size == 0 {
                        out.push(self.grouping_separator);
                    }
                    out.push(ch);
                }
            }
            None => out.push_str(digits),
        }
        out
    }

    /// Split text into sign and magnitude digits.
    ///
    /// The whole trimmed text must be consumed: a decimal separator or any
    /// other stray character is an error. Grouping separators are accepted
    /// only when the format groups digits.
    pub fn parse_integer(&self, text: &str) -> AppResult<(bool, String)> {
        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut digits = String::with_capacity(unsigned.len());
        for ch in unsigned.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
            } else if self.grouping_size.is_some() && ch == self.grouping_separator && !digits.is_empty() {
                continue;
            } else if ch == self.decimal_separator {
                return Err(AppError::bad_request(format!(
                    "Unparseable number: \"{}\" is not an integer",
                    text
                )));
            } else {
                return Err(unparseable(text));
            }
        }

        if digits.is_empty() {
            return Err(unparseable(text));
        }
        Ok((negative, digits))
    }
}

fn unparseable(text: &str) -> AppError {
    AppError::bad_request(format!("Unparseable number: \"{}\"", text))
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Shared locale lookup for the integer datatypes.
#[derive(Debug, Clone)]
struct LocaleFormats {
    registry: Arc<FormatStringsRegistry>,
}

impl LocaleFormats {
    fn for_locale(&self, locale: &str) -> NumberFormat {
        self.registry
            .get(locale)
            .map(|fs| fs.integer_number_format())
            .unwrap_or_else(NumberFormat::default_integer)
    }
}

/// Arbitrary-precision integer datatype (`bigInteger`, DDL `BIGINT`).
#[derive(Debug, Clone)]
pub struct BigIntegerDatatype {
    formats: LocaleFormats,
}

impl BigIntegerDatatype {
    pub const ID: &'static str = "bigInteger";

    pub fn new(registry: Arc<FormatStringsRegistry>) -> Self {
        Self {
            formats: LocaleFormats { registry },
        }
    }

    fn format_with(value: &BigInt, format: &NumberFormat) -> String {
        format.format_integer(value.sign() == Sign::Minus, &value.magnitude().to_string())
    }

    fn parse_with(text: &str, format: &NumberFormat) -> AppResult<Option<BigInt>> {
        if is_blank(text) {
            return Ok(None);
        }

        let (negative, digits) = format.parse_integer(text)?;
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| unparseable(text))?;
        Ok(Some(if negative { -magnitude } else { magnitude }))
    }
}

impl Datatype for BigIntegerDatatype {
    type Value = BigInt;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn ddl(&self) -> &'static str {
        "BIGINT"
    }

    fn format(&self, value: Option<&BigInt>) -> String {
        value
            .map(|v| Self::format_with(v, &NumberFormat::default_integer()))
            .unwrap_or_default()
    }

    fn format_with_locale(&self, value: Option<&BigInt>, locale: &str) -> String {
        value
            .map(|v| Self::format_with(v, &self.formats.for_locale(locale)))
            .unwrap_or_default()
    }

    fn parse(&self, text: &str) -> AppResult<Option<BigInt>> {
        Self::parse_with(text, &NumberFormat::default_integer())
    }

    fn parse_with_locale(&self, text: &str, locale: &str) -> AppResult<Option<BigInt>> {
        Self::parse_with(text, &self.formats.for_locale(locale))
    }
}

/// 64-bit integer datatype (`long`, DDL `BIGINT`).
#[derive(Debug, Clone)]
pub struct LongDatatype {
    formats: LocaleFormats,
}

impl LongDatatype {
    pub const ID: &'static str = "long";

    pub fn new(registry: Arc<FormatStringsRegistry>) -> Self {
        Self {
            formats: LocaleFormats { registry },
        }
    }

    fn format_with(value: i64, format: &NumberFormat) -> String {
        format.format_integer(value < 0, &value.unsigned_abs().to_string())
    }

    fn parse_with(text: &str, format: &NumberFormat) -> AppResult<Option<i64>> {
        if is_blank(text) {
            return Ok(None);
        }

        let (negative, digits) = format.parse_integer(text)?;
        let signed = if negative { format!("-{}", digits) } else { digits };
        signed
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::bad_request(format!("Number is out of range: \"{}\"", text)))
    }
}

impl Datatype for LongDatatype {
    type Value = i64;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn ddl(&self) -> &'static str {
        "BIGINT"
    }

    fn format(&self, value: Option<&i64>) -> String {
        value
            .map(|v| Self::format_with(*v, &NumberFormat::default_integer()))
            .unwrap_or_default()
    }

    fn format_with_locale(&self, value: Option<&i64>, locale: &str) -> String {
        value
            .map(|v| Self::format_with(*v, &self.formats.for_locale(locale)))
            .unwrap_or_default()
    }

    fn parse(&self, text: &str) -> AppResult<Option<i64>> {
        Self::parse_with(text, &NumberFormat::default_integer())
    }

    fn parse_with_locale(&self, text: &str, locale: &str) -> AppResult<Option<i64>> {
        Self::parse_with(text, &self.formats.for_locale(locale))
    }
}
