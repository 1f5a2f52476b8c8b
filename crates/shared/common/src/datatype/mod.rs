//! Locale-aware value datatypes.
//!
//! A datatype formats values for display and parses user input back,
//! optionally using the number symbols of a locale.

mod format_strings;
mod number;

pub use format_strings::{FormatStrings, FormatStringsRegistry};
pub use number::{BigIntegerDatatype, LongDatatype, NumberFormat};

use crate::error::AppResult;

/// Conversion between a value type and its text form.
///
/// An absent value formats as an empty string and blank text parses as
/// `None`.
pub trait Datatype: Send + Sync {
    type Value;

    /// Identifier used to look the datatype up by name
    fn id(&self) -> &'static str;

    /// Column type used in DDL
    fn ddl(&self) -> &'static str;

    fn format(&self, value: Option<&Self::Value>) -> String;

    fn format_with_locale(&self, value: Option<&Self::Value>, locale: &str) -> String;

    fn parse(&self, text: &str) -> AppResult<Option<Self::Value>>;

    fn parse_with_locale(&self, text: &str, locale: &str) -> AppResult<Option<Self::Value>>;
}
