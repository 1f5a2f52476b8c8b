//! Per-locale format strings.

use std::collections::HashMap;

use super::number::NumberFormat;

/// Number formatting symbols and patterns of one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatStrings {
    pub grouping_separator: char,
    pub decimal_separator: char,
    /// Integer pattern such as `#,##0`
    pub integer_format: String,
}

impl FormatStrings {
    pub fn new(grouping_separator: char, decimal_separator: char, integer_format: impl Into<String>) -> Self {
        Self {
            grouping_separator,
            decimal_separator,
            integer_format: integer_format.into(),
        }
    }

    /// Integer format built from this locale's pattern and symbols.
    pub fn integer_number_format(&self) -> NumberFormat {
        NumberFormat::from_pattern(
            &self.integer_format,
            self.grouping_separator,
            self.decimal_separator,
        )
    }
}

/// Registry of format strings keyed by locale tag.
#[derive(Debug, Clone, Default)]
pub struct FormatStringsRegistry {
    by_locale: HashMap<String, FormatStrings>,
}

impl FormatStringsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `en`, `de` and `ru` format strings.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("en", FormatStrings::new(',', '.', "#,##0"));
        registry.register("de", FormatStrings::new('.', ',', "#,##0"));
        registry.register("ru", FormatStrings::new('\u{a0}', ',', "#,##0"));
        registry
    }

    pub fn register(&mut self, locale: &str, format_strings: FormatStrings) {
        self.by_locale.insert(normalize(locale), format_strings);
    }

    /// Format strings for `locale`, falling back from `de-CH` to `de`.
    pub fn get(&self, locale: &str) -> Option<&FormatStrings> {
        let tag = normalize(locale);
        self.by_locale.get(&tag).or_else(|| {
            let language = tag.split('-').next()?;
            self.by_locale.get(language)
        })
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back_to_language() {
        let registry = FormatStringsRegistry::with_defaults();

        assert_eq!(registry.get("de_CH").unwrap().grouping_separator, '.');
        assert_eq!(registry.get("EN-us").unwrap().decimal_separator, '.');
        assert!(registry.get("ja").is_none());
    }

    #[test]
    fn test_exact_tag_wins() {
        let mut registry = FormatStringsRegistry::with_defaults();
        registry.register("de-CH", FormatStrings::new('\'', '.', "#,##0"));

        assert_eq!(registry.get("de-CH").unwrap().grouping_separator, '\'');
        assert_eq!(registry.get("de-AT").unwrap().grouping_separator, '.');
    }
}
