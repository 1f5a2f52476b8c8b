//! Built-in macro handlers.

mod between;
mod date_compare;
mod today;

pub use between::BetweenHandler;
pub use date_compare::{DateComparison, DateCompareHandler};
pub use today::TodayHandler;

use common::AppError;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").expect("valid non-word regex"));

/// Split a macro argument list on commas, trimming each argument.
pub(crate) fn split_args(args: &str) -> Vec<&str> {
    args.split(',').map(str::trim).collect()
}

/// Name of a parameter invented for `field`: `{field}_{macro}_{count}_{index}`
/// with every non-word character of the field replaced by `_`.
pub(crate) fn param_name(field: &str, macro_name: &str, count: usize, index: usize) -> String {
    format!(
        "{}_{}_{}_{}",
        NON_WORD.replace_all(field, "_"),
        macro_name,
        count,
        index
    )
}

/// Offset of a `now[+N][-M]...` expression.
pub(crate) fn parse_now_offset(expr: &str) -> Option<i64> {
    let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
    if !compact.get(..3)?.eq_ignore_ascii_case("now") {
        return None;
    }
    let mut rest = &compact[3..];

    let mut offset: i64 = 0;
    while let Some(sign) = rest.chars().next() {
        let negative = match sign {
            '+' => false,
            '-' => true,
            _ => return None,
        };
        let term = &rest[1..];
        let digits_end = term
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(term.len());
        if digits_end == 0 {
            return None;
        }

        let value: i64 = term[..digits_end].parse().ok()?;
        offset = if negative {
            offset.checked_sub(value)?
        } else {
            offset.checked_add(value)?
        };
        rest = &term[digits_end..];
    }
    Some(offset)
}

/// Parameter name of a `:param` argument.
pub(crate) fn parse_param_ref(arg: &str) -> Option<&str> {
    arg.trim()
        .strip_prefix(':')
        .map(str::trim)
        .filter(|name| !name.is_empty() && !NON_WORD.is_match(name))
}

pub(crate) fn invalid(macro_name: &str, args: &str, reason: &str) -> AppError {
    AppError::invalid_macro(format!("@{}({}): {}", macro_name, args.trim(), reason))
}
