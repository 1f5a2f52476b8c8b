//! `@dateBefore`, `@dateAfter` and `@dateEquals` with `(field, :param[, USER_TIMEZONE])`

use common::AppResult;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{invalid, parse_param_ref, split_args};
use crate::handler::{ExpansionContext, MacroBinding, ParamType, QueryMacroHandler};
use crate::timezone::TimeZoneResolver;

static BEFORE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@dateBefore\s*\(([^)]+)\)").expect("valid dateBefore regex"));
static AFTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@dateAfter\s*\(([^)]+)\)").expect("valid dateAfter regex"));
static EQUALS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@dateEquals\s*\(([^)]+)\)").expect("valid dateEquals regex"));

const TIME_ZONE_POS: usize = 2;

/// Comparison of a field against the day of a caller parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateComparison {
    /// Before the start of the day
    Before,
    /// On or after the start of the day
    After,
    /// Within the day
    Equals,
}

/// Compares a field with the calendar day of a caller-supplied parameter.
///
/// The caller's parameter is rebound to the start of its day; `@dateEquals`
/// adds an upper bound parameter for the start of the following day.
#[derive(Debug, Clone)]
pub struct DateCompareHandler {
    comparison: DateComparison,
    time_zones: TimeZoneResolver,
}

impl DateCompareHandler {
    pub fn new(comparison: DateComparison, time_zones: TimeZoneResolver) -> Self {
        Self {
            comparison,
            time_zones,
        }
    }

    pub fn before(time_zones: TimeZoneResolver) -> Self {
        Self::new(DateComparison::Before, time_zones)
    }

    pub fn after(time_zones: TimeZoneResolver) -> Self {
        Self::new(DateComparison::After, time_zones)
    }

    pub fn equals(time_zones: TimeZoneResolver) -> Self {
        Self::new(DateComparison::Equals, time_zones)
    }
}

impl QueryMacroHandler for DateCompareHandler {
    fn name(&self) -> &'static str {
        match self.comparison {
            DateComparison::Before => "dateBefore",
            DateComparison::After => "dateAfter",
            DateComparison::Equals => "dateEquals",
        }
    }

    fn pattern(&self) -> &Regex {
        match self.comparison {
            DateComparison::Before => &BEFORE_PATTERN,
            DateComparison::After => &AFTER_PATTERN,
            DateComparison::Equals => &EQUALS_PATTERN,
        }
    }

    fn expand_one(&self, args: &str, ctx: &mut ExpansionContext) -> AppResult<String> {
        let name = self.name();
        let parts = split_args(args);
        if parts.len() != 2 && parts.len() != 3 {
            return Err(invalid(name, args, "expected 2 or 3 arguments"));
        }

        let field = parts[0];
        if field.is_empty() {
            return Err(invalid(name, args, "missing field"));
        }
        let param = parse_param_ref(parts[1])
            .ok_or_else(|| invalid(name, args, "second argument must be a :parameter"))?;
        let zone = self.time_zones.resolve(&parts, TIME_ZONE_POS)?;

        ctx.add_binding(MacroBinding::DayBoundary {
            param: param.to_string(),
            source: param.to_string(),
            zone,
            next_day: false,
        });

        let expanded = match self.comparison {
            DateComparison::Before => format!("({field} < :{param})"),
            DateComparison::After => format!("({field} >= :{param})"),
            DateComparison::Equals => {
                let upper = format!("{}_{}_{}", param, name, ctx.count());
                ctx.add_param(upper.clone(), ParamType::Timestamp);
                ctx.add_binding(MacroBinding::DayBoundary {
                    param: upper.clone(),
                    source: param.to_string(),
                    zone,
                    next_day: true,
                });
                format!("({field} >= :{param} and {field} < :{upper})")
            }
        };
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;

    #[test]
    fn test_before_and_after() {
        let before = DateCompareHandler::before(TimeZoneResolver::default())
            .expand("where @dateBefore(e.createTs, :d)")
            .unwrap();
        assert_eq!(before.query, "where (e.createTs < :d)");
        assert!(before.param_types.is_empty());
        assert_eq!(
            before.bindings,
            vec![MacroBinding::DayBoundary {
                param: "d".into(),
                source: "d".into(),
                zone: None,
                next_day: false,
            }]
        );

        let after = DateCompareHandler::after(TimeZoneResolver::default())
            .expand("where @dateAfter(e.createTs, :d)")
            .unwrap();
        assert_eq!(after.query, "where (e.createTs >= :d)");
    }

    #[test]
    fn test_equals_adds_upper_bound() {
        let expansion = DateCompareHandler::equals(TimeZoneResolver::default())
            .expand("where @dateEquals(e.createTs, :day) or @dateEquals(e.updateTs, :day)")
            .unwrap();

        assert_eq!(
            expansion.query,
            "where (e.createTs >= :day and e.createTs < :day_dateEquals_1) or (e.updateTs >= :day and e.updateTs < :day_dateEquals_2)"
        );
        assert_eq!(
            expansion.param_types.keys().collect::<Vec<_>>(),
            vec!["day_dateEquals_1", "day_dateEquals_2"]
        );
        assert!(expansion.bindings.contains(&MacroBinding::DayBoundary {
            param: "day_dateEquals_2".into(),
            source: "day".into(),
            zone: None,
            next_day: true,
        }));
    }

    #[test]
    fn test_parameter_argument_required() {
        let handler = DateCompareHandler::before(TimeZoneResolver::default());

        assert!(matches!(
            handler.expand("@dateBefore(e.createTs, d)"),
            Err(AppError::InvalidMacro(_))
        ));
        assert!(matches!(
            handler.expand("@dateBefore(e.createTs)"),
            Err(AppError::InvalidMacro(_))
        ));
    }

    #[test]
    fn test_handlers_do_not_match_each_other() {
        let handler = DateCompareHandler::after(TimeZoneResolver::default());
        let query = "where @dateBefore(e.createTs, :d)";

        assert_eq!(handler.expand(query).unwrap().query, query);
    }
}
