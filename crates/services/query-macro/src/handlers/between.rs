//! `@between(field, now[±N], now[±M], unit[, USER_TIMEZONE])`

use common::AppResult;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{invalid, param_name, parse_now_offset, split_args};
use crate::handler::{ExpansionContext, MacroBinding, ParamType, QueryMacroHandler};
use crate::time_unit::TimeUnit;
use crate::timezone::TimeZoneResolver;

static PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@between\s*\(([^)]+)\)").expect("valid between regex"));

const NAME: &str = "between";
const TIME_ZONE_POS: usize = 4;

/// Range between two moments relative to now, aligned to a time unit.
///
/// `@between(e.createTs, now-1, now, day)` becomes
/// `(e.createTs >= :e_createTs_between_1_1 and e.createTs < :e_createTs_between_1_2)`
/// bound to the start of yesterday and the start of today.
#[derive(Debug, Clone)]
pub struct BetweenHandler {
    time_zones: TimeZoneResolver,
}

impl BetweenHandler {
    pub fn new(time_zones: TimeZoneResolver) -> Self {
        Self { time_zones }
    }
}

impl QueryMacroHandler for BetweenHandler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn pattern(&self) -> &Regex {
        &PATTERN
    }

    fn expand_one(&self, args: &str, ctx: &mut ExpansionContext) -> AppResult<String> {
        let parts = split_args(args);
        if parts.len() != 4 && parts.len() != 5 {
            return Err(invalid(NAME, args, "expected 4 or 5 arguments"));
        }

        let field = parts[0];
        if field.is_empty() {
            return Err(invalid(NAME, args, "missing field"));
        }
        let start = parse_now_offset(parts[1])
            .ok_or_else(|| invalid(NAME, args, "invalid start expression"))?;
        let end = parse_now_offset(parts[2])
            .ok_or_else(|| invalid(NAME, args, "invalid end expression"))?;
        let unit = TimeUnit::parse(parts[3])
            .ok_or_else(|| invalid(NAME, args, "unknown time unit"))?;
        let zone = self.time_zones.resolve(&parts, TIME_ZONE_POS)?;

        let from = param_name(field, NAME, ctx.count(), 1);
        let to = param_name(field, NAME, ctx.count(), 2);

        for (param, offset) in [(&from, start), (&to, end)] {
            ctx.add_param(param.clone(), ParamType::Timestamp);
            ctx.add_binding(MacroBinding::Relative {
                param: param.clone(),
                unit,
                offset,
                zone,
            });
        }

        Ok(format!("({field} >= :{from} and {field} < :{to})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;

    fn handler() -> BetweenHandler {
        BetweenHandler::new(TimeZoneResolver::default())
    }

    #[test]
    fn test_expands_range() {
        let expansion = handler()
            .expand("select e from Order e where @between(e.createTs, now-1, now, day)")
            .unwrap();

        assert_eq!(
            expansion.query,
            "select e from Order e where (e.createTs >= :e_createTs_between_1_1 and e.createTs < :e_createTs_between_1_2)"
        );
        assert_eq!(expansion.param_types.get("e_createTs_between_1_1"), Some(&ParamType::Timestamp));
        assert_eq!(
            expansion.bindings,
            vec![
                MacroBinding::Relative {
                    param: "e_createTs_between_1_1".into(),
                    unit: TimeUnit::Day,
                    offset: -1,
                    zone: None,
                },
                MacroBinding::Relative {
                    param: "e_createTs_between_1_2".into(),
                    unit: TimeUnit::Day,
                    offset: 0,
                    zone: None,
                },
            ]
        );
    }

    #[test]
    fn test_second_occurrence_gets_new_names() {
        let expansion = handler()
            .expand("@BETWEEN(e.a, now, now+1, MONTH) or @between (e.a, now-2, now + 2 - 1, hour)")
            .unwrap();

        assert_eq!(expansion.param_types.len(), 4);
        assert!(expansion.query.ends_with("(e.a >= :e_a_between_2_1 and e.a < :e_a_between_2_2)"));
    }

    #[test]
    fn test_malformed_invocations() {
        for query in [
            "@between(e.a, now, day)",
            "@between(e.a, now, now+1, week)",
            "@between(e.a, yesterday, now, day)",
            "@between(e.a, now, now+1, day, UTC, extra)",
        ] {
            assert!(
                matches!(handler().expand(query), Err(AppError::InvalidMacro(_))),
                "{query}"
            );
        }
    }

    #[test]
    fn test_user_timezone_without_session_source() {
        let result = handler().expand("@between(e.a, now, now+1, day, USER_TIMEZONE)");
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
