//! `@today(field[, USER_TIMEZONE])`

use common::AppResult;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{invalid, param_name, split_args};
use crate::handler::{ExpansionContext, MacroBinding, ParamType, QueryMacroHandler};
use crate::time_unit::TimeUnit;
use crate::timezone::TimeZoneResolver;

static PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@today\s*\(([^)]+)\)").expect("valid today regex"));

const NAME: &str = "today";
const TIME_ZONE_POS: usize = 1;

/// Range covering the current day.
#[derive(Debug, Clone)]
pub struct TodayHandler {
    time_zones: TimeZoneResolver,
}

impl TodayHandler {
    pub fn new(time_zones: TimeZoneResolver) -> Self {
        Self { time_zones }
    }
}

impl QueryMacroHandler for TodayHandler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn pattern(&self) -> &Regex {
        &PATTERN
    }

    fn expand_one(&self, args: &str, ctx: &mut ExpansionContext) -> AppResult<String> {
        let parts = split_args(args);
        if parts.len() > 2 || parts[0].is_empty() {
            return Err(invalid(NAME, args, "expected a field and an optional time zone"));
        }

        let field = parts[0];
        let zone = self.time_zones.resolve(&parts, TIME_ZONE_POS)?;

        let from = param_name(field, NAME, ctx.count(), 1);
        let to = param_name(field, NAME, ctx.count(), 2);

        for (param, offset) in [(&from, 0), (&to, 1)] {
            ctx.add_param(param.clone(), ParamType::Timestamp);
            ctx.add_binding(MacroBinding::Relative {
                param: param.clone(),
                unit: TimeUnit::Day,
                offset,
                zone,
            });
        }

        Ok(format!("({field} >= :{from} and {field} < :{to})"))
    }
}
