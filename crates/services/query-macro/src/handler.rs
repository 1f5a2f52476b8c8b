//! Macro handler contract and expansion results.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use common::AppResult;
use regex::Regex;

use crate::time_unit::TimeUnit;

/// Type of a parameter introduced by a macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamType {
    Timestamp,
}

/// Value bound into a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Text(String),
    Integer(i64),
}

/// How the value of a macro parameter is computed when the query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroBinding {
    /// Start of the `unit` containing "now", shifted by `offset` units.
    Relative {
        param: String,
        unit: TimeUnit,
        offset: i64,
        zone: Option<Tz>,
    },
    /// Start of the day of the `source` parameter, or of the next day.
    DayBoundary {
        param: String,
        source: String,
        zone: Option<Tz>,
        next_day: bool,
    },
}

impl MacroBinding {
    /// Parameter the binding writes.
    pub fn param(&self) -> &str {
        match self {
            Self::Relative { param, .. } | Self::DayBoundary { param, .. } => param,
        }
    }
}

/// Result of expanding the macros in one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroExpansion {
    pub query: String,
    /// Parameters invented during expansion
    pub param_types: BTreeMap<String, ParamType>,
    pub bindings: Vec<MacroBinding>,
}

impl MacroExpansion {
    /// Expansion that leaves `query` untouched.
    pub fn unchanged(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Merge the parameters and bindings of a later expansion step,
    /// taking its query.
    pub fn merge(&mut self, next: MacroExpansion) {
        self.query = next.query;
        self.param_types.extend(next.param_types);
        self.bindings.extend(next.bindings);
    }
}

/// State of a single `expand` call.
///
/// Lives on the caller's stack so handlers stay immutable and can be
/// shared between threads.
#[derive(Debug, Default)]
pub struct ExpansionContext {
    count: usize,
    param_types: BTreeMap<String, ParamType>,
    bindings: Vec<MacroBinding>,
}

impl ExpansionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the macro occurrence being expanded, starting at 1.
    pub fn count(&self) -> usize {
        self.count
    }

    fn advance(&mut self) {
        self.count += 1;
    }

    pub fn add_param(&mut self, name: impl Into<String>, param_type: ParamType) {
        self.param_types.insert(name.into(), param_type);
    }

    pub fn add_binding(&mut self, binding: MacroBinding) {
        self.bindings.push(binding);
    }

    fn finish(self, query: String) -> MacroExpansion {
        MacroExpansion {
            query,
            param_types: self.param_types,
            bindings: self.bindings,
        }
    }
}

/// Handler of one macro syntax.
pub trait QueryMacroHandler: Send + Sync {
    /// Macro name without the `@`
    fn name(&self) -> &'static str;

    /// Pattern matching one invocation; group 1 captures the arguments.
    fn pattern(&self) -> &Regex;

    /// Replacement text for one invocation.
    fn expand_one(&self, args: &str, ctx: &mut ExpansionContext) -> AppResult<String>;

    /// Replace every invocation in `query`, left to right.
    ///
    /// Replacement text is spliced verbatim, so `$` and `\` in it carry no
    /// special meaning.
    fn expand(&self, query: &str) -> AppResult<MacroExpansion> {
        let mut ctx = ExpansionContext::new();
        let mut out = String::with_capacity(query.len());
        let mut last = 0;

        for caps in self.pattern().captures_iter(query) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let args = caps.get(1).map_or("", |m| m.as_str());

            ctx.advance();
            let replacement = self.expand_one(args, &mut ctx)?;

            out.push_str(&query[last..whole.start()]);
            out.push_str(&replacement);
            last = whole.end();
        }
        out.push_str(&query[last..]);

        Ok(ctx.finish(out))
    }
}
