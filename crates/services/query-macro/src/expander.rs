//! Registry of macro handlers applied to whole queries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use common::{AppError, AppResult};
use tracing::debug;

use crate::config::QueryMacroConfig;
use crate::handler::{MacroBinding, MacroExpansion, ParamValue, QueryMacroHandler};
use crate::handlers::{BetweenHandler, DateCompareHandler, TodayHandler};
use crate::time_unit::start_of_day;
use crate::timezone::TimeZoneResolver;

/// Expands query macros and binds the parameters they introduce.
#[derive(Clone)]
pub struct QueryMacroExpander {
    handlers: Vec<Arc<dyn QueryMacroHandler>>,
    default_time_zone: Tz,
}

impl QueryMacroExpander {
    /// Expander without handlers.
    pub fn new(config: &QueryMacroConfig) -> Self {
        Self {
            handlers: Vec::new(),
            default_time_zone: config.default_time_zone,
        }
    }

    /// Expander with every built-in handler.
    pub fn with_defaults(config: &QueryMacroConfig, time_zones: TimeZoneResolver) -> Self {
        Self::new(config)
            .with_handler(Arc::new(BetweenHandler::new(time_zones.clone())))
            .with_handler(Arc::new(TodayHandler::new(time_zones.clone())))
            .with_handler(Arc::new(DateCompareHandler::before(time_zones.clone())))
            .with_handler(Arc::new(DateCompareHandler::after(time_zones.clone())))
            .with_handler(Arc::new(DateCompareHandler::equals(time_zones)))
    }

    pub fn with_handler(mut self, handler: Arc<dyn QueryMacroHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn register(&mut self, handler: Arc<dyn QueryMacroHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Apply every handler, in registration order, to `query`.
    pub fn expand(&self, query: &str) -> AppResult<MacroExpansion> {
        let mut expansion = MacroExpansion::unchanged(query);
        for handler in &self.handlers {
            let step = handler.expand(&expansion.query)?;
            if !step.bindings.is_empty() {
                debug!(
                    handler = handler.name(),
                    params = step.param_types.len(),
                    "Expanded query macros"
                );
            }
            expansion.merge(step);
        }
        Ok(expansion)
    }

    /// Compute the values of the expansion's bindings into `params`.
    ///
    /// Relative bindings are computed from `now`. Day-boundary bindings read
    /// their source from `params` as given by the caller; a missing source
    /// leaves the binding unset.
    ///
    /// # Errors
    /// `BadRequest` when a source parameter is neither a timestamp nor a date.
    pub fn bind(
        &self,
        expansion: &MacroExpansion,
        params: &mut HashMap<String, ParamValue>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut values = Vec::with_capacity(expansion.bindings.len());

        for binding in &expansion.bindings {
            match binding {
                MacroBinding::Relative {
                    param,
                    unit,
                    offset,
                    zone,
                } => {
                    let zone = zone.unwrap_or(self.default_time_zone);
                    let value = unit.boundary(&now.with_timezone(&zone), *offset)?;
                    values.push((param.clone(), value.with_timezone(&Utc)));
                }
                MacroBinding::DayBoundary {
                    param,
                    source,
                    zone,
                    next_day,
                } => {
                    let zone = zone.unwrap_or(self.default_time_zone);
                    let date = match params.get(source) {
                        Some(ParamValue::Timestamp(ts)) => ts.with_timezone(&zone).date_naive(),
                        Some(ParamValue::Date(date)) => *date,
                        Some(_) => {
                            return Err(AppError::bad_request(format!(
                                "Parameter '{}' must be a timestamp or a date",
                                source
                            )))
                        }
                        None => {
                            debug!(param = %source, "Skipping binding of absent parameter");
                            continue;
                        }
                    };

                    let date = if *next_day {
                        date.succ_opt()
                            .ok_or_else(|| AppError::bad_request("Date is out of range"))?
                    } else {
                        date
                    };
                    values.push((param.clone(), start_of_day(&zone, date)?.with_timezone(&Utc)));
                }
            }
        }

        for (param, value) in values {
            params.insert(param, ParamValue::Timestamp(value));
        }
        Ok(())
    }
}

impl std::fmt::Debug for QueryMacroExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryMacroExpander")
            .field("handlers", &self.handler_names())
            .field("default_time_zone", &self.default_time_zone)
            .finish()
    }
}
