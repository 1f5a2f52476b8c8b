//! Query Macro Library
//!
//! Rewrites macro placeholders such as `@between(...)` in query strings into
//! query-language conditions and computes the values of the parameters the
//! rewrites introduce.

pub mod config;
pub mod expander;
pub mod handler;
pub mod handlers;
pub mod time_unit;
pub mod timezone;

pub use config::QueryMacroConfig;
pub use expander::QueryMacroExpander;
pub use handler::{
    ExpansionContext, MacroBinding, MacroExpansion, ParamType, ParamValue, QueryMacroHandler,
};
pub use time_unit::TimeUnit;
pub use timezone::TimeZoneResolver;
