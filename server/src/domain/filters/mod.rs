//! Search filters
//!
//! - `types` - `FilterCriteria` and inclusive `RangeFilter`s
//! - `builder` - Parameterized SQL generation from criteria

pub mod builder;
pub mod types;

pub use builder::{FilterQuery, SqlParams, build_filter_query};
pub use types::{FilterCriteria, RangeFilter};
