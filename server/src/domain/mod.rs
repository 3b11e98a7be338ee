//! Bus search domain logic
//!
//! - `categories` - Category label to raw bus type mapping
//! - `filters` - Filter criteria and parameterized query building
//! - `catalog` - Memoized table and column value lookups
//! - `search` - Search service that absorbs store failures

pub mod catalog;
pub mod categories;
pub mod filters;
pub mod search;

pub use catalog::Catalog;
pub use categories::{CategoryError, CategoryMap};
pub use filters::{FilterCriteria, FilterQuery, RangeFilter, build_filter_query};
pub use search::{Listing, SearchOutcome, SearchRequest, SearchService};
