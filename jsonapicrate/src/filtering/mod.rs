//! # Request parameter compilers
//!
//! Turns the JSON:API query parameters of one request into query fragments,
//! checking every name against the endpoint's whitelist first.
//!
//! ## Main Components
//!
//! - **[`QueryParams`]**: the raw, ordered query bag (also an axum extractor)
//! - **[`FilterCompiler`]**: `filter[attr]=value` into an AND-combined [`sea_orm::Condition`]
//! - **[`SortConfig::compile`]**: `sort=-created,title` into ordered [`SortKey`]s
//! - **[`IncludeCompiler`]**: `include=comments.author` into permitted paths and eager-load hints
//! - **[`PageRequest`]** / **[`Paginator`]**: `page[number]` and `page[limit]`, plus page links
//! - **[`SparseFields`]**: `fields[type]=a,b`
//!
//! ## Filter values
//!
//! ```text
//! GET /posts?filter[title]=*rust        wildcard, per the entry's wildcard mode
//! GET /posts?filter[score]=>=3          comparison (!=, >=, <=, >, <)
//! GET /posts?filter[id]=1,2,3           multi-value, always IN
//! GET /posts?filter[published]=2024-01-01
//! ```
//!
//! Values are cast to the entry's declared type and never rejected: an
//! unreadable number becomes `0`, an unreadable date becomes `NULL`.
//!
//! ## Security
//!
//! - Filter, sort and include names outside the whitelist raise
//!   [`crate::ApiError::UnsupportedParameter`] before any query runs
//! - Values are bound as parameters; LIKE metacharacters are escaped
//! - Page sizes are capped at `max_per_page`

pub mod cast;
pub mod conditions;
pub mod fields;
pub mod include;
pub mod operator;
pub mod pagination;
pub mod query_parser;
pub mod sort;
pub mod strategies;
pub mod whitelist;

pub use cast::{Cast, CastValue, PrimitiveType, Scalar};
pub use conditions::FilterCompiler;
pub use fields::SparseFields;
pub use include::{EagerLoad, IncludeCompiler, IncludeEntry, IncludeWhitelist};
pub use operator::{FilterClause, Operator};
pub use pagination::{PageRequest, PaginationLinks, Paginator};
pub use query_parser::QueryParams;
pub use sort::{Direction, SortConfig, SortEntry, SortKey, SortWhitelist, apply_sort};
pub use strategies::{FilterScope, FilterStrategy, StrategyRegistry};
pub use whitelist::{FilterWhitelist, WhitelistEntry, WildcardMode};
