//! Global and per-endpoint configuration.
//!
//! [`QueryConfig`] is built once at startup and passed by reference to every
//! compiler. [`ResourceConfig`] is the whitelist surface one endpoint exposes.
//! Both deserialize from the shapes hosts keep in their config files:
//!
//! ```json
//! {
//!   "sort": {"permitted": ["title", {"created": {"col_name": "created_at"}}], "default": {"created": "desc"}},
//!   "filter": ["title", {"published": {"type": "date"}}],
//!   "include": ["author", {"comments": "comments_with_author"}]
//! }
//! ```

use serde::Deserialize;

use crate::filtering::include::IncludeWhitelist;
use crate::filtering::sort::SortConfig;
use crate::filtering::strategies::{FilterStrategy, StrategyRegistry};
use crate::filtering::whitelist::FilterWhitelist;

/// Default builder per operator class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StrategyDefaults {
    pub equality: FilterStrategy,
    pub comparison: FilterStrategy,
    #[serde(rename = "in")]
    pub in_list: FilterStrategy,
    pub like: FilterStrategy,
}

impl Default for StrategyDefaults {
    fn default() -> Self {
        Self {
            equality: FilterStrategy::Equality,
            comparison: FilterStrategy::Comparison,
            in_list: FilterStrategy::In,
            like: FilterStrategy::Like,
        }
    }
}

/// Process-wide settings shared by all endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub strategies: StrategyDefaults,
    /// Splits multi-value filters and comma lists
    pub separator: char,
    pub default_per_page: u64,
    pub max_per_page: u64,
    /// Deepest nested relationship serialized before the walk stops
    pub max_include_depth: usize,
    /// Reject unparseable date filters instead of matching `IS NULL`
    pub strict_dates: bool,
    pub jsonapi_version: String,
    #[serde(skip)]
    pub registry: StrategyRegistry,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyDefaults::default(),
            separator: ',',
            default_per_page: 20,
            max_per_page: 100,
            max_include_depth: 8,
            strict_dates: false,
            jsonapi_version: "1.0".to_string(),
            registry: StrategyRegistry::default(),
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }
}

/// Whitelists for one endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub sort: SortConfig,
    pub filter: FilterWhitelist,
    pub include: IncludeWhitelist,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_config_defaults() {
        let config = QueryConfig::default();
        assert_eq!(config.separator, ',');
        assert_eq!(config.default_per_page, 20);
        assert_eq!(config.max_per_page, 100);
        assert!(!config.strict_dates);
        assert_eq!(config.jsonapi_version, "1.0");
    }

    #[test]
    fn test_query_config_partial_deserialize() {
        let config: QueryConfig = serde_json::from_value(json!({
            "max_per_page": 50,
            "strategies": {"like": "ilike"}
        }))
        .unwrap();
        assert_eq!(config.max_per_page, 50);
        assert_eq!(config.default_per_page, 20);
        assert_eq!(config.strategies.like, FilterStrategy::ILike);
        assert_eq!(config.strategies.equality, FilterStrategy::Equality);
    }

    #[test]
    fn test_resource_config_surface() {
        let config: ResourceConfig = serde_json::from_value(json!({
            "sort": {"permitted": ["title"], "default": {"id": "desc"}},
            "filter": ["title", {"published": {"type": "date"}}],
            "include": ["author", {"comments": "comments_with_author"}]
        }))
        .unwrap();
        assert!(config.filter.get("published").is_some());
        assert!(config.sort.permitted().get("title").is_some());
        assert_eq!(config.include.entries().len(), 2);
    }

    #[test]
    fn test_resource_config_empty() {
        let config: ResourceConfig = serde_json::from_value(json!({})).unwrap();
        assert!(config.filter.entries().is_empty());
        assert!(config.include.entries().is_empty());
    }
}
