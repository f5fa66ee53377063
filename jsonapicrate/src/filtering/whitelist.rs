//! Canonical whitelist entries for filterable attributes.
//!
//! Endpoints declare filters either as a bare name or as a name with options:
//!
//! ```json
//! ["title", {"created": {"type": "datetime", "col_name": "created_at"}}]
//! ```
//!
//! Both shapes collapse into one [`WhitelistEntry`] when the configuration is
//! deserialized, so request handling never inspects declaration shapes.

use sea_orm::sea_query::{Alias, Expr};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::cast::PrimitiveType;
use super::strategies::FilterStrategy;

/// Where `*` wildcards are placed around a value for LIKE-style filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardMode {
    #[default]
    None,
    /// `%value`, matches values ending with `value`
    Left,
    /// `value%`, matches values starting with `value`
    Right,
    /// `%value%`
    Both,
}

/// Per-attribute replacements for the operator-class default builders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyOverrides {
    pub equality: Option<FilterStrategy>,
    pub comparison: Option<FilterStrategy>,
    pub in_list: Option<FilterStrategy>,
    pub like: Option<FilterStrategy>,
}

/// One permitted filterable attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistEntry {
    pub name: String,
    pub column_alias: Option<String>,
    pub kind: PrimitiveType,
    pub wildcard: WildcardMode,
    pub builder: Option<FilterStrategy>,
    pub method: Option<String>,
    pub overrides: StrategyOverrides,
}

impl WhitelistEntry {
    /// Entry for a bare name: string typed, no wildcard, default builders.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_alias: None,
            kind: PrimitiveType::default(),
            wildcard: WildcardMode::None,
            builder: None,
            method: None,
            overrides: StrategyOverrides::default(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, kind: PrimitiveType) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column_alias = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_wildcard(mut self, wildcard: WildcardMode) -> Self {
        self.wildcard = wildcard;
        self
    }

    #[must_use]
    pub fn with_builder(mut self, builder: FilterStrategy) -> Self {
        self.builder = Some(builder);
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Column the attribute maps to, falling back to the attribute name.
    #[must_use]
    pub fn column(&self) -> &str {
        self.column_alias.as_deref().unwrap_or(&self.name)
    }

    fn from_options(name: String, options: FilterOptions) -> Self {
        Self {
            name,
            column_alias: options.col_name,
            kind: options.kind,
            wildcard: options.wildcard,
            builder: options.builder,
            method: options.method,
            overrides: StrategyOverrides {
                equality: options.default,
                comparison: options.comparison,
                in_list: options.in_list,
                like: options.like,
            },
        }
    }
}

/// Option bag accepted for a `{name: {...}}` filter declaration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FilterOptions {
    #[serde(rename = "type")]
    kind: PrimitiveType,
    col_name: Option<String>,
    wildcard: WildcardMode,
    builder: Option<FilterStrategy>,
    method: Option<String>,
    like: Option<FilterStrategy>,
    #[serde(rename = "in")]
    in_list: Option<FilterStrategy>,
    comparison: Option<FilterStrategy>,
    default: Option<FilterStrategy>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FilterDeclaration {
    Name(String),
    Options(BTreeMap<String, Option<FilterOptions>>),
}

/// Ordered list of permitted filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<FilterDeclaration>")]
pub struct FilterWhitelist(Vec<WhitelistEntry>);

impl FilterWhitelist {
    #[must_use]
    pub fn new(entries: Vec<WhitelistEntry>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WhitelistEntry> {
        self.0.iter().find(|entry| entry.name == name)
    }

    #[must_use]
    pub fn entries(&self) -> &[WhitelistEntry] {
        &self.0
    }
}

impl From<Vec<FilterDeclaration>> for FilterWhitelist {
    fn from(declarations: Vec<FilterDeclaration>) -> Self {
        let mut entries = Vec::new();
        for declaration in declarations {
            match declaration {
                FilterDeclaration::Name(name) => entries.push(WhitelistEntry::named(name)),
                FilterDeclaration::Options(map) => {
                    entries.extend(map.into_iter().map(|(name, options)| {
                        WhitelistEntry::from_options(name, options.unwrap_or_default())
                    }));
                }
            }
        }
        Self(entries)
    }
}

/// Column expression for a configured column, `table.column` qualified when dotted.
pub(crate) fn column_expr(column: &str) -> Expr {
    match column.split_once('.') {
        Some((table, name)) => Expr::col((Alias::new(table), Alias::new(name))),
        None => Expr::col(Alias::new(column)),
    }
}
