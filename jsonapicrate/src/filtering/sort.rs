use sea_orm::{EntityTrait, Order, QueryOrder, Select, sea_query::SimpleExpr};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use super::whitelist::column_expr;
use crate::errors::{ApiError, ParameterKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        }
    }
}

/// One resolved `(column, direction)` ordering term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: Direction,
}

impl SortKey {
    #[must_use]
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// A sortable attribute and the column it orders by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortEntry {
    pub name: String,
    pub column_alias: Option<String>,
}

impl SortEntry {
    #[must_use]
    pub fn column(&self) -> &str {
        self.column_alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SortOptions {
    col_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SortDeclaration {
    Name(String),
    Options(BTreeMap<String, Option<SortOptions>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<SortDeclaration>")]
pub struct SortWhitelist(Vec<SortEntry>);

impl SortWhitelist {
    #[must_use]
    pub fn new(entries: Vec<SortEntry>) -> Self {
        Self(entries)
    }

    /// Whitelist of bare names, each ordering by its own column.
    pub fn of_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(|name| SortEntry {
                    name: name.into(),
                    column_alias: None,
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SortEntry> {
        self.0.iter().find(|entry| entry.name == name)
    }
}

impl From<Vec<SortDeclaration>> for SortWhitelist {
    fn from(declarations: Vec<SortDeclaration>) -> Self {
        let mut entries = Vec::new();
        for declaration in declarations {
            match declaration {
                SortDeclaration::Name(name) => entries.push(SortEntry {
                    name,
                    column_alias: None,
                }),
                SortDeclaration::Options(map) => {
                    entries.extend(map.into_iter().map(|(name, options)| SortEntry {
                        name,
                        column_alias: options.and_then(|o| o.col_name),
                    }));
                }
            }
        }
        Self(entries)
    }
}

/// Sort whitelist plus the ordering used when a request names none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    permitted: SortWhitelist,
    #[serde(deserialize_with = "ordered_directions")]
    default: Vec<(String, Direction)>,
}

impl SortConfig {
    #[must_use]
    pub fn new(permitted: SortWhitelist) -> Self {
        Self {
            permitted,
            default: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, direction: Direction) -> Self {
        self.default.push((name.into(), direction));
        self
    }

    #[must_use]
    pub fn permitted(&self) -> &SortWhitelist {
        &self.permitted
    }

    /// Compiles a `-created,title` style parameter, split on `separator`,
    /// into ordering terms.
    ///
    /// An empty result (no tokens, or only whitespace) falls back to the
    /// configured default, which may itself be empty.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnsupportedParameter` naming the first token that is
    /// not whitelisted.
    pub fn compile(&self, raw: Option<&str>, separator: char) -> Result<Vec<SortKey>, ApiError> {
        let mut keys = Vec::new();
        for token in raw.unwrap_or_default().split(separator).map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let (name, direction) = token
                .strip_prefix('-')
                .map_or((token, Direction::Asc), |name| (name, Direction::Desc));
            let entry = self.permitted.get(name).ok_or_else(|| {
                tracing::warn!(attribute = %name, "rejected sort on non-whitelisted attribute");
                ApiError::unsupported(ParameterKind::Sort, name)
            })?;
            keys.push(SortKey::new(entry.column(), direction));
        }

        if keys.is_empty() {
            keys = self
                .default
                .iter()
                .map(|(name, direction)| {
                    let column = self.permitted.get(name).map_or(name.as_str(), SortEntry::column);
                    SortKey::new(column, *direction)
                })
                .collect();
        }
        Ok(keys)
    }
}

/// Applies ordering terms in order.
pub fn apply_sort<E: EntityTrait>(select: Select<E>, keys: &[SortKey]) -> Select<E> {
    keys.iter().fold(select, |select, key| {
        select.order_by(SimpleExpr::from(column_expr(&key.column)), key.direction.into())
    })
}

/// Reads a `{name: direction}` map keeping document order.
fn ordered_directions<'de, D>(deserializer: D) -> Result<Vec<(String, Direction)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, Direction)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of attribute names to asc/desc")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut out = Vec::new();
            while let Some((name, direction)) = map.next_entry::<String, Direction>()? {
                out.push((name, direction));
            }
            Ok(out)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(OrderedVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> SortConfig {
        SortConfig::new(SortWhitelist::of_names(["x", "y"]))
    }

    #[test]
    fn test_descending_prefix_and_order() {
        let keys = config().compile(Some("-x,y"), ',').unwrap();
        assert_eq!(
            keys,
            vec![SortKey::new("x", Direction::Desc), SortKey::new("y", Direction::Asc)]
        );
    }

    #[test]
    fn test_empty_spec_uses_default() {
        let config = config().with_default("id", Direction::Desc);
        assert_eq!(config.compile(Some(""), ',').unwrap(), vec![SortKey::new("id", Direction::Desc)]);
        assert_eq!(config.compile(Some(" , "), ',').unwrap(), vec![SortKey::new("id", Direction::Desc)]);
        assert_eq!(config.compile(None, ',').unwrap(), vec![SortKey::new("id", Direction::Desc)]);
    }

    #[test]
    fn test_no_spec_no_default_is_empty() {
        assert!(config().compile(None, ',').unwrap().is_empty());
    }

    #[test]
    fn test_unknown_token_raises_even_with_default() {
        let config = config().with_default("id", Direction::Desc);
        let err = config.compile(Some("x,-secret"), ',').unwrap_err();
        assert!(matches!(
            err,
            ApiError::UnsupportedParameter { kind: ParameterKind::Sort, ref name } if name == "secret"
        ));
    }

    #[test]
    fn test_column_alias_is_used() {
        let config: SortConfig = serde_json::from_value(json!({
            "permitted": ["title", {"created": {"col_name": "created_at"}}],
            "default": {"created": "desc", "title": "asc"}
        }))
        .unwrap();
        assert_eq!(
            config.compile(Some("-created"), ',').unwrap(),
            vec![SortKey::new("created_at", Direction::Desc)]
        );
        assert_eq!(
            config.compile(None, ',').unwrap(),
            vec![
                SortKey::new("created_at", Direction::Desc),
                SortKey::new("title", Direction::Asc)
            ]
        );
    }

    #[test]
    fn test_default_keeps_document_order() {
        let config: SortConfig = serde_json::from_str(
            r#"{"permitted": ["b", "a"], "default": {"b": "asc", "a": "desc"}}"#,
        )
        .unwrap();
        let keys = config.compile(None, ',').unwrap();
        assert_eq!(keys[0].column, "b");
        assert_eq!(keys[1].column, "a");
    }

    #[test]
    fn test_custom_separator() {
        let keys = config().compile(Some("-x;y"), ';').unwrap();
        assert_eq!(
            keys,
            vec![SortKey::new("x", Direction::Desc), SortKey::new("y", Direction::Asc)]
        );
        assert!(config().compile(Some("x,y"), ';').is_err());
    }

    #[test]
    fn test_direction_into_order() {
        assert_eq!(Order::from(Direction::Asc), Order::Asc);
        assert_eq!(Order::from(Direction::Desc), Order::Desc);
    }
}
