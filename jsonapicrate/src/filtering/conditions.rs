use sea_orm::Condition;

use super::cast::{CastValue, PrimitiveType, Scalar};
use super::operator::FilterClause;
use super::strategies::{FilterScope, FilterStrategy, build_builtin};
use super::whitelist::FilterWhitelist;
use crate::config::QueryConfig;
use crate::errors::{ApiError, ParameterKind};

/// Compiles `filter[...]` parameters into one AND-combined condition.
///
/// The whitelist lookup is the only validation step: once an attribute is
/// found, its value is cast and handed to the resolved builder as is.
pub struct FilterCompiler<'a> {
    whitelist: &'a FilterWhitelist,
    config: &'a QueryConfig,
    scope: Option<&'a dyn FilterScope>,
}

impl<'a> FilterCompiler<'a> {
    #[must_use]
    pub fn new(whitelist: &'a FilterWhitelist, config: &'a QueryConfig) -> Self {
        Self {
            whitelist,
            config,
            scope: None,
        }
    }

    /// Schema used for `method`-delegated filters.
    #[must_use]
    pub fn with_scope(mut self, scope: &'a dyn FilterScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Parses every filter into a clause and its resolved builder.
    ///
    /// # Errors
    ///
    /// `UnsupportedParameter` for the first attribute missing from the
    /// whitelist; `BadRequest` for an unreadable date when `strict_dates` is on.
    pub fn parse(&self, filters: &[(String, String)]) -> Result<Vec<(FilterClause, FilterStrategy)>, ApiError> {
        let mut parsed = Vec::with_capacity(filters.len());
        for (attribute, raw) in filters {
            let entry = self.whitelist.get(attribute).ok_or_else(|| {
                tracing::warn!(attribute = %attribute, "rejected filter on non-whitelisted attribute");
                ApiError::unsupported(ParameterKind::Filter, attribute.clone())
            })?;
            if raw.trim().is_empty() {
                continue;
            }

            let clause = FilterClause::parse(entry, raw, self.config.separator);
            if self.config.strict_dates && has_unreadable_date(&clause, entry.kind) {
                return Err(ApiError::bad_request(format!(
                    "Filter '{attribute}' expects a date, got '{raw}'"
                )));
            }
            let strategy = FilterStrategy::resolve(entry, clause.operator, &self.config.strategies);
            parsed.push((clause, strategy));
        }
        Ok(parsed)
    }

    /// Compiles the filters, `None` when no fragment results.
    ///
    /// # Errors
    ///
    /// Everything [`FilterCompiler::parse`] returns, plus `Internal` when a
    /// configured custom builder or delegated method does not exist.
    pub fn compile(&self, filters: &[(String, String)]) -> Result<Option<Condition>, ApiError> {
        let parsed = self.parse(filters)?;
        if parsed.is_empty() {
            return Ok(None);
        }

        let mut condition = Condition::all();
        for (clause, strategy) in &parsed {
            let fragment = self.build(clause, strategy)?;
            tracing::debug!(attribute = %clause.attribute, ?strategy, "compiled filter");
            condition = condition.add(fragment);
        }
        Ok(Some(condition))
    }

    fn build(&self, clause: &FilterClause, strategy: &FilterStrategy) -> Result<Condition, ApiError> {
        match strategy {
            FilterStrategy::Custom(name) => {
                let builder = self.config.registry.get(name).ok_or_else(|| {
                    ApiError::internal(
                        "Filter configuration error",
                        Some(format!("no filter builder registered as '{name}'")),
                    )
                })?;
                let entry = self.whitelist.get(&clause.attribute).ok_or_else(|| {
                    ApiError::unsupported(ParameterKind::Filter, clause.attribute.clone())
                })?;
                Ok(builder(clause, entry))
            }
            FilterStrategy::Delegate(method) => self
                .scope
                .and_then(|scope| scope.filter_scope(method, &clause.value))
                .ok_or_else(|| {
                    ApiError::internal(
                        "Filter configuration error",
                        Some(format!("schema provides no filter method '{method}'")),
                    )
                }),
            builtin => build_builtin(builtin, clause).ok_or_else(|| {
                ApiError::internal("Filter configuration error", Some(format!("{builtin:?}")))
            }),
        }
    }

    /// `"attr: value"` for every non-blank filter, for echoing back to clients.
    /// Nothing here is validated.
    #[must_use]
    pub fn meta_info(filters: &[(String, String)]) -> Vec<String> {
        filters
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(attribute, value)| format!("{attribute}: {value}"))
            .collect()
    }
}

fn has_unreadable_date(clause: &FilterClause, kind: PrimitiveType) -> bool {
    if !matches!(kind, PrimitiveType::Date | PrimitiveType::DateTime) {
        return false;
    }
    match &clause.value {
        CastValue::Single(scalar) => scalar.is_null(),
        CastValue::Multi(values) => values.iter().any(Scalar::is_null),
    }
}
