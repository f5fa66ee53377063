//! Filter fragment builders.
//!
//! Every builder turns one [`FilterClause`] into a [`Condition`]. The set of
//! builders is closed except for two escape hatches: [`FilterStrategy::Custom`]
//! looks a builder up in the [`StrategyRegistry`], and
//! [`FilterStrategy::Delegate`] hands the cast value to a [`FilterScope`]
//! implemented by the resource's schema.

use sea_orm::{
    Condition,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::cast::{CastValue, Scalar};
use super::operator::{FilterClause, Operator};
use super::whitelist::{WhitelistEntry, WildcardMode, column_expr};
use crate::config::StrategyDefaults;

/// Identifier of a filter builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum FilterStrategy {
    Equality,
    Comparison,
    In,
    Like,
    ILike,
    ArrayContains,
    /// Builder registered under this name in the [`StrategyRegistry`]
    Custom(String),
    /// Named method on the schema's [`FilterScope`]
    Delegate(String),
}

impl From<String> for FilterStrategy {
    fn from(name: String) -> Self {
        match name.as_str() {
            "equality" | "eq" => Self::Equality,
            "comparison" => Self::Comparison,
            "in" => Self::In,
            "like" => Self::Like,
            "ilike" => Self::ILike,
            "array_contains" | "json_array_contains" => Self::ArrayContains,
            _ => Self::Custom(name),
        }
    }
}

impl From<&str> for FilterStrategy {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl FilterStrategy {
    /// Picks the builder for a clause: the entry's explicit builder, then its
    /// delegated method, then the operator-class default (entry override
    /// before the global default).
    #[must_use]
    pub fn resolve(entry: &WhitelistEntry, operator: Operator, defaults: &StrategyDefaults) -> Self {
        if let Some(builder) = &entry.builder {
            return builder.clone();
        }
        if let Some(method) = &entry.method {
            return Self::Delegate(method.clone());
        }
        let overrides = &entry.overrides;
        let chosen = match operator {
            Operator::In => overrides.in_list.as_ref().unwrap_or(&defaults.in_list),
            Operator::Wildcard => overrides.like.as_ref().unwrap_or(&defaults.like),
            op if op.is_comparison() => overrides.comparison.as_ref().unwrap_or(&defaults.comparison),
            _ => overrides.equality.as_ref().unwrap_or(&defaults.equality),
        };
        chosen.clone()
    }
}

/// Signature of a registered custom builder.
pub type CustomBuilder = Arc<dyn Fn(&FilterClause, &WhitelistEntry) -> Condition + Send + Sync>;

/// Named custom builders, registered once at startup.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    builders: HashMap<String, CustomBuilder>,
}

impl StrategyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn(&FilterClause, &WhitelistEntry) -> Condition + Send + Sync + 'static,
    {
        self.builders.insert(name.into(), Arc::new(builder));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CustomBuilder> {
        self.builders.get(name)
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.builders.keys().collect();
        names.sort();
        f.debug_struct("StrategyRegistry").field("builders", &names).finish()
    }
}

/// Arbitrary filter logic provided by a resource's schema.
///
/// Returning `None` means the schema has no method under that name, which is a
/// server configuration error rather than a client one.
pub trait FilterScope: Send + Sync {
    fn filter_scope(&self, method: &str, value: &CastValue) -> Option<Condition>;
}

/// Builds the fragment for one of the built-in strategies. `Custom` and
/// `Delegate` are resolved by the caller and yield `None` here.
#[must_use]
pub fn build_builtin(strategy: &FilterStrategy, clause: &FilterClause) -> Option<Condition> {
    let expr = match strategy {
        FilterStrategy::Equality => equality(clause),
        FilterStrategy::Comparison => comparison(clause),
        FilterStrategy::In => in_list(clause),
        FilterStrategy::Like => like(clause, false),
        FilterStrategy::ILike => like(clause, true),
        FilterStrategy::ArrayContains => array_contains(clause),
        FilterStrategy::Custom(_) | FilterStrategy::Delegate(_) => return None,
    };
    Some(Condition::all().add(expr))
}

fn compare(column: Expr, operator: Operator, scalar: Scalar) -> SimpleExpr {
    if scalar.is_null() {
        return match operator {
            Operator::Neq => column.is_not_null(),
            Operator::Lt => column.lt(sea_orm::Value::from(scalar)),
            Operator::Lte => column.lte(sea_orm::Value::from(scalar)),
            Operator::Gt => column.gt(sea_orm::Value::from(scalar)),
            Operator::Gte => column.gte(sea_orm::Value::from(scalar)),
            Operator::Eq | Operator::In | Operator::Wildcard => column.is_null(),
        };
    }
    let value = sea_orm::Value::from(scalar);
    match operator {
        Operator::Neq => column.ne(value),
        Operator::Lt => column.lt(value),
        Operator::Lte => column.lte(value),
        Operator::Gt => column.gt(value),
        Operator::Gte => column.gte(value),
        Operator::Eq | Operator::In | Operator::Wildcard => column.eq(value),
    }
}

fn equality(clause: &FilterClause) -> SimpleExpr {
    match &clause.value {
        CastValue::Single(scalar) => compare(column_expr(&clause.column), Operator::Eq, scalar.clone()),
        CastValue::Multi(_) => in_list(clause),
    }
}

fn comparison(clause: &FilterClause) -> SimpleExpr {
    match &clause.value {
        CastValue::Single(scalar) => compare(column_expr(&clause.column), clause.operator, scalar.clone()),
        CastValue::Multi(_) => in_list(clause),
    }
}

fn in_list(clause: &FilterClause) -> SimpleExpr {
    let values = clause.value.scalars().into_iter().map(sea_orm::Value::from);
    column_expr(&clause.column).is_in(values)
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like_wildcards(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar {
        Scalar::String(s) => s.clone(),
        other => match other.to_json() {
            serde_json::Value::String(s) => s,
            value => value.to_string(),
        },
    }
}

fn like(clause: &FilterClause, case_insensitive: bool) -> SimpleExpr {
    let CastValue::Single(scalar) = &clause.value else {
        return in_list(clause);
    };
    let escaped = escape_like_wildcards(&scalar_text(scalar));
    let pattern = match (clause.operator, clause.wildcard) {
        (Operator::Wildcard, WildcardMode::Both) => format!("%{escaped}%"),
        (Operator::Wildcard, WildcardMode::Left) => format!("%{escaped}"),
        (Operator::Wildcard, WildcardMode::Right) => format!("{escaped}%"),
        // Without a wildcard the clause matches the value exactly
        _ if case_insensitive => {
            return Expr::expr(Func::upper(column_expr(&clause.column)))
                .eq(scalar_text(scalar).to_uppercase());
        }
        _ => return equality(clause),
    };

    if case_insensitive {
        Expr::expr(Func::upper(column_expr(&clause.column)))
            .like(LikeExpr::new(pattern.to_uppercase()).escape('\\'))
    } else {
        column_expr(&clause.column).like(LikeExpr::new(pattern).escape('\\'))
    }
}

fn array_contains(clause: &FilterClause) -> SimpleExpr {
    let elements: Vec<serde_json::Value> = clause.value.scalars().iter().map(Scalar::to_json).collect();
    let document = serde_json::Value::Array(elements).to_string();
    Expr::cust_with_exprs(
        "$1 @> $2::jsonb",
        [
            SimpleExpr::from(column_expr(&clause.column)),
            SimpleExpr::from(Expr::val(document)),
        ],
    )
}
