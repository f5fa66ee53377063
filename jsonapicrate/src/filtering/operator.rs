//! Splits a raw filter value into an operator and cast value(s).

use super::cast::{Cast, CastValue};
use super::whitelist::{WhitelistEntry, WildcardMode};

/// Operator carried by one filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Multi-value clause, implied by a separator in the raw value
    In,
    /// Leading `*`: apply the attribute's configured wildcard
    Wildcard,
}

impl Operator {
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Neq | Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }
}

// Two-character tokens must be tried before their one-character prefixes
const OPERATOR_TOKENS: [(&str, Operator); 6] = [
    ("!=", Operator::Neq),
    (">=", Operator::Gte),
    ("<=", Operator::Lte),
    (">", Operator::Gt),
    ("<", Operator::Lt),
    ("*", Operator::Wildcard),
];

/// Reads an optional leading operator token; anything else is equality.
#[must_use]
pub fn split_operator(raw: &str) -> (Operator, &str) {
    OPERATOR_TOKENS
        .iter()
        .find_map(|(token, operator)| raw.strip_prefix(token).map(|rest| (*operator, rest)))
        .unwrap_or((Operator::Eq, raw))
}

/// A parsed filter for one whitelisted attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub attribute: String,
    pub column: String,
    pub operator: Operator,
    pub raw_value: String,
    pub value: CastValue,
    pub wildcard: WildcardMode,
}

impl FilterClause {
    /// Parses `raw` for `entry`. A separator anywhere in the value makes the
    /// clause multi-value, and no operator token is read in that case.
    #[must_use]
    pub fn parse(entry: &WhitelistEntry, raw: &str, separator: char) -> Self {
        let (operator, value) = if raw.contains(separator) {
            let parts: Vec<String> = raw
                .split(separator)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(ToString::to_string)
                .collect();
            (Operator::In, CastValue::Multi(Cast::cast_all(&parts, entry.kind)))
        } else {
            let (operator, rest) = split_operator(raw);
            (operator, CastValue::Single(Cast::cast(rest, entry.kind)))
        };

        Self {
            attribute: entry.name.clone(),
            column: entry.column().to_string(),
            operator,
            raw_value: raw.to_string(),
            value,
            wildcard: entry.wildcard,
        }
    }

    /// The value text with any operator token removed.
    #[must_use]
    pub fn operand(&self) -> &str {
        match self.operator {
            Operator::In => &self.raw_value,
            _ => split_operator(&self.raw_value).1,
        }
    }
}
