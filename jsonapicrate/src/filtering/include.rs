//! Relationship inclusion (`include=comments.author,tags`).
//!
//! Two views of the same request are produced. [`IncludeCompiler::includes`]
//! silently drops unknown paths and is used to gate serialization, while
//! [`IncludeCompiler::relation`] rejects them because its result is merged
//! into the data-source query.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::{ApiError, ParameterKind};

/// A permitted relationship path and its optional eager-load directive.
///
/// The directive is never interpreted here; it is handed to the data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeEntry {
    pub path: String,
    pub eager_load: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IncludeDeclaration {
    Path(String),
    Directive(BTreeMap<String, Value>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<IncludeDeclaration>")]
pub struct IncludeWhitelist(Vec<IncludeEntry>);

impl IncludeWhitelist {
    #[must_use]
    pub fn new(entries: Vec<IncludeEntry>) -> Self {
        Self(entries)
    }

    pub fn of_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            paths
                .into_iter()
                .map(|path| IncludeEntry {
                    path: path.into(),
                    eager_load: None,
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&IncludeEntry> {
        self.0.iter().find(|entry| entry.path == path)
    }

    #[must_use]
    pub fn entries(&self) -> &[IncludeEntry] {
        &self.0
    }
}

impl From<Vec<IncludeDeclaration>> for IncludeWhitelist {
    fn from(declarations: Vec<IncludeDeclaration>) -> Self {
        let mut entries = Vec::new();
        for declaration in declarations {
            match declaration {
                IncludeDeclaration::Path(path) => entries.push(IncludeEntry {
                    path,
                    eager_load: None,
                }),
                IncludeDeclaration::Directive(map) => {
                    entries.extend(map.into_iter().map(|(path, hint)| IncludeEntry {
                        path,
                        eager_load: (!hint.is_null()).then_some(hint),
                    }));
                }
            }
        }
        Self(entries)
    }
}

/// Eager-load hints for the requested, permitted paths, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EagerLoad(pub Vec<Value>);

pub struct IncludeCompiler<'a> {
    whitelist: &'a IncludeWhitelist,
    requested: Vec<String>,
}

impl<'a> IncludeCompiler<'a> {
    /// `raw` is split on `separator`; blank and repeated paths are dropped.
    #[must_use]
    pub fn new(whitelist: &'a IncludeWhitelist, raw: Option<&str>, separator: char) -> Self {
        let mut requested: Vec<String> = Vec::new();
        for path in raw.unwrap_or_default().split(separator).map(str::trim) {
            if !path.is_empty() && !requested.iter().any(|p| p == path) {
                requested.push(path.to_string());
            }
        }
        Self { whitelist, requested }
    }

    #[must_use]
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// Requested paths that are whitelisted, unknown ones dropped.
    #[must_use]
    pub fn includes(&self) -> Vec<String> {
        self.requested
            .iter()
            .filter(|path| self.whitelist.get(path).is_some())
            .cloned()
            .collect()
    }

    /// The eager-load fragment, `None` when none of the requested paths
    /// carries a directive.
    ///
    /// Every requested path is checked, whether or not the whitelist has
    /// directives at all.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnsupportedParameter` for the first requested path
    /// that has no whitelist entry.
    pub fn relation(&self) -> Result<Option<EagerLoad>, ApiError> {
        let mut hints = Vec::new();
        for path in &self.requested {
            let entry = self.whitelist.get(path).ok_or_else(|| {
                tracing::warn!(path = %path, "rejected include of non-whitelisted relationship");
                ApiError::unsupported(ParameterKind::Include, path.clone())
            })?;
            if let Some(hint) = &entry.eager_load {
                hints.push(hint.clone());
            }
        }
        Ok((!hints.is_empty()).then_some(EagerLoad(hints)))
    }
}
