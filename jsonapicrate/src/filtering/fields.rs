use std::collections::HashMap;

use super::query_parser::QueryParams;

/// Sparse fieldsets requested with `fields[type]=a,b`.
///
/// A type without an entry is unrestricted. `SparseFields::parse` returns
/// `None` when no type is restricted at all, which differs from restricting a
/// type to nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseFields(HashMap<String, Vec<String>>);

impl SparseFields {
    #[must_use]
    pub fn parse(params: &QueryParams, separator: char) -> Option<Self> {
        let map: HashMap<String, Vec<String>> = params
            .fields()
            .into_iter()
            .filter_map(|(resource_type, value)| {
                let names: Vec<String> = value
                    .split(separator)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(ToString::to_string)
                    .collect();
                (!resource_type.is_empty() && !names.is_empty()).then_some((resource_type, names))
            })
            .collect();
        (!map.is_empty()).then_some(Self(map))
    }

    #[must_use]
    pub fn restrict(mut self, resource_type: impl Into<String>, names: &[&str]) -> Self {
        self.0
            .insert(resource_type.into(), names.iter().map(ToString::to_string).collect());
        self
    }

    /// Permitted attribute names for `resource_type`, `None` if unrestricted.
    #[must_use]
    pub fn for_type(&self, resource_type: &str) -> Option<&[String]> {
        self.0.get(resource_type).map(Vec::as_slice)
    }
}
