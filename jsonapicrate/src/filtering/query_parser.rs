use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

/// URL-decoded query parameters, in request order.
///
/// JSON:API requests carry their query slices in bracketed keys:
/// - `filter[title]=*rust`
/// - `sort=-created,title`
/// - `include=comments.author`
/// - `fields[posts]=title,body`
/// - `page[number]=2&page[limit]=25`
///
/// Repeated keys are kept; single-value accessors return the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

pub const PAGE_NUMBER: &str = "page[number]";
pub const PAGE_LIMIT: &str = "page[limit]";

impl QueryParams {
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn sort(&self) -> Option<&str> {
        self.get("sort")
    }

    #[must_use]
    pub fn include(&self) -> Option<&str> {
        self.get("include")
    }

    #[must_use]
    pub fn page_number(&self) -> Option<&str> {
        self.get(PAGE_NUMBER)
    }

    #[must_use]
    pub fn page_limit(&self) -> Option<&str> {
        self.get(PAGE_LIMIT)
    }

    /// `filter[name]` entries as `(name, value)`, first-seen order, last value wins.
    #[must_use]
    pub fn filters(&self) -> Vec<(String, String)> {
        self.bracketed("filter")
    }

    /// `fields[type]` entries as `(type, value)`.
    #[must_use]
    pub fn fields(&self) -> Vec<(String, String)> {
        self.bracketed("fields")
    }

    fn bracketed(&self, prefix: &str) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = Vec::new();
        for (key, value) in &self.pairs {
            let Some(name) = key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('['))
                .and_then(|rest| rest.strip_suffix(']'))
            else {
                continue;
            };
            if let Some(existing) = out.iter_mut().find(|(n, _)| n == name) {
                existing.1.clone_from(value);
            } else {
                out.push((name.to_string(), value.clone()));
            }
        }
        out
    }

    /// Replaces every occurrence of `key` with one pair at the first
    /// occurrence's position, or appends it.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Form-encoded query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .uri
            .query()
            .map(Self::from_query_str)
            .unwrap_or_default())
    }
}
