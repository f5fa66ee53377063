use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::JsonApi;

/// Where in the request an error originated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ErrorSource {
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            parameter: None,
        }
    }

    pub fn parameter(parameter: impl Into<String>) -> Self {
        Self {
            pointer: None,
            parameter: Some(parameter.into()),
        }
    }
}

/// A JSON:API error object. Only the members JSON:API defines exist here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub links: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub meta: Option<Map<String, Value>>,
}

impl ErrorObject {
    /// Builds an error object from an arbitrary attribute bag, dropping every
    /// key that is not a JSON:API error member. Numeric `status`/`code` values
    /// are stringified; members of the wrong shape are dropped.
    #[must_use]
    pub fn from_attributes(attributes: &Map<String, Value>) -> Self {
        let text = |key: &str| match attributes.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let object = |key: &str| attributes.get(key).and_then(Value::as_object).cloned();

        Self {
            id: text("id"),
            links: object("links"),
            status: text("status"),
            code: text("code"),
            title: text("title"),
            detail: text("detail"),
            source: attributes
                .get("source")
                .and_then(|source| serde_json::from_value(source.clone()).ok()),
            meta: object("meta"),
        }
    }
}

/// Top-level error document, `{jsonapi, errors}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDocument {
    pub jsonapi: JsonApi,
    pub errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    #[must_use]
    pub fn new(errors: Vec<ErrorObject>) -> Self {
        Self {
            jsonapi: JsonApi::default(),
            errors,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.jsonapi.version = version.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_attributes_keeps_only_error_members() {
        let bag = json!({
            "status": 422,
            "title": "Invalid",
            "detail": "too short",
            "source": {"pointer": "/data/attributes/title"},
            "meta": {"min": 3},
            "backtrace": ["frame"],
            "sql": "SELECT 1"
        });
        let object = ErrorObject::from_attributes(bag.as_object().unwrap());
        let value = serde_json::to_value(&object).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(value["status"], "422");
        assert_eq!(value["source"]["pointer"], "/data/attributes/title");
        assert!(value.get("backtrace").is_none());
    }

    #[test]
    fn test_malformed_members_are_dropped() {
        let bag = json!({"links": "not-an-object", "source": 5, "detail": "x"});
        let object = ErrorObject::from_attributes(bag.as_object().unwrap());
        assert!(object.links.is_none());
        assert!(object.source.is_none());
        assert_eq!(object.detail.as_deref(), Some("x"));
    }

    #[test]
    fn test_document_version() {
        let document = ErrorDocument::new(vec![]).with_version("1.1");
        assert_eq!(
            serde_json::to_value(document).unwrap(),
            json!({"jsonapi": {"version": "1.1"}, "errors": []})
        );
    }
}
