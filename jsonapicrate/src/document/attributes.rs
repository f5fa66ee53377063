use serde::Serialize;
use serde_json::{Map, Value};

/// Accumulates a resource's `attributes` member, honoring a sparse fieldset.
///
/// With `fields` unset every attribute is kept; otherwise only the listed names.
#[derive(Debug, Clone, Default)]
pub struct AttributesBuilder {
    fields: Option<Vec<String>>,
    attributes: Map<String, Value>,
}

impl AttributesBuilder {
    #[must_use]
    pub fn new(fields: Option<&[String]>) -> Self {
        Self {
            fields: fields.map(<[String]>::to_vec),
            attributes: Map::new(),
        }
    }

    /// Whether `name` passes the fieldset.
    #[must_use]
    pub fn permits(&self, name: &str) -> bool {
        self.fields
            .as_ref()
            .is_none_or(|fields| fields.iter().any(|field| field == name))
    }

    #[must_use]
    pub fn add(mut self, name: &str, value: impl Into<Value>) -> Self {
        if self.permits(name) {
            self.attributes.insert(name.to_string(), value.into());
        }
        self
    }

    /// Adds `value` only when `condition` also holds.
    #[must_use]
    pub fn add_if(self, condition: bool, name: &str, value: impl Into<Value>) -> Self {
        if condition { self.add(name, value) } else { self }
    }

    /// Copies the named properties of `source` through the fieldset.
    ///
    /// `source` is serialized once; names it does not have are skipped, as is a
    /// source that does not serialize to an object.
    #[must_use]
    pub fn add_multi<T: Serialize + ?Sized>(mut self, source: &T, names: &[&str]) -> Self {
        let Ok(Value::Object(mut properties)) = serde_json::to_value(source) else {
            return self;
        };
        for name in names {
            if let Some(value) = properties.remove(*name) {
                self = self.add(name, value);
            }
        }
        self
    }

    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    #[must_use]
    pub fn into_attributes(self) -> Map<String, Value> {
        self.attributes
    }
}
