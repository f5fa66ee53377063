//! # JSON:API documents
//!
//! Resource serializers describe one record each ([`ResourceSerializer`]); the
//! [`Assembler`] walks them, and their nested relationships, into a single
//! compound [`Document`].
//!
//! ```rust,ignore
//! let options = DocumentOptions::new(&config)
//!     .with_includes(composed.includes.clone())
//!     .with_fields(composed.fields.clone());
//! let assembler = Assembler::new(&options);
//! let document = assembler.serialize_collection(&posts, Some(&paginator), filters);
//! Json(assembler.render(&document))
//! ```

pub mod attributes;
pub mod error;
pub mod relationships;
pub mod serializer;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use utoipa::ToSchema;

use crate::config::QueryConfig;
use crate::filtering::fields::SparseFields;

pub use attributes::AttributesBuilder;
pub use relationships::{RelateView, RelationshipsBuilder};
pub use serializer::{Assembler, ResourceSerializer};

/// The `jsonapi` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct JsonApi {
    pub version: String,
}

impl Default for JsonApi {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
        }
    }
}

/// One resource object: `{type, id, attributes, relationships, links}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub relationships: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub links: Map<String, Value>,
}

impl ResourceObject {
    #[must_use]
    pub fn identifier(&self) -> Value {
        json!({"type": self.resource_type, "id": self.id})
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryData {
    Resource(Box<ResourceObject>),
    Collection(Vec<ResourceObject>),
    Null,
}

impl PrimaryData {
    /// Every resource object, zero, one or many.
    #[must_use]
    pub fn resources(&self) -> Vec<&ResourceObject> {
        match self {
            Self::Resource(resource) => vec![resource.as_ref()],
            Self::Collection(resources) => resources.iter().collect(),
            Self::Null => Vec::new(),
        }
    }

    fn map(&self, f: impl Fn(&ResourceObject) -> Value) -> Value {
        match self {
            Self::Resource(resource) => f(resource.as_ref()),
            Self::Collection(resources) => Value::Array(resources.iter().map(f).collect()),
            Self::Null => Value::Null,
        }
    }
}

/// Which top-level members [`Document::to_value`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sections {
    pub jsonapi: bool,
    pub links: bool,
    pub data: bool,
    pub included: bool,
    pub meta: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            jsonapi: true,
            links: true,
            data: true,
            included: true,
            meta: true,
        }
    }
}

/// Per-request rendering options.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub fields: Option<SparseFields>,
    /// Include paths already filtered through the whitelist.
    pub includes: Vec<String>,
    pub max_depth: usize,
    pub version: String,
    pub sections: Sections,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self::new(&QueryConfig::default())
    }
}

impl DocumentOptions {
    #[must_use]
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            fields: None,
            includes: Vec::new(),
            max_depth: config.max_include_depth,
            version: config.jsonapi_version.clone(),
            sections: Sections::default(),
        }
    }

    #[must_use]
    pub fn with_includes(mut self, includes: Vec<String>) -> Self {
        self.includes = includes;
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Option<SparseFields>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_sections(mut self, sections: Sections) -> Self {
        self.sections = sections;
        self
    }
}

/// An assembled top-level or nested document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub links: Map<String, Value>,
    pub data: PrimaryData,
    pub included: Vec<Value>,
    pub meta: Map<String, Value>,
}

impl Document {
    #[must_use]
    pub fn new(data: PrimaryData) -> Self {
        Self {
            links: Map::new(),
            data,
            included: Vec::new(),
            meta: Map::new(),
        }
    }

    /// The minimal relationship form, `{data: {type, id}}` (or a list of
    /// identifiers for a collection).
    #[must_use]
    pub fn relationship_data(&self) -> Value {
        json!({"data": self.data.map(ResourceObject::identifier)})
    }

    /// This document as a relationship member.
    #[must_use]
    pub fn as_relationship(&self, view: RelateView) -> Value {
        match view {
            RelateView::Identifier => self.relationship_data(),
            RelateView::Embedded => {
                let mut member = Map::new();
                if !self.links.is_empty() {
                    member.insert("links".into(), Value::Object(self.links.clone()));
                }
                member.insert("data".into(), self.data.map(ResourceObject::to_value));
                if !self.meta.is_empty() {
                    member.insert("meta".into(), Value::Object(self.meta.clone()));
                }
                Value::Object(member)
            }
        }
    }

    /// Renders the top-level JSON tree. Empty `links`, `included` and `meta`
    /// members are left out.
    #[must_use]
    pub fn to_value(&self, options: &DocumentOptions) -> Value {
        let sections = options.sections;
        let mut document = Map::new();
        if sections.jsonapi {
            document.insert("jsonapi".into(), json!({"version": options.version}));
        }
        if sections.links && !self.links.is_empty() {
            document.insert("links".into(), Value::Object(self.links.clone()));
        }
        if sections.data {
            document.insert("data".into(), self.data.map(ResourceObject::to_value));
        }
        if sections.included && !self.included.is_empty() {
            document.insert("included".into(), Value::Array(self.included.clone()));
        }
        if sections.meta && !self.meta.is_empty() {
            document.insert("meta".into(), Value::Object(self.meta.clone()));
        }
        Value::Object(document)
    }
}

/// Appends `value` unless a structurally equal value is already present.
pub(crate) fn push_unique(values: &mut Vec<Value>, value: Value) {
    if !values.contains(&value) {
        values.push(value);
    }
}
