use serde_json::{Map, Value, json};

use super::attributes::AttributesBuilder;
use super::relationships::RelationshipsBuilder;
use super::{Document, DocumentOptions, PrimaryData, ResourceObject, push_unique};
use crate::filtering::pagination::Paginator;

/// Describes how one record becomes a resource object.
///
/// ```rust,ignore
/// impl ResourceSerializer for Post {
///     fn resource_type(&self) -> &str { "posts" }
///     fn id(&self) -> String { self.id.to_string() }
///     fn attributes(&self, builder: AttributesBuilder) -> AttributesBuilder {
///         builder.add_multi(self, &["title", "body"])
///     }
///     fn relationships(&self, relationships: &mut RelationshipsBuilder<'_>) {
///         relationships.include_resource("author", &self.author, Some(RelateView::Identifier));
///     }
/// }
/// ```
pub trait ResourceSerializer {
    fn resource_type(&self) -> &str;

    fn id(&self) -> String;

    fn attributes(&self, builder: AttributesBuilder) -> AttributesBuilder;

    fn relationships(&self, _relationships: &mut RelationshipsBuilder<'_>) {}

    /// Resource-level `links`.
    fn links(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Document-level `meta` of a single-resource document.
    fn meta(&self) -> Map<String, Value> {
        Map::new()
    }
}

/// Turns serializers into documents for one request.
pub struct Assembler<'a> {
    options: &'a DocumentOptions,
}

impl<'a> Assembler<'a> {
    #[must_use]
    pub fn new(options: &'a DocumentOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &DocumentOptions {
        self.options
    }

    pub(crate) fn build<S>(&self, resource: &S, path: &str, depth: usize) -> Document
    where
        S: ResourceSerializer + ?Sized,
    {
        let resource_type = resource.resource_type();
        let fields = self
            .options
            .fields
            .as_ref()
            .and_then(|fields| fields.for_type(resource_type));
        let attributes = resource.attributes(AttributesBuilder::new(fields)).into_attributes();

        let mut relationships = RelationshipsBuilder::new(self, path, depth);
        resource.relationships(&mut relationships);
        let (relationships, included) = relationships.finish();

        Document {
            links: Map::new(),
            data: PrimaryData::Resource(Box::new(ResourceObject {
                resource_type: resource_type.to_string(),
                id: resource.id(),
                attributes,
                relationships,
                links: resource.links(),
            })),
            included,
            meta: resource.meta(),
        }
    }

    #[must_use]
    pub fn serialize_resource<S>(&self, resource: &S) -> Document
    where
        S: ResourceSerializer + ?Sized,
    {
        self.build(resource, "", 0)
    }

    /// Serializes every record and merges them into one collection document.
    ///
    /// `included` is flattened across records and deduplicated. The paginator,
    /// when given, supplies `links` and `meta.pagination`; `filters` (usually
    /// the compiler's `meta_info`) lands in `meta.filters` when non-empty.
    #[must_use]
    pub fn serialize_collection<S>(&self, records: &[S], paginator: Option<&Paginator>, filters: Vec<String>) -> Document
    where
        S: ResourceSerializer,
    {
        let mut data = Vec::with_capacity(records.len());
        let mut included = Vec::new();
        for record in records {
            let document = self.build(record, "", 0);
            if let PrimaryData::Resource(resource) = document.data {
                data.push(*resource);
            }
            for value in document.included {
                push_unique(&mut included, value);
            }
        }

        let mut document = Document::new(PrimaryData::Collection(data));
        document.included = included;
        if !filters.is_empty() {
            document.meta.insert("filters".into(), json!(filters));
        }
        if let Some(paginator) = paginator {
            document.links = paginator.links().to_map();
            document.meta.insert(
                "pagination".into(),
                json!({
                    "current_page": paginator.current_page,
                    "total_pages": paginator.total_pages,
                    "per_page": paginator.per_page,
                }),
            );
        }
        document
    }

    /// The response body for `document`.
    #[must_use]
    pub fn render(&self, document: &Document) -> Value {
        document.to_value(self.options)
    }
}
