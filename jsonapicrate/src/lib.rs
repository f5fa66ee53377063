//! # jsonapicrate
//!
//! Whitelisted JSON:API query compilation and document assembly for Axum and
//! Sea-ORM services.
//!
//! A request's `filter[...]`, `sort`, `include`, `fields[...]` and `page[...]`
//! parameters are checked against the endpoint's [`ResourceConfig`] and merged
//! into a Sea-ORM select; the loaded records are then serialized into a compound
//! JSON:API document.
//!
//! ```rust,ignore
//! use jsonapicrate::{ApiError, Assembler, Builder, Composed, QueryParams, Target};
//!
//! async fn list_posts(
//!     State(state): State<AppState>,
//!     params: QueryParams,
//! ) -> Result<Json<serde_json::Value>, ApiError> {
//!     let builder = Builder::new(Target::Collection(post::Entity::find()), &params, &state.posts, &state.config);
//!     let options = builder.document_options();
//!     let Composed::Collection(query) = builder.compose()? else {
//!         return Err(ApiError::internal("expected a collection", None));
//!     };
//!     let page = query.fetch(&state.db).await?;
//!
//!     let assembler = Assembler::new(&options);
//!     let paginator = page.paginator("/posts", &params);
//!     let document = assembler.serialize_collection(&page.records, Some(&paginator), query.filters);
//!     Ok(Json(assembler.render(&document)))
//! }
//! ```

pub mod config;
pub mod core;
pub mod document;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod validation;

pub use config::{QueryConfig, ResourceConfig, StrategyDefaults};
pub use crate::core::{Builder, Composed, ComposedQuery, Page, Target};
pub use document::{
    Assembler, AttributesBuilder, Document, DocumentOptions, PrimaryData, RelateView, RelationshipsBuilder,
    ResourceObject, ResourceSerializer, Sections,
};
pub use document::error::{ErrorDocument, ErrorObject, ErrorSource};
pub use errors::{ApiError, JSONAPI_MEDIA_TYPE, ParameterKind};
pub use filtering::{
    FilterCompiler, FilterScope, FilterStrategy, PageRequest, Paginator, QueryParams, SortConfig, SparseFields,
    StrategyRegistry,
};
pub use models::JsonApiQuery;
pub use validation::{Validatable, ValidationError, ValidationErrors};
