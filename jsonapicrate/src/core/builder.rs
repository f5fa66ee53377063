use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Select};

use crate::config::{QueryConfig, ResourceConfig};
use crate::document::DocumentOptions;
use crate::errors::ApiError;
use crate::filtering::conditions::FilterCompiler;
use crate::filtering::fields::SparseFields;
use crate::filtering::include::{EagerLoad, IncludeCompiler};
use crate::filtering::pagination::{PageRequest, Paginator};
use crate::filtering::query_parser::QueryParams;
use crate::filtering::sort::{SortKey, apply_sort};
use crate::filtering::strategies::FilterScope;

/// What a request operates on.
pub enum Target<E: EntityTrait> {
    Collection(Select<E>),
    /// An already loaded record; nothing is composed onto it
    Record(E::Model),
}

/// Result of [`Builder::compose`].
pub enum Composed<E: EntityTrait> {
    Collection(ComposedQuery<E>),
    Record(E::Model),
}

/// A collection query with every request fragment merged in.
#[derive(Debug, Clone)]
pub struct ComposedQuery<E: EntityTrait> {
    /// Filtered, ordered and paged
    pub select: Select<E>,
    /// Filtered only, for the total count
    pub unpaged: Select<E>,
    pub eager_load: Option<EagerLoad>,
    pub page: PageRequest,
    pub sort: Vec<SortKey>,
    /// `"attr: value"` for every non-blank filter
    pub filters: Vec<String>,
}

/// One page of records and the numbers behind it.
#[derive(Debug, Clone)]
pub struct Page<M> {
    pub records: Vec<M>,
    pub total_count: u64,
    pub total_pages: u64,
    pub request: PageRequest,
}

impl<M> Page<M> {
    #[must_use]
    pub fn paginator(&self, base_url: impl Into<String>, params: &QueryParams) -> Paginator {
        Paginator::new(
            self.request.page,
            self.total_pages,
            self.request.per_page,
            base_url,
            params,
        )
    }
}

impl<E> ComposedQuery<E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    /// Counts the filtered rows, then loads the requested page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Database` if either query fails.
    pub async fn fetch<C: ConnectionTrait>(&self, db: &C) -> Result<Page<E::Model>, ApiError> {
        let total_count = self.unpaged.clone().count(db).await?;
        let records = self.select.clone().all(db).await?;
        tracing::debug!(
            total_count,
            returned = records.len(),
            page = self.page.page,
            "fetched collection page"
        );
        Ok(Page {
            records,
            total_count,
            total_pages: self.page.total_pages(total_count),
            request: self.page,
        })
    }
}

/// Merges the fragments of one request into a query.
///
/// Every compiler runs before anything is merged, so a whitelist violation in
/// any parameter fails the request before the data source is touched.
pub struct Builder<'a, E: EntityTrait> {
    target: Target<E>,
    params: &'a QueryParams,
    resource: &'a ResourceConfig,
    config: &'a QueryConfig,
    scope: Option<&'a dyn FilterScope>,
}

impl<'a, E: EntityTrait> Builder<'a, E> {
    #[must_use]
    pub fn new(
        target: Target<E>,
        params: &'a QueryParams,
        resource: &'a ResourceConfig,
        config: &'a QueryConfig,
    ) -> Self {
        Self {
            target,
            params,
            resource,
            config,
            scope: None,
        }
    }

    /// Schema answering `method`-delegated filters.
    #[must_use]
    pub fn with_scope(mut self, scope: &'a dyn FilterScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Requested include paths that are whitelisted. Unknown paths are dropped.
    #[must_use]
    pub fn includes(&self) -> Vec<String> {
        IncludeCompiler::new(&self.resource.include, self.params.include(), self.config.separator).includes()
    }

    #[must_use]
    pub fn fields(&self) -> Option<SparseFields> {
        SparseFields::parse(self.params, self.config.separator)
    }

    /// Rendering options matching this request's `include` and `fields`.
    #[must_use]
    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions::new(self.config)
            .with_includes(self.includes())
            .with_fields(self.fields())
    }

    /// Compiles pagination, filter, include and sort, in that order, and merges
    /// them into the collection query. A record target is returned untouched.
    ///
    /// # Errors
    ///
    /// `UnsupportedParameter` for the first non-whitelisted filter, include or
    /// sort name; `BadRequest` or `Internal` from the filter compiler.
    pub fn compose(self) -> Result<Composed<E>, ApiError> {
        let select = match self.target {
            Target::Record(model) => return Ok(Composed::Record(model)),
            Target::Collection(select) => select,
        };

        let page = PageRequest::from_params(self.params, self.config);

        let raw_filters = self.params.filters();
        let mut filter = FilterCompiler::new(&self.resource.filter, self.config);
        if let Some(scope) = self.scope {
            filter = filter.with_scope(scope);
        }
        let condition = filter.compile(&raw_filters)?;

        let eager_load =
            IncludeCompiler::new(&self.resource.include, self.params.include(), self.config.separator).relation()?;

        let sort = self.resource.sort.compile(self.params.sort(), self.config.separator)?;

        let unpaged = match condition {
            Some(condition) => select.filter(condition),
            None => select,
        };
        let select = page.apply(apply_sort(unpaged.clone(), &sort));

        tracing::debug!(
            filters = raw_filters.len(),
            sort_keys = sort.len(),
            page = page.page,
            per_page = page.per_page,
            "composed collection query"
        );

        Ok(Composed::Collection(ComposedQuery {
            select,
            unpaged,
            eager_load,
            page,
            sort,
            filters: FilterCompiler::meta_info(&raw_filters),
        }))
    }
}
