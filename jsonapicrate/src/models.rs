use serde::Deserialize;
use utoipa::IntoParams;

/// OpenAPI description of the fixed JSON:API query parameters.
///
/// Handlers extract [`crate::QueryParams`] instead; this type only documents
/// the parameters in `#[utoipa::path(params(JsonApiQuery))]`.
///
/// # Filtering
/// `filter[<attribute>]=<value>` for each whitelisted attribute, for example
/// `filter[title]=*rust`, `filter[score]=>=3` or `filter[id]=1,2,3`.
///
/// # Sparse fieldsets
/// `fields[<type>]=<attribute>,<attribute>`, for example `fields[posts]=title`.
#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct JsonApiQuery {
    /// Comma-separated attributes, `-` prefix for descending.
    ///
    /// Example: `-created,title`
    #[param(example = "-created,title")]
    pub sort: Option<String>,
    /// Comma-separated relationship paths.
    ///
    /// Example: `comments.author`
    #[param(example = "comments.author")]
    pub include: Option<String>,
    /// Page number, 1-based.
    #[serde(rename = "page[number]")]
    #[param(example = 1)]
    pub page_number: Option<u64>,
    /// Records per page, capped by the server.
    #[serde(rename = "page[limit]")]
    #[param(example = 20)]
    pub page_limit: Option<u64>,
}
