//! # Errors
//!
//! Every failure the query compilers and the record layer can produce, rendered
//! as a JSON:API error document.
//!
//! Whitelist violations are the client's fault and name the offending parameter.
//! Database and configuration problems are logged through `tracing` and reach the
//! client only as a generic message.
//!
//! ```rust,ignore
//! use jsonapicrate::{ApiError, Builder, QueryParams};
//!
//! async fn index(params: QueryParams) -> Result<Json<Value>, ApiError> {
//!     // An unknown `sort` or `filter[...]` becomes a 400 error document
//!     let composed = Builder::new(Target::Collection(Post::find()), &params, &resource, &config)
//!         .compose()?;
//!     // ...
//! }
//! ```

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use std::fmt;

use crate::config::QueryConfig;
use crate::document::error::{ErrorDocument, ErrorObject, ErrorSource};
use crate::validation::{ValidationError, ValidationErrors};

/// Media type of every JSON:API response body.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Which whitelisted request parameter was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Filter,
    Sort,
    Include,
}

impl ParameterKind {
    /// Query parameter name reported in `source.parameter`.
    #[must_use]
    pub fn parameter(self, name: &str) -> String {
        match self {
            Self::Filter => format!("filter[{name}]"),
            Self::Sort => "sort".to_string(),
            Self::Include => "include".to_string(),
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Filter => "Filter",
            Self::Sort => "Sort",
            Self::Include => "Include",
        })
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// 400, a filter, sort or include name outside the whitelist
    UnsupportedParameter { kind: ParameterKind, name: String },

    /// 400, whitelisted but unusable input
    BadRequest { message: String },

    /// 404
    NotFound { resource: String, id: Option<String> },

    /// 422, one error object per invalid attribute
    ValidationFailed(ValidationErrors),

    /// 500, details logged only
    Database { message: String, internal: DbErr },

    /// 500, details logged only
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn unsupported(kind: ParameterKind, name: impl Into<String>) -> Self {
        Self::UnsupportedParameter {
            kind,
            name: name.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    #[must_use]
    pub fn validation_failed(errors: ValidationErrors) -> Self {
        Self::ValidationFailed(errors)
    }

    /// Wraps a database error; the client only sees a generic message.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedParameter { .. } | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::UnsupportedParameter { .. } => "Unsupported parameter",
            Self::BadRequest { .. } => "Bad request",
            Self::NotFound { .. } => "Not found",
            Self::ValidationFailed(_) => "Invalid attribute",
            Self::Database { .. } | Self::Internal { .. } => "Internal server error",
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::UnsupportedParameter { kind, name } => format!("{kind} '{name}' is not supported"),
            Self::BadRequest { message } | Self::Database { message, .. } | Self::Internal { message, .. } => {
                message.clone()
            }
            Self::NotFound { resource, id: Some(id) } => format!("{resource} with ID '{id}' not found"),
            Self::NotFound { resource, id: None } => format!("{resource} not found"),
            Self::ValidationFailed(errors) => format!("Validation failed with {} error(s)", errors.len()),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }

    /// The `errors` member of the response document.
    #[must_use]
    pub fn to_error_objects(&self) -> Vec<ErrorObject> {
        let status = self.status_code().as_u16().to_string();
        match self {
            Self::ValidationFailed(errors) => errors.errors().iter().map(ValidationError::to_error_object).collect(),
            Self::UnsupportedParameter { kind, name } => vec![ErrorObject {
                status: Some(status),
                code: Some("unsupported_parameter".to_string()),
                title: Some(self.title().to_string()),
                detail: Some(self.user_message()),
                source: Some(ErrorSource::parameter(kind.parameter(name))),
                ..ErrorObject::default()
            }],
            _ => vec![ErrorObject {
                status: Some(status),
                title: Some(self.title().to_string()),
                detail: Some(self.user_message()),
                ..ErrorObject::default()
            }],
        }
    }

    /// Error document at the default `jsonapi` version. The `IntoResponse`
    /// impl uses this one since it has no configuration at hand.
    #[must_use]
    pub fn to_document(&self) -> ErrorDocument {
        ErrorDocument::new(self.to_error_objects())
    }

    /// Error document carrying the configured `jsonapi` version.
    #[must_use]
    pub fn to_document_with(&self, config: &QueryConfig) -> ErrorDocument {
        self.to_document().with_version(config.jsonapi_version.clone())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        (
            self.status_code(),
            [(header::CONTENT_TYPE, JSONAPI_MEDIA_TYPE)],
            Json(self.to_document()),
        )
            .into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `RecordNotFound` becomes a 404, everything else a sanitized 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::not_found(resource, None)
            }
            _ => Self::database(err),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed(errors)
    }
}
