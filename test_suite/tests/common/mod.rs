use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use chrono::NaiveDate;
use jsonapicrate::filtering::{CastValue, IncludeCompiler, Scalar};
use jsonapicrate::validation::validators;
use jsonapicrate::{
    ApiError, Assembler, Builder, Composed, DocumentOptions, FilterScope, JSONAPI_MEDIA_TYPE, QueryConfig,
    QueryParams, ResourceConfig, Target, Validatable, ValidationErrors,
};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema, Set,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;

pub mod comment_entity;
pub mod person_entity;
pub mod post_entity;
pub mod resources;

use resources::{PostResource, load_posts};

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Fresh in-memory database with the blog schema and seed rows.
#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(person_entity::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(post_entity::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(comment_entity::Entity)))
        .await?;
    seed(&db).await?;
    Ok(db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Scores are distinct so score ordering is total
async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    let people = [(1, "Ada"), (2, "Grace"), (3, "Linus")].map(|(id, name)| person_entity::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
    });
    person_entity::Entity::insert_many(people).exec(db).await?;

    let posts = [
        (1, "Rust ownership explained", 5, date(2024, 1, 10), 1),
        (2, "Async Rust in practice", 4, date(2024, 2, 5), 2),
        (3, "Gardening for beginners", 2, date(2024, 3, 1), 3),
        (4, "100% test coverage myths", 3, date(2024, 3, 15), 1),
        (5, "Learning SQL_joins", 1, date(2024, 4, 20), 2),
    ]
    .map(|(id, title, score, published_on, author_id)| post_entity::ActiveModel {
        id: Set(id),
        title: Set(title.to_string()),
        body: Set(format!("Body of {title}")),
        score: Set(score),
        published_on: Set(published_on),
        author_id: Set(author_id),
    });
    post_entity::Entity::insert_many(posts).exec(db).await?;

    let comments = [
        (1, "Great intro", 1, 2),
        (2, "Thanks", 1, 3),
        (3, "Helpful", 2, 1),
        (4, "Nice", 3, 2),
    ]
    .map(|(id, body, post_id, author_id)| comment_entity::ActiveModel {
        id: Set(id),
        body: Set(body.to_string()),
        post_id: Set(post_id),
        author_id: Set(author_id),
    });
    comment_entity::Entity::insert_many(comments).exec(db).await?;
    Ok(())
}

/// Whitelists of the `/posts` endpoint.
#[allow(dead_code)]
pub fn posts_resource() -> ResourceConfig {
    serde_json::from_value(json!({
        "sort": {
            "permitted": ["title", "score", {"published": {"col_name": "published_on"}}],
            "default": {"published": "desc"}
        },
        "filter": [
            {"id": {"type": "integer"}},
            {"title": {"wildcard": "both"}},
            {"score": {"type": "integer"}},
            {"published": {"type": "date", "col_name": "published_on"}},
            {"author": {"type": "integer", "col_name": "author_id"}},
            {"popular": {"type": "boolean", "method": "popular"}}
        ],
        "include": [
            {"author": "author"},
            {"comments": "comments"},
            {"comments.author": "comments.author"}
        ]
    }))
    .unwrap()
}

/// Answers `filter[popular]`: a score of 4 or more.
pub struct PostScope;

impl FilterScope for PostScope {
    fn filter_scope(&self, method: &str, value: &CastValue) -> Option<Condition> {
        match (method, value) {
            ("popular", CastValue::Single(Scalar::Boolean(true))) => {
                Some(Condition::all().add(post_entity::Column::Score.gte(4)))
            }
            ("popular", CastValue::Single(Scalar::Boolean(false))) => {
                Some(Condition::all().add(post_entity::Column::Score.lt(4)))
            }
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<QueryConfig>,
    pub posts: Arc<ResourceConfig>,
}

fn jsonapi_response(status: StatusCode, body: Value) -> Response {
    (status, [(header::CONTENT_TYPE, JSONAPI_MEDIA_TYPE)], Json(body)).into_response()
}

async fn list_posts(State(state): State<AppState>, params: QueryParams) -> Result<Response, ApiError> {
    let builder = Builder::new(
        Target::Collection(post_entity::Entity::find()),
        &params,
        &state.posts,
        &state.config,
    )
    .with_scope(&PostScope);
    let options = builder.document_options();
    let Composed::Collection(query) = builder.compose()? else {
        return Err(ApiError::internal("expected a collection", None));
    };

    let page = query.fetch(&state.db).await?;
    let paginator = page.paginator("/posts", &params);
    let records = load_posts(&state.db, page.records, query.eager_load.as_ref()).await?;

    let assembler = Assembler::new(&options);
    let document = assembler.serialize_collection(&records, Some(&paginator), query.filters);
    Ok(jsonapi_response(StatusCode::OK, assembler.render(&document)))
}

async fn show_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    params: QueryParams,
) -> Result<Response, ApiError> {
    let post = post_entity::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Post", Some(id.to_string())))?;

    let eager_load = IncludeCompiler::new(&state.posts.include, params.include(), state.config.separator).relation()?;
    let builder = Builder::<post_entity::Entity>::new(Target::Record(post), &params, &state.posts, &state.config);
    let options = builder.document_options();
    let Composed::Record(post) = builder.compose()? else {
        return Err(ApiError::internal("expected a record", None));
    };

    let mut records = load_posts(&state.db, vec![post], eager_load.as_ref()).await?;
    let Some(record) = records.pop() else {
        return Err(ApiError::not_found("Post", Some(id.to_string())));
    };
    let assembler = Assembler::new(&options);
    Ok(jsonapi_response(
        StatusCode::OK,
        assembler.render(&assembler.serialize_resource(&record)),
    ))
}

#[derive(Deserialize)]
pub struct NewPostDocument {
    pub data: NewPostData,
}

#[derive(Deserialize)]
pub struct NewPostData {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: NewPost,
}

#[derive(Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub score: i32,
    pub published_on: NaiveDate,
    pub author_id: i32,
}

impl Validatable for NewPost {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_required("title", &self.title));
        errors.check(validators::validate_length("title", &self.title, None, Some(100)));
        errors.check(validators::validate_range("score", self.score, Some(0), Some(5)));
        errors.result()
    }
}

async fn create_post(State(state): State<AppState>, Json(document): Json<NewPostDocument>) -> Result<Response, ApiError> {
    if document.data.resource_type != "posts" {
        return Err(ApiError::bad_request(format!(
            "Resource type '{}' does not match 'posts'",
            document.data.resource_type
        )));
    }
    let new_post = document.data.attributes;
    new_post.validate()?;

    let post = post_entity::ActiveModel {
        title: Set(new_post.title),
        body: Set(new_post.body),
        score: Set(new_post.score),
        published_on: Set(new_post.published_on),
        author_id: Set(new_post.author_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let options = DocumentOptions::new(&state.config);
    let assembler = Assembler::new(&options);
    Ok(jsonapi_response(
        StatusCode::CREATED,
        assembler.render(&assembler.serialize_resource(&PostResource::bare(post))),
    ))
}

#[allow(dead_code)]
pub fn setup_test_app(db: DatabaseConnection) -> Router {
    setup_test_app_with_config(db, QueryConfig::default())
}

#[allow(dead_code)]
pub fn setup_test_app_with_config(db: DatabaseConnection, config: QueryConfig) -> Router {
    let state = AppState {
        db,
        config: Arc::new(config),
        posts: Arc::new(posts_resource()),
    };
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(show_post))
        .with_state(state)
}

/// Percent-encodes the characters `http` refuses in a request target.
#[allow(dead_code)]
pub fn encode_query(uri: &str) -> String {
    uri.replace('[', "%5B")
        .replace(']', "%5D")
        .replace('>', "%3E")
        .replace('<', "%3C")
        .replace(' ', "%20")
}

/// Sends a GET and returns the status, content type and JSON body.
#[allow(dead_code)]
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(encode_query(uri))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

#[allow(dead_code)]
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Option<String>, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, JSONAPI_MEDIA_TYPE)
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: Response) -> (StatusCode, Option<String>, Value) {
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, content_type, json)
}
