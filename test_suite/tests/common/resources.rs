use jsonapicrate::{AttributesBuilder, RelateView, RelationshipsBuilder, ResourceSerializer};
use jsonapicrate::filtering::EagerLoad;
use sea_orm::{ConnectionTrait, DbErr, LoaderTrait};
use serde_json::{Map, Value, json};

use super::{comment_entity, person_entity, post_entity};

pub struct PersonResource(pub person_entity::Model);

impl ResourceSerializer for PersonResource {
    fn resource_type(&self) -> &str {
        "people"
    }

    fn id(&self) -> String {
        self.0.id.to_string()
    }

    fn attributes(&self, builder: AttributesBuilder) -> AttributesBuilder {
        builder.add("name", self.0.name.as_str())
    }
}

pub struct CommentResource {
    pub comment: comment_entity::Model,
    pub author: Option<PersonResource>,
}

impl ResourceSerializer for CommentResource {
    fn resource_type(&self) -> &str {
        "comments"
    }

    fn id(&self) -> String {
        self.comment.id.to_string()
    }

    fn attributes(&self, builder: AttributesBuilder) -> AttributesBuilder {
        builder.add_multi(&self.comment, &["body"])
    }

    fn relationships(&self, relationships: &mut RelationshipsBuilder<'_>) {
        if let Some(author) = &self.author {
            relationships.include_resource("author", author, Some(RelateView::Identifier));
        }
    }
}

pub struct PostResource {
    pub post: post_entity::Model,
    pub author: Option<PersonResource>,
    pub comments: Vec<CommentResource>,
}

impl PostResource {
    pub fn bare(post: post_entity::Model) -> Self {
        Self {
            post,
            author: None,
            comments: Vec::new(),
        }
    }
}

impl ResourceSerializer for PostResource {
    fn resource_type(&self) -> &str {
        "posts"
    }

    fn id(&self) -> String {
        self.post.id.to_string()
    }

    fn attributes(&self, builder: AttributesBuilder) -> AttributesBuilder {
        builder.add_multi(&self.post, &["title", "body", "score", "published_on"])
    }

    fn relationships(&self, relationships: &mut RelationshipsBuilder<'_>) {
        if let Some(author) = &self.author {
            relationships.include_resource("author", author, Some(RelateView::Identifier));
        }
        relationships.include_resources("comments", &self.comments, Some(RelateView::Identifier));
    }

    fn links(&self) -> Map<String, Value> {
        let mut links = Map::new();
        links.insert("self".into(), json!(format!("/posts/{}", self.post.id)));
        links
    }
}

fn wants(eager_load: Option<&EagerLoad>, hint: &str) -> bool {
    eager_load.is_some_and(|load| load.0.iter().any(|value| value.as_str() == Some(hint)))
}

/// Loads the relations named by the eager-load hints and wraps each post.
pub async fn load_posts<C: ConnectionTrait>(
    db: &C,
    posts: Vec<post_entity::Model>,
    eager_load: Option<&EagerLoad>,
) -> Result<Vec<PostResource>, DbErr> {
    let with_comment_authors = wants(eager_load, "comments.author");
    let authors = if wants(eager_load, "author") {
        posts.load_one(person_entity::Entity, db).await?
    } else {
        vec![None; posts.len()]
    };
    let comments = if wants(eager_load, "comments") || with_comment_authors {
        posts.load_many(comment_entity::Entity, db).await?
    } else {
        vec![Vec::new(); posts.len()]
    };

    let mut resources = Vec::with_capacity(posts.len());
    for ((post, author), comments) in posts.into_iter().zip(authors).zip(comments) {
        let comment_authors = if with_comment_authors {
            comments.load_one(person_entity::Entity, db).await?
        } else {
            vec![None; comments.len()]
        };
        let comments = comments
            .into_iter()
            .zip(comment_authors)
            .map(|(comment, author)| CommentResource {
                comment,
                author: author.map(PersonResource),
            })
            .collect();
        resources.push(PostResource {
            post,
            author: author.map(PersonResource),
            comments,
        });
    }
    Ok(resources)
}
