use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::Profile;

#[derive(Debug, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub body: String,
    pub article_slug: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub author_bio: Option<String>,
    pub author_image: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    #[serde(skip_serializing)]
    pub article_slug: String,
    #[serde(skip_serializing)]
    pub author_id: Uuid,
    pub author: Profile,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Self {
            id: r.id,
            body: r.body,
            article_slug: r.article_slug,
            author_id: r.author_id,
            author: Profile {
                username: r.author_username,
                bio: r.author_bio,
                image: r.author_image,
            },
            created_at: r.created_at,
        }
    }
}
