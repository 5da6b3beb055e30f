use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::Profile;

/// Article joined with its author's columns.
#[derive(Debug, FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub author_id: Uuid,
    pub author_username: String,
    pub author_bio: Option<String>,
    pub author_image: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    #[serde(skip_serializing)]
    pub author_id: Uuid,
    pub author: Profile,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ArticleRow> for Article {
    fn from(r: ArticleRow) -> Self {
        Self {
            id: r.id,
            slug: r.slug,
            title: r.title,
            description: r.description,
            body: r.body,
            tag_list: r.tag_list,
            author_id: r.author_id,
            author: Profile {
                username: r.author_username,
                bio: r.author_bio,
                image: r.author_image,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Validated publish form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleForm {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

/// Keyset position in the newest-first article listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCursor {
    pub created_at: OffsetDateTime,
    pub id: Uuid,
}

impl ArticleCursor {
    pub fn after(article: &Article) -> Self {
        Self {
            created_at: article.created_at,
            id: article.id,
        }
    }

    /// Opaque url-safe token: base64 of `<unix nanos>|<id>`.
    pub fn encode(&self) -> String {
        let raw = format!("{}|{}", self.created_at.unix_timestamp_nanos(), self.id);
        Base64UrlUnpadded::encode_string(raw.as_bytes())
    }

    pub fn decode(token: &str) -> Option<Self> {
        let bytes = Base64UrlUnpadded::decode_vec(token).ok()?;
        let raw = String::from_utf8(bytes).ok()?;
        let (created_at, id) = raw.split_once('|')?;
        Some(Self {
            created_at: OffsetDateTime::from_unix_timestamp_nanos(created_at.parse().ok()?).ok()?,
            id: id.parse().ok()?,
        })
    }
}
