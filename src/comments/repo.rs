use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Comment, CommentRow};
use crate::{articles::repo_types::Article, users::repo_types::User};

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Comments on the article with `slug`, oldest first.
    async fn list(&self, slug: &str) -> anyhow::Result<Vec<Comment>>;
    async fn create(&self, article: &Article, body: &str, author: &User) -> anyhow::Result<Comment>;
}

#[derive(Clone)]
pub struct PgCommentStore {
    db: PgPool,
}

impl PgCommentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn list(&self, slug: &str) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.body, a.slug AS article_slug, c.author_id,
                   u.username AS author_username, u.bio AS author_bio, u.image AS author_image,
                   c.created_at
              FROM comments c
              JOIN articles a ON a.id = c.article_id
              JOIN users u ON u.id = c.author_id
             WHERE a.slug = $1
             ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(slug)
        .fetch_all(&self.db)
        .await
        .with_context(|| format!("list comments for {slug}"))?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn create(&self, article: &Article, body: &str, author: &User) -> anyhow::Result<Comment> {
        let (id, created_at): (Uuid, time::OffsetDateTime) = sqlx::query_as(
            r#"
            INSERT INTO comments (id, article_id, author_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(article.id)
        .bind(author.id)
        .bind(body)
        .fetch_one(&self.db)
        .await
        .with_context(|| format!("insert comment on {}", article.slug))?;

        Ok(Comment {
            id,
            body: body.to_owned(),
            article_slug: article.slug.clone(),
            author_id: author.id,
            author: author.into(),
            created_at,
        })
    }
}
