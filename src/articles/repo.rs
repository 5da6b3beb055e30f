use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Article, ArticleCursor, ArticleForm, ArticleRow};
use crate::users::repo_types::User;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Newest first, strictly after `cursor` when given.
    async fn list(&self, limit: i64, cursor: Option<ArticleCursor>) -> anyhow::Result<Vec<Article>>;
    async fn count(&self) -> anyhow::Result<i64>;
    async fn find_by_slug(&self, slug: &str) -> anyhow::Result<Option<Article>>;
    async fn exists_by_slug(&self, slug: &str) -> anyhow::Result<bool>;
    /// Inserts, or overwrites the article `author` already owns under `slug`.
    async fn save(&self, form: &ArticleForm, slug: &str, author: &User) -> anyhow::Result<Article>;
    async fn remove(&self, article: &Article) -> anyhow::Result<Article>;
}

#[derive(Clone)]
pub struct PgArticleStore {
    db: PgPool,
}

impl PgArticleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const ARTICLE_SELECT: &str = r#"
    SELECT a.id, a.slug, a.title, a.description, a.body, a.tag_list, a.author_id,
           u.username AS author_username, u.bio AS author_bio, u.image AS author_image,
           a.created_at, a.updated_at
      FROM articles a
      JOIN users u ON u.id = a.author_id
"#;

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn list(&self, limit: i64, cursor: Option<ArticleCursor>) -> anyhow::Result<Vec<Article>> {
        let (after_ts, after_id) = match cursor {
            Some(c) => (Some(c.created_at), Some(c.id)),
            None => (None, None),
        };
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            r#"{ARTICLE_SELECT}
             WHERE $2::timestamptz IS NULL
                OR (a.created_at, a.id) < ($2::timestamptz, $3::uuid)
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT $1
            "#
        ))
        .bind(limit)
        .bind(after_ts)
        .bind(after_id)
        .fetch_all(&self.db)
        .await
        .context("list articles")?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.db)
            .await
            .context("count articles")?;
        Ok(count)
    }

    async fn find_by_slug(&self, slug: &str) -> anyhow::Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!("{ARTICLE_SELECT} WHERE a.slug = $1"))
            .bind(slug)
            .fetch_optional(&self.db)
            .await
            .context("find article by slug")?;
        Ok(row.map(Article::from))
    }

    async fn exists_by_slug(&self, slug: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM articles WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.db)
                .await
                .context("check article slug")?;
        Ok(exists)
    }

    async fn save(&self, form: &ArticleForm, slug: &str, author: &User) -> anyhow::Result<Article> {
        // the conflict arm only fires for the owning author; anyone else gets no row back
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            WITH saved AS (
                INSERT INTO articles (id, slug, title, description, body, tag_list, author_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (slug) DO UPDATE
                   SET title       = EXCLUDED.title,
                       description = EXCLUDED.description,
                       body        = EXCLUDED.body,
                       tag_list    = EXCLUDED.tag_list,
                       updated_at  = now()
                 WHERE articles.author_id = EXCLUDED.author_id
                RETURNING *
            )
            SELECT s.id, s.slug, s.title, s.description, s.body, s.tag_list, s.author_id,
                   u.username AS author_username, u.bio AS author_bio, u.image AS author_image,
                   s.created_at, s.updated_at
              FROM saved s
              JOIN users u ON u.id = s.author_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.body)
        .bind(&form.tag_list)
        .bind(author.id)
        .fetch_one(&self.db)
        .await
        .with_context(|| format!("save article {slug}"))?;
        Ok(row.into())
    }

    async fn remove(&self, article: &Article) -> anyhow::Result<Article> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(article.id)
            .execute(&self.db)
            .await
            .with_context(|| format!("delete article {}", article.slug))?;
        anyhow::ensure!(result.rows_affected() == 1, "article {} already removed", article.slug);
        Ok(article.clone())
    }
}
