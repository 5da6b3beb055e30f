use tracing::{info, warn};

use super::{
    dto::{ArticleList, ListQuery, PublishRequest},
    repo::ArticleStore,
    repo_types::{Article, ArticleCursor, ArticleForm},
};
use crate::{
    error::{ApiError, ApiResult},
    users::repo_types::User,
};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn required(value: Option<String>, message: &str, errors: &mut Vec<String>) -> String {
    let value = value.map(|v| v.trim().to_owned()).unwrap_or_default();
    if value.is_empty() {
        errors.push(message.to_string());
    }
    value
}

/// Collect-all validation; yields the form together with its slug.
pub fn validate_form(req: PublishRequest) -> Result<(ArticleForm, String), Vec<String>> {
    let mut errors = Vec::new();
    let title = required(req.title, "title is required", &mut errors);
    let description = required(req.description, "description is required", &mut errors);
    let body = required(req.body, "body is required", &mut errors);

    let slug = slug::slugify(&title);
    if !title.is_empty() && slug.is_empty() {
        errors.push("title must contain at least one letter or digit".to_string());
    }

    let tag_list = req
        .tag_list
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect();

    if errors.is_empty() {
        Ok((
            ArticleForm {
                title,
                description,
                body,
                tag_list,
            },
            slug,
        ))
    } else {
        Err(errors)
    }
}

pub async fn list(store: &dyn ArticleStore, query: ListQuery) -> ApiResult<ArticleList> {
    let limit = clamp_limit(query.limit);
    let cursor = match query.cursor.as_deref().filter(|c| !c.is_empty()) {
        Some(token) => {
            Some(ArticleCursor::decode(token).ok_or_else(|| ApiError::validation("invalid cursor"))?)
        }
        None => None,
    };

    let articles = store.list(limit, cursor).await?;
    let article_count = store.count().await?;
    let next_cursor = if articles.len() as i64 == limit {
        articles.last().map(|a| ArticleCursor::after(a).encode())
    } else {
        None
    };

    Ok(ArticleList {
        articles,
        article_count,
        next_cursor,
    })
}

pub async fn publish(
    store: &dyn ArticleStore,
    req: PublishRequest,
    author: &User,
) -> ApiResult<Article> {
    let (form, slug) = validate_form(req).map_err(|errors| {
        warn!(?errors, "publish rejected");
        ApiError::ValidationFailed(errors)
    })?;

    if let Some(existing) = store.find_by_slug(&slug).await? {
        if existing.author_id != author.id {
            warn!(%slug, "slug owned by another author");
            return Err(ApiError::validation("That title is already used"));
        }
    }

    let article = store
        .save(&form, &slug, author)
        .await
        .map_err(ApiError::failed_to_save)?;
    info!(slug = %article.slug, author_id = %author.id, "article published");
    Ok(article)
}

pub async fn remove(store: &dyn ArticleStore, slug: &str, caller: &User) -> ApiResult<Article> {
    let article = store
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| ApiError::not_found("article not found"))?;

    if article.author_id != caller.id {
        warn!(%slug, caller_id = %caller.id, "remove by non-author");
        return Err(ApiError::Forbidden(
            "only the author can remove this article".into(),
        ));
    }

    let removed = store.remove(&article).await?;
    info!(%slug, "article removed");
    Ok(removed)
}
