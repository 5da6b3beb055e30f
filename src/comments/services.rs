use tracing::{info, warn};

use super::{dto::NewCommentRequest, repo::CommentStore, repo_types::Comment};
use crate::{
    articles::ArticleStore,
    error::{ApiError, ApiResult},
    users::repo_types::User,
};

fn comment_body(req: NewCommentRequest) -> Option<String> {
    req.body
        .map(|b| b.trim().to_owned())
        .filter(|b| !b.is_empty())
}

pub async fn list(
    articles: &dyn ArticleStore,
    comments: &dyn CommentStore,
    slug: &str,
) -> ApiResult<Vec<Comment>> {
    if !articles.exists_by_slug(slug).await? {
        return Err(ApiError::not_found("article not found"));
    }
    Ok(comments.list(slug).await?)
}

pub async fn add(
    articles: &dyn ArticleStore,
    comments: &dyn CommentStore,
    slug: &str,
    req: NewCommentRequest,
    author: &User,
) -> ApiResult<Comment> {
    let article = articles
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| ApiError::not_found("article not found"))?;

    let Some(body) = comment_body(req) else {
        warn!(%slug, "empty comment rejected");
        return Err(ApiError::validation("body is required"));
    };

    let comment = comments
        .create(&article, &body, author)
        .await
        .map_err(ApiError::failed_to_save)?;
    info!(%slug, comment_id = %comment.id, "comment added");
    Ok(comment)
}
