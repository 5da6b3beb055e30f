use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ArticleEnvelope, ArticleList, ListQuery, PublishRequest},
    repo_types::Article,
    services,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    users,
};

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles).post(publish_article))
        .route("/articles/:slug", get(get_article).delete(remove_article))
}

/// GET /articles?limit=&cursor=
#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ArticleList>> {
    let list = services::list(state.articles.as_ref(), query).await?;
    Ok(Json(list))
}

/// GET /articles/:slug
#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleEnvelope<Article>>> {
    let article = state
        .articles
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("article not found"))?;
    Ok(Json(ArticleEnvelope { article }))
}

/// POST /articles
#[instrument(skip(state, auth, payload), fields(user_id = %auth.claims.user.id))]
pub async fn publish_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ArticleEnvelope<PublishRequest>>,
) -> ApiResult<Json<ArticleEnvelope<Article>>> {
    let author = users::services::load_current(state.users.as_ref(), auth.claims.user.id).await?;
    let article = services::publish(state.articles.as_ref(), payload.article, &author).await?;
    Ok(Json(ArticleEnvelope { article }))
}

/// DELETE /articles/:slug
#[instrument(skip(state, auth), fields(user_id = %auth.claims.user.id))]
pub async fn remove_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleEnvelope<Article>>> {
    let caller = users::services::load_current(state.users.as_ref(), auth.claims.user.id).await?;
    let article = services::remove(state.articles.as_ref(), &slug, &caller).await?;
    Ok(Json(ArticleEnvelope { article }))
}
