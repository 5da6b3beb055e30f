use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CommentEnvelope, CommentList, NewCommentRequest},
    repo_types::Comment,
    services,
};
use crate::{
    auth::AuthUser,
    error::ApiResult,
    state::AppState,
    users,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/articles/:slug/comments",
        get(list_comments).post(add_comment),
    )
}

/// GET /articles/:slug/comments
#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<CommentList>> {
    let comments =
        services::list(state.articles.as_ref(), state.comments.as_ref(), &slug).await?;
    Ok(Json(CommentList { comments }))
}

/// POST /articles/:slug/comments
#[instrument(skip(state, auth, payload), fields(user_id = %auth.claims.user.id))]
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<CommentEnvelope<NewCommentRequest>>,
) -> ApiResult<Json<CommentEnvelope<Comment>>> {
    let author = users::services::load_current(state.users.as_ref(), auth.claims.user.id).await?;
    let comment = services::add(
        state.articles.as_ref(),
        state.comments.as_ref(),
        &slug,
        payload.comment,
        &author,
    )
    .await?;
    Ok(Json(CommentEnvelope { comment }))
}
