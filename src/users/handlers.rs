use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{LoginRequest, RegisterRequest, UpdateUserRequest, UserEnvelope, UserView},
    services,
};
use crate::{
    auth::{AuthUser, JwtKeys},
    error::ApiResult,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
        .route("/user", get(current_user).put(update_user))
}

/// POST /users
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserEnvelope<RegisterRequest>>,
) -> ApiResult<Json<UserEnvelope<UserView>>> {
    let user = services::register(state.users.as_ref(), payload.user).await?;
    Ok(Json(UserEnvelope {
        user: UserView::new(user, None),
    }))
}

/// POST /users/login
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserEnvelope<LoginRequest>>,
) -> ApiResult<Json<UserEnvelope<UserView>>> {
    let user = services::login(state.users.as_ref(), payload.user).await?;
    let token = JwtKeys::from_ref(&state).sign(&user)?;
    Ok(Json(UserEnvelope {
        user: UserView::new(user, Some(token)),
    }))
}

/// GET /user
#[instrument(skip(state, auth), fields(user_id = %auth.claims.user.id))]
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserEnvelope<UserView>>> {
    let user = services::load_current(state.users.as_ref(), auth.claims.user.id).await?;
    Ok(Json(UserEnvelope {
        user: UserView::new(user, Some(auth.token)),
    }))
}

/// PUT /user
#[instrument(skip(state, auth, payload), fields(user_id = %auth.claims.user.id))]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UserEnvelope<UpdateUserRequest>>,
) -> ApiResult<Json<UserEnvelope<UserView>>> {
    let user = services::update(state.users.as_ref(), auth.claims.user.id, payload.user).await?;
    let token = JwtKeys::from_ref(&state).sign(&user)?;
    Ok(Json(UserEnvelope {
        user: UserView::new(user, Some(token)),
    }))
}
