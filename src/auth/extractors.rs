use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{claims::Claims, jwt::JwtKeys};
use crate::error::ApiError;

/// Verified caller identity plus the raw token it presented.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub token: String,
}

/// Accepts `Token <jwt>` and `Bearer <jwt>`.
pub(crate) fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    (known && !token.is_empty()).then_some(token)
}

fn authorization_required(parts: &Parts) -> ApiError {
    // nested routers strip their prefix from `parts.uri`
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_owned())
        .unwrap_or_else(|| parts.uri.path().to_owned());
    ApiError::Unauthorized(format!(
        "Authorization is required for request on {} {}",
        parts.method, path
    ))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        else {
            return Err(authorization_required(parts));
        };

        let Some(token) = token_from_header(header) else {
            warn!("unsupported Authorization scheme");
            return Err(authorization_required(parts));
        };

        let keys = JwtKeys::from_ref(state);
        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser {
                claims,
                token: token.to_owned(),
            }),
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                Err(authorization_required(parts))
            }
        }
    }
}
