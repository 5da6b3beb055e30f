use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{LoginRequest, RegisterRequest, UpdateUserRequest},
    repo::UserStore,
    repo_types::{NewUser, User, UserPatch},
};
use crate::{
    auth::password::{hash_password, is_long_enough, verify_password},
    error::{ApiError, ApiResult},
};

pub const INVALID_CREDENTIALS: &str = "email or password is invalid";
pub const PASSWORD_TOO_SHORT: &str = "password is too short (minimum is 8 characters)";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Treats absent and blank values the same way.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validates every rule before reporting, then hashes and persists.
pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> ApiResult<User> {
    let mut errors = Vec::new();

    let username = present(req.username.as_deref()).map(str::to_owned);
    match &username {
        None => errors.push("Name is required".to_string()),
        Some(name) => {
            if store.find_by_username(name).await?.is_some() {
                errors.push("That username is already used".to_string());
            }
        }
    }

    let email = present(req.email.as_deref()).map(str::to_owned);
    match &email {
        None => errors.push("Email is required".to_string()),
        Some(email) if !is_valid_email(email) => errors.push("Email is invalid".to_string()),
        Some(email) => {
            if store.find_by_email(email).await?.is_some() {
                errors.push("That email is already taken".to_string());
            }
        }
    }

    match req.password.as_deref().filter(|p| !p.is_empty()) {
        None => errors.push("password is required".to_string()),
        Some(p) if !is_long_enough(p) => errors.push(PASSWORD_TOO_SHORT.to_string()),
        Some(_) => {}
    }

    let (Some(username), Some(email), Some(password), true) =
        (username, email, req.password, errors.is_empty())
    else {
        warn!(?errors, "registration rejected");
        return Err(ApiError::ValidationFailed(errors));
    };

    let password_hash = hash_password(&password)?;
    let user = store
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await
        .map_err(ApiError::failed_to_save)?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Unknown email and wrong password are deliberately indistinguishable.
pub async fn login(store: &dyn UserStore, req: LoginRequest) -> ApiResult<User> {
    let Some(user) = store.find_by_email(req.email.trim()).await? else {
        warn!("login unknown email");
        return Err(ApiError::validation(INVALID_CREDENTIALS));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::validation(INVALID_CREDENTIALS));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

/// Collect-all validation of a self-update, producing the patch to store.
pub async fn build_patch(
    store: &dyn UserStore,
    user_id: Uuid,
    req: UpdateUserRequest,
) -> ApiResult<UserPatch> {
    let mut errors = Vec::new();
    let mut patch = UserPatch {
        bio: req.bio,
        image: req.image,
        ..UserPatch::default()
    };

    if let Some(username) = req.username {
        let username = username.trim().to_owned();
        if username.is_empty() {
            errors.push("Name is required".to_string());
        } else if store
            .find_by_username(&username)
            .await?
            .is_some_and(|other| other.id != user_id)
        {
            errors.push("That username is already used".to_string());
        }
        patch.username = Some(username);
    }

    if let Some(email) = req.email {
        let email = email.trim().to_owned();
        if email.is_empty() {
            errors.push("Email is required".to_string());
        } else if !is_valid_email(&email) {
            errors.push("Email is invalid".to_string());
        } else if store
            .find_by_email(&email)
            .await?
            .is_some_and(|other| other.id != user_id)
        {
            errors.push("That email is already taken".to_string());
        }
        patch.email = Some(email);
    }

    if let Some(password) = req.password {
        if is_long_enough(&password) {
            patch.password_hash = Some(hash_password(&password)?);
        } else {
            errors.push(PASSWORD_TOO_SHORT.to_string());
        }
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        warn!(%user_id, ?errors, "update rejected");
        Err(ApiError::ValidationFailed(errors))
    }
}

/// Authoritative record for an authenticated caller; claims are never
/// trusted for anything but the id.
pub async fn load_current(store: &dyn UserStore, user_id: Uuid) -> ApiResult<User> {
    store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("not found user"))
}

/// Applies the patch and returns the stored record, re-read by id.
pub async fn update(
    store: &dyn UserStore,
    user_id: Uuid,
    req: UpdateUserRequest,
) -> ApiResult<User> {
    let patch = build_patch(store, user_id, req).await?;

    let updated = store
        .update(user_id, &patch)
        .await
        .map_err(ApiError::failed_to_save)?;
    if !updated {
        return Err(ApiError::not_found("not found user"));
    }

    let user = load_current(store, user_id).await?;
    info!(%user_id, "user updated");
    Ok(user)
}
