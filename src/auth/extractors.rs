use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::{
    jwt::{TokenError, TokenService},
    repo::UserDirectory,
    repo_types::User,
};
use crate::{
    error::{AppError, AppResult, AuthError},
    state::AppState,
};

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Invalid)?;

    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::Invalid)?;
    Ok(token)
}

/// Token gate: resolves the request to a subject id or rejects it.
pub fn require_auth(headers: &HeaderMap, tokens: &TokenService) -> AppResult<i64> {
    let token = bearer_token(headers)?;
    match tokens.validate(token) {
        Ok(subject) => Ok(subject),
        Err(TokenError::Expired) => {
            warn!("expired token");
            Err(AuthError::Expired.into())
        }
        Err(e) => {
            warn!(error = %e, "invalid token");
            Err(AuthError::Invalid.into())
        }
    }
}

/// Role gate: the subject must still exist and carry the admin flag.
pub async fn require_admin(users: &dyn UserDirectory, subject: i64) -> AppResult<User> {
    match users.find_by_id(subject).await? {
        Some(user) if user.admin => Ok(user),
        Some(_) => {
            warn!(user_id = subject, "admin required, user is not admin");
            Err(AppError::Forbidden)
        }
        None => {
            warn!(user_id = subject, "admin required, user not found");
            Err(AppError::Forbidden)
        }
    }
}

/// Extracts and validates the bearer token, returning the user id.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        require_auth(&parts.headers, &tokens).map(AuthUser)
    }
}

/// Token gate followed by role gate.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(subject) = AuthUser::from_request_parts(parts, state).await?;
        require_admin(state.users.as_ref(), subject).await.map(AdminUser)
    }
}
