use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    password::{hash_password, verify_password, PasswordError},
    repo_types::{NewUser, User},
};
use crate::{
    config::AdminSeed,
    error::{AppError, AppResult},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 8;
// users.email is VARCHAR(256)
pub const MAX_EMAIL_LEN: usize = 256;

lazy_static! {
    /// Stand-in digest for unknown accounts so a failed login costs one
    /// Argon2 verify whether or not the email exists.
    static ref DUMMY_DIGEST: String = hash_password("orderdesk-unknown-account").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_for_storage(plain: &str) -> AppResult<String> {
    hash_password(plain).map_err(|e| match e {
        PasswordError::Empty => AppError::Validation("Password is required".into()),
        other => AppError::Internal(other.into()),
    })
}

fn issue_token(state: &AppState, user: &User) -> AppResult<String> {
    state
        .tokens
        .issue(user.id)
        .map_err(|e| AppError::Internal(e.into()))
}

/// Creates a non-admin account and returns it with a fresh token. A second
/// signup for the same email loses at the store's uniqueness check.
pub async fn signup(state: &AppState, email: &str, password: &str) -> AppResult<(User, String)> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        warn!("email too long");
        return Err(AppError::Validation("Email too long".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation("Password too short".into()));
    }

    let password_hash = hash_for_storage(password)?;
    let user = state
        .users
        .create(NewUser {
            email,
            password_hash,
            admin: false,
        })
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => AppError::Conflict("Email already registered".into()),
            other => other,
        })?;

    let token = issue_token(state, &user)?;
    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((user, token))
}

/// Runs the verifier against the stored digest, or against the dummy digest
/// when there is no such user.
fn credentials_match(user: Option<&User>, password: &str) -> bool {
    let digest = user.map_or(DUMMY_DIGEST.as_str(), |u| u.password_hash.as_str());
    let ok = verify_password(password, digest);
    user.is_some() && ok
}

/// Unknown email and wrong password are indistinguishable to the caller,
/// in the response and in the time taken.
pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<(User, String)> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    let found = state.users.find_by_email(&email).await?;
    let matched = credentials_match(found.as_ref(), password);
    let user = match found {
        Some(user) if matched => user,
        Some(user) => {
            warn!(email = %email, user_id = user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = issue_token(state, &user)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok((user, token))
}

/// Makes sure the configured admin account exists and has the admin flag.
/// An existing account keeps its password.
pub async fn bootstrap_admin(state: &AppState, seed: &AdminSeed) -> AppResult<User> {
    let email = normalize_email(&seed.email);
    if !is_valid_email(&email) || email.chars().count() > MAX_EMAIL_LEN {
        return Err(AppError::Validation("ADMIN_EMAIL is not a valid email".into()));
    }

    if let Some(mut user) = state.users.find_by_email(&email).await? {
        if user.admin {
            return Ok(user);
        }
        user.admin = true;
        let user = state
            .users
            .update(&user)
            .await?
            .ok_or(AppError::NotFound("user"))?;
        info!(user_id = user.id, "existing user promoted to admin");
        return Ok(user);
    }

    let password_hash = hash_for_storage(&seed.password)?;
    let user = state
        .users
        .create(NewUser {
            email,
            password_hash,
            admin: true,
        })
        .await?;
    info!(user_id = user.id, "admin user created");
    Ok(user)
}
