use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use super::password;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    pub admin: bool,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn is_password_valid(&self, plain: &str) -> bool {
        password::verify_password(plain, &self.password_hash)
    }
}

/// Insert payload; the password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub admin: bool,
}
