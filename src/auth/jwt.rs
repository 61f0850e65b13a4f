use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("expired token")]
    Expired,
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signs and checks HS256 identity tokens with a secret fixed for the
/// lifetime of the process.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn issue(&self, subject: i64) -> Result<String, TokenError> {
        self.issue_at(subject, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, subject: i64, now: OffsetDateTime) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = subject, "jwt signed");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> Result<i64, TokenError> {
        self.validate_at(token, OffsetDateTime::now_utc())
    }

    /// Signature and shape are checked first, so a tampered token is always
    /// `Invalid` even when it is also past its expiry.
    pub fn validate_at(&self, token: &str, now: OffsetDateTime) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!(error = %e, "jwt decode failed");
                TokenError::Invalid
            })?
            .claims;

        if now.unix_timestamp() > claims.exp {
            debug!(sub = %claims.sub, exp = claims.exp, "jwt expired");
            return Err(TokenError::Expired);
        }

        let subject = claims.sub.parse::<i64>().map_err(|_| TokenError::Invalid)?;
        debug!(user_id = subject, "jwt verified");
        Ok(subject)
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tokens(secret: &str) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: secret.into(),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn issued_token_validates_to_subject() {
        let tokens = make_tokens("dev-secret");
        let token = tokens.issue(42).expect("sign");
        assert_eq!(tokens.validate(&token).expect("verify"), 42);
    }

    #[test]
    fn issue_is_deterministic_for_fixed_clock() {
        let tokens = make_tokens("dev-secret");
        let now = OffsetDateTime::now_utc();
        assert_eq!(tokens.issue_at(7, now).unwrap(), tokens.issue_at(7, now).unwrap());
    }

    #[test]
    fn token_is_valid_until_expiry_and_expired_after() {
        let tokens = make_tokens("dev-secret");
        let issued = OffsetDateTime::now_utc();
        let token = tokens.issue_at(5, issued).unwrap();

        let edge = issued + Duration::minutes(60);
        assert_eq!(tokens.validate_at(&token, edge).unwrap(), 5);

        let late = edge + Duration::seconds(1);
        assert!(matches!(tokens.validate_at(&token, late), Err(TokenError::Expired)));
    }

    #[test]
    fn token_issued_in_the_past_is_expired_now() {
        let tokens = make_tokens("dev-secret");
        let issued = OffsetDateTime::now_utc() - Duration::minutes(61);
        let token = tokens.issue_at(5, issued).unwrap();
        assert!(matches!(tokens.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn altered_signature_is_invalid() {
        let tokens = make_tokens("dev-secret");
        let token = tokens.issue(9).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert!(matches!(tokens.validate(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn other_secret_is_invalid() {
        let token = make_tokens("secret-one").issue(1).unwrap();
        assert!(matches!(
            make_tokens("secret-two").validate(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = make_tokens("dev-secret");
        assert!(matches!(tokens.validate("invalid.token.here"), Err(TokenError::Invalid)));
        assert!(matches!(tokens.validate(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let tokens = make_tokens("dev-secret");
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: "not-a-user".into(),
            iat: now.unix_timestamp(),
            exp: (now + Duration::minutes(5)).unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &tokens.encoding).unwrap();
        assert!(matches!(tokens.validate(&token), Err(TokenError::Invalid)));
    }
}
