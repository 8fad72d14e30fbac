//! JWT validation for the tenant context.
//!
//! Tokens are issued by the upstream identity service; Vendra only
//! validates them and reads the scope claims.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::TenantContext;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key shared with the identity service.
    pub secret: String,
    /// Token lifetime in minutes, used only when issuing dev tokens.
    pub token_expires_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            token_expires_minutes: 15,
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is invalid.
    #[error("invalid token")]
    Invalid,
}

/// JWT service for token validation.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a token carrying the given scope. Intended for development
    /// tooling and tests; production tokens come from the identity service.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        company_id: Uuid,
        email: &str,
    ) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::minutes(self.config.token_expires_minutes);
        let claims = TenantContext::new(user_id, tenant_id, company_id, email, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates a token and returns the tenant context it carries.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` for expired tokens and
    /// `JwtError::Invalid` for anything else that fails validation.
    pub fn validate_token(&self, token: &str) -> Result<TenantContext, JwtError> {
        let validation = Validation::default();

        decode::<TenantContext>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            token_expires_minutes: 15,
        })
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let svc = service();
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let company = Uuid::new_v4();

        let token = svc
            .issue_token(user, tenant, company, "clerk@example.com")
            .unwrap();
        let ctx = svc.validate_token(&token).unwrap();

        assert_eq!(ctx.user_id(), user);
        assert_eq!(ctx.tenant_id(), tenant);
        assert_eq!(ctx.company_id(), company);
        assert_eq!(ctx.email, "clerk@example.com");
    }

    #[test]
    fn test_validate_garbage_token() {
        let svc = service();
        assert!(matches!(
            svc.validate_token("not-a-token"),
            Err(JwtError::Invalid)
        ));
    }

    #[test]
    fn test_validate_wrong_secret() {
        let svc = service();
        let other = JwtService::new(JwtConfig {
            secret: "other-secret".to_string(),
            token_expires_minutes: 15,
        });

        let token = other
            .issue_token(
                Uuid::new_v4(),
                Uuid::new_v4(),
                Uuid::new_v4(),
                "clerk@example.com",
            )
            .unwrap();

        assert!(matches!(svc.validate_token(&token), Err(JwtError::Invalid)));
    }
}
