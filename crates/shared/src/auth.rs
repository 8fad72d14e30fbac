//! Tenant-context claims resolved from the identity layer.
//!
//! Authentication itself lives upstream; this crate only validates the
//! bearer token and exposes the already-resolved scope to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carrying the resolved tenant context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Tenant ID (top-level isolation boundary).
    pub tenant: Uuid,
    /// Company ID (business unit within the tenant).
    pub company: Uuid,
    /// User email.
    pub email: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl TenantContext {
    /// Creates a new context for a user acting within a company.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        tenant_id: Uuid,
        company_id: Uuid,
        email: &str,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            tenant: tenant_id,
            company: company_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the tenant ID from the claims.
    #[must_use]
    pub const fn tenant_id(&self) -> Uuid {
        self.tenant
    }

    /// Returns the company ID from the claims.
    #[must_use]
    pub const fn company_id(&self) -> Uuid {
        self.company
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_context_accessors() {
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let company = Uuid::new_v4();
        let ctx = TenantContext::new(
            user,
            tenant,
            company,
            "clerk@example.com",
            Utc::now() + Duration::minutes(15),
        );

        assert_eq!(ctx.user_id(), user);
        assert_eq!(ctx.tenant_id(), tenant);
        assert_eq!(ctx.company_id(), company);
        assert!(ctx.exp > ctx.iat);
    }
}
