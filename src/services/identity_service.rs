use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Principal, Role};

/// External authentication provider. `None` means nobody is signed in.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_principal(&self) -> Result<Option<Principal>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Resolves the principal from an HS256 bearer token. Missing, expired or
/// malformed tokens resolve to `None`.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    token: Option<String>,
    secret: String,
}

impl JwtIdentityProvider {
    pub fn new(token: Option<String>, secret: impl Into<String>) -> Self {
        Self {
            token,
            secret: secret.into(),
        }
    }

    pub fn from_authorization_header(header: Option<&str>, secret: impl Into<String>) -> Self {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string());
        Self::new(token, secret)
    }

    fn resolve(&self) -> Option<Principal> {
        let token = self.token.as_deref()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data,
            Err(err) => {
                debug!(error = %err, "Rejected bearer token");
                return None;
            }
        };

        let id = Uuid::parse_str(&data.claims.sub).ok()?;
        let role: Role = data.claims.role.as_deref()?.parse().ok()?;
        Some(Principal { id, role })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn current_principal(&self) -> Result<Option<Principal>> {
        Ok(self.resolve())
    }
}

/// A provider with a fixed answer, for embedders that resolve identity
/// themselves.
#[derive(Debug, Clone, Copy)]
pub struct StaticIdentityProvider(pub Option<Principal>);

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_principal(&self) -> Result<Option<Principal>> {
        Ok(self.0)
    }
}
